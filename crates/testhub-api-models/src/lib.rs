#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]
//! Shared HTTP DTOs for the TestHub relay API.
//!
//! These types are re-used by the CLI for response decoding so both sides agree on field names.
//! Conversions from relay results live here so the mapping stays in one place.
use serde::{Deserialize, Serialize};

use testhub_core::{Artifact, Category};
use testhub_remote::{ReportLookup, Submission};

/// Message returned by `GET /`.
pub const ROOT_MESSAGE: &str = "Smart Contract Testing API is running";

/// RFC9457-compatible problem document surfaced on validation/runtime errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    /// URI reference identifying the problem type.
    pub kind: String,
    /// Short, human-readable summary of the issue.
    pub title: String,
    /// HTTP status code associated with the error.
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Detailed diagnostic message when available.
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Parameters that failed validation, if applicable.
    pub invalid_params: Option<Vec<ProblemInvalidParam>>,
}

/// Invalid parameter pointer surfaced alongside a [`ProblemDetails`] payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemInvalidParam {
    /// JSON Pointer to the offending field.
    pub pointer: String,
    /// Human-readable description of the validation failure.
    pub message: String,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootResponse {
    /// Liveness banner.
    pub message: String,
}

impl Default for RootResponse {
    fn default() -> Self {
        Self {
            message: ROOT_MESSAGE.to_string(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: String,
    /// Build identifier recorded at startup.
    pub build: String,
    /// Report lookups currently in flight.
    pub active_polls: i64,
}

/// Summary of the uploaded contract, echoed in [`UploadResponse::details`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadDetails {
    /// Category the contract was submitted under.
    pub contract_type: Category,
    /// Contract filename as stored remotely.
    pub filename: String,
    /// Uploaded size in bytes.
    pub size_bytes: u64,
    /// Processing status; `processed` once the pipeline returned.
    pub status: String,
}

/// Body of a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    /// Human-readable summary, e.g. `EVM contract processed`.
    pub message: String,
    /// Contract filename as stored remotely.
    pub filename: String,
    /// Category the contract was submitted under.
    pub category: Category,
    /// Report filename the remote writes for this contract.
    pub report_filename: String,
    /// Trigger output, or a description of the trigger failure.
    pub docker_logs: String,
    /// Report text, or a description of why it could not be retrieved.
    pub aggregated_report: String,
    /// Contract summary.
    pub details: UploadDetails,
}

impl UploadResponse {
    /// Build the response for `artifact` from the relay's `submission`.
    #[must_use]
    pub fn from_submission(artifact: &Artifact, submission: Submission) -> Self {
        let category = artifact.category();
        Self {
            message: format!("{} contract processed", category.label()),
            filename: artifact.name().to_string(),
            category,
            report_filename: submission.report_filename,
            docker_logs: submission.docker_logs,
            aggregated_report: submission.aggregated_report,
            details: UploadDetails {
                contract_type: category,
                filename: artifact.name().to_string(),
                size_bytes: artifact.len() as u64,
                status: "processed".to_string(),
            },
        }
    }
}

/// Body of `GET /results/{category}/{filename}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultsResponse {
    /// Category the lookup targeted.
    pub category: Category,
    /// Contract filename the report was derived from.
    pub filename: String,
    /// Derived report filename.
    pub report_filename: String,
    /// Report text, or a description of why it could not be retrieved.
    pub report: String,
}

impl ResultsResponse {
    /// Build the response from a relay lookup.
    #[must_use]
    pub fn from_lookup(category: Category, filename: &str, lookup: ReportLookup) -> Self {
        Self {
            category,
            filename: filename.to_string(),
            report_filename: lookup.report_filename,
            report: lookup.report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn upload_response_serialises_wire_names() -> Result<()> {
        let artifact = Artifact::new("Crowdfunding.sol", Category::Evm, "contract C {}")?;
        let response = UploadResponse::from_submission(
            &artifact,
            Submission {
                report_filename: "Crowdfunding-report.md".to_string(),
                docker_logs: "1 passing".to_string(),
                aggregated_report: "# report".to_string(),
            },
        );
        assert_eq!(
            serde_json::to_value(&response)?,
            json!({
                "message": "EVM contract processed",
                "filename": "Crowdfunding.sol",
                "category": "evm",
                "report_filename": "Crowdfunding-report.md",
                "docker_logs": "1 passing",
                "aggregated_report": "# report",
                "details": {
                    "contract_type": "evm",
                    "filename": "Crowdfunding.sol",
                    "size_bytes": 13,
                    "status": "processed"
                }
            })
        );
        Ok(())
    }

    #[test]
    fn problem_details_omit_empty_fields() -> Result<()> {
        let problem = ProblemDetails {
            kind: "https://smarttesthub.live/problems/validation".to_string(),
            title: "validation failed".to_string(),
            status: 400,
            detail: None,
            invalid_params: None,
        };
        assert_eq!(
            serde_json::to_value(&problem)?,
            json!({
                "type": "https://smarttesthub.live/problems/validation",
                "title": "validation failed",
                "status": 400
            })
        );
        Ok(())
    }

    #[test]
    fn results_response_decodes_from_wire() -> Result<()> {
        let decoded: ResultsResponse = serde_json::from_value(json!({
            "category": "non-evm-starknet",
            "filename": "Vault.cairo",
            "report_filename": "Vault-report.md",
            "report": "ok"
        }))?;
        assert_eq!(decoded.category, Category::NonEvmStarknet);
        Ok(())
    }
}
