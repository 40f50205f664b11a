//! Output renderers for CLI commands.

use anyhow::anyhow;
use serde::Serialize;
use testhub_api_models::{ResultsResponse, UploadResponse};

use crate::client::{CliError, CliResult};

pub(crate) fn render_upload(response: &UploadResponse, raw: bool) -> CliResult<String> {
    if raw {
        Ok(response.aggregated_report.clone())
    } else {
        pretty_json(response)
    }
}

pub(crate) fn render_results(response: &ResultsResponse, raw: bool) -> CliResult<String> {
    if raw {
        Ok(response.report.clone())
    } else {
        pretty_json(response)
    }
}

fn pretty_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}
