//! Validation errors for relay inputs.
//!
//! # Design
//!
//! - Everything in this module is rejected before a request reaches the remote service.
//! - Offending values are carried in fields so the HTTP layer can echo them back.

use thiserror::Error;

/// Result alias for validation helpers.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Caller errors detected while accepting an upload or lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The category tag is not part of the closed set.
    #[error("unknown contract category '{value}'")]
    UnknownCategory {
        /// Category string supplied by the caller.
        value: String,
    },
    /// The uploaded file extension is not on the category allow-list.
    #[error("file type {extension} not allowed for {category} contracts")]
    ExtensionNotAllowed {
        /// Category the upload targeted.
        category: &'static str,
        /// Lowercased extension (including the dot), empty when missing.
        extension: String,
    },
    /// The filename cannot be used to derive remote paths.
    #[error("invalid filename '{value}': {reason}")]
    InvalidFilename {
        /// Filename supplied by the caller.
        value: String,
        /// Static reason for the rejection.
        reason: &'static str,
    },
}

impl ValidationError {
    pub(crate) fn invalid_filename(value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidFilename {
            value: value.into(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_include_offending_values() {
        let unknown = ValidationError::UnknownCategory {
            value: "solana".to_string(),
        };
        assert_eq!(unknown.to_string(), "unknown contract category 'solana'");

        let extension = ValidationError::ExtensionNotAllowed {
            category: "evm",
            extension: ".exe".to_string(),
        };
        assert_eq!(
            extension.to_string(),
            "file type .exe not allowed for evm contracts"
        );

        let filename = ValidationError::invalid_filename("  ", "empty_stem");
        assert!(filename.to_string().contains("empty_stem"));
    }
}
