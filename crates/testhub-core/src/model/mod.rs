//! Core relay domain types: contract categories and uploaded artifacts.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::naming::{self, file_extension};

/// Closed set of contract categories understood by the remote test runners.
///
/// Each category maps to its own remote container and carries its own extension allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Solidity contracts executed by the EVM runner.
    #[serde(rename = "evm")]
    Evm,
    /// WebAssembly contracts executed by the generic non-EVM runner.
    #[serde(rename = "non-evm")]
    NonEvm,
    /// Algorand (TEAL / PyTeal) contracts.
    #[serde(rename = "non-evm-algorand")]
    NonEvmAlgorand,
    /// StarkNet (Cairo) contracts.
    #[serde(rename = "non-evm-starknet")]
    NonEvmStarknet,
}

impl Category {
    /// Every category in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Evm,
        Self::NonEvm,
        Self::NonEvmAlgorand,
        Self::NonEvmStarknet,
    ];

    /// Wire identifier used in routes, request bodies, and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Evm => "evm",
            Self::NonEvm => "non-evm",
            Self::NonEvmAlgorand => "non-evm-algorand",
            Self::NonEvmStarknet => "non-evm-starknet",
        }
    }

    /// Remote container identifier used when no override is configured.
    #[must_use]
    pub const fn default_container(self) -> &'static str {
        match self {
            Self::Evm => "evm-container",
            Self::NonEvm => "non-evm-container",
            Self::NonEvmAlgorand => "non-evm-algorand",
            Self::NonEvmStarknet => "non-evm-starknet",
        }
    }

    /// Lowercase extensions (with leading dot) accepted for uploads in this category.
    #[must_use]
    pub const fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Evm => &[".sol", ".txt"],
            Self::NonEvm => &[".wasm"],
            Self::NonEvmAlgorand => &[".teal", ".py"],
            Self::NonEvmStarknet => &[".cairo"],
        }
    }

    /// Human-readable label used in response messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Evm => "EVM",
            Self::NonEvm => "Non-EVM",
            Self::NonEvmAlgorand => "Algorand",
            Self::NonEvmStarknet => "StarkNet",
        }
    }

    /// Suffix used for per-category environment overrides (`TESTHUB_CONTAINER_<SUFFIX>`).
    #[must_use]
    pub const fn env_suffix(self) -> &'static str {
        match self {
            Self::Evm => "EVM",
            Self::NonEvm => "NON_EVM",
            Self::NonEvmAlgorand => "NON_EVM_ALGORAND",
            Self::NonEvmStarknet => "NON_EVM_STARKNET",
        }
    }

    /// Check an uploaded filename against this category's allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ExtensionNotAllowed`] when the extension is missing or not
    /// on the allow-list.
    pub fn validate_extension(self, filename: &str) -> ValidationResult<()> {
        let extension = file_extension(filename).unwrap_or_default();
        if self.allowed_extensions().contains(&extension.as_str()) {
            Ok(())
        } else {
            Err(ValidationError::ExtensionNotAllowed {
                category: self.as_str(),
                extension,
            })
        }
    }
}

impl Display for Category {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownCategory {
                value: value.to_string(),
            })
    }
}

/// Uploaded contract file: immutable bytes plus logical name and category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    name: String,
    category: Category,
    bytes: Bytes,
}

impl Artifact {
    /// Build an artifact from an uploaded filename. Any directory prefix is stripped.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidFilename`] when no usable basename remains.
    pub fn new(
        name: &str,
        category: Category,
        bytes: impl Into<Bytes>,
    ) -> ValidationResult<Self> {
        let base = naming::basename(name);
        if base.is_empty() || base == "." || base == ".." {
            return Err(ValidationError::invalid_filename(name, "missing_basename"));
        }
        Ok(Self {
            name: base.to_string(),
            category,
            bytes: bytes.into(),
        })
    }

    /// Logical filename (basename only).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category the artifact was uploaded under.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Raw file contents.
    #[must_use]
    pub const fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the uploaded file was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Name of the report the remote runner produces for this artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidFilename`] when the name has an empty stem.
    pub fn report_filename(&self) -> ValidationResult<String> {
        naming::report_filename(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn category_round_trips_through_wire_strings() -> Result<()> {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>()?, category);
            let json = serde_json::to_string(&category)?;
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
        assert_eq!(" EVM ".parse::<Category>()?, Category::Evm);
        Ok(())
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = "solana".parse::<Category>().err();
        assert_eq!(
            err,
            Some(ValidationError::UnknownCategory {
                value: "solana".to_string()
            })
        );
    }

    #[test]
    fn default_containers_match_remote_layout() {
        assert_eq!(Category::Evm.default_container(), "evm-container");
        assert_eq!(Category::NonEvm.default_container(), "non-evm-container");
        assert_eq!(
            Category::NonEvmAlgorand.default_container(),
            "non-evm-algorand"
        );
        assert_eq!(
            Category::NonEvmStarknet.default_container(),
            "non-evm-starknet"
        );
    }

    #[test]
    fn extension_allow_lists_are_case_insensitive() -> Result<()> {
        Category::Evm.validate_extension("Crowdfunding.SOL")?;
        Category::Evm.validate_extension("notes.txt")?;
        Category::NonEvm.validate_extension("token.wasm")?;
        Category::NonEvmStarknet.validate_extension("vault.cairo")?;

        let err = Category::NonEvm.validate_extension("token.sol").err();
        assert_eq!(
            err,
            Some(ValidationError::ExtensionNotAllowed {
                category: "non-evm",
                extension: ".sol".to_string(),
            })
        );
        assert!(Category::Evm.validate_extension("Makefile").is_err());
        Ok(())
    }

    #[test]
    fn artifact_strips_directories_and_keeps_bytes() -> Result<()> {
        let artifact = Artifact::new("contracts/Crowdfunding.sol", Category::Evm, &b"pragma"[..])?;
        assert_eq!(artifact.name(), "Crowdfunding.sol");
        assert_eq!(artifact.category(), Category::Evm);
        assert_eq!(artifact.len(), 6);
        assert!(!artifact.is_empty());
        assert_eq!(artifact.report_filename()?, "Crowdfunding-report.md");
        Ok(())
    }

    #[test]
    fn artifact_requires_a_basename() {
        assert!(Artifact::new("contracts/", Category::Evm, Vec::<u8>::new()).is_err());
        assert!(Artifact::new("..", Category::Evm, Vec::<u8>::new()).is_err());
    }
}
