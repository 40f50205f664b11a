//! Filename helpers shared by the upload and results surfaces.
//!
//! The remote runner names its output after the uploaded file, so the report location is a pure
//! function of the upload name. No correlation token is involved.

use crate::error::{ValidationError, ValidationResult};

/// Suffix appended to the upload stem to locate the remote report.
pub const REPORT_SUFFIX: &str = "-report.md";

/// Final path segment of `name`, accepting both `/` and `\` separators.
#[must_use]
pub fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}

/// Basename with its final extension removed and surrounding whitespace trimmed.
///
/// A leading dot does not start an extension (`.env` keeps its stem).
#[must_use]
pub fn file_stem(name: &str) -> &str {
    let base = basename(name);
    match base.rfind('.') {
        Some(index) if index > 0 => base[..index].trim(),
        _ => base,
    }
}

/// Lowercased final extension including the leading dot, if any.
#[must_use]
pub fn file_extension(name: &str) -> Option<String> {
    let base = basename(name);
    match base.rfind('.') {
        Some(index) if index > 0 && index + 1 < base.len() => {
            Some(base[index..].to_ascii_lowercase())
        }
        _ => None,
    }
}

/// Derive the report filename the remote runner writes for an uploaded file.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidFilename`] when the stem is empty.
pub fn report_filename(uploaded: &str) -> ValidationResult<String> {
    let stem = file_stem(uploaded);
    if stem.is_empty() {
        return Err(ValidationError::invalid_filename(uploaded, "empty_stem"));
    }
    Ok(format!("{stem}{REPORT_SUFFIX}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn report_filename_uses_stem_and_suffix() -> Result<()> {
        assert_eq!(report_filename("Crowdfunding.sol")?, "Crowdfunding-report.md");
        assert_eq!(report_filename("MyToken.txt")?, "MyToken-report.md");
        assert_eq!(report_filename("  MyToken .txt ")?, "MyToken-report.md");
        assert_eq!(report_filename("dir/sub/Vault.cairo")?, "Vault-report.md");
        assert_eq!(report_filename(r"C:\work\Vault.cairo")?, "Vault-report.md");
        assert_eq!(report_filename("bundle.tar.gz")?, "bundle.tar-report.md");
        assert_eq!(report_filename("README")?, "README-report.md");
        Ok(())
    }

    #[test]
    fn report_filename_rejects_empty_stem() {
        assert!(report_filename("").is_err());
        assert!(report_filename("contracts/").is_err());
        assert!(report_filename("   ").is_err());
    }

    #[test]
    fn extension_handles_edge_cases() {
        assert_eq!(file_extension("Token.WASM").as_deref(), Some(".wasm"));
        assert_eq!(file_extension(".env"), None);
        assert_eq!(file_extension("trailing."), None);
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_stem(".env"), ".env");
    }
}
