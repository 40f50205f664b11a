use std::io::Read;

use tar::{Archive, EntryType};

use crate::error::{ArchiveError, ArchiveResult};

/// A regular-file entry read out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path recorded in the entry header.
    pub path: String,
    /// File contents.
    pub contents: Vec<u8>,
}

/// List every regular-file entry in `blob`, in archive order.
///
/// # Errors
///
/// Returns [`ArchiveError::Decode`] when `blob` is not a readable tar archive.
pub fn entries(blob: &[u8]) -> ArchiveResult<Vec<ArchiveEntry>> {
    let mut found = Vec::new();
    visit(blob, |path, contents| {
        found.push(ArchiveEntry {
            path: path.to_string(),
            contents,
        });
        false
    })?;
    Ok(found)
}

/// Return the contents of the first regular-file entry whose path ends with `suffix`.
///
/// # Errors
///
/// Returns [`ArchiveError::Decode`] for undecodable input and [`ArchiveError::EntryNotFound`]
/// when nothing matches.
pub fn extract_entry(blob: &[u8], suffix: &str) -> ArchiveResult<Vec<u8>> {
    let mut matched = None;
    visit(blob, |path, contents| {
        if path.ends_with(suffix) {
            matched = Some(contents);
            true
        } else {
            false
        }
    })?;
    matched.ok_or_else(|| ArchiveError::EntryNotFound {
        suffix: suffix.to_string(),
    })
}

/// Walk regular-file entries until `visitor` returns `true`.
fn visit<F>(blob: &[u8], mut visitor: F) -> ArchiveResult<()>
where
    F: FnMut(&str, Vec<u8>) -> bool,
{
    // An empty body would otherwise read as an archive with no entries.
    if blob.is_empty() {
        return Err(ArchiveError::decode(
            "read_header",
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "empty archive"),
        ));
    }
    let mut archive = Archive::new(blob);
    let iter = archive
        .entries()
        .map_err(|source| ArchiveError::decode("read_entries", source))?;
    for entry in iter {
        let mut entry = entry.map_err(|source| ArchiveError::decode("read_header", source))?;
        if !matches!(
            entry.header().entry_type(),
            EntryType::Regular | EntryType::Continuous
        ) {
            continue;
        }
        let path = entry
            .path()
            .map_err(|source| ArchiveError::decode("read_path", source))?
            .to_string_lossy()
            .into_owned();
        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|source| ArchiveError::decode("read_contents", source))?;
        if visitor(&path, contents) {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack;
    use anyhow::Result;
    use tar::{Builder, Header};

    fn multi_entry() -> Result<Vec<u8>> {
        let mut builder = Builder::new(Vec::new());
        let mut dir = Header::new_gnu();
        dir.set_entry_type(EntryType::Directory);
        dir.set_size(0);
        dir.set_mode(0o755);
        builder.append_data(&mut dir, "reports/", std::io::empty())?;
        for (name, body) in [
            ("reports/summary.txt", "ignored"),
            ("reports/Crowdfunding-report.md", "# Crowdfunding\nAll tests passed.\n"),
        ] {
            let mut header = Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, name, body.as_bytes())?;
        }
        Ok(builder.into_inner()?)
    }

    #[test]
    fn extract_matches_on_path_suffix() -> Result<()> {
        let blob = multi_entry()?;
        let report = extract_entry(&blob, "Crowdfunding-report.md")?;
        assert_eq!(report, b"# Crowdfunding\nAll tests passed.\n");
        Ok(())
    }

    #[test]
    fn entries_skip_directories() -> Result<()> {
        let listed = entries(&multi_entry()?)?;
        let paths: Vec<_> = listed.iter().map(|entry| entry.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["reports/summary.txt", "reports/Crowdfunding-report.md"]
        );
        Ok(())
    }

    #[test]
    fn packed_archive_reads_back() -> Result<()> {
        let blob = pack(b"#[starknet::contract]", "Vault.cairo")?;
        assert_eq!(extract_entry(&blob, "Vault.cairo")?, b"#[starknet::contract]");
        Ok(())
    }

    #[test]
    fn missing_entry_is_reported() -> Result<()> {
        let blob = pack(b"body", "Other-report.md")?;
        let err = extract_entry(&blob, "Token-report.md");
        assert!(matches!(
            err,
            Err(ArchiveError::EntryNotFound { ref suffix }) if suffix == "Token-report.md"
        ));
        Ok(())
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            extract_entry(b"this is not a tar archive at all", "x"),
            Err(ArchiveError::Decode { .. })
        ));
        assert!(matches!(
            entries(&[]),
            Err(ArchiveError::Decode { .. })
        ));
    }
}
