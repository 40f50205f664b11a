use std::path::{Component, Path};

use bytes::Bytes;
use tar::{Builder, EntryType, Header};

use crate::error::{ArchiveError, ArchiveResult};

/// Permission bits recorded on packed entries.
pub const ENTRY_MODE: u32 = 0o644;

/// Wrap `payload` in a tar archive whose only entry is `name`.
///
/// The entry is a regular file with mode `0644`, mtime 0, and size equal to `payload.len()`.
/// The archive is uncompressed.
///
/// # Errors
///
/// Returns [`ArchiveError::InvalidInput`] for empty, absolute, or parent-relative names, and
/// [`ArchiveError::Build`] if the in-memory writer fails.
pub fn pack(payload: &[u8], name: &str) -> ArchiveResult<Bytes> {
    validate_entry_name(name)?;

    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_mode(ENTRY_MODE);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    header.set_size(payload.len() as u64);

    let mut builder = Builder::new(Vec::with_capacity(payload.len() + 1024));
    builder
        .append_data(&mut header, name, payload)
        .map_err(|source| ArchiveError::Build {
            operation: "append_entry",
            source,
        })?;
    let buffer = builder.into_inner().map_err(|source| ArchiveError::Build {
        operation: "finish_archive",
        source,
    })?;
    Ok(Bytes::from(buffer))
}

fn validate_entry_name(name: &str) -> ArchiveResult<()> {
    if name.trim().is_empty() {
        return Err(ArchiveError::invalid_name("empty", name));
    }
    let path = Path::new(name);
    if path.is_absolute() || name.starts_with('/') || name.starts_with('\\') {
        return Err(ArchiveError::invalid_name("absolute_path", name));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(ArchiveError::invalid_name("invalid_segment", name)),
        }
    }
    Ok(())
}
