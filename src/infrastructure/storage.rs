use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::domain::error::{AppError, Result};

fn io_err(msg: impl Into<String>) -> AppError {
    AppError::IoError(msg.into())
}

pub fn ensure_data_dir(data_dir: &Path) -> std::io::Result<PathBuf> {
    ensure_dir(data_dir)?;
    Ok(data_dir.to_path_buf())
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Replaces `path` with `bytes` through a temp file and rename, so readers
/// never observe a half-written table.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)
            .map_err(|e| io_err(format!("Failed to create dir {}: {e}", parent.display())))?;
    }

    let tmp_path = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
    {
        let mut file = File::create(&tmp_path).map_err(|e| {
            io_err(format!(
                "Failed to create temp file {}: {e}",
                tmp_path.display()
            ))
        })?;
        file.write_all(bytes).map_err(|e| {
            io_err(format!(
                "Failed to write temp file {}: {e}",
                tmp_path.display()
            ))
        })?;
        file.sync_all().ok();
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_err(format!(
            "Failed to rename temp file {} to {}: {e}",
            tmp_path.display(),
            path.display()
        ))
    })
}

/// Creates `<prefix><stamp>.<ext>` in `dir`, adding `_<n>` when a file with
/// that name already exists. Returns the open file and its path.
pub fn create_stamped_file(dir: &Path, prefix: &str, stamp: &str, ext: &str) -> Result<(File, PathBuf)> {
    ensure_dir(dir).map_err(|e| io_err(format!("Failed to create dir {}: {e}", dir.display())))?;

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{prefix}{stamp}.{ext}")
        } else {
            format!("{prefix}{stamp}_{attempt}.{ext}")
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => {
                return Err(io_err(format!(
                    "Failed to create {}: {e}",
                    path.display()
                )))
            }
        }
    }
}

/// Newest file named `<prefix><stamp>[_<n>].<ext>` in `dir`. Stamps must
/// start with a digit, so `TestCases_` does not pick up `TestCases_Upload_...`.
pub fn latest_stamped_file(dir: &Path, prefix: &str, ext: &str) -> Result<Option<PathBuf>> {
    if !dir.exists() {
        return Ok(None);
    }
    let entries = fs::read_dir(dir)
        .map_err(|e| io_err(format!("Failed to list {}: {e}", dir.display())))?;

    let suffix = format!(".{ext}");
    let mut best: Option<((String, u32), PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(format!("Failed to list {}: {e}", dir.display())))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(key) = stamp_sort_key(&name, prefix, &suffix) else {
            continue;
        };
        let newer = best.as_ref().map(|(best_key, _)| key > *best_key).unwrap_or(true);
        if newer {
            best = Some((key, entry.path()));
        }
    }
    Ok(best.map(|(_, path)| path))
}

fn stamp_sort_key(name: &str, prefix: &str, suffix: &str) -> Option<(String, u32)> {
    let rest = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
    if !rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    match rest.rsplit_once('_') {
        Some((stamp, n)) => Some((stamp.to_string(), n.parse().ok()?)),
        None => Some((rest.to_string(), 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamped_files_get_suffix_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let (_, first) = create_stamped_file(dir.path(), "TestCases_", "2026-01-01T00-00-00-000Z", "csv").unwrap();
        let (_, second) = create_stamped_file(dir.path(), "TestCases_", "2026-01-01T00-00-00-000Z", "csv").unwrap();
        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("Z_1.csv"));
        assert_eq!(
            latest_stamped_file(dir.path(), "TestCases_", "csv").unwrap(),
            Some(second)
        );
    }

    #[test]
    fn latest_skips_other_prefixes_sharing_a_stem() {
        let dir = tempfile::tempdir().unwrap();
        create_stamped_file(dir.path(), "TestCases_", "2026-01-01T00-00-00-000Z", "csv").unwrap();
        create_stamped_file(dir.path(), "TestCases_Upload_", "2026-02-01T00-00-00-000Z", "csv").unwrap();
        fs::write(dir.path().join("TestCases.csv"), "x").unwrap();

        let latest = latest_stamped_file(dir.path(), "TestCases_", "csv").unwrap().unwrap();
        assert!(latest
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("TestCases_2026-01-01"));
    }

    #[test]
    fn latest_is_none_for_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(latest_stamped_file(&missing, "X_", "csv").unwrap(), None);
    }

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("UserStory.csv");
        atomic_write_bytes(&path, b"one").unwrap();
        atomic_write_bytes(&path, b"two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
