//! Archive backups of the previous artifact.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::info;

/// Copies the previous artifact into a dated `Archive/` location before it
/// is overwritten.
#[derive(Debug, Clone)]
pub struct ArchiveManager {
    timestamp: NaiveDateTime,
}

impl ArchiveManager {
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self { timestamp }
    }

    /// Back up an artifact to `Archive/<stem>_Archived_<timestamp>` next to
    /// it. Returns the backup path, or `None` when there is nothing to back
    /// up yet.
    pub fn back_up(&self, artifact: &Path) -> Result<Option<PathBuf>> {
        if !artifact.exists() {
            return Ok(None);
        }
        let parent = artifact.parent().unwrap_or_else(|| Path::new("."));
        let archive_dir = parent.join("Archive");
        if !archive_dir.exists() {
            info!(dir = %archive_dir.display(), "creating archive directory");
            fs::create_dir_all(&archive_dir)
                .with_context(|| format!("create archive dir {}", archive_dir.display()))?;
        }

        let stem = artifact
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("artifact");
        let stamp = self.timestamp.format("%m%d%Y_%H%M%S");
        let backup = archive_dir.join(format!("{stem}_Archived_{stamp}"));
        copy_recursively(artifact, &backup)
            .with_context(|| format!("back up {} to {}", artifact.display(), backup.display()))?;
        info!(backup = %backup.display(), "previous artifact backed up");
        Ok(Some(backup))
    }
}

fn copy_recursively(from: &Path, to: &Path) -> Result<()> {
    if from.is_file() {
        fs::copy(from, to)?;
        return Ok(());
    }
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        copy_recursively(&entry.path(), &target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn missing_artifact_backs_up_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ArchiveManager::new(timestamp());
        let backup = manager.back_up(&dir.path().join("absent")).unwrap();
        assert!(backup.is_none());
    }

    #[test]
    fn artifact_directory_is_copied_into_archive() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("processed");
        fs::create_dir(&artifact).unwrap();
        fs::write(artifact.join("sheet.csv"), "a,b\n1,2\n").unwrap();

        let manager = ArchiveManager::new(timestamp());
        let backup = manager.back_up(&artifact).unwrap().unwrap();
        assert!(backup.starts_with(dir.path().join("Archive")));
        assert!(backup.join("sheet.csv").is_file());
        // The original is untouched.
        assert!(artifact.join("sheet.csv").is_file());
    }
}
