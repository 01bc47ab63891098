//! Backups of the durable document, taken before every full replacement.
//!
//! A backup is a byte-for-byte copy of the document as it was on disk,
//! named `data_<YYYYMMDD_HHMMSS>.json` after the local time it was taken.
//! Two backups within the same second share a name; the later one wins.
//! Backup contents are never read back here.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::StorageError;

/// `strftime` pattern of the timestamp embedded in backup names.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const BACKUP_PREFIX: &str = "data_";
const BACKUP_SUFFIX: &str = ".json";

/// Source of backup timestamps.
pub type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Writes timestamped document backups into one directory.
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    clock: Clock,
}

impl BackupManager {
    /// Creates a manager writing into `dir`, stamped with local time.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        BackupManager {
            dir: dir.into(),
            clock: local_now,
        }
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name of a backup taken at `at`.
    pub fn backup_name(at: NaiveDateTime) -> String {
        format!(
            "{}{}{}",
            BACKUP_PREFIX,
            at.format(BACKUP_TIMESTAMP_FORMAT),
            BACKUP_SUFFIX
        )
    }

    /// Copies `current` (the document's raw bytes, if it exists) into a new
    /// backup. Returns the backup path, or `None` when there was nothing to
    /// back up.
    pub fn backup_before_overwrite(
        &self,
        current: Option<&[u8]>,
    ) -> Result<Option<PathBuf>, StorageError> {
        let Some(bytes) = current else {
            tracing::debug!("no existing document, skipping backup");
            return Ok(None);
        };

        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        let path = self.dir.join(Self::backup_name((self.clock)()));
        fs::write(&path, bytes).map_err(|e| StorageError::io(&path, e))?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "backed up document");
        Ok(Some(path))
    }

    /// Names of existing backups, oldest first.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.dir, e))?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(7, 5, 1))
            .unwrap()
    }

    fn later() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 30)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .unwrap()
    }

    #[test]
    fn test_backup_name_format() {
        assert_eq!(BackupManager::backup_name(fixed()), "data_20240309_070501.json");
    }

    #[test]
    fn test_no_document_no_backup() {
        let dir = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(dir.path().join("backups"));
        assert!(manager.backup_before_overwrite(None).unwrap().is_none());
        assert!(!dir.path().join("backups").exists());
        assert!(manager.list().unwrap().is_empty());
    }

    #[test]
    fn test_backup_is_verbatim_copy() {
        let dir = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(dir.path().join("backups")).with_clock(fixed);
        let raw = b"{\"nodes\":[],   \"links\":[]}\n";
        let path = manager.backup_before_overwrite(Some(raw)).unwrap().unwrap();
        assert_eq!(path, dir.path().join("backups/data_20240309_070501.json"));
        assert_eq!(fs::read(&path).unwrap(), raw);
    }

    #[test]
    fn test_same_second_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(dir.path()).with_clock(fixed);
        manager.backup_before_overwrite(Some(b"first")).unwrap();
        let path = manager.backup_before_overwrite(Some(b"second")).unwrap().unwrap();
        assert_eq!(fs::read(path).unwrap(), b"second");
        assert_eq!(manager.list().unwrap().len(), 1);
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        BackupManager::new(dir.path())
            .with_clock(later)
            .backup_before_overwrite(Some(b"b"))
            .unwrap();
        BackupManager::new(dir.path())
            .with_clock(fixed)
            .backup_before_overwrite(Some(b"a"))
            .unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        assert_eq!(
            BackupManager::new(dir.path()).list().unwrap(),
            vec!["data_20240309_070501.json", "data_20241130_235959.json"]
        );
    }
}
