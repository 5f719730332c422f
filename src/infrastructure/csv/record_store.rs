//! Cumulative CSV tables plus one timestamped snapshot per write.

use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info};

use super::csv_parser::CsvParser;
use super::csv_writer::{render_table, write_rows};
use crate::domain::clock::{file_timestamp, Clock};
use crate::domain::error::{AppError, Result};
use crate::domain::record::{FieldMap, RecordKind};
use crate::domain::user_story::normalize_story_text;
use crate::infrastructure::storage::{atomic_write_bytes, create_stamped_file, latest_stamped_file};

const STORY_TEXT_COLUMN: &str = "User Story";

/// Where one `append` call landed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreReceipt {
    pub main_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub inserted: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub path: PathBuf,
    pub records: Vec<FieldMap>,
}

/// Tabular persistence keyed by record kind.
pub trait RecordStore: Send + Sync {
    /// Adds `records` to the kind's main table and writes them as a new
    /// snapshot. De-duplicating kinds skip rows whose story text is already
    /// present (trimmed, case-insensitive).
    fn append(&self, kind: RecordKind, records: &[FieldMap]) -> Result<StoreReceipt>;

    /// Main-table rows in insertion order; empty when the table does not exist.
    fn read_all(&self, kind: RecordKind) -> Result<Vec<FieldMap>>;

    fn read_latest_snapshot(&self, kind: RecordKind) -> Result<Option<Snapshot>>;

    /// Writes a free-form document as `<prefix><stamp>.<ext>`.
    fn write_document(&self, prefix: &str, stamp: &str, ext: &str, contents: &str)
        -> Result<PathBuf>;
}

pub struct CsvRecordStore {
    data_dir: PathBuf,
    clock: Arc<dyn Clock>,
    /// One lock per main table; kinds sharing a table share the lock.
    locks: HashMap<&'static str, Mutex<()>>,
}

impl CsvRecordStore {
    pub fn new(data_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        let locks = RecordKind::ALL
            .iter()
            .map(|kind| (kind.main_table(), Mutex::new(())))
            .collect();
        Self {
            data_dir: data_dir.into(),
            clock,
            locks,
        }
    }

    pub fn main_path(&self, kind: RecordKind) -> PathBuf {
        self.data_dir.join(format!("{}.csv", kind.main_table()))
    }

    fn lock(&self, kind: RecordKind) -> Result<MutexGuard<'_, ()>> {
        let lock = self.locks.get(kind.main_table()).ok_or_else(|| {
            AppError::Internal(format!("No table lock registered for {}", kind))
        })?;
        // A panic mid-write leaves nothing half-applied: rewrites are atomic.
        Ok(lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    fn read_table(path: &Path) -> Result<Vec<FieldMap>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        CsvParser::new().with_trim(false).parse_file(path)
    }

    fn rewrite_deduplicated(
        &self,
        kind: RecordKind,
        main_path: &Path,
        records: &[FieldMap],
    ) -> Result<(usize, usize)> {
        let mut existing = Self::read_table(main_path)?;
        debug!(
            table = %main_path.display(),
            existing = existing.len(),
            "Loaded main table for de-duplication"
        );

        let mut seen: HashSet<String> = existing
            .iter()
            .filter_map(|row| row.get(STORY_TEXT_COLUMN))
            .map(|text| normalize_story_text(text))
            .collect();

        let mut inserted = 0;
        let mut duplicates = 0;
        for record in records {
            let key = record
                .get(STORY_TEXT_COLUMN)
                .map(|text| normalize_story_text(text))
                .unwrap_or_default();
            if seen.insert(key) {
                existing.push(record.clone());
                inserted += 1;
            } else {
                duplicates += 1;
            }
        }

        if inserted > 0 {
            let bytes = render_table(kind.columns(), &existing)?;
            atomic_write_bytes(main_path, &bytes)?;
        }
        Ok((inserted, duplicates))
    }

    fn append_rows(kind: RecordKind, main_path: &Path, records: &[FieldMap]) -> Result<usize> {
        let is_new = !main_path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(main_path)
            .map_err(|e| {
                AppError::IoError(format!("Failed to open {}: {}", main_path.display(), e))
            })?;
        write_rows(file, kind.columns(), records, is_new)?;
        Ok(records.len())
    }
}

impl RecordStore for CsvRecordStore {
    fn append(&self, kind: RecordKind, records: &[FieldMap]) -> Result<StoreReceipt> {
        let stamp = file_timestamp(&self.clock.now());
        let main_path = self.main_path(kind);

        // The snapshot is written under the same lock that readers take, so a
        // reader never picks up a snapshot that is still being filled.
        let (inserted, duplicates, snapshot_path) = {
            let _guard = self.lock(kind)?;
            std::fs::create_dir_all(&self.data_dir).map_err(|e| {
                AppError::IoError(format!(
                    "Failed to create data dir {}: {}",
                    self.data_dir.display(),
                    e
                ))
            })?;
            let (inserted, duplicates) = if kind.deduplicates() {
                self.rewrite_deduplicated(kind, &main_path, records)?
            } else {
                (Self::append_rows(kind, &main_path, records)?, 0)
            };

            let (file, snapshot_path) =
                create_stamped_file(&self.data_dir, kind.snapshot_prefix(), &stamp, "csv")?;
            write_rows(file, kind.columns(), records, true)?;
            (inserted, duplicates, snapshot_path)
        };

        info!(
            kind = %kind,
            inserted,
            duplicates,
            snapshot = %snapshot_path.display(),
            "Records persisted"
        );

        Ok(StoreReceipt {
            main_path,
            snapshot_path,
            inserted,
            duplicates,
        })
    }

    fn read_all(&self, kind: RecordKind) -> Result<Vec<FieldMap>> {
        let _guard = self.lock(kind)?;
        Self::read_table(&self.main_path(kind))
    }

    fn read_latest_snapshot(&self, kind: RecordKind) -> Result<Option<Snapshot>> {
        let _guard = self.lock(kind)?;
        let Some(path) = latest_stamped_file(&self.data_dir, kind.snapshot_prefix(), "csv")? else {
            return Ok(None);
        };
        let records = Self::read_table(&path)?;
        Ok(Some(Snapshot { path, records }))
    }

    fn write_document(
        &self,
        prefix: &str,
        stamp: &str,
        ext: &str,
        contents: &str,
    ) -> Result<PathBuf> {
        let (mut file, path) = create_stamped_file(&self.data_dir, prefix, stamp, ext)?;
        std::io::Write::write_all(&mut file, contents.as_bytes())
            .map_err(|e| AppError::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::{FixedClock, SystemClock};
    use chrono::TimeZone;

    fn story_row(id: &str, text: &str) -> FieldMap {
        let mut row = FieldMap::new();
        row.insert("ID".into(), id.into());
        row.insert("User Story".into(), text.into());
        row.insert("Category".into(), "General".into());
        row
    }

    fn fixed_store(dir: &Path) -> CsvRecordStore {
        let instant = chrono::Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        CsvRecordStore::new(dir, Arc::new(FixedClock::new(instant)))
    }

    #[test]
    fn duplicate_story_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = fixed_store(dir.path());

        let first = store
            .append(RecordKind::UserStory, &[story_row("1", "As a user I want to login")])
            .unwrap();
        assert_eq!((first.inserted, first.duplicates), (1, 0));

        let second = store
            .append(RecordKind::UserStory, &[story_row("2", "  AS A USER I WANT TO LOGIN ")])
            .unwrap();
        assert_eq!((second.inserted, second.duplicates), (0, 1));
        assert_ne!(first.snapshot_path, second.snapshot_path);

        let rows = store.read_all(RecordKind::UserStory).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["ID"], "1");
        assert_eq!(rows[0]["Source"], "");
    }

    #[test]
    fn uploaded_stories_share_the_main_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = fixed_store(dir.path());
        store
            .append(RecordKind::UserStory, &[story_row("1", "first story text")])
            .unwrap();
        let receipt = store
            .append(RecordKind::UploadedUserStory, &[story_row("2", "second story text")])
            .unwrap();

        assert!(receipt
            .snapshot_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("UserStory_Upload_"));
        assert_eq!(store.read_all(RecordKind::UserStory).unwrap().len(), 2);
    }

    #[test]
    fn plain_kinds_append_without_repeating_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = fixed_store(dir.path());
        let mut row = FieldMap::new();
        row.insert("Test Case ID".into(), "TC_GEN_001".into());
        row.insert("Test Steps".into(), "Open | Click | Verify".into());

        store.append(RecordKind::TestCase, &[row.clone()]).unwrap();
        store.append(RecordKind::TestCase, &[row]).unwrap();

        let rows = store.read_all(RecordKind::TestCase).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Test Steps"], "Open | Click | Verify");

        let latest = store.read_latest_snapshot(RecordKind::TestCase).unwrap().unwrap();
        assert_eq!(latest.records.len(), 1);
        assert!(latest.path.to_string_lossy().ends_with("_1.csv"));
    }

    #[test]
    fn missing_tables_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = fixed_store(&dir.path().join("not-yet-created"));
        assert!(store.read_all(RecordKind::UserStory).unwrap().is_empty());
        assert!(store.read_latest_snapshot(RecordKind::DetailedSteps).unwrap().is_none());
    }

    #[test]
    fn concurrent_distinct_appends_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvRecordStore::new(dir.path(), Arc::new(SystemClock::new()));
        let writers = 16;

        std::thread::scope(|scope| {
            for n in 0..writers {
                let store = &store;
                scope.spawn(move || {
                    store
                        .append(
                            RecordKind::UserStory,
                            &[story_row(&n.to_string(), &format!("distinct story number {n}"))],
                        )
                        .unwrap();
                });
            }
        });

        let rows = store.read_all(RecordKind::UserStory).unwrap();
        assert_eq!(rows.len(), writers);
    }

    #[test]
    fn latest_snapshot_is_never_read_half_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = fixed_store(dir.path());
        let batch: Vec<FieldMap> = (0..50)
            .map(|n| {
                let mut row = FieldMap::new();
                row.insert("Test Case ID".into(), format!("TC_STEP_{n:03}"));
                row.insert("Test Case Name".into(), format!("Case {n}"));
                row
            })
            .collect();

        std::thread::scope(|scope| {
            let store = &store;
            let batch = &batch;
            scope.spawn(move || {
                for _ in 0..20 {
                    store.append(RecordKind::DetailedSteps, batch).unwrap();
                }
            });
            scope.spawn(move || {
                for _ in 0..200 {
                    if let Some(snapshot) =
                        store.read_latest_snapshot(RecordKind::DetailedSteps).unwrap()
                    {
                        assert_eq!(snapshot.records.len(), batch.len());
                    }
                }
            });
        });

        let latest = store.read_latest_snapshot(RecordKind::DetailedSteps).unwrap().unwrap();
        assert_eq!(latest.records.len(), 50);
    }

    #[test]
    fn documents_are_written_under_given_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = fixed_store(dir.path());
        let path = store
            .write_document("AutomationTest_", "2026-05-01T12-00-00-000Z", "java", "class A {}")
            .unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "AutomationTest_2026-05-01T12-00-00-000Z.java"
        );
        assert_eq!(std::fs::read_to_string(path).unwrap(), "class A {}");
    }
}
