use crate::error::{PlanscopeError, Result};
use crate::types::record::Record;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

struct CachedDataset {
    modified: SystemTime,
    records: Arc<Vec<Record>>,
}

/// Cleaned datasets keyed by path, invalidated when the file's mtime changes.
#[derive(Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, CachedDataset>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, path: &Path, delimiter: char) -> Result<Arc<Vec<Record>>> {
        if !path.exists() {
            self.entries.remove(path);
            return Err(PlanscopeError::SourceNotFound(path.display().to_string()));
        }
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| PlanscopeError::ReadFailure {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if let Some(entry) = self.entries.get(path) {
            if entry.modified == modified {
                tracing::debug!(path = %path.display(), "dataset cache hit");
                return Ok(Arc::clone(&entry.records));
            }
            tracing::debug!(path = %path.display(), "dataset changed on disk, reloading");
        }

        let records = Arc::new(super::load_processed(path, delimiter)?);
        self.entries.insert(
            path.to_path_buf(),
            CachedDataset {
                modified,
                records: Arc::clone(&records),
            },
        );
        Ok(records)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::write_processed;
    use std::time::Duration;
    use tempfile::TempDir;

    fn record(track: &str) -> Record {
        Record {
            track: track.to_string(),
            market_score: 70.0,
            tech_score: 80.0,
            team_score: 90.0,
            award_tier: "一等奖".to_string(),
            project_name: "demo".to_string(),
            keywords: vec![],
        }
    }

    #[test]
    fn second_load_returns_shared_snapshot() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("clean.csv");
        write_processed(&path, &[record("AI")], '、').expect("table should write");

        let mut cache = DatasetCache::new();
        let first = cache.load(&path, '、').expect("first load should succeed");
        let second = cache.load(&path, '、').expect("second load should succeed");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn changed_mtime_invalidates_entry() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("clean.csv");
        write_processed(&path, &[record("AI")], '、').expect("table should write");

        let mut cache = DatasetCache::new();
        let first = cache.load(&path, '、').expect("first load should succeed");

        write_processed(&path, &[record("AI"), record("区块链")], '、')
            .expect("table should rewrite");
        let later = SystemTime::now() + Duration::from_secs(5);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .and_then(|file| file.set_modified(later))
            .expect("mtime should update");

        let second = cache.load(&path, '、').expect("reload should succeed");
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let dir = TempDir::new().expect("temp dir should be created");
        let mut cache = DatasetCache::new();
        let result = cache.load(&dir.path().join("absent.csv"), '、');
        assert!(matches!(result, Err(PlanscopeError::SourceNotFound(_))));
    }
}
