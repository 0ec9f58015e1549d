use crate::error::{CollectorError, Result};
use crate::models::DownloadState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CHECKPOINT_FILE: &str = "status";

/// On-disk checkpoint, tagged with its schema version.
#[derive(Deserialize)]
#[serde(tag = "version")]
enum CheckpointRecord {
    #[serde(rename = "1")]
    V1(DownloadState),
}

#[derive(Serialize)]
#[serde(tag = "version")]
enum CheckpointRecordRef<'a> {
    #[serde(rename = "1")]
    V1(&'a DownloadState),
}

pub struct StateManager {
    state_file: PathBuf,
}

impl StateManager {
    pub fn new(storage_dir: &Path) -> Self {
        let state_file = storage_dir.join(CHECKPOINT_FILE);
        Self { state_file }
    }

    pub fn path(&self) -> &Path {
        &self.state_file
    }

    pub fn exists(&self) -> bool {
        self.state_file.is_file()
    }

    /// Loads the checkpoint, or `None` when there is none yet.
    pub fn load_state(&self) -> Result<Option<DownloadState>> {
        if !self.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&self.state_file).map_err(CollectorError::storage(&self.state_file))?;

        let record: CheckpointRecord =
            serde_json::from_str(&content).map_err(|source| CollectorError::Checkpoint {
                path: self.state_file.clone(),
                source,
            })?;

        match record {
            CheckpointRecord::V1(state) => Ok(Some(state)),
        }
    }

    /// Writes the checkpoint through a temporary file so a crash never leaves
    /// a truncated one behind.
    pub fn save_state(&self, state: &DownloadState) -> Result<()> {
        let content = serde_json::to_string_pretty(&CheckpointRecordRef::V1(state)).map_err(
            |source| CollectorError::Checkpoint {
                path: self.state_file.clone(),
                source,
            },
        )?;

        let tmp = self.state_file.with_extension("tmp");
        fs::write(&tmp, content).map_err(CollectorError::storage(&tmp))?;
        fs::rename(&tmp, &self.state_file).map_err(CollectorError::storage(&self.state_file))?;

        Ok(())
    }

    pub fn clear_state(&self) -> Result<()> {
        if self.exists() {
            fs::remove_file(&self.state_file).map_err(CollectorError::storage(&self.state_file))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CollectStatus;
    use tempfile::TempDir;

    #[test]
    fn missing_checkpoint_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let manager = StateManager::new(dir.path());

        assert!(manager.load_state().unwrap().is_none());
    }

    #[test]
    fn saved_state_loads_back_equal() {
        let dir = TempDir::new().unwrap();
        let manager = StateManager::new(dir.path());

        let state = DownloadState {
            pending_image_links: vec!["http://x/a.jpg".into(), "http://x/b.jpg".into()],
            broken_image_links: vec!["http://x/c.jpg".into()],
            current_post_index: 7,
            total_post_count: Some(12),
            last_seen_post_id: Some(123456789012),
            last_status: Some(200),
            collect_status: CollectStatus::Collecting,
        };

        manager.save_state(&state).unwrap();

        assert!(dir.path().join("status").is_file());
        assert!(!dir.path().join("status.tmp").exists());
        assert_eq!(manager.load_state().unwrap(), Some(state));
    }

    #[test]
    fn checkpoint_carries_schema_version() {
        let dir = TempDir::new().unwrap();
        let manager = StateManager::new(dir.path());
        manager.save_state(&DownloadState::new()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(manager.path()).unwrap()).unwrap();

        assert_eq!(raw["version"], "1");
        assert_eq!(raw["collect_status"], "collecting");
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let manager = StateManager::new(dir.path());
        fs::write(manager.path(), r#"{"version": "99", "current_post_index": 1}"#).unwrap();

        let err = manager.load_state().unwrap_err();
        assert!(matches!(err, CollectorError::Checkpoint { .. }));
    }

    #[test]
    fn clear_removes_checkpoint_and_tolerates_absence() {
        let dir = TempDir::new().unwrap();
        let manager = StateManager::new(dir.path());
        manager.save_state(&DownloadState::new()).unwrap();

        manager.clear_state().unwrap();
        assert!(!manager.exists());

        manager.clear_state().unwrap();
    }
}
