use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::models::DeviceState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file io failed: {0}")]
    Io(#[from] io::Error),
    #[error("state serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> DeviceState {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return DeviceState::default();
            }
            Err(error) => {
                tracing::warn!(path = %self.path.display(), error = %error, "failed to read state file");
                return DeviceState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), error = %error, "ignoring corrupt state file");
                DeviceState::default()
            }
        }
    }

    pub fn save(&self, state: &DeviceState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string(state)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StateStore;
    use crate::domain::models::DeviceState;
    use crate::test_support::temp_path;

    #[test]
    fn missing_file_loads_default_state() {
        let store = StateStore::new(temp_path("missing-state.json"));

        assert_eq!(store.load(), DeviceState::default());
    }

    #[test]
    fn corrupt_file_loads_default_state() {
        let path = temp_path("corrupt-state.json");
        std::fs::write(&path, "{not json").expect("fixture should be written");

        assert_eq!(StateStore::new(path).load(), DeviceState::default());
    }

    #[test]
    fn saves_and_reloads_state() {
        let store = StateStore::new(temp_path("nested/dir/state.json"));
        let state = DeviceState {
            is_on: Some(true),
            current_app: "com.netflix.ninja".to_string(),
        };

        store.save(&state).expect("save should succeed");

        assert_eq!(store.load(), state);
    }

    #[test]
    fn save_overwrites_previous_record() {
        let store = StateStore::new(temp_path("overwrite-state.json"));

        store
            .save(&DeviceState {
                is_on: Some(true),
                current_app: "org.xbmc.kodi".to_string(),
            })
            .expect("first save should succeed");
        store
            .save(&DeviceState {
                is_on: Some(false),
                current_app: String::new(),
            })
            .expect("second save should succeed");

        let content = std::fs::read_to_string(store.path()).expect("state should be readable");
        assert_eq!(content, r#"{"device_on":false,"current_app":""}"#);
    }

    #[test]
    fn reports_unwritable_location() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let store = StateStore::new(dir.path());

        assert!(store.save(&DeviceState::default()).is_err());
    }
}
