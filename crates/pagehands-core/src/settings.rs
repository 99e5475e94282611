//! Settings store implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use pagehands_protocols::settings::merge_partial;
use pagehands_protocols::{SettingsError, SettingsStore};

/// Settings kept in memory for the lifetime of the process.
pub struct MemorySettingsStore {
    value: RwLock<Value>,
}

impl MemorySettingsStore {
    pub fn new(initial: Value) -> Self {
        Self {
            value: RwLock::new(initial),
        }
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get_settings(&self) -> Result<Value, SettingsError> {
        Ok(self.value.read().clone())
    }

    async fn set_settings(&self, partial: Value) -> Result<(), SettingsError> {
        merge_partial(&mut self.value.write(), partial)
    }

    async fn replace_settings(&self, settings: Value) -> Result<(), SettingsError> {
        if !settings.is_object() {
            return Err(SettingsError::InvalidPartial(
                "settings must be an object".to_string(),
            ));
        }
        *self.value.write() = settings;
        Ok(())
    }
}

/// Settings persisted as a JSON file.
///
/// Writes go to a sibling temp file that is then renamed over the target.
pub struct FileSettingsStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Value, SettingsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(Value::Object(Map::new())),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Value::Object(Map::new())),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, value: &Value) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(value)?;
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Settings written to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get_settings(&self) -> Result<Value, SettingsError> {
        self.read().await
    }

    async fn set_settings(&self, partial: Value) -> Result<(), SettingsError> {
        let _guard = self.write_lock.lock().await;
        let mut current = self.read().await?;
        merge_partial(&mut current, partial)?;
        self.write(&current).await
    }

    async fn replace_settings(&self, settings: Value) -> Result<(), SettingsError> {
        if !settings.is_object() {
            return Err(SettingsError::InvalidPartial(
                "settings must be an object".to_string(),
            ));
        }
        let _guard = self.write_lock.lock().await;
        self.write(&settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_merge() {
        let store = MemorySettingsStore::new(json!({"enabled": true, "theme": "light"}));
        store.set_settings(json!({"theme": "dark"})).await.unwrap();
        assert_eq!(
            store.get_settings().await.unwrap(),
            json!({"enabled": true, "theme": "dark"})
        );
    }

    #[tokio::test]
    async fn test_memory_rejects_non_object() {
        let store = MemorySettingsStore::default();
        assert!(store.set_settings(json!("dark")).await.is_err());
        assert!(store.replace_settings(json!(3)).await.is_err());
    }

    #[tokio::test]
    async fn test_file_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileSettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.get_settings().await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_file_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let store = FileSettingsStore::new(&path);
        store.replace_settings(json!({"enabled": true})).await.unwrap();
        store.set_settings(json!({"autoRun": true})).await.unwrap();

        let reopened = FileSettingsStore::new(&path);
        assert_eq!(
            reopened.get_settings().await.unwrap(),
            json!({"enabled": true, "autoRun": true})
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_corrupt_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileSettingsStore::new(&path);
        assert!(matches!(
            store.get_settings().await,
            Err(SettingsError::Serialization(_))
        ));
    }
}
