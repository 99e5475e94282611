//! External settings storage.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SettingsError;

/// Asynchronous key-value settings store.
///
/// No transactional guarantees: a write from one context becomes visible to
/// another only on a later read.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the whole settings object.
    async fn get_settings(&self) -> Result<Value, SettingsError>;

    /// Merge `partial` (a JSON object) into the stored settings.
    async fn set_settings(&self, partial: Value) -> Result<(), SettingsError>;

    /// Replace the stored settings entirely.
    async fn replace_settings(&self, settings: Value) -> Result<(), SettingsError>;
}

/// Merge the keys of `partial` into `target`, key by key.
///
/// Both values must be JSON objects.
pub fn merge_partial(target: &mut Value, partial: Value) -> Result<(), SettingsError> {
    let Value::Object(updates) = partial else {
        return Err(SettingsError::InvalidPartial(
            "settings update must be an object".to_string(),
        ));
    };
    if !target.is_object() {
        *target = Value::Object(Default::default());
    }
    if let Value::Object(map) = target {
        for (key, value) in updates {
            map.insert(key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_partial_overwrites_and_keeps() {
        let mut target = json!({"theme": "light", "enabled": true});
        merge_partial(&mut target, json!({"theme": "dark", "extra": 1})).unwrap();
        assert_eq!(target, json!({"theme": "dark", "enabled": true, "extra": 1}));
    }

    #[test]
    fn test_merge_partial_rejects_non_object() {
        let mut target = json!({});
        assert!(merge_partial(&mut target, json!([1, 2])).is_err());
    }

    #[test]
    fn test_merge_partial_into_null() {
        let mut target = Value::Null;
        merge_partial(&mut target, json!({"a": 1})).unwrap();
        assert_eq!(target, json!({"a": 1}));
    }
}
