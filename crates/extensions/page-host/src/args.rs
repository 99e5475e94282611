//! Positional capability arguments.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use pagehands_protocols::settings::merge_partial;
use pagehands_protocols::CapabilityError;

use crate::capability::Capability;

/// Ordered arguments for one capability call.
///
/// A payload that is not an array is normalized: `null` means no arguments
/// and any other value is a single argument.
#[derive(Debug, Clone)]
pub struct CapabilityArgs {
    capability: Capability,
    values: Vec<Value>,
}

impl CapabilityArgs {
    pub fn from_payload(capability: Capability, payload: Value) -> Self {
        let values = match payload {
            Value::Null => Vec::new(),
            Value::Array(values) => values,
            other => vec![other],
        };
        Self { capability, values }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn invalid(&self, message: impl Into<String>) -> CapabilityError {
        CapabilityError::InvalidArguments {
            capability: self.capability.to_string(),
            message: message.into(),
        }
    }

    fn present(&self, index: usize) -> Option<&Value> {
        self.values.get(index).filter(|v| !v.is_null())
    }

    /// Required string argument.
    pub fn string(&self, index: usize) -> Result<String, CapabilityError> {
        match self.present(index) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.invalid(format!(
                "argument {} must be a string, got {}",
                index, other
            ))),
            None => Err(self.invalid(format!("missing argument {}", index))),
        }
    }

    /// Optional string argument; absent or `null` yields `None`.
    pub fn optional_string(&self, index: usize) -> Result<Option<String>, CapabilityError> {
        match self.present(index) {
            None => Ok(None),
            Some(_) => self.string(index).map(Some),
        }
    }

    /// Options object layered over `base`, key by key.
    pub fn options_over<T>(&self, index: usize, base: &T) -> Result<T, CapabilityError>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut merged = serde_json::to_value(base).map_err(|e| self.invalid(e.to_string()))?;
        if let Some(options) = self.present(index) {
            merge_partial(&mut merged, options.clone()).map_err(|e| self.invalid(e.to_string()))?;
        }
        serde_json::from_value(merged).map_err(|e| self.invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagehands_dom::ElementHighlightOptions;
    use serde_json::json;

    #[test]
    fn test_normalization() {
        let cap = Capability::HighlightText;
        assert!(CapabilityArgs::from_payload(cap, Value::Null).is_empty());
        assert_eq!(CapabilityArgs::from_payload(cap, json!("x")).len(), 1);
        assert_eq!(CapabilityArgs::from_payload(cap, json!(["x", {}])).len(), 2);
        assert_eq!(CapabilityArgs::from_payload(cap, json!({"a": 1})).len(), 1);
    }

    #[test]
    fn test_string_errors() {
        let args = CapabilityArgs::from_payload(Capability::ScrollToElement, json!([5]));
        let err = args.string(0).unwrap_err();
        assert!(err.to_string().contains("scrollToElement"));
        assert!(args.string(1).is_err());
        assert_eq!(args.optional_string(1).unwrap(), None);
    }

    #[test]
    fn test_options_over_defaults() {
        let args = CapabilityArgs::from_payload(
            Capability::HighlightElement,
            json!(["#a", {"duration": 0}]),
        );
        let options = args
            .options_over(1, &ElementHighlightOptions::default())
            .unwrap();
        assert_eq!(options.duration, 0);
        assert_eq!(options.border, "2px solid #ff0000");

        let args = CapabilityArgs::from_payload(Capability::HighlightElement, json!(["#a", 7]));
        assert!(args.options_over(1, &ElementHighlightOptions::default()).is_err());
    }
}
