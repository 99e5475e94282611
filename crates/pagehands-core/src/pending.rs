//! Outstanding request bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use pagehands_protocols::{DeliveryError, ResponseEnvelope, RouterError};

type Outcome = Result<ResponseEnvelope, DeliveryError>;

/// Waiters keyed by correlation id.
#[derive(Clone, Default)]
pub(crate) struct PendingTable {
    waiters: Arc<Mutex<HashMap<String, oneshot::Sender<Outcome>>>>,
}

impl PendingTable {
    /// Register a waiter under a fresh correlation id.
    ///
    /// The id is unique among the waiters outstanding at this moment.
    pub fn register(&self) -> (String, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let mut waiters = self.waiters.lock();
        let mut id = Uuid::new_v4().to_string();
        while waiters.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }
        waiters.insert(id.clone(), tx);
        (id, rx)
    }

    /// Resolve the waiter for this response and forget it.
    ///
    /// Returns false when no waiter is outstanding for the id.
    pub fn resolve(&self, response: ResponseEnvelope) -> bool {
        let waiter = self.waiters.lock().remove(&response.correlation_id);
        match waiter {
            Some(tx) => {
                // The caller may have stopped listening; that is not an error.
                let _ = tx.send(Ok(response));
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &str) -> bool {
        self.waiters.lock().remove(id).is_some()
    }

    /// Fail every outstanding waiter.
    pub fn fail_all(&self, error: DeliveryError) -> usize {
        let drained: Vec<_> = self.waiters.lock().drain().collect();
        let count = drained.len();
        for (_, tx) in drained {
            let _ = tx.send(Err(error.clone()));
        }
        count
    }

    pub fn len(&self) -> usize {
        self.waiters.lock().len()
    }
}

/// Handle to a request awaiting its correlated response.
///
/// Dropping the handle without waiting forgets the request; a late response
/// is then logged and discarded.
pub struct PendingReply {
    correlation_id: String,
    action: String,
    rx: Option<oneshot::Receiver<Outcome>>,
    table: PendingTable,
    timeout: Duration,
}

impl PendingReply {
    pub(crate) fn new(
        correlation_id: String,
        action: String,
        rx: oneshot::Receiver<Outcome>,
        table: PendingTable,
        timeout: Duration,
    ) -> Self {
        Self {
            correlation_id,
            action,
            rx: Some(rx),
            table,
            timeout,
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Wait for the response, bounded by the router's request timeout.
    pub async fn wait(mut self) -> Result<Value, RouterError> {
        let Some(rx) = self.rx.take() else {
            return Err(DeliveryError::ContextClosed.into());
        };

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(Ok(response))) => {
                if response.success {
                    Ok(response.data.unwrap_or(Value::Null))
                } else {
                    Err(RouterError::Remote {
                        action: self.action.clone(),
                        message: response.error.unwrap_or_default(),
                    })
                }
            }
            Ok(Ok(Err(delivery))) => Err(delivery.into()),
            Ok(Err(_)) => Err(DeliveryError::ContextClosed.into()),
            Err(_) => {
                debug!(
                    "Request {} ({}) timed out after {:?}",
                    self.correlation_id, self.action, self.timeout
                );
                Err(DeliveryError::TimedOut {
                    action: self.action.clone(),
                    timeout_ms: self.timeout.as_millis() as u64,
                }
                .into())
            }
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        self.table.remove(&self.correlation_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(table: &PendingTable, timeout: Duration) -> PendingReply {
        let (id, rx) = table.register();
        PendingReply::new(id, "act".to_string(), rx, table.clone(), timeout)
    }

    #[test]
    fn test_register_unique_ids() {
        let table = PendingTable::default();
        let (a, _rx_a) = table.register();
        let (b, _rx_b) = table.register();
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_resolve_once() {
        let table = PendingTable::default();
        let (id, _rx) = table.register();
        assert!(table.resolve(ResponseEnvelope::ok(id.clone(), json!(1))));
        assert!(!table.resolve(ResponseEnvelope::ok(id, json!(2))));
        assert_eq!(table.len(), 0);
    }

    #[tokio::test]
    async fn test_wait_success() {
        let table = PendingTable::default();
        let pending = reply(&table, Duration::from_secs(1));
        table.resolve(ResponseEnvelope::ok(pending.correlation_id(), json!({"ok": true})));
        assert_eq!(pending.wait().await.unwrap(), json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_wait_remote_failure() {
        let table = PendingTable::default();
        let pending = reply(&table, Duration::from_secs(1));
        table.resolve(ResponseEnvelope::err(pending.correlation_id(), "boom"));
        let err = pending.wait().await.unwrap_err();
        assert!(matches!(err, RouterError::Remote { ref message, .. } if message == "boom"));
    }

    #[tokio::test]
    async fn test_wait_timeout_removes_waiter() {
        let table = PendingTable::default();
        let pending = reply(&table, Duration::from_millis(20));
        let err = pending.wait().await.unwrap_err();
        assert!(matches!(
            err,
            RouterError::Delivery(DeliveryError::TimedOut { timeout_ms: 20, .. })
        ));
        assert_eq!(table.len(), 0);
    }

    #[tokio::test]
    async fn test_fail_all() {
        let table = PendingTable::default();
        let pending = reply(&table, Duration::from_secs(1));
        assert_eq!(table.fail_all(DeliveryError::ContextClosed), 1);
        let err = pending.wait().await.unwrap_err();
        assert!(matches!(err, RouterError::Delivery(DeliveryError::ContextClosed)));
    }

    #[test]
    fn test_drop_removes_waiter() {
        let table = PendingTable::default();
        let pending = reply(&table, Duration::from_secs(1));
        assert_eq!(table.len(), 1);
        drop(pending);
        assert_eq!(table.len(), 0);
    }
}
