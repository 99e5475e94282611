//! In-process messaging fabric.
//!
//! Each context opens a mailbox keyed by its address. Frames are carried as
//! serialized JSON text so no Rust value crosses a context boundary.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use pagehands_config::RouterConfig;
use pagehands_protocols::{ContextAddress, DeliveryError, Message, RouterError, Transport};

/// Receiving end of a context's mailbox.
pub type Mailbox = mpsc::UnboundedReceiver<String>;

/// Shared mailbox table.
#[derive(Clone)]
pub struct Fabric {
    mailboxes: Arc<DashMap<ContextAddress, mpsc::UnboundedSender<String>>>,
    max_message_bytes: usize,
}

impl Fabric {
    pub fn new(max_message_bytes: usize) -> Self {
        Self {
            mailboxes: Arc::new(DashMap::new()),
            max_message_bytes,
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.max_message_bytes)
    }

    /// Open the mailbox for `address`.
    ///
    /// Fails if a live context already holds that address.
    pub fn open(&self, address: ContextAddress) -> Result<Mailbox, RouterError> {
        if self
            .mailboxes
            .get(&address)
            .is_some_and(|tx| !tx.is_closed())
        {
            return Err(RouterError::AlreadyRegistered(address.to_string()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.mailboxes.insert(address, tx);
        debug!("Mailbox opened for {}", address);
        Ok(rx)
    }

    /// Close the mailbox for `address`; later frames to it are unreachable.
    pub fn close(&self, address: &ContextAddress) -> bool {
        let removed = self.mailboxes.remove(address).is_some();
        if removed {
            debug!("Mailbox closed for {}", address);
        }
        removed
    }

    pub fn is_open(&self, address: &ContextAddress) -> bool {
        self.mailboxes.contains_key(address)
    }

    /// Addresses with an open mailbox.
    pub fn addresses(&self) -> Vec<ContextAddress> {
        self.mailboxes.iter().map(|entry| *entry.key()).collect()
    }

    /// Deliver an already serialized frame.
    pub fn deliver(&self, to: &ContextAddress, frame: String) -> Result<(), DeliveryError> {
        if frame.len() > self.max_message_bytes {
            return Err(DeliveryError::TooLarge {
                size: frame.len(),
                limit: self.max_message_bytes,
            });
        }

        let Some(tx) = self.mailboxes.get(to).map(|entry| entry.value().clone()) else {
            return Err(DeliveryError::Unreachable(to.to_string()));
        };

        trace!("fabric -> {}: {}", to, frame);
        if tx.send(frame).is_err() {
            self.mailboxes.remove(to);
            return Err(DeliveryError::Unreachable(to.to_string()));
        }
        Ok(())
    }
}

impl Default for Fabric {
    fn default() -> Self {
        Self::from_config(&RouterConfig::default())
    }
}

#[async_trait]
impl Transport for Fabric {
    async fn transmit(&self, to: &ContextAddress, message: &Message) -> Result<(), DeliveryError> {
        let frame =
            serde_json::to_string(message).map_err(|e| DeliveryError::Encoding(e.to_string()))?;
        self.deliver(to, frame)
    }
}
