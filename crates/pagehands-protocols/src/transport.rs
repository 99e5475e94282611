//! Host messaging channel abstraction.

use async_trait::async_trait;

use crate::address::ContextAddress;
use crate::envelope::Message;
use crate::error::DeliveryError;

/// Host-provided channel that carries serialized frames between contexts.
///
/// Implementations must serialize the frame; contexts never share the
/// `Message` value itself.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transmit a frame to `to`.
    ///
    /// Fails with [`DeliveryError`] when the destination is unreachable.
    async fn transmit(&self, to: &ContextAddress, message: &Message) -> Result<(), DeliveryError>;
}
