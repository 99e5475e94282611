//! # PageHands Protocols
//!
//! Shared definitions for every PageHands execution context.
//! Contains only wire types and interface definitions - no implementations.
//!
//! ## Contents
//!
//! - [`Message`], [`Envelope`], [`ResponseEnvelope`] - the serialized frames
//!   exchanged between contexts
//! - [`ContextAddress`] - who sent a frame and where replies go
//! - [`Transport`] - the host messaging channel
//! - [`SettingsStore`] - external key-value settings storage
//! - [`DocumentParser`] - raw bytes to plain text
//! - [`Notifier`] - user-facing notification rendering

pub mod address;
pub mod envelope;
pub mod error;
pub mod notify;
pub mod parser;
pub mod settings;
pub mod transport;

pub use address::{ContextAddress, ContextKind};
pub use envelope::{Envelope, Message, ResponseEnvelope};
pub use error::{
    CapabilityError, DeliveryError, DomError, HandlerError, ParseError, PatternError,
    ProtocolError, RouterError, SettingsError,
};
pub use notify::{NoticeLevel, Notifier};
pub use parser::DocumentParser;
pub use settings::SettingsStore;
pub use transport::Transport;
