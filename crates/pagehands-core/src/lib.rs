//! # PageHands Core
//!
//! The cross-context invocation layer shared by every PageHands context.
//!
//! ## Components
//!
//! - [`Router`] - correlates requests with responses and dispatches incoming
//!   requests to handlers
//! - [`HandlerRegistry`] - start-up registration of action handlers, frozen
//!   into an immutable [`HandlerTable`]
//! - [`Fabric`] - in-process messaging channel carrying serialized frames
//! - [`ContextRuntime`] - a context's mailbox pump, router and [`Lifecycle`]
//! - [`MemorySettingsStore`], [`FileSettingsStore`] - settings storage

pub mod fabric;
pub mod handler;
pub mod lifecycle;
pub mod pending;
pub mod registry;
pub mod router;
pub mod runtime;
pub mod settings;

pub use fabric::{Fabric, Mailbox};
pub use handler::{handler_fn, ActionHandler, FnHandler, HandlerRequest};
pub use lifecycle::{ContextState, Lifecycle};
pub use pending::PendingReply;
pub use registry::{HandlerRegistry, HandlerTable};
pub use router::Router;
pub use runtime::ContextRuntime;
pub use settings::{FileSettingsStore, MemorySettingsStore};
