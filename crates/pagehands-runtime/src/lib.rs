//! # PageHands Runtime
//!
//! The four cooperating contexts and the host that wires them together.
//!
//! - [`Coordinator`] - owns settings, tracks tabs and routes tab commands
//! - [`Mediator`] - one per tab; performs DOM work and forwards capability
//!   calls to the tab's page host
//! - [`Popup`], [`Options`] - short-lived UI surfaces
//! - [`ExtensionHost`] - starts the coordinator, opens and closes tabs and
//!   surfaces over one [`pagehands_core::Fabric`]

pub mod coordinator;
pub mod error;
pub mod host;
pub mod mediator;
pub mod notifier;
pub mod options;
pub mod popup;
pub mod tabs;

pub use coordinator::{Coordinator, MENU_EXTRACT, MENU_HIGHLIGHT, MENU_SETTINGS};
pub use error::RuntimeError;
pub use host::{ExtensionHost, Tab};
pub use mediator::{ExtractedData, Mediator};
pub use notifier::{LogNotifier, MemoryNotifier, Notice};
pub use options::{Options, SettingsExport, EXPORT_VERSION};
pub use popup::{Popup, StatusMessage};
pub use tabs::{TabInfo, TabRegistry};
