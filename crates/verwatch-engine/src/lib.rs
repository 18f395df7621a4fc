//! Announcement engine for verwatch
//!
//! Wires the catalog store and the diff engine to webhook delivery:
//! configuration, payload model, transport and the poll loop.

pub mod announcer;
pub mod config;
pub mod delivery;
pub mod errors;
pub mod webhook;

pub use announcer::{shutdown_signal, Announcer, CatalogSource, CycleSummary};
pub use config::{EndpointConfig, WatchConfig};
pub use delivery::{DeliveryOutcome, ReportSink, WebhookSender};
pub use webhook::{AllowedMentions, Webhook};
