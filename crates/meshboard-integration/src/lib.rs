//! Meshboard Integration - Bootstrap content provider
//!
//! Fetches the default models shown on first run. Every failure here is soft:
//! a model that cannot be fetched is logged and skipped.

pub mod bootstrap;
pub mod client;
pub mod error;
pub mod types;

pub use bootstrap::default_models;
pub use client::{BootstrapClient, PendingRequest};
pub use error::IntegrationError;
pub use types::{BootstrapModel, BootstrapReport, FetchedAsset};
