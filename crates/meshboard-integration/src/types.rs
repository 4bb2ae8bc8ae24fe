use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

/// A named remote resource fetched on first run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapModel {
    pub name: String,
    pub url: String,
}

/// A successfully downloaded model, ready to be ingested
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub name: String,
    pub payload: Vec<u8>,
}

/// Result of a bootstrap run. Successes keep the order of the requested
/// models.
#[derive(Debug, Default)]
pub struct BootstrapReport {
    pub assets: Vec<FetchedAsset>,
    pub failures: Vec<(String, IntegrationError)>,
}

impl BootstrapReport {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
