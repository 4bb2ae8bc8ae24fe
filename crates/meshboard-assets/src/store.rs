use std::collections::HashMap;
use std::sync::Arc;

use meshboard_core::AssetId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::AssetError;

/// How `ingest` decides that a candidate is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Same display name and same byte length. Two different files that happen
    /// to share both are treated as one.
    #[default]
    NameAndSize,
    /// Same SHA-256 of the payload, regardless of name.
    ContentHash,
}

/// One uploaded or bootstrap-loaded mesh.
///
/// The payload is shared and immutable; cloning an `Asset` is cheap and never
/// exposes a way to change its bytes.
#[derive(Debug, Clone)]
pub struct Asset {
    id: AssetId,
    name: String,
    payload: Arc<[u8]>,
    digest: [u8; 32],
    visible: bool,
}

impl Asset {
    /// Build a new visible asset with a freshly generated id.
    pub fn new(name: impl Into<String>, payload: impl Into<Arc<[u8]>>) -> Self {
        let payload = payload.into();
        Self {
            id: AssetId::new(),
            name: name.into(),
            digest: Sha256::digest(&payload).into(),
            payload,
            visible: true,
        }
    }

    /// Build an asset restored from a saved session, keeping its visibility.
    pub fn restored(name: impl Into<String>, payload: impl Into<Arc<[u8]>>, visible: bool) -> Self {
        Self {
            visible,
            ..Self::new(name, payload)
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Byte length of the payload.
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn is_duplicate_of(&self, other: &Asset, policy: DuplicatePolicy) -> bool {
        match policy {
            DuplicatePolicy::NameAndSize => self.name == other.name && self.size() == other.size(),
            DuplicatePolicy::ContentHash => self.digest == other.digest,
        }
    }
}

/// Result of offering a candidate to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Inserted(AssetId),
    /// The candidate matched this existing asset and was dropped.
    AlreadyExists(AssetId),
}

impl IngestOutcome {
    pub fn inserted(&self) -> Option<AssetId> {
        match self {
            IngestOutcome::Inserted(id) => Some(*id),
            IngestOutcome::AlreadyExists(_) => None,
        }
    }
}

/// The asset collection. Keeps insertion order for stable listing.
#[derive(Debug, Default)]
pub struct AssetStore {
    policy: DuplicatePolicy,
    assets: HashMap<AssetId, Asset>,
    order: Vec<AssetId>,
}

impl AssetStore {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            assets: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Build a store from already-constructed assets, bypassing the duplicate
    /// check. Used when restoring a saved session, which may legitimately
    /// hold entries the policy would otherwise fold together.
    pub fn with_assets(policy: DuplicatePolicy, assets: Vec<Asset>) -> Self {
        let mut store = Self::new(policy);
        for asset in assets {
            store.order.push(asset.id);
            store.assets.insert(asset.id, asset);
        }
        store
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Add a payload unless an equivalent asset is already present.
    pub fn ingest(&mut self, name: impl Into<String>, payload: impl Into<Arc<[u8]>>) -> IngestOutcome {
        let candidate = Asset::new(name, payload);

        if let Some(existing) = self
            .iter()
            .find(|existing| candidate.is_duplicate_of(existing, self.policy))
        {
            debug!(
                "Skipping '{}' ({} bytes): already present as {}",
                candidate.name,
                candidate.size(),
                existing.id
            );
            return IngestOutcome::AlreadyExists(existing.id);
        }

        let id = candidate.id;
        info!("Ingested '{}' ({} bytes) as {}", candidate.name, candidate.size(), id);
        self.order.push(id);
        self.assets.insert(id, candidate);
        IngestOutcome::Inserted(id)
    }

    pub fn set_visible(&mut self, id: AssetId, visible: bool) -> Result<(), AssetError> {
        let asset = self.assets.get_mut(&id).ok_or(AssetError::NotFound(id))?;
        asset.visible = visible;
        Ok(())
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        for asset in self.assets.values_mut() {
            asset.visible = visible;
        }
    }

    pub fn remove(&mut self, id: AssetId) -> Result<Asset, AssetError> {
        let asset = self.assets.remove(&id).ok_or(AssetError::NotFound(id))?;
        self.order.retain(|&other| other != id);
        Ok(asset)
    }

    /// Drop every asset.
    pub fn clear(&mut self) {
        self.assets.clear();
        self.order.clear();
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.assets.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate assets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> + '_ {
        self.order.iter().filter_map(|id| self.assets.get(id))
    }

    /// Snapshot of every asset in insertion order.
    pub fn list(&self) -> Vec<Asset> {
        self.iter().cloned().collect()
    }

    /// Snapshot of the visible assets in insertion order.
    pub fn visible(&self) -> Vec<Asset> {
        self.iter().filter(|a| a.visible).cloned().collect()
    }
}
