use std::collections::HashMap;
use std::sync::Arc;

use meshboard_core::AssetId;
use parking_lot::RwLock;
use tracing::debug;

use crate::decoder::MeshDecoder;
use crate::error::DecodeError;
use crate::mesh::DecodedMesh;
use crate::store::Asset;

/// Anything that can hand out the decoded mesh for an asset.
pub trait MeshSource: Sync {
    fn mesh(&self, asset: &Asset) -> Result<Arc<DecodedMesh>, DecodeError>;
}

type CachedDecode = Result<Arc<DecodedMesh>, DecodeError>;

/// Decodes each asset at most once.
///
/// Payloads are write-once and ids are never reused, so an entry stays valid
/// until its asset leaves the store. Failures are cached too: a corrupt
/// payload stays corrupt.
pub struct MeshCache<D> {
    decoder: D,
    entries: RwLock<HashMap<AssetId, CachedDecode>>,
}

impl<D: MeshDecoder> MeshCache<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Forget a single asset.
    pub fn invalidate(&self, id: AssetId) {
        self.entries.write().remove(&id);
    }

    /// Forget every asset.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Drop entries for assets no longer present.
    pub fn retain<F>(&self, mut keep: F)
    where
        F: FnMut(AssetId) -> bool,
    {
        self.entries.write().retain(|&id, _| keep(id));
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<D: MeshDecoder> MeshSource for MeshCache<D> {
    fn mesh(&self, asset: &Asset) -> Result<Arc<DecodedMesh>, DecodeError> {
        if let Some(cached) = self.entries.read().get(&asset.id()) {
            return cached.clone();
        }

        // Decode outside the lock so parallel callers don't serialise on it.
        let decoded = self.decoder.decode(asset.payload()).map(Arc::new);
        debug!("Decoded '{}' ({})", asset.name(), asset.id());

        self.entries
            .write()
            .entry(asset.id())
            .or_insert(decoded)
            .clone()
    }
}
