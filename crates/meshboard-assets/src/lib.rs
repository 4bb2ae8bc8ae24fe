//! Meshboard Assets - Asset storage and mesh decoding
//!
//! Holds uploaded mesh payloads keyed by generated ids, decodes STL payloads
//! into indexed meshes, and caches decoded meshes for the lifetime of each
//! asset.

mod cache;
mod decoder;
mod error;
mod mesh;
mod stl;
mod store;

pub use cache::{MeshCache, MeshSource};
pub use decoder::MeshDecoder;
pub use error::{AssetError, DecodeError};
pub use mesh::DecodedMesh;
pub use stl::{decode_stl, StlDecoder};
pub use store::{Asset, AssetStore, DuplicatePolicy, IngestOutcome};
