use crate::error::DecodeError;
use crate::mesh::DecodedMesh;

/// Turns a raw payload into geometry. Implementations must be pure with
/// respect to the payload: the same bytes always decode to the same mesh.
pub trait MeshDecoder: Send + Sync {
    fn decode(&self, payload: &[u8]) -> Result<DecodedMesh, DecodeError>;
}
