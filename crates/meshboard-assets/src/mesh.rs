use meshboard_core::{Aabb, Vec3};

/// A decoded mesh (renderer-agnostic). Vertices are welded, so `positions`
/// holds each distinct point once and `indices` references them three per
/// triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl DecodedMesh {
    /// Number of distinct points.
    pub fn point_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangular faces.
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bounding box of all points, or `None` for a mesh without points.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().map(|&p| Vec3::from_array(p)))
    }
}
