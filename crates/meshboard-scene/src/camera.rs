//! Camera framing
//!
//! The framer fits the bounding sphere of the union bounding box of a set of
//! meshes inside a view cone. Corners of the box lie on that sphere, so every
//! point of every input mesh ends up within the view.

use glam::{Mat4, Vec3};
use meshboard_assets::DecodedMesh;
use meshboard_core::Aabb;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Radius assumed when the framed geometry collapses to a single point.
const DEGENERATE_RADIUS: f32 = 0.5;

/// A replayable viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    pub position: Vec3,
    pub focal_point: Vec3,
    pub view_up: Vec3,
    /// Full view angle in degrees, applied to the narrower screen axis
    pub view_angle: f32,
    /// Near and far distances along the view direction
    pub clipping_range: [f32; 2],
}

impl CameraDescriptor {
    /// Unit vector from the camera towards the focal point
    pub fn forward(&self) -> Vec3 {
        (self.focal_point - self.position).normalize_or_zero()
    }

    /// Distance from the camera to the focal point
    pub fn distance(&self) -> f32 {
        self.position.distance(self.focal_point)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.focal_point, self.view_up)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let [near, far] = self.clipping_range;
        Mat4::perspective_rh(self.view_angle.to_radians(), aspect_ratio, near, far)
    }

    /// Whether `point` lies inside the view cone and between the clipping
    /// planes.
    pub fn contains(&self, point: Vec3) -> bool {
        let forward = self.forward();
        let offset = point - self.position;
        let along = offset.dot(forward);
        let [near, far] = self.clipping_range;
        let slack = 1e-4 * far.max(1.0);
        if along < near - slack || along > far + slack {
            return false;
        }
        let radial = (offset - forward * along).length();
        let half_angle = (self.view_angle * 0.5).to_radians();
        radial <= along * half_angle.tan() + slack
    }
}

/// Derives camera descriptors that frame a set of meshes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraFramer {
    /// Full view angle in degrees
    pub view_angle: f32,
    /// Direction from the focal point towards the camera
    pub view_direction: Vec3,
    pub view_up: Vec3,
}

impl Default for CameraFramer {
    fn default() -> Self {
        // Isometric view, z up.
        Self {
            view_angle: 30.0,
            view_direction: Vec3::ONE,
            view_up: Vec3::Z,
        }
    }
}

impl CameraFramer {
    /// Frame every given mesh. Meshes without points are ignored; with
    /// nothing to frame the camera looks at a unit-sized region at the origin.
    pub fn frame<'a, I>(&self, meshes: I) -> CameraDescriptor
    where
        I: IntoIterator<Item = &'a DecodedMesh>,
    {
        let bounds = meshes
            .into_iter()
            .filter_map(DecodedMesh::bounds)
            .reduce(Aabb::union);
        self.frame_bounds(bounds)
    }

    /// Frame an explicit bounding box, or the default region for `None`.
    pub fn frame_bounds(&self, bounds: Option<Aabb>) -> CameraDescriptor {
        let (center, mut radius) = match bounds {
            Some(aabb) => (aabb.center(), aabb.bounding_radius()),
            None => (Vec3::ZERO, 1.0),
        };
        if radius <= f32::EPSILON {
            radius = DEGENERATE_RADIUS;
        }

        let direction = self.view_direction.try_normalize().unwrap_or(Vec3::Z);
        let view_angle = self.view_angle.clamp(1.0, 179.0);
        let half_angle = (view_angle * 0.5).to_radians();
        let distance = radius / half_angle.sin();

        let near = ((distance - radius) * 0.99).max(distance * 1e-3);
        let far = (distance + radius) * 1.01;

        let descriptor = CameraDescriptor {
            position: center + direction * distance,
            focal_point: center,
            view_up: orthogonal_up(self.view_up, direction),
            view_angle,
            clipping_range: [near, far],
        };
        debug!(
            "Framed center {:?} radius {:.3} from distance {:.3}",
            center, radius, distance
        );
        descriptor
    }
}

/// Project `up` off `direction`, falling back to another axis when the two
/// are parallel.
fn orthogonal_up(up: Vec3, direction: Vec3) -> Vec3 {
    let projected = up - direction * up.dot(direction);
    projected
        .try_normalize()
        .unwrap_or_else(|| direction.any_orthonormal_vector())
}
