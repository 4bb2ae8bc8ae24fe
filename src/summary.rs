//! Headless stand-in for a render engine

use meshboard_scene::{CameraDescriptor, RenderEngine, RenderRequest};
use tracing::info;

/// Logs what would be drawn and keeps the camera it was given.
#[derive(Debug, Default)]
pub struct SummaryRenderer {
    pub frames: usize,
}

impl RenderEngine for SummaryRenderer {
    fn render(&mut self, request: &RenderRequest, camera: &CameraDescriptor) -> CameraDescriptor {
        self.frames += 1;
        for item in request.items() {
            info!(
                "  {:<20} {} {:>8} points {:>8} faces",
                item.label,
                item.color.to_hex_string(),
                item.mesh.point_count(),
                item.mesh.face_count()
            );
        }
        info!(
            "Camera at {:?} looking at {:?} (up {:?}, {:.1} deg)",
            camera.position.to_array(),
            camera.focal_point.to_array(),
            camera.view_up.to_array(),
            camera.view_angle
        );
        *camera
    }
}
