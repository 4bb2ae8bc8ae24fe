use crate::camera::CameraDescriptor;
use crate::compose::RenderRequest;

/// External renderer. Receives the composed scene and the camera to draw it
/// with, and reports the camera it ended up using (which differs when the
/// user moved the view).
pub trait RenderEngine {
    fn render(&mut self, request: &RenderRequest, camera: &CameraDescriptor) -> CameraDescriptor;
}
