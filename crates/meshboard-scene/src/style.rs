//! Fixed per-asset render style

use meshboard_core::Color;
use serde::{Deserialize, Serialize};

/// How mesh surfaces are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingMode {
    Surface,
    Wireframe,
    Points,
}

/// Material and shading parameters handed to the renderer with every item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    pub shading: ShadingMode,
    pub lighting: bool,
    pub smooth_shading: bool,
    pub show_edges: bool,
    /// Only used when `show_edges` is set
    pub edge_color: Color,
    pub line_width: f32,
    pub specular: f32,
    pub diffuse: f32,
    pub ambient: f32,
    pub metallic: f32,
    pub roughness: f32,
    pub interpolate_before_map: bool,
}

impl RenderStyle {
    /// Lit, smooth, matte surface without edges. Shared by every asset.
    pub const SURFACE: RenderStyle = RenderStyle {
        shading: ShadingMode::Surface,
        lighting: true,
        smooth_shading: true,
        show_edges: false,
        edge_color: Color::BLACK,
        line_width: 1.5,
        specular: 0.3,
        diffuse: 0.7,
        ambient: 0.2,
        metallic: 0.1,
        roughness: 0.8,
        interpolate_before_map: true,
    };
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::SURFACE
    }
}
