//! Meshboard Scene - What to render and how to frame it
//!
//! Turns the visible subset of an asset store into a render request with
//! deterministic per-asset colors and labels, derives a camera that frames
//! the visible meshes, and aggregates point/face statistics. Rasterization
//! is left to whatever implements [`RenderEngine`].

pub mod camera;
pub mod compose;
pub mod error;
pub mod label;
pub mod palette;
pub mod render;
pub mod stats;
pub mod style;

pub use camera::{CameraDescriptor, CameraFramer};
pub use compose::{AssetDiagnostic, RenderItem, RenderRequest, SceneBuild, SceneComposer};
pub use error::SceneError;
pub use label::{shorten, LabelLimit, LEGEND_LABEL, LIST_LABEL};
pub use palette::Palette;
pub use render::RenderEngine;
pub use stats::{aggregate, SceneStats};
pub use style::{RenderStyle, ShadingMode};
