//! Scene composition
//!
//! Selects the visible assets, decodes each one, and pairs every decoded mesh
//! with its palette color, legend label, and the shared render style.

use std::fmt;
use std::sync::Arc;

use meshboard_assets::{Asset, DecodeError, DecodedMesh, MeshSource};
use meshboard_core::{AssetId, Color};
use tracing::warn;

use crate::label::{shorten, LabelLimit, LEGEND_LABEL};
use crate::palette::Palette;
use crate::style::RenderStyle;

/// A decode failure tied to the asset that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDiagnostic {
    pub asset_id: AssetId,
    pub name: String,
    pub error: DecodeError,
}

impl AssetDiagnostic {
    pub(crate) fn new(asset: &Asset, error: DecodeError) -> Self {
        Self {
            asset_id: asset.id(),
            name: asset.name().to_string(),
            error,
        }
    }
}

impl fmt::Display for AssetDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to process '{}': {}", self.name, self.error)
    }
}

/// One mesh to draw.
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub asset_id: AssetId,
    pub mesh: Arc<DecodedMesh>,
    pub color: Color,
    pub label: String,
    pub style: RenderStyle,
}

/// A non-empty list of meshes ready for the renderer.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    items: Vec<RenderItem>,
}

impl RenderRequest {
    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the request has no items. A composed request always has at
    /// least one.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn meshes(&self) -> impl Iterator<Item = &DecodedMesh> + '_ {
        self.items.iter().map(|item| item.mesh.as_ref())
    }

    /// Legend labels in draw order.
    pub fn legend(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.label.as_str()).collect()
    }
}

/// Outcome of composing a scene.
///
/// `request` is `None` when nothing can be drawn, either because no asset is
/// visible or because every visible asset failed to decode. The renderer must
/// not be invoked in that case.
#[derive(Debug, Clone)]
pub struct SceneBuild {
    pub request: Option<RenderRequest>,
    pub diagnostics: Vec<AssetDiagnostic>,
}

impl SceneBuild {
    pub fn is_empty(&self) -> bool {
        self.request.is_none()
    }
}

/// Assigns colors and labels to visible assets.
#[derive(Debug, Clone)]
pub struct SceneComposer {
    palette: Palette,
    legend_limit: LabelLimit,
    style: RenderStyle,
}

impl Default for SceneComposer {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl SceneComposer {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            legend_limit: LEGEND_LABEL,
            style: RenderStyle::SURFACE,
        }
    }

    pub fn with_legend_limit(mut self, limit: LabelLimit) -> Self {
        self.legend_limit = limit;
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Build the render request for the visible subset of `assets`, in
    /// enumeration order.
    ///
    /// Colors advance only on successful decodes, so a corrupt asset never
    /// shifts the palette by leaving a hole.
    pub fn compose(&self, assets: &[Asset], source: &impl MeshSource) -> SceneBuild {
        let mut items = Vec::new();
        let mut diagnostics = Vec::new();

        for asset in assets.iter().filter(|a| a.is_visible()) {
            match source.mesh(asset) {
                Ok(mesh) => {
                    let color = self.palette.color_for(items.len());
                    items.push(RenderItem {
                        asset_id: asset.id(),
                        mesh,
                        color,
                        label: shorten(asset.name(), self.legend_limit),
                        style: self.style,
                    });
                }
                Err(err) => {
                    let diagnostic = AssetDiagnostic::new(asset, err);
                    warn!("{}", diagnostic);
                    diagnostics.push(diagnostic);
                }
            }
        }

        let request = if items.is_empty() {
            None
        } else {
            Some(RenderRequest { items })
        };
        SceneBuild {
            request,
            diagnostics,
        }
    }
}
