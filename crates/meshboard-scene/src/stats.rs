//! Scene statistics

use meshboard_assets::{Asset, MeshSource};
use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::compose::AssetDiagnostic;

/// Totals over the visible assets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    /// Visible assets, whether or not they decoded
    pub count: usize,
    pub total_points: usize,
    pub total_faces: usize,
    #[serde(skip)]
    pub diagnostics: Vec<AssetDiagnostic>,
}

struct Partial {
    points: usize,
    faces: usize,
    diagnostic: Option<AssetDiagnostic>,
}

/// Sum point and face counts over the visible subset of `assets`.
///
/// Assets decode in parallel; each produces its own partial which is then
/// summed in enumeration order. Assets that fail to decode count towards
/// `count` but add nothing to the totals.
pub fn aggregate(assets: &[Asset], source: &impl MeshSource) -> SceneStats {
    let visible: Vec<&Asset> = assets.iter().filter(|a| a.is_visible()).collect();

    let partials: Vec<Partial> = visible
        .par_iter()
        .map(|asset| match source.mesh(asset) {
            Ok(mesh) => Partial {
                points: mesh.point_count(),
                faces: mesh.face_count(),
                diagnostic: None,
            },
            Err(err) => Partial {
                points: 0,
                faces: 0,
                diagnostic: Some(AssetDiagnostic::new(asset, err)),
            },
        })
        .collect();

    let mut stats = SceneStats {
        count: visible.len(),
        ..Default::default()
    };
    for partial in partials {
        stats.total_points += partial.points;
        stats.total_faces += partial.faces;
        if let Some(diagnostic) = partial.diagnostic {
            warn!("{}", diagnostic);
            stats.diagnostics.push(diagnostic);
        }
    }
    stats
}
