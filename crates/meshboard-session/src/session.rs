//! Scene session state
//!
//! One `SceneSession` per user session. It owns the asset collection, the
//! decode cache, and the pinned camera. Nothing else holds scene state.

use meshboard_assets::{
    Asset, AssetStore, DuplicatePolicy, IngestOutcome, MeshCache, MeshDecoder, StlDecoder,
};
use meshboard_core::AssetId;
use meshboard_scene::{
    aggregate, shorten, AssetDiagnostic, CameraDescriptor, CameraFramer, LabelLimit, RenderEngine,
    SceneBuild, SceneComposer, SceneStats, LIST_LABEL,
};
use tracing::{debug, info, warn};

use crate::codec::{self, SessionDocument};
use crate::error::SessionError;

/// A user action against the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SetVisible { id: AssetId, visible: bool },
    ShowAll,
    HideAll,
    Remove(AssetId),
    /// Drop every asset and the pinned camera.
    Clear,
    /// Frame the visible assets and pin the result.
    FitToView,
}

/// One row of the asset listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub id: AssetId,
    pub label: String,
    pub size: usize,
    pub visible: bool,
}

/// What happened when a render was requested.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// Nothing visible decoded; the engine was not called.
    Empty { diagnostics: Vec<AssetDiagnostic> },
    Rendered {
        items: usize,
        camera: CameraDescriptor,
        diagnostics: Vec<AssetDiagnostic>,
    },
}

pub struct SceneSession<D = StlDecoder> {
    store: AssetStore,
    meshes: MeshCache<D>,
    composer: SceneComposer,
    framer: CameraFramer,
    list_limit: LabelLimit,
    camera: Option<CameraDescriptor>,
}

impl SceneSession<StlDecoder> {
    pub fn new() -> Self {
        Self::with_decoder(StlDecoder)
    }
}

impl Default for SceneSession<StlDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: MeshDecoder> SceneSession<D> {
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            store: AssetStore::default(),
            meshes: MeshCache::new(decoder),
            composer: SceneComposer::default(),
            framer: CameraFramer::default(),
            list_limit: LIST_LABEL,
            camera: None,
        }
    }

    /// Replace the duplicate policy. Existing assets are kept as they are.
    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.store = AssetStore::with_assets(policy, self.store.list());
        self
    }

    pub fn with_composer(mut self, composer: SceneComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn with_framer(mut self, framer: CameraFramer) -> Self {
        self.framer = framer;
        self
    }

    pub fn with_list_limit(mut self, limit: LabelLimit) -> Self {
        self.list_limit = limit;
        self
    }

    // ---- State access ----

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Snapshot of all assets in listing order.
    pub fn assets(&self) -> Vec<Asset> {
        self.store.list()
    }

    /// The pinned camera, if any.
    pub fn camera(&self) -> Option<&CameraDescriptor> {
        self.camera.as_ref()
    }

    /// Pin a camera (for example one the user orbited to), or unpin with
    /// `None` to return to automatic framing.
    pub fn set_camera(&mut self, camera: Option<CameraDescriptor>) {
        self.camera = camera;
    }

    pub fn listing(&self) -> Vec<ListingRow> {
        self.store
            .iter()
            .map(|asset| ListingRow {
                id: asset.id(),
                label: shorten(asset.name(), self.list_limit),
                size: asset.size(),
                visible: asset.is_visible(),
            })
            .collect()
    }

    // ---- Mutation ----

    pub fn ingest(&mut self, name: impl Into<String>, payload: Vec<u8>) -> IngestOutcome {
        self.store.ingest(name, payload)
    }

    /// Apply a single user action. A failed action leaves the session as it
    /// was.
    pub fn apply(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        debug!("Applying {:?}", event);
        match event {
            SessionEvent::SetVisible { id, visible } => self.store.set_visible(id, visible)?,
            SessionEvent::ShowAll => self.store.set_all_visible(true),
            SessionEvent::HideAll => self.store.set_all_visible(false),
            SessionEvent::Remove(id) => {
                self.store.remove(id)?;
                self.meshes.invalidate(id);
            }
            SessionEvent::Clear => {
                self.store.clear();
                self.meshes.clear();
                self.camera = None;
                info!("Cleared all assets");
            }
            SessionEvent::FitToView => {
                self.fit_to_view();
            }
        }
        Ok(())
    }

    /// Frame every visible, decodable asset and pin the resulting camera.
    ///
    /// With nothing to frame the pinned camera is left as it was and `None`
    /// is returned.
    pub fn fit_to_view(&mut self) -> Option<CameraDescriptor> {
        let build = self.compose();
        let Some(request) = &build.request else {
            warn!("Nothing visible to fit, keeping the current camera");
            return None;
        };
        let camera = self.framer.frame(request.meshes());
        self.camera = Some(camera);
        Some(camera)
    }

    // ---- Derived state ----

    pub fn compose(&self) -> SceneBuild {
        self.composer.compose(&self.store.visible(), &self.meshes)
    }

    pub fn stats(&self) -> SceneStats {
        aggregate(&self.store.visible(), &self.meshes)
    }

    /// Camera a render would use: the pinned one, else a fresh framing of
    /// the composed scene.
    pub fn active_camera(&self, build: &SceneBuild) -> CameraDescriptor {
        self.camera.unwrap_or_else(|| self.auto_camera(build))
    }

    fn auto_camera(&self, build: &SceneBuild) -> CameraDescriptor {
        match &build.request {
            Some(request) => self.framer.frame(request.meshes()),
            None => self.framer.frame_bounds(None),
        }
    }

    /// Compose the scene and hand it to `engine`.
    ///
    /// The pinned camera is replayed; the first render of an unpinned
    /// session frames the scene instead. Either way the camera the engine
    /// reports back becomes the pinned one, so user navigation survives the
    /// next render.
    pub fn render(&mut self, engine: &mut impl RenderEngine) -> RenderOutcome {
        let build = self.compose();
        let Some(request) = &build.request else {
            return RenderOutcome::Empty {
                diagnostics: build.diagnostics,
            };
        };

        let camera = self.active_camera(&build);
        let reported = engine.render(request, &camera);
        self.camera = Some(reported);

        RenderOutcome::Rendered {
            items: request.len(),
            camera: reported,
            diagnostics: build.diagnostics,
        }
    }

    // ---- Persistence ----

    /// Snapshot the assets and pinned camera.
    pub fn save(&self) -> SessionDocument {
        codec::serialize(&self.store.list(), self.camera.as_ref())
    }

    /// Replace the whole session with the contents of `document`. The
    /// document is fully validated first; on error nothing changes.
    pub fn load(&mut self, document: &SessionDocument) -> Result<(), SessionError> {
        let restored = codec::deserialize(document)?;
        let count = restored.assets.len();

        self.store = AssetStore::with_assets(self.store.policy(), restored.assets);
        self.meshes.clear();
        self.camera = restored.camera;

        info!("Loaded session with {} assets", count);
        Ok(())
    }

    /// Parse and load a JSON session document.
    pub fn load_json(&mut self, json: &str) -> Result<(), SessionError> {
        let document = SessionDocument::from_json(json)?;
        self.load(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use glam::Vec3;
    use meshboard_assets::AssetError;
    use meshboard_scene::RenderRequest;

    fn strip_stl(points: usize) -> Vec<u8> {
        let mut text = String::from("solid strip\n");
        for i in 0..points - 2 {
            text.push_str("facet normal 0 0 1\nouter loop\n");
            for v in i..i + 3 {
                text.push_str(&format!("vertex {} {} 0\n", v, v % 2));
            }
            text.push_str("endloop\nendfacet\n");
        }
        text.push_str("endsolid strip\n");
        text.into_bytes()
    }

    /// Records what it was asked to draw and optionally "moves" the camera.
    #[derive(Default)]
    struct RecordingEngine {
        calls: usize,
        last_labels: Vec<String>,
        last_camera: Option<CameraDescriptor>,
        nudge: Vec3,
    }

    impl RenderEngine for RecordingEngine {
        fn render(
            &mut self,
            request: &RenderRequest,
            camera: &CameraDescriptor,
        ) -> CameraDescriptor {
            self.calls += 1;
            self.last_labels = request.legend().into_iter().map(String::from).collect();
            self.last_camera = Some(*camera);
            CameraDescriptor {
                position: camera.position + self.nudge,
                ..*camera
            }
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut session = SceneSession::new();
        let a = session.ingest("A.stl", strip_stl(500)).inserted().unwrap();
        session.ingest("B.stl", strip_stl(300)).inserted().unwrap();

        let stats = session.stats();
        assert_eq!((stats.count, stats.total_points), (2, 800));

        session
            .apply(SessionEvent::SetVisible { id: a, visible: false })
            .unwrap();
        let stats = session.stats();
        assert_eq!((stats.count, stats.total_points), (1, 300));

        let json = session.save().to_json().unwrap();
        let mut reloaded = SceneSession::new();
        reloaded.load_json(&json).unwrap();

        let stats = reloaded.stats();
        assert_eq!((stats.count, stats.total_points), (1, 300));
        let hidden: Vec<_> = reloaded
            .listing()
            .into_iter()
            .filter(|row| !row.visible)
            .map(|row| row.label)
            .collect();
        assert_eq!(hidden, vec!["A.stl"]);
    }

    #[test]
    fn test_duplicate_ingest_is_a_no_op() {
        let mut session = SceneSession::new();
        let first = session.ingest("part.stl", strip_stl(4));
        let second = session.ingest("part.stl", strip_stl(4));
        assert_eq!(second, IngestOutcome::AlreadyExists(first.inserted().unwrap()));
        assert_eq!(session.assets().len(), 1);
    }

    #[test]
    fn test_unknown_id_is_not_found_and_changes_nothing() {
        let mut session = SceneSession::new();
        session.ingest("a.stl", strip_stl(4));
        let missing = AssetId::new();

        let err = session
            .apply(SessionEvent::SetVisible { id: missing, visible: false })
            .unwrap_err();
        assert!(matches!(err, SessionError::Asset(AssetError::NotFound(id)) if id == missing));
        assert!(matches!(
            session.apply(SessionEvent::Remove(missing)),
            Err(SessionError::Asset(AssetError::NotFound(_)))
        ));
        assert!(session.assets()[0].is_visible());
    }

    #[test]
    fn test_bulk_events_and_clear() {
        let mut session = SceneSession::new();
        session.apply(SessionEvent::HideAll).unwrap();
        for i in 0..3 {
            session.ingest(format!("{i}.stl"), strip_stl(4 + i));
        }
        session.apply(SessionEvent::ShowAll).unwrap();
        session.apply(SessionEvent::HideAll).unwrap();
        assert!(session.listing().iter().all(|row| !row.visible));
        assert!(session.compose().is_empty());

        session.apply(SessionEvent::FitToView).unwrap();
        assert!(session.camera().is_none());

        session.apply(SessionEvent::ShowAll).unwrap();
        session.apply(SessionEvent::FitToView).unwrap();
        assert!(session.camera().is_some());
        session.apply(SessionEvent::Clear).unwrap();
        assert!(session.assets().is_empty());
        assert!(session.camera().is_none());
    }

    #[test]
    fn test_remove_drops_asset() {
        let mut session = SceneSession::new();
        let a = session.ingest("a.stl", strip_stl(4)).inserted().unwrap();
        session.ingest("b.stl", strip_stl(5));
        assert_eq!(session.stats().total_points, 9);

        session.apply(SessionEvent::Remove(a)).unwrap();
        assert_eq!(session.stats().total_points, 5);
        assert!(!session.store().contains(a));
    }

    #[test]
    fn test_render_skips_engine_when_empty() {
        let mut session = SceneSession::new();
        let mut engine = RecordingEngine::default();
        assert!(matches!(
            session.render(&mut engine),
            RenderOutcome::Empty { .. }
        ));

        session.ingest("bad.stl", b"garbage".to_vec());
        match session.render(&mut engine) {
            RenderOutcome::Empty { diagnostics } => assert_eq!(diagnostics.len(), 1),
            other => panic!("expected Empty, got: {:?}", other),
        }
        assert_eq!(engine.calls, 0);
    }

    #[test]
    fn test_partial_decode_failure_still_renders() {
        let mut session = SceneSession::new();
        session.ingest("a.stl", strip_stl(4));
        session.ingest("bad.stl", b"garbage".to_vec());
        session.ingest("a_really_long_model_name.stl", strip_stl(6));

        let mut engine = RecordingEngine::default();
        match session.render(&mut engine) {
            RenderOutcome::Rendered { items, diagnostics, .. } => {
                assert_eq!(items, 2);
                assert_eq!(diagnostics.len(), 1);
                assert_eq!(diagnostics[0].name, "bad.stl");
            }
            other => panic!("expected Rendered, got: {:?}", other),
        }
        assert_eq!(engine.last_labels, vec!["a.stl", "a_really_long_mod..."]);

        let stats = session.stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_points, 10);
        assert_eq!(stats.diagnostics.len(), 1);
    }

    #[test]
    fn test_reported_camera_is_kept_between_renders() {
        let mut session = SceneSession::new();
        session.ingest("a.stl", strip_stl(4));
        let mut engine = RecordingEngine {
            nudge: Vec3::new(0.0, 0.0, 5.0),
            ..Default::default()
        };

        let first = match session.render(&mut engine) {
            RenderOutcome::Rendered { camera, .. } => camera,
            other => panic!("expected Rendered, got: {:?}", other),
        };
        let framed = engine.last_camera.unwrap();
        assert_eq!(first.position, framed.position + Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(session.camera(), Some(&first));

        // A new asset does not reframe a view the engine already reported.
        session.ingest("far.stl", {
            let mut text = String::from("solid far\nfacet normal 0 0 1\n");
            text.push_str("vertex 100 100 100\nvertex 101 100 100\nvertex 100 101 100\nendfacet\n");
            text.into_bytes()
        });
        session.render(&mut engine);
        assert_eq!(engine.last_camera, Some(first));
    }

    #[test]
    fn test_fit_to_view_replaces_pinned_camera() {
        let mut session = SceneSession::new();
        session.ingest("a.stl", strip_stl(4));
        let mut engine = RecordingEngine {
            nudge: Vec3::new(0.0, 0.0, 1.0),
            ..Default::default()
        };
        session.render(&mut engine);

        let pinned = session.fit_to_view().unwrap();
        session.render(&mut engine);
        assert_eq!(engine.last_camera, Some(pinned));

        let moved = session.camera().copied().unwrap();
        assert_eq!(moved.position, pinned.position + Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_fit_to_view_with_nothing_visible_keeps_camera() {
        let mut session = SceneSession::new();
        let a = session.ingest("a.stl", strip_stl(4)).inserted().unwrap();
        let pinned = session.fit_to_view().unwrap();

        session
            .apply(SessionEvent::SetVisible { id: a, visible: false })
            .unwrap();
        assert!(session.fit_to_view().is_none());
        assert_eq!(session.camera(), Some(&pinned));
    }

    #[test]
    fn test_camera_survives_save_and_load() {
        let mut session = SceneSession::new();
        session.ingest("a.stl", strip_stl(8));
        let camera = session.fit_to_view().unwrap();

        let document = session.save();
        let mut restored = SceneSession::new();
        restored.load(&document).unwrap();
        assert_eq!(restored.camera(), Some(&camera));
    }

    #[test]
    fn test_failed_load_leaves_session_untouched() {
        let mut session = SceneSession::new();
        session.ingest("keep.stl", strip_stl(4));
        let camera = session.fit_to_view().unwrap();

        let mut document = session.save();
        document.uploaded_files[0].1.data = "%%%".to_string();
        let err = session.load(&document).unwrap_err();
        assert!(matches!(err, SessionError::Parse(ParseError::Base64 { .. })));

        assert!(session.load_json("{\"uploaded_files\": 3}").is_err());
        assert!(matches!(
            session.load_json(r#"{"uploaded_files": {}, "timestamp": "not-a-date"}"#),
            Err(SessionError::Parse(ParseError::Timestamp(_)))
        ));

        assert_eq!(session.assets().len(), 1);
        assert_eq!(session.assets()[0].name(), "keep.stl");
        assert_eq!(session.camera(), Some(&camera));
    }

    #[test]
    fn test_load_replaces_existing_assets() {
        let mut source = SceneSession::new();
        source.ingest("x.stl", strip_stl(4));
        let document = source.save();

        let mut target = SceneSession::new();
        target.ingest("old.stl", strip_stl(5));
        target.load(&document).unwrap();

        let names: Vec<_> = target.assets().iter().map(|a| a.name().to_string()).collect();
        assert_eq!(names, vec!["x.stl"]);
        assert_ne!(target.assets()[0].id(), source.assets()[0].id());
    }

    #[test]
    fn test_listing_uses_list_limit() {
        let mut session = SceneSession::new();
        let name = "an_extremely_long_file_name_for_listing.stl";
        session.ingest(name, strip_stl(4));
        let row = &session.listing()[0];
        assert_eq!(row.label, format!("{}...", &name[..30]));
        assert!(row.visible);
    }

    #[test]
    fn test_content_hash_policy_is_applied() {
        let mut session = SceneSession::new().with_policy(DuplicatePolicy::ContentHash);
        session.ingest("a.stl", strip_stl(4));
        assert!(matches!(
            session.ingest("renamed.stl", strip_stl(4)),
            IngestOutcome::AlreadyExists(_)
        ));
    }
}
