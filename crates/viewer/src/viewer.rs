use std::collections::HashSet;
use std::time::Duration;

use glam::{Vec2, Vec3};
use worldview_camera::FlyCameraController;
use worldview_common::{EntityId, MeshHandleAllocator, Ray};
use worldview_input::{Action, FrameInput, LookDelta, PointerCapture};
use worldview_lod::{LodManager, LodRepresentations, LodUpdate, StructureLodGroup};
use worldview_select::{EntityKind, HitShape, SelectableEntry, SelectionIndex, SelectionResult};
use worldview_stream::{StreamMetrics, TickReport, TileStreamer};
use worldview_terrain::TerrainSampler;

use crate::config::{ViewerConfig, ViewerError};
use crate::foundation::SceneFoundation;
use crate::summary::ViewerSummary;

type SelectCallback = Box<dyn FnMut(Option<&SelectionResult>)>;
type FlyModeCallback = Box<dyn FnMut(bool)>;

/// What happened during one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub frame: u64,
    pub viewpoint: Vec3,
    pub stream: TickReport,
    pub lod: LodUpdate,
    /// Set when the frame carried a click.
    pub click: Option<Option<SelectionResult>>,
}

/// Counts from one `load_foundation` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoundationStats {
    pub structures: usize,
    pub markers: usize,
    pub settlements: usize,
    pub meshes: usize,
}

/// The embedded terrain viewer: camera, tile streaming, structure LOD and
/// click resolution driven by one `frame` call per rendered frame.
///
/// All state lives here and is mutated through `&mut self`.
pub struct TerrainViewer<S: TerrainSampler> {
    config: ViewerConfig,
    sampler: S,
    camera: FlyCameraController,
    streamer: TileStreamer,
    lod: LodManager,
    selection: SelectionIndex,
    capture: PointerCapture,
    meshes: MeshHandleAllocator,
    selected: Option<SelectionResult>,
    frame: u64,
    on_select: Option<SelectCallback>,
    on_fly_mode_changed: Option<FlyModeCallback>,
}

impl<S: TerrainSampler> TerrainViewer<S> {
    pub fn new(config: ViewerConfig, sampler: S) -> Result<Self, ViewerError> {
        config.validate()?;
        let bounds = config.stream.bounds;
        let camera = FlyCameraController::new(config.camera, bounds)?;
        let streamer = TileStreamer::new(config.stream.clone())?;
        let selection = SelectionIndex::new(bounds, config.selection);
        tracing::info!(
            tiles_x = bounds.tiles_x,
            tiles_z = bounds.tiles_z,
            tile_size = bounds.tile_size,
            "terrain viewer ready"
        );
        Ok(Self {
            config,
            sampler,
            camera,
            streamer,
            lod: LodManager::new(),
            selection,
            capture: PointerCapture::new(),
            meshes: MeshHandleAllocator::new(),
            selected: None,
            frame: 0,
            on_select: None,
            on_fly_mode_changed: None,
        })
    }

    /// Register the generator's structures, markers and settlements. Each
    /// structure gets its three LOD representations here, once.
    pub fn load_foundation(
        &mut self,
        foundation: &SceneFoundation,
    ) -> Result<FoundationStats, ViewerError> {
        let mut seen: HashSet<EntityId> = self
            .selection
            .entries()
            .iter()
            .map(|e| e.id)
            .collect();
        for id in foundation
            .structures
            .iter()
            .map(|s| s.id)
            .chain(foundation.markers.iter().map(|m| m.id))
        {
            if !seen.insert(id) {
                return Err(ViewerError::DuplicateEntity(id));
            }
        }

        let issued_before = self.meshes.issued();
        for settlement in &foundation.settlements {
            self.selection.register_settlement(settlement.clone());
        }
        for spec in &foundation.structures {
            let representations = LodRepresentations {
                full: self.meshes.allocate(),
                simplified: self.meshes.allocate(),
                minimal: self.meshes.allocate(),
            };
            let group =
                StructureLodGroup::new(spec.id, spec.anchor, representations, self.config.lod)?;
            self.lod.insert(group);
            self.selection.register(SelectableEntry {
                kind: EntityKind::Structure,
                id: spec.id,
                mesh: representations.full,
                shape: HitShape::Box(spec.bounds()),
                parent: spec.settlement,
            });
        }
        for marker in &foundation.markers {
            self.selection.register(SelectableEntry {
                kind: EntityKind::ZoneMarker,
                id: marker.id,
                mesh: self.meshes.allocate(),
                shape: HitShape::Sphere {
                    center: marker.center,
                    radius: marker.radius,
                },
                parent: marker.settlement,
            });
        }

        let stats = FoundationStats {
            structures: foundation.structures.len(),
            markers: foundation.markers.len(),
            settlements: foundation.settlements.len(),
            meshes: (self.meshes.issued() - issued_before) as usize,
        };
        tracing::info!(
            structures = stats.structures,
            markers = stats.markers,
            settlements = stats.settlements,
            "scene foundation loaded"
        );
        Ok(stats)
    }

    /// Full scene teardown: tiles, LOD groups, selectable entries and the
    /// current selection.
    pub fn teardown(&mut self) {
        tracing::info!(
            resident = self.streamer.resident_count(),
            structures = self.lod.len(),
            "scene teardown"
        );
        self.streamer.clear();
        self.lod.clear();
        self.selection.clear();
        if self.selected.take().is_some() {
            self.emit_selection();
        }
    }

    /// Advance one frame: camera, then streaming, then LOD, then the click.
    pub fn frame(&mut self, dt: Duration, input: &FrameInput) -> FrameReport {
        self.frame += 1;
        let look = if self.capture.is_captured() {
            input.look
        } else {
            LookDelta::default()
        };
        self.camera.tick(dt.as_secs_f32(), &input.movement, look);
        let viewpoint = self.camera.position();

        let stream = self.streamer.tick(viewpoint, dt, &self.sampler);
        let lod = self.lod.update(viewpoint);
        let click = input.click.map(|ndc| self.click(ndc));

        FrameReport {
            frame: self.frame,
            viewpoint,
            stream,
            lod,
            click,
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::CapturePointer(captured) => self.set_pointer_captured(captured),
            Action::Click(ndc) => {
                self.click(ndc);
            }
            Action::Deselect => {
                self.selected = None;
                self.emit_selection();
            }
            Action::Teardown => self.teardown(),
            Action::Noop => {}
        }
    }

    /// Resolve a click at normalized device coordinates through the camera.
    pub fn click(&mut self, ndc: Vec2) -> Option<SelectionResult> {
        let ray = self.camera.screen_ray(ndc);
        self.pick(&ray)
    }

    /// Resolve a world ray, store it as the current selection and notify the UI.
    pub fn pick(&mut self, ray: &Ray) -> Option<SelectionResult> {
        let result = self.selection.resolve(
            ray,
            self.streamer.tiles().map(|record| record.mesh()),
            &self.sampler,
        );
        match &result {
            Some(SelectionResult::Entity { kind, id, .. }) => {
                tracing::debug!(%kind, id = %id.short(), "picked entity");
            }
            Some(SelectionResult::Terrain(sample)) => {
                tracing::debug!(tile = %sample.tile, biome = ?sample.biome, "picked terrain");
            }
            None => tracing::debug!("pick missed"),
        }
        self.selected = result.clone();
        self.emit_selection();
        result
    }

    pub fn set_pointer_captured(&mut self, captured: bool) {
        if let Some(fly_mode) = self.capture.set(captured) {
            if let Some(callback) = self.on_fly_mode_changed.as_mut() {
                callback(fly_mode);
            }
        }
    }

    pub fn on_select(&mut self, callback: impl FnMut(Option<&SelectionResult>) + 'static) {
        self.on_select = Some(Box::new(callback));
    }

    pub fn on_fly_mode_changed(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_fly_mode_changed = Some(Box::new(callback));
    }

    fn emit_selection(&mut self) {
        if let Some(callback) = self.on_select.as_mut() {
            callback(self.selected.as_ref());
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn camera(&self) -> &FlyCameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut FlyCameraController {
        &mut self.camera
    }

    pub fn streamer(&self) -> &TileStreamer {
        &self.streamer
    }

    pub fn lod(&self) -> &LodManager {
        &self.lod
    }

    pub fn selection(&self) -> &SelectionIndex {
        &self.selection
    }

    pub fn selected(&self) -> Option<&SelectionResult> {
        self.selected.as_ref()
    }

    pub fn fly_mode(&self) -> bool {
        self.capture.is_captured()
    }

    pub fn metrics(&self) -> &StreamMetrics {
        self.streamer.metrics()
    }

    pub fn summary(&self) -> ViewerSummary {
        let selected = self.selected.as_ref().map(|s| match s {
            SelectionResult::Entity { id, .. } => id.short(),
            SelectionResult::Terrain(_) => "terrain".to_string(),
        });
        ViewerSummary {
            frame: self.frame,
            position: self.camera.position(),
            speed: self.camera.viewpoint().speed(),
            viewpoint_tile: self.streamer.viewpoint_tile(),
            fly_mode: self.fly_mode(),
            stream: self.streamer.metrics().clone(),
            tiers: self.lod.tier_counts(),
            selectable: self.selection.len(),
            settlements: self.selection.settlements().len(),
            selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use worldview_input::MoveInput;
    use worldview_lod::ActiveTier;
    use worldview_select::Settlement;
    use worldview_stream::TileCoord;
    use worldview_terrain::{Biome, SamplerError, SurfaceSample};

    use crate::foundation::{StructureSpec, ZoneMarkerSpec};

    const FRAME: Duration = Duration::from_micros(16_667);

    struct Flat;

    impl TerrainSampler for Flat {
        fn sample(&self, _x: f32, _z: f32) -> Result<SurfaceSample, SamplerError> {
            Ok(SurfaceSample {
                height: 5.0,
                biome: Biome::Forest,
                normal: Vec3::Y,
            })
        }

        fn water_level(&self) -> f32 {
            0.0
        }
    }

    fn config() -> ViewerConfig {
        let mut config = ViewerConfig::default();
        config.stream.tile_resolution = 9;
        config
    }

    fn viewer() -> TerrainViewer<Flat> {
        TerrainViewer::new(config(), Flat).unwrap()
    }

    fn structure(id: u128, x: f32, z: f32) -> StructureSpec {
        StructureSpec {
            id: EntityId::from_u128(id),
            anchor: Vec3::new(x, 5.0, z),
            half_extent: Vec3::new(6.0, 8.0, 6.0),
            settlement: Some(EntityId::from_u128(1000)),
        }
    }

    fn foundation() -> SceneFoundation {
        SceneFoundation {
            settlements: vec![Settlement {
                id: EntityId::from_u128(1000),
                anchor: Vec2::new(1000.0, 1000.0),
                radius: 150.0,
                name: "Ashford".into(),
            }],
            structures: vec![
                structure(1, 1000.0, 1000.0),
                structure(2, 1300.0, 1000.0),
                structure(3, 1900.0, 1000.0),
            ],
            markers: vec![ZoneMarkerSpec {
                id: EntityId::from_u128(50),
                center: Vec3::new(400.0, 20.0, 400.0),
                radius: 10.0,
                settlement: None,
            }],
        }
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    #[test]
    fn streams_the_load_square_around_the_camera() {
        let mut v = viewer();
        for _ in 0..61 {
            v.frame(FRAME, &idle());
        }
        assert_eq!(v.streamer().viewpoint_tile(), Some(TileCoord::new(10, 10)));
        assert_eq!(v.metrics().resident_tiles, 121);
        assert_eq!(v.metrics().tile_budget, 400);
        assert_eq!(v.metrics().queue_depth, 0);
    }

    #[test]
    fn foundation_builds_three_representations_per_structure() {
        let mut v = viewer();
        let stats = v.load_foundation(&foundation()).unwrap();
        assert_eq!(stats.structures, 3);
        assert_eq!(stats.markers, 1);
        assert_eq!(stats.meshes, 10);
        assert_eq!(v.lod().len(), 3);
        assert_eq!(v.selection().len(), 4);
    }

    #[test]
    fn duplicate_entities_rejected() {
        let mut v = viewer();
        v.load_foundation(&foundation()).unwrap();
        let again = SceneFoundation {
            structures: vec![structure(2, 0.0, 0.0)],
            ..SceneFoundation::default()
        };
        assert_eq!(
            v.load_foundation(&again),
            Err(ViewerError::DuplicateEntity(EntityId::from_u128(2)))
        );
    }

    #[test]
    fn lod_tiers_follow_camera_distance() {
        let mut v = viewer();
        v.load_foundation(&foundation()).unwrap();
        v.camera_mut().teleport(Vec3::new(1000.0, 50.0, 1000.0));
        let report = v.frame(FRAME, &idle());
        assert_eq!(report.lod.counts.total(), 3);

        let tier = |v: &TerrainViewer<Flat>, id| {
            v.lod().get(EntityId::from_u128(id)).unwrap().active()
        };
        assert_eq!(tier(&v, 1), ActiveTier::Full);
        assert_eq!(tier(&v, 2), ActiveTier::Simplified);
        assert_eq!(tier(&v, 3), ActiveTier::Minimal);

        v.camera_mut().teleport(Vec3::new(1850.0, 50.0, 1000.0));
        v.frame(FRAME, &idle());
        assert_eq!(tier(&v, 1), ActiveTier::Minimal);
        assert_eq!(tier(&v, 3), ActiveTier::Full);
    }

    #[test]
    fn click_straight_down_selects_structure_over_terrain() {
        let mut v = viewer();
        v.load_foundation(&foundation()).unwrap();
        for _ in 0..5 {
            v.frame(FRAME, &idle());
        }
        v.camera_mut().teleport(Vec3::new(1000.0, 200.0, 1000.0));
        v.camera_mut().set_orientation(0.0, -89f32.to_radians());

        let report = v.frame(
            FRAME,
            &FrameInput {
                click: Some(Vec2::ZERO),
                ..FrameInput::default()
            },
        );
        let Some(Some(SelectionResult::Entity { kind, id, parent, .. })) = report.click else {
            panic!("expected an entity hit");
        };
        assert_eq!(kind, EntityKind::Structure);
        assert_eq!(id, EntityId::from_u128(1));
        assert_eq!(parent, Some(EntityId::from_u128(1000)));
        assert_eq!(v.selected().and_then(|s| s.entity_id()), Some(id));
    }

    #[test]
    fn terrain_pick_reports_tile_and_settlement() {
        let mut v = viewer();
        v.load_foundation(&foundation()).unwrap();
        for _ in 0..61 {
            v.frame(FRAME, &idle());
        }
        let ray = Ray::new(Vec3::new(1052.0, 300.0, 1047.0), Vec3::NEG_Y);
        let Some(SelectionResult::Terrain(sample)) = v.pick(&ray) else {
            panic!("expected terrain");
        };
        assert_eq!(sample.tile, TileCoord::new(10, 10));
        assert_eq!(sample.biome, Biome::Forest);
        assert!(sample.walkable);
        assert_eq!(sample.settlement, Some(EntityId::from_u128(1000)));
        assert_eq!(sample.difficulty, 0);
    }

    #[test]
    fn miss_deselects_and_notifies() {
        let mut v = viewer();
        let seen: Rc<RefCell<Vec<bool>>> = Rc::default();
        let sink = Rc::clone(&seen);
        v.on_select(move |s| sink.borrow_mut().push(s.is_some()));

        v.load_foundation(&foundation()).unwrap();
        v.pick(&Ray::new(Vec3::new(1000.0, 300.0, 1000.0), Vec3::NEG_Y));
        // Nothing streamed yet and the ray points at the sky: deselect.
        v.pick(&Ray::new(Vec3::new(1500.0, 300.0, 1500.0), Vec3::Y));
        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(v.selected().is_none());
    }

    #[test]
    fn fly_mode_fires_on_transitions_only() {
        let mut v = viewer();
        let seen: Rc<RefCell<Vec<bool>>> = Rc::default();
        let sink = Rc::clone(&seen);
        v.on_fly_mode_changed(move |on| sink.borrow_mut().push(on));

        v.apply(Action::CapturePointer(true));
        v.apply(Action::CapturePointer(true));
        v.apply(Action::CapturePointer(false));
        v.apply(Action::Noop);
        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(!v.fly_mode());
    }

    #[test]
    fn look_only_applies_in_fly_mode() {
        let mut v = viewer();
        let yaw = v.camera().viewpoint().yaw;
        let turn = FrameInput {
            look: LookDelta::new(100.0, 0.0),
            ..FrameInput::default()
        };
        v.frame(FRAME, &turn);
        assert_eq!(v.camera().viewpoint().yaw, yaw);

        v.set_pointer_captured(true);
        v.frame(FRAME, &turn);
        assert!(v.camera().viewpoint().yaw > yaw);
    }

    #[test]
    fn flying_moves_the_streamed_neighbourhood() {
        let mut v = viewer();
        v.camera_mut().set_orientation(0.0, 0.0);
        let input = FrameInput {
            movement: MoveInput {
                forward: true,
                boost: true,
                ..MoveInput::default()
            },
            ..FrameInput::default()
        };
        for _ in 0..120 {
            v.frame(FRAME, &input);
        }
        let tile = v.streamer().viewpoint_tile().unwrap();
        assert!(tile.x > 10);
        assert_eq!(tile.z, 10);
        assert!(v.metrics().total_generated > 0);
    }

    #[test]
    fn teardown_releases_everything() {
        let mut v = viewer();
        v.load_foundation(&foundation()).unwrap();
        for _ in 0..10 {
            v.frame(FRAME, &idle());
        }
        v.apply(Action::Click(Vec2::ZERO));
        v.apply(Action::Teardown);
        assert_eq!(v.streamer().resident_count(), 0);
        assert!(v.lod().is_empty());
        assert!(v.selection().is_empty());
        assert!(v.selected().is_none());

        // The scene can be loaded again after teardown.
        assert!(v.load_foundation(&foundation()).is_ok());
    }

    #[test]
    fn summary_reflects_state() {
        let mut v = viewer();
        v.load_foundation(&foundation()).unwrap();
        v.frame(FRAME, &idle());
        let s = v.summary();
        assert_eq!(s.frame, 1);
        assert_eq!(s.selectable, 4);
        assert_eq!(s.settlements, 1);
        assert_eq!(s.stream.resident_tiles, 2);
        assert!(s.to_string().contains("resident=2/400"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = config();
        config.camera.move_speed = -1.0;
        assert!(matches!(
            TerrainViewer::new(config, Flat),
            Err(ViewerError::Camera(_))
        ));
    }
}
