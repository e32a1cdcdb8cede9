use glam::Vec3;
use serde::Serialize;
use worldview_common::{EntityId, MeshHandle, Ray, WorldBounds};
use worldview_stream::TileMesh;
use worldview_terrain::{TerrainSampler, sample_checked};

use crate::entry::{EntityKind, SelectableEntry, Settlement};
use crate::rules::{SampleRules, TileSampleResult, settlement_at};

/// Outcome of a click. `None` from [`SelectionIndex::resolve`] means deselect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionResult {
    Entity {
        kind: EntityKind,
        id: EntityId,
        mesh: MeshHandle,
        parent: Option<EntityId>,
        hit: Vec3,
        distance: f32,
    },
    Terrain(TileSampleResult),
}

impl SelectionResult {
    pub fn entity_id(&self) -> Option<EntityId> {
        match self {
            SelectionResult::Entity { id, .. } => Some(*id),
            SelectionResult::Terrain(_) => None,
        }
    }
}

/// Pick-ready set of selectable entries and settlement footprints.
///
/// Entries are added as structures are generated and removed only by
/// [`SelectionIndex::clear`] on scene teardown.
#[derive(Debug)]
pub struct SelectionIndex {
    entries: Vec<SelectableEntry>,
    settlements: Vec<Settlement>,
    bounds: WorldBounds,
    rules: SampleRules,
}

impl SelectionIndex {
    pub fn new(bounds: WorldBounds, rules: SampleRules) -> Self {
        Self {
            entries: Vec::new(),
            settlements: Vec::new(),
            bounds,
            rules,
        }
    }

    pub fn register(&mut self, entry: SelectableEntry) {
        self.entries.push(entry);
    }

    pub fn register_settlement(&mut self, settlement: Settlement) {
        self.settlements.push(settlement);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.settlements.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SelectableEntry] {
        &self.entries
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    pub fn rules(&self) -> &SampleRules {
        &self.rules
    }

    /// Resolve a pick ray. Selectable entries are tested first and the nearest
    /// one wins outright; only when none is hit are resident terrain meshes
    /// tested.
    pub fn resolve<'a>(
        &self,
        ray: &Ray,
        tiles: impl IntoIterator<Item = &'a TileMesh>,
        sampler: &dyn TerrainSampler,
    ) -> Option<SelectionResult> {
        if let Some(hit) = self.pick_entity(ray) {
            return Some(hit);
        }
        self.pick_terrain(ray, tiles, sampler)
            .map(SelectionResult::Terrain)
    }

    fn pick_entity(&self, ray: &Ray) -> Option<SelectionResult> {
        let (entry, t) = self
            .entries
            .iter()
            .filter_map(|e| e.shape.intersect(ray).map(|t| (e, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        Some(SelectionResult::Entity {
            kind: entry.kind,
            id: entry.id,
            mesh: entry.mesh,
            parent: entry.parent,
            hit: ray.at(t),
            distance: t,
        })
    }

    fn pick_terrain<'a>(
        &self,
        ray: &Ray,
        tiles: impl IntoIterator<Item = &'a TileMesh>,
        sampler: &dyn TerrainSampler,
    ) -> Option<TileSampleResult> {
        let (mesh, t) = tiles
            .into_iter()
            .filter_map(|m| m.raycast(ray).map(|t| (m, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        let world = ray.at(t);

        let sample = match sample_checked(sampler, world.x, world.z) {
            Ok(sample) => sample,
            Err(err) => {
                tracing::warn!(tile = %mesh.coord(), %err, "terrain pick abandoned");
                return None;
            }
        };
        let slope_deg = sample.slope_degrees();
        let water_level = sampler.water_level();

        Some(TileSampleResult {
            world,
            tile: mesh.coord(),
            chunk: mesh.cell_at(world.x, world.z),
            height: sample.height,
            biome: sample.biome,
            slope_deg,
            walkable: self.rules.walkable(slope_deg, sample.height, water_level),
            settlement: settlement_at(&self.settlements, world.x, world.z),
            hostile: self.rules.hostile.contains(world.x, world.z),
            difficulty: self.rules.difficulty(&self.bounds, world.x, world.z),
        })
    }
}
