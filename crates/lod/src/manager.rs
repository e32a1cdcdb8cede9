use std::collections::HashMap;

use glam::Vec3;
use serde::Serialize;
use worldview_common::{EntityId, MeshHandle};

use crate::tier::{ActiveTier, LodError, LodThresholds};

/// The three pre-built meshes of one structure. Built once when the structure
/// is generated; switching tiers only changes which one is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LodRepresentations {
    pub full: MeshHandle,
    pub simplified: MeshHandle,
    pub minimal: MeshHandle,
}

impl LodRepresentations {
    pub fn mesh(&self, tier: ActiveTier) -> MeshHandle {
        match tier {
            ActiveTier::Full => self.full,
            ActiveTier::Simplified => self.simplified,
            ActiveTier::Minimal => self.minimal,
        }
    }
}

/// One structure's LOD state.
#[derive(Debug, Clone)]
pub struct StructureLodGroup {
    id: EntityId,
    anchor: Vec3,
    representations: LodRepresentations,
    thresholds: LodThresholds,
    active: ActiveTier,
}

impl StructureLodGroup {
    /// New group showing the full tier until the first update.
    pub fn new(
        id: EntityId,
        anchor: Vec3,
        representations: LodRepresentations,
        thresholds: LodThresholds,
    ) -> Result<Self, LodError> {
        thresholds.validate()?;
        Ok(Self {
            id,
            anchor,
            representations,
            thresholds,
            active: ActiveTier::Full,
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn active(&self) -> ActiveTier {
        self.active
    }

    pub fn representations(&self) -> &LodRepresentations {
        &self.representations
    }

    pub fn active_mesh(&self) -> MeshHandle {
        self.representations.mesh(self.active)
    }

    /// Visibility flag the renderer applies to the mesh of `tier`.
    pub fn is_visible(&self, tier: ActiveTier) -> bool {
        self.active == tier
    }

    /// Re-select the tier for a viewer position. Returns the previous tier if it changed.
    pub fn update(&mut self, viewpoint: Vec3) -> Option<ActiveTier> {
        let tier = self.thresholds.tier_for(self.anchor.distance(viewpoint));
        if tier == self.active {
            return None;
        }
        let previous = self.active;
        self.active = tier;
        Some(previous)
    }
}

/// Count of structures per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub full: usize,
    pub simplified: usize,
    pub minimal: usize,
}

impl TierCounts {
    pub fn total(&self) -> usize {
        self.full + self.simplified + self.minimal
    }
}

/// Summary of one `LodManager::update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LodUpdate {
    /// Groups whose active tier changed this frame.
    pub switched: usize,
    pub counts: TierCounts,
}

/// Owns every structure's LOD group and re-evaluates tiers once per frame.
#[derive(Debug, Default)]
pub struct LodManager {
    groups: Vec<StructureLodGroup>,
    index: HashMap<EntityId, usize>,
}

impl LodManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group. A second group with the same id replaces the first.
    pub fn insert(&mut self, group: StructureLodGroup) {
        match self.index.get(&group.id) {
            Some(&slot) => self.groups[slot] = group,
            None => {
                self.index.insert(group.id, self.groups.len());
                self.groups.push(group);
            }
        }
    }

    pub fn update(&mut self, viewpoint: Vec3) -> LodUpdate {
        let mut result = LodUpdate::default();
        for group in &mut self.groups {
            if let Some(previous) = group.update(viewpoint) {
                tracing::trace!(
                    id = %group.id.short(),
                    from = %previous,
                    to = %group.active,
                    "lod switch"
                );
                result.switched += 1;
            }
        }
        result.counts = self.tier_counts();
        result
    }

    pub fn get(&self, id: EntityId) -> Option<&StructureLodGroup> {
        self.index.get(&id).map(|&slot| &self.groups[slot])
    }

    pub fn groups(&self) -> impl Iterator<Item = &StructureLodGroup> {
        self.groups.iter()
    }

    pub fn tier_counts(&self) -> TierCounts {
        let mut counts = TierCounts::default();
        for group in &self.groups {
            match group.active {
                ActiveTier::Full => counts.full += 1,
                ActiveTier::Simplified => counts.simplified += 1,
                ActiveTier::Minimal => counts.minimal += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.index.clear();
    }
}
