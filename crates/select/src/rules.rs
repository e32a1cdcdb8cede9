use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use worldview_common::{EntityId, WorldBounds};
use worldview_stream::TileCoord;
use worldview_terrain::Biome;

use crate::entry::Settlement;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RulesError {
    #[error("slope threshold must be within (0, 90] degrees, got {0}")]
    Slope(f32),
    #[error("difficulty needs at least one band")]
    NoBands,
    #[error("hostile threshold must be finite, got {0}")]
    Hostile(f32),
}

/// World axis on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Z,
}

/// Half-space of the world flagged hostile: every point whose `axis`
/// coordinate is at or beyond `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostileRegion {
    pub axis: Axis,
    pub threshold: f32,
}

impl HostileRegion {
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let v = match self.axis {
            Axis::X => x,
            Axis::Z => z,
        };
        v >= self.threshold
    }
}

/// Rules that turn a terrain hit into a [`TileSampleResult`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleRules {
    /// Steepest walkable slope, degrees.
    pub slope_threshold_deg: f32,
    pub hostile: HostileRegion,
    pub difficulty_bands: u8,
}

impl Default for SampleRules {
    fn default() -> Self {
        Self {
            slope_threshold_deg: 35.0,
            hostile: HostileRegion {
                axis: Axis::X,
                threshold: 1500.0,
            },
            difficulty_bands: 5,
        }
    }
}

impl SampleRules {
    pub fn validate(&self) -> Result<(), RulesError> {
        if !(self.slope_threshold_deg > 0.0 && self.slope_threshold_deg <= 90.0) {
            return Err(RulesError::Slope(self.slope_threshold_deg));
        }
        if self.difficulty_bands == 0 {
            return Err(RulesError::NoBands);
        }
        if !self.hostile.threshold.is_finite() {
            return Err(RulesError::Hostile(self.hostile.threshold));
        }
        Ok(())
    }

    pub fn walkable(&self, slope_deg: f32, height: f32, water_level: f32) -> bool {
        slope_deg < self.slope_threshold_deg && height > water_level
    }

    /// Difficulty band from radial distance to the world centre. Bands split the
    /// centre-to-corner distance evenly; anything beyond the corner lands in the
    /// last band.
    pub fn difficulty(&self, bounds: &WorldBounds, x: f32, z: f32) -> u8 {
        let bands = self.difficulty_bands.max(1);
        let reach = (bounds.extent() * 0.5).length();
        if reach <= 0.0 {
            return 0;
        }
        let distance = bounds.center().distance(Vec2::new(x, z));
        let band = (distance / reach * f32::from(bands)).floor();
        band.clamp(0.0, f32::from(bands - 1)) as u8
    }
}

/// Everything the editor shows about a picked terrain point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSampleResult {
    pub world: Vec3,
    pub tile: TileCoord,
    /// Tile-local grid cell.
    pub chunk: (u32, u32),
    pub height: f32,
    pub biome: Biome,
    pub slope_deg: f32,
    pub walkable: bool,
    pub settlement: Option<EntityId>,
    pub hostile: bool,
    pub difficulty: u8,
}

/// Closest settlement whose footprint covers `(x, z)`.
pub(crate) fn settlement_at(settlements: &[Settlement], x: f32, z: f32) -> Option<EntityId> {
    let p = Vec2::new(x, z);
    settlements
        .iter()
        .filter(|s| s.contains_xz(x, z))
        .min_by(|a, b| {
            a.anchor
                .distance_squared(p)
                .total_cmp(&b.anchor.distance_squared(p))
        })
        .map(|s| s.id)
}
