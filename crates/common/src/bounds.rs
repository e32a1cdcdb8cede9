use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Errors from invalid world extents.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoundsError {
    #[error("world must be at least one tile wide, got {tiles_x}x{tiles_z}")]
    Empty { tiles_x: i32, tiles_z: i32 },
    #[error("tile_size must be positive and finite, got {0}")]
    TileSize(f32),
}

/// Finite world extent on a regular tile grid. Tiles `[0, tiles_x) x [0, tiles_z)`
/// exist; world space starts at the origin and grows along +X and +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldBounds {
    pub tiles_x: i32,
    pub tiles_z: i32,
    /// Edge length of one tile in meters.
    pub tile_size: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            tiles_x: 20,
            tiles_z: 20,
            tile_size: 100.0,
        }
    }
}

impl WorldBounds {
    pub fn new(tiles_x: i32, tiles_z: i32, tile_size: f32) -> Self {
        Self {
            tiles_x,
            tiles_z,
            tile_size,
        }
    }

    pub fn validate(&self) -> Result<(), BoundsError> {
        if self.tiles_x < 1 || self.tiles_z < 1 {
            return Err(BoundsError::Empty {
                tiles_x: self.tiles_x,
                tiles_z: self.tiles_z,
            });
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(BoundsError::TileSize(self.tile_size));
        }
        Ok(())
    }

    pub fn contains_tile(&self, x: i32, z: i32) -> bool {
        (0..self.tiles_x).contains(&x) && (0..self.tiles_z).contains(&z)
    }

    /// Total number of tiles in the world (the streaming "budget" shown to the UI).
    pub fn tile_count(&self) -> usize {
        self.tiles_x.max(0) as usize * self.tiles_z.max(0) as usize
    }

    /// World extent in meters along X and Z.
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.tiles_x as f32, self.tiles_z as f32) * self.tile_size
    }

    pub fn center(&self) -> Vec2 {
        self.extent() * 0.5
    }

    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        let extent = self.extent();
        (0.0..=extent.x).contains(&x) && (0.0..=extent.y).contains(&z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_twenty_by_twenty() {
        let b = WorldBounds::default();
        assert_eq!(b.tile_count(), 400);
        assert_eq!(b.extent(), Vec2::new(2000.0, 2000.0));
        assert_eq!(b.center(), Vec2::new(1000.0, 1000.0));
        assert!(b.validate().is_ok());
    }

    #[test]
    fn contains_tile_edges() {
        let b = WorldBounds::new(4, 3, 10.0);
        assert!(b.contains_tile(0, 0));
        assert!(b.contains_tile(3, 2));
        assert!(!b.contains_tile(4, 0));
        assert!(!b.contains_tile(0, -1));
    }

    #[test]
    fn validate_rejects_bad_extents() {
        assert!(matches!(
            WorldBounds::new(0, 5, 10.0).validate(),
            Err(BoundsError::Empty { .. })
        ));
        assert!(matches!(
            WorldBounds::new(5, 5, f32::NAN).validate(),
            Err(BoundsError::TileSize(_))
        ));
    }
}
