use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use worldview_common::WorldBounds;

/// A tile coordinate on the world grid (X/Z plane, Y ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub z: i32,
}

impl TileCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Tile containing a world position: `floor(position / tile_size)` on X and Z.
    pub fn from_world(pos: Vec3, tile_size: f32) -> Self {
        Self {
            x: (pos.x / tile_size).floor() as i32,
            z: (pos.z / tile_size).floor() as i32,
        }
    }

    pub fn key(self) -> TileKey {
        TileKey::from(self)
    }

    /// Square-ring distance used for eviction. Saturates at `i32::MAX`.
    pub fn chebyshev(self, other: TileCoord) -> i32 {
        let d = self.x.abs_diff(other.x).max(self.z.abs_diff(other.z));
        i32::try_from(d).unwrap_or(i32::MAX)
    }

    /// Grid distance used to order the load queue. Saturates at `i32::MAX`.
    pub fn manhattan(self, other: TileCoord) -> i32 {
        let d = u64::from(self.x.abs_diff(other.x)) + u64::from(self.z.abs_diff(other.z));
        i32::try_from(d).unwrap_or(i32::MAX)
    }

    /// World-space XZ of the tile's minimum corner.
    pub fn origin(self, tile_size: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.z as f32) * tile_size
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Packed 64-bit registry key: high word = x, low word = z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey(pub u64);

impl From<TileCoord> for TileKey {
    fn from(c: TileCoord) -> Self {
        Self(((c.x as u32 as u64) << 32) | c.z as u32 as u64)
    }
}

impl From<TileKey> for TileCoord {
    fn from(k: TileKey) -> Self {
        TileCoord::new((k.0 >> 32) as u32 as i32, k.0 as u32 as i32)
    }
}

/// In-bounds coordinates in the square neighborhood of `radius` around `center`,
/// row by row (z outer, x inner) so callers see a stable order.
///
/// The square is clipped to the world before iterating, so a center far
/// outside the world yields nothing.
pub fn tiles_in_radius(
    center: TileCoord,
    radius: i32,
    bounds: WorldBounds,
) -> impl Iterator<Item = TileCoord> {
    let radius = radius.max(0);
    let span = |c: i32, tiles: i32| {
        let lo = c.saturating_sub(radius).max(0);
        let hi = c.saturating_add(radius).min(tiles.saturating_sub(1));
        lo..=hi
    };
    let xs = span(center.x, bounds.tiles_x);
    let zs = span(center.z, bounds.tiles_z);
    zs.flat_map(move |z| xs.clone().map(move |x| TileCoord::new(x, z)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_world_floors() {
        assert_eq!(
            TileCoord::from_world(Vec3::new(10.0, 50.0, 10.0), 100.0),
            TileCoord::new(0, 0)
        );
        assert_eq!(
            TileCoord::from_world(Vec3::new(250.0, 0.0, -5.0), 100.0),
            TileCoord::new(2, -1)
        );
    }

    #[test]
    fn key_packs_and_unpacks_negatives() {
        for coord in [
            TileCoord::new(0, 0),
            TileCoord::new(-1, 7),
            TileCoord::new(i32::MAX, i32::MIN),
            TileCoord::new(15, -15),
        ] {
            assert_eq!(TileCoord::from(coord.key()), coord);
        }
        assert_ne!(TileCoord::new(1, 2).key(), TileCoord::new(2, 1).key());
    }

    #[test]
    fn distances() {
        let a = TileCoord::new(0, 0);
        let b = TileCoord::new(3, -2);
        assert_eq!(a.chebyshev(b), 3);
        assert_eq!(a.manhattan(b), 5);
    }

    #[test]
    fn radius_is_clipped_to_bounds() {
        let bounds = WorldBounds::new(20, 20, 100.0);
        assert_eq!(tiles_in_radius(TileCoord::new(10, 10), 5, bounds).count(), 121);
        // Corner: only the in-world quadrant survives.
        assert_eq!(tiles_in_radius(TileCoord::new(0, 0), 5, bounds).count(), 36);
        assert_eq!(tiles_in_radius(TileCoord::new(-50, 0), 5, bounds).count(), 0);
    }

    #[test]
    fn radius_order_is_row_major() {
        let bounds = WorldBounds::new(20, 20, 100.0);
        let coords: Vec<_> = tiles_in_radius(TileCoord::new(0, 0), 1, bounds).collect();
        assert_eq!(
            coords,
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn far_coordinates_do_not_overflow() {
        let bounds = WorldBounds::new(20, 20, 100.0);
        let far = TileCoord::from_world(Vec3::new(1e12, 0.0, 1e12), 100.0);
        let near = TileCoord::from_world(Vec3::new(-1e12, 0.0, -1e12), 100.0);
        assert_eq!(far, TileCoord::new(i32::MAX, i32::MAX));
        assert_eq!(near, TileCoord::new(i32::MIN, i32::MIN));

        assert_eq!(tiles_in_radius(far, 5, bounds).count(), 0);
        assert_eq!(tiles_in_radius(near, 5, bounds).count(), 0);
        assert_eq!(tiles_in_radius(far, i32::MAX, bounds).count(), 400);

        let home = TileCoord::new(5, 5);
        assert_eq!(home.chebyshev(near), i32::MAX);
        assert_eq!(home.manhattan(near), i32::MAX);
        assert_eq!(far.chebyshev(near), i32::MAX);
        assert_eq!(home.chebyshev(far), i32::MAX - 5);
        assert_eq!(home.manhattan(TileCoord::new(i32::MAX, 5)), i32::MAX - 5);
    }
}
