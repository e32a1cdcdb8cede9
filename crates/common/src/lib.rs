//! Shared types for the worldview engine: entity ids, mesh handles, world
//! bounds and the ray/box geometry used by picking.
//!
//! # Invariants
//! - Ray directions are always normalized (or zero, which hits nothing).
//! - World bounds start at the origin; tile `(0, 0)` covers `[0, tile_size)`.

mod bounds;
mod geometry;
mod types;

pub use bounds::{BoundsError, WorldBounds};
pub use geometry::{Aabb, Ray};
pub use types::{EntityId, MeshHandle, MeshHandleAllocator};

pub fn crate_info() -> &'static str {
    "worldview-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
