//! Structure level of detail: three pre-built representations per structure,
//! one active at a time, selected by distance to the viewer.
//!
//! # Invariants
//! - The active tier is a pure function of distance; path taken does not matter.
//! - Switching tiers never rebuilds geometry, it only changes `ActiveTier`.

mod manager;
mod tier;

pub use manager::{LodManager, LodRepresentations, LodUpdate, StructureLodGroup, TierCounts};
pub use tier::{ActiveTier, LodError, LodThresholds};

pub fn crate_info() -> &'static str {
    "worldview-lod v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("lod"));
    }
}
