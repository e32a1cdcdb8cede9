//! Spatial Generator Adapter: the terrain oracle consumed by streaming and picking.
//!
//! # Invariants
//! - Sampling is pure with respect to `(x, z)` for a fixed seed.
//! - Non-finite heights are reported as errors, never returned as samples.

mod procedural;
mod sampler;

pub use procedural::{ProceduralTerrain, TerrainParams};
pub use sampler::{Biome, SamplerError, SurfaceSample, TerrainSampler, sample_checked};

pub fn crate_info() -> &'static str {
    "worldview-terrain v0.1.0"
}
