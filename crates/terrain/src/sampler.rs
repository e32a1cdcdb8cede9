use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Biome classification returned by the generator for a surface point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Ocean,
    Beach,
    Grassland,
    Forest,
    Desert,
    Tundra,
    Mountains,
    Snow,
}

impl Biome {
    pub const ALL: [Biome; 8] = [
        Biome::Ocean,
        Biome::Beach,
        Biome::Grassland,
        Biome::Forest,
        Biome::Desert,
        Biome::Tundra,
        Biome::Mountains,
        Biome::Snow,
    ];

    /// Numeric id reported to the editor UI.
    pub fn id(self) -> u8 {
        match self {
            Biome::Ocean => 0,
            Biome::Beach => 1,
            Biome::Grassland => 2,
            Biome::Forest => 3,
            Biome::Desert => 4,
            Biome::Tundra => 5,
            Biome::Mountains => 6,
            Biome::Snow => 7,
        }
    }

    /// Base vertex colour (linear RGB) used by terrain tiles.
    pub fn base_color(self) -> [f32; 3] {
        match self {
            Biome::Ocean => [0.12, 0.31, 0.59],
            Biome::Beach => [0.93, 0.84, 0.69],
            Biome::Grassland => [0.39, 0.71, 0.31],
            Biome::Forest => [0.20, 0.47, 0.16],
            Biome::Desert => [0.93, 0.79, 0.69],
            Biome::Tundra => [0.63, 0.71, 0.67],
            Biome::Mountains => [0.47, 0.47, 0.47],
            Biome::Snow => [0.94, 0.97, 1.0],
        }
    }
}

/// One answer from the generator oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub height: f32,
    pub biome: Biome,
    /// Unit surface normal.
    pub normal: Vec3,
}

impl SurfaceSample {
    /// Slope angle in degrees (0 = flat, 90 = vertical).
    pub fn slope_degrees(&self) -> f32 {
        self.normal.y.clamp(-1.0, 1.0).acos().to_degrees()
    }
}

/// Failures reported by a generator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplerError {
    #[error("non-finite height {height} at ({x}, {z})")]
    NonFinite { x: f32, z: f32, height: f32 },
    #[error("generator unavailable at ({x}, {z}): {reason}")]
    Unavailable { x: f32, z: f32, reason: String },
}

/// The spatial generator seen by the streaming core.
///
/// Implementations must be pure and deterministic for a fixed seed: the same
/// `(x, z)` always yields the same sample. Streaming relies on this to make
/// evicted-then-reloaded tiles identical.
pub trait TerrainSampler {
    /// Height, biome and normal at a world position.
    fn sample(&self, x: f32, z: f32) -> Result<SurfaceSample, SamplerError>;

    /// Elevation of the water surface; heights below it are submerged.
    fn water_level(&self) -> f32;
}

impl<T: TerrainSampler + ?Sized> TerrainSampler for &T {
    fn sample(&self, x: f32, z: f32) -> Result<SurfaceSample, SamplerError> {
        (**self).sample(x, z)
    }

    fn water_level(&self) -> f32 {
        (**self).water_level()
    }
}

impl<T: TerrainSampler + ?Sized> TerrainSampler for Box<T> {
    fn sample(&self, x: f32, z: f32) -> Result<SurfaceSample, SamplerError> {
        (**self).sample(x, z)
    }

    fn water_level(&self) -> f32 {
        (**self).water_level()
    }
}

/// Rejects non-finite heights so a bad oracle can never leak NaN into a mesh.
pub fn sample_checked(
    sampler: &dyn TerrainSampler,
    x: f32,
    z: f32,
) -> Result<SurfaceSample, SamplerError> {
    let sample = sampler.sample(x, z)?;
    if !sample.height.is_finite() {
        return Err(SamplerError::NonFinite {
            x,
            z,
            height: sample.height,
        });
    }
    Ok(sample)
}
