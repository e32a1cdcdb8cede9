//! Noise-based reference generator, used by the CLI and tests.

use glam::Vec3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::sampler::{Biome, SamplerError, SurfaceSample, TerrainSampler};

/// Parameters controlling the procedural heightfield.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub seed: u32,
    /// Horizontal scale in meters (larger = smoother).
    pub scale: f32,
    /// Peak amplitude of the heightfield above/below zero.
    pub height_scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub water_level: f32,
    /// Height band above water classified as beach.
    pub beach_band: f32,
    pub moisture_scale: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 600.0,
            height_scale: 120.0,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            water_level: 0.0,
            beach_band: 3.0,
            moisture_scale: 900.0,
        }
    }
}

/// Step used for central-difference normals.
const NORMAL_EPSILON: f32 = 1.0;

/// Fractal Brownian motion heightfield with a moisture field for biomes.
pub struct ProceduralTerrain {
    params: TerrainParams,
    height: Fbm<Perlin>,
    moisture: Perlin,
}

impl ProceduralTerrain {
    pub fn new(params: TerrainParams) -> Self {
        let height = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);
        let moisture = Perlin::new(params.seed.wrapping_add(1));
        tracing::debug!(seed = params.seed, octaves = params.octaves, "procedural terrain ready");
        Self {
            params,
            height,
            moisture,
        }
    }

    pub fn with_seed(seed: u32) -> Self {
        Self::new(TerrainParams {
            seed,
            ..TerrainParams::default()
        })
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Raw height without biome classification.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let nx = (x / self.params.scale) as f64;
        let nz = (z / self.params.scale) as f64;
        (self.height.get([nx, nz]) * self.params.height_scale as f64) as f32
    }

    fn moisture_at(&self, x: f32, z: f32) -> f32 {
        let nx = (x / self.params.moisture_scale) as f64;
        let nz = (z / self.params.moisture_scale) as f64;
        // Perlin output is roughly [-1, 1]; remap to [0, 1].
        ((self.moisture.get([nx, nz]) + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }

    fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        let e = NORMAL_EPSILON;
        let dx = self.height_at(x + e, z) - self.height_at(x - e, z);
        let dz = self.height_at(x, z + e) - self.height_at(x, z - e);
        Vec3::new(-dx, 2.0 * e, -dz).normalize_or(Vec3::Y)
    }

    fn classify(&self, height: f32, moisture: f32) -> Biome {
        let p = &self.params;
        let above = height - p.water_level;
        if above < 0.0 {
            return Biome::Ocean;
        }
        if above < p.beach_band {
            return Biome::Beach;
        }
        let relative = above / p.height_scale.max(f32::EPSILON);
        if relative > 0.7 {
            Biome::Snow
        } else if relative > 0.45 {
            Biome::Mountains
        } else if relative > 0.3 && moisture < 0.4 {
            Biome::Tundra
        } else if moisture < 0.3 {
            Biome::Desert
        } else if moisture > 0.6 {
            Biome::Forest
        } else {
            Biome::Grassland
        }
    }
}

impl TerrainSampler for ProceduralTerrain {
    fn sample(&self, x: f32, z: f32) -> Result<SurfaceSample, SamplerError> {
        let height = self.height_at(x, z);
        if !height.is_finite() {
            return Err(SamplerError::NonFinite { x, z, height });
        }
        let biome = self.classify(height, self.moisture_at(x, z));
        Ok(SurfaceSample {
            height,
            biome,
            normal: self.normal_at(x, z),
        })
    }

    fn water_level(&self) -> f32 {
        self.params.water_level
    }
}
