use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use worldview_common::{Aabb, Ray};
use worldview_terrain::{Biome, SamplerError, TerrainSampler, sample_checked};

use crate::grid::TileCoord;

/// GPU-ready terrain vertex. Positions are in world space.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Colouring rules applied while a tile is generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilePalette {
    /// Colour blended in just above the waterline.
    pub shore_tint: [f32; 3],
    /// Height band (meters above water) over which the tint fades out.
    pub shore_band: f32,
}

impl Default for TilePalette {
    fn default() -> Self {
        Self {
            shore_tint: [0.86, 0.80, 0.62],
            shore_band: 4.0,
        }
    }
}

impl TilePalette {
    /// Biome colour, pulled toward the shore tint inside the shore band.
    /// Full tint at the waterline, none at the top of the band.
    pub fn shade(&self, biome: Biome, height: f32, water_level: f32) -> [f32; 3] {
        let base = Vec3::from(biome.base_color());
        let above = height - water_level;
        if self.shore_band <= 0.0 || !(0.0..self.shore_band).contains(&above) {
            return base.to_array();
        }
        let t = 1.0 - above / self.shore_band;
        base.lerp(Vec3::from(self.shore_tint), t).to_array()
    }
}

/// Flat grid shared by every tile: `resolution x resolution` vertices spanning
/// `tile_size` meters, in tile-local XZ. Built once per streamer.
#[derive(Debug, Clone)]
pub struct TileTemplate {
    resolution: u32,
    tile_size: f32,
    vertices: Vec<TerrainVertex>,
    indices: Arc<[u32]>,
}

impl TileTemplate {
    pub fn new(resolution: u32, tile_size: f32) -> Self {
        let r = resolution.max(2);
        let step = tile_size / (r - 1) as f32;
        let mut vertices = Vec::with_capacity((r * r) as usize);
        for j in 0..r {
            for i in 0..r {
                vertices.push(TerrainVertex {
                    position: [i as f32 * step, 0.0, j as f32 * step],
                    normal: [0.0, 1.0, 0.0],
                    color: [1.0, 1.0, 1.0],
                });
            }
        }

        let mut indices = Vec::with_capacity(((r - 1) * (r - 1) * 6) as usize);
        for j in 0..r - 1 {
            for i in 0..r - 1 {
                let a = j * r + i;
                let b = a + 1;
                let c = a + r;
                let d = c + 1;
                // Counter-clockwise seen from +Y.
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        Self {
            resolution: r,
            tile_size,
            vertices,
            indices: indices.into(),
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Flat water surface attached to tiles that dip below the water level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterPlane {
    pub height: f32,
    pub origin: Vec2,
    pub size: f32,
}

impl WaterPlane {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(
            Vec3::new(self.origin.x, self.height, self.origin.y),
            Vec3::new(self.origin.x + self.size, self.height, self.origin.y + self.size),
        )
    }
}

/// Heightmapped terrain mesh for one tile.
#[derive(Debug, Clone)]
pub struct TileMesh {
    coord: TileCoord,
    origin: Vec2,
    size: f32,
    resolution: u32,
    vertices: Vec<TerrainVertex>,
    indices: Arc<[u32]>,
    bounds: Aabb,
}

impl TileMesh {
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Tile-local grid cell `(i, j)` containing a world XZ position, clamped to the tile.
    pub fn cell_at(&self, x: f32, z: f32) -> (u32, u32) {
        let cells = (self.resolution - 1) as f32;
        let step = self.size / cells;
        let to_cell = |v: f32| ((v / step).floor().clamp(0.0, cells - 1.0)) as u32;
        (to_cell(x - self.origin.x), to_cell(z - self.origin.y))
    }

    /// Nearest hit distance along the ray, if any.
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        ray.intersect_aabb(&self.bounds)?;
        let pos = |i: u32| Vec3::from(self.vertices[i as usize].position);
        self.indices
            .chunks_exact(3)
            .filter_map(|tri| ray.intersect_triangle(pos(tri[0]), pos(tri[1]), pos(tri[2])))
            .min_by(f32::total_cmp)
    }

    /// SHA-256 over the raw vertex bytes (positions, normals, colours).
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(bytemuck::cast_slice::<TerrainVertex, u8>(&self.vertices)).into()
    }

    pub fn digest_hex(&self) -> String {
        self.digest().iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Errors that abort generation of a single tile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TileError {
    #[error("sampling tile {coord} failed: {source}")]
    Sampler {
        coord: TileCoord,
        #[source]
        source: SamplerError,
    },
}

/// Output of a successful tile generation.
#[derive(Debug, Clone)]
pub struct GeneratedTile {
    pub mesh: TileMesh,
    pub water: Option<WaterPlane>,
}

/// Build the mesh for `coord` by sampling the generator at every template vertex.
///
/// Runs to completion or fails as a whole; no partially sampled mesh escapes.
pub fn generate_tile(
    coord: TileCoord,
    template: &TileTemplate,
    sampler: &dyn TerrainSampler,
    palette: &TilePalette,
) -> Result<GeneratedTile, TileError> {
    let origin = coord.origin(template.tile_size);
    let water_level = sampler.water_level();
    let mut vertices = template.vertices.clone();
    let mut bounds = Aabb::empty();
    let mut submerged = false;

    for v in &mut vertices {
        let x = origin.x + v.position[0];
        let z = origin.y + v.position[2];
        let sample = sample_checked(sampler, x, z)
            .map_err(|source| TileError::Sampler { coord, source })?;
        v.position = [x, sample.height, z];
        v.color = palette.shade(sample.biome, sample.height, water_level);
        submerged |= sample.height < water_level;
        bounds.expand(Vec3::from(v.position));
    }

    recompute_normals(&mut vertices, &template.indices);

    let water = submerged.then_some(WaterPlane {
        height: water_level,
        origin,
        size: template.tile_size,
    });

    Ok(GeneratedTile {
        mesh: TileMesh {
            coord,
            origin,
            size: template.tile_size,
            resolution: template.resolution,
            vertices,
            indices: Arc::clone(&template.indices),
            bounds,
        },
        water,
    })
}

/// Area-weighted vertex normals from triangle faces.
fn recompute_normals(vertices: &mut [TerrainVertex], indices: &[u32]) {
    let mut acc = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from(vertices[a].position);
        let pb = Vec3::from(vertices[b].position);
        let pc = Vec3::from(vertices[c].position);
        let face = (pb - pa).cross(pc - pa);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    for (v, n) in vertices.iter_mut().zip(acc) {
        v.normal = n.normalize_or(Vec3::Y).to_array();
    }
}
