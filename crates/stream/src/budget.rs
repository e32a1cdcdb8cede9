use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use worldview_common::{BoundsError, WorldBounds};
use worldview_terrain::TerrainSampler;

use crate::grid::{TileCoord, TileKey, tiles_in_radius};
use crate::mesh::{GeneratedTile, TileMesh, TilePalette, TileTemplate, WaterPlane, generate_tile};
use crate::queue::LoadQueue;

/// Streaming configuration: world extent, radii, per-frame budget and hysteresis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub bounds: WorldBounds,
    /// Vertices per tile edge.
    pub tile_resolution: u32,
    /// Radius (in tiles, square neighborhood) that is kept loaded around the viewer.
    pub load_radius: i32,
    /// Chebyshev radius beyond which resident tiles become eligible for eviction.
    pub unload_radius: i32,
    /// Maximum number of tiles generated per frame.
    pub max_tiles_per_frame: usize,
    /// Seconds a tile stays resident after it was last inside the load radius.
    pub eviction_grace_secs: f32,
    pub palette: TilePalette,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            bounds: WorldBounds::default(),
            tile_resolution: 33,
            load_radius: 5,
            unload_radius: 7,
            max_tiles_per_frame: 2,
            eviction_grace_secs: 1.0,
            palette: TilePalette::default(),
        }
    }
}

/// Largest vertices-per-edge a tile template may use; keeps vertex and index
/// counts well inside `u32`.
pub const MAX_TILE_RESOLUTION: u32 = 1025;

impl StreamConfig {
    pub fn validate(&self) -> Result<(), StreamError> {
        self.bounds.validate()?;
        if self.load_radius < 0 {
            return Err(StreamError::NegativeRadius(self.load_radius));
        }
        if self.load_radius >= self.unload_radius {
            return Err(StreamError::Radii {
                load: self.load_radius,
                unload: self.unload_radius,
            });
        }
        if !(2..=MAX_TILE_RESOLUTION).contains(&self.tile_resolution) {
            return Err(StreamError::Resolution(self.tile_resolution));
        }
        if self.max_tiles_per_frame == 0 {
            return Err(StreamError::ZeroBudget);
        }
        if !(self.eviction_grace_secs.is_finite() && self.eviction_grace_secs >= 0.0) {
            return Err(StreamError::Grace(self.eviction_grace_secs));
        }
        Ok(())
    }

    pub fn eviction_grace(&self) -> Duration {
        Duration::from_secs_f32(self.eviction_grace_secs.max(0.0))
    }
}

/// Configuration errors. Per-frame streaming never fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    Bounds(#[from] BoundsError),
    #[error("load_radius ({load}) must be smaller than unload_radius ({unload})")]
    Radii { load: i32, unload: i32 },
    #[error("load_radius must be non-negative, got {0}")]
    NegativeRadius(i32),
    #[error("tile_resolution must be within 2..=1025, got {0}")]
    Resolution(u32),
    #[error("max_tiles_per_frame must be at least 1")]
    ZeroBudget,
    #[error("eviction grace must be finite and non-negative, got {0}")]
    Grace(f32),
}

/// One resident tile. Owned exclusively by the streamer's registry.
#[derive(Debug, Clone)]
pub struct TileRecord {
    coord: TileCoord,
    mesh: TileMesh,
    water: Option<WaterPlane>,
    last_accessed: Duration,
}

impl TileRecord {
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn mesh(&self) -> &TileMesh {
        &self.mesh
    }

    pub fn water(&self) -> Option<&WaterPlane> {
        self.water.as_ref()
    }

    /// Streamer clock reading when the tile was last inside the load radius.
    pub fn last_accessed(&self) -> Duration {
        self.last_accessed
    }
}

/// Streaming metrics reported to the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamMetrics {
    pub resident_tiles: usize,
    /// Total tiles in the world.
    pub tile_budget: usize,
    pub queue_depth: usize,
    pub water_tiles: usize,
    pub generated_this_frame: usize,
    pub evicted_this_frame: usize,
    pub failed_this_frame: usize,
    /// Queued tiles dropped because the viewer moved away before their turn.
    pub dropped_this_frame: usize,
    pub total_generated: u64,
    pub total_evicted: u64,
    pub total_failed: u64,
    pub frame_time: Duration,
}

impl StreamMetrics {
    /// True while queued work remains (the UI shows "still loading").
    pub fn is_loading(&self) -> bool {
        self.queue_depth > 0
    }
}

/// What changed during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub generated: Vec<TileCoord>,
    pub evicted: Vec<TileCoord>,
    pub failed: Vec<TileCoord>,
}

/// Owns the resident tile set and decides what to generate and retire each frame.
pub struct TileStreamer {
    config: StreamConfig,
    template: TileTemplate,
    tiles: BTreeMap<TileKey, TileRecord>,
    queue: LoadQueue,
    clock: Duration,
    viewpoint_tile: Option<TileCoord>,
    metrics: StreamMetrics,
    costs: CostWindow,
}

impl TileStreamer {
    pub fn new(config: StreamConfig) -> Result<Self, StreamError> {
        config.validate()?;
        let template = TileTemplate::new(config.tile_resolution, config.bounds.tile_size);
        let metrics = StreamMetrics {
            tile_budget: config.bounds.tile_count(),
            ..StreamMetrics::default()
        };
        tracing::debug!(
            tiles = metrics.tile_budget,
            resolution = config.tile_resolution,
            "tile streamer ready"
        );
        Ok(Self {
            config,
            template,
            tiles: BTreeMap::new(),
            queue: LoadQueue::new(),
            clock: Duration::ZERO,
            viewpoint_tile: None,
            metrics,
            costs: CostWindow::new(64),
        })
    }

    /// Advance streaming by one frame for the given viewer position.
    pub fn tick(
        &mut self,
        viewpoint: Vec3,
        dt: Duration,
        sampler: &dyn TerrainSampler,
    ) -> TickReport {
        let _span = tracing::info_span!("stream_tick").entered();
        let frame_start = Instant::now();
        self.clock += dt;

        let bounds = self.config.bounds;
        let center = TileCoord::from_world(viewpoint, bounds.tile_size);
        if self.viewpoint_tile != Some(center) {
            tracing::debug!(%center, "viewpoint tile changed");
        }
        self.viewpoint_tile = Some(center);

        let dropped = self.queue.rerank(center, self.config.load_radius);

        // Refresh what is in range; queue what is missing.
        for coord in tiles_in_radius(center, self.config.load_radius, bounds) {
            match self.tiles.get_mut(&coord.key()) {
                Some(record) => record.last_accessed = self.clock,
                None => {
                    self.queue.push(coord, center);
                }
            }
        }

        let mut report = TickReport::default();
        for _ in 0..self.config.max_tiles_per_frame {
            let Some(entry) = self.queue.pop() else {
                break;
            };
            let coord = entry.coord;
            if !bounds.contains_tile(coord.x, coord.z) || self.tiles.contains_key(&coord.key()) {
                continue;
            }
            let started = Instant::now();
            match generate_tile(coord, &self.template, sampler, &self.config.palette) {
                Ok(GeneratedTile { mesh, water }) => {
                    self.costs.record(started.elapsed());
                    tracing::debug!(%coord, water = water.is_some(), "tile generated");
                    self.tiles.insert(
                        coord.key(),
                        TileRecord {
                            coord,
                            mesh,
                            water,
                            last_accessed: self.clock,
                        },
                    );
                    report.generated.push(coord);
                }
                Err(err) => {
                    tracing::warn!(%coord, error = %err, "tile generation aborted");
                    report.failed.push(coord);
                }
            }
        }

        report.evicted = self.evict_stale(center);

        self.metrics = StreamMetrics {
            resident_tiles: self.tiles.len(),
            tile_budget: bounds.tile_count(),
            queue_depth: self.queue.len(),
            water_tiles: self.tiles.values().filter(|t| t.water.is_some()).count(),
            generated_this_frame: report.generated.len(),
            evicted_this_frame: report.evicted.len(),
            failed_this_frame: report.failed.len(),
            dropped_this_frame: dropped,
            total_generated: self.metrics.total_generated + report.generated.len() as u64,
            total_evicted: self.metrics.total_evicted + report.evicted.len() as u64,
            total_failed: self.metrics.total_failed + report.failed.len() as u64,
            frame_time: frame_start.elapsed(),
        };

        tracing::trace!(
            generated = report.generated.len(),
            evicted = report.evicted.len(),
            resident = self.tiles.len(),
            queued = self.queue.len(),
            "stream tick complete"
        );

        report
    }

    /// Drop every tile beyond `unload_radius` whose grace window has run out.
    fn evict_stale(&mut self, center: TileCoord) -> Vec<TileCoord> {
        let grace = self.config.eviction_grace();
        let unload = self.config.unload_radius;
        let clock = self.clock;
        let stale: Vec<TileKey> = self
            .tiles
            .iter()
            .filter(|(_, t)| {
                t.coord.chebyshev(center) > unload
                    && clock.saturating_sub(t.last_accessed) >= grace
            })
            .map(|(k, _)| *k)
            .collect();

        stale
            .into_iter()
            .filter_map(|key| self.tiles.remove(&key))
            .map(|record| {
                tracing::debug!(coord = %record.coord, "tile evicted");
                record.coord
            })
            .collect()
    }

    /// Release every resident tile and forget queued work.
    pub fn clear(&mut self) {
        tracing::debug!(resident = self.tiles.len(), "clearing tile registry");
        self.tiles.clear();
        self.queue.clear();
        self.viewpoint_tile = None;
        self.metrics.resident_tiles = 0;
        self.metrics.queue_depth = 0;
        self.metrics.water_tiles = 0;
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn get(&self, coord: TileCoord) -> Option<&TileRecord> {
        self.tiles.get(&coord.key())
    }

    pub fn is_resident(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&coord.key())
    }

    /// Resident tiles in key order.
    pub fn tiles(&self) -> impl Iterator<Item = &TileRecord> {
        self.tiles.values()
    }

    pub fn resident_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub fn queue(&self) -> &LoadQueue {
        &self.queue
    }

    pub fn viewpoint_tile(&self) -> Option<TileCoord> {
        self.viewpoint_tile
    }

    /// Streamer time: the sum of every `dt` passed to `tick`.
    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn metrics(&self) -> &StreamMetrics {
        &self.metrics
    }

    pub fn generation_cost(&self) -> &CostWindow {
        &self.costs
    }
}

/// Rolling window of recent per-tile generation times.
#[derive(Debug, Clone)]
pub struct CostWindow {
    samples: VecDeque<Duration>,
    capacity: usize,
}

impl CostWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, cost: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(cost);
    }

    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }
}
