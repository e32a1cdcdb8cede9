//! Streaming: terrain tile registry, budgeted tile generation and eviction.
//!
//! # Invariants
//! - Exactly one `TileRecord` per resident coordinate (registry keyed by `TileKey`).
//! - At most `max_tiles_per_frame` tiles become resident per tick.
//! - The load queue never holds a coordinate twice and is ordered closest first.
//! - After a tick, every resident tile beyond `unload_radius` is still inside its
//!   grace window.
//! - A tile whose generation fails never enters the registry.

mod budget;
mod grid;
mod mesh;
mod queue;

pub use budget::{
    CostWindow, MAX_TILE_RESOLUTION, StreamConfig, StreamError, StreamMetrics, TickReport,
    TileRecord, TileStreamer,
};
pub use grid::{TileCoord, TileKey, tiles_in_radius};
pub use mesh::{
    GeneratedTile, TerrainVertex, TileError, TileMesh, TilePalette, TileTemplate, WaterPlane,
    generate_tile,
};
pub use queue::{LoadEntry, LoadQueue};

pub fn crate_info() -> &'static str {
    "worldview-stream v0.1.0"
}
