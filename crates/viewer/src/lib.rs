//! The embedded terrain viewer: one `frame` call per rendered frame drives the
//! fly camera, tile streaming, structure LOD and click resolution.
//!
//! # Invariants
//! - Per frame the order is camera, streamer, LOD, then click resolution.
//! - All state is owned by `TerrainViewer`; there are no locks or shared handles.
//! - Configuration errors surface from `new`/`load_foundation`; `frame` never fails.

mod config;
mod foundation;
mod summary;
mod viewer;

pub use config::{ViewerConfig, ViewerError};
pub use foundation::{SceneFoundation, StructureSpec, ZoneMarkerSpec};
pub use summary::ViewerSummary;
pub use viewer::{FoundationStats, FrameReport, TerrainViewer};

pub fn crate_info() -> &'static str {
    "worldview-viewer v0.1.0"
}
