//! Fly camera for the terrain viewer.
//!
//! # Invariants
//! - Pitch stays inside the configured limit; the view never inverts.
//! - Position stays inside the world footprint plus margin and the altitude band.
//! - `tick` is a pure function of the previous state, `dt` and the input structs.

mod config;
mod controller;
mod viewpoint;

pub use config::{CameraConfig, CameraError, Lens};
pub use controller::FlyCameraController;
pub use viewpoint::ViewpointState;

pub fn crate_info() -> &'static str {
    "worldview-camera v0.1.0"
}
