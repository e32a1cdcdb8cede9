//! Input as plain per-frame values.
//!
//! # Invariants
//! - No global listener state; the host adapter fills a `FrameInput` each frame.
//! - Pointer capture reports transitions, not levels.

mod action;
mod capture;
mod frame;

pub use action::Action;
pub use capture::PointerCapture;
pub use frame::{FrameInput, LookDelta, MoveInput};

pub fn crate_info() -> &'static str {
    "worldview-input v0.1.0"
}
