//! Click resolution: rays against selectable entries, then resident terrain.
//!
//! # Invariants
//! - A ray that hits both a selectable entry and terrain resolves to the entry.
//! - Only resident tile meshes are hit-tested; no tile is generated for a pick.
//! - A failed generator query at the hit point resolves to `None`, never an error.

mod entry;
mod index;
mod rules;

pub use entry::{EntityKind, HitShape, SelectableEntry, Settlement};
pub use index::{SelectionIndex, SelectionResult};
pub use rules::{Axis, HostileRegion, RulesError, SampleRules, TileSampleResult};

pub fn crate_info() -> &'static str {
    "worldview-select v0.1.0"
}
