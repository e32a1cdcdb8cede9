use glam::Vec2;

/// A high-level event produced by the host adapter (editor panel, CLI).
///
/// The viewer consumes actions, never raw window or DOM events, so listener
/// registration stays in the adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Pointer lock gained (`true`) or released (`false`).
    CapturePointer(bool),
    /// Primary click at a position in normalized device coordinates.
    Click(Vec2),
    /// Clear the current selection.
    Deselect,
    /// Drop every resident tile, LOD group and selectable entry.
    Teardown,
    /// Unbound input.
    Noop,
}
