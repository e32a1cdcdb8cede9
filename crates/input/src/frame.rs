use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Directional keys held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub boost: bool,
}

impl MoveInput {
    /// Camera-local intent: x = right, y = up, z = forward. Each component is
    /// -1, 0 or 1; opposing keys cancel.
    pub fn axes(&self) -> Vec3 {
        let axis = |pos: bool, neg: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        Vec3::new(
            axis(self.right, self.left),
            axis(self.up, self.down),
            axis(self.forward, self.back),
        )
    }

    pub fn is_idle(&self) -> bool {
        self.axes() == Vec3::ZERO
    }
}

/// Pointer motion since the last frame, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookDelta {
    pub dx: f32,
    pub dy: f32,
}

impl LookDelta {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Everything the adapter collected for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub movement: MoveInput,
    pub look: LookDelta,
    /// Click position in normalized device coordinates, x right and y up in [-1, 1].
    pub click: Option<Vec2>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_keys_cancel() {
        let m = MoveInput {
            forward: true,
            back: true,
            right: true,
            ..MoveInput::default()
        };
        assert_eq!(m.axes(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn boost_alone_is_idle() {
        let m = MoveInput {
            boost: true,
            ..MoveInput::default()
        };
        assert!(m.is_idle());
        assert!(FrameInput::default().click.is_none());
    }

    #[test]
    fn axes_cover_all_directions() {
        let m = MoveInput {
            left: true,
            down: true,
            back: true,
            ..MoveInput::default()
        };
        assert_eq!(m.axes(), Vec3::new(-1.0, -1.0, -1.0));
    }
}
