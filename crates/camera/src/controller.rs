use glam::{Vec2, Vec3};
use worldview_common::{Ray, WorldBounds};
use worldview_input::{LookDelta, MoveInput};

use crate::config::{CameraConfig, CameraError};
use crate::viewpoint::ViewpointState;

/// Starting pitch: looking slightly down over the terrain.
const START_PITCH_DEG: f32 = -20.0;

/// Smoothed fly camera. A pure state machine over `(dt, input)`; it never
/// reads global input state.
#[derive(Debug, Clone)]
pub struct FlyCameraController {
    config: CameraConfig,
    bounds: WorldBounds,
    state: ViewpointState,
}

impl FlyCameraController {
    /// Camera over the world centre, halfway between the ground band and the
    /// default cruise altitude.
    pub fn new(config: CameraConfig, bounds: WorldBounds) -> Result<Self, CameraError> {
        config.validate()?;
        bounds.validate()?;
        let center = bounds.center();
        let altitude = (config.min_altitude + 120.0).min(config.max_altitude);
        let state = ViewpointState::new(
            Vec3::new(center.x, altitude, center.y),
            0.0,
            START_PITCH_DEG.to_radians(),
            config.lens,
        );
        Ok(Self {
            config,
            bounds,
            state,
        })
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn viewpoint(&self) -> &ViewpointState {
        &self.state
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    /// Jump to a position (clamped) and stop.
    pub fn teleport(&mut self, position: Vec3) {
        self.state.position = position;
        self.state.velocity = Vec3::ZERO;
        self.clamp_position();
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.state.yaw = yaw;
        self.state.pitch = pitch.clamp(-self.pitch_limit(), self.pitch_limit());
    }

    pub fn screen_ray(&self, ndc: Vec2) -> Ray {
        self.state.screen_ray(ndc)
    }

    /// Advance one frame. Non-finite or negative `dt` is treated as zero.
    pub fn tick(&mut self, dt: f32, movement: &MoveInput, look: LookDelta) {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        if look.dx.is_finite() && look.dy.is_finite() {
            self.state.yaw += look.dx * self.config.look_sensitivity;
            self.state.pitch = (self.state.pitch - look.dy * self.config.look_sensitivity)
                .clamp(-self.pitch_limit(), self.pitch_limit());
        }

        let target = self.target_velocity(movement);
        let blend = 1.0 - (-self.config.smoothing * dt).exp();
        self.state.velocity += (target - self.state.velocity) * blend;
        self.state.position += self.state.velocity * dt;
        self.clamp_position();
    }

    fn target_velocity(&self, movement: &MoveInput) -> Vec3 {
        let axes = movement.axes();
        let dir = self.state.right() * axes.x + Vec3::Y * axes.y + self.state.forward() * axes.z;
        let mut speed = self.config.move_speed;
        if movement.boost {
            speed *= self.config.boost_multiplier;
        }
        dir.normalize_or_zero() * speed
    }

    fn pitch_limit(&self) -> f32 {
        self.config.pitch_limit_deg.to_radians()
    }

    /// Clamp to the world footprint plus margin and the altitude band. A
    /// clamped axis also loses its velocity so the camera does not keep
    /// pushing into the wall.
    fn clamp_position(&mut self) {
        let extent = self.bounds.extent();
        let margin = self.config.bounds_margin;
        let limits = [
            (-margin, extent.x + margin),
            (self.config.min_altitude, self.config.max_altitude),
            (-margin, extent.y + margin),
        ];
        for (axis, (lo, hi)) in limits.into_iter().enumerate() {
            let v = self.state.position[axis];
            let clamped = v.clamp(lo, hi);
            if clamped != v {
                self.state.position[axis] = clamped;
                self.state.velocity[axis] = 0.0;
            }
        }
    }
}
