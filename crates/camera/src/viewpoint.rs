use glam::{Mat4, Vec2, Vec3};
use serde::Serialize;
use worldview_common::Ray;

use crate::config::Lens;

/// Camera pose owned by the fly controller; everything else reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewpointState {
    pub position: Vec3,
    /// Radians around +Y. Zero looks down +X.
    pub yaw: f32,
    /// Radians above the horizon.
    pub pitch: f32,
    /// Smoothed velocity, m/s.
    pub velocity: Vec3,
    pub lens: Lens,
}

impl ViewpointState {
    pub fn new(position: Vec3, yaw: f32, pitch: f32, lens: Lens) -> Self {
        Self {
            position,
            yaw,
            pitch,
            velocity: Vec3::ZERO,
            lens,
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.lens.fov_deg.to_radians(),
            self.lens.aspect,
            self.lens.near,
            self.lens.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a point in normalized device coordinates
    /// (x right, y up, both in [-1, 1]).
    pub fn screen_ray(&self, ndc: Vec2) -> Ray {
        let half_h = (self.lens.fov_deg.to_radians() * 0.5).tan();
        let half_w = half_h * self.lens.aspect;
        let dir = self.forward() + self.right() * (ndc.x * half_w) + self.up() * (ndc.y * half_h);
        Ray::new(self.position, dir)
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}
