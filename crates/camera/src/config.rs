use serde::{Deserialize, Serialize};
use worldview_common::BoundsError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("move_speed must be positive, got {0}")]
    Speed(f32),
    #[error("boost_multiplier must be at least 1, got {0}")]
    Boost(f32),
    #[error("smoothing must be positive, got {0}")]
    Smoothing(f32),
    #[error("altitude band [{min}, {max}] is empty")]
    Altitude { min: f32, max: f32 },
    #[error("pitch limit must be within (0, 90) degrees, got {0}")]
    PitchLimit(f32),
    #[error("invalid lens: {0}")]
    Lens(&'static str),
    #[error(transparent)]
    Bounds(#[from] BoundsError),
}

/// Perspective parameters shared by the view and pick rays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lens {
    /// Vertical field of view.
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov_deg: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 5000.0,
        }
    }
}

impl Lens {
    pub fn validate(&self) -> Result<(), CameraError> {
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(CameraError::Lens("fov_deg outside (0, 180)"));
        }
        if !(self.aspect > 0.0 && self.aspect.is_finite()) {
            return Err(CameraError::Lens("aspect must be positive"));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(CameraError::Lens("need 0 < near < far"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Cruise speed, m/s.
    pub move_speed: f32,
    pub boost_multiplier: f32,
    /// Exponential smoothing rate `k`; velocity closes `1 - e^(-k dt)` of the gap per tick.
    pub smoothing: f32,
    /// Radians per pixel of pointer motion.
    pub look_sensitivity: f32,
    pub min_altitude: f32,
    pub max_altitude: f32,
    /// How far past the world edge the camera may drift, meters.
    pub bounds_margin: f32,
    pub pitch_limit_deg: f32,
    pub lens: Lens,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 60.0,
            boost_multiplier: 4.0,
            smoothing: 10.0,
            look_sensitivity: 0.003,
            min_altitude: 2.0,
            max_altitude: 1500.0,
            bounds_margin: 200.0,
            pitch_limit_deg: 89.0,
            lens: Lens::default(),
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), CameraError> {
        if !(self.move_speed > 0.0 && self.move_speed.is_finite()) {
            return Err(CameraError::Speed(self.move_speed));
        }
        if !(self.boost_multiplier >= 1.0 && self.boost_multiplier.is_finite()) {
            return Err(CameraError::Boost(self.boost_multiplier));
        }
        if !(self.smoothing > 0.0 && self.smoothing.is_finite()) {
            return Err(CameraError::Smoothing(self.smoothing));
        }
        if !(self.min_altitude < self.max_altitude) {
            return Err(CameraError::Altitude {
                min: self.min_altitude,
                max: self.max_altitude,
            });
        }
        if !(self.pitch_limit_deg > 0.0 && self.pitch_limit_deg < 90.0) {
            return Err(CameraError::PitchLimit(self.pitch_limit_deg));
        }
        self.lens.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(CameraConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_altitude_band() {
        let c = CameraConfig {
            min_altitude: 100.0,
            max_altitude: 10.0,
            ..CameraConfig::default()
        };
        assert!(matches!(c.validate(), Err(CameraError::Altitude { .. })));
    }

    #[test]
    fn rejects_bad_lens_and_boost() {
        let c = CameraConfig {
            boost_multiplier: 0.5,
            ..CameraConfig::default()
        };
        assert_eq!(c.validate(), Err(CameraError::Boost(0.5)));

        let c = CameraConfig {
            lens: Lens {
                near: 10.0,
                far: 1.0,
                ..Lens::default()
            },
            ..CameraConfig::default()
        };
        assert!(matches!(c.validate(), Err(CameraError::Lens(_))));

        let c = CameraConfig {
            pitch_limit_deg: 90.0,
            ..CameraConfig::default()
        };
        assert!(c.validate().is_err());
    }
}
