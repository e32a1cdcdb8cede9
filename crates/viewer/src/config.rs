use serde::{Deserialize, Serialize};
use worldview_camera::{CameraConfig, CameraError};
use worldview_common::EntityId;
use worldview_lod::{LodError, LodThresholds};
use worldview_select::{RulesError, SampleRules};
use worldview_stream::{StreamConfig, StreamError};

/// Everything that can go wrong while building or loading a viewer.
/// Per-frame operations never return errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewerError {
    #[error("stream config: {0}")]
    Stream(#[from] StreamError),
    #[error("camera config: {0}")]
    Camera(#[from] CameraError),
    #[error("lod config: {0}")]
    Lod(#[from] LodError),
    #[error("selection rules: {0}")]
    Rules(#[from] RulesError),
    #[error("entity {0} appears twice in the scene foundation")]
    DuplicateEntity(EntityId),
}

/// Full viewer configuration. The world bounds live in `stream.bounds` and are
/// shared with the camera clamp and the difficulty bands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub stream: StreamConfig,
    pub lod: LodThresholds,
    pub camera: CameraConfig,
    pub selection: SampleRules,
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<(), ViewerError> {
        self.stream.validate()?;
        self.lod.validate()?;
        self.camera.validate()?;
        self.selection.validate()?;
        Ok(())
    }
}
