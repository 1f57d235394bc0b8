//! # Stage Configuration
//!
//! Camera, output surface and color-management settings used when a stage is
//! assembled into a canvas. Defaults reproduce the classic setup: a 75° camera
//! ten units back on +Z, a pixel ratio clamped to [1, 2], ACES filmic tone
//! mapping and sRGB output.

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::render::ToneMapping;
use crate::scene::ColorSpace;

/// Perspective camera parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    /// Initial camera position
    pub position: [f32; 3],
    /// Point the camera looks at; also the reference point for viewport sizing
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 0.0, 10.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Output surface parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Lower bound applied to the device pixel ratio
    pub min_pixel_ratio: f32,
    /// Upper bound applied to the device pixel ratio
    pub max_pixel_ratio: f32,
    /// Request an antialiased surface
    pub antialias: bool,
    /// Request a surface with an alpha channel
    pub alpha: bool,
    /// Tone mapping operator
    pub tone_mapping: ToneMapping,
    /// Color space of the final output
    pub output_color_space: ColorSpace,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            min_pixel_ratio: 1.0,
            max_pixel_ratio: 2.0,
            antialias: true,
            alpha: true,
            tone_mapping: ToneMapping::AcesFilmic,
            output_color_space: ColorSpace::Srgb,
        }
    }
}

impl SurfaceConfig {
    /// Clamp a device pixel ratio into the configured range
    pub fn clamp_pixel_ratio(&self, device_pixel_ratio: f32) -> f32 {
        device_pixel_ratio.max(self.min_pixel_ratio).min(self.max_pixel_ratio)
    }
}

/// Top-level configuration for a [`crate::Stage`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Camera created at assembly
    pub camera: CameraConfig,
    /// Output surface settings
    pub surface: SurfaceConfig,
    /// Whether the runtime converts sRGB color inputs to linear on parse.
    ///
    /// When disabled, the property applier performs the conversion itself
    /// after every scalar color write.
    pub color_management: bool,
    /// Color of a point light constructed without positional arguments
    pub point_light_fallback_color: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            surface: SurfaceConfig::default(),
            color_management: true,
            point_light_fallback_color: 0xff_00_00,
        }
    }
}

impl Config for StageConfig {
    /// Reject ranges that would produce a degenerate projection
    fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.near <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "camera.near must be positive, got {}",
                self.camera.near
            )));
        }
        if self.camera.far <= self.camera.near {
            return Err(ConfigError::Invalid(format!(
                "camera.far ({}) must exceed camera.near ({})",
                self.camera.far, self.camera.near
            )));
        }
        if !(0.0..180.0).contains(&self.camera.fov_degrees) || self.camera.fov_degrees == 0.0 {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                self.camera.fov_degrees
            )));
        }
        if self.surface.min_pixel_ratio > self.surface.max_pixel_ratio {
            return Err(ConfigError::Invalid(
                "surface.min_pixel_ratio exceeds surface.max_pixel_ratio".to_string(),
            ));
        }
        Ok(())
    }
}
