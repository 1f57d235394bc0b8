//! Output surfaces
//!
//! A [`RenderSurface`] is where frames go. The crate draws nothing itself; a
//! surface receives the scene, the camera and its [`SurfaceSettings`] once per
//! frame. [`HeadlessSurface`] records what it was asked to draw.

use serde::{Deserialize, Serialize};

use crate::descriptor::PropValue;
use crate::reconcile::reflect::{expect_number, mismatch, unknown};
use crate::reconcile::{PropertyError, Reflect};
use crate::scene::{ColorSpace, NodeId, SceneGraph};

use super::camera::Camera;

/// Tone mapping operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToneMapping {
    /// No tone mapping (constant 0)
    None,
    /// Linear scale (constant 1)
    Linear,
    /// Reinhard (constant 2)
    Reinhard,
    /// Cineon (constant 3)
    Cineon,
    /// ACES filmic (constant 4)
    #[default]
    AcesFilmic,
    /// AgX (constant 6)
    AgX,
}

impl ToneMapping {
    /// Numeric constant
    pub fn constant(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Linear => 1,
            Self::Reinhard => 2,
            Self::Cineon => 3,
            Self::AcesFilmic => 4,
            Self::AgX => 6,
        }
    }

    /// Parse a numeric constant or an operator name
    pub fn from_value(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Number(n) => match *n as u32 {
                0 => Some(Self::None),
                1 => Some(Self::Linear),
                2 => Some(Self::Reinhard),
                3 => Some(Self::Cineon),
                4 => Some(Self::AcesFilmic),
                6 => Some(Self::AgX),
                _ => None,
            },
            PropValue::Text(name) => match name.to_ascii_lowercase().trim_end_matches("tonemapping") {
                "no" | "none" => Some(Self::None),
                "linear" => Some(Self::Linear),
                "reinhard" => Some(Self::Reinhard),
                "cineon" => Some(Self::Cineon),
                "aces" | "acesfilmic" => Some(Self::AcesFilmic),
                "agx" => Some(Self::AgX),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Host viewport in CSS pixels plus the device pixel density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
    /// Physical pixels per CSS pixel
    pub device_pixel_ratio: f32,
}

impl Viewport {
    /// Viewport at a pixel density of 1
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio: 1.0,
        }
    }

    /// Width / height (1 for a zero height)
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Viewport size in world units at a reference distance
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldViewport {
    /// Visible width in world units
    pub width: f32,
    /// Visible height in world units
    pub height: f32,
    /// Camera aspect ratio
    pub aspect: f32,
}

/// Output settings applied by a surface on every frame
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSettings {
    /// Color space of the final image
    pub output_color_space: ColorSpace,
    /// Tone mapping operator
    pub tone_mapping: ToneMapping,
    /// Exposure fed to the tone mapper
    pub tone_mapping_exposure: f32,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            output_color_space: ColorSpace::Srgb,
            tone_mapping: ToneMapping::None,
            tone_mapping_exposure: 1.0,
        }
    }
}

impl Reflect for SurfaceSettings {
    fn type_name(&self) -> Option<&'static str> {
        Some("Renderer")
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Self::default()))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        Some(match key {
            "outputColorSpace" => PropValue::Text(self.output_color_space.token().to_string()),
            "toneMapping" => PropValue::Number(self.tone_mapping.constant() as f32),
            "toneMappingExposure" => PropValue::Number(self.tone_mapping_exposure),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        match key {
            "outputColorSpace" => {
                self.output_color_space = value
                    .as_text()
                    .and_then(ColorSpace::from_token)
                    .ok_or_else(|| mismatch(key, "color space token", &value))?;
            }
            "toneMapping" => {
                self.tone_mapping =
                    ToneMapping::from_value(&value).ok_or_else(|| mismatch(key, "tone mapping", &value))?;
            }
            "toneMappingExposure" => self.tone_mapping_exposure = expect_number(key, &value)?,
            _ => return Err(unknown("Renderer", key)),
        }
        Ok(())
    }

    fn has_color_space(&self) -> bool {
        true
    }
}

/// Surface failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    /// The drawing context is gone
    #[error("render surface lost")]
    Lost,

    /// A zero-sized drawing buffer was requested
    #[error("invalid surface size {width}x{height}")]
    InvalidSize {
        /// Requested width in physical pixels
        width: u32,
        /// Requested height in physical pixels
        height: u32,
    },
}

/// Destination of rendered frames
pub trait RenderSurface {
    /// Resize the drawing buffer (CSS size times pixel ratio)
    fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) -> Result<(), SurfaceError>;

    /// Draw the subtree under `root` as seen by `camera`
    fn render(&mut self, graph: &SceneGraph, root: NodeId, camera: &Camera) -> Result<(), SurfaceError>;

    /// Output settings
    fn settings(&self) -> &SurfaceSettings;

    /// Mutable output settings
    fn settings_mut(&mut self) -> &mut SurfaceSettings;

    /// Drawing-buffer size in physical pixels
    fn drawing_buffer_size(&self) -> (u32, u32);
}

/// Summary of one rendered frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Nodes visited under the root
    pub nodes: usize,
    /// Visible meshes
    pub meshes: usize,
    /// Camera aspect used for the frame
    pub aspect: f32,
}

/// Surface that draws nothing and records every frame
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    settings: SurfaceSettings,
    width: u32,
    height: u32,
    pixel_ratio: f32,
    frames: Vec<FrameRecord>,
    lost: bool,
}

impl HeadlessSurface {
    /// New headless surface with default settings
    pub fn new() -> Self {
        Self {
            pixel_ratio: 1.0,
            ..Self::default()
        }
    }

    /// Frames rendered so far
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Pixel ratio in effect
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Make every later call fail with [`SurfaceError::Lost`]
    pub fn lose_context(&mut self) {
        self.lost = true;
    }
}

impl RenderSurface for HeadlessSurface {
    fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) -> Result<(), SurfaceError> {
        if self.lost {
            return Err(SurfaceError::Lost);
        }
        let physical_width = (width as f32 * pixel_ratio).round() as u32;
        let physical_height = (height as f32 * pixel_ratio).round() as u32;
        if physical_width == 0 || physical_height == 0 {
            return Err(SurfaceError::InvalidSize {
                width: physical_width,
                height: physical_height,
            });
        }
        self.width = physical_width;
        self.height = physical_height;
        self.pixel_ratio = pixel_ratio;
        Ok(())
    }

    fn render(&mut self, graph: &SceneGraph, root: NodeId, camera: &Camera) -> Result<(), SurfaceError> {
        if self.lost {
            return Err(SurfaceError::Lost);
        }
        let nodes = graph.traverse(root);
        let meshes = nodes
            .iter()
            .filter(|id| graph.get(**id).is_some_and(|n| n.mesh_data().is_some()) && graph.is_visible(**id))
            .count();
        self.frames.push(FrameRecord {
            nodes: nodes.len(),
            meshes,
            aspect: camera.aspect,
        });
        Ok(())
    }

    fn settings(&self) -> &SurfaceSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SurfaceSettings {
        &mut self.settings
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_mapping_names_and_constants() {
        assert_eq!(ToneMapping::from_value(&PropValue::Number(4.0)), Some(ToneMapping::AcesFilmic));
        assert_eq!(ToneMapping::from_value(&PropValue::from("ACESFilmicToneMapping")), Some(ToneMapping::AcesFilmic));
        assert_eq!(ToneMapping::from_value(&PropValue::from("reinhard")), Some(ToneMapping::Reinhard));
        assert_eq!(ToneMapping::from_value(&PropValue::Number(5.0)), None);
    }

    #[test]
    fn test_headless_resize_uses_pixel_ratio() {
        let mut surface = HeadlessSurface::new();
        surface.resize(400, 300, 2.0).unwrap();
        assert_eq!(surface.drawing_buffer_size(), (800, 600));
        assert!(matches!(surface.resize(0, 300, 1.0), Err(SurfaceError::InvalidSize { .. })));
    }

    #[test]
    fn test_lost_context_fails_render() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(crate::scene::Object3D::group());
        let mut surface = HeadlessSurface::new();
        surface.render(&graph, root, &Camera::default()).unwrap();
        surface.lose_context();
        assert_eq!(surface.render(&graph, root, &Camera::default()), Err(SurfaceError::Lost));
        assert_eq!(surface.frames().len(), 1);
    }
}
