//! Perspective camera
//!
//! Right-handed, Y-up view space looking down -Z, with an OpenGL-style
//! [-1, 1] depth range. Matrices are computed on demand, so any field change
//! is reflected by the next projection or ray.

use crate::config::CameraConfig;
use crate::descriptor::PropValue;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3, Vec4};
use crate::picking::Ray;
use crate::reconcile::reflect::{expect_number, mismatch, read_only, unknown};
use crate::reconcile::{PropertyError, Reflect, Slot};

use super::WorldViewport;

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Position in world space
    pub position: Vec3,
    /// Look-at point in world space
    pub target: Vec3,
    /// Up direction
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Width / height
    pub aspect: f32,
    /// Near clipping distance
    pub near: f32,
    /// Far clipping distance
    pub far: f32,
    /// Zoom factor (narrows the effective field of view)
    pub zoom: f32,
}

impl Camera {
    /// Perspective camera looking at the origin
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: fov_degrees,
            aspect,
            near,
            far,
            zoom: 1.0,
        }
    }

    /// Camera from configuration
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::perspective(
            Vec3::from(config.position),
            config.fov_degrees,
            aspect,
            config.near,
            config.far,
        );
        camera.target = Vec3::from(config.target);
        camera
    }

    /// Effective vertical field of view in radians
    pub fn fov_radians(&self) -> f32 {
        let half = (utils::deg_to_rad(self.fov) * 0.5).tan() / self.zoom.max(f32::EPSILON);
        2.0 * half.atan()
    }

    /// Update the aspect ratio from a viewport size
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
        log::trace!("camera aspect now {}", self.aspect);
    }

    /// World-to-view transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// View-to-clip transform
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov_radians(), self.aspect, self.near, self.far)
    }

    /// Combined world-to-clip transform
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a point in NDC (y up)
    pub fn screen_to_world_ray(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray> {
        let inverse = self.view_projection_matrix().try_inverse()?;
        let unproject = |z: f32| {
            let h = inverse * Vec4::new(ndc_x, ndc_y, z, 1.0);
            (h.w.abs() > f32::EPSILON).then(|| h.xyz() / h.w)
        };
        let near = unproject(-1.0)?;
        let far = unproject(1.0)?;
        Some(Ray::new(self.position, far - near))
    }

    /// Size of the visible plane at `distance` from the camera
    pub fn visible_extent(&self, distance: f32) -> (f32, f32) {
        let height = 2.0 * (self.fov_radians() * 0.5).tan() * distance;
        (height * self.aspect, height)
    }

    /// Viewport measured in world units at the camera's distance to the origin
    pub fn world_viewport(&self) -> WorldViewport {
        let (width, height) = self.visible_extent(self.position.norm());
        WorldViewport {
            width,
            height,
            aspect: self.aspect,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 1.0)
    }
}

impl Reflect for Camera {
    fn type_name(&self) -> Option<&'static str> {
        Some("PerspectiveCamera")
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Self::perspective(Vec3::zeros(), 50.0, 1.0, 0.1, 2000.0)))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        Some(match key {
            "position" => PropValue::Vector3(self.position),
            "target" => PropValue::Vector3(self.target),
            "up" => PropValue::Vector3(self.up),
            "fov" => PropValue::Number(self.fov),
            "aspect" => PropValue::Number(self.aspect),
            "near" => PropValue::Number(self.near),
            "far" => PropValue::Number(self.far),
            "zoom" => PropValue::Number(self.zoom),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        let field = match key {
            "fov" => &mut self.fov,
            "aspect" => &mut self.aspect,
            "near" => &mut self.near,
            "far" => &mut self.far,
            "zoom" => &mut self.zoom,
            "projectionMatrix" => return Err(read_only("PerspectiveCamera", key)),
            "position" | "target" | "up" => return Err(mismatch(key, "vector", &value)),
            _ => return Err(unknown("PerspectiveCamera", key)),
        };
        *field = expect_number(key, &value)?;
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> Option<Slot<'_>> {
        match key {
            "position" => Some(Slot::Structured(&mut self.position)),
            "target" => Some(Slot::Structured(&mut self.target)),
            "up" => Some(Slot::Structured(&mut self.up)),
            _ => None,
        }
    }
}
