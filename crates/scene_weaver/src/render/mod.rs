//! Camera and output surfaces

mod camera;
mod surface;

pub use camera::Camera;
pub use surface::{
    FrameRecord, HeadlessSurface, RenderSurface, SurfaceError, SurfaceSettings, ToneMapping, Viewport, WorldViewport,
};
