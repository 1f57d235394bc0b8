//! Pointer picking: rays, hit testing and hover tracking

mod hover;
mod pointer;
mod primitives;
mod raycaster;

pub use hover::{dispatch_nearest, HoverSet};
pub use pointer::PointerState;
pub use primitives::{Aabb, BoundingSphere, Bounds, Ray};
pub use raycaster::{Intersection, Raycaster};
