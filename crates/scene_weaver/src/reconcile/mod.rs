//! Property reconciliation
//!
//! Turns descriptors into writes on live objects: [`classify`] splits a
//! descriptor into changes, and a [`Reconciler`] resolves each change against
//! the [`Reflect`]/[`Structured`] capability traits.

mod apply;
mod classify;
mod defaults;
mod path;
pub mod reflect;

pub use apply::Reconciler;
pub use classify::{classify, is_event_key, Change, PATH_SEPARATOR};
pub use defaults::DefaultCache;
pub use path::PropPath;
pub use reflect::{PropertyError, Reflect, Slot, Structured, StructuredKind};
