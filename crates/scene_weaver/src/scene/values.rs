//! Structured transform values: Euler rotations and layer masks

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::math::{Mat4, Mat4Ext};

/// Euler rotation in radians, applied in `XYZ` order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    /// Rotation around X
    pub x: f32,
    /// Rotation around Y
    pub y: f32,
    /// Rotation around Z
    pub z: f32,
}

impl Euler {
    /// Create a rotation from three angles
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Rotation matrix
    pub fn to_matrix(self) -> Mat4 {
        Mat4::rotation_xyz(self.x, self.y, self.z)
    }
}

bitflags! {
    /// Raw 32-channel membership mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LayerMask: u32 {
        /// Channel 0, the channel every object starts in
        const DEFAULT = 1;
        /// Every channel
        const ALL = u32::MAX;
    }
}

/// Channel membership used to filter raycasts
///
/// An object and a raycaster "see" each other when their masks share a bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layers {
    /// Membership bits
    pub mask: LayerMask,
}

impl Default for Layers {
    fn default() -> Self {
        Self { mask: LayerMask::DEFAULT }
    }
}

impl Layers {
    /// Number of addressable channels
    pub const CHANNELS: u32 = 32;

    /// Membership in exactly one channel
    pub fn only(channel: u32) -> Self {
        let mut layers = Self::default();
        layers.set(channel);
        layers
    }

    /// Replace membership with exactly one channel (out-of-range channels clear the mask)
    pub fn set(&mut self, channel: u32) {
        self.mask = Self::bit(channel);
    }

    /// Add a channel
    pub fn enable(&mut self, channel: u32) {
        self.mask |= Self::bit(channel);
    }

    /// Remove a channel
    pub fn disable(&mut self, channel: u32) {
        self.mask &= !Self::bit(channel);
    }

    /// Join every channel
    pub fn enable_all(&mut self) {
        self.mask = LayerMask::ALL;
    }

    /// Whether two layer sets share at least one channel
    pub fn test(&self, other: &Self) -> bool {
        self.mask.intersects(other.mask)
    }

    /// Whether a single channel is enabled
    pub fn is_enabled(&self, channel: u32) -> bool {
        self.mask.intersects(Self::bit(channel))
    }

    fn bit(channel: u32) -> LayerMask {
        if channel < Self::CHANNELS {
            LayerMask::from_bits_retain(1 << channel)
        } else {
            LayerMask::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_membership() {
        let mut a = Layers::default();
        let b = Layers::only(3);
        assert!(!a.test(&b));
        a.enable(3);
        assert!(a.test(&b));
        assert!(a.is_enabled(0));
        a.disable(0);
        assert!(!a.is_enabled(0));
    }

    #[test]
    fn test_out_of_range_channel_clears() {
        let mut layers = Layers::default();
        layers.set(40);
        assert!(layers.mask.is_empty());
    }
}
