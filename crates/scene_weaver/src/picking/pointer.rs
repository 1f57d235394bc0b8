//! Pointer position tracking for picking
//!
//! Converts host pixel coordinates into normalized device coordinates used to
//! build camera rays.

/// Last known pointer position and the viewport it was measured in
#[derive(Debug, Clone, PartialEq)]
pub struct PointerState {
    /// X in CSS pixels from the left edge
    pub screen_x: f64,
    /// Y in CSS pixels from the top edge
    pub screen_y: f64,
    /// Viewport width in CSS pixels
    pub viewport_width: u32,
    /// Viewport height in CSS pixels
    pub viewport_height: u32,
    /// Whether the pointer has moved at least once since creation
    pub seen: bool,
}

impl PointerState {
    /// Pointer state for a viewport; the position starts at the top-left corner
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            screen_x: 0.0,
            screen_y: 0.0,
            viewport_width,
            viewport_height,
            seen: false,
        }
    }

    /// Record a pointer move
    pub fn update_position(&mut self, x: f64, y: f64) {
        self.screen_x = x;
        self.screen_y = y;
        self.seen = true;
    }

    /// Record a viewport resize
    pub fn update_viewport(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Position in NDC: x in [-1, 1] left to right, y in [-1, 1] bottom to top
    pub fn to_ndc(&self) -> (f32, f32) {
        let width = f64::from(self.viewport_width.max(1));
        let height = f64::from(self.viewport_height.max(1));
        let ndc_x = (self.screen_x / width) * 2.0 - 1.0;
        let ndc_y = -(self.screen_y / height) * 2.0 + 1.0;
        (ndc_x as f32, ndc_y as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ndc_corners_y_up() {
        let mut pointer = PointerState::new(800, 600);
        pointer.update_position(0.0, 0.0);
        assert_eq!(pointer.to_ndc(), (-1.0, 1.0));
        pointer.update_position(800.0, 600.0);
        assert_eq!(pointer.to_ndc(), (1.0, -1.0));
        pointer.update_position(400.0, 300.0);
        let (x, y) = pointer.to_ndc();
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, 0.0);
    }

    #[test]
    fn test_zero_viewport_does_not_divide_by_zero() {
        let mut pointer = PointerState::new(0, 0);
        pointer.update_position(1.0, 1.0);
        let (x, y) = pointer.to_ndc();
        assert!(x.is_finite() && y.is_finite());
    }
}
