//! Pan/zoom state of the canvas around the graphic

use serde::{Deserialize, Serialize};

use super::Point;

/// Maps graphic coordinates to screen coordinates: `screen = graphic * scale + pan`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scale: f64,
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan: Point::default(),
        }
    }
}

impl Viewport {
    pub const MIN_SCALE: f64 = 0.1;
    pub const MAX_SCALE: f64 = 10.0;

    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.pan.x, p.y * self.scale + self.pan.y)
    }

    pub fn to_graphic(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.scale, (p.y - self.pan.y) / self.scale)
    }

    /// Convert a screen-space pointer delta into graphic units
    pub fn delta_to_graphic(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.scale, dy / self.scale)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan = self.pan.offset(dx, dy);
    }

    /// Multiply the scale by `factor`, keeping `anchor` (screen space) fixed
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) {
        let before = self.to_graphic(anchor);
        self.scale = (self.scale * factor).clamp(Self::MIN_SCALE, Self::MAX_SCALE);
        let after = self.to_screen(before);
        self.pan = self.pan.offset(anchor.x - after.x, anchor.y - after.y);
    }
}
