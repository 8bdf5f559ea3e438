//! Boundary intersection math
//!
//! Given a node's box, its shape class, and the center of the node at the
//! other end of a connector, find where the connector should leave the node.
//! The result moves continuously with the target so dragging stays smooth.

use super::{BoundingBox, Point, ShapeClass};

/// Computes connector endpoints on node boundaries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundarySolver {
    /// Centers closer than this are treated as the same point
    pub coincide_epsilon: f64,
}

impl Default for BoundarySolver {
    fn default() -> Self {
        Self {
            coincide_epsilon: 0.1,
        }
    }
}

impl BoundarySolver {
    pub fn new(coincide_epsilon: f64) -> Self {
        Self { coincide_epsilon }
    }

    /// Point on the boundary of `node_box` along the ray from its center
    /// toward `target`
    pub fn intersect(&self, node_box: &BoundingBox, shape: ShapeClass, target: Point) -> Point {
        let center = node_box.center();
        let dx = target.x - center.x;
        let dy = target.y - center.y;
        if dx.hypot(dy) < self.coincide_epsilon {
            return center;
        }

        let half_w = node_box.width / 2.0;
        let half_h = node_box.height / 2.0;
        match shape {
            ShapeClass::Rectangle => rectangle_exit(center, half_w, half_h, dx, dy),
            ShapeClass::Diamond => diamond_exit(center, half_w, half_h, dx, dy),
            ShapeClass::Circle => circle_exit(center, half_w.min(half_h), dx, dy),
        }
    }
}

fn rectangle_exit(center: Point, half_w: f64, half_h: f64, dx: f64, dy: f64) -> Point {
    if dx == 0.0 {
        return Point::new(center.x, center.y + half_h.copysign(dy));
    }
    if dy == 0.0 {
        return Point::new(center.x + half_w.copysign(dx), center.y);
    }

    // |dy/dx| <= half_h/half_w, written without the divisions
    if dy.abs() * half_w <= dx.abs() * half_h {
        let x = half_w.copysign(dx);
        Point::new(center.x + x, center.y + x * dy / dx)
    } else {
        let y = half_h.copysign(dy);
        Point::new(center.x + y * dx / dy, center.y + y)
    }
}

fn diamond_exit(center: Point, half_w: f64, half_h: f64, dx: f64, dy: f64) -> Point {
    if half_w <= 0.0 || half_h <= 0.0 {
        return center;
    }
    // |t*dx|/half_w + |t*dy|/half_h = 1
    let t = 1.0 / (dx.abs() / half_w + dy.abs() / half_h);
    Point::new(center.x + t * dx, center.y + t * dy)
}

fn circle_exit(center: Point, radius: f64, dx: f64, dy: f64) -> Point {
    let length = dx.hypot(dy);
    Point::new(
        center.x + dx / length * radius,
        center.y + dy / length * radius,
    )
}
