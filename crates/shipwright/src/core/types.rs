//! Core type definitions shared by the editing pipeline
//!
//! This module contains the geometric primitives (points, boxes), the shape
//! classes used for boundary math, and the serializable records that flow
//! through the history tracks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the graphic's coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint of the segment between two points
    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", format_number(self.x), format_number(self.y))
    }
}

/// Axis-aligned bounding box `(x, y, width, height)`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box of the given size centered on a point
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }

    /// Smallest box enclosing all points, `None` for an empty slice
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// The same box moved by a translation offset
    pub fn translated(&self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Grow the box by `amount` on every side
    pub fn expanded(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.max_x() && point.y >= self.y && point.y <= self.max_y()
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> Self {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Shape class of a rendered node, used to pick the boundary formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeClass {
    /// Rectangles and every unrecognized shape
    #[default]
    Rectangle,
    /// Decision nodes
    Diamond,
    /// Circles and ellipses
    Circle,
}

impl fmt::Display for ShapeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeClass::Rectangle => write!(f, "rectangle"),
            ShapeClass::Diamond => write!(f, "diamond"),
            ShapeClass::Circle => write!(f, "circle"),
        }
    }
}

/// One node's translation offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTransform {
    pub node_id: String,
    pub x: f64,
    pub y: f64,
}

impl NodeTransform {
    pub fn new(node_id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            node_id: node_id.into(),
            x,
            y,
        }
    }

    pub fn offset(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Full serialized copy of the graphic at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSnapshot {
    pub svg_markup: String,
    /// Milliseconds, as reported by the host event loop
    pub timestamp: u64,
}

impl VisualSnapshot {
    pub fn new(svg_markup: impl Into<String>, timestamp: u64) -> Self {
        Self {
            svg_markup: svg_markup.into(),
            timestamp,
        }
    }

    /// Snapshots are the same history entry when their markup matches
    pub fn same_markup(&self, other: &VisualSnapshot) -> bool {
        self.svg_markup == other.svg_markup
    }
}

/// Color theme passed to the rendering service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Theme name understood by the rendering service
    pub fn service_name(&self) -> &'static str {
        match self {
            Theme::Light => "default",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// A named saved document, as kept by the storage layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDocument {
    pub id: String,
    pub name: String,
    pub code: String,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Format a coordinate for markup: at most two decimals, no trailing zeros
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let mut text = format!("{:.2}", rounded);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_center_and_translation() {
        let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(bbox.center(), Point::new(60.0, 45.0));

        let moved = bbox.translated(Point::new(5.0, -5.0));
        assert_eq!(moved.center(), Point::new(65.0, 40.0));
        assert_eq!(moved.width, 100.0);
    }

    #[test]
    fn test_box_contains_and_expand() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(bbox.contains(Point::new(10.0, 0.0)));
        assert!(!bbox.contains(Point::new(15.0, 5.0)));
        assert!(bbox.expanded(5.0).contains(Point::new(15.0, 5.0)));
    }

    #[test]
    fn test_box_from_points() {
        let bbox = BoundingBox::from_points(&[
            Point::new(3.0, 4.0),
            Point::new(-1.0, 10.0),
            Point::new(5.0, 2.0),
        ])
        .unwrap();
        assert_eq!(bbox, BoundingBox::new(-1.0, 2.0, 6.0, 8.0));
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(10.5), "10.5");
        assert_eq!(format_number(1.23456), "1.23");
        assert_eq!(format_number(-0.001), "0");
        assert_eq!(format_number(-4.25), "-4.25");
    }

    #[test]
    fn test_shape_class_display() {
        assert_eq!(ShapeClass::Rectangle.to_string(), "rectangle");
        assert_eq!(ShapeClass::Diamond.to_string(), "diamond");
        assert_eq!(ShapeClass::Circle.to_string(), "circle");
        assert_eq!(ShapeClass::default(), ShapeClass::Rectangle);
    }

    #[test]
    fn test_node_transform_serializes_camel_case() {
        let json = serde_json::to_string(&NodeTransform::new("A", 1.0, 2.0)).unwrap();
        assert_eq!(json, r#"{"nodeId":"A","x":1.0,"y":2.0}"#);
    }

    #[test]
    fn test_theme_service_name() {
        assert_eq!(Theme::Light.service_name(), "default");
        assert_eq!(Theme::Dark.service_name(), "dark");
    }
}
