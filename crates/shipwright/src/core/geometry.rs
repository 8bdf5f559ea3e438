//! Bounding-box queries against the live graphic
//!
//! The editor never measures elements itself; it asks a [`GeometryProvider`].
//! In a browser that is `getBBox()`; headless code and tests use
//! [`MarkupGeometry`] (computed from the markup) or [`FixedGeometry`]
//! (synthetic boxes keyed by element id).

use std::collections::HashMap;

use tracing::trace;
use unicode_width::UnicodeWidthStr;

use super::path_data::{parse_points, PathData, TransformList};
use super::{BoundingBox, ElementId, Point, SvgDocument};

/// Source of element geometry
pub trait GeometryProvider {
    /// Bounding box of `element` in its own user space
    ///
    /// The element's own `transform` is not applied; transforms of elements
    /// below it are.
    fn bounding_box(&self, document: &SvgDocument, element: ElementId) -> BoundingBox;
}

/// Translation carried by an element's `transform` attribute
pub fn element_translation(document: &SvgDocument, element: ElementId) -> Point {
    document
        .attr(element, "transform")
        .and_then(|t| TransformList::parse(t).ok())
        .map(|list| list.translation())
        .unwrap_or_default()
}

/// Geometry computed from the markup itself
#[derive(Debug, Clone)]
pub struct MarkupGeometry {
    /// Font size assumed for text without an explicit `font-size`
    pub default_font_size: f64,
}

impl Default for MarkupGeometry {
    fn default() -> Self {
        Self {
            default_font_size: 16.0,
        }
    }
}

impl MarkupGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    fn shape_box(&self, doc: &SvgDocument, id: ElementId) -> Option<BoundingBox> {
        match doc.name(id) {
            "rect" => Some(BoundingBox::new(
                number_attr(doc, id, "x"),
                number_attr(doc, id, "y"),
                number_attr(doc, id, "width"),
                number_attr(doc, id, "height"),
            )),
            "circle" => {
                let r = number_attr(doc, id, "r");
                let center = Point::new(number_attr(doc, id, "cx"), number_attr(doc, id, "cy"));
                Some(BoundingBox::centered(center, 2.0 * r, 2.0 * r))
            }
            "ellipse" => {
                let center = Point::new(number_attr(doc, id, "cx"), number_attr(doc, id, "cy"));
                Some(BoundingBox::centered(
                    center,
                    2.0 * number_attr(doc, id, "rx"),
                    2.0 * number_attr(doc, id, "ry"),
                ))
            }
            "line" => BoundingBox::from_points(&[
                Point::new(number_attr(doc, id, "x1"), number_attr(doc, id, "y1")),
                Point::new(number_attr(doc, id, "x2"), number_attr(doc, id, "y2")),
            ]),
            "polygon" | "polyline" => doc
                .attr(id, "points")
                .and_then(|p| parse_points(p).ok())
                .and_then(|points| BoundingBox::from_points(&points)),
            "path" => doc
                .attr(id, "d")
                .and_then(|d| PathData::parse(d).ok())
                .and_then(|path| BoundingBox::from_points(&path.points())),
            _ => None,
        }
    }

    fn text_box(&self, doc: &SvgDocument, id: ElementId) -> Option<BoundingBox> {
        match doc.name(id) {
            "foreignObject" => Some(BoundingBox::new(
                number_attr(doc, id, "x"),
                number_attr(doc, id, "y"),
                number_attr(doc, id, "width"),
                number_attr(doc, id, "height"),
            )),
            "text" => {
                let content = doc.text_content(id);
                let content = content.trim();
                if content.is_empty() {
                    return None;
                }
                let font_size = doc
                    .attr(id, "font-size")
                    .and_then(parse_length)
                    .unwrap_or(self.default_font_size);
                let width = content.width() as f64 * font_size * 0.6;
                let height = font_size * 1.2;
                let x = number_attr(doc, id, "x");
                let y = number_attr(doc, id, "y");
                let left = match doc.attr(id, "text-anchor") {
                    Some("middle") => x - width / 2.0,
                    Some("end") => x - width,
                    _ => x,
                };
                let top = match doc.attr(id, "dominant-baseline") {
                    Some("middle") | Some("central") => y - height / 2.0,
                    _ => y - font_size,
                };
                Some(BoundingBox::new(left, top, width, height))
            }
            _ => None,
        }
    }

    fn collect(
        &self,
        doc: &SvgDocument,
        id: ElementId,
        offset: Point,
        measure: &dyn Fn(&SvgDocument, ElementId) -> Option<BoundingBox>,
        out: &mut Option<BoundingBox>,
    ) {
        for child in doc.children(id) {
            let translation = element_translation(doc, child);
            let child_offset = offset.offset(translation.x, translation.y);
            if let Some(bbox) = measure(doc, child) {
                let placed = bbox.translated(child_offset);
                *out = Some(match out.take() {
                    Some(existing) => existing.union(&placed),
                    None => placed,
                });
            }
            self.collect(doc, child, child_offset, measure, out);
        }
    }
}

impl GeometryProvider for MarkupGeometry {
    fn bounding_box(&self, document: &SvgDocument, element: ElementId) -> BoundingBox {
        let shapes = |doc: &SvgDocument, id: ElementId| self.shape_box(doc, id);
        let texts = |doc: &SvgDocument, id: ElementId| self.text_box(doc, id);

        if let Some(own) = self.shape_box(document, element) {
            return own;
        }

        let mut found = None;
        self.collect(document, element, Point::default(), &shapes, &mut found);
        if found.is_none() {
            found = self.text_box(document, element);
        }
        if found.is_none() {
            self.collect(document, element, Point::default(), &texts, &mut found);
        }

        let bbox = found.unwrap_or_default();
        trace!(element = ?element, ?bbox, "Measured element from markup");
        bbox
    }
}

/// Synthetic geometry keyed by element `id` attribute
///
/// Elements without an entry measure as an empty box at the origin.
#[derive(Debug, Clone, Default)]
pub struct FixedGeometry {
    boxes: HashMap<String, BoundingBox>,
}

impl FixedGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_box(mut self, element_id: impl Into<String>, bbox: BoundingBox) -> Self {
        self.boxes.insert(element_id.into(), bbox);
        self
    }
}

impl GeometryProvider for FixedGeometry {
    fn bounding_box(&self, document: &SvgDocument, element: ElementId) -> BoundingBox {
        document
            .attr(element, "id")
            .and_then(|id| self.boxes.get(id))
            .copied()
            .unwrap_or_default()
    }
}

fn parse_length(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").trim().parse::<f64>().ok()
}

fn number_attr(doc: &SvgDocument, id: ElementId, name: &str) -> f64 {
    doc.attr(id, name).and_then(parse_length).unwrap_or(0.0)
}
