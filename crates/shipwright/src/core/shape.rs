//! Shape classification of rendered nodes
//!
//! Rules are checked in order and the first match wins. Anything
//! unrecognized is a rectangle, whose boundary math is the most forgiving.

use super::path_data::{parse_points, PathData};
use super::{ElementId, ShapeClass, SvgDocument};

const DIAMOND_MARKERS: &[&str] = &["decision", "question", "diamond", "rhombus"];
const CIRCLE_MARKERS: &[&str] = &["circle", "ellipse", "doublecircle"];

/// Determine the shape class of a node group
pub fn classify(document: &SvgDocument, node: ElementId) -> ShapeClass {
    let descendants = document.descendants(node);

    let four_vertex_polygon = descendants.iter().any(|&id| {
        document.name(id) == "polygon"
            && document
                .attr(id, "points")
                .and_then(|p| parse_points(p).ok())
                .is_some_and(|points| points.len() == 4)
    });
    if four_vertex_polygon {
        return ShapeClass::Diamond;
    }

    let angular_label_path = descendants.iter().any(|&id| {
        document.name(id) == "path"
            && is_label_bearing(document, node, id)
            && document
                .attr(id, "d")
                .and_then(|d| PathData::parse(d).ok())
                .is_some_and(|path| path.line_segment_count() >= 3)
    });
    if angular_label_path {
        return ShapeClass::Diamond;
    }

    if has_marker(document, node, DIAMOND_MARKERS) {
        return ShapeClass::Diamond;
    }

    let round_primitive = descendants
        .iter()
        .any(|&id| matches!(document.name(id), "circle" | "ellipse"));
    if round_primitive || has_marker(document, node, CIRCLE_MARKERS) {
        return ShapeClass::Circle;
    }

    ShapeClass::Rectangle
}

/// A path draws the node outline when it, or a group between it and the
/// node, is marked as the label container
fn is_label_bearing(document: &SvgDocument, node: ElementId, path: ElementId) -> bool {
    let mut current = Some(path);
    while let Some(id) = current {
        if document.has_class(id, "label-container") {
            return true;
        }
        if id == node {
            break;
        }
        current = document.parent(id);
    }
    false
}

/// Style metadata on the node: class tokens or `data-shape` / `data-type`
fn has_marker(document: &SvgDocument, node: ElementId, markers: &[&str]) -> bool {
    let in_classes = document
        .classes(node)
        .any(|c| markers.iter().any(|m| c.eq_ignore_ascii_case(m)));
    let in_data = ["data-shape", "data-type"].iter().any(|attr| {
        document
            .attr(node, attr)
            .is_some_and(|value| markers.iter().any(|m| value.eq_ignore_ascii_case(m)))
    });
    in_classes || in_data
}
