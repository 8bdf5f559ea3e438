//! The interactive view of one rendered graphic
//!
//! A [`Scene`] is built once per render pass (or snapshot restore) from an
//! [`SvgDocument`]. It indexes the nodes, connectors, edge labels and
//! arrowheads found in the markup and owns the document, so every mutation
//! made by dragging goes through it and ends up in the next snapshot.

use tracing::debug;

use super::geometry::{element_translation, GeometryProvider};
use super::path_data::{parse_points, TransformList};
use super::shape::classify;
use super::{BoundingBox, ElementId, NodeTransform, Point, ShapeClass, SvgDocument};

/// Which family of diagram element a node or connector belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Flowchart shapes joined by straight connectors
    Flowchart,
    /// Boxed entities joined by routed relationship lines
    Entity,
}

/// A shape in the rendered graphic
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: String,
    pub element: ElementId,
    pub kind: NodeKind,
    pub shape: ShapeClass,
    /// Box in the node's own coordinates, before its translation
    pub local_box: BoundingBox,
    pub translation: Point,
}

impl SceneNode {
    /// Box on the canvas: local box moved by the current translation
    pub fn current_box(&self) -> BoundingBox {
        self.local_box.translated(self.translation)
    }

    pub fn center(&self) -> Point {
        self.current_box().center()
    }
}

/// A text annotation that may belong to one connector
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLabel {
    pub element: ElementId,
    pub local_box: BoundingBox,
    pub translation: Point,
}

impl SceneLabel {
    /// Visual center on the canvas
    pub fn center(&self) -> Point {
        self.local_box.translated(self.translation).center()
    }
}

/// A connector path as found in the markup, before inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConnector {
    pub element: ElementId,
    pub kind: NodeKind,
}

/// A connector with its inferred endpoints
///
/// Indices refer to [`Scene::nodes`] and [`Scene::labels`]. The association
/// is fixed for the lifetime of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeMeta {
    pub connector: ElementId,
    pub kind: NodeKind,
    pub source: usize,
    pub target: usize,
    pub label: Option<usize>,
    pub arrowhead: Option<ElementId>,
}

impl EdgeMeta {
    pub fn touches(&self, node: usize) -> bool {
        self.source == node || self.target == node
    }
}

/// Indexed, mutable view of one rendered graphic
#[derive(Debug, Clone)]
pub struct Scene {
    document: SvgDocument,
    nodes: Vec<SceneNode>,
    labels: Vec<SceneLabel>,
    connectors: Vec<SceneConnector>,
    arrowheads: Vec<ElementId>,
    edges: Vec<EdgeMeta>,
}

impl Scene {
    /// Index a document; no connector inference happens here
    pub fn build(document: SvgDocument, geometry: &dyn GeometryProvider) -> Self {
        let mut nodes = Vec::new();
        let mut labels = Vec::new();
        let mut connectors = Vec::new();
        let mut arrowheads = Vec::new();

        for element in document.descendants(document.root()) {
            let name = document.name(element);
            if name == "g" {
                if let Some(kind) = node_kind(&document, element) {
                    if inside_node(&document, element) {
                        continue;
                    }
                    let id = document
                        .attr(element, "id")
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("node-{}", nodes.len()));
                    nodes.push(SceneNode {
                        id,
                        element,
                        kind,
                        shape: classify(&document, element),
                        local_box: geometry.bounding_box(&document, element),
                        translation: element_translation(&document, element),
                    });
                } else if document.has_class(element, "edgeLabel") {
                    labels.push(SceneLabel {
                        element,
                        local_box: geometry.bounding_box(&document, element),
                        translation: element_translation(&document, element),
                    });
                }
            } else if name == "path" && !inside_node(&document, element) {
                if document.has_class(element, "relationshipLine") {
                    connectors.push(SceneConnector {
                        element,
                        kind: NodeKind::Entity,
                    });
                } else if document.has_class(element, "flowchart-link")
                    || has_ancestor_class(&document, element, "edgePaths")
                {
                    connectors.push(SceneConnector {
                        element,
                        kind: NodeKind::Flowchart,
                    });
                }
            } else if name == "polygon" && document.has_class(element, "arrowhead") {
                arrowheads.push(element);
            }
        }

        debug!(
            nodes = nodes.len(),
            connectors = connectors.len(),
            labels = labels.len(),
            arrowheads = arrowheads.len(),
            "Indexed scene"
        );

        Self {
            document,
            nodes,
            labels,
            connectors,
            arrowheads,
            edges: Vec::new(),
        }
    }

    pub fn document(&self) -> &SvgDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut SvgDocument {
        &mut self.document
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn labels(&self) -> &[SceneLabel] {
        &self.labels
    }

    pub fn connectors(&self) -> &[SceneConnector] {
        &self.connectors
    }

    pub fn arrowheads(&self) -> &[ElementId] {
        &self.arrowheads
    }

    pub fn edges(&self) -> &[EdgeMeta] {
        &self.edges
    }

    /// Install the inferred edges for this render pass
    pub fn set_edges(&mut self, edges: Vec<EdgeMeta>) {
        self.edges = edges;
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn node(&self, index: usize) -> Option<&SceneNode> {
        self.nodes.get(index)
    }

    /// Index of the node whose element is `element` or contains it
    pub fn node_for_element(&self, element: ElementId) -> Option<usize> {
        let mut current = Some(element);
        while let Some(id) = current {
            if let Some(index) = self.nodes.iter().position(|n| n.element == id) {
                return Some(index);
            }
            current = self.document.parent(id);
        }
        None
    }

    /// Set a node's translation, in the index and in the markup
    pub fn set_translation(&mut self, index: usize, translation: Point) {
        let Some(node) = self.nodes.get_mut(index) else {
            return;
        };
        node.translation = translation;
        let element = node.element;
        write_translation(&mut self.document, element, translation);
    }

    /// Set a label's translation, in the index and in the markup
    pub fn set_label_translation(&mut self, index: usize, translation: Point) {
        let Some(label) = self.labels.get_mut(index) else {
            return;
        };
        label.translation = translation;
        let element = label.element;
        write_translation(&mut self.document, element, translation);
    }

    /// Move a label so its box is centered on `point`
    pub fn center_label_on(&mut self, index: usize, point: Point) {
        let Some(label) = self.labels.get(index) else {
            return;
        };
        let local_center = label.local_box.center();
        self.set_label_translation(
            index,
            Point::new(point.x - local_center.x, point.y - local_center.y),
        );
    }

    pub fn set_path(&mut self, connector: ElementId, d: String) {
        self.document.set_attr(connector, "d", d);
    }

    pub fn set_polygon(&mut self, polygon: ElementId, points: String) {
        self.document.set_attr(polygon, "points", points);
    }

    /// Polygon vertices of an arrowhead, empty when unreadable
    pub fn polygon_points(&self, polygon: ElementId) -> Vec<Point> {
        self.document
            .attr(polygon, "points")
            .and_then(|p| parse_points(p).ok())
            .unwrap_or_default()
    }

    /// Current translation of every node
    pub fn transforms(&self) -> Vec<NodeTransform> {
        self.nodes
            .iter()
            .map(|n| NodeTransform::new(n.id.clone(), n.translation.x, n.translation.y))
            .collect()
    }

    pub fn to_markup(&self) -> String {
        self.document.to_markup()
    }
}

fn node_kind(document: &SvgDocument, element: ElementId) -> Option<NodeKind> {
    if document.has_class(element, "node") {
        return Some(NodeKind::Flowchart);
    }
    let entity_id = document
        .attr(element, "id")
        .is_some_and(|id| id.starts_with("entity-"));
    if entity_id || document.has_class(element, "entity") {
        return Some(NodeKind::Entity);
    }
    None
}

fn inside_node(document: &SvgDocument, element: ElementId) -> bool {
    let mut current = document.parent(element);
    while let Some(id) = current {
        if document.name(id) == "g" && node_kind(document, id).is_some() {
            return true;
        }
        current = document.parent(id);
    }
    false
}

fn has_ancestor_class(document: &SvgDocument, element: ElementId, class: &str) -> bool {
    let mut current = document.parent(element);
    while let Some(id) = current {
        if document.has_class(id, class) {
            return true;
        }
        current = document.parent(id);
    }
    false
}

fn write_translation(document: &mut SvgDocument, element: ElementId, translation: Point) {
    let list = document
        .attr(element, "transform")
        .and_then(|t| TransformList::parse(t).ok())
        .unwrap_or_default();
    document.set_attr(element, "transform", list.with_translation(translation));
}
