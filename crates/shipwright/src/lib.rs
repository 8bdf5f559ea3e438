//! Shipwright - interactive editing for rendered Mermaid diagrams
//!
//! A rendering service turns diagram text into SVG. Shipwright takes that
//! SVG and makes it editable: nodes can be dragged while their connectors
//! stay attached, node labels can be renamed in place (rewriting the
//! source), and text edits and drags share one undo/redo history.
//!
//! # Quick Start
//!
//! ```rust
//! use shipwright::{load_scene, move_node, EditorConfig};
//!
//! let svg = r#"<svg><g class="nodes">
//!   <g class="node" id="a" transform="translate(0, 0)"><rect x="-20" y="-10" width="40" height="20"/></g>
//!   <g class="node" id="b" transform="translate(200, 0)"><rect x="-20" y="-10" width="40" height="20"/></g>
//! </g><g class="edgePaths"><path d="M20,0 L180,0"/></g></svg>"#;
//!
//! let config = EditorConfig::default();
//! let scene = load_scene(svg, &config).unwrap();
//! assert_eq!(scene.edges().len(), 1);
//!
//! let moved = move_node(svg, "b", 0.0, 100.0, &config).unwrap();
//! assert!(moved.contains("translate(200, 100)"));
//! ```
//!
//! # Interactive Use
//!
//! [`Editor`] owns one document and is driven by host events:
//!
//! ```rust
//! use shipwright::prelude::*;
//!
//! let mut editor = Editor::default();
//! let ticket = match editor.set_source("graph LR\n  a --> b") {
//!     RenderRequest::Render(ticket) => ticket,
//!     RenderRequest::Clear => unreachable!(),
//! };
//!
//! // the host renders `ticket.text` and hands the markup back
//! let event = editor.complete_render(
//!     ticket.id,
//!     Ok(RenderOutput { markup: r#"<svg><g class="node" id="a"><rect width="10" height="10"/></g></svg>"#.into() }),
//! );
//! assert_eq!(event, EditorEvent::RenderApplied { nodes: 1, edges: 0 });
//! ```

pub mod core;
pub mod editor;
pub mod plugins;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;
pub use editor::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        BoundingBox, EditorConfig, GeometryProvider, MarkupGeometry, NodeTransform, Point,
        Reconnector, Scene, ShapeClass, SvgDocument, Theme, VisualSnapshot,
    };
    pub use crate::editor::{
        Editor, EditorEvent, HistoryAction, LabelKey, RenderOutput, RenderRequest, RenderService,
        ServiceError,
    };
    pub use crate::plugins::{EntityRouter, StraightReconnector};
}

/// Parse rendered markup and infer its connectors
///
/// Geometry is measured from the markup itself.
pub fn load_scene(markup: &str, config: &EditorConfig) -> anyhow::Result<Scene> {
    let document = SvgDocument::parse(markup)?;
    let mut scene = Scene::build(document, &MarkupGeometry::new());
    let edges = infer_edges(&scene, &config.inference);
    scene.set_edges(edges);
    Ok(scene)
}

/// Move one node by `(dx, dy)` and return the markup with its connectors
/// redrawn
pub fn move_node(
    markup: &str,
    node_id: &str,
    dx: f64,
    dy: f64,
    config: &EditorConfig,
) -> anyhow::Result<String> {
    use crate::plugins::{EntityRouter, StraightReconnector};

    let mut scene = load_scene(markup, config)?;
    let node = scene
        .node_index(node_id)
        .and_then(|index| scene.node(index))
        .ok_or_else(|| EditorError::unknown_node(node_id))?;
    let target = node.translation.offset(dx, dy);
    let transform = NodeTransform::new(node_id, target.x, target.y);

    StraightReconnector::from_config(config).reconnect_all(&mut scene, &[transform.clone()])?;
    EntityRouter::from_config(config).reconnect_all(&mut scene, &[transform])?;
    Ok(scene.to_markup())
}
