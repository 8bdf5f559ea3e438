//! Straight-line reconnection between shape boundaries

use tracing::trace;

use crate::core::path_data::PathBuilder;
use crate::core::{BoundarySolver, EditorConfig, NodeKind, Reconnector, Scene};

/// Redraws flowchart connectors as boundary-to-boundary segments
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightReconnector {
    solver: BoundarySolver,
}

impl StraightReconnector {
    pub fn new(solver: BoundarySolver) -> Self {
        Self { solver }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(BoundarySolver::new(config.intersection.coincide_epsilon))
    }
}

impl Reconnector for StraightReconnector {
    fn reconnect(&self, scene: &mut Scene, moved: &[usize]) {
        let affected: Vec<_> = scene
            .edges()
            .iter()
            .filter(|edge| edge.kind == NodeKind::Flowchart)
            .filter(|edge| moved.iter().any(|&node| edge.touches(node)))
            .copied()
            .collect();

        for edge in affected {
            let (Some(source), Some(target)) = (scene.node(edge.source), scene.node(edge.target))
            else {
                continue;
            };
            // read after this frame's translation was applied
            let source_box = source.current_box();
            let target_box = target.current_box();

            let start = self
                .solver
                .intersect(&source_box, source.shape, target_box.center());
            let end = self
                .solver
                .intersect(&target_box, target.shape, source_box.center());

            let d = PathBuilder::new().move_to(start).line_to(end).build();
            trace!(%d, "Reconnected");
            scene.set_path(edge.connector, d);

            if let Some(label) = edge.label {
                scene.center_label_on(label, start.midpoint(end));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{infer_edges, InferenceConfig, MarkupGeometry, NodeTransform, Point, SvgDocument};

    const THREE_NODES: &str = r#"<svg><g class="edgePaths"><path id="ab" d="M20,0 L180,0"/><path id="bc" d="M200,10 L200,190"/></g><g class="edgeLabels"><g class="edgeLabel" id="lab" transform="translate(100, 0)"><rect x="-10" y="-5" width="20" height="10"/></g></g><g class="nodes"><g class="node" id="a" transform="translate(0, 0)"><rect x="-20" y="-10" width="40" height="20"/></g><g class="node" id="b" transform="translate(200, 0)"><rect x="-20" y="-10" width="40" height="20"/></g><g class="node" id="c" transform="translate(200, 200)"><rect x="-20" y="-10" width="40" height="20"/></g></g></svg>"#;

    fn scene() -> Scene {
        let mut scene = Scene::build(
            SvgDocument::parse(THREE_NODES).unwrap(),
            &MarkupGeometry::new(),
        );
        let edges = infer_edges(&scene, &InferenceConfig::default());
        scene.set_edges(edges);
        scene
    }

    fn path_of(scene: &Scene, id: &str) -> String {
        let element = scene.document().find_by_attr("id", id).unwrap();
        scene.document().attr(element, "d").unwrap().to_string()
    }

    #[test]
    fn test_inferred_fixture() {
        let scene = scene();
        assert_eq!(scene.edges().len(), 2);
        assert_eq!(scene.edges()[0].label, Some(0));
        assert_eq!(scene.edges()[1].label, None);
    }

    #[test]
    fn test_moving_node_redraws_only_its_edges() {
        let mut scene = scene();
        scene.set_translation(0, Point::new(0.0, 100.0));
        StraightReconnector::default().reconnect(&mut scene, &[0]);

        assert_eq!(path_of(&scene, "ab"), "M20,90 L180,10");
        assert_eq!(path_of(&scene, "bc"), "M200,10 L200,190");
        assert_eq!(scene.labels()[0].center(), Point::new(100.0, 50.0));
        assert!(scene.to_markup().contains(r#"id="lab" transform="translate(100, 50)""#));
    }

    #[test]
    fn test_unmoved_scene_is_untouched() {
        let mut scene = scene();
        let before = scene.to_markup();
        StraightReconnector::default().reconnect(&mut scene, &[]);
        assert_eq!(scene.to_markup(), before);
    }

    #[test]
    fn test_reconnect_all_applies_transforms() {
        let mut scene = scene();
        StraightReconnector::default()
            .reconnect_all(&mut scene, &[NodeTransform::new("c", 400.0, 0.0)])
            .unwrap();
        // c now sits level with b, to its right
        assert_eq!(path_of(&scene, "bc"), "M220,0 L380,0");
        assert_eq!(path_of(&scene, "ab"), "M20,0 L180,0");
    }
}
