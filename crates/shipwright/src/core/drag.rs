//! Pointer-drag state machine for scene nodes
//!
//! One [`DragController`] exists per connector family; they differ only in
//! the [`Reconnector`] that redraws connectors after each movement frame.
//! Both share one [`DragFlag`] so the canvas can refuse pan/zoom while any
//! node is being dragged.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, info, trace};

use super::scene::Scene;
use super::{EditorError, EditorResult, NodeTransform, Point, Viewport, VisualSnapshot};

/// Class added to a node while it is being dragged
pub const DRAGGING_CLASS: &str = "dragging";

/// Redraws the connectors attached to moved nodes
pub trait Reconnector {
    /// Recompute every edge of this reconnector's kind that touches one of
    /// the `moved` node indices; all other edges are left untouched
    fn reconnect(&self, scene: &mut Scene, moved: &[usize]);

    /// Apply a batch of node translations, then reconnect once
    fn reconnect_all(&self, scene: &mut Scene, transforms: &[NodeTransform]) -> EditorResult<()> {
        let mut moved = Vec::with_capacity(transforms.len());
        for transform in transforms {
            let index = scene
                .node_index(&transform.node_id)
                .ok_or_else(|| EditorError::unknown_node(&transform.node_id))?;
            scene.set_translation(index, transform.offset());
            moved.push(index);
        }
        self.reconnect(scene, &moved);
        Ok(())
    }
}

/// Shared "a node is being dragged" flag
#[derive(Debug, Clone, Default)]
pub struct DragFlag(Rc<Cell<bool>>);

impl DragFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }

    fn set(&self, value: bool) {
        self.0.set(value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { node: usize, last_pointer: Point },
}

/// Event produced when a drag gesture starts
#[derive(Debug, Clone, PartialEq)]
pub struct DragStart {
    pub node_id: String,
    /// Markup captured before the node was touched
    pub snapshot: VisualSnapshot,
}

/// Idle/dragging state machine driving one family of nodes
#[derive(Debug)]
pub struct DragController<R> {
    reconnector: R,
    flag: DragFlag,
    state: DragState,
}

impl<R: Reconnector> DragController<R> {
    pub fn new(reconnector: R, flag: DragFlag) -> Self {
        Self {
            reconnector,
            flag,
            state: DragState::Idle,
        }
    }

    pub fn reconnector(&self) -> &R {
        &self.reconnector
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Id of the node currently being dragged, if any
    pub fn active_node<'a>(&self, scene: &'a Scene) -> Option<&'a str> {
        match self.state {
            DragState::Dragging { node, .. } => scene.node(node).map(|n| n.id.as_str()),
            DragState::Idle => None,
        }
    }

    /// Start dragging node `index` with the pointer at `pointer` (screen space)
    ///
    /// Returns `None` when a drag is already in progress or the node does
    /// not exist. The snapshot in the returned event is taken before the
    /// node is raised or restyled.
    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        index: usize,
        pointer: Point,
        now_ms: u64,
    ) -> Option<DragStart> {
        if self.is_dragging() || self.flag.get() {
            return None;
        }
        let node = scene.node(index)?;
        let node_id = node.id.clone();
        let element = node.element;

        let snapshot = VisualSnapshot::new(scene.to_markup(), now_ms);

        let document = scene.document_mut();
        document.raise(element);
        document.add_class(element, DRAGGING_CLASS);
        self.flag.set(true);
        self.state = DragState::Dragging {
            node: index,
            last_pointer: pointer,
        };

        info!(node = %node_id, "Drag started");
        Some(DragStart { node_id, snapshot })
    }

    /// Move the dragged node by the pointer delta and redraw its connectors
    ///
    /// Returns the node's new translation, or `None` when idle.
    pub fn pointer_move(
        &mut self,
        scene: &mut Scene,
        pointer: Point,
        viewport: &Viewport,
    ) -> Option<Point> {
        let DragState::Dragging { node, last_pointer } = self.state else {
            return None;
        };
        let (dx, dy) = viewport.delta_to_graphic(pointer.x - last_pointer.x, pointer.y - last_pointer.y);
        let translation = scene.node(node)?.translation.offset(dx, dy);

        scene.set_translation(node, translation);
        self.reconnector.reconnect(scene, &[node]);
        self.state = DragState::Dragging {
            node,
            last_pointer: pointer,
        };

        trace!(node, x = translation.x, y = translation.y, "Drag frame");
        Some(translation)
    }

    /// Finish the gesture; returns the node's final translation
    pub fn pointer_up(&mut self, scene: &mut Scene) -> Option<NodeTransform> {
        let DragState::Dragging { node, .. } = self.state else {
            return None;
        };
        self.state = DragState::Idle;
        self.flag.set(false);

        let node = scene.node(node)?;
        let transform = NodeTransform::new(node.id.clone(), node.translation.x, node.translation.y);
        let element = node.element;
        scene.document_mut().remove_class(element, DRAGGING_CLASS);

        info!(node = %transform.node_id, x = transform.x, y = transform.y, "Drag ended");
        Some(transform)
    }

    /// Drop any gesture in progress without touching the scene
    ///
    /// Used when the scene is replaced underneath an active drag.
    pub fn reset(&mut self) {
        if self.is_dragging() {
            debug!("Drag abandoned by scene replacement");
            self.flag.set(false);
        }
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoundingBox, FixedGeometry, SvgDocument};
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recording(RefCell<Vec<Vec<usize>>>);

    impl Reconnector for Recording {
        fn reconnect(&self, _scene: &mut Scene, moved: &[usize]) {
            self.0.borrow_mut().push(moved.to_vec());
        }
    }

    fn scene() -> Scene {
        let geometry = FixedGeometry::new()
            .with_box("a", BoundingBox::new(-10.0, -10.0, 20.0, 20.0))
            .with_box("b", BoundingBox::new(-10.0, -10.0, 20.0, 20.0));
        Scene::build(
            SvgDocument::parse(
                r#"<svg><g class="nodes"><g class="node" id="a"/><g class="node" id="b" transform="translate(100, 0)"/></g></svg>"#,
            )
            .unwrap(),
            &geometry,
        )
    }

    #[test]
    fn test_full_gesture() {
        let mut scene = scene();
        let flag = DragFlag::new();
        let mut drag = DragController::new(Recording::default(), flag.clone());

        let start = drag
            .pointer_down(&mut scene, 0, Point::new(5.0, 5.0), 42)
            .unwrap();
        assert_eq!(start.node_id, "a");
        assert_eq!(start.snapshot.timestamp, 42);
        assert!(!start.snapshot.svg_markup.contains(DRAGGING_CLASS));
        assert!(flag.get());
        // raised above its sibling
        assert!(scene.to_markup().ends_with(r#"class="node dragging" id="a"/></g></svg>"#));

        let viewport = Viewport {
            scale: 2.0,
            pan: Point::default(),
        };
        drag.pointer_move(&mut scene, Point::new(25.0, 15.0), &viewport);
        let moved = drag.pointer_move(&mut scene, Point::new(45.0, 15.0), &viewport);
        assert_eq!(moved, Some(Point::new(20.0, 5.0)));
        assert_eq!(*drag.reconnector().0.borrow(), vec![vec![0], vec![0]]);

        let end = drag.pointer_up(&mut scene).unwrap();
        assert_eq!(end, NodeTransform::new("a", 20.0, 5.0));
        assert!(!flag.get());
        assert!(!scene.to_markup().contains(DRAGGING_CLASS));
    }

    #[test]
    fn test_second_press_ignored_while_dragging() {
        let mut scene = scene();
        let flag = DragFlag::new();
        let mut first = DragController::new(Recording::default(), flag.clone());
        let mut second = DragController::new(Recording::default(), flag);

        assert!(first.pointer_down(&mut scene, 0, Point::default(), 0).is_some());
        assert!(first.pointer_down(&mut scene, 1, Point::default(), 0).is_none());
        assert!(second.pointer_down(&mut scene, 1, Point::default(), 0).is_none());
    }

    #[test]
    fn test_idle_events_are_ignored() {
        let mut scene = scene();
        let mut drag = DragController::new(Recording::default(), DragFlag::new());
        assert!(drag
            .pointer_move(&mut scene, Point::new(1.0, 1.0), &Viewport::default())
            .is_none());
        assert!(drag.pointer_up(&mut scene).is_none());
        assert!(drag.reconnector().0.borrow().is_empty());
    }

    #[test]
    fn test_reconnect_all_unknown_node() {
        let mut scene = scene();
        let err = Recording::default()
            .reconnect_all(&mut scene, &[NodeTransform::new("zzz", 1.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, EditorError::UnknownNode { .. }));
    }
}
