//! The editor facade
//!
//! [`Editor`] ties the pieces together for one open document: the source
//! text, the live [`Scene`], the render lifecycle, both drag controllers,
//! the label editor and the unified history. It is driven by host events
//! (text edits, pointer events, key presses) and never blocks; the only
//! asynchronous step is the rendering service call in [`Editor::render_with`].

use std::cell::RefCell;

use serde::Serialize;
use tracing::{debug, info, span, Level};

use crate::core::{
    infer_edges, DragFlag, EditorConfig, EditorError, EditorResult, GeometryProvider,
    MarkupGeometry, NodeKind, NodeTransform, Point, Reconnector, SavedDocument, Scene,
    SvgDocument, Theme, Viewport, VisualSnapshot,
};
use crate::plugins::{entity_drag, flowchart_drag, EntityDrag, FlowchartDrag};

mod coordinator;
mod history;
mod label;
mod rename;
mod render;
mod service;

pub use coordinator::*;
pub use history::*;
pub use label::*;
pub use rename::*;
pub use render::*;
pub use service::*;

/// Something the host should react to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// A new graphic is live and its connectors were inferred
    #[serde(rename_all = "camelCase")]
    RenderApplied { nodes: usize, edges: usize },
    /// Render failed; the previous graphic is still shown
    RenderFailed { message: String },
    RenderSuperseded,
    GraphicCleared,
    #[serde(rename_all = "camelCase")]
    DragStarted { node_id: String },
    DragEnded { transform: NodeTransform },
    /// Source text replaced by a rename or a text undo/redo; render `request`
    SourceChanged {
        source: String,
        request: RenderRequest,
    },
    /// A captured graphic was installed without rendering
    SnapshotRestored,
    LabelCancelled,
    LabelUnchanged,
    Nothing,
}

/// Interactive editing session over one document
pub struct Editor<G = MarkupGeometry> {
    config: EditorConfig,
    geometry: G,
    source: String,
    scene: Option<Scene>,
    viewport: Viewport,
    lifecycle: RenderLifecycle,
    history: HistoryCoordinator,
    drag_flag: DragFlag,
    flowchart_drag: FlowchartDrag,
    entity_drag: EntityDrag,
    labels: LabelEditor,
    document: Option<SavedDocument>,
}

impl Default for Editor<MarkupGeometry> {
    fn default() -> Self {
        Self::new(EditorConfig::default(), MarkupGeometry::new())
    }
}

impl<G: GeometryProvider> Editor<G> {
    pub fn new(config: EditorConfig, geometry: G) -> Self {
        let drag_flag = DragFlag::new();
        Self {
            lifecycle: RenderLifecycle::default().with_theme(config.theme),
            history: HistoryCoordinator::new(String::new(), config.history.limit),
            flowchart_drag: flowchart_drag(&config, drag_flag.clone()),
            entity_drag: entity_drag(&config, drag_flag.clone()),
            labels: LabelEditor::from_config(&config.label_editor),
            drag_flag,
            geometry,
            source: String::new(),
            scene: None,
            viewport: Viewport::default(),
            document: None,
            config,
        }
    }

    /// Replace the render id generator
    pub fn with_ids(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.lifecycle = RenderLifecycle::new(ids).with_theme(self.config.theme);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Markup of the live graphic
    pub fn markup(&self) -> Option<String> {
        self.scene.as_ref().map(Scene::to_markup)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn history(&self) -> &HistoryCoordinator {
        &self.history
    }

    pub fn last_error(&self) -> Option<&str> {
        self.lifecycle.last_error()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_flag.get()
    }

    pub fn document(&self) -> Option<&SavedDocument> {
        self.document.as_ref()
    }

    pub fn label_overlay(&self) -> Option<&LabelOverlay> {
        self.labels.overlay()
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.config.theme = theme;
        self.lifecycle.set_theme(theme);
    }

    /// A text edit: record it and start rendering it
    pub fn set_source(&mut self, source: impl Into<String>) -> RenderRequest {
        let source = source.into();
        self.history.record_text(source.clone());
        self.source = source;
        self.begin_render()
    }

    /// Start rendering the current source
    pub fn begin_render(&mut self) -> RenderRequest {
        let request = self.lifecycle.begin(&self.source);
        if request == RenderRequest::Clear {
            self.clear_scene();
        }
        request
    }

    /// Hand back the service result for ticket `id`
    pub fn complete_render(
        &mut self,
        id: u64,
        result: Result<RenderOutput, ServiceError>,
    ) -> EditorEvent {
        match self.lifecycle.complete(id, result) {
            RenderOutcome::Applied(document) => {
                self.install(document);
                let (nodes, edges) = self
                    .scene
                    .as_ref()
                    .map_or((0, 0), |s| (s.nodes().len(), s.edges().len()));
                EditorEvent::RenderApplied { nodes, edges }
            }
            RenderOutcome::Failed(message) => EditorEvent::RenderFailed { message },
            RenderOutcome::Superseded => EditorEvent::RenderSuperseded,
        }
    }

    /// Install captured markup as the live graphic without rendering
    pub fn restore(&mut self, markup: &str) -> bool {
        match self.lifecycle.restore(markup) {
            Some(document) => {
                self.install(document);
                true
            }
            None => false,
        }
    }

    /// Open a saved document; both history tracks start over
    pub fn open_document(&mut self, document: SavedDocument) -> RenderRequest {
        info!(id = %document.id, name = %document.name, "Opening document");
        self.history.reset(document.code.clone());
        self.source = document.code.clone();
        self.document = Some(document);
        self.labels.cancel();
        self.begin_render()
    }

    /// Pointer pressed on node `node_id`; `pointer` is in screen space
    pub fn pointer_down(
        &mut self,
        node_id: &str,
        pointer: Point,
        now_ms: u64,
    ) -> EditorResult<EditorEvent> {
        let scene = self
            .scene
            .as_mut()
            .ok_or_else(|| EditorError::unknown_node(node_id))?;
        let index = scene
            .node_index(node_id)
            .ok_or_else(|| EditorError::unknown_node(node_id))?;
        let kind = scene.nodes()[index].kind;

        let start = match kind {
            NodeKind::Flowchart => self.flowchart_drag.pointer_down(scene, index, pointer, now_ms),
            NodeKind::Entity => self.entity_drag.pointer_down(scene, index, pointer, now_ms),
        };
        Ok(match start {
            Some(start) => {
                self.history.record_visual(start.snapshot);
                EditorEvent::DragStarted {
                    node_id: start.node_id,
                }
            }
            None => EditorEvent::Nothing,
        })
    }

    /// Pointer moved; returns the dragged node's new translation
    pub fn pointer_move(&mut self, pointer: Point) -> Option<Point> {
        let scene = self.scene.as_mut()?;
        if self.flowchart_drag.is_dragging() {
            self.flowchart_drag.pointer_move(scene, pointer, &self.viewport)
        } else if self.entity_drag.is_dragging() {
            self.entity_drag.pointer_move(scene, pointer, &self.viewport)
        } else {
            None
        }
    }

    pub fn pointer_up(&mut self) -> EditorEvent {
        let Some(scene) = self.scene.as_mut() else {
            return EditorEvent::Nothing;
        };
        let transform = if self.flowchart_drag.is_dragging() {
            self.flowchart_drag.pointer_up(scene)
        } else {
            self.entity_drag.pointer_up(scene)
        };
        transform.map_or(EditorEvent::Nothing, |transform| EditorEvent::DragEnded {
            transform,
        })
    }

    /// Pan the canvas; refused while a node is being dragged
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.viewport.pan_by(dx, dy);
        true
    }

    /// Zoom around a screen point; refused while a node is being dragged
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.viewport.zoom_by(factor, anchor);
        true
    }

    /// Double-click on a node: open the rename overlay
    pub fn begin_label_edit(
        &mut self,
        node_id: &str,
        now_ms: u64,
    ) -> EditorResult<Option<LabelOverlay>> {
        let scene = self
            .scene
            .as_ref()
            .ok_or_else(|| EditorError::unknown_node(node_id))?;
        let index = scene
            .node_index(node_id)
            .ok_or_else(|| EditorError::unknown_node(node_id))?;
        Ok(self
            .labels
            .begin(scene, index, &self.viewport, now_ms)
            .cloned())
    }

    pub fn label_input(&mut self, text: impl Into<String>) {
        self.labels.input(text);
    }

    pub fn label_key(&mut self, key: LabelKey) -> EditorEvent {
        let outcome = self.labels.key(key, &self.source);
        self.apply_label_outcome(outcome)
    }

    pub fn label_blur(&mut self, now_ms: u64) -> EditorEvent {
        let outcome = self.labels.blur(&self.source, now_ms);
        self.apply_label_outcome(outcome)
    }

    /// Unified undo; `now_ms` stamps the snapshot saved for redo
    pub fn undo(&mut self, now_ms: u64) -> EditorEvent {
        if self.is_dragging() {
            return EditorEvent::Nothing;
        }
        let scene = &self.scene;
        let action = self.history.undo(|| capture(scene, now_ms));
        self.apply_history_action(action)
    }

    /// Unified redo
    pub fn redo(&mut self, now_ms: u64) -> EditorEvent {
        if self.is_dragging() {
            return EditorEvent::Nothing;
        }
        let scene = &self.scene;
        let action = self.history.redo(|| capture(scene, now_ms));
        self.apply_history_action(action)
    }

    /// Move several nodes at once and reconnect their edges
    ///
    /// Recorded as one visual history entry.
    pub fn apply_transforms(
        &mut self,
        transforms: &[NodeTransform],
        now_ms: u64,
    ) -> EditorResult<()> {
        let scene = self
            .scene
            .as_mut()
            .ok_or_else(|| EditorError::render_error("no graphic to transform"))?;
        if let Some(unknown) = transforms
            .iter()
            .find(|t| scene.node_index(&t.node_id).is_none())
        {
            return Err(EditorError::unknown_node(&unknown.node_id));
        }

        let before = VisualSnapshot::new(scene.to_markup(), now_ms);
        self.flowchart_drag.reconnector().reconnect_all(scene, transforms)?;
        self.entity_drag.reconnector().reconnect_all(scene, transforms)?;
        self.history.record_visual(before);
        debug!(count = transforms.len(), "Applied node transforms");
        Ok(())
    }

    /// Current translation of every node
    pub fn transforms(&self) -> Vec<NodeTransform> {
        self.scene.as_ref().map(Scene::transforms).unwrap_or_default()
    }

    /// Render the current source through `service`
    ///
    /// The editor is only borrowed around the service call, never across
    /// it, so other events may be handled while the render is pending.
    pub async fn render_with<S>(cell: &RefCell<Self>, service: &S) -> EditorEvent
    where
        S: RenderService + ?Sized,
    {
        let request = cell.borrow_mut().begin_render();
        Self::drive(cell, service, request).await
    }

    /// Run an already issued request to completion
    pub async fn drive<S>(cell: &RefCell<Self>, service: &S, request: RenderRequest) -> EditorEvent
    where
        S: RenderService + ?Sized,
    {
        let ticket = match request {
            RenderRequest::Clear => return EditorEvent::GraphicCleared,
            RenderRequest::Render(ticket) => ticket,
        };
        service.initialize(ticket.theme);
        let result = service.render(&ticket.render_id, &ticket.text).await;
        cell.borrow_mut().complete_render(ticket.id, result)
    }

    /// Syntax-check the current source
    pub async fn lint_with<S>(cell: &RefCell<Self>, service: &S) -> Option<String>
    where
        S: RenderService + ?Sized,
    {
        let source = cell.borrow().source.clone();
        lint(service, &source).await
    }

    fn install(&mut self, document: SvgDocument) {
        let install_span = span!(Level::DEBUG, "install_scene");
        let _enter = install_span.enter();

        self.flowchart_drag.reset();
        self.entity_drag.reset();
        let mut scene = Scene::build(document, &self.geometry);
        let edges = infer_edges(&scene, &self.config.inference);
        scene.set_edges(edges);
        self.scene = Some(scene);
    }

    fn clear_scene(&mut self) {
        self.flowchart_drag.reset();
        self.entity_drag.reset();
        self.scene = None;
    }

    fn apply_label_outcome(&mut self, outcome: Option<LabelOutcome>) -> EditorEvent {
        match outcome {
            Some(LabelOutcome::Committed { source, .. }) => {
                let request = self.set_source(source.clone());
                EditorEvent::SourceChanged { source, request }
            }
            Some(LabelOutcome::Cancelled) => EditorEvent::LabelCancelled,
            Some(LabelOutcome::Unchanged) => EditorEvent::LabelUnchanged,
            None => EditorEvent::Nothing,
        }
    }

    fn apply_history_action(&mut self, action: HistoryAction) -> EditorEvent {
        match action {
            HistoryAction::RestoreSnapshot(snapshot) => {
                if self.restore(&snapshot.svg_markup) {
                    EditorEvent::SnapshotRestored
                } else {
                    EditorEvent::Nothing
                }
            }
            HistoryAction::ApplyText(source) => {
                self.source = source.clone();
                let request = self.begin_render();
                EditorEvent::SourceChanged { source, request }
            }
            HistoryAction::None => EditorEvent::Nothing,
        }
    }
}

fn capture(scene: &Option<Scene>, now_ms: u64) -> Option<VisualSnapshot> {
    scene
        .as_ref()
        .map(|scene| VisualSnapshot::new(scene.to_markup(), now_ms))
}
