//! Integration tests for the editor facade
//!
//! Rendering is simulated: tests hand the editor canned markup, either
//! directly through `complete_render` or through a `RenderService`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::{FutureExt, LocalBoxFuture};
use shipwright::prelude::*;
use shipwright::{LabelOverlay, SavedDocument, Track};

const FLOWCHART: &str = r#"<svg id="graph-0" style="max-width: 400px;"><g class="root"><g class="edgePaths"><path id="L-a-b" class="flowchart-link" d="M40,0 L160,0"/><path id="L-b-c" class="flowchart-link" d="M200,20 L200,170"/></g><g class="edgeLabels"><g class="edgeLabel" transform="translate(100, 0)"><g class="label" transform="translate(-12, -9)"><foreignObject width="24" height="18"><div><span class="edgeLabel">yes</span></div></foreignObject></g></g></g><g class="nodes"><g class="node default" id="flowchart-a-0" transform="translate(0, 0)"><rect class="basic label-container" x="-40" y="-20" width="80" height="40"/><g class="label"><text>api</text></g></g><g class="node default" id="flowchart-b-1" transform="translate(200, 0)"><rect x="-40" y="-20" width="80" height="40"/><g class="label"><text>db</text></g></g><g class="node default" id="flowchart-c-2" transform="translate(200, 200)"><polygon class="label-container" points="0,-30 30,0 0,30 -30,0"/><g class="label"><text>ok?</text></g></g></g></g></svg>"#;

const SOURCE: &str = "graph TD\n  api -->|yes| db\n  db --> ok?\n  admin_api_ui";

fn rendered_editor() -> Editor {
    let mut editor = Editor::default();
    let request = editor.set_source(SOURCE);
    complete(&mut editor, request, FLOWCHART);
    editor
}

fn complete(editor: &mut Editor, request: RenderRequest, markup: &str) -> EditorEvent {
    match request {
        RenderRequest::Render(ticket) => editor.complete_render(
            ticket.id,
            Ok(RenderOutput {
                markup: markup.to_string(),
            }),
        ),
        RenderRequest::Clear => panic!("expected a render ticket"),
    }
}

fn path_d(editor: &Editor, id: &str) -> String {
    let scene = editor.scene().unwrap();
    let element = scene.document().find_by_attr("id", id).unwrap();
    scene.document().attr(element, "d").unwrap().to_string()
}

#[test]
fn test_render_builds_scene() {
    let editor = rendered_editor();
    let scene = editor.scene().unwrap();
    assert_eq!(scene.nodes().len(), 3);
    assert_eq!(scene.edges().len(), 2);
    assert_eq!(scene.nodes()[2].shape, ShapeClass::Diamond);
    assert!(editor
        .markup()
        .unwrap()
        .contains(r#"style="max-width: 400px; overflow: visible;""#));
}

#[test]
fn test_failed_render_keeps_graphic() {
    let mut editor = rendered_editor();
    let before = editor.markup();
    let request = editor.set_source("graph TD\n  api -->");
    let RenderRequest::Render(ticket) = request else {
        panic!("expected a render ticket");
    };
    let event = editor.complete_render(
        ticket.id,
        Err(ServiceError::new("Parse error on line 2:\n...api -->\n---^")),
    );
    assert_eq!(
        event,
        EditorEvent::RenderFailed {
            message: "Parse error on line 2:".into()
        }
    );
    assert_eq!(editor.markup(), before);
    assert_eq!(editor.last_error(), Some("Parse error on line 2:"));
    // the bad text is still in the text history
    assert_eq!(editor.history().text().present(), "graph TD\n  api -->");
}

#[test]
fn test_empty_source_clears() {
    let mut editor = rendered_editor();
    assert_eq!(editor.set_source("  "), RenderRequest::Clear);
    assert!(editor.scene().is_none());
}

#[test]
fn test_drag_keeps_connectors_attached() {
    let mut editor = rendered_editor();
    let event = editor
        .pointer_down("flowchart-a-0", Point::new(0.0, 0.0), 10)
        .unwrap();
    assert_eq!(
        event,
        EditorEvent::DragStarted {
            node_id: "flowchart-a-0".into()
        }
    );
    assert!(editor.is_dragging());

    assert_eq!(
        editor.pointer_move(Point::new(0.0, 100.0)),
        Some(Point::new(0.0, 100.0))
    );
    assert_eq!(path_d(&editor, "L-a-b"), "M40,80 L160,20");
    assert_eq!(path_d(&editor, "L-b-c"), "M200,20 L200,170");
    assert_eq!(
        editor.scene().unwrap().labels()[0].center(),
        Point::new(100.0, 50.0)
    );

    assert_eq!(
        editor.pointer_up(),
        EditorEvent::DragEnded {
            transform: NodeTransform::new("flowchart-a-0", 0.0, 100.0)
        }
    );
    assert!(!editor.is_dragging());
}

#[test]
fn test_pan_and_zoom_refused_while_dragging() {
    let mut editor = rendered_editor();
    editor
        .pointer_down("flowchart-b-1", Point::new(0.0, 0.0), 0)
        .unwrap();
    assert!(!editor.pan_by(10.0, 10.0));
    assert!(!editor.zoom_by(2.0, Point::default()));
    editor.pointer_up();
    assert!(editor.pan_by(10.0, 10.0));
    assert!(editor.zoom_by(2.0, Point::default()));
}

#[test]
fn test_drag_respects_zoom() {
    let mut editor = rendered_editor();
    editor.zoom_by(2.0, Point::default());
    editor
        .pointer_down("flowchart-c-2", Point::new(0.0, 0.0), 0)
        .unwrap();
    editor.pointer_move(Point::new(40.0, 0.0));
    assert_eq!(
        editor.pointer_up(),
        EditorEvent::DragEnded {
            transform: NodeTransform::new("flowchart-c-2", 220.0, 200.0)
        }
    );
}

#[test]
fn test_unknown_node_is_an_error() {
    let mut editor = rendered_editor();
    assert!(editor
        .pointer_down("nope", Point::default(), 0)
        .is_err());
    assert!(editor.begin_label_edit("nope", 0).is_err());
}

#[test]
fn test_undo_restores_pre_drag_then_text() {
    let mut editor = Editor::default();
    let request = editor.open_document(SavedDocument {
        id: "doc-1".into(),
        name: "Services".into(),
        code: "graph TD\n  api --> db".into(),
        created_at: 0,
        updated_at: 0,
    });
    complete(&mut editor, request, FLOWCHART);
    let request = editor.set_source(SOURCE);
    complete(&mut editor, request, FLOWCHART);

    let before_drag = editor.markup().unwrap();
    editor
        .pointer_down("flowchart-a-0", Point::new(0.0, 0.0), 1)
        .unwrap();
    editor.pointer_move(Point::new(30.0, 60.0));
    editor.pointer_up();
    let after_drag = editor.markup().unwrap();
    assert_ne!(before_drag, after_drag);

    assert_eq!(editor.undo(2), EditorEvent::SnapshotRestored);
    assert_eq!(editor.markup().unwrap(), before_drag);
    assert_eq!(editor.history().active_track(), Track::Text);

    match editor.undo(3) {
        EditorEvent::SourceChanged { source, request } => {
            assert_eq!(source, "graph TD\n  api --> db");
            assert!(matches!(request, RenderRequest::Render(_)));
        }
        other => panic!("expected a text undo, got {:?}", other),
    }
    assert_eq!(editor.source(), "graph TD\n  api --> db");

    // redo prefers the visual track
    assert_eq!(editor.redo(4), EditorEvent::SnapshotRestored);
    assert_eq!(editor.markup().unwrap(), after_drag);
}

#[test]
fn test_visual_undo_without_graphic_keeps_history() {
    let mut editor = Editor::default();
    let request = editor.open_document(SavedDocument {
        id: "doc-2".into(),
        name: "Flow".into(),
        code: SOURCE.into(),
        created_at: 0,
        updated_at: 0,
    });
    complete(&mut editor, request, FLOWCHART);
    let before_drag = editor.markup().unwrap();
    editor
        .pointer_down("flowchart-b-1", Point::new(0.0, 0.0), 1)
        .unwrap();
    editor.pointer_move(Point::new(0.0, 50.0));
    editor.pointer_up();

    assert_eq!(editor.set_source(""), RenderRequest::Clear);
    let EditorEvent::SourceChanged { request, .. } = editor.undo(2) else {
        panic!("expected a text undo");
    };
    assert!(editor.scene().is_none());

    // only the drag is left to undo, and there is no graphic to save for redo
    assert_eq!(editor.undo(3), EditorEvent::Nothing);
    assert_eq!(editor.history().visual().past_len(), 1);
    assert_eq!(editor.history().visual().future_len(), 0);

    complete(&mut editor, request, FLOWCHART);
    assert_eq!(editor.undo(4), EditorEvent::SnapshotRestored);
    assert_eq!(editor.markup().unwrap(), before_drag);
    assert_eq!(editor.history().visual().future_len(), 1);
}

#[test]
fn test_restored_snapshot_is_draggable() {
    let mut editor = rendered_editor();
    editor
        .pointer_down("flowchart-a-0", Point::new(0.0, 0.0), 1)
        .unwrap();
    editor.pointer_move(Point::new(0.0, 100.0));
    editor.pointer_up();
    editor.undo(2);

    // handlers are re-attached: connectors follow the next drag again
    editor
        .pointer_down("flowchart-a-0", Point::new(0.0, 0.0), 3)
        .unwrap();
    editor.pointer_move(Point::new(0.0, 100.0));
    editor.pointer_up();
    assert_eq!(path_d(&editor, "L-a-b"), "M40,80 L160,20");
}

#[test]
fn test_label_rename_rewrites_source() {
    let mut editor = rendered_editor();
    let overlay: LabelOverlay = editor
        .begin_label_edit("flowchart-a-0", 1_000)
        .unwrap()
        .unwrap();
    assert_eq!(overlay.text, "api");
    assert_eq!(overlay.position, Point::new(-40.0, -20.0));
    assert!(editor.begin_label_edit("flowchart-b-1", 1_000).unwrap().is_none());

    editor.label_input("gateway");
    // blur right after opening is the double-click itself
    assert_eq!(editor.label_blur(1_010), EditorEvent::Nothing);

    match editor.label_key(LabelKey::Enter) {
        EditorEvent::SourceChanged { source, .. } => {
            assert_eq!(
                source,
                "graph TD\n  gateway -->|yes| db\n  db --> ok?\n  admin_api_ui"
            );
        }
        other => panic!("expected a rename, got {:?}", other),
    }
    assert!(editor.history().can_undo());
    assert!(editor.label_overlay().is_none());
}

#[test]
fn test_label_escape_does_nothing() {
    let mut editor = rendered_editor();
    editor.begin_label_edit("flowchart-b-1", 0).unwrap();
    editor.label_input("other");
    assert_eq!(editor.label_key(LabelKey::Escape), EditorEvent::LabelCancelled);
    assert_eq!(editor.source(), SOURCE);
}

#[test]
fn test_apply_transforms_is_one_undo_step() {
    let mut editor = rendered_editor();
    let before = editor.markup().unwrap();
    editor
        .apply_transforms(
            &[
                NodeTransform::new("flowchart-a-0", 0.0, 100.0),
                NodeTransform::new("flowchart-c-2", 400.0, 200.0),
            ],
            5,
        )
        .unwrap();
    assert_eq!(path_d(&editor, "L-a-b"), "M40,80 L160,20");
    assert_eq!(editor.transforms()[2], NodeTransform::new("flowchart-c-2", 400.0, 200.0));

    assert_eq!(editor.undo(6), EditorEvent::SnapshotRestored);
    assert_eq!(editor.markup().unwrap(), before);
}

#[test]
fn test_open_document_resets_history() {
    let mut editor = rendered_editor();
    editor.set_source("graph LR\n  x --> y");
    editor.open_document(SavedDocument {
        id: "doc-2".into(),
        name: "Other".into(),
        code: "graph LR\n  p --> q".into(),
        created_at: 1,
        updated_at: 2,
    });
    assert!(!editor.history().can_undo());
    assert!(!editor.history().can_redo());
    assert_eq!(editor.document().map(|d| d.name.as_str()), Some("Other"));
}

/// Service whose renders resolve only when the test says so
#[derive(Default)]
struct ManualService {
    pending: RefCell<HashMap<String, oneshot::Sender<Result<RenderOutput, ServiceError>>>>,
    texts: RefCell<HashMap<String, String>>,
    themes: RefCell<Vec<Theme>>,
}

impl ManualService {
    fn resolve(&self, id: &str, markup: &str) {
        let sender = self.pending.borrow_mut().remove(id).unwrap();
        let _ = sender.send(Ok(RenderOutput {
            markup: markup.to_string(),
        }));
    }
}

impl RenderService for ManualService {
    fn initialize(&self, theme: Theme) {
        self.themes.borrow_mut().push(theme);
    }

    fn render<'a>(
        &'a self,
        id: &'a str,
        text: &'a str,
    ) -> LocalBoxFuture<'a, Result<RenderOutput, ServiceError>> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().insert(id.to_string(), tx);
        self.texts
            .borrow_mut()
            .insert(id.to_string(), text.to_string());
        async move {
            rx.await
                .unwrap_or_else(|_| Err(ServiceError::new("render dropped")))
        }
        .boxed_local()
    }

    fn parse<'a>(&'a self, text: &'a str) -> LocalBoxFuture<'a, Result<(), ServiceError>> {
        let result = if text.contains("-->") && text.trim_end().ends_with("-->") {
            Err(ServiceError::new("Parse error on line 2:\nexpecting target"))
        } else {
            Ok(())
        };
        futures::future::ready(result).boxed_local()
    }
}

fn poll_once<F: Future + ?Sized>(future: std::pin::Pin<&mut F>) -> Poll<F::Output> {
    let waker = futures::task::noop_waker();
    let mut cx = Context::from_waker(&waker);
    future.poll(&mut cx)
}

#[test]
fn test_out_of_order_completion_last_request_wins() {
    let cell = RefCell::new(Editor::default());
    let service = ManualService::default();

    let first = cell.borrow_mut().set_source("graph TD\n  a --> b");
    let second = cell.borrow_mut().set_source(SOURCE);
    let mut first = Editor::drive(&cell, &service, first).boxed_local();
    let mut second = Editor::drive(&cell, &service, second).boxed_local();
    assert!(poll_once(first.as_mut()).is_pending());
    assert!(poll_once(second.as_mut()).is_pending());

    service.resolve("shipwright-1", FLOWCHART);
    assert_eq!(
        block_on(second),
        EditorEvent::RenderApplied { nodes: 3, edges: 2 }
    );

    // the older render arrives late and is dropped
    service.resolve("shipwright-0", r#"<svg id="stale"/>"#);
    assert_eq!(block_on(first), EditorEvent::RenderSuperseded);

    let editor = cell.borrow();
    assert!(editor.markup().unwrap().contains(r#"id="graph-0""#));
    assert_eq!(service.themes.borrow().len(), 2);
}

#[test]
fn test_render_with_passes_theme_and_cache_bust() {
    let mut editor = Editor::default();
    editor.set_theme(Theme::Dark);
    let cell = RefCell::new(editor);
    let service = ManualService::default();

    cell.borrow_mut()
        .set_source("```mermaid\nerDiagram\n  CUSTOMER ||--o{ ORDER : places\n```");
    let mut pending = Editor::render_with(&cell, &service).boxed_local();
    assert!(poll_once(pending.as_mut()).is_pending());

    // set_source issued shipwright-0; render_with issued shipwright-1
    assert_eq!(
        service.texts.borrow().get("shipwright-1").map(String::as_str),
        Some("erDiagram\n  CUSTOMER ||--o{ ORDER : places\n%% render:shipwright-1")
    );
    service.resolve("shipwright-1", r#"<svg><g id="entity-CUSTOMER-1"/></svg>"#);
    assert_eq!(
        block_on(pending),
        EditorEvent::RenderApplied { nodes: 1, edges: 0 }
    );
    assert_eq!(*service.themes.borrow(), vec![Theme::Dark]);
}

#[test]
fn test_lint_reports_first_line() {
    let cell = RefCell::new(Editor::default());
    let service = ManualService::default();
    cell.borrow_mut().set_source("graph TD\n  a -->");
    assert_eq!(
        block_on(Editor::lint_with(&cell, &service)),
        Some("Parse error on line 2:".to_string())
    );
    cell.borrow_mut().set_source("graph TD\n  a --> b");
    assert_eq!(block_on(Editor::lint_with(&cell, &service)), None);
}
