//! Property tests for history, intersection, inference and rename

use proptest::prelude::*;
use shipwright::prelude::*;
use shipwright::{
    infer_edges, load_scene, move_node, rename_whole_word, BoundarySolver, HistoryStack,
    InferenceConfig,
};

fn flowchart(nodes_first: bool, reversed: bool) -> String {
    let mut nodes = vec![
        r#"<g class="node" id="left" transform="translate(0, 0)"><rect x="-50" y="-25" width="100" height="50"/></g>"#,
        r#"<g class="node" id="right" transform="translate(300, 0)"><rect x="-50" y="-25" width="100" height="50"/></g>"#,
        r#"<g class="node" id="below" transform="translate(300, 200)"><circle r="30"/></g>"#,
    ];
    if reversed {
        nodes.reverse();
    }
    let nodes = format!(r#"<g class="nodes">{}</g>"#, nodes.concat());
    let paths = r#"<g class="edgePaths"><path id="lr" d="M40,5 L260,-5"/><path id="rb" d="M300,20 L300,180"/></g>"#;
    if nodes_first {
        format!("<svg>{}{}</svg>", nodes, paths)
    } else {
        format!("<svg>{}{}</svg>", paths, nodes)
    }
}

fn edge_ids(markup: &str) -> Vec<(String, String, String)> {
    let scene = load_scene(markup, &EditorConfig::default()).unwrap();
    let mut ids: Vec<_> = infer_edges(&scene, &InferenceConfig::default())
        .iter()
        .map(|edge| {
            (
                scene.document().attr(edge.connector, "id").unwrap().to_string(),
                scene.nodes()[edge.source].id.clone(),
                scene.nodes()[edge.target].id.clone(),
            )
        })
        .collect();
    ids.sort();
    ids
}

#[test]
fn test_same_value_is_a_no_op() {
    let mut stack = HistoryStack::new("graph TD".to_string(), 50);
    assert!(!stack.set_value("graph TD".to_string()));
    assert!(!stack.can_undo());

    stack.set_value("graph LR".to_string());
    let past = stack.past_len();
    assert!(!stack.set_value("graph LR".to_string()));
    assert_eq!(stack.past_len(), past);
    assert_eq!(stack.future_len(), 0);
}

#[test]
fn test_shape_correct_intersection() {
    let solver = BoundarySolver::default();
    let bbox = BoundingBox::centered(Point::new(0.0, 0.0), 100.0, 50.0);
    let target = Point::new(500.0, 0.0);
    assert_eq!(
        solver.intersect(&bbox, ShapeClass::Rectangle, target),
        Point::new(50.0, 0.0)
    );
    assert_eq!(
        solver.intersect(&bbox, ShapeClass::Diamond, target),
        Point::new(50.0, 0.0)
    );
    assert_eq!(
        solver.intersect(&bbox, ShapeClass::Circle, target),
        Point::new(25.0, 0.0)
    );
}

#[test]
fn test_inference_ignores_input_order() {
    let expected = vec![
        ("lr".to_string(), "left".to_string(), "right".to_string()),
        ("rb".to_string(), "right".to_string(), "below".to_string()),
    ];
    for nodes_first in [true, false] {
        for reversed in [true, false] {
            assert_eq!(edge_ids(&flowchart(nodes_first, reversed)), expected);
        }
    }
}

#[test]
fn test_moving_a_node_leaves_other_edges_alone() {
    let markup = flowchart(true, false);
    let moved = move_node(&markup, "left", -80.0, 120.0, &EditorConfig::default()).unwrap();
    assert!(moved.contains(r#"d="M300,20 L300,180""#));
    assert!(!moved.contains(r#"d="M40,5 L260,-5""#));
}

#[test]
fn test_rename_skips_embedded_tokens() {
    let source = "graph TD\n  api --> admin_api_ui\n  api --> db";
    assert_eq!(
        rename_whole_word(source, "api", "gateway"),
        "graph TD\n  gateway --> admin_api_ui\n  gateway --> db"
    );
}

fn shape() -> impl Strategy<Value = ShapeClass> {
    prop_oneof![
        Just(ShapeClass::Rectangle),
        Just(ShapeClass::Diamond),
        Just(ShapeClass::Circle),
    ]
}

proptest! {
    #[test]
    fn undo_then_redo_returns_to_each_end(values in proptest::collection::vec("[a-z]{1,6}", 1..20)) {
        let mut stack = HistoryStack::new(String::new(), 50);
        let mut applied = 0;
        for value in &values {
            if stack.set_value(value.clone()) {
                applied += 1;
            }
        }
        let last = stack.present().clone();

        for _ in 0..applied {
            prop_assert!(stack.undo().is_some());
        }
        prop_assert_eq!(stack.present(), "");
        for _ in 0..applied {
            prop_assert!(stack.redo().is_some());
        }
        prop_assert_eq!(stack.present(), &last);
    }

    #[test]
    fn intersection_lies_on_the_box(
        shape in shape(),
        width in 10.0f64..200.0,
        height in 10.0f64..200.0,
        angle in 0.0f64..std::f64::consts::TAU,
        distance in 300.0f64..2000.0,
    ) {
        let bbox = BoundingBox::centered(Point::new(0.0, 0.0), width, height);
        let target = Point::new(angle.cos() * distance, angle.sin() * distance);
        let hit = BoundarySolver::default().intersect(&bbox, shape, target);
        prop_assert!(bbox.expanded(1e-6).contains(hit));
        // same direction as the target
        prop_assert!(hit.x * target.x + hit.y * target.y > 0.0);
    }

    #[test]
    fn intersection_moves_continuously(
        shape in shape(),
        width in 10.0f64..200.0,
        height in 10.0f64..200.0,
        angle in 0.0f64..std::f64::consts::TAU,
        distance in 300.0f64..2000.0,
        nudge_x in -0.01f64..0.01,
        nudge_y in -0.01f64..0.01,
    ) {
        let solver = BoundarySolver::default();
        let bbox = BoundingBox::centered(Point::new(0.0, 0.0), width, height);
        let target = Point::new(angle.cos() * distance, angle.sin() * distance);
        let a = solver.intersect(&bbox, shape, target);
        let b = solver.intersect(&bbox, shape, target.offset(nudge_x, nudge_y));
        prop_assert!(a.distance(b) < 0.5, "{:?} jumped to {:?}", a, b);
    }
}
