//! Connection inference
//!
//! Rendered connectors carry no source/target ids, so each one is matched
//! to nodes by where its drawn endpoints fall. This runs once per render
//! pass; drags reuse the result instead of re-matching every frame.

use std::collections::HashSet;

use tracing::{debug, span, trace, Level};

use super::path_data::PathData;
use super::scene::{EdgeMeta, NodeKind, Scene, SceneConnector};
use super::{InferenceConfig, Point};

/// Match every connector in the scene to a source and target node
///
/// Connectors are only matched against nodes of their own kind. A connector
/// is kept when both endpoints match distinct nodes; self-loops and misses
/// are left out and stay static while nodes move.
///
/// Labels and arrowheads are assigned afterwards, nearest pair first, so a
/// decoration always goes to the connector it sits closest to regardless of
/// document order.
pub fn infer_edges(scene: &Scene, config: &InferenceConfig) -> Vec<EdgeMeta> {
    let infer_span = span!(
        Level::DEBUG,
        "infer_edges",
        connectors = scene.connectors().len(),
        nodes = scene.nodes().len()
    );
    let _enter = infer_span.enter();

    let mut matched = Vec::new();
    let mut skipped = 0usize;

    for connector in scene.connectors() {
        match infer_one(scene, connector, config) {
            Some(edge) => matched.push(edge),
            None => skipped += 1,
        }
    }

    let mut edges: Vec<EdgeMeta> = matched.iter().map(|m| m.edge).collect();
    assign_labels(scene, &matched, config, &mut edges);
    assign_arrowheads(scene, &matched, config, &mut edges);

    debug!(edges = edges.len(), skipped, "Inferred connections");
    edges
}

struct MatchedConnector {
    edge: EdgeMeta,
    start: Point,
    end: Point,
}

fn infer_one(
    scene: &Scene,
    connector: &SceneConnector,
    config: &InferenceConfig,
) -> Option<MatchedConnector> {
    let d = scene.document().attr(connector.element, "d")?;
    let Some((start, end)) = PathData::parse(d)
        .ok()
        .and_then(|path| path.literal_endpoints(config.min_path_numbers))
    else {
        trace!(d, "Skipping connector without usable endpoints");
        return None;
    };

    let source = match_endpoint(scene, connector.kind, start, config)?;
    let target = match_endpoint(scene, connector.kind, end, config)?;
    if source == target {
        trace!(node = %scene.nodes()[source].id, "Skipping self-loop");
        return None;
    }

    Some(MatchedConnector {
        edge: EdgeMeta {
            connector: connector.element,
            kind: connector.kind,
            source,
            target,
            label: None,
            arrowhead: None,
        },
        start,
        end,
    })
}

/// Pair `(edge, candidate, distance)` triples nearest first, each side used once
fn assign_nearest<T: Copy + Eq + std::hash::Hash>(
    mut pairs: Vec<(usize, T, f64)>,
) -> Vec<(usize, T)> {
    pairs.sort_by(|a, b| a.2.total_cmp(&b.2));
    let mut taken_edges = HashSet::new();
    let mut taken = HashSet::new();
    let mut assigned = Vec::new();
    for (edge, candidate, _) in pairs {
        if taken_edges.contains(&edge) || taken.contains(&candidate) {
            continue;
        }
        taken_edges.insert(edge);
        taken.insert(candidate);
        assigned.push((edge, candidate));
    }
    assigned
}

fn assign_labels(
    scene: &Scene,
    matched: &[MatchedConnector],
    config: &InferenceConfig,
    edges: &mut [EdgeMeta],
) {
    let mut pairs = Vec::new();
    for (edge, m) in matched.iter().enumerate() {
        let midpoint = m.start.midpoint(m.end);
        for (index, label) in scene.labels().iter().enumerate() {
            let distance = label.center().distance(midpoint);
            if distance <= config.label_max_distance {
                pairs.push((edge, index, distance));
            }
        }
    }
    for (edge, index) in assign_nearest(pairs) {
        edges[edge].label = Some(index);
    }
}

fn assign_arrowheads(
    scene: &Scene,
    matched: &[MatchedConnector],
    config: &InferenceConfig,
    edges: &mut [EdgeMeta],
) {
    let mut pairs = Vec::new();
    for (edge, m) in matched.iter().enumerate() {
        if m.edge.kind != NodeKind::Entity {
            continue;
        }
        for &element in scene.arrowheads() {
            let nearest = scene
                .polygon_points(element)
                .iter()
                .map(|p| p.distance(m.end))
                .min_by(|a, b| a.total_cmp(b));
            if let Some(distance) = nearest.filter(|d| *d <= config.endpoint_tolerance) {
                pairs.push((edge, element, distance));
            }
        }
    }
    for (edge, element) in assign_nearest(pairs) {
        edges[edge].arrowhead = Some(element);
    }
}

/// Best node for one connector endpoint
///
/// A node whose box, grown by the tolerance, contains the point wins (the
/// closest center if several do). Otherwise the nearest center within the
/// maximum match distance is used.
pub fn match_endpoint(
    scene: &Scene,
    kind: NodeKind,
    point: Point,
    config: &InferenceConfig,
) -> Option<usize> {
    let candidates = || {
        scene
            .nodes()
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.kind == kind)
            .map(move |(index, node)| (index, node, node.center().distance(point)))
    };

    let containing = candidates()
        .filter(|(_, node, _)| {
            node.current_box()
                .expanded(config.endpoint_tolerance)
                .contains(point)
        })
        .min_by(|a, b| a.2.total_cmp(&b.2));
    if let Some((index, _, _)) = containing {
        return Some(index);
    }

    candidates()
        .filter(|(_, _, distance)| *distance <= config.max_match_distance)
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(index, _, _)| index)
}
