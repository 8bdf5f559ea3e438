//! Routed relationship lines between entity boxes

use tracing::trace;

use crate::core::path_data::{format_points, PathBuilder};
use crate::core::{BoundingBox, EditorConfig, NodeKind, Point, Reconnector, RouteStyle, Scene};

/// A computed relationship route
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub start: Point,
    pub end: Point,
    /// Path data for the connector
    pub d: String,
    /// Point the final segment arrives from; sets the arrowhead direction
    pub approach: Point,
}

/// Route from `source` to `target`, leaving and entering through facing edges
///
/// When the boxes are further apart horizontally than vertically the route
/// uses the vertical edges, otherwise the horizontal ones.
pub fn route(source: &BoundingBox, target: &BoundingBox, style: RouteStyle) -> Route {
    let s = source.center();
    let t = target.center();

    let (start, end, bend_a, bend_b) = if (t.x - s.x).abs() >= (t.y - s.y).abs() {
        let (start_x, end_x) = if t.x >= s.x {
            (source.max_x(), target.x)
        } else {
            (source.x, target.max_x())
        };
        let mx = (start_x + end_x) / 2.0;
        (
            Point::new(start_x, s.y),
            Point::new(end_x, t.y),
            Point::new(mx, s.y),
            Point::new(mx, t.y),
        )
    } else {
        let (start_y, end_y) = if t.y >= s.y {
            (source.max_y(), target.y)
        } else {
            (source.y, target.max_y())
        };
        let my = (start_y + end_y) / 2.0;
        (
            Point::new(s.x, start_y),
            Point::new(t.x, end_y),
            Point::new(s.x, my),
            Point::new(t.x, my),
        )
    };

    let builder = PathBuilder::new().move_to(start);
    let d = match style {
        RouteStyle::Elbow => builder.line_to(bend_a).line_to(bend_b).line_to(end),
        RouteStyle::Bezier => builder.cubic_to(bend_a, bend_b, end),
    }
    .build();

    // a straight route has its bends on the end point; aim from the start then
    let approach = if bend_b.distance(end) > f64::EPSILON {
        bend_b
    } else {
        start
    };

    Route {
        start,
        end,
        d,
        approach,
    }
}

/// Triangle with its tip on `tip`, pointing away from `from`
pub fn arrowhead(tip: Point, from: Point, length: f64, half_width: f64) -> Vec<Point> {
    let dx = tip.x - from.x;
    let dy = tip.y - from.y;
    let norm = dx.hypot(dy);
    let (ux, uy) = if norm > f64::EPSILON {
        (dx / norm, dy / norm)
    } else {
        (1.0, 0.0)
    };
    let base = tip.offset(-ux * length, -uy * length);
    vec![
        tip,
        base.offset(-uy * half_width, ux * half_width),
        base.offset(uy * half_width, -ux * half_width),
    ]
}

/// Redraws entity relationship lines and their arrowheads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityRouter {
    pub style: RouteStyle,
    pub arrow_length: f64,
    pub arrow_half_width: f64,
}

impl Default for EntityRouter {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl EntityRouter {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            style: config.entity.route_style,
            arrow_length: config.entity.arrow_length,
            arrow_half_width: config.entity.arrow_half_width,
        }
    }
}

impl Reconnector for EntityRouter {
    fn reconnect(&self, scene: &mut Scene, moved: &[usize]) {
        let affected: Vec<_> = scene
            .edges()
            .iter()
            .filter(|edge| edge.kind == NodeKind::Entity)
            .filter(|edge| moved.iter().any(|&node| edge.touches(node)))
            .copied()
            .collect();

        for edge in affected {
            let (Some(source), Some(target)) = (scene.node(edge.source), scene.node(edge.target))
            else {
                continue;
            };
            let route = route(&source.current_box(), &target.current_box(), self.style);
            trace!(d = %route.d, "Rerouted relationship");

            scene.set_path(edge.connector, route.d.clone());
            if let Some(polygon) = edge.arrowhead {
                let points = arrowhead(
                    route.end,
                    route.approach,
                    self.arrow_length,
                    self.arrow_half_width,
                );
                scene.set_polygon(polygon, format_points(&points));
            }
            if let Some(label) = edge.label {
                scene.center_label_on(label, route.start.midpoint(route.end));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{infer_edges, InferenceConfig, MarkupGeometry, SvgDocument};

    fn boxes() -> (BoundingBox, BoundingBox) {
        (
            BoundingBox::new(0.0, 0.0, 100.0, 60.0),
            BoundingBox::new(300.0, 0.0, 100.0, 60.0),
        )
    }

    #[test]
    fn test_horizontal_routes() {
        let (s, t) = boxes();
        let elbow = route(&s, &t, RouteStyle::Elbow);
        assert_eq!(elbow.d, "M100,30 L200,30 L200,30 L300,30");
        let bezier = route(&s, &t, RouteStyle::Bezier);
        assert_eq!(bezier.d, "M100,30 C200,30 200,30 300,30");
        assert_eq!(bezier.approach, Point::new(200.0, 30.0));

        let back = route(&t, &s, RouteStyle::Elbow);
        assert_eq!(back.start, Point::new(300.0, 30.0));
        assert_eq!(back.end, Point::new(100.0, 30.0));
    }

    #[test]
    fn test_vertical_route() {
        let s = BoundingBox::new(0.0, 0.0, 100.0, 60.0);
        let t = BoundingBox::new(40.0, 200.0, 100.0, 60.0);
        let r = route(&s, &t, RouteStyle::Elbow);
        assert_eq!(r.d, "M50,60 L50,130 L90,130 L90,200");
        assert_eq!(r.approach, Point::new(90.0, 130.0));
    }

    #[test]
    fn test_arrowhead_points_along_final_segment() {
        let points = arrowhead(Point::new(300.0, 30.0), Point::new(200.0, 30.0), 10.0, 5.0);
        assert_eq!(format_points(&points), "300,30 290,35 290,25");

        let down = arrowhead(Point::new(90.0, 200.0), Point::new(90.0, 130.0), 10.0, 5.0);
        assert_eq!(format_points(&down), "90,200 85,190 95,190");
    }

    #[test]
    fn test_router_moves_line_arrow_and_label() {
        let markup = r#"<svg><g id="entity-A-1" transform="translate(0, 0)"><rect width="100" height="60"/></g><g id="entity-B-2" transform="translate(300, 0)"><rect width="100" height="60"/></g><path id="rel" class="er relationshipLine" d="M100,30 L300,30"/><polygon class="arrowhead" points="290,25 300,30 290,35"/><g class="edgeLabel" transform="translate(200, 30)"><rect x="-15" y="-5" width="30" height="10"/></g></svg>"#;
        let mut scene = Scene::build(SvgDocument::parse(markup).unwrap(), &MarkupGeometry::new());
        let edges = infer_edges(&scene, &InferenceConfig::default());
        assert_eq!(edges.len(), 1);
        assert!(edges[0].arrowhead.is_some());
        scene.set_edges(edges);

        scene.set_translation(1, Point::new(300.0, 400.0));
        let router = EntityRouter {
            style: RouteStyle::Elbow,
            ..EntityRouter::default()
        };
        router.reconnect(&mut scene, &[1]);

        let markup = scene.to_markup();
        assert!(markup.contains(r#"d="M50,60 L50,230 L350,230 L350,400""#));
        assert!(markup.contains(r#"points="350,400 345,390 355,390""#));
        assert_eq!(scene.labels()[0].center(), Point::new(200.0, 230.0));
    }
}
