//! Marker shapes for attempt points.

use std::f32::consts::{FRAC_PI_2, PI};

use progchart_types::{MarkerShape, MilestoneStyle};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

use crate::colors;

/// Pixels per marker size unit
const MARKER_SCALE: f32 = 1.4;
const EDGE_WIDTH: f32 = 1.0;

/// Outline of a marker centered on (cx, cy) with the given radius
pub fn marker_path(shape: MarkerShape, cx: f32, cy: f32, radius: f32) -> Option<Path> {
    match shape {
        MarkerShape::Circle => PathBuilder::from_circle(cx, cy, radius),
        MarkerShape::Square => {
            let r = radius * 0.85;
            polygon((0..4).map(|i| {
                let angle = PI / 4.0 + i as f32 * FRAC_PI_2;
                (cx + r * 1.414 * angle.cos(), cy + r * 1.414 * angle.sin())
            }))
        }
        MarkerShape::Diamond => polygon([
            (cx, cy - radius),
            (cx + radius, cy),
            (cx, cy + radius),
            (cx - radius, cy),
        ]),
        MarkerShape::Triangle => polygon(regular_points(cx, cy, radius, 3)),
        MarkerShape::Octagon => polygon(regular_points(cx, cy, radius, 8).map(|(x, y)| {
            // Flat top and bottom edges
            rotate((x, y), (cx, cy), PI / 8.0)
        })),
        MarkerShape::Star => polygon((0..10).map(|i| {
            let r = if i % 2 == 0 { radius } else { radius * 0.4 };
            let angle = -FRAC_PI_2 + i as f32 * PI / 5.0;
            (cx + r * angle.cos(), cy + r * angle.sin())
        })),
    }
}

/// Draw one marker in the given style
pub fn draw_marker(pixmap: &mut Pixmap, style: &MilestoneStyle, cx: f32, cy: f32) {
    let radius = (style.marker_size * MARKER_SCALE / 2.0).max(1.0);
    let Some(path) = marker_path(style.marker, cx, cy, radius) else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(colors::to_skia(style.color, style.alpha));
    paint.anti_alias = true;
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

    if let Some(edge) = style.edge_color {
        paint.set_color(colors::to_skia(edge, style.alpha));
        let stroke = Stroke {
            width: EDGE_WIDTH,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

/// Vertices of a regular polygon with one vertex pointing up
fn regular_points(cx: f32, cy: f32, radius: f32, sides: usize) -> impl Iterator<Item = (f32, f32)> {
    (0..sides).map(move |i| {
        let angle = -FRAC_PI_2 + i as f32 * 2.0 * PI / sides as f32;
        (cx + radius * angle.cos(), cy + radius * angle.sin())
    })
}

fn rotate((x, y): (f32, f32), (cx, cy): (f32, f32), angle: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    let (dx, dy) = (x - cx, y - cy);
    (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
}

fn polygon(points: impl IntoIterator<Item = (f32, f32)>) -> Option<Path> {
    let mut pb = PathBuilder::new();
    let mut points = points.into_iter();
    let (x, y) = points.next()?;
    pb.move_to(x, y);
    for (x, y) in points {
        pb.line_to(x, y);
    }
    pb.close();
    pb.finish()
}
