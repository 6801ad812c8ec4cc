use progchart_types::Color as Rgba;
use tiny_skia::Color;

/// Convert a config color, scaling its alpha by `opacity` (0.0 - 1.0).
#[inline]
pub fn to_skia(color: Rgba, opacity: f32) -> Color {
    let [r, g, b, a] = color;
    let alpha = (a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    Color::from_rgba8(r, g, b, alpha)
}

#[inline]
pub fn background() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

#[inline]
pub fn text() -> Color {
    Color::from_rgba8(0, 0, 0, 255)
}

/// Axis lines and tick marks
#[inline]
pub fn axis() -> Color {
    Color::from_rgba8(0, 0, 0, 255)
}

#[inline]
pub fn grid() -> Color {
    Color::from_rgba8(0, 0, 0, 24)
}

/// Per-report shading, alternating between a dark and a light tint at 5%
#[inline]
pub fn session_shade(odd: bool) -> Color {
    if odd {
        Color::from_rgba8(255, 255, 255, 13)
    } else {
        Color::from_rgba8(0, 0, 0, 13)
    }
}

#[inline]
pub fn legend_bg() -> Color {
    Color::from_rgba8(255, 255, 255, 204)
}

#[inline]
pub fn legend_border() -> Color {
    Color::from_rgba8(204, 204, 204, 255)
}
