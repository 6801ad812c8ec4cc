//! Chart geometry: plot area, side panel and axis scales.

use tiny_skia::Rect;

use crate::RenderError;

pub const MIN_WIDTH: u32 = 320;
pub const MIN_HEIGHT: u32 = 200;

const MARGIN_LEFT: f32 = 70.0;
const MARGIN_TOP: f32 = 40.0;
const MARGIN_BOTTOM: f32 = 50.0;
const PANEL_GAP: f32 = 12.0;

/// Pixel regions of the chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f32,
    pub height: f32,
    pub plot: Rect,
    /// Info panel to the right of the plot
    pub panel: Rect,
}

impl ChartLayout {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let invalid = || RenderError::CanvasSize { width, height };
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return Err(invalid());
        }

        let (w, h) = (width as f32, height as f32);
        let panel_width = (w * 0.2).clamp(150.0, 260.0);
        let plot_right = w - panel_width - PANEL_GAP;

        let plot = Rect::from_ltrb(MARGIN_LEFT, MARGIN_TOP, plot_right, h - MARGIN_BOTTOM)
            .ok_or_else(invalid)?;
        let panel = Rect::from_ltrb(plot_right + PANEL_GAP, MARGIN_TOP, w, h - MARGIN_BOTTOM)
            .ok_or_else(invalid)?;

        Ok(Self {
            width: w,
            height: h,
            plot,
            panel,
        })
    }
}

/// Linear mapping from data values to pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
    pixel_start: f32,
    pixel_end: f32,
}

impl AxisScale {
    /// `pixel_end` may be smaller than `pixel_start` (y axis grows upwards)
    pub fn new(min: f64, max: f64, pixel_start: f32, pixel_end: f32) -> Self {
        let max = if max > min { max } else { min + 1.0 };
        Self {
            min,
            max,
            pixel_start,
            pixel_end,
        }
    }

    pub fn map(&self, value: f64) -> f32 {
        let t = ((value - self.min) / (self.max - self.min)) as f32;
        self.pixel_start + t * (self.pixel_end - self.pixel_start)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Round step (1, 2 or 5 times a power of ten) giving at most `max_ticks` ticks over `span`.
pub fn nice_step(span: f64, max_ticks: usize) -> f64 {
    if span <= 0.0 || max_ticks == 0 {
        return 1.0;
    }
    let raw = span / max_ticks as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10.0 * magnitude)
}

/// Multiples of `step` within [min, max].
pub fn ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 {
        return Vec::new();
    }
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}
