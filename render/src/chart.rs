//! Progression chart
//!
//! One marker per attempt, pull number on the x axis and either the
//! resolved milestone depth or the pull duration on the y axis. Reports
//! are shaded alternately, a legend lists the milestones reached so far
//! and a side panel shows run totals.

use std::fs;
use std::path::{Path, PathBuf};

use progchart_core::{Attempt, MilestoneSet, ResolvedAttempt};
use progchart_types::{ChartMode, ChartSettings, MilestoneStyle, palette};
use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};

use crate::RenderError;
use crate::colors;
use crate::layout::{AxisScale, ChartLayout, nice_step, ticks};
use crate::markers::draw_marker;
use crate::stats::{ChartStats, format_mmss};
use crate::text::{ResolvedFont, TextRenderer};

const TITLE_SIZE: f32 = 16.0;
const LABEL_SIZE: f32 = 13.0;
const TICK_SIZE: f32 = 11.0;
const LEGEND_SIZE: f32 = 11.0;
const PANEL_SIZE: f32 = 14.0;
const TICK_LENGTH: f32 = 4.0;

/// Everything the chart shows
#[derive(Debug, Clone, Copy)]
pub struct ChartInput<'a> {
    /// Zone or encounter name; rendered as "{title}: Pull #{n}"
    pub title: &'a str,
    /// Attempts in chronological order
    pub attempts: &'a [Attempt],
    /// Evaluation result, parallel to `attempts`
    pub resolved: &'a [ResolvedAttempt],
    pub milestones: &'a MilestoneSet,
    pub settings: &'a ChartSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pulls: usize,
    /// 1 for a still image
    pub frames: usize,
    pub font: ResolvedFont,
}

pub struct ChartRenderer {
    text: TextRenderer,
}

impl ChartRenderer {
    pub fn new(settings: &ChartSettings) -> Self {
        Self {
            text: TextRenderer::new(&settings.font_family, settings.font_path.as_deref()),
        }
    }

    pub fn with_text_renderer(text: TextRenderer) -> Self {
        Self { text }
    }

    pub fn font(&self) -> &ResolvedFont {
        self.text.font()
    }

    /// Draw the chart and write it as PNG to `output_path`.
    pub fn render(
        &mut self,
        input: &ChartInput<'_>,
        output_path: &Path,
    ) -> Result<RenderOutcome, RenderError> {
        let pixmap = self.draw(input)?;
        let png = pixmap.encode_png().map_err(RenderError::EncodePng)?;
        write_output(output_path, &png)?;

        tracing::info!(
            path = %output_path.display(),
            pulls = input.attempts.len(),
            bytes = png.len(),
            "Chart written"
        );

        Ok(RenderOutcome {
            path: output_path.to_path_buf(),
            width: pixmap.width(),
            height: pixmap.height(),
            pulls: input.attempts.len(),
            frames: 1,
            font: self.text.font().clone(),
        })
    }

    /// Draw the chart into a new pixmap.
    pub fn draw(&mut self, input: &ChartInput<'_>) -> Result<Pixmap, RenderError> {
        let settings = input.settings;
        let layout = ChartLayout::new(settings.width, settings.height)?;
        let mut pixmap =
            Pixmap::new(settings.width, settings.height).ok_or(RenderError::CanvasSize {
                width: settings.width,
                height: settings.height,
            })?;
        pixmap.fill(colors::background());

        let pulls = input.attempts.len().min(input.resolved.len());
        if pulls != input.attempts.len().max(input.resolved.len()) {
            tracing::warn!(
                attempts = input.attempts.len(),
                resolved = input.resolved.len(),
                "Attempt and result counts differ; extra entries are not drawn"
            );
        }
        let attempts = &input.attempts[..pulls];
        let resolved = &input.resolved[..pulls];

        let x = AxisScale::new(
            0.5,
            pulls.max(1) as f64 + 0.5,
            layout.plot.left(),
            layout.plot.right(),
        );
        let y = y_axis(&layout, input, attempts);

        draw_session_shading(&mut pixmap, &layout, &x, attempts);
        self.draw_axes(&mut pixmap, &layout, &x, &y, settings.mode, input.milestones);

        for (attempt, result) in attempts.iter().zip(resolved) {
            let value = match settings.mode {
                ChartMode::Depth => depth_row(result, input.milestones),
                ChartMode::Duration => attempt.duration_secs(),
            };
            let style = marker_style(result, input.milestones);
            draw_marker(&mut pixmap, &style, x.map(result.ordinal as f64), y.map(value));
        }

        let stats = ChartStats::compute(attempts, resolved, input.milestones);
        self.draw_legend(&mut pixmap, &layout, &stats);
        self.draw_panel(&mut pixmap, &layout, &stats);

        let title = format!("{}: Pull #{}", input.title, pulls);
        let plot_center = (layout.plot.left() + layout.plot.right()) / 2.0;
        self.text.draw_centered(
            &mut pixmap,
            &title,
            plot_center,
            10.0,
            TITLE_SIZE,
            colors::text(),
        );

        tracing::debug!(pulls, mode = ?settings.mode, font = ?self.text.font(), "Chart drawn");
        Ok(pixmap)
    }

    fn draw_axes(
        &mut self,
        pixmap: &mut Pixmap,
        layout: &ChartLayout,
        x: &AxisScale,
        y: &AxisScale,
        mode: ChartMode,
        milestones: &MilestoneSet,
    ) {
        let plot = layout.plot;

        // Horizontal grid and y tick labels
        let y_ticks: Vec<(f64, String)> = match mode {
            ChartMode::Depth => std::iter::once((0.0, "-".to_string()))
                .chain(
                    milestones
                        .iter()
                        .enumerate()
                        .map(|(rank, m)| ((rank + 1) as f64, m.index().to_string())),
                )
                .collect(),
            ChartMode::Duration => {
                let step = duration_step(y.max);
                ticks(y.min, y.max, step)
                    .into_iter()
                    .map(|v| (v, format_mmss(v)))
                    .collect()
            }
        };
        for (value, label) in &y_ticks {
            let py = y.map(*value);
            fill(pixmap, plot.left(), py, plot.width(), 1.0, colors::grid());
            fill(pixmap, plot.left() - TICK_LENGTH, py, TICK_LENGTH, 1.0, colors::axis());
            self.text.draw_right(
                pixmap,
                label,
                plot.left() - TICK_LENGTH - 4.0,
                py - TICK_SIZE * 0.6,
                TICK_SIZE,
                colors::text(),
            );
        }

        // X ticks on whole pull numbers
        let span = x.max - x.min;
        let step = nice_step(span, 10).max(1.0);
        for value in ticks(step.max(1.0), x.max, step) {
            let px = x.map(value);
            fill(pixmap, px, plot.bottom(), 1.0, TICK_LENGTH, colors::axis());
            self.text.draw_centered(
                pixmap,
                &format!("{value}"),
                px,
                plot.bottom() + TICK_LENGTH + 2.0,
                TICK_SIZE,
                colors::text(),
            );
        }

        // Frame
        fill(pixmap, plot.left(), plot.top(), 1.0, plot.height(), colors::axis());
        fill(pixmap, plot.left(), plot.bottom(), plot.width(), 1.0, colors::axis());
        fill(pixmap, plot.right(), plot.top(), 1.0, plot.height(), colors::axis());
        fill(pixmap, plot.left(), plot.top(), plot.width(), 1.0, colors::axis());

        let x_label_y = plot.bottom() + TICK_LENGTH + TICK_SIZE * 1.2 + 6.0;
        let plot_center = (plot.left() + plot.right()) / 2.0;
        self.text.draw_centered(
            pixmap,
            "Pull Count",
            plot_center,
            x_label_y,
            LABEL_SIZE,
            colors::text(),
        );

        let y_label = match mode {
            ChartMode::Depth => "Milestone",
            ChartMode::Duration => "Pull Length",
        };
        self.text.draw(
            pixmap,
            y_label,
            8.0,
            plot.top() - LABEL_SIZE * 1.4,
            LABEL_SIZE,
            colors::text(),
        );
    }

    /// Upper-left legend box inside the plot
    fn draw_legend(&mut self, pixmap: &mut Pixmap, layout: &ChartLayout, stats: &ChartStats) {
        if stats.legend.is_empty() {
            return;
        }

        let padding = 6.0;
        let swatch = LEGEND_SIZE * 0.9;
        let line_height = LEGEND_SIZE * 1.5;

        let text_width = stats
            .legend
            .iter()
            .map(|entry| self.text.measure(&entry.label, LEGEND_SIZE).0)
            .fold(0.0f32, f32::max);

        let left = layout.plot.left() + 8.0;
        let top = layout.plot.top() + 8.0;
        let width = padding * 3.0 + swatch + text_width;
        let height = padding * 2.0 + line_height * stats.legend.len() as f32;

        fill(pixmap, left, top, width, height, colors::legend_bg());
        fill(pixmap, left, top, width, 1.0, colors::legend_border());
        fill(pixmap, left, top + height, width, 1.0, colors::legend_border());
        fill(pixmap, left, top, 1.0, height, colors::legend_border());
        fill(pixmap, left + width, top, 1.0, height, colors::legend_border());

        for (i, entry) in stats.legend.iter().enumerate() {
            let row_top = top + padding + i as f32 * line_height;
            fill(
                pixmap,
                left + padding,
                row_top + (line_height - swatch) / 2.0,
                swatch,
                swatch,
                colors::to_skia(entry.color, 1.0),
            );
            self.text.draw(
                pixmap,
                &entry.label,
                left + padding * 2.0 + swatch,
                row_top + (line_height - LEGEND_SIZE * 1.2) / 2.0,
                LEGEND_SIZE,
                colors::text(),
            );
        }
    }

    fn draw_panel(&mut self, pixmap: &mut Pixmap, layout: &ChartLayout, stats: &ChartStats) {
        let text = stats.info_lines().join("\n");
        self.text.draw(
            pixmap,
            &text,
            layout.panel.left(),
            layout.panel.top(),
            PANEL_SIZE,
            colors::text(),
        );
    }
}

fn y_axis(layout: &ChartLayout, input: &ChartInput<'_>, attempts: &[Attempt]) -> AxisScale {
    let (top, bottom) = (layout.plot.top(), layout.plot.bottom());
    match input.settings.mode {
        ChartMode::Depth => AxisScale::new(-0.5, input.milestones.len() as f64 + 0.5, bottom, top),
        ChartMode::Duration => {
            let longest = attempts.iter().map(Attempt::duration_secs).fold(0.0, f64::max);
            let step = duration_step(longest);
            let max = ((longest / step).ceil() * step).max(step);
            AxisScale::new(0.0, max, bottom, top)
        }
    }
}

/// Depth row: 0 for "no milestone", then one row per milestone in index order
fn depth_row(result: &ResolvedAttempt, milestones: &MilestoneSet) -> f64 {
    result
        .milestone
        .and_then(|index| milestones.rank(index))
        .map_or(0.0, |rank| (rank + 1) as f64)
}

fn marker_style(result: &ResolvedAttempt, milestones: &MilestoneSet) -> MilestoneStyle {
    result
        .milestone
        .and_then(|index| milestones.get(index))
        .map(|m| m.style().clone())
        .unwrap_or_else(|| MilestoneStyle::with_color(palette::UNRESOLVED))
}

/// Whole-minute tick step in seconds for a duration axis reaching `longest`
fn duration_step(longest: f64) -> f64 {
    nice_step(longest / 60.0, 8).max(1.0) * 60.0
}

/// Shade each run of consecutive attempts from the same report
fn draw_session_shading(
    pixmap: &mut Pixmap,
    layout: &ChartLayout,
    x: &AxisScale,
    attempts: &[Attempt],
) {
    let mut start = 0;
    let mut odd = false;

    while start < attempts.len() {
        let code = &attempts[start].report_code;
        let len = attempts[start..]
            .iter()
            .take_while(|a| &a.report_code == code)
            .count();

        let left = x.map(start as f64 + 0.5);
        let right = x.map((start + len) as f64 + 0.5);
        fill(
            pixmap,
            left,
            layout.plot.top(),
            right - left,
            layout.plot.height(),
            colors::session_shade(odd),
        );

        odd = !odd;
        start += len;
    }
}

/// Write encoded chart bytes, creating the parent directory first.
pub(crate) fn write_output(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| RenderError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, bytes).map_err(|source| RenderError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

fn fill(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, color: Color) {
    let Some(rect) = Rect::from_xywh(x, y, w, h) else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = false;

    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}
