//! Animated progression chart
//!
//! Frame `n` is the chart drawn over the first `n` pulls, so the markers,
//! legend counts, info panel and title grow pull by pull. The final frame
//! is held before the animation loops.

use std::path::Path;

use tiny_skia::Pixmap;

use crate::RenderError;
use crate::chart::{ChartInput, ChartRenderer, RenderOutcome, write_output};

/// Delay between pull frames, in hundredths of a second
pub const FRAME_DELAY_CS: u16 = 2;

/// How long the complete chart stays on screen, in hundredths of a second
pub const FINAL_FRAME_HOLD_CS: u16 = 600;

/// NeuQuant sampling factor (1 = best quality, 30 = fastest)
const QUANTIZE_SPEED: i32 = 10;

impl ChartRenderer {
    /// Draw one frame per pull and write them as a looping GIF to
    /// `output_path`. An empty progression yields a single frame.
    pub fn render_animation(
        &mut self,
        input: &ChartInput<'_>,
        output_path: &Path,
    ) -> Result<RenderOutcome, RenderError> {
        let settings = input.settings;
        let canvas_size = RenderError::CanvasSize {
            width: settings.width,
            height: settings.height,
        };
        let (Ok(width), Ok(height)) = (
            u16::try_from(settings.width),
            u16::try_from(settings.height),
        ) else {
            return Err(canvas_size);
        };

        let pulls = input.attempts.len().min(input.resolved.len());
        let frame_count = pulls.max(1);

        let mut encoder =
            gif::Encoder::new(Vec::new(), width, height, &[]).map_err(RenderError::EncodeGif)?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(RenderError::EncodeGif)?;

        for frame_no in 1..=frame_count {
            let shown = frame_no.min(pulls);
            let frame_input = ChartInput {
                attempts: &input.attempts[..shown],
                resolved: &input.resolved[..shown],
                ..*input
            };
            let pixmap = self.draw(&frame_input)?;

            let mut rgba = straight_rgba(&pixmap);
            let mut frame = gif::Frame::from_rgba_speed(width, height, &mut rgba, QUANTIZE_SPEED);
            frame.delay = if frame_no == frame_count {
                FINAL_FRAME_HOLD_CS
            } else {
                FRAME_DELAY_CS
            };
            encoder.write_frame(&frame).map_err(RenderError::EncodeGif)?;

            if frame_no % 100 == 0 {
                tracing::debug!(frame_no, frame_count, "Encoded animation frames");
            }
        }

        let bytes = encoder
            .into_inner()
            .map_err(|e| RenderError::EncodeGif(e.into()))?;
        write_output(output_path, &bytes)?;

        tracing::info!(
            path = %output_path.display(),
            pulls,
            frames = frame_count,
            bytes = bytes.len(),
            "Chart animation written"
        );

        Ok(RenderOutcome {
            path: output_path.to_path_buf(),
            width: settings.width,
            height: settings.height,
            pulls,
            frames: frame_count,
            font: self.font().clone(),
        })
    }
}

/// Pixmap data is premultiplied; GIF frames take straight RGBA.
fn straight_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}
