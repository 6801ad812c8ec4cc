use std::fs::File;
use std::path::Path;

use progchart_core::{Attempt, MilestoneDefinition, MilestoneSet, evaluate};
use progchart_types::{ChartMode, ChartSettings};

use crate::text::tests::TEST_FONT;
use crate::{
    ChartInput, ChartRenderer, FINAL_FRAME_HOLD_CS, FRAME_DELAY_CS, RenderError, ResolvedFont,
    TextRenderer,
};

fn renderer(font_path: Option<&Path>) -> ChartRenderer {
    ChartRenderer::with_text_renderer(TextRenderer::with_database(
        fontdb::Database::new(),
        "Liberation Serif",
        font_path,
    ))
}

fn milestones() -> MilestoneSet {
    MilestoneSet::new(vec![
        MilestoneDefinition::ability(0, "Opener", [100]),
        MilestoneDefinition::victory(1, "Cleared"),
    ])
    .unwrap()
}

fn pulls(count: usize) -> Vec<Attempt> {
    (0..count as i64)
        .map(|i| Attempt {
            report_code: "A".into(),
            fight_id: i as u32 + 1,
            start_time: i * 300_000,
            end_time: i * 300_000 + 120_000,
            ..Default::default()
        })
        .collect()
}

fn settings() -> ChartSettings {
    ChartSettings {
        mode: ChartMode::Depth,
        width: 400,
        height: 240,
        animate: true,
        ..Default::default()
    }
}

/// Delay of every frame in the written GIF
fn frame_delays(path: &Path) -> Vec<u16> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(File::open(path).unwrap()).unwrap();

    let mut delays = Vec::new();
    while let Some(frame) = decoder.read_next_frame().unwrap() {
        delays.push(frame.delay);
    }
    delays
}

#[test]
fn one_frame_per_pull_with_held_final_frame() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output").join("progress.gif");

    let set = milestones();
    let attempts = pulls(4);
    let resolved = evaluate(&attempts, &set);
    let settings = settings();
    let input = ChartInput {
        title: "Test Zone",
        attempts: &attempts,
        resolved: &resolved,
        milestones: &set,
        settings: &settings,
    };

    let outcome = renderer(None).render_animation(&input, &output).unwrap();
    assert_eq!(outcome.frames, 4);
    assert_eq!(outcome.pulls, 4);
    assert_eq!(outcome.font, ResolvedFont::Unavailable);

    assert_eq!(
        frame_delays(&output),
        vec![FRAME_DELAY_CS, FRAME_DELAY_CS, FRAME_DELAY_CS, FINAL_FRAME_HOLD_CS]
    );
}

#[test]
fn empty_progression_is_a_single_held_frame() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("progress.gif");

    let set = milestones();
    let settings = settings();
    let input = ChartInput {
        title: "Nothing Yet",
        attempts: &[],
        resolved: &[],
        milestones: &set,
        settings: &settings,
    };

    let outcome = renderer(None).render_animation(&input, &output).unwrap();
    assert_eq!(outcome.frames, 1);
    assert_eq!(frame_delays(&output), vec![FINAL_FRAME_HOLD_CS]);
}

#[test]
fn frames_render_with_fallback_font() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("progress.gif");

    let set = milestones();
    let attempts = pulls(2);
    let resolved = evaluate(&attempts, &set);
    let settings = settings();
    let input = ChartInput {
        title: "Test Zone",
        attempts: &attempts,
        resolved: &resolved,
        milestones: &set,
        settings: &settings,
    };

    let outcome = renderer(Some(Path::new(TEST_FONT)))
        .render_animation(&input, &output)
        .unwrap();
    assert_eq!(outcome.font, ResolvedFont::SansSerif);
    assert_eq!(frame_delays(&output).len(), 2);
}

#[test]
fn canvas_beyond_gif_limits_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("progress.gif");

    let set = milestones();
    let settings = ChartSettings {
        width: 70_000,
        ..settings()
    };
    let input = ChartInput {
        title: "Test Zone",
        attempts: &[],
        resolved: &[],
        milestones: &set,
        settings: &settings,
    };

    let err = renderer(None).render_animation(&input, &output).unwrap_err();
    assert!(matches!(err, RenderError::CanvasSize { width: 70_000, .. }));
    assert!(!output.exists());
}
