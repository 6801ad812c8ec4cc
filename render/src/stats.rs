//! Figures shown next to the chart: legend counts and the info panel.

use hashbrown::HashSet;
use progchart_core::{Attempt, MilestoneSet, ProgressionSummary, ResolvedAttempt};
use progchart_types::{Color, palette};

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartStats {
    pub pulls: usize,
    pub fastest_kill_secs: Option<f64>,
    /// Distinct reports the pulls came from
    pub sessions: usize,
    pub total_secs: f64,
    pub pulls_since_last_kill: usize,
    /// Every milestone up to the deepest one reached, with its count
    pub legend: Vec<LegendEntry>,
}

impl ChartStats {
    pub fn compute(
        attempts: &[Attempt],
        resolved: &[ResolvedAttempt],
        milestones: &MilestoneSet,
    ) -> Self {
        let summary = ProgressionSummary::from_resolved(resolved, milestones);
        let victory = milestones.victory().map(|v| v.index());

        let fastest_kill_secs = attempts
            .iter()
            .zip(resolved)
            .filter(|(_, r)| r.milestone.is_some() && r.milestone == victory)
            .map(|(a, _)| a.duration_secs())
            .min_by(f64::total_cmp);

        let sessions = attempts
            .iter()
            .map(|a| a.report_code.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut legend: Vec<LegendEntry> = match summary.deepest {
            Some(deepest) => milestones
                .iter()
                .filter(|m| m.index() <= deepest)
                .map(|m| LegendEntry {
                    label: format!("{} ({})", m.label(), summary.count(m.index())),
                    color: m.style().color,
                })
                .collect(),
            None => Vec::new(),
        };
        if summary.unresolved > 0 {
            legend.push(LegendEntry {
                label: format!("No milestone ({})", summary.unresolved),
                color: palette::UNRESOLVED,
            });
        }

        Self {
            pulls: attempts.len(),
            fastest_kill_secs,
            sessions,
            total_secs: attempts.iter().map(Attempt::duration_secs).sum(),
            pulls_since_last_kill: summary.pulls_since_last_kill,
            legend,
        }
    }

    /// Lines of the side info panel
    pub fn info_lines(&self) -> Vec<String> {
        let fastest = self
            .fastest_kill_secs
            .map(|secs| format!("{}s", format_mmss(secs)))
            .unwrap_or_else(|| "n/a".to_string());

        vec![
            format!("Fastest kill: {fastest}"),
            format!("Session count: {}", self.sessions),
            format!("Total time: {}", format_hms(self.total_secs)),
            format!("Pulls since last kill: {}", self.pulls_since_last_kill),
        ]
    }
}

/// `m:ss`, e.g. `7:05`
pub fn format_mmss(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "n/a".to_string();
    }
    let total = secs as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// `HH:MM:SS`, hours not wrapped at 24
pub fn format_hms(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 { secs as u64 } else { 0 };
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
