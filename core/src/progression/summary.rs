use hashbrown::HashMap;

use crate::milestone::MilestoneSet;

use super::ResolvedAttempt;

/// Run-level aggregates over resolved attempts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressionSummary {
    pub total_attempts: usize,
    /// Attempts per resolved milestone index
    pub occurrences: HashMap<u32, usize>,
    /// Attempts that reached no milestone
    pub unresolved: usize,
    /// Deepest milestone index reached by any attempt
    pub deepest: Option<u32>,
    pub kills: usize,
    /// Ordinal of the first kill
    pub first_kill: Option<usize>,
    /// Attempts after the most recent kill (all attempts when never killed)
    pub pulls_since_last_kill: usize,
}

impl ProgressionSummary {
    pub fn from_resolved(resolved: &[ResolvedAttempt], milestones: &MilestoneSet) -> Self {
        let victory = milestones.victory().map(|v| v.index());
        let mut summary = Self {
            total_attempts: resolved.len(),
            ..Default::default()
        };
        let mut last_kill = 0;

        for attempt in resolved {
            let Some(index) = attempt.milestone else {
                summary.unresolved += 1;
                continue;
            };

            *summary.occurrences.entry(index).or_insert(0) += 1;
            summary.deepest = summary.deepest.max(Some(index));

            if Some(index) == victory {
                summary.kills += 1;
                summary.first_kill.get_or_insert(attempt.ordinal);
                last_kill = attempt.ordinal;
            }
        }

        summary.pulls_since_last_kill = resolved.len().saturating_sub(last_kill);
        summary
    }

    pub fn count(&self, index: u32) -> usize {
        self.occurrences.get(&index).copied().unwrap_or(0)
    }
}
