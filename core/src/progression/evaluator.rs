use serde::{Deserialize, Serialize};

use crate::attempt::Attempt;
use crate::context::ConfigError;
use crate::milestone::{MilestoneDefinition, MilestoneSet};

/// The deepest milestone an attempt reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedAttempt {
    /// 1-based pull number in chronological order
    pub ordinal: usize,
    /// Index of the resolved milestone, `None` when nothing matched
    pub milestone: Option<u32>,
}

impl ResolvedAttempt {
    pub fn is_resolved(&self) -> bool {
        self.milestone.is_some()
    }
}

/// Deepest matching milestone for a single attempt.
///
/// Walks the set from the highest index down, so the first match is the
/// maximum-index match. A kill always resolves to the victory milestone
/// since it is the deepest definition in a valid set.
pub fn resolve<'a>(
    attempt: &Attempt,
    milestones: &'a MilestoneSet,
) -> Option<&'a MilestoneDefinition> {
    milestones.deepest_first().find(|m| m.matches(attempt))
}

/// Resolve every attempt, preserving input order.
pub fn evaluate(attempts: &[Attempt], milestones: &MilestoneSet) -> Vec<ResolvedAttempt> {
    let resolved: Vec<ResolvedAttempt> = attempts
        .iter()
        .enumerate()
        .map(|(i, attempt)| ResolvedAttempt {
            ordinal: i + 1,
            milestone: resolve(attempt, milestones).map(MilestoneDefinition::index),
        })
        .collect();

    tracing::debug!(
        attempts = attempts.len(),
        unresolved = resolved.iter().filter(|r| !r.is_resolved()).count(),
        "Evaluated progression"
    );

    resolved
}

/// Validate raw definitions, then evaluate.
///
/// Fails only on an invalid definition set, before any attempt is looked at.
pub fn evaluate_definitions(
    attempts: &[Attempt],
    definitions: Vec<MilestoneDefinition>,
) -> Result<Vec<ResolvedAttempt>, ConfigError> {
    let milestones = MilestoneSet::new(definitions)?;
    Ok(evaluate(attempts, &milestones))
}
