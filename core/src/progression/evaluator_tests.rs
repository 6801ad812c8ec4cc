//! Progression evaluation tests
//!
//! Covers max-index resolution, kill handling and the run summary.

use crate::attempt::{Attempt, AttemptEvent};
use crate::context::ConfigError;
use crate::milestone::{MilestoneDefinition, MilestoneSet, builtin_milestones};

use super::{ProgressionSummary, ResolvedAttempt, evaluate, evaluate_definitions, resolve};

fn pull(ability_ids: &[i64], kill: bool) -> Attempt {
    Attempt {
        ended_in_kill: kill,
        events: ability_ids
            .iter()
            .enumerate()
            .map(|(i, id)| AttemptEvent::cast(i as i64 * 1_000, *id))
            .collect(),
        ..Default::default()
    }
}

fn three_step_set() -> MilestoneSet {
    MilestoneSet::new(vec![
        MilestoneDefinition::ability(0, "Opener", [100]),
        MilestoneDefinition::ability(1, "Adds", [200]),
        MilestoneDefinition::victory(2, "Kill"),
    ])
    .unwrap()
}

fn indices(resolved: &[ResolvedAttempt]) -> Vec<Option<u32>> {
    resolved.iter().map(|r| r.milestone).collect()
}

#[test]
fn three_pull_scenario() {
    let attempts = vec![pull(&[100], false), pull(&[100, 200], false), pull(&[], true)];
    let resolved = evaluate(&attempts, &three_step_set());

    assert_eq!(indices(&resolved), vec![Some(0), Some(1), Some(2)]);
    let ordinals: Vec<usize> = resolved.iter().map(|r| r.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3]);
}

#[test]
fn one_result_per_attempt_in_order() {
    let attempts = vec![
        pull(&[200], false),
        pull(&[], false),
        pull(&[100], false),
        pull(&[999], false),
        pull(&[100], true),
    ];
    let resolved = evaluate(&attempts, &three_step_set());

    assert_eq!(resolved.len(), attempts.len());
    assert_eq!(indices(&resolved), vec![Some(1), None, Some(0), None, Some(2)]);
}

#[test]
fn max_index_wins_over_first_match() {
    let set = MilestoneSet::new(vec![
        MilestoneDefinition::ability(2, "Early", [10]),
        MilestoneDefinition::ability(5, "Late", [50]),
    ])
    .unwrap();

    // Later milestone cast first, earlier one recurring after it
    let attempt = pull(&[50, 10], false);
    assert_eq!(resolve(&attempt, &set).map(|m| m.index()), Some(5));
}

#[test]
fn kill_beats_every_ability_match() {
    let set = three_step_set();
    let attempt = pull(&[100, 200], true);
    let resolved = resolve(&attempt, &set).expect("kill resolves");
    assert!(resolved.is_victory());
    assert_eq!(resolved.index(), 2);
}

#[test]
fn empty_wipe_resolves_to_none() {
    let resolved = evaluate(&[Attempt::default()], &three_step_set());
    assert_eq!(resolved[0].milestone, None);
    assert!(!resolved[0].is_resolved());
}

#[test]
fn kill_without_victory_milestone_uses_ability_depth() {
    let set = MilestoneSet::new(vec![
        MilestoneDefinition::ability(0, "Opener", [100]),
        MilestoneDefinition::ability(1, "Adds", [200]),
    ])
    .unwrap();
    let resolved = evaluate(&[pull(&[100], true)], &set);
    assert_eq!(resolved[0].milestone, Some(0));
}

#[test]
fn shared_ability_ids_resolve_deterministically() {
    let set = MilestoneSet::new(vec![
        MilestoneDefinition::ability(3, "Prime", [18522, 19075]),
        MilestoneDefinition::ability(5, "Post-Wormhole", [19075]),
    ])
    .unwrap();
    let resolved = evaluate(&[pull(&[19075], false), pull(&[18522], false)], &set);
    assert_eq!(indices(&resolved), vec![Some(5), Some(3)]);
}

#[test]
fn evaluation_is_idempotent() {
    let attempts = vec![
        pull(&[100], false),
        pull(&[200, 100], false),
        pull(&[], true),
        pull(&[], false),
    ];
    let set = three_step_set();
    assert_eq!(evaluate(&attempts, &set), evaluate(&attempts, &set));
}

#[test]
fn no_attempts_no_results() {
    assert!(evaluate(&[], &three_step_set()).is_empty());
}

#[test]
fn duplicate_index_fails_before_evaluation() {
    let err = evaluate_definitions(
        &[pull(&[1], false)],
        vec![
            MilestoneDefinition::ability(3, "A", [1]),
            MilestoneDefinition::ability(3, "B", [2]),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateMilestoneIndex { index: 3, .. }));
}

#[test]
fn builtin_progression_resolves_phases() {
    let loaded = builtin_milestones().unwrap();
    let attempts = vec![
        pull(&[18864], false),
        pull(&[18864, 18480, 18516], false),
        // Mega Holy after Wormhole: both Alexander Prime and Post-Wormhole match
        pull(&[18864, 18480, 18516, 18522, 18542, 19075], false),
        pull(&[18557, 18583], true),
    ];
    let resolved = evaluate(&attempts, &loaded.set);
    assert_eq!(indices(&resolved), vec![Some(0), Some(2), Some(5), Some(8)]);
}

#[test]
fn summary_counts_and_kill_tracking() {
    let set = three_step_set();
    let attempts = vec![
        pull(&[], false),
        pull(&[100], false),
        pull(&[100, 200], true),
        pull(&[100, 200], false),
        pull(&[100], false),
    ];
    let resolved = evaluate(&attempts, &set);
    let summary = ProgressionSummary::from_resolved(&resolved, &set);

    assert_eq!(summary.total_attempts, 5);
    assert_eq!(summary.unresolved, 1);
    assert_eq!(summary.count(0), 2);
    assert_eq!(summary.count(1), 1);
    assert_eq!(summary.count(2), 1);
    assert_eq!(summary.deepest, Some(2));
    assert_eq!(summary.kills, 1);
    assert_eq!(summary.first_kill, Some(3));
    assert_eq!(summary.pulls_since_last_kill, 2);
}

#[test]
fn summary_without_kills_counts_every_pull() {
    let set = three_step_set();
    let resolved = evaluate(&[pull(&[100], false), pull(&[], false)], &set);
    let summary = ProgressionSummary::from_resolved(&resolved, &set);
    assert_eq!(summary.kills, 0);
    assert_eq!(summary.first_kill, None);
    assert_eq!(summary.pulls_since_last_kill, 2);
    assert_eq!(summary.deepest, Some(0));
}
