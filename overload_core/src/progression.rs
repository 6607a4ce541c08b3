//! Progressive-overload planning for the next session.
//!
//! When an exercise is opened with no sets logged yet, the planner seeds its
//! set list from the most recent completed session:
//! - Top of the rep range hit on a completed set: add weight, reset reps
//! - Otherwise: hold weight and chase the top of the range
//! - Sets beyond what was logged last time carry the last working weight
//! - No history at all: fixed cold-start weight
//!
//! Set `i` of the plan is matched to set `i` of the previous session by
//! position, never by `set_number`.

use crate::config::PlannerConfig;
use crate::{ExerciseDefinition, RepRange, SetRecord};

/// Desired shape of an exercise's work for one session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetTarget {
    pub sets: u32,
    pub reps_range: String,
}

impl SetTarget {
    pub fn new(sets: u32, reps_range: impl Into<String>) -> Self {
        Self {
            sets,
            reps_range: reps_range.into(),
        }
    }
}

impl From<&ExerciseDefinition> for SetTarget {
    fn from(def: &ExerciseDefinition) -> Self {
        Self::new(def.target_sets, def.target_reps_range.clone())
    }
}

impl RepRange {
    /// Parse `"<min>-<max>"` or a bare `"<n>"`
    ///
    /// Each bound is read as a leading integer (trailing text is ignored).
    /// A missing, unreadable or zero minimum falls back to `default_min`; a
    /// missing, unreadable or zero maximum falls back to the minimum.
    pub fn parse_with_default(s: &str, default_min: u32) -> Self {
        let mut parts = s.splitn(2, '-');
        let min = parts
            .next()
            .and_then(leading_int)
            .filter(|&n| n != 0)
            .unwrap_or(default_min);
        let max = parts
            .next()
            .and_then(leading_int)
            .filter(|&n| n != 0)
            .unwrap_or(min);

        Self { min, max }
    }

    /// Parse with the standard default minimum of 8 reps
    pub fn parse(s: &str) -> Self {
        Self::parse_with_default(s, PlannerConfig::default().default_min_reps)
    }
}

/// Read the integer at the start of `s`, skipping leading whitespace
fn leading_int(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    s[..end].parse().ok()
}

/// What the plan for one set position is based on
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SetBasis<'a> {
    /// The previous session had a set at this position
    Previous(&'a SetRecord),
    /// The previous session had fewer sets; carries its last set
    Extrapolated(&'a SetRecord),
    /// No history for this exercise
    ColdStart,
}

impl<'a> SetBasis<'a> {
    fn for_position(previous: &'a [SetRecord], index: usize) -> Self {
        match (previous.get(index), previous.last()) {
            (Some(prev), _) => SetBasis::Previous(prev),
            (None, Some(last)) => SetBasis::Extrapolated(last),
            (None, None) => SetBasis::ColdStart,
        }
    }
}

/// Why a planned set got its weight and reps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetDecision {
    /// Rep ceiling reached on a completed set: weight up, reps back to min
    Progression,
    /// Same weight, aim for the top of the range
    Repeat,
    /// New set beyond last session's count
    Extrapolated,
    /// No history
    ColdStart,
}

/// A planned set and the rule that produced it
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedSet {
    pub set: SetRecord,
    pub decision: SetDecision,
}

/// Plan the next session's sets and explain each one
pub fn plan_outline(
    config: &PlannerConfig,
    target: &SetTarget,
    previous: Option<&[SetRecord]>,
) -> Vec<PlannedSet> {
    let range = RepRange::parse_with_default(&target.reps_range, config.default_min_reps);
    let previous = previous.unwrap_or(&[]);

    (0..target.sets as usize)
        .map(|i| {
            let (weight, reps, decision) = match SetBasis::for_position(previous, i) {
                SetBasis::Previous(prev) if prev.reps >= range.max && prev.is_completed => (
                    prev.weight + config.weight_increment,
                    range.min,
                    SetDecision::Progression,
                ),
                SetBasis::Previous(prev) => (prev.weight, range.max, SetDecision::Repeat),
                SetBasis::Extrapolated(last) => (last.weight, range.min, SetDecision::Extrapolated),
                SetBasis::ColdStart => (config.cold_start_weight, range.min, SetDecision::ColdStart),
            };

            tracing::debug!(
                "Planned set {}: {} kg x {} ({:?})",
                i + 1,
                weight,
                reps,
                decision
            );

            PlannedSet {
                set: SetRecord::planned(i as u32 + 1, weight, reps),
                decision,
            }
        })
        .collect()
}

/// Plan the next session's sets with explicit planner parameters
pub fn plan_next_sets_with(
    config: &PlannerConfig,
    target: &SetTarget,
    previous: Option<&[SetRecord]>,
) -> Vec<SetRecord> {
    plan_outline(config, target, previous)
        .into_iter()
        .map(|planned| planned.set)
        .collect()
}

/// Plan the next session's sets with the standard parameters
///
/// +2.5 kg on progression, 40 kg cold start, 8 reps default minimum.
pub fn plan_next_sets(target: &SetTarget, previous: Option<&[SetRecord]>) -> Vec<SetRecord> {
    plan_next_sets_with(&PlannerConfig::default(), target, previous)
}
