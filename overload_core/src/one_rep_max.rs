//! One-rep-max estimation and best-set selection.
//!
//! Estimates use the Epley formula, `weight * (1 + reps / 30)`, rounded to
//! the nearest whole kilogram. The same estimate ranks sets everywhere a
//! "best" set is needed: the previous-best display, the top performances
//! list and the CSV export.

use crate::SetRecord;
use serde::Serialize;

/// Unrounded Epley estimate, used for ranking
fn epley(set: &SetRecord) -> f64 {
    set.weight * (1.0 + set.reps as f64 / 30.0)
}

/// Estimated one-rep max for a single set
///
/// Inputs are not validated; negative weights produce negative estimates.
pub fn one_rep_max(set: &SetRecord) -> i64 {
    epley(set).round() as i64
}

/// The set with the highest estimated one-rep max
///
/// Returns `None` for an empty slice. On ties the earliest set wins: a later
/// set only replaces the current best when its estimate is strictly greater.
pub fn best_set(sets: &[SetRecord]) -> Option<&SetRecord> {
    let (first, rest) = sets.split_first()?;

    let best = rest.iter().fold(first, |best, candidate| {
        if epley(candidate) > epley(best) {
            candidate
        } else {
            best
        }
    });

    Some(best)
}

/// Display summary of a best set
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestSetSummary {
    pub weight: f64,
    pub reps: u32,
    pub one_rep_max: i64,
}

impl From<&SetRecord> for BestSetSummary {
    fn from(set: &SetRecord) -> Self {
        Self {
            weight: set.weight,
            reps: set.reps,
            one_rep_max: one_rep_max(set),
        }
    }
}

/// Best set of `sets` together with its estimate
pub fn summarize_best(sets: &[SetRecord]) -> Option<BestSetSummary> {
    best_set(sets).map(BestSetSummary::from)
}
