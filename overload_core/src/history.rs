//! Exercise history lookups over a session log.
//!
//! These helpers turn raw sessions into the inputs and display values the
//! rest of the app needs: the previous entry the planner seeds from, and the
//! per-session best sets behind the progress chart and top performances.

use crate::one_rep_max::{best_set, one_rep_max};
use crate::{ExerciseEntry, SetRecord, WorkoutSession};
use serde::Serialize;

/// The entry for `exercise_id` in the most recently finished completed
/// session that contains it
///
/// Sessions are ordered by `end_time` (newest first), with a missing end
/// time treated as the oldest.
pub fn previous_entry_for<'a>(
    sessions: &'a [WorkoutSession],
    exercise_id: &str,
) -> Option<&'a ExerciseEntry> {
    let mut completed: Vec<&WorkoutSession> =
        sessions.iter().filter(|s| s.is_completed()).collect();

    // Stable sort keeps store order among equal end times
    completed.sort_by_key(|s| std::cmp::Reverse(s.end_time.unwrap_or(0)));

    let entry = completed.into_iter().find_map(|s| s.entry(exercise_id));

    match entry {
        Some(e) => tracing::debug!(
            "Found previous entry for {} with {} sets",
            exercise_id,
            e.sets.len()
        ),
        None => tracing::debug!("No previous entry for {}", exercise_id),
    }

    entry
}

/// Previous sets for the planner, `None` when the exercise has no history
pub fn previous_sets_for<'a>(
    sessions: &'a [WorkoutSession],
    exercise_id: &str,
) -> Option<&'a [SetRecord]> {
    previous_entry_for(sessions, exercise_id).map(|e| e.sets.as_slice())
}

/// Best performance for one exercise in one session
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub session_id: String,
    /// Session start, epoch millis
    pub date: i64,
    pub weight: f64,
    pub reps: u32,
    pub one_rep_max: i64,
}

/// One record per completed session that has completed sets for
/// `exercise_id`, oldest first
pub fn progress_records(sessions: &[WorkoutSession], exercise_id: &str) -> Vec<ProgressRecord> {
    let mut completed: Vec<&WorkoutSession> =
        sessions.iter().filter(|s| s.is_completed()).collect();
    completed.sort_by_key(|s| s.start_time);

    completed
        .into_iter()
        .filter_map(|session| {
            let entry = session.entry(exercise_id)?;
            let done: Vec<SetRecord> = entry.completed_sets().cloned().collect();
            let best = best_set(&done)?;

            Some(ProgressRecord {
                session_id: session.id.clone(),
                date: session.start_time,
                weight: best.weight,
                reps: best.reps,
                one_rep_max: one_rep_max(best),
            })
        })
        .collect()
}

/// The `n` records with the highest estimated one-rep max
///
/// Equal estimates keep their chronological order.
pub fn top_performances(records: &[ProgressRecord], n: usize) -> Vec<ProgressRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.one_rep_max.cmp(&a.one_rep_max));
    sorted.truncate(n);
    sorted
}

/// Highest estimated one-rep max across `records`, 0 without history
pub fn current_max(records: &[ProgressRecord]) -> i64 {
    records.iter().map(|r| r.one_rep_max).max().unwrap_or(0)
}
