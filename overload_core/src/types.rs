//! Core domain types for the lift log.
//!
//! This module defines the records shared by the planner, the streak
//! tracker and the storage adapters:
//! - Sets, exercise entries and workout sessions
//! - Exercise definitions and routines
//! - Body-weight records
//! - Derived values (rep ranges, streak state)
//!
//! Field names serialize as camelCase so session documents written by other
//! clients of the same store deserialize unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Set / Entry / Session
// ============================================================================

/// One performed (or planned) set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
    /// 1-based ordinal within the exercise entry (may have gaps)
    pub set_number: u32,
    /// Load in kilograms
    pub weight: f64,
    pub reps: u32,
    /// Epoch millis, 0 while the set is still only planned
    #[serde(default)]
    pub completed_at: i64,
    /// Reps in reserve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rir: Option<u32>,
    #[serde(default)]
    pub is_completed: bool,
}

impl SetRecord {
    /// A planned set that has not been performed yet
    pub fn planned(set_number: u32, weight: f64, reps: u32) -> Self {
        Self {
            set_number,
            weight,
            reps,
            completed_at: 0,
            rir: None,
            is_completed: false,
        }
    }

    /// A set performed at `completed_at` (epoch millis)
    pub fn performed(set_number: u32, weight: f64, reps: u32, completed_at: i64) -> Self {
        Self {
            set_number,
            weight,
            reps,
            completed_at,
            rir: None,
            is_completed: true,
        }
    }
}

/// All sets logged for one exercise within one session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    pub exercise_id: String,
    #[serde(default)]
    pub sets: Vec<SetRecord>,
}

impl ExerciseEntry {
    pub fn new(exercise_id: impl Into<String>) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            sets: Vec::new(),
        }
    }

    /// Sets that were actually performed
    pub fn completed_sets(&self) -> impl Iterator<Item = &SetRecord> {
        self.sets.iter().filter(|s| s.is_completed)
    }

    /// Record a performed set
    ///
    /// Fills the first planned (not yet completed) set if there is one,
    /// otherwise appends a new set numbered after the last.
    pub fn record_set(&mut self, weight: f64, reps: u32, rir: Option<u32>, at: i64) -> &SetRecord {
        let idx = match self.sets.iter().position(|s| !s.is_completed) {
            Some(idx) => idx,
            None => {
                let next = self.sets.last().map_or(1, |s| s.set_number + 1);
                self.sets.push(SetRecord::planned(next, weight, reps));
                self.sets.len() - 1
            }
        };

        let set = &mut self.sets[idx];
        set.weight = weight;
        set.reps = reps;
        set.rir = rir;
        set.completed_at = at;
        set.is_completed = true;
        set
    }
}

/// Lifecycle state of a workout session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Completed,
}

/// One training occasion
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routine_id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Epoch millis; authoritative for streaks and date grouping
    pub start_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub duration_seconds: u64,
    pub state: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub entries: Vec<ExerciseEntry>,
}

impl WorkoutSession {
    /// Start a new active session at `start`
    pub fn start(name: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            routine_id: None,
            name: name.into(),
            start_time: start.timestamp_millis(),
            end_time: None,
            duration_seconds: 0,
            state: SessionState::Active,
            notes: None,
            entries: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// First entry logged for `exercise_id`
    pub fn entry(&self, exercise_id: &str) -> Option<&ExerciseEntry> {
        self.entries.iter().find(|e| e.exercise_id == exercise_id)
    }

    /// Entry for `exercise_id`, appended empty if the session has none yet
    pub fn entry_mut(&mut self, exercise_id: &str) -> &mut ExerciseEntry {
        let idx = match self.entries.iter().position(|e| e.exercise_id == exercise_id) {
            Some(idx) => idx,
            None => {
                self.entries.push(ExerciseEntry::new(exercise_id));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx]
    }

    /// Transition an active session to completed
    ///
    /// Sets `end_time` and the final duration. Completing a session twice is
    /// a no-op so history stays immutable.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        if self.is_completed() {
            tracing::debug!("Session {} already completed", self.id);
            return;
        }

        let end = now.timestamp_millis();
        self.end_time = Some(end);
        self.duration_seconds = ((end - self.start_time).max(0) / 1000) as u64;
        self.state = SessionState::Completed;
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Equipment needed for an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    Barbell,
    Dumbbell,
    Machine,
    Bodyweight,
    Cable,
}

/// Target prescription for an exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    pub muscle_group: String,
    pub equipment_type: EquipmentType,
    pub default_rest_seconds: u32,
    pub target_sets: u32,
    /// `"<min>-<max>"` or a bare integer
    pub target_reps_range: String,
}

/// Ordered list of exercises performed together
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub exercise_ids: Vec<String>,
}

/// A single body-weight measurement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BodyWeightRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Epoch millis
    pub date: i64,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ============================================================================
// Derived Values
// ============================================================================

/// Parsed target rep range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepRange {
    pub min: u32,
    pub max: u32,
}

/// Current streak as seen from a given "now"
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub streak_days: u32,
    pub trained_today: bool,
    pub is_at_risk: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_session_deserializes_document_shape() {
        let json = r#"{
            "id": "abc",
            "name": "Push",
            "startTime": 1700000000000,
            "durationSeconds": 0,
            "state": "active",
            "entries": [
                {"exerciseId": "bench", "sets": [
                    {"setNumber": 1, "weight": 60, "reps": 10, "completedAt": 0, "isCompleted": false}
                ]}
            ]
        }"#;

        let session: WorkoutSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.state, SessionState::Active);
        assert_eq!(session.entries[0].sets[0].weight, 60.0);
        assert!(session.end_time.is_none());
    }

    #[test]
    fn test_complete_sets_end_time_and_duration() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();
        let mut session = WorkoutSession::start("Legs", start);

        session.complete(start + Duration::minutes(45));

        assert!(session.is_completed());
        assert_eq!(session.duration_seconds, 45 * 60);
        assert_eq!(
            session.end_time,
            Some((start + Duration::minutes(45)).timestamp_millis())
        );
    }

    #[test]
    fn test_complete_is_idempotent() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();
        let mut session = WorkoutSession::start("Legs", start);
        session.complete(start + Duration::minutes(30));
        session.complete(start + Duration::minutes(90));

        assert_eq!(session.duration_seconds, 30 * 60);
    }

    #[test]
    fn test_entry_mut_creates_once() {
        let mut session = WorkoutSession::start("Pull", Utc::now());
        session.entry_mut("row").sets.push(SetRecord::performed(1, 50.0, 10, 1));
        session.entry_mut("row").sets.push(SetRecord::performed(2, 50.0, 9, 2));

        assert_eq!(session.entries.len(), 1);
        assert_eq!(session.entry("row").unwrap().sets.len(), 2);
    }

    #[test]
    fn test_record_set_fills_planned_then_appends() {
        let mut entry = ExerciseEntry::new("bench");
        entry.sets = vec![SetRecord::planned(1, 60.0, 10), SetRecord::planned(2, 60.0, 10)];

        let first = entry.record_set(60.0, 9, Some(1), 100).clone();
        assert_eq!(first.set_number, 1);
        assert!(first.is_completed);
        assert_eq!(first.rir, Some(1));

        entry.record_set(60.0, 8, None, 200);
        let third = entry.record_set(55.0, 10, None, 300).clone();

        assert_eq!(entry.sets.len(), 3);
        assert_eq!(third.set_number, 3);
        assert_eq!(entry.completed_sets().count(), 3);
    }
}
