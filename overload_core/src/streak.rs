//! Workout streak tracking on local calendar days.
//!
//! A streak counts consecutive calendar days with at least one completed
//! session, ending at the most recent training day. Days are taken in the
//! timezone of the supplied "now", so a session at 23:30 and one at 00:15
//! the next morning are two different days even though they are 45 minutes
//! apart.
//!
//! States:
//! - Broken: last training day is before yesterday
//! - Active (safe): trained today
//! - Active (at risk): trained yesterday, not yet today
//! - Ahead of clock: the latest session falls on a day after today, which
//!   happens after a timezone change or a clock correction

use crate::{StreakState, WorkoutSession};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::Serialize;

/// Logical streak state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakStatus {
    Broken,
    ActiveSafe,
    ActiveAtRisk,
    AheadOfClock,
}

/// Display tier for a streak length
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTier {
    None,
    Active,
    OnFire,
    Legendary,
}

impl StreakTier {
    pub fn for_days(days: u32) -> Self {
        match days {
            0 => StreakTier::None,
            1..=6 => StreakTier::Active,
            7..=29 => StreakTier::OnFire,
            _ => StreakTier::Legendary,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StreakTier::None => "No streak",
            StreakTier::Active => "Active streak",
            StreakTier::OnFire => "On fire!",
            StreakTier::Legendary => "Legendary streak",
        }
    }
}

impl StreakState {
    fn broken() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StreakStatus {
        if self.streak_days == 0 {
            StreakStatus::Broken
        } else if self.trained_today {
            StreakStatus::ActiveSafe
        } else if self.is_at_risk {
            StreakStatus::ActiveAtRisk
        } else {
            // Only reachable when the latest day is after today
            StreakStatus::AheadOfClock
        }
    }

    pub fn tier(&self) -> StreakTier {
        StreakTier::for_days(self.streak_days)
    }
}

/// Calendar day of an epoch-millis timestamp in `tz`
pub fn local_day<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(tz).date_naive())
}

/// Compute the streak as of `now`
///
/// Only completed sessions count. Several sessions on one day count once.
/// Never reads the clock; days are computed in `now`'s timezone.
pub fn compute_streak<Tz: TimeZone>(sessions: &[WorkoutSession], now: &DateTime<Tz>) -> StreakState {
    let tz = now.timezone();

    let mut days: Vec<NaiveDate> = sessions
        .iter()
        .filter(|s| s.is_completed())
        .filter_map(|s| local_day(s.start_time, &tz))
        .collect();

    if days.is_empty() {
        return StreakState::broken();
    }

    // Newest first
    days.sort_unstable_by(|a, b| b.cmp(a));

    let last_day = days[0];
    let today = now.date_naive();
    let diff_days = today.signed_duration_since(last_day).num_days();

    if diff_days > 1 {
        tracing::debug!("Streak broken: last session {} days ago", diff_days);
        return StreakState::broken();
    }

    let mut streak_days = 1;
    let mut current_day = last_day;

    for &day in &days[1..] {
        if day == current_day {
            continue;
        }
        if current_day.signed_duration_since(day).num_days() == 1 {
            streak_days += 1;
            current_day = day;
        } else {
            break;
        }
    }

    let state = StreakState {
        streak_days,
        trained_today: diff_days == 0,
        is_at_risk: diff_days == 1,
    };

    tracing::debug!("Computed streak: {:?}", state);
    state
}

/// Compute the streak against the wall clock in the local timezone
pub fn compute_streak_now(sessions: &[WorkoutSession]) -> StreakState {
    compute_streak(sessions, &Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionState;
    use chrono::FixedOffset;

    fn tz() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn session_at(when: DateTime<FixedOffset>) -> WorkoutSession {
        let mut session = WorkoutSession::start("Session", when.to_utc());
        session.complete(when.to_utc() + chrono::Duration::minutes(50));
        session
    }

    #[test]
    fn test_empty_history() {
        let state = compute_streak(&[], &at(2024, 5, 10, 12, 0));
        assert_eq!(state, StreakState::default());
        assert_eq!(state.status(), StreakStatus::Broken);
    }

    #[test]
    fn test_same_day_sessions_collapse() {
        let sessions = vec![session_at(at(2024, 5, 10, 7, 0)), session_at(at(2024, 5, 10, 18, 0))];
        let state = compute_streak(&sessions, &at(2024, 5, 10, 21, 0));

        assert_eq!(state.streak_days, 1);
        assert!(state.trained_today);
        assert!(!state.is_at_risk);
        assert_eq!(state.status(), StreakStatus::ActiveSafe);
    }

    #[test]
    fn test_consecutive_days() {
        let sessions = vec![
            session_at(at(2024, 5, 8, 7, 0)),
            session_at(at(2024, 5, 10, 7, 0)),
            session_at(at(2024, 5, 9, 19, 0)),
            session_at(at(2024, 5, 9, 6, 0)),
        ];
        let state = compute_streak(&sessions, &at(2024, 5, 10, 8, 0));
        assert_eq!(state.streak_days, 3);
        assert!(state.trained_today);
    }

    #[test]
    fn test_at_risk_when_trained_yesterday() {
        let sessions = vec![session_at(at(2024, 5, 9, 23, 30)), session_at(at(2024, 5, 8, 12, 0))];
        let state = compute_streak(&sessions, &at(2024, 5, 10, 0, 15));

        assert_eq!(state.streak_days, 2);
        assert!(!state.trained_today);
        assert!(state.is_at_risk);
        assert_eq!(state.status(), StreakStatus::ActiveAtRisk);
    }

    #[test]
    fn test_gap_stops_walk() {
        // day 0 = May 10, day 3 = May 13; now is day 3
        let sessions = vec![session_at(at(2024, 5, 10, 9, 0)), session_at(at(2024, 5, 13, 9, 0))];
        let state = compute_streak(&sessions, &at(2024, 5, 13, 20, 0));
        assert_eq!(state.streak_days, 1);
        assert!(state.trained_today);
    }

    #[test]
    fn test_broken_when_last_session_too_old() {
        let sessions = vec![session_at(at(2024, 5, 10, 9, 0)), session_at(at(2024, 5, 13, 9, 0))];
        // now is day 5
        let state = compute_streak(&sessions, &at(2024, 5, 15, 9, 0));
        assert_eq!(state, StreakState { streak_days: 0, trained_today: false, is_at_risk: false });
    }

    #[test]
    fn test_calendar_days_not_rolling_window() {
        // 47 hours apart but on consecutive calendar days
        let sessions = vec![session_at(at(2024, 5, 9, 0, 30))];
        let state = compute_streak(&sessions, &at(2024, 5, 10, 23, 30));
        assert!(state.is_at_risk);
        assert_eq!(state.streak_days, 1);

        // 2 hours apart but two calendar days back
        let sessions = vec![session_at(at(2024, 5, 8, 23, 0))];
        let state = compute_streak(&sessions, &at(2024, 5, 10, 1, 0));
        assert_eq!(state.streak_days, 0);
    }

    #[test]
    fn test_days_follow_the_timezone_of_now() {
        // 03:00 UTC on May 10 is still May 9 at UTC-5
        let utc = chrono::Utc.with_ymd_and_hms(2024, 5, 10, 3, 0, 0).unwrap();
        let mut session = WorkoutSession::start("Late", utc);
        session.complete(utc);

        let now_local = at(2024, 5, 10, 12, 0);
        let local = compute_streak(std::slice::from_ref(&session), &now_local);
        assert!(local.is_at_risk);

        let now_utc = now_local.to_utc();
        let in_utc = compute_streak(std::slice::from_ref(&session), &now_utc);
        assert!(in_utc.trained_today);
    }

    #[test]
    fn test_future_dated_session_is_not_trained_today() {
        let sessions = vec![session_at(at(2024, 5, 11, 9, 0)), session_at(at(2024, 5, 10, 7, 0))];
        let state = compute_streak(&sessions, &at(2024, 5, 10, 12, 0));

        assert_eq!(state.streak_days, 2);
        assert!(!state.trained_today);
        assert!(!state.is_at_risk);
        assert_eq!(state.status(), StreakStatus::AheadOfClock);

        let single = compute_streak(&sessions[..1], &at(2024, 5, 10, 12, 0));
        assert_eq!(single.streak_days, 1);
        assert_eq!(single.status(), StreakStatus::AheadOfClock);
    }

    #[test]
    fn test_active_sessions_ignored() {
        let mut active = session_at(at(2024, 5, 10, 9, 0));
        active.state = SessionState::Active;
        let state = compute_streak(&[active], &at(2024, 5, 10, 10, 0));
        assert_eq!(state.streak_days, 0);
    }

    #[test]
    fn test_idempotent() {
        let sessions = vec![session_at(at(2024, 5, 9, 9, 0)), session_at(at(2024, 5, 10, 9, 0))];
        let now = at(2024, 5, 10, 10, 0);
        assert_eq!(compute_streak(&sessions, &now), compute_streak(&sessions, &now));
    }

    #[test]
    fn test_tiers() {
        assert_eq!(StreakTier::for_days(0), StreakTier::None);
        assert_eq!(StreakTier::for_days(1), StreakTier::Active);
        assert_eq!(StreakTier::for_days(6), StreakTier::Active);
        assert_eq!(StreakTier::for_days(7), StreakTier::OnFire);
        assert_eq!(StreakTier::for_days(29), StreakTier::OnFire);
        assert_eq!(StreakTier::for_days(30), StreakTier::Legendary);
    }
}
