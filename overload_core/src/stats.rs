//! Session statistics for history and consistency views.

use crate::streak::local_day;
use crate::{BodyWeightRecord, WorkoutSession};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;

/// Total load moved in a session: sum of `weight * reps` over completed sets
pub fn session_volume(session: &WorkoutSession) -> f64 {
    session
        .entries
        .iter()
        .flat_map(|e| e.completed_sets())
        .map(|s| s.weight * s.reps as f64)
        .sum()
}

/// Number of completed sets across all entries
pub fn completed_set_count(session: &WorkoutSession) -> usize {
    session.entries.iter().map(|e| e.completed_sets().count()).sum()
}

/// Per-session totals shown in history lists
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub name: String,
    pub start_time: i64,
    pub duration_seconds: u64,
    pub exercise_count: usize,
    pub completed_sets: usize,
    pub volume: f64,
}

impl From<&WorkoutSession> for SessionSummary {
    fn from(session: &WorkoutSession) -> Self {
        Self {
            session_id: session.id.clone(),
            name: session.name.clone(),
            start_time: session.start_time,
            duration_seconds: session.duration_seconds,
            exercise_count: session.entries.len(),
            completed_sets: completed_set_count(session),
            volume: session_volume(session),
        }
    }
}

/// History window relative to now
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeRange {
    Week,
    Month,
    ThreeMonths,
    Year,
    All,
}

impl std::str::FromStr for TimeRange {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" | "1w" => Ok(TimeRange::Week),
            "month" | "1m" => Ok(TimeRange::Month),
            "3m" | "quarter" => Ok(TimeRange::ThreeMonths),
            "year" | "1y" => Ok(TimeRange::Year),
            "all" => Ok(TimeRange::All),
            other => Err(crate::Error::Other(format!("Unknown time range: {}", other))),
        }
    }
}

impl TimeRange {
    /// Earliest start time (epoch millis) inside the window, `None` for `All`
    ///
    /// The week is a rolling seven days. Month-based windows start at local
    /// midnight of the same calendar date that many months back, clamped to
    /// the end of shorter months.
    pub fn cutoff<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<i64> {
        let months = match self {
            TimeRange::All => return None,
            TimeRange::Week => {
                return Some((now.clone() - Duration::days(7)).timestamp_millis());
            }
            TimeRange::Month => 1,
            TimeRange::ThreeMonths => 3,
            TimeRange::Year => 12,
        };

        let date = now.date_naive().checked_sub_months(Months::new(months))?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        now.timezone()
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.timestamp_millis())
    }
}

/// Sessions that started inside `range`
pub fn filter_by_range<'a, Tz: TimeZone>(
    sessions: &'a [WorkoutSession],
    range: TimeRange,
    now: &DateTime<Tz>,
) -> Vec<&'a WorkoutSession> {
    let cutoff = range.cutoff(now);
    sessions
        .iter()
        .filter(|s| cutoff.map_or(true, |c| s.start_time >= c))
        .collect()
}

/// Training time on one calendar day
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDuration {
    pub date: NaiveDate,
    pub duration_seconds: u64,
    pub minutes: u64,
}

/// Completed training time grouped by local day, oldest first
pub fn daily_durations<'a, Tz, I>(sessions: I, tz: &Tz) -> Vec<DailyDuration>
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'a WorkoutSession>,
{
    let mut by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for session in sessions.into_iter().filter(|s| s.is_completed()) {
        if let Some(day) = local_day(session.start_time, tz) {
            *by_day.entry(day).or_default() += session.duration_seconds;
        }
    }

    by_day
        .into_iter()
        .map(|(date, duration_seconds)| DailyDuration {
            date,
            duration_seconds,
            minutes: round_minutes(duration_seconds),
        })
        .collect()
}

/// Consistency calendar shade for one day
///
/// 0 without a completed session, then 1 up to 30 minutes, 2 up to an hour
/// and 3 beyond.
pub fn day_intensity<Tz: TimeZone>(sessions: &[WorkoutSession], date: NaiveDate, tz: &Tz) -> u8 {
    let mut found = false;
    let mut seconds = 0u64;
    for session in sessions.iter().filter(|s| s.is_completed()) {
        if local_day(session.start_time, tz) == Some(date) {
            found = true;
            seconds += session.duration_seconds;
        }
    }

    match (found, seconds) {
        (false, _) => 0,
        (true, s) if s > 3600 => 3,
        (true, s) if s > 1800 => 2,
        _ => 1,
    }
}

/// Intensity for every day of a month, first day first
pub fn month_intensity<Tz: TimeZone>(
    sessions: &[WorkoutSession],
    year: i32,
    month: u32,
    tz: &Tz,
) -> Vec<(NaiveDate, u8)> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|d| (d, day_intensity(sessions, d, tz)))
        .collect()
}

/// Change between the earliest and latest body-weight records
///
/// `None` when there are no records or either end has no weight.
pub fn weight_change(records: &[BodyWeightRecord]) -> Option<f64> {
    let earliest = records.iter().min_by_key(|r| r.date)?;
    let latest = records.iter().max_by_key(|r| r.date)?;

    if earliest.weight == 0.0 || latest.weight == 0.0 {
        return None;
    }
    Some(latest.weight - earliest.weight)
}

fn round_minutes(seconds: u64) -> u64 {
    (seconds + 30) / 60
}

/// Human-readable duration: `"45 min"` or `"1 h 20 min"`
pub fn format_duration(seconds: u64) -> String {
    if seconds < 3600 {
        return format!("{} min", round_minutes(seconds));
    }

    let mut hours = seconds / 3600;
    let mut minutes = round_minutes(seconds % 3600);
    // 59.5+ minutes rounds to 60 and carries into the hour: 7170 s is "2 h 0 min"
    if minutes == 60 {
        hours += 1;
        minutes = 0;
    }
    format!("{} h {} min", hours, minutes)
}
