#![forbid(unsafe_code)]

//! Core domain model and business logic for the Overload workout log.
//!
//! This crate provides:
//! - Domain types (sessions, exercise entries, sets, body weight)
//! - One-rep-max estimation and best-set selection
//! - The progressive-overload set planner
//! - Streak tracking on local calendar days
//! - History and stats queries over the session log
//! - Persistence (JSONL session store, settings, CSV export)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod one_rep_max;
pub mod progression;
pub mod streak;
pub mod history;
pub mod stats;
pub mod store;
pub mod settings;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use config::Config;
pub use one_rep_max::{best_set, one_rep_max, summarize_best, BestSetSummary};
pub use progression::{plan_next_sets, plan_next_sets_with, plan_outline, PlannedSet, SetDecision, SetTarget};
pub use streak::{compute_streak, compute_streak_now, StreakStatus, StreakTier};
pub use history::{previous_sets_for, progress_records, ProgressRecord};
pub use store::{BodyWeightLog, JsonlSessionStore, SessionStore};
pub use settings::UserSettings;
pub use export::export_progress_csv;
