use chrono::{Datelike, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use overload_core::stats::{self, TimeRange};
use overload_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "overload")]
#[command(about = "Progressive-overload workout log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new workout session
    Start {
        /// Session name
        #[arg(long)]
        name: Option<String>,

        /// Routine from the catalog (e.g. push_day)
        #[arg(long)]
        routine: Option<String>,
    },

    /// Plan the next sets for an exercise
    Plan {
        exercise: String,

        /// Write the planned sets into the active session
        #[arg(long)]
        seed: bool,
    },

    /// Log a performed set in the active session
    Log {
        exercise: String,

        /// Load in kilograms
        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,

        /// Reps in reserve
        #[arg(long)]
        rir: Option<u32>,
    },

    /// Complete the active session
    Finish,

    /// Discard the active session
    Cancel,

    /// Show the current training streak
    Streak,

    /// Best sets and estimated one-rep max for an exercise
    Stats {
        exercise: String,

        /// Number of top performances to show
        #[arg(long)]
        top: Option<usize>,
    },

    /// List completed sessions
    History {
        /// week, month, 3m, year or all
        #[arg(long, default_value = "month")]
        range: String,
    },

    /// Consistency calendar for a month
    Calendar {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Body-weight log
    Weight {
        #[command(subcommand)]
        action: WeightAction,
    },

    /// Export an exercise's progress as CSV
    Export {
        exercise: String,

        #[arg(long)]
        out: PathBuf,
    },

    /// List the exercise catalog
    Exercises,

    /// Manage custom muscle groups
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Rewrite the session log down to live sessions
    Compact,
}

#[derive(Subcommand)]
enum WeightAction {
    /// Record a body-weight measurement in kilograms
    Add {
        kg: f64,

        #[arg(long)]
        note: Option<String>,
    },
    /// List measurements, newest first
    List,
}

#[derive(Subcommand)]
enum CategoryAction {
    Add { name: String },
    List,
}

/// Files under the data directory
struct DataPaths {
    sessions: PathBuf,
    body_weight: PathBuf,
    settings: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        Self {
            sessions: data_dir.join("sessions.jsonl"),
            body_weight: data_dir.join("bodyweight.jsonl"),
            settings: data_dir.join("settings.json"),
        }
    }
}

fn main() -> Result<()> {
    overload_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;
    let paths = DataPaths::new(&data_dir);
    tracing::debug!("Using data directory {:?}", data_dir);

    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Catalog("Invalid catalog".into()));
    }

    let mut store = JsonlSessionStore::new(&paths.sessions);

    match cli.command {
        Commands::Start { name, routine } => cmd_start(&mut store, catalog, name, routine),
        Commands::Plan { exercise, seed } => cmd_plan(&mut store, catalog, &config, &exercise, seed),
        Commands::Log {
            exercise,
            weight,
            reps,
            rir,
        } => cmd_log(&mut store, catalog, &exercise, weight, reps, rir),
        Commands::Finish => cmd_finish(&mut store),
        Commands::Cancel => cmd_cancel(&mut store),
        Commands::Streak => cmd_streak(&store),
        Commands::Stats { exercise, top } => cmd_stats(&store, catalog, &config, &exercise, top),
        Commands::History { range } => cmd_history(&store, &config, &range),
        Commands::Calendar { month } => cmd_calendar(&store, month),
        Commands::Weight { action } => cmd_weight(&paths.body_weight, action),
        Commands::Export { exercise, out } => cmd_export(&store, catalog, &exercise, &out),
        Commands::Exercises => cmd_exercises(catalog),
        Commands::Category { action } => cmd_category(&paths.settings, catalog, action),
        Commands::Compact => {
            let count = store.compact()?;
            println!("✓ Compacted session log to {} sessions", count);
            Ok(())
        }
    }
}

fn require_active(store: &JsonlSessionStore) -> Result<WorkoutSession> {
    store
        .active()?
        .ok_or_else(|| Error::Session("No active session. Run `overload start` first.".into()))
}

fn cmd_start(
    store: &mut JsonlSessionStore,
    catalog: &Catalog,
    name: Option<String>,
    routine: Option<String>,
) -> Result<()> {
    let routine = routine.map(|id| catalog.routine(&id)).transpose()?;

    let name = name
        .or_else(|| routine.map(|r| r.name.clone()))
        .unwrap_or_else(|| "Workout".to_string());

    let mut session = WorkoutSession::start(name, Utc::now());
    if let Some(routine) = routine {
        session.routine_id = Some(routine.id.clone());
        for exercise_id in &routine.exercise_ids {
            session.entry_mut(exercise_id);
        }
    }

    store.begin(&session)?;
    tracing::info!("Started session {}", session.id);

    println!("✓ Started '{}'", session.name);
    println!("  ID: {}", session.id);
    for entry in &session.entries {
        println!("  → {}", entry.exercise_id);
    }
    Ok(())
}

fn cmd_plan(
    store: &mut JsonlSessionStore,
    catalog: &Catalog,
    config: &Config,
    exercise_id: &str,
    seed: bool,
) -> Result<()> {
    let definition = catalog.exercise(exercise_id)?;
    let target = SetTarget::from(definition);

    let sessions = store.all()?;
    let previous = previous_sets_for(&sessions, exercise_id);
    let outline = plan_outline(&config.planner, &target, previous);

    println!("\n{} ({} x {})", definition.name, target.sets, target.reps_range);
    println!();
    for planned in &outline {
        println!(
            "  Set {}: {} kg x {}  ({:?})",
            planned.set.set_number, planned.set.weight, planned.set.reps, planned.decision
        );
    }

    if seed {
        let mut active = require_active(store)?;
        let entry = active.entry_mut(exercise_id);
        if entry.sets.is_empty() {
            entry.sets = outline.into_iter().map(|p| p.set).collect();
            store.put(&active)?;
            println!("\n✓ Seeded {} sets into '{}'", target.sets, active.name);
        } else {
            println!("\n{} already has sets in '{}', not seeding", exercise_id, active.name);
        }
    }

    Ok(())
}

fn cmd_log(
    store: &mut JsonlSessionStore,
    catalog: &Catalog,
    exercise_id: &str,
    weight: f64,
    reps: u32,
    rir: Option<u32>,
) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(Error::Other(format!("Invalid weight: {}", weight)));
    }
    let definition = catalog.exercise(exercise_id)?;

    let mut active = require_active(store)?;
    let entry = active.entry_mut(exercise_id);
    let set = entry
        .record_set(weight, reps, rir, Utc::now().timestamp_millis())
        .clone();
    let best = summarize_best(&entry.completed_sets().cloned().collect::<Vec<_>>());
    store.put(&active)?;

    println!(
        "✓ {} set {}: {} kg x {} (est. 1RM {} kg)",
        definition.name,
        set.set_number,
        set.weight,
        set.reps,
        one_rep_max(&set)
    );
    if let Some(best) = best {
        println!(
            "  Best this session: {} kg x {} ({} kg)",
            best.weight, best.reps, best.one_rep_max
        );
    }
    Ok(())
}

fn cmd_finish(store: &mut JsonlSessionStore) -> Result<()> {
    let mut active = require_active(store)?;
    // Routine placeholders that were never logged would shadow older history
    active.entries.retain(|e| !e.sets.is_empty());
    active.complete(Utc::now());
    store.put(&active)?;

    println!("✓ Finished '{}'", active.name);
    println!("  Duration: {}", stats::format_duration(active.duration_seconds));
    println!("  Sets: {}", stats::completed_set_count(&active));
    println!("  Volume: {} kg", stats::session_volume(&active));

    let streak = compute_streak_now(&store.all()?);
    println!("  Streak: {} day(s)", streak.streak_days);
    Ok(())
}

fn cmd_cancel(store: &mut JsonlSessionStore) -> Result<()> {
    let active = require_active(store)?;
    store.delete(&active.id)?;
    println!("✓ Discarded '{}'", active.name);
    Ok(())
}

fn cmd_streak(store: &JsonlSessionStore) -> Result<()> {
    let streak = compute_streak_now(&store.all()?);

    println!("{} day(s) - {}", streak.streak_days, streak.tier().label());
    match streak.status() {
        StreakStatus::Broken => println!("  No current streak. Train today to start one."),
        StreakStatus::ActiveSafe => println!("  Trained today."),
        StreakStatus::ActiveAtRisk => println!("  At risk: train today to keep it going."),
        StreakStatus::AheadOfClock => {
            println!("  Latest session is dated after today; check the system clock.")
        }
    }
    Ok(())
}

fn cmd_stats(
    store: &JsonlSessionStore,
    catalog: &Catalog,
    config: &Config,
    exercise_id: &str,
    top: Option<usize>,
) -> Result<()> {
    let definition = catalog.exercise(exercise_id)?;
    let sessions = store.recent(config.history.session_limit)?;
    let records = progress_records(&sessions, exercise_id);

    println!("\n{}", definition.name);
    if records.is_empty() {
        println!("  No completed sets yet.");
        return Ok(());
    }

    println!("  Current max (est. 1RM): {} kg", history::current_max(&records));
    println!("  Sessions: {}", records.len());
    println!();
    println!("  Top performances:");

    let n = top.unwrap_or(config.history.top_performances);
    for record in history::top_performances(&records, n) {
        let day = streak::local_day(record.date, &Local)
            .map(|d| d.to_string())
            .unwrap_or_default();
        println!(
            "    {}  {} kg x {}  → {} kg",
            day, record.weight, record.reps, record.one_rep_max
        );
    }
    Ok(())
}

fn cmd_history(store: &JsonlSessionStore, config: &Config, range: &str) -> Result<()> {
    let range: TimeRange = range.parse()?;
    let now = Local::now();

    let sessions = store.by_state(SessionState::Completed)?;
    let mut in_range = stats::filter_by_range(&sessions, range, &now);
    in_range.truncate(config.history.session_limit);

    if in_range.is_empty() {
        println!("No sessions in range.");
        return Ok(());
    }

    for summary in in_range.iter().copied().map(stats::SessionSummary::from) {
        let day = streak::local_day(summary.start_time, &Local)
            .map(|d| d.to_string())
            .unwrap_or_default();
        println!(
            "{}  {:<20} {:>10}  {} sets  {} kg",
            day,
            summary.name,
            stats::format_duration(summary.duration_seconds),
            summary.completed_sets,
            summary.volume
        );
    }

    let total: u64 = stats::daily_durations(in_range.iter().copied(), &Local)
        .iter()
        .map(|d| d.minutes)
        .sum();
    println!();
    println!("Total: {} min across {} sessions", total, in_range.len());
    Ok(())
}

fn cmd_calendar(store: &JsonlSessionStore, month: Option<String>) -> Result<()> {
    let today = Local::now().date_naive();
    let (year, month) = match month {
        Some(m) => {
            let first = NaiveDate::parse_from_str(&format!("{}-01", m), "%Y-%m-%d")
                .map_err(|e| Error::Other(format!("Invalid month '{}': {}", m, e)))?;
            (first.year(), first.month())
        }
        None => (today.year(), today.month()),
    };

    let sessions = store.all()?;
    let days = stats::month_intensity(&sessions, year, month, &Local);

    println!("{}-{:02}", year, month);
    println!("Mo Tu We Th Fr Sa Su");

    let offset = days
        .first()
        .map_or(0, |(d, _)| d.weekday().num_days_from_monday() as usize);
    let mut line = "   ".repeat(offset);
    for (day, intensity) in days {
        let cell = match intensity {
            0 => " .",
            1 => " ░",
            2 => " ▒",
            _ => " █",
        };
        line.push_str(cell);
        line.push(' ');
        if day.weekday().num_days_from_monday() == 6 {
            println!("{}", line.trim_end());
            line.clear();
        }
    }
    if !line.is_empty() {
        println!("{}", line.trim_end());
    }
    Ok(())
}

fn cmd_weight(path: &Path, action: WeightAction) -> Result<()> {
    let mut log = BodyWeightLog::new(path);

    match action {
        WeightAction::Add { kg, note } => {
            if !kg.is_finite() || kg <= 0.0 {
                return Err(Error::Other(format!("Invalid body weight: {}", kg)));
            }
            let record = log.add(BodyWeightRecord {
                id: None,
                date: Utc::now().timestamp_millis(),
                weight: kg,
                note,
            })?;
            println!("✓ Logged {} kg", record.weight);
        }
        WeightAction::List => {
            let records = log.list()?;
            if records.is_empty() {
                println!("No body-weight records.");
                return Ok(());
            }
            for record in &records {
                let day = streak::local_day(record.date, &Local)
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                match &record.note {
                    Some(note) => println!("{}  {} kg  {}", day, record.weight, note),
                    None => println!("{}  {} kg", day, record.weight),
                }
            }
            if let Some(change) = stats::weight_change(&records) {
                println!();
                println!("Change: {:+.1} kg", change);
            }
        }
    }
    Ok(())
}

fn cmd_export(
    store: &JsonlSessionStore,
    catalog: &Catalog,
    exercise_id: &str,
    out: &Path,
) -> Result<()> {
    catalog.exercise(exercise_id)?;
    let records = progress_records(&store.all()?, exercise_id);
    let count = export_progress_csv(&records, out, &Local)?;

    println!("✓ Exported {} records", count);
    println!("  CSV: {}", out.display());
    Ok(())
}

fn cmd_exercises(catalog: &Catalog) -> Result<()> {
    for (group, definitions) in catalog.by_muscle_group() {
        println!("{}", group);
        for def in definitions {
            println!(
                "  {:<16} {:<24} {} x {}",
                def.id, def.name, def.target_sets, def.target_reps_range
            );
        }
    }
    Ok(())
}

fn cmd_category(path: &Path, catalog: &Catalog, action: CategoryAction) -> Result<()> {
    match action {
        CategoryAction::Add { name } => {
            let mut added = false;
            UserSettings::update(path, |settings| {
                added = settings.add_category(&name);
                Ok(())
            })?;
            if added {
                println!("✓ Added category '{}'", name.trim());
            } else {
                println!("Category '{}' already exists", name.trim());
            }
        }
        CategoryAction::List => {
            let settings = UserSettings::load(path)?;
            for group in catalog.muscle_groups(&settings.custom_categories) {
                println!("{}", group);
            }
        }
    }
    Ok(())
}
