//! File-backed session and body-weight storage.
//!
//! Records are appended to JSONL (JSON Lines) files, so concurrent CLI
//! invocations never interleave partial lines. Updates and deletes are
//! appended too; reading folds the log so the last record for an ID wins.
//! `compact` rewrites a log down to its live records through a temp file and
//! an atomic rename.
//!
//! Locks are taken on a `<log>.lock` file next to each log rather than on the
//! log itself. The rename in `compact` replaces the log's inode, and a writer
//! blocked on the old inode would otherwise append to an unlinked file.

use crate::{BodyWeightRecord, Error, Result, SessionState, WorkoutSession};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage for workout sessions
///
/// Implementations only persist; the single-active-session rule lives in
/// [`SessionStore::begin`].
pub trait SessionStore {
    /// Insert or replace a session by ID
    fn put(&mut self, session: &WorkoutSession) -> Result<()>;

    /// Remove a session; returns whether it existed
    fn delete(&mut self, id: &str) -> Result<bool>;

    /// All live sessions in insertion order
    fn all(&self) -> Result<Vec<WorkoutSession>>;

    fn get(&self, id: &str) -> Result<Option<WorkoutSession>> {
        Ok(self.all()?.into_iter().find(|s| s.id == id))
    }

    /// Sessions in `state`, newest start first
    fn by_state(&self, state: SessionState) -> Result<Vec<WorkoutSession>> {
        let mut sessions: Vec<_> = self.all()?.into_iter().filter(|s| s.state == state).collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(sessions)
    }

    /// Up to `limit` sessions, newest start first
    fn recent(&self, limit: usize) -> Result<Vec<WorkoutSession>> {
        let mut sessions = self.all()?;
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        sessions.truncate(limit);
        Ok(sessions)
    }

    /// The active session, if any
    fn active(&self) -> Result<Option<WorkoutSession>> {
        Ok(self.by_state(SessionState::Active)?.into_iter().next())
    }

    /// Store a new active session, refusing a second one
    fn begin(&mut self, session: &WorkoutSession) -> Result<()> {
        if session.state != SessionState::Active {
            return Err(Error::Session(format!(
                "Session {} is not active",
                session.id
            )));
        }
        if let Some(existing) = self.active()? {
            return Err(Error::Session(format!(
                "Session '{}' ({}) is already active",
                existing.name, existing.id
            )));
        }
        self.put(session)
    }
}

/// One line of the session log
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum SessionLogRecord {
    Put { session: WorkoutSession },
    Delete { id: String },
}

/// JSONL-based session store with file locking
pub struct JsonlSessionStore {
    path: PathBuf,
}

impl JsonlSessionStore {
    /// Create a new store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the log with one record per live session
    ///
    /// Holds the exclusive lock from the read through the rename, so appends
    /// from other processes wait and land in the new file.
    pub fn compact(&mut self) -> Result<usize> {
        let _lock = LogLock::exclusive(&self.path)?;

        let records: Vec<SessionLogRecord> = fold_sessions(read_unlocked(&self.path)?)
            .into_iter()
            .map(|session| SessionLogRecord::Put { session })
            .collect();
        rewrite_lines(&self.path, &records)?;

        tracing::info!("Compacted session log to {} records", records.len());
        Ok(records.len())
    }
}

/// Live sessions after replaying `records` in order
fn fold_sessions(records: Vec<SessionLogRecord>) -> Vec<WorkoutSession> {
    let mut order: Vec<String> = Vec::new();
    let mut live: HashMap<String, WorkoutSession> = HashMap::new();

    for record in records {
        match record {
            SessionLogRecord::Put { session } => {
                if !live.contains_key(&session.id) {
                    order.push(session.id.clone());
                }
                live.insert(session.id.clone(), session);
            }
            SessionLogRecord::Delete { id } => {
                live.remove(&id);
                order.retain(|o| o != &id);
            }
        }
    }

    order.into_iter().filter_map(|id| live.remove(&id)).collect()
}

impl SessionStore for JsonlSessionStore {
    fn put(&mut self, session: &WorkoutSession) -> Result<()> {
        append_line(
            &self.path,
            &SessionLogRecord::Put {
                session: session.clone(),
            },
        )?;
        tracing::debug!("Stored session {} ({:?})", session.id, session.state);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool> {
        if self.get(id)?.is_none() {
            return Ok(false);
        }
        append_line(&self.path, &SessionLogRecord::Delete { id: id.to_string() })?;
        tracing::debug!("Deleted session {}", id);
        Ok(true)
    }

    fn all(&self) -> Result<Vec<WorkoutSession>> {
        Ok(fold_sessions(read_lines(&self.path)?))
    }

    /// Check for an active session and append under one exclusive lock
    fn begin(&mut self, session: &WorkoutSession) -> Result<()> {
        if session.state != SessionState::Active {
            return Err(Error::Session(format!(
                "Session {} is not active",
                session.id
            )));
        }

        let _lock = LogLock::exclusive(&self.path)?;

        let existing = fold_sessions(read_unlocked(&self.path)?)
            .into_iter()
            .find(|s| s.state == SessionState::Active);
        if let Some(existing) = existing {
            return Err(Error::Session(format!(
                "Session '{}' ({}) is already active",
                existing.name, existing.id
            )));
        }

        append_unlocked(
            &self.path,
            &SessionLogRecord::Put {
                session: session.clone(),
            },
        )?;
        tracing::debug!("Began session {}", session.id);
        Ok(())
    }
}

/// One line of the body-weight log
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum WeightLogRecord {
    Add { record: BodyWeightRecord },
    Delete { id: String },
}

/// JSONL-based body-weight log
pub struct BodyWeightLog {
    path: PathBuf,
}

impl BodyWeightLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append a measurement, assigning an ID when it has none
    pub fn add(&mut self, mut record: BodyWeightRecord) -> Result<BodyWeightRecord> {
        if record.id.is_none() {
            record.id = Some(uuid::Uuid::new_v4().to_string());
        }
        append_line(
            &self.path,
            &WeightLogRecord::Add {
                record: record.clone(),
            },
        )?;
        tracing::debug!("Logged body weight {} kg", record.weight);
        Ok(record)
    }

    pub fn delete(&mut self, id: &str) -> Result<bool> {
        if !self.list()?.iter().any(|r| r.id.as_deref() == Some(id)) {
            return Ok(false);
        }
        append_line(&self.path, &WeightLogRecord::Delete { id: id.to_string() })?;
        Ok(true)
    }

    /// All measurements, newest first
    pub fn list(&self) -> Result<Vec<BodyWeightRecord>> {
        let mut records: Vec<BodyWeightRecord> = Vec::new();
        for line in read_lines::<WeightLogRecord>(&self.path)? {
            match line {
                WeightLogRecord::Add { record } => records.push(record),
                WeightLogRecord::Delete { id } => {
                    records.retain(|r| r.id.as_deref() != Some(id.as_str()))
                }
            }
        }
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }
}

/// Advisory lock on the sidecar `<log>.lock` file, released on drop
struct LogLock {
    file: File,
}

impl LogLock {
    fn open(log_path: &Path) -> Result<File> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut lock_path = log_path.as_os_str().to_owned();
        lock_path.push(".lock");

        Ok(OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(PathBuf::from(lock_path))?)
    }

    fn exclusive(log_path: &Path) -> Result<Self> {
        let file = Self::open(log_path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }

    fn shared(log_path: &Path) -> Result<Self> {
        let file = Self::open(log_path)?;
        file.lock_shared()?;
        Ok(Self { file })
    }
}

impl Drop for LogLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release log lock: {}", e);
        }
    }
}

/// Append one JSON line under an exclusive lock
fn append_line<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let _lock = LogLock::exclusive(path)?;
    append_unlocked(path, record)
}

/// Append one JSON line; the caller holds the exclusive lock
fn append_unlocked<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;

    // A torn final line must not swallow the next record
    let torn = ends_mid_line(&mut file)?;

    let mut writer = std::io::BufWriter::new(&file);
    if torn {
        tracing::warn!("Log {:?} ends mid-record, starting a new line", path);
        writer.write_all(b"\n")?;
    }
    let line = serde_json::to_string(record)?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn ends_mid_line(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Read every parseable line under a shared lock
///
/// Missing files read as empty.
fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let _lock = LogLock::shared(path)?;
    read_unlocked(path)
}

/// Read every parseable line; the caller holds a lock
///
/// Corrupt lines are skipped with a warning.
fn read_unlocked<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "Skipping corrupt record in {:?} at line {}: {}",
                    path,
                    line_num + 1,
                    e
                );
            }
        }
    }

    Ok(records)
}

/// Atomically replace `path` with `records`, one per line
///
/// The caller holds the exclusive lock.
fn rewrite_lines<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Store(format!("{:?} has no parent directory", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
