use crate::app_dirs::AppDirs;
use crate::error::ProgressError;
use crate::exercise::ExerciseType;
use crate::session::CompletionEvent;
use crate::verse::Verse;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque identity of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where completion events end up
pub trait ProgressSink: fmt::Debug {
    fn record(
        &mut self,
        user: &UserId,
        verse: &Verse,
        event: &CompletionEvent,
    ) -> Result<(), ProgressError>;
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn record(
        &mut self,
        user: &UserId,
        verse: &Verse,
        event: &CompletionEvent,
    ) -> Result<(), ProgressError> {
        (**self).record(user, verse, event)
    }
}

/// One stored exercise completion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRecord {
    pub user_id: String,
    pub verse_reference: String,
    pub exercise_type: String,
    pub exercise_round: Option<u8>,
    pub accuracy: u8,
    pub time_spent_ms: u64,
    pub completed_at: String,
}

/// Running totals for one user and verse
#[derive(Debug, Clone, PartialEq)]
pub struct VerseProgress {
    pub verse_reference: String,
    pub verse_text: String,
    pub translation: String,
    pub total_exercises_completed: u32,
    pub time_spent_total_ms: u64,
    pub accuracy_average: f64,
    pub current_week_day: u8,
    pub is_completed: bool,
    pub updated_at: DateTime<Local>,
}

/// SQLite-backed progress store
#[derive(Debug)]
pub struct ProgressDb {
    conn: Connection,
    week_day: u8,
}

impl ProgressDb {
    /// Open the default database under the user's state directory
    pub fn new() -> Result<Self, ProgressError> {
        let path = AppDirs::progress_db_path().unwrap_or_else(|| PathBuf::from("engrave_progress.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProgressError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, ProgressError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, ProgressError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS exercise_completions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                verse_reference TEXT NOT NULL,
                exercise_type TEXT NOT NULL,
                exercise_round INTEGER,
                accuracy INTEGER NOT NULL,
                time_spent_ms INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_completions_user
                ON exercise_completions(user_id, verse_reference);

            CREATE TABLE IF NOT EXISTS verse_progress (
                user_id TEXT NOT NULL,
                verse_reference TEXT NOT NULL,
                verse_text TEXT NOT NULL,
                translation TEXT NOT NULL,
                total_exercises_completed INTEGER NOT NULL DEFAULT 0,
                time_spent_total_ms INTEGER NOT NULL DEFAULT 0,
                accuracy_average REAL NOT NULL DEFAULT 0,
                current_week_day INTEGER NOT NULL DEFAULT 1,
                is_completed BOOLEAN NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, verse_reference)
            );
            "#,
        )?;

        Ok(Self { conn, week_day: 1 })
    }

    /// Day of the memorization week stamped on progress rows
    pub fn with_week_day(mut self, day: u8) -> Self {
        self.week_day = day;
        self
    }

    fn insert_completion(
        &mut self,
        user: &UserId,
        verse: &Verse,
        event: &CompletionEvent,
    ) -> Result<(), ProgressError> {
        let now = Local::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO exercise_completions
            (user_id, verse_reference, exercise_type, exercise_round, accuracy, time_spent_ms, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                user.as_str(),
                verse.reference(),
                event.exercise_type.to_string(),
                event.round,
                event.accuracy_percent,
                event.time_spent_ms as i64,
                now,
            ],
        )?;

        let distinct_types: i64 = tx.query_row(
            r#"
            SELECT COUNT(DISTINCT exercise_type) FROM exercise_completions
            WHERE user_id = ?1 AND verse_reference = ?2
            "#,
            params![user.as_str(), verse.reference()],
            |row| row.get(0),
        )?;
        let is_completed = distinct_types as usize >= ExerciseType::ALL.len();

        tx.execute(
            r#"
            INSERT INTO verse_progress
            (user_id, verse_reference, verse_text, translation, total_exercises_completed,
             time_spent_total_ms, accuracy_average, current_week_day, is_completed, updated_at)
            SELECT ?1, ?2, ?3, ?4, COUNT(*), SUM(time_spent_ms), AVG(accuracy), ?5, ?6, ?7
            FROM exercise_completions WHERE user_id = ?1 AND verse_reference = ?2
            ON CONFLICT(user_id, verse_reference) DO UPDATE SET
                total_exercises_completed = excluded.total_exercises_completed,
                time_spent_total_ms = excluded.time_spent_total_ms,
                accuracy_average = excluded.accuracy_average,
                current_week_day = excluded.current_week_day,
                is_completed = excluded.is_completed,
                updated_at = excluded.updated_at
            "#,
            params![
                user.as_str(),
                verse.reference(),
                verse.text(),
                verse.translation(),
                self.week_day,
                is_completed,
                now,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    pub fn verse_progress(
        &self,
        user: &UserId,
        reference: &str,
    ) -> Result<Option<VerseProgress>, ProgressError> {
        let progress = self
            .conn
            .query_row(
                r#"
                SELECT verse_reference, verse_text, translation, total_exercises_completed,
                       time_spent_total_ms, accuracy_average, current_week_day, is_completed, updated_at
                FROM verse_progress WHERE user_id = ?1 AND verse_reference = ?2
                "#,
                params![user.as_str(), reference],
                |row| {
                    let updated_at: String = row.get(8)?;
                    Ok(VerseProgress {
                        verse_reference: row.get(0)?,
                        verse_text: row.get(1)?,
                        translation: row.get(2)?,
                        total_exercises_completed: row.get(3)?,
                        time_spent_total_ms: row.get::<_, i64>(4)? as u64,
                        accuracy_average: row.get(5)?,
                        current_week_day: row.get(6)?,
                        is_completed: row.get(7)?,
                        updated_at: DateTime::parse_from_rfc3339(&updated_at)
                            .map(|dt| dt.with_timezone(&Local))
                            .unwrap_or_else(|_| Local::now()),
                    })
                },
            )
            .optional()?;
        Ok(progress)
    }

    /// Exercise types already completed for a verse, in stored order
    pub fn completed_types(
        &self,
        user: &UserId,
        reference: &str,
    ) -> Result<Vec<ExerciseType>, ProgressError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT exercise_type FROM exercise_completions
            WHERE user_id = ?1 AND verse_reference = ?2
            ORDER BY exercise_type
            "#,
        )?;
        let rows = stmt.query_map(params![user.as_str(), reference], |row| row.get::<_, String>(0))?;

        let mut types = Vec::new();
        for row in rows {
            let name = row?;
            match name.parse() {
                Ok(t) => types.push(t),
                Err(e) => log::warn!("skipping stored completion: {e}"),
            }
        }
        Ok(types)
    }

    /// Completion history of a user, oldest first
    pub fn completions(&self, user: &UserId) -> Result<Vec<CompletionRecord>, ProgressError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_id, verse_reference, exercise_type, exercise_round, accuracy,
                   time_spent_ms, completed_at
            FROM exercise_completions WHERE user_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![user.as_str()], |row| {
            Ok(CompletionRecord {
                user_id: row.get(0)?,
                verse_reference: row.get(1)?,
                exercise_type: row.get(2)?,
                exercise_round: row.get(3)?,
                accuracy: row.get(4)?,
                time_spent_ms: row.get::<_, i64>(5)? as u64,
                completed_at: row.get(6)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Forget all completions and verse progress of `user`.
    /// Returns the number of completions removed.
    pub fn reset(&mut self, user: &UserId) -> Result<usize, ProgressError> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM exercise_completions WHERE user_id = ?1",
            params![user.as_str()],
        )?;
        tx.execute(
            "DELETE FROM verse_progress WHERE user_id = ?1",
            params![user.as_str()],
        )?;
        tx.commit()?;

        log::info!("reset progress of {user}: {removed} completions removed");
        Ok(removed)
    }

    /// Write the completion history of `user` as CSV
    pub fn export_csv<P: AsRef<Path>>(&self, user: &UserId, path: P) -> Result<usize, ProgressError> {
        let records = self.completions(user)?;
        let mut writer = csv::Writer::from_path(path)?;
        for record in &records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(records.len())
    }
}

impl ProgressSink for ProgressDb {
    fn record(
        &mut self,
        user: &UserId,
        verse: &Verse,
        event: &CompletionEvent,
    ) -> Result<(), ProgressError> {
        self.insert_completion(user, verse, event)
    }
}

/// Forwards completion events to a sink on a fire-and-forget basis.
/// Without a signed-in user events are held back until `sign_in`.
#[derive(Debug)]
pub struct ProgressRecorder<S: ProgressSink> {
    sink: S,
    user: Option<UserId>,
    pending: Vec<(Verse, CompletionEvent)>,
}

impl<S: ProgressSink> ProgressRecorder<S> {
    pub fn new(sink: S, user: Option<UserId>) -> Self {
        Self {
            sink,
            user,
            pending: Vec::new(),
        }
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn emit(&mut self, verse: &Verse, event: CompletionEvent) {
        match &self.user {
            Some(user) => {
                if let Err(e) = self.sink.record(user, verse, &event) {
                    log::warn!("failed to record {} completion: {e}", event.exercise_type);
                }
            }
            None => {
                log::debug!("no user signed in, holding {} completion", event.exercise_type);
                self.pending.push((verse.clone(), event));
            }
        }
    }

    /// Attribute held-back events to `user` and record them
    pub fn sign_in(&mut self, user: UserId) {
        for (verse, event) in std::mem::take(&mut self.pending) {
            if let Err(e) = self.sink.record(&user, &verse, &event) {
                log::warn!("failed to record queued completion for {user}: {e}");
            }
        }
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }
}
