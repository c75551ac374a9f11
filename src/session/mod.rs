pub mod fill_blanks;
pub mod reference_quiz;
pub mod reflection;
pub mod typing;

pub use fill_blanks::{AnswerStatus, FillBlanksSession};
pub use reference_quiz::{QuizQuestion, ReferenceQuizSession};
pub use reflection::{ReflectionSession, REFLECTION_PROMPTS};
pub use typing::TypingSession;

use crate::error::VerseError;
use crate::exercise::{ExerciseKind, ExerciseType};
use crate::verse::Verse;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of wall-clock time for session timing
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock advanced by hand, shared between clones
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Time and randomness handed to a session when it is built
#[derive(Debug, Clone)]
pub struct SessionEnv {
    pub clock: Arc<dyn Clock>,
    pub rng: StdRng,
}

impl SessionEnv {
    pub fn system() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SessionEnv {
    fn default() -> Self {
        Self::system()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress,
    /// A typing round is done and the next one has not begun
    RoundComplete,
    Complete,
}

/// Emitted once when an exercise or typing round succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub exercise_type: ExerciseType,
    pub time_spent_ms: u64,
    pub accuracy_percent: u8,
    pub round: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub started_at: Option<SystemTime>,
    pub phase: Phase,
    pub round: u8,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            started_at: None,
            phase: Phase::NotStarted,
            round: 1,
        }
    }
}

impl SessionState {
    /// State for exercises timed from the moment they are shown
    pub fn started(now: SystemTime) -> Self {
        Self {
            started_at: Some(now),
            ..Self::default()
        }
    }

    pub fn accepts_input(&self) -> bool {
        matches!(self.phase, Phase::NotStarted | Phase::InProgress)
    }

    /// Record user activity. The start time is only set once and survives
    /// round changes.
    pub fn mark_input(&mut self, now: SystemTime) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if self.phase == Phase::NotStarted {
            self.phase = Phase::InProgress;
        }
    }

    pub fn elapsed_ms(&self, now: SystemTime) -> u64 {
        self.started_at
            .and_then(|start| now.duration_since(start).ok())
            .map_or(0, |d| d.as_millis() as u64)
    }

    pub fn finish(
        &mut self,
        phase: Phase,
        now: SystemTime,
        exercise_type: ExerciseType,
        accuracy_percent: u8,
        round: Option<u8>,
    ) -> CompletionEvent {
        self.phase = phase;
        let event = CompletionEvent {
            exercise_type,
            time_spent_ms: self.elapsed_ms(now),
            accuracy_percent,
            round,
        };
        log::info!(
            "{} finished in {}ms with {}% accuracy (round {:?})",
            event.exercise_type,
            event.time_spent_ms,
            event.accuracy_percent,
            event.round
        );
        event
    }
}

/// A running exercise of any kind
#[derive(Debug)]
pub enum Session {
    Typing(TypingSession),
    FillBlanks(FillBlanksSession),
    ReferenceQuiz(ReferenceQuizSession),
    Reflection(ReflectionSession),
}

impl Session {
    pub fn exercise_type(&self) -> ExerciseType {
        match self {
            Session::Typing(_) => ExerciseType::Typing,
            Session::FillBlanks(_) => ExerciseType::FillBlanks,
            Session::ReferenceQuiz(_) => ExerciseType::ReferenceQuiz,
            Session::Reflection(_) => ExerciseType::Reflection,
        }
    }

    pub fn state(&self) -> &SessionState {
        match self {
            Session::Typing(s) => s.state(),
            Session::FillBlanks(s) => s.state(),
            Session::ReferenceQuiz(s) => s.state(),
            Session::Reflection(s) => s.state(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    pub fn verse(&self) -> &Verse {
        match self {
            Session::Typing(s) => s.verse(),
            Session::FillBlanks(s) => s.verse(),
            Session::ReferenceQuiz(s) => s.verse(),
            Session::Reflection(s) => s.verse(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Session::Typing(s) => s.reset(),
            Session::FillBlanks(s) => s.reset(),
            Session::ReferenceQuiz(s) => s.reset(),
            Session::Reflection(s) => s.reset(),
        }
    }
}

/// Build the session for `kind` using the system clock and an entropy-seeded rng
pub fn run_exercise(kind: ExerciseKind, verse: Verse) -> Result<Session, VerseError> {
    run_exercise_with(kind, verse, SessionEnv::system())
}

pub fn run_exercise_with(
    kind: ExerciseKind,
    verse: Verse,
    env: SessionEnv,
) -> Result<Session, VerseError> {
    log::debug!("starting {} for {}", kind.exercise_type(), verse.reference());
    let session = match kind {
        ExerciseKind::Typing { rounds, show_hints } => {
            Session::Typing(TypingSession::new(verse, rounds, show_hints, env))
        }
        ExerciseKind::FillBlanks {
            day,
            lock_first_letter,
        } => Session::FillBlanks(FillBlanksSession::new(verse, day, lock_first_letter, env.clock)),
        ExerciseKind::ReferenceQuiz => Session::ReferenceQuiz(ReferenceQuizSession::new(verse, env)?),
        ExerciseKind::Reflection => Session::Reflection(ReflectionSession::new(verse, env.clock)),
    };
    Ok(session)
}
