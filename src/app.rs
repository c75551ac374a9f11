use crate::config::Config;
use crate::error::VerseError;
use crate::exercise::{ExerciseKind, ExerciseType};
use crate::progress::{ProgressRecorder, ProgressSink, UserId};
use crate::session::{
    run_exercise_with, Clock, CompletionEvent, Phase, Session, SessionEnv, SystemClock,
};
use crate::speech::{self, PendingTranscription, Transcriber};
use crate::util::mean;
use crate::verse::{Schedule, WeeklyVerse};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Exercise,
    Results,
}

/// Effective settings for this run: stored config overridden by CLI flags
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSettings {
    pub day_override: Option<u8>,
    pub typing_rounds: u8,
    pub show_hints: bool,
    pub lock_first_letter: bool,
    pub user: Option<String>,
    pub verse_reference: Option<String>,
    pub schedule: Schedule,
    /// Fixed rng seed, for reproducible blanks and quiz order
    pub seed: Option<u64>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RuntimeSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            day_override: cfg.day,
            typing_rounds: cfg.typing_rounds,
            show_hints: cfg.show_hints,
            lock_first_letter: cfg.lock_first_letter,
            user: cfg.user.clone(),
            verse_reference: cfg.verse_reference.clone(),
            schedule: cfg.schedule(),
            seed: None,
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub settings: RuntimeSettings,
    pub weekly: WeeklyVerse,
    /// Memorization day 1..=7
    pub day: u8,
    pub session: Option<Session>,
    pub menu_index: usize,
    /// Word index of the blank being edited, or the highlighted quiz option
    pub cursor: usize,
    pub completed: Vec<ExerciseType>,
    pub last_event: Option<CompletionEvent>,
    pub notice: Option<String>,
    pub should_quit: bool,
    recorder: ProgressRecorder<Box<dyn ProgressSink>>,
    accuracies: Vec<f64>,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    transcriber: Option<Arc<dyn Transcriber>>,
    pending_transcription: Option<PendingTranscription>,
}

impl App {
    pub fn new(
        weekly: WeeklyVerse,
        day: u8,
        settings: RuntimeSettings,
        sink: Box<dyn ProgressSink>,
    ) -> Self {
        let user = settings.user.clone().map(UserId::new);
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: AppState::Menu,
            settings,
            weekly,
            day: day.clamp(1, 7),
            session: None,
            menu_index: 0,
            cursor: 0,
            completed: Vec::new(),
            last_event: None,
            notice: None,
            should_quit: false,
            recorder: ProgressRecorder::new(sink, user),
            accuracies: Vec::new(),
            clock: Arc::new(SystemClock),
            rng,
            transcriber: None,
            pending_transcription: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Exercise types finished on an earlier run
    pub fn with_completed(mut self, completed: Vec<ExerciseType>) -> Self {
        for t in completed {
            self.mark_completed(t);
        }
        self
    }

    pub fn recorder(&self) -> &ProgressRecorder<Box<dyn ProgressSink>> {
        &self.recorder
    }

    pub fn sign_in(&mut self, user: UserId) {
        log::info!("signed in as {user}");
        self.settings.user = Some(user.to_string());
        self.recorder.sign_in(user);
    }

    pub fn is_completed(&self, exercise_type: ExerciseType) -> bool {
        self.completed.contains(&exercise_type)
    }

    pub fn all_completed(&self) -> bool {
        ExerciseType::ALL.iter().all(|t| self.is_completed(*t))
    }

    /// Mean accuracy over the exercises finished this run
    pub fn average_accuracy(&self) -> Option<f64> {
        mean(&self.accuracies)
    }

    pub fn selected_exercise(&self) -> ExerciseType {
        ExerciseType::ALL[self.menu_index % ExerciseType::ALL.len()]
    }

    fn kind_for(&self, exercise_type: ExerciseType) -> ExerciseKind {
        match exercise_type {
            ExerciseType::Typing => ExerciseKind::Typing {
                rounds: self.settings.typing_rounds,
                show_hints: self.settings.show_hints,
            },
            ExerciseType::FillBlanks => ExerciseKind::FillBlanks {
                day: self.day,
                lock_first_letter: self.settings.lock_first_letter,
            },
            ExerciseType::ReferenceQuiz => ExerciseKind::ReferenceQuiz,
            ExerciseType::Reflection => ExerciseKind::Reflection,
        }
    }

    pub fn start_exercise(&mut self, exercise_type: ExerciseType) -> Result<(), VerseError> {
        let env = SessionEnv {
            clock: Arc::clone(&self.clock),
            rng: StdRng::from_rng(&mut self.rng).unwrap_or_else(|_| StdRng::from_entropy()),
        };
        let session = run_exercise_with(
            self.kind_for(exercise_type),
            self.weekly.verse.clone(),
            env,
        )?;
        self.cursor = match &session {
            Session::FillBlanks(s) => s.blanks().as_slice().first().copied().unwrap_or(0),
            _ => 0,
        };
        self.session = Some(session);
        self.last_event = None;
        self.notice = None;
        self.state = AppState::Exercise;
        Ok(())
    }

    pub fn back_to_menu(&mut self) {
        self.cancel_dictation();
        self.session = None;
        self.state = AppState::Menu;
    }

    pub fn retry(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset();
            self.last_event = None;
            self.state = AppState::Exercise;
        }
    }

    fn mark_completed(&mut self, exercise_type: ExerciseType) {
        if !self.completed.contains(&exercise_type) {
            self.completed.push(exercise_type);
        }
    }

    fn on_completion(&mut self, event: Option<CompletionEvent>) {
        let Some(event) = event else {
            return;
        };
        self.recorder.emit(&self.weekly.verse, event);
        self.last_event = Some(event);

        let finished = self
            .session
            .as_ref()
            .is_some_and(|s| s.phase() == Phase::Complete);
        if finished {
            self.mark_completed(event.exercise_type);
            self.accuracies.push(event.accuracy_percent as f64);
            self.state = AppState::Results;
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.state {
            AppState::Menu => self.on_menu_key(key),
            AppState::Exercise => {
                if key.code == KeyCode::Esc {
                    self.back_to_menu();
                } else {
                    let event = self.on_exercise_key(key);
                    self.on_completion(event);
                }
            }
            AppState::Results => match key.code {
                KeyCode::Char('r') => self.retry(),
                KeyCode::Enter | KeyCode::Char('m') => self.back_to_menu(),
                KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
        }
    }

    fn on_menu_key(&mut self, key: KeyEvent) {
        let count = ExerciseType::ALL.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_index = (self.menu_index + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_index = (self.menu_index + 1) % count;
            }
            KeyCode::Char(c @ '1'..='4') => {
                self.menu_index = c as usize - '1' as usize;
                self.launch_selected();
            }
            KeyCode::Enter => self.launch_selected(),
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn launch_selected(&mut self) {
        let selected = self.selected_exercise();
        if let Err(e) = self.start_exercise(selected) {
            log::error!("cannot start {selected}: {e}");
            self.notice = Some(e.to_string());
        }
    }

    fn on_exercise_key(&mut self, key: KeyEvent) -> Option<CompletionEvent> {
        let cursor = self.cursor;
        match self.session.as_mut()? {
            Session::Typing(s) => match key.code {
                KeyCode::Char(c) => s.push_char(c),
                KeyCode::Backspace => s.backspace(),
                KeyCode::Tab => {
                    s.toggle_hints();
                    None
                }
                KeyCode::Enter => {
                    if s.next_round() {
                        self.last_event = None;
                    }
                    None
                }
                _ => None,
            },
            Session::FillBlanks(s) => {
                let blanks = s.blanks().as_slice().to_vec();
                let position = s.blanks().position(cursor).unwrap_or(0);
                match key.code {
                    KeyCode::Char(' ') | KeyCode::Tab | KeyCode::Enter | KeyCode::Down => {
                        if !blanks.is_empty() {
                            self.cursor = blanks[(position + 1) % blanks.len()];
                        }
                        None
                    }
                    KeyCode::BackTab | KeyCode::Up => {
                        if !blanks.is_empty() {
                            self.cursor = blanks[(position + blanks.len() - 1) % blanks.len()];
                        }
                        None
                    }
                    KeyCode::Char(c) => s.push_char(cursor, c),
                    KeyCode::Backspace => s.backspace(cursor),
                    _ => None,
                }
            }
            Session::ReferenceQuiz(s) => {
                let options = s.current_question().map_or(0, |q| q.options.len());
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') if options > 0 => {
                        self.cursor = (cursor + options - 1) % options;
                        None
                    }
                    KeyCode::Down | KeyCode::Char('j') if options > 0 => {
                        self.cursor = (cursor + 1) % options;
                        None
                    }
                    KeyCode::Char(c @ '1'..='9') => {
                        self.cursor = 0;
                        s.choose(c as usize - '1' as usize)
                    }
                    KeyCode::Enter => {
                        self.cursor = 0;
                        s.choose(cursor)
                    }
                    _ => None,
                }
            }
            Session::Reflection(s) => {
                let prompts = s.responses().len();
                match key.code {
                    KeyCode::Char(c) => {
                        s.push_char(c);
                        None
                    }
                    KeyCode::Backspace => {
                        s.backspace();
                        None
                    }
                    KeyCode::Enter => s.save(),
                    KeyCode::Tab => {
                        s.go_to((s.current() + 1) % prompts);
                        None
                    }
                    KeyCode::BackTab => {
                        s.go_to((s.current() + prompts - 1) % prompts);
                        None
                    }
                    _ => None,
                }
            }
        }
    }

    /// Pasted text goes wherever typed characters would
    pub fn on_paste(&mut self, text: &str) {
        if self.state != AppState::Exercise {
            return;
        }
        let cursor = self.cursor;
        let event = match self.session.as_mut() {
            Some(Session::Typing(s)) => {
                let combined = format!("{}{}", s.input(), text);
                s.set_input(&combined)
            }
            Some(Session::FillBlanks(s)) => {
                let combined = format!("{}{}", s.answer(cursor).unwrap_or_default(), text.trim());
                s.set_answer(cursor, &combined)
            }
            Some(Session::Reflection(s)) => {
                let combined = format!("{}{}", s.draft(), text);
                s.set_draft(&combined);
                None
            }
            Some(Session::ReferenceQuiz(_)) | None => None,
        };
        self.on_completion(event);
    }

    /// Send recorded audio off for transcription into the typing input
    pub fn start_dictation(&mut self, audio: Vec<u8>) -> bool {
        let Some(transcriber) = self.transcriber.clone() else {
            self.notice = Some("speech input is not available".into());
            return false;
        };
        if !matches!(self.session, Some(Session::Typing(_))) {
            return false;
        }
        self.cancel_dictation();
        self.pending_transcription = Some(speech::start_transcription(transcriber, audio));
        self.notice = Some("transcribing...".into());
        true
    }

    pub fn cancel_dictation(&mut self) {
        if let Some(pending) = self.pending_transcription.take() {
            pending.cancel();
            log::debug!("dictation cancelled");
        }
    }

    pub fn is_transcribing(&self) -> bool {
        self.pending_transcription.is_some()
    }

    pub fn on_tick(&mut self) {
        let Some(pending) = self.pending_transcription.as_mut() else {
            return;
        };
        let Some(result) = pending.poll() else {
            return;
        };
        self.pending_transcription = None;

        let Some(Session::Typing(session)) = self.session.as_mut() else {
            return;
        };
        match speech::apply_transcript(session, result) {
            Ok(event) => {
                self.notice = None;
                self.on_completion(event);
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProgressError;
    use crate::session::ManualClock;
    use crate::verse::Verse;
    use assert_matches::assert_matches;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default, Clone)]
    struct SharedSink(Arc<Mutex<Vec<CompletionEvent>>>);

    impl ProgressSink for SharedSink {
        fn record(
            &mut self,
            _user: &UserId,
            _verse: &Verse,
            event: &CompletionEvent,
        ) -> Result<(), ProgressError> {
            if let Ok(mut events) = self.0.lock() {
                events.push(*event);
            }
            Ok(())
        }
    }

    fn weekly() -> WeeklyVerse {
        WeeklyVerse {
            verse: Verse::new("Jesus wept.", "John 11:35", "KJV").unwrap(),
            context_before: None,
            context_after: None,
            background: None,
        }
    }

    fn app(settings: RuntimeSettings) -> (App, SharedSink) {
        let sink = SharedSink::default();
        let app = App::new(weekly(), 4, settings, Box::new(sink.clone()))
            .with_clock(Arc::new(ManualClock::new()));
        (app, sink)
    }

    fn settings() -> RuntimeSettings {
        RuntimeSettings {
            typing_rounds: 1,
            user: Some("tester".into()),
            seed: Some(7),
            ..RuntimeSettings::default()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_menu_navigation_wraps() {
        let (mut app, _) = app(settings());
        assert_eq!(app.selected_exercise(), ExerciseType::Typing);
        app.on_key(key(KeyCode::Up));
        assert_eq!(app.selected_exercise(), ExerciseType::Reflection);
        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Down));
        assert_eq!(app.selected_exercise(), ExerciseType::ReferenceQuiz);
    }

    #[test]
    fn test_typing_flow_records_completion() {
        let (mut app, sink) = app(settings());
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Exercise);

        type_text(&mut app, "Jesus wept.");
        assert_eq!(app.state, AppState::Results);
        assert!(app.is_completed(ExerciseType::Typing));
        assert_eq!(app.average_accuracy(), Some(100.0));

        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].exercise_type, ExerciseType::Typing);
    }

    #[test]
    fn test_multi_round_typing_waits_for_enter() {
        let (mut app, sink) = app(RuntimeSettings {
            typing_rounds: 2,
            ..settings()
        });
        app.on_key(key(KeyCode::Char('1')));
        type_text(&mut app, "Jesus wept.");

        assert_eq!(app.state, AppState::Exercise);
        assert_matches!(app.last_event, Some(CompletionEvent { round: Some(1), .. }));
        assert!(!app.is_completed(ExerciseType::Typing));

        app.on_key(key(KeyCode::Enter));
        type_text(&mut app, "Jesus wept.");
        assert_eq!(app.state, AppState::Results);
        assert_eq!(sink.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_escape_returns_to_menu_without_recording() {
        let (mut app, sink) = app(settings());
        app.on_key(key(KeyCode::Char('1')));
        type_text(&mut app, "Jesus");
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Menu);
        assert!(app.session.is_none());
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_quiz_answered_by_number_keys() {
        let (mut app, _) = app(settings());
        app.on_key(key(KeyCode::Char('2')));
        assert_matches!(app.session, Some(Session::ReferenceQuiz(_)));

        for _ in 0..3 {
            let Some(Session::ReferenceQuiz(quiz)) = app.session.as_ref() else {
                panic!("quiz expected");
            };
            let question = quiz.current_question().unwrap();
            let idx = question
                .options
                .iter()
                .position(|o| *o == question.correct)
                .unwrap();
            app.on_key(key(KeyCode::Char((b'1' + idx as u8) as char)));
        }
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.last_event.map(|e| e.accuracy_percent), Some(100));
    }

    #[test]
    fn test_reflection_saves_with_enter() {
        let (mut app, _) = app(settings());
        app.on_key(key(KeyCode::Char('4')));
        for _ in 0..4 {
            type_text(&mut app, "trust");
            app.on_key(key(KeyCode::Enter));
        }
        assert_eq!(app.state, AppState::Results);
        assert!(app.is_completed(ExerciseType::Reflection));
    }

    #[test]
    fn test_fill_blanks_paste_completes() {
        let (mut app, _) = app(settings());
        app.on_key(key(KeyCode::Char('3')));
        let Some(Session::FillBlanks(s)) = app.session.as_ref() else {
            panic!("fill blanks expected");
        };
        let targets: Vec<(usize, String)> = s
            .blanks()
            .iter()
            .map(|i| (i, s.words()[i].raw.clone()))
            .collect();
        assert!(!targets.is_empty());

        for (i, word) in targets {
            app.cursor = i;
            app.on_paste(&word);
        }
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_results_keys() {
        let (mut app, _) = app(settings());
        app.on_key(key(KeyCode::Char('1')));
        type_text(&mut app, "Jesus wept.");

        app.on_key(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Exercise);
        assert_eq!(app.session.as_ref().map(Session::phase), Some(Phase::NotStarted));

        type_text(&mut app, "Jesus wept.");
        app.on_key(key(KeyCode::Char('m')));
        assert_eq!(app.state, AppState::Menu);
        app.on_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_anonymous_completions_flush_on_sign_in() {
        let (mut app, sink) = app(RuntimeSettings {
            user: None,
            ..settings()
        });
        app.on_key(key(KeyCode::Char('1')));
        type_text(&mut app, "Jesus wept.");
        assert!(sink.0.lock().unwrap().is_empty());
        assert_eq!(app.recorder().pending(), 1);

        app.sign_in(UserId::new("later"));
        assert_eq!(sink.0.lock().unwrap().len(), 1);
        assert_eq!(app.recorder().pending(), 0);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let (mut app, _) = app(settings());
        app.on_key(key(KeyCode::Char('1')));
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[derive(Debug)]
    struct Echo;

    impl Transcriber for Echo {
        fn transcribe(&self, audio: &[u8]) -> Result<String, crate::error::TranscriptionError> {
            Ok(String::from_utf8_lossy(audio).into_owned())
        }
    }

    #[test]
    fn test_dictation_fills_typing_input() {
        let (app, _) = app(settings());
        let mut app = app.with_transcriber(Arc::new(Echo));
        assert!(!app.start_dictation(b"Jesus wept.".to_vec()));

        app.on_key(key(KeyCode::Char('1')));
        assert!(app.start_dictation(b"Jesus wept.".to_vec()));
        for _ in 0..200 {
            app.on_tick();
            if !app.is_transcribing() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_completed_types_carry_over() {
        let (app, _) = app(settings());
        let app = app.with_completed(vec![ExerciseType::Typing, ExerciseType::Typing]);
        assert_eq!(app.completed, vec![ExerciseType::Typing]);
        assert!(!app.all_completed());
    }
}
