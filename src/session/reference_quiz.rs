use super::{Clock, CompletionEvent, Phase, SessionEnv, SessionState};
use crate::error::VerseError;
use crate::exercise::ExerciseType;
use crate::util::round_percent;
use crate::verse::{Reference, Verse};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Arc;

const BOOK_DISTRACTORS: [&str; 3] = ["Psalms", "Romans", "John"];
const CHAPTER_DISTRACTORS: [&str; 3] = ["2", "4", "7"];
const VERSE_DISTRACTORS: [&str; 3] = ["1-2", "8", "12-13"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub prompt: &'static str,
    pub options: Vec<String>,
    pub correct: String,
}

impl QuizQuestion {
    fn new<R: rand::Rng + ?Sized>(
        prompt: &'static str,
        correct: String,
        distractors: &[&str],
        rng: &mut R,
    ) -> Self {
        let mut options = vec![correct.clone()];
        options.extend(
            distractors
                .iter()
                .filter(|d| !d.eq_ignore_ascii_case(&correct))
                .map(|d| d.to_string()),
        );
        options.shuffle(rng);
        Self {
            prompt,
            options,
            correct,
        }
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct
    }
}

fn build_questions(reference: &Reference, rng: &mut StdRng) -> Vec<QuizQuestion> {
    vec![
        QuizQuestion::new(
            "Which book is this verse from?",
            reference.book.clone(),
            &BOOK_DISTRACTORS,
            rng,
        ),
        QuizQuestion::new(
            "What chapter is this verse in?",
            reference.chapter.to_string(),
            &CHAPTER_DISTRACTORS,
            rng,
        ),
        QuizQuestion::new(
            "What verse(s) does this reference?",
            reference.verses_label(),
            &VERSE_DISTRACTORS,
            rng,
        ),
    ]
}

/// Multiple-choice recall of the book, chapter and verse of a reference
#[derive(Debug)]
pub struct ReferenceQuizSession {
    verse: Verse,
    reference: Reference,
    questions: Vec<QuizQuestion>,
    answers: Vec<String>,
    state: SessionState,
    clock: Arc<dyn Clock>,
    rng: StdRng,
}

impl ReferenceQuizSession {
    pub fn new(verse: Verse, env: SessionEnv) -> Result<Self, VerseError> {
        let SessionEnv { clock, mut rng } = env;
        let reference = verse.parsed_reference()?;
        let questions = build_questions(&reference, &mut rng);

        Ok(Self {
            verse,
            reference,
            questions,
            answers: Vec::new(),
            state: SessionState::started(clock.now()),
            clock,
            rng,
        })
    }

    pub fn verse(&self) -> &Verse {
        &self.verse
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.answers.len().min(self.questions.len() - 1)
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.state.phase == Phase::Complete {
            return None;
        }
        self.questions.get(self.answers.len())
    }

    /// Answer the current question and move on. The last answer completes the quiz.
    pub fn answer(&mut self, answer: &str) -> Option<CompletionEvent> {
        if !self.state.accepts_input() || self.answers.len() >= self.questions.len() {
            return None;
        }
        self.state.mark_input(self.clock.now());
        self.answers.push(answer.to_string());

        if self.answers.len() < self.questions.len() {
            return None;
        }
        let accuracy = self.accuracy();
        Some(self.state.finish(
            Phase::Complete,
            self.clock.now(),
            ExerciseType::ReferenceQuiz,
            accuracy,
            None,
        ))
    }

    /// Answer with the option at `option` (0-based) of the current question
    pub fn choose(&mut self, option: usize) -> Option<CompletionEvent> {
        let choice = self.current_question()?.options.get(option)?.clone();
        self.answer(&choice)
    }

    pub fn correct_count(&self) -> usize {
        self.answers
            .iter()
            .zip(&self.questions)
            .filter(|(a, q)| q.is_correct(a))
            .count()
    }

    pub fn accuracy(&self) -> u8 {
        round_percent(self.correct_count(), self.questions.len())
    }

    /// Start over with freshly shuffled options
    pub fn reset(&mut self) {
        self.answers.clear();
        self.questions = build_questions(&self.reference, &mut self.rng);
        self.state = SessionState::started(self.clock.now());
    }
}
