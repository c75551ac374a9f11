use super::{Clock, CompletionEvent, Phase, SessionState};
use crate::exercise::ExerciseType;
use crate::verse::Verse;
use std::sync::Arc;

pub const REFLECTION_PROMPTS: [&str; 4] = [
    "What does this verse mean to you personally?",
    "How can you apply this verse to your current situation?",
    "What specific action will you take based on this verse?",
    "How does this verse change your perspective on something?",
];

/// Guided journaling through a fixed set of prompts
#[derive(Debug)]
pub struct ReflectionSession {
    verse: Verse,
    current: usize,
    draft: String,
    responses: Vec<Option<String>>,
    state: SessionState,
    clock: Arc<dyn Clock>,
}

impl ReflectionSession {
    pub fn new(verse: Verse, clock: Arc<dyn Clock>) -> Self {
        Self {
            verse,
            current: 0,
            draft: String::new(),
            responses: vec![None; REFLECTION_PROMPTS.len()],
            state: SessionState::started(clock.now()),
            clock,
        }
    }

    pub fn verse(&self) -> &Verse {
        &self.verse
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_prompt(&self) -> &'static str {
        REFLECTION_PROMPTS[self.current]
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn responses(&self) -> &[Option<String>] {
        &self.responses
    }

    pub fn answered_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_some()).count()
    }

    pub fn set_draft(&mut self, text: &str) {
        if !self.state.accepts_input() {
            return;
        }
        if !text.is_empty() {
            self.state.mark_input(self.clock.now());
        }
        self.draft = text.to_string();
    }

    pub fn push_char(&mut self, c: char) {
        let mut text = self.draft.clone();
        text.push(c);
        self.set_draft(&text);
    }

    pub fn backspace(&mut self) {
        let mut text = self.draft.clone();
        text.pop();
        self.set_draft(&text);
    }

    fn store_draft(&mut self) {
        self.responses[self.current] = if self.draft.trim().is_empty() {
            None
        } else {
            Some(self.draft.clone())
        };
    }

    /// Save the draft for the current prompt and advance. Saving the last
    /// prompt completes the reflection. Blank drafts are not saved.
    pub fn save(&mut self) -> Option<CompletionEvent> {
        if !self.state.accepts_input() || self.draft.trim().is_empty() {
            return None;
        }
        self.store_draft();

        if self.current + 1 < REFLECTION_PROMPTS.len() {
            self.current += 1;
            self.draft = self.responses[self.current].clone().unwrap_or_default();
            return None;
        }

        // there is nothing to grade, a finished reflection always counts in full
        Some(self.state.finish(
            Phase::Complete,
            self.clock.now(),
            ExerciseType::Reflection,
            100,
            None,
        ))
    }

    /// Jump to another prompt, keeping what was written for the current one
    pub fn go_to(&mut self, index: usize) {
        if !self.state.accepts_input() || index >= REFLECTION_PROMPTS.len() {
            return;
        }
        self.store_draft();
        self.current = index;
        self.draft = self.responses[index].clone().unwrap_or_default();
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.draft.clear();
        self.responses = vec![None; REFLECTION_PROMPTS.len()];
        self.state = SessionState::started(self.clock.now());
    }
}
