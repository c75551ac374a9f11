pub mod blanks;
pub mod importance;
pub mod masking;
pub mod scoring;
pub mod tokenize;

pub use blanks::{blank_out, difficulty_percent, first_letter_hint, select_blanks, BlankSet};
pub use importance::importance;
pub use masking::{mask_for_round, MaskedVerse};
pub use scoring::{score, text_accuracy, typing_complete, word_status, WordStatus};
pub use tokenize::{tokenize, Word};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tag identifying an exercise in completion events and stored progress
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum ExerciseType {
    #[strum(serialize = "typing")]
    #[serde(rename = "typing")]
    Typing,
    #[strum(serialize = "fill-blanks")]
    #[serde(rename = "fill-blanks")]
    FillBlanks,
    #[strum(serialize = "reference")]
    #[serde(rename = "reference")]
    ReferenceQuiz,
    #[strum(serialize = "reflection")]
    #[serde(rename = "reflection")]
    Reflection,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 4] = [
        ExerciseType::Typing,
        ExerciseType::ReferenceQuiz,
        ExerciseType::FillBlanks,
        ExerciseType::Reflection,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ExerciseType::Typing => "Type the Verse",
            ExerciseType::FillBlanks => "Fill in the Blanks",
            ExerciseType::ReferenceQuiz => "Reference Quiz",
            ExerciseType::Reflection => "Personal Reflection",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExerciseType::Typing => "Type out the complete verse from memory",
            ExerciseType::FillBlanks => "Complete the verse with missing words",
            ExerciseType::ReferenceQuiz => "Can you remember the book, chapter, and verse?",
            ExerciseType::Reflection => "How does this verse apply to your life?",
        }
    }

    pub fn difficulty(&self) -> &'static str {
        match self {
            ExerciseType::Typing => "Medium",
            ExerciseType::FillBlanks => "Hard",
            ExerciseType::ReferenceQuiz => "Easy",
            ExerciseType::Reflection => "Thoughtful",
        }
    }
}

impl FromStr for ExerciseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExerciseType::ALL
            .into_iter()
            .find(|t| t.to_string() == s)
            .ok_or_else(|| format!("unknown exercise type: {s}"))
    }
}

/// An exercise to run, carrying only the parameters that exercise needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseKind {
    Typing { rounds: u8, show_hints: bool },
    FillBlanks { day: u8, lock_first_letter: bool },
    ReferenceQuiz,
    Reflection,
}

impl ExerciseKind {
    pub fn exercise_type(&self) -> ExerciseType {
        match self {
            ExerciseKind::Typing { .. } => ExerciseType::Typing,
            ExerciseKind::FillBlanks { .. } => ExerciseType::FillBlanks,
            ExerciseKind::ReferenceQuiz => ExerciseType::ReferenceQuiz,
            ExerciseKind::Reflection => ExerciseType::Reflection,
        }
    }
}
