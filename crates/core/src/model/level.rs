use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::LevelId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level title cannot be empty")]
    EmptyTitle,

    #[error("level must carry at least one quiz question")]
    MissingQuiz,

    #[error("quiz question has no options")]
    NoOptions,

    #[error("correct index {index} is out of range for {len} options")]
    CorrectIndexOutOfRange { index: usize, len: usize },

    #[error("unknown level status: {0}")]
    UnknownStatus(String),
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Where a level sits in the unlock chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelStatus {
    Locked,
    Unlocked,
    Completed,
}

impl LevelStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LevelStatus::Locked => "locked",
            LevelStatus::Unlocked => "unlocked",
            LevelStatus::Completed => "completed",
        }
    }

    /// A level can be opened and answered unless it is still locked.
    #[must_use]
    pub fn is_open(self) -> bool {
        !matches!(self, LevelStatus::Locked)
    }
}

impl std::str::FromStr for LevelStatus {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locked" => Ok(LevelStatus::Locked),
            "unlocked" => Ok(LevelStatus::Unlocked),
            "completed" => Ok(LevelStatus::Completed),
            other => Err(LevelError::UnknownStatus(other.to_string())),
        }
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A multiple-choice question with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    question: String,
    options: Vec<String>,
    correct_index: usize,
}

impl QuizQuestion {
    /// # Errors
    ///
    /// Returns `LevelError::NoOptions` for an empty option list and
    /// `LevelError::CorrectIndexOutOfRange` when the answer key points past it.
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, LevelError> {
        if options.is_empty() {
            return Err(LevelError::NoOptions);
        }
        if correct_index >= options.len() {
            return Err(LevelError::CorrectIndexOutOfRange {
                index: correct_index,
                len: options.len(),
            });
        }
        Ok(Self {
            question: question.into(),
            options,
            correct_index,
        })
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn is_correct(&self, chosen: usize) -> bool {
        chosen == self.correct_index
    }
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// One stop on the learning map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    id: LevelId,
    title: String,
    content: String,
    examples: Vec<String>,
    status: LevelStatus,
    quiz: Vec<QuizQuestion>,
}

impl Level {
    /// # Errors
    ///
    /// Returns `LevelError::EmptyTitle` for a blank title and
    /// `LevelError::MissingQuiz` when no quiz question is supplied.
    pub fn new(
        id: LevelId,
        title: impl Into<String>,
        content: impl Into<String>,
        examples: Vec<String>,
        status: LevelStatus,
        quiz: Vec<QuizQuestion>,
    ) -> Result<Self, LevelError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LevelError::EmptyTitle);
        }
        if quiz.is_empty() {
            return Err(LevelError::MissingQuiz);
        }
        Ok(Self {
            id,
            title,
            content: content.into(),
            examples,
            status,
            quiz,
        })
    }

    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    #[must_use]
    pub fn status(&self) -> LevelStatus {
        self.status
    }

    #[must_use]
    pub fn quiz(&self) -> &[QuizQuestion] {
        &self.quiz
    }

    /// The question that gates this level. Only the first one is graded.
    #[must_use]
    pub fn gate_question(&self) -> &QuizQuestion {
        &self.quiz[0]
    }

    pub(crate) fn set_status(&mut self, status: LevelStatus) {
        self.status = status;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
