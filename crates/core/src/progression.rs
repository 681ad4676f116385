//! Quiz-gated level progression.
//!
//! A [`LevelMap`] holds the ordered levels of one learning map. Passing the
//! gate question of an open level completes it and unlocks its successor;
//! nothing ever moves backwards.

use thiserror::Error;

use crate::model::{Level, LevelError, LevelId, LevelStatus, QuizQuestion};

/// Minimum score that counts as a pass.
pub const PASS_THRESHOLD: u8 = 50;

const FULL_MARKS: u8 = 100;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Rejected progression requests. The map is left untouched in every case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressionError {
    #[error("level {0} does not exist")]
    NotFound(LevelId),

    #[error("level {0} is locked")]
    Locked(LevelId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelMapError {
    #[error("expected level id {expected}, found {found}")]
    NonDenseIds { expected: LevelId, found: LevelId },

    #[error(transparent)]
    Level(#[from] LevelError),
}

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// Result of grading one quiz submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub level_id: LevelId,
    pub correct: bool,
    pub score: u8,
    /// Successor that moved from locked to unlocked, if any.
    pub unlocked: Option<LevelId>,
}

impl QuizOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.score >= PASS_THRESHOLD
    }
}

/// Completed vs. total levels, for the map header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapProgress {
    pub completed: usize,
    pub total: usize,
}

//
// ─── LEVEL MAP ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMap {
    levels: Vec<Level>,
}

impl LevelMap {
    /// Build a map from levels whose ids run `1..=N` in order.
    ///
    /// # Errors
    ///
    /// Returns `LevelMapError::NonDenseIds` if an id is out of sequence.
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelMapError> {
        let mut expected = LevelId::new(1);
        for level in &levels {
            if level.id() != expected {
                return Err(LevelMapError::NonDenseIds {
                    expected,
                    found: level.id(),
                });
            }
            expected = expected.next();
        }
        Ok(Self { levels })
    }

    /// The five-level introductory programming curriculum.
    ///
    /// Level 1 starts completed and level 2 unlocked.
    ///
    /// # Errors
    ///
    /// Returns `LevelMapError` if the built-in curriculum fails validation.
    pub fn seeded() -> Result<Self, LevelMapError> {
        let levels = vec![
            seed_level(
                1,
                "Basic Concepts",
                LevelStatus::Completed,
                "Introduction to the core principles. We start by defining the variable types and memory allocation.",
                &["Integer: 5", "String: \"Hello\"", "Boolean: True"],
                ("What is an Integer?", &["A whole number", "text", "A decimal"], 0),
            )?,
            seed_level(
                2,
                "Control Structures",
                LevelStatus::Unlocked,
                "Loops and conditionals allow your program to make decisions and repeat tasks.",
                &["If (x > 5)", "For (i = 0; i < 10; i++)"],
                ("Which loop runs at least once?", &["For", "While", "Do-While"], 2),
            )?,
            seed_level(
                3,
                "Data Structures",
                LevelStatus::Locked,
                "Arrays, Lists, and Maps used to store collections of data efficiently.",
                &["List<String> names", "Map<Key, Value>"],
                (
                    "What is the index of the first element in an array?",
                    &["1", "0", "-1"],
                    1,
                ),
            )?,
            seed_level(
                4,
                "Algorithms",
                LevelStatus::Locked,
                "Sorting and Searching algorithms.",
                &["QuickSort", "Binary Search"],
                ("Best case for QuickSort?", &["O(n)", "O(n log n)", "O(n^2)"], 1),
            )?,
            seed_level(
                5,
                "Complexity",
                LevelStatus::Locked,
                "Big O notation and complexity analysis.",
                &["O(1)", "O(n)"],
                (
                    "Complexity of accessing array by index?",
                    &["O(1)", "O(n)", "O(log n)"],
                    0,
                ),
            )?,
        ];
        Self::new(levels)
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[must_use]
    pub fn get(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id() == id)
    }

    #[must_use]
    pub fn status(&self, id: LevelId) -> Option<LevelStatus> {
        self.get(id).map(Level::status)
    }

    /// Open a level for reading.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::NotFound` or `ProgressionError::Locked`.
    pub fn select(&self, id: LevelId) -> Result<&Level, ProgressionError> {
        let level = self.get(id).ok_or(ProgressionError::NotFound(id))?;
        if !level.status().is_open() {
            return Err(ProgressionError::Locked(id));
        }
        Ok(level)
    }

    /// Grade `chosen` against the level's gate question and advance the map on a pass.
    ///
    /// Out-of-range option indices grade as incorrect.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::NotFound` for unknown ids and
    /// `ProgressionError::Locked` for locked levels; neither mutates the map.
    pub fn submit_answer(
        &mut self,
        id: LevelId,
        chosen: usize,
    ) -> Result<QuizOutcome, ProgressionError> {
        let idx = self.index_of(id).ok_or(ProgressionError::NotFound(id))?;
        let level = &mut self.levels[idx];
        if !level.status().is_open() {
            return Err(ProgressionError::Locked(id));
        }

        let correct = level.gate_question().is_correct(chosen);
        let score = if correct { FULL_MARKS } else { 0 };
        let mut outcome = QuizOutcome {
            level_id: id,
            correct,
            score,
            unlocked: None,
        };
        if !outcome.passed() {
            return Ok(outcome);
        }

        level.set_status(LevelStatus::Completed);

        let next_id = id.next();
        if let Some(next_idx) = self.index_of(next_id) {
            let next = &mut self.levels[next_idx];
            if next.status() == LevelStatus::Locked {
                next.set_status(LevelStatus::Unlocked);
                outcome.unlocked = Some(next_id);
            }
        }
        Ok(outcome)
    }

    #[must_use]
    pub fn progress(&self) -> MapProgress {
        MapProgress {
            completed: self
                .levels
                .iter()
                .filter(|l| l.status() == LevelStatus::Completed)
                .count(),
            total: self.levels.len(),
        }
    }

    fn index_of(&self, id: LevelId) -> Option<usize> {
        self.levels.iter().position(|l| l.id() == id)
    }
}

fn seed_level(
    id: u32,
    title: &str,
    status: LevelStatus,
    content: &str,
    examples: &[&str],
    (question, options, correct): (&str, &[&str], usize),
) -> Result<Level, LevelError> {
    let quiz = QuizQuestion::new(
        question,
        options.iter().map(|o| (*o).to_string()).collect(),
        correct,
    )?;
    Level::new(
        LevelId::new(id),
        title,
        content,
        examples.iter().map(|e| (*e).to_string()).collect(),
        status,
        vec![quiz],
    )
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
