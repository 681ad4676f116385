use std::sync::Arc;

use athena_core::model::{Level, LevelId, Module, ModuleCatalog, ModuleError};
use athena_core::progression::{LevelMap, MapProgress, QuizOutcome};

use crate::chat::{ChatService, tutor_reply};
use crate::error::LearningError;

pub const TUTOR_INSTRUCTION: &str = "You are Athena, a helpful university AI tutor. Guide the student through topics. When they fail a quiz, explain WHY they were wrong but do NOT give the answer key directly. Be encouraging.";

pub const GREETING: &str = "Hello! I'm Athena. What are we learning today?";

pub const PASS_MESSAGE: &str =
    "Congratulations! That answer is correct. You've unlocked the next level.";

/// Screen shown by the learning page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningView {
    Selection,
    Map,
    Content,
    Quiz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Learner,
    Tutor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub speaker: Speaker,
    pub text: String,
}

/// One learner's pass through the learning map.
///
/// Owns the level map, the current screen and the tutor transcript. Level
/// progress lives only as long as this value.
pub struct LearningSession {
    chat: Arc<dyn ChatService>,
    catalog: ModuleCatalog,
    levels: LevelMap,
    view: LearningView,
    module_id: Option<String>,
    current_level: Option<LevelId>,
    transcript: Vec<ChatLine>,
    last_score: Option<u8>,
}

impl LearningSession {
    #[must_use]
    pub fn new(chat: Arc<dyn ChatService>, catalog: ModuleCatalog, levels: LevelMap) -> Self {
        chat.start_chat(TUTOR_INSTRUCTION);
        Self {
            chat,
            catalog,
            levels,
            view: LearningView::Selection,
            module_id: None,
            current_level: None,
            transcript: vec![ChatLine {
                speaker: Speaker::Tutor,
                text: GREETING.to_string(),
            }],
            last_score: None,
        }
    }

    #[must_use]
    pub fn view(&self) -> LearningView {
        self.view
    }

    /// Open modules offered on the selection screen.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.catalog.open_modules()
    }

    #[must_use]
    pub fn selected_module(&self) -> Option<&Module> {
        self.catalog.get(self.module_id.as_deref()?)
    }

    #[must_use]
    pub fn levels(&self) -> &LevelMap {
        &self.levels
    }

    #[must_use]
    pub fn progress(&self) -> MapProgress {
        self.levels.progress()
    }

    #[must_use]
    pub fn current_level(&self) -> Option<&Level> {
        self.current_level.and_then(|id| self.levels.get(id))
    }

    #[must_use]
    pub fn transcript(&self) -> &[ChatLine] {
        &self.transcript
    }

    #[must_use]
    pub fn last_score(&self) -> Option<u8> {
        self.last_score
    }

    /// Free-form question to the tutor. Blank input is ignored.
    pub async fn send(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.say(Speaker::Learner, text);
        let reply = tutor_reply(self.chat.as_ref(), text).await;
        self.say(Speaker::Tutor, reply);
    }

    /// # Errors
    ///
    /// Returns `LearningError::UnknownModule` if `module_id` is not in the
    /// catalog and `LearningError::ModuleClosed` if it is not running this term.
    pub fn select_module(&mut self, module_id: &str) -> Result<(), LearningError> {
        let name = match self.catalog.open(module_id) {
            Ok(module) => module.name.clone(),
            Err(ModuleError::Closed(code)) => return Err(LearningError::ModuleClosed(code)),
            Err(_) => return Err(LearningError::UnknownModule(module_id.to_string())),
        };

        self.module_id = Some(module_id.to_string());
        self.view = LearningView::Map;
        self.say(
            Speaker::Tutor,
            format!("Excellent choice! Let's master {name}. Select a level to begin."),
        );
        Ok(())
    }

    /// Open a level's reading material and ask the tutor for an intro.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::NoModuleSelected` unless the map is showing, and
    /// `LearningError::Progression` for locked or unknown levels; the session is
    /// left as it was.
    pub async fn select_level(&mut self, id: LevelId) -> Result<(), LearningError> {
        if self.view != LearningView::Map {
            return Err(LearningError::NoModuleSelected);
        }
        let title = self.levels.select(id)?.title().to_string();
        self.current_level = Some(id);
        self.view = LearningView::Content;
        self.last_score = None;

        let prompt = format!("I am starting level {id}: {title}. Give me a brief intro.");
        let reply = tutor_reply(self.chat.as_ref(), &prompt).await;
        self.say(Speaker::Tutor, reply);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `LearningError::NoLevelOpen` unless a level's content is showing.
    pub fn start_quiz(&mut self) -> Result<(), LearningError> {
        if self.current_level.is_none() || self.view != LearningView::Content {
            return Err(LearningError::NoLevelOpen);
        }
        self.view = LearningView::Quiz;
        Ok(())
    }

    /// Grade an answer to the open level's quiz.
    ///
    /// A pass is announced in the transcript; a miss asks the tutor to explain
    /// what was wrong with the chosen option.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::NoLevelOpen` or `LearningError::QuizNotStarted`
    /// outside the quiz screen, and `LearningError::Progression` if the engine
    /// refuses the level.
    pub async fn submit_answer(&mut self, option: usize) -> Result<QuizOutcome, LearningError> {
        let id = self.current_level.ok_or(LearningError::NoLevelOpen)?;
        if self.view != LearningView::Quiz {
            return Err(LearningError::QuizNotStarted(id));
        }

        let outcome = self.levels.submit_answer(id, option)?;
        self.last_score = Some(outcome.score);

        if outcome.passed() {
            self.say(Speaker::Tutor, PASS_MESSAGE);
            return Ok(outcome);
        }

        let prompt = self
            .levels
            .get(id)
            .map(|level| {
                let question = level.gate_question();
                let chosen = question.option(option).unwrap_or("(no option)");
                format!(
                    "I answered \"{chosen}\" for the question \"{}\" and it was wrong. Help me understand why.",
                    question.question()
                )
            })
            .ok_or(LearningError::NoLevelOpen)?;
        let reply = tutor_reply(self.chat.as_ref(), &prompt).await;
        self.say(Speaker::Tutor, reply);
        Ok(outcome)
    }

    /// Header back button: map goes to selection, content and quiz go to the map.
    pub fn back(&mut self) {
        match self.view {
            LearningView::Selection => {}
            LearningView::Map => {
                self.view = LearningView::Selection;
                self.module_id = None;
            }
            LearningView::Content | LearningView::Quiz => {
                self.view = LearningView::Map;
            }
        }
    }

    fn say(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.transcript.push(ChatLine {
            speaker,
            text: text.into(),
        });
    }
}
