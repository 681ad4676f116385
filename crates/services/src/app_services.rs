use std::sync::Arc;

use athena_core::model::{Module, ModuleCatalog, ModuleError, NotificationInbox};
use athena_core::progression::LevelMap;
use athena_core::search::{SERVICE_GROUPS, SearchIndex, Suggestion};
use storage::repository::Storage;

use crate::Clock;
use crate::chat::{ChatService, HttpChatService};
use crate::community::{CommunityFeed, current_user, seeded_posts};
use crate::error::AppServicesError;
use crate::learning::LearningSession;
use crate::notifications::seeded_inbox;
use crate::timetable::TimetableBoard;

/// Builds the tutor conversation for one learning session.
pub type TutorFactory = Arc<dyn Fn() -> Arc<dyn ChatService> + Send + Sync>;

/// Assembles the app-facing views over one storage backend and chat client.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    chat: Arc<dyn ChatService>,
    tutors: TutorFactory,
    catalog: Arc<ModuleCatalog>,
    search: Arc<SearchIndex>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the chat backend from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let chat = Arc::new(HttpChatService::from_env());
        if !chat.enabled() {
            tracing::info!("ATHENA_AI_API_KEY not set, tutor and moderation are offline");
        }
        let base = Arc::clone(&chat);
        Ok(Self::new(clock, storage, chat)
            .with_tutors(Arc::new(move || -> Arc<dyn ChatService> { Arc::new(base.fork()) })))
    }

    /// Every learning session talks to `chat` unless [`Self::with_tutors`] says otherwise.
    #[must_use]
    pub fn new(clock: Clock, storage: Storage, chat: Arc<dyn ChatService>) -> Self {
        let catalog = ModuleCatalog::seeded();
        let search = SearchIndex::build(&catalog, SERVICE_GROUPS);
        let shared = Arc::clone(&chat);
        Self {
            clock,
            storage,
            chat,
            tutors: Arc::new(move || Arc::clone(&shared)),
            catalog: Arc::new(catalog),
            search: Arc::new(search),
        }
    }

    /// Give each learning session its own conversation from `tutors`.
    #[must_use]
    pub fn with_tutors(mut self, tutors: TutorFactory) -> Self {
        self.tutors = tutors;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn chat(&self) -> Arc<dyn ChatService> {
        Arc::clone(&self.chat)
    }

    /// A fresh, unloaded timetable board.
    #[must_use]
    pub fn timetable(&self) -> TimetableBoard {
        TimetableBoard::new(self.clock, Arc::clone(&self.storage.sessions))
    }

    /// Start a learning session on the built-in curriculum.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Domain` if the curriculum fails validation.
    pub fn learning_session(&self) -> Result<LearningSession, AppServicesError> {
        let levels = LevelMap::seeded()?;
        Ok(LearningSession::new(
            (self.tutors)(),
            ModuleCatalog::clone(&self.catalog),
            levels,
        ))
    }

    #[must_use]
    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    /// Modules page list, filtered by name, code or instructor.
    pub fn modules<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Module> {
        self.catalog.search(query)
    }

    /// Open a module's detail page.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError` for unknown or closed modules.
    pub fn open_module(&self, id: &str) -> Result<&Module, ModuleError> {
        self.catalog.open(id)
    }

    /// Header search box suggestions.
    #[must_use]
    pub fn search_suggestions(&self, query: &str) -> Vec<&Suggestion> {
        self.search.suggest(query)
    }

    #[must_use]
    pub fn community_feed(&self) -> CommunityFeed {
        CommunityFeed::new(Arc::clone(&self.chat), current_user(), seeded_posts())
    }

    #[must_use]
    pub fn notifications(&self) -> NotificationInbox {
        seeded_inbox()
    }
}
