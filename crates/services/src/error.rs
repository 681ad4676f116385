//! Shared error types for the services crate.

use thiserror::Error;

use athena_core::model::{CommentId, LevelId, PostError, PostId, SessionId};
use athena_core::progression::{LevelMapError, ProgressionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `HttpChatService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatError {
    #[error("chat service is not configured")]
    Disabled,
    #[error("chat service returned an empty response")]
    EmptyResponse,
    #[error("chat service returned malformed content: {0}")]
    Malformed(String),
    #[error("chat request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `TimetableBoard`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TimetableError {
    #[error("class {0} is not on the board")]
    UnknownSession(SessionId),
    #[error("class {0} is not editable")]
    NotEditable(SessionId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LearningSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LearningError {
    #[error("unknown module: {0}")]
    UnknownModule(String),
    #[error("module {0} is closed this term")]
    ModuleClosed(String),
    #[error("choose a module before opening a level")]
    NoModuleSelected,
    #[error("no level is open")]
    NoLevelOpen,
    #[error("quiz for level {0} has not been started")]
    QuizNotStarted(LevelId),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
}

/// Errors emitted by `CommunityFeed`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CommunityError {
    #[error("{0}")]
    Rejected(String),
    #[error("post {0} not found")]
    PostNotFound(PostId),
    #[error("post {0} belongs to someone else")]
    NotOwner(PostId),
    #[error("comment {0} belongs to someone else")]
    NotCommentOwner(CommentId),
    #[error(transparent)]
    Post(#[from] PostError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Domain(#[from] athena_core::Error),
}

impl From<LevelMapError> for AppServicesError {
    fn from(err: LevelMapError) -> Self {
        Self::Domain(err.into())
    }
}
