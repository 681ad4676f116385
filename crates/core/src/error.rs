use thiserror::Error;

use crate::model::{ClassSessionError, LevelError, ModuleError, PostError};
use crate::progression::{LevelMapError, ProgressionError};

/// Any domain error raised by this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    LevelMap(#[from] LevelMapError),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error(transparent)]
    ClassSession(#[from] ClassSessionError),
    #[error(transparent)]
    Post(#[from] PostError),
    #[error(transparent)]
    Module(#[from] ModuleError),
}
