#![forbid(unsafe_code)]

pub mod app_services;
pub mod chat;
pub mod community;
pub mod error;
pub mod learning;
pub mod notifications;
pub mod timetable;

pub use athena_core::Clock;

pub use app_services::AppServices;
pub use chat::{ChatService, HttpChatService, ModerationVerdict};
pub use community::CommunityFeed;
pub use error::{AppServicesError, ChatError, CommunityError, LearningError, TimetableError};
pub use learning::{LearningSession, LearningView};
pub use timetable::TimetableBoard;
