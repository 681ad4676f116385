mod class_session;
mod ids;
mod level;
mod module;
mod notification;
mod post;

pub use ids::{CommentId, LevelId, NotificationId, ParseIdError, PostId, SessionId};

pub use class_session::{
    Attendance, AttendanceLabel, ClassSession, ClassSessionError, NewClassSession, weekday_name,
};
pub use level::{Level, LevelError, LevelStatus, QuizQuestion};
pub use module::{
    Assignment, AssignmentStatus, Module, ModuleCatalog, ModuleError, ModuleStatus,
};
pub use notification::{Notification, NotificationInbox, NotificationKind};
pub use post::{Attachment, Author, Comment, Post, PostCategory, PostDraft, PostError, share_link};
