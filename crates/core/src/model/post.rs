use thiserror::Error;
use url::Url;

use crate::model::ids::{CommentId, PostId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PostError {
    #[error("post content cannot be empty")]
    EmptyContent,

    #[error("comment content cannot be empty")]
    EmptyComment,

    #[error("invalid share base url: {0}")]
    InvalidShareBase(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostCategory {
    Academic,
    NonAcademic,
    Event,
    Announcement,
    Social,
}

impl PostCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PostCategory::Academic => "Academic",
            PostCategory::NonAcademic => "Non-Academic",
            PostCategory::Event => "Event",
            PostCategory::Announcement => "Announcement",
            PostCategory::Social => "Social",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub avatar: String,
    pub role: String,
}

/// Something uploaded with a post. Images render inline, anything else is a file chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    Image { uri: String },
    File { name: String },
}

impl Attachment {
    /// Classify an upload by its MIME type.
    #[must_use]
    pub fn from_upload(name: impl Into<String>, mime: &str, uri: impl Into<String>) -> Self {
        if mime.starts_with("image/") {
            Attachment::Image { uri: uri.into() }
        } else {
            Attachment::File { name: name.into() }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub author: String,
    pub avatar: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub author: Author,
    pub category: PostCategory,
    pub content: String,
    pub timestamp: String,
    pub likes: u32,
    pub liked: bool,
    /// Shown count; seeded posts carry a count without the loaded thread.
    pub comment_count: u32,
    pub comments: Vec<Comment>,
    pub archived: bool,
    pub attachment: Option<Attachment>,
}

impl Post {
    pub fn toggle_like(&mut self) {
        if self.liked {
            self.likes = self.likes.saturating_sub(1);
        } else {
            self.likes = self.likes.saturating_add(1);
        }
        self.liked = !self.liked;
    }

    pub fn push_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
        self.comment_count = self.comment_count.saturating_add(1);
    }

    /// Returns true if a comment was removed.
    pub fn remove_comment(&mut self, id: CommentId) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != id);
        if self.comments.len() == before {
            return false;
        }
        self.comment_count = self.comment_count.saturating_sub(1);
        true
    }
}

/// What the author typed into the post modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub content: String,
    pub category: PostCategory,
    pub attachment: Option<Attachment>,
}

impl PostDraft {
    /// # Errors
    ///
    /// Returns `PostError::EmptyContent` if the content is blank.
    pub fn new(
        content: impl Into<String>,
        category: PostCategory,
        attachment: Option<Attachment>,
    ) -> Result<Self, PostError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(PostError::EmptyContent);
        }
        Ok(Self {
            content,
            category,
            attachment,
        })
    }
}

/// Deep link that reopens the feed scrolled to `id`.
///
/// # Errors
///
/// Returns `PostError::InvalidShareBase` if `base` is not an absolute URL.
pub fn share_link(base: &str, id: PostId) -> Result<Url, PostError> {
    let mut url = Url::parse(base).map_err(|e| PostError::InvalidShareBase(e.to_string()))?;
    url.set_query(None);
    url.set_fragment(Some(&format!("/community?id={id}")));
    Ok(url)
}
