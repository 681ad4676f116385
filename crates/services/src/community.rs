use std::sync::Arc;

use athena_core::model::{
    Attachment, Author, Comment, CommentId, Post, PostCategory, PostDraft, PostError, PostId,
    share_link,
};
use url::Url;

use crate::chat::{ChatService, moderate};
use crate::error::CommunityError;

pub const POST_REJECTED: &str = "Your post contains content that violates community guidelines.";
pub const COMMENT_REJECTED: &str = "Your comment contains inappropriate content.";

const JUST_NOW: &str = "Just now";

/// The community board: posts, their comment threads and the edit modal.
///
/// Everything new passes through moderation before it is shown.
pub struct CommunityFeed {
    chat: Arc<dyn ChatService>,
    me: Author,
    posts: Vec<Post>,
    editing: Option<PostId>,
    next_post: u64,
    next_comment: u64,
}

impl CommunityFeed {
    #[must_use]
    pub fn new(chat: Arc<dyn ChatService>, me: Author, posts: Vec<Post>) -> Self {
        let next_post = posts.iter().map(|p| p.id.value()).max().unwrap_or(0) + 1;
        let next_comment = posts
            .iter()
            .flat_map(|p| p.comments.iter().map(|c| c.id.value()))
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            chat,
            me,
            posts,
            editing: None,
            next_post,
            next_comment,
        }
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Posts shown under one category tab; archived posts are hidden unless asked for.
    pub fn visible(
        &self,
        category: Option<PostCategory>,
        archived: bool,
    ) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(move |p| {
            p.archived == archived && category.is_none_or(|c| p.category == c)
        })
    }

    #[must_use]
    pub fn find(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn editing(&self) -> Option<PostId> {
        self.editing
    }

    /// Open one of the signed-in user's posts in the modal; the next
    /// `submit_post` updates it.
    ///
    /// # Errors
    ///
    /// Returns `CommunityError::PostNotFound` if there is no such post and
    /// `CommunityError::NotOwner` if someone else wrote it.
    pub fn begin_edit(&mut self, id: PostId) -> Result<&Post, CommunityError> {
        self.owned_post_mut(id)?;
        self.editing = Some(id);
        self.find(id).ok_or(CommunityError::PostNotFound(id))
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Publish a new post, or apply the draft to the post being edited.
    ///
    /// Edits keep the old attachment unless the draft carries a new one.
    ///
    /// # Errors
    ///
    /// Returns `CommunityError::Rejected` if moderation flags the text and
    /// `CommunityError::PostNotFound` if the edited post has gone away.
    pub async fn submit_post(&mut self, draft: PostDraft) -> Result<PostId, CommunityError> {
        let verdict = moderate(self.chat.as_ref(), &draft.content).await;
        if !verdict.safe {
            let reason = verdict.reason.unwrap_or_else(|| POST_REJECTED.to_string());
            tracing::info!(%reason, "post rejected by moderation");
            return Err(CommunityError::Rejected(reason));
        }

        if let Some(id) = self.editing {
            let post = self
                .posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(CommunityError::PostNotFound(id))?;
            post.content = draft.content;
            post.category = draft.category;
            if draft.attachment.is_some() {
                post.attachment = draft.attachment;
            }
            self.editing = None;
            tracing::debug!(post = %id, "post updated");
            return Ok(id);
        }

        let id = PostId::new(self.next_post);
        self.next_post += 1;
        self.posts.insert(
            0,
            Post {
                id,
                author: self.me.clone(),
                category: draft.category,
                content: draft.content,
                timestamp: JUST_NOW.to_string(),
                likes: 0,
                liked: false,
                comment_count: 0,
                comments: Vec::new(),
                archived: false,
                attachment: draft.attachment,
            },
        );
        tracing::debug!(post = %id, "post published");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `CommunityError::Post` for blank text, `CommunityError::Rejected`
    /// if moderation flags it, or `CommunityError::PostNotFound`.
    pub async fn add_comment(
        &mut self,
        post_id: PostId,
        text: &str,
    ) -> Result<CommentId, CommunityError> {
        if text.trim().is_empty() {
            return Err(PostError::EmptyComment.into());
        }
        if self.find(post_id).is_none() {
            return Err(CommunityError::PostNotFound(post_id));
        }

        let verdict = moderate(self.chat.as_ref(), text).await;
        if !verdict.safe {
            let reason = verdict
                .reason
                .unwrap_or_else(|| COMMENT_REJECTED.to_string());
            tracing::info!(post = %post_id, %reason, "comment rejected by moderation");
            return Err(CommunityError::Rejected(reason));
        }

        let id = CommentId::new(self.next_comment);
        self.next_comment += 1;
        let comment = Comment {
            id,
            author: self.me.name.clone(),
            avatar: self.me.avatar.clone(),
            content: text.to_string(),
            timestamp: JUST_NOW.to_string(),
        };
        self.post_mut(post_id)?.push_comment(comment);
        Ok(id)
    }

    /// Remove one of the signed-in user's comments. Returns false if the
    /// comment is already gone.
    ///
    /// # Errors
    ///
    /// Returns `CommunityError::PostNotFound` if there is no such post and
    /// `CommunityError::NotCommentOwner` if someone else wrote the comment.
    pub fn delete_comment(
        &mut self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> Result<bool, CommunityError> {
        let me = self.me.name.clone();
        let post = self.post_mut(post_id)?;
        if post
            .comments
            .iter()
            .any(|c| c.id == comment_id && c.author != me)
        {
            return Err(CommunityError::NotCommentOwner(comment_id));
        }
        Ok(post.remove_comment(comment_id))
    }

    /// Remove one of the signed-in user's posts. Returns false if the post is
    /// already gone.
    ///
    /// # Errors
    ///
    /// Returns `CommunityError::NotOwner` if someone else wrote it.
    pub fn delete_post(&mut self, id: PostId) -> Result<bool, CommunityError> {
        match self.owned_post_mut(id) {
            Ok(_) => {}
            Err(CommunityError::PostNotFound(_)) => return Ok(false),
            Err(err) => return Err(err),
        }
        self.posts.retain(|p| p.id != id);
        if self.editing == Some(id) {
            self.editing = None;
        }
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns `CommunityError::PostNotFound` if there is no such post and
    /// `CommunityError::NotOwner` if someone else wrote it.
    pub fn toggle_archive(&mut self, id: PostId) -> Result<bool, CommunityError> {
        let post = self.owned_post_mut(id)?;
        post.archived = !post.archived;
        Ok(post.archived)
    }

    /// # Errors
    ///
    /// Returns `CommunityError::PostNotFound` if there is no such post.
    pub fn toggle_like(&mut self, id: PostId) -> Result<u32, CommunityError> {
        let post = self.post_mut(id)?;
        post.toggle_like();
        Ok(post.likes)
    }

    /// # Errors
    ///
    /// Returns `CommunityError::PostNotFound` for unknown posts, or
    /// `CommunityError::Post` if `base` is not an absolute URL.
    pub fn share_link(&self, base: &str, id: PostId) -> Result<Url, CommunityError> {
        if self.find(id).is_none() {
            return Err(CommunityError::PostNotFound(id));
        }
        Ok(share_link(base, id)?)
    }

    fn post_mut(&mut self, id: PostId) -> Result<&mut Post, CommunityError> {
        self.posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CommunityError::PostNotFound(id))
    }

    fn owned_post_mut(&mut self, id: PostId) -> Result<&mut Post, CommunityError> {
        let me = self.me.name.clone();
        let post = self.post_mut(id)?;
        if post.author.name != me {
            return Err(CommunityError::NotOwner(id));
        }
        Ok(post)
    }
}

/// The signed-in student.
#[must_use]
pub fn current_user() -> Author {
    Author {
        name: "John Snow".into(),
        avatar: "https://upload.wikimedia.org/wikipedia/commons/a/a9/Kit_Harington_(9344991227).jpg"
            .into(),
        role: "Student".into(),
    }
}

fn author(name: &str, avatar: &str, role: &str) -> Author {
    Author {
        name: name.into(),
        avatar: avatar.into(),
        role: role.into(),
    }
}

fn comment(id: u64, name: &str, avatar: &str, content: &str, timestamp: &str) -> Comment {
    Comment {
        id: CommentId::new(id),
        author: name.into(),
        avatar: avatar.into(),
        content: content.into(),
        timestamp: timestamp.into(),
    }
}

const SARAH: &str = "https://images.unsplash.com/photo-1494790108377-be9c29b29330?auto=format&fit=crop&q=80&w=150";
const DAVID: &str = "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?auto=format&fit=crop&q=80&w=150";
const JAMES: &str = "https://images.unsplash.com/photo-1599566150163-29194dcaad36?auto=format&fit=crop&q=80&w=150";
const EMILY: &str = "https://images.unsplash.com/photo-1580489944761-15a19d654956?auto=format&fit=crop&q=80&w=150";
const TOM: &str = "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?auto=format&fit=crop&q=80&w=150";
const MICHAEL: &str = "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?auto=format&fit=crop&q=80&w=150";

/// Posts the board opens with.
#[must_use]
pub fn seeded_posts() -> Vec<Post> {
    vec![
        Post {
            id: PostId::new(1),
            author: author("Sarah Chen", SARAH, "Student"),
            category: PostCategory::Academic,
            content: "Has anyone started the Algorithm Analysis essay yet? I am slightly confused about the requirements for the \"Time Complexity\" section. Are we supposed to include pseudo-code or just the mathematical proof?".into(),
            timestamp: "2 hours ago".into(),
            likes: 12,
            liked: false,
            comment_count: 2,
            comments: vec![
                comment(1, "David Kim", DAVID, "Just the proof is fine, pseudo-code is optional but helpful.", "1 hour ago"),
                comment(2, "Sarah Chen", SARAH, "Great, thanks David!", "30 mins ago"),
            ],
            archived: false,
            attachment: None,
        },
        Post {
            id: PostId::new(2),
            author: author("James Wilson", JAMES, "Class Rep"),
            category: PostCategory::Announcement,
            content: "Reminder: The student union is hosting a coffee morning for all CS students this Friday at 10 AM. Free pastries!".into(),
            timestamp: "5 hours ago".into(),
            likes: 45,
            liked: false,
            comment_count: 0,
            comments: Vec::new(),
            archived: false,
            attachment: Some(Attachment::Image {
                uri: "https://images.unsplash.com/photo-1514432324607-a09d9b4aefdd?auto=format&fit=crop&q=80&w=600".into(),
            }),
        },
        Post {
            id: PostId::new(3),
            author: author("Emily Davis", EMILY, "Student"),
            category: PostCategory::NonAcademic,
            content: "Found a blue water bottle in the Roger Stevens lecture hall (LT 20) after the Mechanics lecture. Left it at the front desk!".into(),
            timestamp: "1 day ago".into(),
            likes: 5,
            liked: false,
            comment_count: 1,
            comments: vec![comment(3, "Tom Holland", TOM, "I think that belongs to Matt!", "20 hours ago")],
            archived: false,
            attachment: None,
        },
        Post {
            id: PostId::new(4),
            author: author("Michael Chang", MICHAEL, "Student"),
            category: PostCategory::Academic,
            content: "Here are my notes from today's Linear Algebra lecture if anyone missed it. The professor went really fast through the Eigenvalues part.".into(),
            timestamp: "1 day ago".into(),
            likes: 28,
            liked: false,
            comment_count: 0,
            comments: Vec::new(),
            archived: false,
            attachment: Some(Attachment::File {
                name: "Linear_Algebra_Week4_Notes.pdf".into(),
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ModerationVerdict;
    use crate::error::ChatError;
    use async_trait::async_trait;

    /// Flags anything containing "idiot"; optionally without a reason.
    struct WordFilter {
        give_reason: bool,
    }

    #[async_trait]
    impl ChatService for WordFilter {
        fn start_chat(&self, _system_instruction: &str) {}

        async fn send_message(&self, _text: &str) -> Result<String, ChatError> {
            Err(ChatError::Disabled)
        }

        async fn validate_content(&self, text: &str) -> Result<ModerationVerdict, ChatError> {
            if !text.contains("idiot") {
                return Ok(ModerationVerdict::safe());
            }
            Ok(if self.give_reason {
                ModerationVerdict::unsafe_because("insult")
            } else {
                ModerationVerdict {
                    safe: false,
                    reason: None,
                }
            })
        }
    }

    fn feed(give_reason: bool) -> CommunityFeed {
        CommunityFeed::new(
            Arc::new(WordFilter { give_reason }),
            current_user(),
            seeded_posts(),
        )
    }

    fn draft(text: &str, attachment: Option<Attachment>) -> PostDraft {
        PostDraft::new(text, PostCategory::Social, attachment).unwrap()
    }

    #[tokio::test]
    async fn new_post_goes_to_the_top() {
        let mut feed = feed(true);
        let id = feed.submit_post(draft("study group tonight?", None)).await.unwrap();
        assert_eq!(id, PostId::new(5));
        let top = &feed.posts()[0];
        assert_eq!(top.id, id);
        assert_eq!(top.author.name, "John Snow");
        assert_eq!(top.timestamp, "Just now");
        assert_eq!(top.likes, 0);
    }

    #[tokio::test]
    async fn flagged_post_is_rejected_with_reason() {
        let mut loud = feed(true);
        let err = loud
            .submit_post(draft("you idiot", None))
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::Rejected(ref r) if r == "insult"));
        assert_eq!(loud.posts().len(), 4);

        let mut quiet = feed(false);
        let err = quiet
            .submit_post(draft("you idiot", None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), POST_REJECTED);
    }

    #[tokio::test]
    async fn edit_keeps_attachment_unless_replaced() {
        let mut feed = feed(true);
        let photo = Attachment::from_upload("cake.png", "image/png", "blob:cake");
        let id = feed
            .submit_post(draft("bake sale friday", Some(photo)))
            .await
            .unwrap();

        feed.begin_edit(id).unwrap();
        feed.submit_post(draft("bake sale moved to monday", None))
            .await
            .unwrap();
        let post = feed.find(id).unwrap();
        assert_eq!(post.content, "bake sale moved to monday");
        assert!(matches!(post.attachment, Some(Attachment::Image { .. })));
        assert!(feed.editing().is_none());

        feed.begin_edit(id).unwrap();
        let file = Attachment::from_upload("menu.pdf", "application/pdf", "blob:1");
        feed.submit_post(draft("menu attached", Some(file.clone())))
            .await
            .unwrap();
        assert_eq!(feed.find(id).unwrap().attachment, Some(file));
        assert_eq!(feed.posts().len(), 5);
    }

    #[tokio::test]
    async fn other_peoples_content_cannot_be_changed() {
        let mut feed = feed(true);
        let sarahs = PostId::new(1);
        let before = feed.find(sarahs).unwrap().clone();

        assert!(matches!(
            feed.begin_edit(sarahs),
            Err(CommunityError::NotOwner(_))
        ));
        assert!(feed.editing().is_none());
        // With no edit open, submitting publishes a new post instead.
        let id = feed.submit_post(draft("hijacked", None)).await.unwrap();
        assert_ne!(id, sarahs);

        assert!(matches!(
            feed.delete_comment(sarahs, CommentId::new(1)),
            Err(CommunityError::NotCommentOwner(_))
        ));
        assert!(matches!(
            feed.toggle_archive(sarahs),
            Err(CommunityError::NotOwner(_))
        ));
        assert!(matches!(
            feed.delete_post(sarahs),
            Err(CommunityError::NotOwner(_))
        ));
        assert_eq!(feed.find(sarahs), Some(&before));
    }

    #[tokio::test]
    async fn comments_are_moderated_and_counted() {
        let mut feed = feed(false);
        let post = PostId::new(2);

        let err = feed.add_comment(post, "what an idiot").await.unwrap_err();
        assert_eq!(err.to_string(), COMMENT_REJECTED);
        assert!(matches!(
            feed.add_comment(post, "  ").await,
            Err(CommunityError::Post(PostError::EmptyComment))
        ));

        let id = feed.add_comment(post, "see you there").await.unwrap();
        assert_eq!(id, CommentId::new(4));
        assert_eq!(feed.find(post).unwrap().comment_count, 1);

        assert!(feed.delete_comment(post, id).unwrap());
        assert!(!feed.delete_comment(post, id).unwrap());
        assert_eq!(feed.find(post).unwrap().comment_count, 0);
    }

    #[tokio::test]
    async fn comment_on_missing_post_fails() {
        let mut feed = feed(true);
        assert!(matches!(
            feed.add_comment(PostId::new(99), "hi").await,
            Err(CommunityError::PostNotFound(_))
        ));
    }

    #[test]
    fn anyone_can_like() {
        let mut feed = feed(true);
        let id = PostId::new(1);
        assert_eq!(feed.toggle_like(id).unwrap(), 13);
        assert_eq!(feed.toggle_like(id).unwrap(), 12);
    }

    #[tokio::test]
    async fn own_post_can_be_archived_and_deleted() {
        let mut feed = feed(true);
        let id = feed.submit_post(draft("selling a bike", None)).await.unwrap();

        assert!(feed.toggle_archive(id).unwrap());
        assert_eq!(feed.visible(None, false).count(), 4);
        assert_eq!(feed.visible(Some(PostCategory::Social), true).count(), 1);

        feed.begin_edit(id).unwrap();
        assert!(feed.delete_post(id).unwrap());
        assert!(feed.editing().is_none());
        assert!(!feed.delete_post(id).unwrap());
        assert!(feed.find(id).is_none());
    }

    #[test]
    fn share_link_points_at_the_post() {
        let feed = feed(true);
        let url = feed
            .share_link("https://athena.example/app?tab=1", PostId::new(3))
            .unwrap();
        assert_eq!(url.as_str(), "https://athena.example/app#/community?id=3");
        assert!(matches!(
            feed.share_link("https://athena.example/", PostId::new(42)),
            Err(CommunityError::PostNotFound(_))
        ));
    }
}
