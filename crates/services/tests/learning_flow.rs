use std::sync::Arc;

use athena_core::model::{LevelId, LevelStatus};
use athena_core::progression::ProgressionError;
use athena_core::time::fixed_clock;
use services::chat::{CONNECTION_REPLY, HttpChatService, UNAVAILABLE_REPLY};
use services::learning::{LearningView, PASS_MESSAGE};
use services::{AppServices, ChatError, ChatService, LearningError, ModerationVerdict};
use storage::repository::Storage;

/// A tutor whose network is always down.
struct Unreachable;

#[async_trait::async_trait]
impl ChatService for Unreachable {
    fn start_chat(&self, _system_instruction: &str) {}

    async fn send_message(&self, _text: &str) -> Result<String, ChatError> {
        Err(ChatError::Malformed("connection reset".into()))
    }

    async fn validate_content(&self, _text: &str) -> Result<ModerationVerdict, ChatError> {
        Err(ChatError::Malformed("connection reset".into()))
    }
}

fn services(chat: Arc<dyn ChatService>) -> AppServices {
    AppServices::new(fixed_clock(), Storage::in_memory(), chat)
}

#[tokio::test]
async fn walking_the_map_from_level_two_to_five() {
    let app = services(Arc::new(HttpChatService::new(None)));
    let mut session = app.learning_session().unwrap();
    session.select_module("m1").unwrap();

    for id in 2..=5 {
        let id = LevelId::new(id);
        session.select_level(id).await.unwrap();
        assert_eq!(session.view(), LearningView::Content);
        assert_eq!(session.transcript().last().unwrap().text, UNAVAILABLE_REPLY);

        session.start_quiz().unwrap();
        let key = session
            .current_level()
            .unwrap()
            .gate_question()
            .correct_index();
        let outcome = session.submit_answer(key).await.unwrap();
        assert!(outcome.passed());
        assert_eq!(session.transcript().last().unwrap().text, PASS_MESSAGE);
        session.back();
        assert_eq!(session.view(), LearningView::Map);
    }

    let progress = session.progress();
    assert_eq!(progress.completed, progress.total);
    assert!(
        session
            .levels()
            .levels()
            .iter()
            .all(|l| l.status() == LevelStatus::Completed)
    );
}

#[tokio::test]
async fn skipping_ahead_is_refused() {
    let app = services(Arc::new(HttpChatService::new(None)));
    let mut session = app.learning_session().unwrap();
    session.select_module("m3").unwrap();

    let before = session.levels().clone();
    let err = session.select_level(LevelId::new(4)).await.unwrap_err();
    assert!(matches!(
        err,
        LearningError::Progression(ProgressionError::Locked(_))
    ));
    let err = session.select_level(LevelId::new(9)).await.unwrap_err();
    assert!(matches!(
        err,
        LearningError::Progression(ProgressionError::NotFound(_))
    ));
    assert_eq!(session.levels(), &before);
}

#[tokio::test]
async fn wrong_answer_with_tutor_down_keeps_level_open() {
    let app = services(Arc::new(Unreachable));
    let mut session = app.learning_session().unwrap();
    session.select_module("m1").unwrap();
    session.select_level(LevelId::new(2)).await.unwrap();
    session.start_quiz().unwrap();

    let outcome = session.submit_answer(7).await.unwrap();
    assert!(!outcome.correct);
    assert_eq!(outcome.unlocked, None);
    assert_eq!(session.transcript().last().unwrap().text, CONNECTION_REPLY);
    assert_eq!(
        session.levels().status(LevelId::new(2)),
        Some(LevelStatus::Unlocked)
    );
    assert_eq!(
        session.levels().status(LevelId::new(3)),
        Some(LevelStatus::Locked)
    );
}

#[tokio::test]
async fn moderation_outage_lets_posts_through() {
    let app = services(Arc::new(Unreachable));
    let mut feed = app.community_feed();
    let draft = athena_core::model::PostDraft::new(
        "Anyone up for a study group?",
        athena_core::model::PostCategory::Academic,
        None,
    )
    .unwrap();
    let id = feed.submit_post(draft).await.unwrap();
    assert_eq!(feed.posts()[0].id, id);
}
