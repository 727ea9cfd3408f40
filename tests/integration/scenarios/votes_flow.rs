use crate::helpers::client::TestClient;
use crate::helpers::mock_server::MockServer;
use forest_api::PostApi;
use forest_client::cli::{Command, VoteDirection};
use forest_client::{commands, Route};
use std::sync::atomic::Ordering;
use views::{ToastKind, VoteControl, VoteOutcome, VoteState};

/// 未ログインの投票はリクエストを送らずログイン画面へ
#[tokio::test]
async fn test_unauthenticated_vote_sends_nothing() {
    let server = MockServer::start().await;
    let id = server.backend.seed_post("Hello", "rust", "bob", "text");
    let client = TestClient::new(&server).await;

    let res = commands::run(
        &client.state,
        &Command::Vote {
            direction: VoteDirection::Up,
            post_id: id,
        },
    )
    .await;

    assert!(res.is_err());
    assert_eq!(server.backend.vote_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        client.state.router.current(),
        Route::Login { registered: false }
    );
    assert_eq!(
        client.notifier.messages(ToastKind::Error),
        vec!["You must be logged in to vote.".to_string()]
    );
}

/// 送信中の二度押しは無視され、リクエストは 1 回だけ
#[tokio::test]
async fn test_double_click_sends_one_vote() {
    let server = MockServer::start().await;
    server.backend.vote_delay_ms.store(200, Ordering::SeqCst);
    let id = server.backend.seed_post("Hello", "rust", "bob", "text");
    let client = TestClient::new(&server).await;
    client.login("alice").await;

    let post = client.state.posts.get(&id).await.unwrap();
    let control = VoteControl::new(
        post,
        client.state.votes.clone(),
        client.state.posts.clone(),
        client.state.session.clone(),
        client.notifier.clone(),
        client.state.router.clone(),
    );

    let (first, second) = tokio::join!(control.upvote(), control.upvote());

    assert_eq!(first, VoteOutcome::Applied);
    assert_eq!(second, VoteOutcome::Ignored);
    assert_eq!(server.backend.vote_calls.load(Ordering::SeqCst), 1);
    assert_eq!(control.state(), VoteState::Upvoted);
    assert_eq!(control.vote_count(), 1);
    assert_eq!(control.previous_vote_count(), 0);
    assert!(!control.is_loading());
}

/// 同じ向きをもう一度押すと取り消し、逆向きは切り替え
#[tokio::test]
async fn test_vote_toggle_and_switch() {
    let server = MockServer::start().await;
    let id = server.backend.seed_post("Hello", "rust", "bob", "text");
    let client = TestClient::new(&server).await;
    client.login("alice").await;

    let post = client.state.posts.get(&id).await.unwrap();
    let control = VoteControl::new(
        post,
        client.state.votes.clone(),
        client.state.posts.clone(),
        client.state.session.clone(),
        client.notifier.clone(),
        client.state.router.clone(),
    );

    assert_eq!(control.upvote().await, VoteOutcome::Applied);
    assert_eq!(control.vote_count(), 1);

    assert_eq!(control.downvote().await, VoteOutcome::Applied);
    assert_eq!(control.state(), VoteState::Downvoted);
    assert_eq!(control.vote_count(), -1);

    assert_eq!(control.downvote().await, VoteOutcome::Applied);
    assert_eq!(control.state(), VoteState::None);
    assert_eq!(control.vote_count(), 0);
    assert_eq!(server.backend.vote_calls.load(Ordering::SeqCst), 3);
}
