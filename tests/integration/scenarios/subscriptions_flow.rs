use crate::helpers::client::TestClient;
use crate::helpers::mock_server::MockServer;
use forest_client::cli::{Command, SubredditsAction};
use forest_client::commands;
use std::sync::atomic::Ordering;
use views::SubredditList;

fn list(client: &TestClient) -> SubredditList {
    SubredditList::new(
        client.state.subreddits.clone(),
        client.state.subscriptions.clone(),
    )
}

#[tokio::test]
async fn test_subscriptions_mark_subreddits() {
    let server = MockServer::start().await;
    server.backend.seed_subreddit("sub1", "First");
    server.backend.seed_subreddit("sub2", "Second");
    server.backend.seed_subreddit("sub3", "Third");
    server.backend.set_subscriptions(&["sub1", "sub2"]);
    let client = TestClient::new(&server).await;
    client.login("alice").await;

    let view = list(&client);
    view.load().await.unwrap();

    assert_eq!(view.subreddits().len(), 3);
    assert!(view.is_subscribed("sub1"));
    assert!(view.is_subscribed("sub2"));
    assert!(!view.is_subscribed("sub3"));
}

/// 購読・解除のあとは一覧を取り直す
#[tokio::test]
async fn test_subscribe_and_unsubscribe_refetch() {
    let server = MockServer::start().await;
    server.backend.seed_subreddit("rust", "Rustaceans");
    let client = TestClient::new(&server).await;
    client.login("alice").await;

    let view = list(&client);
    view.load().await.unwrap();
    assert!(!view.is_subscribed("rust"));

    view.subscribe("rust").await.unwrap();
    assert!(view.is_subscribed("rust"));
    assert_eq!(server.backend.data.lock().unwrap().subscriptions, vec!["rust".to_string()]);

    view.unsubscribe("rust").await.unwrap();
    assert!(!view.is_subscribed("rust"));
    assert!(server.backend.data.lock().unwrap().subscriptions.is_empty());
}

#[tokio::test]
async fn test_subscribe_command_encodes_name() {
    let server = MockServer::start().await;
    let client = TestClient::new(&server).await;
    client.login("alice").await;

    commands::run(
        &client.state,
        &Command::Subreddits {
            action: SubredditsAction::Subscribe {
                name: "rust lang".to_string(),
            },
        },
    )
    .await
    .unwrap();

    assert_eq!(
        server.backend.data.lock().unwrap().subscriptions,
        vec!["rust lang".to_string()]
    );
}

/// 未ログインでも一覧は表示でき、購読一覧の 401 はエラーにしない
#[tokio::test]
async fn test_subreddit_list_opens_when_logged_out() {
    let server = MockServer::start().await;
    server.backend.seed_subreddit("rust", "Rustaceans");
    let client = TestClient::new(&server).await;

    commands::run(
        &client.state,
        &Command::Open {
            path: "/list-subreddits".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(server.backend.unauthorized_responses.load(Ordering::SeqCst), 1);
    assert_eq!(server.backend.refresh_calls.load(Ordering::SeqCst), 0);
}
