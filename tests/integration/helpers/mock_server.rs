//! テスト用の Forest バックエンド（インメモリ）

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

pub const PASSWORD: &str = "password";

#[derive(Default)]
pub struct Data {
    pub valid_token: Option<String>,
    pub current_user: Option<String>,
    pub token_seq: usize,
    pub posts: Vec<Value>,
    pub next_post_id: usize,
    pub subreddits: Vec<Value>,
    pub subscriptions: Vec<String>,
}

#[derive(Default)]
pub struct Backend {
    pub data: Mutex<Data>,
    pub vote_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub unauthorized_responses: AtomicUsize,
    pub fail_logout: AtomicBool,
    pub fail_chat: AtomicBool,
    pub vote_delay_ms: AtomicU64,
    pub refresh_delay_ms: AtomicU64,
}

impl Backend {
    fn issue_token(&self, username: &str) -> String {
        let mut data = self.data.lock().unwrap();
        data.token_seq += 1;
        let token = format!("token-{}", data.token_seq);
        data.valid_token = Some(token.clone());
        data.current_user = Some(username.to_string());
        token
    }

    /// Invalidates the token handed out last, as if it had expired server-side.
    pub fn expire_token(&self) {
        self.data.lock().unwrap().valid_token = Some("expired".to_string());
    }

    pub fn seed_post(&self, title: &str, subreddit: &str, author: &str, description: &str) -> String {
        let mut data = self.data.lock().unwrap();
        data.next_post_id += 1;
        let id = data.next_post_id.to_string();
        data.posts.push(post_json(&id, title, subreddit, author, "", description));
        id
    }

    pub fn seed_subreddit(&self, name: &str, description: &str) -> String {
        let mut data = self.data.lock().unwrap();
        let id = (data.subreddits.len() + 1).to_string();
        data.subreddits.push(json!({
            "id": id,
            "name": name,
            "description": description,
            "userName": "admin",
        }));
        id
    }

    pub fn set_subscriptions(&self, names: &[&str]) {
        self.data.lock().unwrap().subscriptions = names.iter().map(|s| s.to_string()).collect();
    }

    fn check_auth(&self, headers: &HeaderMap) -> Result<String, Response> {
        let presented = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        let data = self.data.lock().unwrap();
        match (presented, data.valid_token.as_deref(), data.current_user.as_deref()) {
            (Some(p), Some(valid), Some(user)) if p == valid => Ok(user.to_string()),
            _ => {
                self.unauthorized_responses.fetch_add(1, Ordering::SeqCst);
                Err((
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Token expired or invalid" })),
                )
                    .into_response())
            }
        }
    }
}

fn post_json(id: &str, title: &str, subreddit: &str, author: &str, url: &str, description: &str) -> Value {
    json!({
        "id": id,
        "postName": title,
        // Mongo には空の URL を保存しない
        "url": if url.is_empty() { Value::Null } else { json!(url) },
        "description": description,
        "voteCount": 0,
        "userName": author,
        "subredditName": subreddit,
        "commentCount": 0,
        "duration": "just now",
        "upVote": false,
        "downVote": false,
        "notificationStatus": false,
    })
}

pub struct MockServer {
    pub port: u16,
    pub backend: Arc<Backend>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockServer {
    pub async fn start() -> Self {
        let backend = Arc::new(Backend::default());
        let app = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/register", post(register))
            .route("/api/v1/auth/refresh/token", post(refresh))
            .route("/api/v1/auth/logout", post(logout))
            .route("/api/v1/auth/forgot-password", post(forgot_password))
            .route("/api/v1/auth/reset-password", post(reset_password))
            .route("/api/v1/auth/interests", post(interests))
            .route(
                "/api/v1/mongo/posts/",
                get(all_posts).post(create_post).put(update_post),
            )
            .route("/api/v1/mongo/posts/search", get(search_posts))
            .route("/api/v1/mongo/posts/user/:name", get(posts_by_user))
            .route("/api/v1/mongo/posts/subreddit-id/:id", get(posts_by_subreddit))
            .route(
                "/api/v1/mongo/posts/toggle-notifications/:id",
                put(toggle_notifications),
            )
            .route("/api/v1/mongo/posts/:id", get(get_post).delete(delete_post))
            .route("/api/v1/votes", post(vote))
            .route("/api/v1/subscriptions", get(list_subscriptions))
            .route("/api/v1/subscriptions/subscribe/:name", post(subscribe))
            .route("/api/v1/subscriptions/unsubscribe/:name", post(unsubscribe))
            .route("/api/v1/feed", get(feed))
            .route("/api/v1/trending", get(trending))
            .route("/api/v1/subreddit", get(all_subreddits).post(create_subreddit))
            .route("/api/v1/subreddit/:id", get(get_subreddit))
            .route("/api/chat/ask", post(ask))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    rx.await.ok();
                })
                .await
                .unwrap();
        });

        MockServer {
            port,
            backend,
            shutdown_tx: Some(tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

type Shared = State<Arc<Backend>>;

async fn login(State(b): Shared, Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return (StatusCode::UNAUTHORIZED, "Bad credentials").into_response();
    }
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let token = b.issue_token(&username);
    Json(json!({
        "authenticationToken": token,
        "username": username,
        "refreshToken": format!("refresh-{}", username),
        "expiresAt": "2030-01-01T00:00:00Z",
    }))
    .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["interests"].as_array().map_or(0, |a| a.len()) < 3 {
        return (StatusCode::BAD_REQUEST, "Select at least 3 interests").into_response();
    }
    "User Registration Successful".into_response()
}

async fn refresh(State(b): Shared, Json(body): Json<Value>) -> Response {
    b.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = b.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let username = body["username"].as_str().unwrap_or_default().to_string();
    if body["refreshToken"] != format!("refresh-{}", username).as_str() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid refresh Token" })))
            .into_response();
    }
    let token = b.issue_token(&username);
    // epoch seconds 形式で返す
    Json(json!({
        "authenticationToken": token,
        "username": username,
        "refreshToken": body["refreshToken"],
        "expiresAt": 1_893_456_000,
    }))
    .into_response()
}

async fn logout(State(b): Shared) -> Response {
    b.logout_calls.fetch_add(1, Ordering::SeqCst);
    if b.fail_logout.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Logout failed").into_response();
    }
    "Refresh Token Deleted Successfully!!".into_response()
}

async fn forgot_password(body: String) -> Response {
    if body.contains('@') {
        "Password reset link sent".into_response()
    } else {
        (StatusCode::BAD_REQUEST, "Invalid email").into_response()
    }
}

async fn reset_password(Query(params): Query<HashMap<String, String>>, body: String) -> Response {
    match params.get("token") {
        Some(token) if token == "valid-token" && !body.is_empty() => {
            "Password has been reset".into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "Invalid or expired token").into_response(),
    }
}

async fn interests(State(b): Shared, headers: HeaderMap, Json(body): Json<Vec<String>>) -> Response {
    if let Err(res) = b.check_auth(&headers) {
        return res;
    }
    format!("Saved {} interests", body.len()).into_response()
}

async fn all_posts(State(b): Shared) -> Response {
    Json(b.data.lock().unwrap().posts.clone()).into_response()
}

async fn create_post(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let user = match b.check_auth(&headers) {
        Ok(user) => user,
        Err(res) => return res,
    };
    let description = body["description"].as_str().unwrap_or_default();
    if description.to_lowercase().contains("toxic") {
        return (StatusCode::BAD_REQUEST, Json(json!("Toxic content detected"))).into_response();
    }

    let mut data = b.data.lock().unwrap();
    data.next_post_id += 1;
    let id = data.next_post_id.to_string();
    let post = post_json(
        &id,
        body["postName"].as_str().unwrap_or_default(),
        body["subredditName"].as_str().unwrap_or_default(),
        &user,
        body["url"].as_str().unwrap_or_default(),
        description,
    );
    data.posts.push(post.clone());
    (StatusCode::CREATED, Json(post)).into_response()
}

async fn update_post(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(res) = b.check_auth(&headers) {
        return res;
    }
    let id = body["postId"].as_str().unwrap_or_default().to_string();
    let mut data = b.data.lock().unwrap();
    let Some(post) = data.posts.iter_mut().find(|p| p["id"] == id.as_str()) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Post not found" }))).into_response();
    };
    for (from, to) in [
        ("postName", "postName"),
        ("subredditName", "subredditName"),
        ("url", "url"),
        ("description", "description"),
    ] {
        post[to] = body[from].clone();
    }
    Json(post.clone()).into_response()
}

async fn get_post(State(b): Shared, Path(id): Path<String>) -> Response {
    let data = b.data.lock().unwrap();
    match data.posts.iter().find(|p| p["id"] == id.as_str()) {
        Some(post) => Json(post.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Post not found" }))).into_response(),
    }
}

async fn delete_post(State(b): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(res) = b.check_auth(&headers) {
        return res;
    }
    b.data.lock().unwrap().posts.retain(|p| p["id"] != id.as_str());
    StatusCode::NO_CONTENT.into_response()
}

async fn search_posts(State(b): Shared, Query(params): Query<HashMap<String, String>>) -> Response {
    let query = params.get("query").cloned().unwrap_or_default().to_lowercase();
    let data = b.data.lock().unwrap();
    let found: Vec<Value> = data
        .posts
        .iter()
        .filter(|p| {
            ["postName", "description"]
                .iter()
                .any(|k| p[*k].as_str().unwrap_or_default().to_lowercase().contains(&query))
        })
        .cloned()
        .collect();
    Json(found).into_response()
}

async fn posts_by_user(State(b): Shared, Path(name): Path<String>) -> Response {
    let data = b.data.lock().unwrap();
    let found: Vec<Value> = data
        .posts
        .iter()
        .filter(|p| p["userName"] == name.as_str())
        .cloned()
        .collect();
    Json(found).into_response()
}

async fn posts_by_subreddit(State(b): Shared, Path(id): Path<String>) -> Response {
    let data = b.data.lock().unwrap();
    let Some(name) = data
        .subreddits
        .iter()
        .find(|s| s["id"] == id.as_str())
        .and_then(|s| s["name"].as_str())
    else {
        return Json(Vec::<Value>::new()).into_response();
    };
    let found: Vec<Value> = data
        .posts
        .iter()
        .filter(|p| p["subredditName"] == name)
        .cloned()
        .collect();
    Json(found).into_response()
}

async fn toggle_notifications(
    State(b): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(enabled): Json<bool>,
) -> Response {
    if let Err(res) = b.check_auth(&headers) {
        return res;
    }
    let mut data = b.data.lock().unwrap();
    match data.posts.iter_mut().find(|p| p["id"] == id.as_str()) {
        Some(post) => {
            post["notificationStatus"] = json!(enabled);
            Json(enabled).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn vote(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(res) = b.check_auth(&headers) {
        return res;
    }
    b.vote_calls.fetch_add(1, Ordering::SeqCst);
    let delay = b.vote_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let id = body["postId"].as_str().unwrap_or_default().to_string();
    let mut data = b.data.lock().unwrap();
    let Some(post) = data.posts.iter_mut().find(|p| p["id"] == id.as_str()) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Post not found" }))).into_response();
    };

    let up = post["upVote"].as_bool().unwrap_or(false);
    let down = post["downVote"].as_bool().unwrap_or(false);
    let mut count = post["voteCount"].as_i64().unwrap_or(0);
    // 既存の投票を取り消してから新しい投票を反映する
    if up {
        count -= 1;
    }
    if down {
        count += 1;
    }
    let (up, down) = match body["voteType"].as_str() {
        Some("UPVOTE") => (true, false),
        Some("DOWNVOTE") => (false, true),
        _ => (false, false),
    };
    if up {
        count += 1;
    }
    if down {
        count -= 1;
    }
    post["upVote"] = json!(up);
    post["downVote"] = json!(down);
    post["voteCount"] = json!(count);
    StatusCode::OK.into_response()
}

async fn list_subscriptions(State(b): Shared, headers: HeaderMap) -> Response {
    if let Err(res) = b.check_auth(&headers) {
        return res;
    }
    Json(b.data.lock().unwrap().subscriptions.clone()).into_response()
}

async fn subscribe(State(b): Shared, headers: HeaderMap, Path(name): Path<String>) -> Response {
    if let Err(res) = b.check_auth(&headers) {
        return res;
    }
    let mut data = b.data.lock().unwrap();
    if !data.subscriptions.contains(&name) {
        data.subscriptions.push(name);
    }
    StatusCode::OK.into_response()
}

async fn unsubscribe(State(b): Shared, headers: HeaderMap, Path(name): Path<String>) -> Response {
    if let Err(res) = b.check_auth(&headers) {
        return res;
    }
    b.data.lock().unwrap().subscriptions.retain(|s| *s != name);
    StatusCode::OK.into_response()
}

async fn feed(State(b): Shared, headers: HeaderMap) -> Response {
    if let Err(res) = b.check_auth(&headers) {
        return res;
    }
    let data = b.data.lock().unwrap();
    let found: Vec<Value> = data
        .posts
        .iter()
        .filter(|p| {
            p["subredditName"]
                .as_str()
                .is_some_and(|s| data.subscriptions.iter().any(|sub| sub == s))
        })
        .cloned()
        .collect();
    Json(found).into_response()
}

async fn trending(State(b): Shared) -> Response {
    let mut posts = b.data.lock().unwrap().posts.clone();
    posts.sort_by_key(|p| std::cmp::Reverse(p["voteCount"].as_i64().unwrap_or(0)));
    Json(posts).into_response()
}

async fn all_subreddits(State(b): Shared) -> Response {
    Json(b.data.lock().unwrap().subreddits.clone()).into_response()
}

async fn get_subreddit(State(b): Shared, Path(id): Path<String>) -> Response {
    let data = b.data.lock().unwrap();
    match data.subreddits.iter().find(|s| s["id"] == id.as_str()) {
        Some(s) => Json(s.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Subreddit not found" }))).into_response(),
    }
}

async fn create_subreddit(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let user = match b.check_auth(&headers) {
        Ok(user) => user,
        Err(res) => return res,
    };
    let mut data = b.data.lock().unwrap();
    let id = (data.subreddits.len() + 1).to_string();
    let subreddit = json!({
        "id": id,
        "name": body["name"],
        "description": body["description"],
        "userName": user,
    });
    data.subreddits.push(subreddit.clone());
    Json(subreddit).into_response()
}

async fn ask(State(b): Shared, Json(body): Json<Value>) -> Response {
    if b.fail_chat.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "RAG service unavailable").into_response();
    }
    let question = body["question"].as_str().unwrap_or_default();
    Json(json!({
        "answer": format!("You asked: {}", question),
        "source_documents": [
            { "content": "Forest FAQ", "score": 0.87, "source_id": "faq-1" }
        ],
    }))
    .into_response()
}
