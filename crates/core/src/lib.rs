use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// 投稿のレスポンス型 (`PostResponse`)
///
/// サーバー側で null になり得るフィールドは既定値に寄せる
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "postName", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_count: i64,
    #[serde(rename = "userName", default, deserialize_with = "null_as_default")]
    pub author_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subreddit_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment_count: i64,
    #[serde(rename = "duration", default, deserialize_with = "null_as_default")]
    pub age: String,
    #[serde(rename = "upVote", default, deserialize_with = "null_as_default")]
    pub up_voted: bool,
    #[serde(rename = "downVote", default, deserialize_with = "null_as_default")]
    pub down_voted: bool,
    #[serde(
        rename = "notificationStatus",
        default,
        deserialize_with = "null_as_default"
    )]
    pub notifications_enabled: bool,
}

/// 投稿の作成・更新リクエスト (`MongoPostRequest`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub post_id: Option<String>,
    pub subreddit_name: String,
    pub post_name: String,
    pub url: String,
    pub description: String,
    pub photo_id: Option<String>,
    pub video_id: Option<String>,
}

impl PostRequest {
    pub fn new(post_name: &str, subreddit_name: &str, url: &str, description: &str) -> Self {
        Self {
            post_id: None,
            subreddit_name: subreddit_name.to_string(),
            post_name: post_name.to_string(),
            url: url.to_string(),
            description: description.to_string(),
            photo_id: None,
            video_id: None,
        }
    }

    /// Update payload for an existing post. Media ids are never edited here.
    pub fn from_post(post: &Post) -> Self {
        Self {
            post_id: Some(post.id.clone()),
            subreddit_name: post.subreddit_name.clone(),
            post_name: post.title.clone(),
            url: post.url.clone(),
            description: post.description.clone(),
            photo_id: None,
            video_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subreddit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(
        default,
        alias = "userName",
        skip_serializing_if = "Option::is_none"
    )]
    pub author_name: Option<String>,
}

/// 投票の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "upvote" => Some(Self::Upvote),
            "down" | "downvote" => Some(Self::Downvote),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upvote => "UPVOTE",
            Self::Downvote => "DOWNVOTE",
        }
    }
}

/// 投票の意図。`vote_type` が `None` の場合は取り消し (NONE) として null を送る
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePayload {
    pub vote_type: Option<VoteType>,
    pub post_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub authentication_token: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub refresh_token: String,
    #[serde(alias = "expirationDate", deserialize_with = "deserialize_instant")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// 認証済みユーザーのセッション。4 つのフィールドは常に揃って存在する
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub username: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<AuthenticationResponse> for Session {
    fn from(res: AuthenticationResponse) -> Self {
        Self {
            access_token: res.authentication_token,
            username: res.username,
            refresh_token: res.refresh_token,
            expires_at: res.expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(alias = "source_id", default, deserialize_with = "null_as_default")]
    pub source_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagQueryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(
        alias = "source_documents",
        default,
        deserialize_with = "null_as_default"
    )]
    pub source_documents: Vec<SourceDocument>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// チャットウィジェットに表示する 1 件のメッセージ（永続化しない）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceDocument>>,
}

impl ChatMessage {
    pub fn user(text: &str) -> Self {
        Self {
            sender: Sender::User,
            text: text.to_string(),
            sources: None,
        }
    }

    pub fn bot(text: &str, sources: Option<Vec<SourceDocument>>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.to_string(),
            sources,
        }
    }
}

/// Photo / video upload answer: stored id and public URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    pub url: String,
}

pub const INTEREST_CATALOGUE: [&str; 12] = [
    "Technology",
    "Sports",
    "Gaming",
    "Music",
    "Movies",
    "Books",
    "Travel",
    "Food",
    "Fashion",
    "Art",
    "Science",
    "Health",
];

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInstant {
    Seconds(f64),
    Text(String),
}

/// `Instant` は RFC 3339 文字列とエポック秒（小数可）のどちらでも届く
fn deserialize_instant<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match RawInstant::deserialize(deserializer)? {
        RawInstant::Seconds(secs) => from_epoch_seconds(secs)
            .ok_or_else(|| D::Error::custom(format!("invalid epoch seconds: {}", secs))),
        RawInstant::Text(text) => parse_instant(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid instant: {}", text))),
    }
}

/// Parses an instant as stored or sent: RFC 3339, or epoch seconds.
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    text.parse::<f64>().ok().and_then(from_epoch_seconds)
}

fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1_000_000_000.0).round() as u32;
    DateTime::from_timestamp(whole, nanos.min(999_999_999))
}
