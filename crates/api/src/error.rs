use serde_json::Value;

/// HTTP 境界のエラー。呼び出し側はパターンマッチで扱う
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("authentication required"))]
    Unauthorized { message: Option<String> },
    #[error("Request rejected ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Rejected { status: u16, message: Option<String> },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Not logged in")]
    NotAuthenticated,
    #[error("Request cancelled")]
    Cancelled,
    #[error("Session storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        if status == 401 {
            ApiError::Unauthorized { message }
        } else {
            ApiError::Rejected { status, message }
        }
    }

    pub fn storage(err: anyhow::Error) -> Self {
        ApiError::Storage(format!("{:#}", err))
    }

    /// Message the server attached to the failure, if any.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Rejected { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Error bodies arrive as a bare string, a JSON string, or a JSON object
/// carrying `message` / `error` / `detail`.
pub fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(s)) => non_empty(&s),
        Ok(Value::Object(map)) => ["message", "error", "detail"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .find_map(non_empty),
        Ok(Value::Null) => None,
        _ => Some(body.to_string()),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
