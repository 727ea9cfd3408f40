use forest_api::normalize_base_url;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_SESSION_DB_URL: &str = "sqlite:data/session.db";
pub const DEFAULT_USER_AGENT: &str = "ForestClient/0.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub session_db_url: String,
    pub user_agent: String,
}

impl AppConfig {
    /// 環境変数から読み込む。未設定の項目は既定値
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            api_url: normalize_base_url(&get("FOREST_API_URL", DEFAULT_API_URL)),
            session_db_url: get("FOREST_SESSION_DB_URL", DEFAULT_SESSION_DB_URL),
            user_agent: get("FOREST_USER_AGENT", DEFAULT_USER_AGENT),
        }
    }

    /// Command line flags win over the environment.
    pub fn with_overrides(mut self, api_url: Option<&str>, session_db_url: Option<&str>) -> Self {
        if let Some(url) = api_url {
            self.api_url = normalize_base_url(url);
        }
        if let Some(url) = session_db_url {
            self.session_db_url = url.to_string();
        }
        self
    }
}
