use super::mock_server::{MockServer, PASSWORD};
use forest_client::{AppConfig, AppState};
use forest_core::LoginRequest;
use forest_api::AuthApi;
use session::{KeyValueStore, MemoryStore};
use std::sync::{Arc, Mutex};
use views::{Notifier, Toast, ToastKind};

/// トーストを溜めておくだけの通知先
#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn messages(&self, kind: ToastKind) -> Vec<String> {
        self.toasts
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

pub struct TestClient {
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
    pub storage: Arc<dyn KeyValueStore>,
}

impl TestClient {
    pub async fn new(server: &MockServer) -> Self {
        Self::with_storage(server, Arc::new(MemoryStore::new())).await
    }

    pub async fn with_storage(server: &MockServer, storage: Arc<dyn KeyValueStore>) -> Self {
        let config = AppConfig {
            api_url: server.base_url(),
            session_db_url: "sqlite::memory:".to_string(),
            user_agent: "ForestClient/test".to_string(),
        };
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::with_storage(config, storage.clone(), notifier.clone())
            .await
            .expect("Failed to build app state");

        Self {
            state,
            notifier,
            storage,
        }
    }

    pub async fn login(&self, username: &str) {
        self.state
            .auth
            .login(&LoginRequest {
                username: username.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("login against mock backend failed");
    }
}
