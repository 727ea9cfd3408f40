use crate::dropdown::HoverDropdown;
use crate::lock;
use crate::ui::Navigator;
use forest_api::AuthApi;
use session::{SessionSnapshot, SessionStore, SessionSubscription};
use std::sync::{Arc, Mutex};

/// ヘッダー。ログイン状態はセッションの購読で追従する
pub struct Header {
    auth: Arc<dyn AuthApi>,
    navigator: Arc<dyn Navigator>,
    subscription: Mutex<SessionSubscription>,
    snapshot: Mutex<SessionSnapshot>,
    search_term: Mutex<String>,
    pub create_menu: HoverDropdown,
    pub user_menu: HoverDropdown,
}

impl Header {
    pub fn new(
        session: &SessionStore,
        auth: Arc<dyn AuthApi>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let subscription = session.subscribe();
        let snapshot = subscription.current();
        Self {
            auth,
            navigator,
            subscription: Mutex::new(subscription),
            snapshot: Mutex::new(snapshot),
            search_term: Mutex::new(String::new()),
            create_menu: HoverDropdown::new(),
            user_menu: HoverDropdown::new(),
        }
    }

    /// Applies whatever the session published since the last look.
    fn sync(&self) -> SessionSnapshot {
        let update = lock(&self.subscription).take_update();
        let mut snapshot = lock(&self.snapshot);
        if let Some(latest) = update {
            *snapshot = latest;
        }
        snapshot.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.sync().logged_in
    }

    pub fn username(&self) -> Option<String> {
        self.sync().username
    }

    pub fn set_search_term(&self, term: &str) {
        *lock(&self.search_term) = term.to_string();
    }

    pub fn search_term(&self) -> String {
        lock(&self.search_term).clone()
    }

    /// Returns `false` when the trimmed term was empty.
    pub fn search(&self) -> bool {
        let mut term = lock(&self.search_term);
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return false;
        }
        let url = format!("/search-results/{}", urlencoding::encode(trimmed));
        term.clear();
        drop(term);

        self.navigator.navigate_by_url(&url);
        true
    }

    pub fn go_to_user_profile(&self) {
        if let Some(name) = self.username() {
            self.navigator
                .navigate_by_url(&format!("/user-profile/{}", name));
        }
    }

    pub async fn logout(&self) {
        self.auth.logout().await;
        *lock(&self.snapshot) = SessionSnapshot::default();
        self.navigator.navigate_by_url("");
    }
}
