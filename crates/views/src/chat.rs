use crate::lock;
use crate::scope::ViewScope;
use forest_api::{ApiError, ChatApi};
use forest_core::ChatMessage;
use std::sync::{Arc, Mutex};

pub const CHAT_FALLBACK: &str = "Sorry, something went wrong. Please try again.";

#[derive(Default)]
struct ChatState {
    messages: Vec<ChatMessage>,
    is_open: bool,
    current_question: String,
    is_loading: bool,
    error: Option<String>,
}

/// RAG アシスタントとの会話ウィジェット。履歴はメモリ上のみで、追記しかしない
pub struct ChatWidget {
    chat: Arc<dyn ChatApi>,
    scope: ViewScope,
    state: Mutex<ChatState>,
}

impl ChatWidget {
    pub fn new(chat: Arc<dyn ChatApi>) -> Self {
        Self {
            chat,
            scope: ViewScope::new(),
            state: Mutex::new(ChatState::default()),
        }
    }

    pub fn toggle(&self) {
        let mut state = lock(&self.state);
        state.is_open = !state.is_open;
    }

    pub fn is_open(&self) -> bool {
        lock(&self.state).is_open
    }

    pub fn set_question(&self, text: &str) {
        lock(&self.state).current_question = text.to_string();
    }

    pub fn current_question(&self) -> String {
        lock(&self.state).current_question.clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.state).messages.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).is_loading
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Sends the current question. Returns `false` when it was blank.
    pub async fn send(&self) -> bool {
        let question = {
            let mut state = lock(&self.state);
            if state.current_question.trim().is_empty() {
                return false;
            }
            state.is_open = true;
            let question = std::mem::take(&mut state.current_question);
            state.messages.push(ChatMessage::user(&question));
            state.is_loading = true;
            state.error = None;
            question
        };

        let res = self.scope.run(self.chat.ask(&question)).await;

        let mut state = lock(&self.state);
        state.is_loading = false;
        match res {
            Ok(answer) => {
                state
                    .messages
                    .push(ChatMessage::bot(&answer.answer, Some(answer.source_documents)));
            }
            Err(ApiError::Cancelled) => {}
            Err(e) => {
                tracing::error!("Chat request failed: {}", e);
                state.error = Some(CHAT_FALLBACK.to_string());
                state.messages.push(ChatMessage::bot(CHAT_FALLBACK, None));
            }
        }
        true
    }

    /// Convenience for callers that do not keep an input box.
    pub async fn ask(&self, question: &str) -> bool {
        self.set_question(question);
        self.send().await
    }
}
