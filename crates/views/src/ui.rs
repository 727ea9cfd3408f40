//! 画面側の出口: トースト通知と画面遷移

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
    /// Formatted panel with a heading and the server's verbatim reason.
    Rejection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: Option<String>,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.notify(Toast {
            kind: ToastKind::Success,
            title: None,
            message: message.to_string(),
        });
    }

    fn warning(&self, message: &str) {
        self.notify(Toast {
            kind: ToastKind::Warning,
            title: None,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Toast {
            kind: ToastKind::Error,
            title: None,
            message: message.to_string(),
        });
    }

    fn rejection(&self, title: &str, detail: &str) {
        self.notify(Toast {
            kind: ToastKind::Rejection,
            title: Some(title.to_string()),
            message: detail.to_string(),
        });
    }
}

pub trait Navigator: Send + Sync {
    fn navigate_by_url(&self, url: &str);
}
