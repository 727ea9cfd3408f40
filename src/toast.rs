use std::io::Write;
use std::sync::{Mutex, PoisonError};
use views::{Notifier, Toast, ToastKind};

/// 端末にトーストを出す
pub struct TerminalToaster<W: Write + Send> {
    out: Mutex<W>,
}

impl TerminalToaster<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> TerminalToaster<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn render(toast: &Toast) -> String {
    match toast.kind {
        ToastKind::Success => format!("[ok] {}", toast.message),
        ToastKind::Warning => format!("[!] {}", toast.message),
        ToastKind::Error => format!("[error] {}", toast.message),
        ToastKind::Rejection => {
            let title = toast.title.as_deref().unwrap_or("Rejected");
            format!("[x] {}\n    | {}", title, toast.message)
        }
    }
}

impl<W: Write + Send> Notifier for TerminalToaster<W> {
    fn notify(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Success => tracing::debug!("toast: {}", toast.message),
            ToastKind::Warning => tracing::debug!("toast warning: {}", toast.message),
            ToastKind::Error | ToastKind::Rejection => {
                tracing::debug!("toast error: {}", toast.message)
            }
        }

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", render(&toast)) {
            tracing::warn!("Failed to write toast: {}", e);
        }
    }
}
