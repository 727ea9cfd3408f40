use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::lock;

pub const CLOSE_DELAY: Duration = Duration::from_millis(500);

/// ホバーで開くメニュー。離れてから少し待って閉じ、その間に戻れば閉じない
///
/// Must be used inside a tokio runtime; closing runs on a spawned timer.
pub struct HoverDropdown {
    visible: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Default for HoverDropdown {
    fn default() -> Self {
        Self::new()
    }
}

impl HoverDropdown {
    pub fn new() -> Self {
        Self {
            visible: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            timer: Mutex::new(None),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn open(&self) {
        self.clear_timer();
        self.visible.store(true, Ordering::SeqCst);
    }

    pub fn schedule_close(&self) {
        self.clear_timer();

        let generation = self.generation.load(Ordering::SeqCst);
        let visible = self.visible.clone();
        let current = self.generation.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(CLOSE_DELAY).await;
            if current.load(Ordering::SeqCst) == generation {
                visible.store(false, Ordering::SeqCst);
            }
        });
        *lock(&self.timer) = Some(handle);
    }

    fn clear_timer(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
    }
}

impl Drop for HoverDropdown {
    fn drop(&mut self) {
        self.clear_timer();
    }
}
