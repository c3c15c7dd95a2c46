use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Identifies one keystroke. Results produced for an older ticket are stale.
#[derive(Clone)]
pub struct Ticket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

/// Coalesces bursts of input on one channel into a single call made after
/// `quiet` has passed without new input.
pub struct Debouncer {
    quiet: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    /// Replaces any pending call. Blank input only cancels.
    pub async fn input<F, Fut>(&self, value: &str, action: F)
    where
        F: FnOnce(String, Ticket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let value = value.trim().to_string();
        if value.is_empty() {
            return;
        }

        let ticket = Ticket {
            generation,
            current: Arc::clone(&self.generation),
        };
        let quiet = self.quiet;
        // Fired calls run detached; the ticket decides whether the result applies.
        *pending = Some(tokio::spawn(async move {
            sleep(quiet).await;
            if ticket.is_current() {
                tokio::spawn(action(value, ticket));
            }
        }));
    }

    /// Drops the pending call and marks any in-flight result as stale.
    pub async fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
    }
}
