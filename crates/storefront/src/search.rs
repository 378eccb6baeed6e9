//! Search input debounce.
//!
//! Rapid input changes coalesce: a typed term is applied only after the input
//! has been quiet for the configured period. Each input or submit takes the
//! next generation, and a pending application runs only if no newer input or
//! submit arrived while it slept. The generation check and the application
//! happen under one lock, so a submit can never be overwritten by an older
//! typed term that was already past its check.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Coalesces search input.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    quiet: Duration,
    generation: Arc<Mutex<u64>>,
}

impl SearchDebouncer {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: Arc::new(Mutex::new(0)),
        }
    }

    /// Quiet period before a typed term is applied.
    #[must_use]
    pub const fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Schedule `apply(term)` after the quiet period.
    ///
    /// The returned task resolves to `true` if the term was applied and
    /// `false` if a later input or submit superseded it. Must be called from
    /// within a tokio runtime.
    pub fn input<F>(&self, term: impl Into<String>, apply: F) -> JoinHandle<bool>
    where
        F: FnOnce(String) + Send + 'static,
    {
        let term = term.into();
        let ticket = self.advance();
        let generation = Arc::clone(&self.generation);
        let quiet = self.quiet;

        tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let current = generation.lock().unwrap_or_else(PoisonError::into_inner);
            if *current != ticket {
                tracing::trace!(%term, "Search input superseded");
                return false;
            }
            tracing::debug!(%term, "Applying debounced search term");
            apply(term);
            drop(current);
            true
        })
    }

    /// Apply `term` immediately and cancel any pending input.
    ///
    /// Waits for a pending application that is already running, then applies
    /// over it.
    pub fn submit<F>(&self, term: impl Into<String>, apply: F)
    where
        F: FnOnce(String),
    {
        let mut current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        apply(term.into());
    }

    /// Drop any pending input without applying it.
    pub fn cancel_pending(&self) {
        self.advance();
    }

    fn advance(&self) -> u64 {
        let mut current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        *current
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn() -> Box<dyn FnOnce(String) + Send>) {
        let applied = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&applied);
        let make = move || {
            let sink = Arc::clone(&sink);
            Box::new(move |term: String| sink.lock().unwrap().push(term))
                as Box<dyn FnOnce(String) + Send>
        };
        (applied, make)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_applies_last_term_once() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(500));
        let (applied, apply) = recorder();

        let first = debouncer.input("s", apply());
        tokio::time::advance(Duration::from_millis(100)).await;
        let second = debouncer.input("sh", apply());
        tokio::time::advance(Duration::from_millis(100)).await;
        let third = debouncer.input("sho", apply());

        assert!(!first.await.unwrap());
        assert!(!second.await.unwrap());
        assert!(third.await.unwrap());
        assert_eq!(*applied.lock().unwrap(), ["sho"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_applied_before_quiet_period() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(500));
        let (applied, apply) = recorder();

        let pending = debouncer.input("hat", apply());
        tokio::time::advance(Duration::from_millis(499)).await;
        tokio::task::yield_now().await;
        assert!(applied.lock().unwrap().is_empty());

        assert!(pending.await.unwrap());
        assert_eq!(*applied.lock().unwrap(), ["hat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_applies_immediately_and_cancels_pending() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(500));
        let (applied, apply) = recorder();

        let pending = debouncer.input("sh", apply());
        debouncer.submit("shoe", apply());
        assert_eq!(*applied.lock().unwrap(), ["shoe"]);

        assert!(!pending.await.unwrap());
        assert_eq!(*applied.lock().unwrap(), ["shoe"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_inputs_each_apply() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(500));
        let (applied, apply) = recorder();

        assert!(debouncer.input("a", apply()).await.unwrap());
        assert!(debouncer.input("b", apply()).await.unwrap());
        assert_eq!(*applied.lock().unwrap(), ["a", "b"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_submit_wins_over_input_already_applying() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(10));
        let term = Arc::new(Mutex::new(String::new()));

        let slow_term = Arc::clone(&term);
        let pending = debouncer.input("hat", move |applied| {
            // Holds the apply step open the way a contended catalog lock would.
            std::thread::sleep(Duration::from_millis(100));
            *slow_term.lock().unwrap() = applied;
        });

        tokio::time::sleep(Duration::from_millis(40)).await;
        debouncer.submit("shoe", |applied| *term.lock().unwrap() = applied);

        assert!(pending.await.unwrap());
        assert_eq!(*term.lock().unwrap(), "shoe");
    }
}
