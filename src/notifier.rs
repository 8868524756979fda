//! Booking confirmation notices.

use async_trait::async_trait;
use thiserror::Error;

/// Error reported by a [`Notifier`]. Logged by the engine, never surfaced.
#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Delivers a confirmation after a booking has committed.
///
/// Called from a detached task; a slow or failing notifier cannot delay or
/// change the booking result.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, user_id: i32, session_id: i32, email: &str) -> Result<(), NotifyError>;
}

/// Records the notice in the log and nothing else.
///
/// The default for an [`EventStore`](crate::EventStore) until a real delivery
/// channel is plugged in with
/// [`with_notifier`](crate::EventStore::with_notifier).
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, user_id: i32, session_id: i32, email: &str) -> Result<(), NotifyError> {
        tracing::info!(user_id, session_id, email, "enrollment confirmation queued");
        Ok(())
    }
}
