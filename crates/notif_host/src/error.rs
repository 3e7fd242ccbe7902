//! Error types surfaced by the notification facade and the worker click dispatcher.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures returned by [`crate::BrowserNotif`] operations.
pub enum NotifyError {
    /// The request was rejected before any host call.
    #[error("invalid notification request: {0}")]
    Validation(String),
    /// The user has blocked notifications for this origin.
    #[error("notification permission denied")]
    PermissionDenied,
    /// The service-worker capability is missing or never became ready.
    #[error("service worker unavailable: {0}")]
    WorkerUnavailable(String),
    /// The worker displayed nothing that matches the dedup tag.
    #[error("no worker notification found for tag `{tag}`")]
    LookupNotFound {
        /// Tag used for both the show call and the lookup.
        tag: String,
    },
    /// Host-internal failure during permission, display, or lookup.
    #[error("notification host error: {0}")]
    Host(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures raised while dispatching a worker-side notification click.
pub enum WorkerDispatchError {
    /// The notification payload could not be decoded.
    #[error("notification payload could not be decoded: {0}")]
    Payload(String),
    /// No handler is registered for the requested action.
    #[error("no worker click handler registered for `{0}`")]
    UnknownAction(String),
    /// The registered handler reported a failure.
    #[error("worker click handler `{action}` failed: {message}")]
    Handler {
        /// Action identifier that was dispatched.
        action: String,
        /// Handler failure message.
        message: String,
    },
}
