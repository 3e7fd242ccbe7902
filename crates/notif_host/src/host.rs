//! Host capability contracts consumed by the notification facade.
//!
//! The page-side [`NotificationHost`] covers the direct Notification API, while [`WorkerHost`]
//! covers display brokered by a registered service worker. Browser adapters live in
//! `notif_host_web`; in-memory doubles live in [`crate::memory`].

use std::{future::Future, pin::Pin, rc::Rc, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PermissionState;

/// Object-safe boxed future used by host capability traits.
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Listener invoked with the handle of the notification that raised the event.
pub type DisplayListener = Rc<dyn Fn(DisplayHandle)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Opaque reference to a notification shown by a [`NotificationHost`].
pub struct DisplayHandle(pub u64);

#[derive(Clone, Default)]
/// Event listeners attached to a directly displayed notification.
pub struct DisplayListeners {
    /// Called when the user clicks the notification.
    pub on_click: Option<DisplayListener>,
    /// Called when the host fails to display the notification.
    pub on_error: Option<DisplayListener>,
}

impl std::fmt::Debug for DisplayListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayListeners")
            .field("on_click", &self.on_click.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Snapshot of a notification currently held by the service-worker registration.
pub struct WorkerNotificationRecord {
    /// Notification title.
    pub title: String,
    /// Dedup tag the notification was shown with.
    pub tag: String,
    /// Notification body.
    pub body: String,
    /// Payload stored with the notification.
    pub data: Option<Value>,
}

/// Page-context notification capability.
pub trait NotificationHost {
    /// Returns whether the host exposes the Notification API in this context.
    fn is_supported(&self) -> bool;

    /// Returns the current permission without prompting.
    fn permission(&self) -> PermissionState;

    /// Prompts the user for permission and resolves to the decision.
    fn request_permission<'a>(&'a self) -> HostFuture<'a, Result<PermissionState, String>>;

    /// Constructs and shows a notification.
    ///
    /// `options` is the normalized option object, including `body`.
    fn show(
        &self,
        title: &str,
        options: &Value,
        listeners: DisplayListeners,
    ) -> Result<DisplayHandle, String>;

    /// Dismisses a notification. Unknown or already closed handles are ignored.
    fn close(&self, handle: DisplayHandle);

    /// Dismisses a notification once after `delay`.
    fn schedule_close(&self, handle: DisplayHandle, delay: Duration);

    /// Shows a blocking alert-style disclosure, used when notifications are unsupported.
    fn alert(&self, message: &str);
}

/// Service-worker-brokered notification capability.
pub trait WorkerHost {
    /// Returns whether the host exposes the service-worker capability.
    fn is_available(&self) -> bool;

    /// Registers the worker script. Registering the same script twice is a no-op on the host.
    fn register<'a>(&'a self, script_path: &'a str) -> HostFuture<'a, Result<(), String>>;

    /// Resolves once an active worker registration is ready.
    fn ready<'a>(&'a self) -> HostFuture<'a, Result<(), String>>;

    /// Asks the active registration to show a notification.
    fn show_notification<'a>(
        &'a self,
        title: &'a str,
        options: &'a Value,
    ) -> HostFuture<'a, Result<(), String>>;

    /// Lists notifications currently shown by the registration with the given tag.
    fn notifications_by_tag<'a>(
        &'a self,
        tag: &'a str,
    ) -> HostFuture<'a, Result<Vec<WorkerNotificationRecord>, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Worker host for contexts without service-worker support.
pub struct NoopWorkerHost;

impl WorkerHost for NoopWorkerHost {
    fn is_available(&self) -> bool {
        false
    }

    fn register<'a>(&'a self, _script_path: &'a str) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async { Err("service workers are unavailable".to_string()) })
    }

    fn ready<'a>(&'a self) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async { Err("service workers are unavailable".to_string()) })
    }

    fn show_notification<'a>(
        &'a self,
        _title: &'a str,
        _options: &'a Value,
    ) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async { Err("service workers are unavailable".to_string()) })
    }

    fn notifications_by_tag<'a>(
        &'a self,
        _tag: &'a str,
    ) -> HostFuture<'a, Result<Vec<WorkerNotificationRecord>, String>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}
