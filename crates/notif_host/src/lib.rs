//! Host-independent notification facade and capability contracts.
//!
//! [`BrowserNotif`] validates a request, walks the permission flow, and then shows the
//! notification either directly through a [`NotificationHost`] or through a service worker via
//! a [`WorkerHost`], depending on what the [`ContextClassifier`] reports for the context.
//! Browser adapters for these traits live in `notif_host_web`; [`memory`] provides recording
//! doubles for tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod classify;
pub mod error;
pub mod facade;
pub mod host;
pub mod memory;
pub mod options;
pub mod permission;
pub mod time;
pub mod worker;

pub use classify::{
    ContextClassifier, FixedClassifier, UserAgentClassifier, MOBILE_USER_AGENT_SIGNATURES,
};
pub use error::{NotifyError, WorkerDispatchError};
pub use facade::{BrowserNotif, EventHooks, Hook, NotifyHosts, NotifyOutcome};
pub use host::{
    DisplayHandle, DisplayListener, DisplayListeners, HostFuture, NoopWorkerHost,
    NotificationHost, WorkerHost, WorkerNotificationRecord,
};
pub use memory::{MemoryNotificationHost, MemoryWorkerHost, ShownNotification};
pub use options::{
    Direction, NotificationAction, NotificationOptions, Vibrate, DEFAULT_SERVICE_WORKER_PATH,
};
pub use permission::PermissionState;
pub use time::{generate_tag, unix_time_ms_now, GENERATED_TAG_PREFIX};
pub use worker::{
    attach_worker_click, decode_worker_click, on_activate, on_install, WorkerClickAction,
    WorkerClickHandler, WorkerClickRegistry, WorkerLifecycle,
};
