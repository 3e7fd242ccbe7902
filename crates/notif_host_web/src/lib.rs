//! Browser (`wasm32`) implementations of the [`notif_host`] capability contracts.
//!
//! - [`WebNotificationHost`]: `window.Notification`, `window.alert`, and `setTimeout`.
//! - [`WebWorkerHost`]: `navigator.serviceWorker` registration, display, and by-tag lookup.
//! - [`web_classifier`]: mobile detection from `navigator.userAgent`.
//! - [`install_worker_handlers`]: lifecycle and click wiring for the service-worker script.
//!
//! On non-wasm targets every adapter reports the capability as missing, so the facade degrades
//! the same way it would in a browser without notification support.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and facade factories.
pub mod adapters;
#[cfg(target_arch = "wasm32")]
mod bridge;
pub mod classify;
pub mod notifications;
pub mod worker_host;
pub mod worker_scope;

pub use adapters::{
    host_strategy_name, notify_hosts, selected_host_strategy, web_notifier, HostStrategy,
};
pub use classify::{user_agent, web_classifier};
pub use notifications::WebNotificationHost;
pub use worker_host::WebWorkerHost;
pub use worker_scope::{install_worker_handlers, WebWorkerScope};
