use std::rc::Rc;

use notif_host::{
    BrowserNotif, ContextClassifier, FixedClassifier, MemoryNotificationHost, NoopWorkerHost,
    NotificationHost, NotificationOptions, NotifyHosts, PermissionState, WorkerHost,
};

use crate::{web_classifier, WebNotificationHost, WebWorkerHost};

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Compile-time selected host strategy for notification adapters.
pub enum HostStrategy {
    /// Browser Notification and Service Worker APIs.
    Browser,
    /// In-memory page host with permission granted and no worker, for headless builds.
    Stub,
}

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "host-stub")]
    {
        HostStrategy::Stub
    }

    #[cfg(not(feature = "host-stub"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    match selected_host_strategy() {
        HostStrategy::Browser => "browser",
        HostStrategy::Stub => "stub",
    }
}

/// Builds the host bundle for the compile-time selected host strategy.
pub fn notify_hosts() -> NotifyHosts {
    let (page, worker, classifier): (
        Rc<dyn NotificationHost>,
        Rc<dyn WorkerHost>,
        Rc<dyn ContextClassifier>,
    ) = match selected_host_strategy() {
        HostStrategy::Browser => (
            Rc::new(WebNotificationHost::default()),
            Rc::new(WebWorkerHost),
            Rc::new(web_classifier()),
        ),
        HostStrategy::Stub => (
            Rc::new(MemoryNotificationHost::with_permission(
                PermissionState::Granted,
            )),
            Rc::new(NoopWorkerHost),
            Rc::new(FixedClassifier::DESKTOP),
        ),
    };
    NotifyHosts {
        page,
        worker,
        classifier,
    }
}

/// Builds a notification facade wired to the selected host strategy.
pub fn web_notifier(options: NotificationOptions) -> BrowserNotif {
    BrowserNotif::new(options, notify_hosts())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;
    use notif_host::{EventHooks, NotifyOutcome};

    use super::*;

    #[cfg(not(feature = "host-stub"))]
    #[test]
    fn native_browser_strategy_degrades_to_disclosure() {
        assert_eq!(host_strategy_name(), "browser");
        let notif = web_notifier(NotificationOptions::default());

        assert!(!notif.is_supported());
        assert!(!notif.is_mobile());
        assert_eq!(
            block_on(notif.notify("Hi", "there", EventHooks::new())),
            Ok(NotifyOutcome::Disclosed)
        );
    }

    #[cfg(feature = "host-stub")]
    #[test]
    fn stub_strategy_displays_in_memory() {
        assert_eq!(host_strategy_name(), "stub");
        let notif = web_notifier(NotificationOptions::default());

        let outcome = block_on(notif.notify("Hi", "there", EventHooks::new())).expect("notify");

        assert!(matches!(outcome, NotifyOutcome::Displayed(_)));
    }
}
