//! Page-context notification host backed by the Web Notifications API.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc, time::Duration};

use leptos::logging;
use notif_host::{
    DisplayHandle, DisplayListeners, HostFuture, NotificationHost, PermissionState,
};
use serde_json::Value;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

#[cfg(target_arch = "wasm32")]
use crate::bridge;

#[cfg(target_arch = "wasm32")]
#[derive(Debug)]
struct LiveNotification {
    notification: web_sys::Notification,
    _on_click: Option<Closure<dyn FnMut()>>,
    _on_error: Option<Closure<dyn FnMut()>>,
    _on_close: Closure<dyn FnMut()>,
}

#[derive(Debug, Default)]
struct LiveNotifications {
    #[cfg(target_arch = "wasm32")]
    next_handle: u64,
    #[cfg(target_arch = "wasm32")]
    open: BTreeMap<DisplayHandle, LiveNotification>,
    #[cfg(not(target_arch = "wasm32"))]
    open: BTreeMap<DisplayHandle, ()>,
}

#[derive(Debug, Clone, Default)]
/// Browser notification host backed by `window.Notification`.
///
/// Clones share the table of open notifications, so timers and click listeners can close what
/// the facade opened.
pub struct WebNotificationHost {
    live: Rc<RefCell<LiveNotifications>>,
}

impl WebNotificationHost {
    /// Number of notifications this host still holds open.
    pub fn open_count(&self) -> usize {
        self.live.borrow().open.len()
    }
}

/// Forgets a notification the user closed from the system UI.
#[cfg(any(target_arch = "wasm32", test))]
fn release_dismissed(live: &std::rc::Weak<RefCell<LiveNotifications>>, handle: DisplayHandle) {
    let Some(live) = live.upgrade() else {
        return;
    };
    let Ok(mut table) = live.try_borrow_mut() else {
        logging::warn!("notification {} dismissed while its table was busy", handle.0);
        return;
    };
    let released = table.open.remove(&handle);
    drop(table);

    // The running `onclose` closure is owned by the released entry.
    #[cfg(target_arch = "wasm32")]
    if let Some(entry) = released {
        wasm_bindgen_futures::spawn_local(async move { drop(entry) });
    }

    #[cfg(not(target_arch = "wasm32"))]
    let _ = released;
}

impl NotificationHost for WebNotificationHost {
    fn is_supported(&self) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::window()
                .map(|window| bridge::has_property(&window, "Notification"))
                .unwrap_or(false)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            false
        }
    }

    fn permission(&self) -> PermissionState {
        #[cfg(target_arch = "wasm32")]
        {
            if !self.is_supported() {
                return PermissionState::Default;
            }
            match web_sys::Notification::permission() {
                web_sys::NotificationPermission::Granted => PermissionState::Granted,
                web_sys::NotificationPermission::Denied => PermissionState::Denied,
                _ => PermissionState::Default,
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            PermissionState::Default
        }
    }

    fn request_permission<'a>(&'a self) -> HostFuture<'a, Result<PermissionState, String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let promise = web_sys::Notification::request_permission()
                    .map_err(bridge::js_error_to_string)?;
                let decided = bridge::await_promise(promise).await?;
                Ok(decided
                    .as_string()
                    .map(|token| PermissionState::from_token(&token))
                    .unwrap_or_default())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Err("notification permission is only available when compiled for wasm32".to_string())
            }
        })
    }

    fn show(
        &self,
        title: &str,
        options: &Value,
        listeners: DisplayListeners,
    ) -> Result<DisplayHandle, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let js_options = bridge::to_js(options)?;
            let notification = web_sys::Notification::new_with_options(
                title,
                js_options.unchecked_ref::<web_sys::NotificationOptions>(),
            )
            .map_err(|err| {
                format!(
                    "notification dispatch failed: {}",
                    bridge::js_error_to_string(err)
                )
            })?;

            let mut live = self.live.borrow_mut();
            live.next_handle += 1;
            let handle = DisplayHandle(live.next_handle);

            let on_click = listeners.on_click.map(|listener| {
                let callback =
                    Closure::<dyn FnMut()>::wrap(Box::new(move || listener(handle)));
                notification.set_onclick(Some(callback.as_ref().unchecked_ref()));
                callback
            });
            let on_error = listeners.on_error.map(|listener| {
                let callback =
                    Closure::<dyn FnMut()>::wrap(Box::new(move || listener(handle)));
                notification.set_onerror(Some(callback.as_ref().unchecked_ref()));
                callback
            });
            let table = Rc::downgrade(&self.live);
            let on_close = Closure::<dyn FnMut()>::wrap(Box::new(move || {
                release_dismissed(&table, handle)
            }));
            notification.set_onclose(Some(on_close.as_ref().unchecked_ref()));

            live.open.insert(
                handle,
                LiveNotification {
                    notification,
                    _on_click: on_click,
                    _on_error: on_error,
                    _on_close: on_close,
                },
            );
            Ok(handle)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (title, options, listeners);
            Err("notifications are only available when compiled for wasm32".to_string())
        }
    }

    fn close(&self, handle: DisplayHandle) {
        let Some(entry) = self.live.borrow_mut().open.remove(&handle) else {
            return;
        };

        #[cfg(target_arch = "wasm32")]
        {
            entry.notification.set_onclick(None);
            entry.notification.set_onerror(None);
            entry.notification.set_onclose(None);
            entry.notification.close();
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = entry;
    }

    fn schedule_close(&self, handle: DisplayHandle, delay: Duration) {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(window) = web_sys::window() else {
                return;
            };
            let host = self.clone();
            let callback = Closure::once_into_js(move || host.close(handle));
            let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
            if let Err(err) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                millis,
            ) {
                logging::warn!(
                    "auto-close timer failed: {}",
                    bridge::js_error_to_string(err)
                );
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = (handle, delay);
    }

    fn alert(&self, message: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            let shown = web_sys::window()
                .ok_or_else(|| "window unavailable".to_string())
                .and_then(|window| {
                    window
                        .alert_with_message(message)
                        .map_err(bridge::js_error_to_string)
                });
            if let Err(err) = shown {
                logging::warn!("notification alert fallback failed: {err}");
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        logging::log!("{message}");
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn native_builds_report_no_notification_support() {
        let host = WebNotificationHost::default();
        assert!(!host.is_supported());
        assert_eq!(host.permission(), PermissionState::Default);
        assert!(block_on(host.request_permission()).is_err());
        assert!(host
            .show("Hi", &Value::Null, DisplayListeners::default())
            .is_err());
    }

    #[test]
    fn closing_unknown_handles_is_ignored() {
        let host = WebNotificationHost::default();
        host.close(DisplayHandle(42));
        host.schedule_close(DisplayHandle(42), Duration::from_secs(1));
        assert_eq!(host.open_count(), 0);
    }

    #[test]
    fn user_dismissal_releases_the_open_entry() {
        let host = WebNotificationHost::default();
        host.live.borrow_mut().open.insert(DisplayHandle(1), ());
        host.live.borrow_mut().open.insert(DisplayHandle(2), ());

        release_dismissed(&Rc::downgrade(&host.live), DisplayHandle(1));

        assert_eq!(host.open_count(), 1);
        assert!(!host.live.borrow().open.contains_key(&DisplayHandle(1)));
        host.close(DisplayHandle(1));
        assert_eq!(host.open_count(), 1);
    }

    #[test]
    fn dismissal_after_the_host_is_dropped_is_ignored() {
        let host = WebNotificationHost::default();
        let table = Rc::downgrade(&host.live);
        drop(host);
        release_dismissed(&table, DisplayHandle(1));
        assert!(table.upgrade().is_none());
    }
}
