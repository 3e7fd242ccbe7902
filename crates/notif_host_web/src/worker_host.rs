//! Service-worker-brokered notification host backed by `navigator.serviceWorker`.

use notif_host::{HostFuture, WorkerHost, WorkerNotificationRecord};
use serde_json::Value;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Browser worker host using the page's service-worker container.
pub struct WebWorkerHost;

#[cfg(target_arch = "wasm32")]
fn container() -> Result<web_sys::ServiceWorkerContainer, String> {
    let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
    let navigator = window.navigator();
    if !bridge::has_property(&navigator, "serviceWorker") {
        return Err("navigator.serviceWorker unavailable".to_string());
    }
    Ok(navigator.service_worker())
}

#[cfg(target_arch = "wasm32")]
async fn ready_registration() -> Result<web_sys::ServiceWorkerRegistration, String> {
    let promise = container()?
        .ready()
        .map_err(bridge::js_error_to_string)?;
    bridge::await_promise(promise)
        .await?
        .dyn_into::<web_sys::ServiceWorkerRegistration>()
        .map_err(|_| "service worker ready resolved to a non-registration value".to_string())
}

#[cfg(target_arch = "wasm32")]
fn worker_record(notification: web_sys::Notification) -> WorkerNotificationRecord {
    let data = bridge::from_js(notification.data()).unwrap_or_else(|err| {
        leptos::logging::warn!("worker notification data could not be decoded: {err}");
        None
    });
    WorkerNotificationRecord {
        title: notification.title(),
        tag: notification.tag(),
        body: notification.body(),
        data,
    }
}

#[cfg(not(target_arch = "wasm32"))]
const WASM_ONLY: &str = "service workers are only available when compiled for wasm32";

impl WorkerHost for WebWorkerHost {
    fn is_available(&self) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            container().is_ok()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            false
        }
    }

    fn register<'a>(&'a self, script_path: &'a str) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                bridge::await_promise(container()?.register(script_path))
                    .await
                    .map(|_| ())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = script_path;
                Err(WASM_ONLY.to_string())
            }
        })
    }

    fn ready<'a>(&'a self) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                ready_registration().await.map(|_| ())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Err(WASM_ONLY.to_string())
            }
        })
    }

    fn show_notification<'a>(
        &'a self,
        title: &'a str,
        options: &'a Value,
    ) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let registration = ready_registration().await?;
                let js_options = bridge::to_js(options)?;
                let promise = registration
                    .show_notification_with_options(
                        title,
                        js_options.unchecked_ref::<web_sys::NotificationOptions>(),
                    )
                    .map_err(bridge::js_error_to_string)?;
                bridge::await_promise(promise).await.map(|_| ())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = (title, options);
                Err(WASM_ONLY.to_string())
            }
        })
    }

    fn notifications_by_tag<'a>(
        &'a self,
        tag: &'a str,
    ) -> HostFuture<'a, Result<Vec<WorkerNotificationRecord>, String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let registration = ready_registration().await?;
                let filter = bridge::to_js(&serde_json::json!({ "tag": tag }))?;
                let promise = registration
                    .get_notifications_with_filter(
                        filter.unchecked_ref::<web_sys::GetNotificationOptions>(),
                    )
                    .map_err(bridge::js_error_to_string)?;
                let listed = bridge::await_promise(promise).await?;
                Ok(js_sys::Array::from(&listed)
                    .iter()
                    .filter_map(|value| value.dyn_into::<web_sys::Notification>().ok())
                    .map(worker_record)
                    .collect())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = tag;
                Err(WASM_ONLY.to_string())
            }
        })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn native_builds_have_no_worker_capability() {
        let host = WebWorkerHost;
        assert!(!host.is_available());
        assert_eq!(block_on(host.register("sw.js")), Err(WASM_ONLY.to_string()));
        assert!(block_on(host.ready()).is_err());
        assert!(block_on(host.notifications_by_tag("t")).is_err());
    }
}
