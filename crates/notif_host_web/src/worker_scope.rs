//! Service-worker global scope wiring: lifecycle events and notification click dispatch.
//!
//! Call [`install_worker_handlers`] from the worker script's wasm entry point. Click payloads are
//! dispatched through a [`WorkerClickRegistry`] built into the worker; the clicked notification
//! is closed whether or not dispatch succeeds.

use notif_host::{HostFuture, WorkerClickRegistry, WorkerLifecycle};

#[cfg(target_arch = "wasm32")]
use leptos::logging;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

#[cfg(target_arch = "wasm32")]
use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Lifecycle controls of the running service worker.
pub struct WebWorkerScope;

#[cfg(target_arch = "wasm32")]
fn global_scope() -> Result<web_sys::ServiceWorkerGlobalScope, String> {
    js_sys::global()
        .dyn_into::<web_sys::ServiceWorkerGlobalScope>()
        .map_err(|_| "not running inside a service worker".to_string())
}

impl WorkerLifecycle for WebWorkerScope {
    fn skip_waiting<'a>(&'a self) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let promise = global_scope()?
                    .skip_waiting()
                    .map_err(bridge::js_error_to_string)?;
                bridge::await_promise(promise).await.map(|_| ())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Err("service worker scope is only available when compiled for wasm32".to_string())
            }
        })
    }

    fn claim_clients<'a>(&'a self) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let promise = global_scope()?.clients().claim();
                bridge::await_promise(promise).await.map(|_| ())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Err("service worker scope is only available when compiled for wasm32".to_string())
            }
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn lifecycle_promise<F>(step: F) -> js_sys::Promise
where
    F: std::future::Future<Output = Result<(), String>> + 'static,
{
    wasm_bindgen_futures::future_to_promise(async move {
        step.await
            .map(|()| JsValue::UNDEFINED)
            .map_err(|err| JsValue::from_str(&err))
    })
}

/// Registers `install`, `activate`, and `notificationclick` listeners on the worker scope.
///
/// # Errors
///
/// Returns an error outside a service-worker context or when a listener cannot be attached.
pub fn install_worker_handlers(registry: WorkerClickRegistry) -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        let scope = global_scope()?;

        let on_install = Closure::<dyn FnMut(web_sys::ExtendableEvent)>::wrap(Box::new(
            |event: web_sys::ExtendableEvent| {
                let promise = lifecycle_promise(notif_host::on_install(&WebWorkerScope));
                if let Err(err) = event.wait_until(&promise) {
                    let err = bridge::js_error_to_string(err);
                    logging::warn!("install wait_until failed: {err}");
                }
            },
        ));
        let on_activate = Closure::<dyn FnMut(web_sys::ExtendableEvent)>::wrap(Box::new(
            |event: web_sys::ExtendableEvent| {
                let promise = lifecycle_promise(notif_host::on_activate(&WebWorkerScope));
                if let Err(err) = event.wait_until(&promise) {
                    let err = bridge::js_error_to_string(err);
                    logging::warn!("activate wait_until failed: {err}");
                }
            },
        ));
        let on_click = Closure::<dyn FnMut(web_sys::NotificationEvent)>::wrap(Box::new(
            move |event: web_sys::NotificationEvent| {
                let notification = event.notification();
                let data = bridge::from_js(notification.data())
                    .map(Option::unwrap_or_default)
                    .unwrap_or_else(|err| {
                        logging::warn!("notification data could not be decoded: {err}");
                        serde_json::Value::Null
                    });
                match registry.dispatch_notification_click(&data) {
                    Ok(Some(action)) => logging::log!("worker click action `{action}` handled"),
                    Ok(None) => {}
                    Err(err) => logging::warn!("worker click dispatch failed: {err}"),
                }
                notification.close();
            },
        ));

        for (event, callback) in [
            ("install", on_install.as_ref()),
            ("activate", on_activate.as_ref()),
            ("notificationclick", on_click.as_ref()),
        ] {
            scope
                .add_event_listener_with_callback(event, callback.unchecked_ref())
                .map_err(|err| {
                    format!(
                        "failed to attach `{event}` listener: {}",
                        bridge::js_error_to_string(err)
                    )
                })?;
        }

        on_install.forget();
        on_activate.forget();
        on_click.forget();
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = registry;
        Err("service worker handlers are only available when compiled for wasm32".to_string())
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn native_builds_cannot_install_worker_handlers() {
        let registry = WorkerClickRegistry::new().with_handler("noop", |_| Ok(()));
        assert!(install_worker_handlers(registry).is_err());
        assert!(block_on(notif_host::on_install(&WebWorkerScope)).is_err());
        assert!(block_on(notif_host::on_activate(&WebWorkerScope)).is_err());
    }
}
