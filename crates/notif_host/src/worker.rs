//! Service-worker side of worker-mediated notifications.
//!
//! The page attaches a [`WorkerClickAction`] to the notification payload. Inside the worker, a
//! [`WorkerClickRegistry`] maps action identifiers to handlers compiled into the worker, so a
//! click can only ever run code the worker already knows about.

use std::{collections::BTreeMap, fmt};

use leptos::logging;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{host::HostFuture, WorkerDispatchError};

/// Payload key carrying the click action.
pub const WORKER_CLICK_KEY: &str = "workerClick";
/// Payload key carrying the caller's original `data` value once a click action is attached.
pub const WORKER_DATA_KEY: &str = "data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Structured click request delivered to the worker with a notification.
pub struct WorkerClickAction {
    /// Handler identifier looked up in the worker's registry.
    pub action: String,
    #[serde(default)]
    /// Argument passed to the handler.
    pub data: Value,
}

impl WorkerClickAction {
    /// Creates an action without arguments.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            data: Value::Null,
        }
    }

    /// Sets the handler argument.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Wraps the `data` field of a display payload so it also carries `action`.
///
/// The caller's previous `data` value is preserved under [`WORKER_DATA_KEY`].
///
/// # Errors
///
/// Returns an error when `payload` is not a JSON object.
pub fn attach_worker_click(payload: &mut Value, action: &WorkerClickAction) -> Result<(), String> {
    let object = payload
        .as_object_mut()
        .ok_or_else(|| "notification payload is not an object".to_string())?;
    let mut envelope = Map::new();
    envelope.insert(
        WORKER_CLICK_KEY.to_string(),
        serde_json::to_value(action).map_err(|e| e.to_string())?,
    );
    if let Some(previous) = object.remove("data") {
        envelope.insert(WORKER_DATA_KEY.to_string(), previous);
    }
    object.insert("data".to_string(), Value::Object(envelope));
    Ok(())
}

/// Extracts the click action from a notification's stored `data`, if it carries one.
///
/// String payloads are decoded as JSON first. Payloads without a click action yield `None`.
///
/// # Errors
///
/// Returns [`WorkerDispatchError::Payload`] when a string payload is not JSON or a click action
/// is present but malformed.
pub fn decode_worker_click(data: &Value) -> Result<Option<WorkerClickAction>, WorkerDispatchError> {
    let parsed;
    let data = match data {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => {
                parsed = value;
                &parsed
            }
            Err(err) => return Err(WorkerDispatchError::Payload(err.to_string())),
        },
        other => other,
    };
    let Some(raw_action) = data.get(WORKER_CLICK_KEY) else {
        return Ok(None);
    };
    serde_json::from_value(raw_action.clone())
        .map(Some)
        .map_err(|e| WorkerDispatchError::Payload(e.to_string()))
}

/// Worker-side click handler.
pub type WorkerClickHandler = Box<dyn Fn(&Value) -> Result<(), String>>;

#[derive(Default)]
/// Fixed table of click handlers available inside the service worker.
pub struct WorkerClickRegistry {
    handlers: BTreeMap<String, WorkerClickHandler>,
}

impl fmt::Debug for WorkerClickRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerClickRegistry")
            .field("actions", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl WorkerClickRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `action`, replacing any previous handler.
    pub fn with_handler(
        mut self,
        action: impl Into<String>,
        handler: impl Fn(&Value) -> Result<(), String> + 'static,
    ) -> Self {
        self.handlers.insert(action.into(), Box::new(handler));
        self
    }

    /// Runs the handler named by a clicked notification's payload.
    ///
    /// Returns the dispatched action identifier, or `None` when the payload carries no action.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload is malformed, the action is unknown, or the handler
    /// fails.
    pub fn dispatch_notification_click(
        &self,
        data: &Value,
    ) -> Result<Option<String>, WorkerDispatchError> {
        let Some(click) = decode_worker_click(data)? else {
            return Ok(None);
        };
        let handler = self
            .handlers
            .get(&click.action)
            .ok_or_else(|| WorkerDispatchError::UnknownAction(click.action.clone()))?;
        handler(&click.data).map_err(|message| WorkerDispatchError::Handler {
            action: click.action.clone(),
            message,
        })?;
        Ok(Some(click.action))
    }
}

/// Lifecycle controls of the service-worker global scope.
pub trait WorkerLifecycle {
    /// Activates a newly installed worker without waiting for old clients to close.
    fn skip_waiting<'a>(&'a self) -> HostFuture<'a, Result<(), String>>;

    /// Takes control of already open clients.
    fn claim_clients<'a>(&'a self) -> HostFuture<'a, Result<(), String>>;
}

/// Handles the worker `install` event.
///
/// # Errors
///
/// Returns an error when the host refuses to skip the waiting phase.
pub async fn on_install<L: WorkerLifecycle + ?Sized>(scope: &L) -> Result<(), String> {
    scope.skip_waiting().await?;
    logging::log!("browser-notif worker installed");
    Ok(())
}

/// Handles the worker `activate` event.
///
/// # Errors
///
/// Returns an error when the host refuses to hand open clients to this worker.
pub async fn on_activate<L: WorkerLifecycle + ?Sized>(scope: &L) -> Result<(), String> {
    scope.claim_clients().await?;
    logging::log!("browser-notif worker activated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct RecordingScope {
        calls: RefCell<Vec<&'static str>>,
    }

    impl WorkerLifecycle for RecordingScope {
        fn skip_waiting<'a>(&'a self) -> HostFuture<'a, Result<(), String>> {
            self.calls.borrow_mut().push("skip_waiting");
            Box::pin(async { Ok(()) })
        }

        fn claim_clients<'a>(&'a self) -> HostFuture<'a, Result<(), String>> {
            self.calls.borrow_mut().push("claim_clients");
            Box::pin(async { Ok(()) })
        }
    }

    fn counting_registry(hits: Rc<RefCell<Vec<Value>>>) -> WorkerClickRegistry {
        WorkerClickRegistry::new().with_handler("open-inbox", move |data| {
            hits.borrow_mut().push(data.clone());
            Ok(())
        })
    }

    #[test]
    fn attach_preserves_caller_data_under_envelope() {
        let mut payload = json!({ "body": "b", "data": { "id": 7 } });
        let action = WorkerClickAction::new("open-inbox").with_data(json!("/inbox"));

        attach_worker_click(&mut payload, &action).expect("attach");

        assert_eq!(
            payload,
            json!({
                "body": "b",
                "data": {
                    "workerClick": { "action": "open-inbox", "data": "/inbox" },
                    "data": { "id": 7 },
                },
            })
        );
    }

    #[test]
    fn dispatch_runs_registered_handler_with_action_data() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let registry = counting_registry(hits.clone());
        let mut payload = json!({});
        attach_worker_click(
            &mut payload,
            &WorkerClickAction::new("open-inbox").with_data(json!({ "folder": "a" })),
        )
        .expect("attach");

        let dispatched = registry
            .dispatch_notification_click(&payload["data"])
            .expect("dispatch");

        assert_eq!(dispatched.as_deref(), Some("open-inbox"));
        assert_eq!(*hits.borrow(), vec![json!({ "folder": "a" })]);
    }

    #[test]
    fn dispatch_accepts_json_encoded_string_payloads() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let registry = counting_registry(hits.clone());
        let raw = Value::String(r#"{"workerClick":{"action":"open-inbox"}}"#.to_string());

        assert_eq!(
            registry.dispatch_notification_click(&raw).expect("dispatch"),
            Some("open-inbox".to_string())
        );
        assert_eq!(*hits.borrow(), vec![Value::Null]);
    }

    #[test]
    fn dispatch_without_action_runs_nothing() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let registry = counting_registry(hits.clone());

        for data in [Value::Null, json!({ "id": 1 }), json!(r#"{"id":1}"#)] {
            assert_eq!(registry.dispatch_notification_click(&data), Ok(None));
        }
        assert!(hits.borrow().is_empty());
    }

    #[test]
    fn dispatch_rejects_string_payloads_that_are_not_json() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let registry = counting_registry(hits.clone());

        for raw in ["{not json", "plain text"] {
            assert!(matches!(
                registry.dispatch_notification_click(&Value::String(raw.to_string())),
                Err(WorkerDispatchError::Payload(_))
            ));
        }
        assert!(hits.borrow().is_empty());
    }

    #[test]
    fn dispatch_reports_unknown_actions_and_handler_failures() {
        let registry = WorkerClickRegistry::new()
            .with_handler("broken", |_| Err("no client window".to_string()));

        assert_eq!(
            registry.dispatch_notification_click(&json!({ "workerClick": { "action": "missing" } })),
            Err(WorkerDispatchError::UnknownAction("missing".to_string()))
        );
        assert_eq!(
            registry.dispatch_notification_click(&json!({ "workerClick": { "action": "broken" } })),
            Err(WorkerDispatchError::Handler {
                action: "broken".to_string(),
                message: "no client window".to_string(),
            })
        );
        assert!(matches!(
            registry.dispatch_notification_click(&json!({ "workerClick": 42 })),
            Err(WorkerDispatchError::Payload(_))
        ));
    }

    #[test]
    fn lifecycle_handlers_skip_waiting_then_claim() {
        let scope = RecordingScope::default();
        block_on(on_install(&scope)).expect("install");
        block_on(on_activate(&scope)).expect("activate");
        assert_eq!(*scope.calls.borrow(), vec!["skip_waiting", "claim_clients"]);
    }
}
