//! In-memory host doubles that record every call.
//!
//! Clones share state, so a test can hand one clone to the facade and inspect another.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
    time::Duration,
};

use serde_json::Value;

use crate::host::{
    DisplayHandle, DisplayListeners, HostFuture, NotificationHost, WorkerHost,
    WorkerNotificationRecord,
};
use crate::PermissionState;

#[derive(Debug, Clone, PartialEq)]
/// A notification shown through [`MemoryNotificationHost`].
pub struct ShownNotification {
    /// Handle issued for the notification.
    pub handle: DisplayHandle,
    /// Title passed to the host.
    pub title: String,
    /// Normalized option object passed to the host.
    pub options: Value,
}

#[derive(Debug, Default)]
struct MemoryNotificationState {
    supported: bool,
    permission: PermissionState,
    prompt_answer: Option<PermissionState>,
    permission_requests: usize,
    next_handle: u64,
    shown: Vec<ShownNotification>,
    open: BTreeSet<DisplayHandle>,
    closed: Vec<DisplayHandle>,
    scheduled: Vec<(DisplayHandle, Duration)>,
    alerts: Vec<String>,
    listeners: BTreeMap<DisplayHandle, DisplayListeners>,
}

#[derive(Debug, Clone)]
/// Page notification host backed by in-memory state.
pub struct MemoryNotificationHost {
    inner: Rc<RefCell<MemoryNotificationState>>,
}

impl Default for MemoryNotificationHost {
    fn default() -> Self {
        Self::with_permission(PermissionState::Default)
    }
}

impl MemoryNotificationHost {
    /// Creates a supported host with the given current permission.
    ///
    /// Prompting leaves the permission unchanged unless [`Self::answer_prompt_with`] is used.
    pub fn with_permission(permission: PermissionState) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryNotificationState {
                supported: true,
                permission,
                ..MemoryNotificationState::default()
            })),
        }
    }

    /// Creates a host without the Notification API.
    pub fn unsupported() -> Self {
        let host = Self::default();
        host.inner.borrow_mut().supported = false;
        host
    }

    /// Sets the decision the user makes when prompted.
    pub fn answer_prompt_with(self, answer: PermissionState) -> Self {
        self.inner.borrow_mut().prompt_answer = Some(answer);
        self
    }

    /// Number of permission prompts issued.
    pub fn permission_requests(&self) -> usize {
        self.inner.borrow().permission_requests
    }

    /// Every notification shown so far.
    pub fn shown(&self) -> Vec<ShownNotification> {
        self.inner.borrow().shown.clone()
    }

    /// Every close call that hit an open notification, in order.
    pub fn closed(&self) -> Vec<DisplayHandle> {
        self.inner.borrow().closed.clone()
    }

    /// Returns whether `handle` is still on screen.
    pub fn is_open(&self, handle: DisplayHandle) -> bool {
        self.inner.borrow().open.contains(&handle)
    }

    /// Auto-close timers scheduled so far.
    pub fn scheduled(&self) -> Vec<(DisplayHandle, Duration)> {
        self.inner.borrow().scheduled.clone()
    }

    /// Alert disclosures shown so far.
    pub fn alerts(&self) -> Vec<String> {
        self.inner.borrow().alerts.clone()
    }

    /// Total number of host calls recorded, prompts and alerts included.
    pub fn call_count(&self) -> usize {
        let state = self.inner.borrow();
        state.permission_requests
            + state.shown.len()
            + state.closed.len()
            + state.scheduled.len()
            + state.alerts.len()
    }

    /// Fires every scheduled auto-close timer.
    pub fn fire_timers(&self) {
        let due: Vec<DisplayHandle> = self
            .inner
            .borrow()
            .scheduled
            .iter()
            .map(|(handle, _)| *handle)
            .collect();
        for handle in due {
            self.close(handle);
        }
    }

    /// Simulates a user click on `handle`.
    pub fn click(&self, handle: DisplayHandle) {
        let listener = self
            .inner
            .borrow()
            .listeners
            .get(&handle)
            .and_then(|listeners| listeners.on_click.clone());
        if let Some(listener) = listener {
            listener(handle);
        }
    }

    /// Simulates the user dismissing `handle` from the system tray.
    ///
    /// The host forgets the notification without recording a close call.
    pub fn dismiss(&self, handle: DisplayHandle) {
        let mut state = self.inner.borrow_mut();
        state.open.remove(&handle);
        state.listeners.remove(&handle);
    }

    /// Simulates a host display failure on `handle`.
    pub fn fail(&self, handle: DisplayHandle) {
        let listener = self
            .inner
            .borrow()
            .listeners
            .get(&handle)
            .and_then(|listeners| listeners.on_error.clone());
        if let Some(listener) = listener {
            listener(handle);
        }
    }
}

impl NotificationHost for MemoryNotificationHost {
    fn is_supported(&self) -> bool {
        self.inner.borrow().supported
    }

    fn permission(&self) -> PermissionState {
        self.inner.borrow().permission
    }

    fn request_permission<'a>(&'a self) -> HostFuture<'a, Result<PermissionState, String>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.permission_requests += 1;
            if let Some(answer) = state.prompt_answer {
                state.permission = answer;
            }
            Ok(state.permission)
        })
    }

    fn show(
        &self,
        title: &str,
        options: &Value,
        listeners: DisplayListeners,
    ) -> Result<DisplayHandle, String> {
        let mut state = self.inner.borrow_mut();
        state.next_handle += 1;
        let handle = DisplayHandle(state.next_handle);
        state.shown.push(ShownNotification {
            handle,
            title: title.to_string(),
            options: options.clone(),
        });
        state.open.insert(handle);
        state.listeners.insert(handle, listeners);
        Ok(handle)
    }

    fn close(&self, handle: DisplayHandle) {
        let mut state = self.inner.borrow_mut();
        if state.open.remove(&handle) {
            state.closed.push(handle);
            state.listeners.remove(&handle);
        }
    }

    fn schedule_close(&self, handle: DisplayHandle, delay: Duration) {
        self.inner.borrow_mut().scheduled.push((handle, delay));
    }

    fn alert(&self, message: &str) {
        self.inner.borrow_mut().alerts.push(message.to_string());
    }
}

#[derive(Debug, Default)]
struct MemoryWorkerState {
    available: bool,
    register_error: Option<String>,
    ready_error: Option<String>,
    lose_notifications: bool,
    registered: Vec<String>,
    shown: Vec<(String, Value)>,
    lookups: Vec<String>,
}

#[derive(Debug, Clone)]
/// Service-worker host backed by in-memory state.
pub struct MemoryWorkerHost {
    inner: Rc<RefCell<MemoryWorkerState>>,
}

impl Default for MemoryWorkerHost {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryWorkerState {
                available: true,
                ..MemoryWorkerState::default()
            })),
        }
    }
}

impl MemoryWorkerHost {
    /// Creates a host without service-worker support.
    pub fn unavailable() -> Self {
        let host = Self::default();
        host.inner.borrow_mut().available = false;
        host
    }

    /// Makes registration fail with `message`.
    pub fn failing_registration(self, message: &str) -> Self {
        self.inner.borrow_mut().register_error = Some(message.to_string());
        self
    }

    /// Makes the ready query fail with `message`.
    pub fn never_ready(self, message: &str) -> Self {
        self.inner.borrow_mut().ready_error = Some(message.to_string());
        self
    }

    /// Makes by-tag lookups return nothing, as if the notification was dismissed immediately.
    pub fn losing_notifications(self) -> Self {
        self.inner.borrow_mut().lose_notifications = true;
        self
    }

    /// Script paths registered so far.
    pub fn registered(&self) -> Vec<String> {
        self.inner.borrow().registered.clone()
    }

    /// `(title, options)` pairs shown through the worker.
    pub fn shown(&self) -> Vec<(String, Value)> {
        self.inner.borrow().shown.clone()
    }

    /// Tags looked up so far.
    pub fn lookups(&self) -> Vec<String> {
        self.inner.borrow().lookups.clone()
    }
}

fn option_text(options: &Value, key: &str) -> String {
    options
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl WorkerHost for MemoryWorkerHost {
    fn is_available(&self) -> bool {
        self.inner.borrow().available
    }

    fn register<'a>(&'a self, script_path: &'a str) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            if let Some(err) = state.register_error.clone() {
                return Err(err);
            }
            if !state.registered.iter().any(|path| path == script_path) {
                state.registered.push(script_path.to_string());
            }
            Ok(())
        })
    }

    fn ready<'a>(&'a self) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            match self.inner.borrow().ready_error.clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }

    fn show_notification<'a>(
        &'a self,
        title: &'a str,
        options: &'a Value,
    ) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let tag = option_text(options, "tag");
            let mut state = self.inner.borrow_mut();
            if !tag.is_empty() {
                state
                    .shown
                    .retain(|(_, shown)| option_text(shown, "tag") != tag);
            }
            state.shown.push((title.to_string(), options.clone()));
            Ok(())
        })
    }

    fn notifications_by_tag<'a>(
        &'a self,
        tag: &'a str,
    ) -> HostFuture<'a, Result<Vec<WorkerNotificationRecord>, String>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.lookups.push(tag.to_string());
            if state.lose_notifications {
                return Ok(Vec::new());
            }
            Ok(state
                .shown
                .iter()
                .filter(|(_, options)| option_text(options, "tag") == tag)
                .map(|(title, options)| WorkerNotificationRecord {
                    title: title.clone(),
                    tag: tag.to_string(),
                    body: option_text(options, "body"),
                    data: options.get("data").cloned(),
                })
                .collect())
        })
    }
}
