//! Notification facade choosing between direct and worker-mediated display.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use leptos::logging;
use serde_json::Value;

use crate::{
    classify::ContextClassifier,
    host::{
        DisplayHandle, DisplayListener, DisplayListeners, NotificationHost, WorkerHost,
        WorkerNotificationRecord,
    },
    time::generate_tag,
    worker::{attach_worker_click, WorkerClickAction},
    NotificationOptions, NotifyError, PermissionState,
};

/// Page-local event callback.
pub type Hook = Rc<dyn Fn()>;

#[derive(Clone, Default)]
/// Optional callbacks attached to a single `notify` call.
pub struct EventHooks {
    /// Runs after a directly displayed notification is clicked and closed.
    pub on_click: Option<Hook>,
    /// Runs when the host fails to display a direct notification.
    pub on_error: Option<Hook>,
    /// Action the service worker runs when a worker-displayed notification is clicked.
    pub worker_click: Option<WorkerClickAction>,
}

impl EventHooks {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the click callback.
    pub fn on_click(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(hook));
        self
    }

    /// Sets the error callback.
    pub fn on_error(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_error = Some(Rc::new(hook));
        self
    }

    /// Sets the worker-side click action.
    pub fn worker_click(mut self, action: WorkerClickAction) -> Self {
        self.worker_click = Some(action);
        self
    }
}

impl fmt::Debug for EventHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHooks")
            .field("on_click", &self.on_click.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("worker_click", &self.worker_click)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Result of a `notify` call that did not fail.
pub enum NotifyOutcome {
    /// Shown directly in the page context.
    Displayed(DisplayHandle),
    /// Shown by the service worker; the record is the worker's view of it.
    DisplayedViaWorker(WorkerNotificationRecord),
    /// Notifications are unsupported, so the message was shown as an alert instead.
    Disclosed,
    /// The permission prompt ended without a grant; nothing was shown.
    NotShown(PermissionState),
}

#[derive(Clone)]
/// Host capabilities the facade drives.
pub struct NotifyHosts {
    /// Direct Notification API.
    pub page: Rc<dyn NotificationHost>,
    /// Service-worker-brokered display.
    pub worker: Rc<dyn WorkerHost>,
    /// Direct-versus-worker decision.
    pub classifier: Rc<dyn ContextClassifier>,
}

/// Fluent wrapper over the host notification capabilities.
///
/// One instance holds at most one directly displayed notification; showing a new one closes the
/// previous one.
pub struct BrowserNotif {
    hosts: NotifyHosts,
    options: RefCell<NotificationOptions>,
    current: Cell<Option<DisplayHandle>>,
}

impl fmt::Debug for BrowserNotif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserNotif")
            .field("options", &self.options.borrow())
            .field("current", &self.current.get())
            .finish()
    }
}

impl BrowserNotif {
    /// Creates a facade over `hosts` configured with `options`.
    pub fn new(options: NotificationOptions, hosts: NotifyHosts) -> Self {
        if !hosts.page.is_supported() {
            logging::warn!("This browser does not support system notifications");
        }
        Self {
            hosts,
            options: RefCell::new(options),
            current: Cell::new(None),
        }
    }

    /// Returns whether the page context exposes the Notification API.
    pub fn is_supported(&self) -> bool {
        self.hosts.page.is_supported()
    }

    /// Returns whether display goes through the service worker in this context.
    pub fn is_mobile(&self) -> bool {
        !self.hosts.classifier.displays_directly()
    }

    /// Current permission, without prompting.
    pub fn permission(&self) -> PermissionState {
        self.hosts.page.permission()
    }

    /// Current option set.
    pub fn options(&self) -> NotificationOptions {
        self.options.borrow().clone()
    }

    /// Replaces the option set used by later `notify` calls.
    pub fn set_options(&self, options: NotificationOptions) {
        *self.options.borrow_mut() = options;
    }

    /// Handle of the notification this instance displayed last, if any.
    pub fn current(&self) -> Option<DisplayHandle> {
        self.current.get()
    }

    /// Prompts for notification permission.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Host`] when the host prompt fails.
    pub async fn request_permission(&self) -> Result<PermissionState, NotifyError> {
        self.hosts
            .page
            .request_permission()
            .await
            .map_err(NotifyError::Host)
    }

    /// Shows `title` and `body` using the configured options.
    ///
    /// Unsupported hosts fall back to an alert. An undecided permission triggers a prompt first.
    ///
    /// # Errors
    ///
    /// - [`NotifyError::Validation`] for an empty title, before any host call.
    /// - [`NotifyError::PermissionDenied`] when the user blocked notifications.
    /// - [`NotifyError::WorkerUnavailable`] or [`NotifyError::LookupNotFound`] from the worker
    ///   path in mobile contexts.
    /// - [`NotifyError::Host`] for any other host failure.
    pub async fn notify(
        &self,
        title: &str,
        body: &str,
        hooks: EventHooks,
    ) -> Result<NotifyOutcome, NotifyError> {
        validate_title(title)?;

        if !self.is_supported() {
            self.hosts.page.alert(&disclosure_text(title, body));
            return Ok(NotifyOutcome::Disclosed);
        }

        match self.permission() {
            PermissionState::Granted => {}
            PermissionState::Default => {
                let decided = self.request_permission().await?;
                if decided != PermissionState::Granted {
                    return Ok(NotifyOutcome::NotShown(decided));
                }
            }
            PermissionState::Denied => {
                logging::warn!("User denied the notification permission");
                return Err(NotifyError::PermissionDenied);
            }
        }

        let options = self.options();
        if self.is_mobile() {
            self.display_via_worker(title, body, &options, &hooks).await
        } else {
            self.display_direct(title, body, &options, hooks)
        }
    }

    /// Closes the notification this instance displayed, if any.
    pub fn close(&self) {
        if let Some(handle) = self.current.take() {
            self.hosts.page.close(handle);
        }
    }

    fn display_direct(
        &self,
        title: &str,
        body: &str,
        options: &NotificationOptions,
        hooks: EventHooks,
    ) -> Result<NotifyOutcome, NotifyError> {
        self.close();

        let payload = options.display_payload(body).map_err(NotifyError::Host)?;
        let on_click = hooks.on_click.map(|hook| {
            let page = Rc::clone(&self.hosts.page);
            Rc::new(move |handle: DisplayHandle| {
                page.close(handle);
                hook();
            }) as DisplayListener
        });
        let on_error = hooks
            .on_error
            .map(|hook| Rc::new(move |_: DisplayHandle| hook()) as DisplayListener);

        let handle = self
            .hosts
            .page
            .show(title, &payload, DisplayListeners { on_click, on_error })
            .map_err(NotifyError::Host)?;
        if let Some(delay) = options.auto_close_delay() {
            self.hosts.page.schedule_close(handle, delay);
        }
        self.current.set(Some(handle));
        Ok(NotifyOutcome::Displayed(handle))
    }

    async fn display_via_worker(
        &self,
        title: &str,
        body: &str,
        options: &NotificationOptions,
        hooks: &EventHooks,
    ) -> Result<NotifyOutcome, NotifyError> {
        let worker = &self.hosts.worker;
        if !worker.is_available() {
            return Err(NotifyError::WorkerUnavailable(
                "service workers are not exposed by this host".to_string(),
            ));
        }

        let script_path = options.service_worker_path.as_str();
        if let Err(err) = worker.register(script_path).await {
            logging::warn!("service worker registration at `{script_path}` failed: {err}");
        }
        worker
            .ready()
            .await
            .map_err(NotifyError::WorkerUnavailable)?;

        let mut payload = options.display_payload(body).map_err(NotifyError::Host)?;
        if let Some(action) = &hooks.worker_click {
            attach_worker_click(&mut payload, action).map_err(NotifyError::Host)?;
        }
        let tag = match options.tag.as_deref().filter(|tag| !tag.is_empty()) {
            Some(tag) => tag.to_string(),
            None => {
                let tag = generate_tag();
                payload["tag"] = Value::String(tag.clone());
                tag
            }
        };

        worker
            .show_notification(title, &payload)
            .await
            .map_err(NotifyError::Host)?;
        let records = worker
            .notifications_by_tag(&tag)
            .await
            .map_err(NotifyError::Host)?;
        records
            .into_iter()
            .next()
            .map(NotifyOutcome::DisplayedViaWorker)
            .ok_or(NotifyError::LookupNotFound { tag })
    }
}

fn validate_title(title: &str) -> Result<(), NotifyError> {
    if title.trim().is_empty() {
        return Err(NotifyError::Validation("title must be non-empty text".to_string()));
    }
    Ok(())
}

fn disclosure_text(title: &str, body: &str) -> String {
    if body.trim().is_empty() {
        title.to_string()
    } else {
        format!("{title}\n{body}")
    }
}
