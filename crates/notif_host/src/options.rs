//! Notification option set accepted by the facade and normalized for host display calls.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default script location used when registering the notification service worker.
pub const DEFAULT_SERVICE_WORKER_PATH: &str = "sw.js";

/// Option keys consumed by the facade itself and never forwarded to the host.
const FACADE_ONLY_KEYS: [&str; 2] = ["timeout", "serviceWorkerPath"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Text direction hint for notification content.
pub enum Direction {
    /// Let the host decide.
    Auto,
    /// Left to right.
    Ltr,
    /// Right to left.
    Rtl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
/// Vibration request: one duration or an on/off pattern, in milliseconds.
pub enum Vibrate {
    /// Single vibration duration.
    Duration(u32),
    /// Alternating vibrate/pause durations.
    Pattern(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Action button shown on a worker-displayed notification.
pub struct NotificationAction {
    /// Identifier reported back when the action is chosen.
    pub action: String,
    /// Button label.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional button icon URL.
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Flat option set for a notification facade.
///
/// Recognized keys are typed fields. Anything else lands in [`NotificationOptions::extra`] and is
/// forwarded untouched to the host display call.
pub struct NotificationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Text direction.
    pub dir: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// BCP 47 locale tag.
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Dedup tag; a new notification with the same tag replaces the old one.
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Icon URL.
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Image URL.
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Badge URL.
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Sound URL.
    pub sound: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Vibration request.
    pub vibrate: Option<Vibrate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Event timestamp in unix milliseconds.
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Re-alert the user when replacing a same-tag notification.
    pub renotify: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Suppress sound and vibration.
    pub silent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Keep the notification until the user interacts with it.
    pub require_interaction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Arbitrary payload stored with the notification.
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// Action buttons.
    pub actions: Vec<NotificationAction>,
    #[serde(default)]
    /// Auto-dismiss delay in seconds, fractions allowed.
    ///
    /// Zero, negative, and non-finite delays keep the notification visible.
    pub timeout: f64,
    #[serde(default = "default_service_worker_path")]
    /// Script location of the notification service worker.
    pub service_worker_path: String,
    #[serde(flatten)]
    /// Unrecognized keys, passed through to the host.
    pub extra: Map<String, Value>,
}

fn default_service_worker_path() -> String {
    DEFAULT_SERVICE_WORKER_PATH.to_string()
}

impl Default for NotificationOptions {
    fn default() -> Self {
        Self {
            dir: None,
            lang: None,
            tag: None,
            icon: None,
            image: None,
            badge: None,
            sound: None,
            vibrate: None,
            timestamp: None,
            renotify: None,
            silent: None,
            require_interaction: None,
            data: None,
            actions: Vec::new(),
            timeout: 0.0,
            service_worker_path: default_service_worker_path(),
            extra: Map::new(),
        }
    }
}

impl NotificationOptions {
    /// Delay after which a directly displayed notification closes itself, if any.
    pub fn auto_close_delay(&self) -> Option<Duration> {
        if !(self.timeout.is_finite() && self.timeout > 0.0) {
            return None;
        }
        Duration::try_from_secs_f64(self.timeout).ok()
    }

    /// Parses an option set from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is not valid JSON or a recognized key has the wrong type.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    }

    /// Builds the option object handed to the host display call.
    ///
    /// Facade-only keys are stripped and `body` is set from the caller's message body.
    ///
    /// # Errors
    ///
    /// Returns an error when an option value cannot be represented as JSON.
    pub fn display_payload(&self, body: &str) -> Result<Value, String> {
        let mut value = serde_json::to_value(self).map_err(|e| e.to_string())?;
        let Some(object) = value.as_object_mut() else {
            return Err("notification options did not serialize to an object".to_string());
        };
        for key in FACADE_ONLY_KEYS {
            object.remove(key);
        }
        object.insert("body".to_string(), Value::String(body.to_string()));
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_keep_notifications_visible_and_use_sw_js() {
        let options = NotificationOptions::default();
        assert_eq!(options.timeout, 0.0);
        assert_eq!(options.auto_close_delay(), None);
        assert_eq!(options.service_worker_path, "sw.js");
    }

    #[test]
    fn from_json_reads_camel_case_keys_and_keeps_unknown_ones() {
        let options = NotificationOptions::from_json(
            r#"{"icon":"bell.png","timeout":5,"requireInteraction":true,"vibrate":[100,50,100],"x-custom":1}"#,
        )
        .expect("parse");

        assert_eq!(options.icon.as_deref(), Some("bell.png"));
        assert_eq!(options.timeout, 5.0);
        assert_eq!(options.require_interaction, Some(true));
        assert_eq!(options.vibrate, Some(Vibrate::Pattern(vec![100, 50, 100])));
        assert_eq!(options.service_worker_path, "sw.js");
        assert_eq!(options.extra.get("x-custom"), Some(&json!(1)));
    }

    #[test]
    fn display_payload_strips_facade_keys_and_sets_body() {
        let options = NotificationOptions {
            dir: Some(Direction::Rtl),
            tag: Some("chat".to_string()),
            timeout: 10.0,
            service_worker_path: "/push/sw.js".to_string(),
            extra: Map::from_iter([("custom".to_string(), json!("kept"))]),
            ..NotificationOptions::default()
        };

        let payload = options.display_payload("hello").expect("payload");

        assert_eq!(
            payload,
            json!({
                "dir": "rtl",
                "tag": "chat",
                "body": "hello",
                "custom": "kept",
            })
        );
    }

    #[test]
    fn fractional_timeouts_load_and_only_positive_delays_auto_close() {
        let options = NotificationOptions::from_json(r#"{"timeout":2.5}"#).expect("parse");
        assert_eq!(options.timeout, 2.5);
        assert_eq!(options.auto_close_delay(), Some(Duration::from_millis(2500)));

        for timeout in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::MAX] {
            let options = NotificationOptions {
                timeout,
                ..NotificationOptions::default()
            };
            assert_eq!(options.auto_close_delay(), None, "timeout {timeout}");
        }
    }

    #[test]
    fn from_json_rejects_mistyped_recognized_keys() {
        assert!(NotificationOptions::from_json(r#"{"timeout":"soon"}"#).is_err());
    }
}
