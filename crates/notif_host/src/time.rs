//! Clock helpers used for generated dedup tags.

use std::cell::Cell;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix of tags generated for worker-displayed notifications.
pub const GENERATED_TAG_PREFIX: &str = "browser-notif-";

thread_local! {
    static LAST_TAG_TIMESTAMP_MS: Cell<u64> = const { Cell::new(0) };
}

/// Returns the current unix timestamp in milliseconds.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Generates a dedup tag that is unique within the current context.
///
/// The suffix is the current unix millisecond time, bumped past the previous tag's suffix when
/// two tags are generated within the same millisecond.
pub fn generate_tag() -> String {
    let now = unix_time_ms_now();
    let stamp = LAST_TAG_TIMESTAMP_MS.with(|last| {
        let stamp = now.max(last.get().saturating_add(1));
        last.set(stamp);
        stamp
    });
    format!("{GENERATED_TAG_PREFIX}{stamp}")
}
