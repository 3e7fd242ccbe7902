//! Context classification from the browser's user agent.

use notif_host::UserAgentClassifier;

/// Returns the page's `navigator.userAgent`, or an empty string when unavailable.
pub fn user_agent() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|window| window.navigator().user_agent().ok())
            .unwrap_or_default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        String::new()
    }
}

/// Builds a classifier for the current page's user agent.
pub fn web_classifier() -> UserAgentClassifier {
    UserAgentClassifier::new(user_agent())
}
