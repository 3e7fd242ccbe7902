//! Strategies deciding whether a context can show notifications directly.

/// User-agent fragments identifying mobile platforms, matched case-insensitively.
pub const MOBILE_USER_AGENT_SIGNATURES: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Decides between direct and worker-mediated notification display.
pub trait ContextClassifier {
    /// Returns `true` when the page context can construct notifications itself.
    fn displays_directly(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Classifies a context as mobile by matching its user-agent string.
pub struct UserAgentClassifier {
    user_agent: String,
}

impl UserAgentClassifier {
    /// Creates a classifier for the given user-agent string.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    /// Returns whether the user agent matches a known mobile platform.
    pub fn is_mobile(&self) -> bool {
        let lowered = self.user_agent.to_ascii_lowercase();
        MOBILE_USER_AGENT_SIGNATURES
            .iter()
            .any(|signature| lowered.contains(signature))
    }
}

impl ContextClassifier for UserAgentClassifier {
    fn displays_directly(&self) -> bool {
        !self.is_mobile()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Classifier with a fixed answer.
pub struct FixedClassifier {
    /// Whether the context displays directly.
    pub direct: bool,
}

impl FixedClassifier {
    /// Classifier for desktop-like contexts.
    pub const DESKTOP: Self = Self { direct: true };
    /// Classifier for mobile contexts.
    pub const MOBILE: Self = Self { direct: false };
}

impl ContextClassifier for FixedClassifier {
    fn displays_directly(&self) -> bool {
        self.direct
    }
}
