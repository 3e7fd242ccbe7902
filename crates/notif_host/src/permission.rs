//! Notification permission tri-state mirrored from the host.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Host notification permission.
pub enum PermissionState {
    /// The user has not decided yet.
    #[default]
    Default,
    /// Notifications may be shown.
    Granted,
    /// Notifications are blocked.
    Denied,
}

impl PermissionState {
    /// Parses a host permission token. Unknown tokens are treated as undecided.
    pub fn from_token(token: &str) -> Self {
        match token {
            "granted" => Self::Granted,
            "denied" => Self::Denied,
            _ => Self::Default,
        }
    }

    /// Returns the host permission token.
    pub const fn as_token(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_match_host_strings() {
        for state in [
            PermissionState::Default,
            PermissionState::Granted,
            PermissionState::Denied,
        ] {
            assert_eq!(PermissionState::from_token(state.as_token()), state);
        }
    }

    #[test]
    fn unknown_token_is_undecided() {
        assert_eq!(PermissionState::from_token("prompt"), PermissionState::Default);
    }
}
