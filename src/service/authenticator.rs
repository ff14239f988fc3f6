//! Verification of inbound auto-pull triggers.

use std::fmt;

use super::config_gate::{ConfigGate, Flag};
use crate::domain::RemoteToken;

/// Why an auto-pull trigger was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Auto-pull is not enabled locally.
    AutoPullDisabled,
    /// No token is stored locally.
    MissingLocalToken,
    /// The caller presented an empty token.
    MissingPresentedToken,
    /// The presented token differs from the stored one.
    TokenMismatch,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::AutoPullDisabled => "auto-pull is not enabled",
            Self::MissingLocalToken => "no token is configured locally",
            Self::MissingPresentedToken => "no token was presented",
            Self::TokenMismatch => "token mismatch",
        };
        f.write_str(text)
    }
}

/// Outcome of [`RemoteAuthenticator::authenticate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// The caller may trigger a pull.
    Authenticated,
    /// The caller must be turned away.
    Rejected(RejectReason),
}

/// Compares a presented token with the locally stored token.
///
/// Fails closed: anything other than an enabled auto-pull flag, a stored
/// token, and an exactly matching presented token is a rejection.
#[derive(Debug, Clone)]
pub struct RemoteAuthenticator {
    gate: ConfigGate,
}

impl RemoteAuthenticator {
    /// Creates an authenticator reading settings through `gate`.
    #[must_use]
    pub fn new(gate: ConfigGate) -> Self {
        Self { gate }
    }

    /// Authenticates `presented` against the stored token.
    pub async fn authenticate(&self, presented: &str) -> AuthDecision {
        if !self.gate.resolve_flag(Flag::AutoPull).await {
            return AuthDecision::Rejected(RejectReason::AutoPullDisabled);
        }
        let Some(stored) = self.gate.stored_token().await else {
            return AuthDecision::Rejected(RejectReason::MissingLocalToken);
        };
        let Some(presented) = RemoteToken::new(presented) else {
            return AuthDecision::Rejected(RejectReason::MissingPresentedToken);
        };
        if stored.matches(&presented) {
            AuthDecision::Authenticated
        } else {
            AuthDecision::Rejected(RejectReason::TokenMismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::service::config_gate::{AUTO_PULL_KEY, TOKEN_KEY};
    use crate::testing::MockVcs;

    fn authenticator(vcs: MockVcs) -> RemoteAuthenticator {
        RemoteAuthenticator::new(ConfigGate::new(Arc::new(vcs), "autopilot"))
    }

    fn enabled() -> MockVcs {
        MockVcs::new().with_config("autopilot", AUTO_PULL_KEY, "true")
    }

    #[tokio::test]
    async fn matching_token_authenticates() {
        let auth = authenticator(enabled().with_config("autopilot", TOKEN_KEY, "s3cret"));
        assert_eq!(auth.authenticate("s3cret").await, AuthDecision::Authenticated);
    }

    #[tokio::test]
    async fn mismatching_token_is_rejected() {
        let auth = authenticator(enabled().with_config("autopilot", TOKEN_KEY, "s3cret"));
        assert_eq!(
            auth.authenticate("guess").await,
            AuthDecision::Rejected(RejectReason::TokenMismatch)
        );
    }

    #[tokio::test]
    async fn missing_local_token_fails_closed() {
        let auth = authenticator(enabled());
        assert_eq!(
            auth.authenticate("anything").await,
            AuthDecision::Rejected(RejectReason::MissingLocalToken)
        );
    }

    #[tokio::test]
    async fn empty_presented_token_is_rejected() {
        let auth = authenticator(enabled().with_config("autopilot", TOKEN_KEY, "s3cret"));
        assert_eq!(
            auth.authenticate("").await,
            AuthDecision::Rejected(RejectReason::MissingPresentedToken)
        );
    }

    #[tokio::test]
    async fn disabled_auto_pull_fails_closed() {
        let auth = authenticator(MockVcs::new().with_config("autopilot", TOKEN_KEY, "s3cret"));
        assert_eq!(
            auth.authenticate("s3cret").await,
            AuthDecision::Rejected(RejectReason::AutoPullDisabled)
        );
    }
}
