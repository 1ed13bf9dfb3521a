//! Typed error hierarchy for the Planboard client.
//!
//! `GatewayError` covers everything that can go wrong between a feature
//! API call and the backend: session lookup, authorization, transport and
//! non-success statuses. CLI and configuration code wrap these in
//! `anyhow` with context, as the rest of the binary does.

use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised by the authenticated request gateway and the API client.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The session provider failed. Shared by every caller that awaited
    /// the same in-flight lookup.
    #[error("Session provider failed: {0}")]
    SessionProvider(Arc<anyhow::Error>),

    /// The backend rejected the credential; the session has been dropped.
    #[error("Not authenticated: {url} returned 401")]
    Unauthorized { url: String },

    #[error("Forbidden: {url} returned 403{}", fmt_body(.body))]
    Forbidden { url: String, body: String },

    #[error("Not found: {url}")]
    NotFound { url: String },

    #[error("Request failed with status {status}{}", fmt_body(.body))]
    Http { status: StatusCode, body: String },

    /// The board's transition rules refuse this status change.
    #[error("Board does not allow moving {issue} from '{from}' to '{to}'")]
    TransitionNotAllowed {
        issue: String,
        from: String,
        to: String,
    },

    /// A resource id or token that cannot name a single path segment.
    #[error("'{0}' is not a valid resource id")]
    InvalidPathSegment(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

fn fmt_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

impl GatewayError {
    /// HTTP status behind the error, when there is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden { .. } => Some(StatusCode::FORBIDDEN),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::SessionProvider(_)
            | Self::TransitionNotAllowed { .. }
            | Self::InvalidPathSegment(_)
            | Self::Config(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_provider_error_is_shared_between_clones() {
        let inner = Arc::new(anyhow::anyhow!("idp unreachable"));
        let a = GatewayError::SessionProvider(Arc::clone(&inner));
        let b = GatewayError::SessionProvider(Arc::clone(&inner));
        assert!(a.to_string().contains("idp unreachable"));
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(Arc::strong_count(&inner), 3);
    }

    #[test]
    fn forbidden_includes_body_when_present() {
        let err = GatewayError::Forbidden {
            url: "http://api/issues".into(),
            body: "role viewer cannot edit".into(),
        };
        assert!(err.to_string().contains("role viewer cannot edit"));
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));

        let bare = GatewayError::Forbidden {
            url: "http://api/issues".into(),
            body: String::new(),
        };
        assert!(bare.to_string().ends_with("403"));
    }

    #[test]
    fn unauthorized_is_matchable() {
        let err = GatewayError::Unauthorized {
            url: "http://api/users/me".into(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(!GatewayError::Config("x".into()).is_unauthorized());
    }

    #[test]
    fn gateway_error_implements_std_error() {
        fn assert_std_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
        assert_std_error(&GatewayError::Config("bad".into()));
    }
}
