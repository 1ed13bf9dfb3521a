//! Authenticated request gateway.
//!
//! Every call to the backend goes through [`Gateway`]: requests are
//! decorated with the bearer credential and the tenant header on the way
//! out, and responses are screened for authorization failures on the way
//! back. A 401 drops the cached session and signs the user out, at most
//! once per request; a 403 reaches the caller untouched.
//!
//! | Module    | Contents                                         |
//! |-----------|--------------------------------------------------|
//! | `session` | `Session`, `SessionProvider`, `SessionCache`     |
//! | `tenant`  | `TenantResolver`, `TenantStore`, `NoTenant`      |

pub mod session;
pub mod tenant;

use std::sync::Arc;

use reqwest::header::HeaderValue;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{GatewayError, GatewayResult};

pub use session::{SESSION_TTL, Session, SessionCache, SessionProvider};
pub use tenant::{NoTenant, TenantResolver, TenantStore};

/// Header carrying the active tenant.
pub const TENANT_HEADER: &str = "X-Tenant-Id";

/// Authorization-failure handling budget carried alongside one request.
///
/// Replaces a mutable "already retried" flag on the request object: the
/// caller owns the counter and passes it to every
/// [`Gateway::on_response`] call made for the same logical request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthAttempt {
    retries: u32,
}

impl AuthAttempt {
    /// How many 401s per request may trigger a sign-out.
    pub const MAX_AUTH_RETRIES: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn is_exhausted(&self) -> bool {
        self.retries >= Self::MAX_AUTH_RETRIES
    }

    fn record(&mut self) {
        self.retries += 1;
    }
}

#[derive(Clone)]
pub struct Gateway {
    sessions: Arc<SessionCache>,
    tenants: Arc<dyn TenantResolver>,
}

impl Gateway {
    pub fn new(sessions: SessionCache, tenants: Arc<dyn TenantResolver>) -> Self {
        Self {
            sessions: Arc::new(sessions),
            tenants,
        }
    }

    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    pub fn current_tenant(&self) -> Option<String> {
        self.tenants.current_tenant()
    }

    /// Attach `Authorization` and `X-Tenant-Id` when available.
    ///
    /// Requests without a session or tenant go out as they are; onboarding
    /// endpoints rely on that.
    pub async fn build_request(&self, mut request: RequestBuilder) -> GatewayResult<RequestBuilder> {
        if let Some(session) = self.sessions.resolve().await? {
            request = request.bearer_auth(&session.access_token);
        }
        if let Some(tenant) = self.tenants.current_tenant() {
            let value = HeaderValue::from_str(&tenant).map_err(|_| {
                GatewayError::Config(format!("Tenant id '{}' is not a valid header value", tenant))
            })?;
            request = request.header(TENANT_HEADER, value);
        }
        Ok(request)
    }

    /// Screen a response for authorization failures.
    ///
    /// Everything except 401 is returned unchanged. A 401 becomes
    /// [`GatewayError::Unauthorized`]; the first one seen for `attempt`
    /// also invalidates the session and signs out.
    pub async fn on_response(
        &self,
        response: Response,
        attempt: &mut AuthAttempt,
    ) -> GatewayResult<Response> {
        match response.status() {
            StatusCode::UNAUTHORIZED => {
                let url = response.url().to_string();
                if !attempt.is_exhausted() {
                    attempt.record();
                    info!(url = %url, "Backend rejected credentials, signing out");
                    self.sessions.invalidate();
                    if let Err(e) = self.sessions.provider().sign_out().await {
                        warn!(error = %e, "Sign-out after 401 failed");
                    }
                } else {
                    debug!(url = %url, retries = attempt.retries(), "Repeated 401 ignored");
                }
                Err(GatewayError::Unauthorized { url })
            }
            StatusCode::FORBIDDEN => {
                warn!(url = %response.url(), "Request forbidden");
                Ok(response)
            }
            _ => Ok(response),
        }
    }

    /// Explicit logout: drop the cached session and end it at the provider.
    pub async fn logout(&self) -> anyhow::Result<()> {
        self.sessions.invalidate();
        self.sessions.provider().sign_out().await
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("sessions", &self.sessions)
            .field("tenant", &self.tenants.current_tenant())
            .finish()
    }
}
