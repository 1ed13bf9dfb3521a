//! Session cache with TTL and request coalescing.
//!
//! The cache owns the provider and is the only thing that talks to it for
//! lookups. At most one provider call is in flight at a time; concurrent
//! callers clone the same shared future and observe the same result,
//! success or failure.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;
use tracing::debug;

use crate::errors::{GatewayError, GatewayResult};

/// How long a fetched session is reused before the provider is asked again.
pub const SESSION_TTL: Duration = Duration::from_secs(30);

/// A bearer credential issued by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    /// Identity the token was issued to, if the provider reports it.
    pub subject: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("subject", &self.subject)
            .finish()
    }
}

/// External identity provider.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current session, or `None` when nobody is signed in.
    async fn current_session(&self) -> anyhow::Result<Option<Session>>;

    /// End the session and send the user back to the login flow.
    async fn sign_out(&self) -> anyhow::Result<()>;
}

type FetchOutput = Result<Option<Session>, Arc<anyhow::Error>>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutput>>;

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct CacheState {
    session: Option<Session>,
    fetched_at: Option<Instant>,
    in_flight: Option<InFlight>,
    next_fetch_id: u64,
}

impl CacheState {
    fn fresh(&self, ttl: Duration) -> Option<Session> {
        match (&self.session, self.fetched_at) {
            (Some(session), Some(at)) if at.elapsed() < ttl => Some(session.clone()),
            _ => None,
        }
    }
}

pub struct SessionCache {
    provider: Arc<dyn SessionProvider>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl SessionCache {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self::with_ttl(provider, SESSION_TTL)
    }

    pub fn with_ttl(provider: Arc<dyn SessionProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn provider(&self) -> &Arc<dyn SessionProvider> {
        &self.provider
    }

    /// Whether a session younger than the TTL is cached right now.
    pub fn is_cached(&self) -> bool {
        self.lock().fresh(self.ttl).is_some()
    }

    /// Return the cached session, join the in-flight lookup, or start one.
    pub async fn resolve(&self) -> GatewayResult<Option<Session>> {
        let (id, fetch) = {
            let mut state = self.lock();
            if let Some(session) = state.fresh(self.ttl) {
                debug!("Using cached session");
                return Ok(Some(session));
            }
            match &state.in_flight {
                Some(in_flight) => {
                    debug!(fetch_id = in_flight.id, "Joining in-flight session lookup");
                    (in_flight.id, in_flight.fetch.clone())
                }
                None => {
                    let id = state.next_fetch_id;
                    state.next_fetch_id += 1;
                    let provider = Arc::clone(&self.provider);
                    let fetch = async move { provider.current_session().await.map_err(Arc::new) }
                        .boxed()
                        .shared();
                    debug!(fetch_id = id, "Fetching session from provider");
                    state.in_flight = Some(InFlight {
                        id,
                        fetch: fetch.clone(),
                    });
                    (id, fetch)
                }
            }
        };

        let result = fetch.await;

        {
            let mut state = self.lock();
            // Only the first waiter of a still-current fetch settles the
            // cache. An invalidate() in between makes the result stale.
            if state.in_flight.as_ref().is_some_and(|f| f.id == id) {
                state.in_flight = None;
                if let Ok(Some(session)) = &result {
                    state.session = Some(session.clone());
                    state.fetched_at = Some(Instant::now());
                }
            }
        }

        result.map_err(GatewayError::SessionProvider)
    }

    /// Forget the cached session and any in-flight lookup.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.session = None;
        state.fetched_at = None;
        state.in_flight = None;
        debug!("Session cache invalidated");
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // The state is a handful of plain fields; a panic mid-update
        // cannot leave it inconsistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCache")
            .field("ttl", &self.ttl)
            .field("cached", &self.is_cached())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that counts calls and can be told to fail or stall.
    #[derive(Default)]
    pub struct CountingProvider {
        pub calls: AtomicUsize,
        pub sign_outs: AtomicUsize,
        pub fail: std::sync::atomic::AtomicBool,
        pub delay: Option<Duration>,
        pub token: Option<String>,
    }

    impl CountingProvider {
        pub fn with_token(token: &str) -> Self {
            Self {
                token: Some(token.to_string()),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn sign_outs(&self) -> usize {
            self.sign_outs.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionProvider for CountingProvider {
        async fn current_session(&self) -> anyhow::Result<Option<Session>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("provider down");
            }
            Ok(self
                .token
                .as_ref()
                .map(|t| Session::new(format!("{}-{}", t, n))))
        }

        async fn sign_out(&self) -> anyhow::Result<()> {
            self.sign_outs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
