// --- File: crates/calproxy_events/src/token_manager.rs ---
//! Cached, single-flight access to a valid bearer token.
//!
//! [`TokenManager::get_valid_token`] hands out the cached token while more
//! than the refresh threshold of validity remains. Otherwise it refreshes
//! through its [`TokenSource`], with at most one refresh in flight: callers
//! that miss while a refresh is running subscribe to it and all receive the
//! same token or the same [`AuthError`].
//!
//! The refresh runs on its own task. Dropping a caller's future (timeouts,
//! client disconnects) only stops that caller from waiting; the refresh still
//! completes for everyone else.

use chrono::Duration;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::broker::TokenSource;
use crate::clock::Clock;
use crate::error::AuthError;
use crate::models::AccessToken;
use crate::token_store::TokenStore;

type RefreshOutcome = Result<AccessToken, AuthError>;
type InFlight = watch::Receiver<Option<RefreshOutcome>>;

struct Inner {
    source: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    store: TokenStore,
    threshold: Duration,
    in_flight: Mutex<Option<InFlight>>,
}

/// Owns the token cache and serializes refreshes. Cheap to clone; clones
/// share the same cache.
#[derive(Clone)]
pub struct TokenManager {
    inner: Arc<Inner>,
}

impl TokenManager {
    pub fn new(source: Arc<dyn TokenSource>, clock: Arc<dyn Clock>, threshold: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                clock,
                store: TokenStore::new(),
                threshold,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// The cached token, fresh or not, without triggering a refresh.
    pub fn cached_token(&self) -> Option<AccessToken> {
        self.inner.store.current()
    }

    /// Drops the cached token so the next caller re-authenticates.
    pub fn invalidate(&self) {
        if self.inner.store.clear().is_some() {
            debug!("cached access token invalidated");
        }
    }

    /// Returns a token with more than the refresh threshold of validity left,
    /// refreshing first if needed.
    ///
    /// # Errors
    ///
    /// The [`AuthError`] of the refresh this call waited on. After a failed
    /// refresh nothing is cached, so the next call starts a new exchange.
    pub async fn get_valid_token(&self) -> Result<AccessToken, AuthError> {
        if let Some(token) = self.inner.fresh_token() {
            return Ok(token);
        }

        let mut receiver = {
            let mut in_flight = self.inner.lock_in_flight();

            // A refresh may have finished between the check above and the lock.
            if let Some(token) = self.inner.fresh_token() {
                return Ok(token);
            }

            match in_flight.as_ref() {
                // A closed channel left in the slot means the refresh task panicked.
                Some(running) if running.has_changed().is_ok() => {
                    debug!("joining in-flight token refresh");
                    running.clone()
                }
                _ => {
                    let started = Inner::spawn_refresh(&self.inner);
                    *in_flight = Some(started.clone());
                    started
                }
            }
        };

        let outcome = {
            let guard = receiver
                .wait_for(Option::is_some)
                .await
                .map_err(|_| AuthError::RefreshAborted)?;
            (*guard).clone()
        };
        outcome.unwrap_or(Err(AuthError::RefreshAborted))
    }
}

impl Inner {
    fn fresh_token(&self) -> Option<AccessToken> {
        self.store.fresh(self.clock.now(), self.threshold)
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a refresh on a detached task and returns the channel its
    /// outcome will be published on. Must be called with `in_flight` locked.
    fn spawn_refresh(inner: &Arc<Inner>) -> InFlight {
        let (sender, receiver) = watch::channel(None);
        let inner = Arc::clone(inner);
        info!("refreshing access token");

        tokio::spawn(async move {
            let outcome = inner.source.fetch_token().await;
            {
                let mut in_flight = inner.lock_in_flight();
                match &outcome {
                    Ok(token) => {
                        inner.store.replace(token.clone());
                        info!(expires_at = %token.expires_at(), "access token refreshed");
                    }
                    Err(err) => {
                        // The old token is stale by now; never fall back to it.
                        inner.store.clear();
                        warn!(error = %err, "access token refresh failed");
                    }
                }
                *in_flight = None;
            }
            // Receivers cloned before the slot was cleared still get the outcome.
            let _ = sender.send(Some(outcome));
        });

        receiver
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("threshold", &self.inner.threshold)
            .field("cached", &self.inner.store.current())
            .finish_non_exhaustive()
    }
}
