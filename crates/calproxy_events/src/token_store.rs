// --- File: crates/calproxy_events/src/token_store.rs ---

use chrono::{DateTime, Duration, Utc};
use std::sync::{PoisonError, RwLock};

use crate::models::AccessToken;

/// Holds the current access token.
///
/// Tokens are swapped whole under the lock, so readers see either the old or
/// the new token and never a mix of the two.
#[derive(Debug, Default)]
pub struct TokenStore {
    current: RwLock<Option<AccessToken>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<AccessToken> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current token, if it is still fresh at `now`.
    pub fn fresh(&self, now: DateTime<Utc>, threshold: Duration) -> Option<AccessToken> {
        self.current().filter(|token| token.is_fresh(now, threshold))
    }

    /// Installs `token`, returning the one it superseded.
    pub fn replace(&self, token: AccessToken) -> Option<AccessToken> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token)
    }

    pub fn clear(&self) -> Option<AccessToken> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
