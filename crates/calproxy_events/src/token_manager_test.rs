#[cfg(test)]
mod tests {
    use crate::broker::TokenSource;
    use crate::clock::{Clock, ManualClock};
    use crate::error::AuthError;
    use crate::models::AccessToken;
    use crate::token_manager::TokenManager;
    use calproxy_common::BoxFuture;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Token source that counts exchanges and replays scripted failures.
    ///
    /// Each call pops the next entry of `script`: `None` succeeds with
    /// `token-{n}`, `Some(err)` fails. An empty script succeeds.
    struct FakeSource {
        clock: Arc<ManualClock>,
        calls: AtomicUsize,
        delay: std::time::Duration,
        script: Mutex<VecDeque<Option<AuthError>>>,
        panic_on_call: Option<usize>,
    }

    impl FakeSource {
        fn new(clock: Arc<ManualClock>) -> Self {
            Self {
                clock,
                calls: AtomicUsize::new(0),
                delay: std::time::Duration::from_millis(0),
                script: Mutex::new(VecDeque::new()),
                panic_on_call: None,
            }
        }

        fn with_delay(mut self, millis: u64) -> Self {
            self.delay = std::time::Duration::from_millis(millis);
            self
        }

        fn with_script(self, script: Vec<Option<AuthError>>) -> Self {
            *self.script.lock().unwrap() = script.into();
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TokenSource for FakeSource {
        fn fetch_token(&self) -> BoxFuture<'_, AccessToken, AuthError> {
            Box::pin(async move {
                let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(self.delay).await;
                if self.panic_on_call == Some(call) {
                    panic!("token source blew up on call {call}");
                }
                let scripted = self.script.lock().unwrap().pop_front().flatten();
                match scripted {
                    Some(err) => Err(err),
                    None => Ok(AccessToken::new(
                        format!("token-{call}"),
                        3600,
                        self.clock.now(),
                    )),
                }
            })
        }
    }

    fn setup(source: FakeSource) -> (TokenManager, Arc<FakeSource>) {
        let clock = source.clock.clone();
        let source = Arc::new(source);
        let manager = TokenManager::new(source.clone(), clock, Duration::minutes(5));
        (manager, source)
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 9, 20, 0, 0, 0).unwrap(),
        ))
    }

    fn unauthorized() -> AuthError {
        AuthError::Status { status: 401 }
    }

    #[tokio::test]
    async fn test_fresh_token_is_served_from_cache() {
        let clock = clock();
        let (manager, source) = setup(FakeSource::new(clock.clone()));

        let first = manager.get_valid_token().await.unwrap();
        assert_eq!(first.token(), "token-1");

        // 6 minutes of validity left: still above the 5 minute threshold
        clock.advance(Duration::minutes(54));
        let second = manager.get_valid_token().await.unwrap();

        assert_eq!(second, first);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_token_at_threshold_is_refreshed() {
        let clock = clock();
        let (manager, source) = setup(FakeSource::new(clock.clone()));

        manager.get_valid_token().await.unwrap();
        clock.advance(Duration::minutes(55));
        let refreshed = manager.get_valid_token().await.unwrap();

        assert_eq!(refreshed.token(), "token-2");
        assert_eq!(refreshed.issued_at(), clock.now());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_share_one_refresh() {
        let (manager, source) = setup(FakeSource::new(clock()).with_delay(50));

        let mut handles = vec![];
        for _ in 0..10 {
            let manager = manager.clone();
            handles.push(tokio::spawn(
                async move { manager.get_valid_token().await },
            ));
        }

        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert_eq!(token.token(), "token-1");
        }
        assert_eq!(source.calls(), 1);
        assert_eq!(manager.cached_token().unwrap().token(), "token-1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failed_refresh_reaches_every_waiter_and_caches_nothing() {
        let source = FakeSource::new(clock())
            .with_delay(50)
            .with_script(vec![Some(unauthorized()), Some(unauthorized())]);
        let (manager, source) = setup(source);

        let mut handles = vec![];
        for _ in 0..5 {
            let manager = manager.clone();
            handles.push(tokio::spawn(
                async move { manager.get_valid_token().await },
            ));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert_eq!(result.unwrap_err(), unauthorized());
        }
        assert_eq!(source.calls(), 1);
        assert!(manager.cached_token().is_none());

        // Nothing cached, so the next caller goes back to the Auth endpoint.
        assert!(manager.get_valid_token().await.is_err());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_discards_stale_token() {
        let clock = clock();
        let source = FakeSource::new(clock.clone()).with_script(vec![None, Some(unauthorized())]);
        let (manager, source) = setup(source);

        manager.get_valid_token().await.unwrap();
        clock.advance(Duration::minutes(58));

        let err = manager.get_valid_token().await.unwrap_err();
        assert_eq!(err, unauthorized());
        assert!(manager.cached_token().is_none());

        let recovered = manager.get_valid_token().await.unwrap();
        assert_eq!(recovered.token(), "token-3");
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_waiter_does_not_cancel_refresh() {
        let (manager, source) = setup(FakeSource::new(clock()).with_delay(100));

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            manager.get_valid_token(),
        )
        .await;
        assert!(timed_out.is_err());

        let token = manager.get_valid_token().await.unwrap();
        assert_eq!(token.token(), "token-1");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reauthentication() {
        let (manager, source) = setup(FakeSource::new(clock()));

        manager.get_valid_token().await.unwrap();
        manager.invalidate();
        assert!(manager.cached_token().is_none());

        let token = manager.get_valid_token().await.unwrap();
        assert_eq!(token.token(), "token-2");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_panicked_refresh_is_reported_then_retried() {
        let mut source = FakeSource::new(clock());
        source.panic_on_call = Some(1);
        let (manager, source) = setup(source);

        let err = manager.get_valid_token().await.unwrap_err();
        assert_eq!(err, AuthError::RefreshAborted);

        let token = manager.get_valid_token().await.unwrap();
        assert_eq!(token.token(), "token-2");
        assert_eq!(source.calls(), 2);
    }
}
