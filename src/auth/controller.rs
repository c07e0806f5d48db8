//! Credential validation controller
//!
//! Mediates between raw form input and authoritative remote validation.
//! Each gating field (username, secret key) is checked by a debounced
//! remote lookup; editing an upstream field immediately resets everything
//! downstream of it, regardless of in-flight work.
//!
//! Staleness discipline: every debounce timer captures the input value at
//! arm time and compares it against the live draft both when the timer
//! fires and when the lookup completes. A completion whose captured value
//! no longer matches is discarded without touching status, which makes
//! explicit cancellation unnecessary.

use log::{info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time;

use crate::auth::status::{FieldStatus, FormSnapshot, Session};
use crate::directory::{AdminDirectory, Authenticator};
use crate::error::{AuthError, LOGIN_FAILED_MESSAGE};

/// Debounce delays and the remote-call timeout.
#[derive(Debug, Clone)]
pub struct Timing {
    pub username_delay: Duration,
    pub secret_key_delay: Duration,
    pub lookup_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            username_delay: Duration::from_millis(800),
            secret_key_delay: Duration::from_millis(500),
            lookup_timeout: Duration::from_secs(10),
        }
    }
}

impl Timing {
    pub fn from_config(config: &crate::config::StartupConfig) -> Self {
        Self {
            username_delay: config.username_debounce(),
            secret_key_delay: config.secret_key_debounce(),
            lookup_timeout: config.lookup_timeout(),
        }
    }
}

#[derive(Default)]
struct FormState {
    username: String,
    secret_key: String,
    password: String,
    username_status: FieldStatus,
    secret_key_status: FieldStatus,
    session: Option<Session>,
    error: Option<String>,
}

impl FormState {
    fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            username_status: self.username_status,
            secret_key_status: self.secret_key_status,
            authenticated: self.session.is_some(),
            error: self.error.clone(),
        }
    }
}

/// Owns the login form drafts and their validation lifecycle.
///
/// All setters are synchronous; remote work runs on spawned tasks and only
/// ever applies its result through the staleness guard. Consumers observe
/// transitions through [`CredentialController::subscribe`].
pub struct CredentialController<D, A> {
    state: Arc<Mutex<FormState>>,
    directory: Arc<D>,
    authenticator: Arc<A>,
    timing: Timing,
    watch_tx: watch::Sender<FormSnapshot>,
}

impl<D, A> CredentialController<D, A>
where
    D: AdminDirectory + 'static,
    A: Authenticator + 'static,
{
    pub fn new(directory: Arc<D>, authenticator: Arc<A>, timing: Timing) -> Self {
        let (watch_tx, _) = watch::channel(FormSnapshot::default());
        Self {
            state: Arc::new(Mutex::new(FormState::default())),
            directory,
            authenticator,
            timing,
            watch_tx,
        }
    }

    /// Subscribe to form snapshots. The receiver always holds the latest state.
    pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
        self.watch_tx.subscribe()
    }

    /// Store a new username draft and arm its validation timer.
    ///
    /// Synchronously clears the secret-key and password drafts and resets
    /// both dependent statuses, regardless of any in-flight check.
    pub fn set_username(&self, value: &str) {
        let arm = {
            let mut form = self.state.lock().unwrap();
            form.username = value.to_string();
            form.username_status = FieldStatus::Unknown;
            form.secret_key.clear();
            form.secret_key_status = FieldStatus::Unknown;
            form.password.clear();
            !form.username.is_empty()
        };
        publish(&self.state, &self.watch_tx);

        if !arm {
            return;
        }

        let captured = value.to_string();
        let state = Arc::clone(&self.state);
        let directory = Arc::clone(&self.directory);
        let watch_tx = self.watch_tx.clone();
        let delay = self.timing.username_delay;
        let lookup_timeout = self.timing.lookup_timeout;

        tokio::spawn(async move {
            time::sleep(delay).await;

            // Proceed only if the captured value is still the live draft
            {
                let mut form = state.lock().unwrap();
                if form.username != captured {
                    return;
                }
                form.username_status = FieldStatus::Checking;
            }
            publish(&state, &watch_tx);

            let valid = match time::timeout(lookup_timeout, directory.find_user(&captured)).await {
                Ok(Ok(record)) => record.is_some(),
                Ok(Err(e)) => {
                    // Fail closed; the user sees Invalid, not a transport error
                    warn!("Username lookup failed: {}", e);
                    false
                }
                Err(_) => {
                    warn!("Username lookup timed out");
                    false
                }
            };

            {
                let mut form = state.lock().unwrap();
                if form.username != captured {
                    return; // stale response, discard
                }
                form.username_status = if valid {
                    FieldStatus::Valid
                } else {
                    FieldStatus::Invalid
                };
                if !valid {
                    // Re-assert the downstream reset against racing edits
                    form.secret_key.clear();
                    form.secret_key_status = FieldStatus::Unknown;
                    form.password.clear();
                }
            }
            publish(&state, &watch_tx);
        });
    }

    /// Store a new secret-key draft and arm its validation timer.
    ///
    /// The check only ever fires while the username is `Valid`; input is
    /// accepted regardless but stays `Unknown` until then.
    pub fn set_secret_key(&self, value: &str) {
        let arm = {
            let mut form = self.state.lock().unwrap();
            form.secret_key = value.to_string();
            form.secret_key_status = FieldStatus::Unknown;
            form.password.clear();
            !form.secret_key.is_empty()
        };
        publish(&self.state, &self.watch_tx);

        if !arm {
            return;
        }

        let captured = value.to_string();
        let state = Arc::clone(&self.state);
        let directory = Arc::clone(&self.directory);
        let watch_tx = self.watch_tx.clone();
        let delay = self.timing.secret_key_delay;
        let lookup_timeout = self.timing.lookup_timeout;

        tokio::spawn(async move {
            time::sleep(delay).await;

            let username = {
                let mut form = state.lock().unwrap();
                if form.secret_key != captured || form.username_status != FieldStatus::Valid {
                    return;
                }
                form.secret_key_status = FieldStatus::Checking;
                form.username.clone()
            };
            publish(&state, &watch_tx);

            let valid = match time::timeout(
                lookup_timeout,
                directory.verify_secret_key(&username, &captured),
            )
            .await
            {
                Ok(Ok(matched)) => matched,
                Ok(Err(e)) => {
                    warn!("Secret key check failed: {}", e);
                    false
                }
                Err(_) => {
                    warn!("Secret key check timed out");
                    false
                }
            };

            {
                let mut form = state.lock().unwrap();
                if form.secret_key != captured || form.username_status != FieldStatus::Valid {
                    return; // stale response, discard
                }
                form.secret_key_status = if valid {
                    FieldStatus::Valid
                } else {
                    FieldStatus::Invalid
                };
                if !valid {
                    form.password.clear();
                }
            }
            publish(&state, &watch_tx);
        });
    }

    /// Store the password draft. No remote check happens on password entry;
    /// it is only verified at submission.
    pub fn set_password(&self, value: &str) {
        {
            let mut form = self.state.lock().unwrap();
            form.password = value.to_string();
        }
        publish(&self.state, &self.watch_tx);
    }

    /// Attempt the sign-in.
    ///
    /// A no-op (`Ok(None)`) unless both gating fields are `Valid` and the
    /// password draft is non-empty. On failure the drafts are kept so the
    /// user can retry.
    pub async fn submit(&self) -> Result<Option<Session>, AuthError> {
        let (username, password) = {
            let form = self.state.lock().unwrap();
            if form.username_status != FieldStatus::Valid
                || form.secret_key_status != FieldStatus::Valid
                || form.password.is_empty()
            {
                return Ok(None);
            }
            (form.username.clone(), form.password.clone())
        };

        // Resolve the sign-in email bound to the username
        let record = match time::timeout(
            self.timing.lookup_timeout,
            self.directory.find_user(&username),
        )
        .await
        {
            Ok(Ok(Some(record))) => record,
            Ok(Ok(None)) => return self.fail_login("user record vanished before sign-in"),
            Ok(Err(e)) => return self.fail_login(&format!("record lookup failed: {}", e)),
            Err(_) => return self.fail_login("record lookup timed out"),
        };

        match time::timeout(
            self.timing.lookup_timeout,
            self.authenticator.sign_in(&record.email, &password),
        )
        .await
        {
            Ok(Ok(session)) => {
                {
                    let mut form = self.state.lock().unwrap();
                    form.session = Some(session.clone());
                    form.error = None;
                }
                publish(&self.state, &self.watch_tx);
                info!("Admin {} signed in", username);
                Ok(Some(session))
            }
            Ok(Err(e)) => self.fail_login(&format!("sign-in rejected: {}", e)),
            Err(_) => self.fail_login("sign-in timed out"),
        }
    }

    /// End the current session, if any, and reset the form.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let token = {
            let mut form = self.state.lock().unwrap();
            form.session.take().map(|session| session.token)
        };

        if let Some(token) = token {
            self.authenticator.sign_out(&token).await?;
        }

        {
            let mut form = self.state.lock().unwrap();
            *form = FormState::default();
        }
        publish(&self.state, &self.watch_tx);
        Ok(())
    }

    fn fail_login(&self, detail: &str) -> Result<Option<Session>, AuthError> {
        warn!("Login failed: {}", detail);
        {
            let mut form = self.state.lock().unwrap();
            form.error = Some(LOGIN_FAILED_MESSAGE.to_string());
        }
        publish(&self.state, &self.watch_tx);
        Err(AuthError::LoginFailed)
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn username(&self) -> String {
        self.state.lock().unwrap().username.clone()
    }

    pub fn secret_key(&self) -> String {
        self.state.lock().unwrap().secret_key.clone()
    }

    pub fn password(&self) -> String {
        self.state.lock().unwrap().password.clone()
    }

    pub fn username_status(&self) -> FieldStatus {
        self.state.lock().unwrap().username_status
    }

    pub fn secret_key_status(&self) -> FieldStatus {
        self.state.lock().unwrap().secret_key_status
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().unwrap().session.is_some()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().unwrap().error.clone()
    }
}

fn publish(state: &Arc<Mutex<FormState>>, watch_tx: &watch::Sender<FormSnapshot>) {
    let snapshot = state.lock().unwrap().snapshot();
    watch_tx.send_replace(snapshot);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::AdminRecord;
    use crate::error::DirectoryError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestDirectory {
        users: HashMap<String, (String, String)>, // username -> (email, secret key)
        lookups: AtomicUsize,
        verifies: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl TestDirectory {
        fn new() -> Self {
            let mut users = HashMap::new();
            users.insert(
                "admin".to_string(),
                ("admin@matron.dev".to_string(), "matron-key".to_string()),
            );
            Self {
                users,
                lookups: AtomicUsize::new(0),
                verifies: AtomicUsize::new(0),
                delay: Duration::ZERO,
                fail: false,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn lookup_count(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }

        fn verify_count(&self) -> usize {
            self.verifies.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AdminDirectory for TestDirectory {
        async fn find_user(&self, username: &str) -> Result<Option<AdminRecord>, DirectoryError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(DirectoryError::Transport("service unavailable".into()));
            }
            Ok(self.users.get(username).map(|(email, _)| AdminRecord {
                username: username.to_string(),
                email: email.clone(),
            }))
        }

        async fn verify_secret_key(
            &self,
            username: &str,
            secret_key: &str,
        ) -> Result<bool, DirectoryError> {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(DirectoryError::Transport("service unavailable".into()));
            }
            Ok(self
                .users
                .get(username)
                .map(|(_, stored)| stored == secret_key)
                .unwrap_or(false))
        }
    }

    struct TestAuthenticator {
        password: String,
        accept: bool,
    }

    impl TestAuthenticator {
        fn accepting(password: &str) -> Self {
            Self {
                password: password.to_string(),
                accept: true,
            }
        }

        fn rejecting() -> Self {
            Self {
                password: String::new(),
                accept: false,
            }
        }
    }

    #[async_trait]
    impl Authenticator for TestAuthenticator {
        async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
            if self.accept && password == self.password {
                Ok(Session {
                    token: "test-token".to_string(),
                    email: email.to_string(),
                    issued_at: Utc::now(),
                })
            } else {
                Err(AuthError::LoginFailed)
            }
        }

        async fn sign_out(&self, _token: &str) -> Result<(), AuthError> {
            Ok(())
        }
    }

    fn controller(
        directory: TestDirectory,
        authenticator: TestAuthenticator,
    ) -> (
        CredentialController<TestDirectory, TestAuthenticator>,
        Arc<TestDirectory>,
    ) {
        let directory = Arc::new(directory);
        let controller = CredentialController::new(
            Arc::clone(&directory),
            Arc::new(authenticator),
            Timing::default(),
        );
        (controller, directory)
    }

    async fn settle(ms: u64) {
        time::sleep(Duration::from_millis(ms)).await;
    }

    #[test]
    fn test_timing_from_config_matches_defaults() {
        let timing = Timing::from_config(&crate::config::StartupConfig::default());
        assert_eq!(timing.username_delay, Duration::from_millis(800));
        assert_eq!(timing.secret_key_delay, Duration::from_millis(500));
        assert_eq!(timing.lookup_timeout, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_issue_single_lookup() {
        let (controller, directory) =
            controller(TestDirectory::new(), TestAuthenticator::accepting("pw"));

        controller.set_username("a");
        controller.set_username("ad");
        controller.set_username("admin");
        settle(900).await;

        assert_eq!(directory.lookup_count(), 1);
        assert_eq!(controller.username_status(), FieldStatus::Valid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_username_never_checks() {
        let (controller, directory) =
            controller(TestDirectory::new(), TestAuthenticator::accepting("pw"));

        controller.set_username("");
        settle(2000).await;

        assert_eq!(directory.lookup_count(), 0);
        assert_eq!(controller.username_status(), FieldStatus::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_username_is_invalid_and_gates_secret_key() {
        let (controller, directory) =
            controller(TestDirectory::new(), TestAuthenticator::accepting("pw"));

        controller.set_username("nosuchuser");
        settle(900).await;
        assert_eq!(controller.username_status(), FieldStatus::Invalid);

        // Input is accepted but no check ever fires while the username is not valid
        controller.set_secret_key("anything");
        settle(600).await;
        assert_eq!(directory.verify_count(), 0);
        assert_eq!(controller.secret_key_status(), FieldStatus::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_username_change_synchronously_resets_dependents() {
        let (controller, _directory) =
            controller(TestDirectory::new(), TestAuthenticator::accepting("pw"));

        controller.set_username("admin");
        settle(900).await;
        controller.set_secret_key("matron-key");
        settle(600).await;
        controller.set_password("pw");
        assert_eq!(controller.secret_key_status(), FieldStatus::Valid);

        // No timer needs to elapse for the reset
        controller.set_username("other");
        assert_eq!(controller.username_status(), FieldStatus::Unknown);
        assert_eq!(controller.secret_key_status(), FieldStatus::Unknown);
        assert_eq!(controller.secret_key(), "");
        assert_eq!(controller.password(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_lookup_is_discarded() {
        let (controller, _directory) = controller(
            TestDirectory::new().with_delay(Duration::from_secs(5)),
            TestAuthenticator::accepting("pw"),
        );

        // "admin" exists; its slow lookup must not resurrect Valid after the
        // draft has moved on to a username that does not.
        controller.set_username("admin");
        settle(1000).await;
        controller.set_username("ghost");

        // t+6.2s: the admin result has landed and been discarded; the ghost
        // check is still in flight.
        settle(5200).await;
        assert_eq!(controller.username_status(), FieldStatus::Checking);

        settle(1000).await;
        assert_eq!(controller.username_status(), FieldStatus::Invalid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_error_fails_closed() {
        let (controller, _directory) = controller(
            TestDirectory::new().failing(),
            TestAuthenticator::accepting("pw"),
        );

        controller.set_username("admin");
        settle(900).await;

        assert_eq!(controller.username_status(), FieldStatus::Invalid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_timeout_fails_closed() {
        let (controller, _directory) = controller(
            TestDirectory::new().with_delay(Duration::from_secs(30)),
            TestAuthenticator::accepting("pw"),
        );

        controller.set_username("admin");
        settle(800 + 10_000 + 200).await;

        assert_eq!(controller.username_status(), FieldStatus::Invalid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_secret_key_clears_password() {
        let (controller, _directory) =
            controller(TestDirectory::new(), TestAuthenticator::accepting("pw"));

        controller.set_username("admin");
        settle(900).await;

        controller.set_secret_key("wrongkey");
        controller.set_password("pw");
        settle(600).await;

        assert_eq!(controller.secret_key_status(), FieldStatus::Invalid);
        assert_eq!(controller.password(), "");

        controller.set_secret_key("matron-key");
        settle(600).await;
        assert_eq!(controller.secret_key_status(), FieldStatus::Valid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_is_noop_until_fully_gated() {
        let (controller, _directory) =
            controller(TestDirectory::new(), TestAuthenticator::accepting("pw"));

        assert!(matches!(controller.submit().await, Ok(None)));

        controller.set_username("admin");
        settle(900).await;
        assert!(matches!(controller.submit().await, Ok(None)));

        controller.set_secret_key("matron-key");
        settle(600).await;
        // Password still empty
        assert!(matches!(controller.submit().await, Ok(None)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_failure_keeps_drafts() {
        let (controller, _directory) =
            controller(TestDirectory::new(), TestAuthenticator::rejecting());

        controller.set_username("admin");
        settle(900).await;
        controller.set_secret_key("matron-key");
        settle(600).await;
        controller.set_password("wrong-password");

        let result = controller.submit().await;
        assert!(matches!(result, Err(AuthError::LoginFailed)));
        assert_eq!(controller.last_error().as_deref(), Some(LOGIN_FAILED_MESSAGE));

        // The form is not reset, allowing a retry
        assert_eq!(controller.username(), "admin");
        assert_eq!(controller.secret_key(), "matron-key");
        assert_eq!(controller.password(), "wrong-password");
        assert!(!controller.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_success_and_sign_out() {
        let (controller, _directory) =
            controller(TestDirectory::new(), TestAuthenticator::accepting("pw"));
        let mut snapshots = controller.subscribe();

        controller.set_username("admin");
        settle(900).await;
        controller.set_secret_key("matron-key");
        settle(600).await;
        controller.set_password("pw");

        let session = controller.submit().await.unwrap().unwrap();
        assert_eq!(session.email, "admin@matron.dev");
        assert!(controller.is_authenticated());
        assert!(snapshots.borrow_and_update().authenticated);

        controller.sign_out().await.unwrap();
        assert!(!controller.is_authenticated());
        assert_eq!(controller.username(), "");
        assert_eq!(controller.username_status(), FieldStatus::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshots_track_transitions() {
        let (controller, _directory) =
            controller(TestDirectory::new(), TestAuthenticator::accepting("pw"));
        let mut snapshots = controller.subscribe();

        controller.set_username("admin");
        assert_eq!(
            snapshots.borrow_and_update().username_status,
            FieldStatus::Unknown
        );

        settle(900).await;
        assert_eq!(
            snapshots.borrow_and_update().username_status,
            FieldStatus::Valid
        );
    }
}
