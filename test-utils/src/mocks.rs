//! Fake implementations of the router seams.
//!
//! Every fake counts its calls so tests can assert on the exact protocol
//! sequence without a network.

use async_trait::async_trait;
use luis_router::{
    BearerToken, DiscoveryOutcome, DiscoveryService, Encryptor, IdentityOutcome, IdentityService,
    LuisAppDetail, MemoryTokenStore, RouterError, RouterResult, SessionId, TokenStore,
};
use reqwest::StatusCode;
use router_common::PlatformError;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;
use tokio::time::Instant;

/// A retryable error standing in for a dropped connection.
#[must_use]
pub fn transport_error() -> RouterError {
    RouterError::from(PlatformError::unavailable("connection reset by peer"))
}

/// Deterministic, reversible "cipher" for tests.
#[derive(Debug, Default)]
pub struct FakeEncryptor {
    calls: AtomicU32,
}

impl FakeEncryptor {
    /// Create a new fake encryptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of encrypt calls.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Recover the plaintext from a fake ciphertext.
    #[must_use]
    pub fn reveal(ciphertext: &str) -> Option<(&str, &str)> {
        let rest = ciphertext.strip_prefix("enc[")?;
        let (key, rest) = rest.split_once("](")?;
        let plaintext = rest.strip_suffix(')')?;
        Some((key, plaintext))
    }
}

impl Encryptor for FakeEncryptor {
    fn encrypt(&self, plaintext: &str, key: &str) -> Result<String, PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("enc[{key}]({plaintext})"))
    }
}

/// One scripted discovery response.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryStep {
    /// Answer with this outcome.
    Respond(DiscoveryOutcome),
    /// Fail with a retryable transport error.
    Fail,
}

/// Discovery fake replaying a script, then a fallback outcome forever.
#[derive(Debug)]
pub struct ScriptedDiscovery {
    steps: Mutex<VecDeque<DiscoveryStep>>,
    fallback: DiscoveryOutcome,
    calls: AtomicU32,
    call_times: Mutex<Vec<Instant>>,
}

impl ScriptedDiscovery {
    /// Replay `steps`, then answer `Unauthorized`.
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = DiscoveryStep>) -> Self {
        Self::with_fallback(steps, DiscoveryOutcome::Unauthorized)
    }

    /// Answer `outcome` on every call.
    #[must_use]
    pub fn repeating(outcome: DiscoveryOutcome) -> Self {
        Self::with_fallback(Vec::new(), outcome)
    }

    /// Replay `steps`, then answer `fallback`.
    #[must_use]
    pub fn with_fallback(
        steps: impl IntoIterator<Item = DiscoveryStep>,
        fallback: DiscoveryOutcome,
    ) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            fallback,
            calls: AtomicU32::new(0),
            call_times: Mutex::new(Vec::new()),
        }
    }

    /// Number of discover calls.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// When each call happened.
    pub async fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().await.clone()
    }
}

#[async_trait]
impl DiscoveryService for ScriptedDiscovery {
    async fn discover(&self, _session: &SessionId, _text: &str) -> RouterResult<DiscoveryOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().await.push(Instant::now());

        match self.steps.lock().await.pop_front() {
            Some(DiscoveryStep::Respond(outcome)) => Ok(outcome),
            Some(DiscoveryStep::Fail) => Err(transport_error()),
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Discovery fake that behaves like the router: success only when the
/// session holds the expected token, 401 otherwise.
pub struct TokenGatedDiscovery {
    store: Arc<dyn TokenStore>,
    valid_token: BearerToken,
    apps: Vec<LuisAppDetail>,
    calls: AtomicU32,
    seen_tokens: Mutex<Vec<String>>,
}

impl TokenGatedDiscovery {
    /// Accept `valid_token` and answer with `apps`.
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, valid_token: &str, apps: Vec<LuisAppDetail>) -> Self {
        Self {
            store,
            valid_token: BearerToken::new(valid_token),
            apps,
            calls: AtomicU32::new(0),
            seen_tokens: Mutex::new(Vec::new()),
        }
    }

    /// Number of discover calls.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tokens presented, in call order.
    pub async fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().await.clone()
    }
}

#[async_trait]
impl DiscoveryService for TokenGatedDiscovery {
    async fn discover(&self, session: &SessionId, _text: &str) -> RouterResult<DiscoveryOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let token = self.store.get(session).await?.unwrap_or_default();
        self.seen_tokens.lock().await.push(token.expose().to_string());

        if token == self.valid_token {
            Ok(DiscoveryOutcome::Success(self.apps.clone()))
        } else {
            Ok(DiscoveryOutcome::Unauthorized)
        }
    }
}

/// How the identity fake answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityBehavior {
    /// Store this token and report success.
    Issue(String),
    /// Refuse with this status.
    Reject(StatusCode),
    /// Fail with a retryable transport error.
    Fail,
}

/// Identity fake writing into a real token store.
pub struct ScriptedIdentity {
    store: Arc<dyn TokenStore>,
    behavior: IdentityBehavior,
    calls: AtomicU32,
}

impl ScriptedIdentity {
    /// Create an identity fake.
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, behavior: IdentityBehavior) -> Self {
        Self {
            store,
            behavior,
            calls: AtomicU32::new(0),
        }
    }

    /// Number of exchange calls.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityService for ScriptedIdentity {
    async fn exchange(
        &self,
        session: &SessionId,
        _application_code: &str,
        _encryption_key: &str,
    ) -> RouterResult<IdentityOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            IdentityBehavior::Issue(token) => {
                self.store.set(session, BearerToken::new(token.clone())).await?;
                Ok(IdentityOutcome::Refreshed)
            }
            IdentityBehavior::Reject(status) => Ok(IdentityOutcome::Rejected { status: *status }),
            IdentityBehavior::Fail => Err(transport_error()),
        }
    }
}

/// Token store counting reads and writes.
#[derive(Debug, Default)]
pub struct RecordingTokenStore {
    inner: MemoryTokenStore,
    gets: AtomicU32,
    sets: AtomicU32,
}

impl RecordingTokenStore {
    /// Create an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls.
    #[must_use]
    pub fn gets(&self) -> u32 {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `set` calls.
    #[must_use]
    pub fn sets(&self) -> u32 {
        self.sets.load(Ordering::SeqCst)
    }

    /// The raw token held for `session`, without counting a read.
    pub async fn peek(&self, session: &SessionId) -> Option<String> {
        self.inner
            .get(session)
            .await
            .ok()
            .flatten()
            .map(|t| t.expose().to_string())
    }
}

#[async_trait]
impl TokenStore for RecordingTokenStore {
    async fn get(&self, session: &SessionId) -> RouterResult<Option<BearerToken>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(session).await
    }

    async fn set(&self, session: &SessionId, token: BearerToken) -> RouterResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(session, token).await
    }
}
