//! # Key Registration
//!
//! Drives a key registration from building the transition to seeing the
//! keys on chain.
//!
//! ## State Machine
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      REGISTRATION PHASES                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   idle ──start()──► building ──built──► waiting ──registered──►        │
//! │    ▲                   │                 │    │                         │
//! │    │                   │ build failed    │    │      verifying          │
//! │    │                   ▼                 │    │          │ 500 ms       │
//! │    │                 error ◄──timeout────┘    │          ▼              │
//! │    │                                          │      complete           │
//! │    └──────────────────cancel()────────────────┘                         │
//! │                                                                         │
//! │  In waiting, two timers run side by side:                              │
//! │    countdown  every 1 s, 300 s budget, error at zero                   │
//! │    poll       immediately, then every 5 s                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Attempts and Fencing
//!
//! At most one attempt is live. Each attempt runs as a single task and is
//! identified by a token taken from a monotonically increasing counter.
//! `start`, `retry` and `cancel` abort the running task and bump the counter
//! under the slot lock before anything else happens, and every state update
//! from a task checks its token under the same lock. An update from a
//! superseded attempt is dropped.
//!
//! Only the public keys of an attempt are retained (for `retry`); private
//! keys never leave the `start` call.

mod config;
mod services;
mod state;

pub use config::{
    RegistrationConfig, DEFAULT_COUNTDOWN_TICK_MS, DEFAULT_FEEDBACK_DELAY_MS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};
pub use services::{BuiltTransition, RegistrationCheck, TransitionBuilder, UnsignedTransitionRequest};
pub use state::{Phase, RegistrationResult, RegistrationState};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, sleep_until, Instant, MissedTickBehavior};

use crate::crypto::{CompressedPublicKey, DerivedKey};
use crate::error::{Error, Result};
use crate::identity::IdentityId;
use crate::uri::{StateTransitionRequest, TransitionType};

/// Called once per completed attempt
pub type CompletionCallback = Arc<dyn Fn(&RegistrationResult) + Send + Sync>;

/// Everything needed to replay an attempt
#[derive(Debug, Clone)]
struct AttemptInputs {
    identity_id: IdentityId,
    auth_public_key: CompressedPublicKey,
    encryption_public_key: CompressedPublicKey,
}

/// The single current-attempt slot
#[derive(Default)]
struct AttemptSlot {
    task: Option<JoinHandle<()>>,
    last_inputs: Option<AttemptInputs>,
}

struct Inner {
    builder: Arc<dyn TransitionBuilder>,
    checker: Arc<dyn RegistrationCheck>,
    config: RegistrationConfig,
    generation: AtomicU64,
    slot: Mutex<AttemptSlot>,
    state_tx: watch::Sender<RegistrationState>,
    on_complete: Mutex<Option<CompletionCallback>>,
}

impl Inner {
    /// Abort the live attempt and return the token for the next one
    ///
    /// Must be called with the slot lock held.
    fn teardown(&self, slot: &mut AttemptSlot) -> u64 {
        if let Some(task) = slot.task.take() {
            task.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// `Cancelled` unless `token` is the live attempt
    ///
    /// Must be called with the slot lock held.
    fn ensure_current(&self, token: u64) -> Result<()> {
        if self.generation.load(Ordering::SeqCst) == token {
            Ok(())
        } else {
            Err(Error::Cancelled)
        }
    }

    /// Apply a state update if `token` is still the live attempt
    fn apply(&self, token: u64, update: impl FnOnce(&mut RegistrationState)) -> Result<()> {
        let _slot = self.slot.lock();
        self.ensure_current(token)?;
        self.state_tx.send_modify(update);
        Ok(())
    }

    /// The completion callback, if `token` is still the live attempt
    fn completion_callback(&self, token: u64) -> Result<Option<CompletionCallback>> {
        let _slot = self.slot.lock();
        self.ensure_current(token)?;
        Ok(self.on_complete.lock().clone())
    }

    fn fail(&self, token: u64, err: &Error) {
        if self.apply(token, |state| *state = RegistrationState::failed(err)).is_ok() {
            tracing::warn!(code = err.code(), error = %err, "Key registration failed");
        }
    }
}

/// Registers an auth and an encryption key on an identity via the wallet
///
/// Requires a tokio runtime; attempts run on spawned tasks. Dropping the
/// registration aborts any live attempt.
pub struct KeyRegistration {
    inner: Arc<Inner>,
}

impl KeyRegistration {
    /// Create an idle registration
    pub fn new(
        builder: Arc<dyn TransitionBuilder>,
        checker: Arc<dyn RegistrationCheck>,
        config: RegistrationConfig,
    ) -> Result<Self> {
        config.validate()?;
        let (state_tx, _) = watch::channel(RegistrationState::default());

        Ok(Self {
            inner: Arc::new(Inner {
                builder,
                checker,
                config,
                generation: AtomicU64::new(0),
                slot: Mutex::new(AttemptSlot::default()),
                state_tx,
                on_complete: Mutex::new(None),
            }),
        })
    }

    /// Current state snapshot
    pub fn state(&self) -> RegistrationState {
        self.inner.state_tx.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<RegistrationState> {
        self.inner.state_tx.subscribe()
    }

    /// Set the callback fired when an attempt completes
    pub fn on_complete(&self, callback: impl Fn(&RegistrationResult) + Send + Sync + 'static) {
        *self.inner.on_complete.lock() = Some(Arc::new(callback));
    }

    /// Start a new attempt, superseding any live one
    ///
    /// Failures are reported through the state, never returned.
    pub fn start(&self, identity_id: IdentityId, auth_key: &DerivedKey, encryption_key: &DerivedKey) {
        let inputs = auth_key.public_key().and_then(|auth_public_key| {
            Ok(AttemptInputs {
                identity_id,
                auth_public_key,
                encryption_public_key: encryption_key.public_key()?,
            })
        });

        match inputs {
            Ok(inputs) => self.launch(inputs),
            Err(err) => {
                let mut slot = self.inner.slot.lock();
                self.inner.teardown(&mut slot);
                slot.last_inputs = None;
                tracing::warn!(error = %err, "Key registration rejected invalid keys");
                self.inner.state_tx.send_replace(RegistrationState::failed(&err));
            }
        }
    }

    /// Replay the last `start`; does nothing if there was none
    pub fn retry(&self) {
        let last = self.inner.slot.lock().last_inputs.clone();
        match last {
            Some(inputs) => {
                tracing::info!(identity = %inputs.identity_id, "Retrying key registration");
                self.launch(inputs);
            }
            None => tracing::debug!("Retry requested with no previous attempt"),
        }
    }

    /// Abort the live attempt and return to `idle`
    pub fn cancel(&self) {
        let mut slot = self.inner.slot.lock();
        self.inner.teardown(&mut slot);
        self.inner.state_tx.send_replace(RegistrationState::default());
        tracing::info!("Key registration cancelled");
    }

    fn launch(&self, inputs: AttemptInputs) {
        let mut slot = self.inner.slot.lock();
        let token = self.inner.teardown(&mut slot);
        slot.last_inputs = Some(inputs.clone());

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                let err = Error::Internal("key registration needs a tokio runtime".into());
                self.inner.state_tx.send_replace(RegistrationState::failed(&err));
                return;
            }
        };

        tracing::info!(identity = %inputs.identity_id, token, "Key registration building");
        self.inner.state_tx.send_replace(RegistrationState::building());
        slot.task = Some(runtime.spawn(run_attempt(Arc::clone(&self.inner), token, inputs)));
    }
}

impl Drop for KeyRegistration {
    fn drop(&mut self) {
        let mut slot = self.inner.slot.lock();
        self.inner.teardown(&mut slot);
    }
}

impl std::fmt::Debug for KeyRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRegistration")
            .field("phase", &self.inner.state_tx.borrow().phase)
            .field("config", &self.inner.config)
            .finish()
    }
}

// ============================================================================
// ATTEMPT TASK
// ============================================================================

async fn run_attempt(inner: Arc<Inner>, token: u64, inputs: AttemptInputs) {
    match attempt(&inner, token, inputs).await {
        Ok(()) => {}
        Err(Error::Cancelled) => {
            tracing::debug!(token, "Dropped update from superseded registration attempt");
        }
        Err(err) => inner.fail(token, &err),
    }
}

async fn attempt(inner: &Inner, token: u64, inputs: AttemptInputs) -> Result<()> {
    let request = UnsignedTransitionRequest {
        identity_id: inputs.identity_id,
        auth_public_key: inputs.auth_public_key,
        encryption_public_key: inputs.encryption_public_key,
    };

    let built = inner.builder.build(&request).await?;

    let uri = StateTransitionRequest::new(
        built.transition_bytes,
        TransitionType::IdentityUpdate,
        inner.config.network,
    )
    .build_uri()
    .map_err(|err| Error::BuildFailed(err.to_string()))?;

    let timeout = inner.config.timeout();
    let deadline = Instant::now() + timeout;
    inner.apply(token, |state| {
        *state = RegistrationState {
            phase: Phase::Waiting,
            uri: Some(uri),
            remaining_ms: Some(inner.config.timeout_ms),
            ..RegistrationState::default()
        };
    })?;
    tracing::info!(identity = %request.identity_id, "Waiting for wallet signature");

    let registered = tokio::select! {
        biased;
        _ = poll_until_registered(inner, &request) => true,
        _ = countdown(inner, token, deadline) => false,
    };

    if !registered {
        return Err(Error::Timeout(format!(
            "wallet did not sign within {} seconds",
            timeout.as_secs()
        )));
    }

    inner.apply(token, |state| state.phase = Phase::Verifying)?;
    tracing::info!(identity = %request.identity_id, "Keys found on chain, verifying");

    sleep(inner.config.feedback_delay()).await;

    let result = RegistrationResult {
        auth_key_id: built.auth_key_id,
        encryption_key_id: built.encryption_key_id,
        auth_public_key: request.auth_public_key,
        encryption_public_key: request.encryption_public_key,
    };
    inner.apply(token, |state| {
        state.phase = Phase::Complete;
        state.result = Some(result.clone());
    })?;

    tracing::info!(
        identity = %request.identity_id,
        auth_key_id = result.auth_key_id,
        encryption_key_id = result.encryption_key_id,
        "Key registration complete"
    );

    if let Some(callback) = inner.completion_callback(token)? {
        callback(&result);
    }
    Ok(())
}

/// Tick `remaining_ms` down to zero; returns at the deadline
async fn countdown(inner: &Inner, token: u64, deadline: Instant) {
    let tick = inner.config.countdown_tick();
    let mut next = Instant::now() + tick;

    loop {
        sleep_until(next.min(deadline)).await;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX);
        if inner
            .apply(token, |state| state.remaining_ms = Some(remaining_ms))
            .is_err()
            || remaining.is_zero()
        {
            return;
        }
        next += tick;
    }
}

/// Poll until the keys are registered; individual failures are retried
async fn poll_until_registered(inner: &Inner, request: &UnsignedTransitionRequest) {
    let mut ticker = interval(inner.config.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match inner
            .checker
            .check_keys_registered(
                &request.identity_id,
                &request.auth_public_key,
                &request.encryption_public_key,
            )
            .await
        {
            Ok(true) => return,
            Ok(false) => tracing::debug!("Keys not registered yet"),
            Err(err) => {
                let err = Error::TransientPoll(err.to_string());
                tracing::debug!(error = %err, "Registration check failed; retrying next tick");
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
