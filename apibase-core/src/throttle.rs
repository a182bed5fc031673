//! Throttle Gate
//!
//! A single-slot serialization primitive for outbound calls. At most one
//! operation body runs at a time across every caller sharing a gate; after the
//! operation finishes (successfully or not) the slot stays held for a fixed
//! cooldown before the next waiter is admitted.
//!
//! Waiters are admitted in FIFO order (the slot is a fair
//! [`tokio::sync::Semaphore`] with one permit). Under
//! [`AdmissionPolicy::Bounded`], a caller arriving while more than
//! `pending_limit` callers are already waiting is rejected immediately with a
//! capacity error and nothing is executed.
//!
//! # Example
//!
//! ```rust
//! use apibase_core::throttle::{ThrottleConfig, ThrottleGate};
//! use std::time::Duration;
//!
//! # async fn example() -> apibase_core::Result<()> {
//! let gate = ThrottleGate::new(ThrottleConfig::new(Duration::from_millis(250)));
//!
//! let value = gate.execute(|| async { Ok(21 * 2) }).await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

use crate::error::{ConfigValidationError, Error, Result, ValidationResult};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{Instant, sleep_until};

/// Default hold time after each operation.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);

/// Default number of callers allowed to wait for the slot.
pub const DEFAULT_PENDING_LIMIT: usize = 10;

/// Upper bound accepted by [`ThrottleConfig::validate`].
pub const MAX_COOLDOWN: Duration = Duration::from_secs(60);

/// How the gate treats callers that arrive while the slot is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionPolicy {
    /// Reject arrivals once more than `pending_limit` callers are waiting.
    Bounded {
        /// Maximum tolerated number of waiting callers.
        pending_limit: usize,
    },
    /// Every caller queues; nobody is rejected.
    Unbounded,
}

impl AdmissionPolicy {
    /// Returns the backlog limit, or `None` for the unbounded policy.
    pub fn pending_limit(&self) -> Option<usize> {
        match self {
            AdmissionPolicy::Bounded { pending_limit } => Some(*pending_limit),
            AdmissionPolicy::Unbounded => None,
        }
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        AdmissionPolicy::Bounded {
            pending_limit: DEFAULT_PENDING_LIMIT,
        }
    }
}

/// Throttle gate configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Time the slot stays held after each operation.
    pub cooldown: Duration,
    /// Admission policy for waiting callers.
    pub policy: AdmissionPolicy,
}

impl ThrottleConfig {
    /// Creates a bounded configuration with the default backlog limit.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            policy: AdmissionPolicy::default(),
        }
    }

    /// Sets a bounded policy with the given backlog limit.
    pub fn with_pending_limit(mut self, pending_limit: usize) -> Self {
        self.policy = AdmissionPolicy::Bounded { pending_limit };
        self
    }

    /// Switches to the unbounded FIFO policy.
    pub fn unbounded(mut self) -> Self {
        self.policy = AdmissionPolicy::Unbounded;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the cooldown exceeds [`MAX_COOLDOWN`].
    /// A zero cooldown is accepted with a warning.
    pub fn validate(&self) -> std::result::Result<ValidationResult, ConfigValidationError> {
        let mut result = ValidationResult::new();

        if self.cooldown > MAX_COOLDOWN {
            return Err(ConfigValidationError::too_high(
                "cooldown",
                format!("{:?}", self.cooldown),
                format!("{MAX_COOLDOWN:?}"),
            ));
        }
        if self.cooldown.is_zero() {
            result.add_warning("cooldown is zero; calls are serialized without spacing");
        }

        Ok(result)
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

#[derive(Debug)]
struct GateInner {
    slot: Arc<Semaphore>,
    waiting: AtomicUsize,
    config: RwLock<ThrottleConfig>,
}

/// Serializes operations through a single slot with a post-operation cooldown.
///
/// Cloning is cheap; clones share the same slot, backlog and configuration.
#[derive(Debug, Clone)]
pub struct ThrottleGate {
    inner: Arc<GateInner>,
}

impl ThrottleGate {
    /// Creates a gate with the given configuration.
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            inner: Arc::new(GateInner {
                slot: Arc::new(Semaphore::new(1)),
                waiting: AtomicUsize::new(0),
                config: RwLock::new(config),
            }),
        }
    }

    /// Runs `operation` with exclusive access to the slot.
    ///
    /// The operation's result is returned unchanged once the cooldown has
    /// elapsed. The cooldown runs whether the operation succeeded or failed.
    /// If the calling future is dropped while holding the slot, a detached
    /// timer releases it at the end of the cooldown: measured from the drop
    /// when the operation was still running, otherwise from the operation's
    /// end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Capacity`] without running `operation` when the
    /// bounded backlog is exceeded. Otherwise returns whatever `operation`
    /// returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apibase_core::throttle::{ThrottleConfig, ThrottleGate};
    /// use apibase_core::Error;
    /// use std::time::Duration;
    ///
    /// # async fn example() {
    /// let gate = ThrottleGate::new(ThrottleConfig::new(Duration::ZERO));
    /// let result: Result<(), Error> = gate
    ///     .execute(|| async { Err(Error::network("connection reset")) })
    ///     .await;
    /// assert!(result.is_err());
    /// # }
    /// ```
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let permit = self.admit().await?;
        let cooldown = self.cooldown();
        tracing::trace!(cooldown_ms = cooldown.as_millis() as u64, "Throttle slot acquired");

        let mut guard = SlotGuard {
            permit: Some(permit),
            cooldown,
            release_at: None,
        };
        let result = operation().await;
        guard.release_at = Some(Instant::now() + cooldown);
        guard.release().await;
        result
    }

    async fn admit(&self) -> Result<OwnedSemaphorePermit> {
        let limit = self.policy().pending_limit();
        let registered =
            self.inner
                .waiting
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |waiting| {
                    match limit {
                        Some(limit) if waiting > limit => None,
                        _ => Some(waiting + 1),
                    }
                });

        if let Err(waiting) = registered {
            tracing::warn!(waiting, limit = ?limit, "Throttle limit exceeded");
            return Err(Error::capacity(format!(
                "throttle limit exceeded ({waiting} callers waiting)"
            )));
        }

        let _waiting = WaitingGuard(&self.inner.waiting);
        Arc::clone(&self.inner.slot)
            .acquire_owned()
            .await
            .map_err(|_| Error::initialization("throttle slot closed"))
    }

    /// Number of callers currently waiting for the slot.
    pub fn waiting(&self) -> usize {
        self.inner.waiting.load(Ordering::Acquire)
    }

    /// Returns `true` while an operation runs or a cooldown is pending.
    pub fn is_busy(&self) -> bool {
        self.inner.slot.available_permits() == 0
    }

    /// Current cooldown duration.
    pub fn cooldown(&self) -> Duration {
        self.read_config().cooldown
    }

    /// Changes the cooldown for operations admitted from now on.
    pub fn set_cooldown(&self, cooldown: Duration) {
        self.write_config(|config| config.cooldown = cooldown);
    }

    /// Current admission policy.
    pub fn policy(&self) -> AdmissionPolicy {
        self.read_config().policy
    }

    /// Changes the admission policy for callers arriving from now on.
    pub fn set_policy(&self, policy: AdmissionPolicy) {
        self.write_config(|config| config.policy = policy);
    }

    /// Backlog limit, or `None` under the unbounded policy.
    pub fn pending_limit(&self) -> Option<usize> {
        self.policy().pending_limit()
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> ThrottleConfig {
        self.read_config()
    }

    fn read_config(&self) -> ThrottleConfig {
        *self
            .inner
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_config(&self, update: impl FnOnce(&mut ThrottleConfig)) {
        let mut config = self
            .inner
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        update(&mut config);
    }
}

impl Default for ThrottleGate {
    fn default() -> Self {
        Self::new(ThrottleConfig::default())
    }
}

/// Unregisters a waiter once it is admitted or abandons the wait.
struct WaitingGuard<'a>(&'a AtomicUsize);

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Holds the slot until the cooldown has elapsed.
struct SlotGuard {
    permit: Option<OwnedSemaphorePermit>,
    cooldown: Duration,
    /// Set once the operation has finished.
    release_at: Option<Instant>,
}

impl SlotGuard {
    fn deadline(&self) -> Instant {
        self.release_at.unwrap_or_else(|| Instant::now() + self.cooldown)
    }

    async fn release(mut self) {
        if !self.cooldown.is_zero() {
            sleep_until(self.deadline()).await;
        }
        self.permit.take();
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let Some(permit) = self.permit.take() else {
            return;
        };
        let deadline = self.deadline();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) if deadline > Instant::now() => {
                handle.spawn(async move {
                    sleep_until(deadline).await;
                    drop(permit);
                });
            }
            _ => drop(permit),
        }
    }
}
