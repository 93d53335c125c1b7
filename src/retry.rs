//! Retry logic with exponential backoff and circuit breaking
//!
//! Every completion request goes through a [`RetryExecutor`]:
//! - Exponential backoff: 1s, 2s, 4s, 8s, 16s maximum, plus up to 10% jitter
//! - Per-attempt timeout and a total operation timeout
//! - Circuit breaker: 5 consecutive failures = 30s cooldown
//!
//! The executor is shared by concurrent requests. Breaker state lives behind a
//! short-lived lock that is never held across an await point.

use crate::error::{LlmError, LlmResult};
use crate::logging::{log_debug, log_error, log_warn};

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Retry policy configuration for completion requests
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum total operation time
    pub total_timeout: Duration,
    /// Request timeout for individual attempts
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
            backoff_multiplier: 2.0,
            total_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation
    Closed,
    /// Failing, blocking requests
    Open,
    /// Letting requests through to test whether the service recovered
    HalfOpen,
}

/// Circuit breaker guarding the completions endpoint
#[derive(Debug)]
pub struct CircuitBreaker {
    pub(crate) state: CircuitState,
    pub(crate) failure_count: u32,
    pub(crate) last_failure_time: Option<Instant>,
    pub(crate) failure_threshold: u32,
    pub(crate) recovery_timeout: Duration,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(30))
    }
}

impl CircuitBreaker {
    /// Create a closed breaker that opens after `failure_threshold`
    /// consecutive failures and stays open for `recovery_timeout`
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure_time: None,
            failure_threshold,
            recovery_timeout,
        }
    }

    /// Check if request should be allowed through the circuit breaker
    pub fn should_allow_request(&mut self) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => self.check_recovery_timeout(),
            CircuitState::HalfOpen => true,
        }
    }

    /// Transition from Open to HalfOpen once the cooldown elapsed
    fn check_recovery_timeout(&mut self) -> bool {
        let Some(last_failure) = self.last_failure_time else {
            return false;
        };

        if last_failure.elapsed() >= self.recovery_timeout {
            log_debug!(
                circuit_breaker = "transitioning_to_half_open",
                recovery_timeout_seconds = self.recovery_timeout.as_secs(),
                "Circuit breaker attempting recovery"
            );
            self.state = CircuitState::HalfOpen;
            true
        } else {
            false
        }
    }

    /// Record a successful request
    pub fn record_success(&mut self) {
        if self.state == CircuitState::HalfOpen {
            log_debug!(
                circuit_breaker = "recovered",
                "Circuit breaker recovered, returning to closed state"
            );
        }
        self.state = CircuitState::Closed;
        self.failure_count = 0;
        self.last_failure_time = None;
    }

    /// Record a failed request
    pub fn record_failure(&mut self) {
        self.failure_count += 1;
        self.last_failure_time = Some(Instant::now());

        if self.failure_count >= self.failure_threshold {
            if self.state != CircuitState::Open {
                log_warn!(
                    circuit_breaker = "opened",
                    failure_count = self.failure_count,
                    failure_threshold = self.failure_threshold,
                    recovery_timeout_seconds = self.recovery_timeout.as_secs(),
                    "Circuit breaker opened due to repeated failures"
                );
            }
            self.state = CircuitState::Open;
        }
    }

    /// Get current circuit breaker state
    pub fn state(&self) -> CircuitState {
        self.state
    }
}

/// Retry executor that handles exponential backoff and circuit breaking
#[derive(Debug, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    circuit_breaker: Mutex<CircuitBreaker>,
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            circuit_breaker: Mutex::new(CircuitBreaker::default()),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Current state of the shared circuit breaker
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker().state()
    }

    fn breaker(&self) -> MutexGuard<'_, CircuitBreaker> {
        // The breaker holds plain counters, a poisoned lock is still usable.
        self.circuit_breaker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Execute an operation with retry logic and circuit breaking
    pub async fn execute<F, Fut, T>(&self, operation: F) -> LlmResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = LlmResult<T>>,
    {
        let start_time = Instant::now();
        let mut attempt = 0;
        let mut last_error = None;

        while attempt < self.policy.max_attempts {
            self.check_circuit_breaker()?;
            self.check_total_timeout(&start_time)?;

            attempt += 1;

            match self
                .execute_single_attempt(&operation, attempt, &mut last_error)
                .await
            {
                Ok(response) => return Ok(response),
                Err(should_continue) => {
                    if !should_continue {
                        break;
                    }
                }
            }
        }

        self.handle_exhausted_retries(attempt, last_error, &start_time)
    }

    /// Execute a single attempt and return whether to continue retrying
    async fn execute_single_attempt<F, Fut, T>(
        &self,
        operation: &F,
        attempt: u32,
        last_error: &mut Option<LlmError>,
    ) -> Result<T, bool>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = LlmResult<T>>,
    {
        log_debug!(
            attempt = attempt,
            max_attempts = self.policy.max_attempts,
            circuit_state = ?self.circuit_state(),
            "Executing request with retry logic"
        );

        let operation_start = Instant::now();
        let result = tokio::time::timeout(self.policy.request_timeout, operation()).await;

        let error = match result {
            Ok(Ok(response)) => {
                self.breaker().record_success();
                log_debug!(
                    attempt = attempt,
                    duration_ms = operation_start.elapsed().as_millis(),
                    "Request succeeded"
                );
                return Ok(response);
            }
            Ok(Err(error)) => error,
            Err(_elapsed) => LlmError::timeout(self.policy.request_timeout.as_secs()),
        };

        let should_retry = error.is_retryable() && attempt < self.policy.max_attempts;
        self.breaker().record_failure();

        if !should_retry {
            *last_error = Some(error);
            return Err(false);
        }

        let delay = self.retry_delay(attempt, &error);
        log_debug!(
            attempt = attempt,
            max_attempts = self.policy.max_attempts,
            delay_ms = delay.as_millis(),
            error = %error,
            "Request failed, retrying after delay"
        );
        *last_error = Some(error);
        sleep(delay).await;
        Err(true)
    }

    fn check_circuit_breaker(&self) -> LlmResult<()> {
        if !self.breaker().should_allow_request() {
            return Err(LlmError::request_failed(
                "Circuit breaker is open - service temporarily unavailable",
                None,
            ));
        }
        Ok(())
    }

    fn check_total_timeout(&self, start_time: &Instant) -> LlmResult<()> {
        if start_time.elapsed() >= self.policy.total_timeout {
            return Err(LlmError::timeout(self.policy.total_timeout.as_secs()));
        }
        Ok(())
    }

    fn handle_exhausted_retries<T>(
        &self,
        attempt: u32,
        last_error: Option<LlmError>,
        start_time: &Instant,
    ) -> LlmResult<T> {
        let final_error = last_error.unwrap_or_else(|| {
            LlmError::request_failed("Maximum retry attempts exceeded", None)
        });

        log_error!(
            attempts = attempt,
            total_duration_ms = start_time.elapsed().as_millis(),
            circuit_state = ?self.circuit_state(),
            error = %final_error,
            "Request failed after all retry attempts"
        );

        Err(final_error)
    }

    /// Backoff delay, stretched to honour a server-provided Retry-After
    pub(crate) fn retry_delay(&self, attempt: u32, error: &LlmError) -> Duration {
        let backoff = self.calculate_delay(attempt);
        match error {
            LlmError::RateLimitExceeded {
                retry_after_seconds,
            } => backoff.max(Duration::from_secs(*retry_after_seconds).min(self.policy.max_delay)),
            _ => backoff,
        }
    }

    /// Calculate delay for exponential backoff
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay_seconds =
            self.policy.initial_delay.as_secs_f64() * self.policy.backoff_multiplier.powi(exponent);

        let delay = Duration::from_secs_f64(delay_seconds.min(self.policy.max_delay.as_secs_f64()));

        // Up to 10% jitter against synchronized retries
        let jitter = fastrand::f64() * 0.1;
        Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter))
    }
}
