//! Adaptive rate limiter for outbound LLM calls.
//!
//! The provider's real rate limit is unknown in advance, so the limiter
//! discovers it empirically: every 429 grows the inter-call delay
//! multiplicatively (with jitter), every success shrinks it back toward the
//! configured floor. One limiter instance gates all calls made through one
//! processor, which is why the queue runs a single worker: parallel calls
//! would blind the limiter to the true outbound cadence.

use std::time::Duration;

use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Tuning knobs for the adaptive delay. Defaults match the original
/// deployment: 1s floor, 60s ceiling, ×1.5 growth, ÷1.2 shrink.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Starting delay, and the floor the delay can never shrink below.
    pub initial_delay: Duration,
    /// Ceiling that guarantees forward progress under sustained throttling.
    pub max_delay: Duration,
    /// Multiplier applied (with jitter) on each rate-limit failure.
    pub growth_factor: f64,
    /// Divisor applied on each success.
    pub shrink_factor: f64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            growth_factor: 1.5,
            shrink_factor: 1.2,
        }
    }
}

struct LimiterState {
    delay: Duration,
    last_call: Option<Instant>,
}

/// Enforces a minimum spacing between outbound calls that adapts to observed
/// throttling.
pub struct RateLimiter {
    config: RateLimiterConfig,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        let delay = config.initial_delay;
        Self {
            config,
            state: Mutex::new(LimiterState {
                delay,
                last_call: None,
            }),
        }
    }

    /// Blocks until at least the current delay has elapsed since the last
    /// dispatched call, then stamps the dispatch time.
    ///
    /// The elapsed check, the sleep, and the timestamp update are one
    /// critical section: two callers racing here would otherwise both see a
    /// stale `last_call` and burst the endpoint.
    pub async fn wait(&self) {
        let mut state = self.state.lock().await;
        if let Some(last) = state.last_call {
            let target = last + state.delay;
            let now = Instant::now();
            if target > now {
                tokio::time::sleep_until(target).await;
            }
        }
        state.last_call = Some(Instant::now());
    }

    /// Shrinks the delay after a successful call, never below the floor.
    /// The floor keeps recovery from re-triggering throttling instantly.
    pub async fn on_success(&self) {
        let mut state = self.state.lock().await;
        let shrunk = state.delay.div_f64(self.config.shrink_factor);
        state.delay = shrunk.max(self.config.initial_delay);
        debug!(delay_ms = state.delay.as_millis() as u64, "rate limiter eased");
    }

    /// Grows the delay after a rate-limit failure and returns the new value
    /// so the caller can sleep it out explicitly.
    ///
    /// Jitter (±20%) decorrelates callers that would otherwise retry in
    /// lockstep; the ceiling guarantees the system never backs off forever.
    pub async fn on_failure(&self) -> Duration {
        let jitter: f64 = rand::thread_rng().gen_range(0.8..=1.2);
        let mut state = self.state.lock().await;
        let grown = state.delay.mul_f64(self.config.growth_factor * jitter);
        state.delay = grown.min(self.config.max_delay);
        warn!(
            delay_ms = state.delay.as_millis() as u64,
            "rate limit hit, backing off"
        );
        state.delay
    }

    /// Current delay, for observability.
    pub async fn current_delay(&self) -> Duration {
        self.state.lock().await.delay
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}
