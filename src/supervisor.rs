//! Subscription lifecycle: restart policy and shutdown handling.
//!
//! The supervisor owns the subscriber and the notifier. It restarts the
//! subscription with exponential backoff after recoverable failures,
//! escalates credential rejections to process termination, and turns an
//! operator interrupt into a clean stop.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::subscriber::UpdateSubscriber;
use crate::telegram::GatewayError;
use crate::watcher::NameChangeNotifier;

/// A run longer than this counts as stable and resets the backoff.
const STABLE_RUN_THRESHOLD: Duration = Duration::from_secs(60);

/// Exponential retry backoff: `first × factor^attempt`, clamped to `max`.
#[derive(Debug, Clone, Copy)]
pub struct RetryBackoff {
    /// Delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor.
    pub factor: f64,
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            max: Duration::from_secs(30),
            factor: 2.0,
        }
    }
}

impl RetryBackoff {
    /// Delay for the given attempt number (0-indexed).
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.first.as_secs_f64() * self.factor.powi(exponent);

        if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

/// Owns the subscriber and notifier for the life of the process.
pub struct Supervisor {
    subscriber: UpdateSubscriber,
    notifier: NameChangeNotifier,
    backoff: RetryBackoff,
    shutdown: watch::Receiver<bool>,
}

impl Supervisor {
    /// Create a supervisor with the default backoff policy.
    pub fn new(
        subscriber: UpdateSubscriber,
        notifier: NameChangeNotifier,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            subscriber,
            notifier,
            backoff: RetryBackoff::default(),
            shutdown,
        }
    }

    /// Run the subscription until a clean stop or a fatal error.
    ///
    /// # Errors
    ///
    /// Returns the terminating [`GatewayError`] when the bot token is
    /// rejected; the binary maps this to a non-zero exit status.
    pub async fn run(&mut self) -> Result<(), GatewayError> {
        let mut attempt: u32 = 0;

        loop {
            let started = Instant::now();
            let mut shutdown = self.shutdown.clone();

            match self.subscriber.run(&self.notifier, &mut shutdown).await {
                Ok(()) => {
                    info!("subscription stopped cleanly");
                    return Ok(());
                }
                Err(e) if e.is_credential_rejection() => {
                    error!(error = %e, "bot token rejected, giving up");
                    return Err(e);
                }
                Err(e) => {
                    if started.elapsed() >= STABLE_RUN_THRESHOLD {
                        attempt = 0;
                    }
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "subscription failed, restarting"
                    );
                    attempt = attempt.saturating_add(1);

                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        _ = shutdown.changed() => {
                            info!("shutdown during restart backoff");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// Spawn a task that flips the returned channel to `true` on SIGINT.
pub fn spawn_ctrl_c_listener() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received shutdown signal");
                let _ = tx.send(true);
            }
            Err(e) => {
                error!(error = %e, "failed to listen for shutdown signal");
                // Keep the sender alive so subscribers never observe a
                // closed channel as a stop request.
                std::future::pending::<()>().await;
            }
        }
    });

    rx
}
