use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{SimulationResult, UnsignedTransaction};
use crate::ports::{PortError, SorobanServer};

pub const DEFAULT_SIMULATE_MAX_RETRIES: u32 = 3;
pub const DEFAULT_SIMULATE_DELAY: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_SIMULATE_MAX_RETRIES,
            delay: DEFAULT_SIMULATE_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("simulation failed after {attempts} attempts: {source}")]
pub struct RetryExhausted {
    pub attempts: u32,
    pub source: PortError,
}

/// Simulates `tx`, retrying failed calls with a flat delay.
///
/// A policy of zero retries still makes one attempt.
pub async fn simulate_with_retry(
    server: &dyn SorobanServer,
    tx: &UnsignedTransaction,
    policy: RetryPolicy,
) -> Result<SimulationResult, RetryExhausted> {
    let max_attempts = policy.max_retries.max(1);
    let mut attempts = 0;

    loop {
        match server.simulate_transaction(tx).await {
            Ok(result) => {
                debug!(attempt = attempts + 1, "simulation succeeded");
                return Ok(result);
            }
            Err(e) => {
                attempts += 1;
                warn!(attempt = attempts, error = %e, "simulation attempt failed");
                if attempts >= max_attempts {
                    return Err(RetryExhausted {
                        attempts,
                        source: e,
                    });
                }
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}
