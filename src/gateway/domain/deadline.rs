//! Deadlines for calls into backend servers.
//!
//! Every collaborator call is raced against an explicit [`Deadline`]. The
//! deadline is measured on tokio's clock, so tests can drive it with a paused
//! runtime instead of real sleeps.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

const DEFAULT_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Collaborator operation a deadline guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    /// Batch registration of backend connections.
    Register,
    /// Tool discovery on one server.
    ListTools,
    /// Invocation of one tool.
    Invoke,
}

impl BackendOperation {
    /// Returns a stable name for logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::ListTools => "list_tools",
            Self::Invoke => "invoke",
        }
    }
}

impl fmt::Display for BackendOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A deadline elapsed before the guarded operation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{operation} did not complete within {timeout:?}")]
pub struct DeadlineExceeded {
    /// Operation that was abandoned.
    pub operation: BackendOperation,
    /// Budget the operation was given.
    pub timeout: Duration,
}

/// Point in time by which a collaborator call must finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Creates a deadline `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
            budget,
        }
    }

    /// Returns the instant the deadline expires.
    #[must_use]
    pub const fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Returns the budget the deadline was created with.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Returns the time left before expiry, zero once expired.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Races `future` against the deadline.
    ///
    /// On expiry the future is dropped, which cancels only that operation.
    ///
    /// # Errors
    ///
    /// Returns [`DeadlineExceeded`] when the deadline elapses first.
    pub async fn race<F>(
        self,
        operation: BackendOperation,
        future: F,
    ) -> Result<F::Output, DeadlineExceeded>
    where
        F: Future,
    {
        tokio::time::timeout_at(self.expires_at, future)
            .await
            .map_err(|_| DeadlineExceeded {
                operation,
                timeout: self.budget,
            })
    }
}

/// Per-operation time budgets used by bring-up and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayTimeouts {
    /// Ceiling for the whole registration batch at startup.
    pub registration: Duration,
    /// Budget for one server's tool discovery.
    pub discovery: Duration,
    /// Budget for one tool invocation.
    pub invocation: Duration,
}

impl Default for GatewayTimeouts {
    fn default() -> Self {
        Self {
            registration: DEFAULT_REGISTRATION_TIMEOUT,
            discovery: DEFAULT_DISCOVERY_TIMEOUT,
            invocation: DEFAULT_INVOCATION_TIMEOUT,
        }
    }
}
