//! Optional bounds of otherwise blocking motions: a deadline, a cancellation token, or both.
//! Unbounded motions run until convergence, exactly as the control loop always did.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cloneable flag another thread can raise to stop a running motion.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Reason a bounded motion stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundExpired {
    Deadline,
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct MotionBound {
    pub deadline: Option<Instant>,
    pub token: Option<CancellationToken>,
}

impl MotionBound {
    /// Run until convergence.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Give up once the timeout has passed from now.
    pub fn within(timeout: Duration) -> Self {
        MotionBound {
            deadline: Some(Instant::now() + timeout),
            token: None,
        }
    }

    pub fn cancellable(token: CancellationToken) -> Self {
        MotionBound {
            deadline: None,
            token: Some(token),
        }
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.deadline.is_none() && self.token.is_none()
    }

    /// Cancellation wins over the deadline when both apply.
    pub fn check(&self) -> Option<BoundExpired> {
        if self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Some(BoundExpired::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(BoundExpired::Deadline),
            _ => None,
        }
    }
}
