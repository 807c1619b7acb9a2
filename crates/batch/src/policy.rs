//! Tagged construction of batch strategies

use std::time::Duration;

use crate::{BatchStrategy, ImmediateBatch, SizeBatch, TimedBatch};

/// Errors produced when validating a batch policy.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BatchPolicyError {
    #[error("batch size must be at least 1, got {0}")]
    InvalidSize(usize),
}

/// How blob-bound records are grouped before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// One record per batch.
    Immediate,
    /// Emit after `size` records.
    Size { size: usize },
    /// Emit after `size` records or `interval`, whichever comes first.
    Timed { size: usize, interval: Duration },
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self::Immediate
    }
}

impl BatchPolicy {
    /// Reject sizes below 1 for the size-bounded policies.
    pub fn validate(&self) -> Result<(), BatchPolicyError> {
        match *self {
            Self::Immediate => Ok(()),
            Self::Size { size } | Self::Timed { size, .. } if size == 0 => {
                Err(BatchPolicyError::InvalidSize(size))
            }
            _ => Ok(()),
        }
    }

    /// Construct the strategy this policy describes. A timed policy with a
    /// zero interval degrades to the size strategy.
    pub fn build(&self) -> Box<dyn BatchStrategy> {
        match *self {
            Self::Immediate => Box::new(ImmediateBatch),
            Self::Size { size } => Box::new(SizeBatch::new(size)),
            Self::Timed { size, interval } if interval.is_zero() => Box::new(SizeBatch::new(size)),
            Self::Timed { size, interval } => Box::new(TimedBatch::new(size, interval)),
        }
    }
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod policy_test;
