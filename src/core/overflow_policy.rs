//! Policies for entries the bounded writer cannot handle normally
//!
//! The queue itself always drops the newest entry when full. These policies
//! cover the other two edge cases: entries too large for the batch buffer and
//! sink failures inside the background consumer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What to do with an encoded entry larger than the batch buffer
///
/// # Example
///
/// ```
/// use rust_log_pipeline::OversizePolicy;
///
/// let policy = OversizePolicy::default();
/// assert_eq!(policy, OversizePolicy::WriteThrough);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OversizePolicy {
    /// Flush the pending batch, then write the entry on its own
    #[default]
    WriteThrough,

    /// Discard the entry and count it
    Reject,
}

/// What the background consumer does when the sink fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteFailurePolicy {
    /// Stop the consumer; producers see `WriterFailed` and `close()` returns the error
    #[default]
    Terminate,

    /// Count the failure, discard the failed batch and keep consuming
    Swallow,
}

impl fmt::Display for OversizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OversizePolicy::WriteThrough => write!(f, "WriteThrough"),
            OversizePolicy::Reject => write!(f, "Reject"),
        }
    }
}

impl fmt::Display for WriteFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteFailurePolicy::Terminate => write!(f, "Terminate"),
            WriteFailurePolicy::Swallow => write!(f, "Swallow"),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called when entries are dropped because the queue is full.
/// The parameter is the total count of dropped entries so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;
