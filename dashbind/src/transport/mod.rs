//! The pub/sub primitive bindings are written against.
//!
//! Bindings never talk to a concrete bus. They resolve a [`Topic`] once at
//! construction and then create and drop [`Publisher`] / [`Subscriber`]
//! handles as they are enabled and disabled. [`LocalBus`] is the in-process
//! implementation used by tests and the demo.

use std::error::Error;
use std::fmt;

pub mod local_bus;
pub mod topic_path;
pub mod value;

pub use local_bus::*;
pub use topic_path::*;
pub use value::*;

/// Identifies a publisher so subscribers on the same topic can ignore it
pub type PublisherId = u64;

pub const DEFAULT_QUEUE_DEPTH: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Values written by this publisher are never queued for the subscriber
    pub exclude_publisher: Option<PublisherId>,
    /// Maximum number of undrained values; the oldest are dropped first
    pub queue_depth: usize,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            exclude_publisher: None,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl SubscribeOptions {
    pub fn excluding(publisher: PublisherId) -> Self {
        Self {
            exclude_publisher: Some(publisher),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransportError {
    /// The topic already carries a different kind of value
    KindMismatch {
        path: String,
        expected: ValueKind,
        found: ValueKind,
    },
    /// The transport refused to create a handle
    Unavailable { path: String, reason: String },
    /// The handle was already closed
    Closed { path: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KindMismatch {
                path,
                expected,
                found,
            } => write!(
                f,
                "topic '{}' carries {} values, not {}",
                path, found, expected
            ),
            Self::Unavailable { path, reason } => {
                write!(f, "topic '{}' is unavailable: {}", path, reason)
            }
            Self::Closed { path } => {
                write!(f, "handle for topic '{}' is already closed", path)
            }
        }
    }
}

impl Error for TransportError {}

pub trait Transport {
    /// Topic lookup never fails; only handle creation can.
    fn topic(&self, path: &TopicPath) -> Box<dyn Topic>;
}

pub trait Topic {
    fn path(&self) -> &TopicPath;

    fn publish(
        &self,
        kind: ValueKind,
    ) -> Result<Box<dyn Publisher>, TransportError>;

    fn subscribe(
        &self,
        default: Value,
        options: SubscribeOptions,
    ) -> Result<Box<dyn Subscriber>, TransportError>;
}

pub trait Publisher {
    fn id(&self) -> PublisherId;

    /// Fire-and-forget; delivery is never confirmed.
    fn set(&mut self, value: Value);

    fn close(&mut self) -> Result<(), TransportError>;
}

pub trait Subscriber {
    /// Everything received since the previous drain, oldest first. Never
    /// blocks.
    fn drain_queued(&mut self) -> Vec<Value>;

    /// Latest value on the topic, or the subscribe-time default
    fn latest(&self) -> Value;

    fn close(&mut self) -> Result<(), TransportError>;
}
