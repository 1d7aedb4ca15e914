//! Error types for word production.
//!
//! Errors fall into four families:
//!
//! - [`ConfigError`]: rejected user input, reported by
//!   [`ProducerConfigBuilder::build`](crate::ProducerConfigBuilder::build).
//! - [`InvariantViolation`]: the scheduler or coverage validator produced or
//!   found an inconsistent partition. These are defects, never retried.
//! - [`EncodeError`]: direct misuse of [`encode`](crate::encode).
//! - Interruption of a running pipeline: [`Error::Cancelled`],
//!   [`Error::QueueDisconnected`], [`Error::WorkerPanicked`] and
//!   [`Error::Spawn`].

use num_bigint::BigUint;

/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for word production.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The configuration was rejected.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The computed partition is inconsistent. Production never starts on one.
    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    /// The encoder was called outside of its domain.
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Production was cancelled while a worker was running.
    #[error("Production cancelled")]
    Cancelled,

    /// Every receiver of a queue was dropped while workers still had words
    /// to push.
    #[error("Queue {queue} disconnected")]
    QueueDisconnected { queue: usize },

    /// A worker thread panicked.
    #[error("Worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    /// The OS refused to spawn a thread.
    #[error("Failed to spawn thread: {reason}")]
    Spawn { reason: String },
}

/// Invalid user input detected while building a
/// [`ProducerConfig`](crate::ProducerConfig).
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("number of queues must be greater than 0")]
    ZeroQueues,

    #[error("threads per queue must be greater than 0")]
    ZeroThreadsPerQueue,

    #[error("queue capacity must be greater than 0")]
    ZeroQueueCapacity,

    #[error("word length must be greater than 0")]
    ZeroLength,

    #[error("alphabet for length {length} is empty")]
    EmptyAlphabet { length: usize },

    #[error("alphabet for length {length} repeats symbol {symbol:?}")]
    DuplicateSymbol { length: usize, symbol: String },

    #[error("length range {start}..={end} is inverted")]
    InvertedRange { start: usize, end: usize },

    #[error("no alphabet has been registered")]
    NoAlphabet,

    #[error("{queues} queues x {threads_per_queue} threads overflows the worker count")]
    TooManyWorkers {
        queues: usize,
        threads_per_queue: usize,
    },
}

/// A scheduler or validator defect.
///
/// There is no recovery for any of these: the partition they describe is
/// unverified, so production must not start.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvariantViolation {
    #[error("cannot schedule across 0 workers")]
    NoWorkers,

    #[error("{remaining} words left after the main pass, expected fewer than {workers}")]
    RemainderTooLarge { remaining: BigUint, workers: usize },

    #[error("interval [{start}, {end}] for length {length} is inverted")]
    InvalidInterval {
        length: usize,
        start: BigUint,
        end: BigUint,
    },

    #[error("gap in length {length}: expected index {expected}, next interval starts at {found}")]
    Gap {
        length: usize,
        expected: BigUint,
        found: BigUint,
    },

    #[error("overlap in length {length}: expected index {expected}, next interval starts at {found}")]
    Overlap {
        length: usize,
        expected: BigUint,
        found: BigUint,
    },

    #[error("length {length}: required {required} words, covered {covered}")]
    CountMismatch {
        length: usize,
        required: BigUint,
        covered: BigUint,
    },

    #[error("length {length} has no assignment")]
    Uncovered { length: usize },

    #[error("length {length} is assigned but has no alphabet")]
    UnknownLength { length: usize },
}

/// Misuse of the index-to-word encoder.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("cannot encode with an empty alphabet")]
    EmptyAlphabet,

    #[error("index {index} is outside a space of {size} words")]
    IndexOutOfRange { index: BigUint, size: BigUint },
}
