use crate::{Alphabet, AlphabetTable, ConfigError};

/// Default capacity of each output queue, in words.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// How many workers feed each queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThreadsPerQueue {
    /// `max(1, available_parallelism / number_of_queues)`, resolved when the
    /// configuration is built.
    #[default]
    Auto,
    Fixed(usize),
}

/// Validated, immutable configuration of a [`WordProducer`](crate::WordProducer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProducerConfig {
    table: AlphabetTable,
    number_of_queues: usize,
    threads_per_queue: usize,
    queue_capacity: usize,
}

impl ProducerConfig {
    pub fn builder() -> ProducerConfigBuilder {
        ProducerConfigBuilder::default()
    }

    pub fn table(&self) -> &AlphabetTable {
        &self.table
    }

    pub fn number_of_queues(&self) -> usize {
        self.number_of_queues
    }

    pub fn threads_per_queue(&self) -> usize {
        self.threads_per_queue
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Total number of workers, `number_of_queues * threads_per_queue`.
    pub fn worker_count(&self) -> usize {
        self.number_of_queues * self.threads_per_queue
    }
}

/// Symbols registered for one length or an inclusive range of lengths.
#[derive(Clone, Debug)]
enum SymbolEntry {
    Single(usize, Alphabet),
    Range(usize, usize, Alphabet),
}

/// Builder for [`ProducerConfig`].
///
/// Setters only record values; everything is checked in
/// [`build`](Self::build), so setters may be called in any order.
///
/// # Example
/// ```
/// use wordmill::{Alphabet, ProducerConfig};
///
/// let config = ProducerConfig::builder()
///     .number_of_queues(2)
///     .threads_per_queue(3)
///     .put_symbols(1, Alphabet::new(["a", "b"]))
///     .put_symbols_to_range(2, 4, Alphabet::new(["x", "y", "z"]))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.worker_count(), 6);
/// assert_eq!(config.table().lengths().collect::<Vec<_>>(), [1, 2, 3, 4]);
/// ```
#[derive(Clone, Debug)]
pub struct ProducerConfigBuilder {
    number_of_queues: usize,
    threads_per_queue: ThreadsPerQueue,
    queue_capacity: usize,
    entries: Vec<SymbolEntry>,
}

impl Default for ProducerConfigBuilder {
    fn default() -> Self {
        Self {
            number_of_queues: 1,
            threads_per_queue: ThreadsPerQueue::Auto,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            entries: Vec::new(),
        }
    }
}

impl ProducerConfigBuilder {
    #[must_use]
    pub fn number_of_queues(mut self, queues: usize) -> Self {
        self.number_of_queues = queues;
        self
    }

    #[must_use]
    pub fn threads_per_queue(mut self, threads: usize) -> Self {
        self.threads_per_queue = ThreadsPerQueue::Fixed(threads);
        self
    }

    /// Derives the threads per queue from the number of logical CPUs.
    #[must_use]
    pub fn threads_per_queue_auto(mut self) -> Self {
        self.threads_per_queue = ThreadsPerQueue::Auto;
        self
    }

    #[must_use]
    pub fn threads(mut self, threads: ThreadsPerQueue) -> Self {
        self.threads_per_queue = threads;
        self
    }

    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Registers `alphabet` for words of `length` symbols. A later call for
    /// the same length replaces this one.
    #[must_use]
    pub fn put_symbols(mut self, length: usize, alphabet: impl Into<Alphabet>) -> Self {
        self.entries
            .push(SymbolEntry::Single(length, alphabet.into()));
        self
    }

    /// Registers `alphabet` for every length in `start..=end`.
    #[must_use]
    pub fn put_symbols_to_range(
        mut self,
        start: usize,
        end: usize,
        alphabet: impl Into<Alphabet>,
    ) -> Self {
        self.entries
            .push(SymbolEntry::Range(start, end, alphabet.into()));
        self
    }

    /// Validates every recorded value.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found: zero queues, threads or
    /// capacity, an invalid alphabet entry, an inverted length range, no
    /// alphabet at all, or a worker count that overflows `usize`.
    pub fn build(self) -> Result<ProducerConfig, ConfigError> {
        if self.number_of_queues == 0 {
            return Err(ConfigError::ZeroQueues);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }

        let threads_per_queue = match self.threads_per_queue {
            ThreadsPerQueue::Auto => (num_cpus::get() / self.number_of_queues).max(1),
            ThreadsPerQueue::Fixed(0) => return Err(ConfigError::ZeroThreadsPerQueue),
            ThreadsPerQueue::Fixed(n) => n,
        };
        if self.number_of_queues.checked_mul(threads_per_queue).is_none() {
            return Err(ConfigError::TooManyWorkers {
                queues: self.number_of_queues,
                threads_per_queue,
            });
        }

        let mut table = AlphabetTable::default();
        for entry in self.entries {
            match entry {
                SymbolEntry::Single(length, alphabet) => table.insert(length, alphabet)?,
                SymbolEntry::Range(start, end, alphabet) => {
                    if start > end {
                        return Err(ConfigError::InvertedRange { start, end });
                    }
                    for length in start..=end {
                        table.insert(length, alphabet.clone())?;
                    }
                }
            }
        }
        if table.is_empty() {
            return Err(ConfigError::NoAlphabet);
        }

        Ok(ProducerConfig {
            table,
            number_of_queues: self.number_of_queues,
            threads_per_queue,
            queue_capacity: self.queue_capacity,
        })
    }
}
