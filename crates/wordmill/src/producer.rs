//! Orchestration of a full production run.
//!
//! [`WordProducer`] owns a validated schedule. [`WordProducer::produce`] turns
//! it into running worker threads and hands back a [`Production`], through
//! which consumers drain the queues, observe completion and cancel.

use crate::{
    CancelToken, CoverageReport, Error, ProducerConfig, Result, Schedule, WordQueue, Worker,
    WorkerReport, schedule, validate,
};
use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use portable_atomic::{AtomicBool, Ordering};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

/// A configured producer whose schedule has been computed and validated.
///
/// # Example
/// ```
/// use wordmill::{Alphabet, ProducerConfig, WordProducer};
///
/// let config = ProducerConfig::builder()
///     .number_of_queues(2)
///     .threads_per_queue(2)
///     .put_symbols(2, Alphabet::new(["a", "b", "c"]))
///     .build()
///     .unwrap();
///
/// let mut production = WordProducer::new(config).unwrap().produce().unwrap();
/// let mut words: Vec<String> = production
///     .take_queues()
///     .into_iter()
///     .flat_map(|queue| queue.into_iter())
///     .collect();
/// let report = production.wait().unwrap();
///
/// words.sort();
/// assert_eq!(words.len(), 9);
/// assert_eq!(report.words(), 9);
/// assert_eq!(words[0], "aa");
/// ```
#[derive(Clone, Debug)]
pub struct WordProducer {
    config: ProducerConfig,
    schedule: Schedule,
    coverage: CoverageReport,
}

impl WordProducer {
    /// Schedules the configured space across all workers and validates the
    /// result. Nothing is started.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invariant`] if the schedule fails validation.
    pub fn new(config: ProducerConfig) -> Result<Self> {
        let schedule = schedule(config.table(), config.worker_count())?;
        let coverage = validate(config.table(), &schedule)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            queues = config.number_of_queues(),
            threads_per_queue = config.threads_per_queue(),
            words = %coverage.words,
            "Producer ready"
        );

        Ok(Self {
            config,
            schedule,
            coverage,
        })
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    /// The validated schedule; worker `w` feeds queue
    /// `w / threads_per_queue`.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn coverage(&self) -> &CoverageReport {
        &self.coverage
    }

    /// Creates the queues and starts one thread per worker, plus a supervisor
    /// thread that records completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if a thread cannot be started. Workers
    /// started before the failure are cancelled.
    pub fn produce(self) -> Result<Production> {
        let threads_per_queue = self.config.threads_per_queue();
        let capacity = self.config.queue_capacity();

        let (senders, queues): (Vec<_>, Vec<_>) = (0..self.config.number_of_queues())
            .map(|index| WordQueue::bounded(index, capacity))
            .unzip();

        let cancel = CancelToken::new();
        let mut handles = Vec::with_capacity(self.config.worker_count());
        for (id, assignments) in self.schedule.into_workers().into_iter().enumerate() {
            let queue = id / threads_per_queue;
            let worker = Worker::new(id, queue, assignments, senders[queue].clone());
            let token = cancel.clone();
            let spawned = thread::Builder::new()
                .name(format!("wordmill-worker-{id}"))
                .spawn(move || worker.run(&token));

            match spawned {
                Ok(handle) => handles.push((id, handle)),
                Err(e) => {
                    cancel.cancel();
                    return Err(Error::Spawn {
                        reason: e.to_string(),
                    });
                }
            }
        }
        // Workers now hold the only senders.
        drop(senders);

        let completed = Arc::new(AtomicBool::new(false));
        let (done_tx, done) = bounded::<()>(0);
        let flag = Arc::clone(&completed);
        let supervisor = thread::Builder::new()
            .name("wordmill-supervisor".to_owned())
            .spawn(move || {
                let report = supervise(handles);
                flag.store(true, Ordering::Release);
                drop(done_tx);
                report
            });
        let supervisor = match supervisor {
            Ok(handle) => handle,
            Err(e) => {
                cancel.cancel();
                return Err(Error::Spawn {
                    reason: e.to_string(),
                });
            }
        };

        Ok(Production {
            queues,
            cancel,
            completed,
            done,
            supervisor,
        })
    }
}

/// Joins every worker, then reduces their outcomes.
///
/// Any error other than [`Error::Cancelled`] wins, lowest worker id first.
/// Cancellation is only reported when no worker failed otherwise.
fn supervise(
    handles: Vec<(usize, JoinHandle<Result<WorkerReport>>)>,
) -> Result<ProductionReport> {
    let mut workers = Vec::with_capacity(handles.len());
    let mut cancelled = false;
    let mut failure = None;

    for (id, handle) in handles {
        match handle.join() {
            Ok(Ok(report)) => workers.push(report),
            Ok(Err(Error::Cancelled)) => cancelled = true,
            Ok(Err(e)) => {
                #[cfg(feature = "tracing")]
                tracing::error!(worker = id, error = %e, "Worker failed");
                failure.get_or_insert(e);
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::error!(worker = id, "Worker panicked");
                failure.get_or_insert(Error::WorkerPanicked { worker: id });
            }
        }
    }

    if let Some(e) = failure {
        return Err(e);
    }
    if cancelled {
        return Err(Error::Cancelled);
    }

    let report = ProductionReport { workers };
    #[cfg(feature = "tracing")]
    tracing::info!(words = report.words(), "Production complete");
    Ok(report)
}

/// Per-worker outcome of a completed production.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductionReport {
    pub workers: Vec<WorkerReport>,
}

impl ProductionReport {
    /// Words pushed across all workers.
    pub fn words(&self) -> u64 {
        self.workers.iter().map(|report| report.words).sum()
    }
}

/// Handle on a running production.
///
/// Dropping the handle does not stop the workers. They keep producing as long
/// as some consumer still holds a queue, and stop with
/// [`Error::QueueDisconnected`] once none does.
#[derive(Debug)]
pub struct Production {
    queues: Vec<WordQueue>,
    cancel: CancelToken,
    completed: Arc<AtomicBool>,
    done: Receiver<()>,
    supervisor: JoinHandle<Result<ProductionReport>>,
}

impl Production {
    /// The output queues, indexed by queue number. Empty after
    /// [`take_queues`](Self::take_queues).
    pub fn queues(&self) -> &[WordQueue] {
        &self.queues
    }

    /// Moves the output queues out of the handle, e.g. to drain them on other
    /// threads.
    pub fn take_queues(&mut self) -> Vec<WordQueue> {
        std::mem::take(&mut self.queues)
    }

    /// `true` once every worker has returned, successfully or not.
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Asks every worker to stop at its next push.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A handle that cancels this production from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Blocks for up to `timeout` until every worker has returned. Returns
    /// whether production has completed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.done.recv_timeout(timeout) {
            Err(RecvTimeoutError::Disconnected) => true,
            _ => self.is_completed(),
        }
    }

    /// Blocks until every worker has returned.
    ///
    /// Queues still held by this handle are dropped first, so workers whose
    /// words nobody else consumes stop with [`Error::QueueDisconnected`]
    /// instead of blocking forever.
    ///
    /// # Errors
    ///
    /// The first worker failure: [`Error::QueueDisconnected`],
    /// [`Error::WorkerPanicked`], [`Error::Encode`], or [`Error::Cancelled`]
    /// if production was cancelled.
    pub fn wait(mut self) -> Result<ProductionReport> {
        self.queues.clear();
        match self.supervisor.join() {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}
