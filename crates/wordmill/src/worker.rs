use crate::{Assignment, CancelToken, Error, Result};
use crossbeam_channel::{Sender, select};

/// One producer: an ordered list of assignments and the queue they feed.
#[derive(Debug)]
pub struct Worker {
    id: usize,
    queue: usize,
    assignments: Vec<Assignment>,
    sender: Sender<String>,
}

/// Outcome of a worker that ran to completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub queue: usize,
    pub words: u64,
}

impl Worker {
    pub fn new(
        id: usize,
        queue: usize,
        assignments: Vec<Assignment>,
        sender: Sender<String>,
    ) -> Self {
        Self {
            id,
            queue,
            assignments,
            sender,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Index of the queue this worker pushes into.
    pub fn queue(&self) -> usize {
        self.queue
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Encodes every assignment in order and pushes each word into the
    /// queue, blocking while the queue is full.
    ///
    /// Cancellation is checked at every push, including one that is blocked
    /// on a full queue.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] once `cancel` fires.
    /// - [`Error::QueueDisconnected`] if every consumer of the queue was
    ///   dropped.
    /// - [`Error::Encode`] if an assignment lies outside its length class.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(worker = self.id, queue = self.queue))
    )]
    pub fn run(&self, cancel: &CancelToken) -> Result<WorkerReport> {
        #[cfg(feature = "tracing")]
        tracing::debug!(assignments = self.assignments.len(), "Worker started");

        let mut words = 0_u64;
        for assignment in &self.assignments {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                length = assignment.length(),
                start = %assignment.start(),
                end = %assignment.end(),
                "Encoding assignment"
            );

            for word in assignment.words()? {
                self.push(word, cancel)?;
                words += 1;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(words, "Worker finished");

        Ok(WorkerReport {
            worker: self.id,
            queue: self.queue,
            words,
        })
    }

    fn push(&self, word: String, cancel: &CancelToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        // Fast path while the queue has room.
        let word = match self.sender.try_send(word) {
            Ok(()) => return Ok(()),
            Err(crossbeam_channel::TrySendError::Full(word)) => word,
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => {
                return Err(Error::QueueDisconnected { queue: self.queue });
            }
        };

        select! {
            send(self.sender, word) -> res => {
                res.map_err(|_| Error::QueueDisconnected { queue: self.queue })
            }
            recv(cancel.receiver()) -> _ => Err(Error::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Alphabet, WordQueue};
    use num_bigint::BigUint;

    fn assignment(symbols: &[&str], length: usize, start: u32, end: u32) -> Assignment {
        Assignment::new(
            Alphabet::from(symbols),
            length,
            BigUint::from(start),
            BigUint::from(end),
        )
    }

    #[test]
    fn pushes_assignments_in_order() {
        let (sender, queue) = WordQueue::bounded(0, 16);
        let worker = Worker::new(
            4,
            0,
            vec![
                assignment(&["a", "b"], 1, 1, 1),
                assignment(&["a", "b"], 2, 0, 2),
            ],
            sender,
        );

        let report = worker.run(&CancelToken::new()).unwrap();
        assert_eq!(
            report,
            WorkerReport {
                worker: 4,
                queue: 0,
                words: 4
            }
        );
        drop(worker);
        assert_eq!(queue.iter().collect::<Vec<_>>(), ["b", "aa", "ab", "ba"]);
    }

    #[test]
    fn stops_when_cancelled_on_full_queue() {
        let (sender, queue) = WordQueue::bounded(1, 1);
        let worker = Worker::new(0, 1, vec![assignment(&["a", "b"], 3, 0, 7)], sender);
        let cancel = CancelToken::new();

        std::thread::scope(|s| {
            let handle = s.spawn(|| worker.run(&cancel));
            // Capacity 1: the worker blocks again as soon as the queue refills.
            assert_eq!(queue.recv().unwrap(), "aaa");
            std::thread::sleep(std::time::Duration::from_millis(20));
            cancel.cancel();
            assert_eq!(handle.join().unwrap(), Err(Error::Cancelled));
        });
    }

    #[test]
    fn reports_disconnected_queue() {
        let (sender, queue) = WordQueue::bounded(2, 1);
        drop(queue);
        let worker = Worker::new(0, 2, vec![assignment(&["a"], 1, 0, 0)], sender);
        assert_eq!(
            worker.run(&CancelToken::new()),
            Err(Error::QueueDisconnected { queue: 2 })
        );
    }

    #[test]
    fn surfaces_out_of_range_assignment() {
        let (sender, _queue) = WordQueue::bounded(0, 1);
        let worker = Worker::new(0, 0, vec![assignment(&["a", "b"], 1, 0, 5)], sender);
        assert!(matches!(
            worker.run(&CancelToken::new()),
            Err(Error::Encode(_))
        ));
    }
}
