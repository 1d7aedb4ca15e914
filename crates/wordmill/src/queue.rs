use crossbeam_channel::{Receiver, Sender, bounded};
use std::time::Duration;

pub use crossbeam_channel::{RecvError, RecvTimeoutError, TryRecvError};

/// Receiving half of one bounded output queue.
///
/// A queue is fed by a fixed group of workers and holds at most
/// [`capacity`](Self::capacity) words; producers block while it is full. Once
/// every worker feeding it has returned, the queue disconnects: buffered words
/// are still delivered, after which [`recv`](Self::recv) fails and
/// [`iter`](Self::iter) ends.
///
/// Cloning yields another consumer handle on the same queue. Each word is
/// delivered to exactly one handle.
#[derive(Clone, Debug)]
pub struct WordQueue {
    index: usize,
    capacity: usize,
    receiver: Receiver<String>,
}

impl WordQueue {
    /// Creates queue `index` and the sender its workers share.
    pub(crate) fn bounded(index: usize, capacity: usize) -> (Sender<String>, Self) {
        let (sender, receiver) = bounded(capacity);
        (
            sender,
            Self {
                index,
                capacity,
                receiver,
            },
        )
    }

    /// Position of this queue in the production's queue list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Words currently buffered.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Blocks until a word is available or the queue is drained and
    /// disconnected.
    pub fn recv(&self) -> Result<String, RecvError> {
        self.receiver.recv()
    }

    pub fn try_recv(&self) -> Result<String, TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<String, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Blocking iterator that ends once the queue is drained and
    /// disconnected.
    pub fn iter(&self) -> crossbeam_channel::Iter<'_, String> {
        self.receiver.iter()
    }
}

impl IntoIterator for WordQueue {
    type Item = String;
    type IntoIter = crossbeam_channel::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.receiver.into_iter()
    }
}

impl<'a> IntoIterator for &'a WordQueue {
    type Item = String;
    type IntoIter = crossbeam_channel::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
