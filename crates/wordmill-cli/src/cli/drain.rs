use super::config::OutputMode;
use std::io::{self, Write};
use tokio::task::JoinSet;
use wordmill::{CancelToken, WordQueue};

/// Bytes buffered per queue before they are written in one locked call.
const BATCH_BYTES: usize = 64 * 1024;

/// Drains one queue until it disconnects, writing words through `lock` in
/// newline-terminated batches so lines from different queues never
/// interleave.
///
/// A write error cancels the whole production before it is returned.
pub fn drain<W, F>(
    queue: WordQueue,
    mode: OutputMode,
    cancel: &CancelToken,
    mut lock: F,
) -> io::Result<u64>
where
    W: Write,
    F: FnMut() -> W,
{
    let mut words = 0_u64;
    let mut batch = String::with_capacity(BATCH_BYTES);

    let mut write = |batch: &mut String| -> io::Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut out = lock();
        out.write_all(batch.as_bytes())?;
        out.flush()?;
        batch.clear();
        Ok(())
    };

    for word in &queue {
        words += 1;
        if mode == OutputMode::CountOnly {
            continue;
        }
        batch.push_str(&word);
        batch.push('\n');
        if batch.len() >= BATCH_BYTES {
            if let Err(e) = write(&mut batch) {
                cancel.cancel();
                return Err(e);
            }
        }
    }

    if let Err(e) = write(&mut batch) {
        cancel.cancel();
        return Err(e);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(queue = queue.index(), words, "Queue drained");
    Ok(words)
}

/// Totals of every drain task.
#[derive(Debug, Default)]
pub struct Drained {
    pub words: u64,
    /// First write error, if any.
    pub error: Option<io::Error>,
}

/// Awaits every drain task. Cancel safe: tasks that already finished are
/// not awaited again if this future is dropped and called anew.
pub async fn collect(
    drains: &mut JoinSet<io::Result<u64>>,
    drained: &mut Drained,
) -> anyhow::Result<()> {
    while let Some(joined) = drains.join_next().await {
        match joined? {
            Ok(words) => drained.words += words,
            Err(e) => {
                drained.error.get_or_insert(e);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};
    use wordmill::{Alphabet, Error, ProducerConfig, WordProducer};

    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn production(capacity: usize, length: usize) -> wordmill::Production {
        let config = ProducerConfig::builder()
            .threads_per_queue(2)
            .queue_capacity(capacity)
            .put_symbols(length, Alphabet::new(["a", "b"]))
            .build()
            .unwrap();
        WordProducer::new(config).unwrap().produce().unwrap()
    }

    #[test]
    fn writes_one_word_per_line() {
        let mut production = production(4, 3);
        let queue = production.take_queues().remove(0);
        let cancel = production.cancel_token();
        let out = Rc::new(RefCell::new(Vec::new()));

        let sink = || Sink(Rc::clone(&out));
        let words = drain(queue, OutputMode::Words, &cancel, sink).unwrap();
        production.wait().unwrap();

        let text = String::from_utf8(out.take()).unwrap();
        let mut lines: Vec<_> = text.lines().collect();
        lines.sort_unstable();
        assert_eq!(words, 8);
        assert_eq!(lines, ["aaa", "aab", "aba", "abb", "baa", "bab", "bba", "bbb"]);
    }

    #[test]
    fn count_only_writes_nothing() {
        let mut production = production(4, 5);
        let queue = production.take_queues().remove(0);
        let cancel = production.cancel_token();
        let out = Rc::new(RefCell::new(Vec::new()));

        let sink = || Sink(Rc::clone(&out));
        let words = drain(queue, OutputMode::CountOnly, &cancel, sink).unwrap();
        assert_eq!(words, 32);
        assert!(out.borrow().is_empty());
        assert_eq!(production.wait().unwrap().words(), 32);
    }

    #[test]
    fn broken_pipe_cancels_production() {
        let mut production = production(1, 20);
        let queue = production.take_queues().remove(0);
        let cancel = production.cancel_token();

        let err = drain(queue, OutputMode::Words, &cancel, || ClosedPipe).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(cancel.is_cancelled());
        assert!(matches!(
            production.wait(),
            Err(Error::Cancelled | Error::QueueDisconnected { .. })
        ));
    }
}
