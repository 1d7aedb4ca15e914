//! Work partitioning across a fixed number of workers.
//!
//! The whole combinatorial space is laid out as one sequence: every index of
//! the shortest length class, then every index of the next one, and so on. The
//! scheduler cuts that sequence into contiguous runs so that each worker
//! receives `total / workers` words, crossing length-class boundaries when a
//! worker's quota spans them. The `total % workers` words left over are then
//! handed out one index at a time to workers `0, 1, 2, ...`.

use crate::{Alphabet, AlphabetTable, Assignment, InvariantViolation};
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Per-worker assignment lists produced by [`schedule`].
///
/// Worker `i`'s assignments are in the order it must process them. A worker
/// may have no assignments at all when the space holds fewer words than there
/// are workers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Schedule {
    workers: Vec<Vec<Assignment>>,
}

impl Schedule {
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Assignments of one worker, empty if `worker` is out of range.
    pub fn assignments(&self, worker: usize) -> &[Assignment] {
        self.workers.get(worker).map(Vec::as_slice).unwrap_or_default()
    }

    /// `(worker, assignments)` pairs in worker order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Assignment])> + '_ {
        self.workers.iter().map(Vec::as_slice).enumerate()
    }

    /// Every assignment of every worker.
    pub fn all_assignments(&self) -> impl Iterator<Item = &Assignment> + '_ {
        self.workers.iter().flatten()
    }

    /// Words assigned to one worker.
    pub fn word_count(&self, worker: usize) -> BigUint {
        self.assignments(worker)
            .iter()
            .map(Assignment::word_count)
            .sum()
    }

    /// Words assigned across all workers.
    pub fn total_word_count(&self) -> BigUint {
        self.all_assignments().map(Assignment::word_count).sum()
    }

    pub(crate) fn into_workers(self) -> Vec<Vec<Assignment>> {
        self.workers
    }
}

/// Read position over the length classes, in ascending length order.
struct Cursor<'a> {
    classes: Vec<(usize, &'a Alphabet, BigUint)>,
    class: usize,
    position: BigUint,
}

impl<'a> Cursor<'a> {
    fn new(table: &'a AlphabetTable) -> Self {
        Self {
            classes: table
                .iter()
                .map(|(length, alphabet)| (length, alphabet, alphabet.space_size(length)))
                .collect(),
            class: 0,
            position: BigUint::zero(),
        }
    }

    fn current(&self) -> Option<&(usize, &'a Alphabet, BigUint)> {
        self.classes.get(self.class)
    }

    /// Cuts `[position, position + count - 1]` out of the current class.
    fn take(&mut self, count: &BigUint) -> Assignment {
        let (length, alphabet, _) = &self.classes[self.class];
        let start = self.position.clone();
        let end = &start + count - BigUint::one();
        let assignment = Assignment::new((*alphabet).clone(), *length, start, end);
        self.position += count;
        assignment
    }

    fn next_class(&mut self) {
        self.class += 1;
        self.position = BigUint::zero();
    }

    /// Words not yet handed out, from the cursor to the end of the last class.
    fn remaining(&self) -> BigUint {
        self.classes
            .iter()
            .skip(self.class)
            .map(|(_, _, size)| size)
            .sum::<BigUint>()
            - &self.position
    }
}

/// Partitions the space described by `table` across `workers` workers.
///
/// Each worker receives `floor(total / workers)` or one more word, where
/// `total` is [`AlphabetTable::total_space_size`]. The union of all
/// assignments of a length class is exactly that class's index space, without
/// overlap. The result is deterministic for a given table and worker count.
///
/// # Errors
///
/// Both cases are scheduler defects rather than user errors:
///
/// - [`InvariantViolation::NoWorkers`] if `workers == 0`.
/// - [`InvariantViolation::RemainderTooLarge`] if the main pass leaves
///   `workers` words or more unassigned.
///
/// # Example
/// ```
/// use wordmill::{Alphabet, AlphabetTable, BigUint, schedule};
///
/// let ab = Alphabet::new(["a", "b"]);
/// let table = AlphabetTable::try_from_entries([(1, ab.clone()), (2, ab)]).unwrap();
/// let schedule = schedule(&table, 3).unwrap();
///
/// // Worker 0 takes all of length 1, workers 1 and 2 split length 2.
/// let first = &schedule.assignments(0)[0];
/// assert_eq!((first.length(), first.end()), (1, &BigUint::from(1_u32)));
/// assert_eq!(schedule.assignments(2)[0].start(), &BigUint::from(2_u32));
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(table)))]
pub fn schedule(table: &AlphabetTable, workers: usize) -> Result<Schedule, InvariantViolation> {
    if workers == 0 {
        return Err(InvariantViolation::NoWorkers);
    }

    let total = table.total_space_size();
    let words_per_worker = &total / workers;
    let mut plan = vec![Vec::new(); workers];
    let mut cursor = Cursor::new(table);

    #[cfg(feature = "tracing")]
    tracing::debug!(%total, %words_per_worker, "Partitioning word space");

    // Main pass. With fewer words than workers the quota is zero and the
    // remainder pass alone covers the space.
    if !words_per_worker.is_zero() {
        let mut worker = 0;
        let mut filled = BigUint::zero();

        while worker < workers {
            let Some((_, _, size)) = cursor.current() else {
                break;
            };
            let span = size - &cursor.position;
            let quota = &words_per_worker - &filled;

            if span > quota {
                plan[worker].push(cursor.take(&quota));
                filled = BigUint::zero();
                worker += 1;
            } else {
                plan[worker].push(cursor.take(&span));
                cursor.next_class();
                filled += span;
                if filled == words_per_worker {
                    filled = BigUint::zero();
                    worker += 1;
                }
            }
        }
    }

    let remaining = cursor.remaining();
    if remaining >= BigUint::from(workers) {
        return Err(InvariantViolation::RemainderTooLarge { remaining, workers });
    }

    // Remainder pass: one index per worker, walking through the tail of the
    // current class and every class after it.
    let single = BigUint::one();
    let mut worker = 0;
    while let Some((_, _, size)) = cursor.current() {
        if cursor.position < *size {
            plan[worker].push(cursor.take(&single));
            worker += 1;
        } else {
            cursor.next_class();
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(remainder = worker, "Schedule computed");

    Ok(Schedule { workers: plan })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    fn table(entries: &[(usize, &[&str])]) -> AlphabetTable {
        AlphabetTable::try_from_entries(
            entries
                .iter()
                .map(|(length, symbols)| (*length, Alphabet::from(*symbols))),
        )
        .unwrap()
    }

    fn ranges(schedule: &Schedule, worker: usize) -> Vec<(usize, u64, u64)> {
        use num_traits::ToPrimitive;
        schedule
            .assignments(worker)
            .iter()
            .map(|a| {
                (
                    a.length(),
                    a.start().to_u64().unwrap(),
                    a.end().to_u64().unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn single_worker_takes_everything() {
        let table = table(&[(1, &["a", "b"]), (3, &["x", "y"])]);
        let schedule = schedule(&table, 1).unwrap();
        assert_eq!(ranges(&schedule, 0), vec![(1, 0, 1), (3, 0, 7)]);
    }

    #[test]
    fn crosses_length_class_boundaries() {
        let table = table(&[(1, &["a", "b"]), (2, &["a", "b"])]);
        let schedule = schedule(&table, 3).unwrap();

        assert_eq!(schedule.worker_count(), 3);
        assert_eq!(ranges(&schedule, 0), vec![(1, 0, 1)]);
        assert_eq!(ranges(&schedule, 1), vec![(2, 0, 1)]);
        assert_eq!(ranges(&schedule, 2), vec![(2, 2, 3)]);
    }

    #[test]
    fn one_worker_spans_several_classes() {
        // 1 + 1 + 8 = 10 words over 2 workers: worker 0 takes lengths 1 and
        // 2 plus the first three indices of length 3.
        let table = table(&[(1, &["a"]), (2, &["a"]), (3, &["a", "b"])]);
        let schedule = schedule(&table, 2).unwrap();
        assert_eq!(ranges(&schedule, 0), vec![(1, 0, 0), (2, 0, 0), (3, 0, 2)]);
        assert_eq!(ranges(&schedule, 1), vec![(3, 3, 7)]);
    }

    #[test]
    fn remainder_goes_to_leading_workers() {
        // 10 words over 4 workers: quota 2, remainder 2.
        let table = table(&[(1, &["a", "b"]), (3, &["a", "b"])]);
        let schedule = schedule(&table, 4).unwrap();

        assert_eq!(ranges(&schedule, 0), vec![(1, 0, 1), (3, 6, 6)]);
        assert_eq!(ranges(&schedule, 1), vec![(3, 0, 1), (3, 7, 7)]);
        assert_eq!(ranges(&schedule, 2), vec![(3, 2, 3)]);
        assert_eq!(ranges(&schedule, 3), vec![(3, 4, 5)]);
    }

    #[test]
    fn fewer_words_than_workers() {
        let table = table(&[(1, &["a", "b"])]);
        let schedule = schedule(&table, 5).unwrap();

        assert_eq!(ranges(&schedule, 0), vec![(1, 0, 0)]);
        assert_eq!(ranges(&schedule, 1), vec![(1, 1, 1)]);
        for worker in 2..5 {
            assert!(schedule.assignments(worker).is_empty());
        }
        assert_eq!(schedule.total_word_count(), big(2));
    }

    #[test]
    fn remainder_spans_several_classes() {
        // Five single-word classes over 3 workers: quota 1, remainder 2 taken
        // from lengths 4 and 5.
        let table = table(&[
            (1, &["a"]),
            (2, &["a"]),
            (3, &["a"]),
            (4, &["a"]),
            (5, &["a"]),
        ]);
        let schedule = schedule(&table, 3).unwrap();

        assert_eq!(ranges(&schedule, 0), vec![(1, 0, 0), (4, 0, 0)]);
        assert_eq!(ranges(&schedule, 1), vec![(2, 0, 0), (5, 0, 0)]);
        assert_eq!(ranges(&schedule, 2), vec![(3, 0, 0)]);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let table = table(&[(1, &["a"])]);
        assert_eq!(schedule(&table, 0), Err(InvariantViolation::NoWorkers));
    }

    #[test]
    fn balances_huge_spaces() {
        let symbols: Vec<String> = (33_u8..127).map(|b| char::from(b).to_string()).collect();
        let table = AlphabetTable::try_from_entries(
            (20..=24).map(|length| (length, Alphabet::from(symbols.clone()))),
        )
        .unwrap();
        let workers = 7;
        let schedule = schedule(&table, workers).unwrap();

        let total = table.total_space_size();
        let floor = &total / workers;
        assert!(total > BigUint::from(u128::MAX));
        assert_eq!(schedule.total_word_count(), total);
        for worker in 0..workers {
            let count = schedule.word_count(worker);
            assert!(count == floor || count == &floor + 1_u32);
        }
    }
}
