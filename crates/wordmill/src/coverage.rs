//! Coverage validation of a computed [`Schedule`].
//!
//! Before any worker starts, every assigned interval is grouped by length,
//! sorted, and folded into a single interval. A length class is covered when
//! the fold never finds a gap or an overlap and the merged interval is exactly
//! `[0, space_size - 1]`.

use crate::{AlphabetTable, Assignment, InvariantViolation, Schedule};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::collections::BTreeMap;

/// Assigned `[start, end]` intervals, grouped by length.
#[derive(Clone, Debug, Default)]
pub struct CoverageSet {
    intervals: BTreeMap<usize, Vec<(BigUint, BigUint)>>,
}

/// Summary of a successful validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageReport {
    /// Number of length classes verified.
    pub lengths: usize,
    /// Number of intervals merged across all lengths.
    pub intervals: usize,
    /// Words covered across all lengths.
    pub words: BigUint,
}

impl CoverageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the inclusive interval `[start, end]` for `length`.
    pub fn add(&mut self, length: usize, start: BigUint, end: BigUint) {
        self.intervals.entry(length).or_default().push((start, end));
    }

    pub fn record(&mut self, assignment: &Assignment) {
        self.add(
            assignment.length(),
            assignment.start().clone(),
            assignment.end().clone(),
        );
    }

    /// Merges the intervals of one length into a single `[start, end]`.
    ///
    /// Intervals are sorted by start, ties broken by end, then folded left to
    /// right; each start must be exactly one past the previous end.
    ///
    /// # Errors
    ///
    /// - [`InvariantViolation::Uncovered`] if nothing was recorded for
    ///   `length`.
    /// - [`InvariantViolation::InvalidInterval`] for an interval with
    ///   `end < start`.
    /// - [`InvariantViolation::Gap`] / [`InvariantViolation::Overlap`] when two
    ///   neighbours do not touch exactly.
    pub fn merge(&self, length: usize) -> Result<(BigUint, BigUint), InvariantViolation> {
        let Some(intervals) = self.intervals.get(&length).filter(|v| !v.is_empty()) else {
            return Err(InvariantViolation::Uncovered { length });
        };

        if let Some((start, end)) = intervals.iter().find(|(start, end)| end < start) {
            return Err(InvariantViolation::InvalidInterval {
                length,
                start: start.clone(),
                end: end.clone(),
            });
        }

        let mut sorted: Vec<&(BigUint, BigUint)> = intervals.iter().collect();
        sorted.sort();

        let (first_start, first_end) = sorted[0];
        let mut merged_end = first_end.clone();
        for (start, end) in sorted.into_iter().skip(1) {
            let expected = &merged_end + BigUint::one();
            if *start > expected {
                return Err(InvariantViolation::Gap {
                    length,
                    expected,
                    found: start.clone(),
                });
            }
            if *start < expected {
                return Err(InvariantViolation::Overlap {
                    length,
                    expected,
                    found: start.clone(),
                });
            }
            merged_end = end.clone();
        }

        Ok((first_start.clone(), merged_end))
    }

    /// Checks that the recorded intervals tile every length class of `table`
    /// exactly, and that nothing outside the table was recorded.
    ///
    /// # Errors
    ///
    /// Any [`InvariantViolation`] from [`Self::merge`], plus:
    ///
    /// - [`InvariantViolation::Gap`] if a class does not start at index 0.
    /// - [`InvariantViolation::CountMismatch`] if the merged size differs from
    ///   the class's space size.
    /// - [`InvariantViolation::UnknownLength`] if an interval was recorded for
    ///   a length missing from `table`.
    pub fn verify(&self, table: &AlphabetTable) -> Result<CoverageReport, InvariantViolation> {
        let mut words = BigUint::zero();

        for (length, alphabet) in table.iter() {
            let (start, end) = self.merge(length)?;
            if !start.is_zero() {
                return Err(InvariantViolation::Gap {
                    length,
                    expected: BigUint::zero(),
                    found: start,
                });
            }

            let required = alphabet.space_size(length);
            let covered = end + BigUint::one();
            if covered != required {
                return Err(InvariantViolation::CountMismatch {
                    length,
                    required,
                    covered,
                });
            }
            words += covered;
        }

        if let Some(length) = self
            .intervals
            .keys()
            .copied()
            .find(|length| table.get(*length).is_none())
        {
            return Err(InvariantViolation::UnknownLength { length });
        }

        Ok(CoverageReport {
            lengths: table.len(),
            intervals: self.intervals.values().map(Vec::len).sum(),
            words,
        })
    }
}

impl<'a> FromIterator<&'a Assignment> for CoverageSet {
    fn from_iter<I: IntoIterator<Item = &'a Assignment>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a> Extend<&'a Assignment> for CoverageSet {
    fn extend<I: IntoIterator<Item = &'a Assignment>>(&mut self, iter: I) {
        for assignment in iter {
            self.record(assignment);
        }
    }
}

/// Verifies that `schedule` covers the space of `table` exactly once.
///
/// This is a correctness gate for the scheduler: it runs once, synchronously,
/// before production, and any error means the partition must not be used.
///
/// # Example
/// ```
/// use wordmill::{Alphabet, AlphabetTable, schedule, validate};
///
/// let table = AlphabetTable::try_from_entries([(2, Alphabet::new(["a", "b", "c"]))]).unwrap();
/// let schedule = schedule(&table, 4).unwrap();
/// let report = validate(&table, &schedule).unwrap();
/// assert_eq!(report.words, table.total_space_size());
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
pub fn validate(
    table: &AlphabetTable,
    schedule: &Schedule,
) -> Result<CoverageReport, InvariantViolation> {
    let coverage: CoverageSet = schedule.all_assignments().collect();
    let report = coverage.verify(table)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        lengths = report.lengths,
        intervals = report.intervals,
        words = %report.words,
        "Coverage validated"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Alphabet, schedule};

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    fn ab_table(lengths: &[usize]) -> AlphabetTable {
        AlphabetTable::try_from_entries(
            lengths
                .iter()
                .map(|length| (*length, Alphabet::new(["a", "b"]))),
        )
        .unwrap()
    }

    fn set(intervals: &[(usize, u64, u64)]) -> CoverageSet {
        let mut set = CoverageSet::new();
        for (length, start, end) in intervals {
            set.add(*length, big(*start), big(*end));
        }
        set
    }

    #[test]
    fn accepts_exact_tiling_in_any_order() {
        let table = ab_table(&[2]);
        let report = set(&[(2, 2, 3), (2, 0, 0), (2, 1, 1)]).verify(&table).unwrap();
        assert_eq!(report.lengths, 1);
        assert_eq!(report.intervals, 3);
        assert_eq!(report.words, big(4));
    }

    #[test]
    fn rejects_gap() {
        let table = ab_table(&[2]);
        assert_eq!(
            set(&[(2, 0, 0), (2, 2, 3)]).verify(&table),
            Err(InvariantViolation::Gap {
                length: 2,
                expected: big(1),
                found: big(2)
            })
        );
    }

    #[test]
    fn rejects_overlap() {
        let table = ab_table(&[2]);
        assert_eq!(
            set(&[(2, 0, 2), (2, 2, 3)]).verify(&table),
            Err(InvariantViolation::Overlap {
                length: 2,
                expected: big(3),
                found: big(2)
            })
        );
    }

    #[test]
    fn rejects_duplicate_interval() {
        let table = ab_table(&[1]);
        assert!(matches!(
            set(&[(1, 0, 1), (1, 0, 1)]).verify(&table),
            Err(InvariantViolation::Overlap { .. })
        ));
    }

    #[test]
    fn rejects_missing_head_and_tail() {
        let table = ab_table(&[2]);
        assert_eq!(
            set(&[(2, 1, 3)]).verify(&table),
            Err(InvariantViolation::Gap {
                length: 2,
                expected: big(0),
                found: big(1)
            })
        );
        assert_eq!(
            set(&[(2, 0, 2)]).verify(&table),
            Err(InvariantViolation::CountMismatch {
                length: 2,
                required: big(4),
                covered: big(3)
            })
        );
        assert!(matches!(
            set(&[(2, 0, 4)]).verify(&table),
            Err(InvariantViolation::CountMismatch { .. })
        ));
    }

    #[test]
    fn rejects_inverted_interval() {
        let table = ab_table(&[2]);
        assert_eq!(
            set(&[(2, 0, 1), (2, 3, 2)]).verify(&table),
            Err(InvariantViolation::InvalidInterval {
                length: 2,
                start: big(3),
                end: big(2)
            })
        );
    }

    #[test]
    fn rejects_uncovered_and_unknown_lengths() {
        assert_eq!(
            set(&[(1, 0, 1)]).verify(&ab_table(&[1, 2])),
            Err(InvariantViolation::Uncovered { length: 2 })
        );
        assert_eq!(
            set(&[(1, 0, 1), (7, 0, 0)]).verify(&ab_table(&[1])),
            Err(InvariantViolation::UnknownLength { length: 7 })
        );
    }

    #[test]
    fn validates_scheduler_output() {
        let table = ab_table(&[1, 2]);
        for workers in 1..=10 {
            let schedule = schedule(&table, workers).unwrap();
            let report = validate(&table, &schedule).unwrap();
            assert_eq!(report.words, big(6));
        }
    }
}
