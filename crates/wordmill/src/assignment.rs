use crate::{Alphabet, EncodeError, Words};
use num_bigint::BigUint;

/// A contiguous, inclusive index range `[start, end]` of one length class,
/// handed to one worker.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Assignment {
    #[cfg_attr(feature = "serde", serde(skip))]
    alphabet: Alphabet,
    length: usize,
    #[cfg_attr(feature = "serde", serde(serialize_with = "as_decimal"))]
    start: BigUint,
    #[cfg_attr(feature = "serde", serde(serialize_with = "as_decimal"))]
    end: BigUint,
}

impl Assignment {
    pub fn new(alphabet: Alphabet, length: usize, start: BigUint, end: BigUint) -> Self {
        Self {
            alphabet,
            length,
            start,
            end,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Word length in symbols.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn start(&self) -> &BigUint {
        &self.start
    }

    pub fn end(&self) -> &BigUint {
        &self.end
    }

    /// Number of words in the range, `end - start + 1`, or zero for an
    /// inverted range.
    pub fn word_count(&self) -> BigUint {
        if self.end < self.start {
            return BigUint::default();
        }
        &self.end - &self.start + 1_u32
    }

    /// A fresh lazy sequence over this assignment's words.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if the range does not fit the length class.
    pub fn words(&self) -> Result<Words, EncodeError> {
        Words::new(
            self.alphabet.clone(),
            self.length,
            self.start.clone(),
            self.end.clone(),
        )
    }
}

#[cfg(feature = "serde")]
fn as_decimal<S: serde::Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_follow_the_range() {
        let assignment = Assignment::new(
            Alphabet::new(["a", "b"]),
            2,
            BigUint::from(1_u32),
            BigUint::from(2_u32),
        );
        assert_eq!(assignment.word_count(), BigUint::from(2_u32));
        let words: Vec<_> = assignment.words().unwrap().collect();
        assert_eq!(words, ["ab", "ba"]);
    }

    #[test]
    fn single_index_range_counts_one_word() {
        let assignment = Assignment::new(
            Alphabet::new(["x"]),
            1,
            BigUint::default(),
            BigUint::default(),
        );
        assert_eq!(assignment.word_count(), BigUint::from(1_u32));
    }

    #[test]
    fn inverted_range_counts_zero_words() {
        let assignment = Assignment::new(
            Alphabet::new(["x", "y"]),
            1,
            BigUint::from(1_u32),
            BigUint::default(),
        );
        assert_eq!(assignment.word_count(), BigUint::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_bounds_as_decimal_strings() {
        let assignment = Assignment::new(
            Alphabet::new(["a"]),
            3,
            BigUint::from(10_u32),
            BigUint::from(u128::MAX),
        );
        let json = serde_json::to_value(&assignment).unwrap();
        assert_eq!(json["length"], 3);
        assert_eq!(json["start"], "10");
        assert_eq!(json["end"], u128::MAX.to_string());
    }
}
