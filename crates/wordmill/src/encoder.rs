//! Index-to-word bijection.
//!
//! Every word of `digit_count` symbols over an alphabet of `base` symbols is a
//! `digit_count`-digit numeral in base `base`. The word's index is the value of
//! that numeral, so index `0` is the first symbol repeated and index
//! `base^digit_count - 1` is the last symbol repeated.

use crate::{Alphabet, EncodeError};
use core::iter::FusedIterator;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

/// Maps `index` to its word of `digit_count` symbols.
///
/// # Errors
///
/// - [`EncodeError::EmptyAlphabet`] if the alphabet has no symbols.
/// - [`EncodeError::IndexOutOfRange`] if `index >= base^digit_count`.
///
/// # Example
/// ```
/// use wordmill::{Alphabet, BigUint, encode};
///
/// let alphabet = Alphabet::new(["a", "b"]);
/// let words: Vec<_> = (0_u32..4)
///     .map(|i| encode(&BigUint::from(i), &alphabet, 2).unwrap())
///     .collect();
/// assert_eq!(words, ["aa", "ab", "ba", "bb"]);
/// ```
pub fn encode(
    index: &BigUint,
    alphabet: &Alphabet,
    digit_count: usize,
) -> Result<String, EncodeError> {
    let digits = to_digits(index, alphabet, digit_count)?;
    Ok(render(alphabet, &digits))
}

/// Evaluates a sequence of symbols as a base-`alphabet.len()` numeral,
/// recovering the index [`encode`] mapped it from.
///
/// Returns `None` if a symbol is not part of the alphabet.
///
/// # Example
/// ```
/// use wordmill::{Alphabet, BigUint, decode};
///
/// let alphabet = Alphabet::new(["a", "b", "c"]);
/// assert_eq!(decode(&["c", "a", "b"], &alphabet), Some(BigUint::from(19_u32)));
/// assert_eq!(decode(&["d"], &alphabet), None);
/// ```
pub fn decode<S: AsRef<str>>(symbols: &[S], alphabet: &Alphabet) -> Option<BigUint> {
    let base = BigUint::from(alphabet.len());
    symbols.iter().try_fold(BigUint::zero(), |acc, symbol| {
        let digit = alphabet.digit_of(symbol.as_ref())?;
        Some(acc * &base + digit)
    })
}

/// Expands `index` into exactly `digit_count` digits, most significant first.
fn to_digits(
    index: &BigUint,
    alphabet: &Alphabet,
    digit_count: usize,
) -> Result<Vec<usize>, EncodeError> {
    if alphabet.is_empty() {
        return Err(EncodeError::EmptyAlphabet);
    }

    let base = BigUint::from(alphabet.len());
    let mut digits = vec![0; digit_count];
    let mut rest = index.clone();
    let mut slot = digit_count;

    while !rest.is_zero() {
        if slot == 0 {
            return Err(EncodeError::IndexOutOfRange {
                index: index.clone(),
                size: alphabet.space_size(digit_count),
            });
        }
        slot -= 1;
        // The remainder is below `base`, which is itself a `usize`.
        digits[slot] = (&rest % &base).to_usize().unwrap_or_default();
        rest /= &base;
    }

    Ok(digits)
}

fn render(alphabet: &Alphabet, digits: &[usize]) -> String {
    let symbols = alphabet.symbols();
    let mut word = String::with_capacity(digits.len() * symbols[0].len().max(1));
    for &digit in digits {
        word.push_str(&symbols[digit]);
    }
    word
}

/// A lazy, forward-only sequence of the words indexed `lower..=upper`.
///
/// Words come out in strictly increasing index order. Only the first word is
/// converted from its big-integer index; every following word is reached by
/// incrementing a digit odometer, so iteration does not pay a big-integer
/// division per word.
///
/// The sequence is finite and cannot be rewound. To restart, or to resume
/// after a partial pass, construct a new [`Words`] from the next index.
///
/// # Example
/// ```
/// use wordmill::{Alphabet, BigUint, Words};
///
/// let alphabet = Alphabet::new(["x", "y", "z"]);
/// let words: Vec<_> = Words::new(alphabet, 2, BigUint::from(2_u32), BigUint::from(4_u32))
///     .unwrap()
///     .collect();
/// assert_eq!(words, ["xz", "yx", "yy"]);
/// ```
#[derive(Clone, Debug)]
pub struct Words {
    alphabet: Alphabet,
    digits: Vec<usize>,
    remaining: BigUint,
}

impl Words {
    /// Creates the sequence for `[lower, upper]`, both inclusive. An inverted
    /// range (`lower > upper`) is an empty sequence.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::EmptyAlphabet`] if the alphabet has no symbols.
    /// - [`EncodeError::IndexOutOfRange`] if `upper >= base^digit_count` for a
    ///   non-empty range.
    pub fn new(
        alphabet: Alphabet,
        digit_count: usize,
        lower: BigUint,
        upper: BigUint,
    ) -> Result<Self, EncodeError> {
        if alphabet.is_empty() {
            return Err(EncodeError::EmptyAlphabet);
        }
        if lower > upper {
            return Ok(Self {
                alphabet,
                digits: Vec::new(),
                remaining: BigUint::zero(),
            });
        }

        let size = alphabet.space_size(digit_count);
        if upper >= size {
            return Err(EncodeError::IndexOutOfRange { index: upper, size });
        }

        let digits = to_digits(&lower, &alphabet, digit_count)?;
        let remaining = upper - lower + 1_u32;
        Ok(Self {
            alphabet,
            digits,
            remaining,
        })
    }

    /// Number of words not yet produced.
    pub fn remaining(&self) -> &BigUint {
        &self.remaining
    }

    fn advance(&mut self) {
        let base = self.alphabet.len();
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < base {
                return;
            }
            *digit = 0;
        }
    }
}

impl Iterator for Words {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining.is_zero() {
            return None;
        }

        let word = render(&self.alphabet, &self.digits);
        self.remaining -= 1_u32;
        if !self.remaining.is_zero() {
            self.advance();
        }
        Some(word)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining.to_usize() {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Words {}
