use crate::ConfigError;
use num_bigint::BigUint;
use num_traits::{Pow, Zero};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// An ordered list of symbols used to build words of one length class.
///
/// A symbol may span several characters; word length always counts symbols.
/// The list is shared behind an [`Arc`], so cloning an [`Alphabet`] into every
/// [`Assignment`](crate::Assignment) that uses it is cheap.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Alphabet {
    symbols: Arc<[String]>,
}

impl Alphabet {
    /// Creates an alphabet from symbols in digit order: the first symbol is
    /// digit `0`.
    ///
    /// No validation happens here. Empty alphabets and repeated symbols are
    /// rejected when the alphabet is registered through
    /// [`ProducerConfigBuilder`](crate::ProducerConfigBuilder) or
    /// [`AlphabetTable::try_from_entries`].
    ///
    /// # Example
    /// ```
    /// use wordmill::Alphabet;
    ///
    /// let alphabet = Alphabet::new(["a", "b", "ch"]);
    /// assert_eq!(alphabet.len(), 3);
    /// assert_eq!(alphabet.symbol(2), Some("ch"));
    /// ```
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of symbols, which is also the radix used by the encoder.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Returns the symbol for `digit`, if it is in range.
    pub fn symbol(&self, digit: usize) -> Option<&str> {
        self.symbols.get(digit).map(String::as_str)
    }

    /// Returns the digit value of `symbol`, if it belongs to this alphabet.
    pub fn digit_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Number of distinct words of `length` symbols: `len() ^ length`.
    ///
    /// # Example
    /// ```
    /// use wordmill::{Alphabet, BigUint};
    ///
    /// let alphabet = Alphabet::new(["0", "1"]);
    /// assert_eq!(alphabet.space_size(10), BigUint::from(1024_u32));
    /// ```
    pub fn space_size(&self, length: usize) -> BigUint {
        Pow::pow(&BigUint::from(self.symbols.len()), length)
    }

    /// Checks that the alphabet can be registered for `length`.
    pub(crate) fn check(&self, length: usize) -> Result<(), ConfigError> {
        if length == 0 {
            return Err(ConfigError::ZeroLength);
        }
        if self.is_empty() {
            return Err(ConfigError::EmptyAlphabet { length });
        }

        let mut seen = HashSet::with_capacity(self.symbols.len());
        for symbol in self.symbols.iter() {
            if !seen.insert(symbol.as_str()) {
                return Err(ConfigError::DuplicateSymbol {
                    length,
                    symbol: symbol.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for Alphabet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<String>> for Alphabet {
    fn from(symbols: Vec<String>) -> Self {
        Self {
            symbols: symbols.into(),
        }
    }
}

impl From<&[&str]> for Alphabet {
    fn from(symbols: &[&str]) -> Self {
        Self::new(symbols.iter().copied())
    }
}

/// Mapping from word length to the alphabet used at that length.
///
/// Backed by a [`BTreeMap`], so every iteration is in ascending length order.
/// The scheduler depends on that order to produce a deterministic partition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AlphabetTable {
    entries: BTreeMap<usize, Alphabet>,
}

impl AlphabetTable {
    /// Builds a table from `(length, alphabet)` pairs, validating every entry.
    ///
    /// A later pair for the same length replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a length is zero, an alphabet is empty or
    /// repeats a symbol, or no pair was given at all.
    pub fn try_from_entries<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (usize, Alphabet)>,
    {
        let mut table = Self::default();
        for (length, alphabet) in entries {
            table.insert(length, alphabet)?;
        }
        if table.is_empty() {
            return Err(ConfigError::NoAlphabet);
        }
        Ok(table)
    }

    pub(crate) fn insert(&mut self, length: usize, alphabet: Alphabet) -> Result<(), ConfigError> {
        alphabet.check(length)?;
        self.entries.insert(length, alphabet);
        Ok(())
    }

    pub fn get(&self, length: usize) -> Option<&Alphabet> {
        self.entries.get(&length)
    }

    /// Registered lengths in ascending order.
    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    /// `(length, alphabet)` pairs in ascending length order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Alphabet)> + '_ {
        self.entries.iter().map(|(length, alphabet)| (*length, alphabet))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of one length class, or `None` if the length is not registered.
    pub fn space_size(&self, length: usize) -> Option<BigUint> {
        self.get(length).map(|alphabet| alphabet.space_size(length))
    }

    /// Sum of every length class's space size.
    pub fn total_space_size(&self) -> BigUint {
        self.iter()
            .fold(BigUint::zero(), |acc, (length, alphabet)| {
                acc + alphabet.space_size(length)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_size_counts_symbols_not_characters() {
        let alphabet = Alphabet::new(["ab", "cd", "e"]);
        assert_eq!(alphabet.space_size(2), BigUint::from(9_u32));
        assert_eq!(alphabet.space_size(0), BigUint::from(1_u32));
    }

    #[test]
    fn space_size_exceeds_native_width() {
        let alphabet = Alphabet::new((0..62).map(|i| i.to_string()));
        let size = alphabet.space_size(30);
        assert!(size > BigUint::from(u128::MAX));
        assert_eq!(size, Pow::pow(BigUint::from(62_u32), 30_u32));
    }

    #[test]
    fn table_iterates_in_ascending_length_order() {
        let table = AlphabetTable::try_from_entries([
            (5, Alphabet::new(["x"])),
            (1, Alphabet::new(["a", "b"])),
            (3, Alphabet::new(["q", "r", "s"])),
        ])
        .unwrap();

        assert_eq!(table.lengths().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(table.total_space_size(), BigUint::from(2_u32 + 27 + 1));
        assert_eq!(table.space_size(3), Some(BigUint::from(27_u32)));
        assert_eq!(table.space_size(2), None);
    }

    #[test]
    fn later_entry_replaces_earlier_one() {
        let table = AlphabetTable::try_from_entries([
            (2, Alphabet::new(["a"])),
            (2, Alphabet::new(["a", "b", "c"])),
        ])
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(2).map(Alphabet::len), Some(3));
    }

    #[test]
    fn rejects_invalid_entries() {
        assert_eq!(
            AlphabetTable::try_from_entries([(0, Alphabet::new(["a"]))]),
            Err(ConfigError::ZeroLength)
        );
        assert_eq!(
            AlphabetTable::try_from_entries([(4, Alphabet::new(Vec::<String>::new()))]),
            Err(ConfigError::EmptyAlphabet { length: 4 })
        );
        assert_eq!(
            AlphabetTable::try_from_entries([(1, Alphabet::new(["a", "b", "a"]))]),
            Err(ConfigError::DuplicateSymbol {
                length: 1,
                symbol: "a".to_string()
            })
        );
        assert_eq!(
            AlphabetTable::try_from_entries(Vec::<(usize, Alphabet)>::new()),
            Err(ConfigError::NoAlphabet)
        );
    }

    #[test]
    fn digit_lookup_matches_symbol_order() {
        let alphabet = Alphabet::from(&["x", "yy", "z"][..]);
        assert_eq!(alphabet.digit_of("yy"), Some(1));
        assert_eq!(alphabet.digit_of("y"), None);
        assert_eq!(alphabet.symbol(3), None);
    }
}
