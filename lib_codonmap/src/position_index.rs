use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    index_types::AlignmentColumn,
};

/// Amino acids plus the ambiguity codes `X`, `B`, `Z` and `J`.
pub const AMINO_ACID_ALPHABET: &str = "ACDEFGHIKLMNPQRSTVWYXBZJ";
pub const GAP_SYMBOLS: &str = "-.";

/// What to do with a symbol that is neither in the alphabet nor a gap.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownSymbolPolicy {
    /// Treat the column as a gap.
    #[default]
    Gap,
    /// Fail with [`Error::UnknownSymbol`].
    Reject,
}

/// For every alignment column, the 1-based position of the residue in the ungapped sequence,
/// or `None` if the column is a gap.
///
/// Defined positions strictly increase with the column.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PositionArray {
    positions: Vec<Option<usize>>,
}

impl PositionArray {
    /// Index a gapped sequence.
    ///
    /// Symbols are compared case-insensitively.
    pub fn from_sequence(sequence: &str, policy: UnknownSymbolPolicy) -> Result<Self> {
        let mut real_position = 0;
        let mut positions = Vec::with_capacity(sequence.len());

        for (offset, symbol) in sequence.chars().enumerate() {
            let upper = symbol.to_ascii_uppercase();
            if AMINO_ACID_ALPHABET.contains(upper) {
                real_position += 1;
                positions.push(Some(real_position));
            } else if GAP_SYMBOLS.contains(upper) {
                positions.push(None);
            } else {
                match policy {
                    UnknownSymbolPolicy::Gap => {
                        warn!(
                            "Treating unknown symbol '{symbol}' at column {} as a gap",
                            offset + 1
                        );
                        positions.push(None);
                    }
                    UnknownSymbolPolicy::Reject => {
                        return Err(Error::UnknownSymbol {
                            symbol,
                            column: offset + 1,
                        });
                    }
                }
            }
        }

        Ok(Self { positions })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The position at `column`, or `None` for gaps and columns outside the array.
    pub fn get(&self, column: AlignmentColumn) -> Option<usize> {
        self.positions.get(column.offset()?).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.positions.iter().copied()
    }

    /// Extend with gaps up to `len` columns.
    pub fn pad_to(&mut self, len: usize) {
        if self.positions.len() < len {
            self.positions.resize(len, None);
        }
    }

    /// The last defined position, which equals the ungapped sequence length.
    pub fn last_defined(&self) -> Option<usize> {
        self.positions.iter().rev().find_map(|position| *position)
    }

    /// True if defined positions strictly increase.
    pub fn is_strictly_increasing(&self) -> bool {
        let mut previous = 0;
        for position in self.positions.iter().flatten() {
            if *position <= previous {
                return false;
            }
            previous = *position;
        }
        true
    }
}

impl FromIterator<Option<usize>> for PositionArray {
    fn from_iter<T: IntoIterator<Item = Option<usize>>>(iter: T) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PositionArray, UnknownSymbolPolicy};
    use crate::{error::Error, index_types::AlignmentColumn};

    #[test]
    fn gapped_reference() {
        let positions = PositionArray::from_sequence("A-CD", UnknownSymbolPolicy::Gap).unwrap();
        assert_eq!(
            positions.iter().collect::<Vec<_>>(),
            vec![Some(1), None, Some(2), Some(3)]
        );
        assert_eq!(positions.get(AlignmentColumn::from(2usize)), None);
        assert_eq!(positions.get(AlignmentColumn::from(4usize)), Some(3));
        assert_eq!(positions.get(AlignmentColumn::from(5usize)), None);
        assert_eq!(positions.last_defined(), Some(3));
    }

    #[test]
    fn column_zero_is_undefined() {
        let positions = PositionArray::from_sequence("AC", UnknownSymbolPolicy::Gap).unwrap();
        assert_eq!(AlignmentColumn::from(0usize).offset(), None);
        assert_eq!(positions.get(AlignmentColumn::from(0usize)), None);
        assert_eq!(positions.get(AlignmentColumn::from(1usize)), Some(1));
    }

    #[test]
    fn lower_case_and_ambiguity_codes() {
        let positions = PositionArray::from_sequence("m.xbz-j", UnknownSymbolPolicy::Gap).unwrap();
        assert_eq!(
            positions.iter().collect::<Vec<_>>(),
            vec![Some(1), None, Some(2), Some(3), Some(4), None, Some(5)]
        );
    }

    #[test]
    fn unknown_symbol_as_gap() {
        let positions = PositionArray::from_sequence("A*C", UnknownSymbolPolicy::Gap).unwrap();
        assert_eq!(
            positions.iter().collect::<Vec<_>>(),
            vec![Some(1), None, Some(2)]
        );
    }

    #[test]
    fn unknown_symbol_rejected() {
        let result = PositionArray::from_sequence("A*C", UnknownSymbolPolicy::Reject);
        assert!(matches!(
            result,
            Err(Error::UnknownSymbol {
                symbol: '*',
                column: 2
            })
        ));
    }

    #[test]
    fn all_gaps() {
        let positions = PositionArray::from_sequence("---", UnknownSymbolPolicy::Gap).unwrap();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions.last_defined(), None);
        assert!(positions.is_strictly_increasing());
    }

    #[test]
    fn strictly_increasing() {
        let positions = PositionArray::from_sequence("-AC--DEF-", UnknownSymbolPolicy::Gap).unwrap();
        assert!(positions.is_strictly_increasing());

        let broken: PositionArray = [Some(1), None, Some(1)].into_iter().collect();
        assert!(!broken.is_strictly_increasing());
    }
}
