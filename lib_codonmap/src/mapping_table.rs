use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    coordinate_system::CoordinateSystem,
    error::{Error, Result},
    index_types::AlignmentColumn,
    position_index::{PositionArray, UnknownSymbolPolicy},
};

pub mod io;
#[cfg(test)]
mod tests;

/// How to treat aligned sequences of different lengths.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthPolicy {
    /// Fail with [`Error::LengthMismatch`].
    #[default]
    Strict,
    /// Pad shorter sequences with gaps up to the longest one.
    PadShorter,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MappingConfig {
    pub unknown_symbols: UnknownSymbolPolicy,
    pub length_policy: LengthPolicy,
}

/// The position of every alignment column in the reference, the aligned consensus
/// and the original consensus of one participant.
///
/// The table is immutable after construction.
/// Each coordinate system carries a reverse index from position to the first column holding it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CoordinateMappingTable {
    columns: [PositionArray; 3],
    reverse_indices: [HashMap<usize, AlignmentColumn>; 3],
}

/// A mapping table together with the gene region labels of each column.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AnnotatedMappingTable {
    pub mapping: CoordinateMappingTable,
    pub regions: Vec<RegionColumn>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RegionColumn {
    pub name: String,
    pub labels: Vec<Option<String>>,
}

impl CoordinateMappingTable {
    /// Index the three gapped sequences of one participant.
    pub fn build(
        participant: &str,
        reference: &str,
        aligned_consensus: &str,
        original_consensus: &str,
        config: &MappingConfig,
    ) -> Result<Self> {
        let [reference, aligned_consensus, original_consensus] =
            [reference, aligned_consensus, original_consensus].map(|sequence| {
                PositionArray::from_sequence(sequence, config.unknown_symbols).inspect_err(
                    |error| warn!("Cannot index a sequence of participant {participant}: {error}"),
                )
            });
        let mut columns = [reference?, aligned_consensus?, original_consensus?];

        let lengths = columns.each_ref().map(PositionArray::len);
        if lengths.iter().any(|length| *length != lengths[0]) {
            match config.length_policy {
                LengthPolicy::Strict => {
                    return Err(Error::LengthMismatch {
                        participant: participant.to_string(),
                        reference: lengths[0],
                        aligned_consensus: lengths[1],
                        original_consensus: lengths[2],
                    });
                }
                LengthPolicy::PadShorter => {
                    let length = lengths.iter().copied().max().unwrap_or(0);
                    warn!(
                        "Padding sequences of participant {participant} with lengths {lengths:?} to {length} columns"
                    );
                    columns.iter_mut().for_each(|column| column.pad_to(length));
                }
            }
        }

        let table = Self::from_position_arrays(columns);
        debug!(
            "Built mapping table for {participant} with {} columns",
            table.len()
        );
        Ok(table)
    }

    /// Assemble a table from position arrays of equal length in the order
    /// reference, aligned consensus, original consensus.
    pub fn from_position_arrays(columns: [PositionArray; 3]) -> Self {
        let reverse_indices = columns.each_ref().map(|column| {
            let mut index = HashMap::new();
            for (offset, position) in column.iter().enumerate() {
                if let Some(position) = position {
                    index
                        .entry(position)
                        .or_insert(AlignmentColumn::from_offset(offset));
                }
            }
            index
        });

        Self {
            columns,
            reverse_indices,
        }
    }

    /// The number of alignment columns.
    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn alignment_columns(&self) -> impl Iterator<Item = AlignmentColumn> + use<> {
        (0..self.len()).map(AlignmentColumn::from_offset)
    }

    pub fn positions(&self, system: CoordinateSystem) -> &PositionArray {
        &self.columns[system_index(system)]
    }

    /// The position of `column` in `system`, or `None` if it is a gap there.
    pub fn get(&self, system: CoordinateSystem, column: AlignmentColumn) -> Option<usize> {
        self.positions(system).get(column)
    }

    /// The first alignment column whose `system` position equals `position`.
    pub fn column_of(&self, system: CoordinateSystem, position: usize) -> Option<AlignmentColumn> {
        self.reverse_indices[system_index(system)]
            .get(&position)
            .copied()
    }

    pub fn last_defined(&self, system: CoordinateSystem) -> Option<usize> {
        self.positions(system).last_defined()
    }
}

impl AnnotatedMappingTable {
    pub fn region(&self, name: &str) -> Option<&RegionColumn> {
        self.regions.iter().find(|region| region.name == name)
    }

    /// Keep only the region columns named in `names`, in that order.
    ///
    /// Names without a column get an unlabelled one.
    /// Returns the names that had no column.
    pub fn select_regions(&mut self, names: &[String]) -> Vec<String> {
        let mut available = std::mem::take(&mut self.regions);
        let mut missing = Vec::new();

        for name in names {
            match available.iter().position(|region| &region.name == name) {
                Some(index) => self.regions.push(available.swap_remove(index)),
                None => {
                    debug!("Mapping table has no region column {name}");
                    missing.push(name.clone());
                    self.regions.push(RegionColumn {
                        name: name.clone(),
                        labels: vec![None; self.mapping.len()],
                    });
                }
            }
        }

        missing
    }
}

impl RegionColumn {
    pub fn label(&self, column: AlignmentColumn) -> Option<&str> {
        self.labels.get(column.offset()?)?.as_deref()
    }
}

impl From<CoordinateMappingTable> for AnnotatedMappingTable {
    fn from(mapping: CoordinateMappingTable) -> Self {
        Self {
            mapping,
            regions: Vec::new(),
        }
    }
}

fn system_index(system: CoordinateSystem) -> usize {
    match system {
        CoordinateSystem::Reference => 0,
        CoordinateSystem::AlignedConsensus => 1,
        CoordinateSystem::OriginalConsensus => 2,
    }
}
