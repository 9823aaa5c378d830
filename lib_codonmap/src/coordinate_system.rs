use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// One of the three numberings stored in a [`CoordinateMappingTable`](crate::mapping_table::CoordinateMappingTable).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSystem {
    /// The shared reference numbering (HXB2).
    Reference,
    /// The participant consensus after being aligned jointly with the reference.
    AlignedConsensus,
    /// The participant consensus before alignment to the reference.
    OriginalConsensus,
}

impl CoordinateSystem {
    pub const ALL: [Self; 3] = [
        Self::Reference,
        Self::AlignedConsensus,
        Self::OriginalConsensus,
    ];

    /// The column header used when persisting mapping tables.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Reference => "Reference",
            Self::AlignedConsensus => "AlignedConsensus",
            Self::OriginalConsensus => "OriginalConsensus",
        }
    }

    /// Column headers that are accepted for this system when reading mapping tables.
    ///
    /// The dotted names are written by the R step that adds region annotations.
    pub fn accepted_column_names(&self) -> &'static [&'static str] {
        match self {
            Self::Reference => &["Reference", "HXB2 Position", "HXB2.Position"],
            Self::AlignedConsensus => &[
                "AlignedConsensus",
                "Consensus Aligned to HXB2 Position",
                "Consensus.Aligned.to.HXB2.Position",
            ],
            Self::OriginalConsensus => &[
                "OriginalConsensus",
                "Original Consensus Position",
                "Original.Consensus.Position",
            ],
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|system| system.accepted_column_names().contains(&name.trim()))
    }
}

impl Display for CoordinateSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column_name())
    }
}
