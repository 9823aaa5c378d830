//! Gene region annotations that overlap windows of interest.
//!
//! A window is given as a nucleotide midpoint in a participant's original consensus.
//! Every region label found inside the window is recorded with its full extent on the reference.

use std::{
    collections::{BTreeMap, HashMap},
    io::Write,
    path::Path,
};

use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    coordinate_system::CoordinateSystem,
    error::Result,
    index_types::AlignmentColumn,
    io::write_atomically,
    mapping_table::AnnotatedMappingTable,
    translate::site_to_alignment_column,
};


pub const DEFAULT_WINDOW_HALF_WIDTH: usize = 17;

/// Which participant's table decides the edge clamps of a range.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeClampMode {
    /// The table of the last participant with windows, for every range.
    #[default]
    LastParticipant,
    /// The table of the participant that first revealed the range.
    DiscoveringParticipant,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AnnotationConfig {
    pub window_half_width: usize,
    pub edge_clamp: EdgeClampMode,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            window_half_width: DEFAULT_WINDOW_HALF_WIDTH,
            edge_clamp: Default::default(),
        }
    }
}

/// A codon window around a nucleotide midpoint, in original consensus coordinates.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SignificanceWindow {
    pub participant: String,
    pub midpoint: usize,
    pub start: usize,
    pub stop: usize,
}

impl SignificanceWindow {
    pub fn from_midpoint(participant: &str, midpoint: usize, half_width: usize) -> Self {
        let codon = midpoint / 3;
        Self {
            participant: participant.to_string(),
            midpoint,
            start: codon.saturating_sub(half_width).max(1),
            stop: codon + half_width,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRange {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// What the edge clamps need to know about a participant's table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ClampTarget {
    pub last_reference: Option<usize>,
    pub length: usize,
}

impl ClampTarget {
    pub fn of(table: &AnnotatedMappingTable) -> Self {
        Self {
            last_reference: table.mapping.last_defined(CoordinateSystem::Reference),
            length: table.mapping.len(),
        }
    }

    fn clamp(&self, range: &mut AnnotationRange) {
        if range.start == 1 {
            range.start = 0;
        }
        if Some(range.end) == self.last_reference {
            range.end = self.length;
        }
    }
}

/// The distinct region labels in the mapping table columns covered by `window`.
///
/// Labels are listed per region column in order of first occurrence.
pub fn window_labels(
    table: &AnnotatedMappingTable,
    window: &SignificanceWindow,
) -> Result<Vec<String>> {
    let length = table.mapping.len();
    if length == 0 {
        return Ok(Vec::new());
    }

    let start = site_to_alignment_column(&table.mapping, AlignmentColumn::from(window.start))?;
    let stop = site_to_alignment_column(&table.mapping, AlignmentColumn::from(window.stop))?;
    let start = (start.raw().floor().max(1.0) as usize).min(length);
    let stop = (stop.raw().ceil().max(1.0) as usize).min(length);
    debug!(
        "Window {}..={} of participant {} covers alignment columns {start}..={stop}",
        window.start, window.stop, window.participant
    );

    Ok(table
        .regions
        .iter()
        .flat_map(|region| {
            region
                .labels
                .get(start - 1..stop.max(start))
                .unwrap_or_default()
                .iter()
                .flatten()
        })
        .unique()
        .cloned()
        .collect())
}

/// The smallest and largest reference position of the columns labelled with `label`.
pub fn label_extent(table: &AnnotatedMappingTable, label: &str) -> Option<(usize, usize)> {
    table
        .mapping
        .alignment_columns()
        .filter(|column| {
            table.regions.iter().any(|region| {
                region.label(*column) == Some(label)
            })
        })
        .filter_map(|column| table.mapping.get(CoordinateSystem::Reference, column))
        .minmax()
        .into_option()
}

/// The annotation ranges revealed by the windows of one participant, in order of discovery.
///
/// Each label appears at most once.
pub fn participant_ranges(
    participant: &str,
    table: &AnnotatedMappingTable,
    midpoints: &[usize],
    config: &AnnotationConfig,
) -> Result<Vec<AnnotationRange>> {
    let mut ranges: Vec<AnnotationRange> = Vec::new();

    for &midpoint in midpoints {
        let window =
            SignificanceWindow::from_midpoint(participant, midpoint, config.window_half_width);
        for label in window_labels(table, &window)? {
            if ranges.iter().any(|range| range.name == label) {
                continue;
            }

            match label_extent(table, &label) {
                Some((start, end)) => ranges.push(AnnotationRange {
                    name: label,
                    start,
                    end,
                }),
                None => warn!(
                    "Region {label} of participant {participant} covers no reference position"
                ),
            }
        }
    }

    Ok(ranges)
}

/// Collects annotation ranges across participants.
///
/// The first range recorded for a label is never replaced.
#[derive(Debug, Clone, Default)]
pub struct AnnotationAccumulator {
    ranges: Vec<(AnnotationRange, String)>,
    names: HashMap<String, usize>,
}

impl AnnotationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the ranges of labels that were not seen before.
    ///
    /// Returns the number of newly recorded ranges.
    pub fn merge(
        &mut self,
        participant: &str,
        candidates: impl IntoIterator<Item = AnnotationRange>,
    ) -> usize {
        let mut recorded = 0;
        for candidate in candidates {
            if self.names.contains_key(&candidate.name) {
                debug!(
                    "Ignoring range of already known region {} from participant {participant}",
                    candidate.name
                );
                continue;
            }

            self.names.insert(candidate.name.clone(), self.ranges.len());
            self.ranges.push((candidate, participant.to_string()));
            recorded += 1;
        }
        recorded
    }

    pub fn get(&self, name: &str) -> Option<&AnnotationRange> {
        self.names.get(name).map(|index| &self.ranges[*index].0)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Apply the edge clamps and return the final ranges in order of discovery.
    ///
    /// `last_participant` is the last participant whose windows were processed.
    pub fn finish(
        self,
        mode: EdgeClampMode,
        clamp_targets: &HashMap<String, ClampTarget>,
        last_participant: Option<&str>,
    ) -> AnnotationRanges {
        let last_target = last_participant.and_then(|participant| clamp_targets.get(participant));

        let ranges = self
            .ranges
            .into_iter()
            .map(|(mut range, participant)| {
                let target = match mode {
                    EdgeClampMode::LastParticipant => last_target,
                    EdgeClampMode::DiscoveringParticipant => clamp_targets.get(&participant),
                };
                match target {
                    Some(target) => target.clamp(&mut range),
                    None => warn!("No table to clamp the edges of region {}", range.name),
                }
                range
            })
            .collect();

        AnnotationRanges { ranges }
    }
}

/// Final annotation ranges in order of discovery.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AnnotationRanges {
    ranges: Vec<AnnotationRange>,
}

impl AnnotationRanges {
    pub fn iter(&self) -> impl Iterator<Item = &AnnotationRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&AnnotationRange> {
        self.ranges.iter().find(|range| range.name == name)
    }

    /// The ranges as a map from label to `[start, end]`.
    pub fn to_map(&self) -> BTreeMap<String, [usize; 2]> {
        self.ranges
            .iter()
            .map(|range| (range.name.clone(), [range.start, range.end]))
            .collect()
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let map = self.to_map();
        write_atomically(path, |writer| {
            serde_json::to_writer_pretty(&mut *writer, &map)?;
            writeln!(writer)?;
            Ok(())
        })?;
        info!("Wrote {} annotation ranges", self.len());
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let map: BTreeMap<String, [usize; 2]> =
            serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(Self {
            ranges: map
                .into_iter()
                .map(|(name, [start, end])| AnnotationRange { name, start, end })
                .collect(),
        })
    }
}

/// Nucleotide midpoints of the windows of interest per participant.
pub type Midpoints = Vec<(String, Vec<usize>)>;

/// Read the windows of interest, a JSON object from participant id to nucleotide midpoints.
///
/// Participants keep the order of the file.
pub fn read_midpoints(path: impl AsRef<Path>) -> Result<Midpoints> {
    let file = std::fs::File::open(path)?;
    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_reader(std::io::BufReader::new(file))?;
    object
        .into_iter()
        .map(|(participant, midpoints)| Ok((participant, serde_json::from_value(midpoints)?)))
        .collect()
}
