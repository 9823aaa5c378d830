//! Running the aggregation and the annotation resolution over a directory of participants.

use std::{collections::HashMap, fs, path::Path};

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    aggregate::{SelectionConfig, SelectionTables, SiteContribution, participant_contributions},
    annotation::{
        AnnotationAccumulator, AnnotationConfig, AnnotationRange, AnnotationRanges, ClampTarget,
        participant_ranges,
    },
    error::{Error, Result},
    mapping_table::AnnotatedMappingTable,
    statistics::{AmbiguousFilePolicy, StatisticsTable, find_statistics_file},
};


pub const DEFAULT_MAPPING_SUFFIX: &str = "_consensus_annotations.csv";
pub const DEFAULT_STATISTICS_SUFFIX: &str = ".FUBAR_simple.txt";
pub const DEFAULT_REGION_COLUMNS: [&str; 3] = ["Regions1", "Regions2", "Regions3"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BatchConfig {
    #[serde(flatten)]
    pub selection: SelectionConfig,
    #[serde(flatten)]
    pub annotation: AnnotationConfig,
    pub ambiguous_statistics: AmbiguousFilePolicy,
    pub region_columns: Vec<String>,
    pub mapping_suffix: String,
    pub statistics_suffix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            selection: Default::default(),
            annotation: Default::default(),
            ambiguous_statistics: Default::default(),
            region_columns: DEFAULT_REGION_COLUMNS.map(String::from).to_vec(),
            mapping_suffix: DEFAULT_MAPPING_SUFFIX.to_string(),
            statistics_suffix: DEFAULT_STATISTICS_SUFFIX.to_string(),
        }
    }
}

/// The participants that were skipped or only partially processed.
#[derive(Debug, Default)]
pub struct BatchReport {
    failures: Vec<(String, Error)>,
}

impl BatchReport {
    /// Record a failure of `participant`.
    ///
    /// Errors that are not recoverable are returned instead.
    pub fn record(&mut self, participant: &str, error: Error) -> Result<()> {
        if !error.is_recoverable() {
            return Err(error);
        }

        warn!("Skipping data of participant {participant}: {error}");
        self.failures.push((participant.to_string(), error));
        Ok(())
    }

    pub fn failures(&self) -> &[(String, Error)] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct BatchOutput {
    pub selection: SelectionTables,
    pub annotations: AnnotationRanges,
    pub report: BatchReport,
}

/// The ids of all participants with a mapping table `<id><mapping_suffix>` in `directory`, sorted.
pub fn discover_participants(
    directory: impl AsRef<Path>,
    mapping_suffix: &str,
) -> Result<Vec<String>> {
    let mut participants = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if let Some(participant) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.strip_suffix(mapping_suffix))
            .filter(|participant| !participant.is_empty())
        {
            participants.push(participant.to_string());
        }
    }
    participants.sort();
    Ok(participants)
}

struct ParticipantResult {
    clamp_target: ClampTarget,
    contributions: Result<Vec<SiteContribution>>,
    ranges: Option<Result<Vec<AnnotationRange>>>,
}

fn process_participant(
    directory: &Path,
    participant: &str,
    midpoints: Option<&[usize]>,
    config: &BatchConfig,
) -> Result<ParticipantResult> {
    let path = directory.join(format!("{participant}{}", config.mapping_suffix));
    let mut table = AnnotatedMappingTable::read_csv(&path, None)?;
    let missing_regions = table.select_regions(&config.region_columns);

    let contributions = find_statistics_file(
        directory,
        participant,
        &config.statistics_suffix,
        config.ambiguous_statistics,
    )
    .and_then(|path| StatisticsTable::read_tsv(path, &config.selection.required_columns()))
    .and_then(|statistics| {
        participant_contributions(participant, &table.mapping, &statistics, &config.selection)
    });

    let ranges = midpoints.map(|midpoints| match missing_regions.into_iter().next() {
        Some(column) if !midpoints.is_empty() => Err(Error::MissingColumn { path, column }),
        _ => participant_ranges(participant, &table, midpoints, &config.annotation),
    });

    Ok(ParticipantResult {
        clamp_target: ClampTarget::of(&table),
        contributions,
        ranges,
    })
}

/// Aggregate the statistics of all participants in `directory` and resolve the annotation
/// ranges revealed by `midpoints`.
///
/// Participants are processed in parallel on the current rayon thread pool.
/// Selection tables are merged in lexicographic order of the participant ids,
/// annotation ranges in the order of `midpoints`.
/// Recoverable errors are collected in the [`BatchReport`], all others abort the batch.
pub fn run_batch(
    directory: impl AsRef<Path>,
    midpoints: &[(String, Vec<usize>)],
    config: &BatchConfig,
) -> Result<BatchOutput> {
    let directory = directory.as_ref();
    let participants = discover_participants(directory, &config.mapping_suffix)?;
    info!(
        "Found {} participants in {directory:?}",
        participants.len()
    );

    let windows: HashMap<&str, &[usize]> = midpoints
        .iter()
        .map(|(participant, midpoints)| (participant.as_str(), midpoints.as_slice()))
        .collect();
    let results: Vec<_> = participants
        .par_iter()
        .map(|participant| {
            let midpoints = windows.get(participant.as_str()).copied();
            process_participant(directory, participant, midpoints, config)
        })
        .collect();

    let mut report = BatchReport::default();
    let mut selection = SelectionTables::new(&config.selection.statistics, &participants);
    let mut clamp_targets = HashMap::new();
    let mut revealed = HashMap::new();

    for (participant, result) in participants.iter().zip(results) {
        let result = match result {
            Ok(result) => result,
            Err(error) => {
                report.record(participant, error)?;
                continue;
            }
        };
        clamp_targets.insert(participant.clone(), result.clamp_target);

        match result.contributions {
            Ok(contributions) => {
                selection.merge(participant, &contributions);
            }
            Err(error) => report.record(participant, error)?,
        }

        if let Some(ranges) = result.ranges {
            revealed.insert(participant.as_str(), ranges);
        }
    }

    let mut accumulator = AnnotationAccumulator::new();
    let mut last_participant = None;

    for (participant, _) in midpoints {
        match revealed.remove(participant.as_str()) {
            Some(ranges) => {
                last_participant = Some(participant.as_str());
                match ranges {
                    Ok(ranges) => {
                        let recorded = accumulator.merge(participant, ranges);
                        info!("Participant {participant} revealed {recorded} new annotations");
                    }
                    Err(error) => report.record(participant, error)?,
                }
            }
            None if participants.binary_search(participant).is_err() => report.record(
                participant,
                Error::MissingParticipant {
                    participant: participant.clone(),
                    referenced_by: "the windows of interest".to_string(),
                    missing: "mapping table".to_string(),
                },
            )?,
            // Unreadable mapping table, already reported.
            None => {}
        }
    }

    let annotations =
        accumulator.finish(config.annotation.edge_clamp, &clamp_targets, last_participant);
    info!(
        "Aggregated {} participants into {} annotations, {} failures",
        participants.len(),
        annotations.len(),
        report.failures().len()
    );

    Ok(BatchOutput {
        selection,
        annotations,
        report,
    })
}
