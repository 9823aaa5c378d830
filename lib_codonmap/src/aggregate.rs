//! Placing the per-site statistics of each participant onto reference coordinates.

use std::path::Path;

use log::{debug, info};
use noisy_float::types::{R64, r64};
use serde::{Deserialize, Serialize};

use crate::{
    annotation::AnnotationRanges,
    error::Result,
    index_types::AlignmentColumn,
    mapping_table::CoordinateMappingTable,
    selection::SelectionTable,
    statistics::StatisticsTable,
    translate::site_to_reference,
};


pub const SELECTION_FILE_PREFIX: &str = "pos_selection_sites_";

/// A column of the statistics files and the name of its selection table.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatisticColumn {
    pub column: String,
    pub name: String,
}

impl StatisticColumn {
    pub fn new(column: &str, name: &str) -> Self {
        Self {
            column: column.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SelectionConfig {
    pub statistics: Vec<StatisticColumn>,
    /// If set together with the threshold, only sites at or above the threshold in this column are reported.
    pub significance_column: Option<String>,
    pub significance_threshold: Option<f64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            statistics: vec![
                StatisticColumn::new("dN/dS", "dNdS"),
                StatisticColumn::new("P(dS<dN)", "probability"),
            ],
            significance_column: None,
            significance_threshold: None,
        }
    }
}

impl SelectionConfig {
    /// The columns that must be read from each statistics file.
    pub fn required_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        let names = self
            .statistics
            .iter()
            .map(|statistic| &statistic.column)
            .chain(&self.significance_column);
        for name in names {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        columns
    }

    fn significance_filter(&self) -> Option<(&str, f64)> {
        Some((
            self.significance_column.as_deref()?,
            self.significance_threshold?,
        ))
    }
}

/// The statistics of one reported site, placed on the reference.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteContribution {
    pub site: AlignmentColumn,
    pub coordinate: R64,
    /// One value per configured statistic.
    pub values: Vec<Option<f64>>,
}

/// Translate the reported sites of one participant to reference coordinates.
pub fn participant_contributions(
    participant: &str,
    table: &CoordinateMappingTable,
    statistics: &StatisticsTable,
    config: &SelectionConfig,
) -> Result<Vec<SiteContribution>> {
    let value_indices: Vec<_> = config
        .statistics
        .iter()
        .map(|statistic| statistics.column_index(&statistic.column))
        .collect();
    let significance = config.significance_filter().map(|(column, threshold)| {
        (statistics.column_index(column), threshold)
    });

    let mut contributions = Vec::new();
    for (site, values) in statistics.sites() {
        if let Some((index, threshold)) = significance {
            let value = index.and_then(|index| values[index]);
            if !value.is_some_and(|value| value >= threshold) {
                continue;
            }
        }

        let coordinate = site_to_reference(table, site)?;
        debug!(
            "Site {} of participant {participant} maps to reference coordinate {coordinate}",
            site.as_usize()
        );
        contributions.push(SiteContribution {
            site,
            coordinate,
            values: value_indices
                .iter()
                .map(|index| index.and_then(|index| values[index]))
                .collect(),
        });
    }

    debug!(
        "Participant {participant} reports {} of {} sites",
        contributions.len(),
        statistics.len()
    );
    Ok(contributions)
}

/// One selection table per configured statistic, all with the same participant columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionTables {
    statistics: Vec<StatisticColumn>,
    tables: Vec<SelectionTable>,
}

impl SelectionTables {
    pub fn new(statistics: &[StatisticColumn], participants: &[String]) -> Self {
        Self {
            statistics: statistics.to_vec(),
            tables: statistics
                .iter()
                .map(|_| SelectionTable::new(participants.iter().cloned()))
                .collect(),
        }
    }

    /// Insert the contributions of `participant` into every table.
    ///
    /// A contribution to an already filled cell replaces it.
    /// Returns the number of replaced cells.
    pub fn merge(&mut self, participant: &str, contributions: &[SiteContribution]) -> usize {
        let mut replaced = 0;
        for (statistic_index, (statistic, table)) in
            self.statistics.iter().zip(&mut self.tables).enumerate()
        {
            let index = table.add_participant(participant);
            for contribution in contributions {
                let value = contribution
                    .values
                    .get(statistic_index)
                    .copied()
                    .flatten();
                if let Some(previous) = table.set(contribution.coordinate, index, value) {
                    debug!(
                        "Participant {participant} replaces {} value {previous} at reference coordinate {}",
                        statistic.name, contribution.coordinate
                    );
                    replaced += 1;
                }
            }
        }
        replaced
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatisticColumn, &SelectionTable)> {
        self.statistics.iter().zip(&self.tables)
    }

    pub fn get(&self, name: &str) -> Option<&SelectionTable> {
        self.iter()
            .find(|(statistic, _)| statistic.name == name)
            .map(|(_, table)| table)
    }

    /// Write `pos_selection_sites_<name>.csv` for every statistic into `directory`.
    pub fn write_csv(&self, directory: impl AsRef<Path>) -> Result<()> {
        let directory = directory.as_ref();
        for (statistic, table) in self.iter() {
            let path = directory.join(format!("{SELECTION_FILE_PREFIX}{}.csv", statistic.name));
            table.write_csv(&path)?;
            info!("Wrote {} rows of {} to {path:?}", table.len(), statistic.name);
        }
        Ok(())
    }

    /// Write the rows inside each annotation range as `<annotation>_<name>.csv` into `directory`.
    ///
    /// Slashes in annotation names are replaced by underscores.
    pub fn write_annotation_slices(
        &self,
        directory: impl AsRef<Path>,
        ranges: &AnnotationRanges,
    ) -> Result<()> {
        let directory = directory.as_ref();
        for range in ranges.iter() {
            let bounds = r64(range.start as f64)..=r64(range.end as f64);
            for (statistic, table) in self.iter() {
                let slice = table.subset(bounds.clone());
                let file_name = format!("{}_{}.csv", range.name.replace('/', "_"), statistic.name);
                slice.write_csv(directory.join(file_name))?;
            }
            debug!("Wrote slices of annotation {}", range.name);
        }
        Ok(())
    }
}
