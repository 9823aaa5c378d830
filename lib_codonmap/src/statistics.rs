use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    index_types::AlignmentColumn,
    io::{parse_optional_float, parse_optional_position},
};

pub const SITE_COLUMN: &str = "site";

/// What to do if more than one statistics file matches a participant.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguousFilePolicy {
    /// Use the first file in lexicographic order.
    #[default]
    First,
    /// Fail with [`Error::AmbiguousStatisticsFile`].
    Reject,
}

/// The per-site output of the selection test for one participant.
///
/// Sites are numbered in original consensus columns.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsTable {
    columns: Vec<String>,
    sites: Vec<(AlignmentColumn, Vec<Option<f64>>)>,
}

impl StatisticsTable {
    pub fn new(columns: Vec<String>, sites: Vec<(AlignmentColumn, Vec<Option<f64>>)>) -> Self {
        Self { columns, sites }
    }

    /// Read a tab separated table with a `site` column and at least the given `columns`.
    pub fn read_tsv(path: impl AsRef<Path>, columns: &[String]) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading statistics {path:?}");
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(path)?;
        let headers = reader.headers()?.clone();

        let column_index = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or_else(|| Error::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })
        };
        let site_index = column_index(SITE_COLUMN)?;
        let value_indices = columns
            .iter()
            .map(|column| column_index(column.as_str()))
            .collect::<Result<Vec<_>>>()?;

        let mut sites = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|position| position.line()).unwrap_or(0);
            let malformed = |value: &str| Error::MalformedValue {
                path: path.to_path_buf(),
                line,
                value: value.to_string(),
            };

            let site = record.get(site_index).unwrap_or_default();
            let site = parse_optional_position(site)
                .and_then(std::result::Result::ok)
                .ok_or_else(|| malformed(site))?;

            let values = value_indices
                .iter()
                .map(|index| {
                    let cell = record.get(*index).unwrap_or_default();
                    parse_optional_float(cell)
                        .transpose()
                        .map_err(|()| malformed(cell))
                })
                .collect::<Result<Vec<_>>>()?;
            sites.push((AlignmentColumn::from(site), values));
        }

        debug!("Read statistics for {} sites", sites.len());
        Ok(Self {
            columns: columns.to_vec(),
            sites,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn sites(&self) -> impl Iterator<Item = (AlignmentColumn, &[Option<f64>])> {
        self.sites
            .iter()
            .map(|(site, values)| (*site, values.as_slice()))
    }

    /// The index of `column` in the value slices returned by [`sites`](Self::sites).
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }
}

/// Find the statistics file `<participant>*<suffix>` in `directory`.
pub fn find_statistics_file(
    directory: impl AsRef<Path>,
    participant: &str,
    suffix: &str,
    policy: AmbiguousFilePolicy,
) -> Result<PathBuf> {
    let directory = directory.as_ref();
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(participant)
            && name.ends_with(suffix)
            && name.len() >= participant.len() + suffix.len()
        {
            files.push(entry.path());
        }
    }
    files.sort();

    match files.len() {
        0 => Err(Error::MissingStatisticsFile {
            participant: participant.to_string(),
            directory: directory.to_path_buf(),
        }),
        1 => Ok(files.remove(0)),
        _ => match policy {
            AmbiguousFilePolicy::First => {
                warn!(
                    "Found {} statistics files for participant {participant}, using {:?}",
                    files.len(),
                    files[0]
                );
                Ok(files.remove(0))
            }
            AmbiguousFilePolicy::Reject => Err(Error::AmbiguousStatisticsFile {
                participant: participant.to_string(),
                files,
            }),
        },
    }
}
