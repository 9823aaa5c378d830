use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FastaRecord {
    /// The header up to the first whitespace.
    pub id: String,
    /// The sequence with all whitespace removed.
    pub sequence: String,
}

/// Parse all records of a fasta file.
///
/// Sequences may span multiple lines. Blank lines are ignored.
pub fn parse_fasta_file(path: impl AsRef<Path>) -> Result<Vec<FastaRecord>> {
    let path = path.as_ref();
    debug!("Parsing fasta file {path:?}");
    let fasta_error = |message: String| Error::Fasta {
        path: path.to_path_buf(),
        message,
    };

    let mut records: Vec<FastaRecord> = Vec::new();
    for (index, line) in BufReader::new(File::open(path)?).lines().enumerate() {
        let line = line?;
        let line_number = index + 1;

        if let Some(header) = line.strip_prefix('>') {
            let id = header.split_whitespace().next().ok_or_else(|| {
                fasta_error(format!("record header on line {line_number} has no id"))
            })?;
            records.push(FastaRecord {
                id: id.to_string(),
                sequence: String::new(),
            });
        } else if line.contains('>') {
            return Err(fasta_error(format!(
                "line {line_number} contains a '>' that does not start a record"
            )));
        } else if let Some(record) = records.last_mut() {
            record
                .sequence
                .extend(line.chars().filter(|c| !c.is_whitespace()));
        } else if !line.trim().is_empty() {
            return Err(fasta_error(format!(
                "line {line_number} precedes the first record"
            )));
        }
    }

    if records.is_empty() {
        return Err(fasta_error("file contains no record".to_string()));
    }

    debug!("Parsed {} fasta records", records.len());
    Ok(records)
}

/// Parse a fasta file into a map from record id to sequence.
///
/// Fails if an id appears twice.
pub fn parse_fasta_file_by_id(path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let mut result = HashMap::new();
    for record in parse_fasta_file(path)? {
        if result.contains_key(&record.id) {
            return Err(Error::DuplicateParticipant(record.id));
        }
        result.insert(record.id, record.sequence);
    }
    Ok(result)
}
