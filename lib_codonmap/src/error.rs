use std::path::PathBuf;

use thiserror::Error;

use crate::coordinate_system::CoordinateSystem;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("An IO error occurred: {0}.")]
    Io(#[from] std::io::Error),

    #[error("A CSV error occurred: {0}.")]
    Csv(#[from] csv::Error),

    #[error("A JSON error occurred: {0}.")]
    Json(#[from] serde_json::Error),

    #[error("Malformed fasta input {path:?}: {message}.")]
    Fasta { path: PathBuf, message: String },

    #[error(
        "The aligned sequences of participant {participant} differ in length: reference {reference}, aligned consensus {aligned_consensus}, original consensus {original_consensus}."
    )]
    LengthMismatch {
        participant: String,
        reference: usize,
        aligned_consensus: usize,
        original_consensus: usize,
    },

    #[error("Symbol '{symbol}' at alignment column {column} is neither in the alphabet nor a gap.")]
    UnknownSymbol { symbol: char, column: usize },

    #[error("The {system} coordinate system has no defined position at all.")]
    UndefinedCoordinate { system: CoordinateSystem },

    #[error("Position {position} does not exist in the {system} coordinate system.")]
    UnknownPosition {
        system: CoordinateSystem,
        position: usize,
    },

    #[error("No statistics file found for participant {participant} in {directory:?}.")]
    MissingStatisticsFile {
        participant: String,
        directory: PathBuf,
    },

    #[error("Found multiple statistics files for participant {participant}: {files:?}.")]
    AmbiguousStatisticsFile {
        participant: String,
        files: Vec<PathBuf>,
    },

    #[error("Participant {participant} is referenced in {referenced_by} but has no {missing}.")]
    MissingParticipant {
        participant: String,
        referenced_by: String,
        missing: String,
    },

    #[error("Participant {0} was given twice.")]
    DuplicateParticipant(String),

    #[error("Table {path:?} has no column named {column}.")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Malformed value '{value}' in {path:?} at line {line}.")]
    MalformedValue {
        path: PathBuf,
        line: u64,
        value: String,
    },
}

impl Error {
    /// True if the error only concerns the data of a single participant.
    ///
    /// A batch skips the participant and continues on such errors.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::LengthMismatch { .. }
            | Self::UnknownSymbol { .. }
            | Self::UnknownPosition { .. }
            | Self::MissingStatisticsFile { .. }
            | Self::AmbiguousStatisticsFile { .. }
            | Self::MissingParticipant { .. }
            | Self::MissingColumn { .. }
            | Self::MalformedValue { .. }
            | Self::Fasta { .. }
            | Self::Io(_)
            | Self::Csv(_) => true,
            Self::Json(_)
            | Self::UndefinedCoordinate { .. }
            | Self::DuplicateParticipant(_) => false,
        }
    }
}
