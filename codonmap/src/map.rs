use std::{fs, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use lib_codonmap::{
    batch::BatchReport,
    error::Error,
    fasta::parse_fasta_file_by_id,
    mapping_table::{CoordinateMappingTable, LengthPolicy, MappingConfig},
    position_index::UnknownSymbolPolicy,
};
use log::{LevelFilter, info, warn};

use crate::init_logging;

pub const DEFAULT_REFERENCE_ID: &str = "MH758564.1";
pub const MAPPING_FILE_SUFFIX: &str = "_position_mappings.csv";

#[derive(Parser)]
pub struct Cli {
    #[clap(long, short = 'l', default_value = "info")]
    log_level: LevelFilter,

    /// A fasta file with the original consensus of every participant.
    #[clap(long, short = 'c')]
    consensus: PathBuf,

    /// A fasta file with the reference and the consensus of every participant aligned jointly.
    #[clap(long, short = 'a')]
    alignment: PathBuf,

    /// The directory to write `<participant>_position_mappings.csv` files into.
    #[clap(long, short = 'd')]
    output_directory: PathBuf,

    /// The id of the reference record in the alignment.
    #[clap(long, default_value = DEFAULT_REFERENCE_ID)]
    reference_id: String,

    /// Pad the original consensus with gaps if it is shorter than the alignment.
    ///
    /// Without this flag, sequences of different lengths are an error.
    #[clap(long)]
    pad_original: bool,

    /// Fail on symbols that are neither amino acids nor gaps, instead of treating them as gaps.
    #[clap(long)]
    reject_unknown_symbols: bool,
}

pub fn cli(cli: Cli) -> Result<()> {
    init_logging(cli.log_level);

    info!("Loading consensus file {:?}", cli.consensus);
    let consensus = parse_fasta_file_by_id(&cli.consensus)
        .with_context(|| format!("Cannot read consensus file {:?}", cli.consensus))?;

    info!("Loading alignment file {:?}", cli.alignment);
    let mut alignment = parse_fasta_file_by_id(&cli.alignment)
        .with_context(|| format!("Cannot read alignment file {:?}", cli.alignment))?;
    let reference = alignment.remove(&cli.reference_id).ok_or_else(|| {
        anyhow!(
            "Reference record {} not found in {:?}",
            cli.reference_id,
            cli.alignment
        )
    })?;

    let config = MappingConfig {
        unknown_symbols: if cli.reject_unknown_symbols {
            UnknownSymbolPolicy::Reject
        } else {
            UnknownSymbolPolicy::Gap
        },
        length_policy: if cli.pad_original {
            LengthPolicy::PadShorter
        } else {
            LengthPolicy::Strict
        },
    };

    fs::create_dir_all(&cli.output_directory)
        .with_context(|| format!("Cannot create {:?}", cli.output_directory))?;

    let mut participants: Vec<_> = alignment.keys().cloned().collect();
    participants.sort();
    let mut report = BatchReport::default();
    let mut written = 0;

    for participant in &participants {
        let Some(original_consensus) = consensus.get(participant) else {
            report.record(
                participant,
                Error::MissingParticipant {
                    participant: participant.clone(),
                    referenced_by: format!("{:?}", cli.alignment),
                    missing: "original consensus".to_string(),
                },
            )?;
            continue;
        };

        let table = match CoordinateMappingTable::build(
            participant,
            &reference,
            &alignment[participant],
            original_consensus,
            &config,
        ) {
            Ok(table) => table,
            Err(error) => {
                report.record(participant, error)?;
                continue;
            }
        };

        let path = cli
            .output_directory
            .join(format!("{participant}{MAPPING_FILE_SUFFIX}"));
        table
            .write_csv(&path)
            .with_context(|| format!("Cannot write mapping table {path:?}"))?;
        written += 1;
    }

    for participant in consensus.keys() {
        if !alignment.contains_key(participant) {
            warn!("Participant {participant} has a consensus but no aligned sequence");
        }
    }

    info!(
        "Wrote {written} mapping tables to {:?}, skipped {} participants",
        cli.output_directory,
        report.failures().len()
    );
    Ok(())
}
