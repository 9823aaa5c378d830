use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use lib_codonmap::{
    annotation::read_midpoints,
    batch::{BatchConfig, run_batch},
};
use log::{LevelFilter, info, warn};
use rayon::ThreadPoolBuilder;

use crate::init_logging;

pub const ANNOTATIONS_FILE: &str = "significant_annotations.json";

#[derive(Parser)]
pub struct Cli {
    #[clap(long, short = 'l', default_value = "info")]
    log_level: LevelFilter,

    /// The directory containing the annotated mapping tables and the statistics files of all participants.
    #[clap(long, short = 'd')]
    data_directory: PathBuf,

    /// A json file mapping participant ids to the nucleotide midpoints of their windows of interest.
    #[clap(long, short = 'm')]
    midpoints: PathBuf,

    /// The directory to write the selection tables and annotations into.
    #[clap(long, short = 'o')]
    output_directory: PathBuf,

    /// A toml file with the batch configuration.
    ///
    /// Missing keys take their default values.
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,

    /// The number of worker threads, all cores by default.
    #[clap(long, short = 't')]
    threads: Option<usize>,
}

pub fn cli(cli: Cli) -> Result<()> {
    init_logging(cli.log_level);

    let config: BatchConfig = if let Some(path) = &cli.config {
        info!("Loading configuration {path:?}");
        let buffer = fs::read_to_string(path)
            .with_context(|| format!("Cannot read configuration {path:?}"))?;
        toml::from_str(&buffer).with_context(|| format!("Cannot parse configuration {path:?}"))?
    } else {
        BatchConfig::default()
    };

    info!("Loading windows of interest {:?}", cli.midpoints);
    let midpoints = read_midpoints(&cli.midpoints)
        .with_context(|| format!("Cannot read windows of interest {:?}", cli.midpoints))?;

    let pool = ThreadPoolBuilder::new()
        .num_threads(cli.threads.unwrap_or(0))
        .build()?;
    let output = pool.install(|| run_batch(&cli.data_directory, &midpoints, &config))?;

    fs::create_dir_all(&cli.output_directory)
        .with_context(|| format!("Cannot create {:?}", cli.output_directory))?;
    output.selection.write_csv(&cli.output_directory)?;
    output
        .annotations
        .write_json(cli.output_directory.join(ANNOTATIONS_FILE))?;
    output
        .selection
        .write_annotation_slices(&cli.output_directory, &output.annotations)?;

    if !output.report.is_empty() {
        warn!(
            "{} participants were skipped or incomplete",
            output.report.failures().len()
        );
        for (participant, error) in output.report.failures() {
            warn!("{participant}: {error}");
        }
    }

    Ok(())
}
