use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use lib_codonmap::{
    common_sites::{DEFAULT_MIN_PARTICIPANTS, SIGNIFICANCE_LEVEL, filter_common_sites},
    selection::SelectionTable,
};
use log::{LevelFilter, info};

use crate::init_logging;

#[derive(Parser)]
pub struct Cli {
    #[clap(long, short = 'l', default_value = "info")]
    log_level: LevelFilter,

    /// A selection table with probability-like values, e.g. `pos_selection_sites_probability.csv`.
    #[clap(long, short = 'i')]
    input: PathBuf,

    #[clap(long, short = 'o')]
    output: PathBuf,

    /// The minimum number of participants in which a position must be significant.
    #[clap(long, short = 't', default_value_t = DEFAULT_MIN_PARTICIPANTS)]
    threshold: usize,

    /// The value at or above which a participant counts as significant.
    #[clap(long, default_value_t = SIGNIFICANCE_LEVEL)]
    significance: f64,
}

pub fn cli(cli: Cli) -> Result<()> {
    init_logging(cli.log_level);
    ensure!(
        cli.significance.is_finite(),
        "The significance level must be finite"
    );

    info!("Loading selection table {:?}", cli.input);
    let table = SelectionTable::read_csv(&cli.input)
        .with_context(|| format!("Cannot read selection table {:?}", cli.input))?;

    let filtered = filter_common_sites(&table, cli.threshold, cli.significance);

    info!("Writing {} rows to {:?}", filtered.len(), cli.output);
    filtered
        .write_csv(&cli.output)
        .with_context(|| format!("Cannot write {:?}", cli.output))?;
    Ok(())
}
