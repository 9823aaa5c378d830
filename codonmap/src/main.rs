use anyhow::Result;
use clap::{Parser, Subcommand};
use codonmap::{aggregate, filter, map};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the coordinate mapping table of every participant.
    Map(map::Cli),
    /// Place the selection statistics of all participants on the reference and resolve annotations.
    Aggregate(aggregate::Cli),
    /// Keep the reference positions that are significant in enough participants.
    Filter(filter::Cli),
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Map(cli) => map::cli(cli),
        Command::Aggregate(cli) => aggregate::cli(cli),
        Command::Filter(cli) => filter::cli(cli),
    }
}
