use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use codonmap::{aggregate, filter, map};

/// The path of a file in the `test_files` directory of the repository.
pub fn test_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("test_files")
        .join(name)
}

/// Run a subcommand like it was given on the command line.
///
/// The placeholder `{test_files}` is replaced by the `test_files` directory.
pub fn run(args: &str) -> Result<()> {
    let test_files = test_file("");
    let args = args.replace("{test_files}", &test_files.to_string_lossy());
    let args: Vec<_> = args.split_whitespace().collect();

    match args.first() {
        Some(&"map") => map::cli(map::Cli::parse_from(args)),
        Some(&"aggregate") => aggregate::cli(aggregate::Cli::parse_from(args)),
        Some(&"filter") => filter::cli(filter::Cli::parse_from(args)),
        _ => panic!("Unknown subcommand in {args:?}"),
    }
}
