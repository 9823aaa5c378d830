use std::{
    io::{BufWriter, Write},
    path::Path,
};

use log::debug;
use noisy_float::types::R64;
use tempfile::NamedTempFile;

use crate::error::Result;

/// Write a file by writing a temporary sibling first and renaming it over `path`.
///
/// Readers never observe a partially written file.
pub fn write_atomically(
    path: impl AsRef<Path>,
    write: impl FnOnce(&mut dyn Write) -> Result<()>,
) -> Result<()> {
    let path = path.as_ref();
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temporary = NamedTempFile::new_in(directory)?;
    {
        let mut writer = BufWriter::new(temporary.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temporary.as_file().sync_all()?;
    temporary.persist(path).map_err(|error| error.error)?;

    debug!("Wrote {path:?}");
    Ok(())
}

/// Format a coordinate as an integer if it has no fractional part.
pub fn format_coordinate(coordinate: R64) -> String {
    format!("{}", coordinate.raw())
}

/// Parse an optional numeric cell.
///
/// Empty cells and the usual missing value markers are `None`.
pub fn parse_optional_float(cell: &str) -> Option<std::result::Result<f64, ()>> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell == "NA" {
        None
    } else {
        Some(cell.parse().map_err(|_| ()))
    }
}

/// Parse an optional integral position such as `5` or `5.0`.
pub fn parse_optional_position(cell: &str) -> Option<std::result::Result<usize, ()>> {
    parse_optional_float(cell).map(|value| {
        value.and_then(|value| {
            if value.fract() == 0.0 && value >= 1.0 && value <= usize::MAX as f64 {
                Ok(value as usize)
            } else {
                Err(())
            }
        })
    })
}
