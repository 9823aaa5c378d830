use std::path::Path;

use log::debug;
use noisy_float::types::R64;

use super::SelectionTable;
use crate::{
    error::{Error, Result},
    io::{format_coordinate, parse_optional_float, write_atomically},
};

impl SelectionTable {
    /// Write the table as CSV.
    ///
    /// The header starts with an empty cell followed by the participants.
    /// Each row starts with its coordinate, and missing values are empty cells.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        write_atomically(path, |writer| {
            let mut writer = csv::Writer::from_writer(writer);

            let mut header = vec![""];
            header.extend(self.participants.iter().map(String::as_str));
            writer.write_record(&header)?;

            for (coordinate, cells) in self.rows() {
                let mut record = vec![format_coordinate(coordinate)];
                record.extend(
                    cells
                        .iter()
                        .map(|cell| cell.map(|value| value.to_string()).unwrap_or_default()),
                );
                writer.write_record(&record)?;
            }

            writer.flush()?;
            Ok(())
        })
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading selection table {path:?}");
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        let participants: Vec<_> = reader
            .headers()?
            .iter()
            .skip(1)
            .map(|participant| participant.trim().to_string())
            .collect();
        let mut table = Self::new(participants);

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|position| position.line()).unwrap_or(0);
            let malformed = |value: &str| Error::MalformedValue {
                path: path.to_path_buf(),
                line,
                value: value.to_string(),
            };

            let coordinate = record.get(0).unwrap_or_default();
            let coordinate = coordinate
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(R64::try_new)
                .ok_or_else(|| malformed(coordinate))?;

            let cells = record
                .iter()
                .skip(1)
                .map(|cell| parse_optional_float(cell).transpose().map_err(|()| malformed(cell)))
                .collect::<Result<Vec<_>>>()?;
            table.insert_row(coordinate, cells);
        }

        debug!(
            "Read selection table with {} rows and {} participants",
            table.len(),
            table.participants().len()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use noisy_float::types::r64;

    use crate::{error::Error, selection::SelectionTable};

    #[test]
    fn write_and_read() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("pos_selection_sites_probability.csv");

        let mut table = SelectionTable::new(["p1", "p2"]);
        table.set(r64(5.0), 0, Some(0.95));
        table.set(r64(1.5), 1, Some(0.3));
        table.set(r64(5.0), 1, Some(0.92));
        table.write_csv(&path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            ",p1,p2\n1.5,,0.3\n5,0.95,0.92\n"
        );
        assert_eq!(SelectionTable::read_csv(&path).unwrap(), table);
    }

    #[test]
    fn read_pandas_output() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("table.csv");
        fs::write(&path, ",p1,p2\n3.0,0.91,NaN\n3.3333333333333335,,1.0\n").unwrap();

        let table = SelectionTable::read_csv(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(r64(3.0), "p1"), Some(0.91));
        assert_eq!(table.get(r64(3.0), "p2"), None);
        assert_eq!(table.get(r64(10.0 / 3.0), "p2"), Some(1.0));
    }

    #[test]
    fn read_malformed() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("table.csv");
        fs::write(&path, ",p1\nfive,0.91\n").unwrap();
        assert!(matches!(
            SelectionTable::read_csv(&path),
            Err(Error::MalformedValue { value, .. }) if value == "five"
        ));

        fs::write(&path, ",p1\n5,high\n").unwrap();
        assert!(matches!(
            SelectionTable::read_csv(&path),
            Err(Error::MalformedValue { value, line: 2, .. }) if value == "high"
        ));
    }
}
