use std::path::Path;

use log::debug;

use super::{AnnotatedMappingTable, CoordinateMappingTable, RegionColumn, system_index};
use crate::{
    coordinate_system::CoordinateSystem,
    error::{Error, Result},
    io::{parse_optional_position, write_atomically},
    position_index::PositionArray,
};

const INDEX_COLUMN_NAMES: [&str; 2] = ["", "Column"];

impl AnnotatedMappingTable {
    /// Write the table as CSV, one row per alignment column.
    ///
    /// Gaps and missing labels are empty cells.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        write_atomically(path, |writer| {
            let mut writer = csv::Writer::from_writer(writer);

            let mut header = vec!["Column"];
            header.extend(CoordinateSystem::ALL.map(|system| system.column_name()));
            header.extend(self.regions.iter().map(|region| region.name.as_str()));
            writer.write_record(&header)?;

            for column in self.mapping.alignment_columns() {
                let mut record = vec![column.as_usize().to_string()];
                record.extend(CoordinateSystem::ALL.map(|system| {
                    self.mapping
                        .get(system, column)
                        .map(|position| position.to_string())
                        .unwrap_or_default()
                }));
                record.extend(
                    self.regions
                        .iter()
                        .map(|region| region.label(column).unwrap_or_default().to_string()),
                );
                writer.write_record(&record)?;
            }

            writer.flush()?;
            Ok(())
        })
    }

    /// Read a table written by [`write_csv`](Self::write_csv) or by the annotation step.
    ///
    /// If `region_columns` is `None`, all columns other than the index and the coordinate systems
    /// are region columns.
    pub fn read_csv(path: impl AsRef<Path>, region_columns: Option<&[String]>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading mapping table {path:?}");
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_path(path)?;
        let headers = reader.headers()?.clone();

        let mut system_columns = [None; 3];
        let mut candidate_regions = Vec::new();
        for (index, name) in headers.iter().enumerate() {
            if let Some(system) = CoordinateSystem::from_column_name(name) {
                system_columns[system_index(system)].get_or_insert(index);
            } else if index == 0 && INDEX_COLUMN_NAMES.contains(&name.trim()) {
                continue;
            } else {
                candidate_regions.push((index, name.trim().to_string()));
            }
        }

        let system_columns = required_columns(&system_columns, path)?;
        let region_indices = match region_columns {
            None => candidate_regions,
            Some(names) => names
                .iter()
                .map(|name| {
                    candidate_regions
                        .iter()
                        .find(|(_, candidate)| candidate == name)
                        .cloned()
                        .ok_or_else(|| Error::MissingColumn {
                            path: path.to_path_buf(),
                            column: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        let mut positions: [Vec<Option<usize>>; 3] = Default::default();
        let mut labels = vec![Vec::new(); region_indices.len()];
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|position| position.line()).unwrap_or(0);

            for (slot, index) in system_columns.iter().enumerate() {
                let cell = record.get(*index).unwrap_or_default();
                let position = parse_optional_position(cell)
                    .transpose()
                    .map_err(|()| Error::MalformedValue {
                        path: path.to_path_buf(),
                        line,
                        value: cell.to_string(),
                    })?;
                positions[slot].push(position);
            }

            for (labels, (index, _)) in labels.iter_mut().zip(&region_indices) {
                let label = record.get(*index).unwrap_or_default().trim();
                labels.push(if label.is_empty() || label == "NA" {
                    None
                } else {
                    Some(label.to_string())
                });
            }
        }

        let mapping = CoordinateMappingTable::from_position_arrays(
            positions.map(|positions| positions.into_iter().collect::<PositionArray>()),
        );
        let regions = region_indices
            .into_iter()
            .zip(labels)
            .map(|((_, name), labels)| RegionColumn { name, labels })
            .collect();

        debug!("Read mapping table with {} columns", mapping.len());
        Ok(Self { mapping, regions })
    }
}

impl CoordinateMappingTable {
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        AnnotatedMappingTable::from(self.clone()).write_csv(path)
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        AnnotatedMappingTable::read_csv(path, Some(&[] as &[String])).map(|table| table.mapping)
    }
}

fn required_columns(columns: &[Option<usize>; 3], path: &Path) -> Result<[usize; 3]> {
    let mut result = [0; 3];
    for system in CoordinateSystem::ALL {
        let slot = system_index(system);
        result[slot] = columns[slot].ok_or_else(|| Error::MissingColumn {
            path: path.to_path_buf(),
            column: system.column_name().to_string(),
        })?;
    }
    Ok(result)
}
