//! Translation of positions between the coordinate systems of a [`CoordinateMappingTable`].
//!
//! A position that falls into a gap of the target system is interpolated between
//! the nearest defined neighbours.
//! If the gap reaches the start or the end of the alignment, the position is placed
//! half a unit before the first or after the last defined position.

use noisy_float::types::{R64, r64};

use crate::{
    coordinate_system::CoordinateSystem,
    error::{Error, Result},
    index_types::AlignmentColumn,
    mapping_table::CoordinateMappingTable,
};


/// Offset of a position that lies before the first defined position of a system.
pub const LEADING_GAP_OFFSET: f64 = -0.5;
/// Offset of a position that lies after the last defined position of a system.
pub const TRAILING_GAP_OFFSET: f64 = 0.5;

/// A position in some coordinate system, given as a defined anchor position plus an offset.
///
/// The offset is zero if the position is defined itself.
/// Between two defined positions it lies in `[0, 1)`,
/// and it is exactly `-0.5` or `+0.5` at the open ends.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct InterpolatedPosition {
    pub anchor: usize,
    pub offset: R64,
}

impl InterpolatedPosition {
    pub fn exact(anchor: usize) -> Self {
        Self {
            anchor,
            offset: r64(0.0),
        }
    }

    pub fn is_exact(&self) -> bool {
        self.offset.raw() == 0.0
    }

    pub fn value(&self) -> R64 {
        r64(self.anchor as f64) + self.offset
    }
}

/// The position of alignment `column` in `system`.
///
/// Columns past the end of the table behave like a gap that runs to the end of the alignment.
pub fn interpolate(
    table: &CoordinateMappingTable,
    system: CoordinateSystem,
    column: AlignmentColumn,
) -> Result<InterpolatedPosition> {
    if let Some(position) = table.get(system, column) {
        return Ok(InterpolatedPosition::exact(position));
    }

    let lower = (1..=column.as_usize().min(table.len()))
        .rev()
        .map(AlignmentColumn::from)
        .find_map(|lower| table.get(system, lower).map(|position| (lower, position)));
    let upper = (column.as_usize().max(1)..=table.len())
        .map(AlignmentColumn::from)
        .find_map(|upper| table.get(system, upper).map(|position| (upper, position)));

    match (lower, upper) {
        (Some((lower_column, lower_position)), Some((upper_column, _))) => {
            let fraction = (column - lower_column) as f64 / (upper_column - lower_column) as f64;
            Ok(InterpolatedPosition {
                anchor: lower_position,
                offset: r64(fraction),
            })
        }
        (None, Some((_, upper_position))) => Ok(InterpolatedPosition {
            anchor: upper_position,
            offset: r64(LEADING_GAP_OFFSET),
        }),
        (Some((_, lower_position)), None) => Ok(InterpolatedPosition {
            anchor: lower_position,
            offset: r64(TRAILING_GAP_OFFSET),
        }),
        (None, None) => Err(Error::UndefinedCoordinate { system }),
    }
}

/// The first alignment column whose `system` position equals `position`.
pub fn resolve_column(
    table: &CoordinateMappingTable,
    system: CoordinateSystem,
    position: usize,
) -> Result<AlignmentColumn> {
    table
        .column_of(system, position)
        .ok_or(Error::UnknownPosition { system, position })
}

/// Translate `query` from `source` to `target`.
///
/// The anchor of `query` is resolved to an alignment column via `source`.
/// If `target` is defined at that column, the offset of `query` is carried over.
/// Otherwise the column is interpolated in `target` and the offset of `query` is dropped.
pub fn translate(
    table: &CoordinateMappingTable,
    source: CoordinateSystem,
    target: CoordinateSystem,
    query: InterpolatedPosition,
) -> Result<InterpolatedPosition> {
    let column = resolve_column(table, source, query.anchor)?;
    match table.get(target, column) {
        Some(position) => Ok(InterpolatedPosition {
            anchor: position,
            offset: query.offset,
        }),
        None => interpolate(table, target, column),
    }
}

/// The reference coordinate of a site reported in original consensus columns.
///
/// The site is interpolated in the original consensus, located in the aligned consensus
/// and then translated to the reference.
pub fn site_to_reference(table: &CoordinateMappingTable, site: AlignmentColumn) -> Result<R64> {
    let original = interpolate(table, CoordinateSystem::OriginalConsensus, site)?;
    translate(
        table,
        CoordinateSystem::AlignedConsensus,
        CoordinateSystem::Reference,
        original,
    )
    .map(|position| position.value())
}

/// The (fractional) joint alignment column of a site reported in original consensus columns.
pub fn site_to_alignment_column(
    table: &CoordinateMappingTable,
    site: AlignmentColumn,
) -> Result<R64> {
    let original = interpolate(table, CoordinateSystem::OriginalConsensus, site)?;
    let column = resolve_column(table, CoordinateSystem::AlignedConsensus, original.anchor)?;
    Ok(r64(column.as_usize() as f64) + original.offset)
}
