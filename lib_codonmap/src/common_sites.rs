use log::info;

use crate::selection::SelectionTable;

/// A participant value at or above this level counts as significant.
pub const SIGNIFICANCE_LEVEL: f64 = 0.9;
/// The default minimum number of significant participants for a row to be kept.
pub const DEFAULT_MIN_PARTICIPANTS: usize = 5;

/// The number of cells in `cells` that are at least `significance_level`.
pub fn count_significant(cells: &[Option<f64>], significance_level: f64) -> usize {
    cells
        .iter()
        .flatten()
        .filter(|value| **value >= significance_level)
        .count()
}

/// Keep the rows of `table` that are significant in at least `min_participants` participants.
///
/// Row order, participant columns and empty cells are preserved.
pub fn filter_common_sites(
    table: &SelectionTable,
    min_participants: usize,
    significance_level: f64,
) -> SelectionTable {
    let mut result = table.clone();
    result.retain(|_, cells| count_significant(cells, significance_level) >= min_participants);
    info!(
        "Kept {} of {} rows significant in at least {min_participants} participants",
        result.len(),
        table.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use noisy_float::types::r64;

    use super::{SIGNIFICANCE_LEVEL, count_significant, filter_common_sites};
    use crate::selection::SelectionTable;

    fn example() -> SelectionTable {
        let mut table = SelectionTable::new(["p1", "p2", "p3"]);
        table.insert_row(r64(5.0), vec![Some(0.95), Some(0.92), Some(0.3)]);
        table
    }

    #[test]
    fn threshold_two_keeps_row() {
        let filtered = filter_common_sites(&example(), 2, SIGNIFICANCE_LEVEL);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.get(r64(5.0), "p3"), Some(0.3));
    }

    #[test]
    fn threshold_three_drops_row() {
        let filtered = filter_common_sites(&example(), 3, SIGNIFICANCE_LEVEL);
        assert!(filtered.is_empty());
        assert_eq!(filtered.participants(), example().participants());
    }

    #[test]
    fn boundary_value_is_significant() {
        assert_eq!(count_significant(&[Some(0.9), Some(0.899), None], 0.9), 1);
    }

    #[test]
    fn kept_and_dropped_rows_respect_threshold() {
        let mut table = SelectionTable::new(["p1", "p2", "p3", "p4"]);
        let rows = [
            (1.0, [Some(0.95), Some(0.99), None, Some(0.1)]),
            (1.5, [None, None, None, None]),
            (2.0, [Some(0.9), Some(0.91), Some(0.92), None]),
            (7.25, [Some(0.2), Some(0.91), None, None]),
            (8.0, [Some(1.0), Some(1.0), Some(0.5), Some(0.95)]),
        ];
        for (coordinate, cells) in rows {
            table.insert_row(r64(coordinate), cells.to_vec());
        }

        let threshold = 2;
        let filtered = filter_common_sites(&table, threshold, SIGNIFICANCE_LEVEL);
        assert_eq!(
            filtered.coordinates().collect::<Vec<_>>(),
            vec![r64(1.0), r64(2.0), r64(8.0)]
        );

        for (coordinate, cells) in table.rows() {
            let kept = filtered.coordinates().any(|kept| kept == coordinate);
            assert_eq!(
                kept,
                count_significant(cells, SIGNIFICANCE_LEVEL) >= threshold
            );
        }
    }
}
