use std::{collections::BTreeMap, ops::RangeInclusive};

use noisy_float::types::R64;

pub mod io;

/// Values of one statistic for every participant, keyed by reference coordinate.
///
/// A coordinate with a fractional part lies between two reference positions.
/// Rows are kept in ascending coordinate order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionTable {
    participants: Vec<String>,
    rows: BTreeMap<R64, Vec<Option<f64>>>,
}

impl SelectionTable {
    pub fn new(participants: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            participants: participants.into_iter().map(Into::into).collect(),
            rows: BTreeMap::new(),
        }
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn participant_index(&self, participant: &str) -> Option<usize> {
        self.participants
            .iter()
            .position(|candidate| candidate == participant)
    }

    /// Add a participant column if it does not exist yet, and return its index.
    pub fn add_participant(&mut self, participant: &str) -> usize {
        if let Some(index) = self.participant_index(participant) {
            return index;
        }

        self.participants.push(participant.to_string());
        for row in self.rows.values_mut() {
            row.push(None);
        }
        self.participants.len() - 1
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (R64, &[Option<f64>])> {
        self.rows
            .iter()
            .map(|(coordinate, cells)| (*coordinate, cells.as_slice()))
    }

    pub fn coordinates(&self) -> impl Iterator<Item = R64> + '_ {
        self.rows.keys().copied()
    }

    pub fn get(&self, coordinate: R64, participant: &str) -> Option<f64> {
        let index = self.participant_index(participant)?;
        self.rows.get(&coordinate)?[index]
    }

    /// Set a cell, creating the row if needed.
    ///
    /// Returns the previous value of the cell.
    pub fn set(&mut self, coordinate: R64, participant: usize, value: Option<f64>) -> Option<f64> {
        let width = self.participants.len();
        let row = self
            .rows
            .entry(coordinate)
            .or_insert_with(|| vec![None; width]);
        std::mem::replace(&mut row[participant], value)
    }

    /// Insert a row with all cells given.
    pub fn insert_row(&mut self, coordinate: R64, cells: Vec<Option<f64>>) {
        debug_assert_eq!(cells.len(), self.participants.len());
        self.rows.insert(coordinate, cells);
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(R64, &[Option<f64>]) -> bool) {
        self.rows.retain(|coordinate, cells| keep(*coordinate, cells));
    }

    /// A copy containing only the rows with coordinates in `range`.
    pub fn subset(&self, range: RangeInclusive<R64>) -> Self {
        Self {
            participants: self.participants.clone(),
            rows: self
                .rows
                .range(range)
                .map(|(coordinate, cells)| (*coordinate, cells.clone()))
                .collect(),
        }
    }
}
