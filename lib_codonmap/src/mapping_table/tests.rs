use std::fs;

use super::{AnnotatedMappingTable, CoordinateMappingTable, LengthPolicy, MappingConfig, RegionColumn};
use crate::{
    coordinate_system::CoordinateSystem::{self, AlignedConsensus, OriginalConsensus, Reference},
    error::Error,
    index_types::AlignmentColumn,
    position_index::{PositionArray, UnknownSymbolPolicy},
};

fn positions(table: &CoordinateMappingTable, system: CoordinateSystem) -> Vec<Option<usize>> {
    table.positions(system).iter().collect()
}

#[test]
fn build_three_systems() {
    let table =
        CoordinateMappingTable::build("p1", "A-CD", "ACCD", "AC-D", &MappingConfig::default())
            .unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(positions(&table, Reference), vec![Some(1), None, Some(2), Some(3)]);
    assert_eq!(
        positions(&table, AlignedConsensus),
        vec![Some(1), Some(2), Some(3), Some(4)]
    );
    assert_eq!(
        positions(&table, OriginalConsensus),
        vec![Some(1), Some(2), None, Some(3)]
    );
    assert_eq!(
        table.column_of(Reference, 2),
        Some(AlignmentColumn::from(3usize))
    );
    assert_eq!(table.column_of(Reference, 4), None);
    assert_eq!(table.last_defined(Reference), Some(3));

    for system in CoordinateSystem::ALL {
        assert!(table.positions(system).is_strictly_increasing());
    }
}

#[test]
fn length_mismatch() {
    let result =
        CoordinateMappingTable::build("p1", "A-CD", "ACCD", "ACD", &MappingConfig::default());
    match result {
        Err(Error::LengthMismatch {
            participant,
            reference,
            aligned_consensus,
            original_consensus,
        }) => {
            assert_eq!(participant, "p1");
            assert_eq!((reference, aligned_consensus, original_consensus), (4, 4, 3));
        }
        other => panic!("Expected a length mismatch, but got {other:?}"),
    }
}

#[test]
fn pad_shorter() {
    let config = MappingConfig {
        length_policy: LengthPolicy::PadShorter,
        ..Default::default()
    };
    let table = CoordinateMappingTable::build("p1", "A-CD", "ACCD", "AC", &config).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(
        positions(&table, OriginalConsensus),
        vec![Some(1), Some(2), None, None]
    );
}

#[test]
fn unknown_symbols_follow_policy() {
    let config = MappingConfig {
        unknown_symbols: UnknownSymbolPolicy::Reject,
        ..Default::default()
    };
    assert!(matches!(
        CoordinateMappingTable::build("p1", "A*CD", "ACCD", "ACCD", &config),
        Err(Error::UnknownSymbol { symbol: '*', .. })
    ));
    assert!(
        CoordinateMappingTable::build("p1", "A*CD", "ACCD", "ACCD", &MappingConfig::default())
            .is_ok()
    );
}

#[test]
fn reverse_index_keeps_first_column() {
    let duplicated: PositionArray = [Some(1), Some(2), Some(2), Some(3)].into_iter().collect();
    let plain: PositionArray = [Some(1), Some(2), Some(3), Some(4)].into_iter().collect();
    let table =
        CoordinateMappingTable::from_position_arrays([duplicated, plain.clone(), plain]);
    assert_eq!(
        table.column_of(Reference, 2),
        Some(AlignmentColumn::from(2usize))
    );
}

#[test]
fn csv_round_trip_with_regions() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("p1_position_mappings.csv");

    let mapping =
        CoordinateMappingTable::build("p1", "A-CD", "ACCD", "AC-D", &MappingConfig::default())
            .unwrap();
    let table = AnnotatedMappingTable {
        mapping,
        regions: vec![RegionColumn {
            name: "Regions1".to_string(),
            labels: vec![
                Some("V1".to_string()),
                Some("V1".to_string()),
                None,
                Some("C2".to_string()),
            ],
        }],
    };
    table.write_csv(&path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Column,Reference,AlignedConsensus,OriginalConsensus,Regions1\n\
         1,1,1,1,V1\n\
         2,,2,2,V1\n\
         3,2,3,,\n\
         4,3,4,3,C2\n"
    );

    let read = AnnotatedMappingTable::read_csv(&path, None).unwrap();
    assert_eq!(read, table);

    let mapping_only = CoordinateMappingTable::read_csv(&path).unwrap();
    assert_eq!(mapping_only, table.mapping);
}

#[test]
fn read_annotation_step_output() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("p1_consensus_annotations.csv");
    fs::write(
        &path,
        ",HXB2.Position,Consensus.Aligned.to.HXB2.Position,Original.Consensus.Position,Regions1,Regions2,Regions3\n\
         1,1.0,1.0,1.0,signal peptide,NA,\n\
         2,NaN,2.0,2.0,signal peptide,,\n\
         3,2.0,3.0,,C1,V1/V2,\n",
    )
    .unwrap();

    let table = AnnotatedMappingTable::read_csv(
        &path,
        Some(&["Regions1".to_string(), "Regions2".to_string()]),
    )
    .unwrap();
    assert_eq!(positions(&table.mapping, Reference), vec![Some(1), None, Some(2)]);
    assert_eq!(
        positions(&table.mapping, OriginalConsensus),
        vec![Some(1), Some(2), None]
    );
    assert_eq!(table.regions.len(), 2);
    assert_eq!(
        table.region("Regions2").unwrap().labels,
        vec![None, None, Some("V1/V2".to_string())]
    );
}

#[test]
fn read_missing_columns() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("broken.csv");
    fs::write(&path, "Column,Reference,AlignedConsensus\n1,1,1\n").unwrap();
    assert!(matches!(
        AnnotatedMappingTable::read_csv(&path, None),
        Err(Error::MissingColumn { column, .. }) if column == "OriginalConsensus"
    ));

    fs::write(
        &path,
        "Column,Reference,AlignedConsensus,OriginalConsensus\n1,1,1,1\n",
    )
    .unwrap();
    assert!(matches!(
        AnnotatedMappingTable::read_csv(&path, Some(&["Regions1".to_string()])),
        Err(Error::MissingColumn { column, .. }) if column == "Regions1"
    ));
}

#[test]
fn select_missing_regions_as_unlabelled() {
    let mapping =
        CoordinateMappingTable::build("p1", "ACD", "ACD", "ACD", &MappingConfig::default())
            .unwrap();
    let mut table = AnnotatedMappingTable {
        mapping,
        regions: vec![
            RegionColumn {
                name: "Notes".to_string(),
                labels: vec![Some("x".to_string()), None, None],
            },
            RegionColumn {
                name: "Regions2".to_string(),
                labels: vec![None, Some("V3".to_string()), None],
            },
        ],
    };

    let missing = table.select_regions(&["Regions1".to_string(), "Regions2".to_string()]);
    assert_eq!(missing, vec!["Regions1"]);
    assert_eq!(
        table
            .regions
            .iter()
            .map(|region| region.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Regions1", "Regions2"]
    );
    assert_eq!(table.region("Regions1").unwrap().labels, vec![None; 3]);

    let regions2 = table.region("Regions2").unwrap();
    assert_eq!(regions2.label(AlignmentColumn::from(2usize)), Some("V3"));
    assert_eq!(regions2.label(AlignmentColumn::from(0usize)), None);
    assert_eq!(regions2.label(AlignmentColumn::from(4usize)), None);
}

#[test]
fn read_malformed_position() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("broken.csv");
    fs::write(
        &path,
        "Column,Reference,AlignedConsensus,OriginalConsensus\n1,1,1,1\n2,1.5,2,2\n",
    )
    .unwrap();
    assert!(matches!(
        CoordinateMappingTable::read_csv(&path),
        Err(Error::MalformedValue { line: 3, value, .. }) if value == "1.5"
    ));
}
