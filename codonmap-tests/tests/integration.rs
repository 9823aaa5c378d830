use std::fs;

use anyhow::Result;
use lib_codonmap::annotation::AnnotationRanges;
use util::run;

mod util;

#[test]
fn test_map_padded() -> Result<()> {
    let output = tempfile::tempdir()?;
    run(&format!(
        "map -c {{test_files}}/consensus.fasta -a {{test_files}}/aligned.fasta -d {} --pad-original",
        output.path().display()
    ))?;

    assert_eq!(
        fs::read_to_string(output.path().join("p1_position_mappings.csv"))?,
        "Column,Reference,AlignedConsensus,OriginalConsensus\n\
         1,1,1,1\n2,2,2,2\n3,,3,\n4,,4,3\n5,3,5,4\n6,4,6,5\n7,5,7,6\n8,6,8,7\n9,7,,\n10,8,,\n"
    );
    assert!(output.path().join("p2_position_mappings.csv").exists());
    assert!(!output.path().join("MH758564.1_position_mappings.csv").exists());
    Ok(())
}

#[test]
fn test_map_strict_skips_mismatched_participants() -> Result<()> {
    let output = tempfile::tempdir()?;
    run(&format!(
        "map -c {{test_files}}/consensus.fasta -a {{test_files}}/aligned.fasta -d {}",
        output.path().display()
    ))?;

    assert_eq!(fs::read_dir(output.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_map_missing_reference() {
    let output = tempfile::tempdir().unwrap();
    assert!(
        run(&format!(
            "map -c {{test_files}}/consensus.fasta -a {{test_files}}/aligned.fasta -d {} --reference-id K03455",
            output.path().display()
        ))
        .is_err()
    );
}

#[test]
fn test_aggregate_default_config() -> Result<()> {
    let output = tempfile::tempdir()?;
    run(&format!(
        "aggregate -d {{test_files}}/aggregate -m {{test_files}}/midpoints.json -o {} --threads 2",
        output.path().display()
    ))?;

    assert_eq!(
        fs::read_to_string(output.path().join("pos_selection_sites_probability.csv"))?,
        fs::read_to_string(util::test_file("probability.csv"))?
    );
    assert_eq!(
        fs::read_to_string(output.path().join("pos_selection_sites_dNdS.csv"))?,
        ",p1,p2,p3\n1,,0.5,\n2.5,2,,\n3,1.5,3,\n4,0.5,2,\n"
    );

    let annotations =
        AnnotationRanges::read_json(output.path().join("significant_annotations.json"))?.to_map();
    assert_eq!(annotations.len(), 5);
    assert_eq!(annotations["gag"], [0, 2]);
    assert_eq!(annotations["pol"], [3, 8]);
    assert_eq!(annotations["p17"], [0, 2]);
    assert_eq!(annotations["PR"], [3, 4]);
    assert_eq!(annotations["RT"], [5, 8]);

    assert_eq!(
        fs::read_to_string(output.path().join("pol_probability.csv"))?,
        ",p1,p2,p3\n3,0.97,0.93,\n4,0.2,0.91,\n"
    );
    assert_eq!(
        fs::read_to_string(output.path().join("gag_probability.csv"))?,
        ",p1,p2,p3\n1,,0.1,\n"
    );
    Ok(())
}

#[test]
fn test_aggregate_with_config() -> Result<()> {
    let output = tempfile::tempdir()?;
    run(&format!(
        "aggregate -d {{test_files}}/aggregate -m {{test_files}}/midpoints.json -o {} -c {{test_files}}/aggregate.toml",
        output.path().display()
    ))?;

    assert_eq!(
        fs::read_to_string(output.path().join("pos_selection_sites_probability.csv"))?,
        ",p1,p2,p3\n2.5,0.95,,\n3,0.97,0.93,\n4,,0.91,\n"
    );
    assert!(!output.path().join("pos_selection_sites_dNdS.csv").exists());
    assert!(!output.path().join("pol_dNdS.csv").exists());
    assert!(output.path().join("pol_probability.csv").exists());
    Ok(())
}

#[test]
fn test_filter() -> Result<()> {
    let output = tempfile::tempdir()?;
    let path = output.path().join("common.csv");

    run(&format!(
        "filter -i {{test_files}}/probability.csv -o {} -t 2",
        path.display()
    ))?;
    assert_eq!(fs::read_to_string(&path)?, ",p1,p2,p3\n3,0.97,0.93,\n");

    run(&format!(
        "filter -i {{test_files}}/probability.csv -o {}",
        path.display()
    ))?;
    assert_eq!(fs::read_to_string(&path)?, ",p1,p2,p3\n");
    Ok(())
}

#[test]
fn test_filter_malformed_input() {
    let output = tempfile::tempdir().unwrap();
    let path = output.path().join("common.csv");

    assert!(
        run(&format!(
            "filter -i {{test_files}}/malformed_probability.csv -o {}",
            path.display()
        ))
        .is_err()
    );
    assert!(
        run(&format!(
            "filter -i {{test_files}}/missing.csv -o {}",
            path.display()
        ))
        .is_err()
    );
    assert!(!path.exists());
}
