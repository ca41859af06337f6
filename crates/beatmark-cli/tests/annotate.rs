use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::error::Error;
use std::path::PathBuf;

#[test]
fn annotate_well_writes_figure() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("B3.png");

    let mut cmd = cargo_bin_cmd!("beatmark");
    cmd.args([
        "annotate",
        "--traces",
        &sample_path("test_data/traces_avg.csv"),
        "--well",
        "B3",
        "--drug",
        "Dofetilide",
        "--out",
        out.to_str().expect("utf8 path"),
        "--width",
        "600",
        "--height",
        "300",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let bundle: Value = serde_json::from_slice(&output)?;

    assert_eq!(bundle["crossings"]["indices"], serde_json::json!([24, 41]));
    let peak = bundle["primary"]["landmarks"]
        .as_array()
        .and_then(|list| list.iter().find(|l| l["role"] == "peak_amplitude"))
        .and_then(|l| l["index"].as_u64());
    assert_eq!(peak, Some(31));
    assert!(out.exists());
    assert!(std::fs::metadata(&out)?.len() > 0);
    Ok(())
}

#[test]
fn annotate_by_row_position() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("beatmark");
    cmd.args([
        "annotate",
        "--traces",
        &sample_path("test_data/traces_avg.csv"),
        "--row",
        "0",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let bundle: Value = serde_json::from_slice(&output)?;
    assert_eq!(bundle["crossings"]["indices"], serde_json::json!([22, 39]));
    assert_eq!(bundle["offset"], 10);
    Ok(())
}

#[test]
fn annotate_by_drug_alone() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("beatmark");
    cmd.args([
        "annotate",
        "--traces",
        &sample_path("test_data/traces_avg.csv"),
        "--drug",
        "Dofetilide",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let bundle: Value = serde_json::from_slice(&output)?;
    assert_eq!(bundle["crossings"]["indices"], serde_json::json!([24, 41]));
    Ok(())
}

#[test]
fn unknown_well_fails() {
    let mut cmd = cargo_bin_cmd!("beatmark");
    cmd.args([
        "annotate",
        "--traces",
        &sample_path("test_data/traces_avg.csv"),
        "--well",
        "Z9",
    ]);
    cmd.assert().failure();
}

fn sample_path(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join(relative);
    root.to_string_lossy().to_string()
}
