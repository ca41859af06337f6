use super::dose::{is_zero_dose, parse_dose, BASELINE};
use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Rows missing any of these are dropped during cleanup.
pub const REQUIRED_FEATURES: [&str; 3] = [
    "voltage_apd30",
    "voltage_apd90",
    "voltage_beating_frequencies",
];

const KEY_COLUMNS: [&str; 5] = ["drug", "experiment", "well", "tissue", "dose"];

/// One cleaned row of the per-well feature table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub index: String,
    pub drug: String,
    pub experiment: String,
    pub well: String,
    pub tissue: String,
    pub dose: String,
    /// Molar concentration derived from `dose`.
    pub dose_molar: f64,
    /// Every other column, unparsed.
    pub features: BTreeMap<String, String>,
}

impl FeatureRow {
    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features
            .get(name)
            .filter(|value| !is_missing(value))
            .and_then(|value| value.parse().ok())
    }
}

fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("na")
}

// Numeric keys (experiment ids) sort by value, everything else lexically.
fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

fn sort_rows(rows: &mut [FeatureRow]) {
    rows.sort_by(|a, b| {
        compare_keys(&a.drug, &b.drug)
            .then_with(|| compare_keys(&a.experiment, &b.experiment))
            .then_with(|| compare_keys(&a.well, &b.well))
            .then_with(|| compare_keys(&a.tissue, &b.tissue))
            .then_with(|| b.dose.cmp(&a.dose))
    });
}

/// Parse and clean a feature table.
///
/// Zero doses become `baseline`, rows lacking a required voltage feature are
/// dropped and the rest are sorted by drug, experiment, well, tissue and
/// descending dose.
pub fn parse_features<R: Read>(reader: R) -> Result<Vec<FeatureRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = reader.headers().context("reading header")?.clone();
    for column in KEY_COLUMNS.iter().chain(REQUIRED_FEATURES.iter()) {
        if !headers.iter().any(|h| h == *column) {
            bail!("feature table is missing the {} column", column);
        }
    }
    let has_index = headers.get(0).map(|h| h.is_empty()).unwrap_or(false);

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading feature row {}", row + 1))?;
        let mut index = row.to_string();
        let mut features = BTreeMap::new();
        let mut keys: BTreeMap<&str, String> = BTreeMap::new();
        for (col, (name, value)) in headers.iter().zip(record.iter()).enumerate() {
            if col == 0 && has_index {
                index = value.to_string();
            } else if let Some(key) = KEY_COLUMNS.iter().find(|k| **k == name) {
                keys.insert(*key, value.to_string());
            } else {
                features.insert(name.to_string(), value.to_string());
            }
        }
        if REQUIRED_FEATURES
            .iter()
            .any(|name| features.get(*name).map_or(true, |v| is_missing(v)))
        {
            dropped += 1;
            continue;
        }
        let mut take = |key: &str| keys.remove(key).unwrap_or_default();
        let mut dose = take("dose");
        if is_zero_dose(&dose) {
            dose = BASELINE.to_string();
        }
        let dose_molar =
            parse_dose(&dose).with_context(|| format!("feature row {} (index {})", row + 1, index))?;
        rows.push(FeatureRow {
            index,
            drug: take("drug"),
            experiment: take("experiment"),
            well: take("well"),
            tissue: take("tissue"),
            dose,
            dose_molar,
            features,
        });
    }
    if dropped > 0 {
        warn!(
            "dropped {} feature rows missing one of {:?}",
            dropped, REQUIRED_FEATURES
        );
    }
    sort_rows(&mut rows);
    debug!("kept {} feature rows", rows.len());
    Ok(rows)
}

/// Load and clean `features.csv`.
pub fn read_features(path: &Path) -> Result<Vec<FeatureRow>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_features(file).with_context(|| format!("parsing {}", path.display()))
}

/// Rows matching an optional drug and an optional well.
pub fn filter_rows<'a>(
    rows: &'a [FeatureRow],
    drug: Option<&str>,
    well: Option<&str>,
) -> Vec<&'a FeatureRow> {
    rows.iter()
        .filter(|row| drug.map_or(true, |d| row.drug == d))
        .filter(|row| well.map_or(true, |w| row.well == w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
,drug,experiment,well,tissue,dose,voltage_apd30,voltage_apd90,voltage_beating_frequencies
0,Cisapride,2,D7,1,0nM,120.5,310.2,0.9
1,Cisapride,2,D7,1,30nM,125.0,330.0,0.8
2,Cisapride,2,D7,1,300nM,130.1,,0.7
3,Cisapride,10,A1,1,3uM,140.0,360.0,0.6
4,Aspirin,1,B2,2,0.06%,100.0,250.0,1.0
5,Cisapride,2,D7,1,3nM,121.0,312.0,nan
";

    #[test]
    fn drops_rows_missing_required_features() {
        let rows = parse_features(TABLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.index != "2" && r.index != "5"));
    }

    #[test]
    fn zero_dose_becomes_baseline() {
        let rows = parse_features(TABLE.as_bytes()).unwrap();
        let base = rows.iter().find(|r| r.index == "0").unwrap();
        assert_eq!(base.dose, "baseline");
        assert_eq!(base.dose_molar, 0.0);
    }

    #[test]
    fn sorts_by_keys_with_descending_dose() {
        let rows = parse_features(TABLE.as_bytes()).unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.index.as_str()).collect();
        // Aspirin first; experiment 2 before 10; baseline sorts above 30nM
        assert_eq!(order, vec!["4", "0", "1", "3"]);
    }

    #[test]
    fn exposes_numeric_features_and_filters() {
        let rows = parse_features(TABLE.as_bytes()).unwrap();
        let d7 = filter_rows(&rows, Some("Cisapride"), Some("D7"));
        assert_eq!(d7.len(), 2);
        assert_eq!(d7[1].feature("voltage_apd90"), Some(330.0));
        assert!((d7[1].dose_molar - 30e-9).abs() < 1e-18);
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let err = parse_features("drug,well\nA,B\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("experiment"));
    }
}
