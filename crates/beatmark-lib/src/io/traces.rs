use super::text::parse_list_literal;
use crate::signal::{Series, SeriesPair};
use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Averaged signal recorded for each well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Voltage,
    Calcium,
    Displacement,
    Velocity,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Voltage,
        SignalKind::Calcium,
        SignalKind::Displacement,
        SignalKind::Velocity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SignalKind::Voltage => "voltage",
            SignalKind::Calcium => "calcium",
            SignalKind::Displacement => "displacement",
            SignalKind::Velocity => "velocity",
        }
    }

    pub fn time_column(&self) -> String {
        format!("{}_time", self.name())
    }

    pub fn trace_column(&self) -> String {
        format!("{}_trace", self.name())
    }
}

impl FromStr for SignalKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        SignalKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("unknown signal kind {:?}", s))
    }
}

fn is_list_column(name: &str) -> bool {
    SignalKind::ALL
        .iter()
        .any(|kind| name == kind.time_column() || name == kind.trace_column())
}

/// One row of the averaged-trace table.
#[derive(Debug, Clone)]
pub struct TraceRecord {
    /// Value of the leading unnamed index column, or the row number.
    pub index: String,
    pub metadata: BTreeMap<String, String>,
    lists: BTreeMap<String, Vec<f64>>,
}

impl TraceRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    fn list(&self, column: &str) -> Result<&[f64]> {
        self.lists
            .get(column)
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow!("trace row {} has no {} column", self.index, column))
    }

    /// Time base and samples of one signal.
    pub fn series(&self, kind: SignalKind) -> Result<Series> {
        let time = self.list(&kind.time_column())?;
        let values = self.list(&kind.trace_column())?;
        Series::new(time.to_vec(), values.to_vec())
            .with_context(|| format!("trace row {}: invalid {} series", self.index, kind.name()))
    }

    /// Displacement as the primary axis, velocity as the secondary.
    pub fn motion_pair(&self) -> Result<SeriesPair> {
        let primary = self.series(SignalKind::Displacement)?;
        let secondary = self.series(SignalKind::Velocity)?;
        SeriesPair::new(primary, secondary)
            .with_context(|| format!("trace row {}: displacement/velocity mismatch", self.index))
    }
}

/// Parse an averaged-trace table from any reader.
pub fn parse_traces<R: Read>(reader: R) -> Result<Vec<TraceRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader.headers().context("reading header")?.clone();
    let has_index = headers.get(0).map(|h| h.trim().is_empty()).unwrap_or(false);

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading trace row {}", row + 1))?;
        let mut index = row.to_string();
        let mut metadata = BTreeMap::new();
        let mut lists = BTreeMap::new();
        for (col, (name, value)) in headers.iter().zip(record.iter()).enumerate() {
            if col == 0 && has_index {
                index = value.trim().to_string();
            } else if is_list_column(name) {
                let parsed = parse_list_literal(value)
                    .with_context(|| format!("trace row {}, column {}", row + 1, name))?;
                lists.insert(
                    name.to_string(),
                    parsed.into_iter().map(f64::from).collect::<Vec<_>>(),
                );
            } else {
                metadata.insert(name.to_string(), value.trim().to_string());
            }
        }
        records.push(TraceRecord {
            index,
            metadata,
            lists,
        });
    }
    if records.is_empty() {
        bail!("trace table has no rows");
    }
    debug!("parsed {} trace rows", records.len());
    Ok(records)
}

/// Load `traces_avg.csv`.
pub fn read_traces(path: &Path) -> Result<Vec<TraceRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_traces(file).with_context(|| format!("parsing {}", path.display()))
}

/// First row matching an optional well and an optional drug.
pub fn find_trace<'a>(
    records: &'a [TraceRecord],
    well: Option<&str>,
    drug: Option<&str>,
) -> Option<&'a TraceRecord> {
    records.iter().find(|record| {
        well.map_or(true, |w| record.get("well") == Some(w))
            && drug.map_or(true, |d| record.get("drug") == Some(d))
    })
}
