use anyhow::{bail, Context, Result};

/// Dose label used for untreated wells.
pub const BASELINE: &str = "baseline";

const MOLAR_UNITS: [(&str, f64); 5] = [
    ("pM", 1e-12),
    ("nM", 1e-9),
    ("uM", 1e-6),
    ("\u{00B5}M", 1e-6),
    ("mM", 1e-3),
];

/// Labels that denote a zero concentration of drug.
pub fn is_zero_dose(label: &str) -> bool {
    matches!(label.trim(), "0nM" | "0uM")
}

/// Convert a dose label such as `"300nM"` or `"0.3uM"` to molar concentration.
///
/// `baseline` is zero. Percentage labels describe vehicle (solvent) wells
/// and also carry no drug, so they map to zero as well.
pub fn parse_dose(label: &str) -> Result<f64> {
    let label = label.trim();
    if label.eq_ignore_ascii_case(BASELINE) {
        return Ok(0.0);
    }
    if let Some(number) = label.strip_suffix('%') {
        number
            .trim()
            .parse::<f64>()
            .with_context(|| format!("invalid vehicle percentage {:?}", label))?;
        return Ok(0.0);
    }
    for (suffix, scale) in MOLAR_UNITS {
        if let Some(number) = label.strip_suffix(suffix) {
            let value: f64 = number
                .trim()
                .parse()
                .with_context(|| format!("invalid dose value {:?}", label))?;
            if value < 0.0 {
                bail!("negative dose {:?}", label);
            }
            return Ok(value * scale);
        }
    }
    bail!("unrecognised dose unit in {:?}", label)
}
