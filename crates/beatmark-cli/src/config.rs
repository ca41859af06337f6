use anyhow::{anyhow, Context, Result};
use beatmark_lib::landmarks::{LandmarkIndex, OffsetPolicy, WindowConfig};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// Window flags shared by the annotation commands. Flags win over `--config`.
#[derive(Args, Debug, Default)]
pub struct WindowArgs {
    /// TOML file with start, end, indices and offset_policy
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// First primary sample of the analysis window
    #[arg(long)]
    pub start: Option<usize>,
    /// One past the last primary sample (defaults to the series length)
    #[arg(long)]
    pub end: Option<usize>,
    /// Five comma-separated landmark indices relative to --start
    #[arg(long, value_delimiter = ',')]
    pub indices: Option<Vec<usize>>,
    /// Fail instead of flooring when the pair offset is odd
    #[arg(long)]
    pub reject_odd_offset: bool,
}

pub fn read_window_config(path: &Path) -> Result<WindowConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: WindowConfig =
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

impl WindowArgs {
    pub fn resolve(&self) -> Result<WindowConfig> {
        let mut config = match &self.config {
            Some(path) => read_window_config(path)?,
            None => WindowConfig::default(),
        };
        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(end) = self.end {
            config.end = Some(end);
        }
        if let Some(indices) = &self.indices {
            let indices: [usize; 5] = indices.as_slice().try_into().map_err(|_| {
                anyhow!("--indices needs exactly 5 values, got {}", indices.len())
            })?;
            config.indices = Some(LandmarkIndex::new(indices));
        }
        if self.reject_odd_offset {
            config.offset_policy = OffsetPolicy::Reject;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "start = 40\nend = 100\nindices = [1, 2, 3, 4, 5]\noffset_policy = \"reject\""
        )
        .unwrap();
        let args = WindowArgs {
            config: Some(file.path().to_path_buf()),
            end: Some(90),
            ..WindowArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.start, 40);
        assert_eq!(config.end, Some(90));
        assert_eq!(config.landmark_indices().as_array(), [1, 2, 3, 4, 5]);
        assert_eq!(config.offset_policy, OffsetPolicy::Reject);
    }

    #[test]
    fn wrong_index_count_is_rejected() {
        let args = WindowArgs {
            indices: Some(vec![1, 2, 3]),
            ..WindowArgs::default()
        };
        assert!(args.resolve().is_err());
    }
}
