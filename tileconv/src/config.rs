//! Conversion settings.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::Platform;

/// File format of the written artifacts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raw binary
    #[default]
    Bin,
    /// One line of hex values per export line
    Hex,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Bin => "bin",
            OutputFormat::Hex => "hex",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bin" => Ok(OutputFormat::Bin),
            "hex" => Ok(OutputFormat::Hex),
            _ => Err(format!("unknown format '{s}' (expected bin or hex)")),
        }
    }
}

/// Configuration for the conversion process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target platform
    pub platform: Platform,
    /// Output file prefix; defaults to the input path without extension
    pub output_prefix: Option<String>,
    /// Artifact file format
    pub format: OutputFormat,
    /// Merge duplicate tiles when there are too many for the map
    pub auto_quantize: bool,
    /// Output tile sheet PNG path (optional)
    pub output_sheet: Option<String>,
    /// Output JSON report path (optional)
    pub output_json: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            platform: Platform::GameBoyColor,
            output_prefix: None,
            format: OutputFormat::Bin,
            auto_quantize: true,
            output_sheet: None,
            output_json: None,
        }
    }
}

impl Config {
    /// Read a configuration from a JSON file. Missing fields keep their
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Prefix for artifact files written for `input`
    pub fn prefix_for(&self, input: &Path) -> String {
        match &self.output_prefix {
            Some(prefix) => prefix.clone(),
            None => input.with_extension("").to_string_lossy().into_owned(),
        }
    }
}
