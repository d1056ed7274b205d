//! Plotter settings

use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::style::Palette;

/// Errors raised while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Bar width must be positive, got {0}")]
    InvalidBarWidth(f64),

    #[error("Histogram bin count must be at most {max}, got {0}", max = MAX_BINS)]
    InvalidBins(usize),
}

/// Upper bound on histogram bins
pub const MAX_BINS: usize = 10_000;

/// How the continuous aggregate histogram chooses its bin count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinSpec {
    /// A fixed number of equal-width bins
    Fixed(usize),
    /// Sturges' rule: `ceil(log2 n) + 1`
    Auto,
}

impl Default for BinSpec {
    fn default() -> Self {
        BinSpec::Fixed(10)
    }
}

impl BinSpec {
    /// Number of bins to use for `n` values, within `1..=MAX_BINS`
    pub fn bin_count(&self, n: usize) -> usize {
        match self {
            BinSpec::Fixed(bins) => (*bins).clamp(1, MAX_BINS),
            BinSpec::Auto if n == 0 => 1,
            BinSpec::Auto => ((1.0 + (n as f64).log2()).ceil() as usize).min(MAX_BINS),
        }
    }
}

/// Settings shared by the model and the reconciler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotterSettings {
    /// Binning for the continuous aggregate histogram
    pub histogram_bins: BinSpec,

    /// Colors and symbols assigned to series
    pub palette: Palette,

    /// Upper bound on simultaneously active series
    pub max_series: Option<usize>,

    /// Fraction of its slot a bar fills: category bars sit one unit apart,
    /// per-row bars share the smallest gap between x values
    pub bar_width: f64,
}

impl Default for PlotterSettings {
    fn default() -> Self {
        Self {
            histogram_bins: BinSpec::default(),
            palette: Palette::default(),
            max_series: None,
            bar_width: 0.8,
        }
    }
}

impl PlotterSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.bar_width.is_nan() || self.bar_width <= 0.0 {
            return Err(SettingsError::InvalidBarWidth(self.bar_width));
        }
        if let BinSpec::Fixed(bins) = self.histogram_bins {
            if bins > MAX_BINS {
                return Err(SettingsError::InvalidBins(bins));
            }
        }
        Ok(())
    }
}
