//! Tap-set file format for the filter tooling.
//!
//! Coefficient sets live in small TOML files so they can be designed
//! elsewhere and handed to the `filter_wav` binary without retyping:
//!
//! ```toml
//! # single-pole lowpass, alpha = 0.1
//! fftaps = [0.1]
//! fbtaps = [0.9]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{FilterError, Result};
use crate::taps::Taps;

/// On-disk tap set. `fbtaps` may be omitted for a pure FIR filter.
#[derive(Debug, Clone, Deserialize)]
pub struct TapsFile {
    pub fftaps: Vec<f64>,
    #[serde(default)]
    pub fbtaps: Vec<f64>,
}

impl TapsFile {
    /// Read and parse a tap file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| FilterError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&text)
    }

    /// Parse tap-file TOML text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Validate into a usable coefficient set
    pub fn into_taps(self) -> Result<Taps> {
        Taps::new(self.fftaps, self.fbtaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let file = TapsFile::parse("fftaps = [0.1]\nfbtaps = [0.9]\n").unwrap();
        assert_eq!(file.fftaps, vec![0.1]);
        assert_eq!(file.fbtaps, vec![0.9]);
    }

    #[test]
    fn test_missing_fbtaps_defaults_empty() {
        let file = TapsFile::parse("fftaps = [1.0, 0.5]\n").unwrap();
        assert!(file.fbtaps.is_empty());

        let taps = file.into_taps().unwrap();
        assert_eq!(taps.fftaps(), &[1.0, 0.5]);
    }

    #[test]
    fn test_empty_fftaps_rejected_on_conversion() {
        let file = TapsFile::parse("fftaps = []\n").unwrap();
        let err = file.into_taps().unwrap_err();
        assert!(matches!(err, FilterError::InvalidTaps(_)));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TapsFile::parse("fftaps = [0.1").unwrap_err();
        assert!(matches!(err, FilterError::Config(_)));
    }
}
