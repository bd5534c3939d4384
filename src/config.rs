//! Engine configuration. Every field has a default, so a partial (or empty) JSON object is a
//! valid configuration.

use crate::cust_error::{ImportError, ProcessingError};
use crate::progress::DEFAULT_STEP;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How a vertex cover is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CoverMode {
    /// Plain include/exclude search for a cover of exactly the target size.
    #[default]
    #[serde(rename = "exact")]
    Exact,
    /// The exact search on the instance reduced by the kernelizer.
    #[serde(rename = "exact+kernelized")]
    ExactKernelized,
    /// The "take two" 2-approximation. Ignores the target size.
    #[serde(rename = "approximate")]
    Approximate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum progress between two progress messages, in `(0, 1]`.
    pub progress_step: f64,
    /// Mode used by callers that do not name one.
    pub mode: CoverMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            progress_step: DEFAULT_STEP,
            mode: CoverMode::default(),
        }
    }
}

impl EngineConfig {

    /// Loads and validates a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ImportError> {
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate().map_err(|e| ImportError::InputMalformedError(e.to_string()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ProcessingError> {
        if !(self.progress_step > 0.0 && self.progress_step <= 1.0) {
            return Err(ProcessingError::InvalidParameter(format!("progress_step {} is not in (0, 1]", self.progress_step)))
        }
        Ok(())
    }
}
