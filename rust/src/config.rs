//! Configuration for the network model.

use chrono::NaiveDate;
use pyo3::prelude::*;

/// Default relative tolerance for weight comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Configuration shared by the network model and its timing engine.
#[pyclass]
#[derive(Clone, Debug)]
pub struct NetConfig {
    /// Relative tolerance for "maximum weight" and "zero reserve" checks
    #[pyo3(get, set)]
    pub tolerance: f64,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Calendar date of time zero; enables date columns in reports
    #[pyo3(get, set)]
    pub project_start: Option<NaiveDate>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            verbosity: 0,
            project_start: None,
        }
    }
}

#[pymethods]
impl NetConfig {
    #[new]
    #[pyo3(signature = (tolerance=None, verbosity=None, project_start=None))]
    fn new(tolerance: Option<f64>, verbosity: Option<u8>, project_start: Option<NaiveDate>) -> Self {
        let defaults = Self::default();
        Self {
            tolerance: tolerance.unwrap_or(defaults.tolerance),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            project_start,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "NetConfig(tolerance={}, verbosity={}, project_start={:?})",
            self.tolerance, self.verbosity, self.project_start
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = NetConfig::default();
        assert!((config.tolerance - 1e-9).abs() < 1e-18);
        assert_eq!(config.verbosity, 0);
        assert!(config.project_start.is_none());
    }
}
