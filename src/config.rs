//! JSON configuration for the pipeline.
//!
//! The config file uses the controller-side field naming convention:
//!
//! ```json
//! {
//!     "ipAddress": "192.168.0.10",
//!     "portNumber": 30004,
//!     "usedAxisNumbers": [1, 2, 3]
//! }
//! ```
//!
//! `usedAxisNumbers` is optional; when absent, all twelve axes are logged.
//! Configuration errors are fatal at startup, before any task is spawned.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::decode::AxisSelection;
use crate::{Result, TelemetryError};

/// Controller address, immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Controller host name or address.
    pub ip_address: String,

    /// Controller TCP port.
    pub port_number: u16,

    /// 1-based axis indices to log; `None` means all twelve.
    #[serde(default)]
    pub used_axis_numbers: Option<Vec<u16>>,
}

impl Config {
    /// Load and parse a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let text = std::fs::read_to_string(path).map_err(|e| {
            TelemetryError::config_error_with_source(
                format!("cannot read {}", path.display()),
                Box::new(e),
            )
        })?;

        serde_json::from_str(&text).map_err(|e| {
            TelemetryError::config_error_with_source(
                format!("invalid JSON in {}", path.display()),
                Box::new(e),
            )
        })
    }

    /// Controller endpoint to connect to.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint { host: self.ip_address.clone(), port: self.port_number }
    }

    /// Validated axis selection; all twelve axes when the list is absent.
    pub fn axis_selection(&self) -> Result<AxisSelection> {
        match &self.used_axis_numbers {
            Some(axes) => AxisSelection::new(axes.clone()),
            None => Ok(AxisSelection::all()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: Config = serde_json::from_str(
            r#"{ "ipAddress": "192.168.0.10", "portNumber": 30004, "usedAxisNumbers": [1, 2, 3] }"#,
        )
        .expect("parses");

        assert_eq!(config.endpoint(), Endpoint { host: "192.168.0.10".into(), port: 30004 });
        assert_eq!(config.endpoint().to_string(), "192.168.0.10:30004");

        let selection = config.axis_selection().expect("valid axes");
        assert_eq!(selection.indices(), &[1, 2, 3]);
    }

    #[test]
    fn missing_axis_list_selects_all_twelve() {
        let config: Config =
            serde_json::from_str(r#"{ "ipAddress": "10.0.0.1", "portNumber": 502 }"#)
                .expect("parses");

        let selection = config.axis_selection().expect("defaults");
        assert_eq!(selection.len(), 12);
        assert_eq!(selection.indices().first(), Some(&1));
        assert_eq!(selection.indices().last(), Some(&12));
    }

    #[test]
    fn invalid_axis_list_is_rejected() {
        let config: Config = serde_json::from_str(
            r#"{ "ipAddress": "10.0.0.1", "portNumber": 502, "usedAxisNumbers": [1, 13] }"#,
        )
        .expect("parses");

        let err = config.axis_selection().unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidAxis { axis: 13, .. }));
    }

    #[test]
    fn out_of_range_port_fails_to_parse() {
        // Port is unsigned 16-bit; the controller-side format used a signed
        // short, so make sure oversized values are rejected, not wrapped.
        let result: std::result::Result<Config, _> =
            serde_json::from_str(r#"{ "ipAddress": "10.0.0.1", "portNumber": 70000 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = Config::load("/nonexistent/Config.json").unwrap_err();
        assert!(matches!(err, TelemetryError::Config { .. }));
        assert!(!err.is_retryable());
    }
}
