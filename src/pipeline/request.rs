//! Acquisition requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Streaming service an episode is acquired from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    #[default]
    Crunchy,
    Hidive,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Crunchy => "crunchy",
            Service::Hidive => "hidive",
        }
    }

    /// `hidive` when any flag mentions it (case-insensitive), `crunchy` otherwise.
    pub fn detect<S: AsRef<str>>(flags: &[S]) -> Self {
        if flags
            .iter()
            .any(|f| f.as_ref().to_ascii_lowercase().contains("hidive"))
        {
            Service::Hidive
        } else {
            Service::Crunchy
        }
    }

    /// Acquisition tool arguments selecting this service and series.
    pub fn series_args(&self, series_id: &str) -> [String; 4] {
        let series_flag = match self {
            Service::Crunchy => "--srz",
            Service::Hidive => "-s",
        };
        [
            "--service".to_string(),
            self.as_str().to_string(),
            series_flag.to_string(),
            series_id.to_string(),
        ]
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crunchy" | "crunchyroll" | "cr" => Ok(Service::Crunchy),
            "hidive" | "hd" => Ok(Service::Hidive),
            other => Err(format!("unknown service: {}", other)),
        }
    }
}

/// One series to acquire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionRequest {
    pub series_id: String,
    pub service: Service,
    /// Passed through to the acquisition tool after the series arguments.
    pub flags: Vec<String>,
}

impl AcquisitionRequest {
    /// Build a request, detecting the service from the flags.
    pub fn new(series_id: impl Into<String>, flags: Vec<String>) -> Self {
        Self {
            series_id: series_id.into(),
            service: Service::detect(&flags),
            flags,
        }
    }

    /// Full argument vector for the acquisition tool.
    pub fn tool_args(&self) -> Vec<String> {
        let mut args = self.service.series_args(&self.series_id).to_vec();
        args.extend(self.flags.iter().cloned());
        args
    }

    /// Queue label.
    pub fn label(&self) -> String {
        format!("{} {}", self.service, self.series_id)
    }
}
