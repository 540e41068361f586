//! Raw dataset record.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DataFormatError;

/// One scheduling instance exactly as stored on disk.
///
/// Field names follow the published instance format:
///
/// ```
/// use deskplan_core::Dataset;
///
/// let dataset = Dataset::from_json_str(r#"{
///     "Employees": ["E0"], "Desks": ["D0"], "Days": ["L", "Ma"],
///     "Groups": ["G0"], "Zones": ["Z0"],
///     "Desks_Z": {"Z0": ["D0"]},
///     "Desks_E": {"E0": ["D0"]},
///     "Employees_G": {"G0": ["E0"]},
///     "Days_E": {"E0": ["L"]}
/// }"#).unwrap();
///
/// assert_eq!(dataset.days, vec!["L", "Ma"]);
/// assert_eq!(dataset.zone_desks["Z0"], vec!["D0"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Dataset {
    #[serde(rename = "Employees")]
    pub employees: Vec<String>,

    #[serde(rename = "Desks")]
    pub desks: Vec<String>,

    /// Ordered weekdays.
    #[serde(rename = "Days")]
    pub days: Vec<String>,

    #[serde(rename = "Groups")]
    pub groups: Vec<String>,

    #[serde(rename = "Zones")]
    pub zones: Vec<String>,

    /// Zone id to the desks it owns.
    #[serde(rename = "Desks_Z")]
    pub zone_desks: BTreeMap<String, Vec<String>>,

    /// Employee id to the desks the employee may use.
    #[serde(rename = "Desks_E")]
    pub employee_desks: BTreeMap<String, Vec<String>>,

    /// Group id to its members.
    #[serde(rename = "Employees_G")]
    pub group_employees: BTreeMap<String, Vec<String>>,

    /// Employee id to preferred days.
    #[serde(rename = "Days_E")]
    pub employee_days: BTreeMap<String, Vec<String>>,
}

impl Dataset {
    /// Parses a dataset from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, DataFormatError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads and parses a dataset from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DataFormatError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| DataFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Serializes the dataset back to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, DataFormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
