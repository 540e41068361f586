//! Error types for deskplan datasets

use std::path::PathBuf;

use thiserror::Error;

/// A required set or relation is missing or malformed.
///
/// Any of these aborts the instance before a model is built.
#[derive(Debug, Error)]
pub enum DataFormatError {
    /// The dataset file could not be read.
    #[error("cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset is not valid JSON or misses a required field.
    #[error("malformed dataset: {0}")]
    Json(#[from] serde_json::Error),

    /// A base set that must not be empty is empty.
    #[error("set `{0}` is empty")]
    EmptySet(&'static str),

    /// An id appears twice in the same base set.
    #[error("duplicate id `{id}` in set `{set}`")]
    DuplicateId { set: &'static str, id: String },

    /// A relation references an id that is not part of its base set.
    #[error("relation `{relation}` entry `{owner}` references unknown id `{id}`")]
    UnknownReference {
        relation: &'static str,
        owner: String,
        id: String,
    },

    /// A relation has no entry for an id of its domain.
    #[error("relation `{relation}` has no entry for `{id}`")]
    MissingRelation { relation: &'static str, id: String },

    /// A desk is listed under more than one zone.
    #[error("desk `{desk}` belongs to both zone `{first}` and zone `{second}`")]
    DeskInSeveralZones {
        desk: String,
        first: String,
        second: String,
    },

    /// An employee is listed under more than one group.
    #[error("employee `{employee}` belongs to both group `{first}` and group `{second}`")]
    EmployeeInSeveralGroups {
        employee: String,
        first: String,
        second: String,
    },

    /// An employee is not a member of any group.
    #[error("employee `{0}` is not a member of any group")]
    EmployeeWithoutGroup(String),

    /// Attendance bounds are inverted.
    #[error("attendance bounds are inverted: min {min} > max {max}")]
    InvalidBounds { min: u32, max: u32 },
}
