//! deskplan Core - dataset and instance types for desk scheduling
//!
//! This crate provides the problem side of deskplan:
//! - [`Dataset`]: the raw instance record as it is stored on disk
//! - [`Instance`]: a validated, index-based view used by the model builders
//! - [`DataFormatError`]: everything that can be wrong with a dataset
//!
//! Nothing here knows about MILP models or solvers.

pub mod domain;
pub mod error;

pub use domain::{
    AttendanceBounds, Dataset, Desk, Employee, Group, Instance, InstanceSummary, Zone,
};
pub use error::DataFormatError;
