//! Domain types for desk scheduling instances.
//!
//! A [`Dataset`] is deserialized as-is from disk. [`Instance::from_dataset`]
//! validates it and resolves every id to a dense index so the model builders
//! can iterate without string lookups.

mod dataset;
mod instance;

#[cfg(test)]
mod tests;

pub use dataset::Dataset;
pub use instance::{
    AttendanceBounds, Desk, Employee, Group, Instance, InstanceSummary, Zone,
};
