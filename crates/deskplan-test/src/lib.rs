//! Shared test fixtures for deskplan crates.
//!
//! - [`builder`] - fluent construction of [`Dataset`](deskplan_core::Dataset) values
//! - [`scenario`] - small instances with known optimal outcomes
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! deskplan-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use deskplan_test::scenario::{two_employees, isolated_member};
//! use deskplan_test::DatasetBuilder;
//! ```

pub mod builder;
pub mod scenario;

pub use builder::{DatasetBuilder, WEEKDAYS};
pub use scenario::Scenario;
