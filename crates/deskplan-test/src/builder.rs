//! Fluent dataset construction.
//!
//! # Example
//!
//! ```
//! use deskplan_test::DatasetBuilder;
//!
//! let dataset = DatasetBuilder::weekdays()
//!     .zone("Z1", &["D1", "D2"])
//!     .group("G1", &["A", "B"])
//!     .employee("A", &["D1"], &["Mon"])
//!     .employee("B", &["D2"], &[])
//!     .build();
//!
//! assert_eq!(dataset.desks, vec!["D1", "D2"]);
//! assert_eq!(dataset.employee_days["A"], vec!["Mon"]);
//! ```

use deskplan_core::Dataset;

pub const WEEKDAYS: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

/// Builds a [`Dataset`] in declaration order.
///
/// Desks are registered the first time a zone or an employee mentions them.
/// Group members must be declared with [`DatasetBuilder::employee`] too.
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    dataset: Dataset,
}

impl DatasetBuilder {
    pub fn new(days: &[&str]) -> Self {
        let mut builder = Self::default();
        builder.dataset.days = days.iter().map(|d| d.to_string()).collect();
        builder
    }

    /// Monday to Friday.
    pub fn weekdays() -> Self {
        Self::new(&WEEKDAYS)
    }

    pub fn zone(mut self, id: &str, desks: &[&str]) -> Self {
        self.dataset.zones.push(id.to_string());
        for desk in desks {
            self.register_desk(desk);
        }
        self.dataset.zone_desks.insert(id.to_string(), owned(desks));
        self
    }

    /// A desk no zone owns.
    pub fn loose_desk(mut self, id: &str) -> Self {
        self.register_desk(id);
        self
    }

    pub fn group(mut self, id: &str, members: &[&str]) -> Self {
        self.dataset.groups.push(id.to_string());
        self.dataset
            .group_employees
            .insert(id.to_string(), owned(members));
        self
    }

    pub fn employee(mut self, id: &str, desks: &[&str], preferred: &[&str]) -> Self {
        self.dataset.employees.push(id.to_string());
        for desk in desks {
            self.register_desk(desk);
        }
        self.dataset
            .employee_desks
            .insert(id.to_string(), owned(desks));
        self.dataset
            .employee_days
            .insert(id.to_string(), owned(preferred));
        self
    }

    pub fn build(self) -> Dataset {
        self.dataset
    }

    fn register_desk(&mut self, id: &str) {
        if !self.dataset.desks.iter().any(|d| d == id) {
            self.dataset.desks.push(id.to_string());
        }
    }
}

fn owned(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}
