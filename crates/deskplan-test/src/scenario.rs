//! Small instances with known outcomes.
//!
//! # Example
//!
//! ```
//! use deskplan_test::scenario;
//!
//! let s = scenario::two_employees();
//! let instance = s.instance();
//! assert_eq!(instance.employees().len(), 2);
//! assert_eq!(s.bounds.max_days, 2);
//! ```

use deskplan_core::{AttendanceBounds, Dataset, Instance};

use crate::builder::DatasetBuilder;

/// A dataset with the attendance bounds it is meant to be solved with.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub id: &'static str,
    pub dataset: Dataset,
    pub bounds: AttendanceBounds,
}

impl Scenario {
    /// Validates the dataset; panics on fixture errors.
    pub fn instance(&self) -> Instance {
        Instance::from_dataset(self.id, &self.dataset, self.bounds)
            .unwrap_or_else(|e| panic!("fixture {} is invalid: {e}", self.id))
    }

    pub fn to_json(&self) -> String {
        self.dataset
            .to_json_string()
            .unwrap_or_else(|e| panic!("fixture {} does not serialize: {e}", self.id))
    }
}

/// Two employees in separate groups, one zone, one private desk each.
///
/// A prefers Mon and Wed, B prefers Tue; bounds 1..=2. The preference
/// optimum satisfies all 3 preferred days. B may or may not add a second,
/// unpreferred day, so total presence is 3 or 4.
pub fn two_employees() -> Scenario {
    Scenario {
        id: "two_employees",
        dataset: DatasetBuilder::weekdays()
            .zone("Z1", &["D1", "D2"])
            .group("GA", &["A"])
            .group("GB", &["B"])
            .employee("A", &["D1"], &["Mon", "Wed"])
            .employee("B", &["D2"], &["Tue"])
            .build(),
        bounds: AttendanceBounds {
            min_days: 1,
            max_days: 2,
        },
    }
}

/// One three-member group; E3 can only sit in Z2, alone.
///
/// Everyone prefers Mon and attends exactly one day, so the whole group meets
/// on Mon. The cohesion optimum is spread 2 plus one isolation penalty on
/// (G, Z2, Mon), objective 3.
pub fn isolated_member() -> Scenario {
    Scenario {
        id: "isolated_member",
        dataset: DatasetBuilder::weekdays()
            .zone("Z1", &["D1", "D2"])
            .zone("Z2", &["D3"])
            .group("G", &["E1", "E2", "E3"])
            .employee("E1", &["D1", "D2"], &["Mon"])
            .employee("E2", &["D1", "D2"], &["Mon"])
            .employee("E3", &["D3"], &["Mon"])
            .build(),
        bounds: AttendanceBounds {
            min_days: 1,
            max_days: 1,
        },
    }
}

/// Two employees competing for a single desk on their preferred days.
///
/// Both prefer Mon and Tue; at most 2 preferences can be satisfied.
pub fn shared_desk() -> Scenario {
    Scenario {
        id: "shared_desk",
        dataset: DatasetBuilder::weekdays()
            .zone("Z1", &["D1"])
            .group("GA", &["A"])
            .group("GB", &["B"])
            .employee("A", &["D1"], &["Mon", "Tue"])
            .employee("B", &["D1"], &["Mon", "Tue"])
            .build(),
        bounds: AttendanceBounds {
            min_days: 1,
            max_days: 2,
        },
    }
}

/// Two groups over two zones and three days.
pub fn two_groups() -> Scenario {
    Scenario {
        id: "two_groups",
        dataset: DatasetBuilder::new(&["Mon", "Tue", "Wed"])
            .zone("Z1", &["D1", "D2"])
            .zone("Z2", &["D3", "D4"])
            .group("G1", &["E1", "E2", "E3"])
            .group("G2", &["E4"])
            .employee("E1", &["D1", "D3"], &["Mon"])
            .employee("E2", &["D2"], &["Tue"])
            .employee("E3", &["D3", "D4"], &["Mon", "Wed"])
            .employee("E4", &["D4", "D1"], &["Tue"])
            .build(),
        bounds: AttendanceBounds {
            min_days: 1,
            max_days: 2,
        },
    }
}

/// C only owns a desk no zone lists, yet must attend its group's meeting.
/// Infeasible in the preference phase.
pub fn unreachable_member() -> Scenario {
    Scenario {
        id: "unreachable_member",
        dataset: DatasetBuilder::weekdays()
            .zone("Z1", &["D1"])
            .loose_desk("D9")
            .group("G", &["A", "C"])
            .employee("A", &["D1"], &["Mon"])
            .employee("C", &["D9"], &["Mon"])
            .build(),
        bounds: AttendanceBounds {
            min_days: 1,
            max_days: 2,
        },
    }
}
