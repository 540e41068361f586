//! Validated, index-based instance.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Dataset;
use crate::error::DataFormatError;

/// Weekly attendance window, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AttendanceBounds {
    pub min_days: u32,
    pub max_days: u32,
}

impl AttendanceBounds {
    pub fn new(min_days: u32, max_days: u32) -> Result<Self, DataFormatError> {
        if min_days > max_days {
            return Err(DataFormatError::InvalidBounds {
                min: min_days,
                max: max_days,
            });
        }
        Ok(Self { min_days, max_days })
    }
}

impl Default for AttendanceBounds {
    fn default() -> Self {
        Self {
            min_days: 2,
            max_days: 3,
        }
    }
}

/// An employee with resolved desk, day and group indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: String,
    /// Index into [`Instance::groups`].
    pub group: usize,
    /// Allowed desks in dataset order, deduplicated.
    pub allowed_desks: Vec<usize>,
    preferred: Vec<bool>,
}

impl Employee {
    /// Returns true if the employee prefers to come in on `day`.
    #[inline]
    pub fn prefers(&self, day: usize) -> bool {
        self.preferred.get(day).copied().unwrap_or(false)
    }

    /// Preferred day indices in day order.
    pub fn preferred_days(&self) -> impl Iterator<Item = usize> + '_ {
        self.preferred
            .iter()
            .enumerate()
            .filter_map(|(day, &p)| p.then_some(day))
    }
}

/// A desk and the zone that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desk {
    pub id: String,
    /// `None` when no zone lists the desk; such a desk can never be assigned.
    pub zone: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub id: String,
    pub desks: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub members: Vec<usize>,
}

/// Set sizes of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstanceSummary {
    pub employees: usize,
    pub desks: usize,
    pub days: usize,
    pub groups: usize,
    pub zones: usize,
}

impl fmt::Display for InstanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "E: {} | T: {} | Z: {} | D: {} | G: {}",
            self.employees, self.days, self.zones, self.desks, self.groups
        )
    }
}

/// A validated scheduling instance.
///
/// Immutable once built. Every relation is resolved to indices into the
/// base-set vectors, which keep the dataset order so that anything iterating
/// an instance is deterministic.
#[derive(Debug, Clone)]
pub struct Instance {
    id: String,
    employees: Vec<Employee>,
    desks: Vec<Desk>,
    days: Vec<String>,
    zones: Vec<Zone>,
    groups: Vec<Group>,
    bounds: AttendanceBounds,
    employee_index: HashMap<String, usize>,
    desk_index: HashMap<String, usize>,
    day_index: HashMap<String, usize>,
    zone_index: HashMap<String, usize>,
    group_index: HashMap<String, usize>,
}

impl Instance {
    /// Validates `dataset` and builds the indexed instance.
    ///
    /// # Errors
    ///
    /// Returns the first [`DataFormatError`] found: empty day set, duplicate
    /// ids, unknown references, relations missing an entry, desks in several
    /// zones, and employees in zero or several groups.
    pub fn from_dataset(
        id: impl Into<String>,
        dataset: &Dataset,
        bounds: AttendanceBounds,
    ) -> Result<Self, DataFormatError> {
        if bounds.min_days > bounds.max_days {
            return Err(DataFormatError::InvalidBounds {
                min: bounds.min_days,
                max: bounds.max_days,
            });
        }
        if dataset.days.is_empty() {
            return Err(DataFormatError::EmptySet("Days"));
        }

        let employee_index = index_set("Employees", &dataset.employees)?;
        let desk_index = index_set("Desks", &dataset.desks)?;
        let day_index = index_set("Days", &dataset.days)?;
        let zone_index = index_set("Zones", &dataset.zones)?;
        let group_index = index_set("Groups", &dataset.groups)?;

        check_keys("Desks_Z", dataset.zone_desks.keys(), &zone_index)?;
        check_keys("Desks_E", dataset.employee_desks.keys(), &employee_index)?;
        check_keys("Employees_G", dataset.group_employees.keys(), &group_index)?;
        check_keys("Days_E", dataset.employee_days.keys(), &employee_index)?;

        // Zones and desk ownership.
        let mut desks: Vec<Desk> = dataset
            .desks
            .iter()
            .map(|id| Desk {
                id: id.clone(),
                zone: None,
            })
            .collect();
        let mut zones = Vec::with_capacity(dataset.zones.len());
        for (z, zone_id) in dataset.zones.iter().enumerate() {
            let listed = entry("Desks_Z", &dataset.zone_desks, zone_id)?;
            let mut owned = Vec::with_capacity(listed.len());
            for desk_id in listed {
                let d = resolve("Desks_Z", zone_id, desk_id, &desk_index)?;
                match desks[d].zone {
                    Some(other) if other != z => {
                        return Err(DataFormatError::DeskInSeveralZones {
                            desk: desk_id.clone(),
                            first: dataset.zones[other].clone(),
                            second: zone_id.clone(),
                        });
                    }
                    Some(_) => continue,
                    None => {
                        desks[d].zone = Some(z);
                        owned.push(d);
                    }
                }
            }
            zones.push(Zone {
                id: zone_id.clone(),
                desks: owned,
            });
        }

        // Groups form a partition of the employees.
        let mut membership: Vec<Option<usize>> = vec![None; dataset.employees.len()];
        let mut groups = Vec::with_capacity(dataset.groups.len());
        for (g, group_id) in dataset.groups.iter().enumerate() {
            let listed = entry("Employees_G", &dataset.group_employees, group_id)?;
            let mut members = Vec::with_capacity(listed.len());
            for employee_id in listed {
                let e = resolve("Employees_G", group_id, employee_id, &employee_index)?;
                match membership[e] {
                    Some(other) if other != g => {
                        return Err(DataFormatError::EmployeeInSeveralGroups {
                            employee: employee_id.clone(),
                            first: dataset.groups[other].clone(),
                            second: group_id.clone(),
                        });
                    }
                    Some(_) => continue,
                    None => {
                        membership[e] = Some(g);
                        members.push(e);
                    }
                }
            }
            groups.push(Group {
                id: group_id.clone(),
                members,
            });
        }

        let mut employees = Vec::with_capacity(dataset.employees.len());
        for (e, employee_id) in dataset.employees.iter().enumerate() {
            let group = membership[e]
                .ok_or_else(|| DataFormatError::EmployeeWithoutGroup(employee_id.clone()))?;

            let mut allowed_desks = Vec::new();
            for desk_id in entry("Desks_E", &dataset.employee_desks, employee_id)? {
                let d = resolve("Desks_E", employee_id, desk_id, &desk_index)?;
                if !allowed_desks.contains(&d) {
                    allowed_desks.push(d);
                }
            }

            let mut preferred = vec![false; dataset.days.len()];
            for day_id in entry("Days_E", &dataset.employee_days, employee_id)? {
                let t = resolve("Days_E", employee_id, day_id, &day_index)?;
                preferred[t] = true;
            }

            employees.push(Employee {
                id: employee_id.clone(),
                group,
                allowed_desks,
                preferred,
            });
        }

        Ok(Self {
            id: id.into(),
            employees,
            desks,
            days: dataset.days.clone(),
            zones,
            groups,
            bounds,
            employee_index,
            desk_index,
            day_index,
            zone_index,
            group_index,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn desks(&self) -> &[Desk] {
        &self.desks
    }

    pub fn days(&self) -> &[String] {
        &self.days
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn bounds(&self) -> AttendanceBounds {
        self.bounds
    }

    pub fn employee(&self, id: &str) -> Option<usize> {
        self.employee_index.get(id).copied()
    }

    pub fn desk(&self, id: &str) -> Option<usize> {
        self.desk_index.get(id).copied()
    }

    pub fn day(&self, id: &str) -> Option<usize> {
        self.day_index.get(id).copied()
    }

    pub fn zone(&self, id: &str) -> Option<usize> {
        self.zone_index.get(id).copied()
    }

    pub fn group(&self, id: &str) -> Option<usize> {
        self.group_index.get(id).copied()
    }

    /// Desks no zone lists. They exist in the dataset but cannot be booked.
    pub fn unzoned_desks(&self) -> impl Iterator<Item = &Desk> {
        self.desks.iter().filter(|d| d.zone.is_none())
    }

    /// Members of `group` that own at least one allowed desk in `zone`.
    ///
    /// This is the largest headcount the group can ever reach in the zone on
    /// a single day.
    pub fn reachable_headcount(&self, group: usize, zone: usize) -> usize {
        self.groups[group]
            .members
            .iter()
            .filter(|&&e| {
                self.employees[e]
                    .allowed_desks
                    .iter()
                    .any(|&d| self.desks[d].zone == Some(zone))
            })
            .count()
    }

    pub fn summary(&self) -> InstanceSummary {
        InstanceSummary {
            employees: self.employees.len(),
            desks: self.desks.len(),
            days: self.days.len(),
            groups: self.groups.len(),
            zones: self.zones.len(),
        }
    }
}

fn index_set(
    set: &'static str,
    ids: &[String],
) -> Result<HashMap<String, usize>, DataFormatError> {
    let mut index = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(DataFormatError::DuplicateId {
                set,
                id: id.clone(),
            });
        }
    }
    Ok(index)
}

fn check_keys<'a>(
    relation: &'static str,
    keys: impl Iterator<Item = &'a String>,
    index: &HashMap<String, usize>,
) -> Result<(), DataFormatError> {
    for key in keys {
        if !index.contains_key(key) {
            return Err(DataFormatError::UnknownReference {
                relation,
                owner: relation.to_string(),
                id: key.clone(),
            });
        }
    }
    Ok(())
}

fn entry<'a>(
    relation: &'static str,
    map: &'a std::collections::BTreeMap<String, Vec<String>>,
    id: &str,
) -> Result<&'a [String], DataFormatError> {
    map.get(id)
        .map(Vec::as_slice)
        .ok_or_else(|| DataFormatError::MissingRelation {
            relation,
            id: id.to_string(),
        })
}

fn resolve(
    relation: &'static str,
    owner: &str,
    id: &str,
    index: &HashMap<String, usize>,
) -> Result<usize, DataFormatError> {
    index
        .get(id)
        .copied()
        .ok_or_else(|| DataFormatError::UnknownReference {
            relation,
            owner: owner.to_string(),
            id: id.to_string(),
        })
}
