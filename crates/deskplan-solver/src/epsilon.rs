//! Satisfaction floor carried from the preference phase into the cohesion
//! phase.

use std::fmt;

use deskplan_config::SatisfactionTarget;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::PreferenceMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EpsilonError {
    #[error("desired satisfaction ratio must lie in (0, 1], got {0}")]
    InvalidRatio(f64),
}

/// Minimum number of satisfied preferences the cohesion phase must keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epsilon(u64);

impl Epsilon {
    pub const ZERO: Epsilon = Epsilon(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// `round(satisfied / (percentage / 100) * ratio)`.
    ///
    /// `satisfied / (percentage / 100)` is the total presence of the
    /// preference phase; it is snapped to the nearest integer before the
    /// ratio is applied so that this form always agrees with
    /// [`Epsilon::from_presence`]. A percentage of 0 yields 0. Ties round to
    /// even.
    ///
    /// ```
    /// use deskplan_solver::Epsilon;
    ///
    /// let eps = Epsilon::from_percentage(3, 100.0, 0.65).unwrap();
    /// assert_eq!(eps.value(), 2);
    /// assert_eq!(Epsilon::from_percentage(0, 0.0, 0.65).unwrap().value(), 0);
    /// ```
    pub fn from_percentage(
        satisfied: u64,
        percentage: f64,
        ratio: f64,
    ) -> Result<Self, EpsilonError> {
        check_ratio(ratio)?;
        if percentage <= 0.0 || !percentage.is_finite() {
            return Ok(Self::ZERO);
        }
        let total = (satisfied as f64 * 100.0 / percentage).round();
        Ok(Self::scaled(total, ratio))
    }

    /// `round(total_presence * ratio)`, ties to even.
    pub fn from_presence(total_presence: u64, ratio: f64) -> Result<Self, EpsilonError> {
        check_ratio(ratio)?;
        Ok(Self::scaled(total_presence as f64, ratio))
    }

    /// Derives epsilon from preference-phase metrics and an explicit target.
    ///
    /// [`SatisfactionTarget::MatchAchieved`] uses the achieved percentage as
    /// the ratio, which pins the floor to the full satisfied count.
    pub fn derive(
        metrics: &PreferenceMetrics,
        target: SatisfactionTarget,
    ) -> Result<Self, EpsilonError> {
        let ratio = match target {
            SatisfactionTarget::Fixed { ratio } => ratio,
            SatisfactionTarget::MatchAchieved if metrics.satisfaction_percentage <= 0.0 => {
                return Ok(Self::ZERO);
            }
            SatisfactionTarget::MatchAchieved => (metrics.satisfaction_percentage / 100.0).min(1.0),
        };
        Self::from_percentage(
            metrics.satisfied_preferences,
            metrics.satisfaction_percentage,
            ratio,
        )
    }

    fn scaled(total: f64, ratio: f64) -> Self {
        Self((total * ratio).round_ties_even().max(0.0) as u64)
    }
}

impl fmt::Display for Epsilon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn check_ratio(ratio: f64) -> Result<(), EpsilonError> {
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(())
    } else {
        Err(EpsilonError::InvalidRatio(ratio))
    }
}

#[cfg(test)]
#[path = "epsilon_tests.rs"]
mod tests;
