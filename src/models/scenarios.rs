// src/models/scenarios.rs
//! Fixed catalog of parameter scenarios, selected by index.

use super::params::ScenarioParameters;
use crate::error::{ControlError, ControlResult};

#[derive(Clone, Copy, Debug)]
pub struct Scenario {
    pub index: usize,
    pub name: &'static str,
    pub description: &'static str,
    pub params: ScenarioParameters,
}

/// Scenario run when none is selected explicitly.
pub const DEFAULT_SCENARIO: usize = 5;

pub static CATALOG: [Scenario; 6] = [
    Scenario {
        index: 0,
        name: "second-best-retirement",
        description: "retirement only in second best",
        params: ScenarioParameters::from_tuple([1.0, 0.3, 1.0, 1.0, 1.0, 0.3]),
    },
    Scenario {
        index: 1,
        name: "no-retirement-low-kappa",
        description: "no retirement",
        params: ScenarioParameters::from_tuple([1.0, 0.1, 1.0, 1.0, 1.0, 0.3]),
    },
    Scenario {
        index: 2,
        name: "no-retirement-low-gamma",
        description: "no retirement",
        params: ScenarioParameters::from_tuple([0.3, 0.2, 0.8, 1.0, 1.0, 0.2]),
    },
    Scenario {
        index: 3,
        name: "retirement-both-wide",
        description: "retirement in both",
        params: ScenarioParameters::from_tuple([0.3, 0.3, 0.8, 1.0, 10.0, 0.2]),
    },
    Scenario {
        index: 4,
        name: "retirement-both",
        description: "retirement in both",
        params: ScenarioParameters::from_tuple([0.3, 0.3, 0.8, 1.0, 5.0, 0.3]),
    },
    Scenario {
        index: 5,
        name: "second-best-only-retirement",
        description: "second best is only retirement",
        params: ScenarioParameters::from_tuple([0.5, 0.7, 0.8, 1.0, 5.0, 0.5]),
    },
];

/// Look up a scenario by catalog index.
pub fn scenario(index: usize) -> ControlResult<Scenario> {
    CATALOG
        .get(index)
        .copied()
        .ok_or_else(|| ControlError::InvalidConfiguration {
            field: "scenario".to_string(),
            reason: format!("index {} out of range 0..{}", index, CATALOG.len()),
        })
}

/// Look up a scenario by its catalog name.
pub fn scenario_by_name(name: &str) -> ControlResult<Scenario> {
    CATALOG
        .iter()
        .find(|s| s.name == name)
        .copied()
        .ok_or_else(|| ControlError::InvalidConfiguration {
            field: "scenario".to_string(),
            reason: format!("unknown scenario name '{}'", name),
        })
}
