pub mod params;
pub mod scenarios;

pub use params::{RetirementClassification, ScenarioParameters};
pub use scenarios::{scenario, scenario_by_name, Scenario, CATALOG, DEFAULT_SCENARIO};
