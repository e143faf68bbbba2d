//! Financing and market assumptions: validated parameter sets and premium tiers

mod insurance;
mod parameters;
pub mod loader;

pub use insurance::{MortgageInsuranceSchedule, PremiumTier, TIER_TOLERANCE};
pub use parameters::{
    ParameterInput, ParameterSet, OLDER_BUILDING_CUTOFF_YEAR, OLDER_BUILDING_EXPENSE_MULTIPLIER,
    PARAMETER_KEYS,
};
pub use loader::{
    load_insurance_schedule, load_parameter_map, load_parameters_json,
};
