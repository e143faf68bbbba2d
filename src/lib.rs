//! Rental Projection - investment attractiveness scoring for residential listings
//!
//! This library provides:
//! - Validated financing and market assumption sets with mortgage-insurance tiers
//! - Fixed-payment loan amortization on a yearly schedule
//! - Multi-year, tax-adjusted cash-flow forecasts per listing
//! - Scorecards (cap rate, cash-on-cash return, ROE) and parallel batch projection

pub mod error;
pub mod listing;
pub mod assumptions;
pub mod projection;
pub mod batch;
pub mod report;

// Re-export commonly used types
pub use error::{InvalidListingError, InvalidParameterError, LoadError};
pub use listing::Listing;
pub use assumptions::{ParameterInput, ParameterSet, MortgageInsuranceSchedule};
pub use projection::{ProjectionEngine, ProjectionResult, Scorecard, YearlyCashFlow};
pub use batch::{project_all, run_batch, BatchOutcome};
