//! Projection engine: loan amortization and yearly cash-flow forecasts per listing

mod amortization;
mod engine;
mod cashflows;

pub use amortization::{AmortizationCalculator, AmortizationPeriod, LoanTerms, MAX_TERM_PERIODS};
pub use engine::{project, ProjectionEngine};
pub use cashflows::{Financing, ProjectionResult, Scorecard, YearlyCashFlow};
