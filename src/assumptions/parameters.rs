//! Financing and market assumptions shared by every listing in a projection run

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::insurance::MortgageInsuranceSchedule;
use crate::error::{InvalidParameterError, ParameterViolation};
use crate::projection::MAX_TERM_PERIODS;

/// Buildings from this year or earlier pay the older-building expense multiplier
pub const OLDER_BUILDING_CUTOFF_YEAR: i32 = 2010;

/// Expense ratio multiplier for buildings at or before the cutoff year
pub const OLDER_BUILDING_EXPENSE_MULTIPLIER: f64 = 1.5;

/// Every key recognized in a flat parameter mapping
pub const PARAMETER_KEYS: [&str; 11] = [
    "downpayment_fraction",
    "closing_fee_fraction",
    "interest_rate",
    "amortization_years",
    "forecast_horizon_years",
    "vacancy_fraction",
    "property_tax_rate",
    "income_tax_rate",
    "rent_growth_rate",
    "expense_ratio",
    "yearly_reserve",
];

/// Raw, unvalidated assumptions as supplied by a user or a config file
///
/// Field defaults match the investment dashboard's initial slider positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterInput {
    #[serde(default = "default_downpayment")]
    pub downpayment_fraction: f64,

    #[serde(default = "default_closing_fees")]
    pub closing_fee_fraction: f64,

    #[serde(default = "default_interest_rate")]
    pub interest_rate: f64,

    #[serde(default = "default_amortization")]
    pub amortization_years: u32,

    #[serde(default = "default_forecast_horizon")]
    pub forecast_horizon_years: u32,

    #[serde(default = "default_vacancy")]
    pub vacancy_fraction: f64,

    #[serde(default = "default_property_tax")]
    pub property_tax_rate: f64,

    #[serde(default = "default_income_tax")]
    pub income_tax_rate: f64,

    #[serde(default = "default_rent_growth")]
    pub rent_growth_rate: f64,

    #[serde(default = "default_expense_ratio")]
    pub expense_ratio: f64,

    #[serde(default = "default_yearly_reserve")]
    pub yearly_reserve: f64,
}

fn default_downpayment() -> f64 { 0.15 }
fn default_closing_fees() -> f64 { 0.03 }
fn default_interest_rate() -> f64 { 0.03 }
fn default_amortization() -> u32 { 20 }
fn default_forecast_horizon() -> u32 { 20 }
fn default_vacancy() -> f64 { 0.04 }
fn default_property_tax() -> f64 { 0.01 }
fn default_income_tax() -> f64 { 0.30 }
fn default_rent_growth() -> f64 { 0.02 }
fn default_expense_ratio() -> f64 { 0.20 }
fn default_yearly_reserve() -> f64 { 10_000.0 }

impl Default for ParameterInput {
    fn default() -> Self {
        Self {
            downpayment_fraction: default_downpayment(),
            closing_fee_fraction: default_closing_fees(),
            interest_rate: default_interest_rate(),
            amortization_years: default_amortization(),
            forecast_horizon_years: default_forecast_horizon(),
            vacancy_fraction: default_vacancy(),
            property_tax_rate: default_property_tax(),
            income_tax_rate: default_income_tax(),
            rent_growth_rate: default_rent_growth(),
            expense_ratio: default_expense_ratio(),
            yearly_reserve: default_yearly_reserve(),
        }
    }
}

impl ParameterInput {
    /// Validate against the standard premium schedule
    pub fn validate(&self) -> Result<ParameterSet, InvalidParameterError> {
        self.validate_with(&MortgageInsuranceSchedule::standard())
    }

    /// Validate every field, collecting all violations in one pass
    pub fn validate_with(
        &self,
        schedule: &MortgageInsuranceSchedule,
    ) -> Result<ParameterSet, InvalidParameterError> {
        let mut violations = Vec::new();

        let premium_rate = schedule.premium_rate(self.downpayment_fraction);
        match premium_rate {
            None => violations.push(ParameterViolation::new(
                "downpayment_fraction",
                format!(
                    "must be one of {:?}, got {}",
                    schedule.allowed_downpayments(),
                    self.downpayment_fraction
                ),
            )),
            // Custom schedules are not range checked when loaded
            Some(rate) if !(0.0..=1.0).contains(&rate)
                || self.downpayment_fraction <= 0.0
                || self.downpayment_fraction > 1.0 =>
            {
                violations.push(ParameterViolation::new(
                    "downpayment_fraction",
                    format!(
                        "tier {} with premium {} is outside (0, 1] / [0, 1]",
                        self.downpayment_fraction, rate
                    ),
                ))
            }
            Some(_) => {}
        }

        check_fraction(&mut violations, "closing_fee_fraction", self.closing_fee_fraction);
        check_rate(&mut violations, "interest_rate", self.interest_rate);
        check_fraction(&mut violations, "vacancy_fraction", self.vacancy_fraction);
        check_fraction(&mut violations, "property_tax_rate", self.property_tax_rate);
        check_fraction(&mut violations, "income_tax_rate", self.income_tax_rate);
        check_rate(&mut violations, "rent_growth_rate", self.rent_growth_rate);
        check_fraction(&mut violations, "expense_ratio", self.expense_ratio);

        if !self.yearly_reserve.is_finite() || self.yearly_reserve < 0.0 {
            violations.push(ParameterViolation::new(
                "yearly_reserve",
                format!("must be a non-negative amount, got {}", self.yearly_reserve),
            ));
        }

        if self.amortization_years == 0 || self.amortization_years > MAX_TERM_PERIODS {
            violations.push(ParameterViolation::new(
                "amortization_years",
                format!("must lie in [1, {}], got {}", MAX_TERM_PERIODS, self.amortization_years),
            ));
        }
        if self.forecast_horizon_years == 0 {
            violations.push(ParameterViolation::new(
                "forecast_horizon_years",
                "must be at least 1, got 0",
            ));
        } else if self.amortization_years > 0 && self.forecast_horizon_years > self.amortization_years {
            violations.push(ParameterViolation::new(
                "forecast_horizon_years",
                format!(
                    "must not exceed amortization_years ({}), got {}",
                    self.amortization_years, self.forecast_horizon_years
                ),
            ));
        }

        match premium_rate {
            Some(insurance_premium_rate) if violations.is_empty() => Ok(ParameterSet {
                downpayment_fraction: self.downpayment_fraction,
                insurance_premium_rate,
                closing_fee_fraction: self.closing_fee_fraction,
                interest_rate: self.interest_rate,
                amortization_years: self.amortization_years,
                forecast_horizon_years: self.forecast_horizon_years,
                vacancy_fraction: self.vacancy_fraction,
                property_tax_rate: self.property_tax_rate,
                income_tax_rate: self.income_tax_rate,
                rent_growth_rate: self.rent_growth_rate,
                expense_ratio: self.expense_ratio,
                yearly_reserve: self.yearly_reserve,
            }),
            _ => Err(InvalidParameterError { violations }),
        }
    }
}

fn check_fraction(violations: &mut Vec<ParameterViolation>, field: &str, value: f64) {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        violations.push(ParameterViolation::new(
            field,
            format!("must lie in [0, 1], got {}", value),
        ));
    }
}

fn check_rate(violations: &mut Vec<ParameterViolation>, field: &str, value: f64) {
    if !value.is_finite() || value <= -1.0 {
        violations.push(ParameterViolation::new(
            field,
            format!("must be greater than -1, got {}", value),
        ));
    }
}

/// Read a whole, non-negative year count out of a flat mapping value
fn year_count(violations: &mut Vec<ParameterViolation>, field: &str, value: f64, fallback: u32) -> u32 {
    if value.is_finite() && value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64 {
        value as u32
    } else {
        violations.push(ParameterViolation::new(
            field,
            format!("must be a whole number of years, got {}", value),
        ));
        // Keeps later range checks from reporting the same key twice
        fallback
    }
}

/// Validated, immutable assumption set
///
/// Construct through [`ParameterInput::validate`] or [`ParameterSet::from_map`].
/// Safe to share across threads; nothing mutates it after validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSet {
    downpayment_fraction: f64,
    insurance_premium_rate: f64,
    closing_fee_fraction: f64,
    interest_rate: f64,
    amortization_years: u32,
    forecast_horizon_years: u32,
    vacancy_fraction: f64,
    property_tax_rate: f64,
    income_tax_rate: f64,
    rent_growth_rate: f64,
    expense_ratio: f64,
    yearly_reserve: f64,
}

impl ParameterSet {
    /// Build from a flat `name -> value` mapping using the standard premium schedule
    pub fn from_map(values: &HashMap<String, f64>) -> Result<Self, InvalidParameterError> {
        Self::from_map_with_schedule(values, &MortgageInsuranceSchedule::standard())
    }

    /// Build from a flat mapping. Missing keys, unknown keys and malformed year counts
    /// are reported together with range violations.
    pub fn from_map_with_schedule(
        values: &HashMap<String, f64>,
        schedule: &MortgageInsuranceSchedule,
    ) -> Result<Self, InvalidParameterError> {
        let mut violations = Vec::new();

        let mut unknown: Vec<&String> = values
            .keys()
            .filter(|key| !PARAMETER_KEYS.contains(&key.as_str()))
            .collect();
        unknown.sort();
        for key in unknown {
            violations.push(ParameterViolation::new(key.as_str(), "is not a recognized parameter"));
        }

        let mut get = |field: &str| match values.get(field) {
            Some(&value) => value,
            None => {
                violations.push(ParameterViolation::new(field, "is missing"));
                f64::NAN
            }
        };

        let downpayment_fraction = get("downpayment_fraction");
        let closing_fee_fraction = get("closing_fee_fraction");
        let interest_rate = get("interest_rate");
        let amortization = get("amortization_years");
        let forecast_horizon = get("forecast_horizon_years");
        let vacancy_fraction = get("vacancy_fraction");
        let property_tax_rate = get("property_tax_rate");
        let income_tax_rate = get("income_tax_rate");
        let rent_growth_rate = get("rent_growth_rate");
        let expense_ratio = get("expense_ratio");
        let yearly_reserve = get("yearly_reserve");

        // Missing keys already produced a violation; do not report them again as out of range
        let missing: Vec<String> = violations
            .iter()
            .filter(|v| v.reason == "is missing")
            .map(|v| v.field.clone())
            .collect();

        // Fallbacks for absent or malformed year counts never trip the horizon check
        let amortization_years = if missing.iter().any(|f| f == "amortization_years") {
            MAX_TERM_PERIODS
        } else {
            year_count(&mut violations, "amortization_years", amortization, MAX_TERM_PERIODS)
        };
        let forecast_horizon_years = if missing.iter().any(|f| f == "forecast_horizon_years") {
            1
        } else {
            year_count(&mut violations, "forecast_horizon_years", forecast_horizon, 1)
        };

        let input = ParameterInput {
            downpayment_fraction,
            closing_fee_fraction,
            interest_rate,
            amortization_years,
            forecast_horizon_years,
            vacancy_fraction,
            property_tax_rate,
            income_tax_rate,
            rent_growth_rate,
            expense_ratio,
            yearly_reserve,
        };

        match input.validate_with(schedule) {
            Ok(set) if violations.is_empty() => Ok(set),
            Ok(_) => Err(InvalidParameterError { violations }),
            Err(err) => {
                violations.extend(
                    err.violations
                        .into_iter()
                        .filter(|v| !missing.contains(&v.field)),
                );
                Err(InvalidParameterError { violations })
            }
        }
    }

    pub fn downpayment_fraction(&self) -> f64 {
        self.downpayment_fraction
    }

    /// Premium rate of the tier selected by the downpayment fraction
    pub fn insurance_premium_rate(&self) -> f64 {
        self.insurance_premium_rate
    }

    pub fn closing_fee_fraction(&self) -> f64 {
        self.closing_fee_fraction
    }

    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    pub fn amortization_years(&self) -> u32 {
        self.amortization_years
    }

    pub fn forecast_horizon_years(&self) -> u32 {
        self.forecast_horizon_years
    }

    pub fn vacancy_fraction(&self) -> f64 {
        self.vacancy_fraction
    }

    pub fn property_tax_rate(&self) -> f64 {
        self.property_tax_rate
    }

    pub fn income_tax_rate(&self) -> f64 {
        self.income_tax_rate
    }

    pub fn rent_growth_rate(&self) -> f64 {
        self.rent_growth_rate
    }

    pub fn expense_ratio(&self) -> f64 {
        self.expense_ratio
    }

    pub fn yearly_reserve(&self) -> f64 {
        self.yearly_reserve
    }

    /// Expense ratio for a building of the given construction year.
    /// Unknown years are treated as older buildings.
    pub fn effective_expense_ratio(&self, year_built: Option<i32>) -> f64 {
        match year_built {
            Some(year) if year > OLDER_BUILDING_CUTOFF_YEAR => self.expense_ratio,
            _ => self.expense_ratio * OLDER_BUILDING_EXPENSE_MULTIPLIER,
        }
    }
}

impl From<&ParameterSet> for ParameterInput {
    fn from(set: &ParameterSet) -> Self {
        Self {
            downpayment_fraction: set.downpayment_fraction,
            closing_fee_fraction: set.closing_fee_fraction,
            interest_rate: set.interest_rate,
            amortization_years: set.amortization_years,
            forecast_horizon_years: set.forecast_horizon_years,
            vacancy_fraction: set.vacancy_fraction,
            property_tax_rate: set.property_tax_rate,
            income_tax_rate: set.income_tax_rate,
            rent_growth_rate: set.rent_growth_rate,
            expense_ratio: set.expense_ratio,
            yearly_reserve: set.yearly_reserve,
        }
    }
}
