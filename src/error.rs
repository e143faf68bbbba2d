//! Error types for parameter validation, listing validation and data loading

use std::fmt;
use thiserror::Error;

/// A single problem found while validating an assumption set
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterViolation {
    /// Name of the offending parameter key
    pub field: String,
    /// Human readable description of what is wrong
    pub reason: String,
}

impl ParameterViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParameterViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {}", self.field, self.reason)
    }
}

/// The assumption set is malformed. Carries every violation found, not just the first.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid parameters: {}", join_violations(.violations))]
pub struct InvalidParameterError {
    pub violations: Vec<ParameterViolation>,
}

impl InvalidParameterError {
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            violations: vec![ParameterViolation::new(field, reason)],
        }
    }

    /// Whether a given field is among the violations
    pub fn names(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_violations(violations: &[ParameterViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Listing fields consumed by the projection engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingField {
    Price,
    PredictedMonthlyRent,
}

impl fmt::Display for ListingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingField::Price => write!(f, "price"),
            ListingField::PredictedMonthlyRent => write!(f, "predicted_monthly_rent"),
        }
    }
}

/// A single listing cannot be projected
#[derive(Debug, Clone, PartialEq, Error)]
#[error("listing `{listing_id}`: {field} {reason}")]
pub struct InvalidListingError {
    pub listing_id: String,
    pub field: ListingField,
    pub reason: String,
}

/// Failure reading listings, parameters or premium tiers from disk
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_lists_every_violation() {
        let err = InvalidParameterError {
            violations: vec![
                ParameterViolation::new("vacancy_fraction", "must lie in [0, 1], got 1.5"),
                ParameterViolation::new("amortization_years", "must be at least 1, got 0"),
            ],
        };

        let message = err.to_string();
        assert!(message.contains("vacancy_fraction"));
        assert!(message.contains("amortization_years"));
        assert!(err.names("vacancy_fraction"));
        assert!(!err.names("interest_rate"));
    }

    #[test]
    fn test_listing_error_names_listing_and_field() {
        let err = InvalidListingError {
            listing_id: "mtl-42".to_string(),
            field: ListingField::Price,
            reason: "must be positive, got -1".to_string(),
        };

        assert_eq!(err.to_string(), "listing `mtl-42`: price must be positive, got -1");
    }
}
