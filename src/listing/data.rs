//! Listing records supplied by the scraper and rent estimator

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidListingError, ListingField};

/// A property for sale, with the rent estimator's prediction attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Identifier used to report failures and join results back (usually the listing URL)
    pub id: String,

    /// Asking price. `None` when the source had no value.
    pub price: Option<f64>,

    /// Predicted monthly rent for the whole property
    pub predicted_monthly_rent: Option<f64>,

    /// Construction year, only used to pick the expense tier
    pub year_built: Option<i32>,

    /// Columns the engine does not read (city, address, ...), passed through for display
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Listing {
    pub fn new(id: impl Into<String>, price: f64, predicted_monthly_rent: f64, year_built: i32) -> Self {
        Self {
            id: id.into(),
            price: Some(price),
            predicted_monthly_rent: Some(predicted_monthly_rent),
            year_built: Some(year_built),
            attributes: BTreeMap::new(),
        }
    }

    /// Attach a pass-through attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Price and rent checked for the arithmetic: price positive, rent non-negative, both finite
    pub fn validated_amounts(&self) -> Result<(f64, f64), InvalidListingError> {
        let price = match self.price {
            None => return Err(self.invalid(ListingField::Price, "is missing".to_string())),
            Some(p) if !p.is_finite() || p <= 0.0 => {
                return Err(self.invalid(ListingField::Price, format!("must be positive, got {}", p)))
            }
            Some(p) => p,
        };

        let rent = match self.predicted_monthly_rent {
            None => {
                return Err(self.invalid(ListingField::PredictedMonthlyRent, "is missing".to_string()))
            }
            Some(r) if !r.is_finite() || r < 0.0 => {
                return Err(self.invalid(
                    ListingField::PredictedMonthlyRent,
                    format!("must be non-negative, got {}", r),
                ))
            }
            Some(r) => r,
        };

        Ok((price, rent))
    }

    fn invalid(&self, field: ListingField, reason: String) -> InvalidListingError {
        InvalidListingError {
            listing_id: self.id.clone(),
            field,
            reason,
        }
    }
}
