//! Batch projections over many listings
//!
//! One validated assumption set is shared across all listings. Listings are projected in
//! parallel; a bad listing is recorded as a failure and never stops the rest of the batch.

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::assumptions::{ParameterInput, ParameterSet};
use crate::error::{InvalidListingError, InvalidParameterError};
use crate::listing::Listing;
use crate::projection::{ProjectionEngine, Scorecard};

/// A listing that could not be projected
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFailure {
    pub listing_id: String,
    pub error: InvalidListingError,
}

/// Successful scorecards and failures, both in input order
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub scorecards: Vec<Scorecard>,
    pub failures: Vec<ListingFailure>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.scorecards.len() + self.failures.len()
    }
}

/// Summary counts for logging and reporting
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchSummary {
    pub projected: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.projected + self.failed
    }
}

impl From<&BatchOutcome> for BatchSummary {
    fn from(outcome: &BatchOutcome) -> Self {
        Self {
            projected: outcome.scorecards.len(),
            failed: outcome.failures.len(),
        }
    }
}

/// Project every listing against one assumption set
pub fn project_all(listings: &[Listing], parameters: &ParameterSet) -> BatchOutcome {
    let engine = ProjectionEngine::new(parameters.clone());

    let results: Vec<Result<Scorecard, InvalidListingError>> = listings
        .par_iter()
        .map(|listing| engine.project(listing))
        .collect();

    let mut outcome = BatchOutcome::default();
    for result in results {
        match result {
            Ok(scorecard) => outcome.scorecards.push(scorecard),
            Err(error) => {
                warn!("Skipping listing: {}", error);
                outcome.failures.push(ListingFailure {
                    listing_id: error.listing_id.clone(),
                    error,
                });
            }
        }
    }

    let summary = BatchSummary::from(&outcome);
    info!(
        "Projected {} of {} listings ({} failed)",
        summary.projected,
        summary.total(),
        summary.failed
    );
    outcome
}

/// Validate raw assumptions, then project every listing.
/// Invalid assumptions fail the whole batch before any listing is touched.
pub fn run_batch(listings: &[Listing], input: &ParameterInput) -> Result<BatchOutcome, InvalidParameterError> {
    let parameters = input.validate()?;
    Ok(project_all(listings, &parameters))
}

/// Project one listing under several assumption sets (sensitivity analysis)
pub fn project_scenarios(
    listing: &Listing,
    scenarios: &[ParameterSet],
) -> Vec<Result<Scorecard, InvalidListingError>> {
    scenarios
        .par_iter()
        .map(|parameters| ProjectionEngine::new(parameters.clone()).project(listing))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListingField;

    fn listings() -> Vec<Listing> {
        vec![
            Listing::new("good-1", 400_000.0, 2_200.0, 2015),
            Listing::new("bad-price", -5.0, 2_000.0, 2015),
            Listing::new("good-2", 250_000.0, 1_600.0, 1980),
            Listing {
                predicted_monthly_rent: None,
                ..Listing::new("no-rent", 300_000.0, 0.0, 2000)
            },
            Listing::new("good-3", 600_000.0, 3_100.0, 2012),
        ]
    }

    #[test]
    fn test_failures_do_not_abort_batch() {
        let parameters = ParameterInput::default().validate().unwrap();
        let outcome = project_all(&listings(), &parameters);

        assert_eq!(outcome.total(), 5);
        let ids: Vec<&str> = outcome.scorecards.iter().map(|s| s.listing_id.as_str()).collect();
        assert_eq!(ids, vec!["good-1", "good-2", "good-3"]);

        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.failures[0].listing_id, "bad-price");
        assert_eq!(outcome.failures[0].error.field, ListingField::Price);
        assert_eq!(outcome.failures[1].listing_id, "no-rent");
        assert_eq!(outcome.failures[1].error.field, ListingField::PredictedMonthlyRent);

        let summary = BatchSummary::from(&outcome);
        assert_eq!(summary, BatchSummary { projected: 3, failed: 2 });
        assert_eq!(summary.total(), outcome.total());
    }

    #[test]
    fn test_negligible_interest_rate_gives_finite_scorecards() {
        for rate in [1e-17, -1e-17] {
            let parameters = ParameterInput {
                interest_rate: rate,
                ..Default::default()
            }
            .validate()
            .unwrap();
            let outcome = project_all(&listings(), &parameters);

            assert_eq!(outcome.scorecards.len(), 3);
            for card in &outcome.scorecards {
                assert!(card.mean_roe.is_finite(), "{} roe {}", card.listing_id, card.mean_roe);
                assert!(card.mean_net_cash_flow.is_finite());
                assert!(card.mean_cash_on_cash_return.is_finite());
            }
        }
    }

    #[test]
    fn test_batch_matches_single_projection() {
        let parameters = ParameterInput::default().validate().unwrap();
        let all = listings();
        let outcome = project_all(&all, &parameters);

        let single = crate::projection::project(&all[2], &parameters).unwrap();
        assert_eq!(outcome.scorecards[1], single);
    }

    #[test]
    fn test_invalid_parameters_fail_whole_batch() {
        let input = ParameterInput {
            downpayment_fraction: 0.5,
            ..Default::default()
        };

        let err = run_batch(&listings(), &input).unwrap_err();
        assert!(err.names("downpayment_fraction"));

        let ok = run_batch(&listings(), &ParameterInput::default()).unwrap();
        assert_eq!(ok.scorecards.len(), 3);
    }

    #[test]
    fn test_scenarios_in_order() {
        let listing = Listing::new("s", 400_000.0, 2_400.0, 2015);
        let scenarios: Vec<ParameterSet> = [0.02, 0.04, 0.06]
            .iter()
            .map(|&rate| {
                ParameterInput {
                    interest_rate: rate,
                    ..Default::default()
                }
                .validate()
                .unwrap()
            })
            .collect();

        let results = project_scenarios(&listing, &scenarios);
        assert_eq!(results.len(), 3);

        // Higher interest rate should lower cash-on-cash return
        let coc: Vec<f64> = results
            .iter()
            .map(|r| r.as_ref().unwrap().mean_cash_on_cash_return)
            .collect();
        assert!(coc[0] > coc[1]);
        assert!(coc[1] > coc[2]);
    }
}
