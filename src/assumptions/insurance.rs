//! Mortgage-insurance premium tiers keyed by downpayment fraction

use serde::{Deserialize, Serialize};

/// Downpayment fractions closer than this to a tier are treated as that tier
pub const TIER_TOLERANCE: f64 = 1e-9;

/// One row of the premium schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PremiumTier {
    /// Downpayment as a fraction of price
    pub downpayment: f64,
    /// Premium financed into the loan, as a fraction of price
    pub premium: f64,
}

/// Mortgage-insurance premium schedule
///
/// Low-downpayment loans carry a premium that is added to the financed principal.
/// Only downpayments listed in the schedule are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageInsuranceSchedule {
    tiers: Vec<PremiumTier>,
}

impl MortgageInsuranceSchedule {
    /// Create from loaded CSV data, sorted by downpayment
    pub fn from_loaded(tiers: &[PremiumTier]) -> Self {
        let mut tiers = tiers.to_vec();
        tiers.sort_by(|a, b| a.downpayment.total_cmp(&b.downpayment));
        Self { tiers }
    }

    /// Standard schedule: 5% down pays 4.0%, 10% pays 3.1%, 15% pays 2.8%, 20% is uninsured
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                PremiumTier { downpayment: 0.05, premium: 0.04 },
                PremiumTier { downpayment: 0.10, premium: 0.031 },
                PremiumTier { downpayment: 0.15, premium: 0.028 },
                PremiumTier { downpayment: 0.20, premium: 0.0 },
            ],
        }
    }

    /// Premium rate for a downpayment fraction, if it is a known tier
    pub fn premium_rate(&self, downpayment: f64) -> Option<f64> {
        self.tiers
            .iter()
            .find(|tier| (tier.downpayment - downpayment).abs() <= TIER_TOLERANCE)
            .map(|tier| tier.premium)
    }

    /// Allowed downpayment fractions in ascending order
    pub fn allowed_downpayments(&self) -> Vec<f64> {
        self.tiers.iter().map(|tier| tier.downpayment).collect()
    }
}

impl Default for MortgageInsuranceSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tiers() {
        let schedule = MortgageInsuranceSchedule::standard();

        assert_eq!(schedule.premium_rate(0.05), Some(0.04));
        assert_eq!(schedule.premium_rate(0.10), Some(0.031));
        assert_eq!(schedule.premium_rate(0.15), Some(0.028));
        assert_eq!(schedule.premium_rate(0.20), Some(0.0));
        assert_eq!(schedule.premium_rate(0.25), None);
        assert_eq!(schedule.premium_rate(0.0), None);
    }

    #[test]
    fn test_percent_conversion_still_matches() {
        // 10 / 100 and 15 / 100 are not exactly representable
        let schedule = MortgageInsuranceSchedule::standard();
        assert_eq!(schedule.premium_rate(10.0 / 100.0), Some(0.031));
        assert_eq!(schedule.premium_rate(15.0 / 100.0), Some(0.028));
        assert_eq!(schedule.premium_rate(0.1 + 0.05), Some(0.028));
    }

    #[test]
    fn test_from_loaded_sorts_tiers() {
        let schedule = MortgageInsuranceSchedule::from_loaded(&[
            PremiumTier { downpayment: 0.35, premium: 0.0 },
            PremiumTier { downpayment: 0.10, premium: 0.02 },
        ]);

        assert_eq!(schedule.allowed_downpayments(), vec![0.10, 0.35]);
        assert_eq!(schedule.premium_rate(0.10), Some(0.02));
        assert_eq!(schedule.premium_rate(0.05), None);
    }
}
