//! Fixed-payment loan amortization
//!
//! Periods are yearly and the periodic rate is the annual rate as given. Every period is
//! evaluated in closed form, so period `k` does not depend on evaluating periods `1..k`.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidParameterError, ParameterViolation};

/// Longest loan term accepted, in periods
pub const MAX_TERM_PERIODS: u32 = 1_000;

/// Loan amount, rate and number of payment periods
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount financed, including any financed insurance premium
    pub principal: f64,
    /// Periodic (yearly) interest rate
    pub rate: f64,
    pub term_periods: u32,
}

/// Split of one fixed payment into interest and principal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationPeriod {
    /// 1-indexed payment period
    pub period: u32,
    pub opening_balance: f64,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
}

/// Amortization schedule for one loan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmortizationCalculator {
    terms: LoanTerms,
    payment: f64,
}

impl AmortizationCalculator {
    /// Validate the loan terms and compute the fixed periodic payment
    pub fn new(terms: LoanTerms) -> Result<Self, InvalidParameterError> {
        let mut err = InvalidParameterError { violations: Vec::new() };

        if !terms.principal.is_finite() || terms.principal < 0.0 {
            err.violations.push(ParameterViolation::new(
                "principal",
                format!("must be a non-negative amount, got {}", terms.principal),
            ));
        }
        if !terms.rate.is_finite() || terms.rate <= -1.0 {
            err.violations.push(ParameterViolation::new(
                "rate",
                format!("must be greater than -1, got {}", terms.rate),
            ));
        }
        if terms.term_periods == 0 || terms.term_periods > MAX_TERM_PERIODS {
            err.violations.push(ParameterViolation::new(
                "term_periods",
                format!("must lie in [1, {}], got {}", MAX_TERM_PERIODS, terms.term_periods),
            ));
        }
        if !err.violations.is_empty() {
            return Err(err);
        }

        let payment = fixed_payment(terms.principal, terms.rate, terms.term_periods);
        Ok(Self { terms, payment })
    }

    /// Fixed payment made every period
    pub fn payment(&self) -> f64 {
        self.payment
    }

    /// Interest and principal portions of the payment at period `k` (1-indexed)
    pub fn period(&self, k: u32) -> Result<AmortizationPeriod, InvalidParameterError> {
        if k == 0 || k > self.terms.term_periods {
            return Err(InvalidParameterError::single(
                "period",
                format!("must lie in [1, {}], got {}", self.terms.term_periods, k),
            ));
        }
        Ok(self.period_unchecked(k))
    }

    pub fn interest(&self, k: u32) -> Result<f64, InvalidParameterError> {
        self.period(k).map(|p| p.interest)
    }

    pub fn principal(&self, k: u32) -> Result<f64, InvalidParameterError> {
        self.period(k).map(|p| p.principal)
    }

    /// Every period of the loan, in order
    pub fn schedule(&self) -> impl Iterator<Item = AmortizationPeriod> + '_ {
        (1..=self.terms.term_periods).map(move |k| self.period_unchecked(k))
    }

    fn period_unchecked(&self, k: u32) -> AmortizationPeriod {
        let opening_balance = self.balance_after(k - 1);
        let interest = self.terms.rate * opening_balance;
        let principal = self.payment - interest;

        AmortizationPeriod {
            period: k,
            opening_balance,
            payment: self.payment,
            interest,
            principal,
            closing_balance: opening_balance - principal,
        }
    }

    /// Outstanding balance after `paid` payments
    /// B(j) = P ((1+r)^n - (1+r)^j) / ((1+r)^n - 1), or P (n - j) / n when r = 0
    fn balance_after(&self, paid: u32) -> f64 {
        let LoanTerms { principal, term_periods, .. } = self.terms;
        let log_growth = self.log_growth();
        if log_growth == 0.0 {
            return principal * (term_periods - paid) as f64 / term_periods as f64;
        }

        // Arranged so that no power of (1+r) above 1 is ever formed
        let n = term_periods as f64;
        let j = paid as f64;
        if log_growth > 0.0 {
            principal * ((j - n) * log_growth).exp_m1() / (-n * log_growth).exp_m1()
        } else {
            principal * (j * log_growth).exp() * ((n - j) * log_growth).exp_m1() / (n * log_growth).exp_m1()
        }
    }

    fn log_growth(&self) -> f64 {
        self.terms.rate.ln_1p()
    }
}

/// A = P r / (1 - (1+r)^-n), degenerating to P / n at r = 0.
/// Evaluated through ln_1p/exp_m1 so rates too small to change `1 + r` stay finite.
fn fixed_payment(principal: f64, rate: f64, term_periods: u32) -> f64 {
    let n = term_periods as f64;
    let log_growth = rate.ln_1p();
    if log_growth == 0.0 {
        return principal / n;
    }

    if log_growth > 0.0 {
        principal * rate / -(-n * log_growth).exp_m1()
    } else {
        principal * rate * (n * log_growth).exp() / (n * log_growth).exp_m1()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    fn calculator(principal: f64, rate: f64, term_periods: u32) -> AmortizationCalculator {
        AmortizationCalculator::new(LoanTerms { principal, rate, term_periods }).unwrap()
    }

    #[test]
    fn test_payment_matches_annuity_formula() {
        let calc = calculator(400_000.0, 0.03, 25);
        assert_relative_eq!(calc.payment(), 22_971.148_415_651_1, max_relative = 1e-12);

        let first = calc.period(1).unwrap();
        assert_relative_eq!(first.interest, 12_000.0, max_relative = 1e-12);
        assert_relative_eq!(first.principal, 10_971.148_415_651_1, max_relative = 1e-10);
        assert_relative_eq!(first.closing_balance, 400_000.0 - first.principal, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let calc = calculator(120_000.0, 0.0, 12);

        assert_eq!(calc.payment(), 10_000.0);
        for period in calc.schedule() {
            assert_eq!(period.interest, 0.0);
            assert_eq!(period.principal, 120_000.0 / 12.0);
        }
    }

    #[test]
    fn test_interest_declines_and_principal_grows() {
        let calc = calculator(250_000.0, 0.05, 20);
        let periods: Vec<_> = calc.schedule().collect();

        assert_eq!(periods.len(), 20);
        for pair in periods.windows(2) {
            assert!(pair[1].interest < pair[0].interest);
            assert!(pair[1].principal > pair[0].principal);
            assert_relative_eq!(pair[1].opening_balance, pair[0].closing_balance, max_relative = 1e-9);
        }
        assert_abs_diff_eq!(periods[19].closing_balance, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_period_out_of_range() {
        let calc = calculator(100_000.0, 0.04, 10);
        assert!(calc.period(0).is_err());
        assert!(calc.period(11).is_err());
        assert!(calc.period(10).is_ok());
        assert!(calc.principal(1).unwrap() > 0.0);
        assert_relative_eq!(calc.interest(1).unwrap(), 4_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_terms() {
        let err = AmortizationCalculator::new(LoanTerms {
            principal: 100_000.0,
            rate: 0.03,
            term_periods: 0,
        })
        .unwrap_err();
        assert!(err.names("term_periods"));

        let err = AmortizationCalculator::new(LoanTerms {
            principal: 100_000.0,
            rate: 0.03,
            term_periods: 2_147_483_648,
        })
        .unwrap_err();
        assert!(err.names("term_periods"));

        let err = AmortizationCalculator::new(LoanTerms {
            principal: -1.0,
            rate: -1.0,
            term_periods: 5,
        })
        .unwrap_err();
        assert!(err.names("principal"));
        assert!(err.names("rate"));
    }

    #[test]
    fn test_zero_principal() {
        let calc = calculator(0.0, 0.03, 5);
        assert_eq!(calc.payment(), 0.0);
        assert!(calc.schedule().all(|p| p.interest == 0.0 && p.principal == 0.0));
    }

    #[test]
    fn test_rates_below_float_resolution_stay_finite() {
        // 1 + r rounds to exactly 1.0 for these
        for rate in [1e-17, -1e-17, 1e-300, -1e-300] {
            let calc = calculator(400_000.0, rate, 25);
            assert_relative_eq!(calc.payment(), 16_000.0, max_relative = 1e-9);

            let periods: Vec<_> = calc.schedule().collect();
            assert!(periods.iter().all(|p| p.interest.is_finite() && p.principal.is_finite()));
            let repaid: f64 = periods.iter().map(|p| p.principal).sum();
            assert_relative_eq!(repaid, 400_000.0, max_relative = 1e-9);
            assert_abs_diff_eq!(periods[24].closing_balance, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_longest_term_stays_finite() {
        for rate in [0.2, 0.03, -0.05, -0.9] {
            let calc = calculator(400_000.0, rate, MAX_TERM_PERIODS);
            assert!(calc.payment().is_finite());
            assert!(calc
                .schedule()
                .all(|p| p.opening_balance.is_finite() && p.interest.is_finite() && p.principal.is_finite()));
        }

        let calc = calculator(400_000.0, 0.03, MAX_TERM_PERIODS);
        assert_relative_eq!(calc.payment(), 12_000.0, max_relative = 1e-9);
        assert_abs_diff_eq!(calc.period(MAX_TERM_PERIODS).unwrap().closing_balance, 0.0, epsilon = 1e-6);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_principal_portions_sum_to_principal(
            principal in 1_000u32..5_000_000,
            rate_bp in -500i32..2_000,
            term_periods in 1u32..41
        ) {
            let principal = principal as f64;
            let calc = calculator(principal, rate_bp as f64 / 10_000.0, term_periods);

            let repaid: f64 = calc.schedule().map(|p| p.principal).sum();
            prop_assert!(
                ((repaid - principal) / principal).abs() < 1e-6,
                "repaid {} of {}", repaid, principal
            );
        }

        #[test]
        fn prop_near_zero_rates_repay_principal(
            principal in 1_000u32..5_000_000,
            mantissa in -9.0f64..9.0,
            exponent in 8i32..300,
            term_periods in 1u32..41
        ) {
            let principal = principal as f64;
            let calc = calculator(principal, mantissa * 10f64.powi(-exponent), term_periods);

            let repaid: f64 = calc.schedule().map(|p| p.principal).sum();
            prop_assert!(repaid.is_finite());
            prop_assert!(((repaid - principal) / principal).abs() < 1e-6);
        }

        #[test]
        fn prop_portions_add_up_to_payment(
            principal in 1_000u32..5_000_000,
            rate_bp in 0i32..2_000,
            term_periods in 1u32..41
        ) {
            let calc = calculator(principal as f64, rate_bp as f64 / 10_000.0, term_periods);
            for p in calc.schedule() {
                prop_assert!((p.interest + p.principal - p.payment).abs() <= 1e-9 * p.payment.max(1.0));
            }
        }
    }
}
