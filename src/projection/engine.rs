//! Core projection engine for yearly listing cash-flow forecasts

use log::debug;

use super::amortization::{AmortizationCalculator, LoanTerms};
use super::cashflows::{mean_of, Financing, ProjectionResult, Scorecard, YearlyCashFlow};
use crate::assumptions::ParameterSet;
use crate::error::{InvalidListingError, ListingField};
use crate::listing::Listing;

/// Main projection engine
///
/// Holds one validated assumption set and projects any number of listings against it.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    parameters: ParameterSet,
}

impl ProjectionEngine {
    /// Create a new projection engine with the given assumptions
    pub fn new(parameters: ParameterSet) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Project a listing and return only its scorecard
    pub fn project(&self, listing: &Listing) -> Result<Scorecard, InvalidListingError> {
        self.project_listing(listing).map(|result| result.scorecard)
    }

    /// Run the full forecast for a single listing
    pub fn project_listing(&self, listing: &Listing) -> Result<ProjectionResult, InvalidListingError> {
        let (price, monthly_rent) = listing.validated_amounts()?;
        let financing = self.financing(price, listing.year_built);

        let loan = AmortizationCalculator::new(LoanTerms {
            principal: financing.loan_principal,
            rate: self.parameters.interest_rate(),
            term_periods: self.parameters.amortization_years(),
        })
        .map_err(|err| InvalidListingError {
            listing_id: listing.id.clone(),
            field: ListingField::Price,
            reason: format!("does not produce a valid loan: {}", err),
        })?;

        let cashflows = self.forecast(&financing, monthly_rent, &loan);
        let scorecard = self.scorecard(listing, &financing, &cashflows);

        debug!(
            "Listing {}: investment {:.0}, loan {:.0}, mean ROE {:.4}, mean cap rate {:.4}",
            listing.id,
            financing.initial_investment,
            financing.loan_principal,
            scorecard.mean_roe,
            scorecard.mean_cap_rate,
        );

        Ok(ProjectionResult {
            listing_id: listing.id.clone(),
            financing,
            cashflows,
            scorecard,
        })
    }

    /// Downpayment, closing fees, insurance premium and loan size for a price
    pub fn financing(&self, price: f64, year_built: Option<i32>) -> Financing {
        let p = &self.parameters;

        let downpayment = price * p.downpayment_fraction();
        let closing_fees = price * p.closing_fee_fraction();
        let insurance_premium_rate = p.insurance_premium_rate();

        Financing {
            price,
            downpayment,
            closing_fees,
            initial_investment: downpayment + closing_fees,
            insurance_premium_rate,
            insurance_premium: insurance_premium_rate * price,
            loan_principal: price * (1.0 + insurance_premium_rate) - downpayment,
            expense_ratio: p.effective_expense_ratio(year_built),
        }
    }

    /// Yearly rows for the forecast horizon. Growth exponents are 0-indexed,
    /// amortization periods 1-indexed.
    fn forecast(
        &self,
        financing: &Financing,
        monthly_rent: f64,
        loan: &AmortizationCalculator,
    ) -> Vec<YearlyCashFlow> {
        let p = &self.parameters;
        let price = financing.price;

        // Price does not appreciate, so the tax bill is flat
        let property_tax = p.property_tax_rate() * price;
        let base_rent = monthly_rent * 12.0 * (1.0 - p.vacancy_fraction());

        loan.schedule()
            .take(p.forecast_horizon_years() as usize)
            .enumerate()
            .map(|(i, period)| {
                let gross_rent = base_rent * (1.0 + p.rent_growth_rate()).powi(i as i32);
                let expenses = financing.expense_ratio * gross_rent;

                let taxable_income = gross_rent - expenses - period.interest - property_tax;
                // Losses are never refunded
                let income_tax = (p.income_tax_rate() * taxable_income).max(0.0);
                let net_income = taxable_income - income_tax;

                let net_cash_flow = net_income - period.principal - p.yearly_reserve();
                let net_equity = net_cash_flow + period.principal;

                let mut row = YearlyCashFlow {
                    year: period.period,
                    gross_rent,
                    expenses,
                    property_tax,
                    interest_payment: period.interest,
                    principal_payment: period.principal,
                    taxable_income,
                    income_tax,
                    net_income,
                    net_cash_flow,
                    net_equity,
                    cap_rate: 0.0,
                    cash_on_cash_return: net_cash_flow / financing.initial_investment,
                    return_on_equity: net_equity / financing.initial_investment,
                };
                row.cap_rate = row.net_operating_income() / price;
                row
            })
            .collect()
    }

    fn scorecard(&self, listing: &Listing, financing: &Financing, rows: &[YearlyCashFlow]) -> Scorecard {
        Scorecard {
            listing_id: listing.id.clone(),
            price: financing.price,
            initial_investment: financing.initial_investment,
            insurance_premium: financing.insurance_premium,
            mean_gross_revenue: mean_of(rows, |r| r.gross_rent),
            mean_net_income: mean_of(rows, |r| r.net_income),
            mean_net_cash_flow: mean_of(rows, |r| r.net_cash_flow),
            mean_cash_on_cash_return: mean_of(rows, |r| r.cash_on_cash_return),
            mean_roe: mean_of(rows, |r| r.return_on_equity),
            mean_cap_rate: mean_of(rows, |r| r.cap_rate),
            attributes: listing.attributes.clone(),
        }
    }
}

/// Project a single listing against an assumption set
pub fn project(listing: &Listing, parameters: &ParameterSet) -> Result<Scorecard, InvalidListingError> {
    ProjectionEngine::new(parameters.clone()).project(listing)
}
