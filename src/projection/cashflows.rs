//! Cash-flow output structures for listing projections

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One-time financing figures for a listing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Financing {
    pub price: f64,
    pub downpayment: f64,
    pub closing_fees: f64,
    /// Cash invested up front: downpayment plus closing fees
    pub initial_investment: f64,
    pub insurance_premium_rate: f64,
    /// Mortgage-insurance premium as a dollar amount (rate times price)
    pub insurance_premium: f64,
    /// Amount financed, including the premium
    pub loan_principal: f64,
    /// Expense ratio after the building-age adjustment
    pub expense_ratio: f64,
}

/// A single row of projection output for one forecast year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyCashFlow {
    /// Forecast year (1-indexed)
    pub year: u32,

    // Operations
    pub gross_rent: f64,
    pub expenses: f64,
    pub property_tax: f64,

    // Debt service
    pub interest_payment: f64,
    pub principal_payment: f64,

    // Tax
    pub taxable_income: f64,
    pub income_tax: f64,

    // Summary
    pub net_income: f64,
    pub net_cash_flow: f64,
    pub net_equity: f64,

    // Ratios
    pub cap_rate: f64,
    pub cash_on_cash_return: f64,
    pub return_on_equity: f64,
}

impl YearlyCashFlow {
    /// Net operating income: rent less operating expenses and property tax, before debt service
    pub fn net_operating_income(&self) -> f64 {
        self.gross_rent - self.property_tax - self.expenses
    }
}

/// Summary metrics used to rank a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub listing_id: String,
    pub price: f64,
    pub initial_investment: f64,
    pub insurance_premium: f64,
    pub mean_gross_revenue: f64,
    pub mean_net_income: f64,
    pub mean_net_cash_flow: f64,
    pub mean_cash_on_cash_return: f64,
    pub mean_roe: f64,
    pub mean_cap_rate: f64,

    /// Pass-through listing columns for joining back to display
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Complete projection result for one listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub listing_id: String,
    pub financing: Financing,
    pub cashflows: Vec<YearlyCashFlow>,
    pub scorecard: Scorecard,
}

impl ProjectionResult {
    /// Total principal repaid over the forecast horizon
    pub fn total_principal_repaid(&self) -> f64 {
        self.cashflows.iter().map(|r| r.principal_payment).sum()
    }

    /// Total interest paid over the forecast horizon
    pub fn total_interest_paid(&self) -> f64 {
        self.cashflows.iter().map(|r| r.interest_payment).sum()
    }

    /// Loan balance left at the end of the forecast horizon
    pub fn remaining_loan_balance(&self) -> f64 {
        self.financing.loan_principal - self.total_principal_repaid()
    }
}

/// Arithmetic mean over forecast years
pub(crate) fn mean_of(rows: &[YearlyCashFlow], field: impl Fn(&YearlyCashFlow) -> f64) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(field).sum::<f64>() / rows.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: u32, gross_rent: f64) -> YearlyCashFlow {
        YearlyCashFlow {
            year,
            gross_rent,
            expenses: 0.2 * gross_rent,
            property_tax: 1_000.0,
            interest_payment: 0.0,
            principal_payment: 500.0,
            taxable_income: 0.0,
            income_tax: 0.0,
            net_income: 0.0,
            net_cash_flow: 0.0,
            net_equity: 0.0,
            cap_rate: 0.0,
            cash_on_cash_return: 0.0,
            return_on_equity: 0.0,
        }
    }

    #[test]
    fn test_mean_of() {
        let rows = vec![row(1, 10_000.0), row(2, 20_000.0)];
        assert_eq!(mean_of(&rows, |r| r.gross_rent), 15_000.0);
        assert_eq!(mean_of(&[], |r| r.gross_rent), 0.0);
    }

    #[test]
    fn test_net_operating_income() {
        assert_eq!(row(1, 10_000.0).net_operating_income(), 7_000.0);
    }
}
