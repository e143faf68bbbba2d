//! Print the yearly amortization schedule for a loan
//!
//! Usage: cargo run --bin amortization_schedule -- 400000 0.03 25

use anyhow::Result;
use clap::Parser;

use rental_projection::projection::{AmortizationCalculator, LoanTerms};

#[derive(Debug, Parser)]
#[command(name = "amortization_schedule", about = "Yearly interest/principal split of a fixed-payment loan")]
struct Cli {
    /// Amount financed
    principal: f64,

    /// Yearly interest rate as a fraction (0.03 for 3%)
    rate: f64,

    /// Number of yearly payments
    years: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let loan = AmortizationCalculator::new(LoanTerms {
        principal: cli.principal,
        rate: cli.rate,
        term_periods: cli.years,
    })?;

    println!("Loan: ${:.2} at {:.3}% over {} years", cli.principal, cli.rate * 100.0, cli.years);
    println!("Yearly payment: ${:.2}\n", loan.payment());
    println!("{:>5} {:>14} {:>12} {:>12} {:>14}", "Year", "Opening", "Interest", "Principal", "Closing");
    println!("{}", "-".repeat(61));

    let mut total_interest = 0.0;
    for period in loan.schedule() {
        total_interest += period.interest;
        println!(
            "{:>5} {:>14.2} {:>12.2} {:>12.2} {:>14.2}",
            period.period,
            period.opening_balance,
            period.interest,
            period.principal,
            period.closing_balance.max(0.0),
        );
    }

    println!("\nTotal interest: ${:.2}", total_interest);
    Ok(())
}
