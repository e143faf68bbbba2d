//! Rental Projection CLI
//!
//! Scores every listing in a CSV export and prints the best investments

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser};

use rental_projection::assumptions::{
    load_insurance_schedule, load_parameter_map, load_parameters_json, MortgageInsuranceSchedule,
};
use rental_projection::listing::{load_listings_with_columns, ListingColumns};
use rental_projection::report::{rank_scorecards, write_scorecards, RankMetric};
use rental_projection::batch::BatchSummary;
use rental_projection::{project_all, ParameterInput, ParameterSet};

#[derive(Debug, Parser)]
#[command(name = "rental_projection", version, about = "Rank rental listings by projected investment return")]
struct Cli {
    /// Listings CSV with price, predicted monthly rent and year built
    listings: PathBuf,

    /// Assumptions file: JSON object, or `key,value` CSV when the extension is .csv
    #[arg(long)]
    params: Option<PathBuf>,

    /// Mortgage-insurance tiers as a `downpayment,premium` CSV
    #[arg(long)]
    insurance_tiers: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    /// Metric to rank by, best first
    #[arg(long, value_enum, default_value_t = RankMetric::Roe)]
    rank_by: RankMetric,

    /// Number of listings to show
    #[arg(long, default_value_t = 20)]
    top: usize,

    /// Write every ranked scorecard to this CSV
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = "URL")]
    id_column: String,

    #[arg(long, default_value = "Price")]
    price_column: String,

    #[arg(long, default_value = "Predicted Rent Revenue")]
    rent_column: String,

    #[arg(long, default_value = "year_built")]
    year_built_column: String,
}

/// Individual assumption overrides, applied on top of the assumptions file
#[derive(Debug, Args)]
struct Overrides {
    /// Rates and fractions below are given in percent (15 for 15%)
    #[arg(long)]
    percent: bool,

    #[arg(long)]
    downpayment: Option<f64>,

    #[arg(long)]
    closing_fees: Option<f64>,

    #[arg(long)]
    interest_rate: Option<f64>,

    #[arg(long)]
    amortization: Option<u32>,

    #[arg(long)]
    horizon: Option<u32>,

    #[arg(long)]
    vacancy: Option<f64>,

    #[arg(long)]
    property_tax: Option<f64>,

    #[arg(long)]
    income_tax: Option<f64>,

    #[arg(long)]
    rent_growth: Option<f64>,

    #[arg(long)]
    expense_ratio: Option<f64>,

    /// Yearly cash reserve, in dollars
    #[arg(long)]
    reserve: Option<f64>,
}

impl Overrides {
    fn apply(&self, input: &mut ParameterInput) {
        let scale = if self.percent { 100.0 } else { 1.0 };
        let fraction = |value: Option<f64>, target: &mut f64| {
            if let Some(v) = value {
                *target = v / scale;
            }
        };

        fraction(self.downpayment, &mut input.downpayment_fraction);
        fraction(self.closing_fees, &mut input.closing_fee_fraction);
        fraction(self.interest_rate, &mut input.interest_rate);
        fraction(self.vacancy, &mut input.vacancy_fraction);
        fraction(self.property_tax, &mut input.property_tax_rate);
        fraction(self.income_tax, &mut input.income_tax_rate);
        fraction(self.rent_growth, &mut input.rent_growth_rate);
        fraction(self.expense_ratio, &mut input.expense_ratio);

        if let Some(years) = self.amortization {
            input.amortization_years = years;
        }
        if let Some(years) = self.horizon {
            input.forecast_horizon_years = years;
        }
        if let Some(reserve) = self.reserve {
            input.yearly_reserve = reserve;
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn build_parameters(cli: &Cli, schedule: &MortgageInsuranceSchedule) -> Result<ParameterSet> {
    let mut input = match &cli.params {
        Some(path) if is_csv(path) => {
            let values = load_parameter_map(path)
                .with_context(|| format!("reading parameters from {}", path.display()))?;
            let set = ParameterSet::from_map_with_schedule(&values, schedule)?;
            ParameterInput::from(&set)
        }
        Some(path) => load_parameters_json(path)
            .with_context(|| format!("reading parameters from {}", path.display()))?,
        None => ParameterInput::default(),
    };

    cli.overrides.apply(&mut input);
    Ok(input.validate_with(schedule)?)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let schedule = match &cli.insurance_tiers {
        Some(path) => load_insurance_schedule(path)
            .with_context(|| format!("reading insurance tiers from {}", path.display()))?,
        None => MortgageInsuranceSchedule::standard(),
    };
    let parameters = build_parameters(&cli, &schedule)?;

    let columns = ListingColumns {
        id: cli.id_column.clone(),
        price: cli.price_column.clone(),
        predicted_monthly_rent: cli.rent_column.clone(),
        year_built: cli.year_built_column.clone(),
    };
    let listings = load_listings_with_columns(&cli.listings, &columns)
        .with_context(|| format!("reading listings from {}", cli.listings.display()))?;
    if listings.is_empty() {
        bail!("no listings found in {}", cli.listings.display());
    }

    let outcome = project_all(&listings, &parameters);
    let summary = BatchSummary::from(&outcome);
    for failure in &outcome.failures {
        eprintln!("skipped {}: {}", failure.listing_id, failure.error);
    }

    let ranked = rank_scorecards(outcome.scorecards, cli.rank_by, None);

    println!(
        "{:<40} {:>12} {:>12} {:>10} {:>10} {:>8} {:>8} {:>8}",
        "Listing", "Price", "Investment", "Revenue", "Net Cash", "Cash %", "ROE %", "Cap %"
    );
    println!("{}", "-".repeat(116));
    for card in ranked.iter().take(cli.top) {
        println!(
            "{:<40} {:>12.0} {:>12.0} {:>10.0} {:>10.0} {:>8.1} {:>8.1} {:>8.1}",
            truncate(&card.listing_id, 40),
            card.price,
            card.initial_investment,
            card.mean_gross_revenue,
            card.mean_net_cash_flow,
            card.mean_cash_on_cash_return * 100.0,
            card.mean_roe * 100.0,
            card.mean_cap_rate * 100.0,
        );
    }

    if let Some(path) = &cli.output {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_scorecards(file, &ranked)?;
        println!("\nFull results written to: {}", path.display());
    }

    println!(
        "\nProjected {} of {} listings ({} skipped) in {:?}",
        summary.projected,
        summary.total(),
        summary.failed,
        start.elapsed()
    );
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width - 3).collect();
        out.push_str("...");
        out
    }
}
