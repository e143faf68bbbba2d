//! Ranking and CSV output of scorecards for display

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::io::Write;

use clap::ValueEnum;

use crate::projection::Scorecard;

/// Scorecard metric used to order listings, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RankMetric {
    #[default]
    Roe,
    CapRate,
    CashOnCash,
    NetCashFlow,
    NetIncome,
    GrossRevenue,
}

impl RankMetric {
    pub fn value(&self, card: &Scorecard) -> f64 {
        match self {
            RankMetric::Roe => card.mean_roe,
            RankMetric::CapRate => card.mean_cap_rate,
            RankMetric::CashOnCash => card.mean_cash_on_cash_return,
            RankMetric::NetCashFlow => card.mean_net_cash_flow,
            RankMetric::NetIncome => card.mean_net_income,
            RankMetric::GrossRevenue => card.mean_gross_revenue,
        }
    }
}

/// Sort descending by `metric` (NaN last, ties keep input order) and keep the top `limit`
pub fn rank_scorecards(mut scorecards: Vec<Scorecard>, metric: RankMetric, limit: Option<usize>) -> Vec<Scorecard> {
    scorecards.sort_by(|a, b| {
        let (x, y) = (metric.value(a), metric.value(b));
        match (x.is_nan(), y.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => y.total_cmp(&x),
        }
    });

    if let Some(limit) = limit {
        scorecards.truncate(limit);
    }
    scorecards
}

const METRIC_COLUMNS: [&str; 9] = [
    "Price",
    "Initial Investment",
    "Mrtg. Premium",
    "Gross Revenue",
    "Net Income",
    "Net Cash",
    "Cash Return",
    "ROE",
    "Cap Rate",
];

/// Write scorecards as CSV: identifier, pass-through attributes, then the metrics
pub fn write_scorecards<W: Write>(writer: W, scorecards: &[Scorecard]) -> Result<(), csv::Error> {
    let attribute_keys: BTreeSet<&str> = scorecards
        .iter()
        .flat_map(|card| card.attributes.keys().map(String::as_str))
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["Listing"];
    header.extend(attribute_keys.iter().copied());
    header.extend(METRIC_COLUMNS);
    csv_writer.write_record(&header)?;

    for card in scorecards {
        let mut record = vec![card.listing_id.clone()];
        record.extend(
            attribute_keys
                .iter()
                .map(|key| card.attributes.get(*key).cloned().unwrap_or_default()),
        );
        record.extend(
            [
                card.price,
                card.initial_investment,
                card.insurance_premium,
                card.mean_gross_revenue,
                card.mean_net_income,
                card.mean_net_cash_flow,
                card.mean_cash_on_cash_return,
                card.mean_roe,
                card.mean_cap_rate,
            ]
            .iter()
            .map(|v| v.to_string()),
        );
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
