//! Load listings from the scraper's CSV export

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::{Reader, StringRecord};
use log::{info, warn};

use super::Listing;
use crate::error::LoadError;

/// Column names for the fields the engine consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingColumns {
    pub id: String,
    pub price: String,
    pub predicted_monthly_rent: String,
    pub year_built: String,
}

impl Default for ListingColumns {
    fn default() -> Self {
        Self {
            id: "URL".to_string(),
            price: "Price".to_string(),
            predicted_monthly_rent: "Predicted Rent Revenue".to_string(),
            year_built: "year_built".to_string(),
        }
    }
}

/// Header positions resolved once per file
struct ColumnIndex {
    id: Option<usize>,
    price: usize,
    rent: usize,
    year_built: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &ListingColumns) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| LoadError::Parse {
                line: 1,
                message: format!("missing required column `{}`", name),
            })
        };

        Ok(Self {
            id: find(columns.id.as_str()),
            price: require(columns.price.as_str())?,
            rent: require(columns.predicted_monthly_rent.as_str())?,
            year_built: find(columns.year_built.as_str()),
        })
    }

    fn is_consumed(&self, idx: usize) -> bool {
        Some(idx) == self.id || idx == self.price || idx == self.rent || Some(idx) == self.year_built
    }
}

/// Load all listings from a CSV file using the default column names
pub fn load_listings<P: AsRef<Path>>(path: P) -> Result<Vec<Listing>, LoadError> {
    load_listings_with_columns(path, &ListingColumns::default())
}

pub fn load_listings_with_columns<P: AsRef<Path>>(
    path: P,
    columns: &ListingColumns,
) -> Result<Vec<Listing>, LoadError> {
    let reader = Reader::from_path(path)?;
    read_listings(reader, columns)
}

/// Load listings from any reader (e.g., string buffer, network stream)
pub fn load_listings_from_reader<R: Read>(
    reader: R,
    columns: &ListingColumns,
) -> Result<Vec<Listing>, LoadError> {
    read_listings(Reader::from_reader(reader), columns)
}

fn read_listings<R: Read>(mut reader: Reader<R>, columns: &ListingColumns) -> Result<Vec<Listing>, LoadError> {
    let headers = reader.headers()?.clone();
    let index = ColumnIndex::resolve(&headers, columns)?;
    let mut listings = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;

        let id = index
            .id
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("row-{}", row + 1));

        let price = parse_amount(&record, index.price, &id, &columns.price);
        let predicted_monthly_rent =
            parse_amount(&record, index.rent, &id, &columns.predicted_monthly_rent);
        let year_built = index
            .year_built
            .and_then(|i| parse_year(&record, i, &id, &columns.year_built));

        let attributes: BTreeMap<String, String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !index.is_consumed(*i))
            .filter_map(|(i, name)| record.get(i).map(|v| (name.to_string(), v.to_string())))
            .collect();

        listings.push(Listing {
            id,
            price,
            predicted_monthly_rent,
            year_built,
            attributes,
        });
    }

    info!("Loaded {} listings", listings.len());
    Ok(listings)
}

/// Monetary cell: tolerates thousands separators and a leading `$`.
/// Empty or unparseable cells become `None` so the engine reports them per listing.
fn parse_amount(record: &StringRecord, idx: usize, id: &str, column: &str) -> Option<f64> {
    let raw = record.get(idx)?.trim();
    if raw.is_empty() {
        return None;
    }

    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '$').collect();
    match cleaned.trim().parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Listing {}: cannot parse {} value `{}`", id, column, raw);
            None
        }
    }
}

/// Year cell. Accepts `2015` and float exports such as `2015.0`.
fn parse_year(record: &StringRecord, idx: usize, id: &str, column: &str) -> Option<i32> {
    let raw = record.get(idx)?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    match raw.parse::<f64>() {
        Ok(year) if year.fract() == 0.0 && year.abs() < i32::MAX as f64 => Some(year as i32),
        _ => {
            warn!("Listing {}: cannot parse {} value `{}`", id, column, raw);
            None
        }
    }
}
