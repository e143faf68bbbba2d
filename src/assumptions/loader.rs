//! File-based parameter and premium-tier loading
//!
//! Parameters come either as a JSON object or as a two-column `key,value` CSV.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::insurance::{MortgageInsuranceSchedule, PremiumTier};
use super::parameters::ParameterInput;
use crate::error::LoadError;

/// Load a raw parameter input from a JSON file. Omitted keys take their defaults.
pub fn load_parameters_json<P: AsRef<Path>>(path: P) -> Result<ParameterInput, LoadError> {
    let file = File::open(path)?;
    load_parameters_json_from_reader(file)
}

pub fn load_parameters_json_from_reader<R: Read>(reader: R) -> Result<ParameterInput, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load a flat `key,value` CSV into a parameter mapping
pub fn load_parameter_map<P: AsRef<Path>>(path: P) -> Result<HashMap<String, f64>, LoadError> {
    let file = File::open(path)?;
    load_parameter_map_from_reader(file)
}

pub fn load_parameter_map_from_reader<R: Read>(reader: R) -> Result<HashMap<String, f64>, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut values = HashMap::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let key = record.get(0).map(str::trim).unwrap_or_default();
        let raw = record.get(1).map(str::trim).unwrap_or_default();
        if key.is_empty() {
            return Err(LoadError::Parse {
                line,
                message: "empty parameter name".to_string(),
            });
        }
        let value: f64 = raw.parse().map_err(|_| LoadError::Parse {
            line,
            message: format!("value `{}` for `{}` is not a number", raw, key),
        })?;

        if values.insert(key.to_string(), value).is_some() {
            return Err(LoadError::Parse {
                line,
                message: format!("parameter `{}` appears more than once", key),
            });
        }
    }

    Ok(values)
}

/// Load a premium schedule from a `downpayment,premium` CSV
pub fn load_insurance_schedule<P: AsRef<Path>>(path: P) -> Result<MortgageInsuranceSchedule, LoadError> {
    let file = File::open(path)?;
    load_insurance_schedule_from_reader(file)
}

pub fn load_insurance_schedule_from_reader<R: Read>(
    reader: R,
) -> Result<MortgageInsuranceSchedule, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut tiers = Vec::new();

    for result in csv_reader.deserialize() {
        let tier: PremiumTier = result?;
        tiers.push(tier);
    }

    if tiers.is_empty() {
        return Err(LoadError::Parse {
            line: 1,
            message: "premium schedule has no tiers".to_string(),
        });
    }

    Ok(MortgageInsuranceSchedule::from_loaded(&tiers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::ParameterSet;

    #[test]
    fn test_parameter_map_from_csv() {
        let data = "key,value\n\
            downpayment_fraction,0.2\n\
            closing_fee_fraction,0.03\n\
            interest_rate,0.03\n\
            amortization_years,25\n\
            forecast_horizon_years,1\n\
            vacancy_fraction,0.04\n\
            property_tax_rate,0.01\n\
            income_tax_rate,0.30\n\
            rent_growth_rate,0.0\n\
            expense_ratio,0.20\n\
            yearly_reserve,0\n";

        let values = load_parameter_map_from_reader(data.as_bytes()).unwrap();
        assert_eq!(values.len(), 11);

        let set = ParameterSet::from_map(&values).unwrap();
        assert_eq!(set.amortization_years(), 25);
        assert_eq!(set.insurance_premium_rate(), 0.0);
    }

    #[test]
    fn test_parameter_map_rejects_bad_values() {
        let data = "key,value\ninterest_rate,three\n";
        let err = load_parameter_map_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }), "got {:?}", err);

        let data = "key,value\ninterest_rate,0.03\ninterest_rate,0.04\n";
        let err = load_parameter_map_from_reader(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_parameters_from_json() {
        let data = r#"{"downpayment_fraction": 0.05, "forecast_horizon_years": 5}"#;
        let input = load_parameters_json_from_reader(data.as_bytes()).unwrap();
        let set = input.validate().unwrap();
        assert_eq!(set.insurance_premium_rate(), 0.04);
        assert_eq!(set.forecast_horizon_years(), 5);
    }

    #[test]
    fn test_insurance_schedule_from_csv() {
        let data = "downpayment,premium\n0.10,0.03\n0.25,0.0\n";
        let schedule = load_insurance_schedule_from_reader(data.as_bytes()).unwrap();
        assert_eq!(schedule.allowed_downpayments(), vec![0.10, 0.25]);
        assert_eq!(schedule.premium_rate(0.25), Some(0.0));

        let empty = load_insurance_schedule_from_reader("downpayment,premium\n".as_bytes());
        assert!(empty.is_err());
    }
}
