use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::error;

/// Effective rate used when a city is missing from the flat-rate table.
pub const DEFAULT_EFFECTIVE_RATE: f64 = 0.011;

const FLAT_RATES_CSV: &str = include_str!("../../data/florida_flat_rates.csv");

const HILLSBOROUGH_CITIES: &[&str] = &[
    "tampa",
    "brandon",
    "riverview",
    "plant city",
    "temple terrace",
    "valrico",
    "seffner",
    "lutz",
    "odessa",
    "apollo beach",
    "ruskin",
    "sun city center",
    "gibsonton",
    "thonotosassa",
    "wimauma",
    "dover",
];

/// Cities whose parcels the Hillsborough County estimator can price.
pub fn is_hillsborough_city(city: &str) -> bool {
    let city = city.trim().to_ascii_lowercase();
    HILLSBOROUGH_CITIES.contains(&city.as_str())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TaxSource {
    County { county: String },
    FlatRate { county: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEstimate {
    pub annual_tax: f64,
    pub monthly_tax: f64,
    pub effective_rate: f64,
    pub source: TaxSource,
}

impl TaxEstimate {
    pub fn new(annual_tax: f64, property_value: f64, source: TaxSource) -> Self {
        let effective_rate = if property_value > 0.0 {
            ((annual_tax / property_value) * 10_000.0).round() / 10_000.0
        } else {
            0.0
        };
        Self {
            annual_tax: annual_tax.round(),
            monthly_tax: (annual_tax / 12.0 * 100.0).round() / 100.0,
            effective_rate,
            source,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FlatRateRow {
    city: String,
    county: String,
    effective_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct FlatRate {
    city: String,
    county: String,
    rate: f64,
}

/// City-level effective property-tax rates for Florida.
#[derive(Debug, Clone, Default)]
pub struct FlatRateTable {
    rates: Vec<FlatRate>,
}

impl FlatRateTable {
    pub fn from_csv(contents: &str) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());
        let mut rates = Vec::new();
        for row in reader.deserialize::<FlatRateRow>() {
            let row = row?;
            rates.push(FlatRate {
                city: row.city.to_ascii_lowercase(),
                county: row.county,
                rate: row.effective_rate,
            });
        }
        Ok(Self { rates })
    }

    /// Table compiled into the binary. Falls back to the default rate everywhere if it is corrupt.
    pub fn embedded() -> &'static FlatRateTable {
        static TABLE: OnceLock<FlatRateTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            FlatRateTable::from_csv(FLAT_RATES_CSV).unwrap_or_else(|err| {
                error!(error = %err, "embedded flat-rate table unreadable");
                FlatRateTable::default()
            })
        })
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    fn lookup(&self, city: &str) -> Option<&FlatRate> {
        let city = city.trim().to_ascii_lowercase();
        self.rates.iter().find(|rate| rate.city == city)
    }

    pub fn rate_for(&self, city: Option<&str>) -> f64 {
        city.and_then(|city| self.lookup(city))
            .map(|rate| rate.rate)
            .unwrap_or(DEFAULT_EFFECTIVE_RATE)
    }

    pub fn estimate(&self, property_value: f64, city: Option<&str>) -> TaxEstimate {
        let found = city.and_then(|city| self.lookup(city));
        let rate = found.map(|rate| rate.rate).unwrap_or(DEFAULT_EFFECTIVE_RATE);
        TaxEstimate::new(
            property_value * rate,
            property_value,
            TaxSource::FlatRate {
                county: found.map(|rate| rate.county.clone()),
            },
        )
    }
}
