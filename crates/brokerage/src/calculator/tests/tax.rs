use crate::calculator::tax::{is_hillsborough_city, DEFAULT_EFFECTIVE_RATE};
use crate::calculator::{FlatRateTable, TaxSource};

#[test]
fn embedded_table_loads() {
    let table = FlatRateTable::embedded();
    assert!(table.len() >= 20);
    assert!((table.rate_for(Some("Naples")) - 0.0072).abs() < 1e-12);
    assert!((table.rate_for(Some("  gainesville ")) - 0.0135).abs() < 1e-12);
}

#[test]
fn unknown_cities_use_the_default_rate() {
    let table = FlatRateTable::embedded();
    assert_eq!(table.rate_for(Some("Key West")), DEFAULT_EFFECTIVE_RATE);
    assert_eq!(table.rate_for(None), DEFAULT_EFFECTIVE_RATE);

    let estimate = table.estimate(300_000.0, None);
    assert_eq!(estimate.annual_tax, 3_300.0);
    assert_eq!(estimate.monthly_tax, 275.0);
    assert_eq!(estimate.source, TaxSource::FlatRate { county: None });
}

#[test]
fn hillsborough_membership_ignores_case_and_padding() {
    assert!(is_hillsborough_city("Tampa"));
    assert!(is_hillsborough_city(" plant city "));
    assert!(!is_hillsborough_city("St. Petersburg"));
}

#[test]
fn malformed_csv_is_an_error() {
    let err = FlatRateTable::from_csv("city,county,effective_rate\nTampa,Hillsborough,high\n");
    assert!(err.is_err());

    let table = FlatRateTable::from_csv("city,county,effective_rate\n Ocala , Marion , 0.0099\n")
        .expect("parses");
    assert_eq!(table.len(), 1);
    assert!((table.rate_for(Some("ocala")) - 0.0099).abs() < 1e-12);
}
