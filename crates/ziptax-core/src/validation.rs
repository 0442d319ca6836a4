//! Input checks run before any request is built.
//!
//! Every function here is pure: it either returns normally or fails with
//! [`ZipTaxError::Validation`] carrying a message that names the offending
//! value.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, ZipTaxError};
use crate::models::TaxCloudAddress;

pub const MAX_ADDRESS_LEN: usize = 100;
pub const MIN_API_KEY_LEN: usize = 10;
pub const SUPPORTED_COUNTRY_CODES: [&str; 2] = ["USA", "CAN"];
pub const SUPPORTED_FORMATS: [&str; 1] = ["json"];
pub const ADDRESS_AUTOCOMPLETE_OPTIONS: [&str; 4] = ["none", "origin", "destination", "all"];

static HISTORICAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}[0-9]{2}$").expect("historical pattern is valid"));
static POSTAL_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}$").expect("postal code pattern is valid"));
static STATE_ZIP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{2})\s+([0-9]{5}(?:-[0-9]{4})?)$").expect("state/zip pattern is valid")
});

pub fn validate_address(address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(ZipTaxError::validation("Address cannot be empty"));
    }

    let len = address.chars().count();
    if len > MAX_ADDRESS_LEN {
        return Err(ZipTaxError::validation(format!(
            "Address cannot exceed {MAX_ADDRESS_LEN} characters (got {len})"
        )));
    }

    Ok(())
}

pub fn validate_coordinates(lat: &str, lng: &str) -> Result<()> {
    if lat.trim().is_empty() || lng.trim().is_empty() {
        return Err(ZipTaxError::validation(
            "Latitude and longitude cannot be empty",
        ));
    }

    let (Ok(lat_value), Ok(lng_value)) = (lat.trim().parse::<f64>(), lng.trim().parse::<f64>())
    else {
        return Err(ZipTaxError::validation(format!(
            "Latitude and longitude must be valid numbers, got: ({lat}, {lng})"
        )));
    };

    // NaN fails both range checks.
    if !(-90.0..=90.0).contains(&lat_value) {
        return Err(ZipTaxError::validation(format!(
            "Latitude must be between -90 and 90, got: {lat}"
        )));
    }

    if !(-180.0..=180.0).contains(&lng_value) {
        return Err(ZipTaxError::validation(format!(
            "Longitude must be between -180 and 180, got: {lng}"
        )));
    }

    Ok(())
}

pub fn validate_country_code(country_code: &str) -> Result<()> {
    if SUPPORTED_COUNTRY_CODES.contains(&country_code) {
        return Ok(());
    }
    Err(ZipTaxError::validation(format!(
        "Country code must be one of {SUPPORTED_COUNTRY_CODES:?}, got: {country_code}"
    )))
}

/// Checks a `YYYYMM` period for historical rate lookups.
pub fn validate_historical_date(historical: &str) -> Result<()> {
    if !HISTORICAL_PATTERN.is_match(historical) {
        return Err(ZipTaxError::validation(format!(
            "Historical date must be in YYYYMM format, got: {historical}"
        )));
    }

    let (year, month) = historical.split_at(4);
    let year: u32 = year.parse().map_err(|_| {
        ZipTaxError::validation(format!(
            "Historical date must be in YYYYMM format, got: {historical}"
        ))
    })?;
    let month: u32 = month.parse().map_err(|_| {
        ZipTaxError::validation(format!(
            "Historical date must be in YYYYMM format, got: {historical}"
        ))
    })?;

    if !(1900..=2100).contains(&year) {
        return Err(ZipTaxError::validation(format!(
            "Invalid year: {year} (expected 1900-2100)"
        )));
    }
    if !(1..=12).contains(&month) {
        return Err(ZipTaxError::validation(format!(
            "Invalid month: {month} (expected 01-12)"
        )));
    }

    Ok(())
}

pub fn validate_format(format: &str) -> Result<()> {
    if SUPPORTED_FORMATS.contains(&format) {
        return Ok(());
    }
    Err(ZipTaxError::validation(format!(
        "Format must be one of {SUPPORTED_FORMATS:?}, got: {format}"
    )))
}

pub fn validate_api_key(api_key: &str) -> Result<()> {
    if api_key.is_empty() {
        return Err(ZipTaxError::validation("API key cannot be empty"));
    }
    if api_key.chars().count() < MIN_API_KEY_LEN {
        return Err(ZipTaxError::validation(
            "API key appears to be invalid (too short)",
        ));
    }
    Ok(())
}

/// Accepts five-digit US postal codes only; the rate service rejects ZIP+4.
pub fn validate_postal_code(postal_code: &str) -> Result<()> {
    if postal_code.is_empty() {
        return Err(ZipTaxError::validation("Postal code cannot be empty"));
    }
    if !POSTAL_CODE_PATTERN.is_match(postal_code) {
        return Err(ZipTaxError::validation(format!(
            "Postal code must be in 5-digit format (e.g., 92694), got: {postal_code}"
        )));
    }
    Ok(())
}

pub fn validate_address_autocomplete(option: &str) -> Result<()> {
    if ADDRESS_AUTOCOMPLETE_OPTIONS.contains(&option) {
        return Ok(());
    }
    Err(ZipTaxError::validation(format!(
        "Address autocomplete must be one of {ADDRESS_AUTOCOMPLETE_OPTIONS:?}, got: {option}"
    )))
}

/// Splits `"line1, city, ST 12345"` into a structured TaxCloud address.
///
/// Any segments before the city are joined back into `line1`, so
/// `"323 Washington Ave N, Suite 100, Minneapolis, MN 55401"` keeps the
/// suite on the street line.
pub fn parse_address_string(address: &str) -> Result<TaxCloudAddress> {
    let segments: Vec<&str> = address.split(',').map(str::trim).collect();
    if segments.len() < 3 {
        return Err(ZipTaxError::validation(format!(
            "Cannot parse address '{address}': expected 'street, city, ST 12345'"
        )));
    }

    let state_zip = segments[segments.len() - 1];
    let captures = STATE_ZIP_PATTERN.captures(state_zip).ok_or_else(|| {
        ZipTaxError::validation(format!(
            "Cannot parse state and ZIP from '{state_zip}' in address '{address}'"
        ))
    })?;

    let city = segments[segments.len() - 2];
    let line1 = segments[..segments.len() - 2].join(", ");
    if line1.is_empty() || city.is_empty() {
        return Err(ZipTaxError::validation(format!(
            "Cannot parse address '{address}': street and city are required"
        )));
    }

    Ok(TaxCloudAddress {
        line1,
        line2: None,
        city: city.to_owned(),
        state: captures[1].to_owned(),
        zip: captures[2].to_owned(),
        country_code: Some(String::from("US")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn message(result: Result<()>) -> String {
        let error = result.expect_err("validation must fail");
        assert_eq!(error.kind(), ErrorKind::Validation);
        error.message().to_owned()
    }

    #[test]
    fn address_length_and_emptiness_have_distinct_messages() {
        assert!(message(validate_address("")).contains("empty"));
        assert!(message(validate_address(&"a".repeat(101))).contains("exceed 100"));
        assert!(validate_address(&"a".repeat(100)).is_ok());
        assert!(validate_address("200 Spectrum Center Drive, Irvine, CA 92618").is_ok());
    }

    #[test]
    fn coordinates_reject_out_of_range_and_non_numeric_values() {
        assert!(validate_coordinates("33.6489", "-117.8386").is_ok());
        assert!(validate_coordinates("90", "180").is_ok());
        assert!(validate_coordinates("-90", "-180").is_ok());

        assert!(message(validate_coordinates("90.0001", "0")).contains("Latitude"));
        assert!(message(validate_coordinates("0", "-180.5")).contains("Longitude"));
        assert!(message(validate_coordinates("north", "0")).contains("valid numbers"));
        assert!(message(validate_coordinates("NaN", "0")).contains("Latitude"));
        assert!(message(validate_coordinates("", "1")).contains("empty"));
    }

    #[test]
    fn country_code_accepts_supported_set_only() {
        assert!(validate_country_code("USA").is_ok());
        assert!(validate_country_code("CAN").is_ok());
        assert!(message(validate_country_code("MEX")).contains("MEX"));
        assert!(validate_country_code("usa").is_err());
    }

    #[test]
    fn historical_requires_six_digits_within_range() {
        assert!(validate_historical_date("202401").is_ok());
        assert!(validate_historical_date("190001").is_ok());
        assert!(validate_historical_date("210012").is_ok());

        assert!(message(validate_historical_date("2024-01")).contains("YYYYMM"));
        assert!(message(validate_historical_date("20241")).contains("YYYYMM"));
        assert!(message(validate_historical_date("202413")).contains("month"));
        assert!(message(validate_historical_date("202400")).contains("month"));
        assert!(message(validate_historical_date("189912")).contains("year"));
        assert!(message(validate_historical_date("210101")).contains("year"));
    }

    #[test]
    fn format_must_be_json() {
        assert!(validate_format("json").is_ok());
        assert!(message(validate_format("xml")).contains("xml"));
    }

    #[test]
    fn api_key_rejects_empty_and_truncated_keys() {
        assert!(message(validate_api_key("")).contains("empty"));
        assert!(message(validate_api_key("short")).contains("too short"));
        assert!(validate_api_key("test-api-key-1234567890").is_ok());
    }

    #[test]
    fn postal_code_rejects_extensions_and_wrong_lengths() {
        assert!(validate_postal_code("92694").is_ok());
        assert!(message(validate_postal_code("92694-1234")).contains("92694-1234"));
        assert!(validate_postal_code("9269").is_err());
        assert!(validate_postal_code("926945").is_err());
        assert!(validate_postal_code("abcde").is_err());
        assert!(message(validate_postal_code("")).contains("empty"));
    }

    #[test]
    fn address_autocomplete_accepts_four_literals() {
        for option in ["none", "origin", "destination", "all"] {
            assert!(validate_address_autocomplete(option).is_ok(), "{option}");
        }
        assert!(message(validate_address_autocomplete("both")).contains("both"));
    }

    #[test]
    fn parses_single_line_address_into_parts() {
        let parsed = parse_address_string("200 Spectrum Center Dr, Irvine, CA 92618")
            .expect("address should parse");

        assert_eq!(parsed.line1, "200 Spectrum Center Dr");
        assert_eq!(parsed.city, "Irvine");
        assert_eq!(parsed.state, "CA");
        assert_eq!(parsed.zip, "92618");
        assert_eq!(parsed.country_code.as_deref(), Some("US"));
    }

    #[test]
    fn parses_zip_plus_four_and_multi_segment_street() {
        let parsed =
            parse_address_string("323 Washington Ave N, Suite 100, Minneapolis, MN 55401-2427")
                .expect("address should parse");

        assert_eq!(parsed.line1, "323 Washington Ave N, Suite 100");
        assert_eq!(parsed.city, "Minneapolis");
        assert_eq!(parsed.state, "MN");
        assert_eq!(parsed.zip, "55401-2427");
    }

    #[test]
    fn address_parse_failures_name_the_bad_segment() {
        let error = parse_address_string("200 Spectrum Center Dr, Irvine")
            .expect_err("two segments must fail");
        assert_eq!(error.kind(), ErrorKind::Validation);

        let error = parse_address_string("200 Spectrum Center Dr, Irvine, California")
            .expect_err("missing zip must fail");
        assert!(error.message().contains("'California'"));
    }
}
