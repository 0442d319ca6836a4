use serde::{Deserialize, Serialize};

use crate::error::ZipTaxError;

/// Origin- or destination-based sourcing for intrastate sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourcingRule {
    Origin,
    Destination,
}

impl SourcingRule {
    /// Maps the `sourcingRules.value` indicator; anything other than `"O"`
    /// is treated as destination-based.
    pub fn from_indicator(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("O") => Self::Origin,
            _ => Self::Destination,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V60ResponseInfo {
    pub code: i64,
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V60Metadata {
    pub version: String,
    pub response: V60ResponseInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V60BaseRate {
    pub rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_id: Option<String>,
    pub jur_type: String,
    pub jur_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jur_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jur_tax_code: Option<String>,
}

/// Service or shipping taxability block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V60Taxability {
    pub adjustment_type: String,
    pub taxable: String,
    pub description: String,
}

impl V60Taxability {
    pub fn is_taxable(&self) -> bool {
        self.taxable == "Y"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V60SourcingRules {
    pub adjustment_type: String,
    #[serde(default)]
    pub description: String,
    /// `"O"` (origin) or `"D"` (destination); kept raw so unknown values decode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl V60SourcingRules {
    pub fn rule(&self) -> SourcingRule {
        SourcingRule::from_indicator(self.value.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V60DisplayRate {
    pub name: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V60TaxSummary {
    pub rate: f64,
    pub tax_type: String,
    pub summary_name: String,
    #[serde(default)]
    pub display_rates: Vec<V60DisplayRate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V60AddressDetail {
    pub normalized_address: String,
    #[serde(default)]
    pub incorporated: String,
    #[serde(default)]
    pub geo_lat: f64,
    #[serde(default)]
    pub geo_lng: f64,
}

/// Rate lookup result for address and geolocation queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V60Response {
    pub metadata: V60Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_rates: Option<Vec<V60BaseRate>>,
    pub service: V60Taxability,
    pub shipping: V60Taxability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcing_rules: Option<V60SourcingRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_summaries: Option<Vec<V60TaxSummary>>,
    pub address_detail: V60AddressDetail,
}

impl V60Response {
    /// Sourcing rule advertised for this jurisdiction, destination when absent.
    pub fn sourcing_rule(&self) -> SourcingRule {
        self.sourcing_rules
            .as_ref()
            .map(V60SourcingRules::rule)
            .unwrap_or(SourcingRule::Destination)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V60PostalCodeResult {
    pub geo_postal_code: String,
    pub geo_city: String,
    pub geo_county: String,
    pub geo_state: String,
    pub tax_sales: f64,
    pub tax_use: f64,
    pub txb_service: String,
    pub txb_freight: String,
    pub state_sales_tax: f64,
    pub state_use_tax: f64,
    pub city_sales_tax: f64,
    pub city_use_tax: f64,
    pub city_tax_code: String,
    pub county_sales_tax: f64,
    pub county_use_tax: f64,
    pub county_tax_code: String,
    pub district_sales_tax: f64,
    pub district_use_tax: f64,
    #[serde(default)]
    pub district1_code: String,
    #[serde(default)]
    pub district1_sales_tax: f64,
    #[serde(default)]
    pub district1_use_tax: f64,
    #[serde(default)]
    pub district2_code: String,
    #[serde(default)]
    pub district2_sales_tax: f64,
    #[serde(default)]
    pub district2_use_tax: f64,
    #[serde(default)]
    pub district3_code: String,
    #[serde(default)]
    pub district3_sales_tax: f64,
    #[serde(default)]
    pub district3_use_tax: f64,
    #[serde(default)]
    pub district4_code: String,
    #[serde(default)]
    pub district4_sales_tax: f64,
    #[serde(default)]
    pub district4_use_tax: f64,
    #[serde(default)]
    pub district5_code: String,
    #[serde(default)]
    pub district5_sales_tax: f64,
    #[serde(default)]
    pub district5_use_tax: f64,
    pub origin_destination: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V60PostalCodeAddressDetail {
    #[serde(default)]
    pub normalized_address: String,
    #[serde(default)]
    pub incorporated: String,
    #[serde(default)]
    pub geo_lat: f64,
    #[serde(default)]
    pub geo_lng: f64,
}

/// Postal code lookups return one result per location inside the code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V60PostalCodeResponse {
    pub version: String,
    pub r_code: i64,
    #[serde(default)]
    pub results: Vec<V60PostalCodeResult>,
    pub address_detail: V60PostalCodeAddressDetail,
}

/// Usage counters for an API key.
///
/// The service has answered with both flat (`request_count`) and legacy
/// prefixed (`core_request_count`) field names; both decode and the flat
/// name wins when a payload carries the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAccountMetrics")]
pub struct V60AccountMetrics {
    pub request_count: i64,
    pub request_limit: i64,
    pub usage_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_request_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_request_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_usage_percent: Option<f64>,
    pub is_active: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct RawAccountMetrics {
    request_count: Option<i64>,
    core_request_count: Option<i64>,
    request_limit: Option<i64>,
    core_request_limit: Option<i64>,
    usage_percent: Option<f64>,
    core_usage_percent: Option<f64>,
    geo_enabled: Option<bool>,
    geo_request_count: Option<i64>,
    geo_request_limit: Option<i64>,
    geo_usage_percent: Option<f64>,
    is_active: bool,
    message: String,
}

impl TryFrom<RawAccountMetrics> for V60AccountMetrics {
    type Error = ZipTaxError;

    fn try_from(raw: RawAccountMetrics) -> Result<Self, Self::Error> {
        fn pick<T>(flat: Option<T>, legacy: Option<T>, field: &str) -> Result<T, ZipTaxError> {
            flat.or(legacy).ok_or_else(|| {
                ZipTaxError::api(format!(
                    "account metrics missing field '{field}' (or 'core_{field}')"
                ))
            })
        }

        Ok(Self {
            request_count: pick(raw.request_count, raw.core_request_count, "request_count")?,
            request_limit: pick(raw.request_limit, raw.core_request_limit, "request_limit")?,
            usage_percent: pick(raw.usage_percent, raw.core_usage_percent, "usage_percent")?,
            geo_enabled: raw.geo_enabled,
            geo_request_count: raw.geo_request_count,
            geo_request_limit: raw.geo_request_limit,
            geo_usage_percent: raw.geo_usage_percent,
            is_active: raw.is_active,
            message: raw.message,
        })
    }
}
