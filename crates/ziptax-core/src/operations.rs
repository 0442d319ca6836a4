//! Call builders and decoders shared by the async and blocking clients.
//!
//! Every builder validates its inputs before producing an [`ApiCall`], so a
//! bad argument never reaches the network.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ZipTaxError};
use crate::models::{
    CalculateCartRequest, CreateOrderRequest, Currency, RefundTransactionRequest,
    RefundTransactionResponse, TaxCloudCalculateCartRequest, TaxCloudCartItem,
    TaxCloudCartLineItem, UpdateOrderRequest,
};
use crate::sourcing::SourcingDecision;
use crate::transport::ApiCall;
use crate::validation::{
    parse_address_string, validate_address, validate_address_autocomplete, validate_coordinates,
    validate_country_code, validate_format, validate_historical_date, validate_postal_code,
};

pub const RATES_PATH: &str = "/request/v60/";
pub const ACCOUNT_METRICS_PATH: &str = "/account/v60/metrics";
pub const CALCULATE_CART_PATH: &str = "/calculate/cart";

const DEFAULT_COUNTRY_CODE: &str = "USA";
const DEFAULT_FORMAT: &str = "json";

/// Options for a rate lookup by street address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressLookup {
    pub address: String,
    pub taxability_code: Option<String>,
    pub country_code: String,
    /// `YYYYMM` period for historical rates.
    pub historical: Option<String>,
    pub format: String,
}

impl AddressLookup {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            taxability_code: None,
            country_code: String::from(DEFAULT_COUNTRY_CODE),
            historical: None,
            format: String::from(DEFAULT_FORMAT),
        }
    }

    pub fn with_taxability_code(mut self, taxability_code: impl Into<String>) -> Self {
        self.taxability_code = Some(taxability_code.into());
        self
    }

    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    pub fn with_historical(mut self, historical: impl Into<String>) -> Self {
        self.historical = Some(historical.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn to_call(&self) -> Result<ApiCall> {
        validate_address(&self.address)?;
        validate_country_code(&self.country_code)?;
        let historical = non_empty(self.historical.as_deref());
        if let Some(historical) = historical {
            validate_historical_date(historical)?;
        }
        validate_format(&self.format)?;

        let mut call = ApiCall::get(RATES_PATH)
            .with_query("address", self.address.as_str())
            .with_query("countryCode", self.country_code.as_str())
            .with_query("format", self.format.as_str());
        if let Some(taxability_code) = non_empty(self.taxability_code.as_deref()) {
            call = call.with_query("taxabilityCode", taxability_code);
        }
        if let Some(historical) = historical {
            call = call.with_query("historical", historical);
        }
        Ok(call)
    }
}

impl From<&str> for AddressLookup {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for AddressLookup {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}

/// Options for a rate lookup by coordinates.
///
/// Coordinates are kept as text and forwarded verbatim once they parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLocationLookup {
    pub lat: String,
    pub lng: String,
    pub country_code: String,
    pub historical: Option<String>,
    pub format: String,
}

impl GeoLocationLookup {
    pub fn new(lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lng: lng.into(),
            country_code: String::from(DEFAULT_COUNTRY_CODE),
            historical: None,
            format: String::from(DEFAULT_FORMAT),
        }
    }

    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    pub fn with_historical(mut self, historical: impl Into<String>) -> Self {
        self.historical = Some(historical.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn to_call(&self) -> Result<ApiCall> {
        validate_coordinates(&self.lat, &self.lng)?;
        validate_country_code(&self.country_code)?;
        let historical = non_empty(self.historical.as_deref());
        if let Some(historical) = historical {
            validate_historical_date(historical)?;
        }
        validate_format(&self.format)?;

        let mut call = ApiCall::get(RATES_PATH)
            .with_query("lat", self.lat.trim())
            .with_query("lng", self.lng.trim())
            .with_query("countryCode", self.country_code.as_str())
            .with_query("format", self.format.as_str());
        if let Some(historical) = historical {
            call = call.with_query("historical", historical);
        }
        Ok(call)
    }
}

impl<Lat: Into<String>, Lng: Into<String>> From<(Lat, Lng)> for GeoLocationLookup {
    fn from((lat, lng): (Lat, Lng)) -> Self {
        Self::new(lat, lng)
    }
}

/// Options for a rate lookup by 5-digit postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalCodeLookup {
    pub postal_code: String,
    pub format: String,
}

impl PostalCodeLookup {
    pub fn new(postal_code: impl Into<String>) -> Self {
        Self {
            postal_code: postal_code.into(),
            format: String::from(DEFAULT_FORMAT),
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn to_call(&self) -> Result<ApiCall> {
        validate_postal_code(&self.postal_code)?;
        validate_format(&self.format)?;

        Ok(ApiCall::get(RATES_PATH)
            .with_query("postalcode", self.postal_code.as_str())
            .with_query("format", self.format.as_str()))
    }
}

impl From<&str> for PostalCodeLookup {
    fn from(postal_code: &str) -> Self {
        Self::new(postal_code)
    }
}

pub fn account_metrics_call(key: Option<&str>) -> ApiCall {
    let call = ApiCall::get(ACCOUNT_METRICS_PATH);
    match non_empty(key) {
        Some(key) => call.with_query("key", key),
        None => call,
    }
}

pub fn validate_cart(request: &CalculateCartRequest) -> Result<()> {
    if request.items.is_empty() {
        return Err(ZipTaxError::validation("Cart must contain at least one item"));
    }
    for item in &request.items {
        if item.line_items.is_empty() {
            return Err(ZipTaxError::validation(format!(
                "Cart for customer '{}' must contain at least one line item",
                item.customer_id
            )));
        }
        validate_address(&item.origin.address)?;
        validate_address(&item.destination.address)?;
    }
    Ok(())
}

/// Copy of `request` with both addresses of item `i` replaced by `decisions[i]`.
pub fn apply_sourcing(
    request: &CalculateCartRequest,
    decisions: &[SourcingDecision],
) -> CalculateCartRequest {
    let mut sourced = request.clone();
    for (item, decision) in sourced.items.iter_mut().zip(decisions) {
        item.origin.address.clone_from(&decision.address);
        item.destination.address.clone_from(&decision.address);
    }
    sourced
}

pub fn ziptax_cart_call(request: &CalculateCartRequest) -> Result<ApiCall> {
    Ok(ApiCall::post(CALCULATE_CART_PATH).with_body(to_body(request)?))
}

/// TaxCloud wants structured addresses, so the single-line ones are parsed.
pub fn taxcloud_cart_request(
    request: &CalculateCartRequest,
) -> Result<TaxCloudCalculateCartRequest> {
    let items = request
        .items
        .iter()
        .map(|item| {
            Ok(TaxCloudCartItem {
                customer_id: item.customer_id.clone(),
                currency: Currency {
                    currency_code: item.currency.currency_code.clone(),
                },
                destination: parse_address_string(&item.destination.address)?,
                origin: parse_address_string(&item.origin.address)?,
                line_items: item
                    .line_items
                    .iter()
                    .enumerate()
                    .map(|(index, line)| TaxCloudCartLineItem {
                        index: u32::try_from(index).unwrap_or(u32::MAX),
                        item_id: line.item_id.clone(),
                        price: line.price,
                        quantity: line.quantity,
                        tic: line.taxability_code,
                    })
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TaxCloudCalculateCartRequest { items })
}

pub fn taxcloud_cart_call(connection_id: &str, request: &CalculateCartRequest) -> Result<ApiCall> {
    let body = to_body(&taxcloud_cart_request(request)?)?;
    Ok(ApiCall::post(format!("{}/carts", connection_path(connection_id))).with_body(body))
}

pub fn create_order_call(
    connection_id: &str,
    request: &CreateOrderRequest,
    address_autocomplete: &str,
) -> Result<ApiCall> {
    validate_address_autocomplete(address_autocomplete)?;

    let mut call = ApiCall::post(format!("{}/orders", connection_path(connection_id)))
        .with_body(to_body(request)?);
    if address_autocomplete != "none" {
        call = call.with_query("addressAutocomplete", address_autocomplete);
    }
    Ok(call)
}

pub fn get_order_call(connection_id: &str, order_id: &str) -> Result<ApiCall> {
    Ok(ApiCall::get(order_path(connection_id, order_id)?))
}

pub fn update_order_call(
    connection_id: &str,
    order_id: &str,
    request: &UpdateOrderRequest,
) -> Result<ApiCall> {
    Ok(ApiCall::patch(order_path(connection_id, order_id)?).with_body(to_body(request)?))
}

/// No request body means a full refund, sent as `{}`.
pub fn refund_order_call(
    connection_id: &str,
    order_id: &str,
    request: Option<&RefundTransactionRequest>,
) -> Result<ApiCall> {
    validate_order_id(order_id)?;
    let body = match request {
        Some(request) => to_body(request)?,
        None => Value::Object(serde_json::Map::new()),
    };
    Ok(ApiCall::post(format!(
        "{}/orders/refunds/{}",
        connection_path(connection_id),
        urlencoding::encode(order_id)
    ))
    .with_body(body))
}

fn connection_path(connection_id: &str) -> String {
    format!("/tax/connections/{}", urlencoding::encode(connection_id))
}

fn order_path(connection_id: &str, order_id: &str) -> Result<String> {
    validate_order_id(order_id)?;
    Ok(format!(
        "{}/orders/{}",
        connection_path(connection_id),
        urlencoding::encode(order_id)
    ))
}

fn validate_order_id(order_id: &str) -> Result<()> {
    if order_id.trim().is_empty() {
        return Err(ZipTaxError::validation("Order ID cannot be empty"));
    }
    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

pub fn to_body<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|error| {
        ZipTaxError::api(format!("Unexpected error: cannot encode request body: {error}"))
    })
}

pub fn decode<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|error| {
        ZipTaxError::api(format!("Unexpected error: cannot decode response: {error}"))
    })
}

/// The refund endpoint answers with one object or an array of them.
pub fn decode_refunds(body: Value) -> Result<Vec<RefundTransactionResponse>> {
    match body {
        Value::Array(items) => items.into_iter().map(decode).collect(),
        other => Ok(vec![decode(other)?]),
    }
}
