use serde::{Deserialize, Serialize};

use super::orders::{Currency, TaxCloudAddress};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCurrency {
    pub currency_code: String,
}

impl CartCurrency {
    pub fn usd() -> Self {
        Self {
            currency_code: String::from("USD"),
        }
    }
}

/// Single-line address as accepted by the cart endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAddress {
    pub address: String,
}

impl CartAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub item_id: String,
    pub price: f64,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxability_code: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub customer_id: String,
    pub currency: CartCurrency,
    pub destination: CartAddress,
    pub origin: CartAddress,
    pub line_items: Vec<CartLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateCartRequest {
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartTax {
    pub rate: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItemResponse {
    pub item_id: String,
    pub price: f64,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxability_code: Option<i64>,
    pub tax: CartTax,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<String>,
    pub customer_id: String,
    pub currency: CartCurrency,
    pub destination: CartAddress,
    pub origin: CartAddress,
    pub line_items: Vec<CartLineItemResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateCartResponse {
    pub items: Vec<CartItemResponse>,
}

/// Cart shape sent to TaxCloud, with structured addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCloudCartItem {
    pub customer_id: String,
    pub currency: Currency,
    pub destination: TaxCloudAddress,
    pub origin: TaxCloudAddress,
    pub line_items: Vec<TaxCloudCartLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCloudCartLineItem {
    pub index: u32,
    pub item_id: String,
    pub price: f64,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tic: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCloudCalculateCartRequest {
    pub items: Vec<TaxCloudCartItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCloudCartLineItemResponse {
    pub index: u32,
    pub item_id: String,
    pub price: f64,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tic: Option<i64>,
    pub tax: CartTax,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCloudCartItemResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<String>,
    pub customer_id: String,
    pub currency: Currency,
    pub destination: TaxCloudAddress,
    pub origin: TaxCloudAddress,
    pub line_items: Vec<TaxCloudCartLineItemResponse>,
    #[serde(default)]
    pub delivered_by_seller: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCloudCalculateCartResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    pub items: Vec<TaxCloudCartItemResponse>,
}

/// Result of a cart calculation, tagged by the backend that computed it.
#[derive(Debug, Clone, PartialEq)]
pub enum CartCalculation {
    ZipTax(CalculateCartResponse),
    TaxCloud(TaxCloudCalculateCartResponse),
}

impl CartCalculation {
    /// Total tax across every line item of every cart.
    pub fn total_tax(&self) -> f64 {
        match self {
            Self::ZipTax(response) => response
                .items
                .iter()
                .flat_map(|item| &item.line_items)
                .map(|line| line.tax.amount)
                .sum(),
            Self::TaxCloud(response) => response
                .items
                .iter()
                .flat_map(|item| &item.line_items)
                .map(|line| line.tax.amount)
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cart_request_serializes_camel_case_without_empty_options() {
        let request = CalculateCartRequest {
            items: vec![CartItem {
                customer_id: String::from("customer-453"),
                currency: CartCurrency::usd(),
                destination: CartAddress::new("200 Spectrum Center Dr, Irvine, CA 92618"),
                origin: CartAddress::new("323 Washington Ave N, Minneapolis, MN 55401"),
                line_items: vec![CartLineItem {
                    item_id: String::from("item-1"),
                    price: 10.75,
                    quantity: 1.5,
                    taxability_code: None,
                }],
            }],
        };

        let value = serde_json::to_value(&request).expect("serializes");
        assert_eq!(value["items"][0]["customerId"], "customer-453");
        assert_eq!(value["items"][0]["currency"]["currencyCode"], "USD");
        assert_eq!(value["items"][0]["lineItems"][0]["itemId"], "item-1");
        assert!(value["items"][0]["lineItems"][0]
            .get("taxabilityCode")
            .is_none());
    }

    #[test]
    fn total_tax_sums_every_line() {
        let response: CalculateCartResponse = serde_json::from_value(json!({
            "items": [{
                "cartId": "cart-1",
                "customerId": "customer-453",
                "currency": {"currencyCode": "USD"},
                "destination": {"address": "200 Spectrum Center Dr, Irvine, CA 92618"},
                "origin": {"address": "200 Spectrum Center Dr, Irvine, CA 92618"},
                "lineItems": [
                    {"itemId": "a", "price": 10.0, "quantity": 1.0, "tax": {"rate": 0.0775, "amount": 0.78}},
                    {"itemId": "b", "price": 20.0, "quantity": 1.0, "tax": {"rate": 0.0775, "amount": 1.55}}
                ]
            }]
        }))
        .expect("decodes");

        let total = CartCalculation::ZipTax(response).total_tax();
        assert!((total - 2.33).abs() < 1e-9);
    }
}
