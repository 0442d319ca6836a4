use serde::{Deserialize, Serialize};

/// Structured postal address used by the TaxCloud order endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCloudAddress {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub currency_code: String,
}

impl Currency {
    pub fn usd() -> Self {
        Self {
            currency_code: String::from("USD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tax {
    pub amount: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemWithTax {
    pub index: u32,
    pub item_id: String,
    pub price: f64,
    pub quantity: f64,
    pub tax: Tax,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tic: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exemption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exemption_id: Option<String>,
    #[serde(default)]
    pub is_exempt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_id: String,
    pub customer_id: String,
    pub transaction_date: String,
    pub completed_date: String,
    pub origin: TaxCloudAddress,
    pub destination: TaxCloudAddress,
    pub line_items: Vec<CartItemWithTax>,
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_by_seller: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_from_filing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exemption: Option<Exemption>,
}

/// Only the completion date of an existing order can be changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub completed_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: String,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
    pub origin: TaxCloudAddress,
    pub destination: TaxCloudAddress,
    pub line_items: Vec<CartItemWithTax>,
    pub currency: Currency,
    #[serde(default)]
    pub delivered_by_seller: bool,
    #[serde(default)]
    pub exclude_from_filing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exemption: Option<Exemption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRefundWithTaxRequest {
    pub item_id: String,
    pub quantity: f64,
}

/// Partial refund when `items` is set, full refund otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundTransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<CartItemRefundWithTaxRequest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundTax {
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRefundWithTaxResponse {
    #[serde(default)]
    pub index: u32,
    pub item_id: String,
    #[serde(default)]
    pub price: f64,
    pub quantity: f64,
    pub tax: RefundTax,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tic: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundTransactionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned_date: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItemRefundWithTaxResponse>,
}
