//! # Wire Models
//!
//! Typed request and response bodies for the ZipTax rate API and the
//! TaxCloud order API. Field names follow the services' camelCase JSON.
//!
//! | Type | Endpoint |
//! |------|----------|
//! | [`V60Response`] | `GET /request/v60/` (address, geolocation) |
//! | [`V60PostalCodeResponse`] | `GET /request/v60/` (postal code) |
//! | [`V60AccountMetrics`] | `GET /account/v60/metrics` |
//! | [`CalculateCartRequest`] / [`CalculateCartResponse`] | `POST /calculate/cart` |
//! | [`TaxCloudCalculateCartRequest`] / [`TaxCloudCalculateCartResponse`] | TaxCloud carts |
//! | [`CreateOrderRequest`] / [`OrderResponse`] | TaxCloud orders |
//! | [`RefundTransactionRequest`] / [`RefundTransactionResponse`] | TaxCloud refunds |

pub mod cart;
pub mod orders;
pub mod responses;

pub use cart::{
    CalculateCartRequest, CalculateCartResponse, CartAddress, CartCalculation, CartCurrency,
    CartItem, CartItemResponse, CartLineItem, CartLineItemResponse, CartTax,
    TaxCloudCalculateCartRequest, TaxCloudCalculateCartResponse, TaxCloudCartItem,
    TaxCloudCartItemResponse, TaxCloudCartLineItem, TaxCloudCartLineItemResponse,
};
pub use orders::{
    CartItemRefundWithTaxRequest, CartItemRefundWithTaxResponse, CartItemWithTax,
    CreateOrderRequest, Currency, Exemption, OrderResponse, RefundTax, RefundTransactionRequest,
    RefundTransactionResponse, Tax, TaxCloudAddress, UpdateOrderRequest,
};
pub use responses::{
    SourcingRule, V60AccountMetrics, V60AddressDetail, V60BaseRate, V60DisplayRate, V60Metadata,
    V60PostalCodeAddressDetail, V60PostalCodeResponse, V60PostalCodeResult, V60Response,
    V60ResponseInfo, V60SourcingRules, V60TaxSummary, V60Taxability,
};
