//! Blocking client.
//!
//! Same operations, validation and decoding as [`crate::ZipTaxClient`], but
//! every call blocks the calling thread, including backoff sleeps. Each HTTP
//! attempt is driven on a private current-thread runtime.
//!
//! # Panics
//!
//! Calls panic when made from inside an async runtime; use the async client
//! there instead.

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Runtime;

use crate::client::{self, Backend};
use crate::config::ClientConfig;
use crate::error::{Result, ZipTaxError};
use crate::http_client::HttpClient;
use crate::models::{
    CalculateCartRequest, CartCalculation, CreateOrderRequest, OrderResponse,
    RefundTransactionRequest, RefundTransactionResponse, UpdateOrderRequest, V60AccountMetrics,
    V60PostalCodeResponse, V60Response,
};
use crate::operations::{self, AddressLookup, GeoLocationLookup, PostalCodeLookup};
use crate::retry::{retry_blocking, RetryPolicy};
use crate::sourcing::{self, SourcingDecision};
use crate::transport::ApiCall;

/// Blocking counterpart of [`crate::ZipTaxClient`].
pub struct ZipTaxClient {
    inner: client::ZipTaxClient,
    runtime: Runtime,
}

impl ZipTaxClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let runtime = build_runtime()?;
        Ok(Self {
            inner: client::ZipTaxClient::new(config)?,
            runtime,
        })
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::new(api_key))
    }

    pub fn with_http_client(
        config: ClientConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self> {
        let runtime = build_runtime()?;
        Ok(Self {
            inner: client::ZipTaxClient::with_http_client(config, http_client)?,
            runtime,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        self.inner.config_mut()
    }

    pub fn has_taxcloud(&self) -> bool {
        self.inner.has_taxcloud()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry_policy()
    }

    pub fn close(&self) {
        self.inner.close();
    }

    fn execute(&self, backend: Backend, call: &ApiCall) -> Result<Value> {
        let transport = self.inner.transport(backend)?;
        retry_blocking(&self.inner.retry_policy(), || {
            self.runtime.block_on(transport.send(call))
        })
    }

    pub fn get_sales_tax_by_address(
        &self,
        lookup: impl Into<AddressLookup>,
    ) -> Result<V60Response> {
        let call = lookup.into().to_call()?;
        operations::decode(self.execute(Backend::ZipTax, &call)?)
    }

    pub fn get_sales_tax_by_geolocation(
        &self,
        lookup: impl Into<GeoLocationLookup>,
    ) -> Result<V60Response> {
        let call = lookup.into().to_call()?;
        operations::decode(self.execute(Backend::ZipTax, &call)?)
    }

    pub fn get_rates_by_postal_code(
        &self,
        lookup: impl Into<PostalCodeLookup>,
    ) -> Result<V60PostalCodeResponse> {
        let call = lookup.into().to_call()?;
        operations::decode(self.execute(Backend::ZipTax, &call)?)
    }

    pub fn get_account_metrics(&self, key: Option<&str>) -> Result<V60AccountMetrics> {
        let call = operations::account_metrics_call(key);
        operations::decode(self.execute(Backend::ZipTax, &call)?)
    }

    /// Destination lookup first, then origin.
    pub fn resolve_sourcing(&self, origin: &str, destination: &str) -> Result<SourcingDecision> {
        let destination_lookup = self.get_sales_tax_by_address(destination)?;
        let origin_lookup = self.get_sales_tax_by_address(origin)?;
        sourcing::resolve(origin, destination, &origin_lookup, &destination_lookup)
    }

    pub fn calculate_cart(&self, request: &CalculateCartRequest) -> Result<CartCalculation> {
        operations::validate_cart(request)?;

        let decisions = request
            .items
            .iter()
            .map(|item| self.resolve_sourcing(&item.origin.address, &item.destination.address))
            .collect::<Result<Vec<_>>>()?;
        let sourced = operations::apply_sourcing(request, &decisions);

        if self.has_taxcloud() {
            let call =
                operations::taxcloud_cart_call(self.inner.taxcloud_connection_id()?, &sourced)?;
            let body = self.execute(Backend::TaxCloud, &call)?;
            return operations::decode(body).map(CartCalculation::TaxCloud);
        }

        let call = operations::ziptax_cart_call(&sourced)?;
        operations::decode(self.execute(Backend::ZipTax, &call)?).map(CartCalculation::ZipTax)
    }

    pub fn create_order(
        &self,
        request: &CreateOrderRequest,
        address_autocomplete: &str,
    ) -> Result<OrderResponse> {
        let connection_id = self.inner.taxcloud_connection_id()?;
        let call = operations::create_order_call(connection_id, request, address_autocomplete)?;
        operations::decode(self.execute(Backend::TaxCloud, &call)?)
    }

    pub fn get_order(&self, order_id: &str) -> Result<OrderResponse> {
        let call = operations::get_order_call(self.inner.taxcloud_connection_id()?, order_id)?;
        operations::decode(self.execute(Backend::TaxCloud, &call)?)
    }

    pub fn update_order(
        &self,
        order_id: &str,
        request: &UpdateOrderRequest,
    ) -> Result<OrderResponse> {
        let connection_id = self.inner.taxcloud_connection_id()?;
        let call = operations::update_order_call(connection_id, order_id, request)?;
        operations::decode(self.execute(Backend::TaxCloud, &call)?)
    }

    pub fn refund_order(
        &self,
        order_id: &str,
        request: Option<&RefundTransactionRequest>,
    ) -> Result<Vec<RefundTransactionResponse>> {
        let connection_id = self.inner.taxcloud_connection_id()?;
        let call = operations::refund_order_call(connection_id, order_id, request)?;
        operations::decode_refunds(self.execute(Backend::TaxCloud, &call)?)
    }
}

impl std::fmt::Debug for ZipTaxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("blocking::ZipTaxClient")
            .field(&self.inner)
            .finish()
    }
}

fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| {
            ZipTaxError::api(format!("Unexpected error: cannot start runtime: {error}"))
        })
}
