//! Async client for the ZipTax rate API and the TaxCloud order API.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Result, ZipTaxError};
use crate::http_client::{HttpAuth, HttpClient, ReqwestHttpClient};
use crate::models::{
    CalculateCartRequest, CartCalculation, CreateOrderRequest, OrderResponse,
    RefundTransactionRequest, RefundTransactionResponse, UpdateOrderRequest, V60AccountMetrics,
    V60PostalCodeResponse, V60Response,
};
use crate::operations::{self, AddressLookup, GeoLocationLookup, PostalCodeLookup};
use crate::retry::{retry_async, RetryPolicy};
use crate::sourcing::{self, SourcingDecision};
use crate::transport::{ApiCall, Transport};
use crate::validation::validate_api_key;

/// Which service a call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Backend {
    ZipTax,
    TaxCloud,
}

/// Async client.
///
/// Holds one [`Transport`] for the ZipTax API and, when both TaxCloud
/// credentials are configured, a second one for TaxCloud. Transports are
/// closed by [`ZipTaxClient::close`] or on drop, whichever comes first.
///
/// ```rust,ignore
/// use ziptax_core::{ClientConfig, ZipTaxClient};
///
/// let client = ZipTaxClient::new(ClientConfig::new("your-api-key"))?;
/// let rates = client
///     .get_sales_tax_by_address("200 Spectrum Center Drive, Irvine, CA 92618")
///     .await?;
/// println!("{}", rates.address_detail.normalized_address);
/// ```
pub struct ZipTaxClient {
    config: ClientConfig,
    ziptax: Transport,
    taxcloud: Option<Transport>,
}

impl ZipTaxClient {
    /// Builds a client backed by reqwest, one connection pool per backend.
    pub fn new(config: ClientConfig) -> Result<Self> {
        validate_api_key(&config.api_key)?;
        let ziptax_http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
        let taxcloud_http = config
            .has_taxcloud_config()
            .then(|| Arc::new(ReqwestHttpClient::new()) as Arc<dyn HttpClient>);
        Ok(Self::from_parts(config, ziptax_http, taxcloud_http))
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::new(api_key))
    }

    /// Builds a client over a caller-supplied HTTP client, shared by both backends.
    pub fn with_http_client(
        config: ClientConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self> {
        validate_api_key(&config.api_key)?;
        let taxcloud_http = config.has_taxcloud_config().then(|| http_client.clone());
        Ok(Self::from_parts(config, http_client, taxcloud_http))
    }

    fn from_parts(
        config: ClientConfig,
        ziptax_http: Arc<dyn HttpClient>,
        taxcloud_http: Option<Arc<dyn HttpClient>>,
    ) -> Self {
        let ziptax = Transport::new(
            ziptax_http,
            config.base_url.as_str(),
            HttpAuth::api_key_header(config.api_key.as_str()),
            config.timeout,
        );
        let taxcloud = match (taxcloud_http, config.taxcloud_api_key.as_deref()) {
            (Some(http_client), Some(api_key)) => Some(Transport::new(
                http_client,
                config.taxcloud_base_url.as_str(),
                HttpAuth::api_key_header(api_key),
                config.timeout,
            )),
            _ => None,
        };

        debug!(taxcloud = taxcloud.is_some(), "created ziptax client");
        Self {
            config,
            ziptax,
            taxcloud,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Retry settings and extras take effect on the next call. Timeouts,
    /// base URLs and credentials are bound to the transports at construction.
    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub fn has_taxcloud(&self) -> bool {
        self.taxcloud.is_some()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config)
    }

    /// Releases both connection pools. Safe to call more than once.
    pub fn close(&self) {
        self.ziptax.close();
        if let Some(taxcloud) = &self.taxcloud {
            taxcloud.close();
        }
    }

    pub(crate) fn transport(&self, backend: Backend) -> Result<&Transport> {
        match backend {
            Backend::ZipTax => Ok(&self.ziptax),
            Backend::TaxCloud => self
                .taxcloud
                .as_ref()
                .ok_or_else(ZipTaxError::taxcloud_not_configured),
        }
    }

    /// Connection ID for TaxCloud paths; fails before any I/O when TaxCloud
    /// is not set up.
    pub(crate) fn taxcloud_connection_id(&self) -> Result<&str> {
        self.transport(Backend::TaxCloud)?;
        self.config
            .taxcloud_connection_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(ZipTaxError::taxcloud_not_configured)
    }

    async fn execute(&self, backend: Backend, call: &ApiCall) -> Result<Value> {
        let transport = self.transport(backend)?;
        retry_async(&self.retry_policy(), move || transport.send(call)).await
    }

    pub async fn get_sales_tax_by_address(
        &self,
        lookup: impl Into<AddressLookup>,
    ) -> Result<V60Response> {
        let call = lookup.into().to_call()?;
        operations::decode(self.execute(Backend::ZipTax, &call).await?)
    }

    pub async fn get_sales_tax_by_geolocation(
        &self,
        lookup: impl Into<GeoLocationLookup>,
    ) -> Result<V60Response> {
        let call = lookup.into().to_call()?;
        operations::decode(self.execute(Backend::ZipTax, &call).await?)
    }

    pub async fn get_rates_by_postal_code(
        &self,
        lookup: impl Into<PostalCodeLookup>,
    ) -> Result<V60PostalCodeResponse> {
        let call = lookup.into().to_call()?;
        operations::decode(self.execute(Backend::ZipTax, &call).await?)
    }

    /// Usage for this client's key, or for `key` when given.
    pub async fn get_account_metrics(&self, key: Option<&str>) -> Result<V60AccountMetrics> {
        let call = operations::account_metrics_call(key);
        operations::decode(self.execute(Backend::ZipTax, &call).await?)
    }

    /// Looks up both addresses concurrently and picks the governing one.
    pub async fn resolve_sourcing(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<SourcingDecision> {
        let (destination_lookup, origin_lookup) = tokio::try_join!(
            self.get_sales_tax_by_address(destination),
            self.get_sales_tax_by_address(origin),
        )?;
        sourcing::resolve(origin, destination, &origin_lookup, &destination_lookup)
    }

    /// Resolves each cart's sourcing address, writes it over both origin and
    /// destination, then computes the tax on TaxCloud when it is configured
    /// and on ZipTax otherwise.
    pub async fn calculate_cart(&self, request: &CalculateCartRequest) -> Result<CartCalculation> {
        operations::validate_cart(request)?;

        let mut decisions = Vec::with_capacity(request.items.len());
        for item in &request.items {
            decisions.push(
                self.resolve_sourcing(&item.origin.address, &item.destination.address)
                    .await?,
            );
        }
        let sourced = operations::apply_sourcing(request, &decisions);

        if self.has_taxcloud() {
            let call = operations::taxcloud_cart_call(self.taxcloud_connection_id()?, &sourced)?;
            let body = self.execute(Backend::TaxCloud, &call).await?;
            return operations::decode(body).map(CartCalculation::TaxCloud);
        }

        let call = operations::ziptax_cart_call(&sourced)?;
        let body = self.execute(Backend::ZipTax, &call).await?;
        operations::decode(body).map(CartCalculation::ZipTax)
    }

    /// `address_autocomplete` is one of `none`, `origin`, `destination`, `all`.
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
        address_autocomplete: &str,
    ) -> Result<OrderResponse> {
        let connection_id = self.taxcloud_connection_id()?;
        let call = operations::create_order_call(connection_id, request, address_autocomplete)?;
        operations::decode(self.execute(Backend::TaxCloud, &call).await?)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<OrderResponse> {
        let call = operations::get_order_call(self.taxcloud_connection_id()?, order_id)?;
        operations::decode(self.execute(Backend::TaxCloud, &call).await?)
    }

    /// Changes the order's completion date.
    pub async fn update_order(
        &self,
        order_id: &str,
        request: &UpdateOrderRequest,
    ) -> Result<OrderResponse> {
        let connection_id = self.taxcloud_connection_id()?;
        let call = operations::update_order_call(connection_id, order_id, request)?;
        operations::decode(self.execute(Backend::TaxCloud, &call).await?)
    }

    /// Refunds the listed items, or the whole order when `request` is `None`.
    /// An order can be refunded once.
    pub async fn refund_order(
        &self,
        order_id: &str,
        request: Option<&RefundTransactionRequest>,
    ) -> Result<Vec<RefundTransactionResponse>> {
        let connection_id = self.taxcloud_connection_id()?;
        let call = operations::refund_order_call(connection_id, order_id, request)?;
        operations::decode_refunds(self.execute(Backend::TaxCloud, &call).await?)
    }
}

impl Drop for ZipTaxClient {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ZipTaxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipTaxClient")
            .field("base_url", &self.config.base_url)
            .field("taxcloud", &self.has_taxcloud())
            .finish()
    }
}
