//! # ZipTax Core
//!
//! Client for the ZipTax sales tax rate API and the TaxCloud order
//! management API.
//!
//! ## Overview
//!
//! Every call runs the same pipeline:
//!
//! - **Validation** of inputs before any request is built
//! - **Transport** over a pooled HTTP client with an `X-API-Key` header
//! - **Error classification** of HTTP statuses and transport failures
//! - **Retry with exponential backoff**, honouring `Retry-After` on 429
//! - **Decoding** of the JSON body into typed models
//!
//! Cart calculations additionally resolve origin/destination sourcing
//! before the cart is sent, to TaxCloud when it is configured and to
//! ZipTax otherwise.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`blocking`] | Thread-blocking client |
//! | [`client`] | Async client |
//! | [`config`] | Client settings and environment loading |
//! | [`error`] | Error taxonomy |
//! | [`http_client`] | HTTP client abstraction and reqwest implementation |
//! | [`models`] | Request and response bodies |
//! | [`operations`] | Lookup options, call builders and decoders |
//! | [`retry`] | Retry policy and combinators |
//! | [`sourcing`] | Origin/destination sourcing resolution |
//! | [`transport`] | Per-backend HTTP boundary |
//! | [`validation`] | Input validators and address parsing |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ziptax_core::{ClientConfig, ZipTaxClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ZipTaxClient::new(ClientConfig::from_env()?)?;
//!
//!     let response = client
//!         .get_sales_tax_by_address("200 Spectrum Center Drive, Irvine, CA 92618")
//!         .await?;
//!     for rate in response.base_rates.unwrap_or_default() {
//!         println!("{}: {}", rate.jur_name, rate.rate);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result`], whose error is [`ZipTaxError`]:
//!
//! ```rust,ignore
//! use ziptax_core::{ErrorKind, ZipTaxError};
//!
//! match client.get_rates_by_postal_code("92694").await {
//!     Ok(rates) => println!("{} results", rates.results.len()),
//!     Err(error) if error.kind() == ErrorKind::RetryExhausted => {
//!         eprintln!("gave up after {:?} attempts", error.attempts());
//!     }
//!     Err(error) => eprintln!("{}: {error}", error.code()),
//! }
//! ```

pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
pub mod operations;
pub mod retry;
pub mod sourcing;
pub mod transport;
pub mod validation;

pub use client::ZipTaxClient;
pub use config::ClientConfig;
pub use error::{ErrorKind, Result, ZipTaxError};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};
pub use models::*;
pub use operations::{AddressLookup, GeoLocationLookup, PostalCodeLookup};
pub use retry::{retry_async, retry_async_with, retry_blocking, retry_blocking_with, RetryPolicy};
pub use sourcing::SourcingDecision;
pub use transport::{ApiCall, Transport};
