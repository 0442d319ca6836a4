//! Shared fixtures for the integration tests: a scripted in-memory
//! `HttpClient` and canned ZipTax / TaxCloud payloads.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use ziptax_core::{ClientConfig, HttpClient, HttpError, HttpRequest, HttpResponse};

pub const API_KEY: &str = "test-api-key-1234567890";
pub const TAXCLOUD_API_KEY: &str = "taxcloud-key-0987654321";
pub const CONNECTION_ID: &str = "25eb9b97-5acb-492d-b720-c03e79cf715a";

type Scripted = Result<HttpResponse, HttpError>;

/// Replays canned responses and records every request it receives.
///
/// Responses are picked by the first route whose needle occurs in the
/// request URL. Each route replays its queue in order and repeats the last
/// entry once the queue is down to one.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<(String, VecDeque<Scripted>)>>,
    requests: Mutex<Vec<HttpRequest>>,
    closes: AtomicUsize,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, needle: &str, response: Scripted) -> Self {
        {
            let mut routes = self.routes.lock().expect("routes lock");
            match routes.iter_mut().find(|(existing, _)| existing == needle) {
                Some((_, queue)) => queue.push_back(response),
                None => routes.push((needle.to_owned(), VecDeque::from([response]))),
            }
        }
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn next_response(&self, url: &str) -> Scripted {
        let mut routes = self.routes.lock().expect("routes lock");
        let Some((_, queue)) = routes.iter_mut().find(|(needle, _)| url.contains(needle.as_str()))
        else {
            return Err(HttpError::other(format!("no scripted response for {url}")));
        };
        if queue.len() > 1 {
            queue.pop_front().expect("queue is non-empty")
        } else {
            queue.front().cloned().expect("route has a response")
        }
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self.next_response(&request.url);
        self.requests.lock().expect("requests lock").push(request);
        Box::pin(async move { response })
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn ok(body: Value) -> Scripted {
    Ok(HttpResponse::ok_json(body.to_string()))
}

pub fn status(code: u16, body: &str) -> Scripted {
    Ok(HttpResponse::new(code, body))
}

/// Fast retries so failure paths do not slow the suite down.
pub fn config() -> ClientConfig {
    ClientConfig::new(API_KEY)
        .with_base_url("https://api.zip-tax.test")
        .with_retry_delay(Duration::ZERO)
}

pub fn taxcloud_config() -> ClientConfig {
    config()
        .with_taxcloud(CONNECTION_ID, TAXCLOUD_API_KEY)
        .with_taxcloud_base_url("https://api.taxcloud.test")
}

/// `GET /request/v60/` body for one address.
pub fn v60_body(normalized_address: &str, sourcing: Option<&str>) -> Value {
    let mut body = json!({
        "metadata": {
            "version": "v60",
            "response": {
                "code": 100,
                "name": "RESPONSE_CODE_SUCCESS",
                "message": "Successful API Request.",
                "definition": "http://api.zip-tax.com/request/v60/schema"
            }
        },
        "baseRates": [
            {"rate": 0.06, "jurType": "US_STATE_SALES_TAX", "jurName": "CA", "jurDescription": "US State Sales Tax", "jurTaxCode": "06"},
            {"rate": 0.0025, "jurType": "US_COUNTY_SALES_TAX", "jurName": "ORANGE", "jurDescription": "US County Sales Tax", "jurTaxCode": "30"}
        ],
        "service": {"adjustmentType": "SERVICE_TAXABLE", "taxable": "N", "description": "Services non-taxable"},
        "shipping": {"adjustmentType": "FREIGHT_TAXABLE", "taxable": "N", "description": "Freight non-taxable"},
        "taxSummaries": [
            {
                "rate": 0.0775,
                "taxType": "SALES_TAX",
                "summaryName": "Total Base Sales Tax",
                "displayRates": [{"name": "Total Rate", "rate": 0.0775}]
            }
        ],
        "addressDetail": {
            "normalizedAddress": normalized_address,
            "incorporated": "true",
            "geoLat": 33.65253,
            "geoLng": -117.74794
        }
    });
    if let Some(value) = sourcing {
        body["sourcingRules"] = json!({
            "adjustmentType": "ORIGIN_DESTINATION",
            "description": "Origin/destination sourcing",
            "value": value
        });
    }
    body
}

pub fn postal_code_body() -> Value {
    json!({
        "version": "v60",
        "rCode": 100,
        "results": [{
            "geoPostalCode": "92694",
            "geoCity": "LADERA RANCH",
            "geoCounty": "ORANGE",
            "geoState": "CA",
            "taxSales": 0.0775,
            "taxUse": 0.0775,
            "txbService": "N",
            "txbFreight": "N",
            "stateSalesTax": 0.06,
            "stateUseTax": 0.06,
            "citySalesTax": 0.0,
            "cityUseTax": 0.0,
            "cityTaxCode": "",
            "countySalesTax": 0.0025,
            "countyUseTax": 0.0025,
            "countyTaxCode": "30",
            "districtSalesTax": 0.015,
            "districtUseTax": 0.015,
            "originDestination": "D"
        }],
        "addressDetail": {
            "normalizedAddress": "Not Found",
            "incorporated": "",
            "geoLat": 0.0,
            "geoLng": 0.0
        }
    })
}

pub fn cart_response_body(address: &str) -> Value {
    json!({
        "items": [{
            "cartId": "ce4a1234-5678-90ab-cdef-1234567890ab",
            "customerId": "customer-453",
            "currency": {"currencyCode": "USD"},
            "destination": {"address": address},
            "origin": {"address": address},
            "lineItems": [{
                "itemId": "item-1",
                "price": 10.75,
                "quantity": 1.5,
                "tax": {"rate": 0.0775, "amount": 1.25}
            }]
        }]
    })
}

pub fn taxcloud_address() -> Value {
    json!({
        "line1": "323 Washington Ave N",
        "city": "Minneapolis",
        "state": "MN",
        "zip": "55401-2427",
        "countryCode": "US"
    })
}

pub fn order_body(order_id: &str) -> Value {
    json!({
        "orderId": order_id,
        "customerId": "customer-453",
        "connectionId": CONNECTION_ID,
        "transactionDate": "2024-01-15T09:30:00Z",
        "completedDate": "2024-01-15T09:30:00Z",
        "origin": taxcloud_address(),
        "destination": taxcloud_address(),
        "lineItems": [{
            "index": 0,
            "itemId": "item-1",
            "price": 10.8,
            "quantity": 1.5,
            "tax": {"amount": 1.31, "rate": 0.0813}
        }],
        "currency": {"currencyCode": "USD"},
        "deliveredBySeller": false,
        "excludeFromFiling": false
    })
}

pub fn refund_body() -> Value {
    json!({
        "connectionId": CONNECTION_ID,
        "createdDate": "2024-01-17T10:00:00Z",
        "items": [{
            "index": 0,
            "itemId": "item-1",
            "price": 10.8,
            "quantity": 1.0,
            "tax": {"amount": 0.88}
        }]
    })
}
