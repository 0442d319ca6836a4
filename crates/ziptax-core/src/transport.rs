//! One backend's HTTP boundary.
//!
//! A [`Transport`] owns the connection handle for a single base URL and API
//! key. It turns an [`ApiCall`] into an HTTP request and the outcome into
//! either a JSON body or a classified [`ZipTaxError`]. Classification
//! happens here and nowhere else.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, ZipTaxError};
use crate::http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse,
};

/// A request against a backend, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiCall {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn query_keys(&self) -> Vec<&str> {
        self.query.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn body_keys(&self) -> Vec<&str> {
        match &self.body {
            Some(Value::Object(map)) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// Connection handle bound to one backend: base URL, auth header, timeout.
pub struct Transport {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    auth: HttpAuth,
    timeout: Duration,
    closed: AtomicBool,
}

impl Transport {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        auth: HttpAuth,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            auth,
            timeout,
            closed: AtomicBool::new(false),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Releases the underlying connection pool; later calls are no-ops.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("closing HTTP transport");
            self.http_client.close();
        }
    }

    /// Executes one call, without retries.
    pub async fn send(&self, call: &ApiCall) -> Result<Value> {
        debug!(
            method = %call.method,
            path = %call.path,
            query_keys = ?call.query_keys(),
            body_keys = ?call.body_keys(),
            "sending request"
        );

        if self.is_closed() {
            return Err(ZipTaxError::api("Unexpected error: transport has been closed"));
        }

        let request = self.build_request(call)?;
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| self.classify_transport_error(error))?;

        debug!(path = %call.path, status = response.status, "received response");

        if !response.is_success() {
            return Err(classify_status(&response));
        }

        serde_json::from_str(&response.body).map_err(|error| {
            ZipTaxError::api(format!("Unexpected error: invalid JSON response: {error}"))
        })
    }

    fn build_request(&self, call: &ApiCall) -> Result<HttpRequest> {
        let mut url = format!("{}{}", self.base_url, call.path);
        if !call.query.is_empty() {
            let query = call
                .query
                .iter()
                .map(|(name, value)| {
                    format!(
                        "{}={}",
                        urlencoding::encode(name),
                        urlencoding::encode(value)
                    )
                })
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }

        let mut request = HttpRequest::new(call.method, url)
            .with_auth(&self.auth)
            .with_timeout(self.timeout);

        for (name, value) in &call.headers {
            request = request.with_header(name.as_str(), value.as_str());
        }

        if let Some(body) = &call.body {
            let body = serde_json::to_string(body).map_err(|error| {
                ZipTaxError::api(format!("Unexpected error: cannot encode request body: {error}"))
            })?;
            request = request.with_json_body(body);
        }

        Ok(request)
    }

    fn classify_transport_error(&self, error: HttpError) -> ZipTaxError {
        match error.kind() {
            HttpErrorKind::Timeout => ZipTaxError::timeout(format!(
                "Request timed out after {}s: {}",
                self.timeout.as_secs_f64(),
                error.message()
            )),
            HttpErrorKind::Connect => {
                ZipTaxError::connection(format!("Connection error: {}", error.message()))
            }
            HttpErrorKind::Closed | HttpErrorKind::Other => {
                ZipTaxError::api(format!("Unexpected error: {}", error.message()))
            }
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("timeout", &self.timeout)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Maps a non-2xx response onto the error taxonomy.
pub fn classify_status(response: &HttpResponse) -> ZipTaxError {
    let status_code = response.status;
    let message = error_message(response);

    match status_code {
        401 => ZipTaxError::Authentication {
            message: format!("Authentication failed: {message}"),
            status_code,
        },
        403 => ZipTaxError::Authorization {
            message: format!("Authorization failed: {message}"),
            status_code,
        },
        404 => ZipTaxError::NotFound {
            message: format!("Resource not found: {message}"),
            status_code,
        },
        429 => ZipTaxError::RateLimited {
            message: format!("Rate limit exceeded: {message}"),
            status_code,
            retry_after: response
                .header("retry-after")
                .and_then(|value| value.trim().parse::<u64>().ok()),
        },
        500..=599 => ZipTaxError::Server {
            message: format!("Server error: {message}"),
            status_code,
        },
        _ => ZipTaxError::Api {
            message: format!("API error: {message}"),
            status_code: Some(status_code),
        },
    }
}

/// JSON `message` field, else the raw body, else a generic status line.
fn error_message(response: &HttpResponse) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&response.body) {
        match map.get("message") {
            Some(Value::String(message)) => return message.clone(),
            Some(other) if !other.is_null() => return other.to_string(),
            _ => {}
        }
    }

    if response.body.trim().is_empty() {
        format!("HTTP {} error", response.status)
    } else {
        response.body.clone()
    }
}
