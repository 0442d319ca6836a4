use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

use serde_json::Value;

use crate::error::Result;
use crate::validation::validate_api_key;

pub const DEFAULT_BASE_URL: &str = "https://api.zip-tax.com";
pub const DEFAULT_TAXCLOUD_BASE_URL: &str = "https://api.v3.taxcloud.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

const MASK: &str = "***";

/// Client settings, owned by one client for its whole lifetime.
///
/// Unknown options go into `extra`, keyed by name.
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub taxcloud_connection_id: Option<String>,
    pub taxcloud_api_key: Option<String>,
    pub taxcloud_base_url: String,
    pub extra: BTreeMap<String, Value>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            taxcloud_connection_id: None,
            taxcloud_api_key: None,
            taxcloud_base_url: String::from(DEFAULT_TAXCLOUD_BASE_URL),
            extra: BTreeMap::new(),
        }
    }

    /// Reads `ZIPTAX_API_KEY` plus the optional base URL and TaxCloud variables.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ZIPTAX_API_KEY").unwrap_or_default();
        validate_api_key(&api_key)?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("ZIPTAX_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let (Ok(connection_id), Ok(api_key)) = (
            std::env::var("TAXCLOUD_CONNECTION_ID"),
            std::env::var("TAXCLOUD_API_KEY"),
        ) {
            config = config.with_taxcloud(connection_id, api_key);
        }
        if let Ok(base_url) = std::env::var("TAXCLOUD_BASE_URL") {
            config = config.with_taxcloud_base_url(base_url);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_taxcloud(
        mut self,
        connection_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.taxcloud_connection_id = Some(connection_id.into());
        self.taxcloud_api_key = Some(api_key.into());
        self
    }

    pub fn with_taxcloud_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.taxcloud_base_url = trim_base_url(base_url.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Both TaxCloud credentials present and non-empty.
    pub fn has_taxcloud_config(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.taxcloud_connection_id) && present(&self.taxcloud_api_key)
    }

    /// Flat view of the settings with both API keys masked.
    pub fn masked_summary(&self) -> BTreeMap<String, Value> {
        let mut summary = BTreeMap::new();
        summary.insert(String::from("api_key"), Value::from(MASK));
        summary.insert(String::from("base_url"), Value::from(self.base_url.as_str()));
        summary.insert(String::from("timeout"), Value::from(self.timeout.as_secs_f64()));
        summary.insert(String::from("max_retries"), Value::from(self.max_retries));
        summary.insert(
            String::from("retry_delay"),
            Value::from(self.retry_delay.as_secs_f64()),
        );
        if let Some(connection_id) = &self.taxcloud_connection_id {
            summary.insert(
                String::from("taxcloud_connection_id"),
                Value::from(connection_id.as_str()),
            );
        }
        if self.taxcloud_api_key.is_some() {
            summary.insert(String::from("taxcloud_api_key"), Value::from(MASK));
        }
        if self.taxcloud_base_url != DEFAULT_TAXCLOUD_BASE_URL {
            summary.insert(
                String::from("taxcloud_base_url"),
                Value::from(self.taxcloud_base_url.as_str()),
            );
        }
        for (key, value) in &self.extra {
            summary.entry(key.clone()).or_insert_with(|| value.clone());
        }
        summary
    }
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &MASK)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("taxcloud_connection_id", &self.taxcloud_connection_id)
            .field(
                "taxcloud_api_key",
                &self.taxcloud_api_key.as_ref().map(|_| MASK),
            )
            .field("taxcloud_base_url", &self.taxcloud_base_url)
            .field("extra", &self.extra)
            .finish()
    }
}

fn trim_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_owned()
}
