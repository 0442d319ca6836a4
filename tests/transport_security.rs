//! Request logging must describe the shape of a call without leaking its
//! contents: payload keys are fine, payload values and credentials are not.

mod support;

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use support::{config, ok, status, v60_body, ScriptedHttpClient, API_KEY};
use tracing::Level;
use ziptax_core::{ApiCall, ClientConfig, ErrorKind, HttpAuth, Transport, ZipTaxClient};

const SECRET_ADDRESS: &str = "742 Evergreen Terrace, Springfield, OR 97403";

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer lock")).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_debug_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

#[tokio::test]
async fn when_a_body_is_sent_logs_show_keys_but_not_values() {
    // Given: debug logging captured and a transport with a secret-bearing body
    let (logs, _guard) = capture_debug_logs();
    let http = ScriptedHttpClient::new().on("/carts", ok(json!({}))).shared();
    let transport = Transport::new(
        http,
        "https://api.taxcloud.test",
        HttpAuth::api_key_header(API_KEY),
        Duration::from_secs(30),
    );

    // When: the call is sent
    transport
        .send(&ApiCall::post("/carts").with_body(json!({"customerId": "secret-123"})))
        .await
        .expect("request succeeds");

    // Then: only the body key is logged
    let output = logs.contents();
    assert!(output.contains("sending request"), "{output}");
    assert!(output.contains("customerId"), "{output}");
    assert!(!output.contains("secret-123"), "{output}");
    assert!(!output.contains("api.taxcloud.test"), "{output}");
    assert!(!output.contains(API_KEY), "{output}");
}

#[tokio::test]
async fn when_an_address_lookup_is_retried_logs_never_contain_the_address() {
    // Given: a server that fails once before answering
    let (logs, _guard) = capture_debug_logs();
    let http = ScriptedHttpClient::new()
        .on("/request/v60/", status(503, r#"{"message": "busy"}"#))
        .on("/request/v60/", ok(v60_body(SECRET_ADDRESS, None)))
        .shared();
    let client = ZipTaxClient::with_http_client(config(), http).expect("valid config");

    // When: the address is looked up
    client
        .get_sales_tax_by_address(SECRET_ADDRESS)
        .await
        .expect("second attempt succeeds");

    // Then: the retry is logged with the query key only
    let output = logs.contents();
    assert!(output.contains("retrying"), "{output}");
    assert!(output.contains("ziptax.server"), "{output}");
    assert!(output.contains("address"), "{output}");
    assert!(!output.contains("Evergreen"), "{output}");
    assert!(!output.contains(API_KEY), "{output}");
}

#[tokio::test]
async fn when_a_real_connection_is_refused_logs_and_errors_omit_the_url() {
    // Given: a reqwest-backed client pointed at a port nobody listens on
    let (logs, _guard) = capture_debug_logs();
    let client = ZipTaxClient::new(
        ClientConfig::new(API_KEY)
            .with_base_url("http://127.0.0.1:1")
            .with_max_retries(1)
            .with_retry_delay(Duration::ZERO),
    )
    .expect("valid config");

    // When: the address is looked up
    let error = client
        .get_sales_tax_by_address(SECRET_ADDRESS)
        .await
        .expect_err("connection is refused");

    // Then: the failure is retried and reported without the request URL
    assert_eq!(
        error.last_error().map(|last| last.kind()),
        Some(ErrorKind::Connection)
    );
    let output = logs.contents();
    assert!(output.contains("retrying"), "{output}");
    for leaked in ["Evergreen", "127.0.0.1", "countryCode=", API_KEY] {
        assert!(!output.contains(leaked), "{leaked} leaked into logs: {output}");
        assert!(!error.to_string().contains(leaked), "{leaked} leaked into {error}");
    }
}

#[test]
fn debug_output_of_config_and_client_masks_credentials() {
    let config = ClientConfig::new(API_KEY).with_taxcloud("conn-1", "taxcloud-secret-key");

    let rendered_config = format!("{config:?}");
    assert!(!rendered_config.contains(API_KEY), "{rendered_config}");
    assert!(!rendered_config.contains("taxcloud-secret-key"), "{rendered_config}");

    let client = ZipTaxClient::with_http_client(config, ScriptedHttpClient::new().shared())
        .expect("valid config");
    let rendered_client = format!("{client:?}");
    assert!(!rendered_client.contains(API_KEY), "{rendered_client}");
    assert!(!rendered_client.contains("taxcloud-secret-key"), "{rendered_client}");
}

#[test]
fn masked_summary_hides_both_keys_but_keeps_the_connection_id() {
    let summary = ClientConfig::new(API_KEY)
        .with_taxcloud("conn-1", "taxcloud-secret-key")
        .masked_summary();

    assert_eq!(summary["api_key"], "***");
    assert_eq!(summary["taxcloud_api_key"], "***");
    assert_eq!(summary["taxcloud_connection_id"], "conn-1");
}
