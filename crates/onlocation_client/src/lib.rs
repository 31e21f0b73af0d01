//! OnLocation staff API client.
//!
//! Fetches the staff list from the `/staff` endpoint and normalizes the
//! response into a flat employee list. One round trip per call, no retries —
//! the poll loop retries at its own cadence.

use std::time::Duration;

use common::{Employee, Error};
use serde_json::Value;
use tracing::debug;

/// Wrapper keys the upstream may nest the staff list under, tried in order.
const PAYLOAD_KEYS: [&str; 3] = ["data", "staff", "employees"];

/// Staff API client with connection pooling and a bounded request timeout.
#[derive(Debug, Clone)]
pub struct OnLocationClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OnLocationClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .timeout(timeout)
            .build()
            .expect("failed to build staff HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL helper.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the current staff list.
    ///
    /// Fails on connection errors, non-2xx responses, and bodies that are
    /// not JSON. The returned list is unsorted; ordering is the caller's
    /// concern.
    pub async fn fetch_staff(&self) -> Result<Vec<Employee>, Error> {
        let url = self.url("/staff");
        debug!("Fetching staff list: {}", url);

        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("APIKEY {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                message: body.chars().take(300).collect(),
            });
        }

        let data: Value = resp.json().await.map_err(|e| Error::Http(e.to_string()))?;
        let employees = normalize_staff_payload(data)?;

        debug!("Got {} staff records", employees.len());
        Ok(employees)
    }
}

/// Unwrap the staff list from the response body.
///
/// The API normally returns a bare array, but the contract is loose enough
/// that a wrapper object shows up too; in that case the list is looked up
/// under `data`, then `staff`, then `employees`, and a wrapper with none of
/// those yields an empty list.
fn normalize_staff_payload(data: Value) -> Result<Vec<Employee>, Error> {
    match data {
        Value::Array(_) => serde_json::from_value(data).map_err(Error::Json),
        Value::Object(mut map) => {
            for key in PAYLOAD_KEYS {
                if let Some(payload) = map.remove(key) {
                    return serde_json::from_value(payload).map_err(Error::Json);
                }
            }
            Ok(Vec::new())
        }
        other => Err(Error::Upstream(format!(
            "expected array or object, got: {}",
            other
        ))),
    }
}
