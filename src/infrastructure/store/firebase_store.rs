//! REST client for a Realtime-Database-style JSON store.
//!
//! Every path maps to `<base><secret_path>/<path>.json`. A `null` body means
//! nothing is stored at the path.

use super::service::{QueryOptions, Store, StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Document store reached over HTTPS.
///
/// The client-level timeout bounds every call; a timed-out request is
/// dropped and reported as [`StoreError::Timeout`].
pub struct FirebaseStore {
    client: Client,
    base_url: String,
}

impl FirebaseStore {
    /// Builds the HTTP client and the secret base URL.
    ///
    /// # Arguments
    ///
    /// - `store_url` - database root, e.g. `https://example-rtdb.firebaseio.com`
    /// - `secret_path` - unguessable prefix under which all data lives
    /// - `timeout` - per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] if the URL is invalid or the client
    /// cannot be built.
    pub fn new(store_url: &str, secret_path: &str, timeout: Duration) -> StoreResult<Self> {
        let root = store_url.trim_end_matches('/');
        Url::parse(root).map_err(|e| StoreError::Transport(format!("Invalid store URL: {}", e)))?;

        let secret = secret_path.trim_matches('/');
        let base_url = if secret.is_empty() {
            root.to_string()
        } else {
            format!("{}/{}", root, secret)
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        info!("Document store client ready (timeout {}ms)", timeout.as_millis());

        Ok(Self { client, base_url })
    }

    /// Full request URL for `path` with the query options encoded.
    fn endpoint(&self, path: &str, query: Option<&QueryOptions>) -> StoreResult<Url> {
        let path = path.trim_matches('/');
        let raw = if path.is_empty() {
            format!("{}.json", self.base_url)
        } else {
            format!("{}/{}.json", self.base_url, path)
        };

        let mut url =
            Url::parse(&raw).map_err(|e| StoreError::Transport(format!("Invalid path: {}", e)))?;

        if let Some(query) = query {
            let mut pairs = url.query_pairs_mut();
            if query.order_by_key {
                pairs.append_pair("orderBy", &json!("$key").to_string());
            }
            if let Some(limit) = query.limit_to_first {
                pairs.append_pair("limitToFirst", &limit.to_string());
            }
            if let Some(after) = &query.start_after {
                pairs.append_pair("startAfter", &json!(after).to_string());
            }
            if query.shallow {
                pairs.append_pair("shallow", "true");
            }
        }

        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> StoreResult<Response> {
        debug!("Store {} {}", method, url.path());

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            error!("Store responded with status: {}", status);
            return Err(StoreError::Status(status.as_u16()));
        }

        Ok(response)
    }

    async fn write(&self, method: Method, path: &str, body: Option<Value>) -> StoreResult<()> {
        let url = self.endpoint(path, None)?;
        self.send(method, url, body).await?;
        Ok(())
    }
}

fn map_transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Transport(e.to_string())
    }
}

#[async_trait]
impl Store for FirebaseStore {
    async fn get(&self, path: &str, query: Option<QueryOptions>) -> StoreResult<Option<Value>> {
        let url = self.endpoint(path, query.as_ref())?;
        let response = self.send(Method::GET, url, None).await?;

        let value: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout
            } else {
                StoreError::Decode(e.to_string())
            }
        })?;

        Ok(match value {
            Value::Null => None,
            other => Some(other),
        })
    }

    async fn put(&self, path: &str, value: Value) -> StoreResult<()> {
        self.write(Method::PUT, path, Some(value)).await
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.write(Method::DELETE, path, None).await
    }

    async fn patch(&self, path: &str, partial: Value) -> StoreResult<()> {
        self.write(Method::PATCH, path, Some(partial)).await
    }

    async fn apply_delta(&self, path: &str, field: &str, delta: i64) -> StoreResult<()> {
        let body = json!({ field: { ".sv": { "increment": delta } } });
        self.write(Method::PATCH, path, Some(body)).await
    }

    async fn health_check(&self) -> bool {
        self.get("", Some(QueryOptions::shallow())).await.is_ok()
    }
}
