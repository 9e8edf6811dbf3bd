//! Downstream access for the bridge.
//!
//! [`DataAccess`] is the seam between tool dispatch and the Data Access API.
//! [`HttpDataAccess`] talks to the real API; tests plug in fakes.

use super::result::ToolError;
use crate::config::BackendTimeouts;
use crate::domain::QueryContext;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};
use std::time::Duration;

pub type BackendResult = Result<Value, ToolError>;

/// Operations the tool catalog forwards to. Every method returns the
/// backend's decoded JSON body or an already-normalized [`ToolError`].
#[async_trait]
pub trait DataAccess: Send + Sync {
    async fn search_members(&self, member_id: Option<&str>, name: Option<&str>) -> BackendResult;

    async fn get_member(&self, member_id: &str) -> BackendResult;

    async fn member_care_gaps(&self, member_id: &str) -> BackendResult;

    async fn member_authorizations(&self, member_id: &str) -> BackendResult;

    async fn query_ai(&self, query: &str, context: &QueryContext) -> BackendResult;
}

/// HTTP client for the Data Access API.
///
/// A fresh `reqwest::Client` is built per call: no connection is shared
/// between tool invocations, and each call carries its own timeout.
#[derive(Debug, Clone)]
pub struct HttpDataAccess {
    base_url: Url,
    timeouts: BackendTimeouts,
}

impl HttpDataAccess {
    pub fn new(base_url: &str, timeouts: BackendTimeouts) -> anyhow::Result<Self> {
        let base_url: Url = base_url.parse()?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot carry a path: {}", base_url);
        }
        Ok(Self { base_url, timeouts })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ToolError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ToolError::backend_error("API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn client(&self, timeout: Duration) -> Result<reqwest::Client, ToolError> {
        reqwest::Client::builder()
            .connect_timeout(self.timeouts.connect)
            .timeout(timeout)
            .build()
            .map_err(|e| ToolError::backend_unavailable(format!("Failed to build HTTP client: {}", e)))
    }

    async fn get(&self, segments: &[&str], query: &[(&str, &str)]) -> BackendResult {
        let url = self.endpoint(segments)?;
        let timeout = self.timeouts.lookup;

        tracing::debug!(url = %url, "GET backend");
        let response = self
            .client(timeout)?
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error(&url, timeout, e))?;

        decode(&url, timeout, response).await
    }

    async fn post(&self, segments: &[&str], body: &Value) -> BackendResult {
        let url = self.endpoint(segments)?;
        let timeout = self.timeouts.query;

        tracing::debug!(url = %url, "POST backend");
        let response = self
            .client(timeout)?
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&url, timeout, e))?;

        decode(&url, timeout, response).await
    }
}

#[async_trait]
impl DataAccess for HttpDataAccess {
    async fn search_members(&self, member_id: Option<&str>, name: Option<&str>) -> BackendResult {
        let mut query = Vec::with_capacity(2);
        if let Some(member_id) = member_id.filter(|s| !s.is_empty()) {
            query.push(("memberId", member_id));
        }
        if let Some(name) = name.filter(|s| !s.is_empty()) {
            query.push(("name", name));
        }
        self.get(&["members"], &query).await
    }

    async fn get_member(&self, member_id: &str) -> BackendResult {
        self.get(&["members", member_id], &[]).await
    }

    async fn member_care_gaps(&self, member_id: &str) -> BackendResult {
        self.get(&["members", member_id, "care-gaps"], &[]).await
    }

    async fn member_authorizations(&self, member_id: &str) -> BackendResult {
        self.get(&["members", member_id, "authorizations"], &[]).await
    }

    async fn query_ai(&self, query: &str, context: &QueryContext) -> BackendResult {
        let body = json!({
            "query": query,
            "context": context,
        });
        self.post(&["ai", "query"], &body).await
    }
}

/// Faults before a response arrived: all mean the backend is unavailable.
fn transport_error(url: &Url, timeout: Duration, err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        tracing::warn!(url = %url, timeout_ms = timeout.as_millis() as u64, "Backend call timed out");
        ToolError::backend_unavailable(format!(
            "Backend did not respond within {} ms",
            timeout.as_millis()
        ))
    } else if err.is_connect() {
        tracing::warn!(url = %url, error = %err, "Backend unreachable");
        ToolError::backend_unavailable(format!("Backend unreachable: {}", err))
    } else {
        tracing::warn!(url = %url, error = %err, "Backend request failed");
        ToolError::backend_unavailable(format!("Backend request failed: {}", err))
    }
}

/// Map a response to the payload or a typed error. 404 is `NotFound`; a
/// body tagged `persistence_failure` is `PersistenceFailure`; any other
/// non-2xx is `BackendError`.
async fn decode(url: &Url, timeout: Duration, response: reqwest::Response) -> BackendResult {
    let status = response.status();

    if status.is_success() {
        return response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                transport_error(url, timeout, e)
            } else {
                ToolError::backend_error(format!("Undecodable backend response: {}", e))
            }
        });
    }

    let body = response.json::<Value>().await.ok();
    let message = body
        .as_ref()
        .and_then(|b| b.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Backend returned {}", status));
    let kind = body
        .as_ref()
        .and_then(|b| b.get("kind"))
        .and_then(Value::as_str);

    tracing::debug!(url = %url, status = status.as_u16(), kind = kind.unwrap_or("-"), "Backend error response");

    Err(match (status, kind) {
        (StatusCode::NOT_FOUND, _) => ToolError::not_found(message),
        (_, Some("persistence_failure")) => ToolError::persistence_failure(message),
        _ => ToolError::backend_error(format!(
            "Backend returned {}: {}",
            status.as_u16(),
            message
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        let access =
            HttpDataAccess::new("http://localhost:8000/api/", BackendTimeouts::default()).unwrap();
        let url = access.endpoint(&["members", "MBR 1/x", "care-gaps"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/members/MBR%201%2Fx/care-gaps"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(HttpDataAccess::new("mailto:care@example.com", BackendTimeouts::default()).is_err());
        assert!(HttpDataAccess::new("not a url", BackendTimeouts::default()).is_err());
    }
}
