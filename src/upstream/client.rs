use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::types::{
    AssignmentUpdate, CustomerDetail, CustomerPage, CustomerQuery, CustomerScope,
    MarketingAssignment, NewProspect, Product, Profile, StatusUpdate,
};
use super::{UpstreamApi, UpstreamError};

type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// reqwest-backed core API client.
///
/// All requests share one response pipeline: transport errors map to
/// `Network`, a 401 fires the unauthorized hook before being returned to
/// the caller, and anything that is not a well-formed success envelope
/// maps to `Rejected` or `InvalidResponse`.
pub struct HttpUpstream {
    http: reqwest::Client,
    /// Normalized base URL, no trailing slash
    base: String,
    on_unauthorized: RwLock<Option<UnauthorizedHook>>,
}

impl HttpUpstream {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        // Validate up front so request paths can be joined by formatting
        let parsed = Url::parse(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base: parsed.as_str().trim_end_matches('/').to_string(),
            on_unauthorized: RwLock::new(None),
        })
    }

    /// Register the callback invoked on any 401 from the core API.
    /// The session manager uses this to drop its cached profiles.
    pub fn set_unauthorized_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut slot) = self.on_unauthorized.write() {
            *slot = Some(Box::new(hook));
        }
    }

    fn fire_unauthorized(&self) {
        if let Ok(slot) = self.on_unauthorized.read() {
            if let Some(hook) = slot.as_ref() {
                hook();
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn bearer(builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {}", token))
    }

    /// Decode a response into the `{success, data?, message?}` envelope and
    /// extract `data`. 401 interception happens here, for every call.
    async fn handle<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, UpstreamError> {
        let body = self.envelope(response).await?;
        let data = body
            .data
            .ok_or_else(|| UpstreamError::InvalidResponse("missing data field".to_string()))?;
        serde_json::from_value(data)
            .map_err(|e| UpstreamError::InvalidResponse(format!("unexpected data shape: {}", e)))
    }

    /// Like `handle`, for mutations where we only care that the envelope
    /// reported success.
    async fn handle_ack(&self, response: reqwest::Response) -> Result<(), UpstreamError> {
        self.envelope(response).await.map(|_| ())
    }

    async fn envelope(
        &self,
        response: reqwest::Response,
    ) -> Result<RawEnvelope, UpstreamError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.fire_unauthorized();
            let message = read_message(response).await.unwrap_or_else(|| {
                "Your session has expired, please log in again".to_string()
            });
            return Err(UpstreamError::Unauthorized { message });
        }

        let value: Value = response.json().await.map_err(|e| {
            UpstreamError::InvalidResponse(format!("response is not JSON: {}", e))
        })?;

        let success = value
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if !status.is_success() || !success {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Core API reported a failure")
                .to_string();
            return Err(UpstreamError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(RawEnvelope {
            data: value.get("data").cloned().filter(|d| !d.is_null()),
            token: value
                .get("token")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

struct RawEnvelope {
    data: Option<Value>,
    token: Option<String>,
}

async fn read_message(response: reqwest::Response) -> Option<String> {
    let value: Value = response.json().await.ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl UpstreamApi for HttpUpstream {
    async fn login(&self, nip: &str, password: &str) -> Result<String, UpstreamError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "nip": nip, "password": password }))
            .send()
            .await?;

        // Login returns the token at the top level of the envelope
        let envelope = self.envelope(response).await?;
        envelope
            .token
            .ok_or_else(|| UpstreamError::InvalidResponse("login reply had no token".to_string()))
    }

    async fn profile(&self, token: &str) -> Result<Profile, UpstreamError> {
        let response = Self::bearer(self.http.get(self.url("/profile/summary")), token)
            .send()
            .await?;
        self.handle(response).await
    }

    async fn customers(
        &self,
        token: &str,
        scope: CustomerScope,
        query: &CustomerQuery,
    ) -> Result<CustomerPage, UpstreamError> {
        let response = Self::bearer(self.http.get(self.url(scope.path())), token)
            .query(&query.to_pairs())
            .send()
            .await?;
        self.handle(response).await
    }

    async fn customer(&self, token: &str, cif: &str) -> Result<CustomerDetail, UpstreamError> {
        let path = format!("/marketing/customers/{}", cif);
        let response = Self::bearer(self.http.get(self.url(&path)), token)
            .send()
            .await?;
        self.handle(response).await
    }

    async fn update_status(
        &self,
        token: &str,
        cif: &str,
        update: &StatusUpdate,
    ) -> Result<(), UpstreamError> {
        let path = format!("/marketing/customer/{}", cif);
        let response = Self::bearer(self.http.post(self.url(&path)), token)
            .json(update)
            .send()
            .await?;
        self.handle_ack(response).await
    }

    async fn submit_prospect(
        &self,
        token: &str,
        prospect: &NewProspect,
    ) -> Result<(), UpstreamError> {
        let response = Self::bearer(self.http.post(self.url("/predictions")), token)
            .json(prospect)
            .send()
            .await?;
        self.handle_ack(response).await
    }

    async fn products(&self, token: &str) -> Result<Vec<Product>, UpstreamError> {
        let response = Self::bearer(self.http.get(self.url("/produk")), token)
            .send()
            .await?;
        self.handle(response).await
    }

    async fn assignments(
        &self,
        token: &str,
        month: u32,
        year: i32,
        search: &str,
    ) -> Result<Vec<MarketingAssignment>, UpstreamError> {
        let response = Self::bearer(
            self.http.get(self.url("/bm/monitoring/assignment")),
            token,
        )
        .query(&[
            ("month", month.to_string()),
            ("year", year.to_string()),
            ("search", search.to_string()),
        ])
        .send()
        .await?;
        self.handle(response).await
    }

    async fn save_assignment(
        &self,
        token: &str,
        nip: &str,
        update: &AssignmentUpdate,
    ) -> Result<(), UpstreamError> {
        let path = format!("/bm/monitoring/assignment/{}", nip);
        let response = Self::bearer(self.http.post(self.url(&path)), token)
            .json(update)
            .send()
            .await?;
        self.handle_ack(response).await
    }

    async fn target_summary(
        &self,
        token: &str,
        month: u32,
        year: i32,
    ) -> Result<Value, UpstreamError> {
        let response = Self::bearer(self.http.get(self.url("/bm/monitoring/target")), token)
            .query(&[("month", month.to_string()), ("year", year.to_string())])
            .send()
            .await?;
        self.handle(response).await
    }

    async fn product_performance(
        &self,
        token: &str,
        month: u32,
        year: i32,
    ) -> Result<Value, UpstreamError> {
        let response = Self::bearer(
            self.http.get(self.url("/bm/monitoring/product-performance")),
            token,
        )
        .query(&[("month", month.to_string()), ("year", year.to_string())])
        .send()
        .await?;
        self.handle(response).await
    }

    async fn ping(&self) -> bool {
        self.http.get(&self.base).send().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = HttpUpstream::new("http://localhost:8000/").unwrap();
        assert_eq!(client.url("/produk"), "http://localhost:8000/produk");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(HttpUpstream::new("not a url").is_err());
    }
}
