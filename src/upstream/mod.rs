//! Client for the external core banking REST API.
//!
//! Every outgoing call the gateway makes goes through the [`UpstreamApi`]
//! trait. The one concrete implementation, [`HttpUpstream`], decodes the
//! `{success, data?, message?}` envelope the core API speaks and fires a
//! registered on-unauthorized callback whenever any call comes back 401.
//! Callers still receive the 401 as an error and surface their own message.

pub mod client;
pub mod types;

pub use client::HttpUpstream;
pub use types::{
    AssignmentUpdate, CustomerDetail, CustomerPage, CustomerQuery, CustomerScope,
    CustomerSummary, MarketingAssignment, NewProspect, Product, Profile, StatusUpdate,
    TargetDetail, TargetRow,
};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure modes of a core API call, in the order the response pipeline
/// can hit them.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport-level failure; no HTTP response at all
    #[error("core API unreachable: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not the JSON envelope we expect
    #[error("core API returned a malformed response: {0}")]
    InvalidResponse(String),

    /// HTTP 401; the unauthorized hook has already fired by the time
    /// the caller sees this
    #[error("{message}")]
    Unauthorized { message: String },

    /// Any other non-success outcome, message taken from the envelope
    #[error("core API rejected the request: {message}")]
    Rejected { status: u16, message: String },
}

/// The full surface of the core API the dashboard consumes.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// POST /auth/login - exchange credentials for a bearer token
    async fn login(&self, nip: &str, password: &str) -> Result<String, UpstreamError>;

    /// GET /profile/summary
    async fn profile(&self, token: &str) -> Result<Profile, UpstreamError>;

    /// GET /marketing/customers[/me]
    async fn customers(
        &self,
        token: &str,
        scope: CustomerScope,
        query: &CustomerQuery,
    ) -> Result<CustomerPage, UpstreamError>;

    /// GET /marketing/customers/{cif}
    async fn customer(&self, token: &str, cif: &str) -> Result<CustomerDetail, UpstreamError>;

    /// POST /marketing/customer/{cif} - pipeline status transition
    async fn update_status(
        &self,
        token: &str,
        cif: &str,
        update: &StatusUpdate,
    ) -> Result<(), UpstreamError>;

    /// POST /predictions - register a new prospect
    async fn submit_prospect(
        &self,
        token: &str,
        prospect: &NewProspect,
    ) -> Result<(), UpstreamError>;

    /// GET /produk - product catalog
    async fn products(&self, token: &str) -> Result<Vec<Product>, UpstreamError>;

    /// GET /bm/monitoring/assignment
    async fn assignments(
        &self,
        token: &str,
        month: u32,
        year: i32,
        search: &str,
    ) -> Result<Vec<MarketingAssignment>, UpstreamError>;

    /// POST /bm/monitoring/assignment/{nip}
    async fn save_assignment(
        &self,
        token: &str,
        nip: &str,
        update: &AssignmentUpdate,
    ) -> Result<(), UpstreamError>;

    /// GET /bm/monitoring/target - aggregate branch target for charts
    async fn target_summary(
        &self,
        token: &str,
        month: u32,
        year: i32,
    ) -> Result<Value, UpstreamError>;

    /// GET /bm/monitoring/product-performance - per-product chart series
    async fn product_performance(
        &self,
        token: &str,
        month: u32,
        year: i32,
    ) -> Result<Value, UpstreamError>;

    /// Cheap reachability probe for /health
    async fn ping(&self) -> bool;
}
