//! Wire types for the core banking API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::CustomerStatus;
use crate::types::Role;

/// Profile snapshot returned by GET /profile/summary and stored in the
/// `user` session cookie. The `type` field carries the role claim the
/// route guard authorizes against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "type")]
    pub role: Role,
    pub branch_name: String,
    pub name: String,
    pub nip: String,
    pub total_target: i64,
    pub achieved: i64,
    pub percentage: f64,
    /// Per-product breakdown; shape is owned by the charts, we pass it through
    #[serde(default)]
    pub products: Value,
    pub target_month: u32,
    pub target_year: i32,
    pub target_setted: bool,
}

/// Which customer listing the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerScope {
    /// Whole branch: /marketing/customers
    Branch,
    /// Only customers assigned to the caller: /marketing/customers/me
    Mine,
}

impl CustomerScope {
    pub fn path(&self) -> &'static str {
        match self {
            CustomerScope::Branch => "/marketing/customers",
            CustomerScope::Mine => "/marketing/customers/me",
        }
    }
}

/// Listing filters, forwarded as query parameters
#[derive(Debug, Clone, Default)]
pub struct CustomerQuery {
    pub status: Option<CustomerStatus>,
    pub page: Option<u32>,
    pub search: Option<String>,
    pub limit: Option<u32>,
}

impl CustomerQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// One row of the customer tables (pipeline / kelolaan tabs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: i64,
    pub cif: String,
    pub name: String,
    pub account_number: String,
    #[serde(default)]
    pub existing_product: Option<String>,
    pub status: CustomerStatus,
}

/// Paginated customer listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPage {
    pub customers: Vec<CustomerSummary>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

/// Full customer record from GET /marketing/customers/{cif}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetail {
    pub id: i64,
    pub cif: String,
    pub full_name: String,
    pub phone_code: String,
    pub phone_number: String,
    pub account_number: String,
    pub email: String,
    pub address: String,
    pub occupation: String,
    pub age: u32,
    pub income: i64,
    pub payroll: bool,
    pub gender: String,
    pub marital_status: bool,
    pub category_segment: String,
    #[serde(default)]
    pub existing_products: Vec<String>,
    pub transaction_activity: String,
    pub status: CustomerStatus,
    // Populated iff status == closed; validated in pipeline::customer
    #[serde(default)]
    pub closed_amount: Option<i64>,
    #[serde(default)]
    pub closed_produk_id: Option<i64>,
    #[serde(default)]
    pub closed_produk: Option<String>,
}

/// Body of POST /marketing/customer/{cif}. Amount is already numeric here;
/// lenient currency parsing happens at the gateway boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: CustomerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

/// New-prospect submission, POST /predictions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProspect {
    pub cif: String,
    pub full_name: String,
    pub phone_code: String,
    pub phone_number: String,
    pub account_number: String,
    pub email: String,
    pub address: String,
    pub occupation: String,
    pub age: u32,
    pub income: i64,
    pub payroll: bool,
    pub gender: String,
    pub marital_status: bool,
    pub category_segment: String,
    #[serde(default)]
    pub existing_products: Vec<String>,
    pub transaction_activity: String,
}

/// Catalog row from GET /produk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
}

/// One staff member's target assignment for a month/year period,
/// from GET /bm/monitoring/assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketingAssignment {
    pub marketing_nip: String,
    pub marketing_name: String,
    pub has_target: bool,
    pub total_target: i64,
    pub target_details: Vec<TargetDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDetail {
    pub product_id: i64,
    pub product_name: String,
    pub amount: i64,
}

/// Body of POST /bm/monitoring/assignment/{nip}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentUpdate {
    /// Target month, 1-12 ("bulan" on the wire)
    pub bulan: u32,
    pub target: Vec<TargetRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRow {
    pub product_id: i64,
    pub amount: i64,
}
