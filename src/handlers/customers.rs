//! Customer listings, detail and pipeline transitions for marketing staff.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::pipeline::{
    normalize_detail, parse_amount, validate_transition, CustomerStatus, InvariantViolation,
    Tab, TransitionError,
};
use crate::session::Session;
use crate::upstream::{
    CustomerDetail, CustomerPage, CustomerQuery, CustomerScope, NewProspect, StatusUpdate,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub tab: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub search: Option<String>,
    pub limit: Option<u32>,
}

struct ListFilter {
    tab: Option<Tab>,
    status: Option<CustomerStatus>,
}

impl ListParams {
    /// Parse and cross-check the tab/status filters. A status that does
    /// not belong to the requested tab is a caller mistake, not an empty
    /// result.
    fn filter(&self) -> Result<ListFilter, ApiError> {
        let tab = self
            .tab
            .as_deref()
            .map(str::parse::<Tab>)
            .transpose()
            .map_err(ApiError::bad_request)?;
        let status = self
            .status
            .as_deref()
            .map(str::parse::<CustomerStatus>)
            .transpose()
            .map_err(ApiError::bad_request)?;

        if let (Some(tab), Some(status)) = (tab, status) {
            if !tab.contains(status) {
                return Err(ApiError::bad_request(format!(
                    "status '{}' does not belong to the {} tab",
                    status,
                    self.tab.as_deref().unwrap_or_default()
                )));
            }
        }
        Ok(ListFilter { tab, status })
    }
}

/// GET /api/marketing/customers - whole branch
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<ListParams>,
) -> ApiResult<CustomerPage> {
    list_scoped(&state, &session, params, CustomerScope::Branch).await
}

/// GET /api/marketing/customers/me - only the caller's assignments
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<ListParams>,
) -> ApiResult<CustomerPage> {
    list_scoped(&state, &session, params, CustomerScope::Mine).await
}

async fn list_scoped(
    state: &AppState,
    session: &Session,
    params: ListParams,
    scope: CustomerScope,
) -> ApiResult<CustomerPage> {
    let filter = params.filter()?;

    let query = CustomerQuery {
        status: filter.status,
        page: params.page,
        search: params.search.clone(),
        limit: params.limit,
    };
    let mut page = state.upstream.customers(&session.token, scope, &query).await?;

    // The core API filters by status only; tab membership is ours.
    // Upstream totals count both tabs, so report only what we serve.
    if let (Some(tab), None) = (filter.tab, filter.status) {
        page.customers.retain(|c| tab.contains(c.status));
        page.total = page.customers.len() as u64;
    }

    Ok(ApiResponse::ok(page))
}

/// GET /api/marketing/customers/{cif}
pub async fn detail(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(cif): Path<String>,
) -> ApiResult<CustomerDetail> {
    let detail = state.upstream.customer(&session.token, &cif).await?;
    let detail = normalize_detail(detail).map_err(invariant_error)?;
    Ok(ApiResponse::ok(detail))
}

fn invariant_error(err: InvariantViolation) -> ApiError {
    tracing::error!(error = %err, "upstream customer record is inconsistent");
    ApiError::bad_gateway("Customer record from the core API is inconsistent")
}

/// Transition request as the dashboard submits it. `amount` arrives as the
/// raw currency text the user typed ("Rp. 1.000.000").
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
    pub product_id: Option<i64>,
    pub amount: Option<String>,
}

/// POST /api/marketing/customers/{cif}/status
///
/// Fetches the current record, validates the transition locally, then
/// writes through to the core API.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(cif): Path<String>,
    Json(body): Json<StatusChangeRequest>,
) -> ApiResult<Value> {
    let requested: CustomerStatus = body.status.parse().map_err(ApiError::bad_request)?;

    let current = state.upstream.customer(&session.token, &cif).await?;
    validate_transition(
        current.status,
        requested,
        body.product_id,
        body.amount.is_some(),
    )
    .map_err(transition_error)?;

    let amount = body.amount.as_deref().map(parse_amount);
    let update = StatusUpdate {
        status: requested,
        product_id: body.product_id,
        amount,
    };
    state
        .upstream
        .update_status(&session.token, &cif, &update)
        .await?;

    tracing::info!(cif = %cif, from = %current.status, to = %requested, "customer status updated");
    Ok(ApiResponse::ok(json!({
        "cif": cif,
        "status": requested,
        "tab": Tab::of(requested),
    })))
}

fn transition_error(err: TransitionError) -> ApiError {
    match err {
        TransitionError::Terminal { .. } | TransitionError::Illegal { .. } => {
            ApiError::conflict(err.to_string())
        }
        TransitionError::MissingProduct
        | TransitionError::MissingAmount
        | TransitionError::UnexpectedClosingFields => {
            ApiError::validation_error(err.to_string(), None)
        }
    }
}

/// New-prospect form; income arrives as currency text like the amounts do.
#[derive(Debug, Deserialize)]
pub struct ProspectForm {
    #[serde(default)]
    pub cif: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone_code: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub occupation: String,
    pub age: Option<u32>,
    #[serde(default)]
    pub income: String,
    pub payroll: Option<bool>,
    #[serde(default)]
    pub gender: String,
    pub marital_status: Option<bool>,
    #[serde(default)]
    pub category_segment: String,
    #[serde(default)]
    pub existing_products: Vec<String>,
    #[serde(default)]
    pub transaction_activity: String,
}

impl ProspectForm {
    fn validate(self) -> Result<NewProspect, ApiError> {
        let mut field_errors = std::collections::HashMap::new();
        let required = [
            ("cif", &self.cif),
            ("full_name", &self.full_name),
            ("phone_number", &self.phone_number),
            ("account_number", &self.account_number),
            ("gender", &self.gender),
            ("category_segment", &self.category_segment),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                field_errors.insert(name.to_string(), format!("{} is required", name));
            }
        }
        let age = match self.age {
            Some(age) if age > 0 => age,
            _ => {
                field_errors.insert("age".to_string(), "age is required".to_string());
                0
            }
        };
        if !field_errors.is_empty() {
            return Err(ApiError::validation_error(
                "Please complete the prospect form",
                Some(field_errors),
            ));
        }

        Ok(NewProspect {
            cif: self.cif,
            full_name: self.full_name,
            phone_code: if self.phone_code.is_empty() {
                "+62".to_string()
            } else {
                self.phone_code
            },
            phone_number: self.phone_number,
            account_number: self.account_number,
            email: self.email,
            address: self.address,
            occupation: self.occupation,
            age,
            income: parse_amount(&self.income),
            payroll: self.payroll.unwrap_or(false),
            gender: self.gender,
            marital_status: self.marital_status.unwrap_or(false),
            category_segment: self.category_segment,
            existing_products: self.existing_products,
            transaction_activity: self.transaction_activity,
        })
    }
}

/// POST /api/marketing/customers - register a new prospect
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(form): Json<ProspectForm>,
) -> ApiResult<Value> {
    let prospect = form.validate()?;
    state
        .upstream
        .submit_prospect(&session.token, &prospect)
        .await?;

    tracing::info!(cif = %prospect.cif, "prospect registered");
    Ok(ApiResponse::created(json!({ "cif": prospect.cif })))
}
