//! Branch-manager monitoring: target assignments and performance charts.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::pipeline::parse_amount;
use crate::session::Session;
use crate::targets;
use crate::upstream::{AssignmentUpdate, MarketingAssignment, TargetRow};

/// Month/year selector shared by the monitoring endpoints. Omitted values
/// fall back to the manager's current target period from their profile.
#[derive(Debug, Deserialize)]
pub struct PeriodParams {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub search: Option<String>,
}

impl PeriodParams {
    fn resolve(&self, session: &Session) -> Result<(u32, i32), ApiError> {
        let month = self.month.unwrap_or(session.profile.target_month);
        let year = self.year.unwrap_or(session.profile.target_year);
        if !(1..=12).contains(&month) {
            return Err(ApiError::bad_request(format!(
                "month must be 1-12, got {}",
                month
            )));
        }
        Ok((month, year))
    }
}

/// GET /api/bm/monitoring/assignments
pub async fn assignments(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<PeriodParams>,
) -> ApiResult<Vec<MarketingAssignment>> {
    let (month, year) = params.resolve(&session)?;
    let search = params.search.as_deref().unwrap_or("");

    let assignments = state
        .upstream
        .assignments(&session.token, month, year, search)
        .await?;
    // Totals are recomputed from the detail rows we actually serve
    let assignments = assignments.into_iter().map(targets::normalize).collect();
    Ok(ApiResponse::ok(assignments))
}

/// Target form as the manager submits it; amounts are currency text.
#[derive(Debug, Deserialize)]
pub struct AssignmentForm {
    pub bulan: u32,
    #[serde(default)]
    pub target: Vec<TargetRowForm>,
}

#[derive(Debug, Deserialize)]
pub struct TargetRowForm {
    pub product_id: i64,
    #[serde(default)]
    pub amount: String,
}

/// POST /api/bm/monitoring/assignments/{nip}
pub async fn save_assignment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(nip): Path<String>,
    Json(form): Json<AssignmentForm>,
) -> ApiResult<Value> {
    let update = AssignmentUpdate {
        bulan: form.bulan,
        target: form
            .target
            .into_iter()
            .map(|row| TargetRow {
                product_id: row.product_id,
                amount: parse_amount(&row.amount),
            })
            .collect(),
    };

    targets::validate_update(&update).map_err(|err| {
        ApiError::validation_error(err.to_string(), Some(targets::field_errors(&err)))
    })?;

    state
        .upstream
        .save_assignment(&session.token, &nip, &update)
        .await?;

    tracing::info!(nip = %nip, month = update.bulan, "target assignment saved");
    Ok(ApiResponse::ok(json!({
        "marketing_nip": nip,
        "bulan": update.bulan,
        "total_target": update.target.iter().map(|r| r.amount).sum::<i64>(),
    })))
}

/// GET /api/bm/monitoring/target - aggregate branch chart, passed through
pub async fn target_summary(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<PeriodParams>,
) -> ApiResult<Value> {
    let (month, year) = params.resolve(&session)?;
    let summary = state
        .upstream
        .target_summary(&session.token, month, year)
        .await?;
    Ok(ApiResponse::ok(summary))
}

/// GET /api/bm/monitoring/product-performance - per-product chart series
pub async fn product_performance(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<PeriodParams>,
) -> ApiResult<Value> {
    let (month, year) = params.resolve(&session)?;
    let series = state
        .upstream
        .product_performance(&session.token, month, year)
        .await?;
    Ok(ApiResponse::ok(series))
}
