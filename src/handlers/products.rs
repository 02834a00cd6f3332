use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::session::Session;
use crate::upstream::Product;

/// GET /api/products - catalog for closing and target forms
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Vec<Product>> {
    let products = state.upstream.products(&session.token).await?;
    Ok(ApiResponse::ok(products))
}
