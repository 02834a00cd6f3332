//! Navigation shells served behind the route guard.
//!
//! The dashboard frontend renders itself; these endpoints exist so the
//! guard has concrete routes to protect and clients get a stable page
//! descriptor to hydrate from.

use axum::extract::Path;
use axum::Json;
use serde_json::{json, Value};

use crate::config::config;

/// GET / - public service information
pub async fn home() -> Json<Value> {
    Json(json!({
        "name": "crc-gateway",
        "description": "CRC dashboard gateway for the core banking API",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": format!("{:?}", config().environment),
        "endpoints": {
            "auth": "/api/auth/*",
            "marketing": "/api/marketing/*",
            "monitoring": "/api/bm/monitoring/*",
            "products": "/api/products",
            "health": "/health"
        }
    }))
}

/// GET /login
pub async fn login_page() -> Json<Value> {
    Json(json!({ "page": "login" }))
}

/// GET /dashboard/marketing
pub async fn marketing_dashboard() -> Json<Value> {
    Json(json!({ "page": "dashboard/marketing" }))
}

/// GET /dashboard/marketing/inputnasabah
pub async fn prospect_form_page() -> Json<Value> {
    Json(json!({ "page": "dashboard/marketing/inputnasabah" }))
}

/// GET /dashboard/marketing/customer/:cif
pub async fn customer_page(Path(cif): Path<String>) -> Json<Value> {
    Json(json!({ "page": "dashboard/marketing/customer", "cif": cif }))
}

/// GET /dashboard/manager
pub async fn manager_dashboard() -> Json<Value> {
    Json(json!({ "page": "dashboard/manager" }))
}

/// GET /dashboard/manager/targetmarketing
pub async fn target_form_page() -> Json<Value> {
    Json(json!({ "page": "dashboard/manager/targetmarketing" }))
}
