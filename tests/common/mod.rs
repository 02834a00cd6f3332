//! Test harness: an in-process mock of the core banking API plus helpers
//! for driving the gateway router directly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crc_gateway::app::{app, AppState};
use crc_gateway::config::AppConfig;

pub const MARKETING_TOKEN: &str = "tok-mkt";
pub const BM_TOKEN: &str = "tok-bm";

/// Mutable world behind the mock core API.
#[derive(Default)]
pub struct CoreState {
    /// Full customer records keyed by CIF
    pub customers: HashMap<String, Value>,
    /// Assignment queries the gateway forwarded, for asserting defaults
    pub assignment_queries: Vec<HashMap<String, String>>,
    /// Last saved assignment as (nip, body)
    pub saved_assignment: Option<(String, Value)>,
    /// Last status update as (cif, body)
    pub last_status_update: Option<(String, Value)>,
}

pub struct MockCore {
    pub base_url: String,
    pub state: Arc<Mutex<CoreState>>,
}

fn customer(cif: &str, name: &str, status: &str) -> Value {
    json!({
        "id": cif.parse::<i64>().unwrap_or(0),
        "cif": cif,
        "full_name": name,
        "phone_code": "+62",
        "phone_number": "88 9999 34555",
        "account_number": format!("78879{}", cif),
        "email": format!("{}@example.com", cif),
        "address": "Jl. Sandi Palupesy",
        "occupation": "Pegawai",
        "age": 30,
        "income": 30_000_000,
        "payroll": true,
        "gender": "male",
        "marital_status": true,
        "category_segment": "BUMN",
        "existing_products": ["mitraguna"],
        "transaction_activity": "Active",
        "status": status,
        "closed_amount": null,
        "closed_produk_id": null,
        "closed_produk": null
    })
}

fn seed() -> HashMap<String, Value> {
    let mut customers = HashMap::new();
    for (cif, name, status) in [
        ("101", "Sandy Sudrajat", "new"),
        ("102", "Budi Santoso", "contacted"),
        ("103", "Citra Lestari", "rejected"),
    ] {
        customers.insert(cif.to_string(), customer(cif, name, status));
    }
    let mut closed = customer("104", "Dewi Anggraini", "closed");
    closed["closed_amount"] = json!(250_000_000);
    closed["closed_produk_id"] = json!(2);
    closed["closed_produk"] = json!("Griya");
    customers.insert("104".to_string(), closed);

    // A corrupted record: closed upstream but stripped of its details
    customers.insert(
        "666".to_string(),
        customer("666", "Record Rusak", "closed"),
    );
    customers
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

fn fail(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn profile_for(token: &str) -> Option<Value> {
    match token {
        MARKETING_TOKEN => Some(json!({
            "type": "marketing",
            "branch_name": "KC Fatmawati",
            "name": "Ucup Sandy",
            "nip": "100",
            "total_target": 500_000_000i64,
            "achieved": 125_000_000i64,
            "percentage": 25.0,
            "products": null,
            "target_month": 8,
            "target_year": 2025,
            "target_setted": true
        })),
        BM_TOKEN => Some(json!({
            "type": "bm",
            "branch_name": "KC Fatmawati",
            "name": "Sumarji",
            "nip": "200",
            "total_target": 10_000_000_000i64,
            "achieved": 2_500_000_000i64,
            "percentage": 25.0,
            "products": null,
            "target_month": 8,
            "target_year": 2025,
            "target_setted": true
        })),
        _ => None,
    }
}

type Shared = Arc<Mutex<CoreState>>;

async fn core_login(Json(body): Json<Value>) -> Response {
    let nip = body["nip"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let token = match (nip, password) {
        ("100", "secret") => MARKETING_TOKEN,
        ("200", "secret") => BM_TOKEN,
        _ => return fail(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    };
    Json(json!({ "success": true, "token": token })).into_response()
}

async fn core_profile(headers: HeaderMap) -> Response {
    match bearer(&headers).and_then(profile_for) {
        Some(profile) => ok(profile).into_response(),
        None => fail(StatusCode::UNAUTHORIZED, "Token expired"),
    }
}

async fn core_customers(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if bearer(&headers).and_then(profile_for).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    }
    let state = state.lock().unwrap();
    let mut customers: Vec<Value> = state
        .customers
        .values()
        .filter(|c| match query.get("status") {
            Some(status) => c["status"] == json!(status),
            None => true,
        })
        .map(|c| {
            json!({
                "id": c["id"],
                "cif": c["cif"],
                "name": c["full_name"],
                "account_number": c["account_number"],
                "existing_product": c["existing_products"][0],
                "status": c["status"],
            })
        })
        .collect();
    customers.sort_by_key(|c| c["cif"].as_str().unwrap_or_default().to_string());
    let total = customers.len();
    ok(json!({
        "customers": customers,
        "page": 1,
        "limit": 10,
        "total": total
    }))
    .into_response()
}

async fn core_customer_detail(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(cif): Path<String>,
) -> Response {
    if bearer(&headers).and_then(profile_for).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    }
    let state = state.lock().unwrap();
    match state.customers.get(&cif) {
        Some(detail) => ok(detail.clone()).into_response(),
        None => fail(StatusCode::NOT_FOUND, "Customer not found"),
    }
}

async fn core_update_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(cif): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).and_then(profile_for).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    }
    let mut state = state.lock().unwrap();
    let Some(customer) = state.customers.get_mut(&cif) else {
        return fail(StatusCode::NOT_FOUND, "Customer not found");
    };
    customer["status"] = body["status"].clone();
    if body["status"] == json!("closed") {
        customer["closed_amount"] = body["amount"].clone();
        customer["closed_produk_id"] = body["product_id"].clone();
        customer["closed_produk"] = json!("Griya");
    }
    state.last_status_update = Some((cif, body));
    ok(json!({ "updated": true })).into_response()
}

async fn core_predictions(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if bearer(&headers).and_then(profile_for).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    }
    if body["cif"] == json!("999") {
        return fail(StatusCode::CONFLICT, "CIF sudah terdaftar");
    }
    ok(json!({ "cif": body["cif"] })).into_response()
}

async fn core_products(headers: HeaderMap) -> Response {
    if bearer(&headers).and_then(profile_for).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    }
    ok(json!([
        { "id": 1, "name": "Mitraguna" },
        { "id": 2, "name": "Griya" },
        { "id": 3, "name": "Oto" }
    ]))
    .into_response()
}

async fn core_assignments(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if bearer(&headers).and_then(profile_for).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    }
    state.lock().unwrap().assignment_queries.push(query);
    // One assignment whose reported total disagrees with its rows
    ok(json!([
        {
            "marketing_nip": "100",
            "marketing_name": "Ucup Sandy",
            "has_target": true,
            "total_target": 1,
            "target_details": [
                { "product_id": 1, "product_name": "Mitraguna", "amount": 100_000_000i64 },
                { "product_id": 2, "product_name": "Griya", "amount": 150_000_000i64 }
            ]
        },
        {
            "marketing_nip": "110",
            "marketing_name": "Budi",
            "has_target": true,
            "total_target": 0,
            "target_details": []
        }
    ]))
    .into_response()
}

async fn core_save_assignment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(nip): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).and_then(profile_for).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    }
    state.lock().unwrap().saved_assignment = Some((nip, body));
    ok(json!({ "saved": true })).into_response()
}

async fn core_target(headers: HeaderMap) -> Response {
    if bearer(&headers).and_then(profile_for).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    }
    ok(json!({ "total_target": 10_000_000_000i64, "achieved": 2_500_000_000i64 })).into_response()
}

async fn core_performance(headers: HeaderMap) -> Response {
    if bearer(&headers).and_then(profile_for).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    }
    ok(json!([{ "product": "Mitraguna", "achieved": 2_500_000_000i64 }])).into_response()
}

impl MockCore {
    pub async fn start() -> Result<Self> {
        let state: Shared = Arc::new(Mutex::new(CoreState {
            customers: seed(),
            ..CoreState::default()
        }));

        let router = Router::new()
            .route("/", get(|| async { "core" }))
            .route("/auth/login", post(core_login))
            .route("/profile/summary", get(core_profile))
            .route("/marketing/customers", get(core_customers))
            .route("/marketing/customers/me", get(core_customers))
            .route("/marketing/customers/:cif", get(core_customer_detail))
            .route("/marketing/customer/:cif", post(core_update_status))
            .route("/predictions", post(core_predictions))
            .route("/produk", get(core_products))
            .route("/bm/monitoring/assignment", get(core_assignments))
            .route("/bm/monitoring/assignment/:nip", post(core_save_assignment))
            .route("/bm/monitoring/target", get(core_target))
            .route("/bm/monitoring/product-performance", get(core_performance))
            .with_state(state.clone());

        let port = portpicker::pick_unused_port().context("no free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("bind mock core")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { base_url, state })
    }
}

/// Gateway router wired against the mock core.
pub async fn gateway() -> Result<(Router, MockCore)> {
    let core = MockCore::start().await?;
    let mut config = AppConfig::development();
    config.upstream.base_url = core.base_url.clone();
    let state = AppState::from_config(config).context("gateway state")?;
    Ok((app(state), core))
}

pub async fn send(
    router: &Router,
    method: &str,
    path: &str,
    cookies: Option<&str>,
    body: Option<Value>,
) -> Result<Response> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookies) = cookies {
        builder = builder.header(header::COOKIE, cookies);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };
    Ok(router.clone().oneshot(request).await?)
}

pub async fn body_json(response: Response) -> Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    serde_json::from_slice(&bytes).context("response body is not JSON")
}

/// Collect Set-Cookie headers into a Cookie header value for follow-up
/// requests, the way a browser would.
pub fn cookies_from(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// True when the response expires both session cookies.
pub fn clears_session(response: &Response) -> bool {
    let removals: Vec<&str> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.contains("Max-Age=0"))
        .collect();
    removals.iter().any(|v| v.starts_with("token="))
        && removals.iter().any(|v| v.starts_with("user="))
}

/// Log in through the gateway and hand back the session cookie header.
pub async fn login(router: &Router, nip: &str, password: &str) -> Result<String> {
    let response = send(
        router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "nip": nip, "password": password })),
    )
    .await?;
    anyhow::ensure!(
        response.status() == StatusCode::OK,
        "login failed: {}",
        response.status()
    );
    Ok(cookies_from(&response))
}
