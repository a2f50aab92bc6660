use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const CODE_UNKNOWN_ACTION: i64 = 100;
pub const CODE_AUTHENTICATION: i64 = 300;
pub const CODE_SESSION_EXPIRED: i64 = 600;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    pub user_id: String,
    pub user_token: String,
    pub api_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOrderRequest {
    pub token: String,
    pub account_number: String,
    pub order_symbol: String,
    pub order_action: String,
    pub order_quantity: f64,
    pub order_price_type: String,
    pub order_limit_price: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub api_key: String,
}

/// Open sessions keyed by token.
pub type Sessions = Arc<RwLock<HashMap<String, Session>>>;

/// Last trade price used to estimate market orders.
const MARKET_PRICE: f64 = 100.0;

pub fn app() -> Router {
    let sessions: Sessions = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api/v1/{*action}", post(dispatch))
        .with_state(sessions)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    info!(addr = ?listener.local_addr().ok(), "mock EMS listening");
    axum::serve(listener, app()).await
}

async fn dispatch(
    State(sessions): State<Sessions>,
    Path(action): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    info!(%action, "EMS call");
    match action.as_str() {
        "user/authenticate" => match serde_json::from_value(body) {
            Ok(input) => (StatusCode::OK, Json(authenticate(&sessions, input).await)),
            Err(e) => bad_request(e),
        },
        "order/previewStockOrEtfOrder" => match serde_json::from_value(body) {
            Ok(input) => (StatusCode::OK, Json(preview_order(&sessions, input).await)),
            Err(e) => bad_request(e),
        },
        other => (
            StatusCode::NOT_FOUND,
            Json(error_envelope(CODE_UNKNOWN_ACTION, &format!("Unknown action {other}"), &[])),
        ),
    }
}

async fn authenticate(sessions: &Sessions, input: AuthenticateRequest) -> Value {
    if input.user_id.is_empty() || input.user_token.is_empty() || input.api_key.is_empty() {
        return error_envelope(
            CODE_AUTHENTICATION,
            "Could not authenticate",
            &["Check your credentials and try again."],
        );
    }
    let token = Uuid::new_v4().to_string();
    sessions.write().await.insert(
        token.clone(),
        Session {
            user_id: input.user_id,
            api_key: input.api_key,
        },
    );
    json!({
        "status": "SUCCESS",
        "token": token,
        "shortMessage": "Authenticated",
        "longMessages": [],
    })
}

async fn preview_order(sessions: &Sessions, input: PreviewOrderRequest) -> Value {
    if !sessions.read().await.contains_key(&input.token) {
        return error_envelope(CODE_SESSION_EXPIRED, "Session expired", &["Please authenticate again."]);
    }
    if input.order_quantity <= 0.0 {
        return json!({
            "status": "INFORMATION_NEEDED",
            "token": input.token,
            "shortMessage": "Quantity required",
            "longMessages": ["Order quantity must be greater than zero."],
        });
    }
    let price = match (input.order_price_type.as_str(), input.order_limit_price) {
        ("limit" | "stopLimit", Some(limit)) => limit,
        _ => MARKET_PRICE,
    };
    let mut warnings = Vec::new();
    if input.order_action == "sellShort" {
        warnings.push(format!("{} may not be available to borrow.", input.order_symbol));
    }
    json!({
        "status": "REVIEW_ORDER",
        "token": input.token,
        "shortMessage": "Review your order",
        "longMessages": [format!("{} {} {} in {}", input.order_action, input.order_quantity, input.order_symbol, input.account_number)],
        "orderId": Uuid::new_v4().to_string(),
        "estimatedValue": input.order_quantity * price,
        "warnings": warnings,
    })
}

fn error_envelope(code: i64, short_message: &str, long_messages: &[&str]) -> Value {
    json!({
        "status": "ERROR",
        "code": code,
        "shortMessage": short_message,
        "longMessages": long_messages,
    })
}

fn bad_request(e: serde_json::Error) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(error_envelope(CODE_UNKNOWN_ACTION, "Malformed request", &[&e.to_string()])),
    )
}
