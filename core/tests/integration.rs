//! Session and order-preview flow against the live mock EMS.
//!
//! # Design
//! Starts the mock server on a random port, points an `EmsClient` at it
//! through a base-URL override, and executes every built request over real
//! HTTP with ureq. Validates that request building and response parsing work
//! end-to-end with the actual server.

use ems_core::models::{
    AuthenticateRequest, OrderAction, OrderExpiration, OrderPreview, PreviewOrderRequest, PriceType,
    AUTHENTICATE_ACTION, PREVIEW_ORDER_ACTION,
};
use ems_core::{EmsClient, EmsConfig, EmsResult, EmsStatus, Environment, FailureKind, HttpMethod, HttpRequest, HttpResponse};
use serde_json::Value;

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the converter
/// handle status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match req.method {
        HttpMethod::Post => {
            let mut builder = agent.post(&req.url);
            for (name, value) in &req.headers {
                // ureq derives Host from the URL.
                if !name.eq_ignore_ascii_case("host") {
                    builder = builder.header(name, value);
                }
            }
            builder.send(req.body.unwrap_or_default().as_bytes())
        }
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

fn start_mock_ems() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_ems::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client_for(addr: std::net::SocketAddr) -> EmsClient {
    let config = EmsConfig {
        environment: Environment::Local,
        base_url: Some(format!("http://{addr}/api/v1")),
        host: None,
    };
    EmsClient::from_config(&config).unwrap()
}

fn preview_input(token: &str, quantity: f64) -> PreviewOrderRequest {
    PreviewOrderRequest {
        token: token.to_string(),
        account_number: "A1".to_string(),
        order_symbol: "AAPL".to_string(),
        order_action: OrderAction::Buy,
        order_quantity: quantity,
        order_price_type: PriceType::Limit,
        order_expiration: OrderExpiration::Day,
        order_limit_price: Some(150.5),
        order_stop_price: None,
    }
}

#[test]
fn session_and_preview_flow() {
    let client = client_for(start_mock_ems());

    // Step 1: bad credentials are an EMS error, not a transport error.
    let bad = AuthenticateRequest {
        user_id: String::new(),
        user_token: String::new(),
        api_key: "key".to_string(),
    };
    let req = client.build_json_request(&bad, AUTHENTICATE_ACTION).unwrap();
    let result: EmsResult = client.parse_response(execute(req));
    let failure = result.failure().expect("empty credentials must fail");
    assert_eq!(failure.kind, FailureKind::Remote);
    assert_eq!(failure.code, Some(mock_ems::CODE_AUTHENTICATION));

    // Step 2: authenticate.
    let creds = AuthenticateRequest {
        user_id: "u-1".to_string(),
        user_token: "secret".to_string(),
        api_key: "key".to_string(),
    };
    let req = client.build_json_request(&creds, AUTHENTICATE_ACTION).unwrap();
    let result: EmsResult = client.parse_response(execute(req));
    let session = result.into_result().unwrap();
    assert_eq!(session.status, EmsStatus::Success);
    let token = session.token.expect("session token");

    // Step 3: preview with a typed payload.
    let req = client.build_json_request(&preview_input(&token, 10.0), PREVIEW_ORDER_ACTION).unwrap();
    let result: EmsResult<OrderPreview> = client.parse_response(execute(req));
    let preview = result.into_result().unwrap();
    assert_eq!(preview.status, EmsStatus::ReviewOrder);
    assert_eq!(preview.payload.estimated_value, 1505.0);
    assert!(!preview.payload.order_id.is_empty());

    // Step 4: zero quantity needs more information; still a success envelope.
    let req = client.build_json_request(&preview_input(&token, 0.0), PREVIEW_ORDER_ACTION).unwrap();
    let result: EmsResult = client.parse_response(execute(req));
    assert_eq!(result.status(), Some(&EmsStatus::InformationNeeded));

    // Step 5: an unknown token expires the session.
    let req = client.build_json_request(&preview_input("stale", 1.0), PREVIEW_ORDER_ACTION).unwrap();
    let result: EmsResult = client.parse_response(execute(req));
    assert_eq!(result.failure().unwrap().code, Some(mock_ems::CODE_SESSION_EXPIRED));

    // Step 6: a NaN quantity never reaches the wire.
    let err = client
        .build_json_request(&preview_input(&token, f64::NAN), PREVIEW_ORDER_ACTION)
        .unwrap_err();
    assert!(matches!(err, ems_core::EmsError::SerializationError(_)));

    // Step 7: unknown action keeps the EMS envelope and the HTTP status.
    let req = client.build_json_request(&serde_json::json!({}), "portfolio/getPositions").unwrap();
    let result: EmsResult<Value> = client.parse_response(execute(req));
    let failure = result.failure().unwrap();
    assert_eq!(failure.http_status, Some(404));
    assert_eq!(failure.code, Some(mock_ems::CODE_UNKNOWN_ACTION));
}
