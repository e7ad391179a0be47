//! HTTP tests for the Saman gateway routes.
//!
//! Each test builds the full router over a fresh in-memory database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use irbankmock_api::{AppState, BankRegistry, create_router};
use irbankmock_db::migration::{Migrator, MigratorTrait};
use irbankmock_shared::{DatabaseConfig, GatewayConfig};
use serde_json::{Value, json};
use tower::ServiceExt;

const PREFIX: &str = "/api/banks/saman";

async fn app() -> Router {
    let db = irbankmock_db::connect(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let state = AppState {
        db: Arc::new(db),
        gateway: Arc::new(GatewayConfig {
            public_hostname: "http://bank.test".to_string(),
            webapp_path: "./no-webapp-in-tests".to_string(),
        }),
    };
    create_router(state, &BankRegistry::with_default_banks())
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

async fn post_json(app: &Router, path: &str, body: &Value) -> TestResponse {
    let request = Request::post(format!("{PREFIX}{path}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn post_form(app: &Router, path: &str, body: &str) -> TestResponse {
    let request = Request::post(format!("{PREFIX}{path}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, path: &str) -> TestResponse {
    let request = Request::get(path).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn create_terminal(app: &Router, name: &str) -> i64 {
    let response = post_json(app, "/management/terminal", &json!({ "name": name })).await;
    assert_eq!(response.status, StatusCode::OK);
    response.body["id"].as_i64().unwrap()
}

async fn issue_token(app: &Router, terminal_id: i64, res_num: &str) -> String {
    let response = post_json(
        app,
        "/OnlinePG/OnlinePG",
        &json!({
            "action": "token",
            "terminalId": terminal_id.to_string(),
            "amount": 10000,
            "resNum": res_num,
            "redirectURL": "https://shop.example/done",
            "tokenExpiryInMin": 15
        }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["status"], 1);
    response.body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_request_id() {
    let app = app().await;

    let response = get(&app, "/api/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["database"], "up");
    assert!(response.headers.contains_key("x-request-id"));

    let request = Request::get("/api/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.headers["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_terminal_management() {
    let app = app().await;

    let response = post_json(&app, "/management/terminal", &json!({ "name": "Acme" })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Acme");
    assert!(response.body["username"].as_str().is_some_and(|u| !u.is_empty()));
    assert!(response.body["password"].as_str().is_some_and(|p| !p.is_empty()));

    let response = post_json(&app, "/management/terminal", &json!({ "name": "<b>Acme" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": true, "message": "name is not valid" }));

    let response = post_json(&app, "/management/terminal", &json!({ "name": " " })).await;
    assert_eq!(response.body, json!({ "error": true, "message": "name can't be empty" }));

    let response = get(&app, &format!("{PREFIX}/management/terminal")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["terminals"].as_array().unwrap().len(), 1);
    assert_eq!(
        response.body["endpoints"],
        json!({
            "paymentGateway": "http://bank.test/api/banks/saman/OnlinePG/OnlinePG",
            "paymentToken": "http://bank.test/api/banks/saman/OnlinePG/SendToken",
            "receipt": "http://bank.test/api/banks/saman/verifyTxnRandomSessionkey/api/v2/ipg/payment/receipt",
            "verifyTransaction": "http://bank.test/api/banks/saman/verifyTxnRandomSessionkey/ipg/VerifyTransaction",
            "reverseTransaction": "http://bank.test/api/banks/saman/verifyTxnRandomSessionkey/ipg/ReverseTransaction"
        })
    );
}

#[tokio::test]
async fn test_payment_flow() {
    let app = app().await;
    let terminal_id = create_terminal(&app, "Acme").await;
    let token = issue_token(&app, terminal_id, "R1").await;

    let response = get(&app, &format!("{PREFIX}/public/token?token={token}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["terminalName"], "Acme");
    assert_eq!(response.body["terminalId"], terminal_id);
    assert_eq!(response.body["website"], "mock.example.com");
    assert_eq!(response.body["amount"], 10000);

    let response = post_json(
        &app,
        "/management/token/submit",
        &json!({
            "token": token,
            "cardNumber": "6037991234567890",
            "cvv": 123,
            "expiryMonth": 12,
            "expiryYear": 1408,
            "cardPassword": "123456",
            "captcha": "abcd"
        }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let callback = &response.body["callbackData"];
    let ref_num = callback["refNum"].as_str().unwrap().to_string();
    assert_eq!(
        response.body["redirectURL"],
        format!("https://shop.example/done?Token={token}&RefNum={ref_num}")
    );
    assert_eq!(callback["MID"], terminal_id.to_string());
    assert_eq!(callback["state"], "OK");
    assert_eq!(callback["status"], "2");
    assert_eq!(callback["securePan"], "60379912****7890");

    // Token is consumed
    let response = get(&app, &format!("{PREFIX}/public/token?token={token}")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "success": false, "error": "token is no longer available" }));

    let verification = json!({ "TerminalNumber": terminal_id, "RefNum": ref_num });

    let response = post_json(&app, "/verifyTxnRandomSessionkey/ipg/ReverseTransaction", &verification).await;
    assert_eq!(response.body["ResultCode"], 2);
    assert_eq!(response.body["Success"], false);
    assert_eq!(response.body["ResultDescription"], "تراکنش هنوز تایید نشده است");

    let response = post_json(&app, "/verifyTxnRandomSessionkey/ipg/VerifyTransaction", &verification).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["ResultCode"], 0);
    assert_eq!(response.body["Success"], true);
    assert_eq!(response.body["ResultDescription"], "عملیات با موفقیت انجام شد");
    let detail = &response.body["TransactionDetail"];
    assert_eq!(detail["MaskedPan"], "60379912****7890");
    assert_eq!(detail["OriginalAmount"], 10000);
    assert_eq!(detail["RefNum"], ref_num.as_str());
    assert_eq!(detail["TerminalNumber"], terminal_id);

    let response = post_json(&app, "/verifyTxnRandomSessionkey/ipg/VerifyTransaction", &verification).await;
    assert_eq!(response.body["ResultCode"], 2);
    assert_eq!(response.body["ResultDescription"], "درخواست تکراری می باشد");

    let response = post_json(&app, "/verifyTxnRandomSessionkey/ipg/ReverseTransaction", &verification).await;
    assert_eq!(response.body["ResultCode"], 0);
    assert_eq!(response.body["Success"], true);

    let response = post_json(
        &app,
        "/verifyTxnRandomSessionkey/api/v2/ipg/payment/receipt",
        &json!({ "TerminalNumber": terminal_id, "RefNum": ref_num }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["HasError"], false);
    assert_eq!(response.body["ErrorCode"], 0);
    assert_eq!(response.body["Data"]["State"], "OK");
    assert_eq!(response.body["Data"]["Status"], 2);
    assert_eq!(response.body["Data"]["Token"], token.as_str());
    assert_eq!(response.body["Data"]["AffectiveAmount"], 10000);
}

#[tokio::test]
async fn test_token_request_errors() {
    let app = app().await;
    let terminal_id = create_terminal(&app, "Acme").await;

    let response = post_form(
        &app,
        "/OnlinePG/OnlinePG",
        "Action=token&TerminalId=1&Amount=0&ResNum=R1&RedirectURL=https%3A%2F%2Fshop.example",
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({ "status": -1, "errorCode": "5", "errorDesc": "InvalidAmount" })
    );

    let request = Request::post(format!("{PREFIX}/OnlinePG/OnlinePG"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{broken"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errorCode"], "-1");
    assert_eq!(response.body["errorDesc"], "InvalidRequest");

    let response = post_json(
        &app,
        "/OnlinePG/OnlinePG",
        &json!({
            "action": "token",
            "terminalId": "9999",
            "amount": 1000,
            "resNum": "R1",
            "redirectURL": "https://shop.example/done"
        }),
    )
    .await;
    assert_eq!(response.body["errorCode"], "12");
    assert_eq!(response.body["errorDesc"], "TerminalNotFound");

    issue_token(&app, terminal_id, "R1").await;
    let response = post_json(
        &app,
        "/OnlinePG/OnlinePG",
        &json!({
            "action": "token",
            "terminalId": terminal_id.to_string(),
            "amount": 1000,
            "resNum": "R1",
            "redirectURL": "https://shop.example/done"
        }),
    )
    .await;
    assert_eq!(response.body["errorCode"], "5");
    assert_eq!(response.body["errorDesc"], "DuplicateResNum");
}

#[tokio::test]
async fn test_token_form_value_redirects_buyer() {
    let app = app().await;

    let response = post_form(&app, "/OnlinePG/OnlinePG", "Token=abc%20def").await;
    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers[header::LOCATION],
        "/api/banks/saman/OnlinePG/SendToken?token=abc+def"
    );
}

#[tokio::test]
async fn test_cancel_and_fail() {
    let app = app().await;
    let terminal_id = create_terminal(&app, "Acme").await;

    let token = issue_token(&app, terminal_id, "R1").await;
    let response = post_json(&app, "/management/token/cancel", &json!({ "token": token })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["redirectURL"], format!("https://shop.example/done?Token={token}"));
    assert_eq!(response.body["callbackData"]["state"], "CanceledByUser");
    assert_eq!(response.body["callbackData"]["status"], "1");

    let response = post_json(&app, "/management/token/fail", &json!({ "token": token })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "success": false, "error": "transaction not found" }));

    let token = issue_token(&app, terminal_id, "R2").await;
    let response = post_form(&app, "/management/token/fail", &format!("token={token}")).await;
    assert_eq!(response.body["callbackData"]["state"], "Failed");
}

#[tokio::test]
async fn test_lookup_errors() {
    let app = app().await;
    let terminal_id = create_terminal(&app, "Acme").await;

    let response = get(&app, &format!("{PREFIX}/public/token?token=missing")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "success": false, "error": "token not found" }));

    let response = post_json(
        &app,
        "/verifyTxnRandomSessionkey/ipg/VerifyTransaction",
        &json!({ "TerminalNumber": 9999, "RefNum": "x" }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["ResultCode"], -105);
    assert_eq!(response.body["TransactionDetail"], Value::Null);
    assert_eq!(response.body["Success"], false);

    let response = post_json(
        &app,
        "/verifyTxnRandomSessionkey/ipg/VerifyTransaction",
        &json!({ "terminalNumber": terminal_id, "refNum": "unknown" }),
    )
    .await;
    assert_eq!(response.body["ResultCode"], -2);

    let receipt = "/verifyTxnRandomSessionkey/api/v2/ipg/payment/receipt";
    let response = post_json(&app, receipt, &json!({ "TerminalNumber": terminal_id })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["HasError"], true);
    assert_eq!(response.body["ErrorCode"], -1);
    assert_eq!(response.body["Data"], Value::Null);

    let response = post_json(&app, receipt, &json!({ "TerminalNumber": 9999, "Token": "t" })).await;
    assert_eq!(response.body["ErrorCode"], 12);
    assert_eq!(response.body["ErrorMessage"], "TerminalNotFound");

    let response = post_json(&app, receipt, &json!({ "TerminalNumber": 9999 })).await;
    assert_eq!(response.body["ErrorCode"], 12);

    let response = post_json(
        &app,
        receipt,
        &json!({ "TerminalNumber": 9999, "Token": "t", "RefNum": "r" }),
    )
    .await;
    assert_eq!(response.body["ErrorCode"], 12);

    let response = post_json(
        &app,
        receipt,
        &json!({ "TerminalNumber": terminal_id, "Token": "t", "RefNum": "r" }),
    )
    .await;
    assert_eq!(response.body["ErrorCode"], -1);
    assert_eq!(response.body["ErrorMessage"], "InvalidRequest");

    let response = post_json(&app, receipt, &json!({ "TerminalNumber": terminal_id, "Token": "t" })).await;
    assert_eq!(response.body["ErrorCode"], 404);
    assert_eq!(response.body["ErrorMessage"], "ResourceNotFound");
}
