//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tally_core::config::AiProvider;
use tally_core::test_utils::{MockAiServer, MockMode};
use tower::ServiceExt;

fn test_config() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        ai_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    create_router(db, None, test_config())
}

fn setup_app_with_ai(ai: AIClient) -> Router {
    let db = Database::in_memory().unwrap();
    create_router(db, Some(ai), test_config())
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_as(uri: &str, owner: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(OWNER_HEADER, owner)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn json_request_as(
    method: &str,
    uri: &str,
    owner: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header(OWNER_HEADER, owner)
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn add_expense(app: &Router, body: serde_json::Value) -> serde_json::Value {
    let response = send(app, json_request("POST", "/api/expenses", body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    get_body_json(response).await
}

async fn seed_june(app: &Router) {
    for (description, amount, category, date) in [
        ("Pizza", 100.0, "Food", "2025-06-02"),
        ("Groceries", 50.0, "Food", "2025-06-05"),
        ("Metro", 30.0, "Transport", "2025-06-09"),
        ("Rent", 400.0, "Bills", "2025-05-01"),
    ] {
        add_expense(
            app,
            serde_json::json!({
                "description": description,
                "amount": amount,
                "category": category,
                "date": date
            }),
        )
        .await;
    }
}

// ========== Auth and Health Tests ==========

#[tokio::test]
async fn test_health_without_ai() {
    let app = setup_test_app();

    let response = send(&app, get("/api/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], true);
    assert_eq!(json["ai"]["configured"], false);
}

#[tokio::test]
async fn test_health_reports_ai_backend() {
    let app = setup_app_with_ai(AIClient::mock());

    let json = get_body_json(send(&app, get("/api/health")).await).await;
    assert_eq!(json["ai"]["configured"], true);
    assert_eq!(json["ai"]["healthy"], true);
    assert_eq!(json["ai"]["model"], "mock");
}

#[tokio::test]
async fn test_auth_required_by_default() {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        api_keys: vec!["secret-key".to_string()],
        ..Default::default()
    };
    let app = create_router(db, None, config);

    let response = send(&app, get("/api/expenses")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .uri("/api/expenses")
        .header("authorization", "Bearer wrong-key")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, wrong).await.status(), StatusCode::UNAUTHORIZED);

    let right = Request::builder()
        .uri("/api/expenses")
        .header("authorization", "Bearer secret-key")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, right).await.status(), StatusCode::OK);

    // Health stays public
    assert_eq!(send(&app, get("/api/health")).await.status(), StatusCode::OK);
}

#[test]
fn test_parse_api_keys() {
    assert_eq!(parse_api_keys(" a, b ,,c "), vec!["a", "b", "c"]);
    assert!(parse_api_keys("").is_empty());
}

#[test]
fn test_validate_api_key() {
    let keys = vec!["abc".to_string(), "longer-key".to_string()];
    assert!(validate_api_key("abc", &keys));
    assert!(validate_api_key("longer-key", &keys));
    assert!(!validate_api_key("abd", &keys));
    assert!(!validate_api_key("ab", &keys));
}

// ========== Expense API Tests ==========

#[tokio::test]
async fn test_create_expense_is_categorized() {
    let app = setup_test_app();

    let json = add_expense(
        &app,
        serde_json::json!({
            "description": "Uber to airport",
            "amount": 540.0,
            "payment_method": "UPI",
            "date": "2025-06-03"
        }),
    )
    .await;

    assert_eq!(json["category"], "Transport");
    assert_eq!(json["payment_method"], "UPI");
    assert_eq!(json["ai_categorized"], false);
    assert_eq!(json["ai_notes"], "Matched keyword \"uber\"");
    assert_eq!(json["owner"], DEFAULT_OWNER);
}

#[tokio::test]
async fn test_create_expense_with_ai() {
    let app = setup_app_with_ai(AIClient::mock());

    let json = add_expense(
        &app,
        serde_json::json!({
            "description": "Netflix",
            "amount": 649.0,
            "date": "2025-06-03"
        }),
    )
    .await;

    assert_eq!(json["category"], "Entertainment");
    assert_eq!(json["ai_categorized"], true);
}

#[tokio::test]
async fn test_explicit_category_is_kept() {
    let app = setup_test_app();

    let json = add_expense(
        &app,
        serde_json::json!({
            "description": "Uber gift card",
            "amount": 500.0,
            "category": "Shopping",
            "ai_categorized": true,
            "date": "2025-06-03"
        }),
    )
    .await;

    assert_eq!(json["category"], "Shopping");
    assert_eq!(json["ai_categorized"], false);
}

#[tokio::test]
async fn test_create_expense_validation() {
    let app = setup_test_app();

    for body in [
        serde_json::json!({ "description": "x", "amount": 0.0, "date": "2025-06-03" }),
        serde_json::json!({ "description": "x", "amount": -5.0, "date": "2025-06-03" }),
        serde_json::json!({ "description": "  ", "amount": 5.0, "date": "2025-06-03" }),
        serde_json::json!({ "description": "x", "amount": 5.0, "date": "not-a-date" }),
        serde_json::json!({ "description": "x", "amount": 5.0 }),
    ] {
        let response = send(&app, json_request("POST", "/api/expenses", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = get_body_json(response).await;
        assert!(json["error"].is_string());
    }
}

#[tokio::test]
async fn test_expenses_are_owner_scoped() {
    let app = setup_test_app();

    let response = send(
        &app,
        json_request_as(
            "POST",
            "/api/expenses",
            "alice",
            serde_json::json!({ "description": "Coffee", "amount": 4.5, "date": "2025-06-01" }),
        ),
    )
    .await;
    let id = get_body_json(response).await["id"].as_i64().unwrap();

    let response = send(&app, get_as(&format!("/api/expenses/{}", id), "alice")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, get_as(&format!("/api/expenses/{}", id), "bob")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = get_body_json(send(&app, get_as("/api/expenses", "bob")).await).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_expenses_with_range() {
    let app = setup_test_app();
    seed_june(&app).await;

    let json = get_body_json(send(&app, get("/api/expenses")).await).await;
    let all = json.as_array().unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0]["description"], "Metro");

    let json =
        get_body_json(send(&app, get("/api/expenses?from=2025-06-01&to=2025-06-09")).await).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let json = get_body_json(send(&app, get("/api/expenses?from=2025-06-01")).await).await;
    assert_eq!(json.as_array().unwrap().len(), 3);

    let response = send(&app, get("/api/expenses?from=2025-06-09&to=2025-06-01")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_delete_expense() {
    let app = setup_test_app();
    let created = add_expense(
        &app,
        serde_json::json!({ "description": "Lunch", "amount": 12.0, "date": "2025-06-01" }),
    )
    .await;
    let uri = format!("/api/expenses/{}", created["id"]);

    let response = send(
        &app,
        json_request("PUT", &uri, serde_json::json!({ "amount": 15.5, "category": "Others" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["amount"], 15.5);
    assert_eq!(json["category"], "Others");
    assert_eq!(json["description"], "Lunch");

    let response = send(
        &app,
        json_request("PUT", &uri, serde_json::json!({ "amount": 0 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let delete = Request::builder()
        .method("DELETE")
        .uri(&uri)
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, delete).await.status(), StatusCode::OK);
    assert_eq!(send(&app, get(&uri)).await.status(), StatusCode::NOT_FOUND);
}

// ========== Budget API Tests ==========

#[tokio::test]
async fn test_duplicate_budget_is_conflict() {
    let app = setup_test_app();
    let body = serde_json::json!({ "month": 6, "year": 2025, "total_limit": 200.0 });

    let response = send(&app, json_request("POST", "/api/budgets", body.clone())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = get_body_json(response).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/budgets",
            serde_json::json!({ "month": 6, "year": 2025, "total_limit": 999.0 }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = get_body_json(send(&app, get("/api/budgets")).await).await;
    let budgets = json.as_array().unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0]["id"], first["id"]);
    assert_eq!(budgets[0]["total_limit"], 200.0);
}

#[tokio::test]
async fn test_budget_validation() {
    let app = setup_test_app();

    for body in [
        serde_json::json!({ "month": 13, "year": 2025, "total_limit": 200.0 }),
        serde_json::json!({ "month": 6, "year": 2025, "total_limit": 0.0 }),
        serde_json::json!({
            "month": 6, "year": 2025, "total_limit": 200.0,
            "category_limits": [
                { "category": "Food", "limit": 50.0 },
                { "category": "Food", "limit": 60.0 }
            ]
        }),
    ] {
        let response = send(&app, json_request("POST", "/api/budgets", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_budget_status_endpoint() {
    let app = setup_test_app();
    seed_june(&app).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/budgets",
            serde_json::json!({
                "month": 6,
                "year": 2025,
                "total_limit": 200.0,
                "category_limits": [{ "category": "Food", "limit": 100.0 }]
            }),
        ),
    )
    .await;
    let id = get_body_json(response).await["id"].as_i64().unwrap();

    let json = get_body_json(send(&app, get(&format!("/api/budgets/{}/status", id))).await).await;
    assert_eq!(json["period"], "2025-06");
    assert_eq!(json["spent"], 180.0);
    assert_eq!(json["remaining"], 20.0);
    assert_eq!(json["percent_used"], 90.0);
    assert_eq!(json["categories"][0]["category"], "Food");
    assert_eq!(json["categories"][0]["spent"], 150.0);
    assert_eq!(json["categories"][0]["over_limit"], true);
}

#[tokio::test]
async fn test_update_and_delete_budget() {
    let app = setup_test_app();

    let mut ids = vec![];
    for month in [5, 6] {
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/budgets",
                serde_json::json!({ "month": month, "year": 2025, "total_limit": 100.0 }),
            ),
        )
        .await;
        ids.push(get_body_json(response).await["id"].as_i64().unwrap());
    }

    // Moving May onto June collides
    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/budgets/{}", ids[0]),
            serde_json::json!({ "month": 6 }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/budgets/{}", ids[0]),
            serde_json::json!({ "total_limit": 300.0 }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["total_limit"], 300.0);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/budgets/{}", ids[1]))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, delete).await.status(), StatusCode::OK);

    let json = get_body_json(send(&app, get("/api/budgets")).await).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

// ========== AI API Tests ==========

#[tokio::test]
async fn test_categorize_endpoint() {
    let app = setup_test_app();

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/ai/categorize",
            serde_json::json!({ "description": "Electricity bill" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["category"], "Bills");
    assert_eq!(json["ai_categorized"], false);

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/ai/categorize",
            serde_json::json!({ "description": "" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_and_list_insights() {
    let app = setup_test_app();
    seed_june(&app).await;

    let response = send(
        &app,
        json_request("POST", "/api/ai/insights", serde_json::json!({ "as_of": "2025-06-10" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;
    assert_eq!(json["type"], "summary");
    assert_eq!(json["period"], "2025-06");
    assert_eq!(json["data"]["total"], 180.0);
    assert!(json["ai_text"]
        .as_str()
        .unwrap()
        .starts_with("This month, you spent ₹180.00 across 3 transactions."));

    let json = get_body_json(send(&app, get("/api/ai/insights")).await).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_generate_insight_with_empty_body() {
    let app = setup_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/ai/insights")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_ask_requires_question() {
    let app = setup_test_app();

    let response = send(
        &app,
        json_request("POST", "/api/ai/ask", serde_json::json!({ "question": "  " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Question is required");
}

#[tokio::test]
async fn test_ask_falls_back_to_rules() {
    let app = setup_test_app();
    seed_june(&app).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/ai/ask",
            serde_json::json!({ "question": "How much did I spend on food?", "today": "2025-06-10" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["question"], "How much did I spend on food?");
    assert_eq!(
        json["answer"],
        "You spent ₹150.00 on Food across 2 transactions. \
         Your most recent Food expense was ₹50.00 for \"Groceries\"."
    );
}

#[tokio::test]
async fn test_predict_endpoint() {
    let app = setup_test_app();
    seed_june(&app).await;
    send(
        &app,
        json_request(
            "POST",
            "/api/budgets",
            serde_json::json!({ "month": 6, "year": 2025, "total_limit": 200.0 }),
        ),
    )
    .await;

    let response = send(
        &app,
        json_request("POST", "/api/ai/predict", serde_json::json!({ "as_of": "2025-06-10" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["total_spent"], 180.0);
    assert_eq!(json["daily_average"], 18.0);
    assert_eq!(json["days_remaining"], 20);
    assert_eq!(json["predicted_total"], 540.0);
    assert_eq!(json["difference"], 340.0);
    assert_eq!(json["status"], "overbudget");

    // The prediction is kept in the insight log
    let json = get_body_json(send(&app, get("/api/ai/insights")).await).await;
    assert_eq!(json[0]["type"], "prediction");
}

#[tokio::test]
async fn test_failing_ai_server_still_answers() {
    let server = MockAiServer::start_with_mode(MockMode::Failing).await;
    let ai = AIClient::from_config(&AiConfig {
        provider: AiProvider::Ollama,
        host: Some(server.url()),
        model: None,
        api_key: None,
        timeout: Duration::from_secs(2),
    })
    .unwrap()
    .unwrap();
    let app = setup_app_with_ai(ai);

    let created = add_expense(
        &app,
        serde_json::json!({ "description": "Pharmacy run", "amount": 220.0, "date": "2025-06-02" }),
    )
    .await;
    assert_eq!(created["category"], "Health");
    assert_eq!(created["ai_categorized"], false);

    let response = send(
        &app,
        json_request("POST", "/api/ai/insights", serde_json::json!({ "as_of": "2025-06-10" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(send(&app, get("/api/health")).await).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["ai"]["healthy"], false);
}

// ========== Report and Settings API Tests ==========

#[tokio::test]
async fn test_report_summary() {
    let app = setup_test_app();
    seed_june(&app).await;

    let json = get_body_json(send(&app, get("/api/reports/summary?period=2025-06")).await).await;
    assert_eq!(json["period"], "2025-06");
    assert_eq!(json["total"], 180.0);
    assert_eq!(json["transaction_count"], 3);
    assert_eq!(json["by_category"]["Food"], 150.0);
    assert!(json["by_category"].get("Bills").is_none());

    let json = get_body_json(send(&app, get("/api/reports/summary?period=2024-01")).await).await;
    assert_eq!(json["total"], 0.0);
    assert_eq!(json["transaction_count"], 0);

    let response = send(&app, get("/api/reports/summary?period=2025-13")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_report_monthly() {
    let app = setup_test_app();
    seed_june(&app).await;

    let json = get_body_json(send(&app, get("/api/reports/monthly")).await).await;
    let months = json.as_array().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0]["period"], "2025-05");
    assert_eq!(months[0]["label"], "May 2025");
    assert_eq!(months[1]["amount"], 180.0);

    let json = get_body_json(send(&app, get("/api/reports/monthly?months=1")).await).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let response = send(&app, get("/api/reports/monthly?months=0")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_currency_setting() {
    let app = setup_test_app();

    let json = get_body_json(send(&app, get("/api/settings/currency")).await).await;
    assert_eq!(json["currency"], "INR");

    let response = send(
        &app,
        json_request("PUT", "/api/settings/currency", serde_json::json!({ "currency": "usd" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["currency"], "USD");

    let response = send(
        &app,
        json_request("PUT", "/api/settings/currency", serde_json::json!({ "currency": "dollars" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Narratives follow the stored preference
    add_expense(
        &app,
        serde_json::json!({ "description": "Book", "amount": 20.0, "date": "2025-06-01" }),
    )
    .await;
    let response = send(
        &app,
        json_request("POST", "/api/ai/insights", serde_json::json!({ "as_of": "2025-06-02" })),
    )
    .await;
    let json = get_body_json(response).await;
    assert!(json["ai_text"].as_str().unwrap().contains("$20.00"));
}
