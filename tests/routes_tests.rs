/// Router tests driven through `tower::ServiceExt::oneshot` against a fake
/// Ads platform, so no network or credentials are involved.
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use ads_billing_api::ads_client::{AdsPlatform, PlatformError};
use ads_billing_api::ads_models::{Campaign, CampaignRow, CampaignStatus, Metrics};
use ads_billing_api::app;
use ads_billing_api::audience::UserListOperation;
use ads_billing_api::config::Config;
use ads_billing_api::handlers::AppState;
use ads_billing_api::models::CustomerId;

/// Canned outcome per customer id; unknown customers have no campaigns.
#[derive(Default)]
struct FakePlatform {
    failures: HashMap<String, PlatformError>,
    rows: HashMap<String, Vec<CampaignRow>>,
}

#[async_trait]
impl AdsPlatform for FakePlatform {
    async fn search(
        &self,
        customer_id: &CustomerId,
        _query: &str,
    ) -> Result<Vec<CampaignRow>, PlatformError> {
        if let Some(err) = self.failures.get(customer_id.as_str()) {
            return Err(err.clone());
        }
        Ok(self
            .rows
            .get(customer_id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn mutate_user_lists(
        &self,
        _customer_id: &CustomerId,
        _operations: Vec<UserListOperation>,
    ) -> Result<Vec<String>, PlatformError> {
        Ok(Vec::new())
    }
}

fn row(id: i64, name: &str, micros: i64) -> CampaignRow {
    CampaignRow {
        campaign: Campaign {
            resource_name: None,
            id,
            name: name.to_string(),
            status: CampaignStatus::Enabled,
        },
        metrics: Metrics { cost_micros: micros },
    }
}

fn test_config() -> Config {
    Config {
        port: 8080,
        developer_token: "dev".to_string(),
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        refresh_token: "refresh".to_string(),
        login_customer_id: None,
        use_proto_plus: true,
        api_version: "v18".to_string(),
        endpoint: "https://googleads.googleapis.com".to_string(),
        token_url: "https://oauth2.googleapis.com/token".to_string(),
    }
}

fn test_app(platform: FakePlatform) -> axum::Router {
    let state = Arc::new(AppState {
        config: test_config(),
        platform: Arc::new(platform),
    });
    app::router(state, app::api_routes())
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_webhook(app: axum::Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/customer-billing")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_index_banner() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(test_app(FakePlatform::default()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Google Ads Billing API");
}

#[tokio::test]
async fn test_health_reports_api_version() {
    let (status, body) = get_json(test_app(FakePlatform::default()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ads_api_version"], "v18");
}

#[tokio::test]
async fn test_customer_billing_success_with_hyphenated_id() {
    let mut platform = FakePlatform::default();
    platform.rows.insert(
        "1234567890".to_string(),
        vec![row(11, "Brand", 1_500_000), row(12, "Search", 250_000)],
    );

    let (status, body) = get_json(test_app(platform), "/customer-billing/123-456-7890").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer_id"], "1234567890");
    assert_eq!(body["total_billing"], 1.75);
    assert_eq!(body["campaigns"][0]["campaign_id"], 11);
    assert_eq!(body["campaigns"][0]["billing_amount"], 1.5);
    assert_eq!(body["campaigns"][1]["status"], "ENABLED");
    assert!(body["billing_period"]["start_date"].is_string());
}

#[tokio::test]
async fn test_customer_billing_invalid_id() {
    let (status, body) = get_json(test_app(FakePlatform::default()), "/customer-billing/12ab").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_customer_billing_error_statuses() {
    let cases = [
        (
            PlatformError::Refresh("invalid_grant".to_string()),
            StatusCode::UNAUTHORIZED,
            "AUTH_ERROR",
        ),
        (
            PlatformError::PermissionDenied("no access".to_string()),
            StatusCode::FORBIDDEN,
            "PERMISSION_DENIED",
        ),
        (
            PlatformError::Transport("connection reset".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
        ),
    ];

    for (failure, expected_status, expected_kind) in cases {
        let mut platform = FakePlatform::default();
        platform.failures.insert("1234567890".to_string(), failure);

        let (status, body) = get_json(test_app(platform), "/customer-billing/1234567890").await;
        assert_eq!(status, expected_status);
        assert_eq!(body["error"], expected_kind);
    }
}

#[tokio::test]
async fn test_webhook_isolates_failures_and_keeps_order() {
    let mut platform = FakePlatform::default();
    platform
        .rows
        .insert("1111111111".to_string(), vec![row(1, "A", 1_000_000)]);
    platform.failures.insert(
        "2222222222".to_string(),
        PlatformError::PermissionDenied("no access".to_string()),
    );

    let (status, body) = post_webhook(
        test_app(platform),
        r#"{"customer_ids": ["1111111111", "222-222-2222", 3333333333]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed_count"], 3);
    assert_eq!(body["success_count"], 2);
    assert_eq!(body["error_count"], 1);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["status"], "success");
    assert_eq!(results[0]["customer_id"], "1111111111");
    assert_eq!(results[1]["status"], "error");
    assert_eq!(results[1]["error_detail"]["error"], "PERMISSION_DENIED");
    assert_eq!(results[2]["status"], "success");
    assert_eq!(results[2]["customer_id"], "3333333333");
    assert_eq!(results[2]["total_billing"], 0.0);
}

#[tokio::test]
async fn test_webhook_invalid_id_is_item_error() {
    let (status, body) = post_webhook(
        test_app(FakePlatform::default()),
        r#"{"customer_ids": ["not-an-id"]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error_count"], 1);
    assert_eq!(body["results"][0]["error_detail"]["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_webhook_unusable_entries_are_item_errors() {
    for bad in ["null", "-5", "12.5", "-1234567890"] {
        let mut platform = FakePlatform::default();
        platform
            .rows
            .insert("1111111111".to_string(), vec![row(1, "A", 1_000_000)]);

        let payload = format!(r#"{{"customer_ids": ["1111111111", {}, "3333333333"]}}"#, bad);
        let (status, body) = post_webhook(test_app(platform), &payload).await;

        assert_eq!(status, StatusCode::OK, "entry {}", bad);
        assert_eq!(body["processed_count"], 3);
        assert_eq!(body["success_count"], 2);
        assert_eq!(body["error_count"], 1);

        let results = body["results"].as_array().unwrap();
        assert_eq!(results[0]["customer_id"], "1111111111");
        assert_eq!(results[1]["status"], "error");
        assert_eq!(results[1]["customer_id"], bad);
        assert_eq!(results[1]["error_detail"]["error"], "VALIDATION_ERROR");
        assert_eq!(results[2]["customer_id"], "3333333333");
    }
}

#[tokio::test]
async fn test_webhook_non_array_customer_ids() {
    let (status, body) = post_webhook(
        test_app(FakePlatform::default()),
        r#"{"customer_ids": "1111111111"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_webhook_oversized_body_is_validation_error() {
    let padding = "1".repeat(app::MAX_BODY_BYTES);
    let payload = format!(r#"{{"customer_ids": [], "padding": "{}"}}"#, padding);
    let (status, body) = post_webhook(test_app(FakePlatform::default()), &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_webhook_empty_list() {
    let (status, body) =
        post_webhook(test_app(FakePlatform::default()), r#"{"customer_ids": []}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed_count"], 0);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_webhook_missing_customer_ids() {
    let (status, body) =
        post_webhook(test_app(FakePlatform::default()), r#"{"ids": ["1234567890"]}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "customer_ids field is required");
}

#[tokio::test]
async fn test_webhook_non_json_body() {
    let (status, body) = post_webhook(test_app(FakePlatform::default()), "not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let (status, body) =
        get_json(test_app(FakePlatform::default()), "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/customer-billing/{customer_id}"].is_object());
    assert!(body["paths"]["/webhook/customer-billing"].is_object());
}
