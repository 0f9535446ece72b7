use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::ads_client::AdsPlatform;
use crate::billing::BillingService;
use crate::config::Config;
use crate::errors::{AppError, ErrorResult};
use crate::models::{
    BatchBillingSummary, CustomerBilling, CustomerId, DateRange, WebhookBillingRequest,
};

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the Ads platform.
    pub platform: Arc<dyn AdsPlatform>,
}

/// Liveness probe returning a plain-text banner.
pub async fn index() -> &'static str {
    "Google Ads Billing API"
}

/// Health check endpoint.
///
/// Returns the service status, version, and the Ads API version in use.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "ads-billing-api",
            "version": env!("CARGO_PKG_VERSION"),
            "ads_api_version": state.config.api_version,
        })),
    )
}

/// GET /customer-billing/{customer_id}
///
/// Returns last month's campaign billing for one customer.
#[utoipa::path(
    get,
    path = "/customer-billing/{customer_id}",
    params(("customer_id" = String, Path, description = "Google Ads customer id, with or without hyphens")),
    responses(
        (status = 200, description = "Billing for the previous calendar month", body = CustomerBilling),
        (status = 400, description = "Invalid customer id or platform error", body = ErrorResult),
        (status = 401, description = "Refresh credential rejected", body = ErrorResult),
        (status = 403, description = "Insufficient permissions", body = ErrorResult),
        (status = 500, description = "Unexpected failure", body = ErrorResult)
    )
)]
pub async fn customer_billing(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<Json<CustomerBilling>, AppError> {
    tracing::info!("GET /customer-billing/{}", customer_id);

    let customer_id = CustomerId::parse(&customer_id)?;
    let period = DateRange::last_month();

    let service = BillingService::new(state.platform.clone());
    let billing = service.fetch_customer_billing(&customer_id, &period).await?;

    Ok(Json(billing))
}

/// POST /webhook/customer-billing
///
/// Fetches last month's billing for every customer in the payload. Per-customer
/// failures are reported inside `results`; the endpoint itself only fails on
/// a malformed payload.
#[utoipa::path(
    post,
    path = "/webhook/customer-billing",
    request_body = WebhookBillingRequest,
    responses(
        (status = 200, description = "Per-customer billing results", body = BatchBillingSummary),
        (status = 400, description = "Missing or malformed customer_ids", body = ErrorResult)
    )
)]
pub async fn webhook_customer_billing(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BatchBillingSummary>, AppError> {
    tracing::info!("Received customer billing webhook");

    let request = parse_webhook_payload(payload)?;
    let period = DateRange::last_month();

    let service = BillingService::new(state.platform.clone());
    let summary = service.fetch_batch(&request.customer_ids, period).await;

    Ok(Json(summary))
}

fn parse_webhook_payload(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<WebhookBillingRequest, AppError> {
    let Json(body) = payload
        .map_err(|e| AppError::Validation(format!("Invalid payload: {}", e.body_text())))?;

    let Some(ids) = body.get("customer_ids") else {
        return Err(AppError::Validation(
            "customer_ids field is required".to_string(),
        ));
    };

    // Entries are validated one by one in the batch; only the container
    // shape is checked here.
    let customer_ids = serde_json::from_value(ids.clone()).map_err(|_| {
        AppError::Validation("customer_ids must be an array".to_string())
    })?;

    Ok(WebhookBillingRequest { customer_ids })
}
