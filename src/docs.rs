use axum::{http::StatusCode, response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::errors::{ErrorKind, ErrorResult, FieldError};
use crate::models::{
    BatchBillingSummary, CampaignBillingRecord, CustomerBilling, DateRange, WebhookBillingRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Google Ads Billing API", description = "Campaign billing lookups for Google Ads accounts"),
    paths(
        crate::handlers::customer_billing,
        crate::handlers::webhook_customer_billing
    ),
    components(schemas(
        DateRange,
        CampaignBillingRecord,
        CustomerBilling,
        BatchBillingSummary,
        WebhookBillingRequest,
        ErrorKind,
        ErrorResult,
        FieldError
    ))
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn serve_openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Serves the Swagger UI HTML page.
///
/// The page loads the document served by `serve_openapi_spec`.
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Google Ads Billing API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}
