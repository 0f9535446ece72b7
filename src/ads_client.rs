use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::fmt;
use std::time::Duration;

use crate::ads_models::{
    ApiErrorEnvelope, CampaignRow, GoogleAdsFailure, MutateUserListsResponse, SearchRequest,
    SearchResponse, TokenErrorResponse, TokenResponse,
};
use crate::audience::UserListOperation;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::CustomerId;

/// Failures raised by an Ads platform client.
///
/// These never leave the service as-is; `errors::classify_platform_error`
/// maps them onto the public taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The OAuth refresh credential was rejected.
    Refresh(String),
    /// The platform denied access without reporting a failure detail.
    PermissionDenied(String),
    /// The platform reported a request failure.
    Failure(GoogleAdsFailure),
    /// Network or unexpected HTTP failure.
    Transport(String),
    /// The response body could not be decoded.
    Decode(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Refresh(msg) => write!(f, "refresh failed: {}", msg),
            PlatformError::PermissionDenied(msg) => write!(f, "permission denied: {}", msg),
            PlatformError::Failure(failure) => write!(
                f,
                "request failed with status {}: {}",
                failure.status, failure.message
            ),
            PlatformError::Transport(msg) => write!(f, "transport error: {}", msg),
            PlatformError::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {}

/// The operations this service needs from the Ads platform.
#[async_trait]
pub trait AdsPlatform: Send + Sync {
    /// Runs a GAQL query and returns every row, across all result pages.
    async fn search(
        &self,
        customer_id: &CustomerId,
        query: &str,
    ) -> Result<Vec<CampaignRow>, PlatformError>;

    /// Submits user list operations and returns the created resource names.
    async fn mutate_user_lists(
        &self,
        customer_id: &CustomerId,
        operations: Vec<UserListOperation>,
    ) -> Result<Vec<String>, PlatformError>;
}

const ACCESS_TOKEN_KEY: &str = "access_token";

/// Access tokens live for an hour; refresh a little before that.
const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

/// Client for the Google Ads REST interface.
#[derive(Clone)]
pub struct GoogleAdsRestClient {
    client: reqwest::Client,
    endpoint: String,
    api_version: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    developer_token: String,
    login_customer_id: Option<String>,
    token_cache: Cache<&'static str, String>,
}

impl GoogleAdsRestClient {
    /// Creates a new `GoogleAdsRestClient` from the service configuration.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create Ads client: {}", e)))?;

        let token_cache = Cache::builder()
            .time_to_live(ACCESS_TOKEN_TTL)
            .max_capacity(1)
            .build();

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_version: config.api_version.clone(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
            developer_token: config.developer_token.clone(),
            login_customer_id: config.login_customer_id.clone(),
            token_cache,
        })
    }

    fn customer_url(&self, customer_id: &CustomerId, method: &str) -> String {
        format!(
            "{}/{}/customers/{}/{}",
            self.endpoint, self.api_version, customer_id, method
        )
    }

    /// Returns the cached access token, refreshing it on a miss.
    ///
    /// Concurrent misses share a single refresh; a failed refresh is not cached.
    async fn access_token(&self) -> Result<String, PlatformError> {
        self.token_cache
            .try_get_with(ACCESS_TOKEN_KEY, self.refresh_access_token())
            .await
            .map_err(|e| (*e).clone())
    }

    /// Exchanges the refresh token for a fresh access token.
    async fn refresh_access_token(&self) -> Result<String, PlatformError> {
        tracing::debug!("Refreshing Google Ads access token");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::Transport(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(token_failure(status, &error_text));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Decode(format!("token response: {}", e)))?;

        tracing::debug!(
            "Access token refreshed (expires in {:?}s)",
            token.expires_in
        );
        Ok(token.access_token)
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, PlatformError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let token = self.access_token().await?;

        let mut request = self
            .client
            .post(url)
            .bearer_auth(token)
            .header("developer-token", &self.developer_token)
            .json(body);
        if let Some(ref login) = self.login_customer_id {
            request = request.header("login-customer-id", login);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PlatformError::Transport(format!("Google Ads request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let request_id = response
                .headers()
                .get("request-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("Google Ads returned {} for {}", status, url);
            return Err(api_failure(status, request_id, &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AdsPlatform for GoogleAdsRestClient {
    async fn search(
        &self,
        customer_id: &CustomerId,
        query: &str,
    ) -> Result<Vec<CampaignRow>, PlatformError> {
        let url = self.customer_url(customer_id, "googleAds:search");
        tracing::info!("Searching Google Ads for customer {}", customer_id);

        let mut rows = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let body = SearchRequest {
                query,
                page_token: page_token.as_deref(),
            };
            let page: SearchResponse = self.post_json(&url, &body).await?;
            rows.extend(page.results);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!("Customer {} returned {} rows", customer_id, rows.len());
        Ok(rows)
    }

    async fn mutate_user_lists(
        &self,
        customer_id: &CustomerId,
        operations: Vec<UserListOperation>,
    ) -> Result<Vec<String>, PlatformError> {
        let url = self.customer_url(customer_id, "userLists:mutate");
        tracing::info!(
            "Submitting {} user list operation(s) for customer {}",
            operations.len(),
            customer_id
        );

        let body = json!({ "operations": operations });
        let response: MutateUserListsResponse = self.post_json(&url, &body).await?;

        Ok(response
            .results
            .into_iter()
            .map(|r| r.resource_name)
            .collect())
    }
}

/// Classifies a non-success token endpoint response.
fn token_failure(status: StatusCode, body: &str) -> PlatformError {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        // 4xx with an OAuth error code means the credential itself is bad.
        Ok(err) if status.is_client_error() => PlatformError::Refresh(match err.error_description {
            Some(desc) => format!("{}: {}", err.error, desc),
            None => err.error,
        }),
        _ => PlatformError::Transport(format!("token endpoint returned {}: {}", status, body)),
    }
}

/// Classifies a non-success Google Ads API response.
pub fn api_failure(status: StatusCode, request_id: Option<String>, body: &str) -> PlatformError {
    let envelope = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    if let Some(failure) = envelope.and_then(|e| e.into_failure(request_id)) {
        return PlatformError::Failure(failure);
    }

    match status {
        StatusCode::UNAUTHORIZED => PlatformError::Refresh(message),
        StatusCode::FORBIDDEN => PlatformError::PermissionDenied(message),
        _ => PlatformError::Transport(format!("Google Ads returned {}: {}", status, message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[tokio::test]
    async fn test_client_creation() {
        let client = GoogleAdsRestClient::new(&test_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_customer_url() {
        let client = GoogleAdsRestClient::new(&test_config()).unwrap();
        let id = CustomerId::parse("123-456-7890").unwrap();
        assert_eq!(
            client.customer_url(&id, "googleAds:search"),
            "https://googleads.googleapis.com/v18/customers/1234567890/googleAds:search"
        );
    }

    #[test]
    fn test_invalid_grant_is_refresh_error() {
        let err = token_failure(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#,
        );
        assert_eq!(
            err,
            PlatformError::Refresh("invalid_grant: Token has been expired or revoked.".to_string())
        );
    }

    #[test]
    fn test_token_server_error_is_transport() {
        let err = token_failure(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, PlatformError::Transport(_)));
    }

    #[test]
    fn test_forbidden_without_details_is_permission_denied() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        let err = api_failure(StatusCode::FORBIDDEN, None, body);
        assert_eq!(
            err,
            PlatformError::PermissionDenied("The caller does not have permission".to_string())
        );
    }

    #[test]
    fn test_forbidden_with_ads_failure_is_platform_failure() {
        let body = r#"{"error":{"code":403,"message":"denied","status":"PERMISSION_DENIED","details":[{"@type":"type.googleapis.com/google.ads.googleads.v18.errors.GoogleAdsFailure","errors":[{"message":"User doesn't have permission to access customer."}],"requestId":"r-1"}]}}"#;
        match api_failure(StatusCode::FORBIDDEN, None, body) {
            PlatformError::Failure(failure) => {
                assert_eq!(failure.status, "PERMISSION_DENIED");
                assert_eq!(failure.request_id.as_deref(), Some("r-1"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_is_refresh_error() {
        let err = api_failure(StatusCode::UNAUTHORIZED, None, "not json");
        assert_eq!(err, PlatformError::Refresh("not json".to_string()));
    }

    #[test]
    fn test_server_error_is_transport() {
        let err = api_failure(StatusCode::INTERNAL_SERVER_ERROR, Some("h".to_string()), "");
        assert!(matches!(err, PlatformError::Transport(_)));
    }
}
