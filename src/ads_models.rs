//! Google Ads REST wire types.
//! Documentation: https://developers.google.com/google-ads/api/rest/overview
//!
//! Int64 fields are encoded as JSON strings by the REST interface and fields
//! holding default values are omitted, hence the lenient decoding below.

use serde::{Deserialize, Deserializer, Serialize};

/// One row of a `googleAds:search` response for the campaign billing query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRow {
    pub campaign: Campaign,
    #[serde(default)]
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(deserialize_with = "int64")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[serde(default, deserialize_with = "int64")]
    pub cost_micros: i64,
}

/// Serving status of a campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    #[default]
    Unspecified,
    Enabled,
    Paused,
    Removed,
    #[serde(other)]
    Unknown,
}

/// Response page of `googleAds:search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<CampaignRow>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Request body of `googleAds:search`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

/// Response of `userLists:mutate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutateUserListsResponse {
    #[serde(default)]
    pub results: Vec<MutateUserListResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutateUserListResult {
    pub resource_name: String,
}

/// OAuth token endpoint success body.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// OAuth token endpoint error body (`invalid_grant`, `invalid_client`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Google API error envelope: `{"error": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<ApiErrorDetail>,
}

/// One entry of `error.details`; the `GoogleAdsFailure` entry carries the
/// per-field errors and the request id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorDetail {
    #[serde(rename = "@type", default)]
    pub type_url: Option<String>,
    #[serde(default)]
    pub errors: Vec<RawAdsError>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAdsError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub location: Option<ErrorLocation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLocation {
    #[serde(default)]
    pub field_path_elements: Vec<FieldPathElement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPathElement {
    pub field_name: String,
}

/// Vendor-reported request failure, flattened out of the error envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleAdsFailure {
    /// Canonical status name, e.g. `INVALID_ARGUMENT`.
    pub status: String,
    pub message: String,
    pub request_id: Option<String>,
    pub errors: Vec<GoogleAdsErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleAdsErrorDetail {
    pub message: String,
    /// Names of the request fields the error points at, outermost first.
    pub field_path: Vec<String>,
}

impl ApiErrorEnvelope {
    /// Extracts the `GoogleAdsFailure` detail, if the platform sent one.
    pub fn into_failure(self, header_request_id: Option<String>) -> Option<GoogleAdsFailure> {
        let ApiErrorBody {
            message,
            status,
            details,
            ..
        } = self.error;

        let detail = details
            .into_iter()
            .find(|d| !d.errors.is_empty() || is_ads_failure(d.type_url.as_deref()))?;

        let errors = detail
            .errors
            .into_iter()
            .map(|e| GoogleAdsErrorDetail {
                message: e.message,
                field_path: e
                    .location
                    .map(|loc| {
                        loc.field_path_elements
                            .into_iter()
                            .map(|el| el.field_name)
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();

        Some(GoogleAdsFailure {
            status,
            message,
            request_id: detail.request_id.or(header_request_id),
            errors,
        })
    }
}

fn is_ads_failure(type_url: Option<&str>) -> bool {
    type_url.is_some_and(|t| t.ends_with("GoogleAdsFailure"))
}

/// Accepts an int64 encoded either as a JSON string or a JSON number.
fn int64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
