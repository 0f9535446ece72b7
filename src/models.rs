use bigdecimal::BigDecimal;
use chrono::{Datelike, Days, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use utoipa::ToSchema;

use crate::ads_models::CampaignStatus;
use crate::errors::{AppError, ErrorResult};

static CUSTOMER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("customer id pattern is valid"));

/// Google Ads customer identifier: ten digits, hyphens removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Parses `1234567890` or `123-456-7890`.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let cleaned: String = raw.trim().chars().filter(|c| *c != '-').collect();
        if !CUSTOMER_ID_PATTERN.is_match(&cleaned) {
            return Err(AppError::Validation(format!(
                "Invalid customer id '{}': expected 10 digits",
                raw
            )));
        }
        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Customer id as it arrives in a webhook payload: a string or a number.
///
/// Any other JSON value is kept as `Other` so the batch can report it as a
/// per-item validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawCustomerId {
    Text(String),
    Number(u64),
    Other(serde_json::Value),
}

impl RawCustomerId {
    pub fn as_text(&self) -> String {
        match self {
            RawCustomerId::Text(s) => s.clone(),
            RawCustomerId::Number(n) => n.to_string(),
            RawCustomerId::Other(value) => value.to_string(),
        }
    }

    /// Validates the id; only strings and unsigned integers are accepted.
    pub fn parse(&self) -> Result<CustomerId, AppError> {
        match self {
            RawCustomerId::Text(s) => CustomerId::parse(s),
            RawCustomerId::Number(n) => CustomerId::parse(&n.to_string()),
            RawCustomerId::Other(value) => Err(AppError::Validation(format!(
                "Invalid customer id {}: expected a string or an unsigned integer",
                value
            ))),
        }
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    /// The full calendar month before the one containing `today`.
    pub fn previous_month(today: NaiveDate) -> Self {
        let first_of_month = today - Days::new(u64::from(today.day0()));
        let end_date = first_of_month - Days::new(1);
        let start_date = end_date - Days::new(u64::from(end_date.day0()));
        Self {
            start_date,
            end_date,
        }
    }

    /// Previous calendar month relative to the current UTC date.
    pub fn last_month() -> Self {
        Self::previous_month(Utc::now().date_naive())
    }
}

/// Billing line for a single campaign.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CampaignBillingRecord {
    pub campaign_id: i64,
    pub campaign_name: String,
    /// Cost in currency units, exact to the micro.
    #[serde(serialize_with = "serialize_amount")]
    #[schema(value_type = f64)]
    pub billing_amount: BigDecimal,
    #[schema(value_type = String, example = "ENABLED")]
    pub status: CampaignStatus,
}

/// Successful billing lookup for one customer.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CustomerBilling {
    pub customer_id: String,
    pub billing_period: DateRange,
    pub campaigns: Vec<CampaignBillingRecord>,
    #[serde(serialize_with = "serialize_amount")]
    #[schema(value_type = f64)]
    pub total_billing: BigDecimal,
}

/// Per-customer outcome inside a batch response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CustomerBillingResult {
    Success(CustomerBilling),
    Error {
        customer_id: String,
        error_detail: ErrorResult,
    },
}

impl CustomerBillingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CustomerBillingResult::Success(_))
    }
}

/// Body of `POST /webhook/customer-billing`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookBillingRequest {
    #[schema(value_type = Vec<String>, example = json!(["1234567890", "987-654-3210"]))]
    pub customer_ids: Vec<RawCustomerId>,
}

/// Response of `POST /webhook/customer-billing`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BatchBillingSummary {
    pub billing_period: DateRange,
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<CustomerBillingResult>,
    pub processed_count: usize,
    pub success_count: usize,
    pub error_count: usize,
}

/// Writes an exact decimal amount as a JSON number.
fn serialize_amount<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // Parsing the decimal text gives the closest f64 to the exact amount.
    let amount: f64 = value
        .to_string()
        .parse()
        .map_err(|e| serde::ser::Error::custom(format!("amount {}: {}", value, e)))?;
    serializer.serialize_f64(amount)
}
