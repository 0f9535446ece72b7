//! Campaign billing lookups.
//!
//! Resolves the billing period, queries campaign cost through an
//! [`AdsPlatform`] and shapes the rows into billing summaries, either for a
//! single customer or for a batch of customers.

use bigdecimal::BigDecimal;
use std::sync::Arc;

use crate::ads_client::AdsPlatform;
use crate::ads_models::CampaignRow;
use crate::errors::AppError;
use crate::models::{
    BatchBillingSummary, CampaignBillingRecord, CustomerBilling, CustomerBillingResult,
    CustomerId, DateRange, RawCustomerId,
};

/// Number of micros in one currency unit.
const MICROS_SCALE: i64 = 6;

/// Converts an integer micro-currency amount into an exact decimal.
pub fn micros_to_currency(micros: i64) -> BigDecimal {
    BigDecimal::new(micros.into(), MICROS_SCALE)
}

/// GAQL query for per-campaign cost and status within `period`.
pub fn campaign_billing_query(period: &DateRange) -> String {
    format!(
        "SELECT campaign.id, campaign.name, metrics.cost_micros, campaign.status \
         FROM campaign \
         WHERE segments.date BETWEEN '{}' AND '{}'",
        period.start_date, period.end_date
    )
}

impl From<CampaignRow> for CampaignBillingRecord {
    fn from(row: CampaignRow) -> Self {
        Self {
            campaign_id: row.campaign.id,
            campaign_name: row.campaign.name,
            billing_amount: micros_to_currency(row.metrics.cost_micros),
            status: row.campaign.status,
        }
    }
}

pub struct BillingService {
    platform: Arc<dyn AdsPlatform>,
}

impl BillingService {
    pub fn new(platform: Arc<dyn AdsPlatform>) -> Self {
        Self { platform }
    }

    /// Fetches campaign billing for one customer over `period`.
    ///
    /// Campaigns keep the order the platform returned them in. Platform
    /// failures are classified into [`AppError`].
    pub async fn fetch_customer_billing(
        &self,
        customer_id: &CustomerId,
        period: &DateRange,
    ) -> Result<CustomerBilling, AppError> {
        let query = campaign_billing_query(period);
        tracing::debug!("Billing query for {}: {}", customer_id, query);

        let rows = self.platform.search(customer_id, &query).await?;

        let campaigns: Vec<CampaignBillingRecord> =
            rows.into_iter().map(CampaignBillingRecord::from).collect();
        let total_billing = campaigns
            .iter()
            .fold(BigDecimal::from(0), |acc, c| acc + &c.billing_amount);

        tracing::info!(
            "Customer {}: {} campaign(s), total {}",
            customer_id,
            campaigns.len(),
            total_billing
        );

        Ok(CustomerBilling {
            customer_id: customer_id.to_string(),
            billing_period: *period,
            campaigns,
            total_billing,
        })
    }

    /// Fetches billing for each customer in input order.
    ///
    /// A failing customer is reported as an error item; the rest of the
    /// batch still runs.
    pub async fn fetch_batch(
        &self,
        customer_ids: &[RawCustomerId],
        period: DateRange,
    ) -> BatchBillingSummary {
        tracing::info!("Processing billing batch of {} customer(s)", customer_ids.len());

        let mut results = Vec::with_capacity(customer_ids.len());
        for raw in customer_ids {
            let raw_text = raw.as_text();
            let outcome = match raw.parse() {
                Ok(customer_id) => self.fetch_customer_billing(&customer_id, &period).await,
                Err(e) => Err(e),
            };

            let item = match outcome {
                Ok(billing) => CustomerBillingResult::Success(billing),
                Err(e) => {
                    tracing::warn!("Billing failed for customer {}: {}", raw_text, e);
                    CustomerBillingResult::Error {
                        customer_id: raw_text,
                        error_detail: e.to_error_result(),
                    }
                }
            };
            results.push(item);
        }

        let success_count = results.iter().filter(|r| r.is_success()).count();
        let error_count = results.len() - success_count;

        tracing::info!(
            "Billing batch complete: {} processed, {} succeeded, {} failed",
            results.len(),
            success_count,
            error_count
        );

        BatchBillingSummary {
            billing_period: period,
            processed_count: results.len(),
            success_count,
            error_count,
            results,
        }
    }
}
