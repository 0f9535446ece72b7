//! Creates a rule-based user list.
//!
//! The list is defined by a combination of rules for users who visited
//! (or did not visit) given pages of a website. With no URL arguments it
//! builds "visitors of page 1 AND page 2, but not page 3".

use clap::Parser;
use std::sync::Arc;

use ads_billing_api::ads_client::GoogleAdsRestClient;
use ads_billing_api::audience::{
    build_flexible_rule, describe_targets, AudienceService, AudienceTarget, FlexibleRuleOperator,
    UserListOperation,
};
use ads_billing_api::config::Config;
use ads_billing_api::errors::AppError;
use ads_billing_api::models::CustomerId;

const DEFAULT_INCLUSIVE_URLS: [&str; 2] =
    ["http://example.com/example1", "http://example.com/example2"];
const DEFAULT_EXCLUSIVE_URL: &str = "http://example.com/example3";
const DEFAULT_LOOKBACK_DAYS: i64 = 7;

#[derive(Debug, Parser)]
#[command(about = "Creates a rule-based user list from visited-page rules")]
struct Args {
    /// The Google Ads customer ID.
    #[arg(short, long)]
    customer_id: String,

    /// Page whose visitors are included (repeatable). Without any, the
    /// example pages 1 and 2 are included and page 3 is excluded.
    #[arg(long = "inclusive-url")]
    inclusive_urls: Vec<String>,

    /// Page whose visitors are excluded (repeatable).
    #[arg(long = "exclusive-url")]
    exclusive_urls: Vec<String>,

    /// How inclusive rules are combined: AND or OR.
    #[arg(long, default_value = "AND")]
    operator: FlexibleRuleOperator,

    /// Lookback window in days (repeatable). A single value applies to every
    /// inclusive URL; otherwise give one value per `--inclusive-url`, in order.
    #[arg(long = "lookback-days")]
    lookback_days: Vec<i64>,

    /// Do not populate the list with past matching users.
    #[arg(long)]
    no_prepopulate: bool,
}

impl Args {
    /// Resolves the inclusive and exclusive targets, applying the example
    /// defaults only when no inclusive URL was given.
    fn targets(&self) -> anyhow::Result<Vec<AudienceTarget>> {
        let (inclusive, exclusive): (Vec<String>, Vec<String>) = if self.inclusive_urls.is_empty() {
            let exclusive = if self.exclusive_urls.is_empty() {
                vec![DEFAULT_EXCLUSIVE_URL.to_string()]
            } else {
                self.exclusive_urls.clone()
            };
            (
                DEFAULT_INCLUSIVE_URLS.iter().map(|u| u.to_string()).collect(),
                exclusive,
            )
        } else {
            (self.inclusive_urls.clone(), self.exclusive_urls.clone())
        };

        let lookbacks = lookback_windows(&self.lookback_days, inclusive.len())?;

        Ok(inclusive
            .into_iter()
            .zip(lookbacks)
            .map(|(url, days)| AudienceTarget::inclusive(url).with_lookback(days))
            .chain(exclusive.into_iter().map(AudienceTarget::exclusive))
            .collect())
    }
}

/// Matches `--lookback-days` values to `count` inclusive URLs.
fn lookback_windows(values: &[i64], count: usize) -> anyhow::Result<Vec<i64>> {
    match values {
        [] => Ok(vec![DEFAULT_LOOKBACK_DAYS; count]),
        [days] => Ok(vec![*days; count]),
        _ if values.len() == count => Ok(values.to_vec()),
        _ => anyhow::bail!(
            "got {} --lookback-days values for {} inclusive URLs; give one, or one per URL",
            values.len(),
            count
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = Config::from_env()?;
    let customer_id = CustomerId::parse(&args.customer_id)?;

    let targets = args.targets()?;

    let rule = build_flexible_rule(&targets, args.operator, !args.no_prepopulate)?;
    let (name, description) = describe_targets(&targets, args.operator);
    let operation = UserListOperation::create_rule_based(name, description, rule);

    let client = GoogleAdsRestClient::new(&config)?;
    let service = AudienceService::new(Arc::new(client));

    match service.create_user_list(&customer_id, operation).await {
        Ok(resource_name) => {
            println!("Created user list with resource name: '{}'.", resource_name);
            Ok(())
        }
        Err(AppError::Platform {
            status,
            request_id,
            errors,
            ..
        }) => {
            println!(
                "Request with ID \"{}\" failed with status \"{}\" and includes the following errors:",
                request_id.as_deref().unwrap_or("unknown"),
                status
            );
            for error in errors {
                println!("\tError with message \"{}\".", error.message);
                for field in error.fields {
                    println!("\t\tOn field: {}", field);
                }
            }
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ads_billing_api::audience::Membership;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["create_rule_user_list", "-c", "1234567890"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn urls(targets: &[AudienceTarget], membership: Membership) -> Vec<&str> {
        targets
            .iter()
            .filter(|t| t.membership == membership)
            .map(|t| t.url.as_str())
            .collect()
    }

    #[test]
    fn test_defaults_build_example_rule() {
        let targets = parse(&[]).targets().unwrap();

        assert_eq!(urls(&targets, Membership::Inclusive), DEFAULT_INCLUSIVE_URLS.to_vec());
        assert_eq!(urls(&targets, Membership::Exclusive), vec![DEFAULT_EXCLUSIVE_URL]);
        assert!(targets
            .iter()
            .filter(|t| t.membership == Membership::Inclusive)
            .all(|t| t.lookback_window_days == Some(DEFAULT_LOOKBACK_DAYS)));
    }

    #[test]
    fn test_explicit_inclusive_urls_drop_default_exclusion() {
        let targets = parse(&["--inclusive-url", "https://shop.example/cart"])
            .targets()
            .unwrap();

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].membership, Membership::Inclusive);
        assert!(build_flexible_rule(&targets, FlexibleRuleOperator::And, true).is_ok());
    }

    #[test]
    fn test_lookback_per_inclusive_url() {
        let targets = parse(&[
            "--inclusive-url",
            "https://shop.example/a",
            "--inclusive-url",
            "https://shop.example/b",
            "--lookback-days",
            "3",
            "--lookback-days",
            "30",
            "--exclusive-url",
            "https://shop.example/c",
        ])
        .targets()
        .unwrap();

        let windows: Vec<Option<i64>> = targets.iter().map(|t| t.lookback_window_days).collect();
        assert_eq!(windows, vec![Some(3), Some(30), None]);
    }

    #[test]
    fn test_single_lookback_applies_to_all() {
        assert_eq!(lookback_windows(&[14], 3).unwrap(), vec![14, 14, 14]);
        assert_eq!(lookback_windows(&[], 2).unwrap(), vec![7, 7]);
    }

    #[test]
    fn test_mismatched_lookback_count_is_rejected() {
        assert!(lookback_windows(&[1, 2], 3).is_err());
    }
}
