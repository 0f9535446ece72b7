//! Rule-based audience (user list) construction.
//!
//! Builds flexible-rule user lists out of visited-URL conditions and submits
//! them as create operations. The request types serialize to the Google Ads
//! REST JSON shape.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::ads_client::AdsPlatform;
use crate::errors::AppError;
use crate::models::CustomerId;

/// Built-in rule parameter matching the visited page URL.
pub const URL_RULE_PARAMETER: &str = "url__";

/// How inclusive operands are joined. Exclusive operands are always OR-ed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlexibleRuleOperator {
    And,
    Or,
}

impl FromStr for FlexibleRuleOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(FlexibleRuleOperator::And),
            "OR" => Ok(FlexibleRuleOperator::Or),
            other => Err(format!("unknown rule operator '{}', expected AND or OR", other)),
        }
    }
}

impl fmt::Display for FlexibleRuleOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexibleRuleOperator::And => f.write_str("AND"),
            FlexibleRuleOperator::Or => f.write_str("OR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Inclusive,
    Exclusive,
}

/// A visited URL that adds users to (or removes them from) the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceTarget {
    pub url: String,
    pub membership: Membership,
    pub lookback_window_days: Option<i64>,
}

impl AudienceTarget {
    pub fn inclusive(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            membership: Membership::Inclusive,
            lookback_window_days: None,
        }
    }

    pub fn exclusive(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            membership: Membership::Exclusive,
            lookback_window_days: None,
        }
    }

    pub fn with_lookback(mut self, days: i64) -> Self {
        self.lookback_window_days = Some(days);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StringRuleOperator {
    Equals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringRuleItemInfo {
    pub operator: StringRuleOperator,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListRuleItemInfo {
    pub name: String,
    pub string_rule_item: StringRuleItemInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListRuleItemGroupInfo {
    pub rule_items: Vec<UserListRuleItemInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListRuleInfo {
    pub rule_item_groups: Vec<UserListRuleItemGroupInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexibleRuleOperandInfo {
    pub rule: UserListRuleInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookback_window_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexibleRuleUserListInfo {
    pub inclusive_rule_operator: FlexibleRuleOperator,
    pub inclusive_operands: Vec<FlexibleRuleOperandInfo>,
    pub exclusive_operands: Vec<FlexibleRuleOperandInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrepopulationStatus {
    Requested,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleBasedUserListInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepopulation_status: Option<PrepopulationStatus>,
    pub flexible_rule_user_list: FlexibleRuleUserListInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserList {
    pub name: String,
    pub description: String,
    pub membership_status: MembershipStatus,
    pub rule_based_user_list: RuleBasedUserListInfo,
}

/// A `userLists:mutate` operation. Only creation is supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserListOperation {
    pub create: UserList,
}

impl UserListOperation {
    /// Wraps a rule in an open user list create operation.
    pub fn create_rule_based(
        name: impl Into<String>,
        description: impl Into<String>,
        rule: RuleBasedUserListInfo,
    ) -> Self {
        Self {
            create: UserList {
                name: name.into(),
                description: description.into(),
                membership_status: MembershipStatus::Open,
                rule_based_user_list: rule,
            },
        }
    }
}

/// Rule matching users who visited exactly `url`, as a single-item group.
pub fn rule_info_from_url(url: &str) -> UserListRuleInfo {
    UserListRuleInfo {
        rule_item_groups: vec![UserListRuleItemGroupInfo {
            rule_items: vec![UserListRuleItemInfo {
                name: URL_RULE_PARAMETER.to_string(),
                string_rule_item: StringRuleItemInfo {
                    operator: StringRuleOperator::Equals,
                    value: url.to_string(),
                },
            }],
        }],
    }
}

/// Builds the flexible rule for `targets`.
///
/// Needs at least one inclusive target. URLs must parse as http(s) URLs and
/// lookback windows must be positive.
pub fn build_flexible_rule(
    targets: &[AudienceTarget],
    inclusive_operator: FlexibleRuleOperator,
    prepopulate: bool,
) -> Result<RuleBasedUserListInfo, AppError> {
    let mut inclusive_operands = Vec::new();
    let mut exclusive_operands = Vec::new();

    for target in targets {
        validate_target(target)?;
        let operand = FlexibleRuleOperandInfo {
            rule: rule_info_from_url(&target.url),
            lookback_window_days: target.lookback_window_days,
        };
        match target.membership {
            Membership::Inclusive => inclusive_operands.push(operand),
            Membership::Exclusive => exclusive_operands.push(operand),
        }
    }

    if inclusive_operands.is_empty() {
        return Err(AppError::Validation(
            "At least one inclusive URL is required".to_string(),
        ));
    }

    Ok(RuleBasedUserListInfo {
        prepopulation_status: prepopulate.then_some(PrepopulationStatus::Requested),
        flexible_rule_user_list: FlexibleRuleUserListInfo {
            inclusive_rule_operator: inclusive_operator,
            inclusive_operands,
            exclusive_operands,
        },
    })
}

fn validate_target(target: &AudienceTarget) -> Result<(), AppError> {
    let parsed = url::Url::parse(&target.url)
        .map_err(|e| AppError::Validation(format!("Invalid URL '{}': {}", target.url, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(AppError::Validation(format!(
            "URL '{}' must use http or https",
            target.url
        )));
    }
    if let Some(days) = target.lookback_window_days {
        if days <= 0 {
            return Err(AppError::Validation(format!(
                "Lookback window for '{}' must be positive, got {}",
                target.url, days
            )));
        }
    }
    Ok(())
}

/// Human-readable name and description for a list built from `targets`.
///
/// The name carries a random suffix so repeated runs never collide.
pub fn describe_targets(
    targets: &[AudienceTarget],
    inclusive_operator: FlexibleRuleOperator,
) -> (String, String) {
    let join = |membership: Membership, sep: &str| {
        targets
            .iter()
            .filter(|t| t.membership == membership)
            .map(|t| t.url.as_str())
            .collect::<Vec<_>>()
            .join(sep)
    };
    let included = join(Membership::Inclusive, &format!(" {} ", inclusive_operator));
    let excluded = join(Membership::Exclusive, " OR ");

    let mut summary = included;
    if !excluded.is_empty() {
        summary.push_str(" but NOT ");
        summary.push_str(&excluded);
    }

    (
        format!("All visitors to {} #{}", summary, Uuid::new_v4()),
        format!("Visitors of {}", summary),
    )
}

pub struct AudienceService {
    platform: Arc<dyn AdsPlatform>,
}

impl AudienceService {
    pub fn new(platform: Arc<dyn AdsPlatform>) -> Self {
        Self { platform }
    }

    /// Submits a create operation and returns the new list's resource name.
    pub async fn create_user_list(
        &self,
        customer_id: &CustomerId,
        operation: UserListOperation,
    ) -> Result<String, AppError> {
        tracing::info!(
            "Creating user list '{}' for customer {}",
            operation.create.name,
            customer_id
        );

        let resource_names = self
            .platform
            .mutate_user_lists(customer_id, vec![operation])
            .await?;

        let resource_name = resource_names.into_iter().next().ok_or_else(|| {
            AppError::Internal("User list mutate response contained no results".to_string())
        })?;

        tracing::info!("✓ Created user list {}", resource_name);
        Ok(resource_name)
    }
}
