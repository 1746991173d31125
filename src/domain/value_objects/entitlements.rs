use serde::{Deserialize, Serialize};

use crate::domain::value_objects::plans::{PlanId, Remaining};

/// Which account counter a usage bound is checked against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MeterKind {
    Enhancements,
    Exports,
    Projects,
}

/// Live counters read from the account document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageCounters {
    pub projects_used: u32,
    pub enhancements_used_this_month: u32,
    pub exports_this_month: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    Allowed,
    FeatureMissing,
    PlanTooLow,
    QuotaExhausted,
}

/// Outcome of one capability query. Offers are populated only on denial.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Decision {
    pub tool: String,
    pub allowed: bool,
    pub reason: DecisionReason,
    pub required_plan: PlanId,
    pub remaining_quota: Option<Remaining>,
    pub upgrade_offers: Vec<UpgradeOffer>,
}

/// One upgrade path shown on denial. Benefits are the features gained over
/// the caller's current plan, not the target plan's full set.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpgradeOffer {
    pub plan: PlanId,
    pub display_name: String,
    pub price_minor: i32,
    pub billing_period: String,
    pub benefits: Vec<String>,
}
