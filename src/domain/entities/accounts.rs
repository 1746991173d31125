use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{
    entitlements::UsageCounters,
    enums::feature_tags::FeatureTag,
    iam::UserIdentity,
    plans::{Limit, PlanCatalog, PlanId},
};

/// Length of one billing cycle, measured from account creation or the most
/// recent plan change.
pub const BILLING_CYCLE_DAYS: i64 = 30;

/// Feature flags mirrored from the plan catalog onto the account document
/// for fast reads. Invariant: they always equal the catalog configuration
/// for the account's current plan, so the only constructor any write path
/// uses is `for_plan`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureFlags {
    pub has_commercial_license: bool,
    pub has_advanced_upscaling: bool,
    pub has_priority_processing: bool,
    pub has_api_access: bool,
    pub has_custom_training: bool,
    pub has_white_label: bool,
}

impl FeatureFlags {
    pub fn for_plan(plan: PlanId) -> Self {
        let config = PlanCatalog::config_for(plan);
        Self {
            has_commercial_license: config.has_feature(FeatureTag::CommercialLicense),
            has_advanced_upscaling: config.has_feature(FeatureTag::AdvancedQuantumUpscaling),
            has_priority_processing: config.has_feature(FeatureTag::PriorityProcessing),
            has_api_access: config.has_feature(FeatureTag::ApiAccess),
            has_custom_training: config.has_feature(FeatureTag::CustomAiModelTraining),
            has_white_label: config.has_feature(FeatureTag::WhiteLabelSolutions),
        }
    }
}

/// One user's account document: identity reference, current plan, mirrored
/// plan configuration and the per-cycle usage counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountEntity {
    pub id: Uuid,
    pub token_identifier: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub plan: PlanId,
    pub billing_plan_ref: Option<String>,
    pub projects_used: u32,
    pub enhancements_used_this_month: u32,
    pub exports_this_month: u32,
    pub monthly_enhancement_limit: Limit,
    pub monthly_export_limit: Limit,
    pub project_limit: Limit,
    #[serde(flatten)]
    pub flags: FeatureFlags,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub plan_updated_at: DateTime<Utc>,
    pub billing_cycle_start: DateTime<Utc>,
    /// Exclusive end of the current billing cycle.
    pub billing_cycle_end: DateTime<Utc>,
}

impl AccountEntity {
    pub fn counters(&self) -> UsageCounters {
        UsageCounters {
            projects_used: self.projects_used,
            enhancements_used_this_month: self.enhancements_used_this_month,
            exports_this_month: self.exports_this_month,
        }
    }
}

/// Insert shape for a brand new account. Always starts on the free plan
/// with the catalog's configuration and zeroed counters.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccountEntity {
    pub token_identifier: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub plan: PlanId,
    pub monthly_enhancement_limit: Limit,
    pub monthly_export_limit: Limit,
    pub project_limit: Limit,
    pub flags: FeatureFlags,
    pub created_at: DateTime<Utc>,
    pub billing_cycle_start: DateTime<Utc>,
    pub billing_cycle_end: DateTime<Utc>,
}

impl NewAccountEntity {
    pub fn free_plan(identity: &UserIdentity, now: DateTime<Utc>) -> Self {
        let config = PlanCatalog::config_for(PlanId::FreeUser);
        Self {
            token_identifier: identity.token_identifier.clone(),
            name: identity.name.clone(),
            email: identity.email.clone(),
            image_url: identity.picture_url.clone(),
            plan: PlanId::FreeUser,
            monthly_enhancement_limit: config.monthly_enhancement_limit,
            monthly_export_limit: config.monthly_export_limit,
            project_limit: config.max_projects,
            flags: FeatureFlags::for_plan(PlanId::FreeUser),
            created_at: now,
            billing_cycle_start: now,
            billing_cycle_end: now + Duration::days(BILLING_CYCLE_DAYS),
        }
    }
}

/// Full configuration snapshot applied atomically by a plan change: the new
/// plan, its mirrored flags and limits, zeroed counters and a fresh billing
/// cycle window.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanChangeRecord {
    pub plan: PlanId,
    pub billing_plan_ref: Option<String>,
    pub monthly_enhancement_limit: Limit,
    pub monthly_export_limit: Limit,
    pub project_limit: Limit,
    pub flags: FeatureFlags,
    pub changed_at: DateTime<Utc>,
}

impl PlanChangeRecord {
    pub fn for_plan(
        plan: PlanId,
        billing_plan_ref: Option<String>,
        changed_at: DateTime<Utc>,
    ) -> Self {
        let config = PlanCatalog::config_for(plan);
        Self {
            plan,
            billing_plan_ref: billing_plan_ref
                .or_else(|| config.billing_plan_ref.map(str::to_string)),
            monthly_enhancement_limit: config.monthly_enhancement_limit,
            monthly_export_limit: config.monthly_export_limit,
            project_limit: config.max_projects,
            flags: FeatureFlags::for_plan(plan),
            changed_at,
        }
    }

    pub fn cycle_end(&self) -> DateTime<Utc> {
        self.changed_at + Duration::days(BILLING_CYCLE_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_mirror_the_catalog_per_plan() {
        let free = FeatureFlags::for_plan(PlanId::FreeUser);
        assert_eq!(free, FeatureFlags::default());

        let creator = FeatureFlags::for_plan(PlanId::Creator);
        assert!(creator.has_commercial_license);
        assert!(creator.has_advanced_upscaling);
        assert!(creator.has_priority_processing);
        assert!(!creator.has_api_access);
        assert!(!creator.has_custom_training);
        assert!(!creator.has_white_label);

        let professional = FeatureFlags::for_plan(PlanId::Professional);
        assert!(professional.has_api_access);
        assert!(professional.has_custom_training);
        assert!(professional.has_white_label);
    }

    #[test]
    fn new_free_account_carries_free_plan_defaults() {
        let identity = UserIdentity {
            token_identifier: "ident|abc".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            picture_url: None,
        };
        let now = Utc::now();
        let new_account = NewAccountEntity::free_plan(&identity, now);

        assert_eq!(new_account.plan, PlanId::FreeUser);
        assert_eq!(new_account.monthly_enhancement_limit, Limit::Limited(1000));
        assert_eq!(new_account.monthly_export_limit, Limit::Limited(100));
        assert_eq!(new_account.project_limit, Limit::Limited(3));
        assert_eq!(new_account.flags, FeatureFlags::for_plan(PlanId::FreeUser));
        assert_eq!(
            new_account.billing_cycle_end - new_account.billing_cycle_start,
            Duration::days(BILLING_CYCLE_DAYS)
        );
    }

    #[test]
    fn plan_change_record_sources_configuration_from_the_catalog() {
        let now = Utc::now();
        let record = PlanChangeRecord::for_plan(PlanId::Creator, None, now);

        assert_eq!(record.plan, PlanId::Creator);
        assert_eq!(record.monthly_enhancement_limit, Limit::Unlimited);
        assert_eq!(record.project_limit, Limit::Unlimited);
        assert_eq!(record.flags, FeatureFlags::for_plan(PlanId::Creator));
        // Defaults to the catalog's billing reference when the webhook
        // carried none.
        assert!(record.billing_plan_ref.is_some());
        assert_eq!(record.cycle_end(), now + Duration::days(BILLING_CYCLE_DAYS));

        let explicit = PlanChangeRecord::for_plan(
            PlanId::Creator,
            Some("cplan_custom".to_string()),
            now,
        );
        assert_eq!(explicit.billing_plan_ref.as_deref(), Some("cplan_custom"));
    }
}
