use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::application::usecases::accounts::{LedgerError, LedgerResult};
use crate::domain::{
    entities::accounts::AccountEntity,
    repositories::accounts::AccountRepository,
    value_objects::{
        entitlements::{Decision, DecisionReason, MeterKind, UpgradeOffer, UsageCounters},
        enums::{feature_tags::FeatureTag, tool_ids::ToolId},
        iam::UserIdentity,
        plans::{Limit, PlanCatalog, PlanConfig, PlanId, Remaining},
    },
};

/// What stands between a plan and one tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolGate {
    /// Available on every plan.
    Open,
    /// The plan's feature set must contain the tag.
    Feature(FeatureTag),
    /// Any paid plan. Only reachable through the unknown-tool fallback.
    PaidPlan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolPolicy {
    /// Lowest plan the tool is pitched at; drives denial messaging.
    pub required_plan: PlanId,
    pub gate: ToolGate,
    pub meter: Option<MeterKind>,
}

/// Exhaustive policy table. Adding a tool to `ToolId` forces an arm here,
/// so nothing silently inherits the paid-plan fallback.
pub fn policy_for(tool: ToolId) -> ToolPolicy {
    match tool {
        ToolId::Resize | ToolId::Crop | ToolId::Adjust | ToolId::Text => ToolPolicy {
            required_plan: PlanId::FreeUser,
            gate: ToolGate::Open,
            meter: None,
        },
        ToolId::BackgroundRemoval => ToolPolicy {
            required_plan: PlanId::FreeUser,
            gate: ToolGate::Feature(FeatureTag::NeuralBackgroundRemoval),
            meter: None,
        },
        ToolId::AiEnhance => ToolPolicy {
            required_plan: PlanId::Creator,
            gate: ToolGate::Feature(FeatureTag::PredictiveEnhancementAi),
            meter: Some(MeterKind::Enhancements),
        },
        ToolId::QuantumUpscaling => ToolPolicy {
            required_plan: PlanId::Creator,
            gate: ToolGate::Feature(FeatureTag::AdvancedQuantumUpscaling),
            meter: None,
        },
        // Always permitted to attempt; creation itself is bounded by the
        // project limit (`can_create_project`).
        ToolId::Projects => ToolPolicy {
            required_plan: PlanId::Creator,
            gate: ToolGate::Open,
            meter: Some(MeterKind::Projects),
        },
        ToolId::Api => ToolPolicy {
            required_plan: PlanId::Professional,
            gate: ToolGate::Feature(FeatureTag::ApiAccess),
            meter: None,
        },
        ToolId::CustomAi => ToolPolicy {
            required_plan: PlanId::Professional,
            gate: ToolGate::Feature(FeatureTag::CustomAiModelTraining),
            meter: None,
        },
    }
}

/// Conservative default for tool identifiers outside the closed set:
/// require any paid plan rather than leak a capability to the free tier.
pub fn fallback_policy() -> ToolPolicy {
    ToolPolicy {
        required_plan: PlanId::Creator,
        gate: ToolGate::PaidPlan,
        meter: None,
    }
}

fn meter_state(config: &PlanConfig, counters: &UsageCounters, meter: MeterKind) -> (Limit, u32) {
    match meter {
        MeterKind::Enhancements => (
            config.monthly_enhancement_limit,
            counters.enhancements_used_this_month,
        ),
        MeterKind::Exports => (config.monthly_export_limit, counters.exports_this_month),
        MeterKind::Projects => (config.max_projects, counters.projects_used),
    }
}

pub(crate) fn evaluate_policy(
    plan: PlanId,
    tool: String,
    policy: ToolPolicy,
    counters: &UsageCounters,
) -> Decision {
    let config = PlanCatalog::config_for(plan);

    let (gate_open, denial_reason) = match policy.gate {
        ToolGate::Open => (true, DecisionReason::Allowed),
        ToolGate::Feature(tag) => (config.has_feature(tag), DecisionReason::FeatureMissing),
        ToolGate::PaidPlan => (plan.is_paid(), DecisionReason::PlanTooLow),
    };

    if !gate_open {
        return Decision {
            tool,
            allowed: false,
            reason: denial_reason,
            required_plan: policy.required_plan,
            remaining_quota: None,
            upgrade_offers: upgrade_offers(plan),
        };
    }

    if let Some(meter) = policy.meter {
        let (limit, used) = meter_state(config, counters, meter);
        let remaining = limit.remaining(used);
        // Project attempts are never blocked here; every other meter denies
        // once used reaches the limit, including the stale used > limit case.
        let allowed = meter == MeterKind::Projects || limit.permits(used);
        let upgrade_offers = if allowed { Vec::new() } else { upgrade_offers(plan) };

        return Decision {
            tool,
            allowed,
            reason: if allowed {
                DecisionReason::Allowed
            } else {
                DecisionReason::QuotaExhausted
            },
            required_plan: policy.required_plan,
            remaining_quota: Some(remaining),
            upgrade_offers,
        };
    }

    Decision {
        tool,
        allowed: true,
        reason: DecisionReason::Allowed,
        required_plan: policy.required_plan,
        remaining_quota: None,
        upgrade_offers: Vec::new(),
    }
}

/// Pure decision for one tool invocation given the plan and live counters.
pub fn check_capability(plan: PlanId, tool: ToolId, counters: &UsageCounters) -> Decision {
    evaluate_policy(plan, tool.to_string(), policy_for(tool), counters)
}

/// Boundary variant accepting raw identifiers; unknown tools resolve to the
/// paid-plan fallback policy.
pub fn check_capability_raw(plan: PlanId, tool: &str, counters: &UsageCounters) -> Decision {
    match ToolId::parse(tool) {
        Some(tool_id) => check_capability(plan, tool_id, counters),
        None => {
            debug!(tool, "entitlements: unknown tool id, applying paid-plan fallback");
            evaluate_policy(plan, tool.to_string(), fallback_policy(), counters)
        }
    }
}

pub fn remaining_projects(plan: PlanId, projects_used: u32) -> Remaining {
    PlanCatalog::config_for(plan)
        .max_projects
        .remaining(projects_used)
}

pub fn can_create_project(plan: PlanId, projects_used: u32) -> bool {
    PlanCatalog::config_for(plan)
        .max_projects
        .permits(projects_used)
}

pub fn remaining_enhancements(plan: PlanId, used: u32) -> Remaining {
    PlanCatalog::config_for(plan)
        .monthly_enhancement_limit
        .remaining(used)
}

pub fn can_use_enhancements(plan: PlanId, used: u32) -> bool {
    PlanCatalog::config_for(plan)
        .monthly_enhancement_limit
        .permits(used)
}

pub fn remaining_exports(plan: PlanId, used: u32) -> Remaining {
    PlanCatalog::config_for(plan)
        .monthly_export_limit
        .remaining(used)
}

pub fn can_export(plan: PlanId, used: u32) -> bool {
    PlanCatalog::config_for(plan)
        .monthly_export_limit
        .permits(used)
}

/// Ranked upgrade offers with the incremental benefits over `plan`.
pub fn upgrade_offers(plan: PlanId) -> Vec<UpgradeOffer> {
    let current = PlanCatalog::config_for(plan);
    PlanCatalog::upgrade_paths_from(plan)
        .into_iter()
        .map(|target| UpgradeOffer {
            plan: target.id,
            display_name: target.display_name.to_string(),
            price_minor: target.price_minor,
            billing_period: target.billing_period.to_string(),
            benefits: target
                .features
                .iter()
                .filter(|tag| !current.has_feature(**tag))
                .map(|tag| tag.benefit_label().to_string())
                .collect(),
        })
        .collect()
}

/// Resolves the caller's account so decisions run against live counters.
pub struct EntitlementUseCase<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    account_repo: Arc<A>,
}

impl<A> EntitlementUseCase<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<A>) -> Self {
        Self { account_repo }
    }

    async fn load_account(&self, identity: Option<UserIdentity>) -> LedgerResult<AccountEntity> {
        let identity = identity.ok_or(LedgerError::Unauthenticated)?;
        self.account_repo
            .find_by_token(&identity.token_identifier)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "entitlements: failed to load account");
                LedgerError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = LedgerError::AccountNotFound;
                warn!(
                    status = err.status_code().as_u16(),
                    "entitlements: identity has no stored account"
                );
                err
            })
    }

    pub async fn check_tool(
        &self,
        identity: Option<UserIdentity>,
        tool: &str,
    ) -> LedgerResult<Decision> {
        let account = self.load_account(identity).await?;
        let decision = check_capability_raw(account.plan, tool, &account.counters());
        debug!(
            account_id = %account.id,
            plan = %account.plan,
            tool,
            allowed = decision.allowed,
            "entitlements: capability checked"
        );
        Ok(decision)
    }

    pub async fn offers(&self, identity: Option<UserIdentity>) -> LedgerResult<Vec<UpgradeOffer>> {
        let account = self.load_account(identity).await?;
        Ok(upgrade_offers(account.plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_usage() -> UsageCounters {
        UsageCounters::default()
    }

    fn counters(projects: u32, enhancements: u32, exports: u32) -> UsageCounters {
        UsageCounters {
            projects_used: projects,
            enhancements_used_this_month: enhancements,
            exports_this_month: exports,
        }
    }

    #[test]
    fn basic_tools_are_open_on_every_plan() {
        for plan in PlanId::all() {
            for tool in [ToolId::Resize, ToolId::Crop, ToolId::Adjust, ToolId::Text] {
                let decision = check_capability(plan, tool, &no_usage());
                assert!(decision.allowed, "{tool} should be open on {plan}");
                assert_eq!(decision.reason, DecisionReason::Allowed);
                assert!(decision.upgrade_offers.is_empty());
            }
        }
    }

    #[test]
    fn background_removal_is_available_on_all_plans() {
        for plan in PlanId::all() {
            assert!(check_capability(plan, ToolId::BackgroundRemoval, &no_usage()).allowed);
        }
    }

    #[test]
    fn rank_gated_tools_flip_exactly_at_their_required_plan() {
        let cases = [
            (ToolId::AiEnhance, PlanId::Creator),
            (ToolId::QuantumUpscaling, PlanId::Creator),
            (ToolId::Api, PlanId::Professional),
            (ToolId::CustomAi, PlanId::Professional),
        ];
        for (tool, required) in cases {
            for plan in PlanId::all() {
                let decision = check_capability(plan, tool, &no_usage());
                assert_eq!(
                    decision.allowed,
                    plan.rank() >= required.rank(),
                    "{tool} on {plan}"
                );
                if !decision.allowed {
                    assert_eq!(decision.reason, DecisionReason::FeatureMissing);
                    assert!(!decision.upgrade_offers.is_empty());
                }
            }
        }
    }

    #[test]
    fn unknown_tools_require_any_paid_plan() {
        let denied = check_capability_raw(PlanId::FreeUser, "hologram_export", &no_usage());
        assert!(!denied.allowed);
        assert_eq!(denied.reason, DecisionReason::PlanTooLow);
        assert_eq!(denied.required_plan, PlanId::Creator);

        assert!(check_capability_raw(PlanId::Creator, "hologram_export", &no_usage()).allowed);
        assert!(check_capability_raw(PlanId::Professional, "hologram_export", &no_usage()).allowed);
    }

    #[test]
    fn metered_gate_denies_at_the_limit_and_allows_just_below() {
        // Exercised through a synthetic metered policy on the free plan,
        // where the enhancement limit is finite (1000).
        let policy = ToolPolicy {
            required_plan: PlanId::Creator,
            gate: ToolGate::Open,
            meter: Some(MeterKind::Enhancements),
        };

        let at_limit = evaluate_policy(
            PlanId::FreeUser,
            "metered".to_string(),
            policy,
            &counters(0, 1000, 0),
        );
        assert!(!at_limit.allowed);
        assert_eq!(at_limit.reason, DecisionReason::QuotaExhausted);
        assert_eq!(at_limit.remaining_quota, Some(Remaining::Exactly(0)));
        assert!(!at_limit.upgrade_offers.is_empty());

        let just_below = evaluate_policy(
            PlanId::FreeUser,
            "metered".to_string(),
            policy,
            &counters(0, 999, 0),
        );
        assert!(just_below.allowed);
        assert_eq!(just_below.remaining_quota, Some(Remaining::Exactly(1)));

        // Stale counters past the limit are an ordinary denial.
        let over_limit = evaluate_policy(
            PlanId::FreeUser,
            "metered".to_string(),
            policy,
            &counters(0, 1400, 0),
        );
        assert!(!over_limit.allowed);
        assert_eq!(over_limit.remaining_quota, Some(Remaining::Exactly(0)));
    }

    #[test]
    fn unlimited_meters_allow_any_counter_value() {
        let decision = check_capability(
            PlanId::Creator,
            ToolId::AiEnhance,
            &counters(0, u32::MAX, 0),
        );
        assert!(decision.allowed);
        assert_eq!(decision.remaining_quota, Some(Remaining::Unlimited));
    }

    #[test]
    fn ai_enhance_denial_on_free_is_feature_gated_independent_of_counters() {
        // Free plan at exactly its enhancement limit: the denial comes from
        // the missing feature, not the exhausted meter.
        let decision = check_capability(
            PlanId::FreeUser,
            ToolId::AiEnhance,
            &counters(0, 1000, 0),
        );
        assert!(!decision.allowed);
        assert_eq!(decision.reason, DecisionReason::FeatureMissing);
        assert_eq!(decision.remaining_quota, None);
    }

    #[test]
    fn project_attempts_are_allowed_but_quota_is_reported() {
        let decision = check_capability(PlanId::FreeUser, ToolId::Projects, &counters(3, 0, 0));
        assert!(decision.allowed);
        assert_eq!(decision.remaining_quota, Some(Remaining::Exactly(0)));

        assert!(!can_create_project(PlanId::FreeUser, 3));
        assert!(can_create_project(PlanId::FreeUser, 2));
        assert!(can_create_project(PlanId::Creator, 10_000));
    }

    #[test]
    fn remaining_helpers_saturate_at_zero_and_pass_through_unlimited() {
        assert_eq!(remaining_projects(PlanId::FreeUser, 0), Remaining::Exactly(3));
        assert_eq!(remaining_projects(PlanId::FreeUser, 5), Remaining::Exactly(0));
        assert_eq!(remaining_projects(PlanId::Creator, 5), Remaining::Unlimited);

        assert_eq!(
            remaining_enhancements(PlanId::FreeUser, 990),
            Remaining::Exactly(10)
        );
        assert!(!can_use_enhancements(PlanId::FreeUser, 1000));
        assert!(can_use_enhancements(PlanId::Professional, 1000));

        assert_eq!(remaining_exports(PlanId::FreeUser, 100), Remaining::Exactly(0));
        assert!(!can_export(PlanId::FreeUser, 100));
        assert!(can_export(PlanId::FreeUser, 99));
        assert!(can_export(PlanId::Creator, 100));
    }

    #[test]
    fn upgrade_offers_from_free_are_creator_then_professional() {
        let offers = upgrade_offers(PlanId::FreeUser);
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].plan, PlanId::Creator);
        assert_eq!(offers[0].price_minor, 1499);
        assert_eq!(offers[1].plan, PlanId::Professional);
        assert_eq!(offers[1].price_minor, 4999);

        // Benefits are the incremental features, not the full target set.
        assert_eq!(
            offers[0].benefits,
            vec![
                "Unlimited enhancements",
                "Advanced Quantum Upscaling",
                "Predictive Enhancement AI",
                "Priority Processing",
                "Commercial License",
            ]
        );
        assert!(offers[1].benefits.contains(&"API Access".to_string()));
        assert!(!offers[1]
            .benefits
            .contains(&"Neural Background Removal".to_string()));
    }

    #[test]
    fn upgrade_offers_from_creator_list_only_professional_gains() {
        let offers = upgrade_offers(PlanId::Creator);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].plan, PlanId::Professional);
        assert_eq!(
            offers[0].benefits,
            vec![
                "Custom AI Model Training",
                "Dedicated Processing Cores",
                "API Access",
                "White-label Solutions",
                "24/7 Neural Support",
            ]
        );
    }

    #[test]
    fn no_upgrade_offers_at_the_top_plan() {
        assert!(upgrade_offers(PlanId::Professional).is_empty());
    }

    #[test]
    fn free_plan_limits_match_the_catalog() {
        let config = PlanCatalog::config_for(PlanId::FreeUser);
        assert_eq!(config.monthly_enhancement_limit, Limit::Limited(1000));
        assert_eq!(config.monthly_export_limit, Limit::Limited(100));
        assert_eq!(config.max_projects, Limit::Limited(3));
    }
}
