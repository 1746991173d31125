use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::feature_tags::FeatureTag;

/// Subscription tiers, ordered by rank. Wire values are stable strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanId {
    FreeUser,
    Creator,
    Professional,
}

impl PlanId {
    /// Parse a wire identifier. `None` means the identifier is outside the
    /// closed enumeration and callers must surface `UnknownPlan`.
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "free_user" => Some(PlanId::FreeUser),
            "creator" => Some(PlanId::Creator),
            "professional" => Some(PlanId::Professional),
            _ => None,
        }
    }

    /// Total order of the tiers. Higher rank carries a superset of features.
    pub fn rank(&self) -> u8 {
        match self {
            PlanId::FreeUser => 0,
            PlanId::Creator => 1,
            PlanId::Professional => 2,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.rank() >= PlanId::Creator.rank()
    }

    pub fn all() -> [PlanId; 3] {
        [PlanId::FreeUser, PlanId::Creator, PlanId::Professional]
    }
}

impl Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plan = match self {
            PlanId::FreeUser => "free_user",
            PlanId::Creator => "creator",
            PlanId::Professional => "professional",
        };
        write!(f, "{}", plan)
    }
}

/// Deprecated identifiers still present on old account documents. Accepted
/// only by the legacy plan migration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LegacyPlanId {
    Free,
    Pro,
}

impl LegacyPlanId {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "free" => Some(LegacyPlanId::Free),
            "pro" => Some(LegacyPlanId::Pro),
            _ => None,
        }
    }

    pub fn maps_to(&self) -> PlanId {
        match self {
            LegacyPlanId::Free => PlanId::FreeUser,
            LegacyPlanId::Pro => PlanId::Creator,
        }
    }
}

impl Display for LegacyPlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plan = match self {
            LegacyPlanId::Free => "free",
            LegacyPlanId::Pro => "pro",
        };
        write!(f, "{}", plan)
    }
}

/// A usage bound. Serialized as the document schema stores it: a number, or
/// null for unlimited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Limit {
    Limited(u32),
    Unlimited,
}

impl Limit {
    /// Strict less-than: `used == limit` no longer permits the action.
    /// `used > limit` can occur when counters were not reset promptly and
    /// is an ordinary denial, never an error.
    pub fn permits(&self, used: u32) -> bool {
        match self {
            Limit::Limited(limit) => used < *limit,
            Limit::Unlimited => true,
        }
    }

    pub fn remaining(&self, used: u32) -> Remaining {
        match self {
            Limit::Limited(limit) => Remaining::Exactly(limit.saturating_sub(used)),
            Limit::Unlimited => Remaining::Unlimited,
        }
    }
}

impl From<Option<u32>> for Limit {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(limit) => Limit::Limited(limit),
            None => Limit::Unlimited,
        }
    }
}

impl From<Limit> for Option<u32> {
    fn from(value: Limit) -> Self {
        match value {
            Limit::Limited(limit) => Some(limit),
            Limit::Unlimited => None,
        }
    }
}

/// Quota left before a bound is hit. Null on the wire means unlimited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Remaining {
    Exactly(u32),
    Unlimited,
}

impl From<Option<u32>> for Remaining {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(remaining) => Remaining::Exactly(remaining),
            None => Remaining::Unlimited,
        }
    }
}

impl From<Remaining> for Option<u32> {
    fn from(value: Remaining) -> Self {
        match value {
            Remaining::Exactly(remaining) => Some(remaining),
            Remaining::Unlimited => None,
        }
    }
}

/// Limits, feature set and display metadata of one plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanConfig {
    pub id: PlanId,
    pub display_name: &'static str,
    pub price_minor: i32,
    pub billing_period: &'static str,
    /// Billing provider plan reference; the free plan has none.
    pub billing_plan_ref: Option<&'static str>,
    pub max_projects: Limit,
    pub monthly_enhancement_limit: Limit,
    pub monthly_export_limit: Limit,
    pub features: &'static [FeatureTag],
}

impl PlanConfig {
    pub fn has_feature(&self, tag: FeatureTag) -> bool {
        self.features.contains(&tag)
    }
}

static FREE_USER_FEATURES: &[FeatureTag] = &[
    FeatureTag::NeuralBackgroundRemoval,
    FeatureTag::BasicQuantumUpscaling,
    FeatureTag::StandardProcessingSpeed,
];

static CREATOR_FEATURES: &[FeatureTag] = &[
    FeatureTag::NeuralBackgroundRemoval,
    FeatureTag::BasicQuantumUpscaling,
    FeatureTag::StandardProcessingSpeed,
    FeatureTag::UnlimitedEnhancements,
    FeatureTag::AdvancedQuantumUpscaling,
    FeatureTag::PredictiveEnhancementAi,
    FeatureTag::PriorityProcessing,
    FeatureTag::CommercialLicense,
];

static PROFESSIONAL_FEATURES: &[FeatureTag] = &[
    FeatureTag::NeuralBackgroundRemoval,
    FeatureTag::BasicQuantumUpscaling,
    FeatureTag::StandardProcessingSpeed,
    FeatureTag::UnlimitedEnhancements,
    FeatureTag::AdvancedQuantumUpscaling,
    FeatureTag::PredictiveEnhancementAi,
    FeatureTag::PriorityProcessing,
    FeatureTag::CommercialLicense,
    FeatureTag::CustomAiModelTraining,
    FeatureTag::DedicatedProcessingCores,
    FeatureTag::ApiAccess,
    FeatureTag::WhiteLabelSolutions,
    FeatureTag::NeuralSupport24x7,
];

static PLAN_CONFIGS: [PlanConfig; 3] = [
    PlanConfig {
        id: PlanId::FreeUser,
        display_name: "Creator (Free)",
        price_minor: 0,
        billing_period: "month",
        billing_plan_ref: None,
        max_projects: Limit::Limited(3),
        monthly_enhancement_limit: Limit::Limited(1000),
        monthly_export_limit: Limit::Limited(100),
        features: FREE_USER_FEATURES,
    },
    PlanConfig {
        id: PlanId::Creator,
        display_name: "Creator",
        price_minor: 1499,
        billing_period: "month",
        billing_plan_ref: Some("cplan_31XvoSWDiVazusAgu4j6LNyODNY"),
        max_projects: Limit::Unlimited,
        monthly_enhancement_limit: Limit::Unlimited,
        monthly_export_limit: Limit::Unlimited,
        features: CREATOR_FEATURES,
    },
    PlanConfig {
        id: PlanId::Professional,
        display_name: "Professional",
        price_minor: 4999,
        billing_period: "month",
        billing_plan_ref: Some("cplan_31XwIYPtNT6iq1Aprwl3dDDsuGU"),
        max_projects: Limit::Unlimited,
        monthly_enhancement_limit: Limit::Unlimited,
        monthly_export_limit: Limit::Unlimited,
        features: PROFESSIONAL_FEATURES,
    },
];

/// The single source of truth for plan configuration. Immutable; every
/// component reads from here instead of keeping its own copy of the table.
pub struct PlanCatalog;

impl PlanCatalog {
    /// Total and deterministic over the closed enumeration. Identifier
    /// validation happens at the parse boundary (`PlanId::from_str`).
    pub fn config_for(plan: PlanId) -> &'static PlanConfig {
        &PLAN_CONFIGS[plan.rank() as usize]
    }

    /// Plans strictly above `plan` by rank, ascending. Empty at the top.
    pub fn upgrade_paths_from(plan: PlanId) -> Vec<&'static PlanConfig> {
        PLAN_CONFIGS
            .iter()
            .filter(|config| config.id.rank() > plan.rank())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_the_closed_enumeration() {
        assert_eq!(PlanId::from_str("free_user"), Some(PlanId::FreeUser));
        assert_eq!(PlanId::from_str("creator"), Some(PlanId::Creator));
        assert_eq!(PlanId::from_str("professional"), Some(PlanId::Professional));
        assert_eq!(PlanId::from_str("free"), None);
        assert_eq!(PlanId::from_str("pro"), None);
        assert_eq!(PlanId::from_str("enterprise"), None);
        assert_eq!(PlanId::from_str(""), None);
    }

    #[test]
    fn config_lookup_is_total_and_deterministic() {
        for plan in PlanId::all() {
            let config = PlanCatalog::config_for(plan);
            assert_eq!(config.id, plan);
            assert_eq!(PlanCatalog::config_for(plan).id, config.id);
        }
    }

    #[test]
    fn feature_sets_are_strict_supersets_up_the_ranks() {
        let free = PlanCatalog::config_for(PlanId::FreeUser);
        let creator = PlanCatalog::config_for(PlanId::Creator);
        let professional = PlanCatalog::config_for(PlanId::Professional);

        for tag in free.features {
            assert!(creator.has_feature(*tag), "creator missing {tag}");
        }
        for tag in creator.features {
            assert!(professional.has_feature(*tag), "professional missing {tag}");
        }
        assert!(creator.features.len() > free.features.len());
        assert!(professional.features.len() > creator.features.len());
    }

    #[test]
    fn upgrade_paths_are_ascending_and_empty_at_the_top() {
        let from_free: Vec<PlanId> = PlanCatalog::upgrade_paths_from(PlanId::FreeUser)
            .iter()
            .map(|config| config.id)
            .collect();
        assert_eq!(from_free, vec![PlanId::Creator, PlanId::Professional]);

        let from_creator: Vec<PlanId> = PlanCatalog::upgrade_paths_from(PlanId::Creator)
            .iter()
            .map(|config| config.id)
            .collect();
        assert_eq!(from_creator, vec![PlanId::Professional]);

        assert!(PlanCatalog::upgrade_paths_from(PlanId::Professional).is_empty());
    }

    #[test]
    fn limit_boundaries_are_strict() {
        let limit = Limit::Limited(1000);
        assert!(limit.permits(999));
        assert!(!limit.permits(1000));
        assert!(!limit.permits(1001));
        assert_eq!(limit.remaining(999), Remaining::Exactly(1));
        assert_eq!(limit.remaining(1000), Remaining::Exactly(0));
        assert_eq!(limit.remaining(1500), Remaining::Exactly(0));

        assert!(Limit::Unlimited.permits(u32::MAX));
        assert_eq!(Limit::Unlimited.remaining(u32::MAX), Remaining::Unlimited);
    }

    #[test]
    fn free_plan_has_no_billing_reference() {
        assert!(PlanCatalog::config_for(PlanId::FreeUser).billing_plan_ref.is_none());
        assert!(PlanCatalog::config_for(PlanId::Creator).billing_plan_ref.is_some());
        assert!(PlanCatalog::config_for(PlanId::Professional).billing_plan_ref.is_some());
    }

    #[test]
    fn legacy_identifiers_map_to_current_plans() {
        assert_eq!(LegacyPlanId::from_str("free"), Some(LegacyPlanId::Free));
        assert_eq!(LegacyPlanId::from_str("pro"), Some(LegacyPlanId::Pro));
        assert_eq!(LegacyPlanId::from_str("free_user"), None);
        assert_eq!(LegacyPlanId::Free.maps_to(), PlanId::FreeUser);
        assert_eq!(LegacyPlanId::Pro.maps_to(), PlanId::Creator);
    }
}
