use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::accounts::{AccountEntity, NewAccountEntity, PlanChangeRecord},
    value_objects::plans::LegacyPlanId,
};

/// Reference to an account still stored under a deprecated plan identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeprecatedPlanAccount {
    pub account_id: Uuid,
    pub legacy_plan: LegacyPlanId,
}

#[async_trait]
#[automock]
pub trait AccountRepository {
    async fn find_by_token(&self, token_identifier: &str) -> Result<Option<AccountEntity>>;
    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<AccountEntity>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountEntity>>;
    async fn insert(&self, new_account: NewAccountEntity) -> Result<Uuid>;

    /// Updates only the mutable display fields; never plan, counters or flags.
    async fn touch_profile(
        &self,
        account_id: Uuid,
        name: &str,
        last_active_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Applies the full plan configuration snapshot atomically: plan id,
    /// mirrored flags and limits, zeroed counters and a fresh billing cycle.
    /// Returns false when the account does not exist.
    async fn change_plan(&self, account_id: Uuid, change: PlanChangeRecord) -> Result<bool>;

    async fn list_deprecated_plan_accounts(&self) -> Result<Vec<DeprecatedPlanAccount>>;
}
