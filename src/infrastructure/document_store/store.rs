use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{
    entities::{
        accounts::{
            AccountEntity, BILLING_CYCLE_DAYS, FeatureFlags, NewAccountEntity, PlanChangeRecord,
        },
        usage_events::{NewUsageEventEntity, UsageEventEntity},
    },
    repositories::{
        accounts::{AccountRepository, DeprecatedPlanAccount},
        usage_events::UsageLedgerRepository,
    },
    value_objects::{
        entitlements::MeterKind,
        enums::usage_event_kinds::UsageEventKind,
        plans::{LegacyPlanId, Limit, PlanCatalog, PlanId},
    },
};

/// Plan column as persisted. Deprecated identifiers survive on documents
/// written before the current enumeration and are only rewritten by the
/// legacy plan migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoredPlan {
    Active(PlanId),
    Deprecated(LegacyPlanId),
}

impl StoredPlan {
    fn effective(&self) -> PlanId {
        match self {
            StoredPlan::Active(plan) => *plan,
            StoredPlan::Deprecated(legacy) => legacy.maps_to(),
        }
    }
}

#[derive(Debug, Clone)]
struct AccountDocument {
    id: Uuid,
    token_identifier: String,
    name: String,
    email: String,
    image_url: Option<String>,
    plan: StoredPlan,
    billing_plan_ref: Option<String>,
    projects_used: u32,
    enhancements_used_this_month: u32,
    exports_this_month: u32,
    monthly_enhancement_limit: Limit,
    monthly_export_limit: Limit,
    project_limit: Limit,
    flags: FeatureFlags,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
    plan_updated_at: DateTime<Utc>,
    billing_cycle_start: DateTime<Utc>,
    billing_cycle_end: DateTime<Utc>,
}

impl AccountDocument {
    fn to_entity(&self) -> AccountEntity {
        AccountEntity {
            id: self.id,
            token_identifier: self.token_identifier.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            image_url: self.image_url.clone(),
            plan: self.plan.effective(),
            billing_plan_ref: self.billing_plan_ref.clone(),
            projects_used: self.projects_used,
            enhancements_used_this_month: self.enhancements_used_this_month,
            exports_this_month: self.exports_this_month,
            monthly_enhancement_limit: self.monthly_enhancement_limit,
            monthly_export_limit: self.monthly_export_limit,
            project_limit: self.project_limit,
            flags: self.flags,
            created_at: self.created_at,
            last_active_at: self.last_active_at,
            plan_updated_at: self.plan_updated_at,
            billing_cycle_start: self.billing_cycle_start,
            billing_cycle_end: self.billing_cycle_end,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    accounts: HashMap<Uuid, AccountDocument>,
    token_index: HashMap<String, Uuid>,
    email_index: HashMap<String, Uuid>,
    events: Vec<UsageEventEntity>,
}

/// In-memory stand-in for the hosted document database. A single lock over
/// the collections is what makes plan changes and usage increments atomic
/// with respect to concurrent readers: no caller can observe a document
/// mid-rewrite.
#[derive(Debug, Default)]
pub struct DocumentStore {
    state: RwLock<StoreState>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| anyhow!("document store lock poisoned"))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| anyhow!("document store lock poisoned"))
    }

    /// Seeds an account document that still carries a deprecated plan
    /// identifier, as written by the pre-migration schema. Ops/test seam for
    /// exercising the legacy plan migration.
    pub fn seed_deprecated_account(
        &self,
        token_identifier: &str,
        email: &str,
        legacy_plan: LegacyPlanId,
        enhancements_used: u32,
    ) -> Result<Uuid> {
        let mut state = self.write_state()?;
        if state.token_index.contains_key(token_identifier) {
            bail!("account already exists for token {token_identifier}");
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let config = PlanCatalog::config_for(PlanId::FreeUser);
        state.accounts.insert(
            id,
            AccountDocument {
                id,
                token_identifier: token_identifier.to_string(),
                name: "Legacy User".to_string(),
                email: email.to_string(),
                image_url: None,
                plan: StoredPlan::Deprecated(legacy_plan),
                billing_plan_ref: None,
                projects_used: 0,
                enhancements_used_this_month: enhancements_used,
                exports_this_month: 0,
                monthly_enhancement_limit: config.monthly_enhancement_limit,
                monthly_export_limit: config.monthly_export_limit,
                project_limit: config.max_projects,
                flags: FeatureFlags::for_plan(PlanId::FreeUser),
                created_at: now,
                last_active_at: now,
                plan_updated_at: now,
                billing_cycle_start: now,
                billing_cycle_end: now + Duration::days(BILLING_CYCLE_DAYS),
            },
        );
        state.token_index.insert(token_identifier.to_string(), id);
        state.email_index.insert(email.to_string(), id);
        Ok(id)
    }
}

#[async_trait]
impl AccountRepository for DocumentStore {
    async fn find_by_token(&self, token_identifier: &str) -> Result<Option<AccountEntity>> {
        let state = self.read_state()?;
        Ok(state
            .token_index
            .get(token_identifier)
            .and_then(|id| state.accounts.get(id))
            .map(AccountDocument::to_entity))
    }

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<AccountEntity>> {
        let state = self.read_state()?;
        Ok(state
            .accounts
            .get(&account_id)
            .map(AccountDocument::to_entity))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountEntity>> {
        let state = self.read_state()?;
        Ok(state
            .email_index
            .get(email)
            .and_then(|id| state.accounts.get(id))
            .map(AccountDocument::to_entity))
    }

    async fn insert(&self, new_account: NewAccountEntity) -> Result<Uuid> {
        let mut state = self.write_state()?;
        if state.token_index.contains_key(&new_account.token_identifier) {
            bail!(
                "account already exists for token {}",
                new_account.token_identifier
            );
        }
        if state.email_index.contains_key(&new_account.email) {
            bail!("account already exists for email {}", new_account.email);
        }

        let id = Uuid::new_v4();
        state
            .token_index
            .insert(new_account.token_identifier.clone(), id);
        state.email_index.insert(new_account.email.clone(), id);
        state.accounts.insert(
            id,
            AccountDocument {
                id,
                token_identifier: new_account.token_identifier,
                name: new_account.name,
                email: new_account.email,
                image_url: new_account.image_url,
                plan: StoredPlan::Active(new_account.plan),
                billing_plan_ref: None,
                projects_used: 0,
                enhancements_used_this_month: 0,
                exports_this_month: 0,
                monthly_enhancement_limit: new_account.monthly_enhancement_limit,
                monthly_export_limit: new_account.monthly_export_limit,
                project_limit: new_account.project_limit,
                flags: new_account.flags,
                created_at: new_account.created_at,
                last_active_at: new_account.created_at,
                plan_updated_at: new_account.created_at,
                billing_cycle_start: new_account.billing_cycle_start,
                billing_cycle_end: new_account.billing_cycle_end,
            },
        );
        Ok(id)
    }

    async fn touch_profile(
        &self,
        account_id: Uuid,
        name: &str,
        last_active_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.write_state()?;
        if let Some(account) = state.accounts.get_mut(&account_id) {
            account.name = name.to_string();
            account.last_active_at = last_active_at;
        }
        Ok(())
    }

    async fn change_plan(&self, account_id: Uuid, change: PlanChangeRecord) -> Result<bool> {
        let mut state = self.write_state()?;
        let Some(account) = state.accounts.get_mut(&account_id) else {
            return Ok(false);
        };

        // One write-lock scope: a concurrent reader sees either the whole
        // old document or the whole new one.
        let cycle_end = change.cycle_end();
        account.plan = StoredPlan::Active(change.plan);
        account.billing_plan_ref = change.billing_plan_ref;
        account.monthly_enhancement_limit = change.monthly_enhancement_limit;
        account.monthly_export_limit = change.monthly_export_limit;
        account.project_limit = change.project_limit;
        account.flags = change.flags;
        account.projects_used = 0;
        account.enhancements_used_this_month = 0;
        account.exports_this_month = 0;
        account.billing_cycle_start = change.changed_at;
        account.billing_cycle_end = cycle_end;
        account.plan_updated_at = change.changed_at;
        account.last_active_at = change.changed_at;
        Ok(true)
    }

    async fn list_deprecated_plan_accounts(&self) -> Result<Vec<DeprecatedPlanAccount>> {
        let state = self.read_state()?;
        Ok(state
            .accounts
            .values()
            .filter_map(|account| match account.plan {
                StoredPlan::Deprecated(legacy_plan) => Some(DeprecatedPlanAccount {
                    account_id: account.id,
                    legacy_plan,
                }),
                StoredPlan::Active(_) => None,
            })
            .collect())
    }
}

#[async_trait]
impl UsageLedgerRepository for DocumentStore {
    async fn record(&self, new_event: NewUsageEventEntity) -> Result<bool> {
        let mut state = self.write_state()?;
        let Some(account) = state.accounts.get_mut(&new_event.account_id) else {
            return Ok(false);
        };

        if let Some(counter) = new_event.kind.metered_counter() {
            match counter {
                MeterKind::Enhancements => account.enhancements_used_this_month += 1,
                MeterKind::Exports => account.exports_this_month += 1,
                MeterKind::Projects => account.projects_used += 1,
            }
        }

        state.events.push(UsageEventEntity {
            id: Uuid::new_v4(),
            account_id: new_event.account_id,
            kind: new_event.kind,
            project_id: new_event.project_id,
            metadata: new_event.metadata,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn list_by_account(
        &self,
        account_id: Uuid,
        kind: Option<UsageEventKind>,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<UsageEventEntity>> {
        let state = self.read_state()?;
        let mut events: Vec<UsageEventEntity> = state
            .events
            .iter()
            .filter(|event| event.account_id == account_id)
            .filter(|event| kind.is_none_or(|kind| event.kind == kind))
            .filter(|event| {
                range.is_none_or(|(from, to)| event.created_at >= from && event.created_at < to)
            })
            .cloned()
            .collect();
        events.sort_by_key(|event| event.created_at);
        Ok(events)
    }
}
