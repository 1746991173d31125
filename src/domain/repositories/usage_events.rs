use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::usage_events::{NewUsageEventEntity, UsageEventEntity},
    value_objects::enums::usage_event_kinds::UsageEventKind,
};

#[async_trait]
#[automock]
pub trait UsageLedgerRepository {
    /// Appends the event and, for metered kinds, increments the matching
    /// account counter by exactly 1 in the same atomic operation. Returns
    /// false when the account does not exist. Never rejects on over-quota.
    async fn record(&self, new_event: NewUsageEventEntity) -> Result<bool>;

    /// Events for one account, optionally narrowed by kind and a half-open
    /// `[from, to)` time range, ordered by creation time ascending.
    async fn list_by_account(
        &self,
        account_id: Uuid,
        kind: Option<UsageEventKind>,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<UsageEventEntity>>;
}
