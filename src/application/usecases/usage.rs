use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::usecases::accounts::{LedgerError, LedgerResult};
use crate::domain::{
    entities::usage_events::{NewUsageEventEntity, UsageEventEntity},
    repositories::{accounts::AccountRepository, usage_events::UsageLedgerRepository},
    value_objects::{enums::usage_event_kinds::UsageEventKind, iam::UserIdentity},
};

pub struct UsageUseCase<A, L>
where
    A: AccountRepository + Send + Sync + 'static,
    L: UsageLedgerRepository + Send + Sync + 'static,
{
    account_repo: Arc<A>,
    ledger_repo: Arc<L>,
}

impl<A, L> UsageUseCase<A, L>
where
    A: AccountRepository + Send + Sync + 'static,
    L: UsageLedgerRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<A>, ledger_repo: Arc<L>) -> Self {
        Self {
            account_repo,
            ledger_repo,
        }
    }

    async fn resolve_account_id(&self, identity: Option<UserIdentity>) -> LedgerResult<Uuid> {
        let identity = identity.ok_or(LedgerError::Unauthenticated)?;
        self.account_repo
            .find_by_token(&identity.token_identifier)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "usage: failed to resolve account");
                LedgerError::Internal(err)
            })?
            .map(|account| account.id)
            .ok_or_else(|| {
                let err = LedgerError::AccountNotFound;
                warn!(
                    status = err.status_code().as_u16(),
                    "usage: identity has no stored account"
                );
                err
            })
    }

    /// Appends the event and bumps the matching counter for metered kinds.
    /// Recording is advisory: quota was already checked at the decision
    /// layer, so this never rejects on over-quota.
    pub async fn record_usage(
        &self,
        account_id: Uuid,
        kind: UsageEventKind,
        project_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
    ) -> LedgerResult<()> {
        let recorded = self
            .ledger_repo
            .record(NewUsageEventEntity {
                account_id,
                kind,
                project_id,
                metadata,
            })
            .await
            .map_err(|err| {
                error!(
                    %account_id,
                    kind = %kind,
                    db_error = ?err,
                    "usage: failed to record event"
                );
                LedgerError::Internal(err)
            })?;

        if !recorded {
            let err = LedgerError::AccountNotFound;
            warn!(
                %account_id,
                kind = %kind,
                status = err.status_code().as_u16(),
                "usage: record addressed missing account"
            );
            return Err(err);
        }

        info!(%account_id, kind = %kind, "usage: event recorded");
        Ok(())
    }

    pub async fn record_usage_for_identity(
        &self,
        identity: Option<UserIdentity>,
        kind: UsageEventKind,
        project_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
    ) -> LedgerResult<()> {
        let account_id = self.resolve_account_id(identity).await?;
        self.record_usage(account_id, kind, project_id, metadata)
            .await
    }

    pub async fn list_usage_for_identity(
        &self,
        identity: Option<UserIdentity>,
        kind: Option<UsageEventKind>,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> LedgerResult<Vec<UsageEventEntity>> {
        let account_id = self.resolve_account_id(identity).await?;
        self.ledger_repo
            .list_by_account(account_id, kind, range)
            .await
            .map_err(|err| {
                error!(%account_id, db_error = ?err, "usage: failed to list events");
                LedgerError::Internal(err)
            })
    }
}
