use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::accounts::{AccountEntity, NewAccountEntity, PlanChangeRecord},
    repositories::accounts::AccountRepository,
    value_objects::{iam::UserIdentity, plans::PlanId},
};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("account not found")]
    AccountNotFound,
    #[error("unknown plan: {0}")]
    UnknownPlan(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            LedgerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            LedgerError::AccountNotFound => StatusCode::NOT_FOUND,
            LedgerError::UnknownPlan(_) => StatusCode::BAD_REQUEST,
            LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

pub struct AccountUseCase<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    account_repo: Arc<A>,
}

impl<A> AccountUseCase<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<A>) -> Self {
        Self { account_repo }
    }

    /// Idempotent upsert keyed by the identity token. A new identity gets a
    /// free-plan account with zeroed counters; a known identity only has its
    /// display fields refreshed, never plan or usage state.
    pub async fn ensure_account(&self, identity: Option<UserIdentity>) -> LedgerResult<Uuid> {
        let identity = identity.ok_or_else(|| {
            let err = LedgerError::Unauthenticated;
            warn!(
                status = err.status_code().as_u16(),
                "accounts: ensure_account called without identity"
            );
            err
        })?;

        let existing = self
            .account_repo
            .find_by_token(&identity.token_identifier)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "accounts: failed to look up account by token");
                LedgerError::Internal(err)
            })?;

        if let Some(account) = existing {
            if account.name != identity.name {
                self.account_repo
                    .touch_profile(account.id, &identity.name, Utc::now())
                    .await
                    .map_err(|err| {
                        error!(
                            account_id = %account.id,
                            db_error = ?err,
                            "accounts: failed to refresh profile"
                        );
                        LedgerError::Internal(err)
                    })?;
                info!(account_id = %account.id, "accounts: profile refreshed for known identity");
            }
            return Ok(account.id);
        }

        let new_account = NewAccountEntity::free_plan(&identity, Utc::now());
        let account_id = self.account_repo.insert(new_account).await.map_err(|err| {
            error!(db_error = ?err, "accounts: failed to insert account");
            LedgerError::Internal(err)
        })?;

        info!(%account_id, "accounts: created free-plan account for new identity");
        Ok(account_id)
    }

    pub async fn current_account(
        &self,
        identity: Option<UserIdentity>,
    ) -> LedgerResult<AccountEntity> {
        let identity = identity.ok_or(LedgerError::Unauthenticated)?;

        self.account_repo
            .find_by_token(&identity.token_identifier)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "accounts: failed to load current account");
                LedgerError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = LedgerError::AccountNotFound;
                warn!(
                    status = err.status_code().as_u16(),
                    "accounts: identity has no stored account"
                );
                err
            })
    }

    pub async fn find_by_email(&self, email: &str) -> LedgerResult<Option<AccountEntity>> {
        self.account_repo.find_by_email(email).await.map_err(|err| {
            error!(email, db_error = ?err, "accounts: failed to look up account by email");
            LedgerError::Internal(err)
        })
    }

    /// Atomically replaces the account's plan, mirrored flags and limits with
    /// the catalog configuration, zeroes the usage counters and restarts the
    /// billing cycle.
    pub async fn change_plan(
        &self,
        account_id: Uuid,
        new_plan: &str,
        billing_plan_ref: Option<String>,
    ) -> LedgerResult<()> {
        let plan = PlanId::from_str(new_plan).ok_or_else(|| {
            let err = LedgerError::UnknownPlan(new_plan.to_string());
            warn!(
                %account_id,
                requested_plan = new_plan,
                status = err.status_code().as_u16(),
                "accounts: plan change requested for unknown plan"
            );
            err
        })?;

        let change = PlanChangeRecord::for_plan(plan, billing_plan_ref, Utc::now());
        let applied = self
            .account_repo
            .change_plan(account_id, change)
            .await
            .map_err(|err| {
                error!(
                    %account_id,
                    plan = %plan,
                    db_error = ?err,
                    "accounts: failed to apply plan change"
                );
                LedgerError::Internal(err)
            })?;

        if !applied {
            let err = LedgerError::AccountNotFound;
            warn!(
                %account_id,
                plan = %plan,
                status = err.status_code().as_u16(),
                "accounts: plan change addressed missing account"
            );
            return Err(err);
        }

        info!(%account_id, plan = %plan, "accounts: plan change applied");
        Ok(())
    }

    /// Webhook path: the billing provider addresses accounts by identity
    /// token, not by account id.
    pub async fn change_plan_by_token(
        &self,
        token_identifier: &str,
        new_plan: &str,
        billing_plan_ref: Option<String>,
    ) -> LedgerResult<Uuid> {
        let account = self
            .account_repo
            .find_by_token(token_identifier)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "accounts: failed to resolve webhook token");
                LedgerError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = LedgerError::AccountNotFound;
                warn!(
                    status = err.status_code().as_u16(),
                    "accounts: webhook token has no stored account"
                );
                err
            })?;

        self.change_plan(account.id, new_plan, billing_plan_ref)
            .await?;
        Ok(account.id)
    }
}
