use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::application::usecases::accounts::{LedgerError, LedgerResult};
use crate::domain::{
    entities::accounts::PlanChangeRecord,
    repositories::accounts::AccountRepository,
    value_objects::plans::{LegacyPlanId, PlanId},
};

/// Audit entry for one rewritten account.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlanMigrationRecord {
    pub account_id: Uuid,
    pub old_plan: LegacyPlanId,
    pub new_plan: PlanId,
}

/// One-shot migration of accounts still stored under deprecated plan
/// identifiers (`free`, `pro`). Reapplies the same configuration copy as a
/// regular plan change. Idempotent: once nothing is deprecated, a rerun
/// performs no writes and returns an empty report.
pub struct PlanMigrationUseCase<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    account_repo: Arc<A>,
}

impl<A> PlanMigrationUseCase<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<A>) -> Self {
        Self { account_repo }
    }

    pub async fn migrate_legacy_plans(&self) -> LedgerResult<Vec<PlanMigrationRecord>> {
        let deprecated = self
            .account_repo
            .list_deprecated_plan_accounts()
            .await
            .map_err(|err| {
                error!(db_error = ?err, "plan_migration: failed to list deprecated accounts");
                LedgerError::Internal(err)
            })?;

        info!(
            deprecated_count = deprecated.len(),
            "plan_migration: starting legacy plan migration"
        );

        let mut report = Vec::with_capacity(deprecated.len());
        for account in deprecated {
            let new_plan = account.legacy_plan.maps_to();
            let change = PlanChangeRecord::for_plan(new_plan, None, Utc::now());

            let applied = self
                .account_repo
                .change_plan(account.account_id, change)
                .await
                .map_err(|err| {
                    error!(
                        account_id = %account.account_id,
                        db_error = ?err,
                        "plan_migration: failed to rewrite account"
                    );
                    LedgerError::Internal(err)
                })?;

            if !applied {
                // The account disappeared between listing and rewrite;
                // nothing to audit for it.
                continue;
            }

            info!(
                account_id = %account.account_id,
                old_plan = %account.legacy_plan,
                new_plan = %new_plan,
                "plan_migration: account migrated"
            );
            report.push(PlanMigrationRecord {
                account_id: account.account_id,
                old_plan: account.legacy_plan,
                new_plan,
            });
        }

        info!(
            migrated_count = report.len(),
            "plan_migration: legacy plan migration finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::accounts::{
        DeprecatedPlanAccount, MockAccountRepository,
    };

    #[tokio::test]
    async fn migrates_each_deprecated_account_with_the_mapped_plan() {
        let free_id = Uuid::new_v4();
        let pro_id = Uuid::new_v4();

        let mut account_repo = MockAccountRepository::new();
        account_repo
            .expect_list_deprecated_plan_accounts()
            .returning(move || {
                Box::pin(async move {
                    Ok(vec![
                        DeprecatedPlanAccount {
                            account_id: free_id,
                            legacy_plan: LegacyPlanId::Free,
                        },
                        DeprecatedPlanAccount {
                            account_id: pro_id,
                            legacy_plan: LegacyPlanId::Pro,
                        },
                    ])
                })
            });
        account_repo
            .expect_change_plan()
            .withf(move |id, change| *id == free_id && change.plan == PlanId::FreeUser)
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));
        account_repo
            .expect_change_plan()
            .withf(move |id, change| *id == pro_id && change.plan == PlanId::Creator)
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let usecase = PlanMigrationUseCase::new(Arc::new(account_repo));
        let report = usecase.migrate_legacy_plans().await.unwrap();

        assert_eq!(
            report,
            vec![
                PlanMigrationRecord {
                    account_id: free_id,
                    old_plan: LegacyPlanId::Free,
                    new_plan: PlanId::FreeUser,
                },
                PlanMigrationRecord {
                    account_id: pro_id,
                    old_plan: LegacyPlanId::Pro,
                    new_plan: PlanId::Creator,
                },
            ]
        );
    }

    #[tokio::test]
    async fn empty_store_yields_an_empty_report_without_writes() {
        let mut account_repo = MockAccountRepository::new();
        account_repo
            .expect_list_deprecated_plan_accounts()
            .returning(|| Box::pin(async { Ok(Vec::new()) }));
        account_repo.expect_change_plan().never();

        let usecase = PlanMigrationUseCase::new(Arc::new(account_repo));
        let report = usecase.migrate_legacy_plans().await.unwrap();
        assert!(report.is_empty());
    }
}
