use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    application::usecases::{
        accounts::{AccountUseCase, LedgerError, LedgerResult},
        plan_migration::PlanMigrationUseCase,
    },
    config::config_loader,
    domain::repositories::accounts::AccountRepository,
    infrastructure::document_store::DocumentStore,
};

pub const BILLING_SIGNATURE_HEADER: &str = "x-billing-signature";

pub struct BillingState<T>
where
    T: AccountRepository + Send + Sync + 'static,
{
    pub accounts: Arc<AccountUseCase<T>>,
    pub migration: Arc<PlanMigrationUseCase<T>>,
}

impl<T> Clone for BillingState<T>
where
    T: AccountRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            migration: Arc::clone(&self.migration),
        }
    }
}

pub fn routes(store: Arc<DocumentStore>) -> Router {
    let state = BillingState {
        accounts: Arc::new(AccountUseCase::new(Arc::clone(&store))),
        migration: Arc::new(PlanMigrationUseCase::new(Arc::clone(&store))),
    };

    Router::new()
        .route("/webhook", post(plan_webhook::<DocumentStore>))
        .route(
            "/migrate-legacy-plans",
            post(migrate_legacy_plans::<DocumentStore>),
        )
        .with_state(state)
}

/// Machine-to-machine calls carry a shared secret instead of a user token.
fn require_billing_signature(headers: &HeaderMap) -> LedgerResult<()> {
    let expected = config_loader::get_billing_webhook_secret()?;
    let presented = headers
        .get(BILLING_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match presented {
        Some(signature) if signature == expected.secret => Ok(()),
        _ => {
            warn!("billing: webhook call with missing or wrong signature");
            Err(LedgerError::Unauthenticated)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BillingWebhookPayload {
    pub token: String,
    pub new_plan_id: String,
    pub external_billing_ref: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BillingWebhookResponse {
    pub account_id: Uuid,
}

pub async fn plan_webhook<T>(
    State(state): State<BillingState<T>>,
    headers: HeaderMap,
    Json(payload): Json<BillingWebhookPayload>,
) -> Result<impl IntoResponse, LedgerError>
where
    T: AccountRepository + Send + Sync + 'static,
{
    require_billing_signature(&headers)?;

    let account_id = state
        .accounts
        .change_plan_by_token(
            &payload.token,
            &payload.new_plan_id,
            payload.external_billing_ref,
        )
        .await?;
    Ok(Json(BillingWebhookResponse { account_id }))
}

pub async fn migrate_legacy_plans<T>(
    State(state): State<BillingState<T>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, LedgerError>
where
    T: AccountRepository + Send + Sync + 'static,
{
    require_billing_signature(&headers)?;

    let report = state.migration.migrate_legacy_plans().await?;
    Ok(Json(report))
}
