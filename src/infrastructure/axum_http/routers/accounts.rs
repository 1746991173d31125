use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    application::usecases::accounts::{AccountUseCase, LedgerError},
    domain::repositories::accounts::AccountRepository,
    infrastructure::{axum_http::auth::IdentityUser, document_store::DocumentStore},
};

pub fn routes(store: Arc<DocumentStore>) -> Router {
    let accounts_usecase = Arc::new(AccountUseCase::new(Arc::clone(&store)));

    Router::new()
        .route("/store", post(store_account::<DocumentStore>))
        .route("/me", get(current_account::<DocumentStore>))
        .route("/by-email/:email", get(find_by_email::<DocumentStore>))
        .with_state(accounts_usecase)
}

#[derive(Debug, Serialize)]
pub struct StoreAccountResponse {
    pub account_id: Uuid,
}

/// Called by the frontend after sign-in; safe to repeat on every session.
pub async fn store_account<T>(
    State(accounts_usecase): State<Arc<AccountUseCase<T>>>,
    IdentityUser(identity): IdentityUser,
) -> Result<impl IntoResponse, LedgerError>
where
    T: AccountRepository + Send + Sync + 'static,
{
    let account_id = accounts_usecase.ensure_account(Some(identity)).await?;
    Ok((StatusCode::OK, Json(StoreAccountResponse { account_id })))
}

pub async fn current_account<T>(
    State(accounts_usecase): State<Arc<AccountUseCase<T>>>,
    IdentityUser(identity): IdentityUser,
) -> Result<impl IntoResponse, LedgerError>
where
    T: AccountRepository + Send + Sync + 'static,
{
    let account = accounts_usecase.current_account(Some(identity)).await?;
    Ok(Json(account))
}

pub async fn find_by_email<T>(
    State(accounts_usecase): State<Arc<AccountUseCase<T>>>,
    IdentityUser(_identity): IdentityUser,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, LedgerError>
where
    T: AccountRepository + Send + Sync + 'static,
{
    let account = accounts_usecase
        .find_by_email(&email)
        .await?
        .ok_or(LedgerError::AccountNotFound)?;
    Ok(Json(account))
}
