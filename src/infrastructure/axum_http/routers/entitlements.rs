use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};

use crate::{
    application::usecases::accounts::LedgerError,
    application::usecases::entitlements::EntitlementUseCase,
    domain::repositories::accounts::AccountRepository,
    infrastructure::{axum_http::auth::IdentityUser, document_store::DocumentStore},
};

pub fn routes(store: Arc<DocumentStore>) -> Router {
    let entitlement_usecase = Arc::new(EntitlementUseCase::new(Arc::clone(&store)));

    Router::new()
        .route("/tools/:tool_id", get(check_tool::<DocumentStore>))
        .route("/offers", get(upgrade_offers::<DocumentStore>))
        .with_state(entitlement_usecase)
}

/// Decision against the caller's live counters. Unknown tool identifiers
/// still get a structured decision, never a 404.
pub async fn check_tool<T>(
    State(entitlement_usecase): State<Arc<EntitlementUseCase<T>>>,
    IdentityUser(identity): IdentityUser,
    Path(tool_id): Path<String>,
) -> Result<impl IntoResponse, LedgerError>
where
    T: AccountRepository + Send + Sync + 'static,
{
    let decision = entitlement_usecase
        .check_tool(Some(identity), &tool_id)
        .await?;
    Ok(Json(decision))
}

pub async fn upgrade_offers<T>(
    State(entitlement_usecase): State<Arc<EntitlementUseCase<T>>>,
    IdentityUser(identity): IdentityUser,
) -> Result<impl IntoResponse, LedgerError>
where
    T: AccountRepository + Send + Sync + 'static,
{
    let offers = entitlement_usecase.offers(Some(identity)).await?;
    Ok(Json(offers))
}
