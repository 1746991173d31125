use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    application::usecases::accounts::LedgerError,
    application::usecases::usage::UsageUseCase,
    domain::{
        repositories::{accounts::AccountRepository, usage_events::UsageLedgerRepository},
        value_objects::enums::usage_event_kinds::UsageEventKind,
    },
    infrastructure::{axum_http::auth::IdentityUser, document_store::DocumentStore},
};

pub fn routes(store: Arc<DocumentStore>) -> Router {
    let usage_usecase = Arc::new(UsageUseCase::new(Arc::clone(&store), Arc::clone(&store)));

    Router::new()
        .route(
            "/events",
            post(record_event::<DocumentStore, DocumentStore>)
                .get(list_events::<DocumentStore, DocumentStore>),
        )
        .with_state(usage_usecase)
}

#[derive(Debug, Deserialize)]
pub struct RecordUsageRequest {
    pub kind: UsageEventKind,
    pub project_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ListUsageQuery {
    pub kind: Option<UsageEventKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub async fn record_event<A, L>(
    State(usage_usecase): State<Arc<UsageUseCase<A, L>>>,
    IdentityUser(identity): IdentityUser,
    Json(request): Json<RecordUsageRequest>,
) -> Result<impl IntoResponse, LedgerError>
where
    A: AccountRepository + Send + Sync + 'static,
    L: UsageLedgerRepository + Send + Sync + 'static,
{
    usage_usecase
        .record_usage_for_identity(
            Some(identity),
            request.kind,
            request.project_id,
            request.metadata,
        )
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn list_events<A, L>(
    State(usage_usecase): State<Arc<UsageUseCase<A, L>>>,
    IdentityUser(identity): IdentityUser,
    Query(query): Query<ListUsageQuery>,
) -> Result<impl IntoResponse, LedgerError>
where
    A: AccountRepository + Send + Sync + 'static,
    L: UsageLedgerRepository + Send + Sync + 'static,
{
    // The window filter only applies when both bounds are present.
    let range = match (query.from, query.to) {
        (Some(from), Some(to)) => Some((from, to)),
        _ => None,
    };

    let events = usage_usecase
        .list_usage_for_identity(Some(identity), query.kind, range)
        .await?;
    Ok(Json(events))
}
