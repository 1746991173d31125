use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::enums::usage_event_kinds::UsageEventKind;

/// Append-only record of one consumption of a capability. Written once,
/// never mutated; used for analytics, not for quota accounting (the account
/// counters are authoritative).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageEventEntity {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: UsageEventKind,
    pub project_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUsageEventEntity {
    pub account_id: Uuid,
    pub kind: UsageEventKind,
    pub project_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
}
