pub mod feature_tags;
pub mod tool_ids;
pub mod usage_event_kinds;
