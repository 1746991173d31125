pub mod accounts;
pub mod usage_events;
