pub mod accounts;
pub mod entitlements;
pub mod plan_migration;
pub mod usage;
