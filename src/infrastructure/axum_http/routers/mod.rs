pub mod accounts;
pub mod billing;
pub mod entitlements;
pub mod usage;
