pub mod entitlements;
pub mod enums;
pub mod iam;
pub mod plans;
