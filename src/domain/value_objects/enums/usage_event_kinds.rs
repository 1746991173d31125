use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::entitlements::MeterKind;

/// One consumption of a metered or tracked capability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UsageEventKind {
    Enhancement,
    Export,
    Upscaling,
    BackgroundRemoval,
    ApiCall,
}

impl UsageEventKind {
    /// Account counter bumped alongside the event insert. Kinds without a
    /// counter are recorded for analytics only.
    pub fn metered_counter(&self) -> Option<MeterKind> {
        match self {
            UsageEventKind::Enhancement => Some(MeterKind::Enhancements),
            UsageEventKind::Export => Some(MeterKind::Exports),
            UsageEventKind::Upscaling
            | UsageEventKind::BackgroundRemoval
            | UsageEventKind::ApiCall => None,
        }
    }
}

impl Display for UsageEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            UsageEventKind::Enhancement => "enhancement",
            UsageEventKind::Export => "export",
            UsageEventKind::Upscaling => "upscaling",
            UsageEventKind::BackgroundRemoval => "background_removal",
            UsageEventKind::ApiCall => "api_call",
        };
        write!(f, "{}", kind)
    }
}
