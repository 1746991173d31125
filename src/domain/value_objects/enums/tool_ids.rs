use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Editor tools whose invocation is gated by the entitlement evaluator.
/// The enum is closed on purpose: every new tool must get an explicit
/// policy arm instead of falling through to the paid-plan default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    Resize,
    Crop,
    Adjust,
    Text,
    BackgroundRemoval,
    AiEnhance,
    QuantumUpscaling,
    Projects,
    Api,
    CustomAi,
}

impl ToolId {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "resize" => Some(ToolId::Resize),
            "crop" => Some(ToolId::Crop),
            "adjust" => Some(ToolId::Adjust),
            "text" => Some(ToolId::Text),
            "background_removal" => Some(ToolId::BackgroundRemoval),
            "ai_enhance" => Some(ToolId::AiEnhance),
            "quantum_upscaling" => Some(ToolId::QuantumUpscaling),
            "projects" => Some(ToolId::Projects),
            "api" => Some(ToolId::Api),
            "custom_ai" => Some(ToolId::CustomAi),
            _ => None,
        }
    }
}

impl Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tool = match self {
            ToolId::Resize => "resize",
            ToolId::Crop => "crop",
            ToolId::Adjust => "adjust",
            ToolId::Text => "text",
            ToolId::BackgroundRemoval => "background_removal",
            ToolId::AiEnhance => "ai_enhance",
            ToolId::QuantumUpscaling => "quantum_upscaling",
            ToolId::Projects => "projects",
            ToolId::Api => "api",
            ToolId::CustomAi => "custom_ai",
        };
        write!(f, "{}", tool)
    }
}
