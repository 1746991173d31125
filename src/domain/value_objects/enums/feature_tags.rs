use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Capability tags bundled into plans. Wire values match the document schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FeatureTag {
    #[serde(rename = "neural_background_removal")]
    NeuralBackgroundRemoval,
    #[serde(rename = "basic_quantum_upscaling")]
    BasicQuantumUpscaling,
    #[serde(rename = "standard_processing_speed")]
    StandardProcessingSpeed,
    #[serde(rename = "unlimited_enhancements")]
    UnlimitedEnhancements,
    #[serde(rename = "advanced_quantum_upscaling")]
    AdvancedQuantumUpscaling,
    #[serde(rename = "predictive_enhancement_ai")]
    PredictiveEnhancementAi,
    #[serde(rename = "priority_processing")]
    PriorityProcessing,
    #[serde(rename = "commercial_license")]
    CommercialLicense,
    #[serde(rename = "custom_ai_model_training")]
    CustomAiModelTraining,
    #[serde(rename = "dedicated_processing_cores")]
    DedicatedProcessingCores,
    #[serde(rename = "api_access")]
    ApiAccess,
    #[serde(rename = "white_label_solutions")]
    WhiteLabelSolutions,
    #[serde(rename = "24_7_neural_support")]
    NeuralSupport24x7,
}

impl FeatureTag {
    /// Human-readable label used in upgrade offer benefit lists.
    pub fn benefit_label(&self) -> &'static str {
        match self {
            FeatureTag::NeuralBackgroundRemoval => "Neural Background Removal",
            FeatureTag::BasicQuantumUpscaling => "Basic Quantum Upscaling",
            FeatureTag::StandardProcessingSpeed => "Standard Processing Speed",
            FeatureTag::UnlimitedEnhancements => "Unlimited enhancements",
            FeatureTag::AdvancedQuantumUpscaling => "Advanced Quantum Upscaling",
            FeatureTag::PredictiveEnhancementAi => "Predictive Enhancement AI",
            FeatureTag::PriorityProcessing => "Priority Processing",
            FeatureTag::CommercialLicense => "Commercial License",
            FeatureTag::CustomAiModelTraining => "Custom AI Model Training",
            FeatureTag::DedicatedProcessingCores => "Dedicated Processing Cores",
            FeatureTag::ApiAccess => "API Access",
            FeatureTag::WhiteLabelSolutions => "White-label Solutions",
            FeatureTag::NeuralSupport24x7 => "24/7 Neural Support",
        }
    }
}

impl Display for FeatureTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            FeatureTag::NeuralBackgroundRemoval => "neural_background_removal",
            FeatureTag::BasicQuantumUpscaling => "basic_quantum_upscaling",
            FeatureTag::StandardProcessingSpeed => "standard_processing_speed",
            FeatureTag::UnlimitedEnhancements => "unlimited_enhancements",
            FeatureTag::AdvancedQuantumUpscaling => "advanced_quantum_upscaling",
            FeatureTag::PredictiveEnhancementAi => "predictive_enhancement_ai",
            FeatureTag::PriorityProcessing => "priority_processing",
            FeatureTag::CommercialLicense => "commercial_license",
            FeatureTag::CustomAiModelTraining => "custom_ai_model_training",
            FeatureTag::DedicatedProcessingCores => "dedicated_processing_cores",
            FeatureTag::ApiAccess => "api_access",
            FeatureTag::WhiteLabelSolutions => "white_label_solutions",
            FeatureTag::NeuralSupport24x7 => "24_7_neural_support",
        };
        write!(f, "{}", tag)
    }
}
