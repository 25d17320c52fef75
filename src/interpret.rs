//! Risk interpretation
//!
//! Maps a class probability to an ordinal risk tier and a fixed clinical
//! recommendation. Thresholds are half-open intervals evaluated highest
//! first; the tier boundaries (0.3 / 0.5 / 0.7) are part of the service
//! contract and must not drift.

use serde::{Deserialize, Serialize};

/// Ordinal risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    /// Probability in [0.0, 0.3)
    VeryLow,
    /// Probability in [0.3, 0.5)
    Low,
    /// Probability in [0.5, 0.7)
    Moderate,
    /// Probability in [0.7, 1.0]
    High,
}

impl RiskTier {
    /// Classify a probability, highest tier first
    #[must_use]
    pub fn from_probability(probability: f32) -> Self {
        if probability >= 0.7 {
            RiskTier::High
        } else if probability >= 0.5 {
            RiskTier::Moderate
        } else if probability >= 0.3 {
            RiskTier::Low
        } else {
            RiskTier::VeryLow
        }
    }

    /// Human-facing tier label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::High => "HIGH RISK",
            RiskTier::Moderate => "MODERATE RISK",
            RiskTier::Low => "LOW RISK",
            RiskTier::VeryLow => "VERY LOW RISK",
        }
    }

    /// Clinical follow-up recommendation for this tier
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskTier::High => {
                "Immediate consultation with an ophthalmologist is recommended. \
                 High probability of developing diabetic retinopathy."
            }
            RiskTier::Moderate => {
                "Schedule a comprehensive eye examination within 1 month. \
                 Regular monitoring is advised."
            }
            RiskTier::Low => {
                "Annual retinal screening is recommended. \
                 Continue good diabetes management."
            }
            RiskTier::VeryLow => {
                "Continue routine eye examinations and maintain healthy diabetes management."
            }
        }
    }
}
