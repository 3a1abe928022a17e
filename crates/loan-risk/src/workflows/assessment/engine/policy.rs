use serde::{Deserialize, Serialize};

/// Thresholds and guards applied by the rule-based scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// Scores at or above this value are `High`.
    pub high_threshold: f64,
    /// Scores at or above this value (and below `high_threshold`) are `Medium`.
    pub medium_threshold: f64,
    /// Added to income before dividing so zero income never divides by zero.
    pub income_offset: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            high_threshold: 0.7,
            medium_threshold: 0.4,
            income_offset: 1.0,
        }
    }
}

impl RiskPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        for (name, value) in [
            ("high_threshold", self.high_threshold),
            ("medium_threshold", self.medium_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PolicyError::ThresholdOutOfRange { name, value });
            }
        }

        if self.medium_threshold > self.high_threshold {
            return Err(PolicyError::InvertedThresholds {
                medium: self.medium_threshold,
                high: self.high_threshold,
            });
        }

        if !(self.income_offset.is_finite() && self.income_offset > 0.0) {
            return Err(PolicyError::NonPositiveOffset(self.income_offset));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("{name} must lie within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("medium threshold {medium} exceeds high threshold {high}")]
    InvertedThresholds { medium: f64, high: f64 },
    #[error("income offset must be a positive finite number, got {0}")]
    NonPositiveOffset(f64),
}
