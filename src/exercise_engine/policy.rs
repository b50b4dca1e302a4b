//! Tunable constants for problem generation and the difficulty policy.
//!
//! Every threshold the engine uses is a named field with a documented default,
//! so a game can retune the policy (or load it from JSON) without touching the
//! algorithm. Both configs are validated before an engine or generator will
//! accept them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::exercise_engine::models::Operation;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("target accuracy band must satisfy 0 <= low < high <= 1 (got {low}..{high})")]
    InvalidAccuracyBand { low: f64, high: f64 },

    #[error("{field} must be a positive, finite number (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be within 0..=1 (got {value})")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("{field} must be at least {min} (got {value})")]
    TooSmall { field: &'static str, min: usize, value: usize },

    #[error("confidence saturation ({saturation}) must not be below min_samples ({min_samples})")]
    SaturationBelowMinimum { saturation: usize, min_samples: usize },

    #[error("at least one operation weight must be non-zero")]
    AllWeightsZero,

    #[error("distractor count must be within 1..={max} (got {count})")]
    DistractorCount { count: usize, max: usize },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Relative weights for picking an operation; need not sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationWeights {
    pub addition: u32,
    pub subtraction: u32,
    pub multiplication: u32,
}

impl Default for OperationWeights {
    fn default() -> Self {
        OperationWeights { addition: 70, subtraction: 20, multiplication: 10 }
    }
}

impl OperationWeights {
    /// Weights in [`Operation::ALL`] order.
    pub fn as_array(&self) -> [u32; 3] {
        [self.addition, self.subtraction, self.multiplication]
    }

    pub fn weight(&self, operation: Operation) -> u32 {
        match operation {
            Operation::Addition => self.addition,
            Operation::Subtraction => self.subtraction,
            Operation::Multiplication => self.multiplication,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub operation_weights: OperationWeights,
    pub distractor_count: usize,
}

impl GeneratorConfig {
    pub const MAX_DISTRACTORS: usize = 8;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.operation_weights.as_array().iter().all(|&w| w == 0) {
            return Err(ConfigError::AllWeightsZero);
        }
        if self.distractor_count == 0 || self.distractor_count > Self::MAX_DISTRACTORS {
            return Err(ConfigError::DistractorCount {
                count: self.distractor_count,
                max: Self::MAX_DISTRACTORS,
            });
        }
        Ok(())
    }

    /// Parse and validate; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            operation_weights: OperationWeights::default(),
            distractor_count: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Difficulty policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Lower edge of the target accuracy band.
    pub target_accuracy_low: f64,
    /// Upper edge of the target accuracy band.
    pub target_accuracy_high: f64,
    /// Mean response time (seconds) a comfortable player stays under.
    pub response_time_ceiling: f64,
    /// Mean time beyond `ceiling * slow_factor` counts as "far too slow".
    pub slow_factor: f64,
    /// Share of samples using hints that counts as heavy hint reliance.
    pub high_hint_rate: f64,
    /// Below this many samples the engine always recommends `Maintain`.
    pub min_samples: usize,
    /// Sample count at which the sample-size part of confidence reaches 1.
    pub confidence_saturation: usize,
    /// Minimum history length before a trend other than `Stable` is reported.
    pub trend_min_samples: usize,
    /// Accuracy difference between first and last third that counts as a trend.
    pub trend_accuracy_margin: f64,
    /// Relative response-time change that counts as a trend when accuracy is flat.
    pub trend_speed_margin: f64,
    /// Margin strength (0..=1) above which increases/decreases become adaptive.
    pub adaptive_strength: f64,
    /// Streak needed before an increase may become adaptive.
    pub adaptive_streak: usize,
    /// Most recent samples kept for metrics; older ones are evicted.
    pub history_window: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            target_accuracy_low: 0.70,
            target_accuracy_high: 0.85,
            response_time_ceiling: 5.0,
            slow_factor: 1.5,
            high_hint_rate: 0.3,
            min_samples: 5,
            confidence_saturation: 20,
            trend_min_samples: 6,
            trend_accuracy_margin: 0.15,
            trend_speed_margin: 0.25,
            adaptive_strength: 0.6,
            adaptive_streak: 5,
            history_window: 500,
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (low, high) = (self.target_accuracy_low, self.target_accuracy_high);
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(ConfigError::InvalidAccuracyBand { low, high });
        }

        for (field, value) in [
            ("response_time_ceiling", self.response_time_ceiling),
            ("slow_factor", self.slow_factor),
            ("trend_speed_margin", self.trend_speed_margin),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        for (field, value) in [
            ("high_hint_rate", self.high_hint_rate),
            ("trend_accuracy_margin", self.trend_accuracy_margin),
            ("adaptive_strength", self.adaptive_strength),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { field, value });
            }
        }

        for (field, min, value) in [
            ("min_samples", 1, self.min_samples),
            ("trend_min_samples", 3, self.trend_min_samples),
            ("history_window", 1, self.history_window),
        ] {
            if value < min {
                return Err(ConfigError::TooSmall { field, min, value });
            }
        }

        if self.confidence_saturation < self.min_samples {
            return Err(ConfigError::SaturationBelowMinimum {
                saturation: self.confidence_saturation,
                min_samples: self.min_samples,
            });
        }
        Ok(())
    }

    /// Parse and validate; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PolicyConfig::default().validate().is_ok());
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PolicyConfig::from_json(r#"{ "response_time_ceiling": 8.0 }"#).unwrap();
        assert_eq!(config.response_time_ceiling, 8.0);
        assert_eq!(config.min_samples, PolicyConfig::default().min_samples);
    }

    #[test]
    fn inverted_band_is_rejected() {
        let config = PolicyConfig {
            target_accuracy_low: 0.9,
            target_accuracy_high: 0.8,
            ..PolicyConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAccuracyBand { .. })
        ));
    }

    #[test]
    fn saturation_must_cover_min_samples() {
        let config = PolicyConfig {
            min_samples: 10,
            confidence_saturation: 4,
            ..PolicyConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SaturationBelowMinimum { .. })
        ));
    }

    #[test]
    fn generator_config_rejects_zero_weights_and_bad_counts() {
        let zero = r#"{ "operation_weights": { "addition": 0, "subtraction": 0, "multiplication": 0 } }"#;
        assert!(matches!(GeneratorConfig::from_json(zero), Err(ConfigError::AllWeightsZero)));

        let too_many = GeneratorConfig { distractor_count: 12, ..GeneratorConfig::default() };
        assert!(matches!(too_many.validate(), Err(ConfigError::DistractorCount { .. })));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(PolicyConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
    }
}
