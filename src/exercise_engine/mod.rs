//! Core exercise engine — problem generation and adaptive difficulty.
//!
//! ## Module overview
//!
//! | Module        | Purpose |
//! |---------------|---------|
//! | `models`      | Shared types: levels, problems, samples, metrics, recommendations |
//! | `ranges`      | Operand bounds and time limits per difficulty level |
//! | `distractors` | Plausible wrong answers with bounded retry and a fixed-offset fallback |
//! | `generator`   | `ProblemGenerator` — weighted operation choice, seeded RNG |
//! | `difficulty`  | `DifficultyEngine` — session metrics, trend, recommendation policy |
//! | `policy`      | Tunable thresholds, validation, `ConfigError` |

pub mod difficulty;
pub mod distractors;
pub mod generator;
pub mod models;
pub mod policy;
pub mod ranges;

// Re-export the public API surface so callers can use
// `exercise_engine::ProblemGenerator` without reaching into sub-modules.
pub use difficulty::DifficultyEngine;
pub use generator::ProblemGenerator;
pub use models::{
    DifficultyChange, DifficultyLevel, DifficultyRecommendation, MathProblem, Operation,
    PerformanceSample, PerformanceTrend, SessionMetrics, SessionSummary,
};
pub use policy::{ConfigError, GeneratorConfig, OperationWeights, PolicyConfig};
