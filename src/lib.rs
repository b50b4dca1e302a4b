//! # math_drill_engine
//!
//! An offline, deterministic-when-seeded engine for adaptive arithmetic practice.
//!
//! The crate has two independent parts that a game session wires together:
//!
//! - [`ProblemGenerator`] turns a [`DifficultyLevel`] into a [`MathProblem`]:
//!   operands scaled to the level, the correct answer, a fixed number of
//!   plausible distractors and an advisory time limit.
//! - [`DifficultyEngine`] records a [`PerformanceSample`] per answer, derives
//!   [`SessionMetrics`] (accuracy, speed, streak, trend) and recommends how the
//!   level should move, with a confidence score and coaching tips.
//!
//! Neither part knows about the other. The session owns one of each, grades
//! each answer, records it, and applies recommendations to the next problem.
//!
//! ## Quick start
//!
//! ```rust
//! use math_drill_engine::{
//!     DifficultyEngine, DifficultyLevel, PerformanceSample, ProblemGenerator,
//! };
//!
//! let mut generator = ProblemGenerator::seeded(42);
//! let mut engine = DifficultyEngine::new();
//! let mut level = DifficultyLevel::new(3);
//!
//! for _ in 0..10 {
//!     let problem = generator.generate_problem(level);
//!     // ... show problem.prompt() and problem.distractors, collect an answer ...
//!     let answer = problem.correct_answer;
//!     engine.record_performance(PerformanceSample::for_problem(&problem, answer, 2.0, 0));
//! }
//!
//! let rec = engine.recommend_difficulty_adjustment(level);
//! level = level.adjusted(rec.change);
//! println!("next: {level} ({:.0}% sure)", rec.confidence * 100.0);
//! println!("{}", engine.generate_session_summary());
//! ```
//!
//! Logging goes through the `log` facade (targets `generator`, `distractors`,
//! `difficulty`); install any logger in the host to see it.

pub mod client_payload;
pub mod exercise_engine;

// Convenience re-exports so callers can use `math_drill_engine::ProblemGenerator`
// directly without reaching into `exercise_engine::`.
pub use exercise_engine::{
    ConfigError, DifficultyChange, DifficultyEngine, DifficultyLevel, DifficultyRecommendation,
    GeneratorConfig, MathProblem, Operation, OperationWeights, PerformanceSample,
    PerformanceTrend, PolicyConfig, ProblemGenerator, SessionMetrics, SessionSummary,
};
