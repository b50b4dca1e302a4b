//! Simulated practice session.
//!
//! Run with: `cargo run --example session`
//! (set `RUST_LOG=difficulty=debug` to watch the policy decide.)
//!
//! A scripted player answers rounds of problems. They start strong, then get
//! tired and slow down halfway through. After every round the session asks the
//! engine for a recommendation and applies it to the next round, the same loop
//! a game controller would run.
//!
//! ## Key concepts demonstrated
//!
//! - `ProblemGenerator::seeded(u64)` makes every problem reproducible.
//! - `PerformanceSample::for_problem` grades an answer and records its timing.
//! - `DifficultyLevel::adjusted` applies a recommendation with clamping.
//! - `client_payload` turns a problem into the JSON the client renders.

use math_drill_engine::{
    client_payload, DifficultyEngine, DifficultyLevel, PerformanceSample, ProblemGenerator,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ROUNDS: usize = 8;
const PROBLEMS_PER_ROUND: usize = 6;

fn main() {
    env_logger::init();

    let mut generator = ProblemGenerator::seeded(7);
    let mut engine = DifficultyEngine::new();
    let mut player = StdRng::seed_from_u64(99);
    let mut level = DifficultyLevel::new(2);

    let first = generator.generate_problem(level);
    println!("Sample client payload:");
    println!(
        "{}",
        serde_json::to_string_pretty(&client_payload::problem_payload(&first, &mut player))
            .unwrap_or_default()
    );
    println!();

    for round in 0..ROUNDS {
        let tired = round >= ROUNDS / 2;
        generator.set_difficulty(level);

        for _ in 0..PROBLEMS_PER_ROUND {
            let problem = generator.generate();
            let (accuracy, time) = if tired { (0.45, 9.5) } else { (0.95, 2.0) };
            let answer = if player.gen_bool(accuracy) {
                problem.correct_answer
            } else {
                problem.distractors[0]
            };
            let hints = if tired && player.gen_bool(0.5) { 1 } else { 0 };
            engine.record_performance(PerformanceSample::for_problem(
                &problem,
                answer,
                time + player.gen_range(-0.5..0.5),
                hints,
            ));
        }

        let metrics = engine.analyze_performance();
        let rec = engine.recommend_difficulty_adjustment(level);
        println!(
            "Round {}  {level}  accuracy {:>3.0}%  avg {:>4.1}s  streak {:>2}  trend {:<9}  → {} ({:.0}% sure)",
            round + 1,
            metrics.accuracy * 100.0,
            metrics.average_response_time,
            metrics.current_streak,
            metrics.trend.to_string(),
            rec.change,
            rec.confidence * 100.0,
        );
        for tip in &rec.help_suggestions {
            println!("          tip: {tip}");
        }
        level = level.adjusted(rec.change);
    }

    println!();
    println!("Session: {}", engine.generate_session_summary());
}
