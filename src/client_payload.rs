//! JSON payloads for the game client.
//!
//! The client renders problems as multiple-choice cards and shows a short
//! coaching panel between rounds. These builders flatten the engine's types
//! into the camelCase shape that client reads.

use rand::Rng;
use serde_json::{json, Value};

use crate::exercise_engine::models::{
    DifficultyChange, DifficultyRecommendation, MathProblem, SessionSummary,
};

/// Build one answer-choice entry.
fn choice(index: usize, value: i64) -> Value {
    json!({ "id": index, "label": value.to_string(), "value": value })
}

/// Client-side tag for a change, plus the number of levels it moves.
fn change_fields(change: DifficultyChange) -> (&'static str, i32) {
    let kind = match change {
        DifficultyChange::Increase(_)      => "increase",
        DifficultyChange::Decrease(_)      => "decrease",
        DifficultyChange::Maintain         => "maintain",
        DifficultyChange::AdaptiveIncrease => "adaptiveIncrease",
        DifficultyChange::AdaptiveDecrease => "adaptiveDecrease",
    };
    (kind, change.delta())
}

/// A problem card with its choices shuffled by `rng`.
///
/// The correct answer is deliberately left out; the client reports the chosen
/// value back and the session grades it with [`MathProblem::is_correct`].
pub fn problem_payload<R: Rng>(problem: &MathProblem, rng: &mut R) -> Value {
    let choices: Vec<Value> = problem
        .answer_choices(rng)
        .into_iter()
        .enumerate()
        .map(|(i, v)| choice(i, v))
        .collect();

    json!({
        "type": "MathProblem",
        "problemId": problem.id,
        "operation": problem.operation.symbol(),
        "operands": [problem.first_operand, problem.second_operand],
        "prompt": problem.prompt(),
        "choices": choices,
        "timeLimit": { "secs": problem.time_limit_secs },
        "difficulty": problem.difficulty.value()
    })
}

pub fn recommendation_payload(recommendation: &DifficultyRecommendation) -> Value {
    let (kind, levels) = change_fields(recommendation.change);
    json!({
        "type": "DifficultyRecommendation",
        "change": kind,
        "levels": levels,
        "confidence": recommendation.confidence,
        "helpSuggestions": recommendation.help_suggestions
    })
}

pub fn summary_payload(summary: &SessionSummary) -> Value {
    json!({
        "type": "SessionSummary",
        "totalProblems": summary.total_problems,
        "correctAnswers": summary.correct_answers,
        "averageTime": summary.average_time,
        "helpUsed": summary.help_used,
        "text": summary.to_string()
    })
}
