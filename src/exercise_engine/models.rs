use std::fmt;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Ordinal difficulty, always inside `MIN..=MAX`.
///
/// Higher levels mean wider operand ranges and shorter time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct DifficultyLevel(u8);

impl DifficultyLevel {
    pub const MIN: DifficultyLevel = DifficultyLevel(1);
    pub const MAX: DifficultyLevel = DifficultyLevel(10);

    /// Build a level, clamping anything outside `MIN..=MAX`.
    pub fn new(level: i32) -> Self {
        let clamped = level.clamp(Self::MIN.0 as i32, Self::MAX.0 as i32);
        DifficultyLevel(clamped as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_max(self) -> bool {
        self == Self::MAX
    }

    pub fn is_min(self) -> bool {
        self == Self::MIN
    }

    /// Apply a recommended change, clamped to the supported range.
    pub fn adjusted(self, change: DifficultyChange) -> Self {
        Self::new(self.0 as i32 + change.delta())
    }
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<i32> for DifficultyLevel {
    fn from(level: i32) -> Self {
        Self::new(level)
    }
}

impl From<DifficultyLevel> for i32 {
    fn from(level: DifficultyLevel) -> Self {
        level.0 as i32
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Problems
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Addition       => "+",
            Operation::Subtraction    => "-",
            Operation::Multiplication => "×",
        }
    }

    /// Short id prefix used in problem ids (e.g. `ADD-0001-1A2B3C4D`).
    pub fn id_prefix(self) -> &'static str {
        match self {
            Operation::Addition       => "ADD",
            Operation::Subtraction    => "SUB",
            Operation::Multiplication => "MUL",
        }
    }

    pub fn apply(self, a: u32, b: u32) -> i64 {
        let (a, b) = (a as i64, b as i64);
        match self {
            Operation::Addition       => a + b,
            Operation::Subtraction    => a - b,
            Operation::Multiplication => a * b,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Addition       => write!(f, "Addition"),
            Operation::Subtraction    => write!(f, "Subtraction"),
            Operation::Multiplication => write!(f, "Multiplication"),
        }
    }
}

/// One generated problem. Never mutated after the generator hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathProblem {
    pub id: String,
    pub operation: Operation,
    pub first_operand: u32,
    pub second_operand: u32,
    pub correct_answer: i64,
    /// Plausible wrong answers; distinct from each other and from `correct_answer`.
    pub distractors: Vec<i64>,
    /// Advisory only: the caller runs the clock.
    pub time_limit_secs: u32,
    pub difficulty: DifficultyLevel,
}

impl MathProblem {
    pub fn is_correct(&self, answer: i64) -> bool {
        answer == self.correct_answer
    }

    /// Question text, e.g. `"7 + 5 = ?"`.
    pub fn prompt(&self) -> String {
        format!(
            "{} {} {} = ?",
            self.first_operand,
            self.operation.symbol(),
            self.second_operand
        )
    }

    /// Correct answer plus distractors in random order, ready for a
    /// multiple-choice presentation.
    pub fn answer_choices<R: rand::Rng>(&self, rng: &mut R) -> Vec<i64> {
        use rand::seq::SliceRandom;

        let mut choices = Vec::with_capacity(self.distractors.len() + 1);
        choices.push(self.correct_answer);
        choices.extend_from_slice(&self.distractors);
        choices.shuffle(rng);
        choices
    }
}

// ---------------------------------------------------------------------------
// Performance tracking
// ---------------------------------------------------------------------------

/// What happened when the player answered one problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    /// Opaque key back to the [`MathProblem`]; the engine never dereferences it.
    pub problem_id: String,
    pub correct: bool,
    pub response_time_secs: f64,
    pub hints_used: u32,
}

impl PerformanceSample {
    /// Negative or non-finite response times are recorded as 0.
    pub fn new(
        problem_id: impl Into<String>,
        correct: bool,
        response_time_secs: f64,
        hints_used: u32,
    ) -> Self {
        PerformanceSample {
            problem_id: problem_id.into(),
            correct,
            response_time_secs: clean_response_time(response_time_secs),
            hints_used,
        }
    }

    /// Grade `answer` against `problem` and wrap the outcome as a sample.
    pub fn for_problem(
        problem: &MathProblem,
        answer: i64,
        response_time_secs: f64,
        hints_used: u32,
    ) -> Self {
        Self::new(
            problem.id.clone(),
            problem.is_correct(answer),
            response_time_secs,
            hints_used,
        )
    }

    pub fn used_help(&self) -> bool {
        self.hints_used > 0
    }
}

/// Response time as the engine counts it: negative or non-finite becomes 0.
pub fn clean_response_time(secs: f64) -> f64 {
    if secs.is_finite() {
        secs.max(0.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTrend {
    Improving,
    Declining,
    Stable,
}

impl fmt::Display for PerformanceTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceTrend::Improving => write!(f, "improving"),
            PerformanceTrend::Declining => write!(f, "declining"),
            PerformanceTrend::Stable    => write!(f, "stable"),
        }
    }
}

/// Aggregate view of the current session, recomputed on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub average_response_time: f64,
    /// Fraction of correct answers, 0.0..=1.0.
    pub accuracy: f64,
    pub current_streak: usize,
    pub trend: PerformanceTrend,
    pub sample_count: usize,
    /// Fraction of samples where at least one hint was used.
    pub hint_usage_rate: f64,
}

impl SessionMetrics {
    pub fn empty() -> Self {
        SessionMetrics {
            average_response_time: 0.0,
            accuracy: 0.0,
            current_streak: 0,
            trend: PerformanceTrend::Stable,
            sample_count: 0,
            hint_usage_rate: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount")]
pub enum DifficultyChange {
    Increase(u8),
    Decrease(u8),
    Maintain,
    /// Large margin above target: jump by [`DifficultyChange::ADAPTIVE_STEP`].
    AdaptiveIncrease,
    /// Player is clearly struggling: drop by [`DifficultyChange::ADAPTIVE_STEP`].
    AdaptiveDecrease,
}

impl DifficultyChange {
    pub const ADAPTIVE_STEP: i32 = 2;

    /// Signed number of levels this change moves.
    pub fn delta(self) -> i32 {
        match self {
            DifficultyChange::Increase(n)      => n as i32,
            DifficultyChange::Decrease(n)      => -(n as i32),
            DifficultyChange::Maintain         => 0,
            DifficultyChange::AdaptiveIncrease => Self::ADAPTIVE_STEP,
            DifficultyChange::AdaptiveDecrease => -Self::ADAPTIVE_STEP,
        }
    }

    pub fn is_increase(self) -> bool {
        self.delta() > 0
    }

    pub fn is_decrease(self) -> bool {
        self.delta() < 0
    }
}

impl fmt::Display for DifficultyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyChange::Increase(n)      => write!(f, "increase by {n}"),
            DifficultyChange::Decrease(n)      => write!(f, "decrease by {n}"),
            DifficultyChange::Maintain         => write!(f, "maintain"),
            DifficultyChange::AdaptiveIncrease => write!(f, "adaptive increase"),
            DifficultyChange::AdaptiveDecrease => write!(f, "adaptive decrease"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyRecommendation {
    pub change: DifficultyChange,
    /// 0.0..=1.0; grows with sample count, shrinks near band boundaries.
    pub confidence: f64,
    /// Only populated for decreases.
    pub help_suggestions: Vec<String>,
}

impl DifficultyRecommendation {
    pub fn maintain(confidence: f64) -> Self {
        DifficultyRecommendation {
            change: DifficultyChange::Maintain,
            confidence: confidence.clamp(0.0, 1.0),
            help_suggestions: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_problems: usize,
    pub correct_answers: usize,
    pub average_time: f64,
    /// Number of problems where at least one hint was used.
    pub help_used: usize,
}

impl SessionSummary {
    pub fn accuracy(&self) -> f64 {
        if self.total_problems == 0 {
            return 0.0;
        }
        self.correct_answers as f64 / self.total_problems as f64
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} correct ({:.0}%), average {:.1}s per problem, help used on {}",
            self.correct_answers,
            self.total_problems,
            self.accuracy() * 100.0,
            self.average_time,
            self.help_used,
        )
    }
}
