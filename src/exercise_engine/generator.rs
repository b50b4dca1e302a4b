use log::{trace, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

use crate::exercise_engine::{
    distractors,
    models::{DifficultyLevel, MathProblem, Operation},
    policy::{ConfigError, GeneratorConfig},
    ranges::{operand_range, time_limit},
};

/// Draws for a non-negative subtraction pair before the last draw is reordered.
pub const MAX_SUBTRACTION_ATTEMPTS: usize = 32;

/// Produces arithmetic problems scaled to a difficulty level.
///
/// Owns its randomness source so tests can pin a seed; the game session owns
/// the generator. `set_difficulty` changes the level used by [`generate`].
///
/// [`generate`]: ProblemGenerator::generate
pub struct ProblemGenerator<R: Rng = StdRng> {
    rng: R,
    difficulty: DifficultyLevel,
    config: GeneratorConfig,
    issued: u32,
}

impl ProblemGenerator<StdRng> {
    /// Entropy-seeded generator with default weights, starting at level 1.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible generator: the same seed yields the same problem sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for ProblemGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ProblemGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        ProblemGenerator {
            rng,
            difficulty: DifficultyLevel::MIN,
            config: GeneratorConfig::default(),
            issued: 0,
        }
    }

    /// Generator with custom weights / distractor count.
    pub fn with_config(rng: R, config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(ProblemGenerator { config, ..Self::with_rng(rng) })
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, level: DifficultyLevel) {
        self.difficulty = level;
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// One problem at the stored default level.
    pub fn generate(&mut self) -> MathProblem {
        self.generate_problem(self.difficulty)
    }

    pub fn generate_problem(&mut self, difficulty: DifficultyLevel) -> MathProblem {
        let operation = self.pick_operation();
        let (a, b) = self.operands(operation, difficulty);
        self.build(operation, a, b, difficulty)
    }

    /// `count` independent problems; never fails partially.
    pub fn generate_problems(&mut self, difficulty: DifficultyLevel, count: usize) -> Vec<MathProblem> {
        (0..count).map(|_| self.generate_problem(difficulty)).collect()
    }

    pub fn is_correct(&self, problem: &MathProblem, answer: i64) -> bool {
        problem.is_correct(answer)
    }

    /// Weighted draw over the operations. Validated configs always have a
    /// non-zero weight; addition is the answer if one ever does not.
    fn pick_operation(&mut self) -> Operation {
        let weights = self.config.operation_weights;
        Operation::ALL
            .choose_weighted(&mut self.rng, |&op| weights.weight(op))
            .copied()
            .unwrap_or(Operation::Addition)
    }

    fn operands(&mut self, operation: Operation, difficulty: DifficultyLevel) -> (u32, u32) {
        let range = operand_range(operation, difficulty);
        let mut draw = || {
            (
                self.rng.gen_range(range.clone()),
                self.rng.gen_range(range.clone()),
            )
        };

        if operation != Operation::Subtraction {
            return draw();
        }

        let mut pair = draw();
        for _ in 1..MAX_SUBTRACTION_ATTEMPTS {
            if pair.0 >= pair.1 {
                return pair;
            }
            pair = draw();
        }
        if pair.0 < pair.1 {
            warn!(
                target: "generator",
                "no ordered subtraction pair after {MAX_SUBTRACTION_ATTEMPTS} draws at {difficulty}; reordering"
            );
            pair = (pair.1, pair.0);
        }
        pair
    }

    fn build(&mut self, operation: Operation, a: u32, b: u32, difficulty: DifficultyLevel) -> MathProblem {
        self.issued = self.issued.wrapping_add(1);
        let id = format!(
            "{}-{:04}-{:08X}",
            operation.id_prefix(),
            self.issued,
            self.rng.next_u32()
        );
        let distractors =
            distractors::generate(&mut self.rng, operation, a, b, self.config.distractor_count);

        let problem = MathProblem {
            id,
            operation,
            first_operand: a,
            second_operand: b,
            correct_answer: operation.apply(a, b),
            distractors,
            time_limit_secs: time_limit(difficulty),
            difficulty,
        };
        trace!(
            target: "generator",
            "{} {} (answer {}, distractors {:?})",
            problem.id,
            problem.prompt(),
            problem.correct_answer,
            problem.distractors
        );
        problem
    }
}
