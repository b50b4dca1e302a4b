//! Wrong-answer generation.
//!
//! Each problem gets a fixed number of distractors: the operation's classic
//! slip first, then small perturbations around the correct answer. Values are
//! non-negative and never repeat each other or the answer.

use log::warn;
use rand::Rng;

use crate::exercise_engine::models::Operation;

/// Attempts spent drawing perturbations before falling back to fixed offsets.
pub const MAX_DISTRACTOR_ATTEMPTS: usize = 64;

/// The mistake a learner most often makes for this operation.
///
/// - `+`: a dropped or doubled carry (answer ∓ 10)
/// - `-`: adding instead of subtracting
/// - `×`: reading off the neighbouring table row, `a × (b + 1)`
pub fn common_mistake(operation: Operation, a: u32, b: u32) -> i64 {
    let answer = operation.apply(a, b);
    match operation {
        Operation::Addition => {
            if answer >= 10 { answer - 10 } else { answer + 10 }
        }
        Operation::Subtraction    => a as i64 + b as i64,
        Operation::Multiplication => a as i64 * (b as i64 + 1),
    }
}

/// How far perturbations may stray from the answer.
pub fn spread(answer: i64) -> i64 {
    (answer.abs() / 10).max(3)
}

/// Build `count` distinct distractors for `a <op> b`.
pub fn generate<R: Rng>(
    rng: &mut R,
    operation: Operation,
    a: u32,
    b: u32,
    count: usize,
) -> Vec<i64> {
    let answer = operation.apply(a, b);
    let mut out: Vec<i64> = Vec::with_capacity(count);

    let accept = |out: &Vec<i64>, candidate: i64| {
        candidate >= 0 && candidate != answer && !out.contains(&candidate)
    };

    let mistake = common_mistake(operation, a, b);
    if count > 0 && accept(&out, mistake) {
        out.push(mistake);
    }

    let max_offset = spread(answer);
    let mut attempts = 0;
    while out.len() < count && attempts < MAX_DISTRACTOR_ATTEMPTS {
        attempts += 1;
        let offset = rng.gen_range(1..=max_offset);
        let candidate = if rng.gen_bool(0.5) { answer + offset } else { answer - offset };
        if accept(&out, candidate) {
            out.push(candidate);
        }
    }

    if out.len() < count {
        warn!(
            target: "distractors",
            "retry budget exhausted for {a} {} {b}; filling with fixed offsets",
            operation.symbol()
        );
        let mut offset = 1;
        while out.len() < count {
            let candidate = answer + offset;
            if accept(&out, candidate) {
                out.push(candidate);
            }
            offset += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_valid(distractors: &[i64], answer: i64, count: usize) {
        assert_eq!(distractors.len(), count);
        for (i, d) in distractors.iter().enumerate() {
            assert_ne!(*d, answer, "distractor equals the answer");
            assert!(*d >= 0, "negative distractor {d}");
            assert!(!distractors[i + 1..].contains(d), "duplicate distractor {d}");
        }
    }

    #[test]
    fn mistakes_differ_from_answer() {
        assert_eq!(common_mistake(Operation::Addition, 8, 7), 5);
        assert_eq!(common_mistake(Operation::Addition, 2, 3), 15);
        assert_eq!(common_mistake(Operation::Subtraction, 9, 4), 13);
        assert_eq!(common_mistake(Operation::Multiplication, 6, 7), 48);
    }

    #[test]
    fn mistake_comes_first() {
        let mut rng = StdRng::seed_from_u64(3);
        let d = generate(&mut rng, Operation::Subtraction, 20, 5, 3);
        assert_eq!(d[0], 25);
        assert_valid(&d, 15, 3);
    }

    #[test]
    fn zero_answer_still_gets_distinct_distractors() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let d = generate(&mut rng, Operation::Subtraction, 4, 4, 3);
            assert_valid(&d, 0, 3);
        }
    }

    #[test]
    fn large_counts_fall_back_to_offsets() {
        // Spread around 1 is 3, so only a handful of perturbations exist.
        let mut rng = StdRng::seed_from_u64(11);
        let d = generate(&mut rng, Operation::Multiplication, 1, 1, 8);
        assert_valid(&d, 1, 8);
    }

    #[test]
    fn same_seed_same_distractors() {
        let make = |seed| generate(&mut StdRng::seed_from_u64(seed), Operation::Addition, 37, 45, 3);
        assert_eq!(make(9), make(9));
    }
}
