use std::ops::RangeInclusive;

use crate::exercise_engine::models::{DifficultyLevel, Operation};

pub const BASE_TIME_LIMIT_SECS: u32 = 30;
pub const TIME_LIMIT_STEP_SECS: u32 = 3;
pub const MIN_TIME_LIMIT_SECS: u32 = 8;

/// Operand bounds for `operation` at `level`.
///
/// Both ends are non-decreasing in the level, so a harder level never draws
/// smaller numbers on average.
///
/// | Level | `+` / `-` | `×` |
/// |-------|-----------|-----|
/// | 1     | 1..=10    | 1..=4 |
/// | 5     | 20..=50   | 2..=8 |
/// | 10    | 45..=100  | 4..=13 |
pub fn operand_range(operation: Operation, level: DifficultyLevel) -> RangeInclusive<u32> {
    let l = level.value() as u32;
    match operation {
        Operation::Addition | Operation::Subtraction => {
            let min = (5 * (l - 1)).max(1);
            min..=10 * l
        }
        Operation::Multiplication => (1 + (l - 1) / 3)..=(3 + l),
    }
}

/// Advisory seconds to answer; shrinks with level, floored at the minimum.
pub fn time_limit(level: DifficultyLevel) -> u32 {
    let reduction = TIME_LIMIT_STEP_SECS * (level.value() as u32 - 1);
    BASE_TIME_LIMIT_SECS
        .saturating_sub(reduction)
        .max(MIN_TIME_LIMIT_SECS)
}
