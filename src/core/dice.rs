//! Dice rolling - parses `[count]d<sides>` expressions and rolls them.
//!
//! Rolls coming from chat are gated by an expected set of values: an expression is only
//! honored when its count or its sides appear in that set (initiative accepts `1d20`,
//! `d20`, `3d1` and the like, but not `4d6`). A rejected roll yields `0` so callers can
//! keep waiting for a valid one.

use crate::errors::{Error, Result};
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

/// Largest number of dice a single expression may roll.
pub const MAX_DICE: u32 = 100;
/// Largest die size accepted.
pub const MAX_SIDES: u32 = 1000;

/// Values accepted for an initiative roll: a d20, or a single die.
pub const INITIATIVE_EXPECTED: [u32; 2] = [1, 20];

#[allow(clippy::unwrap_used)]
static DICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([1-9][0-9]*)?[dD]([1-9][0-9]*)$").unwrap());

/// A parsed dice expression such as `2d6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceExpr {
    /// How many dice are rolled
    pub count: u32,
    /// Number of faces on each die
    pub sides: u32,
}

impl DiceExpr {
    /// Parses `[count]d<sides>`. A missing count means one die.
    pub fn parse(expression: &str) -> Result<Self> {
        let invalid = || Error::InvalidDice {
            expression: expression.to_string(),
        };

        let captures = DICE_PATTERN.captures(expression.trim()).ok_or_else(invalid)?;
        let count = match captures.get(1) {
            Some(m) => m.as_str().parse::<u32>().map_err(|_| invalid())?,
            None => 1,
        };
        let sides = captures[2].parse::<u32>().map_err(|_| invalid())?;

        if count > MAX_DICE || sides > MAX_SIDES {
            return Err(invalid());
        }
        Ok(Self { count, sides })
    }

    /// Lowest possible total.
    #[must_use]
    pub const fn min(self) -> u32 {
        self.count
    }

    /// Highest possible total.
    #[must_use]
    pub const fn max(self) -> u32 {
        self.count * self.sides
    }

    /// Sums `count` independent draws over `1..=sides`.
    pub fn roll<R: Rng>(self, rng: &mut R) -> u32 {
        (0..self.count).map(|_| rng.random_range(1..=self.sides)).sum()
    }

    fn intersects(self, expected: &[u32]) -> bool {
        expected.contains(&self.count) || expected.contains(&self.sides)
    }
}

impl std::fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// Rolls a chat-supplied dice expression.
///
/// Returns `Ok(0)` for an empty expression, or when neither the count nor the sides of the
/// expression are in `expected`. A malformed expression is an [`Error::InvalidDice`] that
/// the caller is expected to turn into a re-prompt.
pub fn roll<R: Rng>(expression: &str, expected: &[u32], rng: &mut R) -> Result<u32> {
    if expression.trim().is_empty() {
        return Ok(0);
    }

    let dice = DiceExpr::parse(expression)?;
    if !dice.intersects(expected) {
        tracing::debug!(%dice, ?expected, "Rejected roll outside the expected set");
        return Ok(0);
    }
    Ok(dice.roll(rng))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_parse_with_and_without_count() {
        assert_eq!(
            DiceExpr::parse("2d6").unwrap(),
            DiceExpr { count: 2, sides: 6 }
        );
        assert_eq!(
            DiceExpr::parse("d20").unwrap(),
            DiceExpr { count: 1, sides: 20 }
        );
        assert_eq!(
            DiceExpr::parse("D8").unwrap(),
            DiceExpr { count: 1, sides: 8 }
        );
        assert_eq!(
            DiceExpr::parse("10d4").unwrap(),
            DiceExpr { count: 10, sides: 4 }
        );
    }

    #[test]
    fn test_parse_rejects_malformed_expressions() {
        for bad in ["20", "d", "1d", "0d6", "1d0", "abc", "1d20+5", "-1d6", "101d6", "1d1001"] {
            let result = DiceExpr::parse(bad);
            assert!(
                matches!(result, Err(Error::InvalidDice { .. })),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_roll_empty_expression_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(roll("", &INITIATIVE_EXPECTED, &mut rng).unwrap(), 0);
    }

    #[test]
    fn test_roll_propagates_parse_failure() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(roll("twenty", &INITIATIVE_EXPECTED, &mut rng).is_err());
    }

    #[test]
    fn test_roll_within_bounds_when_expected() {
        let mut rng = StdRng::seed_from_u64(7);
        for expression in ["1d20", "d20", "3d20", "1d6", "5d1", "20d3"] {
            let dice = DiceExpr::parse(expression).unwrap();
            for _ in 0..200 {
                let total = roll(expression, &INITIATIVE_EXPECTED, &mut rng).unwrap();
                assert!(
                    (dice.min()..=dice.max()).contains(&total),
                    "{expression} rolled {total}"
                );
            }
        }
    }

    #[test]
    fn test_roll_outside_expected_set_is_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        for expression in ["4d6", "2d8", "3d12", "2d100"] {
            assert_eq!(roll(expression, &INITIATIVE_EXPECTED, &mut rng).unwrap(), 0);
        }
    }

    #[test]
    fn test_single_sided_dice_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(roll("15d1", &INITIATIVE_EXPECTED, &mut rng).unwrap(), 15);
    }
}
