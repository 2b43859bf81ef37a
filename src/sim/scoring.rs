//! Level scoring
//!
//! Score is awarded once, when a level ends with the goal reached. Fewer
//! wells earn a multiplier and a quick finish earns a decaying time bonus.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Components of a level score, kept for the level-complete screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: u64,
    pub collectibles: u64,
    pub time_bonus: u64,
    pub multiplier: u64,
    pub total: u64,
}

/// Time bonus: one point lost per elapsed second, floored at zero
pub fn time_bonus(elapsed_ticks: u64) -> u64 {
    TIME_BONUS_MAX.saturating_sub(elapsed_ticks / TICKS_PER_SECOND)
}

/// Efficiency multiplier: `max(1, 4 - wells_used)`
pub fn efficiency_multiplier(wells_used: u32) -> u64 {
    EFFICIENCY_BASE.saturating_sub(wells_used as u64).max(1)
}

/// Score one completed level
pub fn level_score(collected: u32, elapsed_ticks: u64, wells_used: u32) -> ScoreBreakdown {
    let base = LEVEL_BASE_SCORE;
    let collectibles = collected as u64 * COLLECTIBLE_SCORE;
    let time_bonus = time_bonus(elapsed_ticks);
    let multiplier = efficiency_multiplier(wells_used);

    ScoreBreakdown {
        base,
        collectibles,
        time_bonus,
        multiplier,
        total: (base + collectibles + time_bonus) * multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_score_fixture() {
        let score = level_score(2, 120, 1);
        assert_eq!(score.time_bonus, 498);
        assert_eq!(score.multiplier, 3);
        assert_eq!(score.total, 5694);
    }

    #[test]
    fn test_time_bonus_floors_at_zero() {
        assert_eq!(time_bonus(0), 500);
        assert_eq!(time_bonus(59), 500);
        assert_eq!(time_bonus(60), 499);
        assert_eq!(time_bonus(60 * 10_000), 0);
    }

    #[test]
    fn test_multiplier_never_below_one() {
        assert_eq!(efficiency_multiplier(0), 4);
        assert_eq!(efficiency_multiplier(3), 1);
        assert_eq!(efficiency_multiplier(5), 1);
    }
}
