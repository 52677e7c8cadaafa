// The leveling curve. Pure math, no side effects.
//
// Cumulative XP needed for level n is round(n * log10(n) * 1000):
//
//   level 1 =     0 XP
//   level 2 =   602 XP
//   level 3 = 1,431 XP
//   level 4 = 2,408 XP
//   level 5 = 3,495 XP
//
// The per-level step keeps growing, so higher levels cost super-linearly more.

/// Cumulative XP required to reach `level`. Levels below 1 cost nothing.
pub fn xp_threshold(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    let n = f64::from(level);
    (n * n.log10() * 1000.0).round() as u64
}

/// Levels stop here. Its threshold is about 6 billion XP, so real records
/// never reach it, but a corrupt one cannot keep the ascent going forever.
pub const MAX_LEVEL: u32 = 1_000_000;

/// Largest level whose threshold is at most `xp`. Never below 1, never above
/// [`MAX_LEVEL`].
///
/// Linear ascent is fine here: a million XP is still under level 400.
pub fn level_for_xp(xp: u64) -> u32 {
    let mut level = 1;
    while level < MAX_LEVEL && xp_threshold(level + 1) <= xp {
        level += 1;
    }
    level
}

/// Where a user sits between their current and next level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelProgress {
    pub level: u32,
    pub xp: u64,
    pub current_threshold: u64,
    pub next_threshold: u64,
}

impl LevelProgress {
    pub fn for_xp(xp: u64) -> Self {
        let level = level_for_xp(xp);
        Self {
            level,
            xp,
            current_threshold: xp_threshold(level),
            next_threshold: xp_threshold(level + 1),
        }
    }

    pub fn xp_to_next_level(&self) -> u64 {
        self.next_threshold.saturating_sub(self.xp)
    }

    /// Fraction of the way from the current level to the next, 0.0..1.0.
    pub fn ratio(&self) -> f64 {
        let span = self.next_threshold.saturating_sub(self.current_threshold);
        if span == 0 {
            return 0.0;
        }
        (self.xp.saturating_sub(self.current_threshold)) as f64 / span as f64
    }

    /// Ten-segment bar used on profile cards.
    pub fn bar(&self) -> String {
        let filled = ((self.ratio() * 10.0).round() as usize).min(10);
        format!(
            "{}{}",
            ":white_large_square:".repeat(filled),
            ":black_large_square:".repeat(10 - filled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_match_the_closed_form() {
        assert_eq!(xp_threshold(1), 0);
        assert_eq!(xp_threshold(2), 602);
        assert_eq!(xp_threshold(3), 1431);
        assert_eq!(xp_threshold(10), 10000);
    }

    #[test]
    fn thresholds_are_strictly_increasing() {
        for level in 1..500 {
            assert!(xp_threshold(level + 1) > xp_threshold(level));
        }
    }

    #[test]
    fn steps_grow_super_linearly() {
        let step = |n| xp_threshold(n + 1) - xp_threshold(n);
        for level in 2..100 {
            assert!(step(level + 1) > step(level));
        }
    }

    #[test]
    fn level_boundaries_are_exact() {
        for level in 1..300 {
            assert_eq!(level_for_xp(xp_threshold(level)), level);
        }
        for level in 2..300 {
            assert_eq!(level_for_xp(xp_threshold(level) - 1), level - 1);
        }
    }

    #[test]
    fn zero_xp_is_level_one() {
        assert_eq!(level_for_xp(0), 1);
    }

    #[test]
    fn level_for_xp_terminates_for_large_values() {
        let level = level_for_xp(1_000_000_000);
        assert!(xp_threshold(level) <= 1_000_000_000);
        assert!(xp_threshold(level + 1) > 1_000_000_000);
    }

    #[test]
    fn huge_xp_saturates_at_the_level_cap() {
        assert_eq!(level_for_xp(xp_threshold(u32::MAX)), MAX_LEVEL);
        assert_eq!(level_for_xp(u64::MAX), MAX_LEVEL);
        assert_eq!(level_for_xp(xp_threshold(MAX_LEVEL)), MAX_LEVEL);
        assert_eq!(level_for_xp(xp_threshold(MAX_LEVEL) - 1), MAX_LEVEL - 1);

        let progress = LevelProgress::for_xp(u64::MAX);
        assert_eq!(progress.level, MAX_LEVEL);
        assert_eq!(progress.xp_to_next_level(), 0);
    }

    #[test]
    fn progress_tracks_distance_to_next_level() {
        let progress = LevelProgress::for_xp(1000);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.current_threshold, 602);
        assert_eq!(progress.next_threshold, 1431);
        assert_eq!(progress.xp_to_next_level(), 431);
        assert!(progress.ratio() > 0.4 && progress.ratio() < 0.5);
        assert_eq!(progress.bar().matches(":white_large_square:").count(), 5);
        assert_eq!(progress.bar().matches(":black_large_square:").count(), 5);
    }
}
