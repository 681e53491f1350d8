//! Scoring: (n - 2)^2 per removed region of n tiles.

/// Score for removing `n` tiles at once. Zero below two tiles; saturates at `u32::MAX`.
pub fn score_for_removal(n: usize) -> u32 {
    u32::try_from(n)
        .unwrap_or(u32::MAX)
        .saturating_sub(2)
        .saturating_pow(2)
}

/// Running total for one game. Never decreases until reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreKeeper {
    total: u32,
    removals: u32,
}

impl ScoreKeeper {
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Regions removed this game.
    pub fn removals(&self) -> u32 {
        self.removals
    }

    pub fn add_score(&mut self, delta: u32) {
        self.total = self.total.saturating_add(delta);
    }

    /// Credit a removal of `n` tiles and return the delta.
    pub fn record_removal(&mut self, n: usize) -> u32 {
        let delta = score_for_removal(n);
        self.add_score(delta);
        self.removals += 1;
        delta
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_formula() {
        let expected = [0, 0, 0, 1, 4, 9];
        for (n, want) in expected.into_iter().enumerate() {
            assert_eq!(score_for_removal(n), want, "n = {n}");
        }
        assert_eq!(score_for_removal(500), 498 * 498);
    }

    #[test]
    fn test_score_saturates_for_huge_regions() {
        assert_eq!(score_for_removal(65_537), 65_535 * 65_535);
        assert_eq!(score_for_removal(70_000), u32::MAX);
        assert_eq!(score_for_removal(usize::MAX), u32::MAX);
        assert_eq!(score_for_removal(u32::MAX as usize + 3), u32::MAX);
    }

    #[test]
    fn test_keeper_accumulates() {
        let mut keeper = ScoreKeeper::default();
        assert_eq!(keeper.record_removal(4), 4);
        assert_eq!(keeper.record_removal(2), 0);
        assert_eq!(keeper.record_removal(7), 25);
        assert_eq!(keeper.total(), 29);
        assert_eq!(keeper.removals(), 3);
        keeper.reset();
        assert_eq!(keeper, ScoreKeeper::default());
    }
}
