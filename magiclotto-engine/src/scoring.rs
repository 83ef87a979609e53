use std::collections::BTreeMap;
use std::fmt;

use magiclotto_data::models::{Combination, DrawRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl Rank {
    pub const ALL: [Rank; 5] = [Rank::First, Rank::Second, Rank::Third, Rank::Fourth, Rank::Fifth];

    pub fn label(&self) -> &'static str {
        match self {
            Rank::First => "1st",
            Rank::Second => "2nd",
            Rank::Third => "3rd",
            Rank::Fourth => "4th",
            Rank::Fifth => "5th",
        }
    }

    /// Prize tier for `matches` shared numbers. The bonus only matters at 5.
    pub fn classify(matches: usize, bonus_hit: bool) -> Option<Rank> {
        match matches {
            6 => Some(Rank::First),
            5 if bonus_hit => Some(Rank::Second),
            5 => Some(Rank::Third),
            4 => Some(Rank::Fourth),
            3 => Some(Rank::Fifth),
            _ => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Occurrences per rank. Ranks that never occurred are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankTally {
    counts: BTreeMap<Rank, u32>,
}

impl RankTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, rank: Rank) {
        *self.counts.entry(rank).or_insert(0) += 1;
    }

    pub fn get(&self, rank: Rank) -> u32 {
        self.counts.get(&rank).copied().unwrap_or(0)
    }

    /// Non-zero entries, best rank first.
    pub fn iter(&self) -> impl Iterator<Item = (Rank, u32)> + '_ {
        self.counts.iter().map(|(&rank, &count)| (rank, count))
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

pub fn rank_for(combination: &Combination, draw: &DrawRecord) -> Option<Rank> {
    let matches = combination.matches(&draw.numbers);
    Rank::classify(matches, combination.contains(draw.bonus))
}

/// How `combination` would have fared against every past draw.
pub fn score_against_history(combination: &Combination, draws: &[DrawRecord]) -> RankTally {
    let mut tally = RankTally::new();
    for draw in draws {
        if let Some(rank) = rank_for(combination, draw) {
            tally.record(rank);
        }
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(round: u32, numbers: [u8; 6], bonus: u8) -> DrawRecord {
        DrawRecord::new(round, numbers, bonus).unwrap()
    }

    fn combo(numbers: &[u8]) -> Combination {
        Combination::new(numbers).unwrap()
    }

    #[test]
    fn test_exact_match_is_first() {
        let history = vec![draw(1, [1, 2, 3, 4, 5, 6], 7)];
        let tally = score_against_history(&combo(&[1, 2, 3, 4, 5, 6]), &history);
        assert_eq!(tally.get(Rank::First), 1);
        assert_eq!(tally.total(), 1);
        assert_eq!(tally.iter().collect::<Vec<_>>(), vec![(Rank::First, 1)]);
    }

    #[test]
    fn test_five_plus_bonus_is_second() {
        let history = vec![draw(1, [1, 2, 3, 4, 5, 6], 7)];
        let tally = score_against_history(&combo(&[1, 2, 3, 4, 5, 7]), &history);
        assert_eq!(tally.iter().collect::<Vec<_>>(), vec![(Rank::Second, 1)]);
    }

    #[test]
    fn test_five_without_bonus_is_third() {
        let history = vec![draw(1, [1, 2, 3, 4, 5, 6], 7)];
        let tally = score_against_history(&combo(&[1, 2, 3, 4, 5, 8]), &history);
        assert_eq!(tally.iter().collect::<Vec<_>>(), vec![(Rank::Third, 1)]);
    }

    #[test]
    fn test_lower_ranks_and_misses() {
        let history = vec![
            draw(1, [1, 2, 3, 4, 10, 11], 7),
            draw(2, [1, 2, 3, 20, 21, 22], 4),
            draw(3, [1, 2, 30, 31, 32, 33], 3),
            draw(4, [40, 41, 42, 43, 44, 45], 1),
        ];
        let tally = score_against_history(&combo(&[1, 2, 3, 4, 5, 6]), &history);
        assert_eq!(tally.get(Rank::Fourth), 1);
        assert_eq!(tally.get(Rank::Fifth), 1);
        // two matches plus the bonus still wins nothing
        assert_eq!(tally.total(), 2);
    }

    #[test]
    fn test_one_rank_per_draw() {
        let history: Vec<DrawRecord> = (1..=20)
            .map(|r| {
                let s = (r % 35) as u8 + 1;
                draw(r, [s, s + 2, s + 4, s + 6, s + 8, s + 10], s + 1)
            })
            .collect();
        let c = combo(&[3, 5, 7, 9, 11, 13]);
        let tally = score_against_history(&c, &history);
        let ranked = history.iter().filter(|d| rank_for(&c, d).is_some()).count() as u32;
        assert_eq!(tally.total(), ranked);
        assert!(tally.total() <= history.len() as u32);
    }

    #[test]
    fn test_empty_history() {
        let tally = score_against_history(&combo(&[1, 2, 3, 4, 5, 6]), &[]);
        assert!(tally.is_empty());
        assert_eq!(tally.get(Rank::First), 0);
    }

    #[test]
    fn test_classify() {
        assert_eq!(Rank::classify(6, true), Some(Rank::First));
        assert_eq!(Rank::classify(5, true), Some(Rank::Second));
        assert_eq!(Rank::classify(5, false), Some(Rank::Third));
        assert_eq!(Rank::classify(4, true), Some(Rank::Fourth));
        assert_eq!(Rank::classify(3, false), Some(Rank::Fifth));
        assert_eq!(Rank::classify(2, true), None);
        assert_eq!(Rank::First.to_string(), "1st");
    }
}
