use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use magiclotto_data::models::{Combination, DrawRecord, MAX_NUMBER, MIN_NUMBER, PICK_COUNT};

use crate::frequency::{consecutive_candidates, top_frequent, FREQUENCY_POOL_SIZE};

/// Upper bound on candidates drawn while avoiding past winning sets.
pub const MAX_ATTEMPTS: usize = 1000;

const HYBRID_POOL_PICKS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Six numbers drawn uniformly from 1-45
    Random,
    /// Six numbers from the 30 most frequent winning numbers
    Frequency,
    /// Six numbers that appeared in consecutive pairs
    Consecutive,
    /// Three frequent numbers plus three random ones
    Hybrid,
    /// A combination supplied by the user
    Manual,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Random,
        Method::Frequency,
        Method::Consecutive,
        Method::Hybrid,
        Method::Manual,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Method::Random => "random",
            Method::Frequency => "frequency",
            Method::Consecutive => "consecutive",
            Method::Hybrid => "hybrid",
            Method::Manual => "manual",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Method::Random => "Six numbers drawn uniformly at random from 1-45.",
            Method::Frequency => {
                "Picked at random among the 30 numbers that won most often across all past draws."
            }
            Method::Consecutive => {
                "Picked among numbers that came out as part of a consecutive pair in past draws."
            }
            Method::Hybrid => {
                "Three numbers from the 30 most frequent winners plus three drawn at random."
            }
            Method::Manual => "The combination you entered.",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "random" | "uniform" | "rand" => Ok(Method::Random),
            "frequency" | "freq" | "ai" => Ok(Method::Frequency),
            "consecutive" | "consec" | "pairs" => Ok(Method::Consecutive),
            "hybrid" | "mix" | "ai+random" => Ok(Method::Hybrid),
            "manual" | "man" => Ok(Method::Manual),
            other => bail!("Unknown method '{}'", other),
        }
    }
}

/// Sorted winning sets that a recommendation must not repeat.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    combinations: HashSet<Combination>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_history(draws: &[DrawRecord]) -> Self {
        Self {
            combinations: draws.iter().map(DrawRecord::combination).collect(),
        }
    }

    pub fn insert(&mut self, combination: Combination) -> bool {
        self.combinations.insert(combination)
    }

    pub fn contains(&self, combination: &Combination) -> bool {
        self.combinations.contains(combination)
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub combination: Combination,
    pub method: Method,
    pub attempts: usize,
    /// Set when every attempt hit the exclusion set and the last one was kept.
    pub exclusion_relaxed: bool,
}

// History-derived pools, computed once per request.
enum Strategy<'a> {
    Uniform,
    Pool(Vec<u8>),
    Hybrid(Vec<u8>),
    Fixed(&'a Combination),
}

impl<'a> Strategy<'a> {
    fn build(method: Method, draws: &[DrawRecord], manual: Option<&'a Combination>) -> Result<Self> {
        let strategy = match method {
            Method::Random => Strategy::Uniform,
            Method::Frequency => {
                let pool = top_frequent(draws, FREQUENCY_POOL_SIZE);
                if pool.len() < PICK_COUNT {
                    debug!(pool = pool.len(), "frequency pool too small, using uniform draw");
                    Strategy::Uniform
                } else {
                    Strategy::Pool(pool)
                }
            }
            Method::Consecutive => {
                let pool = consecutive_candidates(draws);
                if pool.len() < PICK_COUNT {
                    debug!(pool = pool.len(), "too few consecutive candidates, using uniform draw");
                    Strategy::Uniform
                } else {
                    Strategy::Pool(pool)
                }
            }
            Method::Hybrid => {
                let pool = top_frequent(draws, FREQUENCY_POOL_SIZE);
                if pool.len() < HYBRID_POOL_PICKS {
                    Strategy::Uniform
                } else {
                    Strategy::Hybrid(pool)
                }
            }
            Method::Manual => match manual {
                Some(combination) => Strategy::Fixed(combination),
                None => bail!("Manual method needs a combination"),
            },
        };
        Ok(strategy)
    }

    fn is_fixed(&self) -> bool {
        matches!(self, Strategy::Fixed(_))
    }

    fn draw(&self, rng: &mut StdRng) -> Result<Combination> {
        match self {
            Strategy::Uniform => Combination::new(&sample_from(&full_range(), PICK_COUNT, rng)),
            Strategy::Pool(pool) => Combination::new(&sample_from(pool, PICK_COUNT, rng)),
            Strategy::Hybrid(pool) => {
                let mut picks = sample_from(pool, HYBRID_POOL_PICKS, rng);
                let rest: Vec<u8> = full_range()
                    .into_iter()
                    .filter(|n| !picks.contains(n))
                    .collect();
                picks.extend(sample_from(&rest, PICK_COUNT - HYBRID_POOL_PICKS, rng));
                Combination::new(&picks)
            }
            Strategy::Fixed(combination) => Ok(**combination),
        }
    }
}

fn full_range() -> Vec<u8> {
    (MIN_NUMBER..=MAX_NUMBER).collect()
}

fn sample_from(pool: &[u8], amount: usize, rng: &mut StdRng) -> Vec<u8> {
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

/// Produces one combination with `method`, avoiding anything in `exclude`.
///
/// `manual` is only read for [`Method::Manual`].
pub fn generate(
    method: Method,
    draws: &[DrawRecord],
    exclude: &ExclusionSet,
    manual: Option<&Combination>,
    rng: &mut StdRng,
) -> Result<Recommendation> {
    generate_with_budget(method, draws, exclude, manual, rng, MAX_ATTEMPTS)
}

pub fn generate_with_budget(
    method: Method,
    draws: &[DrawRecord],
    exclude: &ExclusionSet,
    manual: Option<&Combination>,
    rng: &mut StdRng,
    max_attempts: usize,
) -> Result<Recommendation> {
    let strategy = Strategy::build(method, draws, manual)?;
    let mut attempts = 0;

    loop {
        attempts += 1;
        let combination = strategy.draw(rng)?;
        if !exclude.contains(&combination) {
            return Ok(Recommendation {
                combination,
                method,
                attempts,
                exclusion_relaxed: false,
            });
        }
        debug!(attempts, %combination, "candidate already won, retrying");

        // a fixed combination gives the same answer on every retry
        if strategy.is_fixed() || attempts >= max_attempts {
            warn!(%method, attempts, %combination, "could not avoid past winning sets, keeping last candidate");
            return Ok(Recommendation {
                combination,
                method,
                attempts,
                exclusion_relaxed: true,
            });
        }
    }
}

/// Like [`generate`], but takes the method by name. Unknown names yield `None`.
pub fn generate_by_name(
    name: &str,
    draws: &[DrawRecord],
    exclude: &ExclusionSet,
    manual: Option<&Combination>,
    rng: &mut StdRng,
) -> Result<Option<Recommendation>> {
    match name.parse::<Method>() {
        Ok(method) => generate(method, draws, exclude, manual, rng).map(Some),
        Err(e) => {
            debug!(error = %e, "no recommendation for unknown method");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn draw(round: u32, numbers: [u8; 6], bonus: u8) -> DrawRecord {
        DrawRecord::new(round, numbers, bonus).unwrap()
    }

    fn sample_history() -> Vec<DrawRecord> {
        (1..=200u32)
            .map(|r| {
                let a = (r * 7 % 30) as u8 + 1;
                let b = (r * 3 % 5) as u8 + 33;
                draw(r, [a, a + 1, b, b + 2, b + 4, b + 8], 32)
            })
            .collect()
    }

    fn assert_valid(rec: &Recommendation) {
        let numbers = rec.combination.numbers();
        assert!(numbers.windows(2).all(|w| w[0] < w[1]), "not sorted/distinct: {:?}", numbers);
        assert!(numbers.iter().all(|&n| (1..=45).contains(&n)));
    }

    #[test]
    fn test_every_method_yields_valid_combination() {
        let history = sample_history();
        let exclude = ExclusionSet::from_history(&history);
        let manual = Combination::new(&[3, 11, 25, 33, 40, 44]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for method in Method::ALL {
            for _ in 0..50 {
                let rec = generate(method, &history, &exclude, Some(&manual), &mut rng).unwrap();
                assert_valid(&rec);
                assert_eq!(rec.method, method);
            }
        }
    }

    #[test]
    fn test_result_never_in_exclusion_set() {
        let history = sample_history();
        let exclude = ExclusionSet::from_history(&history);
        let mut rng = StdRng::seed_from_u64(7);

        for method in [Method::Random, Method::Frequency, Method::Consecutive, Method::Hybrid] {
            for _ in 0..100 {
                let rec = generate(method, &history, &exclude, None, &mut rng).unwrap();
                assert!(!exclude.contains(&rec.combination));
                assert!(!rec.exclusion_relaxed);
            }
        }
    }

    #[test]
    fn test_frequency_draws_from_top_pool() {
        let history = sample_history();
        let pool = top_frequent(&history, FREQUENCY_POOL_SIZE);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let rec = generate(Method::Frequency, &history, &ExclusionSet::new(), None, &mut rng).unwrap();
            assert!(rec.combination.numbers().iter().all(|n| pool.contains(n)));
        }
    }

    #[test]
    fn test_consecutive_draws_from_candidates() {
        let history = sample_history();
        let candidates = consecutive_candidates(&history);
        assert!(candidates.len() >= 6);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            let rec = generate(Method::Consecutive, &history, &ExclusionSet::new(), None, &mut rng).unwrap();
            assert!(rec.combination.numbers().iter().all(|n| candidates.contains(n)));
        }
    }

    #[test]
    fn test_consecutive_falls_back_without_pairs() {
        let history = vec![draw(1, [1, 3, 5, 7, 9, 11], 13)];
        let mut rng = StdRng::seed_from_u64(3);
        let rec = generate(Method::Consecutive, &history, &ExclusionSet::new(), None, &mut rng).unwrap();
        assert_valid(&rec);
    }

    #[test]
    fn test_hybrid_contains_three_pool_numbers() {
        let history = vec![
            draw(1, [1, 2, 3, 4, 5, 6], 7),
            draw(2, [1, 2, 3, 4, 5, 6], 7),
            draw(3, [1, 2, 3, 4, 5, 6], 7),
        ];
        let pool = top_frequent(&history, FREQUENCY_POOL_SIZE);
        assert_eq!(pool.len(), 6);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            let rec = generate(Method::Hybrid, &history, &ExclusionSet::new(), None, &mut rng).unwrap();
            assert_valid(&rec);
            let from_pool = rec.combination.numbers().iter().filter(|n| pool.contains(n)).count();
            assert!(from_pool >= 3);
        }
    }

    #[test]
    fn test_empty_history_still_recommends() {
        let mut rng = StdRng::seed_from_u64(5);
        for method in [Method::Frequency, Method::Consecutive, Method::Hybrid] {
            let rec = generate(method, &[], &ExclusionSet::new(), None, &mut rng).unwrap();
            assert_valid(&rec);
        }
    }

    #[test]
    fn test_manual_is_returned_as_is() {
        let manual = Combination::new(&[44, 40, 33, 25, 11, 3]).unwrap();
        let mut rng = StdRng::seed_from_u64(6);
        let rec = generate(Method::Manual, &[], &ExclusionSet::new(), Some(&manual), &mut rng).unwrap();
        assert_eq!(rec.combination, manual);
        assert_eq!(rec.attempts, 1);
    }

    #[test]
    fn test_manual_without_combination_errors() {
        let mut rng = StdRng::seed_from_u64(6);
        assert!(generate(Method::Manual, &[], &ExclusionSet::new(), None, &mut rng).is_err());
    }

    #[test]
    fn test_manual_past_winner_is_relaxed_immediately() {
        let history = vec![draw(1, [1, 2, 3, 4, 5, 6], 7)];
        let exclude = ExclusionSet::from_history(&history);
        let manual = Combination::new(&[1, 2, 3, 4, 5, 6]).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let rec = generate(Method::Manual, &history, &exclude, Some(&manual), &mut rng).unwrap();
        assert!(rec.exclusion_relaxed);
        assert_eq!(rec.attempts, 1);
    }

    #[test]
    fn test_exhausted_budget_terminates() {
        // single draw: the frequency pool is exactly the excluded set
        let history = vec![draw(1, [1, 2, 3, 4, 5, 6], 7)];
        let exclude = ExclusionSet::from_history(&history);
        let mut rng = StdRng::seed_from_u64(9);
        let rec = generate_with_budget(Method::Frequency, &history, &exclude, None, &mut rng, 10).unwrap();
        assert!(rec.exclusion_relaxed);
        assert_eq!(rec.attempts, 10);
        assert_eq!(rec.combination.numbers(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let history = sample_history();
        let exclude = ExclusionSet::from_history(&history);
        let a = generate(Method::Hybrid, &history, &exclude, None, &mut StdRng::seed_from_u64(11)).unwrap();
        let b = generate(Method::Hybrid, &history, &exclude, None, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_by_name() {
        let mut rng = StdRng::seed_from_u64(12);
        let rec = generate_by_name("AI", &[], &ExclusionSet::new(), None, &mut rng).unwrap();
        assert_eq!(rec.map(|r| r.method), Some(Method::Frequency));
        let none = generate_by_name("lucky-dip", &[], &ExclusionSet::new(), None, &mut rng).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("random".parse::<Method>().unwrap(), Method::Random);
        assert_eq!(" Hybrid ".parse::<Method>().unwrap(), Method::Hybrid);
        assert_eq!("pairs".parse::<Method>().unwrap(), Method::Consecutive);
        assert!("".parse::<Method>().is_err());
    }
}
