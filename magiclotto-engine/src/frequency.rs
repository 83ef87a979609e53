use magiclotto_data::models::{DrawRecord, NumberStats, MAX_NUMBER, MIN_NUMBER};

pub const FREQUENCY_POOL_SIZE: usize = 30;
pub const HOT_WINDOW: usize = 100;
pub const HOT_COUNT: usize = 6;

/// `(number, count)` over all winning numbers, most frequent first.
///
/// Ties keep the order in which numbers were first counted.
pub fn frequency_ranking(draws: &[DrawRecord]) -> Vec<(u8, u32)> {
    let mut slots: Vec<Option<usize>> = vec![None; MAX_NUMBER as usize + 1];
    let mut counts: Vec<(u8, u32)> = Vec::new();

    for draw in draws {
        for &n in &draw.numbers {
            let idx = n as usize;
            if idx >= slots.len() {
                continue;
            }
            match slots[idx] {
                Some(pos) => counts[pos].1 += 1,
                None => {
                    slots[idx] = Some(counts.len());
                    counts.push((n, 1));
                }
            }
        }
    }

    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn top_frequent(draws: &[DrawRecord], n: usize) -> Vec<u8> {
    frequency_ranking(draws)
        .into_iter()
        .take(n)
        .map(|(number, _)| number)
        .collect()
}

/// Top `count` numbers over the `window` most recent draws, sorted ascending.
pub fn hot_numbers(draws: &[DrawRecord], window: usize, count: usize) -> Vec<u8> {
    let start = draws.len().saturating_sub(window);
    let mut hot = top_frequent(&draws[start..], count);
    hot.sort_unstable();
    hot
}

/// Frequency and gap for every number in the pool. `draws` is oldest first.
pub fn number_stats(draws: &[DrawRecord]) -> Vec<NumberStats> {
    let mut stats: Vec<NumberStats> = (MIN_NUMBER..=MAX_NUMBER)
        .map(|n| NumberStats {
            number: n,
            frequency: 0,
            gap: draws.len() as u32,
        })
        .collect();
    let mut seen = vec![false; stats.len()];

    for (age, draw) in draws.iter().rev().enumerate() {
        for &n in &draw.numbers {
            let Some(idx) = (n as usize).checked_sub(MIN_NUMBER as usize) else {
                continue;
            };
            if idx < stats.len() {
                stats[idx].frequency += 1;
                if !seen[idx] {
                    seen[idx] = true;
                    stats[idx].gap = age as u32;
                }
            }
        }
    }

    stats
}

/// Numbers that sat next to a consecutive partner (e.g. 14-15) in any draw.
pub fn consecutive_candidates(draws: &[DrawRecord]) -> Vec<u8> {
    let mut member = [false; MAX_NUMBER as usize + 1];
    for draw in draws {
        let mut sorted = draw.numbers;
        sorted.sort_unstable();
        for pair in sorted.windows(2) {
            if pair[1] <= MAX_NUMBER && pair[0] + 1 == pair[1] {
                member[pair[0] as usize] = true;
                member[pair[1] as usize] = true;
            }
        }
    }
    (MIN_NUMBER..=MAX_NUMBER)
        .filter(|&n| member[n as usize])
        .collect()
}

/// The most recent `n` draws, newest first.
pub fn recent_draws(draws: &[DrawRecord], n: usize) -> Vec<&DrawRecord> {
    draws.iter().rev().take(n).collect()
}
