use std::fmt;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 45;
pub const PICK_COUNT: usize = 6;

/// One historical draw: six winning numbers (sorted) plus the bonus number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub round: u32,
    pub date: Option<NaiveDate>,
    pub numbers: [u8; PICK_COUNT],
    pub bonus: u8,
    pub first_winner_count: u32,
    pub first_prize: u64,
}

impl DrawRecord {
    /// Validates and sorts the winning numbers. Prize fields start at zero.
    pub fn new(round: u32, numbers: [u8; PICK_COUNT], bonus: u8) -> Result<Self> {
        if round == 0 {
            bail!("Round numbers start at 1");
        }
        validate_draw(&numbers, bonus)?;
        let mut numbers = numbers;
        numbers.sort_unstable();
        Ok(Self {
            round,
            date: None,
            numbers,
            bonus,
            first_winner_count: 0,
            first_prize: 0,
        })
    }

    pub fn combination(&self) -> Combination {
        let mut numbers = self.numbers;
        numbers.sort_unstable();
        Combination(numbers)
    }
}

/// Six distinct numbers in 1..=45, kept sorted ascending.
///
/// `Combination::new` is the only way to build one from outside the crate, so
/// a value of this type is always a valid play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Combination([u8; PICK_COUNT]);

impl Combination {
    pub fn new(numbers: &[u8]) -> Result<Self> {
        validate_combination(numbers)?;
        let mut sorted = [0u8; PICK_COUNT];
        sorted.copy_from_slice(numbers);
        sorted.sort_unstable();
        Ok(Self(sorted))
    }

    pub fn numbers(&self) -> &[u8; PICK_COUNT] {
        &self.0
    }

    pub fn contains(&self, n: u8) -> bool {
        self.0.binary_search(&n).is_ok()
    }

    /// Number of values shared with `numbers`.
    pub fn matches(&self, numbers: &[u8]) -> usize {
        numbers.iter().filter(|&&n| self.contains(n)).count()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_numbers(&self.0))
    }
}

pub fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberStats {
    pub number: u8,
    pub frequency: u32,
    /// Draws elapsed since the number last appeared (0 = in the latest draw).
    pub gap: u32,
}

pub fn validate_combination(numbers: &[u8]) -> Result<()> {
    if numbers.len() != PICK_COUNT {
        bail!(
            "Expected exactly {} numbers, got {}",
            PICK_COUNT,
            numbers.len()
        );
    }
    for &n in numbers {
        if !(MIN_NUMBER..=MAX_NUMBER).contains(&n) {
            bail!("Number {} out of range ({}-{})", n, MIN_NUMBER, MAX_NUMBER);
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Duplicate number: {}", numbers[i]);
            }
        }
    }
    Ok(())
}

pub fn validate_draw(numbers: &[u8; PICK_COUNT], bonus: u8) -> Result<()> {
    validate_combination(numbers)?;
    if !(MIN_NUMBER..=MAX_NUMBER).contains(&bonus) {
        bail!("Bonus {} out of range ({}-{})", bonus, MIN_NUMBER, MAX_NUMBER);
    }
    if numbers.contains(&bonus) {
        bail!("Bonus {} is also a winning number", bonus);
    }
    Ok(())
}

/// Draw records ordered by round, starting at round 1 with no gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    records: Vec<DrawRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<DrawRecord>) -> Result<Self> {
        let mut history = Self::with_capacity(records.len());
        for record in records {
            history.push(record)?;
        }
        Ok(history)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Appends the next round. Anything but `latest_round + 1` is rejected.
    pub fn push(&mut self, record: DrawRecord) -> Result<()> {
        let expected = self.records.len() as u32 + 1;
        if record.round != expected {
            bail!(
                "Round {} out of sequence (expected round {})",
                record.round,
                expected
            );
        }
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest_round(&self) -> Option<u32> {
        self.records.last().map(|r| r.round)
    }

    /// The `n` most recent records, still in ascending round order.
    pub fn last_n(&self, n: usize) -> &[DrawRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(round: u32) -> DrawRecord {
        DrawRecord::new(round, [1, 2, 3, 4, 5, 6], 7).unwrap()
    }

    #[test]
    fn test_validate_combination_ok() {
        assert!(validate_combination(&[1, 2, 3, 4, 5, 6]).is_ok());
        assert!(validate_combination(&[45, 44, 43, 42, 41, 40]).is_ok());
    }

    #[test]
    fn test_validate_combination_wrong_count() {
        assert!(validate_combination(&[1, 2, 3, 4, 5]).is_err());
        assert!(validate_combination(&[1, 2, 3, 4, 5, 6, 7]).is_err());
        assert!(validate_combination(&[]).is_err());
    }

    #[test]
    fn test_validate_combination_out_of_range() {
        assert!(validate_combination(&[0, 2, 3, 4, 5, 6]).is_err());
        assert!(validate_combination(&[1, 2, 3, 4, 5, 46]).is_err());
    }

    #[test]
    fn test_validate_combination_duplicates() {
        assert!(validate_combination(&[1, 1, 3, 4, 5, 6]).is_err());
    }

    #[test]
    fn test_validate_draw_bonus() {
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 7).is_ok());
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 6).is_err());
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 0).is_err());
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 46).is_err());
    }

    #[test]
    fn test_draw_record_sorts_numbers() {
        let draw = DrawRecord::new(3, [40, 2, 33, 11, 9, 25], 1).unwrap();
        assert_eq!(draw.numbers, [2, 9, 11, 25, 33, 40]);
        assert!(DrawRecord::new(0, [1, 2, 3, 4, 5, 6], 7).is_err());
    }

    #[test]
    fn test_combination_sorted_and_contains() {
        let combo = Combination::new(&[44, 3, 25, 11, 33, 40]).unwrap();
        assert_eq!(combo.numbers(), &[3, 11, 25, 33, 40, 44]);
        assert!(combo.contains(25));
        assert!(!combo.contains(26));
        assert_eq!(combo.matches(&[3, 11, 12, 13, 14, 44]), 3);
    }

    #[test]
    fn test_combination_display() {
        let combo = Combination::new(&[1, 2, 3, 4, 5, 45]).unwrap();
        assert_eq!(combo.to_string(), " 1 -  2 -  3 -  4 -  5 - 45");
    }

    #[test]
    fn test_history_rejects_gaps() {
        let mut history = HistoryLog::new();
        history.push(record(1)).unwrap();
        assert!(history.push(record(3)).is_err());
        history.push(record(2)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest_round(), Some(2));
    }

    #[test]
    fn test_history_must_start_at_one() {
        assert!(HistoryLog::from_records(vec![record(2)]).is_err());
        assert!(HistoryLog::from_records(vec![record(1), record(2)]).is_ok());
    }

    #[test]
    fn test_history_last_n() {
        let history = HistoryLog::from_records((1..=5).map(record).collect()).unwrap();
        let last = history.last_n(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].round, 4);
        assert_eq!(last[1].round, 5);
        assert_eq!(history.last_n(100).len(), 5);
    }
}
