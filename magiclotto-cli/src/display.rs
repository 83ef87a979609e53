use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use magiclotto_data::models::{format_numbers, DrawRecord, NumberStats};
use magiclotto_engine::recommend::Recommendation;
use magiclotto_engine::scoring::{Rank, RankTally};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_draws(draws: &[&DrawRecord]) {
    if draws.is_empty() {
        println!("No draws to show.");
        return;
    }

    let mut table = new_table(vec!["Round", "Date", "Numbers", "Bonus", "1st winners", "1st prize"]);

    for draw in draws {
        let date = draw
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "—".to_string());
        let prize = if draw.first_prize > 0 {
            format!("{} ₩", draw.first_prize)
        } else {
            "—".to_string()
        };

        table.add_row(vec![
            &draw.round.to_string(),
            &date,
            &format_numbers(&draw.numbers),
            &format!("{:2}", draw.bonus),
            &draw.first_winner_count.to_string(),
            &prize,
        ]);
    }

    println!("{table}");
}

pub fn display_recommendation(index: usize, rec: &Recommendation, tally: &RankTally) {
    println!("\n🎉 Recommendation #{} ({})\n", index, rec.method);
    println!("   {}\n", rec.combination);
    println!("🧠 {}", rec.method.description());
    if rec.exclusion_relaxed {
        println!("⚠️  This combination has already won in the past (no alternative found).");
    }
    display_tally(tally);
}

pub fn display_tally(tally: &RankTally) {
    if tally.is_empty() {
        println!("📊 Never placed in a past draw.");
        return;
    }

    println!("📊 Past results:");
    let mut table = new_table(vec!["Rank", "Times"]);
    for (rank, count) in tally.iter() {
        let color = match rank {
            Rank::First | Rank::Second => Color::Green,
            Rank::Third => Color::Yellow,
            Rank::Fourth | Rank::Fifth => Color::White,
        };
        table.add_row(vec![
            Cell::new(rank.label()).fg(color),
            Cell::new(count.to_string()),
        ]);
    }
    println!("{table}");
}

pub fn display_hot_numbers(hot: &[u8], window: usize) {
    println!("\n📩 Numbers to watch this week\n");
    if hot.is_empty() {
        println!("No draw history available.");
        return;
    }
    println!("   {}\n", format_numbers(hot));
    println!("The most frequent numbers over the last {} draws.", window);
}

pub fn display_stats(stats: &[NumberStats], window: usize) {
    println!("\n📊 Frequencies over the last {} draws\n", window);

    let mut table = new_table(vec!["Number", "Frequency", "Gap"]);

    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    for stat in &sorted {
        table.add_row(vec![
            &format!("{:2}", stat.number),
            &stat.frequency.to_string(),
            &stat.gap.to_string(),
        ]);
    }
    println!("{table}");
}
