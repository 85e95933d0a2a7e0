use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::ImportResult;
use lotto645_db::models::Draw;
use lotto645_engine::engine::GenerationResult;
use lotto645_engine::filter::{Candidate, FilterRule};
use lotto645_engine::models::exposure_rank::ExposureRanks;
use lotto645_engine::models::gap_weight::GapWeights;

/// Couleur des boules du tirage officiel : jaune, bleu, rouge, gris, vert par dizaine.
fn ball_color(number: u8) -> Color {
    match number {
        0..=10 => Color::Yellow,
        11..=20 => Color::Blue,
        21..=30 => Color::Red,
        31..=40 => Color::Grey,
        _ => Color::Green,
    }
}

fn ball_cell(number: u8) -> Cell {
    Cell::new(format!("{:2}", number)).fg(ball_color(number))
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Tour", "Numéros", "Bonus"]);
    for draw in draws {
        table.add_row(vec![
            Cell::new(draw.round),
            Cell::new(format_numbers(&draw.numbers)),
            ball_cell(draw.bonus),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Tirages lus       : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.conflicts > 0 {
        println!("  ⚠ En conflit      : {} (version en base conservée)", result.conflicts);
    }
}

pub fn display_gap_weights(weights: &GapWeights, draw_count: usize, top: usize) {
    println!("\n📊 Poids d'écart sur {} tirages (fréquence attendue : {:.2})\n", draw_count, weights.expected());

    let mut rows: Vec<u8> = (1..=45).collect();
    rows.sort_by(|&a, &b| {
        weights
            .weight(b)
            .partial_cmp(&weights.weight(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut table = new_table(vec!["Numéro", "Fréquence", "Poids"]);
    for &n in rows.iter().take(top) {
        table.add_row(vec![
            ball_cell(n),
            Cell::new(weights.frequency(n)),
            Cell::new(format!("{:.3}", weights.weight(n))),
        ]);
    }
    println!("{table}");
}

pub fn display_ranks(ranks: &ExposureRanks, draw_count: usize, top: usize) {
    println!("\n🏷  Rangs d'exposition sur {} tirages\n", draw_count);

    let mut table = new_table(vec!["Rang", "Numéro", "Fréquence"]);
    for rank in 1..=45u8 {
        if rank as usize > top {
            break;
        }
        if let Some(n) = ranks.number_at(rank) {
            table.add_row(vec![Cell::new(rank), ball_cell(n), Cell::new(ranks.frequency(n))]);
        }
    }
    println!("{table}");

    println!("\n── Motifs de rangs fréquents ──");
    let patterns = ranks.frequent_patterns();
    if patterns.is_empty() {
        println!("Aucun motif (historique vide).");
        return;
    }
    let mut table = new_table(vec!["#", "Motif", "Occurrences", "Numéros actuels"]);
    for (i, (pattern, count)) in patterns.iter().take(top).enumerate() {
        let current = ranks
            .translate(pattern)
            .map(|nums| format_numbers(&nums))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format_numbers(pattern)),
            Cell::new(count),
            Cell::new(current),
        ]);
    }
    println!("{table}");
}

pub fn display_generation(result: &GenerationResult) {
    println!("\n🎲 Grilles générées ({})\n", result.pattern_label);

    if result.games.is_empty() {
        println!("Aucune grille ne passe les filtres.");
    } else {
        let mut table = new_table(vec!["#", "N1", "N2", "N3", "N4", "N5", "N6", "Somme", "Impairs:Pairs"]);
        for game in &result.games {
            let mut row = vec![Cell::new(format!("GAME {}", game.seq))];
            row.extend(game.numbers.iter().map(|&n| ball_cell(n)));
            row.push(Cell::new(game.sum));
            row.push(Cell::new(&game.odd_even));
            table.add_row(row);
        }
        println!("{table}");
    }

    if !result.is_complete() {
        println!(
            "⚠ {} grille(s) sans résultat dans le budget de tentatives : {:?}",
            result.exhausted_slots.len(),
            result.exhausted_slots
        );
    }
}

pub fn display_check(candidate: &Candidate, report: &[(FilterRule, bool)]) {
    println!(
        "\nGrille {}  (somme {}, impairs:pairs {})\n",
        format_numbers(candidate.numbers()),
        candidate.sum(),
        candidate.odd_even()
    );

    let mut table = new_table(vec!["Règle", "Verdict"]);
    for (rule, ok) in report {
        let verdict = if *ok {
            Cell::new("OK").fg(Color::Green)
        } else {
            Cell::new("REJET").fg(Color::Red)
        };
        table.add_row(vec![Cell::new(rule.label()), verdict]);
    }
    println!("{table}");

    if report.iter().all(|(_, ok)| *ok) {
        println!("Grille acceptée.");
    } else {
        println!("Grille refusée.");
    }
}
