use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use pension_analysis::digit_sum::DigitSumAnalysis;
use pension_analysis::duplicates::{DuplicateAnalysis, DuplicateClass};
use pension_analysis::generator::Generated;
use pension_analysis::positional::PositionFrequency;
use pension_analysis::report::PredictionReport;
use pension_analysis::stats::NumberAnalysis;
use pension_analysis::summary::DataSummary;
use pension_analysis::transition::{RoundComparison, TransitionAnalysis};
use pension_analysis::trend::{TrendDirection, TrendSeries};
use pension_db::models::DrawRecord;

use crate::import::ImportResult;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn digits_str(digits: &[u8]) -> String {
    digits
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "—".to_string(),
    }
}

pub fn display_records(records: &[DrawRecord]) {
    if records.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Tirage", "Groupe", "Chiffres", "Valeur", "Somme", "Bonus"]);
    for record in records {
        table.add_row(vec![
            record.round_id.to_string(),
            record.group_id.to_string(),
            digits_str(&record.digits),
            format!("{:06}", record.combined_value()),
            record.digit_sum().to_string(),
            digits_str(&record.bonus_digits),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_stats(analysis: &NumberAnalysis, summary: &DataSummary) {
    let s = &analysis.statistics;
    println!("\n📊 Statistiques sur {} valeurs\n", s.count);

    let mut table = new_table(vec!["Mesure", "Valeur"]);
    let rows = [
        ("Moyenne", format!("{:.2}", s.mean)),
        ("Médiane", format!("{:.1}", s.median)),
        ("Mode", format!("{:.0}", s.mode)),
        ("Min", format!("{:.0}", s.min)),
        ("Max", format!("{:.0}", s.max)),
        ("Étendue", format!("{:.0}", s.range)),
        ("Écart-type", format!("{:.2}", s.standard_deviation)),
        ("Borne basse", format!("{:.2}", s.lower_bound)),
        ("Borne haute", format!("{:.2}", s.upper_bound)),
        (
            "Hors bornes",
            format!("{} ({:.1}%)", s.out_of_range.count, s.out_of_range.ratio * 100.0),
        ),
        (
            "  au-dessus",
            format!("{} ({:.1}%)", s.above_upper_bound.count, s.above_upper_bound.ratio * 100.0),
        ),
        (
            "  en dessous",
            format!("{} ({:.1}%)", s.below_lower_bound.count, s.below_lower_bound.ratio * 100.0),
        ),
    ];
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value]);
    }
    println!("{table}");

    let d = &analysis.distribution;
    let p = &analysis.patterns;
    println!(
        "Pairs : {}  Impairs : {}  Rapport : {}  Premiers : {}",
        d.even_count,
        d.odd_count,
        optional(d.even_odd_ratio, 3),
        d.prime_count
    );
    println!(
        "Chiffres consécutifs : {}  Valeurs à chiffre répété : {}  Croissante : {}  Décroissante : {}",
        p.consecutive_digits,
        p.repeated_digits,
        if p.ascending_sequence { "oui" } else { "non" },
        if p.descending_sequence { "oui" } else { "non" }
    );

    let next = &analysis.predictions;
    println!(
        "\n🔮 Valeur suivante estimée : {:06}  (confiance {:.0}%, tendance {})",
        next.next_value,
        next.confidence * 100.0,
        next.trend
    );

    println!("\n── Répartition des chiffres (forme à 6 chiffres) ──");
    let mut table = new_table(vec!["Chiffre", "Occurrences", "Part"]);
    for share in &summary.digit_distribution {
        table.add_row(vec![
            share.digit.to_string(),
            share.count.to_string(),
            format!("{:.2}%", share.share * 100.0),
        ]);
    }
    println!("{table}");
    println!(
        "Tirages : {}  Min : {:06}  Max : {:06}  Moyenne : {:.0}  Pairs/impairs : {}/{} ({})",
        summary.total_count,
        summary.min_value,
        summary.max_value,
        summary.average_value,
        summary.even_count,
        summary.odd_count,
        optional(summary.even_odd_ratio, 3)
    );
}

pub fn display_positions(positions: &[PositionFrequency]) {
    println!("\n📍 Fréquences par position\n");

    let mut header = vec!["Chiffre".to_string()];
    header.extend(positions.iter().map(|p| format!("P{}", p.position)));
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for digit in 0..10u8 {
        let mut row = vec![Cell::new(digit)];
        for pos in positions {
            let cell = Cell::new(format!("{} ({:.1}%)", pos.count(digit), pos.percentage(digit)));
            let cell = if pos.total > 0 && digit == pos.highest.digit {
                cell.fg(Color::Green)
            } else if pos.total > 0 && digit == pos.lowest.digit {
                cell.fg(Color::Red)
            } else {
                cell
            };
            row.push(cell);
        }
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_duplicates(analysis: &DuplicateAnalysis) {
    println!("\n🔁 Doublons sur {} tirages\n", analysis.total_records);

    let mut table = new_table(vec!["Classe", "Clé", "Tirages", "Ratio"]);
    for bucket in &analysis.buckets {
        table.add_row(vec![
            bucket.class.to_string(),
            bucket.class.bucket_key().to_string(),
            bucket.count.to_string(),
            format!("{:.2}%", bucket.ratio * 100.0),
        ]);
    }
    println!("{table}");

    println!("\n── Intensité (occurrences du chiffre le plus répété) ──");
    let mut table = new_table(vec!["Occurrences", "Tirages", "Ratio"]);
    for level in &analysis.occurrence_levels {
        table.add_row(vec![
            level.level.to_string(),
            level.count.to_string(),
            format!("{:.2}%", level.ratio * 100.0),
        ]);
    }
    println!("{table}");

    if analysis.single_pair_total == 0 {
        return;
    }

    println!(
        "\n── {} ({} tirages) : chiffre doublé ──",
        DuplicateClass::SinglePair,
        analysis.single_pair_total
    );
    let mut table = new_table(vec!["Chiffre", "Tirages"]);
    for rank in &analysis.single_duplicate_ranking {
        table.add_row(vec![rank.digit.to_string(), rank.count.to_string()]);
    }
    println!("{table}");

    println!("\n── Motifs de position ──");
    let mut table = new_table(vec!["Motif", "Tirages", "Part", "Exemples"]);
    for pattern in &analysis.patterns {
        let examples = pattern
            .examples
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            pattern.pattern.clone(),
            pattern.count.to_string(),
            format!("{:.2}%", pattern.percentage),
            examples,
        ]);
    }
    println!("{table}");
}

pub fn display_digit_sums(analysis: &DigitSumAnalysis) {
    println!("\n➕ Somme des chiffres sur {} tirages\n", analysis.total);
    println!(
        "Moyenne : {:.2}  Médiane : {:.1}  Mode : {}  Min : {}  Max : {}  Cible : {}",
        analysis.avg_sum,
        analysis.median_sum,
        analysis.mode_sum,
        analysis.min_sum,
        analysis.max_sum,
        analysis.target_sum()
    );

    let mut table = new_table(vec!["Somme", "Tirages", "Ratio"]);
    for bucket in &analysis.distribution {
        table.add_row(vec![
            bucket.sum.to_string(),
            bucket.count.to_string(),
            format!("{:.2}%", bucket.ratio * 100.0),
        ]);
    }
    println!("{table}");
}

pub fn display_comparison(cmp: &RoundComparison) {
    println!("\n↕ Comparaison tirage à tirage ({} écarts)\n", cmp.total_comparisons);

    let mut table = new_table(vec!["Sens", "Tirages", "Ratio", "Moyenne", "Max", "Série max"]);
    table.add_row(vec![
        "Hausse".to_string(),
        cmp.increase_count.to_string(),
        format!("{:.2}%", cmp.increase_ratio * 100.0),
        format!("{:.0}", cmp.avg_increase),
        cmp.max_increase.to_string(),
        cmp.max_increase_streak.to_string(),
    ]);
    table.add_row(vec![
        "Baisse".to_string(),
        cmp.decrease_count.to_string(),
        format!("{:.2}%", cmp.decrease_ratio * 100.0),
        format!("{:.0}", cmp.avg_decrease),
        cmp.max_decrease.to_string(),
        cmp.max_decrease_streak.to_string(),
    ]);
    table.add_row(vec![
        "Identique".to_string(),
        cmp.same_count.to_string(),
        format!("{:.2}%", cmp.same_ratio * 100.0),
        "0".to_string(),
        "0".to_string(),
        cmp.max_same_streak.to_string(),
    ]);
    println!("{table}");

    println!(
        "Écart moyen : {:.0}  Écart-type : {:.0}  Min : {}  Max : {}",
        cmp.avg_change, cmp.std_dev, cmp.min_change, cmp.max_change
    );
    println!(
        "Bande [{:.0}, {:.0}] : {} dedans ({:.1}%), {} dehors ({:.1}%)",
        cmp.lower_band,
        cmp.upper_band,
        cmp.within_band_count,
        cmp.within_band_ratio * 100.0,
        cmp.outside_band_count,
        cmp.outside_band_ratio * 100.0
    );
}

/// `position` de 1 à 6 ; toutes les positions si `None`.
pub fn display_transitions(analysis: &TransitionAnalysis, position: Option<usize>) {
    println!(
        "\n🔀 Transitions par position ({} paires de tirages)",
        analysis.total_transitions
    );

    for pos in &analysis.positions {
        if position.is_some_and(|p| p != pos.position) {
            continue;
        }
        println!("\n── Position {} ──", pos.position);

        let mut header = vec!["Précédent".to_string(), "Total".to_string()];
        header.extend((0..10).map(|d| format!("→{}", d)));
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header);

        for row in pos.rows.iter().filter(|r| r.total > 0) {
            let best = pos.top_next(row.from_digit, 1).first().map(|&(d, _)| d);
            let mut cells = vec![Cell::new(row.from_digit), Cell::new(row.total)];
            for to in 0..10u8 {
                let prob = row.probabilities[to as usize];
                let cell = if prob > 0.0 {
                    Cell::new(format!("{:.0}%", prob * 100.0))
                } else {
                    Cell::new("·")
                };
                cells.push(if best == Some(to) { cell.fg(Color::Green) } else { cell });
            }
            table.add_row(cells);
        }
        println!("{table}");
    }
}

pub fn display_trend(series: &TrendSeries, last: usize) {
    println!("\n📈 Tendance des valeurs\n");

    let mut table = new_table(vec!["Tirage", "Valeur", "Variation", "%", "Sens"]);
    for point in series.tail(last) {
        let color = match point.direction {
            TrendDirection::Up => Color::Green,
            TrendDirection::Down => Color::Red,
            TrendDirection::Stable => Color::White,
        };
        table.add_row(vec![
            Cell::new(point.round_id),
            Cell::new(format!("{:06}", point.value)),
            Cell::new(format!("{:+}", point.change)),
            Cell::new(optional(point.change_percent, 1)),
            Cell::new(point.direction.symbol()).fg(color),
        ]);
    }
    println!("{table}");

    println!(
        "Hausses : {}  Baisses : {}  Stables : {}",
        series.up_count, series.down_count, series.stable_count
    );
    println!(
        "Variation moyenne : {:.0}  Volatilité moyenne : {:.0}",
        series.avg_change, series.avg_volatility
    );
    println!(
        "Plus forte hausse : {:+}  Plus forte baisse : {:+}",
        series.largest_rise, series.largest_fall
    );
    println!(
        "Plus longue série : {} hausses, {} baisses",
        series.longest_up_run, series.longest_down_run
    );
}

pub fn display_predictions(predictions: &[(Generated, PredictionReport)]) {
    println!("\n🎲 Tirages générés\n");

    let mut table = new_table(vec![
        "#", "Chiffres", "Somme", "Cible", "Classe", "Motif", "Historique", "Construction",
        "Écart",
    ]);
    for (i, (generated, report)) in predictions.iter().enumerate() {
        let history = match report.pattern_percentage {
            Some(pct) => format!("{} ({:.1}%)", report.pattern_count, pct),
            None => report.pattern_count.to_string(),
        };
        table.add_row(vec![
            format!("{}", i + 1),
            digits_str(&generated.digits),
            format!("{} ({:+.1})", report.digit_sum, report.sum_difference),
            generated.target_sum.to_string(),
            report.class.to_string(),
            report.pattern.clone().unwrap_or_else(|| "—".to_string()),
            history,
            format!("{} / intensité {}", generated.branch, generated.intensity),
            generated.delta.to_string(),
        ]);
    }
    println!("{table}");

    for (i, (_, report)) in predictions.iter().enumerate() {
        let per_position = report
            .position_percentages
            .iter()
            .map(|p| format!("{:.1}%", p))
            .collect::<Vec<_>>()
            .join("  ");
        let duplicate = match report.duplicate_probability {
            Some(p) => format!("  doublon historique {:.1}%", p),
            None => String::new(),
        };
        println!("#{} positions : {}{}", i + 1, per_position, duplicate);
    }
}
