use std::fmt::Write;

use dashboard_core::{AggregateBucket, AppViewModel, MovieRowView, RunPhase};

const BAR_WIDTH: usize = 30;

/// Single status line for the idle, loading and errored phases.
pub fn render_status(view: &AppViewModel) -> String {
    match view.phase {
        RunPhase::Idle => "Idle".to_string(),
        RunPhase::Loading => match view.progress.lists_discovered {
            Some(total) => format!(
                "Loading your movies... ({}/{} lists)",
                view.progress.lists_fetched, total
            ),
            None => "Loading your movies...".to_string(),
        },
        RunPhase::Errored => view.error.clone().unwrap_or_default(),
        RunPhase::Ready => format!("{} movies loaded", view.summary.total),
    }
}

/// Full dashboard: summary cards, distributions and the movie table.
pub fn render(view: &AppViewModel, loaded_at: &str) -> String {
    if view.phase != RunPhase::Ready {
        return render_status(view);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Movie Dashboard (loaded {loaded_at})");
    let _ = writeln!(out);
    let cards = [
        ("Movies Watched", view.summary.total.to_string()),
        ("Average Rating", format!("{:.1}", view.summary.average_rating)),
        ("Movies/Week", format!("{:.1}", view.summary.movies_per_week)),
        ("Movies/Month", format!("{:.1}", view.summary.movies_per_month)),
    ];
    let cards: Vec<String> = cards
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect();
    let _ = writeln!(out, "{}", cards.join(" | "));

    write_section(&mut out, "Genre Distribution", &view.genres, true);
    write_section(&mut out, "Movies by Year", &view.years, false);
    write_section(&mut out, "Rating Distribution", &view.ratings, false);

    let _ = writeln!(out);
    let _ = writeln!(out, "Movie List");
    if view.rows.is_empty() {
        let _ = writeln!(out, "  No movies found.");
    } else {
        write_table(&mut out, &view.rows);
    }
    out.trim_end().to_string()
}

fn write_section(out: &mut String, title: &str, buckets: &[AggregateBucket], with_share: bool) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    if buckets.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }

    let key_width = buckets.iter().map(|b| b.key.chars().count()).max().unwrap_or(0);
    let max_count = buckets.iter().map(|b| b.count).max().unwrap_or(1).max(1);
    let sum: usize = buckets.iter().map(|b| b.count).sum();

    for bucket in buckets {
        let bar = "#".repeat(bar_len(bucket.count, max_count));
        let _ = write!(
            out,
            "  {key:<key_width$}  {bar:<bar_width$} {count}",
            key = bucket.key,
            bar_width = BAR_WIDTH,
            count = bucket.count
        );
        if with_share {
            let share = bucket.count as f64 * 100.0 / sum as f64;
            let _ = write!(out, " ({share:.0}%)");
        }
        let _ = writeln!(out);
    }
}

/// Bar length scaled to the largest bucket; never empty for a non-zero count.
fn bar_len(count: usize, max_count: usize) -> usize {
    ((count * BAR_WIDTH + max_count - 1) / max_count).clamp(1, BAR_WIDTH)
}

fn write_table(out: &mut String, rows: &[MovieRowView]) {
    let headers = ["Title", "Year", "Rating", "Genre"];
    let columns = |row: &MovieRowView| -> [String; 4] {
        [
            row.title.clone(),
            row.year.clone(),
            row.rating.clone(),
            row.genre.clone(),
        ]
    };

    let mut widths = headers.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(columns(row)) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: [String; 4]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let _ = writeln!(out, "  {}", format_line(headers.map(String::from)));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "  {}", rule.join("  "));
    for row in rows {
        let _ = writeln!(out, "  {}", format_line(columns(row)));
    }
}
