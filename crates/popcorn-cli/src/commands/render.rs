use crate::output::Output;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use popcorn_core::{AddUnavailable, FetchFailure, WatchedCollection, WatchedStats};
use popcorn_models::{DetailRecord, SearchResult, UserRating};
use serde_json::json;

fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

pub fn format_mean(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn format_minutes(value: f64) -> String {
    format!("{} min", format_mean(value))
}

pub fn render_results(query: &str, results: &[SearchResult], output: &Output) {
    if !output.is_human() {
        output.json(&json!({
            "query": query,
            "count": results.len(),
            "results": results,
        }));
        return;
    }

    output.info(format!("Found {} results for \"{}\"", results.len().to_string().bold(), query));
    if results.is_empty() {
        return;
    }

    let mut table = styled_table();
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Year").add_attribute(Attribute::Bold),
        Cell::new("IMDb ID").add_attribute(Attribute::Bold),
    ]);
    for (index, result) in results.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&result.title).fg(Color::Cyan),
            Cell::new(&result.year),
            Cell::new(&result.imdb_id).fg(Color::DarkGrey),
        ]);
    }
    println!("{}", table);
}

pub fn render_failure(failure: &FetchFailure, output: &Output) {
    if output.is_human() {
        if failure.is_retryable() {
            output.error(format!("⛔️ {}", failure.message()));
        } else {
            output.warn(format!("⛔️ {}", failure.message()));
        }
    } else {
        output.json(&json!({
            "type": "error",
            "message": failure.message(),
            "retryable": failure.is_retryable(),
        }));
    }
}

/// What the detail view offers next to the record itself.
pub struct DetailControls {
    pub user_rating: Option<UserRating>,
    pub watched_rating: Option<UserRating>,
    pub add_unavailable: Option<AddUnavailable>,
}

pub fn render_detail(detail: &DetailRecord, controls: Option<&DetailControls>, output: &Output) {
    if !output.is_human() {
        let mut value = json!({ "detail": detail });
        if let Some(controls) = controls {
            value["user_rating"] = json!(controls.user_rating);
            value["watched_rating"] = json!(controls.watched_rating);
            value["can_add"] = json!(controls.add_unavailable.is_none());
        }
        output.json(&value);
        return;
    }

    println!();
    println!("{} ({})", detail.title.bright_cyan().bold(), detail.year);
    println!(
        "{} • {}",
        or_dash(detail.released.as_deref()),
        detail.runtime
    );
    if let Some(genre) = &detail.genre {
        println!("{}", genre.dimmed());
    }
    match detail.imdb_rating {
        Some(rating) => println!("⭐️ {} IMDb rating", rating),
        None => println!("⭐️ no IMDb rating"),
    }
    println!();

    let mut table = styled_table();
    table.add_row(vec![
        Cell::new("Plot").add_attribute(Attribute::Bold),
        Cell::new(or_dash(detail.plot.as_deref())),
    ]);
    table.add_row(vec![
        Cell::new("Starring").add_attribute(Attribute::Bold),
        Cell::new(or_dash(detail.actors.as_deref())),
    ]);
    table.add_row(vec![
        Cell::new("Directed by").add_attribute(Attribute::Bold),
        Cell::new(or_dash(detail.director.as_deref())),
    ]);
    println!("{}", table);

    let Some(controls) = controls else {
        return;
    };

    if let Some(rating) = controls.watched_rating {
        println!("You rated this movie {} ⭐️", rating.value().to_string().yellow());
        return;
    }

    match controls.user_rating {
        Some(rating) => println!("Your rating: {} ⭐️", rating.value().to_string().yellow()),
        None => println!("{}", "Rate it with `rate <1-10>`".dimmed()),
    }
    match &controls.add_unavailable {
        None => println!("{}", "Type `add` to add it to your watched list".green()),
        Some(AddUnavailable::NoUserRating) => {}
        Some(reason) => println!("{} {}", "⚠".yellow(), reason),
    }
}

pub fn render_summary(stats: &WatchedStats) -> String {
    format!(
        "#️⃣ {} movies  ⭐️ {}  🌟 {}  ⏳ {}",
        stats.count,
        format_mean(stats.mean_imdb_rating),
        format_mean(stats.mean_user_rating),
        format_minutes(stats.mean_runtime),
    )
}

pub fn render_watched(watched: &WatchedCollection, output: &Output) {
    let stats = watched.aggregates();

    if !output.is_human() {
        output.json(&json!({
            "summary": stats,
            "watched": watched.entries(),
        }));
        return;
    }

    println!();
    println!("{}", "Movies you watched".bright_white().bold());
    println!("{}", render_summary(&stats));
    if watched.is_empty() {
        return;
    }

    let mut table = styled_table();
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("IMDb").add_attribute(Attribute::Bold),
        Cell::new("Yours").add_attribute(Attribute::Bold),
        Cell::new("Runtime").add_attribute(Attribute::Bold),
        Cell::new("IMDb ID").add_attribute(Attribute::Bold),
    ]);
    for (index, entry) in watched.entries().iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&entry.title).fg(Color::Cyan),
            Cell::new(entry.imdb_rating.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(entry.user_rating.value()).fg(Color::Yellow),
            Cell::new(format!("{} min", entry.runtime)),
            Cell::new(&entry.imdb_id).fg(Color::DarkGrey),
        ]);
    }
    println!("{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mean_two_decimals() {
        assert_eq!(format_mean(7.6), "7.60");
        assert_eq!(format_mean(0.0), "0.00");
        assert_eq!(format_mean(7.666_666), "7.67");
    }

    #[test]
    fn test_summary_of_empty_list() {
        let summary = render_summary(&WatchedStats::default());
        assert!(summary.contains("0 movies"));
        assert!(summary.contains("0.00 min"));
    }

    #[test]
    fn test_summary_values() {
        let stats = WatchedStats {
            count: 2,
            mean_imdb_rating: 7.6,
            mean_user_rating: 7.5,
            mean_runtime: 121.0,
        };
        let summary = render_summary(&stats);
        assert!(summary.contains("2 movies"));
        assert!(summary.contains("7.60"));
        assert!(summary.contains("7.50"));
        assert!(summary.contains("121.00 min"));
    }
}
