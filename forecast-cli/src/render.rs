//! Text and JSON rendering of the day summaries.

use std::fmt::Write as _;

use forecast_core::{DaySummary, ExtremesPolicy};

pub fn render_strip(location: &str, days: &[DaySummary], extremes: ExtremesPolicy) -> String {
    let mut out = format!("{location}\n");

    if days.is_empty() {
        out.push_str("  No daily forecast available.\n");
        return out;
    }

    for day in days {
        let label = if day.day.is_empty() { "---" } else { day.day.as_str() };
        let _ = write!(out, "  {label:<4}{:>4}°", day.avg_temp);
        if extremes == ExtremesPolicy::FromSource {
            let _ = write!(out, "   {}° / {}°", day.max_temp, day.min_temp);
        }
        out.push('\n');
    }

    out
}

pub fn render_json(days: &[DaySummary]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(days)?)
}
