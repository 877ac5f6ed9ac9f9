use chrono::{DateTime, Utc};

/// Relative label for `published` as seen at `now`.
///
/// Under a minute (or in the future) is "just now"; then minutes, hours and
/// days up to a week; anything older shows the abbreviated month and day.
pub fn format_relative_time(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(ts) = published else {
        return String::new();
    };

    let diff = now.signed_duration_since(ts).num_seconds();

    if diff < 60 {
        return "just now".to_string();
    }
    if diff < 3600 {
        return plural(diff / 60, "minute");
    }
    if diff < 86_400 {
        return plural(diff / 3600, "hour");
    }
    if diff < 604_800 {
        return plural(diff / 86_400, "day");
    }

    ts.format("%b %d").to_string()
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}
