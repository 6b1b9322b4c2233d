//! Cell formatters shared by the list commands

use super::ColorTheme;
use crate::domain::apis::Condition;
use chrono::{DateTime, Duration, Utc};
use comfy_table::Cell;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

pub const EMPTY: &str = "<empty>";
pub const UNKNOWN: &str = "<unknown>";

pub fn format_empty_string(value: &str) -> Cell {
    if value.is_empty() {
        Cell::new(EMPTY).fg(ColorTheme::default().muted)
    } else {
        Cell::new(value)
    }
}

/// Type and Ref cells for a workload reference.
pub fn format_reference(reference: Option<(&str, String)>) -> [Cell; 2] {
    match reference {
        Some((kind, name)) => [Cell::new(kind), Cell::new(name)],
        None => {
            let muted = ColorTheme::default().muted;
            [Cell::new(UNKNOWN).fg(muted), Cell::new(UNKNOWN).fg(muted)]
        }
    }
}

/// Renders the Ready condition as shown in the Status column.
pub fn format_condition_status(ready: Option<&Condition>) -> Cell {
    let theme = ColorTheme::default();
    let color = theme.get_condition_color(ready);
    let text = match ready {
        None => UNKNOWN.to_string(),
        Some(condition) if condition.is_true() => "Ready".to_string(),
        Some(condition) if condition.is_false() => condition
            .reason
            .clone()
            .filter(|reason| !reason.is_empty())
            .unwrap_or_else(|| "not-Ready".to_string()),
        Some(_) => "Unknown".to_string(),
    };
    Cell::new(text).fg(color)
}

pub fn format_timestamp_since(timestamp: Option<&Time>, now: DateTime<Utc>) -> Cell {
    match timestamp {
        None => Cell::new(UNKNOWN).fg(ColorTheme::default().muted),
        Some(Time(time)) => Cell::new(human_duration(now.signed_duration_since(*time))),
    }
}

/// Short, rounded age in the style of `kubectl get`.
pub fn human_duration(d: Duration) -> String {
    let seconds = (d.num_milliseconds() as f64 / 1000.0).round() as i64;
    if seconds < -1 {
        return "<invalid>".to_string();
    } else if seconds < 0 {
        return "0s".to_string();
    } else if seconds < 60 * 2 {
        return format!("{}s", seconds);
    }

    let minutes = d.num_minutes();
    if minutes < 10 {
        let s = d.num_seconds() % 60;
        if s == 0 {
            return format!("{}m", minutes);
        }
        return format!("{}m{}s", minutes, s);
    } else if minutes < 60 * 3 {
        return format!("{}m", minutes);
    }

    let hours = d.num_hours();
    if hours < 8 {
        let m = minutes % 60;
        if m == 0 {
            return format!("{}h", hours);
        }
        format!("{}h{}m", hours, m)
    } else if hours < 48 {
        format!("{}h", hours)
    } else if hours < 24 * 8 {
        let h = hours % 24;
        if h == 0 {
            return format!("{}d", hours / 24);
        }
        format!("{}d{}h", hours / 24, h)
    } else if hours < 24 * 365 * 2 {
        format!("{}d", hours / 24)
    } else if hours < 24 * 365 * 8 {
        let dy = (hours / 24) % 365;
        if dy == 0 {
            return format!("{}y", hours / 24 / 365);
        }
        format!("{}y{}d", hours / 24 / 365, dy)
    } else {
        format!("{}y", hours / 24 / 365)
    }
}
