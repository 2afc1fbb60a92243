// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Stopwatch display: `h:mm:ss` from one hour on, `mm:ss` below.
pub fn format_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Human duration for history lists: "45 min", "1h 5min", "2d 3h".
pub fn format_duration_minutes(minutes: i64) -> String {
    let minutes = minutes.max(0);
    match minutes {
        0..=59 => format!("{} min", minutes),
        60..=1439 => {
            let (hours, mins) = (minutes / 60, minutes % 60);
            if mins > 0 {
                format!("{}h {}min", hours, mins)
            } else {
                format!("{}h", hours)
            }
        }
        _ => {
            let (days, hours) = (minutes / 1440, (minutes % 1440) / 60);
            if hours > 0 {
                format!("{}d {}h", days, hours)
            } else {
                format!("{}d", days)
            }
        }
    }
}
