use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::models::interval::{Interval, WorkingWindow};
use crate::models::timestamp;

/// Complement of `busy` within `window`, sorted by start.
///
/// Busy intervals may arrive unsorted, overlapping, nested or partly outside
/// the window. Zero-length and inverted intervals are ignored.
pub fn free_intervals(busy: &[Interval], window: &WorkingWindow) -> Vec<Interval> {
    let mut clipped: Vec<Interval> = busy
        .iter()
        .filter(|interval| !interval.is_degenerate())
        .filter(|interval| interval.start < window.day_end && interval.end > window.day_start)
        .map(|interval| {
            Interval::new(
                interval.start.max(window.day_start),
                interval.end.min(window.day_end),
            )
        })
        .collect();

    // sort_by_key is stable, so equal starts keep their input order.
    clipped.sort_by_key(|interval| interval.start);

    let mut free = Vec::new();
    let mut cursor = window.day_start;
    for interval in &clipped {
        if cursor < interval.start {
            free.push(Interval::new(cursor, interval.start));
        }
        cursor = cursor.max(interval.end);
    }

    if cursor < window.day_end {
        free.push(Interval::new(cursor, window.day_end));
    }

    free
}

pub fn render_free_time(date: NaiveDate, free: &[Interval], tz: Tz) -> String {
    let day = timestamp::format_day(date);
    if free.is_empty() {
        return format!("Nenhum horário livre em {} entre 08:00 e 18:00.", day);
    }
    let mut body = format!("Horários livres em {}:\n", day);
    for interval in free {
        body.push_str(&format!(
            "- {} às {}\n",
            timestamp::format_time(interval.start, tz),
            timestamp::format_time(interval.end, tz)
        ));
    }
    body.trim_end().to_string()
}
