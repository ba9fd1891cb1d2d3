use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::models::event::EventRecord;
use crate::models::timestamp::{self, YearMonth};

pub const DEFAULT_TOP_N: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCount {
    pub day: NaiveDate,
    pub count: usize,
}

impl DayCount {
    /// `DD/MM`
    pub fn label(&self) -> String {
        timestamp::format_day_month(self.day)
    }
}

/// Counts events per local day of their start and returns the `top_n`
/// busiest days, most events first. Ties go to the earlier day.
pub fn busiest_days(events: &[EventRecord], top_n: usize, tz: Tz) -> Vec<DayCount> {
    let mut buckets: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for event in events {
        *buckets
            .entry(timestamp::local_date(event.start, tz))
            .or_default() += 1;
    }

    let mut ranked: Vec<DayCount> = buckets
        .into_iter()
        .map(|(day, count)| DayCount { day, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.day.cmp(&b.day)));
    ranked.truncate(top_n);
    ranked
}

pub fn render_busy_days(month: YearMonth, ranked: &[DayCount]) -> String {
    if ranked.is_empty() {
        return format!("Nenhuma reunião encontrada em {}.", month.label());
    }
    let mut body = format!("Dias mais ocupados em {}:\n", month.label());
    for day in ranked {
        body.push_str(&format!("- {}: {}\n", day.label(), meetings(day.count)));
    }
    body.trim_end().to_string()
}

fn meetings(count: usize) -> String {
    if count == 1 {
        "1 reunião".to_string()
    } else {
        format!("{} reuniões", count)
    }
}
