use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::schema::Terminal;

/// Separator between the articles of one day.
pub const DAY_SEPARATOR: &str = "\n\n";

/// A record whose date survived normalization, with its fused text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    pub text: String,
}

/// All text of one calendar date within one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub text: String,
}

/// Group by date, joining texts in input order; buckets come out ascending.
pub fn aggregate(records: Vec<NormalizedRecord>) -> Vec<DailyBucket> {
    let mut days: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
    for rec in records {
        days.entry(rec.date).or_default().push(rec.text);
    }
    days.into_iter()
        .map(|(date, texts)| DailyBucket {
            date,
            text: texts.join(DAY_SEPARATOR),
        })
        .collect()
}

/// Last per-source transform: daily buckets, or one row per record in input
/// order.
pub fn finish(records: Vec<NormalizedRecord>, terminal: Terminal) -> Vec<DailyBucket> {
    match terminal {
        Terminal::PerDay => aggregate(records),
        Terminal::PerRecord => records
            .into_iter()
            .map(|r| DailyBucket {
                date: r.date,
                text: r.text,
            })
            .collect(),
    }
}
