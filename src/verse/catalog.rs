use super::{CatalogOrder, Verse};
use chrono::{Datelike, Duration, NaiveDate};
use include_dir::{include_dir, Dir};
use serde::Deserialize;

static VERSE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/verses");

/// A verse of the week together with its study context
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WeeklyVerse {
    pub verse: Verse,
    #[serde(default)]
    pub context_before: Option<String>,
    #[serde(default)]
    pub context_after: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
}

/// How weeks map onto catalog entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Schedule {
    pub order: CatalogOrder,
    /// First day of the plan. Without one the ISO week number picks the entry.
    pub started: Option<NaiveDate>,
}

impl Schedule {
    pub fn new(order: CatalogOrder, started: Option<NaiveDate>) -> Self {
        Self { order, started }
    }

    /// Zero-based week of the plan that `date` falls in
    pub fn week_index(&self, date: NaiveDate) -> usize {
        match self.started {
            Some(start) => {
                let weeks = (week_start(date) - week_start(start)).num_weeks();
                weeks.max(0) as usize
            }
            None => date.iso_week().week() as usize,
        }
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub name: String,
    pub verses: Vec<WeeklyVerse>,
}

impl Catalog {
    /// The catalog compiled into the binary
    pub fn builtin() -> Result<Self, serde_json::Error> {
        let contents = VERSE_DIR
            .get_file("catalog.json")
            .and_then(|f| f.contents_utf8())
            .unwrap_or_default();
        Self::from_json(contents)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let catalog: Catalog = serde_json::from_str(json)?;
        if catalog.verses.is_empty() {
            return Err(serde::de::Error::custom("verse catalog has no entries"));
        }
        Ok(catalog)
    }

    /// Entries sorted by `order`. Unparsable references go last in file order.
    pub fn ordered(&self, order: CatalogOrder) -> Vec<&WeeklyVerse> {
        let mut entries: Vec<_> = self
            .verses
            .iter()
            .map(|w| (w.verse.parsed_reference().ok(), w))
            .collect();
        entries.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => order.compare(a, b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        entries.into_iter().map(|(_, w)| w).collect()
    }

    /// The verse scheduled for the week containing `date`
    pub fn for_date(&self, date: NaiveDate, schedule: &Schedule) -> &WeeklyVerse {
        let entries = self.ordered(schedule.order);
        entries[schedule.week_index(date) % entries.len()]
    }

    /// Look up an entry by its reference, ignoring case
    pub fn find(&self, reference: &str) -> Option<&WeeklyVerse> {
        self.verses
            .iter()
            .find(|w| w.verse.reference().eq_ignore_ascii_case(reference.trim()))
    }
}

/// Day within the memorization week, Monday = 1 .. Sunday = 7
pub fn week_day(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}
