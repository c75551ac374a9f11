use super::Reference;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Order in which the weekly plan walks through the catalog
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
pub enum CatalogOrder {
    /// Genesis to Revelation
    #[default]
    #[strum(serialize = "canonical")]
    #[serde(rename = "canonical")]
    Canonical,
    /// Roughly when each book was written
    #[strum(serialize = "chronological")]
    #[serde(rename = "chronological")]
    Chronological,
    /// Follows the story, with writings placed beside the events they belong to
    #[strum(serialize = "narrative")]
    #[serde(rename = "narrative")]
    Narrative,
    /// Grouped by kind of book: law, history, poetry, prophecy, gospels, letters
    #[strum(serialize = "book-type")]
    #[serde(rename = "book-type")]
    BookType,
}

impl CatalogOrder {
    pub const ALL: [CatalogOrder; 4] = [
        CatalogOrder::Canonical,
        CatalogOrder::Chronological,
        CatalogOrder::Narrative,
        CatalogOrder::BookType,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            CatalogOrder::Canonical => "Canonical Order",
            CatalogOrder::Chronological => "Chronological Order",
            CatalogOrder::Narrative => "Narrative Order",
            CatalogOrder::BookType => "Book Type Order",
        }
    }

    /// Position of `book` in this order. Unknown books sort last.
    pub fn book_rank(&self, book: &str) -> usize {
        let table: &[&str] = match self {
            CatalogOrder::Canonical => &CANONICAL,
            CatalogOrder::Chronological => &CHRONOLOGICAL,
            CatalogOrder::Narrative => &NARRATIVE,
            CatalogOrder::BookType => {
                return match canonical_index(book) {
                    Some(i) => BookKind::of(i) as usize * CANONICAL.len() + i,
                    None => usize::MAX,
                };
            }
        };
        table
            .iter()
            .position(|b| b.eq_ignore_ascii_case(book.trim()))
            .unwrap_or(usize::MAX)
    }

    /// Compare two references: book rank first, then chapter and verse
    pub fn compare(&self, a: &Reference, b: &Reference) -> Ordering {
        self.book_rank(&a.book)
            .cmp(&self.book_rank(&b.book))
            .then(a.chapter.cmp(&b.chapter))
            .then(a.start_verse.cmp(&b.start_verse))
    }
}

impl FromStr for CatalogOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CatalogOrder::ALL
            .into_iter()
            .find(|o| o.to_string() == s)
            .ok_or_else(|| format!("unknown catalog order: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BookKind {
    Law,
    History,
    Poetry,
    Prophecy,
    Gospel,
    Letter,
}

impl BookKind {
    fn of(canonical_index: usize) -> Self {
        match canonical_index {
            0..=4 => BookKind::Law,
            5..=16 | 43 => BookKind::History,
            17..=21 => BookKind::Poetry,
            22..=38 | 65 => BookKind::Prophecy,
            39..=42 => BookKind::Gospel,
            _ => BookKind::Letter,
        }
    }
}

fn canonical_index(book: &str) -> Option<usize> {
    CANONICAL
        .iter()
        .position(|b| b.eq_ignore_ascii_case(book.trim()))
}

const CANONICAL: [&str; 66] = [
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Proverbs", "Ecclesiastes", "Song of Solomon",
    "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel", "Amos",
    "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai", "Zechariah",
    "Malachi", "Matthew", "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians",
    "2 Corinthians", "Galatians", "Ephesians", "Philippians", "Colossians", "1 Thessalonians",
    "2 Thessalonians", "1 Timothy", "2 Timothy", "Titus", "Philemon", "Hebrews", "James",
    "1 Peter", "2 Peter", "1 John", "2 John", "3 John", "Jude", "Revelation",
];

const CHRONOLOGICAL: [&str; 66] = [
    "Genesis", "Job", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges",
    "Ruth", "1 Samuel", "2 Samuel", "1 Chronicles", "Psalms", "1 Kings", "Proverbs",
    "Ecclesiastes", "Song of Solomon", "2 Chronicles", "2 Kings", "Obadiah", "Joel", "Jonah",
    "Amos", "Hosea", "Micah", "Isaiah", "Nahum", "Zephaniah", "Habakkuk", "Jeremiah",
    "Lamentations", "Ezekiel", "Daniel", "Ezra", "Haggai", "Zechariah", "Esther", "Nehemiah",
    "Malachi", "James", "Galatians", "1 Thessalonians", "2 Thessalonians", "1 Corinthians",
    "2 Corinthians", "Romans", "Mark", "Matthew", "Luke", "Acts", "Ephesians", "Philippians",
    "Colossians", "Philemon", "1 Timothy", "Titus", "1 Peter", "2 Timothy", "2 Peter",
    "Hebrews", "Jude", "John", "1 John", "2 John", "3 John", "Revelation",
];

const NARRATIVE: [&str; 66] = [
    "Genesis", "Job", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges",
    "Ruth", "1 Samuel", "2 Samuel", "Psalms", "1 Kings", "Proverbs", "Ecclesiastes",
    "Song of Solomon", "2 Kings", "Jonah", "Amos", "Hosea", "Isaiah", "Micah", "Joel",
    "Obadiah", "Nahum", "Zephaniah", "Habakkuk", "Jeremiah", "Lamentations", "Ezekiel",
    "Daniel", "1 Chronicles", "2 Chronicles", "Ezra", "Haggai", "Zechariah", "Esther",
    "Nehemiah", "Malachi", "Matthew", "Mark", "Luke", "John", "Acts", "James", "Galatians",
    "1 Thessalonians", "2 Thessalonians", "1 Corinthians", "2 Corinthians", "Romans",
    "Ephesians", "Philippians", "Colossians", "Philemon", "1 Timothy", "Titus", "2 Timothy",
    "1 Peter", "2 Peter", "Hebrews", "Jude", "1 John", "2 John", "3 John", "Revelation",
];
