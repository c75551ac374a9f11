pub mod catalog;
pub mod order;

pub use catalog::{Catalog, Schedule, WeeklyVerse};
pub use order::CatalogOrder;

use crate::error::VerseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A verse loaded into an exercise. Text is guaranteed to contain at least one word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVerse")]
pub struct Verse {
    text: String,
    reference: String,
    translation: String,
}

#[derive(Deserialize)]
struct RawVerse {
    text: String,
    reference: String,
    #[serde(default = "default_translation")]
    translation: String,
}

fn default_translation() -> String {
    "KJV".to_string()
}

impl TryFrom<RawVerse> for Verse {
    type Error = VerseError;

    fn try_from(raw: RawVerse) -> Result<Self, Self::Error> {
        Verse::new(raw.text, raw.reference, raw.translation)
    }
}

impl Verse {
    pub fn new(
        text: impl Into<String>,
        reference: impl Into<String>,
        translation: impl Into<String>,
    ) -> Result<Self, VerseError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(VerseError::EmptyText);
        }
        Ok(Self {
            text,
            reference: reference.into(),
            translation: translation.into(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn translation(&self) -> &str {
        &self.translation
    }

    pub fn parsed_reference(&self) -> Result<Reference, VerseError> {
        self.reference.parse()
    }
}

/// A parsed `Book chapter:start[-end]` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub book: String,
    pub chapter: u16,
    pub start_verse: u16,
    pub end_verse: u16,
}

impl Reference {
    pub fn is_range(&self) -> bool {
        self.end_verse != self.start_verse
    }

    /// "5" for a single verse, "5-6" for a range
    pub fn verses_label(&self) -> String {
        if self.is_range() {
            format!("{}-{}", self.start_verse, self.end_verse)
        } else {
            self.start_verse.to_string()
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verses_label())
    }
}

impl FromStr for Reference {
    type Err = VerseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VerseError::InvalidReference(s.to_string());
        let trimmed = s.trim();

        let (book, location) = trimmed.rsplit_once(char::is_whitespace).ok_or_else(invalid)?;
        let book = book.trim();
        if !book.chars().any(char::is_alphabetic) {
            return Err(invalid());
        }

        let (chapter, verses) = location.split_once(':').ok_or_else(invalid)?;
        let chapter = chapter.parse::<u16>().map_err(|_| invalid())?;

        let (start_verse, end_verse) = match verses.split_once('-') {
            Some((start, end)) => (
                start.parse::<u16>().map_err(|_| invalid())?,
                end.parse::<u16>().map_err(|_| invalid())?,
            ),
            None => {
                let single = verses.parse::<u16>().map_err(|_| invalid())?;
                (single, single)
            }
        };

        if end_verse < start_verse {
            return Err(invalid());
        }

        Ok(Self {
            book: book.to_string(),
            chapter,
            start_verse,
            end_verse,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_verse_rejected() {
        assert_eq!(
            Verse::new("", "Proverbs 3:5", "KJV"),
            Err(VerseError::EmptyText)
        );
        assert_eq!(
            Verse::new("  \t\n ", "Proverbs 3:5", "KJV"),
            Err(VerseError::EmptyText)
        );
    }

    #[test]
    fn test_verse_accessors() {
        let verse = Verse::new("Jesus wept.", "John 11:35", "KJV").unwrap();
        assert_eq!(verse.text(), "Jesus wept.");
        assert_eq!(verse.reference(), "John 11:35");
        assert_eq!(verse.translation(), "KJV");
    }

    #[test]
    fn test_verse_deserialize_validates_text() {
        let ok: Verse =
            serde_json::from_str(r#"{"text": "Pray without ceasing.", "reference": "1 Thessalonians 5:17"}"#)
                .unwrap();
        assert_eq!(ok.translation(), "KJV");

        let err = serde_json::from_str::<Verse>(r#"{"text": " ", "reference": "John 1:1"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_parse_single_verse_reference() {
        let r: Reference = "Proverbs 3:5".parse().unwrap();
        assert_eq!(r.book, "Proverbs");
        assert_eq!(r.chapter, 3);
        assert_eq!(r.start_verse, 5);
        assert_eq!(r.end_verse, 5);
        assert!(!r.is_range());
        assert_eq!(r.verses_label(), "5");
    }

    #[test]
    fn test_parse_range_reference() {
        let r: Reference = "Proverbs 3:5-6".parse().unwrap();
        assert!(r.is_range());
        assert_eq!(r.verses_label(), "5-6");
        assert_eq!(r.to_string(), "Proverbs 3:5-6");
    }

    #[test]
    fn test_parse_numbered_and_multiword_books() {
        let r: Reference = "1 John 4:19".parse().unwrap();
        assert_eq!(r.book, "1 John");
        assert_eq!(r.chapter, 4);

        let r: Reference = "Song of Solomon 2:4".parse().unwrap();
        assert_eq!(r.book, "Song of Solomon");
    }

    #[test]
    fn test_parse_invalid_references() {
        for bad in ["", "Proverbs", "Proverbs 3", "Proverbs x:5", "3:5", "Proverbs 3:6-5", "12 3:4"] {
            assert!(bad.parse::<Reference>().is_err(), "{bad:?} should not parse");
        }
    }
}
