use std::fmt;
use std::str::FromStr;

use super::books::Book;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Invalid verse reference '{0}'. Use formats like 'Psalms 23:1' or 'I Samuel 3:4-6'.")]
    Malformed(String),

    #[error("Unknown book: '{0}'")]
    UnknownBook(String),

    #[error("Invalid verse range '{0}': end precedes start")]
    InvertedRange(String),
}

/// A single verse or a verse range within one chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseRef {
    pub book: &'static Book,
    pub chapter: u32,
    pub verse: u32,
    pub verse_end: Option<u32>,
}

impl VerseRef {
    pub fn new(book: &'static Book, chapter: u32, verse: u32) -> Self {
        Self {
            book,
            chapter,
            verse,
            verse_end: None,
        }
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book.name, self.chapter, self.verse)?;
        if let Some(end) = self.verse_end {
            write!(f, "-{end}")?;
        }
        Ok(())
    }
}

impl FromStr for VerseRef {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || ReferenceError::Malformed(trimmed.to_string());

        let (book_part, location) = trimmed.rsplit_once(char::is_whitespace).ok_or_else(malformed)?;
        let book = Book::lookup(book_part)
            .ok_or_else(|| ReferenceError::UnknownBook(book_part.trim().to_string()))?;

        let (chapter, verses) = location.split_once(':').ok_or_else(malformed)?;
        let chapter = parse_positive(chapter).ok_or_else(malformed)?;

        let (verse, verse_end) = match verses.split_once('-') {
            Some((start, end)) => {
                let start = parse_positive(start).ok_or_else(malformed)?;
                let end = parse_positive(end).ok_or_else(malformed)?;
                if end < start {
                    return Err(ReferenceError::InvertedRange(trimmed.to_string()));
                }
                (start, (end != start).then_some(end))
            }
            None => (parse_positive(verses).ok_or_else(malformed)?, None),
        };

        Ok(Self {
            book,
            chapter,
            verse,
            verse_end,
        })
    }
}

fn parse_positive(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_verse() {
        let r: VerseRef = "Psalms 23:1".parse().unwrap();
        assert_eq!(r.book.name, "Psalms");
        assert_eq!(r.chapter, 23);
        assert_eq!(r.verse, 1);
        assert_eq!(r.verse_end, None);
    }

    #[test]
    fn parses_multi_word_book_and_range() {
        let r: VerseRef = "Song of Solomon 2:1-3".parse().unwrap();
        assert_eq!(r.book.name, "Song of Solomon");
        assert_eq!(r.verse, 1);
        assert_eq!(r.verse_end, Some(3));
    }

    #[test]
    fn parses_numbered_book() {
        let r: VerseRef = "1 Samuel 3:10".parse().unwrap();
        assert_eq!(r.to_string(), "I Samuel 3:10");
    }

    #[test]
    fn degenerate_range_collapses() {
        let r: VerseRef = "John 3:16-16".parse().unwrap();
        assert_eq!(r.verse_end, None);
    }

    #[test]
    fn display_round_trips_range() {
        let r: VerseRef = "Matthew 5:3-12".parse().unwrap();
        assert_eq!(r.to_string(), "Matthew 5:3-12");
    }

    #[test]
    fn rejects_missing_colon() {
        assert!(matches!(
            "Psalms 23".parse::<VerseRef>(),
            Err(ReferenceError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!("Psalms 0:1".parse::<VerseRef>().is_err());
        assert!("Psalms 23:x".parse::<VerseRef>().is_err());
        assert!("".parse::<VerseRef>().is_err());
    }

    #[test]
    fn rejects_unknown_book() {
        assert_eq!(
            "Hezekiah 1:1".parse::<VerseRef>(),
            Err(ReferenceError::UnknownBook("Hezekiah".into()))
        );
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(matches!(
            "John 3:16-10".parse::<VerseRef>(),
            Err(ReferenceError::InvertedRange(_))
        ));
    }
}
