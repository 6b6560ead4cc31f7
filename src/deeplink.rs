//! Deep-link parameters: initial query, passage selection, and view mode.

use tracing::warn;
use url::Url;

use crate::scripture::{Book, Translation, VerseRef};

#[derive(Debug, thiserror::Error)]
pub enum DeepLinkError {
    #[error("Invalid link '{0}': {1}")]
    Invalid(String, url::ParseError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Search,
    Reader,
    Parallel,
    Original,
}

impl ViewMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "reader" | "read" => ViewMode::Reader,
            "parallel" | "compare" => ViewMode::Parallel,
            "original" | "interlinear" => ViewMode::Original,
            "search" => ViewMode::Search,
            other => {
                warn!(view = other, "unknown view mode, using search");
                ViewMode::Search
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepLink {
    pub query: Option<String>,
    pub book: Option<String>,
    pub chapter: Option<u32>,
    pub verse: Option<u32>,
    pub translations: Vec<Translation>,
    pub view: ViewMode,
}

impl DeepLink {
    /// Parse a full URL (`https://host/search?q=...`), a query string
    /// (`?q=...`), or bare parameters (`q=...`).
    pub fn parse(input: &str) -> Result<Self, DeepLinkError> {
        let trimmed = input.trim();
        let url = match Url::parse(trimmed) {
            Ok(url) => url,
            Err(_) => {
                let query = trimmed.trim_start_matches('?');
                Url::parse(&format!("lectio://link/?{query}"))
                    .map_err(|e| DeepLinkError::Invalid(trimmed.to_string(), e))?
            }
        };

        let mut link = DeepLink::default();
        for (key, value) in url.query_pairs() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "q" | "query" => link.query = Some(value.to_string()),
                "book" => link.book = Some(value.to_string()),
                "chapter" => link.chapter = parse_number("chapter", value),
                "verse" => link.verse = parse_number("verse", value),
                "translations" | "translation" => {
                    for id in value.split(',').filter(|s| !s.trim().is_empty()) {
                        match Translation::from_id(id) {
                            Some(t) if !link.translations.contains(&t) => link.translations.push(t),
                            Some(_) => {}
                            None => warn!(translation = id, "ignoring unknown translation in link"),
                        }
                    }
                }
                "view" => link.view = ViewMode::parse(value),
                _ => {}
            }
        }
        Ok(link)
    }

    /// The selected passage, when book, chapter, and verse are all present
    /// and the book is known.
    pub fn passage(&self) -> Option<VerseRef> {
        let book = Book::lookup(self.book.as_deref()?)?;
        Some(VerseRef::new(book, self.chapter?, self.verse?))
    }
}

fn parse_number(name: &str, value: &str) -> Option<u32> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!(param = name, value, "ignoring malformed number in link");
            None
        }
    }
}
