use crate::prism::types::{SearchHit, meta_str, meta_u32};
use crate::scripture::{Translation, VerseRef};

/// One verse (or verse range) returned for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub document_id: String,
    pub verse_ref: String,
    pub book: Option<String>,
    pub chapter: Option<u32>,
    pub verse: Option<u32>,
    pub translation: String,
    pub text: String,
    /// Relevance in `[0, 1]`.
    pub similarity: f64,
}

impl SearchResult {
    /// Build a result from a raw hit, falling back field by field when the
    /// hit's metadata is incomplete.
    pub fn from_hit(hit: SearchHit, requested: Translation) -> Self {
        let meta = &hit.metadata;

        let mut book = meta_str(meta, &["book", "book_name"]);
        let mut chapter = meta_u32(meta, &["chapter"]);
        let mut verse = meta_u32(meta, &["verse_start", "verse"]);
        let mut verse_end = meta_u32(meta, &["verse_end"]);

        if (book.is_none() || chapter.is_none() || verse.is_none())
            && let Some(parsed) = hit.title.as_deref().and_then(parse_title)
        {
            book = book.or_else(|| Some(parsed.book.name.to_string()));
            chapter = chapter.or(Some(parsed.chapter));
            verse = verse.or(Some(parsed.verse));
            verse_end = verse_end.or(parsed.verse_end);
        }

        let verse_ref = match (&book, chapter, verse) {
            (Some(b), Some(c), Some(v)) => match verse_end.filter(|end| *end > v) {
                Some(end) => format!("{b} {c}:{v}-{end}"),
                None => format!("{b} {c}:{v}"),
            },
            _ => hit
                .title
                .as_deref()
                .map(strip_translation_suffix)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .unwrap_or_else(|| hit.document_id.clone()),
        };

        let translation = meta_str(meta, &["translation"])
            .map(|t| t.to_lowercase())
            .unwrap_or_else(|| requested.id().to_string());

        let similarity = hit
            .score
            .filter(|s| s.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);

        Self {
            document_id: hit.document_id,
            verse_ref,
            book,
            chapter,
            verse,
            translation,
            text: hit.content.trim().to_string(),
            similarity,
        }
    }

    /// Similarity as a whole percentage, e.g. `0.87` → `87`.
    pub fn similarity_percent(&self) -> i64 {
        (self.similarity * 100.0).round() as i64
    }
}

/// Corpus titles look like `Psalms 23:1 (kjv)` or `Psalms 23:1-6 (kjv)`.
fn strip_translation_suffix(title: &str) -> &str {
    let title = title.trim();
    match title.rfind(" (") {
        Some(idx) if title.ends_with(')') => title[..idx].trim_end(),
        _ => title,
    }
}

fn parse_title(title: &str) -> Option<VerseRef> {
    strip_translation_suffix(title).parse().ok()
}
