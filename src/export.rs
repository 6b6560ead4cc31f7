//! Text, JSON, and CSV serializations of a search result set.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::scripture::Translation;
use crate::search::SearchResult;

const RULE_WIDTH: usize = 80;
const SLUG_MAX_CHARS: usize = 30;

const TITLE: &str = "Bible Search Results";
const ATTRIBUTION: [&str; 2] = [
    "Generated by lectio using Prism semantic search.",
    "Scripture texts are in the public domain.",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Txt,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Everything an export is derived from. Output is a pure function of these
/// fields, so a fixed `timestamp` gives byte-identical files.
pub struct ExportInput<'a> {
    pub query: &'a str,
    pub translations: &'a [Translation],
    pub results: &'a [SearchResult],
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub contents: String,
}

impl ExportFile {
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.contents).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), bytes = self.contents.len(), "export written");
        Ok(path)
    }
}

/// Serialize `input` in `format`. Returns `None` when there are no results.
pub fn export(format: ExportFormat, input: &ExportInput<'_>) -> Result<Option<ExportFile>, ExportError> {
    if input.results.is_empty() {
        return Ok(None);
    }
    let contents = match format {
        ExportFormat::Txt => to_text(input),
        ExportFormat::Json => to_json(input)?,
        ExportFormat::Csv => to_csv(input.results),
    };
    Ok(Some(ExportFile {
        filename: filename(input.query, input.timestamp, format),
        contents,
    }))
}

/// `bible_search_<slug>_<YYYYMMDD_HHMMSS>.<ext>`
pub fn filename(query: &str, timestamp: DateTime<Utc>, format: ExportFormat) -> String {
    format!(
        "bible_search_{}_{}.{}",
        query_slug(query),
        timestamp.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

fn query_slug(query: &str) -> String {
    let slug: String = query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .take(SLUG_MAX_CHARS)
        .collect();
    if slug.is_empty() { "query".to_string() } else { slug }
}

fn to_text(input: &ExportInput<'_>) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let translations = input
        .translations
        .iter()
        .map(|t| t.id().to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::new();
    out.push_str(TITLE);
    out.push('\n');
    out.push_str(&format!("Query: \"{}\"\n", input.query));
    out.push_str(&format!("Results: {}\n", input.results.len()));
    out.push_str(&format!("Translations: {translations}\n"));
    out.push_str(&format!(
        "Date: {}\n",
        input.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&rule);
    out.push_str("\n\n");

    for (i, r) in input.results.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({})\n",
            i + 1,
            r.verse_ref,
            r.translation.to_uppercase()
        ));
        out.push_str(&format!("   Similarity: {}%\n", r.similarity_percent()));
        out.push_str(&format!("   {}\n\n", r.text.trim()));
    }

    out.push_str(&rule);
    out.push('\n');
    for line in ATTRIBUTION {
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
struct JsonExport<'a> {
    query: &'a str,
    timestamp: String,
    translations: Vec<&'static str>,
    total_results: usize,
    results: Vec<JsonResult<'a>>,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    verse_ref: &'a str,
    book: Option<&'a str>,
    chapter: Option<u32>,
    verse: Option<u32>,
    translation: &'a str,
    text: &'a str,
    similarity: f64,
}

fn to_json(input: &ExportInput<'_>) -> Result<String, serde_json::Error> {
    let doc = JsonExport {
        query: input.query,
        timestamp: input.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        translations: input.translations.iter().map(|t| t.id()).collect(),
        total_results: input.results.len(),
        results: input
            .results
            .iter()
            .map(|r| JsonResult {
                verse_ref: &r.verse_ref,
                book: r.book.as_deref(),
                chapter: r.chapter,
                verse: r.verse,
                translation: &r.translation,
                text: &r.text,
                similarity: r.similarity,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&doc)
}

fn to_csv(results: &[SearchResult]) -> String {
    let mut out = String::from("Reference,Book,Chapter,Verse,Translation,Similarity,Text\n");
    for r in results {
        let chapter = r.chapter.map(|c| c.to_string()).unwrap_or_default();
        let verse = r.verse.map(|v| v.to_string()).unwrap_or_default();
        let fields = [
            csv_field(&r.verse_ref),
            csv_field(r.book.as_deref().unwrap_or("")),
            chapter,
            verse,
            csv_field(&r.translation),
            format!("{}%", r.similarity_percent()),
            quote(&r.text),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quote(value)
    } else {
        value.to_string()
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
