use crate::geography::{Place, PlaceFilter};
use crate::original::OriginalVerse;
use crate::prism::types::{Document, DocumentList};
use crate::scripture::{Testament, VerseRef};
use crate::search::{Phase, SearchResult, SearchState};

const DOCUMENT_PREVIEW_LINES: usize = 200;
const LIST_SNIPPET_CHARS: usize = 80;

fn snippet(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

pub fn format_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No verses found for \"{query}\".");
    }
    let mut out = format!("{} result(s) for \"{query}\"\n\n", results.len());
    for (i, r) in results.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({}) [{}%]\n   {}\n\n",
            i + 1,
            r.verse_ref,
            r.translation.to_uppercase(),
            r.similarity_percent(),
            r.text.trim()
        ));
    }
    out.truncate(out.trim_end().len());
    out
}

/// One status line plus results, for the interactive watch loop.
pub fn format_state(state: &SearchState) -> String {
    let status = match state.phase() {
        Phase::Fetching => "searching...".to_string(),
        Phase::Debouncing => "waiting for input...".to_string(),
        Phase::Idle if state.query.is_empty() => "type at least 3 characters".to_string(),
        Phase::Idle => format!("{} result(s)", state.results.len()),
    };
    let mut out = format!("[{status}]");
    if let Some(ref error) = state.error {
        out.push_str(&format!("\nerror: {error}"));
    }
    if state.phase() == Phase::Idle && !state.query.is_empty() {
        out.push('\n');
        out.push_str(&format_results(&state.query, &state.results));
    }
    out
}

pub fn format_places(places: &[Place], filter: &PlaceFilter) -> String {
    let mut out = String::from("Places");
    if let Some(t) = filter.place_type {
        out.push_str(&format!(" type={t}"));
    }
    if let Some(c) = filter.confidence {
        out.push_str(&format!(" confidence={c}"));
    }
    out.push_str(&format!(": {}\n\n", places.len()));
    if places.is_empty() {
        out.push_str("No places match.");
        return out;
    }

    for p in places {
        out.push_str(&format!(
            "{} ({}) {:.4}, {:.4} confidence: {} ({})\n",
            p.name,
            p.place_type,
            p.latitude,
            p.longitude,
            p.confidence_level(),
            p.confidence_score.round()
        ));
        if !p.verses.is_empty() {
            let shown: Vec<_> = p.verses.iter().take(5).map(String::as_str).collect();
            out.push_str(&format!("  verses: {}", shown.join("; ")));
            if p.verses.len() > shown.len() {
                out.push_str(&format!(" (+{} more)", p.verses.len() - shown.len()));
            }
            out.push('\n');
        }
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn format_original(reference: &VerseRef, verse: &OriginalVerse) -> String {
    let testament = match reference.book.testament() {
        Testament::Old => "Old Testament",
        Testament::New => "New Testament",
    };
    let mut out = format!(
        "# {} ({})\n{testament}, {}\n\n",
        verse.reference,
        verse.language.as_str(),
        reference.book.genre.as_str()
    );
    out.push_str(&format!("{}\n{}\n\n", verse.text, verse.transliteration));

    if !verse.words.is_empty() {
        out.push_str("| Word | Transliteration | Strong's | Gloss |\n");
        out.push_str("|------|-----------------|----------|-------|\n");
        for w in &verse.words {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                w.text, w.transliteration, w.strongs, w.gloss
            ));
        }
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn format_document(doc: &Document) -> String {
    let title = doc.title.as_deref().unwrap_or(&doc.id);
    let mut out = format!("# {title}\n\n");
    out.push_str(&format!("id: {}\n", doc.id));
    if let Some(ref domain) = doc.domain {
        out.push_str(&format!("domain: {domain}\n"));
    }
    if let Some(meta) = doc.metadata.as_object().filter(|m| !m.is_empty()) {
        out.push_str("\n| Field | Value |\n|-------|-------|\n");
        for (key, value) in meta {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.push_str(&format!("| {key} | {value} |\n"));
        }
    }
    out.push('\n');

    let lines: Vec<_> = doc.content.lines().collect();
    if lines.len() > DOCUMENT_PREVIEW_LINES {
        out.push_str(&lines[..DOCUMENT_PREVIEW_LINES].join("\n"));
        out.push_str(&format!("\n\n... (truncated, {} lines total)", lines.len()));
    } else {
        out.push_str(&doc.content);
    }
    out
}

pub fn format_document_list(list: &DocumentList, offset: usize) -> String {
    if list.documents.is_empty() {
        return format!("No documents (total: {}).", list.total);
    }
    let mut out = format!(
        "documents {}-{} of {}\n\n",
        offset + 1,
        offset + list.documents.len(),
        list.total
    );
    for doc in &list.documents {
        let title = doc.title.as_deref().unwrap_or("(untitled)");
        out.push_str(&format!("{} {title}", doc.id));
        if let Some(ref domain) = doc.domain {
            out.push_str(&format!(" [{domain}]"));
        }
        out.push('\n');
        if !doc.content.trim().is_empty() {
            out.push_str(&format!("  {}\n", snippet(&doc.content, LIST_SNIPPET_CHARS)));
        }
    }
    out.truncate(out.trim_end().len());
    out
}
