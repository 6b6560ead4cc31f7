//! Original-language (Hebrew, Aramaic, Greek) verse lookup.

mod mock;

pub use mock::MockOriginalTexts;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::cache::{ResponseCache, fingerprint};
use crate::scripture::{OriginalLanguage, VerseRef};

pub const ORIGINAL_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Original text lookup takes a single verse, got '{0}'")]
    Range(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    pub text: String,
    pub transliteration: String,
    pub strongs: String,
    pub gloss: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginalVerse {
    pub reference: String,
    pub language: OriginalLanguage,
    pub text: String,
    pub transliteration: String,
    pub words: Vec<Word>,
}

/// Source of original-language verse text.
pub trait OriginalTextProvider: Send + Sync + 'static {
    /// `Ok(None)` when the provider has no text for the verse.
    fn fetch_verse(
        &self,
        reference: &VerseRef,
    ) -> impl Future<Output = Result<Option<OriginalVerse>, LookupError>> + Send;
}

pub struct LanguageLookup<P> {
    provider: P,
    cache: ResponseCache<OriginalVerse>,
}

impl<P: OriginalTextProvider> LanguageLookup<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            cache: ResponseCache::new(ORIGINAL_TTL),
        }
    }

    /// Look up one verse. Found verses are cached for 30 minutes; misses
    /// are not cached so a provider that gains the verse is asked again.
    pub async fn lookup(&self, reference: &VerseRef) -> Result<Option<OriginalVerse>, LookupError> {
        if reference.verse_end.is_some() {
            return Err(LookupError::Range(reference.to_string()));
        }

        let key = fingerprint(
            "original",
            [
                reference.book.name.to_string(),
                reference.chapter.to_string(),
                reference.verse.to_string(),
            ],
        );
        if let Some(verse) = self.cache.get(&key) {
            debug!(%reference, "original text served from cache");
            return Ok(Some(verse));
        }

        let verse = self.provider.fetch_verse(reference).await?;
        if let Some(verse) = &verse {
            self.cache.put(key, verse.clone());
        }
        Ok(verse)
    }
}
