use std::collections::BTreeSet;

use crate::scripture::Translation;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// Translation selection and result limit for verse search.
///
/// The selection may be empty. It is handed to the backend as-is; there is
/// no implicit "all translations" fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    pub translations: BTreeSet<Translation>,
    pub limit: usize,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            translations: BTreeSet::from([Translation::Kjv]),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl FilterSet {
    pub fn new(translations: impl IntoIterator<Item = Translation>, limit: usize) -> Self {
        Self {
            translations: translations.into_iter().collect(),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Add the translation if absent, remove it if present. Returns whether
    /// it is selected afterwards.
    pub fn toggle(&mut self, translation: Translation) -> bool {
        if self.translations.remove(&translation) {
            false
        } else {
            self.translations.insert(translation);
            true
        }
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.clamp(1, MAX_LIMIT);
    }
}
