use std::time::Duration;

use tracing::debug;

use super::{LookupError, OriginalTextProvider, OriginalVerse, Word};
use crate::scripture::{OriginalLanguage, VerseRef};

const DEFAULT_LATENCY: Duration = Duration::from_millis(150);

struct Row {
    book: &'static str,
    chapter: u32,
    verse: u32,
    language: OriginalLanguage,
    text: &'static str,
    transliteration: &'static str,
    // surface, transliteration, Strong's, gloss
    words: &'static [(&'static str, &'static str, &'static str, &'static str)],
}

static TABLE: &[Row] = &[
    Row {
        book: "Genesis",
        chapter: 1,
        verse: 1,
        language: OriginalLanguage::Hebrew,
        text: "בְּרֵאשִׁית בָּרָא אֱלֹהִים אֵת הַשָּׁמַיִם וְאֵת הָאָרֶץ",
        transliteration: "bereshit bara elohim et hashamayim ve'et ha'arets",
        words: &[
            ("בְּרֵאשִׁית", "bereshit", "H7225", "in the beginning"),
            ("בָּרָא", "bara", "H1254", "created"),
            ("אֱלֹהִים", "elohim", "H430", "God"),
            ("אֵת", "et", "H853", "(object marker)"),
            ("הַשָּׁמַיִם", "hashamayim", "H8064", "the heavens"),
            ("וְאֵת", "ve'et", "H853", "and"),
            ("הָאָרֶץ", "ha'arets", "H776", "the earth"),
        ],
    },
    Row {
        book: "Psalms",
        chapter: 23,
        verse: 1,
        language: OriginalLanguage::Hebrew,
        text: "מִזְמוֹר לְדָוִד יְהוָה רֹעִי לֹא אֶחְסָר",
        transliteration: "mizmor ledavid YHWH ro'i lo echsar",
        words: &[
            ("מִזְמוֹר", "mizmor", "H4210", "a psalm"),
            ("לְדָוִד", "ledavid", "H1732", "of David"),
            ("יְהוָה", "YHWH", "H3068", "the LORD"),
            ("רֹעִי", "ro'i", "H7462", "my shepherd"),
            ("לֹא", "lo", "H3808", "not"),
            ("אֶחְסָר", "echsar", "H2637", "I shall lack"),
        ],
    },
    // Only the second half of the verse; the Aramaic section starts there.
    Row {
        book: "Daniel",
        chapter: 2,
        verse: 4,
        language: OriginalLanguage::Aramaic,
        text: "מַלְכָּא לְעָלְמִין חֱיִי אֱמַר חֶלְמָא לְעַבְדָיִךְ וּפִשְׁרָא נְחַוֵּא",
        transliteration: "malka le'almin cheyi emar chelma le'avdayikh ufishra nechavve",
        words: &[
            ("מַלְכָּא", "malka", "H4430", "O king"),
            ("לְעָלְמִין", "le'almin", "H5957", "forever"),
            ("חֱיִי", "cheyi", "H2418", "live"),
            ("אֱמַר", "emar", "H560", "tell"),
            ("חֶלְמָא", "chelma", "H2493", "the dream"),
            ("לְעַבְדָיִךְ", "le'avdayikh", "H5649", "to your servants"),
            ("וּפִשְׁרָא", "ufishra", "H6591", "and the interpretation"),
            ("נְחַוֵּא", "nechavve", "H2324", "we will show"),
        ],
    },
    Row {
        book: "John",
        chapter: 1,
        verse: 1,
        language: OriginalLanguage::Greek,
        text: "Ἐν ἀρχῇ ἦν ὁ λόγος, καὶ ὁ λόγος ἦν πρὸς τὸν θεόν, καὶ θεὸς ἦν ὁ λόγος.",
        transliteration: "En archē ēn ho logos, kai ho logos ēn pros ton theon, kai theos ēn ho logos.",
        words: &[
            ("Ἐν", "en", "G1722", "in"),
            ("ἀρχῇ", "archē", "G746", "beginning"),
            ("ἦν", "ēn", "G2258", "was"),
            ("ὁ", "ho", "G3588", "the"),
            ("λόγος", "logos", "G3056", "Word"),
            ("καὶ", "kai", "G2532", "and"),
            ("πρὸς", "pros", "G4314", "with"),
            ("τὸν", "ton", "G3588", "the"),
            ("θεόν", "theon", "G2316", "God"),
            ("θεὸς", "theos", "G2316", "God"),
        ],
    },
];

/// In-process original-language provider backed by a small built-in table.
/// Each lookup sleeps for `latency` to behave like a remote call.
#[derive(Debug, Clone)]
pub struct MockOriginalTexts {
    latency: Duration,
}

impl Default for MockOriginalTexts {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

impl MockOriginalTexts {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl OriginalTextProvider for MockOriginalTexts {
    async fn fetch_verse(&self, reference: &VerseRef) -> Result<Option<OriginalVerse>, LookupError> {
        tokio::time::sleep(self.latency).await;

        let row = TABLE.iter().find(|row| {
            row.book == reference.book.name
                && row.chapter == reference.chapter
                && row.verse == reference.verse
        });
        debug!(reference = %reference, found = row.is_some(), "original text lookup");

        Ok(row.map(|row| OriginalVerse {
            reference: reference.to_string(),
            language: row.language,
            text: row.text.to_string(),
            transliteration: row.transliteration.to_string(),
            words: row
                .words
                .iter()
                .map(|(text, translit, strongs, gloss)| Word {
                    text: text.to_string(),
                    transliteration: translit.to_string(),
                    strongs: strongs.to_string(),
                    gloss: gloss.to_string(),
                })
                .collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(s: &str) -> VerseRef {
        s.parse().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn finds_built_in_verses() {
        let provider = MockOriginalTexts::default();

        let genesis = provider.fetch_verse(&verse("Genesis 1:1")).await.unwrap().unwrap();
        assert_eq!(genesis.language, OriginalLanguage::Hebrew);
        assert_eq!(genesis.words.len(), 7);
        assert_eq!(genesis.words[2].strongs, "H430");

        let john = provider.fetch_verse(&verse("John 1:1")).await.unwrap().unwrap();
        assert_eq!(john.language, OriginalLanguage::Greek);
        assert_eq!(john.words[4].transliteration, "logos");
    }

    #[tokio::test(start_paused = true)]
    async fn daniel_court_tale_is_aramaic() {
        let provider = MockOriginalTexts::default();
        let daniel = provider.fetch_verse(&verse("Dan 2:4")).await.unwrap().unwrap();
        assert_eq!(daniel.reference, "Daniel 2:4");
        assert_eq!(daniel.language, OriginalLanguage::Aramaic);
        assert_eq!(daniel.language.as_str(), "Aramaic");
        assert_eq!(daniel.words[0].strongs, "H4430");
        assert_eq!(daniel.words.len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn alias_resolves_to_same_row() {
        let provider = MockOriginalTexts::default();
        let psalm = provider.fetch_verse(&verse("Psalm 23:1")).await.unwrap().unwrap();
        assert_eq!(psalm.reference, "Psalms 23:1");
        assert_eq!(psalm.words[3].gloss, "my shepherd");
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_verse_is_none() {
        let provider = MockOriginalTexts::default();
        assert!(provider.fetch_verse(&verse("Jude 1:25")).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_takes_simulated_latency() {
        let provider = MockOriginalTexts::new(Duration::from_millis(400));
        let start = tokio::time::Instant::now();
        provider.fetch_verse(&verse("John 1:1")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(400));
    }
}
