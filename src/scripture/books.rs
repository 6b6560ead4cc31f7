use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Testament {
    #[serde(rename = "OT")]
    Old,
    #[serde(rename = "NT")]
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Law,
    Narrative,
    Poetry,
    Wisdom,
    Prophecy,
    Gospel,
    Epistle,
}

impl Genre {
    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Law => "law",
            Genre::Narrative => "narrative",
            Genre::Poetry => "poetry",
            Genre::Wisdom => "wisdom",
            Genre::Prophecy => "prophecy",
            Genre::Gospel => "gospel",
            Genre::Epistle => "epistle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OriginalLanguage {
    Hebrew,
    Aramaic,
    Greek,
}

impl OriginalLanguage {
    pub fn as_str(self) -> &'static str {
        match self {
            OriginalLanguage::Hebrew => "Hebrew",
            OriginalLanguage::Aramaic => "Aramaic",
            OriginalLanguage::Greek => "Greek",
        }
    }
}

/// A book of the 66-book Protestant canon, in corpus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Book {
    pub name: &'static str,
    /// 1-based position in the canon.
    pub number: u8,
    pub genre: Genre,
}

impl Book {
    pub fn testament(&self) -> Testament {
        if self.number <= 39 {
            Testament::Old
        } else {
            Testament::New
        }
    }

    /// Primary language of the original text. Ezra and Daniel carry
    /// Aramaic sections but are catalogued as Hebrew.
    pub fn language(&self) -> OriginalLanguage {
        match self.testament() {
            Testament::Old => OriginalLanguage::Hebrew,
            Testament::New => OriginalLanguage::Greek,
        }
    }

    /// Resolve a book by its canonical name or a common alias.
    ///
    /// Matching is case-insensitive and accepts Arabic numeral prefixes
    /// (`1 Samuel`, `2Kings`) as well as the roman forms used by the corpus.
    pub fn lookup(name: &str) -> Option<&'static Book> {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return None;
        }

        BOOKS
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(&normalized))
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(&normalized))
                    .and_then(|(_, canonical)| BOOKS.iter().find(|b| b.name == *canonical))
            })
    }
}

fn normalize_name(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let (prefix, rest) = match collapsed.chars().next() {
        Some(c @ '1'..='3') => (c, collapsed[1..].trim_start()),
        _ => return collapsed,
    };
    let roman = match prefix {
        '1' => "I",
        '2' => "II",
        _ => "III",
    };
    format!("{roman} {rest}")
}

const fn book(name: &'static str, number: u8, genre: Genre) -> Book {
    Book {
        name,
        number,
        genre,
    }
}

pub static BOOKS: [Book; 66] = [
    book("Genesis", 1, Genre::Narrative),
    book("Exodus", 2, Genre::Narrative),
    book("Leviticus", 3, Genre::Law),
    book("Numbers", 4, Genre::Law),
    book("Deuteronomy", 5, Genre::Law),
    book("Joshua", 6, Genre::Narrative),
    book("Judges", 7, Genre::Narrative),
    book("Ruth", 8, Genre::Narrative),
    book("I Samuel", 9, Genre::Narrative),
    book("II Samuel", 10, Genre::Narrative),
    book("I Kings", 11, Genre::Narrative),
    book("II Kings", 12, Genre::Narrative),
    book("I Chronicles", 13, Genre::Narrative),
    book("II Chronicles", 14, Genre::Narrative),
    book("Ezra", 15, Genre::Narrative),
    book("Nehemiah", 16, Genre::Narrative),
    book("Esther", 17, Genre::Narrative),
    book("Job", 18, Genre::Poetry),
    book("Psalms", 19, Genre::Poetry),
    book("Proverbs", 20, Genre::Wisdom),
    book("Ecclesiastes", 21, Genre::Wisdom),
    book("Song of Solomon", 22, Genre::Poetry),
    book("Isaiah", 23, Genre::Prophecy),
    book("Jeremiah", 24, Genre::Prophecy),
    book("Lamentations", 25, Genre::Poetry),
    book("Ezekiel", 26, Genre::Prophecy),
    book("Daniel", 27, Genre::Prophecy),
    book("Hosea", 28, Genre::Prophecy),
    book("Joel", 29, Genre::Prophecy),
    book("Amos", 30, Genre::Prophecy),
    book("Obadiah", 31, Genre::Prophecy),
    book("Jonah", 32, Genre::Narrative),
    book("Micah", 33, Genre::Prophecy),
    book("Nahum", 34, Genre::Prophecy),
    book("Habakkuk", 35, Genre::Prophecy),
    book("Zephaniah", 36, Genre::Prophecy),
    book("Haggai", 37, Genre::Prophecy),
    book("Zechariah", 38, Genre::Prophecy),
    book("Malachi", 39, Genre::Prophecy),
    book("Matthew", 40, Genre::Gospel),
    book("Mark", 41, Genre::Gospel),
    book("Luke", 42, Genre::Gospel),
    book("John", 43, Genre::Gospel),
    book("Acts", 44, Genre::Narrative),
    book("Romans", 45, Genre::Epistle),
    book("I Corinthians", 46, Genre::Epistle),
    book("II Corinthians", 47, Genre::Epistle),
    book("Galatians", 48, Genre::Epistle),
    book("Ephesians", 49, Genre::Epistle),
    book("Philippians", 50, Genre::Epistle),
    book("Colossians", 51, Genre::Epistle),
    book("I Thessalonians", 52, Genre::Epistle),
    book("II Thessalonians", 53, Genre::Epistle),
    book("I Timothy", 54, Genre::Epistle),
    book("II Timothy", 55, Genre::Epistle),
    book("Titus", 56, Genre::Epistle),
    book("Philemon", 57, Genre::Epistle),
    book("Hebrews", 58, Genre::Epistle),
    book("James", 59, Genre::Epistle),
    book("I Peter", 60, Genre::Epistle),
    book("II Peter", 61, Genre::Epistle),
    book("I John", 62, Genre::Epistle),
    book("II John", 63, Genre::Epistle),
    book("III John", 64, Genre::Epistle),
    book("Jude", 65, Genre::Epistle),
    book("Revelation of John", 66, Genre::Prophecy),
];

static ALIASES: &[(&str, &str)] = &[
    ("Gen", "Genesis"),
    ("Exod", "Exodus"),
    ("Lev", "Leviticus"),
    ("Num", "Numbers"),
    ("Deut", "Deuteronomy"),
    ("Psalm", "Psalms"),
    ("Ps", "Psalms"),
    ("Prov", "Proverbs"),
    ("Eccl", "Ecclesiastes"),
    ("Song of Songs", "Song of Solomon"),
    ("Canticles", "Song of Solomon"),
    ("Isa", "Isaiah"),
    ("Jer", "Jeremiah"),
    ("Ezek", "Ezekiel"),
    ("Dan", "Daniel"),
    ("Matt", "Matthew"),
    ("Rom", "Romans"),
    ("Gal", "Galatians"),
    ("Eph", "Ephesians"),
    ("Phil", "Philippians"),
    ("Col", "Colossians"),
    ("Heb", "Hebrews"),
    ("Rev", "Revelation of John"),
    ("Revelation", "Revelation of John"),
];
