use std::fmt;

use serde::{Deserialize, Serialize};

/// English translations indexed in the Prism corpus, one domain each
/// (`bible/<id>`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Translation {
    Kjv,
    Asv,
    Bbe,
    Dby,
    Wbt,
    Web,
    Ylt,
}

impl Translation {
    pub const ALL: [Translation; 7] = [
        Translation::Kjv,
        Translation::Asv,
        Translation::Bbe,
        Translation::Dby,
        Translation::Wbt,
        Translation::Web,
        Translation::Ylt,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Translation::Kjv => "kjv",
            Translation::Asv => "asv",
            Translation::Bbe => "bbe",
            Translation::Dby => "dby",
            Translation::Wbt => "wbt",
            Translation::Web => "web",
            Translation::Ylt => "ylt",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Translation::Kjv => "King James Version",
            Translation::Asv => "American Standard Version",
            Translation::Bbe => "Bible in Basic English",
            Translation::Dby => "Darby Translation",
            Translation::Wbt => "Webster's Bible",
            Translation::Web => "World English Bible",
            Translation::Ylt => "Young's Literal Translation",
        }
    }

    pub fn domain(self) -> String {
        format!("bible/{}", self.id())
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(id.trim()))
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
