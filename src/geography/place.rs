use std::fmt;

use serde::Serialize;

use crate::prism::types::{Document, meta_f64, meta_str, meta_str_list};

/// Identification confidence for a place, bucketed from a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Moderate,
    Low,
}

impl ConfidenceLevel {
    /// `high` at 300 and above, `moderate` from 80, `low` for everything
    /// else, including negative and NaN scores.
    pub fn from_score(score: f64) -> Self {
        if score >= 300.0 {
            ConfidenceLevel::High
        } else if score >= 80.0 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Moderate => "moderate",
            ConfidenceLevel::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PlaceType {
    Settlement,
    Region,
    Mountain,
    Hill,
    River,
    BodyOfWater,
    Valley,
    Island,
    Spring,
    Desert,
    Unknown,
}

impl PlaceType {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaceType::Settlement => "settlement",
            PlaceType::Region => "region",
            PlaceType::Mountain => "mountain",
            PlaceType::Hill => "hill",
            PlaceType::River => "river",
            PlaceType::BodyOfWater => "body_of_water",
            PlaceType::Valley => "valley",
            PlaceType::Island => "island",
            PlaceType::Spring => "spring",
            PlaceType::Desert => "desert",
            PlaceType::Unknown => "unknown",
        }
    }

    /// Lenient parse of the corpus labels (`"body of water"`, `"City"`, ...).
    /// Anything unrecognized is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "settlement" | "city" | "town" | "village" => PlaceType::Settlement,
            "region" | "territory" | "land" => PlaceType::Region,
            "mountain" | "mount" => PlaceType::Mountain,
            "hill" => PlaceType::Hill,
            "river" | "stream" | "wadi" => PlaceType::River,
            "body_of_water" | "sea" | "lake" => PlaceType::BodyOfWater,
            "valley" => PlaceType::Valley,
            "island" => PlaceType::Island,
            "spring" | "well" => PlaceType::Spring,
            "desert" | "wilderness" => PlaceType::Desert,
            _ => PlaceType::Unknown,
        }
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub place_type: PlaceType,
    pub latitude: f64,
    pub longitude: f64,
    pub confidence_score: f64,
    pub verses: Vec<String>,
}

impl Place {
    /// Decode a geography document. Missing fields take neutral defaults
    /// (unknown type, zero coordinates and score, no verses) so one bad
    /// record does not fail the listing.
    pub fn from_document(doc: &Document) -> Self {
        let meta = &doc.metadata;
        let name = meta_str(meta, &["name", "place_name"])
            .or_else(|| doc.title.clone().filter(|t| !t.trim().is_empty()))
            .unwrap_or_else(|| doc.id.clone());

        Self {
            id: doc.id.clone(),
            name,
            place_type: meta_str(meta, &["place_type", "type"])
                .map(|t| PlaceType::from_label(&t))
                .unwrap_or(PlaceType::Unknown),
            latitude: finite_or_zero(meta_f64(meta, &["latitude", "lat"])),
            longitude: finite_or_zero(meta_f64(meta, &["longitude", "lon", "lng"])),
            confidence_score: finite_or_zero(meta_f64(meta, &["confidence", "confidence_score"])),
            verses: meta_str_list(meta, &["verses", "verse_refs"]),
        }
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence_score)
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}
