use crate::domain::AnidbId;
use crate::parser::PartialDate;
use serde::{Deserialize, Serialize};

/// Unified media record produced for every AniDB title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub uuid: String,
    pub title_display: String,
    pub title_native: Option<String>,
    pub title_english: String,
    pub title_transliteration: String,
    pub synonyms: Vec<String>,
    pub is_adult: Option<bool>,
    pub media_type: String,
    pub media_sub_type: MediaSubType,
    pub year: Option<i32>,
    pub start_date: Option<PartialDate>,
    pub end_date: Option<PartialDate>,
    pub unit_counts: Option<u32>,
    pub unit_order: Option<u32>,
    pub subunit_counts: u32,
    pub subunit_order: u32,
    pub volume_counts: Option<u32>,
    pub volume_order: Option<u32>,
    pub season: Option<Season>,
    pub picture_urls: Vec<PictureUrls>,
    pub country_of_origin: Option<CountryCode>,
    pub mappings: RelationMaps,
    pub source_data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaSubType {
    #[serde(rename = "TV")]
    Tv,
    #[serde(rename = "OVA")]
    Ova,
    Movie,
    Special,
    #[serde(rename = "ONA")]
    Ona,
    Music,
    Unknown,
}

impl MediaSubType {
    /// Maps AniDB's free-text `<type>` value.
    #[must_use]
    pub fn from_anidb(value: &str) -> Self {
        match value {
            "TV Series" => Self::Tv,
            "OVA" => Self::Ova,
            "Movie" => Self::Movie,
            "Other" | "TV Special" => Self::Special,
            "Web" => Self::Ona,
            "Music Video" => Self::Music,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tv => "TV",
            Self::Ova => "OVA",
            Self::Movie => "Movie",
            Self::Special => "Special",
            Self::Ona => "ONA",
            Self::Music => "Music",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for MediaSubType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    #[must_use]
    pub const fn from_month(month: u32) -> Option<Self> {
        match month {
            1..=3 => Some(Self::Winter),
            4..=6 => Some(Self::Spring),
            7..=9 => Some(Self::Summer),
            10..=12 => Some(Self::Fall),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountryCode {
    #[serde(rename = "JP")]
    Japan,
    #[serde(rename = "KR")]
    SouthKorea,
    #[serde(rename = "KP")]
    NorthKorea,
    #[serde(rename = "CN")]
    China,
    #[serde(rename = "TW")]
    Taiwan,
}

impl CountryCode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Japan => "JP",
            Self::SouthKorea => "KR",
            Self::NorthKorea => "KP",
            Self::China => "CN",
            Self::Taiwan => "TW",
        }
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureUrls {
    pub original: String,
}

/// Identifiers of the same title on other sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMaps {
    pub anidb: AnidbId,
    pub allcinema: Option<u64>,
    pub animenewsnetwork: Option<u64>,
    pub myanimelist: Option<u64>,
    pub syoboical: Option<u64>,
    pub bangumi: Option<u64>,
    pub douban: Option<u64>,
    pub anison: Option<u64>,
    pub tmdb: Option<ConventionalMapping>,
    pub imdb: Option<ConventionalMapping>,
}

impl RelationMaps {
    #[must_use]
    pub const fn new(anidb: AnidbId) -> Self {
        Self {
            anidb,
            allcinema: None,
            animenewsnetwork: None,
            myanimelist: None,
            syoboical: None,
            bangumi: None,
            douban: None,
            anison: None,
            tmdb: None,
            imdb: None,
        }
    }
}

/// External id paired with an optional media kind, for sites where the id alone is ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionalMapping {
    pub id: ExternalId,
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalId {
    Numeric(u64),
    Text(String),
}
