//! Field queries over a single AniDB anime document.
//!
//! [`AnimeDocument`] wraps the parsed element tree and derives every
//! normalized field (titles, dates, runtime, country, external ids) from it.
//! Nothing here touches the filesystem.

pub mod country;
pub mod sites;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::warn;

use crate::constants::{POSTER_BASE_URL, UNKNOWN_START_SENTINEL};
use crate::domain::AnidbId;
use crate::models::{
    ConventionalMapping, CountryCode, ExternalId, MediaSubType, RelationMaps, Season,
};
use crate::parser::document::Node;
use crate::parser::{Element, PartialDate};
use crate::services::extractor::ExtractError;

pub use country::country_for_tag;
pub use sites::Site;

/// One entry of the `<ratings>` block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rating {
    pub count: u64,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct AnimeDocument {
    root: Element,
}

impl AnimeDocument {
    pub fn parse(xml: &str) -> Result<Self, ExtractError> {
        let root = Element::parse(xml)
            .map_err(|e| ExtractError::MalformedDocument(e.to_string()))?;
        Ok(Self { root })
    }

    fn official_title(&self, lang: &str) -> Option<String> {
        self.root
            .first_text_matching("title", &[("type", "official"), ("xml:lang", lang)])
            .filter(|t| !t.is_empty())
    }

    /// The `id` attribute of the `<anime>` element.
    pub fn media_id(&self) -> Result<AnidbId, ExtractError> {
        let anime = self
            .root
            .descendants("anime")
            .into_iter()
            .next()
            .ok_or_else(|| ExtractError::MalformedDocument("missing <anime> element".into()))?;

        let raw = anime
            .attr("id")
            .ok_or_else(|| ExtractError::MalformedDocument("missing <anime id>".into()))?;

        raw.parse().map_err(|_| {
            ExtractError::MalformedDocument(format!("non-numeric <anime id=\"{raw}\">"))
        })
    }

    #[must_use]
    pub fn sub_type(&self) -> MediaSubType {
        self.root
            .first_text("type")
            .map_or(MediaSubType::Unknown, |t| MediaSubType::from_anidb(&t))
    }

    /// Raw `<episodecount>`; zero when absent or not a number.
    #[must_use]
    pub fn episode_count(&self) -> u32 {
        self.root
            .first_text("episodecount")
            .and_then(|t| t.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn end_date(&self) -> Result<PartialDate, ExtractError> {
        let raw = self.root.first_text("enddate").unwrap_or_default();
        Ok(PartialDate::parse(&raw)?)
    }

    /// Start date, with `1970-01-01` read as unknown when no end date is recorded.
    pub fn start_date(&self) -> Result<PartialDate, ExtractError> {
        let raw = self.root.first_text("startdate").unwrap_or_default();
        let date = PartialDate::parse(&raw)?;

        if raw.trim() == UNKNOWN_START_SENTINEL && self.end_date()?.is_unknown() {
            return Ok(PartialDate::unknown());
        }
        Ok(date)
    }

    pub fn season(&self) -> Result<Option<Season>, ExtractError> {
        let start = self.start_date()?;
        Ok(start.year.and(start.month).and_then(Season::from_month))
    }

    /// The `main` title. Every valid document has one.
    pub fn display_title(&self) -> Result<String, ExtractError> {
        self.root
            .first_text_matching("title", &[("type", "main")])
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExtractError::MalformedDocument("missing main title".into()))
    }

    /// Official English title, empty when the document has none.
    #[must_use]
    pub fn english_title(&self) -> String {
        self.official_title("en").unwrap_or_default()
    }

    /// First tag, in document order, whose name is a known country alias.
    #[must_use]
    pub fn country_of_origin(&self) -> Option<CountryCode> {
        self.root
            .descendants("tag")
            .into_iter()
            .flat_map(|tag| tag.children_named("name"))
            .find_map(|name| country_for_tag(&name.text()))
    }

    /// Official title in the language of the production country.
    #[must_use]
    pub fn native_title(&self, country: Option<CountryCode>) -> Option<String> {
        match country? {
            CountryCode::China => self
                .official_title("zh-Hans")
                .or_else(|| self.official_title("zh-Hant")),
            CountryCode::Japan => self.official_title("ja"),
            CountryCode::SouthKorea | CountryCode::NorthKorea => self.official_title("ko"),
            CountryCode::Taiwan => None,
        }
    }

    /// Every other title, deduplicated and sorted.
    ///
    /// The display, English and native titles are each removed once.
    #[must_use]
    pub fn synonyms(&self, display: &str, english: &str, native: Option<&str>) -> Vec<String> {
        let mut titles: Vec<String> = self
            .root
            .children_named("titles")
            .flat_map(|titles| titles.children_named("title"))
            .map(Element::text)
            .collect();

        for canonical in [Some(display), Some(english), native].into_iter().flatten() {
            if let Some(pos) = titles.iter().position(|t| t == canonical) {
                titles.remove(pos);
            }
        }

        titles.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
    }

    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        self.root
            .first_text("picture")
            .filter(|uri| !uri.trim().is_empty())
            .map(|uri| format!("{POSTER_BASE_URL}{}", uri.trim()))
    }

    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.root
            .first_text("description")
            .filter(|d| !d.trim().is_empty())
    }

    /// `<ratings>` entries keyed by kind (`permanent`, `temporary`, `review`).
    #[must_use]
    pub fn ratings(&self) -> BTreeMap<String, Rating> {
        let Some(block) = self.root.child("ratings") else {
            return BTreeMap::new();
        };

        block
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Element(e) => Some(e),
                Node::Text(_) => None,
            })
            .filter_map(|e| {
                let count = e.attr("count")?.trim().parse().ok()?;
                let value = e.text().trim().parse().ok()?;
                Some((e.name.clone(), Rating { count, value }))
            })
            .collect()
    }

    /// Per-episode lengths in minutes, limited to the first `episode_count` episodes.
    #[must_use]
    pub fn episode_minutes(&self) -> Vec<u32> {
        let limit = self.episode_count() as usize;
        self.root
            .descendants("episode")
            .into_iter()
            .map(|episode| {
                episode
                    .child("length")
                    .and_then(|l| l.text().trim().parse().ok())
                    .unwrap_or(0)
            })
            .take(limit)
            .collect()
    }

    /// Sum of the episode lengths; a total beyond `u32` is malformed.
    pub fn total_minutes(&self) -> Result<u32, ExtractError> {
        let total: u64 = self.episode_minutes().into_iter().map(u64::from).sum();
        u32::try_from(total).map_err(|_| {
            ExtractError::MalformedDocument(format!("total runtime of {total} minutes is out of range"))
        })
    }

    /// Average episode length, rounded half to even; zero without an episode count.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn episode_length(&self) -> Result<u32, ExtractError> {
        let episodes = self.episode_count();
        if episodes == 0 {
            return Ok(0);
        }
        let total = self.total_minutes()?;
        Ok((f64::from(total) / f64::from(episodes)).round_ties_even() as u32)
    }

    /// Identifiers listed under the first resource block of `site`.
    #[must_use]
    pub fn identifiers(&self, site: Site) -> Option<Vec<String>> {
        let block = self
            .root
            .descendants("resource")
            .into_iter()
            .find(|r| r.attr("type") == Some(site.code()))?;

        Some(
            block
                .descendants("identifier")
                .into_iter()
                .map(Element::text)
                .collect(),
        )
    }

    #[must_use]
    pub fn numeric_identifier(&self, site: Site) -> Option<u64> {
        let ids = self.identifiers(site)?;
        let raw = ids.first()?;
        parse_numeric(site, raw)
    }

    /// TMDB id together with its media kind (`tv` or `movie`).
    #[must_use]
    pub fn tmdb(&self) -> Option<ConventionalMapping> {
        let ids = self.identifiers(Site::Tmdb)?;
        let id = parse_numeric(Site::Tmdb, ids.first()?)?;
        Some(ConventionalMapping {
            id: ExternalId::Numeric(id),
            media_type: ids.get(1).filter(|kind| !kind.is_empty()).cloned(),
        })
    }

    #[must_use]
    pub fn imdb(&self) -> Option<ConventionalMapping> {
        let ids = self.identifiers(Site::Imdb)?;
        let id = ids.into_iter().next().filter(|id| !id.is_empty())?;
        Some(ConventionalMapping {
            id: ExternalId::Text(id),
            media_type: None,
        })
    }

    #[must_use]
    pub fn mappings(&self, anidb: AnidbId) -> RelationMaps {
        RelationMaps {
            allcinema: self.numeric_identifier(Site::Allcinema),
            animenewsnetwork: self.numeric_identifier(Site::AnimeNewsNetwork),
            myanimelist: self.numeric_identifier(Site::MyAnimeList),
            syoboical: self.numeric_identifier(Site::Syoboi),
            bangumi: self.numeric_identifier(Site::Bangumi),
            douban: self.numeric_identifier(Site::Douban),
            anison: self.numeric_identifier(Site::Anison),
            tmdb: self.tmdb(),
            imdb: self.imdb(),
            ..RelationMaps::new(anidb)
        }
    }
}

fn parse_numeric(site: Site, raw: &str) -> Option<u64> {
    match raw.trim().parse() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!(site = site.name(), value = raw, "Ignoring non-numeric external identifier");
            None
        }
    }
}
