//! Record extraction: one AniDB XML document in, one [`MediaInfo`] out.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::constants::{MEDIA_TYPE, SOURCE_DATA};
use crate::models::{MediaInfo, PictureUrls};
use crate::parser::InvalidDate;
use crate::picker::AnimeDocument;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Failed to read document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<InvalidDate> for ExtractError {
    fn from(err: InvalidDate) -> Self {
        Self::MalformedDocument(err.to_string())
    }
}

/// Builds a record from raw XML.
///
/// `uuid` is the identifier assigned by a previous run; a fresh v4 UUID is
/// generated when it is `None`.
pub fn extract_record(xml: &str, uuid: Option<String>) -> Result<MediaInfo, ExtractError> {
    let doc = AnimeDocument::parse(xml)?;

    let anidb = doc.media_id()?;
    let title_display = doc.display_title()?;
    let title_english = doc.english_title();
    let country_of_origin = doc.country_of_origin();
    let title_native = doc.native_title(country_of_origin);
    let synonyms = doc.synonyms(&title_display, &title_english, title_native.as_deref());

    let start_date = doc.start_date()?;
    let end_date = doc.end_date()?;
    let episodes = doc.episode_count();

    let picture_urls = doc
        .poster_url()
        .map(|original| vec![PictureUrls { original }])
        .unwrap_or_default();

    Ok(MediaInfo {
        uuid: uuid.unwrap_or_else(|| Uuid::new_v4().to_string()),
        title_transliteration: title_display.clone(),
        title_display,
        title_native,
        title_english,
        synonyms,
        is_adult: None,
        media_type: MEDIA_TYPE.to_string(),
        media_sub_type: doc.sub_type(),
        year: start_date.year,
        start_date: start_date.known(),
        end_date: end_date.known(),
        unit_counts: (episodes != 0).then_some(episodes),
        unit_order: None,
        subunit_counts: doc.total_minutes()?,
        subunit_order: doc.episode_length()?,
        volume_counts: None,
        volume_order: None,
        season: doc.season()?,
        picture_urls,
        country_of_origin,
        mappings: doc.mappings(anidb),
        source_data: SOURCE_DATA.to_string(),
    })
}

/// Reads `path` and extracts its record.
pub fn extract_file(path: &Path, uuid: Option<String>) -> Result<MediaInfo, ExtractError> {
    let xml = std::fs::read_to_string(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    extract_record(&xml, uuid)
}
