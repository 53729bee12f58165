pub mod media;

pub use media::{
    ConventionalMapping, CountryCode, ExternalId, MediaInfo, MediaSubType, PictureUrls,
    RelationMaps, Season,
};
