/// Prefix for the relative `<picture>` URIs found in AniDB documents.
pub const POSTER_BASE_URL: &str = "https://cdn-us.anidb.net/images/main/";

/// Value of `source_data` on every produced record.
pub const SOURCE_DATA: &str = "anidb";

/// Value of `media_type` on every produced record.
pub const MEDIA_TYPE: &str = "anime";

/// AniDB's placeholder for an unrecorded start date.
pub const UNKNOWN_START_SENTINEL: &str = "1970-01-01";

pub mod archive {

    pub const DEFAULT_URL: &str =
        "https://files.shokoanime.com/files/shoko-server/other/Anime_HTTP.zip";

    pub const DEFAULT_ARCHIVE_PATH: &str = "Anime_HTTP.zip";

    /// Directory the archive unpacks into.
    pub const DEFAULT_SOURCE_DIR: &str = "Anime_HTTP";

    pub const DEFAULT_USER_AGENT: &str = concat!("diorama/", env!("CARGO_PKG_VERSION"));
}

pub mod output {

    pub const FULL_FILENAME: &str = "anidb.json";

    pub const MIN_FILENAME: &str = "anidb_min.json";
}
