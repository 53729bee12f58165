//! AniDB resource site codes.
//!
//! External links live in `<resource type="N">` blocks where `N` is AniDB's
//! numeric site code. The codes never leave this module.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    AnimeNewsNetwork,
    MyAnimeList,
    Syoboi,
    Allcinema,
    Anison,
    Bangumi,
    Douban,
    Imdb,
    Tmdb,
}

impl Site {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::AnimeNewsNetwork => "1",
            Self::MyAnimeList => "2",
            Self::Syoboi => "8",
            Self::Allcinema => "9",
            Self::Anison => "10",
            Self::Bangumi => "38",
            Self::Douban => "39",
            Self::Imdb => "43",
            Self::Tmdb => "44",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AnimeNewsNetwork => "animenewsnetwork",
            Self::MyAnimeList => "myanimelist",
            Self::Syoboi => "syoboical",
            Self::Allcinema => "allcinema",
            Self::Anison => "anison",
            Self::Bangumi => "bangumi",
            Self::Douban => "douban",
            Self::Imdb => "imdb",
            Self::Tmdb => "tmdb",
        }
    }
}
