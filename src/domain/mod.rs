//! Domain primitives shared by the extractor and the batch merger.
//!
//! Follows the Newtype pattern so the AniDB source identifier cannot be mixed
//! up with the counts and foreign ids that travel next to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// AniDB numeric anime identifier.
///
/// This is the join key between a run's XML documents and the records
/// persisted by the previous run.
///
/// # Examples
///
/// ```rust
/// use diorama::domain::AnidbId;
///
/// let id: AnidbId = "69".parse().unwrap();
/// assert_eq!(id.value(), 69);
/// assert_eq!(id.to_string(), "69");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AnidbId(u32);

impl AnidbId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AnidbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AnidbId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl From<AnidbId> for u32 {
    fn from(id: AnidbId) -> Self {
        id.0
    }
}

impl FromStr for AnidbId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}

impl Serialize for AnidbId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for AnidbId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = u32::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anidb_id_ordering() {
        let mut ids = vec![AnidbId::new(300), AnidbId::new(1), AnidbId::new(22)];
        ids.sort();
        assert_eq!(ids, vec![AnidbId::new(1), AnidbId::new(22), AnidbId::new(300)]);
    }

    #[test]
    fn test_anidb_id_parse() {
        assert_eq!("  42 ".parse::<AnidbId>().unwrap(), AnidbId::new(42));
        assert!("abc".parse::<AnidbId>().is_err());
        assert!("-1".parse::<AnidbId>().is_err());
    }

    #[test]
    fn test_anidb_id_serde_is_plain_number() {
        let json = serde_json::to_string(&AnidbId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: AnidbId = serde_json::from_str("7").unwrap();
        assert_eq!(back, AnidbId::new(7));
    }
}
