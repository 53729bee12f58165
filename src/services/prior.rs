//! Identifiers assigned by a previous run.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::AnidbId;

#[derive(Debug, Deserialize)]
struct PriorRecord {
    uuid: String,
    mappings: PriorMappings,
}

#[derive(Debug, Deserialize)]
struct PriorMappings {
    anidb: AnidbId,
}

/// Maps AniDB ids to the UUIDs persisted by the last run.
#[derive(Debug, Default, Clone)]
pub struct PriorIndex {
    uuids: HashMap<AnidbId, String>,
}

impl PriorIndex {
    /// Loads `path`; a missing file yields an empty index.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No previous output, starting fresh");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        let records: Vec<PriorRecord> = serde_json::from_str(&content)?;
        Ok(Self::from_records(records))
    }

    fn from_records(records: Vec<PriorRecord>) -> Self {
        let mut uuids = HashMap::with_capacity(records.len());
        for record in records {
            let anidb = record.mappings.anidb;
            if uuids.contains_key(&anidb) {
                warn!(anidb = %anidb, "Duplicate AniDB id in previous output, keeping the first");
                continue;
            }
            uuids.insert(anidb, record.uuid);
        }
        Self { uuids }
    }

    #[must_use]
    pub fn uuid_for(&self, id: AnidbId) -> Option<&str> {
        self.uuids.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.uuids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uuids.is_empty()
    }
}
