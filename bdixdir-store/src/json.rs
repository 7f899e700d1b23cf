// The same collection as a JSON array of camelCase objects: the shape a
// browser export of the directory has, so it doubles as import/export.

use crate::file::{read_if_exists, replace_file};
use crate::stored::{repair, StoredRecord};
use bdixdir_base::Result;
use bdixdir_rank::{ServerRecord, Store, DEFAULT_FALLBACK_CATEGORY};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct JsonStore {
    path: PathBuf,
    fallback_category: String,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore {
            path: path.into(),
            fallback_category: DEFAULT_FALLBACK_CATEGORY.to_string(),
        }
    }

    pub fn with_fallback_category(mut self, fallback: impl Into<String>) -> Self {
        self.fallback_category = fallback.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn encode(records: &[ServerRecord]) -> Result<Vec<u8>> {
        let mut buf = serde_json::to_vec_pretty(records)?;
        buf.push(b'\n');
        Ok(buf)
    }

    pub fn decode(buf: &[u8], fallback_category: &str) -> Result<Vec<ServerRecord>> {
        let stored: Vec<StoredRecord> = serde_json::from_slice(buf)?;
        Ok(repair(stored, fallback_category))
    }
}

impl Store for JsonStore {
    fn load(&mut self) -> Result<Vec<ServerRecord>> {
        match read_if_exists(&self.path)? {
            Some(buf) => {
                debug!(target: "bdixdir", path = %self.path.display(), bytes = buf.len(), "read json collection");
                Self::decode(&buf, &self.fallback_category)
            }
            None => {
                info!(target: "bdixdir", path = %self.path.display(), "no json collection yet");
                Ok(Vec::new())
            }
        }
    }

    fn save(&mut self, records: &[ServerRecord]) -> Result<()> {
        let buf = Self::encode(records)?;
        replace_file(&self.path, &buf)?;
        debug!(target: "bdixdir", path = %self.path.display(), bytes = buf.len(), "wrote json collection");
        Ok(())
    }
}
