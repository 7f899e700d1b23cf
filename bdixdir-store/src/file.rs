// A collection file is:
//
//   magic    8 bytes   b"bdixdir\0"
//   vers     msgpack u32
//   records  msgpack array of maps (rmp-serde, named fields)
//
// Records are read back through StoredRecord so that files written by
// older versions, with fields missing, still load.
//
// Saves go to a sibling ".tmp" file which is synced and renamed over the
// target, so a crash mid-save leaves the previous collection intact.

use crate::stored::{repair, StoredRecord};
use bdixdir_base::{err, Result};
use bdixdir_rank::{ServerRecord, Store, DEFAULT_FALLBACK_CATEGORY};
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub struct FileStore {
    path: PathBuf,
    fallback_category: String,
}

impl FileStore {
    pub const MAGIC: &'static [u8; 8] = b"bdixdir\0";
    pub const VERS: u32 = 1;

    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
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
        let mut buf = Vec::new();
        buf.extend_from_slice(Self::MAGIC);
        rmp::encode::write_u32(&mut buf, Self::VERS)?;
        rmp_serde::encode::write_named(&mut buf, records)?;
        Ok(buf)
    }

    pub fn decode(buf: &[u8], fallback_category: &str) -> Result<Vec<ServerRecord>> {
        if buf.len() < Self::MAGIC.len() || &buf[..Self::MAGIC.len()] != Self::MAGIC {
            return Err(err("bad magic number"));
        }
        let mut rd = &buf[Self::MAGIC.len()..];
        let vers = rmp::decode::read_u32(&mut rd)?;
        if vers > Self::VERS {
            return Err(err("unsupported future version number"));
        }
        let stored: Vec<StoredRecord> = rmp_serde::from_read(rd)?;
        Ok(repair(stored, fallback_category))
    }
}

pub(crate) fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

// Writes `bytes` next to `path` and renames into place.
pub(crate) fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let tmp = tmp_path_for(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

// A missing file is an empty collection, not an error.
pub(crate) fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(buf) => Ok(Some(buf)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Store for FileStore {
    fn load(&mut self) -> Result<Vec<ServerRecord>> {
        match read_if_exists(&self.path)? {
            Some(buf) => {
                debug!(target: "bdixdir", path = %self.path.display(), bytes = buf.len(), "read collection");
                Self::decode(&buf, &self.fallback_category)
            }
            None => {
                info!(target: "bdixdir", path = %self.path.display(), "no collection file yet");
                Ok(Vec::new())
            }
        }
    }

    fn save(&mut self, records: &[ServerRecord]) -> Result<()> {
        let buf = Self::encode(records)?;
        replace_file(&self.path, &buf)?;
        debug!(target: "bdixdir", path = %self.path.display(), bytes = buf.len(), "wrote collection");
        Ok(())
    }
}
