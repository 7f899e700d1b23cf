// Implementations of the rank subsystem's Store port, and the load-time
// repair shared by all of them.

mod file;
mod json;
mod mem;
mod stored;


pub use file::FileStore;
pub use json::JsonStore;
pub use mem::MemStore;
pub use stored::{repair, StoredRecord};

use bdixdir_rank::Store;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Msgpack,
    Json,
}

/// Opens the store for `format` at `path`.
pub fn open_store(format: Format, path: impl Into<PathBuf>, fallback_category: &str) -> Box<dyn Store> {
    match format {
        Format::Msgpack => {
            Box::new(FileStore::new(path).with_fallback_category(fallback_category))
        }
        Format::Json => Box::new(JsonStore::new(path).with_fallback_category(fallback_category)),
    }
}
