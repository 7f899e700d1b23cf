use bdixdir_base::{err, Result};
use bdixdir_rank::{ServerRecord, Store};

/// Keeps the collection in memory. Counts saves, and can be told to fail
/// them, which is what tests and embedders mostly want from a store.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    records: Vec<ServerRecord>,
    saves: usize,
    fail_saves: bool,
}

impl MemStore {
    pub fn new(records: Vec<ServerRecord>) -> Self {
        MemStore {
            records,
            ..MemStore::default()
        }
    }

    pub fn records(&self) -> &[ServerRecord] {
        &self.records
    }

    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }
}

impl Store for MemStore {
    fn load(&mut self) -> Result<Vec<ServerRecord>> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[ServerRecord]) -> Result<()> {
        if self.fail_saves {
            return Err(err("memory store is refusing writes"));
        }
        self.records = records.to_vec();
        self.saves += 1;
        Ok(())
    }
}
