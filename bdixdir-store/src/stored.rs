// The persisted shape of a record is looser than ServerRecord: anything a
// previous version (or a hand-edited export) might have left out is
// optional here, and repair() fills it in. Nothing found at load time is
// fatal; every fix is logged.
//
// Repairs:
//   - no categories / empty list: [legacy "category" field, else fallback]
//   - no performance:             uptime 0, no response time, 0 samples
//   - no or unknown type/status:  bdix / active
//   - no rank:                    after every ranked record, in load order
//   - no or duplicate id:         next free id
//   - id or rank beyond +/-2^53:  treated as missing

use bdixdir_rank::{
    normalize_categories, Performance, ServerId, ServerKind, ServerRecord, ServerStatus,
};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

// Largest magnitude a JSON number carries exactly. Keeping stored ids and
// ranks inside it leaves room to count past the maximum.
const MAX_STORED: i64 = 1 << 53;

fn in_range(v: i64) -> bool {
    (-MAX_STORED..=MAX_STORED).contains(&v)
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: Option<ServerId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub category: Option<String>,
    pub categories: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub rank: Option<i64>,
    pub performance: Option<Performance>,
}

pub fn repair(mut stored: Vec<StoredRecord>, fallback_category: &str) -> Vec<ServerRecord> {
    for s in stored.iter_mut() {
        if let Some(id) = s.id.filter(|id| !in_range(id.0)) {
            warn!(target: "bdixdir", %id, name = %s.name, "dropped out-of-range id");
            s.id = None;
        }
        if let Some(rank) = s.rank.filter(|r| !in_range(*r)) {
            warn!(target: "bdixdir", rank, name = %s.name, "dropped out-of-range rank");
            s.rank = None;
        }
    }
    let mut next_rank = stored.iter().filter_map(|s| s.rank).max().unwrap_or(0) + 1;
    let mut next_id = stored
        .iter()
        .filter_map(|s| s.id.map(|id| id.0))
        .max()
        .unwrap_or(0)
        + 1;
    let mut seen_ids = BTreeSet::new();
    let mut out = Vec::with_capacity(stored.len());

    for s in stored {
        let id = match s.id {
            Some(id) if seen_ids.insert(id) => id,
            prior => {
                let id = ServerId(next_id);
                next_id += 1;
                seen_ids.insert(id);
                warn!(target: "bdixdir", ?prior, %id, name = %s.name, "repaired missing or duplicate id");
                id
            }
        };

        let listed = s.categories.unwrap_or_default();
        let legacy = s.category.filter(|c| !c.trim().is_empty());
        let categories = if listed.iter().all(|c| c.trim().is_empty()) {
            let categories = normalize_categories(legacy.into_iter().collect(), fallback_category);
            warn!(target: "bdixdir", %id, ?categories, "repaired missing categories");
            categories
        } else {
            normalize_categories(listed, fallback_category)
        };

        let performance = s.performance.unwrap_or_else(|| {
            warn!(target: "bdixdir", %id, "repaired missing performance");
            Performance::default()
        });

        let kind = match s.kind.as_deref().and_then(ServerKind::parse) {
            Some(kind) => kind,
            None => {
                warn!(target: "bdixdir", %id, kind = ?s.kind, "repaired server type");
                ServerKind::default()
            }
        };
        let status = match s.status.as_deref().and_then(ServerStatus::parse) {
            Some(status) => status,
            None => {
                warn!(target: "bdixdir", %id, status = ?s.status, "repaired server status");
                ServerStatus::default()
            }
        };

        let rank = s.rank.unwrap_or_else(|| {
            let rank = next_rank;
            next_rank += 1;
            warn!(target: "bdixdir", %id, rank, "repaired missing rank");
            rank
        });

        out.push(ServerRecord {
            id,
            name: s.name,
            address: s.address,
            categories,
            kind,
            status,
            rank,
            performance,
        });
    }
    out
}
