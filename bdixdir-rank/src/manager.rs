// The rank manager holds the full record collection and the active
// category filter, and performs every ordering operation on them.
//
// Ordering is carried entirely by each record's `rank` value. The
// position of a record in the underlying Vec only matters as a
// tie-breaker: views are a stable sort by rank over collection order.
//
// A record has one rank no matter how many categories it belongs to, so
// reordering it inside one category's view also moves it in every other
// view it appears in. Ranks are only meaningful relative to other records
// of the same view.
//
// The invariant restored by commit_sequential_ranks (and thus by every
// save) is that the ranks of the committed view are exactly 1..=N in
// display order. Records outside that view keep their ranks.

use crate::health::compare_health;
use crate::record::{
    normalize_categories, CategoryFilter, NewServer, Performance, ProbeSample, ServerId,
    ServerRecord, ServerStatus,
};
use bdixdir_base::{err, Result};
use tracing::debug;

pub const DEFAULT_FALLBACK_CATEGORY: &str = "others";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MoveOutcome {
    Moved { swapped_with: ServerId },
    /// The id isn't in the collection, or isn't in the active view.
    NotFound,
    /// Already first (moving up) or last (moving down).
    AtBoundary,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Direction {
    Up,
    Down,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RankManager {
    records: Vec<ServerRecord>,
    active: CategoryFilter,
    fallback_category: String,
}

impl RankManager {
    pub fn new(records: Vec<ServerRecord>) -> Self {
        RankManager {
            records,
            active: CategoryFilter::All,
            fallback_category: DEFAULT_FALLBACK_CATEGORY.to_string(),
        }
    }

    pub fn with_fallback_category(mut self, fallback: impl Into<String>) -> Self {
        self.fallback_category = fallback.into();
        self
    }

    pub fn records(&self) -> &[ServerRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ServerRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: ServerId) -> Option<&ServerRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: ServerId) -> Option<&mut ServerRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    pub fn active_category(&self) -> &CategoryFilter {
        &self.active
    }

    pub fn set_active_category(&mut self, filter: CategoryFilter) {
        debug!(target: "bdixdir", %filter, "active category");
        self.active = filter;
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for c in self.records.iter().flat_map(|r| r.categories.iter()) {
            if !out.contains(c) {
                out.push(c.clone());
            }
        }
        out
    }

    // Indices into self.records of the records matching `filter`, in
    // ascending rank order, ties in collection order.
    fn filtered_indices(&self, filter: &CategoryFilter) -> Vec<usize> {
        let mut idx: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| filter.matches(r))
            .map(|(i, _)| i)
            .collect();
        idx.sort_by_key(|&i| self.records[i].rank);
        idx
    }

    pub fn filtered_ordered<'a>(
        &'a self,
        filter: &CategoryFilter,
    ) -> impl Iterator<Item = &'a ServerRecord> + 'a {
        self.filtered_indices(filter)
            .into_iter()
            .map(move |i| &self.records[i])
    }

    /// The records of the active category, in display order.
    pub fn view(&self) -> impl Iterator<Item = &ServerRecord> + '_ {
        self.filtered_ordered(&self.active)
    }

    pub fn move_up(&mut self, id: ServerId) -> MoveOutcome {
        self.move_in_view(id, Direction::Up)
    }

    pub fn move_down(&mut self, id: ServerId) -> MoveOutcome {
        self.move_in_view(id, Direction::Down)
    }

    /// What `move_up` (or `move_down`) would do to `id` in the active
    /// view, without changing anything.
    pub fn move_preview(&self, id: ServerId, up: bool) -> MoveOutcome {
        let dir = if up { Direction::Up } else { Direction::Down };
        let view = self.filtered_indices(&self.active);
        match self.neighbours(&view, id, dir) {
            Ok((_, b)) => MoveOutcome::Moved {
                swapped_with: self.records[b].id,
            },
            Err(outcome) => outcome,
        }
    }

    // Record indices of `id` and of its neighbour in `dir` within `view`.
    fn neighbours(
        &self,
        view: &[usize],
        id: ServerId,
        dir: Direction,
    ) -> std::result::Result<(usize, usize), MoveOutcome> {
        let Some(pos) = view.iter().position(|&i| self.records[i].id == id) else {
            return Err(MoveOutcome::NotFound);
        };
        let neighbour = match dir {
            Direction::Up => pos.checked_sub(1),
            Direction::Down => Some(pos + 1).filter(|&n| n < view.len()),
        };
        match neighbour {
            Some(npos) => Ok((view[pos], view[npos])),
            None => Err(MoveOutcome::AtBoundary),
        }
    }

    // Swaps rank values with the neighbour in the active view. Array
    // positions are untouched, as are ranks of every other record.
    fn move_in_view(&mut self, id: ServerId, dir: Direction) -> MoveOutcome {
        let view = self.filtered_indices(&self.active);
        let (a, b) = match self.neighbours(&view, id, dir) {
            Ok(pair) => pair,
            Err(outcome) => return outcome,
        };
        let rank_a = self.records[a].rank;
        self.records[a].rank = self.records[b].rank;
        self.records[b].rank = rank_a;
        let swapped_with = self.records[b].id;
        debug!(target: "bdixdir", %id, %swapped_with, ?dir, "swapped ranks");
        MoveOutcome::Moved { swapped_with }
    }

    /// Assigns rank = position + 1 to each listed record, in order.
    /// Records not listed keep their ranks; unknown ids are skipped.
    /// Returns the number of records updated.
    pub fn apply_manual_reorder(&mut self, new_order: &[ServerId]) -> usize {
        let mut touched = 0;
        for (pos, id) in new_order.iter().enumerate() {
            match self.get_mut(*id) {
                Some(rec) => {
                    rec.rank = pos as i64 + 1;
                    touched += 1;
                }
                None => debug!(target: "bdixdir", %id, "reorder skipped unknown id"),
            }
        }
        touched
    }

    /// Renumbers the records of `filter` to 1..=N in their current display
    /// order, closing gaps and breaking ties.
    pub fn commit_sequential_ranks(&mut self, filter: &CategoryFilter) {
        let view = self.filtered_indices(filter);
        for (pos, i) in view.into_iter().enumerate() {
            self.records[i].rank = pos as i64 + 1;
        }
    }

    fn assign_global_ranks(&mut self) {
        for (pos, rec) in self.records.iter_mut().enumerate() {
            rec.rank = pos as i64 + 1;
        }
    }

    /// Sorts the whole collection by case-insensitive name, ignoring the
    /// active filter, and assigns global ranks 1..=N.
    pub fn reset_alphabetical(&mut self) {
        self.records.sort_by_cached_key(|r| r.name.to_lowercase());
        self.assign_global_ranks();
        debug!(target: "bdixdir", n = self.records.len(), "ranked alphabetically");
    }

    /// Sorts the whole collection by health score (best first), ties by
    /// average response time, and assigns global ranks 1..=N.
    pub fn apply_performance_ranking(&mut self) {
        self.records
            .sort_by(|a, b| compare_health(&a.performance, &b.performance));
        self.assign_global_ranks();
        debug!(target: "bdixdir", n = self.records.len(), "ranked by health");
    }

    fn next_id(&self) -> Result<ServerId> {
        let max = self.records.iter().map(|r| r.id.0).max().unwrap_or(0);
        max.checked_add(1)
            .map(ServerId)
            .ok_or_else(|| err("no server ids left"))
    }

    fn next_rank(&self) -> Result<i64> {
        let max = self.records.iter().map(|r| r.rank).max().unwrap_or(0);
        max.checked_add(1).ok_or_else(|| err("no ranks left"))
    }

    /// Inserts a new record at the end of every view it appears in.
    pub fn add_record(&mut self, new: NewServer) -> Result<ServerId> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(err("server name must not be empty"));
        }
        let id = self.next_id()?;
        let rank = self.next_rank()?;
        let rec = ServerRecord {
            id,
            name: name.to_string(),
            address: new.address.trim().to_string(),
            categories: normalize_categories(new.categories, &self.fallback_category),
            kind: new.kind,
            status: new.status,
            rank,
            performance: Performance::default(),
        };
        debug!(target: "bdixdir", %id, name = %rec.name, rank = rec.rank, "added record");
        self.records.push(rec);
        Ok(id)
    }

    pub fn remove_record(&mut self, id: ServerId) -> Option<ServerRecord> {
        let pos = self.records.iter().position(|r| r.id == id)?;
        debug!(target: "bdixdir", %id, "removed record");
        Some(self.records.remove(pos))
    }

    pub fn set_categories(&mut self, id: ServerId, categories: Vec<String>) -> bool {
        let fallback = self.fallback_category.clone();
        match self.get_mut(id) {
            Some(rec) => {
                rec.categories = normalize_categories(categories, &fallback);
                true
            }
            None => false,
        }
    }

    pub fn set_status(&mut self, id: ServerId, status: ServerStatus) -> bool {
        match self.get_mut(id) {
            Some(rec) => {
                rec.status = status;
                true
            }
            None => false,
        }
    }

    /// Folds a probe result into the record's performance and sets its
    /// status from reachability.
    pub fn record_sample(&mut self, id: ServerId, sample: ProbeSample) -> bool {
        match self.get_mut(id) {
            Some(rec) => {
                rec.performance.fold_sample(&sample);
                rec.status = if sample.reachable {
                    ServerStatus::Active
                } else {
                    ServerStatus::Inactive
                };
                debug!(target: "bdixdir", %id, ?sample, samples = rec.performance.sample_count, "recorded sample");
                true
            }
            None => false,
        }
    }
}
