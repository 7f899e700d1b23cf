// A session is the explicit context that UI adapters drive: it owns the
// rank manager (collection + active filter) and the two ports the core
// talks to, a store for the collection and a notifier for the user.
//
// Every command that changes records ends with a flush: the active view
// is renumbered 1..=N and the full collection is written back. Flushing
// is last-writer-wins; there is exactly one writer.

use crate::manager::{MoveOutcome, RankManager, DEFAULT_FALLBACK_CATEGORY};
use crate::record::{CategoryFilter, NewServer, ProbeSample, ServerId, ServerRecord};
use bdixdir_base::Result;
use tracing::{error, info, warn};

/// Persistence port: whole-collection load and overwrite.
pub trait Store {
    fn load(&mut self) -> Result<Vec<ServerRecord>>;
    fn save(&mut self, records: &[ServerRecord]) -> Result<()>;
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn load(&mut self) -> Result<Vec<ServerRecord>> {
        (**self).load()
    }
    fn save(&mut self, records: &[ServerRecord]) -> Result<()> {
        (**self).save(records)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Notification port. Fire-and-forget.
pub trait Notifier {
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Sends notifications to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => info!(target: "bdixdir", "{}", message),
            Severity::Warning => warn!(target: "bdixdir", "{}", message),
            Severity::Error => error!(target: "bdixdir", "{}", message),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    MoveUp(ServerId),
    MoveDown(ServerId),
    /// The ids of the displayed view in their new order, as left by a
    /// drag-and-drop gesture.
    ManualReorder(Vec<ServerId>),
    SetCategory(CategoryFilter),
    ResetAlphabetical,
    PerformanceRanking,
    Add(NewServer),
    Remove(ServerId),
    RecordSample(ServerId, ProbeSample),
    Save,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    Moved(MoveOutcome),
    Reordered { touched: usize },
    CategoryChanged,
    Ranked,
    Added(ServerId),
    Removed(ServerRecord),
    Sampled,
    /// The command named an id that isn't in the collection.
    Unknown(ServerId),
    Saved,
}

#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub initial_category: CategoryFilter,
    pub fallback_category: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            initial_category: CategoryFilter::All,
            fallback_category: DEFAULT_FALLBACK_CATEGORY.to_string(),
        }
    }
}

pub struct Session<S: Store, N: Notifier> {
    manager: RankManager,
    store: S,
    notifier: N,
}

impl<S: Store, N: Notifier> Session<S, N> {
    /// Loads the collection from `store`. A failed load is reported and
    /// the session starts out empty.
    pub fn open(mut store: S, mut notifier: N, opts: SessionOptions) -> Self {
        let records = match store.load() {
            Ok(records) => {
                info!(target: "bdixdir", n = records.len(), "loaded collection");
                records
            }
            Err(e) => {
                warn!(target: "bdixdir", "load failed, starting empty: {}", e);
                notifier.notify(&format!("could not load servers: {}", e), Severity::Warning);
                Vec::new()
            }
        };
        let mut manager =
            RankManager::new(records).with_fallback_category(opts.fallback_category);
        manager.set_active_category(opts.initial_category);
        Session {
            manager,
            store,
            notifier,
        }
    }

    pub fn manager(&self) -> &RankManager {
        &self.manager
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn into_parts(self) -> (RankManager, S, N) {
        (self.manager, self.store, self.notifier)
    }

    /// Renumbers the active view and writes the whole collection back.
    /// A failed write is sent to the notifier and returned.
    pub fn flush(&mut self) -> Result<()> {
        let active = self.manager.active_category().clone();
        self.manager.commit_sequential_ranks(&active);
        match self.store.save(self.manager.records()) {
            Ok(()) => {
                info!(target: "bdixdir", n = self.manager.len(), category = %active, "saved collection");
                Ok(())
            }
            Err(e) => {
                error!(target: "bdixdir", "save failed: {}", e);
                self.notifier
                    .notify(&format!("could not save servers: {}", e), Severity::Error);
                Err(e)
            }
        }
    }

    fn display_name(&self, id: ServerId) -> String {
        self.manager
            .get(id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn apply_move(&mut self, id: ServerId, up: bool) -> Result<Applied> {
        // Renumber before a real swap so that tied ranks in the view don't
        // turn it into a no-op. Boundary and unknown moves touch nothing.
        let outcome = match self.manager.move_preview(id, up) {
            MoveOutcome::Moved { .. } => {
                let active = self.manager.active_category().clone();
                self.manager.commit_sequential_ranks(&active);
                if up {
                    self.manager.move_up(id)
                } else {
                    self.manager.move_down(id)
                }
            }
            outcome => outcome,
        };
        match outcome {
            MoveOutcome::Moved { .. } => self.flush()?,
            MoveOutcome::AtBoundary => {
                let which = if up { "first" } else { "last" };
                let msg = format!("{} is already {}", self.display_name(id), which);
                self.notifier.notify(&msg, Severity::Info);
            }
            MoveOutcome::NotFound => (),
        }
        Ok(Applied::Moved(outcome))
    }

    pub fn apply(&mut self, cmd: Command) -> Result<Applied> {
        match cmd {
            Command::MoveUp(id) => self.apply_move(id, true),
            Command::MoveDown(id) => self.apply_move(id, false),
            Command::ManualReorder(ids) => {
                let touched = self.manager.apply_manual_reorder(&ids);
                self.flush()?;
                Ok(Applied::Reordered { touched })
            }
            Command::SetCategory(filter) => {
                self.manager.set_active_category(filter);
                Ok(Applied::CategoryChanged)
            }
            Command::ResetAlphabetical => {
                self.manager.reset_alphabetical();
                self.flush()?;
                self.notifier
                    .notify("servers sorted alphabetically", Severity::Success);
                Ok(Applied::Ranked)
            }
            Command::PerformanceRanking => {
                self.manager.apply_performance_ranking();
                self.flush()?;
                self.notifier
                    .notify("servers ranked by health", Severity::Success);
                Ok(Applied::Ranked)
            }
            Command::Add(new) => {
                let id = self.manager.add_record(new)?;
                self.flush()?;
                let msg = format!("added {}", self.display_name(id));
                self.notifier.notify(&msg, Severity::Success);
                Ok(Applied::Added(id))
            }
            Command::Remove(id) => match self.manager.remove_record(id) {
                Some(rec) => {
                    self.flush()?;
                    let msg = format!("removed {}", rec.name);
                    self.notifier.notify(&msg, Severity::Success);
                    Ok(Applied::Removed(rec))
                }
                None => Ok(Applied::Unknown(id)),
            },
            Command::RecordSample(id, sample) => {
                if self.manager.record_sample(id, sample) {
                    self.flush()?;
                    Ok(Applied::Sampled)
                } else {
                    Ok(Applied::Unknown(id))
                }
            }
            Command::Save => {
                self.flush()?;
                self.notifier.notify("servers saved", Severity::Success);
                Ok(Applied::Saved)
            }
        }
    }
}
