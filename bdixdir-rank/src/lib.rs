// The rank subsystem: the server record model, health scoring, the rank
// manager that orders records within category views, and the session
// that drives the manager against a store and a notifier.

mod health;
mod manager;
mod record;
mod session;


pub use health::{compare_health, health_score};
pub use manager::{MoveOutcome, RankManager, DEFAULT_FALLBACK_CATEGORY};
pub use record::{
    normalize_categories, CategoryFilter, NewServer, Performance, ProbeSample, ServerId,
    ServerKind, ServerRecord, ServerStatus,
};
pub use session::{
    Applied, Command, Notifier, Session, SessionOptions, Severity, Store, TracingNotifier,
};
