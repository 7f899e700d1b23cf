// The top-level crate wires the subsystems together: config decides which
// store to open, a session is opened over it, and either the command line
// or the terminal UI drives the session.
//
// It is not assumed to be the only user of the subsystem crates; anything
// embedding the directory can do the same wiring differently.

use std::path::Path;

pub use bdixdir_admin as admin;
pub use bdixdir_base::{err, Error, Result};
pub use bdixdir_rank as rank;
pub use bdixdir_store as store;
pub use bdixdir_ui as ui;

use bdixdir_admin::Config;
use bdixdir_rank::{CategoryFilter, Notifier, ServerRecord, Session, SessionOptions, Severity, Store};
use bdixdir_store::{open_store, JsonStore};
use tracing::info;


pub type DirSession<N> = Session<Box<dyn Store>, N>;

pub fn configured_store(config: &Config) -> Box<dyn Store> {
    open_store(config.format, &config.store, &config.fallback_category)
}

/// Opens a session on the configured store. `category` overrides the
/// configured default filter.
pub fn open_session<N: Notifier>(
    config: &Config,
    notifier: N,
    category: Option<CategoryFilter>,
) -> DirSession<N> {
    let opts = SessionOptions {
        initial_category: category.unwrap_or_else(|| config.default_filter()),
        fallback_category: config.fallback_category.clone(),
    };
    Session::open(configured_store(config), notifier, opts)
}

/// Replaces the configured collection with the records of a JSON export.
pub fn import_json(config: &Config, path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(err(format!("no such file: {}", path.display())));
    }
    let records = JsonStore::new(path)
        .with_fallback_category(config.fallback_category.clone())
        .load()?;
    configured_store(config).save(&records)?;
    info!(target: "bdixdir", n = records.len(), from = %path.display(), "imported");
    Ok(records.len())
}

/// Writes the configured collection out as a JSON export.
pub fn export_json(config: &Config, path: &Path) -> Result<usize> {
    let records = configured_store(config).load()?;
    JsonStore::new(path).save(&records)?;
    info!(target: "bdixdir", n = records.len(), to = %path.display(), "exported");
    Ok(records.len())
}

/// Plain-text table of `records`, one per line, under a header.
pub fn render_table<'a>(records: impl Iterator<Item = &'a ServerRecord>) -> String {
    let mut out = format!(
        "{:>4}  {:<4} {:<24} {:<30} {:<8} {:<8} {:>3}  {}\n",
        "rank", "id", "name", "address", "type", "status", "hp", "categories"
    );
    for rec in records {
        out.push_str(&format!(
            "{:>4}  {:<4} {:<24.24} {:<30.30} {:<8} {:<8} {:>3}  {}\n",
            rec.rank,
            rec.id.0,
            rec.name,
            rec.address,
            rec.kind.as_str(),
            rec.status.as_str(),
            bdixdir_rank::health_score(&rec.performance),
            rec.categories.join(",")
        ));
    }
    out
}

/// Prints notifications for the command line: informational ones to
/// stdout, warnings and errors to stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => println!("{}", message),
            Severity::Warning => eprintln!("warning: {}", message),
            Severity::Error => eprintln!("error: {}", message),
        }
    }
}
