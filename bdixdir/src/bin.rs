//! bdixdir: keep a personal, ordered list of BDIX and streaming servers.

use bdixdir::{
    admin::{init_logging, Config},
    export_json, import_json, open_session, render_table,
    rank::{
        Applied, CategoryFilter, Command, MoveOutcome, NewServer, ProbeSample, ServerId,
        ServerKind, ServerStatus,
    },
    ui::{run_ui, StatusLine},
    ConsoleNotifier, Result,
};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "bdixdir")]
#[command(version)]
#[command(about, long_about = None)]
struct Cli {
    /// Config file (default: $BDIXDIR_CONFIG, then ./bdixdir.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Category view to operate on ("all" for every server)
    #[arg(short, long, global = true)]
    category: Option<String>,

    /// More log output; repeat for more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the servers of the category view in display order
    List,
    /// Print every category in use
    Categories,
    /// Add a server at the end of the list
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        address: String,
        /// Repeat for several; the first is the primary category
        #[arg(long = "in", value_name = "CATEGORY")]
        categories: Vec<String>,
        /// bdix or non-bdix
        #[arg(long = "type", default_value = "bdix")]
        kind: String,
        #[arg(long, default_value = "active")]
        status: String,
    },
    /// Remove a server
    Remove { id: i64 },
    /// Move a server one place up in the category view
    Up { id: i64 },
    /// Move a server one place down in the category view
    Down { id: i64 },
    /// Give the listed servers ranks 1, 2, 3... in the order given
    Reorder {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Rank every server by name
    Alpha,
    /// Rank every server by health score
    Perf,
    /// Record a probe result for a server
    Sample {
        id: i64,
        /// The server did not answer
        #[arg(long, conflicts_with = "ms")]
        down: bool,
        /// Response time in milliseconds
        #[arg(long)]
        ms: Option<f64>,
    },
    /// Replace the collection with a JSON export
    Import { file: PathBuf },
    /// Write the collection as JSON
    Export { file: PathBuf },
    /// Interactive list (default)
    Tui,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("bdixdir: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let command = cli.command.unwrap_or(Cmd::Tui);
    let filter = cli.category.as_deref().map(CategoryFilter::from);

    // The terminal belongs to the UI, so its logs always go to a file.
    let log_file = match (&command, &config.log_file) {
        (_, Some(f)) => Some(f.clone()),
        (Cmd::Tui, None) => Some(config.store.with_extension("log")),
        _ => None,
    };
    init_logging(cli.verbose, log_file.as_deref())?;

    let cmd = match command {
        Cmd::Tui => {
            let mut session = open_session(&config, StatusLine::default(), filter);
            return run_ui(&mut session);
        }
        Cmd::Import { file } => {
            let n = import_json(&config, &file)?;
            println!("imported {} servers", n);
            return Ok(());
        }
        Cmd::Export { file } => {
            let n = export_json(&config, &file)?;
            println!("exported {} servers", n);
            return Ok(());
        }
        Cmd::List => {
            let session = open_session(&config, ConsoleNotifier, filter);
            print!("{}", render_table(session.manager().view()));
            return Ok(());
        }
        Cmd::Categories => {
            let session = open_session(&config, ConsoleNotifier, filter);
            for c in session.manager().categories() {
                println!("{}", c);
            }
            return Ok(());
        }
        Cmd::Add {
            name,
            address,
            categories,
            kind,
            status,
        } => Command::Add(NewServer {
            name,
            address,
            categories,
            kind: kind.parse::<ServerKind>()?,
            status: status.parse::<ServerStatus>()?,
        }),
        Cmd::Remove { id } => Command::Remove(ServerId(id)),
        Cmd::Up { id } => Command::MoveUp(ServerId(id)),
        Cmd::Down { id } => Command::MoveDown(ServerId(id)),
        Cmd::Reorder { ids } => Command::ManualReorder(ids.into_iter().map(ServerId).collect()),
        Cmd::Alpha => Command::ResetAlphabetical,
        Cmd::Perf => Command::PerformanceRanking,
        Cmd::Sample { id, down, ms } => Command::RecordSample(
            ServerId(id),
            ProbeSample {
                reachable: !down,
                response_ms: ms,
            },
        ),
    };

    let mut session = open_session(&config, ConsoleNotifier, filter);
    match session.apply(cmd)? {
        Applied::Moved(MoveOutcome::NotFound) => {
            eprintln!("no such server in the {} view", session.manager().active_category());
        }
        Applied::Unknown(id) => eprintln!("no server with id {}", id),
        Applied::Added(id) => println!("id {}", id),
        Applied::Reordered { touched } => println!("reordered {} servers", touched),
        _ => (),
    }
    Ok(())
}
