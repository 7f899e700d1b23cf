use bdixdir_base::Result;
use bdixdir_rank::{health_score, Notifier, ServerRecord, Session, Severity, Store};
use crossterm::{
    event,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    layout::{Constraint, Layout},
    prelude::{CrosstermBackend, Stylize, Terminal},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::io::stdout;
use tracing::info;

mod view;


pub use view::{action_for_key, UiAction, ViewModel};

const HELP: &str =
    "↑/↓ select  K/J move  space drag/drop  esc cancel  tab category  a alpha  p perf  s save  q quit";

/// Notifier that keeps the latest message for the status line.
#[derive(Clone, Debug, Default)]
pub struct StatusLine {
    last: Option<(String, Severity)>,
}

impl StatusLine {
    pub fn last(&self) -> Option<(&str, Severity)> {
        self.last.as_ref().map(|(m, s)| (m.as_str(), *s))
    }
}

impl Notifier for StatusLine {
    fn notify(&mut self, message: &str, severity: Severity) {
        info!(target: "bdixdir", ?severity, "{}", message);
        self.last = Some((message.to_string(), severity));
    }
}

pub fn run_ui<S: Store>(session: &mut Session<S, StatusLine>) -> Result<()> {
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    let res = main_loop(session);
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    res
}

fn main_loop<S: Store>(session: &mut Session<S, StatusLine>) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    let mut vm = ViewModel::default();
    loop {
        draw_ui(&mut terminal, session, &vm)?;
        if let Some(action) = next_action()? {
            if vm.handle(session, action) {
                break;
            }
        }
    }
    Ok(())
}

pub fn row_text(rec: &ServerRecord) -> String {
    format!(
        "{:>4}  {:<24.24} {:<30.30} {:<8} {:<8} {:>3}",
        rec.rank,
        rec.name,
        rec.address,
        rec.kind.as_str(),
        rec.status.as_str(),
        health_score(&rec.performance)
    )
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Gray,
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

fn draw_ui<S: Store>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    session: &Session<S, StatusLine>,
    vm: &ViewModel,
) -> Result<()> {
    let ids = vm.displayed_ids(session);
    let manager = session.manager();
    let items: Vec<ListItem> = ids
        .iter()
        .filter_map(|id| manager.get(*id))
        .map(|rec| {
            let item = ListItem::new(row_text(rec));
            if vm.dragging() == Some(rec.id) {
                item.style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();
    let title = format!(
        " bdixdir: {} ({} servers) ",
        manager.active_category(),
        items.len()
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(vm.selected()));
    let status = session.notifier().last();

    terminal.draw(|frame| {
        let areas = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());
        let (main, status_area, help_area) = (areas[0], areas[1], areas[2]);
        frame.render_stateful_widget(list, main, &mut state);
        if let Some((msg, severity)) = status {
            frame.render_widget(
                Paragraph::new(msg).style(Style::default().fg(severity_color(severity))),
                status_area,
            );
        }
        frame.render_widget(Paragraph::new(HELP).white().on_blue(), help_area);
    })?;
    Ok(())
}

fn next_action() -> Result<Option<UiAction>> {
    if event::poll(std::time::Duration::from_millis(16))? {
        if let event::Event::Key(key) = event::read()? {
            return Ok(action_for_key(&key));
        }
    }
    Ok(None)
}
