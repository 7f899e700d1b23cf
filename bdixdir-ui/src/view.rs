// The view model sits between key presses and the session. It owns only
// what the session doesn't: which row is selected and, during a drag,
// the provisional order of the displayed rows. Dropping sends that order
// to the session as a manual reorder; nothing is written until then.

use bdixdir_rank::{CategoryFilter, Command, Notifier, ServerId, Session, Severity, Store};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum UiAction {
    Quit,
    SelectPrev,
    SelectNext,
    MoveUp,
    MoveDown,
    NextCategory,
    PrevCategory,
    ToggleDrag,
    CancelDrag,
    Alphabetical,
    Performance,
    Save,
}

pub fn action_for_key(key: &KeyEvent) -> Option<UiAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let action = match key.code {
        KeyCode::Char('q') => UiAction::Quit,
        KeyCode::Up if shift => UiAction::MoveUp,
        KeyCode::Down if shift => UiAction::MoveDown,
        KeyCode::Up | KeyCode::Char('k') => UiAction::SelectPrev,
        KeyCode::Down | KeyCode::Char('j') => UiAction::SelectNext,
        KeyCode::Char('K') => UiAction::MoveUp,
        KeyCode::Char('J') => UiAction::MoveDown,
        KeyCode::Tab => UiAction::NextCategory,
        KeyCode::BackTab => UiAction::PrevCategory,
        KeyCode::Char(' ') => UiAction::ToggleDrag,
        KeyCode::Esc => UiAction::CancelDrag,
        KeyCode::Char('a') => UiAction::Alphabetical,
        KeyCode::Char('p') => UiAction::Performance,
        KeyCode::Char('s') => UiAction::Save,
        _ => return None,
    };
    Some(action)
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct Drag {
    id: ServerId,
    order: Vec<ServerId>,
    pos: usize,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ViewModel {
    selected: usize,
    drag: Option<Drag>,
}

impl ViewModel {
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn dragging(&self) -> Option<ServerId> {
        self.drag.as_ref().map(|d| d.id)
    }

    /// Ids in the order they should be drawn: the session's view, or the
    /// provisional order while a drag is in progress.
    pub fn displayed_ids<S: Store, N: Notifier>(&self, session: &Session<S, N>) -> Vec<ServerId> {
        match &self.drag {
            Some(drag) => drag.order.clone(),
            None => session.manager().view().map(|r| r.id).collect(),
        }
    }

    fn selected_id<S: Store, N: Notifier>(&self, session: &Session<S, N>) -> Option<ServerId> {
        self.displayed_ids(session).get(self.selected).copied()
    }

    fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn follow(&mut self, id: ServerId, ids: &[ServerId]) {
        if let Some(pos) = ids.iter().position(|i| *i == id) {
            self.selected = pos;
        }
    }

    // Runs a command, keeping the selection on `follow` if given. Failures
    // have already been reported through the session's notifier.
    fn run<S: Store, N: Notifier>(
        &mut self,
        session: &mut Session<S, N>,
        cmd: Command,
        follow: Option<ServerId>,
    ) {
        if let Err(e) = session.apply(cmd) {
            warn!(target: "bdixdir", "command failed: {}", e);
        }
        let ids = self.displayed_ids(session);
        if let Some(id) = follow {
            self.follow(id, &ids);
        }
        self.clamp_selection(ids.len());
    }

    fn cycle_category<S: Store, N: Notifier>(&mut self, session: &mut Session<S, N>, step: isize) {
        let mut filters = vec![CategoryFilter::All];
        filters.extend(
            session
                .manager()
                .categories()
                .into_iter()
                .map(CategoryFilter::Only),
        );
        let current = session.manager().active_category();
        let pos = filters.iter().position(|f| f == current).unwrap_or(0) as isize;
        let next = (pos + step).rem_euclid(filters.len() as isize) as usize;
        let filter = filters.swap_remove(next);
        self.selected = 0;
        self.run(session, Command::SetCategory(filter), None);
    }

    /// Applies one action. Returns true when the UI should exit.
    pub fn handle<S: Store, N: Notifier>(
        &mut self,
        session: &mut Session<S, N>,
        action: UiAction,
    ) -> bool {
        if self.drag.is_some() {
            return self.handle_dragging(session, action);
        }
        match action {
            UiAction::Quit => return true,
            UiAction::SelectPrev => self.selected = self.selected.saturating_sub(1),
            UiAction::SelectNext => {
                self.selected += 1;
                self.clamp_selection(session.manager().view().count());
            }
            UiAction::MoveUp | UiAction::MoveDown => {
                if let Some(id) = self.selected_id(session) {
                    let cmd = if action == UiAction::MoveUp {
                        Command::MoveUp(id)
                    } else {
                        Command::MoveDown(id)
                    };
                    self.run(session, cmd, Some(id));
                }
            }
            UiAction::NextCategory => self.cycle_category(session, 1),
            UiAction::PrevCategory => self.cycle_category(session, -1),
            UiAction::ToggleDrag => {
                let order = self.displayed_ids(session);
                if let Some(&id) = order.get(self.selected) {
                    debug!(target: "bdixdir", %id, "drag started");
                    self.drag = Some(Drag {
                        id,
                        order,
                        pos: self.selected,
                    });
                }
            }
            UiAction::CancelDrag => (),
            UiAction::Alphabetical => {
                let id = self.selected_id(session);
                self.run(session, Command::ResetAlphabetical, id);
            }
            UiAction::Performance => {
                let id = self.selected_id(session);
                self.run(session, Command::PerformanceRanking, id);
            }
            UiAction::Save => self.run(session, Command::Save, None),
        }
        false
    }

    fn handle_dragging<S: Store, N: Notifier>(
        &mut self,
        session: &mut Session<S, N>,
        action: UiAction,
    ) -> bool {
        let Some(mut drag) = self.drag.take() else {
            return false;
        };
        match action {
            UiAction::SelectPrev | UiAction::MoveUp if drag.pos > 0 => {
                drag.order.swap(drag.pos, drag.pos - 1);
                drag.pos -= 1;
            }
            UiAction::SelectNext | UiAction::MoveDown if drag.pos + 1 < drag.order.len() => {
                drag.order.swap(drag.pos, drag.pos + 1);
                drag.pos += 1;
            }
            UiAction::ToggleDrag => {
                debug!(target: "bdixdir", id = %drag.id, pos = drag.pos, "dropped");
                self.selected = drag.pos;
                self.run(session, Command::ManualReorder(drag.order), Some(drag.id));
                return false;
            }
            UiAction::CancelDrag => {
                let ids = self.displayed_ids(session);
                self.follow(drag.id, &ids);
                session
                    .notifier_mut()
                    .notify("drag cancelled", Severity::Info);
                return false;
            }
            UiAction::Quit => return true,
            // Anything that would change the view under the drag is
            // ignored until the drag ends.
            _ => (),
        }
        self.selected = drag.pos;
        self.drag = Some(drag);
        false
    }
}
