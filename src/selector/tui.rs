use std::io::{self, Stdout};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::debug;

use super::{EventSource, Selection, Selector, SelectorEvent, SelectorView, run_selector};
use crate::error::{AbortReason, Result, SwimError};
use crate::types::ContainerSummary;

const TITLE: &str = "Select a container";
const HELP: &str = "type to filter • ↑/↓ move • enter select • esc cancel";

/// Let the operator pick one of `items` on the terminal.
///
/// Returns without touching the terminal when `items` is empty.
pub fn select_container(items: Vec<ContainerSummary>) -> Result<Selection> {
    if items.is_empty() {
        return Ok(Selection::None(AbortReason::NoContainers));
    }

    let mut view = TerminalView::enter().map_err(SwimError::Terminal)?;
    let selection = run_selector(items, &mut CrosstermEvents, &mut view);
    view.leave().map_err(SwimError::Terminal)?;
    selection.map_err(SwimError::Terminal)
}

/// Translate a key press into a selector event
pub fn map_key(key: KeyEvent) -> Option<SelectorEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(SelectorEvent::Cancel),
        KeyCode::Char('p') if ctrl => Some(SelectorEvent::Up),
        KeyCode::Char('n') if ctrl => Some(SelectorEvent::Down),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(SelectorEvent::Char(c)),
        KeyCode::Backspace => Some(SelectorEvent::Backspace),
        KeyCode::Up => Some(SelectorEvent::Up),
        KeyCode::Down => Some(SelectorEvent::Down),
        KeyCode::Enter => Some(SelectorEvent::Confirm),
        KeyCode::Esc => Some(SelectorEvent::Cancel),
        _ => None,
    }
}

/// Blocking reader over crossterm key events
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self) -> io::Result<SelectorEvent> {
        loop {
            if let Event::Key(key) = event::read()? {
                if let Some(mapped) = map_key(key) {
                    return Ok(mapped);
                }
            }
        }
    }
}

/// Alternate-screen terminal, restored on leave or drop
pub struct TerminalView {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl TerminalView {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        debug!("Entered selector screen");
        Ok(Self {
            terminal,
            active: true,
        })
    }

    pub fn leave(mut self) -> io::Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }
}

impl Drop for TerminalView {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

impl SelectorView for TerminalView {
    fn render(&mut self, selector: &Selector) -> io::Result<()> {
        self.terminal.draw(|frame| draw(frame, selector))?;
        Ok(())
    }
}

fn draw(frame: &mut Frame, selector: &Selector) {
    let chunks = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(frame.area());

    let dim = Style::default().fg(Color::DarkGray);
    let items: Vec<ListItem> = selector
        .visible()
        .map(|container| {
            let mut detail = format!("  {}", container.short_id());
            let ports = container.ports_label();
            if !ports.is_empty() {
                detail.push_str("  ");
                detail.push_str(&ports);
            }
            ListItem::new(Line::from(vec![
                Span::raw(container.display_name.clone()),
                Span::styled(detail, dim),
            ]))
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .block(Block::bordered().title(TITLE))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected((!empty).then_some(selector.cursor()));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let filter = if empty {
        format!("Filter: {} (no matches)", selector.filter())
    } else {
        format!("Filter: {}", selector.filter())
    };
    frame.render_widget(Paragraph::new(filter), chunks[1]);
    frame.render_widget(Paragraph::new(Span::styled(HELP, dim)), chunks[2]);
}
