//! Interactive container selection.
//!
//! [`Selector`] is a pure state machine fed with [`SelectorEvent`]s. It starts
//! in [`SelectorState::Browsing`] and ends in `Confirmed` or `Cancelled`.
//! Rendering and key handling live in [`tui`], which only translates terminal
//! input into events and draws the current view.
//!
//! Filtering is a case-insensitive substring match on the display name.
//! Filtered entries keep the listing order.

use crate::error::{AbortReason, Result, SwimError};
use crate::types::ContainerSummary;

pub mod tui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEvent {
    /// Append a character to the filter
    Char(char),
    /// Remove the last filter character
    Backspace,
    Up,
    Down,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorState {
    Browsing,
    Confirmed(String),
    Cancelled,
}

/// Outcome of a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Selected(String),
    None(AbortReason),
}

impl Selection {
    pub fn into_result(self) -> Result<String> {
        match self {
            Selection::Selected(id) => Ok(id),
            Selection::None(reason) => Err(SwimError::SelectionAborted(reason)),
        }
    }
}

pub struct Selector {
    items: Vec<ContainerSummary>,
    filter: String,
    /// Indices into `items` matching `filter`, in listing order
    visible: Vec<usize>,
    cursor: usize,
    state: SelectorState,
}

impl Selector {
    pub fn new(items: Vec<ContainerSummary>) -> Self {
        let visible = (0..items.len()).collect();
        Self {
            items,
            filter: String::new(),
            visible,
            cursor: 0,
            state: SelectorState::Browsing,
        }
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.state, SelectorState::Browsing)
    }

    /// Entries matching the current filter
    pub fn visible(&self) -> impl Iterator<Item = &ContainerSummary> + '_ {
        self.visible.iter().map(|&i| &self.items[i])
    }

    pub fn highlighted(&self) -> Option<&ContainerSummary> {
        self.visible.get(self.cursor).map(|&i| &self.items[i])
    }

    pub fn handle(&mut self, event: SelectorEvent) -> &SelectorState {
        if self.is_finished() {
            return &self.state;
        }

        match event {
            SelectorEvent::Char(c) => {
                self.filter.push(c);
                self.refilter();
            }
            SelectorEvent::Backspace => {
                if self.filter.pop().is_some() {
                    self.refilter();
                }
            }
            SelectorEvent::Up => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            SelectorEvent::Down => {
                if self.cursor + 1 < self.visible.len() {
                    self.cursor += 1;
                }
            }
            SelectorEvent::Confirm => {
                if let Some(id) = self.highlighted().map(|item| item.id.clone()) {
                    self.state = SelectorState::Confirmed(id);
                }
            }
            SelectorEvent::Cancel => {
                self.state = SelectorState::Cancelled;
            }
        }

        &self.state
    }

    pub fn selection(&self) -> Option<Selection> {
        match &self.state {
            SelectorState::Browsing => None,
            SelectorState::Confirmed(id) => Some(Selection::Selected(id.clone())),
            SelectorState::Cancelled => Some(Selection::None(AbortReason::Cancelled)),
        }
    }

    fn refilter(&mut self) {
        let needle = self.filter.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.display_name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.cursor = 0;
    }
}

/// Source of selector events, one per call
pub trait EventSource {
    fn next_event(&mut self) -> std::io::Result<SelectorEvent>;
}

/// Anything that can draw the selector between events
pub trait SelectorView {
    fn render(&mut self, selector: &Selector) -> std::io::Result<()>;
}

/// Drive a selector until it reaches a terminal state.
///
/// An empty listing returns immediately without rendering or reading input.
pub fn run_selector<E, V>(
    items: Vec<ContainerSummary>,
    events: &mut E,
    view: &mut V,
) -> std::io::Result<Selection>
where
    E: EventSource,
    V: SelectorView,
{
    if items.is_empty() {
        return Ok(Selection::None(AbortReason::NoContainers));
    }

    let mut selector = Selector::new(items);
    loop {
        view.render(&selector)?;
        let event = events.next_event()?;
        selector.handle(event);
        if let Some(selection) = selector.selection() {
            return Ok(selection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    fn containers(names: &[&str]) -> Vec<ContainerSummary> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| ContainerSummary::new(format!("id-{i}"), name, vec![]))
            .collect()
    }

    fn visible_names(selector: &Selector) -> Vec<String> {
        selector.visible().map(|c| c.display_name.clone()).collect()
    }

    struct Scripted(VecDeque<SelectorEvent>);

    impl EventSource for Scripted {
        fn next_event(&mut self) -> std::io::Result<SelectorEvent> {
            self.0.pop_front().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "script exhausted")
            })
        }
    }

    #[derive(Default)]
    struct CountingView(usize);

    impl SelectorView for CountingView {
        fn render(&mut self, _selector: &Selector) -> std::io::Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn test_starts_browsing_on_first_entry() {
        let selector = Selector::new(containers(&["web", "db"]));
        assert_eq!(selector.state(), &SelectorState::Browsing);
        assert_eq!(selector.highlighted().unwrap().display_name, "web");
    }

    #[test]
    fn test_filter_is_stable_and_case_insensitive() {
        let mut selector = Selector::new(containers(&["web-api", "db", "Web-front", "cache"]));
        selector.handle(SelectorEvent::Char('w'));
        selector.handle(SelectorEvent::Char('E'));
        assert_eq!(visible_names(&selector), vec!["web-api", "Web-front"]);
    }

    #[test]
    fn test_backspace_widens_filter() {
        let mut selector = Selector::new(containers(&["web", "db"]));
        selector.handle(SelectorEvent::Char('d'));
        assert_eq!(visible_names(&selector), vec!["db"]);
        selector.handle(SelectorEvent::Backspace);
        assert_eq!(visible_names(&selector), vec!["web", "db"]);
    }

    #[test]
    fn test_cursor_clamps_and_resets_on_filter() {
        let mut selector = Selector::new(containers(&["a1", "a2", "a3"]));
        selector.handle(SelectorEvent::Up);
        assert_eq!(selector.cursor(), 0);
        for _ in 0..5 {
            selector.handle(SelectorEvent::Down);
        }
        assert_eq!(selector.cursor(), 2);
        selector.handle(SelectorEvent::Char('a'));
        assert_eq!(selector.cursor(), 0);
    }

    #[test]
    fn test_confirm_selects_highlighted_id() {
        let mut selector = Selector::new(containers(&["web", "db", "cache"]));
        selector.handle(SelectorEvent::Down);
        let state = selector.handle(SelectorEvent::Confirm).clone();
        assert_eq!(state, SelectorState::Confirmed("id-1".to_string()));
        assert_eq!(
            selector.selection(),
            Some(Selection::Selected("id-1".to_string()))
        );
    }

    #[test]
    fn test_confirm_on_empty_filter_result_is_noop() {
        let mut selector = Selector::new(containers(&["web"]));
        selector.handle(SelectorEvent::Char('z'));
        selector.handle(SelectorEvent::Confirm);
        assert_eq!(selector.state(), &SelectorState::Browsing);
        assert_eq!(selector.selection(), None);
    }

    #[test]
    fn test_cancel_always_cancels() {
        let mut selector = Selector::new(containers(&["web"]));
        selector.handle(SelectorEvent::Down);
        assert_eq!(
            selector.handle(SelectorEvent::Cancel),
            &SelectorState::Cancelled
        );
        assert_eq!(
            selector.selection(),
            Some(Selection::None(AbortReason::Cancelled))
        );
    }

    #[test]
    fn test_terminal_state_ignores_further_events() {
        let mut selector = Selector::new(containers(&["web"]));
        selector.handle(SelectorEvent::Cancel);
        selector.handle(SelectorEvent::Confirm);
        assert_eq!(selector.state(), &SelectorState::Cancelled);
    }

    #[test]
    fn test_run_with_no_containers_skips_loop() {
        let mut events = Scripted(VecDeque::new());
        let mut view = CountingView::default();

        let selection = run_selector(Vec::new(), &mut events, &mut view).unwrap();

        assert_eq!(selection, Selection::None(AbortReason::NoContainers));
        assert_eq!(view.0, 0);
    }

    #[test]
    fn test_run_renders_after_each_event() {
        let mut events = Scripted(VecDeque::from(vec![
            SelectorEvent::Char('d'),
            SelectorEvent::Char('b'),
            SelectorEvent::Confirm,
        ]));
        let mut view = CountingView::default();

        let selection = run_selector(containers(&["web", "db"]), &mut events, &mut view).unwrap();

        assert_eq!(selection, Selection::Selected("id-1".to_string()));
        assert_eq!(view.0, 3);
    }

    #[test]
    fn test_selection_into_result() {
        let err = Selection::None(AbortReason::Cancelled)
            .into_result()
            .unwrap_err();
        assert!(matches!(
            err,
            SwimError::SelectionAborted(AbortReason::Cancelled)
        ));
    }
}
