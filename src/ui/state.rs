use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::constants::*;
use crate::engine::{GraphView, GraphWatch};
use crate::models::{FormField, FormInputs, FormState, TextInput};
use crate::report::ReportError;
use crate::workflow::{GenerationWorkflow, Submission};

use super::tabs::{Tab, TabController, TabError};
use super::theme::Theme;

/// Complete UI state, rendered each frame.
pub struct AppState {
    // ── Form and generation ─────────────────────────────────────
    pub form: FormState,
    pub workflow: GenerationWorkflow,
    /// Text field being edited and its uncommitted buffer. Written back
    /// through the form setters when editing ends.
    draft: Option<(FormField, TextInput)>,
    pub report_scroll: usize,

    // ── Tabs and the retained graph view ────────────────────────
    pub tabs: TabController,
    pub graph_view: GraphView,
    graph_tx: watch::Sender<GraphWatch>,

    // ── Chrome ──────────────────────────────────────────────────
    pub theme: Theme,
    pub show_help: bool,
    pub tick_count: u64,
    pub status_message: Option<(String, Instant)>,
    /// Name of the report backend in use.
    pub backend_name: String,
}

impl AppState {
    pub fn new(inputs: &FormInputs, theme: Theme, backend_name: &str) -> Self {
        let (graph_tx, _) = watch::channel(GraphWatch::default());
        Self {
            form: FormState::new(inputs),
            workflow: GenerationWorkflow::new(),
            draft: None,
            report_scroll: 0,
            tabs: TabController::new(),
            graph_view: GraphView::default(),
            graph_tx,
            theme,
            show_help: false,
            tick_count: 0,
            status_message: None,
            backend_name: backend_name.to_string(),
        }
    }

    /// Receiver for the render lifecycle.
    pub fn subscribe_graph(&self) -> watch::Receiver<GraphWatch> {
        self.graph_tx.subscribe()
    }

    pub fn active_tab(&self) -> Tab {
        self.tabs.current()
    }

    /// Push the active tab and diagram source to observers, if either changed.
    fn publish_graph_state(&self) {
        let tab = self.tabs.current();
        let source = self.workflow.result().diagram_source.clone();
        self.graph_tx.send_if_modified(|current| {
            if current.tab == tab && current.source == source {
                return false;
            }
            current.tab = tab;
            current.source = source;
            true
        });
    }

    // ── Tabs ────────────────────────────────────────────────────

    pub fn select_tab(&mut self, name: &str) -> Result<Tab, TabError> {
        let tab = self.tabs.select(name)?;
        self.leave_edit_mode();
        self.publish_graph_state();
        Ok(tab)
    }

    pub fn next_tab(&mut self) {
        let name = self.active_tab().next().name();
        if let Err(e) = self.select_tab(name) {
            self.set_status(e.to_string());
        }
    }

    pub fn prev_tab(&mut self) {
        let name = self.active_tab().prev().name();
        if let Err(e) = self.select_tab(name) {
            self.set_status(e.to_string());
        }
    }

    // ── Form ────────────────────────────────────────────────────

    /// Start editing the focused field if it holds text.
    pub fn enter_edit_mode(&mut self) -> bool {
        if self.draft.is_none() {
            let field = self.form.focus;
            if let Some(input) = self.form.input(field) {
                let mut draft = input.clone();
                draft.cursor_end();
                self.draft = Some((field, draft));
            }
        }
        self.is_editing()
    }

    /// Finish editing and commit the draft to the form.
    pub fn leave_edit_mode(&mut self) {
        if let Some((field, draft)) = self.draft.take() {
            match field {
                FormField::Location => self.form.set_location(draft.value()),
                FormField::Concerns => self.form.set_concerns(draft.value()),
                FormField::WaterSource | FormField::Submit => {}
            }
        }
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// The uncommitted buffer, if `field` is being edited.
    pub fn draft_for(&self, field: FormField) -> Option<&TextInput> {
        match &self.draft {
            Some((f, input)) if *f == field => Some(input),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut TextInput> {
        self.draft.as_mut().map(|(_, input)| input)
    }

    /// Submit the form. Refusals are shown on the status line.
    pub fn submit(&mut self) -> Option<Submission> {
        self.leave_edit_mode();
        match self.workflow.submit(&self.form) {
            Ok(submission) => Some(submission),
            Err(e) => {
                tracing::debug!(error = %e, "submission refused");
                self.set_status(capitalize(&e.to_string()));
                None
            }
        }
    }

    /// Apply a backend answer; stale answers are ignored.
    pub fn complete(&mut self, id: u64, outcome: Result<String, ReportError>) {
        if !self.workflow.complete(id, outcome) {
            return;
        }
        let result = self.workflow.result();
        if result.is_error {
            let detail = result.last_error.clone().unwrap_or_default();
            self.set_status(format!("Report failed: {}", detail));
        } else {
            self.report_scroll = 0;
            self.set_status("Report ready. Press 4 to see the memory graph.".to_string());
        }
        self.publish_graph_state();
    }

    // ── Chrome ──────────────────────────────────────────────────

    /// Cycle to the next built-in theme.
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next_builtin();
        self.set_status(format!("Theme: {}", self.theme.name));
    }

    /// Set a status bar message with automatic timestamp.
    pub fn set_status(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    /// Advance animations and expire the status message.
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        let expired = self
            .status_message
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() >= Duration::from_secs(STATUS_MESSAGE_TIMEOUT_SECS));
        if expired {
            self.status_message = None;
        }
    }

    // ── Scrolling ───────────────────────────────────────────────

    pub fn scroll_report_up(&mut self, lines: usize) {
        self.report_scroll = self.report_scroll.saturating_sub(lines);
    }

    pub fn scroll_report_down(&mut self, lines: usize) {
        self.report_scroll = self.report_scroll.saturating_add(lines);
    }

    pub fn page_report_up(&mut self) {
        self.scroll_report_up(PAGE_SIZE);
    }

    pub fn page_report_down(&mut self) {
        self.scroll_report_down(PAGE_SIZE);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_state() -> AppState {
        AppState::new(&FormInputs::default(), Theme::default(), "builtin")
    }

    fn watched(rx: &watch::Receiver<GraphWatch>) -> GraphWatch {
        rx.borrow().clone()
    }

    // ── tabs ──────────────────────────────────────────────────────

    #[test]
    fn tab_changes_are_published() {
        let mut s = make_state();
        let mut rx = s.subscribe_graph();
        s.select_tab("graph").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(watched(&rx).tab, Tab::Graph);
        rx.borrow_and_update();

        // Re-selecting the same tab is not a change
        s.select_tab("graph").unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn unknown_tab_keeps_selection() {
        let mut s = make_state();
        s.select_tab("planner").unwrap();
        assert!(s.select_tab("dashboard").is_err());
        assert_eq!(s.active_tab(), Tab::Planner);
        assert_eq!(s.select_tab("graph"), Ok(Tab::Graph));
    }

    #[test]
    fn switching_tabs_leaves_edit_mode() {
        let mut s = make_state();
        assert!(s.enter_edit_mode());
        s.next_tab();
        assert!(!s.is_editing());
        assert_eq!(s.active_tab(), Tab::Planner);
        s.prev_tab();
        s.prev_tab();
        assert_eq!(s.active_tab(), Tab::Graph);
    }

    // ── form ──────────────────────────────────────────────────────

    #[test]
    fn edit_mode_only_on_text_fields() {
        let mut s = make_state();
        s.form.focus = FormField::WaterSource;
        assert!(!s.enter_edit_mode());
        s.form.focus = FormField::Concerns;
        assert!(s.enter_edit_mode());
    }

    #[test]
    fn draft_is_committed_through_setters() {
        let mut s = make_state();
        s.form.focus = FormField::Concerns;
        assert!(s.enter_edit_mode());
        let draft = s.draft_mut().unwrap();
        draft.cursor_home();
        draft.insert_char('!');

        // The form keeps the old value until editing ends
        assert_eq!(s.form.concerns(), DEFAULT_CONCERNS);
        assert_eq!(s.draft_for(FormField::Concerns).unwrap().value().chars().next(), Some('!'));
        assert!(s.draft_for(FormField::Location).is_none());

        s.leave_edit_mode();
        assert!(s.form.concerns().starts_with("!The water"));
        assert!(s.draft_for(FormField::Concerns).is_none());
    }

    #[test]
    fn submit_commits_open_draft() {
        let mut s = make_state();
        s.enter_edit_mode();
        s.draft_mut().unwrap().insert_char('X');
        let sub = s.submit().unwrap();
        assert_eq!(sub.inputs.location, "ChhattisgarhX");
        assert!(!s.is_editing());
    }

    #[test]
    fn submit_refusal_sets_status() {
        let mut s = make_state();
        s.form.set_location("");
        assert!(s.submit().is_none());
        let (msg, _) = s.status_message.as_ref().unwrap();
        assert_eq!(msg, "Location is required");
        assert!(!s.workflow.is_loading());
    }

    #[test]
    fn completion_publishes_diagram_source() {
        let mut s = make_state();
        let mut rx = s.subscribe_graph();
        let sub = s.submit().unwrap();
        assert!(!rx.has_changed().unwrap());
        s.complete(sub.id, Ok("report".into()));
        assert!(rx.has_changed().unwrap());
        let w = rx.borrow_and_update().clone();
        assert!(w.source.unwrap().as_str().contains("Chhattisgarh"));
        assert_eq!(w.tab, Tab::Report);
    }

    #[test]
    fn failed_completion_does_not_publish() {
        let mut s = make_state();
        let rx = s.subscribe_graph();
        let sub = s.submit().unwrap();
        s.complete(sub.id, Err(ReportError::Empty));
        assert!(!rx.has_changed().unwrap());
        let (msg, _) = s.status_message.as_ref().unwrap();
        assert!(msg.starts_with("Report failed:"));
    }

    #[test]
    fn stale_completion_leaves_status_alone() {
        let mut s = make_state();
        let sub = s.submit().unwrap();
        s.complete(sub.id + 1, Ok("late".into()));
        assert!(s.status_message.is_none());
        assert!(s.workflow.is_loading());
    }

    // ── chrome ────────────────────────────────────────────────────

    #[test]
    fn set_status_stores_message() {
        let mut s = make_state();
        s.set_status("test message".to_string());
        let (msg, _) = s.status_message.as_ref().unwrap();
        assert_eq!(msg, "test message");
        s.tick();
        assert!(s.status_message.is_some());
    }

    #[test]
    fn cycle_theme_changes_name() {
        let mut s = make_state();
        s.cycle_theme();
        assert_ne!(s.theme.name, "default");
    }

    #[test]
    fn report_scroll_saturates() {
        let mut s = make_state();
        s.page_report_up();
        assert_eq!(s.report_scroll, 0);
        s.page_report_down();
        s.scroll_report_up(3);
        assert_eq!(s.report_scroll, PAGE_SIZE - 3);
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("location is required"), "Location is required");
        assert_eq!(capitalize(""), "");
    }
}
