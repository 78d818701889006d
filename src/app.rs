//! Application struct and event loop.
//!
//! Owns the terminal, state, the report backend and the diagram engine.
//! Report requests run on spawned tasks and come back over a channel that is
//! drained once per loop turn, followed by one render-lifecycle poll.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::constants::*;
use crate::engine::{
    DiagramEngine, DiagramRenderLifecycle, EngineConfig, EngineTheme, FlowchartEngine,
};
use crate::models::FormField;
use crate::report::{self, ReportEvent, ReportService};
use crate::ui::{self, AppState, Tab, Theme};
use crate::workflow::Submission;

/// Main application struct.
pub struct App {
    state: AppState,
    service: Arc<dyn ReportService>,
    engine: FlowchartEngine,
    lifecycle: DiagramRenderLifecycle,

    // Channels
    report_tx: mpsc::UnboundedSender<ReportEvent>,
    report_rx: mpsc::UnboundedReceiver<ReportEvent>,
}

impl App {
    /// Create the app from config: backend selection, theme and engine setup.
    pub fn new(config: &Config, offline: bool) -> Self {
        // Load .env for ANTHROPIC_API_KEY (optional, never committed)
        let _ = dotenvy::from_path(env_file_path());

        let service = report::build_service(&config.report, offline);
        Self::with_service(config, service)
    }

    /// Create the app around an already chosen report backend.
    pub fn with_service(config: &Config, service: Arc<dyn ReportService>) -> Self {
        let inputs = config.form.to_inputs();
        let theme = Theme::resolve(&config.theme);
        let state = AppState::new(&inputs, theme, service.name());

        let mut engine = FlowchartEngine::new();
        engine.initialize(EngineConfig {
            theme: EngineTheme::from_name(&config.diagram.theme),
            ascii: config.diagram.ascii,
        });
        let lifecycle = DiagramRenderLifecycle::new(state.subscribe_graph());

        let (report_tx, report_rx) = mpsc::unbounded_channel();

        tracing::info!(backend = service.name(), theme = %state.theme.name, "app initialized");

        Self {
            state,
            service,
            engine,
            lifecycle,
            report_tx,
            report_rx,
        }
    }

    /// Run the main event loop. Returns when the user quits.
    pub async fn run(&mut self) -> Result<()> {
        // Terminal init
        enable_raw_mode().context("enabling raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let outcome = self.event_loop(&mut terminal).await;

        // Cleanup runs even when the loop failed
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        outcome?;
        println!("\nAquaSentinel stopped.\n");
        Ok(())
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            self.drain_report_events();
            self.lifecycle
                .poll(&mut self.state.graph_view, &mut self.engine);

            terminal.draw(|frame| ui::render(frame, &self.state))?;

            if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key) {
                        break; // quit requested
                    }
                }
            }

            self.state.tick();
            // Let spawned report tasks make progress between frames
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    // ── Report dispatch ──────────────────────────────────────────

    fn dispatch_report(&self, submission: Submission) {
        let service = Arc::clone(&self.service);
        let tx = self.report_tx.clone();

        tokio::spawn(async move {
            let result = service.generate_report(&submission.inputs).await;
            if let Err(e) = &result {
                tracing::warn!(id = submission.id, error = %e, "report backend failed");
            }
            // Receiver gone means the app is shutting down
            let _ = tx.send(ReportEvent {
                id: submission.id,
                result,
            });
        });
    }

    fn drain_report_events(&mut self) {
        while let Ok(event) = self.report_rx.try_recv() {
            self.apply_report_event(event);
        }
    }

    fn apply_report_event(&mut self, event: ReportEvent) {
        self.state.complete(event.id, event.result);
    }

    fn submit(&mut self) {
        if let Some(submission) = self.state.submit() {
            self.dispatch_report(submission);
        }
    }

    // ── Keyboard handling ────────────────────────────────────────

    /// Handle a key event. Returns `true` if the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Global chords, valid in every mode
        if ctrl {
            match key.code {
                KeyCode::Char('c') => return true,
                KeyCode::Char('s') => {
                    self.submit();
                    return false;
                }
                _ => {}
            }
        }

        if self.state.show_help {
            return self.handle_key_help(key);
        }

        if self.state.is_editing() {
            return self.handle_key_editing(key);
        }

        self.handle_key_normal(key)
    }

    fn handle_key_help(&mut self, key: KeyEvent) -> bool {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
            self.state.show_help = false;
        }
        false
    }

    fn handle_key_editing(&mut self, key: KeyEvent) -> bool {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            self.state.leave_edit_mode();
            return false;
        }
        if key.code == KeyCode::Tab {
            self.state.leave_edit_mode();
            self.state.form.focus_next();
            return false;
        }

        let Some(input) = self.state.draft_mut() else {
            self.state.leave_edit_mode();
            return false;
        };
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                input.insert_char(c)
            }
            KeyCode::Backspace => input.backspace(),
            KeyCode::Delete => input.delete(),
            KeyCode::Left => input.cursor_left(),
            KeyCode::Right => input.cursor_right(),
            KeyCode::Home => input.cursor_home(),
            KeyCode::End => input.cursor_end(),
            _ => {}
        }
        false
    }

    fn handle_key_normal(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,

            // Tab navigation
            KeyCode::Tab => self.state.next_tab(),
            KeyCode::BackTab => self.state.prev_tab(),
            KeyCode::Char(c @ '1'..='4') => {
                let index = (c as usize) - ('1' as usize);
                if let Some(name) = Tab::all().get(index).map(|t| t.name()) {
                    if let Err(e) = self.state.select_tab(name) {
                        self.state.set_status(e.to_string());
                    }
                }
            }

            // Chrome
            KeyCode::Char('?') => self.state.show_help = true,
            KeyCode::Char('t') | KeyCode::Char('T') => self.state.cycle_theme(),

            _ => match self.state.active_tab() {
                Tab::Report => self.handle_key_report(key),
                Tab::Graph => self.handle_key_graph(key),
                Tab::Planner | Tab::Awareness => {}
            },
        }
        false
    }

    fn handle_key_report(&mut self, key: KeyEvent) {
        let focus = self.state.form.focus;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.state.form.focus_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.state.form.focus_next(),
            KeyCode::Left if focus == FormField::WaterSource => {
                self.state.form.prev_water_source()
            }
            KeyCode::Right if focus == FormField::WaterSource => {
                self.state.form.next_water_source()
            }
            KeyCode::Enter => match focus {
                FormField::Submit => self.submit(),
                FormField::WaterSource => self.state.form.next_water_source(),
                _ => {
                    self.state.enter_edit_mode();
                }
            },
            KeyCode::PageUp => self.state.page_report_up(),
            KeyCode::PageDown => self.state.page_report_down(),
            KeyCode::Home => self.state.report_scroll = 0,
            _ => {}
        }
    }

    fn handle_key_graph(&mut self, key: KeyEvent) {
        let view = &mut self.state.graph_view;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => view.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => view.scroll_down(),
            KeyCode::PageUp => (0..PAGE_SIZE).for_each(|_| view.scroll_up()),
            KeyCode::PageDown => (0..PAGE_SIZE).for_each(|_| view.scroll_down()),
            KeyCode::Home => view.scroll = 0,
            _ => {}
        }
    }
}
