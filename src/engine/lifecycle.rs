//! When to run the diagram engine.
//!
//! The app state publishes the active tab and the current diagram source on a
//! watch channel. The lifecycle observes it once per event-loop turn and runs
//! the engine only when the Graph tab is shown with source it has not rendered.

use tokio::sync::watch;

use super::{DiagramEngine, GraphView};
use crate::diagram::DiagramSource;
use crate::ui::Tab;

/// Observed inputs of the render lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphWatch {
    pub tab: Tab,
    pub source: Option<DiagramSource>,
}

pub struct DiagramRenderLifecycle {
    rx: watch::Receiver<GraphWatch>,
    last_rendered: Option<DiagramSource>,
    renders: u64,
    primed: bool,
}

impl DiagramRenderLifecycle {
    pub fn new(rx: watch::Receiver<GraphWatch>) -> Self {
        Self {
            rx,
            last_rendered: None,
            renders: 0,
            primed: false,
        }
    }

    /// Number of engine runs issued so far.
    #[cfg(test)]
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// React to any change in the observed inputs.
    ///
    /// Returns `true` when the engine was invoked.
    pub fn poll(&mut self, view: &mut GraphView, engine: &mut dyn DiagramEngine) -> bool {
        let changed = match self.rx.has_changed() {
            Ok(changed) => changed,
            // Sender gone: the app is shutting down
            Err(_) => return false,
        };
        if !changed && self.primed {
            return false;
        }
        self.primed = true;
        let state = self.rx.borrow_and_update().clone();

        let on_graph = state.tab == Tab::Graph;
        view.set_attached(on_graph);
        if !on_graph {
            return false;
        }
        let source = match state.source {
            Some(source) => source,
            None => return false,
        };
        if self.last_rendered.as_ref() == Some(&source) {
            return false;
        }

        let container = match view.locate_container() {
            Some(container) => container,
            None => {
                tracing::debug!("graph container not mounted, render deferred");
                return false;
            }
        };
        container.clear_processed();
        container.set_source(source.clone());
        self.last_rendered = Some(source);
        self.renders += 1;

        // A failed source is not retried until the source changes
        let result = engine.run(&mut [container]);
        match result {
            Ok(()) => {
                view.render_error = None;
                view.scroll = 0;
                tracing::debug!(renders = self.renders, "memory graph rendered");
            }
            Err(e) => {
                tracing::warn!(error = %e, "memory graph render failed");
                view.render_error = Some(e.to_string());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::generate;
    use crate::engine::{EngineConfig, FlowchartEngine, GraphContainer, RenderError};
    use crate::models::WaterSource;

    #[derive(Default)]
    struct CountingEngine {
        runs: usize,
        fail: bool,
    }

    impl DiagramEngine for CountingEngine {
        fn initialize(&mut self, _config: EngineConfig) {}

        fn run(&mut self, nodes: &mut [&mut GraphContainer]) -> Result<(), RenderError> {
            self.runs += 1;
            for n in nodes.iter() {
                assert!(n.is_attached(), "engine ran against a detached view");
                assert!(!n.is_processed(), "processed marker not cleared");
            }
            if self.fail {
                return Err(RenderError::Syntax {
                    statement: 1,
                    message: "boom".into(),
                });
            }
            Ok(())
        }
    }

    fn setup() -> (watch::Sender<GraphWatch>, DiagramRenderLifecycle, GraphView) {
        let (tx, rx) = watch::channel(GraphWatch::default());
        (tx, DiagramRenderLifecycle::new(rx), GraphView::default())
    }

    fn src(location: &str) -> DiagramSource {
        generate(location, WaterSource::Borewell, "Salty")
    }

    fn publish(tx: &watch::Sender<GraphWatch>, tab: Tab, source: Option<DiagramSource>) {
        tx.send_replace(GraphWatch { tab, source });
    }

    #[test]
    fn first_poll_without_source_does_nothing() {
        let (_tx, mut lc, mut view) = setup();
        let mut engine = CountingEngine::default();
        assert!(!lc.poll(&mut view, &mut engine));
        assert_eq!(engine.runs, 0);
        assert!(!view.is_attached());
    }

    #[test]
    fn no_render_on_other_tabs() {
        let (tx, mut lc, mut view) = setup();
        let mut engine = CountingEngine::default();
        publish(&tx, Tab::Report, Some(src("Pune")));
        lc.poll(&mut view, &mut engine);
        publish(&tx, Tab::Planner, Some(src("Delhi")));
        lc.poll(&mut view, &mut engine);
        assert_eq!(engine.runs, 0);
    }

    #[test]
    fn graph_tab_with_source_renders_once() {
        let (tx, mut lc, mut view) = setup();
        let mut engine = CountingEngine::default();
        publish(&tx, Tab::Graph, Some(src("Pune")));
        assert!(lc.poll(&mut view, &mut engine));
        assert!(!lc.poll(&mut view, &mut engine));
        assert_eq!(engine.runs, 1);
        assert_eq!(lc.renders(), 1);
    }

    #[test]
    fn deferred_render_happens_on_activation() {
        let (tx, mut lc, mut view) = setup();
        let mut engine = CountingEngine::default();
        publish(&tx, Tab::Report, Some(src("Pune")));
        lc.poll(&mut view, &mut engine);
        assert_eq!(engine.runs, 0);
        publish(&tx, Tab::Graph, Some(src("Pune")));
        lc.poll(&mut view, &mut engine);
        assert_eq!(engine.runs, 1);
    }

    #[test]
    fn re_entering_tab_with_same_source_skips_engine() {
        let (tx, mut lc, mut view) = setup();
        let mut engine = CountingEngine::default();
        publish(&tx, Tab::Graph, Some(src("Pune")));
        lc.poll(&mut view, &mut engine);
        publish(&tx, Tab::Report, Some(src("Pune")));
        lc.poll(&mut view, &mut engine);
        assert!(!view.is_attached());
        publish(&tx, Tab::Graph, Some(src("Pune")));
        lc.poll(&mut view, &mut engine);
        assert_eq!(engine.runs, 1);
        assert!(view.is_attached());
    }

    #[test]
    fn new_source_while_on_graph_renders_again() {
        let (tx, mut lc, mut view) = setup();
        let mut engine = CountingEngine::default();
        publish(&tx, Tab::Graph, Some(src("Pune")));
        lc.poll(&mut view, &mut engine);
        publish(&tx, Tab::Graph, Some(src("Delhi")));
        lc.poll(&mut view, &mut engine);
        assert_eq!(engine.runs, 2);
        assert_eq!(view.container().source(), Some(&src("Delhi")));
    }

    // ── Deferred updates ────────────────────────────────────────

    #[test]
    fn sources_changed_off_tab_render_latest_once() {
        let (tx, mut lc, mut view) = setup();
        let mut engine = CountingEngine::default();
        publish(&tx, Tab::Report, Some(src("Pune")));
        lc.poll(&mut view, &mut engine);
        publish(&tx, Tab::Report, Some(src("Delhi")));
        lc.poll(&mut view, &mut engine);
        assert_eq!(engine.runs, 0);

        publish(&tx, Tab::Graph, Some(src("Delhi")));
        assert!(lc.poll(&mut view, &mut engine));
        assert!(!lc.poll(&mut view, &mut engine));
        assert_eq!(lc.renders(), 1);
        assert_eq!(engine.runs, 1);
        assert_eq!(view.container().source(), Some(&src("Delhi")));
    }

    #[test]
    fn failure_is_recorded_and_not_retried() {
        let (tx, mut lc, mut view) = setup();
        let mut engine = CountingEngine {
            fail: true,
            ..Default::default()
        };
        publish(&tx, Tab::Graph, Some(src("Pune")));
        lc.poll(&mut view, &mut engine);
        assert!(view.render_error.as_deref().unwrap().contains("boom"));
        publish(&tx, Tab::Report, Some(src("Pune")));
        lc.poll(&mut view, &mut engine);
        publish(&tx, Tab::Graph, Some(src("Pune")));
        lc.poll(&mut view, &mut engine);
        assert_eq!(engine.runs, 1);

        engine.fail = false;
        publish(&tx, Tab::Graph, Some(src("Delhi")));
        lc.poll(&mut view, &mut engine);
        assert!(view.render_error.is_none());
    }

    #[test]
    fn flowchart_engine_output_reaches_view() {
        let (tx, mut lc, mut view) = setup();
        let mut engine = FlowchartEngine::new();
        engine.initialize(EngineConfig::default());
        publish(&tx, Tab::Graph, Some(src("Chhattisgarh")));
        lc.poll(&mut view, &mut engine);
        let rendered = view.container().rendered().unwrap();
        assert!(rendered
            .lines
            .iter()
            .any(|l| l.text().contains("Location: Chhattisgarh")));
    }
}
