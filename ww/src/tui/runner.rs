//! TUI Runner - main loop that owns the terminal and the request task
//!
//! The TuiRunner is responsible for:
//! - Drawing a frame per event
//! - Dispatching key events to App
//! - Spawning the single itinerary request and feeding its result back

use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::views;
use crate::controller::Controller;
use crate::planner::{Itinerary, ItineraryPlanner, PlanError};

type PlanResult = std::result::Result<Itinerary, PlanError>;

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    app: App,
    terminal: Tui,
    planner: ItineraryPlanner,
    event_handler: EventHandler,
    result_tx: mpsc::UnboundedSender<PlanResult>,
    result_rx: mpsc::UnboundedReceiver<PlanResult>,
    /// Request in flight, aborted on quit
    request: Option<JoinHandle<()>>,
}

impl TuiRunner {
    pub fn new(terminal: Tui, controller: Controller, planner: ItineraryPlanner, model: impl Into<String>) -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            app: App::new(controller, model),
            terminal,
            planner,
            event_handler: EventHandler::new(Duration::from_millis(100)),
            result_tx,
            result_rx,
            request: None,
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        info!("TUI started");
        loop {
            self.terminal.draw(|frame| views::render(self.app.state(), frame))?;

            tokio::select! {
                event = self.event_handler.next() => {
                    match event? {
                        Event::Tick => self.app.state_mut().tick(),
                        Event::Key(key) => {
                            if self.app.handle_key(key) {
                                break;
                            }
                        }
                        Event::Resize(width, height) => {
                            debug!(width, height, "Terminal resized");
                        }
                    }
                }
                Some(result) = self.result_rx.recv() => {
                    self.handle_result(result);
                }
            }

            self.start_pending_request();

            if self.app.state().should_quit {
                break;
            }
        }

        self.abort_request();
        info!("TUI exited");
        Ok(())
    }

    /// Spawn the request queued by a form submit
    fn start_pending_request(&mut self) {
        let Some(prefs) = self.app.state_mut().pending_request.take() else {
            return;
        };
        debug!(destination = %prefs.destination, "TuiRunner::start_pending_request: spawning");

        let planner = self.planner.clone();
        let tx = self.result_tx.clone();
        self.request = Some(tokio::spawn(async move {
            let result = planner.request_itinerary(&prefs).await;
            // Receiver is gone only after quit
            let _ = tx.send(result);
        }));
    }

    fn handle_result(&mut self, result: PlanResult) {
        self.request = None;
        let state = self.app.state_mut();
        match result {
            Ok(itinerary) => {
                state.controller.on_success(itinerary);
            }
            Err(e) => state.controller.on_failure(&e),
        }
        state.on_view_changed();
    }

    fn abort_request(&mut self) {
        if let Some(handle) = self.request.take() {
            info!("Aborting in-flight itinerary request");
            handle.abort();
        }
    }
}
