use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use hydromap_api::FetchParams;
use hydromap_core::schema::{AnalysisRequest, AnalyticsSummary, AssetStatus, AssetType};
use hydromap_core::{
    Dashboard, DashboardConfig, Dataset, EntityRef, FetchOutcome, FetchTicket, Fetched, Layer,
    PredictionRef, StateEvent, ViewportUpdate,
};
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{error, info, warn};

use crate::ui::{draw_ui, Focus, UiState};

pub struct InspectorApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    dashboard: Dashboard,
    ui_state: UiState,
    receiver: UnboundedReceiver<NetworkEvent>,
    command_sender: UnboundedSender<ClientCommand>,
    log_receiver: Receiver<String>,
    state_events: crossbeam_channel::Receiver<StateEvent>,
    fetch_params: FetchParams,
}

impl InspectorApp {
    pub fn new(
        config: Arc<DashboardConfig>,
        receiver: UnboundedReceiver<NetworkEvent>,
        command_sender: UnboundedSender<ClientCommand>,
        log_receiver: Receiver<String>,
    ) -> Result<Self> {
        let stdout = std::io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        crossterm::terminal::enable_raw_mode()?;
        terminal.clear()?;
        terminal.hide_cursor()?;

        let fetch_params = crate::fetch_params(&config);
        let mut dashboard = Dashboard::new(config);
        let state_events = dashboard.subscribe();
        Ok(Self {
            terminal,
            dashboard,
            ui_state: UiState::default(),
            receiver,
            command_sender,
            log_receiver,
            state_events,
            fetch_params,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let mut last_draw = Instant::now();
        self.refresh_all();

        loop {
            while let Ok(event) = self.receiver.try_recv() {
                self.apply_network_event(event);
            }

            while let Ok(line) = self.log_receiver.try_recv() {
                self.ui_state.push_log(line);
            }

            let mut refit = false;
            while let Ok(event) = self.state_events.try_recv() {
                refit |= matches!(
                    event,
                    StateEvent::FilterChanged
                        | StateEvent::LayerToggled(_)
                        | StateEvent::DatasetUpdated(_)
                );
            }
            if refit {
                if let ViewportUpdate::Fit(bounds) = self.dashboard.fit_viewport() {
                    self.ui_state.viewport = Some(bounds);
                }
            }

            if last_draw.elapsed() >= Duration::from_millis(100) {
                let view = self.dashboard.view();
                let radius_km = self.dashboard.config().proximity_radius_km;
                self.ui_state.clamp_cursors(&view);
                self.terminal
                    .draw(|frame| draw_ui(frame, &self.ui_state, &view, radius_km))?;
                last_draw = Instant::now();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                    if ctrl && key.code == KeyCode::Char('c') {
                        break;
                    }
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char(digit @ '1'..='6') => {
                            let index = digit as usize - '1' as usize;
                            self.dashboard.toggle_layer(Layer::ALL[index]);
                        }
                        KeyCode::Char('t') => self.cycle_type(),
                        KeyCode::Char('r') => self.cycle_region(),
                        KeyCode::Char('s') => self.cycle_status(),
                        KeyCode::Char('x') => {
                            self.dashboard.reset();
                            self.ui_state.push_log("Filters, layers and selection reset");
                        }
                        KeyCode::Tab => self.ui_state.focus = self.ui_state.focus.next(),
                        KeyCode::Down | KeyCode::Char('j') => self.ui_state.move_cursor(1),
                        KeyCode::Up | KeyCode::Char('k') => self.ui_state.move_cursor(-1),
                        KeyCode::Enter => self.select_under_cursor(),
                        KeyCode::Char('c') => {
                            self.dashboard.clear_entity();
                            self.dashboard.clear_prediction();
                        }
                        KeyCode::Char('a') => self.trigger_analysis(),
                        KeyCode::Char('R') => self.refresh_all(),
                        KeyCode::Char('A') => self.send(ClientCommand::PollAnalytics),
                        _ => {}
                    }
                }
            }
        }

        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        Ok(())
    }

    fn apply_network_event(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Fetched { ticket, result } => {
                let dataset = ticket.dataset();
                match self.dashboard.complete_fetch(ticket, result) {
                    Ok(FetchOutcome::Applied { records }) => {
                        info!(target: "hydromap::inspector", %dataset, records, "dataset.loaded");
                    }
                    Ok(FetchOutcome::Failed) => {
                        self.ui_state
                            .push_log(format!("Failed to load {dataset}; keeping cached data"));
                    }
                    Ok(FetchOutcome::Stale) => {}
                    Err(err) => error!(target: "hydromap::inspector", "{err}"),
                }
            }
            NetworkEvent::AnalysisFinished(Ok(())) => {
                self.ui_state.analysis_pending = false;
                info!(target: "hydromap::inspector", "analysis.complete");
                self.begin_fetch(Dataset::Recommendations);
            }
            NetworkEvent::AnalysisFinished(Err(err)) => {
                self.ui_state.analysis_pending = false;
                warn!(target: "hydromap::inspector", error = %err, "analysis.failed");
            }
            NetworkEvent::Analytics(Ok(summary)) => self.dashboard.set_server_analytics(summary),
            NetworkEvent::Analytics(Err(err)) => {
                warn!(target: "hydromap::inspector", error = %err, "analytics.poll_failed");
            }
        }
    }

    fn send(&self, command: ClientCommand) {
        if let Err(err) = self.command_sender.send(command) {
            error!(target: "hydromap::inspector", "Failed to dispatch command: {}", err);
        }
    }

    fn begin_fetch(&mut self, dataset: Dataset) {
        let ticket = self.dashboard.begin_fetch(dataset);
        self.send(ClientCommand::Fetch {
            ticket,
            params: self.fetch_params.clone(),
        });
    }

    fn refresh_all(&mut self) {
        for dataset in Dataset::ALL {
            self.begin_fetch(dataset);
        }
    }

    fn trigger_analysis(&mut self) {
        if self.ui_state.analysis_pending {
            self.ui_state.push_log("Analysis already running");
            return;
        }
        let request = self.dashboard.analysis_request();
        if let Err(err) = request.validate() {
            warn!(target: "hydromap::inspector", error = %err, "analysis.rejected");
            return;
        }
        self.ui_state.analysis_pending = true;
        self.send(ClientCommand::Analyze(request));
    }

    fn cycle_type(&mut self) {
        let current = self.dashboard.state().filter().types.iter().next().copied();
        let next = next_in_cycle(&AssetType::ALL, current.as_ref());
        self.dashboard.update_filter(|filter| {
            filter.types = next.into_iter().collect();
        });
    }

    fn cycle_region(&mut self) {
        let regions = self.dashboard.config().regions.clone();
        let current = self.dashboard.state().filter().regions.iter().next().cloned();
        let next = next_in_cycle(&regions, current.as_ref());
        self.dashboard.update_filter(|filter| {
            filter.regions = next.into_iter().collect();
        });
    }

    fn cycle_status(&mut self) {
        let current = self.dashboard.state().filter().status.iter().next().copied();
        let next = next_in_cycle(&AssetStatus::ALL, current.as_ref());
        self.dashboard.update_filter(|filter| {
            filter.status = next.into_iter().collect();
        });
    }

    fn select_under_cursor(&mut self) {
        let view = self.dashboard.view();
        match self.ui_state.focus {
            Focus::Map => {
                if let Some(point) = view.points.get(self.ui_state.map_cursor) {
                    self.dashboard.select_entity(point.entity.clone());
                }
            }
            Focus::Recommendations => {
                if let Some(site) = view.recommendations.get(self.ui_state.recommendation_cursor) {
                    self.dashboard
                        .select_prediction(PredictionRef(site.id.clone()));
                    self.dashboard
                        .select_entity(EntityRef::Recommendation(site.id.clone()));
                }
            }
        }
    }
}

/// Step through `options` and back to "no restriction" after the last one.
pub fn next_in_cycle<T: Clone + PartialEq>(options: &[T], current: Option<&T>) -> Option<T> {
    match current {
        None => options.first().cloned(),
        Some(current) => options
            .iter()
            .position(|option| option == current)
            .and_then(|index| options.get(index + 1))
            .cloned(),
    }
}

pub fn channel() -> (UnboundedSender<NetworkEvent>, UnboundedReceiver<NetworkEvent>) {
    unbounded_channel()
}

#[derive(Debug, Clone)]
pub enum ClientCommand {
    Fetch {
        ticket: FetchTicket,
        params: FetchParams,
    },
    Analyze(AnalysisRequest),
    PollAnalytics,
}

#[derive(Debug)]
pub enum NetworkEvent {
    Fetched {
        ticket: FetchTicket,
        result: Result<Fetched, String>,
    },
    AnalysisFinished(Result<(), String>),
    Analytics(Result<AnalyticsSummary, String>),
}
