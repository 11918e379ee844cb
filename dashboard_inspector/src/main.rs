use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use hydromap_api::{ApiClient, FetchParams};
use hydromap_core::{
    load_dashboard_config, load_dashboard_config_from_env, AnalyticsSource, DashboardConfig,
};
use hydromap_schema::AnalysisRequest;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

mod app;
mod ui;

use app::{channel, ClientCommand, InspectorApp, NetworkEvent};

#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = String::from_utf8(buf.to_vec()) {
            let _ = self.sender.send(text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Hydrogen infrastructure dashboard inspector", long_about = None)]
struct Cli {
    /// Base URL of the infrastructure API; overrides the config file.
    #[arg(long)]
    base_url: Option<String>,
    /// Dashboard config JSON; defaults to $HYDROMAP_CONFIG_PATH, then the builtin.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Minimum recommendation match score (0-100).
    #[arg(long)]
    min_score: Option<f64>,
}

impl Cli {
    fn resolve_config(&self) -> Arc<DashboardConfig> {
        let (config, _metadata) = match &self.config {
            Some(path) => load_dashboard_config(Some(path.clone())),
            None => load_dashboard_config_from_env(),
        };
        if self.base_url.is_none() && self.min_score.is_none() {
            return config;
        }
        let mut config = DashboardConfig::clone(&config);
        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(min_score) = self.min_score {
            config.recommendations.min_score = min_score.clamp(0.0, 100.0);
        }
        Arc::new(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let (log_tx, log_rx) = mpsc::channel::<String>();
    let log_writer_tx = log_tx.clone();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(move || ChannelWriter {
            sender: log_writer_tx.clone(),
        })
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config();
    let client = ApiClient::from_config(&config.api)?;
    info!(
        target: "hydromap::inspector",
        base_url = client.base_url(),
        "inspector.starting"
    );

    let (event_tx, event_rx) = channel();
    let (command_tx, command_rx) = tokio::sync::mpsc::unbounded_channel::<ClientCommand>();

    let ui_config = Arc::clone(&config);
    let ui_handle = std::thread::spawn(move || -> color_eyre::Result<()> {
        let app = InspectorApp::new(ui_config, event_rx, command_tx, log_rx)?;
        app.run()
    });

    run_command_pump(client, config, command_rx, event_tx).await;

    match ui_handle.join() {
        Ok(result) => result,
        Err(_) => {
            warn!(target: "hydromap::inspector", "inspector.ui_panicked");
            Ok(())
        }
    }
}

/// Serve UI commands until the UI hangs up, polling server analytics on the
/// configured interval.
async fn run_command_pump(
    client: ApiClient,
    config: Arc<DashboardConfig>,
    mut commands: UnboundedReceiver<ClientCommand>,
    events: UnboundedSender<NetworkEvent>,
) {
    let poll_server = config.analytics.source != AnalyticsSource::Local;
    let mut poll = tokio::time::interval(config.analytics.poll_interval());

    loop {
        tokio::select! {
            _ = poll.tick(), if poll_server => {
                spawn_analytics_poll(client.clone(), events.clone());
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    info!(target: "hydromap::inspector", "inspector.shutdown");
                    break;
                };
                dispatch(&client, command, &events);
            }
        }
    }
}

fn dispatch(client: &ApiClient, command: ClientCommand, events: &UnboundedSender<NetworkEvent>) {
    let client = client.clone();
    let events = events.clone();
    match command {
        ClientCommand::Fetch { ticket, params } => {
            tokio::spawn(async move {
                let result = client
                    .fetch(ticket.dataset(), &params)
                    .await
                    .map_err(|err| err.to_string());
                let _ = events.send(NetworkEvent::Fetched { ticket, result });
            });
        }
        ClientCommand::Analyze(request) => {
            tokio::spawn(run_analysis(client, request, events));
        }
        ClientCommand::PollAnalytics => spawn_analytics_poll(client, events),
    }
}

async fn run_analysis(
    client: ApiClient,
    request: AnalysisRequest,
    events: UnboundedSender<NetworkEvent>,
) {
    let result = client
        .trigger_analysis(&request)
        .await
        .map_err(|err| err.to_string());
    let _ = events.send(NetworkEvent::AnalysisFinished(result));
}

fn spawn_analytics_poll(client: ApiClient, events: UnboundedSender<NetworkEvent>) {
    tokio::spawn(async move {
        let result = client.fetch_analytics().await.map_err(|err| err.to_string());
        let _ = events.send(NetworkEvent::Analytics(result));
    });
}

/// Fetch parameters derived from the active configuration.
pub(crate) fn fetch_params(config: &DashboardConfig) -> FetchParams {
    FetchParams {
        min_score: config.recommendations.min_score,
        ..FetchParams::default()
    }
}
