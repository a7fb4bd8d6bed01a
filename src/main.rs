use anyhow::Result;
use clap::Parser;
use hiwar::config::{ChatLayout, Config, TransportMode};
use hiwar::ui::HiwarApp;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "hiwar",
    version,
    about = "Voice chat client for a conversational assistant backend"
)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the assistant backend (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// Transport variant for recording sessions
    #[arg(long, value_enum)]
    transport: Option<TransportMode>,

    /// Transcript layout
    #[arg(long, value_enum)]
    layout: Option<ChatLayout>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hiwar=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(server) = args.server {
        config.server_url = server;
    }
    if let Some(transport) = args.transport {
        config.transport = transport;
    }
    if let Some(layout) = args.layout {
        config.layout = layout;
    }

    info!(
        "Starting Hiwar voice client (server: {}, transport: {:?})",
        config.server_url, config.transport
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title("Hiwar"),
        ..Default::default()
    };

    eframe::run_native(
        "Hiwar",
        options,
        Box::new(move |cc| Ok(Box::new(HiwarApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start UI: {e}"))
}
