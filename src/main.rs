use std::sync::Arc;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

use parley_bot::application::dispatcher::Dispatcher;
use parley_bot::application::errors::BotError;
use parley_bot::application::lifecycle::{self, AppContext};
use parley_bot::application::normalizer::normalize;
use parley_bot::domain::entities::TransportEvent;
use parley_bot::domain::traits::{ChatTransport, PresenceState};
use parley_bot::infrastructure::adapters::console::ConsoleTransport;
use parley_bot::infrastructure::config::Config;
use parley_bot::infrastructure::settings::SqliteSettingsStore;
use parley_bot::modules::{AdminModule, EchoModule, HelpModule, ModuleRegistry, PingModule};

const SETTINGS_DB: &str = "parley-bot.db";

#[derive(Parser)]
#[command(name = "parley-bot")]
#[command(about = "Command-dispatch bot for chat rooms", long_about = None)]
struct Cli {
    /// Config file paths; only the first is used
    #[arg(value_name = "CONFIG", default_value = "config.json")]
    config: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .first()
        .cloned()
        .unwrap_or_else(|| "config.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("parley-bot: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging; RUST_LOG overrides the configured level
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    if cli.config.len() > 1 {
        warn!("Ignoring {} extra config path(s)", cli.config.len() - 1);
    }
    info!("Starting parley-bot against {}", config.homeserver);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(config)) {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), BotError> {
    // Start time is captured before any event subscription so accepted
    // events can never predate it.
    let ctx = AppContext::new();

    let store = Arc::new(SqliteSettingsStore::open(SETTINGS_DB)?);

    let registry = ModuleRegistry::builder()
        .register(AdminModule::new(store.clone()))?
        .register(EchoModule)?
        .register(HelpModule)?
        .register(PingModule)?
        .build(&config)
        .await?;
    info!("Loaded {} modules", registry.handlers().len());

    let transport = ConsoleTransport::new("@parley-bot:local");
    let mut events = transport.subscribe();
    transport.start().await?;
    transport
        .set_presence(PresenceState::Online, Some("serving requests"))
        .await?;

    let dispatcher = Dispatcher::default();

    let mut sigterm =
        signal(SignalKind::terminate()).map_err(|e| BotError::Internal(e.to_string()))?;
    let mut sighup = signal(SignalKind::hangup()).map_err(|e| BotError::Internal(e.to_string()))?;
    let mut sigquit = signal(SignalKind::quit()).map_err(|e| BotError::Internal(e.to_string()))?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = sigterm.recv() => break,
            _ = sighup.recv() => break,
            _ = sigquit.recv() => break,
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else { break };
                match event {
                    TransportEvent::RoomJoin { room } => {
                        info!("Joined room {}", room);
                        ctx.record_join(&room);
                    }
                    TransportEvent::RoomMessage { event } => {
                        let message = ctx.with_joined_at(|joined| {
                            normalize(event, ctx.start_time_ms(), joined, transport.user_id())
                        });
                        if let Some(message) = message {
                            if let Err(e) = dispatcher
                                .dispatch(&transport, &message, &registry, store.as_ref())
                                .await
                            {
                                error!("Dispatch failed: {}", e);
                            }
                        }
                    }
                }
            }
        }
    }

    lifecycle::shutdown(&ctx, &transport).await;
    Ok(())
}
