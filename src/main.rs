use dotenvy::dotenv;
use socialdl::bot::handlers::{self, Command};
use socialdl::config::Settings;
use socialdl::cooldown::CooldownGate;
use socialdl::fetcher::MediaFetcher;
use socialdl::orchestrator::Orchestrator;
use socialdl::stats::UsageStats;
use socialdl::upstream::UpstreamClient;
use std::sync::Arc;
use std::time::Duration;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    info!("Starting social media relay bot...");

    let settings = init_settings();
    let stats = Arc::new(UsageStats::new());
    let orchestrator = Arc::new(init_orchestrator(&settings, stats.clone())?);
    let bot = Bot::new(settings.telegram_token.clone());

    info!("Bot is running...");

    Dispatcher::builder(bot, setup_handler())
        .dependencies(dptree::deps![settings, orchestrator, stats])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_orchestrator(
    settings: &Settings,
    stats: Arc<UsageStats>,
) -> anyhow::Result<Orchestrator> {
    let gate = CooldownGate::new(
        Duration::from_secs(settings.command_cooldown_secs),
        settings.admin_ids(),
    );
    let upstream = UpstreamClient::new(&settings.api_base_url)?;
    let fetcher = MediaFetcher::new()?;
    Ok(Orchestrator::new(gate, upstream, fetcher, stats))
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry().branch(
        Update::filter_message()
            .filter_command::<Command>()
            .endpoint(dispatch_command),
    )
}

async fn dispatch_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    orchestrator: Arc<Orchestrator>,
    settings: Arc<Settings>,
    stats: Arc<UsageStats>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_command(bot, msg, cmd, orchestrator, settings, stats).await {
        error!("Command error: {}", e);
    }
    respond(())
}
