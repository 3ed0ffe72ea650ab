use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use session_proxy::{config::PLACEHOLDER_WORKFLOW_ID, ProxyConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug, Clone)]
#[command(name = "session-proxy")]
#[command(about = "Issues short-lived ChatKit session secrets to the chat page")]
#[command(version)]
struct Cli {
    /// Server-held upstream API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Published workflow the sessions are bound to
    #[arg(long, env = "WORKFLOW_ID", default_value = PLACEHOLDER_WORKFLOW_ID)]
    workflow_id: String,

    /// Server port
    #[arg(long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    bind_address: String,

    /// Upstream API base URL
    #[arg(long, env = "UPSTREAM_BASE_URL", default_value = session_proxy::config::DEFAULT_UPSTREAM_BASE_URL)]
    upstream_base_url: String,

    /// Upstream request timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "15")]
    upstream_timeout_secs: u64,

    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Log filter (overrides the debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.debug { "debug" } else { "info" };
    let filter = cli
        .log_level
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);

    tracing::info!("Starting session proxy on port {}", cli.port);

    let config = ProxyConfig::new(cli.api_key, cli.workflow_id)
        .with_upstream_base_url(cli.upstream_base_url)
        .with_upstream_timeout(Duration::from_secs(cli.upstream_timeout_secs));

    session_proxy::run(config, &cli.bind_address, cli.port)
        .await
        .context("session proxy stopped with an error")?;

    Ok(())
}
