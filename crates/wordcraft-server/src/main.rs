use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use wordcraft_core::model::WordBank;
use wordcraft_judges::config::{create_judge, load_config_from};
use wordcraft_server::{build_router, AppState, SlidingWindowLimiter};

#[derive(Debug, Parser)]
#[command(name = "wordcraft-server", version, about = "wordcraft assessment service")]
struct Cli {
    /// Path to config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Address to bind, overriding `[server] bind`.
    #[arg(long)]
    bind: Option<String>,
    /// Judge to forward assessments to, overriding `[server] judge`.
    #[arg(long)]
    judge: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wordcraft=info".parse().unwrap()),
        )
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config_from(cli.config.as_deref())?;

    let judge_name = cli.judge.unwrap_or_else(|| config.server.judge.clone());
    let judge_config = config.judge_config(&judge_name)?;
    let judge = create_judge(&judge_config, config.judge_model.as_deref())
        .with_context(|| format!("failed to create judge '{judge_name}'"))?;

    let bank = match &config.bank {
        Some(path) => WordBank::load(path)?,
        None => WordBank::builtin()?,
    };

    let limiter = SlidingWindowLimiter::new(
        config.server.rate_limit_max,
        Duration::from_secs(config.server.rate_limit_window_secs),
    );
    let state = AppState::new(Arc::from(judge), limiter, bank);

    let bind = cli.bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(
        bind = %bind,
        judge = %judge_name,
        rate_limit_max = config.server.rate_limit_max,
        rate_limit_window_secs = config.server.rate_limit_window_secs,
        "wordcraft-server listening"
    );

    axum::serve(listener, build_router(state))
        .await
        .context("server error")?;
    Ok(())
}
