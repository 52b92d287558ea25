use anyhow::{Context, Result};
use arena_agents::build_roster;
use arena_agents::config::{Args, RemoteSettings};
use arena_engine::Tournament;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = args.tournament_config()?;
    info!(
        agents = ?args.agents,
        battles = config.battle_count,
        seed = config.seed,
        battles_dir = %config.battles_dir.display(),
        "Debate arena starting"
    );

    let settings = RemoteSettings::from_env();
    let roster = build_roster(args.agents, config.seed, &settings, args.profiles_dir.as_deref())
        .context("Failed to build roster")?;

    let mut tournament = Tournament::new(config, roster);
    let summary = tournament.run().await.context("Tournament aborted")?;

    println!("{}", summary.status_line());
    Ok(())
}
