use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use copytrace_chain::ChainClient;
use copytrace_core::{AppConfig, ConfigLoader};
use copytrace_data::{
    connect, run_migrations, AlertRepository, BaselineCache, BaselineRepository,
    CopyTradeRepository, CreatorIntelRepository, HeartbeatRepository, LadderRepository,
    PairRepository, SourceTradeRepository,
};
use copytrace_workers::{
    AlertsWorker, CreatorIntelWorker, LadderWorker, NormalizerWorker, PairingWorker,
    ScoringWorker, WorkerManager,
};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "copytrace")]
#[command(about = "Copy-trade execution analysis pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the worker pipeline
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/copytrace.toml")]
        config: String,
        /// Run one pass over every worker and exit
        #[arg(long)]
        once: bool,
        /// Override the tick interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Apply pending database migrations and exit
    Migrate {
        /// Config file path
        #[arg(short, long, default_value = "config/copytrace.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            once,
            interval_ms,
        } => {
            let mut config = ConfigLoader::load_from(&config)?;
            if let Some(ms) = interval_ms {
                config.orchestrator.tick_interval_ms = ms;
            }
            run_pipeline(config, once).await?;
        }
        Commands::Migrate { config } => {
            let config = ConfigLoader::load_from(&config)?;
            let pool = connect(&config.database).await?;
            run_migrations(&pool).await?;
            info!("migrations applied");
        }
    }

    Ok(())
}

async fn run_pipeline(config: AppConfig, once: bool) -> anyhow::Result<()> {
    let pool = connect(&config.database)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to apply migrations")?;

    let copy_trades = CopyTradeRepository::new(pool.clone());
    let source_trades = SourceTradeRepository::new(pool.clone());
    let pairs = PairRepository::new(pool.clone());
    let ladders = LadderRepository::new(pool.clone());
    let heartbeats = HeartbeatRepository::new(pool.clone());
    let alerts = AlertRepository::new(pool.clone());
    let intel = CreatorIntelRepository::new(pool.clone());
    let baselines = Arc::new(BaselineCache::new(
        BaselineRepository::new(pool.clone()),
        Duration::from_secs(config.scoring.baseline_ttl_secs),
        config.scoring.baseline_sample,
    ));

    let orch = &config.orchestrator;
    let mut manager = WorkerManager::new(
        Box::new(heartbeats),
        Duration::from_millis(orch.tick_interval_ms),
    );

    if orch.normalizer_enabled {
        if config.chain.rpc_url.is_empty() {
            warn!("normalizer enabled but chain.rpc_url is empty, skipping worker");
        } else {
            let chain = ChainClient::new(&config.chain)?;
            manager.register(Box::new(NormalizerWorker::new(
                copy_trades.clone(),
                source_trades.clone(),
                chain,
                orch.normalizer_batch,
            )));
        }
    }
    if orch.pairing_enabled {
        manager.register(Box::new(PairingWorker::new(
            copy_trades.clone(),
            source_trades.clone(),
            pairs.clone(),
            config.pairing.clone(),
            orch.pairing_batch,
        )));
    }
    if orch.ladder_enabled {
        manager.register(Box::new(LadderWorker::new(
            ladders,
            &config.ladder,
            orch.ladder_batch,
        )));
    }
    if orch.scoring_enabled {
        manager.register(Box::new(ScoringWorker::new(
            pairs.clone(),
            Arc::clone(&baselines),
            orch.scoring_batch,
        )));
    }
    if orch.creator_intel_enabled {
        manager.register(Box::new(CreatorIntelWorker::new(
            intel,
            orch.creator_intel_batch,
        )));
    }
    if orch.alerts_enabled {
        manager.register(Box::new(AlertsWorker::new(
            alerts,
            config.alerts.clone(),
            orch.alerts_batch,
        )));
    }

    info!(workers = manager.worker_count(), once, "pipeline configured");

    if once {
        manager.run_pass(None).await;
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    manager.run(shutdown_rx).await;
    Ok(())
}
