//! Paygate server
//!
//! Usage:
//!   paygate [--env <name>|-e <name>] [--port <port>]
//!
//! Reads `config/<env>.yaml` (default `dev`).

use anyhow::Context;
use std::sync::Arc;

use paygate::ach::PaymentAssembler;
use paygate::config::AppConfig;
use paygate::db::Database;
use paygate::gateway::{self, state::AppState};
use paygate::parties::{PartyDb, PartyResolver};
use paygate::transfer::adapters::{HttpFileService, HttpLedgerClient, LedgerClient, NoopLedger};
use paygate::transfer::{
    EventDb, IdempotencyStore, SubmissionCoordinator, TransferDb, TransferService,
};

// ============================================================
// COMMAND LINE
// ============================================================

fn arg_value(args: &[String], names: &[&str]) -> Option<String> {
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn get_env(args: &[String]) -> String {
    arg_value(args, &["--env", "-e"]).unwrap_or_else(|| "dev".to_string())
}

/// Get port override from command line (--port argument)
fn get_port_override(args: &[String]) -> Option<u16> {
    arg_value(args, &["--port"]).and_then(|p| p.parse().ok())
}

// ============================================================
// MAIN
// ============================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let env = get_env(&args);
    let app_config = AppConfig::load(&env)?;
    let _log_guard = paygate::logging::init_logging(&app_config);

    tracing::info!(
        env = %env,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        "Starting paygate"
    );

    let db = Database::connect(&app_config.postgres_url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db.init_schema()
        .await
        .context("Failed to initialize schema")?;
    let db = Arc::new(db);
    tracing::info!("PostgreSQL connected and schema initialized");

    let parties = Arc::new(PartyDb::new(db.pool().clone()));
    let files = Arc::new(HttpFileService::new(
        app_config.file_service.base_url.clone(),
        app_config.file_service.timeout(),
    )?);

    let ledger: Arc<dyn LedgerClient> = if app_config.ledger.enabled {
        Arc::new(HttpLedgerClient::new(
            app_config.ledger.base_url.clone(),
            app_config.ledger.timeout(),
        )?)
    } else {
        tracing::warn!("Ledger posting disabled");
        Arc::new(NoopLedger)
    };

    let idempotency = Arc::new(IdempotencyStore::new(app_config.idempotency.ttl()));
    let _sweeper = gateway::spawn_idempotency_sweeper(
        idempotency.clone(),
        app_config.idempotency.sweep_interval(),
    );

    let service = Arc::new(TransferService::new(
        PartyResolver::new(parties.clone(), parties.clone(), parties),
        PaymentAssembler::new(app_config.assembler.clone()),
        SubmissionCoordinator::new(files),
        Arc::new(TransferDb::new(db.pool().clone())),
        Arc::new(EventDb::new(db.pool().clone())),
        ledger,
        idempotency,
    ));

    let port = get_port_override(&args).unwrap_or(app_config.gateway.port);
    let state = Arc::new(AppState::new(service, Some(db)));
    gateway::run_server(&app_config.gateway.host, port, state).await;

    Ok(())
}
