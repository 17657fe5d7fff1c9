//! Engine binary for the PESTEL foresight simulation.
//!
//! Wires configuration, the world roster, the oracle chain and the run
//! control together, runs the simulation day by day, and writes the JSON
//! report.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `pestel-config.yaml` (defaults when absent)
//! 2. Initialize structured logging (tracing)
//! 3. Load the roster (`PESTEL_ROSTER`, `config/roster.yaml`, or built in)
//! 4. Build the simulation context
//! 5. Create the oracle chain, checking the LLM backend is reachable
//! 6. Install the Ctrl-C stop handler
//! 7. Run the simulation
//! 8. Write the report and log the result

mod error;
mod progress;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pestel_agents::{OracleChain, Roster, RuleEngine};
use pestel_core::{LogFormat, RunControl, SimulationConfig, SimulationContext, run_simulation};
use pestel_oracle::{LlmOracle, OracleConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "pestel-config.yaml";

/// Roster file looked up in the working directory.
const ROSTER_PATH: &str = "config/roster.yaml";

/// Roster compiled into the binary.
const BUILTIN_ROSTER: &str = include_str!("../../../config/roster.yaml");

/// Days between progress log lines.
const PROGRESS_EVERY_DAYS: u64 = 7;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step fails, the run halts on an
/// invariant violation, or the report cannot be written.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging.level, config.logging.format);
    info!(
        run_name = %config.run.name,
        seed = config.run.seed,
        simulation_days = config.run.simulation_days,
        decision_timeout_ms = config.run.decision_timeout_ms,
        "pestel-engine starting"
    );

    // 3. Load the roster.
    let roster = load_roster()?;
    info!(
        companies = roster.companies.len(),
        countries = roster.countries.len(),
        researchers = roster.researchers.len(),
        unions = roster.unions.len(),
        scenarios = roster.scenarios.len(),
        "Roster loaded"
    );

    // 4. Build the simulation context.
    let seed = config.run.seed;
    let total_days = config.run.simulation_days;
    let report_path = config.output.report_path.clone();
    let mut ctx = SimulationContext::new(config, &roster)?;

    // 5. Create the oracle chain.
    let mut oracle = build_oracle_chain(seed).await?;

    // 6. Ctrl-C requests a stop after the current day.
    let control = Arc::new(RunControl::new());
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current day");
                control.request_stop();
            }
        });
    }

    // 7. Run. The oracle bridges back into this runtime, so the synchronous
    //    run loop must not occupy a worker without telling the scheduler.
    let mut callback = ProgressCallback::new(total_days, PROGRESS_EVERY_DAYS);
    let report = tokio::task::block_in_place(|| {
        run_simulation(&mut ctx, &mut oracle, &control, &mut callback)
    })
    .map_err(EngineError::from)?;

    // 8. Write the report.
    report.write_json(&report_path).map_err(EngineError::from)?;
    info!(
        path = %report_path.display(),
        end_reason = ?report.end_reason,
        days_run = report.days_run,
        "Report written"
    );
    println!("{}", report.analysis);

    info!("pestel-engine shutdown complete");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Load `pestel-config.yaml`, or defaults (still subject to environment
/// overrides) when the file is absent.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        Ok(SimulationConfig::parse("{}")?)
    }
}

/// Load the roster from `PESTEL_ROSTER`, then `config/roster.yaml`, then
/// the built-in copy.
fn load_roster() -> Result<Roster, EngineError> {
    if let Some(path) = std::env::var_os("PESTEL_ROSTER").map(PathBuf::from) {
        info!(path = %path.display(), "Loading roster from PESTEL_ROSTER");
        return Ok(Roster::from_file(&path)?);
    }
    let default_path = Path::new(ROSTER_PATH);
    if default_path.exists() {
        info!(path = ROSTER_PATH, "Loading roster");
        return Ok(Roster::from_file(default_path)?);
    }
    info!("Roster file not found, using built-in roster");
    Ok(Roster::parse(BUILTIN_ROSTER)?)
}

/// An LLM-backed chain when a backend is configured and reachable, the
/// rule engine alone otherwise.
async fn build_oracle_chain(seed: u64) -> Result<OracleChain, EngineError> {
    let Some(oracle_config) = OracleConfig::from_env()? else {
        info!("No LLM backend configured, using the rule engine only");
        return Ok(OracleChain::fallback_only(seed));
    };

    let oracle = LlmOracle::from_config(&oracle_config)?;
    match oracle.check_reachable().await {
        Ok(()) => {
            info!(
                backend = ?oracle_config.backend.backend_type,
                model = %oracle_config.backend.model,
                retries = oracle_config.retries,
                cache = oracle_config.cache_enabled,
                "LLM oracle reachable"
            );
            Ok(OracleChain::new(Box::new(oracle), RuleEngine::new(seed)))
        }
        Err(e) => {
            warn!(error = %e, "LLM oracle unreachable, using the rule engine only");
            Ok(OracleChain::fallback_only(seed))
        }
    }
}
