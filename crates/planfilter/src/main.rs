// # planfilter - change set policy filter
//
// Thin integration layer around plan-core. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Reading one planned change set as JSON
// 3. Applying the configured policy chain
// 4. Writing the filtered change set (without `current`) as JSON
//
// No filtering logic lives here; all of it is in plan-core.
//
// ## Configuration
//
// - `PLANFILTER_POLICIES`: Comma-separated policy chain (default: sync).
//   Valid: sync, upsert-only, create-only, owned-records, no-mixed-identifier
// - `PLANFILTER_OWNER_ID`: Owner id of this controller (for owned-records)
// - `PLANFILTER_INPUT`: Path to the change set JSON (default: stdin)
// - `PLANFILTER_OUTPUT`: Path for the filtered JSON (default: stdout)
// - `PLANFILTER_METRICS_PATH`: Optional path for the metrics text dump
// - `PLANFILTER_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export PLANFILTER_POLICIES=owned-records,no-mixed-identifier
// export PLANFILTER_OWNER_ID=cluster-a
//
// planfilter < plan.json > filtered.json
// ```

use anyhow::{Context, Result};
use plan_core::{Changes, PolicyConfig, PolicyMetrics};
use std::env;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Success
/// - 1: Configuration error
/// - 2: Runtime error (I/O, malformed input)
#[derive(Debug, Clone, Copy)]
enum PlanExitCode {
    /// Change set filtered and written
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<PlanExitCode> for ExitCode {
    fn from(code: PlanExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    policies: PolicyConfig,
    input_path: Option<String>,
    output_path: Option<String>,
    metrics_path: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let policy_list = env::var("PLANFILTER_POLICIES").unwrap_or_else(|_| "sync".to_string());
        let mut policies =
            PolicyConfig::new().with_policies(PolicyConfig::parse_policies(&policy_list)?);
        if let Ok(owner_id) = env::var("PLANFILTER_OWNER_ID") {
            policies = policies.with_owner_id(owner_id);
        }

        Ok(Self {
            policies,
            input_path: non_empty_var("PLANFILTER_INPUT").filter(|p| p != "-"),
            output_path: non_empty_var("PLANFILTER_OUTPUT").filter(|p| p != "-"),
            metrics_path: non_empty_var("PLANFILTER_METRICS_PATH"),
            log_level: env::var("PLANFILTER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.policies.validate()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "PLANFILTER_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return PlanExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return PlanExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the filtered change set
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PlanExitCode::ConfigError.into();
    }

    match run(config) {
        Ok(()) => PlanExitCode::Success.into(),
        Err(e) => {
            error!("planfilter failed: {:#}", e);
            PlanExitCode::RuntimeError.into()
        }
    }
}

/// Read, filter and write one change set
fn run(config: Config) -> Result<()> {
    let metrics = PolicyMetrics::new()?;
    let chain = config
        .policies
        .build_chain(Arc::new(metrics.conflict_skip_total()))?;
    info!("Policy chain: {}", chain.names().join(" -> "));

    let changes = match config.input_path {
        Some(ref path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path))?;
            Changes::from_reader(BufReader::new(file))
                .with_context(|| format!("parsing change set from {}", path))?
        }
        None => Changes::from_reader(io::stdin().lock()).context("parsing change set from stdin")?,
    };
    debug!(
        create = changes.create.len(),
        update = changes.update_new.len(),
        delete = changes.delete.len(),
        current = changes.current.len(),
        "Loaded change set"
    );

    let filtered = chain.apply(changes);
    let json = filtered.to_json_string()?;

    match config.output_path {
        Some(ref path) => {
            std::fs::write(path, json + "\n").with_context(|| format!("writing {}", path))?
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
            stdout.flush()?;
        }
    }

    info!(
        "Filtered change set: {} create, {} update, {} delete ({} conflicting create(s) skipped)",
        filtered.create.len(),
        filtered.update_new.len(),
        filtered.delete.len(),
        metrics.conflict_skip_total().get()
    );

    if let Some(ref path) = config.metrics_path {
        std::fs::write(path, metrics.render()?).with_context(|| format!("writing {}", path))?;
    }

    Ok(())
}
