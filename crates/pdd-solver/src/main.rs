// # pdd-solver - one-shot DNS-01 runner
//
// Thin integration layer: reads the challenge from environment variables,
// wires a file-backed secret store and the Yandex PDD client into the
// solver, and runs a single present or cleanup pass. All record logic lives
// in pdd-core. Retries are the caller's business.
//
// ## Configuration
//
// - `PDD_ACTION` (or first argument): `present` or `cleanup`
// - `PDD_RESOLVED_ZONE`: Zone to publish into, e.g. `example.com.`
// - `PDD_RESOLVED_FQDN`: Record name, e.g. `_acme-challenge.example.com.`
// - `PDD_KEY`: TXT content
// - `PDD_NAMESPACE`: Secret namespace (default `default`)
// - `PDD_SECRET_DIR`: Root of the secret tree, `<dir>/<namespace>/<name>/<key>`
// - `PDD_CONFIG`: Issuer config JSON, e.g. `{"pddTokenSecretRef":{"name":"pdd","key":"token"}}`
// - `PDD_TTL`: Record TTL in seconds (default 300)
// - `PDD_API_BASE`: Override the API endpoint
// - `PDD_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export PDD_RESOLVED_ZONE=example.com.
// export PDD_RESOLVED_FQDN=_acme-challenge.example.com.
// export PDD_KEY=challenge-token
// export PDD_SECRET_DIR=/run/secrets
// export PDD_CONFIG='{"pddTokenSecretRef":{"name":"pdd","key":"token"}}'
//
// pdd-solver present
// ```

use anyhow::{Context, Result};
use pdd_core::config::DEFAULT_RECORD_TTL;
use pdd_core::{ChallengeRequest, FileSecretStore, ReconcileOutcome, ReconcileSettings, Solver};
use pdd_provider_yandex::{DEFAULT_HTTP_TIMEOUT, YandexPddFactory};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes
///
/// - 0: Challenge record reconciled
/// - 1: Configuration error
/// - 2: Runtime failure (credentials, API, transport)
#[derive(Debug, Clone, Copy)]
enum SolverExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<SolverExitCode> for ExitCode {
    fn from(code: SolverExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Present,
    CleanUp,
}

impl std::str::FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "present" => Ok(Action::Present),
            "cleanup" | "clean-up" => Ok(Action::CleanUp),
            other => anyhow::bail!(
                "action '{}' is not supported. Supported actions: present, cleanup",
                other
            ),
        }
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    action: String,
    resolved_zone: String,
    resolved_fqdn: String,
    key: String,
    namespace: String,
    secret_dir: String,
    solver_config: Option<String>,
    ttl: Option<String>,
    api_base: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from the process environment
    fn from_env() -> Self {
        Self::from_lookup(env::args().nth(1), |name| env::var(name).ok())
    }

    /// Load configuration through `lookup`; `arg` overrides `PDD_ACTION`
    fn from_lookup(arg: Option<String>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            action: arg
                .or_else(|| lookup("PDD_ACTION"))
                .unwrap_or_default(),
            resolved_zone: lookup("PDD_RESOLVED_ZONE").unwrap_or_default(),
            resolved_fqdn: lookup("PDD_RESOLVED_FQDN").unwrap_or_default(),
            key: lookup("PDD_KEY").unwrap_or_default(),
            namespace: lookup("PDD_NAMESPACE").unwrap_or_else(|| "default".to_string()),
            secret_dir: lookup("PDD_SECRET_DIR").unwrap_or_default(),
            solver_config: lookup("PDD_CONFIG"),
            ttl: lookup("PDD_TTL"),
            api_base: lookup("PDD_API_BASE"),
            log_level: lookup("PDD_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.action()?;

        for (name, value) in [
            ("PDD_RESOLVED_ZONE", &self.resolved_zone),
            ("PDD_RESOLVED_FQDN", &self.resolved_fqdn),
            ("PDD_KEY", &self.key),
            ("PDD_SECRET_DIR", &self.secret_dir),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{} is required", name);
            }
        }

        if self.namespace.trim().is_empty() {
            anyhow::bail!("PDD_NAMESPACE cannot be empty");
        }

        if self.solver_config.as_ref().is_none_or(|c| c.trim().is_empty()) {
            anyhow::bail!(
                "PDD_CONFIG is required. \
                Set it via: export PDD_CONFIG='{{\"pddTokenSecretRef\":{{\"name\":\"pdd\",\"key\":\"token\"}}}}'"
            );
        }
        self.solver_config_json()?;

        self.settings()?;

        if let Some(ref url) = self.api_base
            && !url.starts_with("https://")
            && !url.starts_with("http://")
        {
            anyhow::bail!("PDD_API_BASE must use HTTP or HTTPS scheme. Got: {}", url);
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "PDD_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn action(&self) -> Result<Action> {
        if self.action.trim().is_empty() {
            anyhow::bail!("action is required: pass `present` or `cleanup` or set PDD_ACTION");
        }
        self.action.trim().parse()
    }

    fn solver_config_json(&self) -> Result<Option<serde_json::Value>> {
        self.solver_config
            .as_deref()
            .map(serde_json::from_str::<serde_json::Value>)
            .transpose()
            .context("PDD_CONFIG is not valid JSON")
    }

    fn settings(&self) -> Result<ReconcileSettings> {
        let ttl = match self.ttl.as_deref() {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PDD_TTL must be a positive integer. Got: {}", raw))?,
            None => DEFAULT_RECORD_TTL,
        };
        let settings = ReconcileSettings::default().with_ttl(ttl);
        settings.validate()?;
        Ok(settings)
    }

    fn request(&self) -> Result<ChallengeRequest> {
        Ok(ChallengeRequest {
            resource_namespace: self.namespace.clone(),
            resolved_zone: self.resolved_zone.clone(),
            resolved_fqdn: self.resolved_fqdn.clone(),
            key: self.key.clone(),
            config: self.solver_config_json()?,
        })
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return SolverExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SolverExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SolverExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(&config).await {
            Ok(outcome) => {
                info!(?outcome, "Challenge reconciled");
                SolverExitCode::Success
            }
            Err(e) => {
                error!("Challenge failed: {:#}", e);
                SolverExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Build the solver from `config` and run one pass
async fn run(config: &Config) -> Result<ReconcileOutcome> {
    let action = config.action()?;
    let request = config.request()?;

    let secrets = FileSecretStore::new(&config.secret_dir)?;
    let factory = match config.api_base {
        Some(ref base) => YandexPddFactory::with_endpoint(base.clone(), DEFAULT_HTTP_TIMEOUT),
        None => YandexPddFactory::new(),
    };
    let solver = Solver::new(Arc::new(secrets), Box::new(factory), config.settings()?)?;

    info!(solver = solver.name(), ?action, "Running challenge");

    let outcome = match action {
        Action::Present => solver.present(&request).await?,
        Action::CleanUp => solver.clean_up(&request).await?,
    };
    Ok(outcome)
}
