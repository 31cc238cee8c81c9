//! Main application orchestration

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config},
    dns::{DnsManager, HostResolver},
    error::{AppError, Result},
    executor::{ConsoleSink, DispatchConfig, DispatchStats, Dispatcher, ProbeRecorder, ResolutionProbe, TargetRotator},
    logging::{Logger, LoggerFactory},
    metrics::{LookupMetrics, MetricsServer},
    models::Config,
    output::{format_banner, format_dispatch_summary, ProgressLine, ReportFormatter},
    shutdown::{spawn_signal_listener, TerminationCoordinator},
    stats::{HistogramSnapshot, LatencyAggregator},
    types::TerminationSignal,
};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// How long the metrics listener gets to drain after the report
const SERVER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The trigger that ended the run
    pub cause: TerminationSignal,
    /// Histogram at report time
    pub snapshot: HistogramSnapshot,
    /// The report exactly as printed
    pub report: String,
    pub dispatch: DispatchStats,
    pub elapsed: Duration,
    /// Set when a collaborator such as the metrics listener failed mid-run
    pub collaborator_error: Option<String>,
}

/// One load-generation run
pub struct App {
    config: Config,
    resolver: Option<Arc<dyn HostResolver>>,
    handle_signals: bool,
    print_report: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            resolver: None,
            handle_signals: true,
            print_report: true,
        }
    }

    /// Build from command-line arguments, loading .env and the environment
    pub fn from_cli(cli: Cli) -> Result<Self> {
        Ok(Self::new(load_config(cli)?))
    }

    /// Use `resolver` instead of building one from the configuration
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Leave SIGINT/SIGTERM to the caller
    pub fn without_signal_handlers(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    /// Return the report in the summary without writing it to stdout
    pub fn quiet(mut self) -> Self {
        self.print_report = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run until a termination trigger fires
    pub async fn run(self) -> Result<RunSummary> {
        self.run_with(Arc::new(TerminationCoordinator::new())).await
    }

    /// Run against an externally owned coordinator, so callers can trigger
    /// termination themselves
    pub async fn run_with(self, coordinator: Arc<TerminationCoordinator>) -> Result<RunSummary> {
        let config = self.config;
        let warnings = validate_config(&config)?;

        let factory = LoggerFactory::new(config.clone());
        let logger = factory.create_logger("APP");

        for warning in &warnings {
            eprintln!("{}", warning.format(config.enable_color));
        }

        let resolver = match self.resolver {
            Some(resolver) => resolver,
            None => DnsManager::create_resolver(&config.dns_config()?, config.timeout())?,
        };

        if config.debug {
            println!("{}", format_banner(&config, &resolver.describe()));
            println!("Session: {}", factory.session_id());
            println!("{}", display_config_summary(&config));
            println!();
        }

        let metrics = LookupMetrics::new()?;
        let server = MetricsServer::bind(&config.metric_bind_addr()?, metrics.clone()).await?;
        logger
            .debug("Metrics listener bound")
            .field("addr", server.local_addr().to_string())
            .log();

        let collaborator_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let server_handle = spawn_collaborator(
            server.serve(coordinator.token()),
            coordinator.clone(),
            collaborator_error.clone(),
            logger.clone(),
        );

        let signal_handle = if self.handle_signals {
            Some(spawn_signal_listener(coordinator.clone())?)
        } else {
            None
        };

        let progress = (!config.enable_logging).then(ProgressLine::new);
        let console = match &progress {
            Some(progress) => ConsoleSink::Progress(progress.clone()),
            None => ConsoleSink::Log(factory.create_probe_logger()),
        };

        let aggregator = Arc::new(LatencyAggregator::new());
        let recorder = Arc::new(ProbeRecorder::new(aggregator.clone(), Some(metrics), console));
        let dispatcher = Dispatcher::new(
            TargetRotator::from_names(&config.names)?,
            ResolutionProbe::new(resolver, config.timeout()),
            recorder,
            DispatchConfig::from_config(&config),
        );

        logger
            .info(&format!("Resolving {} at {} requests per second", config.names.join(", "), config.rps))
            .field("rps", config.rps)
            .field("timeout_ms", config.timeout_ms)
            .log();

        let started = Instant::now();
        let dispatch = dispatcher.run(&coordinator).await;
        let elapsed = started.elapsed();

        if let Some(progress) = &progress {
            progress.finish();
        }

        let formatter = ReportFormatter::new(config.enable_color);
        let print_report = self.print_report;
        let finalized = coordinator.finalize(|cause| {
            logger.info(&format!("Terminating after {}", cause)).log();
            let snapshot = aggregator.snapshot();
            let report = formatter.format(&snapshot);
            if print_report {
                print!("{}", report);
            }
            (cause, snapshot, report)
        });

        let (cause, snapshot, report) =
            finalized.ok_or_else(|| AppError::internal("Run ended without a termination cause"))?;

        if config.debug {
            println!("{}", format_dispatch_summary(&dispatch, Some(cause), elapsed));
        }

        if let Some(handle) = signal_handle {
            handle.abort();
        }
        let _ = tokio::time::timeout(SERVER_DRAIN_TIMEOUT, server_handle).await;

        let collaborator_error = collaborator_error.lock().ok().and_then(|slot| slot.clone());

        Ok(RunSummary {
            cause,
            snapshot,
            report,
            dispatch,
            elapsed,
            collaborator_error,
        })
    }
}

/// Run `task` next to the dispatch loop. A failure is logged, kept in
/// `failure` and ends the run with `ExternalCancel`.
fn spawn_collaborator<F>(
    task: F,
    coordinator: Arc<TerminationCoordinator>,
    failure: Arc<Mutex<Option<String>>>,
    logger: Logger,
) -> JoinHandle<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = task.await {
            logger.error("Collaborator failed").error_info(&e).log();
            if let Ok(mut slot) = failure.lock() {
                *slot = Some(e.to_string());
            }
            coordinator.trigger(TerminationSignal::ExternalCancel);
        }
    })
}
