use chrono::{DateTime, Local};
use clap::Parser;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info, Dispatch};

use crate::cli::{CliArgs, OutputFormatter};
use crate::connectors::{open_connector, SourceDescriptor};
use crate::render::{render_report, RenderOutcome};
use crate::utils::{
    config::ReportConfig,
    error::{ReportError, ReportResult},
    logging::stderr_dispatch,
};

/// Exit status for a run that could not select a source
pub const EXIT_MISSING_SOURCE: i32 = 2;
/// Exit status when the configuration cannot be loaded
pub const EXIT_CONFIG_ERROR: i32 = 1;

/// Source and destination resolved from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub source: SourceDescriptor,
    pub output: PathBuf,
}

impl RunConfig {
    /// Pick the single source by precedence: CSV, then Excel, then a
    /// connection string paired with a query. Empty values count as absent.
    pub fn resolve(args: &CliArgs, now: DateTime<Local>) -> ReportResult<Self> {
        let source = if let Some(path) = non_empty_path(&args.csv) {
            SourceDescriptor::Csv { path: path.to_path_buf() }
        } else if let Some(path) = non_empty_path(&args.excel) {
            SourceDescriptor::Excel {
                path: path.to_path_buf(),
                sheet: non_empty(&args.sheet).map(str::to_string),
            }
        } else if let (Some(db), Some(query)) = (non_empty(&args.db), non_empty(&args.query)) {
            SourceDescriptor::Database {
                connection_string: db.to_string(),
                query: query.to_string(),
            }
        } else {
            return Err(ReportError::MissingSource);
        };

        let output = non_empty_path(&args.output)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(default_output_name(&now)));

        Ok(Self { source, output })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn non_empty_path(value: &Option<PathBuf>) -> Option<&Path> {
    value.as_deref().filter(|p| !p.as_os_str().is_empty())
}

/// `report_<YYYYMMDD_HHMMSS>.pdf` for the given local time
pub fn default_output_name(now: &DateTime<Local>) -> String {
    format!("report_{}.pdf", now.format("%Y%m%d_%H%M%S"))
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Rendered {
        path: PathBuf,
        rows: usize,
        columns: usize,
        pages: usize,
    },
    NoData,
    ReadFailed,
    RenderFailed,
    MissingSource,
}

impl RunOutcome {
    /// Every run that selected a source exits cleanly, whatever happened next
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::MissingSource => EXIT_MISSING_SOURCE,
            _ => 0,
        }
    }
}

/// Load the JSON config named on the command line (or the defaults) and
/// apply the flag overrides on top
pub fn load_config(args: &CliArgs) -> ReportResult<ReportConfig> {
    let mut config = match &args.config {
        Some(path) => ReportConfig::from_file(path)?,
        None => ReportConfig::default(),
    };
    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

/// Command line flags win over file values
pub fn apply_overrides(config: &mut ReportConfig, args: &CliArgs) {
    if let Some(chunk_size) = args.chunk_size {
        config.reader.csv_chunk_size = chunk_size;
    }
    if args.no_progress {
        config.reader.show_progress = false;
    }
}

/// Drives one read-then-render pass. All log output of a run goes to the
/// dispatch the runner was built with.
pub struct ReportRunner {
    config: ReportConfig,
    dispatch: Dispatch,
}

impl ReportRunner {
    pub fn new(config: ReportConfig, dispatch: Dispatch) -> Self {
        Self { config, dispatch }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Resolve the source from the arguments and run
    pub async fn run(&self, args: &CliArgs) -> RunOutcome {
        self.timed(async {
            match RunConfig::resolve(args, Local::now()) {
                Ok(run_config) => self.execute(&run_config).await,
                Err(e) => {
                    error!("{}", e);
                    RunOutcome::MissingSource
                }
            }
        })
        .await
    }

    /// Run an already resolved configuration
    pub async fn run_config(&self, run_config: &RunConfig) -> RunOutcome {
        self.timed(self.execute(run_config)).await
    }

    async fn timed<F>(&self, run: F) -> RunOutcome
    where
        F: Future<Output = RunOutcome>,
    {
        let started = Instant::now();
        async move {
            let outcome = run.await;
            info!("Processing completed in {:.2} seconds", started.elapsed().as_secs_f64());
            outcome
        }
        .with_subscriber(self.dispatch.clone())
        .await
    }

    async fn execute(&self, run_config: &RunConfig) -> RunOutcome {
        debug!("Reading {} into {}", run_config.source, run_config.output.display());

        let data = match open_connector(&run_config.source, &self.config) {
            Ok(mut connector) => connector.read().await,
            Err(e) => Err(e),
        };
        let data = match data {
            Ok(data) => data,
            Err(e) => {
                error!("{}", e);
                return RunOutcome::ReadFailed;
            }
        };

        info!("Data Summary: {} rows, {} columns", data.row_count(), data.column_count());

        match render_report(Some(&data), &run_config.output, &self.config.layout) {
            RenderOutcome::Written { path, pages } => RunOutcome::Rendered {
                path,
                rows: data.row_count(),
                columns: data.column_count(),
                pages,
            },
            RenderOutcome::NoData => RunOutcome::NoData,
            RenderOutcome::Failed => RunOutcome::RenderFailed,
        }
    }
}

/// Main entry point for CLI execution
pub async fn run_cli() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", OutputFormatter::format_error(&e));
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    let runner = ReportRunner::new(config, stderr_dispatch(args.verbose));
    let outcome = runner.run(&args).await;

    if let Some(line) = OutputFormatter::format_outcome(&outcome) {
        println!("{}", line);
    }

    let code = outcome.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
