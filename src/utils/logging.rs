use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive that overrides the level
pub const LOG_ENV_VAR: &str = "TABREP_LOG";

/// Default filter directive for the given verbosity
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Build the filter, preferring `TABREP_LOG` when it is set and valid
pub fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Logger writing to stderr. The dispatch is handed to the runner rather than
/// installed as the process-wide default.
pub fn stderr_dispatch(verbose: bool) -> Dispatch {
    dispatch_with_writer(build_filter(verbose), std::io::stderr)
}

/// Logger writing to an arbitrary sink, without ANSI colours
pub fn dispatch_with_writer<W>(filter: EnvFilter, writer: W) -> Dispatch
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .finish();
    Dispatch::new(subscriber)
}
