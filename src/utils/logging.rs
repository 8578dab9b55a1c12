//! Logging setup for the indexer supervisor.
//!
//! Events go through a `tracing_subscriber` registry filtered by an [`EnvFilter`]. `RUST_LOG`
//! wins when set; otherwise `LOG_LEVEL` (which the `--log-level` flag populates) is used, and
//! `info` when neither is present.
//!
//! Logs are written to stderr by default so they never interleave with indexer output
//! relayed on stdout.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Environment variable holding the fallback log level
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

const DEFAULT_LOG_LEVEL: &str = "info";

type SetupResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

/// Builds the event filter from the environment
pub fn resolve_filter() -> EnvFilter {
	build_filter(
		std::env::var("RUST_LOG").ok().as_deref(),
		std::env::var(LOG_LEVEL_ENV).ok().as_deref(),
	)
}

fn build_filter(rust_log: Option<&str>, level: Option<&str>) -> EnvFilter {
	rust_log
		.and_then(|directives| EnvFilter::try_new(directives).ok())
		.or_else(|| level.and_then(|level| EnvFilter::try_new(level).ok()))
		.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Installs the global subscriber writing to stderr
pub fn setup_logging() -> SetupResult {
	setup_logging_with_writer(std::io::stderr)
}

/// Installs the global subscriber writing to `writer`
pub fn setup_logging_with_writer<W>(writer: W) -> SetupResult
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	tracing_subscriber::registry()
		.with(resolve_filter())
		.with(
			fmt::layer()
				.with_writer(writer)
				.event_format(
					fmt::format()
						.with_level(true)
						.with_target(true)
						.with_thread_ids(false)
						.with_thread_names(false)
						.with_ansi(false)
						.compact(),
				)
				.fmt_fields(fmt::format::PrettyFields::new()),
		)
		.try_init()?;
	Ok(())
}
