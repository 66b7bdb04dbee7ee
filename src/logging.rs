use std::path::Path;

use tracing::Subscriber;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Daily-rolling file for one level and above, e.g. `warn.log.2024-06-01`
fn level_file<S>(log_dir: &Path, level: LevelFilter) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let prefix = format!("{}.log", level.to_string().to_lowercase());
    tracing_subscriber::fmt::layer()
        .with_writer(tracing_appender::rolling::daily(log_dir, prefix))
        .with_ansi(false)
        .with_filter(level)
}

/// Console output plus `debug`/`info`/`warn`/`error` files under `log_dir`.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init(log_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(level_file(log_dir, LevelFilter::DEBUG))
        .with(level_file(log_dir, LevelFilter::INFO))
        .with(level_file(log_dir, LevelFilter::WARN))
        .with(level_file(log_dir, LevelFilter::ERROR))
        .init();

    Ok(())
}
