use clap::Parser;
use cmdrelay_cli::commands::cli;
use cmdrelay_cli::http;
use cmdrelay_core::api::{CliError, LoggingConfig};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static LOG_GUARDS: std::sync::OnceLock<Vec<tracing_appender::non_blocking::WorkerGuard>> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<(), CliError> {
    let args = cli::Args::parse();
    let mut cfg = cmdrelay_core::config::load(&args.load_options())?;
    args.apply_overrides(&mut cfg);
    init_tracing(&cfg.logging).map_err(CliError::Server)?;

    http::start_server(cfg).await
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: server start / IO error
    match e {
        CliError::Config(_) => 11,
        CliError::Server(_) => 20,
        CliError::Io(_) => 20,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut writers = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::path::PathBuf::from("logs"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let (combined, combined_guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, "combined.log"));
        let (errors, errors_guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, "error.log"));
        let _ = LOG_GUARDS.set(vec![combined_guard, errors_guard]);
        writers = Some((combined, errors));
    }

    if !logging.console && writers.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let (combined_layer, error_layer) = match writers {
        Some((combined, errors)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(combined)
                    .with_ansi(false),
            ),
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(errors)
                    .with_ansi(false)
                    .with_filter(LevelFilter::ERROR),
            ),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(combined_layer)
        .with(error_layer)
        .init();

    Ok(())
}
