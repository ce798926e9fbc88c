//! Logging and tracing initialization.

use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level`. Logs go to stderr unless
/// `config.file` is set and can be opened.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (writer, file_error) = make_writer(config);

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }

    if let Some((path, err)) = file_error {
        tracing::warn!(path = %path.display(), error = %err, "Could not open log file, logging to stderr");
    }
}

fn make_writer(
    config: &LoggingConfig,
) -> (BoxMakeWriter, Option<(std::path::PathBuf, std::io::Error)>) {
    let Some(path) = &config.file else {
        return (BoxMakeWriter::new(std::io::stderr), None);
    };

    let opened = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path);
    match opened {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), None),
        Err(err) => (BoxMakeWriter::new(std::io::stderr), Some((path.clone(), err))),
    }
}
