//! ReelCut Core Library
//!
//! Transcript-driven highlight editing. The pipeline splits a transcript into
//! overlapping windows, asks a classifier which cues matter, and rebuilds the
//! answer into a clean interval list for an external trimmer.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reelcut_core::core::ai::{create_provider, ClassifierMode, ProviderClassifier};
//! use reelcut_core::core::config::PipelineConfig;
//! use reelcut_core::core::pipeline::HighlightPipeline;
//! use reelcut_core::core::selection::ClassificationContext;
//!
//! let provider = create_provider(ClassifierMode::Fast.provider_config(api_key))?;
//! let classifier = Arc::new(ProviderClassifier::highlights(Arc::from(provider)));
//! let pipeline = HighlightPipeline::new(PipelineConfig::default(), classifier);
//! let outcome = pipeline.run(&cues, &ClassificationContext::new(title, summary), None).await?;
//! ```

pub mod core;

use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global tracing subscriber.
///
/// Logs go to stdout and, when `log_dir` is given, to a daily-rolling
/// `reelcut.log` in that directory. The filter honours `RUST_LOG` on top of
/// an `info` default. Calling this again after a subscriber is installed has
/// no effect.
pub fn init_logging(log_dir: Option<&Path>) -> crate::core::CoreResult<()> {
    use tracing_subscriber::prelude::*;

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, "reelcut.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            if LOG_GUARD.set(guard).is_err() {
                // A previous call already owns the file writer.
                return Ok(());
            }
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(cfg!(debug_assertions));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(())
}
