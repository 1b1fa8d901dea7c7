//! Configuration and logging setup for the optree tools.
//!
//! Settings live in an `optree.toml`:
//!
//! ```toml
//! [logging]
//! level = "optree.lower=debug"
//! json = false
//!
//! [lowering]
//! argument_order = "parameter"
//!
//! [dump]
//! show_spans = true
//! ```

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once, PoisonError};

use optree_ir::{ArgumentOrder, DumpOptions, LowerConfig};
use thiserror::Error;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod diagnostics;
mod validation;

pub use diagnostics::{ConfigDiagnostics, ConfigWarning};

/// Environment variable naming the config file, absolute or relative to the
/// discovery directory.
pub const OPTREE_CONFIG_ENV_VAR: &str = "OPTREE_CONFIG";

/// File looked up by [`discover_config_path`] when the variable is unset.
pub const CONFIG_FILE_NAME: &str = "optree.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptreeConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub lowering: LoweringConfig,
    #[serde(default)]
    pub dump: DumpConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoweringConfig {
    #[serde(default)]
    pub argument_order: ArgumentOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Append the source span of every operation to its dump line.
    #[serde(default)]
    pub show_spans: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit one JSON object per event.
    #[serde(default)]
    pub json: bool,

    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Append logs to this file as well. If it cannot be opened, file
    /// logging is skipped and the other sinks stay active.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    /// Maps level aliases (`Warning`, `none`) onto `EnvFilter` spelling.
    /// Anything else is passed through as a directive string.
    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let level = input.trim();
        if level.is_empty() {
            return Self::default_level();
        }
        match level.to_ascii_lowercase().as_str() {
            "warning" => "warn".to_owned(),
            "none" => "off".to_owned(),
            lower @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => lower.to_owned(),
            _ => level.to_owned(),
        }
    }

    fn level_filter(&self) -> Option<EnvFilter> {
        EnvFilter::try_new(Self::normalize_level_directives(&self.level)).ok()
    }

    /// The effective filter: `level`, with `RUST_LOG` appended when set.
    ///
    /// Falls back to `RUST_LOG` alone, then to `level` alone, then to `info`.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let rust_log = std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let combined = rust_log.as_deref().and_then(|rust_log| {
            let level = Self::normalize_level_directives(&self.level);
            EnvFilter::try_new(format!("{level},{}", rust_log.trim()))
                .or_else(|_| EnvFilter::try_new(rust_log.trim()))
                .ok()
        });

        combined
            .or_else(|| self.level_filter())
            .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::INFO.into()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` quotes the offending source line; the message
        // alone is enough.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl OptreeConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = read_config(path.as_ref())?;
        Ok(toml::from_str(&text)?)
    }

    /// Loads `path`, reporting unknown keys and suspicious values.
    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let path = path.as_ref();
        let text = read_config(path)?;
        Self::load_inner(&text, path.parent())
    }

    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        Self::load_inner(text, None)
    }

    fn load_inner(
        text: &str,
        config_dir: Option<&Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_with_unknown_keys::<OptreeConfig>(text)?;
        let warnings = validation::validate(&config, config_dir);
        for key in &unknown_keys {
            tracing::warn!(target: "optree.config", key = %key, "unknown config key");
        }
        Ok((
            config,
            ConfigDiagnostics {
                unknown_keys,
                warnings,
            },
        ))
    }

    #[must_use]
    pub fn lower_config(&self) -> LowerConfig {
        LowerConfig {
            argument_order: self.lowering.argument_order,
        }
    }

    #[must_use]
    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions {
            show_spans: self.dump.show_spans,
        }
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Finds the config file for `dir`.
///
/// `OPTREE_CONFIG` wins when set (relative values resolve against `dir`);
/// otherwise `optree.toml` in `dir` is used if it exists.
#[must_use]
pub fn discover_config_path(dir: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(OPTREE_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            dir.join(candidate)
        };
        return Some(path);
    }
    let path = dir.join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

/// Loads the config discovered for `dir`, or the defaults when there is none.
pub fn load_for_dir(
    dir: &Path,
) -> Result<(OptreeConfig, Option<PathBuf>, ConfigDiagnostics), ConfigError> {
    let Some(path) = discover_config_path(dir) else {
        return Ok((OptreeConfig::default(), None, ConfigDiagnostics::default()));
    };
    let (config, diagnostics) = OptreeConfig::load_from_path_with_diagnostics(&path)?;
    tracing::debug!(target: "optree.config", path = %path.display(), "loaded config");
    Ok((config, Some(path), diagnostics))
}

struct MutexFileMakeWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl<'a> MakeWriter<'a> for MutexFileMakeWriter {
    type Writer = MutexFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        MutexFileWriter {
            guard: self.file.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

struct MutexFileWriter<'a> {
    guard: std::sync::MutexGuard<'a, std::fs::File>,
}

impl Write for MutexFileWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.guard.flush()
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber.
///
/// Only the first call in a process has an effect; later calls (and calls
/// after another subscriber was installed) are no-ops.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let file = config
            .file
            .as_ref()
            .and_then(|path| {
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .ok()
            })
            .map(|file| Arc::new(Mutex::new(file)));
        let file_failed = config.file.is_some() && file.is_none();

        let mut make_writer = if config.stderr {
            BoxMakeWriter::new(io::stderr)
        } else {
            BoxMakeWriter::new(io::sink)
        };
        if let Some(file) = file {
            make_writer = BoxMakeWriter::new(make_writer.and(MutexFileMakeWriter { file }));
        }

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_ok() && file_failed {
            if let Some(path) = config.file.as_ref() {
                tracing::warn!(
                    target: "optree.config",
                    path = %path.display(),
                    "failed to open log file; file logging disabled"
                );
            }
        }
    });
}
