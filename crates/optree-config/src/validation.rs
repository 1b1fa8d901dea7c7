use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::{ConfigWarning, LoggingConfig, OptreeConfig};

pub(crate) fn validate(config: &OptreeConfig, config_dir: Option<&Path>) -> Vec<ConfigWarning> {
    let mut out = Vec::new();
    validate_logging(&config.logging, config_dir, &mut out);
    out
}

fn validate_logging(logging: &LoggingConfig, config_dir: Option<&Path>, out: &mut Vec<ConfigWarning>) {
    let normalized = LoggingConfig::normalize_level_directives(&logging.level);
    if !logging.level.trim().is_empty()
        && EnvFilter::try_new(normalized.clone()).is_err()
    {
        out.push(ConfigWarning::LoggingLevelInvalid {
            value: logging.level.clone(),
            normalized,
        });
    }

    if let Some(file) = &logging.file {
        // Relative paths without a config directory are left unchecked.
        let resolved = match config_dir {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.clone(),
        };
        let checkable = resolved.is_absolute();
        if let Some(parent) = resolved.parent().filter(|p| !p.as_os_str().is_empty()) {
            if checkable && !parent.is_dir() {
                out.push(ConfigWarning::LogFileDirectoryMissing {
                    path: file.display().to_string(),
                });
            }
        }
    }
}
