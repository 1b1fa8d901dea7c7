use serde::de::DeserializeOwned;

/// Problems found while loading an `optree.toml`.
///
/// Loading is best effort: a config that deserializes is always returned,
/// and these describe what was ignored or looks wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    /// Keys the schema does not know, as dotted paths (`lowering.argumnet_order`).
    pub unknown_keys: Vec<String>,
    pub warnings: Vec<ConfigWarning>,
}

impl ConfigDiagnostics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unknown_keys.is_empty() && self.warnings.is_empty()
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `logging.level` is neither a level nor a valid filter directive.
    LoggingLevelInvalid { value: String, normalized: String },
    /// The directory that would hold `logging.file` does not exist.
    LogFileDirectoryMissing { path: String },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::LoggingLevelInvalid { value, .. } => {
                write!(f, "logging.level `{value}` is not a valid filter; using `info`")
            }
            ConfigWarning::LogFileDirectoryMissing { path } => {
                write!(f, "logging.file `{path}` is in a directory that does not exist")
            }
        }
    }
}

pub(crate) fn deserialize_with_unknown_keys<T: DeserializeOwned>(
    text: &str,
) -> Result<(T, Vec<String>), toml::de::Error> {
    let mut unknown = Vec::new();
    let deserializer = toml::de::Deserializer::new(text);
    let value = serde_ignored::deserialize(deserializer, |path| {
        unknown.push(dotted_path(&path));
    })?;
    unknown.sort();
    unknown.dedup();
    Ok((value, unknown))
}

/// `serde_ignored` renders paths with a leading `.`.
fn dotted_path(path: &serde_ignored::Path<'_>) -> String {
    path.to_string().trim_start_matches('.').to_string()
}
