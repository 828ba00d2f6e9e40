// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Engine configuration, loadable from RON or JSON files.

use lumen_core::{EngineContext, Phase};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Settings used to build an [`Engine`](crate::Engine).
///
/// Every field is optional in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine name, reported by the [`EngineContext`].
    pub name: String,
    /// Default `env_logger` filter, overridden by `RUST_LOG`.
    pub log_filter: String,
    /// Name of the listener receiving events posted through the engine.
    pub default_listener: String,
    /// Additional listeners to create at startup (e.g. one per window).
    pub listeners: Vec<String>,
    /// Phase on which deferred GPU initialisation runs.
    pub initialise_phase: Phase,
    /// Phase on which deferred GPU cleanup runs.
    pub cleanup_phase: Phase,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "Lumen".to_string(),
            log_filter: "info".to_string(),
            default_listener: "Default".to_string(),
            listeners: Vec::new(),
            initialise_phase: Phase::PreRender,
            cleanup_phase: Phase::PostRender,
        }
    }
}

impl EngineConfig {
    /// Parses a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(|e| ConfigError::Parse {
            format: "RON",
            details: e.to_string(),
        })
    }

    /// Parses a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(source).map_err(|e| ConfigError::Parse {
            format: "JSON",
            details: e.to_string(),
        })
    }

    /// Loads a `.ron` or `.json` file, choosing the parser from the extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("ron") => Self::from_ron_str,
            Some("json") => Self::from_json_str,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse(&source)?;
        log::debug!("Loaded engine configuration from '{}'", path.display());
        Ok(config)
    }

    /// Builds the read-only context shared by the engine's caches.
    pub fn context(&self) -> EngineContext {
        EngineContext::new(self.name.clone()).with_phases(self.initialise_phase, self.cleanup_phase)
    }
}

/// An error raised while loading an [`EngineConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The document is not a valid configuration.
    Parse {
        /// The document format (`"RON"` or `"JSON"`).
        format: &'static str,
        /// Parser diagnostics.
        details: String,
    },
    /// The file extension is neither `.ron` nor `.json`.
    UnsupportedFormat(PathBuf),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read configuration '{}': {source}", path.display())
            }
            ConfigError::Parse { format, details } => {
                write!(f, "Invalid {format} configuration: {details}")
            }
            ConfigError::UnsupportedFormat(path) => {
                write!(f, "Unsupported configuration format: '{}'", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_fields_take_defaults() {
        let config = EngineConfig::from_ron_str("(name: \"Editor\")").unwrap();
        assert_eq!(config.name, "Editor");
        assert_eq!(config.default_listener, "Default");
        assert_eq!(config.initialise_phase, Phase::PreRender);
    }

    #[test]
    fn parses_ron() {
        let config = EngineConfig::from_ron_str(
            r#"(
                name: "Viewer",
                log_filter: "debug",
                listeners: ["MainWindow", "Preview"],
                initialise_phase: QueueRender,
                cleanup_phase: PreRender,
            )"#,
        )
        .unwrap();

        assert_eq!(config.listeners, vec!["MainWindow", "Preview"]);
        assert_eq!(config.initialise_phase, Phase::QueueRender);
        assert_eq!(config.cleanup_phase, Phase::PreRender);

        let context = config.context();
        assert_eq!(context.name(), "Viewer");
        assert_eq!(context.initialise_phase(), Phase::QueueRender);
    }

    #[test]
    fn parses_json() {
        let config = EngineConfig::from_json_str(
            r#"{ "default_listener": "Render", "cleanup_phase": "QueueRender" }"#,
        )
        .unwrap();
        assert_eq!(config.default_listener, "Render");
        assert_eq!(config.cleanup_phase, Phase::QueueRender);
        assert_eq!(config.name, "Lumen");
    }

    #[test]
    fn invalid_document_is_a_parse_error() {
        let err = EngineConfig::from_json_str("{ \"listeners\": 3 }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "JSON", .. }));
        assert!(err.to_string().starts_with("Invalid JSON configuration"));
    }

    #[test]
    fn loads_by_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".ron")
            .tempfile()
            .expect("Failed to create temp file");
        write!(file, "(name: \"FromFile\", listeners: [\"Window\"])").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.name, "FromFile");
        assert_eq!(config.listeners, vec!["Window"]);
    }

    #[test]
    fn rejects_unknown_extension_and_missing_file() {
        let err = EngineConfig::load("engine.toml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));

        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
