// Configuration loading and parsing (board.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::protocol::PanelId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// board.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the fantasy service lives.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
}

/// Endpoint paths, relative to `service.base_url`.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    pub recommendations: String,
    pub teams: String,
    pub live_scores: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        EndpointsConfig {
            recommendations: PanelId::Recommendations.default_endpoint().to_string(),
            teams: PanelId::Teams.default_endpoint().to_string(),
            live_scores: PanelId::LiveScores.default_endpoint().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// HTML output file. `-` means stdout.
    pub path: String,
    /// Page heading and `<title>`.
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Directory for the log file in terminal mode.
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "fantasy_board=info,warn".to_string(),
            log_dir: "logs".to_string(),
        }
    }
}

impl Config {
    /// Endpoint path configured for `panel`.
    pub fn endpoint_path(&self, panel: PanelId) -> &str {
        match panel {
            PanelId::Recommendations => self.endpoints.recommendations.as_str(),
            PanelId::Teams => self.endpoints.teams.as_str(),
            PanelId::LiveScores => self.endpoints.live_scores.as_str(),
        }
    }

    /// Absolute URL the given panel fetches from.
    pub fn endpoint_url(&self, panel: PanelId) -> String {
        format!(
            "{}{}",
            self.service.base_url.trim_end_matches('/'),
            self.endpoint_path(panel)
        )
    }

    /// True when output goes to stdout rather than a file.
    pub fn writes_to_stdout(&self) -> bool {
        self.output.path == "-"
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Values given on the command line that replace their board.toml
/// counterparts before validation.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces `service.base_url`.
    pub base_url: Option<String>,
    /// Replaces `output.path`.
    pub output: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.service.base_url = base_url.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
    }
}

/// Read `config/board.toml` relative to `base_dir` without validating it.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config_in()` which handles default initialization.
pub fn read_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let board_path = base_dir.join("config").join("board.toml");
    let board_text = read_file(&board_path)?;
    parse_config(&board_text, &board_path)
}

/// Parse board.toml text without validating it.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or pass --base-dir",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // Never overwrite a user's edited config.
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Seed missing config files from `defaults/`, load from `base_dir`, apply
/// `overrides`, then validate the result.
pub fn load_config_in(base_dir: &Path, overrides: &ConfigOverrides) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    let mut config = read_config_from(base_dir)?;
    overrides.apply(&mut config);
    validate(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check a loaded (or CLI-overridden) config.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    match reqwest::Url::parse(&config.service.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => {
            return Err(ConfigError::ValidationError {
                field: "service.base_url".into(),
                message: format!("scheme must be http or https, got `{}`", url.scheme()),
            });
        }
        Err(e) => {
            return Err(ConfigError::ValidationError {
                field: "service.base_url".into(),
                message: format!("not a valid URL: {e}"),
            });
        }
    }

    let endpoint_fields: &[(&str, &str)] = &[
        ("endpoints.recommendations", config.endpoints.recommendations.as_str()),
        ("endpoints.teams", config.endpoints.teams.as_str()),
        ("endpoints.live_scores", config.endpoints.live_scores.as_str()),
    ];
    for (name, path) in endpoint_fields {
        if !path.starts_with('/') {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must start with `/`, got `{path}`"),
            });
        }
    }

    if config.output.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "output.path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.output.title.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "output.title".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
