//! # VoiceChat Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module loads the optional TOML configuration shared by the `serve` and
//! `rules` commands. Every field is optional: anything left out falls back to
//! environment variables, command-line flags, or built-in defaults, which are
//! resolved later by the command that uses them.
//!
//! Configuration sources (in order of precedence):
//! 1. An explicit `--config <PATH>` (`~` is expanded); nothing else is read.
//! 2. Project `.voicechat.toml` in the current directory or an ancestor
//!    (the search stops at a directory containing `.git`).
//! 3. User `config.toml` in the platform config dir (e.g. `~/.config/voicechat/`).
//!
//! Project settings override user settings field by field. A `[[rules]]` list
//! replaces the built-in keyword table as a whole.
//!
//! ## Examples
//!
//! ```toml
//! [server]
//! port = 3003
//! allowed_origins = ["http://localhost:3000"]
//! rate_limit_max = 100
//! rate_limit_window_secs = 900
//!
//! [provider]
//! model = "gpt-3.5-turbo"
//! max_tokens = 150
//!
//! [[rules]]
//! keywords = ["opening hours", "when are you open"]
//! answer = "We are open 9 to 5, Monday to Friday."
//! ```
//!
use crate::core::error::{ChatError, Result};
use crate::core::rules::{builtin_rules, KeywordRule};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::net::IpAddr;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// File name searched for in the current directory and its ancestors.
pub const PROJECT_CONFIG_FILENAME: &str = ".voicechat.toml";

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub provider: ProviderSection,
    /// Replacement keyword table; `None` keeps the built-in rules.
    pub rules: Option<Vec<KeywordRule>>,
}

/// `[server]`: listener, CORS, rate limiting and request deadline.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<IpAddr>,
    pub port: Option<u16>,
    pub allowed_origins: Option<Vec<String>>,
    /// Requests admitted per client within one window.
    pub rate_limit_max: Option<u32>,
    pub rate_limit_window_secs: Option<u64>,
    /// Deadline for answering one chat message, provider call included.
    pub request_timeout_secs: Option<u64>,
}

/// `[provider]`: completion API settings. The API key is never read from files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderSection {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
    pub connect_timeout_secs: Option<u64>,
}

impl Config {
    /// The rule table in effect: configured rules, else the built-in table.
    pub fn effective_rules(&self) -> Vec<KeywordRule> {
        self.rules.clone().unwrap_or_else(builtin_rules)
    }
}

/// Loads, merges, normalizes and validates configuration.
///
/// ## Errors
///
/// Returns an error if an explicit path is missing, a file cannot be read or
/// parsed, or the merged configuration fails validation.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
            if !expanded.is_file() {
                return Err(anyhow!(ChatError::Config(format!(
                    "Config file '{}' does not exist",
                    expanded.display()
                ))));
            }
            info!("Loading configuration from: {}", expanded.display());
            load_config_from_path(&expanded)?
        }
        None => {
            let user_config = load_user_config()?;
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            let project_config = match find_project_config_path(&current_dir) {
                Some(path) => {
                    info!("Loading project configuration from: {}", path.display());
                    Some(load_config_from_path(&path)?)
                }
                None => {
                    debug!("No project configuration file ({}) found.", PROJECT_CONFIG_FILENAME);
                    None
                }
            };
            merge_configs(user_config.unwrap_or_default(), project_config)
        }
    };

    normalize_config(&mut config);
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "VoiceChat", "voicechat") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.is_file() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

/// Walks from `start` towards the root looking for `.voicechat.toml`.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let candidate = path.join(PROJECT_CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Field-by-field merge; project values win when present.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let Some(project) = project else {
        return user;
    };
    Config {
        server: ServerSection {
            host: project.server.host.or(user.server.host),
            port: project.server.port.or(user.server.port),
            allowed_origins: project
                .server
                .allowed_origins
                .or(user.server.allowed_origins),
            rate_limit_max: project.server.rate_limit_max.or(user.server.rate_limit_max),
            rate_limit_window_secs: project
                .server
                .rate_limit_window_secs
                .or(user.server.rate_limit_window_secs),
            request_timeout_secs: project
                .server
                .request_timeout_secs
                .or(user.server.request_timeout_secs),
        },
        provider: ProviderSection {
            base_url: project.provider.base_url.or(user.provider.base_url),
            model: project.provider.model.or(user.provider.model),
            max_tokens: project.provider.max_tokens.or(user.provider.max_tokens),
            system_prompt: project.provider.system_prompt.or(user.provider.system_prompt),
            connect_timeout_secs: project
                .provider
                .connect_timeout_secs
                .or(user.provider.connect_timeout_secs),
        },
        rules: project.rules.or(user.rules),
    }
}

fn normalize_config(config: &mut Config) {
    if let Some(rules) = config.rules.as_mut() {
        for rule in rules.iter_mut() {
            rule.normalize();
        }
    }
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    if let Some(rules) = &config.rules {
        if rules.is_empty() {
            return Err(anyhow!(ChatError::Config(
                "`rules` is present but empty; remove it to use the built-in rules".into()
            )));
        }
        for (index, rule) in rules.iter().enumerate() {
            rule.validate()
                .map_err(|reason| anyhow!(ChatError::Config(format!("rules[{index}]: {reason}"))))?;
        }
    }
    if config.server.rate_limit_max == Some(0) {
        return Err(anyhow!(ChatError::Config(
            "server.rate_limit_max must be greater than zero".into()
        )));
    }
    if config.server.rate_limit_window_secs == Some(0) {
        return Err(anyhow!(ChatError::Config(
            "server.rate_limit_window_secs must be greater than zero".into()
        )));
    }
    if config.server.request_timeout_secs == Some(0) {
        return Err(anyhow!(ChatError::Config(
            "server.request_timeout_secs must be greater than zero".into()
        )));
    }
    if config.provider.max_tokens == Some(0) {
        return Err(anyhow!(ChatError::Config(
            "provider.max_tokens must be greater than zero".into()
        )));
    }
    Ok(())
}
