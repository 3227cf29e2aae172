//! # VoiceChat Server Configuration
//!
//! File: cli/src/commands/serve/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module turns `ServeArgs` plus the optional TOML configuration into the
//! final `ServerSettings` the backend runs with. Precedence, highest first:
//! 1. Command-line flags (several also read environment variables through clap)
//! 2. The `[server]` / `[provider]` / `[[rules]]` sections of the config file
//! 3. Built-in defaults
//!
//! The provider API key only comes from `--api-key` / `OPENAI_API_KEY`. A
//! missing key stops startup.
//!
//! ## Examples
//!
//! ```bash
//! OPENAI_API_KEY=sk-... voicechat serve --port 3003 \
//!     --allowed-origin http://localhost:3000 --rate-limit-max 100
//! ```
//!
use crate::common::provider::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::common::provider::ProviderSettings;
use crate::core::config::{self, Config};
use crate::core::error::{ChatError, Result};
use crate::core::router::{RouterSettings, DEFAULT_MAX_TOKENS, DEFAULT_SYSTEM_PROMPT};
use crate::core::rules::KeywordRule;
use anyhow::anyhow;
use axum::http::HeaderValue;
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3003;
/// Origin allowed when none are configured.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
/// Requests admitted per client per window.
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
/// Rate-limit window: 15 minutes.
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;
/// Deadline for one chat reply.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Provider connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// # Serve Command Arguments (`ServeArgs`)
///
/// Flags for `voicechat serve`. Every value is optional so that unset flags
/// fall through to the config file and then to defaults.
#[derive(Parser, Default)]
pub struct ServeArgs {
    /// Path to a TOML config file (skips the project/user config search).
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// IP address to bind to [default: 0.0.0.0].
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to listen on [default: 3003].
    #[arg(long, short, env = "PORT")]
    pub port: Option<u16>,

    /// Allowed CORS origin. Repeat for several origins.
    #[arg(long = "allowed-origin", value_name = "URL")]
    pub allowed_origins: Vec<String>,

    /// Front-end origin, added to the allowed origins.
    #[arg(long, env = "FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// Requests allowed per client within one window [default: 100].
    #[arg(long)]
    pub rate_limit_max: Option<u32>,

    /// Rate-limit window length in seconds [default: 900].
    #[arg(long)]
    pub rate_limit_window_secs: Option<u64>,

    /// Seconds allowed for answering one chat message [default: 30].
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Completion model name [default: gpt-3.5-turbo].
    #[arg(long)]
    pub model: Option<String>,

    /// Completion length bound [default: 150].
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Base URL of the OpenAI-compatible API [default: https://api.openai.com/v1].
    #[arg(long)]
    pub provider_url: Option<String>,

    /// Completion provider API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

// Hand-written so the API key never lands in logs.
impl std::fmt::Debug for ServeArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServeArgs")
            .field("config", &self.config)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("allowed_origins", &self.allowed_origins)
            .field("frontend_url", &self.frontend_url)
            .field("rate_limit_max", &self.rate_limit_max)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("provider_url", &self.provider_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Fixed-window rate limit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window: Duration,
}

/// # Effective Server Configuration (`ServerSettings`)
///
/// The resolved settings after merging flags, environment, config file and
/// defaults.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub rate_limit: RateLimitSettings,
    pub request_timeout: Duration,
    pub provider: ProviderSettings,
    pub router: RouterSettings,
    pub rules: Vec<KeywordRule>,
}

/// Loads the config file named by `args.config` (or discovered) and resolves
/// the final settings.
pub fn load_settings(args: ServeArgs) -> Result<ServerSettings> {
    let file_config = config::load_config(args.config.as_deref())?;
    resolve_settings(args, file_config)
}

/// Merges `args` over `file` over defaults.
///
/// ## Errors
///
/// Returns `ChatError::Config` when the API key is missing or blank, or when
/// an allowed origin is not a valid header value.
pub fn resolve_settings(args: ServeArgs, file: Config) -> Result<ServerSettings> {
    let api_key = args
        .api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            anyhow!(ChatError::Config(
                "OPENAI_API_KEY is not set; the completion provider needs an API key".into()
            ))
        })?;

    let mut allowed_origins = if !args.allowed_origins.is_empty() {
        args.allowed_origins
    } else {
        file.server
            .allowed_origins
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_ALLOWED_ORIGIN.to_string()])
    };
    if let Some(frontend) = args.frontend_url.filter(|url| !url.trim().is_empty()) {
        if !allowed_origins.contains(&frontend) {
            allowed_origins.push(frontend);
        }
    }
    for origin in &allowed_origins {
        HeaderValue::from_str(origin).map_err(|_| {
            anyhow!(ChatError::Config(format!(
                "Allowed origin '{origin}' is not a valid header value"
            )))
        })?;
    }

    let rules = file.effective_rules();
    let max_tokens = args
        .max_tokens
        .or(file.provider.max_tokens)
        .unwrap_or(DEFAULT_MAX_TOKENS);
    if max_tokens == 0 {
        return Err(anyhow!(ChatError::Config("--max-tokens must be greater than zero".into())));
    }
    let rate_limit_max = args
        .rate_limit_max
        .or(file.server.rate_limit_max)
        .unwrap_or(DEFAULT_RATE_LIMIT_MAX);
    if rate_limit_max == 0 {
        return Err(anyhow!(ChatError::Config(
            "--rate-limit-max must be greater than zero".into()
        )));
    }
    let rate_limit_window_secs = args
        .rate_limit_window_secs
        .or(file.server.rate_limit_window_secs)
        .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);
    if rate_limit_window_secs == 0 {
        return Err(anyhow!(ChatError::Config(
            "--rate-limit-window-secs must be greater than zero".into()
        )));
    }
    let request_timeout_secs = args
        .request_timeout_secs
        .or(file.server.request_timeout_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    if request_timeout_secs == 0 {
        return Err(anyhow!(ChatError::Config(
            "--request-timeout-secs must be greater than zero".into()
        )));
    }
    let rate_limit = RateLimitSettings {
        max_requests: rate_limit_max,
        window: Duration::from_secs(rate_limit_window_secs),
    };

    let settings = ServerSettings {
        host: args
            .host
            .or(file.server.host)
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
        port: args.port.or(file.server.port).unwrap_or(DEFAULT_PORT),
        allowed_origins,
        rate_limit,
        request_timeout: Duration::from_secs(request_timeout_secs),
        provider: ProviderSettings {
            base_url: args
                .provider_url
                .or(file.provider.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: args
                .model
                .or(file.provider.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            connect_timeout: Duration::from_secs(
                file.provider
                    .connect_timeout_secs
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
        },
        router: RouterSettings {
            system_prompt: file
                .provider
                .system_prompt
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            max_tokens,
        },
        rules,
    };
    debug!("Resolved server settings: {:?}", settings);
    Ok(settings)
}

#[cfg(test)]
pub(crate) fn sample_settings() -> ServerSettings {
    resolve_settings(
        ServeArgs {
            api_key: Some("sk-test".into()),
            host: Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: Some(0),
            ..Default::default()
        },
        Config::default(),
    )
    .expect("sample settings resolve")
}
