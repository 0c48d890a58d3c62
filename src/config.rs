//! Startup configuration: an optional `config.json` with environment
//! overrides layered on top.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use actix_web::http::Uri;
use serde::Deserialize;

use crate::dom::Selector;
use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_ENDPOINT: &str = "http://localhost/api";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 256 * 1024;
pub const DEFAULT_TEMPLATES: &str = "templates/*.html";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the messages are fetched from on every page load.
    pub endpoint: String,
    /// Container element that receives the list items.
    pub container: Selector,
    pub bind_addr: String,
    /// HTML-escape usernames and messages before insertion.
    pub escape_markup: bool,
    pub fetch_timeout_secs: u64,
    pub body_limit_bytes: usize,
    /// Glob handed to tera.
    pub templates: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            container: Selector::new(Some("ul"), "messages"),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            escape_markup: true,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            templates: DEFAULT_TEMPLATES.to_string(),
        }
    }
}

impl Config {
    /// Read `path` if it exists, apply the process environment, validate.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        Config::load_with(path, |var| std::env::var(var).ok())
    }

    /// [`Config::load`] with the environment supplied by `lookup`.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match fs::read_to_string(path) {
            Ok(raw) => Config::from_json(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Config::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Config, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Override fields from `lookup`, which maps a variable name to its
    /// value. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("MESSAGES_ENDPOINT") {
            self.endpoint = v;
        }
        if let Some(v) = get("MESSAGES_CONTAINER") {
            self.container = v.parse()?;
        }
        if let Some(v) = get("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = get("TEMPLATES_GLOB") {
            self.templates = v;
        }
        if let Some(v) = get("ESCAPE_MARKUP") {
            self.escape_markup = parse_bool("ESCAPE_MARKUP", &v)?;
        }
        if let Some(v) = get("FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = parse_num("FETCH_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("FETCH_BODY_LIMIT") {
            self.body_limit_bytes = parse_num("FETCH_BODY_LIMIT", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let uri = self
            .endpoint
            .parse::<Uri>()
            .map_err(|e| ConfigError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;
        match uri.scheme_str() {
            Some("http") if uri.host().is_some() => {}
            _ => {
                return Err(ConfigError::InvalidEndpoint {
                    endpoint: self.endpoint.clone(),
                    reason: "expected an absolute http URL".to_string(),
                })
            }
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "fetch_timeout_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}

fn parse_num<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}
