use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::policy::PricingPolicy;

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub pricing: PricingPolicy,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
    pub default_list_code: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://motofleet.db".to_string(), max_connections: 5, timeout_secs: 30 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 8080, graceful_shutdown_secs: 15 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("motofleet.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(pricing) = patch.pricing {
            let policy = &mut self.pricing;
            if let Some(version) = pricing.version {
                policy.version = version;
            }
            if let Some(default_list_code) = pricing.default_list_code {
                policy.default_list_code = default_list_code;
            }
            if let Some(default_markup) = pricing.default_markup {
                policy.default_markup = default_markup;
            }
            if let Some(margin_floor) = pricing.default_margin_floor {
                policy.default_margin_floor = margin_floor;
            }
            if let Some(margin_target) = pricing.default_margin_target {
                policy.default_margin_target = margin_target;
            }
            if let Some(premium_from) = pricing.plan_tier_premium_from {
                policy.plan_tier_premium_from = premium_from;
            }
            if let Some(vip_from) = pricing.plan_tier_vip_from {
                policy.plan_tier_vip_from = vip_from;
            }
            if let Some(exchange_rate) = pricing.exchange_rate {
                policy.exchange_rate = Some(exchange_rate);
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("MOTOFLEET_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("MOTOFLEET_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_env("MOTOFLEET_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("MOTOFLEET_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_env("MOTOFLEET_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("MOTOFLEET_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("MOTOFLEET_SERVER_PORT") {
            self.server.port = parse_env("MOTOFLEET_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("MOTOFLEET_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_env("MOTOFLEET_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("MOTOFLEET_LOGGING_LEVEL").or_else(|| read_env("MOTOFLEET_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("MOTOFLEET_LOGGING_FORMAT").or_else(|| read_env("MOTOFLEET_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        let policy = &mut self.pricing;
        if let Some(value) = read_env("MOTOFLEET_PRICING_VERSION") {
            policy.version = value;
        }
        if let Some(value) = read_env("MOTOFLEET_PRICING_DEFAULT_LIST_CODE") {
            policy.default_list_code = value;
        }
        if let Some(value) = read_env("MOTOFLEET_PRICING_DEFAULT_MARKUP") {
            policy.default_markup = parse_env("MOTOFLEET_PRICING_DEFAULT_MARKUP", &value)?;
        }
        if let Some(value) = read_env("MOTOFLEET_PRICING_DEFAULT_MARGIN_FLOOR") {
            policy.default_margin_floor =
                parse_env("MOTOFLEET_PRICING_DEFAULT_MARGIN_FLOOR", &value)?;
        }
        if let Some(value) = read_env("MOTOFLEET_PRICING_DEFAULT_MARGIN_TARGET") {
            policy.default_margin_target =
                parse_env("MOTOFLEET_PRICING_DEFAULT_MARGIN_TARGET", &value)?;
        }
        if let Some(value) = read_env("MOTOFLEET_PRICING_PLAN_TIER_PREMIUM_FROM") {
            policy.plan_tier_premium_from =
                parse_env("MOTOFLEET_PRICING_PLAN_TIER_PREMIUM_FROM", &value)?;
        }
        if let Some(value) = read_env("MOTOFLEET_PRICING_PLAN_TIER_VIP_FROM") {
            policy.plan_tier_vip_from = parse_env("MOTOFLEET_PRICING_PLAN_TIER_VIP_FROM", &value)?;
        }
        if let Some(value) = read_env("MOTOFLEET_PRICING_EXCHANGE_RATE") {
            policy.exchange_rate =
                Some(parse_env::<Decimal>("MOTOFLEET_PRICING_EXCHANGE_RATE", &value)?);
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(default_list_code) = overrides.default_list_code {
            self.pricing.default_list_code = default_list_code;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        self.pricing
            .validate()
            .map_err(|error| ConfigError::Validation(format!("pricing: {error}")))?;
        Ok(())
    }
}

/// First existing file among the explicit path, `motofleet.toml` and `config/motofleet.toml`.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("motofleet.toml"), PathBuf::from("config/motofleet.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
    pricing: Option<PricingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

/// Decimal knobs are written as strings in the file (`default_markup = "2.5"`).
#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    version: Option<String>,
    default_list_code: Option<String>,
    default_markup: Option<Decimal>,
    default_margin_floor: Option<Decimal>,
    default_margin_target: Option<Decimal>,
    plan_tier_premium_from: Option<Decimal>,
    plan_tier_vip_from: Option<Decimal>,
    exchange_rate: Option<Decimal>,
}
