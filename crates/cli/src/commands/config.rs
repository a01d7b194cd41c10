use std::env;
use std::fs;
use std::path::Path;

use motofleet_core::config::{resolve_config_path, AppConfig};
use toml::Value;

use crate::commands::{load_config, CommandResult};

/// One effective setting with the key it is read from in the file and in the environment.
struct Setting {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = config_file_path.as_deref().and_then(load_config_file_doc);

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for setting in settings(&config) {
        let source = field_source(
            setting.key_path,
            setting.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", setting.key_path, setting.value));
    }

    CommandResult::success("config", lines.join("\n"))
}

fn settings(config: &AppConfig) -> Vec<Setting> {
    let pricing = &config.pricing;
    vec![
        setting("database.url", &["MOTOFLEET_DATABASE_URL"], &config.database.url),
        setting(
            "database.max_connections",
            &["MOTOFLEET_DATABASE_MAX_CONNECTIONS"],
            config.database.max_connections,
        ),
        setting(
            "database.timeout_secs",
            &["MOTOFLEET_DATABASE_TIMEOUT_SECS"],
            config.database.timeout_secs,
        ),
        setting(
            "server.bind_address",
            &["MOTOFLEET_SERVER_BIND_ADDRESS"],
            &config.server.bind_address,
        ),
        setting("server.port", &["MOTOFLEET_SERVER_PORT"], config.server.port),
        setting(
            "server.graceful_shutdown_secs",
            &["MOTOFLEET_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            config.server.graceful_shutdown_secs,
        ),
        setting(
            "logging.level",
            &["MOTOFLEET_LOGGING_LEVEL", "MOTOFLEET_LOG_LEVEL"],
            &config.logging.level,
        ),
        setting(
            "logging.format",
            &["MOTOFLEET_LOGGING_FORMAT", "MOTOFLEET_LOG_FORMAT"],
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
        ),
        setting("pricing.version", &["MOTOFLEET_PRICING_VERSION"], &pricing.version),
        setting(
            "pricing.default_list_code",
            &["MOTOFLEET_PRICING_DEFAULT_LIST_CODE"],
            &pricing.default_list_code,
        ),
        setting(
            "pricing.default_markup",
            &["MOTOFLEET_PRICING_DEFAULT_MARKUP"],
            pricing.default_markup,
        ),
        setting(
            "pricing.default_margin_floor",
            &["MOTOFLEET_PRICING_DEFAULT_MARGIN_FLOOR"],
            pricing.default_margin_floor,
        ),
        setting(
            "pricing.default_margin_target",
            &["MOTOFLEET_PRICING_DEFAULT_MARGIN_TARGET"],
            pricing.default_margin_target,
        ),
        setting(
            "pricing.plan_tier_premium_from",
            &["MOTOFLEET_PRICING_PLAN_TIER_PREMIUM_FROM"],
            pricing.plan_tier_premium_from,
        ),
        setting(
            "pricing.plan_tier_vip_from",
            &["MOTOFLEET_PRICING_PLAN_TIER_VIP_FROM"],
            pricing.plan_tier_vip_from,
        ),
        setting(
            "pricing.exchange_rate",
            &["MOTOFLEET_PRICING_EXCHANGE_RATE"],
            pricing.exchange_rate.map_or_else(|| "<unset>".to_string(), |rate| rate.to_string()),
        ),
    ]
}

fn setting(
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: impl ToString,
) -> Setting {
    Setting { key_path, env_keys, value: value.to_string() }
}

fn load_config_file_doc(path: &Path) -> Option<Value> {
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use toml::Value;

    use super::{contains_path, field_source};

    fn doc() -> Value {
        "[pricing]\ndefault_list_code = \"MAYORISTA\"\n".parse::<Value>().expect("toml")
    }

    #[test]
    fn nested_keys_are_found_in_file_document() {
        assert!(contains_path(&doc(), "pricing.default_list_code"));
        assert!(!contains_path(&doc(), "pricing.default_markup"));
        assert!(!contains_path(&doc(), "server.port"));
    }

    #[test]
    fn file_source_is_reported_with_its_path() {
        let source = field_source(
            "pricing.default_list_code",
            &["MOTOFLEET_TEST_UNSET_KEY"],
            Some(&doc()),
            Some(Path::new("config/motofleet.toml")),
        );

        assert_eq!(source, "file (config/motofleet.toml)");
    }

    #[test]
    fn absent_keys_fall_back_to_default_source() {
        let source =
            field_source("server.port", &["MOTOFLEET_TEST_UNSET_KEY"], Some(&doc()), None);

        assert_eq!(source, "default");
    }
}
