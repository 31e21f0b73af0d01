//! Configuration loader — merges env vars, .env file, and config.toml.

use common::{BoardConfig, Error};
use presence::BusinessHours;
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered != "0" && lowered != "false" && lowered != "no" && lowered != "off"
}

fn validate_config(config: &BoardConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.api_key.trim().is_empty() {
        issues.push("ONLOCATION_API_KEY is required (set in .env or environment)".into());
    }
    if config.api_base_url.trim().is_empty() {
        issues.push("api_base_url must not be empty".into());
    }
    if config.timing.poll_interval_secs == 0 {
        issues.push("timing.poll_interval_secs must be > 0".into());
    }
    if config.timing.stale_threshold_secs == 0 {
        issues.push("timing.stale_threshold_secs must be > 0".into());
    }
    if config.timing.fetch_timeout_secs == 0 {
        issues.push("timing.fetch_timeout_secs must be > 0".into());
    }
    if config.server.bind_addr.parse::<std::net::SocketAddr>().is_err() {
        issues.push(format!(
            "server.bind_addr '{}' is not a valid socket address",
            config.server.bind_addr
        ));
    }
    if let Err(e) = BusinessHours::from_config(&config.schedule) {
        issues.push(e.to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load board configuration from environment and optional config file.
pub fn load_config() -> Result<BoardConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = BoardConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(key) = std::env::var("ONLOCATION_API_KEY") {
        config.api_key = key;
    }
    if let Ok(url) = std::env::var("ONLOCATION_API_URL") {
        config.api_base_url = url;
    }
    if let Ok(raw) = std::env::var("BOARD_DEBUG") {
        config.debug = parse_bool(&raw);
    }
    if let Ok(addr) = std::env::var("BOARD_BIND_ADDR") {
        config.server.bind_addr = addr;
    }
    if let Ok(raw) = std::env::var("POLL_INTERVAL_SECS") {
        config.timing.poll_interval_secs = parse_positive_u64(&raw, "POLL_INTERVAL_SECS")?;
    }
    if let Ok(raw) = std::env::var("STALE_THRESHOLD_SECS") {
        config.timing.stale_threshold_secs = parse_positive_u64(&raw, "STALE_THRESHOLD_SECS")?;
    }
    if let Ok(raw) = std::env::var("FETCH_TIMEOUT_SECS") {
        config.timing.fetch_timeout_secs = parse_positive_u64(&raw, "FETCH_TIMEOUT_SECS")?;
    }
    if let Ok(raw) = std::env::var("SCHEDULE_UTC_OFFSET_HOURS") {
        config.schedule.utc_offset_hours = raw.trim().parse::<i32>().map_err(|_| {
            Error::Config("SCHEDULE_UTC_OFFSET_HOURS must be an integer".into())
        })?;
    }

    // 5. Validate before handing the config to the rest of the app.
    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> BoardConfig {
        BoardConfig {
            api_key: "test-key".into(),
            ..BoardConfig::default()
        }
    }

    #[test]
    fn test_defaults_with_api_key_are_valid() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let config = BoardConfig::default();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let mut config = valid_config();
        config.timing.poll_interval_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.timing.stale_threshold_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_bad_bind_addr_rejected() {
        let mut config = valid_config();
        config.server.bind_addr = "not-an-addr".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_bad_schedule_surfaces_in_validation() {
        let mut config = valid_config();
        config.schedule.hours.insert("mon".into(), [21, 5]);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("YES"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("off"));
    }
}
