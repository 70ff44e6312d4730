use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/state.json";
pub const DEFAULT_POLL_SECS: u64 = 60;

/// Server configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    /// Base of generated share and export links.
    pub public_origin: String,
    pub poll_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_path = resolve_data_path(lookup("APP_DATA_PATH"));

        let public_origin = lookup("APP_PUBLIC_ORIGIN")
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        let poll_secs = lookup("REMINDER_POLL_SECS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_SECS)
            .max(1);

        Self {
            port,
            data_path,
            public_origin,
            poll_interval: Duration::from_secs(poll_secs),
        }
    }
}

pub fn resolve_data_path(value: Option<String>) -> PathBuf {
    match value {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_DATA_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("data/state.json"));
        assert_eq!(config.public_origin, "http://localhost:8080");
        assert_eq!(config.poll_interval, Duration::from_secs(60));
    }

    #[test]
    fn values_are_read_and_bad_ones_fall_back() {
        let config = config_from(&[
            ("PORT", "9001"),
            ("APP_DATA_PATH", "/tmp/z.json"),
            ("APP_PUBLIC_ORIGIN", "https://zikir.example/"),
            ("REMINDER_POLL_SECS", "0"),
        ]);
        assert_eq!(config.port, 9001);
        assert_eq!(config.data_path, PathBuf::from("/tmp/z.json"));
        assert_eq!(config.public_origin, "https://zikir.example");
        assert_eq!(config.poll_interval, Duration::from_secs(1));

        let config = config_from(&[("PORT", "http"), ("REMINDER_POLL_SECS", "soon")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
    }
}
