use std::path::Path;

use crate::error::ConfigError;
use crate::types::AppConfig;

impl AppConfig {
    /// Parse config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    // ── Environment variable overrides ──────────────────────────────

    /// Apply environment variable overrides.
    ///
    /// Convention: `EDGEBUS_SECTION_KEY` overrides `section.key`.
    /// Examples:
    /// - `EDGEBUS_APP_PUBLISHER` -> `app.publisher`
    /// - `EDGEBUS_APP_DATA_DIR` -> `app.data_dir`
    /// - `EDGEBUS_APP_MESSAGE_FILE` -> `app.message_file`
    /// - `EDGEBUS_APP_INTERVAL_SECS` -> `app.interval_secs`
    /// - `EDGEBUS_APP_SETTLE_MS` -> `app.settle_ms`
    /// - `EDGEBUS_WATCH_PATH` -> `watch.path`
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("EDGEBUS_APP_PUBLISHER") {
            self.app.publisher = v;
        }
        if let Ok(v) = std::env::var("EDGEBUS_APP_DATA_DIR") {
            self.app.data_dir = v.into();
        }
        if let Ok(v) = std::env::var("EDGEBUS_APP_MESSAGE_FILE") {
            self.app.message_file = v;
        }
        if let Ok(v) = std::env::var("EDGEBUS_APP_INTERVAL_SECS") {
            if let Ok(secs) = v.parse::<u64>() {
                self.app.interval_secs = Some(secs);
            }
        }
        if let Ok(v) = std::env::var("EDGEBUS_APP_SETTLE_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                self.app.settle_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("EDGEBUS_WATCH_PATH") {
            self.watch.path = Some(v.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::types::AppConfig;

    const SAMPLE: &str = r#"
        [app]
        publisher = "flowmeter-pub"
        data_dir = "demos/datafiles"
        message_file = "flowmeter.json"
        interval_secs = 5

        [watch]
        path = "config/edgebus.toml"

        [[publishers]]
        name = "flowmeter-pub"
        topics = ["RT/read/flowmeter/PL0/D13"]

        [publishers.bus]
        endpoint = "tcp://127.0.0.1:5555"

        [[subscribers]]
        name = "flowmeter-sub"
        topics = ["RT/read/flowmeter/PL0/D13", "NRT/read/flowmeter/PL1/D02"]

        [subscribers.bus]
        endpoint = "tcp://127.0.0.1:5555"
    "#;

    #[test]
    fn parse_sample_config() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();

        assert_eq!(config.app.publisher, "flowmeter-pub");
        assert_eq!(
            config.app.message_path().to_str().unwrap(),
            "demos/datafiles/flowmeter.json"
        );
        assert_eq!(config.app.interval().unwrap().as_secs(), 5);
        assert_eq!(config.app.settle().as_millis(), 500);

        assert_eq!(config.publishers.len(), 1);
        assert_eq!(config.publishers[0].topics().len(), 1);
        assert_eq!(config.subscribers.len(), 1);
        assert_eq!(config.subscribers[0].topics().len(), 2);

        assert_eq!(
            config.watch.path.as_deref().unwrap().to_str().unwrap(),
            "config/edgebus.toml"
        );
        assert!(config.watch.prefix.is_none());
    }

    #[test]
    fn interval_is_optional() {
        let config = AppConfig::from_toml(
            r#"
            [app]
            publisher = "p"

            [[publishers]]
            name = "p"
            topics = ["telemetry/plant0"]

            [publishers.bus]
            endpoint = "tcp://127.0.0.1:5555"
            "#,
        )
        .unwrap();
        assert!(config.app.interval().is_none());
    }

    #[test]
    fn bus_table_is_carried_verbatim() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        let bus = config.publishers[0].bus_config();
        // The config layer never interprets the table, it only carries it.
        assert_eq!(
            bus.get("endpoint").and_then(|v| v.as_str()),
            Some("tcp://127.0.0.1:5555")
        );
    }

    #[test]
    fn env_overrides_take_precedence() {
        // Single test for all override keys: env mutation must not race
        // with other tests.
        std::env::set_var("EDGEBUS_APP_PUBLISHER", "env-pub");
        std::env::set_var("EDGEBUS_APP_INTERVAL_SECS", "30");
        std::env::set_var("EDGEBUS_WATCH_PATH", "/etc/edgebus/override.toml");

        let mut config: AppConfig = toml::from_str(SAMPLE).unwrap();
        config.apply_env_overrides();

        assert_eq!(config.app.publisher, "env-pub");
        assert_eq!(config.app.interval_secs, Some(30));
        assert_eq!(
            config.watch.path.as_deref().unwrap().to_str().unwrap(),
            "/etc/edgebus/override.toml"
        );

        std::env::remove_var("EDGEBUS_APP_PUBLISHER");
        std::env::remove_var("EDGEBUS_APP_INTERVAL_SECS");
        std::env::remove_var("EDGEBUS_WATCH_PATH");
    }
}
