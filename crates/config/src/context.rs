//! Context lookup: the call surface the driver binaries consume.

use crate::error::ConfigError;
use crate::types::{AppConfig, PublisherContext, SubscriberContext};

impl AppConfig {
    /// Look up a publisher context by name.
    pub fn publisher_by_name(&self, name: &str) -> Result<&PublisherContext, ConfigError> {
        self.publishers
            .iter()
            .find(|ctx| ctx.name == name)
            .ok_or_else(|| ConfigError::UnknownPublisher(name.to_string()))
    }

    /// Number of configured subscriber contexts.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Look up a subscriber context by index.
    pub fn subscriber_by_index(&self, index: usize) -> Result<&SubscriberContext, ConfigError> {
        self.subscribers
            .get(index)
            .ok_or(ConfigError::SubscriberIndex(index))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ConfigError;
    use crate::types::AppConfig;

    fn sample() -> AppConfig {
        AppConfig::from_toml(
            r#"
            [app]
            publisher = "beta"

            [[publishers]]
            name = "alpha"
            topics = ["telemetry/a"]
            [publishers.bus]
            endpoint = "tcp://127.0.0.1:5555"

            [[publishers]]
            name = "beta"
            topics = ["telemetry/b"]
            [publishers.bus]
            endpoint = "tcp://127.0.0.1:5556"

            [[subscribers]]
            topics = ["telemetry/a"]
            [subscribers.bus]
            endpoint = "tcp://127.0.0.1:5555"

            [[subscribers]]
            name = "named-sub"
            topics = ["telemetry/b"]
            [subscribers.bus]
            endpoint = "tcp://127.0.0.1:5556"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn publisher_lookup_by_name() {
        let config = sample();
        let ctx = config.publisher_by_name("beta").unwrap();
        assert_eq!(ctx.topics(), ["telemetry/b"]);

        assert!(matches!(
            config.publisher_by_name("missing"),
            Err(ConfigError::UnknownPublisher(name)) if name == "missing"
        ));
    }

    #[test]
    fn subscriber_lookup_by_index() {
        let config = sample();
        assert_eq!(config.subscriber_count(), 2);

        assert_eq!(config.subscriber_by_index(0).unwrap().label(0), "subscriber-0");
        assert_eq!(config.subscriber_by_index(1).unwrap().label(1), "named-sub");

        assert!(matches!(
            config.subscriber_by_index(2),
            Err(ConfigError::SubscriberIndex(2))
        ));
    }
}
