use crate::error::ConfigError;
use crate::types::AppConfig;

impl AppConfig {
    /// Validate the config: context names, topic lists, bus tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_publisher_names()?;
        self.validate_topics()?;
        self.validate_bus_tables()?;
        Ok(())
    }

    /// Publisher names must be non-empty and unique.
    fn validate_publisher_names(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for ctx in &self.publishers {
            if ctx.name.is_empty() {
                return Err(ConfigError::Invalid(
                    "publisher context with empty name".into(),
                ));
            }
            if !seen.insert(ctx.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate publisher context name '{}'",
                    ctx.name
                )));
            }
        }
        Ok(())
    }

    /// Every context must name at least one topic.
    fn validate_topics(&self) -> Result<(), ConfigError> {
        for ctx in &self.publishers {
            if ctx.topics.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "publisher context '{}' has no topics",
                    ctx.name
                )));
            }
        }
        for (index, ctx) in self.subscribers.iter().enumerate() {
            if ctx.topics.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "subscriber context '{}' has no topics",
                    ctx.label(index)
                )));
            }
        }
        Ok(())
    }

    /// Bus sections must be tables. Their contents belong to the client
    /// and are not inspected here.
    fn validate_bus_tables(&self) -> Result<(), ConfigError> {
        for ctx in &self.publishers {
            if !ctx.bus.is_table() {
                return Err(ConfigError::Invalid(format!(
                    "publisher context '{}' bus section is not a table",
                    ctx.name
                )));
            }
        }
        for (index, ctx) in self.subscribers.iter().enumerate() {
            if !ctx.bus.is_table() {
                return Err(ConfigError::Invalid(format!(
                    "subscriber context '{}' bus section is not a table",
                    ctx.label(index)
                )));
            }
        }
        Ok(())
    }
}
