//! Configuration validation utilities.

use hookwire_core::{WiringConfig, WiringError};

use super::error::{ConfigError, ConfigResult};
use super::schema::{HookwireConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HookwireConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    for (name, section) in &config.sections {
        validate_wiring(name, section)?;
    }
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "File log output requires logging.file_path",
        ));
    }
    Ok(())
}

/// Validates one wiring section.
///
/// Names must be present and free of whitespace; event keys and the consumer
/// keys of each event must be unique.
pub fn validate_wiring(section: &str, config: &WiringConfig) -> ConfigResult<()> {
    if let Some(locator) = &config.locator {
        validate_name(&format!("{section}.locator.qualifiedClassName"), &locator.type_name)?;
        validate_name(&format!("{section}.locator.methodName"), &locator.method_name)?;
    }

    for (i, event) in config.events.iter().enumerate() {
        let producer = format!("{section}.events[{i}].producer");
        validate_name(&format!("{producer}.qualifiedClassName"), &event.producer.type_name)?;
        validate_name(&format!("{producer}.eventName"), &event.producer.event_name)?;

        for (j, consumer) in event.consumers.iter().enumerate() {
            let consumer_path = format!("{section}.events[{i}].consumers[{j}]");
            validate_name(&format!("{consumer_path}.qualifiedClassName"), &consumer.type_name)?;
            validate_name(&format!("{consumer_path}.methodName"), &consumer.method_name)?;
        }
    }

    if let Some(WiringError::DuplicateWiringKey { key, .. }) = config.duplicate_keys().into_iter().next() {
        return Err(ConfigError::DuplicateWiringKey {
            section: section.to_string(),
            key,
        });
    }

    Ok(())
}

/// Validates a qualified type or member name.
fn validate_name(field: &str, value: &str) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(ConfigError::missing_field(field));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "{field} cannot contain whitespace: '{value}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookwire_core::{ConsumerRef, EventWiring, LocatorRef, ProducerRef};

    fn event(type_name: &str, consumers: &[&str]) -> EventWiring {
        let mut event = EventWiring::new(ProducerRef::new(type_name, "Changed"));
        event.consumers = consumers.iter().map(|c| ConsumerRef::autowired(*c)).collect();
        event
    }

    #[test]
    fn test_validate_empty_config() {
        assert!(validate_config(&HookwireConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_file_output_requires_path() {
        let mut config = HookwireConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        config.logging.file_path = Some("hookwire.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_missing_and_malformed_names() {
        let mut wiring = WiringConfig::new();
        wiring.events = vec![event("app.P", &["app.C", ""])];
        let err = validate_wiring("eventConfig", &wiring).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField { ref field }
                if field == "eventConfig.events[0].consumers[1].qualifiedClassName"
        ));

        let wiring = WiringConfig::new().with_locator(LocatorRef::new("app.Locator", "Re solve"));
        assert!(matches!(
            validate_wiring("eventConfig", &wiring),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_duplicate_keys() {
        let mut wiring = WiringConfig::new();
        wiring.events = vec![event("app.P", &["app.C"]), event("app.P", &["app.D"])];
        let config = HookwireConfig::default().with_section("eventConfig", wiring);

        let err = validate_config(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Duplicate wiring key in section 'eventConfig': app.P.Changed"
        );

        let mut wiring = WiringConfig::new();
        wiring.events = vec![event("app.P", &["app.C", "app.C"])];
        assert!(matches!(
            validate_wiring("other", &wiring),
            Err(ConfigError::DuplicateWiringKey { ref key, .. }) if key == "app.C.autowired"
        ));
    }
}
