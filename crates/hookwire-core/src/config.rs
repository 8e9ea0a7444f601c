//! Wiring configuration model.
//!
//! A pre-parsed tree of wiring declarations. The serde field names mirror the
//! external schema:
//!
//! ```toml
//! throwOnErrors = false
//!
//! [locator]
//! qualifiedClassName = "app.Locator"
//! methodName = "Resolve"
//!
//! [[events]]
//! producer = { qualifiedClassName = "app.Thermometer", eventName = "Changed" }
//! consumers = [
//!     { qualifiedClassName = "app.Display", methodName = "OnChanged" },
//!     { qualifiedClassName = "app.Logger", findInstance = false },
//! ]
//! ```
//!
//! Collections keep declaration order. Natural keys are `type.event` for
//! events and `type.method` for consumers; the builder helpers reject
//! duplicates and [`WiringConfig::duplicate_keys`] reports them for
//! configurations that arrived through deserialization.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Role, WiringError, WiringResult};

/// Consumer method name standing for the type's designated default handler.
pub const AUTOWIRED_METHOD_NAME: &str = "autowired";

fn default_true() -> bool {
    true
}

fn default_method_name() -> String {
    AUTOWIRED_METHOD_NAME.to_string()
}

// =============================================================================
// Root
// =============================================================================

/// A complete wiring declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiringConfig {
    /// Abort construction on the first error instead of logging and skipping.
    #[serde(rename = "throwOnErrors", default)]
    pub strict_on_errors: bool,

    /// Fallback locator used when no resolver is passed to the dispatcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<LocatorRef>,

    /// Event wirings in declaration order.
    #[serde(default)]
    pub events: Vec<EventWiring>,
}

impl WiringConfig {
    /// Creates an empty, permissive configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strictness flag.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_on_errors = strict;
        self
    }

    /// Sets the fallback locator.
    pub fn with_locator(mut self, locator: LocatorRef) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Appends an event wiring, rejecting a duplicate producer key.
    pub fn push_event(&mut self, event: EventWiring) -> WiringResult<()> {
        let key = event.producer.key();
        if self.events.iter().any(|e| e.producer.key() == key) {
            return Err(WiringError::DuplicateWiringKey {
                role: Role::Producer,
                key,
            });
        }
        self.events.push(event);
        Ok(())
    }

    /// Builder form of [`push_event`](Self::push_event).
    pub fn event(mut self, event: EventWiring) -> WiringResult<Self> {
        self.push_event(event)?;
        Ok(self)
    }

    /// Every duplicated event or consumer key, in declaration order.
    pub fn duplicate_keys(&self) -> Vec<WiringError> {
        let mut errors = Vec::new();
        let mut events = HashSet::new();
        for event in &self.events {
            let key = event.producer.key();
            if !events.insert(key.clone()) {
                errors.push(WiringError::DuplicateWiringKey {
                    role: Role::Producer,
                    key,
                });
            }
            errors.extend(event.duplicate_keys());
        }
        errors
    }
}

/// Symbolic reference to a public static `(TypeDescriptor) -> Instance` function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorRef {
    /// Qualified name of the declaring type.
    #[serde(rename = "qualifiedClassName")]
    pub type_name: String,

    /// Name of the locator function.
    #[serde(rename = "methodName")]
    pub method_name: String,
}

impl LocatorRef {
    /// Creates a locator reference.
    pub fn new(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
        }
    }

    /// `type.method`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.type_name, self.method_name)
    }
}

// =============================================================================
// Events
// =============================================================================

/// One producer event and the consumers wired to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWiring {
    /// The event source.
    pub producer: ProducerRef,

    /// Handlers in declaration order.
    #[serde(default)]
    pub consumers: Vec<ConsumerRef>,
}

impl EventWiring {
    /// Creates a wiring with no consumers.
    pub fn new(producer: ProducerRef) -> Self {
        Self {
            producer,
            consumers: Vec::new(),
        }
    }

    /// Appends a consumer, rejecting a duplicate consumer key.
    pub fn push_consumer(&mut self, consumer: ConsumerRef) -> WiringResult<()> {
        let key = consumer.key();
        if self.consumers.iter().any(|c| c.key() == key) {
            return Err(WiringError::DuplicateWiringKey {
                role: Role::Consumer,
                key,
            });
        }
        self.consumers.push(consumer);
        Ok(())
    }

    /// Builder form of [`push_consumer`](Self::push_consumer).
    pub fn consumer(mut self, consumer: ConsumerRef) -> WiringResult<Self> {
        self.push_consumer(consumer)?;
        Ok(self)
    }

    /// Every duplicated consumer key of this event.
    pub fn duplicate_keys(&self) -> Vec<WiringError> {
        let mut seen = HashSet::new();
        self.consumers
            .iter()
            .map(ConsumerRef::key)
            .filter(|key| !seen.insert(key.clone()))
            .map(|key| WiringError::DuplicateWiringKey {
                role: Role::Consumer,
                key,
            })
            .collect()
    }
}

/// Symbolic reference to a producer event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerRef {
    /// Qualified name of the producer type.
    #[serde(rename = "qualifiedClassName")]
    pub type_name: String,

    /// Name of the event.
    #[serde(rename = "eventName")]
    pub event_name: String,

    /// Ask the resolver for a producer instance.
    #[serde(rename = "findInstance", default = "default_true")]
    pub find_instance: bool,
}

impl ProducerRef {
    /// References an instance event; the instance comes from the resolver.
    pub fn new(type_name: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            event_name: event_name.into(),
            find_instance: true,
        }
    }

    /// References a static event.
    pub fn static_member(type_name: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self {
            find_instance: false,
            ..Self::new(type_name, event_name)
        }
    }

    /// `type.event`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.type_name, self.event_name)
    }
}

/// Symbolic reference to a consumer handler method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerRef {
    /// Qualified name of the consumer type.
    #[serde(rename = "qualifiedClassName")]
    pub type_name: String,

    /// Name of the handler method; `"autowired"` selects the default handler.
    #[serde(rename = "methodName", default = "default_method_name")]
    pub method_name: String,

    /// Ask the resolver for a consumer instance.
    #[serde(rename = "findInstance", default = "default_true")]
    pub find_instance: bool,
}

impl ConsumerRef {
    /// References an instance handler method.
    pub fn new(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
            find_instance: true,
        }
    }

    /// References the designated default handler of an instance consumer.
    pub fn autowired(type_name: impl Into<String>) -> Self {
        Self::new(type_name, AUTOWIRED_METHOD_NAME)
    }

    /// References a static handler method.
    pub fn static_member(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            find_instance: false,
            ..Self::new(type_name, method_name)
        }
    }

    /// `type.method`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.type_name, self.method_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: WiringConfig = serde_json::from_str(
            r#"{
                "events": [{
                    "producer": { "qualifiedClassName": "app.P", "eventName": "Changed" },
                    "consumers": [{ "qualifiedClassName": "app.C" }]
                }]
            }"#,
        )
        .unwrap();

        assert!(!config.strict_on_errors);
        assert!(config.locator.is_none());
        let event = &config.events[0];
        assert!(event.producer.find_instance);
        assert_eq!(event.consumers[0].method_name, AUTOWIRED_METHOD_NAME);
        assert!(event.consumers[0].find_instance);
    }

    #[test]
    fn test_deserialize_external_names() {
        let config: WiringConfig = serde_json::from_str(
            r#"{
                "throwOnErrors": true,
                "locator": { "qualifiedClassName": "app.Locator", "methodName": "Resolve" },
                "events": [{
                    "producer": { "qualifiedClassName": "app.P", "eventName": "Tick", "findInstance": false },
                    "consumers": []
                }]
            }"#,
        )
        .unwrap();

        assert!(config.strict_on_errors);
        assert_eq!(config.locator, Some(LocatorRef::new("app.Locator", "Resolve")));
        assert_eq!(config.events[0].producer, ProducerRef::static_member("app.P", "Tick"));
        assert!(config.events[0].consumers.is_empty());
    }

    #[test]
    fn test_serialize_round_trips_names() {
        let config = WiringConfig::new()
            .event(EventWiring::new(ProducerRef::new("app.P", "Changed")))
            .unwrap();
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["throwOnErrors"], false);
        assert!(json.get("locator").is_none());
        assert_eq!(json["events"][0]["producer"]["eventName"], "Changed");
    }

    #[test]
    fn test_builders_reject_duplicate_keys() {
        let mut event = EventWiring::new(ProducerRef::new("app.P", "Changed"));
        event.push_consumer(ConsumerRef::new("app.C", "OnChanged")).unwrap();
        let err = event
            .push_consumer(ConsumerRef::static_member("app.C", "OnChanged"))
            .unwrap_err();
        assert_eq!(
            err,
            WiringError::DuplicateWiringKey {
                role: Role::Consumer,
                key: "app.C.OnChanged".to_string(),
            }
        );

        let mut config = WiringConfig::new();
        config.push_event(event.clone()).unwrap();
        let err = config.push_event(event).unwrap_err();
        assert_eq!(err.kind(), "DuplicateWiringKey");
        assert_eq!(config.events.len(), 1);
    }

    #[test]
    fn test_duplicate_keys_reports_deserialized_duplicates() {
        let config: WiringConfig = serde_json::from_str(
            r#"{
                "events": [
                    { "producer": { "qualifiedClassName": "app.P", "eventName": "A" },
                      "consumers": [{ "qualifiedClassName": "app.C" }, { "qualifiedClassName": "app.C" }] },
                    { "producer": { "qualifiedClassName": "app.P", "eventName": "A" } }
                ]
            }"#,
        )
        .unwrap();

        let keys: Vec<String> = config.duplicate_keys().iter().map(|e| e.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "duplicate consumer wiring key 'app.C.autowired'",
                "duplicate producer wiring key 'app.P.A'",
            ]
        );
    }
}
