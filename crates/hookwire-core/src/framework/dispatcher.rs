//! Wiring dispatcher.
//!
//! The [`Dispatcher`] runs the resolution pipeline over a whole
//! [`WiringConfig`] and owns the resulting hooks:
//!
//! 1. The resolver is the caller's, or one synthesized from the configured locator
//! 2. Each event is processed in declaration order; empty events are skipped
//! 3. The producer is resolved once per event, then every consumer independently
//! 4. Each resolved pair becomes a [`Hook`], usable or not
//!
//! Failures are logged and skip their unit, or abort construction with a
//! [`DispatcherError`] when the configuration is strict.
//!
//! ```rust,ignore
//! use hookwire_core::{Dispatcher, TypeRegistry, WiringConfig};
//!
//! let registry = TypeRegistry::collect();
//! let mut dispatcher = Dispatcher::new(&config, &registry, Some(resolver))?;
//!
//! dispatcher.attach_all();
//! // ... events now reach their consumers ...
//! dispatcher.detach_all();
//! ```

use std::collections::HashSet;
use std::fmt;

use tracing::{Level, debug, error, info, span, warn};

use super::hook::{Hook, HookState};
use super::locator::synthesize_resolver;
use super::pipeline::{resolve_consumer, resolve_producer};
use super::policy::Policy;
use crate::config::{EventWiring, WiringConfig};
use crate::error::{DispatcherError, DispatcherResult, Role, WiringError, WiringResult};
use crate::foundation::Resolver;
use crate::registry::TypeRegistry;

/// Counts of one batch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// Hooks for which the operation succeeded.
    pub succeeded: usize,
    /// Hooks for which it failed.
    pub failed: usize,
}

/// Snapshot of the hooks owned by a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatcherStats {
    /// All constructed hooks, usable or not.
    pub total: usize,
    /// Hooks with an adapted handler.
    pub usable: usize,
    /// Hooks currently attached.
    pub attached: usize,
}

impl fmt::Display for DispatcherStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hooks ({} usable, {} attached)",
            self.total, self.usable, self.attached
        )
    }
}

/// Owns every hook built from one configuration.
///
/// Hooks are not detached when the dispatcher is dropped; call
/// [`detach_all`](Self::detach_all) first.
pub struct Dispatcher {
    hooks: Vec<Hook>,
    strict: bool,
}

impl Dispatcher {
    /// Resolves `config` against `registry` and builds all hooks.
    ///
    /// A `resolver` passed here always takes precedence over the configured
    /// locator. In permissive mode this never fails.
    pub fn new(
        config: &WiringConfig,
        registry: &TypeRegistry,
        resolver: Option<Resolver>,
    ) -> DispatcherResult<Self> {
        let policy = Policy::new(config.strict_on_errors);
        let span = span!(Level::DEBUG, "wiring", strict = policy.is_strict());
        let _enter = span.enter();

        let resolver = match (resolver, &config.locator) {
            (Some(resolver), locator) => {
                if let Some(locator) = locator {
                    debug!(locator = %locator.key(), "Resolver passed; configured locator is not used");
                }
                Some(resolver)
            }
            (None, Some(locator)) => policy
                .settle(synthesize_resolver(registry, locator))
                .map_err(|cause| {
                    DispatcherError::new(
                        format!("Error while loading locator {}.", locator.key()),
                        cause,
                    )
                })?,
            (None, None) => None,
        };

        let mut builder = HookBuilder {
            registry,
            resolver: resolver.as_ref(),
            policy,
            hooks: Vec::new(),
            events: HashSet::new(),
        };
        for event in &config.events {
            if let Err(cause) = builder.process(event) {
                let message = format!("Error while processing {} event.", event.producer.key());
                error!("{message}");
                return Err(DispatcherError::new(message, cause));
            }
        }

        let dispatcher = Self {
            hooks: builder.hooks,
            strict: policy.is_strict(),
        };
        info!("{}", dispatcher.summary());
        Ok(dispatcher)
    }

    /// Summary logged after construction; both counts come from the hook list.
    fn summary(&self) -> String {
        format!(
            "Loaded definitions of {} hooks, {} have been created successfully",
            self.hook_count(),
            self.usable_hook_count()
        )
    }

    /// Attaches every usable hook in declaration order.
    pub fn attach_all(&mut self) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for hook in self.hooks.iter_mut().filter(|h| h.is_usable()) {
            if hook.attach() {
                debug!(hook = %hook.debug_name(), "Hook attached");
                outcome.succeeded += 1;
            } else {
                warn!(hook = %hook.debug_name(), "Hook could not be attached");
                outcome.failed += 1;
            }
        }
        outcome
    }

    /// Detaches every usable hook in declaration order.
    pub fn detach_all(&mut self) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for hook in self.hooks.iter_mut().filter(|h| h.is_usable()) {
            if hook.detach() {
                debug!(hook = %hook.debug_name(), "Hook detached");
                outcome.succeeded += 1;
            } else {
                warn!(hook = %hook.debug_name(), "Hook could not be detached");
                outcome.failed += 1;
            }
        }
        outcome
    }

    /// Number of constructed hooks, usable or not.
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Number of usable hooks.
    pub fn usable_hook_count(&self) -> usize {
        self.hooks.iter().filter(|h| h.is_usable()).count()
    }

    /// Current hook counts.
    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            total: self.hook_count(),
            usable: self.usable_hook_count(),
            attached: self
                .hooks
                .iter()
                .filter(|h| h.state() == HookState::Attached)
                .count(),
        }
    }

    /// Whether the configuration was strict.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The hooks in declaration order.
    pub fn hooks(&self) -> impl Iterator<Item = &Hook> {
        self.hooks.iter()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("stats", &self.stats())
            .field("strict", &self.strict)
            .finish()
    }
}

// =============================================================================
// Construction
// =============================================================================

struct HookBuilder<'a> {
    registry: &'a TypeRegistry,
    resolver: Option<&'a Resolver>,
    policy: Policy,
    hooks: Vec<Hook>,
    events: HashSet<String>,
}

impl HookBuilder<'_> {
    /// Builds the hooks of one event. Only escalated errors are returned.
    fn process(&mut self, event: &EventWiring) -> WiringResult<()> {
        let key = event.producer.key();
        if event.consumers.is_empty() {
            warn!(event = %key, "Event has no consumers and is skipped");
            return Ok(());
        }

        if !self.events.insert(key.clone()) {
            self.policy.settle::<()>(Err(WiringError::DuplicateWiringKey {
                role: Role::Producer,
                key,
            }))?;
            return Ok(());
        }

        let Some(producer) =
            self.policy
                .settle(resolve_producer(self.registry, &event.producer, self.resolver))?
        else {
            return Ok(());
        };

        let mut consumers = HashSet::new();
        for consumer_ref in &event.consumers {
            let consumer_key = consumer_ref.key();
            if !consumers.insert(consumer_key.clone()) {
                self.policy.settle::<()>(Err(WiringError::DuplicateWiringKey {
                    role: Role::Consumer,
                    key: consumer_key,
                }))?;
                continue;
            }

            let Some(consumer) =
                self.policy
                    .settle(resolve_consumer(self.registry, consumer_ref, self.resolver))?
            else {
                continue;
            };

            let bound = Hook::adapt(&producer.member, &consumer.member, consumer.instance.as_ref());
            let bound = match bound {
                Ok(handler) => Some(handler),
                Err(err) => {
                    self.policy.settle::<()>(Err(err))?;
                    None
                }
            };
            self.hooks.push(Hook::new(producer.clone(), consumer, bound));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::{ConsumerRef, LocatorRef, ProducerRef};
    use crate::foundation::{EventSource, Instance, resolver};
    use crate::registry::TypeEntry;

    // =========================================================================
    // Fixtures
    // =========================================================================

    struct Thermometer {
        changed: EventSource<f64>,
    }

    impl Thermometer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                changed: EventSource::new(),
            })
        }

        fn set(&self, value: f64) {
            self.changed.raise(Some(self as &dyn Any), &value);
        }
    }

    #[derive(Default)]
    struct Display {
        shown: AtomicUsize,
    }

    impl Display {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn shown(&self) -> usize {
            self.shown.load(Ordering::SeqCst)
        }
    }

    struct Locator;

    fn thermometer_entry() -> TypeEntry {
        TypeEntry::builder::<Thermometer>("app.Thermometer")
            .event("Changed", |t: &Thermometer| &t.changed)
            .build()
    }

    fn display_entry() -> TypeEntry {
        TypeEntry::builder::<Display>("app.Display")
            .handler("OnChanged", |d: &Display, _: Option<&dyn Any>, _: &f64| {
                d.shown.fetch_add(1, Ordering::SeqCst);
            })
            .handler("OnText", |_: &Display, _: Option<&dyn Any>, _: &String| {})
            .autowired("OnChanged")
            .build()
    }

    fn registry() -> TypeRegistry {
        TypeRegistry::builder()
            .register(thermometer_entry())
            .register(display_entry())
            .build()
    }

    fn resolver_for(thermometer: &Arc<Thermometer>, display: &Arc<Display>) -> Resolver {
        let thermometer: Instance = thermometer.clone();
        let display: Instance = display.clone();
        resolver(move |t| {
            if t.is::<Thermometer>() {
                Some(Arc::clone(&thermometer))
            } else if t.is::<Display>() {
                Some(Arc::clone(&display))
            } else {
                None
            }
        })
    }

    fn single(producer: ProducerRef, consumer: ConsumerRef) -> EventWiring {
        EventWiring::new(producer).consumer(consumer).unwrap()
    }

    fn changed_to(method: &str) -> EventWiring {
        single(
            ProducerRef::new("app.Thermometer", "Changed"),
            ConsumerRef::new("app.Display", method),
        )
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    #[test]
    fn test_round_trip_fires_once_then_never() {
        let thermometer = Thermometer::new();
        let display = Display::new();
        let config = WiringConfig::new().event(changed_to("OnChanged")).unwrap();

        let mut dispatcher =
            Dispatcher::new(&config, &registry(), Some(resolver_for(&thermometer, &display)))
                .unwrap();
        assert_eq!(dispatcher.hook_count(), 1);
        assert_eq!(
            dispatcher.hooks().next().unwrap().debug_name(),
            "app.Thermometer (Changed) += app.Display (OnChanged)"
        );

        let outcome = dispatcher.attach_all();
        assert_eq!(outcome, BatchOutcome { succeeded: 1, failed: 0 });
        thermometer.set(21.5);
        assert_eq!(display.shown(), 1);

        dispatcher.detach_all();
        thermometer.set(22.0);
        assert_eq!(display.shown(), 1);
        assert_eq!(thermometer.changed.handler_count(), 0);
    }

    #[test]
    fn test_static_producer_and_consumer_without_instances() {
        static TICKED: EventSource<u64> = EventSource::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&ticks);

        struct Clock;
        struct Log;
        let registry = TypeRegistry::builder()
            .register(
                TypeEntry::builder::<Clock>("app.Clock")
                    .static_event("Ticked", || &TICKED)
                    .build(),
            )
            .register(
                TypeEntry::builder::<Log>("app.Log")
                    .static_handler("OnTick", move |_: Option<&dyn Any>, _: &u64| {
                        counted.fetch_add(1, Ordering::SeqCst);
                    })
                    .build(),
            )
            .build();
        let config = WiringConfig::new()
            .strict(true)
            .event(single(
                ProducerRef::static_member("app.Clock", "Ticked"),
                ConsumerRef::static_member("app.Log", "OnTick"),
            ))
            .unwrap();

        let mut dispatcher = Dispatcher::new(&config, &registry, None).unwrap();
        assert_eq!(dispatcher.attach_all().succeeded, 1);
        TICKED.raise(None, &1);
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        assert_eq!(dispatcher.detach_all().succeeded, 1);
        TICKED.raise(None, &2);
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_locator_supplies_both_instances() {
        let thermometer = Thermometer::new();
        let display = Display::new();
        let locate = resolver_for(&thermometer, &display);

        let registry = TypeRegistry::builder()
            .register(thermometer_entry())
            .register(display_entry())
            .register(
                TypeEntry::builder::<Locator>("app.Locator")
                    .static_locator("Resolve", move |t| locate(t))
                    .build(),
            )
            .build();
        let config = WiringConfig::new()
            .with_locator(LocatorRef::new("app.Locator", "Resolve"))
            .event(changed_to("OnChanged"))
            .unwrap();

        let mut dispatcher = Dispatcher::new(&config, &registry, None).unwrap();
        dispatcher.attach_all();
        thermometer.set(1.0);
        assert_eq!(display.shown(), 1);
    }

    #[test]
    fn test_resolver_overrides_well_formed_locator() {
        let thermometer = Thermometer::new();
        let display = Display::new();
        let located = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&located);

        let registry = TypeRegistry::builder()
            .register(thermometer_entry())
            .register(display_entry())
            .register(
                TypeEntry::builder::<Locator>("app.Locator")
                    .static_locator("Resolve", move |_| {
                        counted.fetch_add(1, Ordering::SeqCst);
                        None
                    })
                    .build(),
            )
            .build();
        let config = WiringConfig::new()
            .strict(true)
            .with_locator(LocatorRef::new("app.Locator", "Resolve"))
            .event(changed_to("OnChanged"))
            .unwrap();

        let mut dispatcher =
            Dispatcher::new(&config, &registry, Some(resolver_for(&thermometer, &display)))
                .unwrap();
        dispatcher.attach_all();
        thermometer.set(1.0);

        assert_eq!(display.shown(), 1);
        assert_eq!(located.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_autowired_consumer() {
        let thermometer = Thermometer::new();
        let display = Display::new();
        let config = WiringConfig::new()
            .event(single(
                ProducerRef::new("app.Thermometer", "Changed"),
                ConsumerRef::autowired("app.Display"),
            ))
            .unwrap();

        let mut dispatcher =
            Dispatcher::new(&config, &registry(), Some(resolver_for(&thermometer, &display)))
                .unwrap();
        dispatcher.attach_all();
        thermometer.set(3.0);
        assert_eq!(display.shown(), 1);
    }

    #[test]
    fn test_static_event_with_find_instance_is_skipped() {
        static RESET: EventSource<()> = EventSource::new();
        struct Reset;
        let registry = TypeRegistry::builder()
            .register(display_entry())
            .register(
                TypeEntry::builder::<Reset>("app.Reset")
                    .static_event("Fired", || &RESET)
                    .build(),
            )
            .build();
        let config = WiringConfig::new()
            .event(single(
                ProducerRef::new("app.Reset", "Fired"),
                ConsumerRef::autowired("app.Display"),
            ))
            .unwrap();

        let dispatcher =
            Dispatcher::new(&config, &registry, Some(resolver(|_| None))).unwrap();
        assert_eq!(dispatcher.hook_count(), 0);

        let strict = config.clone().strict(true);
        let err = Dispatcher::new(&strict, &registry, Some(resolver(|_| None))).unwrap_err();
        assert_eq!(err.cause().kind(), "StaticInstanceMismatch");
    }

    // =========================================================================
    // Error Policy
    // =========================================================================

    fn broken_config() -> WiringConfig {
        let mut config = WiringConfig::new();
        config.events = vec![
            EventWiring::new(ProducerRef::new("app.Thermometer", "Empty")),
            single(
                ProducerRef::new("app.Missing", "Changed"),
                ConsumerRef::autowired("app.Display"),
            ),
            single(
                ProducerRef::new("app.Thermometer", "Nope"),
                ConsumerRef::autowired("app.Display"),
            ),
            EventWiring::new(ProducerRef::new("app.Thermometer", "Changed"))
                .consumer(ConsumerRef::new("app.Missing", "OnChanged"))
                .unwrap()
                .consumer(ConsumerRef::new("app.Display", "OnText"))
                .unwrap()
                .consumer(ConsumerRef::new("app.Display", "OnChanged"))
                .unwrap(),
            changed_to("OnChanged"),
        ];
        config
    }

    #[test]
    fn test_permissive_construction_never_fails() {
        let thermometer = Thermometer::new();
        let display = Display::new();
        let config = broken_config();
        let registry = registry();

        let dispatcher = Dispatcher::new(&config, &registry, None).unwrap();
        assert_eq!(dispatcher.hook_count(), 0);

        let mut dispatcher =
            Dispatcher::new(&config, &registry, Some(resolver_for(&thermometer, &display)))
                .unwrap();
        assert!(!dispatcher.is_strict());
        assert_eq!(
            dispatcher.stats(),
            DispatcherStats {
                total: 2,
                usable: 1,
                attached: 0
            }
        );

        let outcome = dispatcher.attach_all();
        assert_eq!(outcome, BatchOutcome { succeeded: 1, failed: 0 });
        assert_eq!(dispatcher.stats().to_string(), "2 hooks (1 usable, 1 attached)");
        thermometer.set(0.5);
        assert_eq!(display.shown(), 1);
    }

    #[test]
    fn test_strict_construction_names_the_reference() {
        let thermometer = Thermometer::new();
        let display = Display::new();
        let config = broken_config().strict(true);

        let err = Dispatcher::new(&config, &registry(), Some(resolver_for(&thermometer, &display)))
            .unwrap_err();
        assert_eq!(err.message(), "Error while processing app.Missing.Changed event.");
        assert_eq!(
            err.cause(),
            &WiringError::TypeNotFound {
                role: Role::Producer,
                type_name: "app.Missing".to_string(),
            }
        );
    }

    #[test]
    fn test_strict_signature_mismatch_is_fatal() {
        let thermometer = Thermometer::new();
        let display = Display::new();
        let config = WiringConfig::new().strict(true).event(changed_to("OnText")).unwrap();

        let err = Dispatcher::new(&config, &registry(), Some(resolver_for(&thermometer, &display)))
            .unwrap_err();
        assert_eq!(err.cause().kind(), "SignatureIncompatible");
        assert_eq!(thermometer.changed.handler_count(), 0);
    }

    #[test]
    fn test_strict_locator_failure() {
        let config = WiringConfig::new()
            .strict(true)
            .with_locator(LocatorRef::new("app.Nowhere", "Resolve"));

        let err = Dispatcher::new(&config, &registry(), None).unwrap_err();
        assert_eq!(err.message(), "Error while loading locator app.Nowhere.Resolve.");
        assert!(err.cause().is_warning());

        let permissive = config.strict(false).event(changed_to("OnChanged")).unwrap();
        let dispatcher = Dispatcher::new(&permissive, &registry(), None).unwrap();
        assert_eq!(dispatcher.hook_count(), 0);
    }

    #[test]
    fn test_empty_events_contribute_nothing() {
        let config = WiringConfig::new()
            .strict(true)
            .event(EventWiring::new(ProducerRef::new("app.Missing", "Changed")))
            .unwrap();

        let dispatcher = Dispatcher::new(&config, &registry(), None).unwrap();
        assert_eq!(dispatcher.stats(), DispatcherStats::default());
    }

    #[test]
    fn test_duplicate_keys_go_through_the_policy() {
        let thermometer = Thermometer::new();
        let display = Display::new();
        let mut config = WiringConfig::new();
        let mut event = changed_to("OnChanged");
        event.consumers.push(ConsumerRef::autowired("app.Display"));
        event.consumers.push(ConsumerRef::new("app.Display", "OnChanged"));
        config.events = vec![event, changed_to("OnChanged")];

        let dispatcher =
            Dispatcher::new(&config, &registry(), Some(resolver_for(&thermometer, &display)))
                .unwrap();
        assert_eq!(dispatcher.hook_count(), 2);

        let err = Dispatcher::new(
            &config.strict(true),
            &registry(),
            Some(resolver_for(&thermometer, &display)),
        )
        .unwrap_err();
        assert_eq!(
            err.cause(),
            &WiringError::DuplicateWiringKey {
                role: Role::Consumer,
                key: "app.Display.OnChanged".to_string(),
            }
        );
    }

    #[test]
    fn test_detach_all_is_idempotent() {
        let thermometer = Thermometer::new();
        let display = Display::new();
        let config = WiringConfig::new().event(changed_to("OnChanged")).unwrap();
        let mut dispatcher =
            Dispatcher::new(&config, &registry(), Some(resolver_for(&thermometer, &display)))
                .unwrap();

        dispatcher.attach_all();
        assert_eq!(dispatcher.detach_all(), BatchOutcome { succeeded: 1, failed: 0 });
        assert_eq!(dispatcher.detach_all(), BatchOutcome { succeeded: 1, failed: 0 });
        assert_eq!(dispatcher.stats().attached, 0);
    }

    #[test]
    fn test_missing_producer_instance_fails_at_attach() {
        let display = Display::new();
        let display_instance: Instance = display.clone();
        let resolver = resolver(move |t| t.is::<Display>().then(|| Arc::clone(&display_instance)));
        let config = WiringConfig::new().event(changed_to("OnChanged")).unwrap();

        let mut dispatcher = Dispatcher::new(&config, &registry(), Some(resolver)).unwrap();
        assert_eq!(dispatcher.usable_hook_count(), 1);
        assert_eq!(dispatcher.attach_all(), BatchOutcome { succeeded: 0, failed: 1 });
        assert_eq!(dispatcher.stats().attached, 0);
        assert!(dispatcher.hooks().all(|h| h.state() == HookState::Detached));
    }

    #[test]
    fn test_summary_counts_constructed_hooks() {
        let thermometer = Thermometer::new();
        let display = Display::new();
        let config = WiringConfig::new()
            .event(
                EventWiring::new(ProducerRef::new("app.Thermometer", "Changed"))
                    .consumer(ConsumerRef::autowired("app.Missing"))
                    .unwrap(),
            )
            .unwrap();

        let dispatcher =
            Dispatcher::new(&config, &registry(), Some(resolver_for(&thermometer, &display)))
                .unwrap();
        assert_eq!(dispatcher.hook_count(), 0);
        assert_eq!(
            dispatcher.summary(),
            "Loaded definitions of 0 hooks, 0 have been created successfully"
        );

        let dispatcher = Dispatcher::new(
            &broken_config(),
            &registry(),
            Some(resolver_for(&thermometer, &display)),
        )
        .unwrap();
        assert_eq!(
            dispatcher.summary(),
            "Loaded definitions of 2 hooks, 1 have been created successfully"
        );
    }
}
