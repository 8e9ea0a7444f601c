//! Member resolution pipeline.
//!
//! Producer and consumer references resolve the same way:
//!
//! 1. look up the type in the registry
//! 2. when `findInstance` is set, ask the resolver for an instance
//! 3. look up the member, static or instance
//! 4. reject static members declared with `findInstance`
//!
//! A resolver returning no instance is accepted here; an instance member
//! without an instance fails later, when the hook is adapted (consumers) or
//! attached (producers).

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{ConsumerRef, ProducerRef};
use crate::error::{Role, WiringError, WiringResult};
use crate::foundation::{Instance, Resolver};
use crate::registry::{EventMember, HandlerMethod, Member, TypeEntry, TypeRegistry};

/// A member handle together with the instance it applies to.
pub struct ResolvedMember<M> {
    /// The resolved member.
    pub member: Arc<M>,
    /// The instance, if one was resolved.
    pub instance: Option<Instance>,
}

impl<M: Member> ResolvedMember<M> {
    /// Whether the member is static.
    pub fn is_static(&self) -> bool {
        self.member.is_static()
    }
}

impl<M> Clone for ResolvedMember<M> {
    fn clone(&self) -> Self {
        Self {
            member: Arc::clone(&self.member),
            instance: self.instance.clone(),
        }
    }
}

impl<M: Member> fmt::Debug for ResolvedMember<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedMember")
            .field("member", &self.member.qualified_name())
            .field("is_static", &self.member.is_static())
            .field("has_instance", &self.instance.is_some())
            .finish()
    }
}

/// Resolves a producer reference to its event and instance.
pub fn resolve_producer(
    registry: &TypeRegistry,
    producer: &ProducerRef,
    resolver: Option<&Resolver>,
) -> WiringResult<ResolvedMember<EventMember>> {
    resolve(
        registry,
        Lookup {
            role: Role::Producer,
            type_name: &producer.type_name,
            member: &producer.event_name,
            find_instance: producer.find_instance,
        },
        resolver,
        TypeEntry::event,
    )
}

/// Resolves a consumer reference to its handler method and instance.
pub fn resolve_consumer(
    registry: &TypeRegistry,
    consumer: &ConsumerRef,
    resolver: Option<&Resolver>,
) -> WiringResult<ResolvedMember<HandlerMethod>> {
    resolve(
        registry,
        Lookup {
            role: Role::Consumer,
            type_name: &consumer.type_name,
            member: &consumer.method_name,
            find_instance: consumer.find_instance,
        },
        resolver,
        TypeEntry::handler,
    )
}

struct Lookup<'a> {
    role: Role,
    type_name: &'a str,
    member: &'a str,
    find_instance: bool,
}

fn resolve<M, F>(
    registry: &TypeRegistry,
    lookup: Lookup<'_>,
    resolver: Option<&Resolver>,
    find_member: F,
) -> WiringResult<ResolvedMember<M>>
where
    M: Member,
    F: for<'e> Fn(&'e TypeEntry, &str) -> Option<&'e Arc<M>>,
{
    let Lookup {
        role,
        type_name,
        member,
        find_instance,
    } = lookup;

    let entry = registry
        .get(type_name)
        .ok_or_else(|| WiringError::TypeNotFound {
            role,
            type_name: type_name.to_string(),
        })?;

    let instance = if find_instance {
        let resolver = resolver.ok_or_else(|| WiringError::ResolverMissing {
            role,
            type_name: type_name.to_string(),
        })?;
        let instance = resolver(entry.descriptor());
        if instance.is_none() {
            debug!(%role, type_name, "Resolver returned no instance");
        }
        instance
    } else {
        None
    };

    let found = find_member(entry, member).ok_or_else(|| WiringError::MemberNotFound {
        role,
        type_name: type_name.to_string(),
        member: member.to_string(),
    })?;

    if find_instance && found.is_static() {
        return Err(WiringError::StaticInstanceMismatch {
            role,
            type_name: type_name.to_string(),
            member: found.name().to_string(),
        });
    }

    trace!(%role, member = %found.qualified_name(), "Resolved member");
    Ok(ResolvedMember {
        member: Arc::clone(found),
        instance,
    })
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::foundation::{EventSource, resolver};

    struct Sensor {
        changed: EventSource<i32>,
    }

    struct Sink;

    static RESET: EventSource<()> = EventSource::new();

    fn registry() -> TypeRegistry {
        TypeRegistry::builder()
            .register(
                TypeEntry::builder::<Sensor>("app.Sensor")
                    .event("Changed", |s: &Sensor| &s.changed)
                    .static_event("Reset", || &RESET)
                    .build(),
            )
            .register(
                TypeEntry::builder::<Sink>("app.Sink")
                    .handler("OnChanged", |_: &Sink, _: Option<&dyn Any>, _: &i32| {})
                    .static_handler("OnReset", |_: Option<&dyn Any>, _: &()| {})
                    .autowired("OnChanged")
                    .build(),
            )
            .build()
    }

    fn sensor_resolver() -> Resolver {
        let sensor: Instance = Arc::new(Sensor {
            changed: EventSource::new(),
        });
        resolver(move |t| t.is::<Sensor>().then(|| Arc::clone(&sensor)))
    }

    #[test]
    fn test_resolves_instance_producer() {
        let resolver = sensor_resolver();
        let resolved = resolve_producer(
            &registry(),
            &ProducerRef::new("app.Sensor", "Changed"),
            Some(&resolver),
        )
        .unwrap();

        assert!(!resolved.is_static());
        assert!(resolved.instance.is_some());
        assert_eq!(resolved.member.qualified_name(), "app.Sensor.Changed");
    }

    #[test]
    fn test_unknown_type_and_member() {
        let registry = registry();
        let err = resolve_producer(&registry, &ProducerRef::static_member("app.Nope", "X"), None)
            .unwrap_err();
        assert_eq!(
            err,
            WiringError::TypeNotFound {
                role: Role::Producer,
                type_name: "app.Nope".to_string(),
            }
        );

        let err = resolve_consumer(&registry, &ConsumerRef::static_member("app.Sink", "Nope"), None)
            .unwrap_err();
        assert_eq!(err.kind(), "MemberNotFound");
    }

    #[test]
    fn test_find_instance_requires_resolver() {
        let err = resolve_consumer(&registry(), &ConsumerRef::autowired("app.Sink"), None).unwrap_err();
        assert_eq!(
            err,
            WiringError::ResolverMissing {
                role: Role::Consumer,
                type_name: "app.Sink".to_string(),
            }
        );
    }

    #[test]
    fn test_static_member_with_find_instance_is_rejected() {
        let resolver = sensor_resolver();
        let err = resolve_producer(
            &registry(),
            &ProducerRef::new("app.Sensor", "Reset"),
            Some(&resolver),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "StaticInstanceMismatch");

        let resolved =
            resolve_producer(&registry(), &ProducerRef::static_member("app.Sensor", "Reset"), None)
                .unwrap();
        assert!(resolved.is_static());
        assert!(resolved.instance.is_none());
    }

    #[test]
    fn test_static_handler_with_find_instance_is_rejected() {
        let resolver = resolver(|_| Some(Arc::new(Sink) as Instance));
        let err = resolve_consumer(
            &registry(),
            &ConsumerRef::new("app.Sink", "OnReset"),
            Some(&resolver),
        )
        .unwrap_err();
        assert_eq!(
            err,
            WiringError::StaticInstanceMismatch {
                role: Role::Consumer,
                type_name: "app.Sink".to_string(),
                member: "OnReset".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_instance_is_accepted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let resolver = resolver(move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
            None
        });

        let resolved =
            resolve_consumer(&registry(), &ConsumerRef::autowired("app.Sink"), Some(&resolver))
                .unwrap();
        assert_eq!(resolved.member.name(), "OnChanged");
        assert!(resolved.instance.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolver_is_not_called_without_find_instance() {
        let resolver = resolver(|_| panic!("resolver must not be called"));
        let resolved = resolve_consumer(
            &registry(),
            &ConsumerRef::static_member("app.Sink", "OnReset"),
            Some(&resolver),
        )
        .unwrap();
        assert!(resolved.is_static());
    }
}
