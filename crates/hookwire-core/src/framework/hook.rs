//! A single binding between a producer event and a consumer handler.

use std::fmt;

use tracing::{error, trace};

use super::pipeline::ResolvedMember;
use crate::error::{WiringError, WiringResult};
use crate::foundation::{EventHandler, Instance};
use crate::registry::{EventMember, HandlerMethod, Member};

/// Whether a hook is currently registered with its producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookState {
    /// Not registered (initial state).
    #[default]
    Detached,
    /// Registered with the producer event.
    Attached,
}

/// One resolved binding.
///
/// The adapted handler is built once, before the hook exists. A hook
/// without one is permanently unusable: [`attach`](Self::attach) refuses
/// it and the dispatcher leaves it out of batch operations.
pub struct Hook {
    producer: ResolvedMember<EventMember>,
    consumer: ResolvedMember<HandlerMethod>,
    bound: Option<EventHandler>,
    state: HookState,
}

impl Hook {
    /// Adapts `method` on `instance` to the handler shape of `event`.
    ///
    /// Fails when the method cannot receive the event's arguments, or when
    /// an instance method has no instance of its declaring type.
    pub fn adapt(
        event: &EventMember,
        method: &HandlerMethod,
        instance: Option<&Instance>,
    ) -> WiringResult<EventHandler> {
        let incompatible = |reason: String| WiringError::SignatureIncompatible {
            producer: event.qualified_name(),
            consumer: method.qualified_name(),
            reason,
        };

        if !method.args().accepts(&event.args()) {
            return Err(incompatible(format!(
                "handler accepts {} but the event raises {}",
                method.args(),
                event.args()
            )));
        }

        if method.is_static() {
            return Ok(method.bind(None));
        }

        let instance = instance
            .ok_or_else(|| incompatible("instance method has no consumer instance".to_string()))?;
        if !method.declaring_type().matches(instance) {
            return Err(incompatible(format!(
                "consumer instance is not a {}",
                method.declaring_type()
            )));
        }
        Ok(method.bind(Some(instance.clone())))
    }

    /// Creates a detached hook; `bound` is `None` for an unusable hook.
    pub fn new(
        producer: ResolvedMember<EventMember>,
        consumer: ResolvedMember<HandlerMethod>,
        bound: Option<EventHandler>,
    ) -> Self {
        Self {
            producer,
            consumer,
            bound,
            state: HookState::Detached,
        }
    }

    /// Returns `true` if the handler was adapted.
    pub fn is_usable(&self) -> bool {
        self.bound.is_some()
    }

    /// The current state.
    pub fn state(&self) -> HookState {
        self.state
    }

    /// `"<producer type> (<event>) += <consumer type> (<method>)"`.
    pub fn debug_name(&self) -> String {
        format!(
            "{} ({}) += {} ({})",
            self.producer.member.declaring_type(),
            self.producer.member.name(),
            self.consumer.member.declaring_type(),
            self.consumer.member.name()
        )
    }

    /// Registers the handler with the producer event.
    ///
    /// Returns `false` if the hook is unusable or the producer refused the
    /// registration; the hook then stays detached. Attaching an attached
    /// hook is a no-op.
    pub fn attach(&mut self) -> bool {
        let Some(handler) = &self.bound else {
            return false;
        };
        if self.state == HookState::Attached {
            return true;
        }
        match self
            .producer
            .member
            .subscribe(self.producer.instance.as_ref(), handler)
        {
            Ok(()) => {
                self.state = HookState::Attached;
                trace!(hook = %self.debug_name(), "Attached");
                true
            }
            Err(err) => {
                error!(hook = %self.debug_name(), error = %err, "Failed to attach hook");
                false
            }
        }
    }

    /// Removes the handler from the producer event.
    ///
    /// Detaching a detached hook succeeds without touching the producer.
    /// The hook is marked detached before removal; a failed removal is
    /// logged and reported as `false`.
    pub fn detach(&mut self) -> bool {
        if self.state == HookState::Detached {
            return true;
        }
        self.state = HookState::Detached;
        let Some(handler) = &self.bound else {
            return true;
        };
        match self
            .producer
            .member
            .unsubscribe(self.producer.instance.as_ref(), handler)
        {
            Ok(()) => {
                trace!(hook = %self.debug_name(), "Detached");
                true
            }
            Err(err) => {
                error!(hook = %self.debug_name(), error = %err, "Failed to detach hook");
                false
            }
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.debug_name())
            .field("usable", &self.is_usable())
            .field("state", &self.state)
            .finish()
    }
}
