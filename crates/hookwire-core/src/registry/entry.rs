//! Registered types and the typed builder that erases their members.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use super::member::{
    EventMember, FunctionDecl, FunctionMember, HandlerMethod, InvokeFn, Member, SubscribeFn,
    Visibility,
};
use crate::config::AUTOWIRED_METHOD_NAME;
use crate::error::MemberError;
use crate::foundation::{ArgShape, EventHandler, EventSource, Instance, TypeDescriptor};

/// Everything symbolic lookup can find on one registered type.
pub struct TypeEntry {
    descriptor: TypeDescriptor,
    events: Vec<Arc<EventMember>>,
    handlers: Vec<Arc<HandlerMethod>>,
    functions: Vec<Arc<FunctionMember>>,
    autowired: Option<String>,
}

impl TypeEntry {
    /// Starts describing the Rust type `T` under the qualified `name`.
    pub fn builder<T: Any + Send + Sync>(name: impl Into<String>) -> TypeEntryBuilder<T> {
        TypeEntryBuilder::new(name.into())
    }

    /// The descriptor of this type.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// The qualified type name.
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Looks up a public event, static or instance.
    pub fn event(&self, name: &str) -> Option<&Arc<EventMember>> {
        self.events
            .iter()
            .find(|e| e.name() == name && e.visibility() == Visibility::Public)
    }

    /// Looks up a public handler method, static or instance.
    ///
    /// The name `"autowired"` resolves to the handler designated with
    /// [`TypeEntryBuilder::autowired`]; without a designation it falls back
    /// to a handler literally named `autowired`.
    pub fn handler(&self, name: &str) -> Option<&Arc<HandlerMethod>> {
        let name = match (&self.autowired, name) {
            (Some(designated), AUTOWIRED_METHOD_NAME) => designated.as_str(),
            _ => name,
        };
        self.handlers
            .iter()
            .find(|h| h.name() == name && h.visibility() == Visibility::Public)
    }

    /// Looks up a function of any visibility.
    pub fn function(&self, name: &str) -> Option<&Arc<FunctionMember>> {
        self.functions.iter().find(|f| f.name() == name)
    }

    /// The designated default handler name, if any.
    pub fn autowired_handler(&self) -> Option<&str> {
        self.autowired.as_deref()
    }

    /// Iterates over all events.
    pub fn events(&self) -> impl Iterator<Item = &Arc<EventMember>> {
        self.events.iter()
    }

    /// Iterates over all handler methods.
    pub fn handlers(&self) -> impl Iterator<Item = &Arc<HandlerMethod>> {
        self.handlers.iter()
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("descriptor", &self.descriptor)
            .field("events", &self.events.len())
            .field("handlers", &self.handlers.len())
            .field("functions", &self.functions.len())
            .field("autowired", &self.autowired)
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Typed builder for a [`TypeEntry`].
///
/// # Example
///
/// ```rust,ignore
/// let entry = TypeEntry::builder::<Thermometer>("sensors.Thermometer")
///     .event("Changed", |t: &Thermometer| &t.changed)
///     .static_event("Calibrated", || &CALIBRATED)
///     .build();
///
/// let entry = TypeEntry::builder::<Display>("ui.Display")
///     .handler("OnChanged", |d: &Display, _sender, value: &f64| d.show(*value))
///     .autowired("OnChanged")
///     .build();
/// ```
pub struct TypeEntryBuilder<T> {
    descriptor: TypeDescriptor,
    events: Vec<Arc<EventMember>>,
    handlers: Vec<Arc<HandlerMethod>>,
    functions: Vec<Arc<FunctionMember>>,
    autowired: Option<String>,
    last: Option<LastMember>,
    _marker: PhantomData<fn() -> T>,
}

#[derive(Clone, Copy)]
enum LastMember {
    Event,
    Handler,
}

impl<T: Any + Send + Sync> TypeEntryBuilder<T> {
    fn new(name: String) -> Self {
        Self {
            descriptor: TypeDescriptor::of::<T>(name),
            events: Vec::new(),
            handlers: Vec::new(),
            functions: Vec::new(),
            autowired: None,
            last: None,
            _marker: PhantomData,
        }
    }

    /// Declares an instance event reached through `accessor`.
    pub fn event<A: Any>(self, name: &str, accessor: fn(&T) -> &EventSource<A>) -> Self {
        let qualified = format!("{}.{}", self.descriptor.name(), name);
        let add: SubscribeFn = {
            let qualified = qualified.clone();
            let expected = self.descriptor.name().to_string();
            Arc::new(move |instance: Option<&Instance>, handler: &EventHandler| -> Result<(), MemberError> {
                accessor(target::<T>(instance, &qualified, &expected)?).add(Arc::clone(handler));
                Ok(())
            })
        };
        let remove: SubscribeFn = {
            let expected = self.descriptor.name().to_string();
            Arc::new(move |instance: Option<&Instance>, handler: &EventHandler| -> Result<(), MemberError> {
                accessor(target::<T>(instance, &qualified, &expected)?).remove(handler);
                Ok(())
            })
        };
        self.push_event(name, false, EventSource::<A>::shape(), add, remove)
    }

    /// Declares a static event; any instance passed on subscription is ignored.
    pub fn static_event<A: Any>(
        self,
        name: &str,
        accessor: fn() -> &'static EventSource<A>,
    ) -> Self {
        let add: SubscribeFn = Arc::new(move |_: Option<&Instance>, handler: &EventHandler| -> Result<(), MemberError> {
            accessor().add(Arc::clone(handler));
            Ok(())
        });
        let remove: SubscribeFn = Arc::new(move |_: Option<&Instance>, handler: &EventHandler| -> Result<(), MemberError> {
            accessor().remove(handler);
            Ok(())
        });
        self.push_event(name, true, EventSource::<A>::shape(), add, remove)
    }

    /// Declares an instance handler method receiving arguments of type `A`.
    pub fn handler<A, F>(self, name: &str, f: F) -> Self
    where
        A: Any,
        F: Fn(&T, Option<&dyn Any>, &A) + Send + Sync + 'static,
    {
        let qualified = format!("{}.{}", self.descriptor.name(), name);
        let invoke: InvokeFn = Arc::new(
            move |instance: Option<&Instance>, sender: Option<&dyn Any>, args: &dyn Any| {
                let target = instance.and_then(|i| i.downcast_ref::<T>());
                match (target, args.downcast_ref::<A>()) {
                    (Some(target), Some(args)) => f(target, sender, args),
                    _ => warn!(handler = %qualified, "Handler invoked with an unexpected instance or argument; call dropped"),
                }
            },
        );
        self.push_handler(name, false, ArgShape::of::<A>(), invoke)
    }

    /// Declares an instance handler method accepting any argument type.
    pub fn handler_any<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&T, Option<&dyn Any>, &dyn Any) + Send + Sync + 'static,
    {
        let qualified = format!("{}.{}", self.descriptor.name(), name);
        let invoke: InvokeFn = Arc::new(
            move |instance: Option<&Instance>, sender: Option<&dyn Any>, args: &dyn Any| {
                match instance.and_then(|i| i.downcast_ref::<T>()) {
                    Some(target) => f(target, sender, args),
                    None => warn!(handler = %qualified, "Handler invoked without its instance; call dropped"),
                }
            },
        );
        self.push_handler(name, false, ArgShape::Any, invoke)
    }

    /// Declares a static handler method receiving arguments of type `A`.
    pub fn static_handler<A, F>(self, name: &str, f: F) -> Self
    where
        A: Any,
        F: Fn(Option<&dyn Any>, &A) + Send + Sync + 'static,
    {
        let qualified = format!("{}.{}", self.descriptor.name(), name);
        let invoke: InvokeFn = Arc::new(
            move |_: Option<&Instance>, sender: Option<&dyn Any>, args: &dyn Any| {
                match args.downcast_ref::<A>() {
                    Some(args) => f(sender, args),
                    None => warn!(handler = %qualified, "Handler invoked with an unexpected argument; call dropped"),
                }
            },
        );
        self.push_handler(name, true, ArgShape::of::<A>(), invoke)
    }

    /// Declares a static handler method accepting any argument type.
    pub fn static_handler_any<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(Option<&dyn Any>, &dyn Any) + Send + Sync + 'static,
    {
        let invoke: InvokeFn = Arc::new(
            move |_: Option<&Instance>, sender: Option<&dyn Any>, args: &dyn Any| f(sender, args),
        );
        self.push_handler(name, true, ArgShape::Any, invoke)
    }

    /// Declares a function member such as a locator.
    pub fn function(mut self, name: &str, decl: FunctionDecl) -> Self {
        self.functions.push(Arc::new(FunctionMember {
            declaring_type: self.descriptor.clone(),
            name: name.to_string(),
            is_static: decl.is_static,
            visibility: decl.visibility,
            signature: decl.signature,
            body: decl.body,
        }));
        self
    }

    /// Declares a public static locator function.
    pub fn static_locator<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&TypeDescriptor) -> Option<Instance> + Send + Sync + 'static,
    {
        self.function(name, FunctionDecl::locator(f))
    }

    /// Designates the handler that `"autowired"` consumer references resolve to.
    pub fn autowired(mut self, handler: &str) -> Self {
        self.autowired = Some(handler.to_string());
        self
    }

    /// Hides the most recently declared event or handler from lookup.
    pub fn private(mut self) -> Self {
        // Members are unshared until `build`, so `get_mut` always succeeds.
        match self.last {
            Some(LastMember::Event) => {
                if let Some(event) = self.events.last_mut().and_then(Arc::get_mut) {
                    event.visibility = Visibility::Private;
                }
            }
            Some(LastMember::Handler) => {
                if let Some(handler) = self.handlers.last_mut().and_then(Arc::get_mut) {
                    handler.visibility = Visibility::Private;
                }
            }
            None => {}
        }
        self
    }

    /// Finishes the entry.
    pub fn build(self) -> TypeEntry {
        TypeEntry {
            descriptor: self.descriptor,
            events: self.events,
            handlers: self.handlers,
            functions: self.functions,
            autowired: self.autowired,
        }
    }

    fn push_event(
        mut self,
        name: &str,
        is_static: bool,
        args: ArgShape,
        add: SubscribeFn,
        remove: SubscribeFn,
    ) -> Self {
        self.events.push(Arc::new(EventMember {
            declaring_type: self.descriptor.clone(),
            name: name.to_string(),
            is_static,
            visibility: Visibility::Public,
            args,
            add,
            remove,
        }));
        self.last = Some(LastMember::Event);
        self
    }

    fn push_handler(mut self, name: &str, is_static: bool, args: ArgShape, invoke: InvokeFn) -> Self {
        self.handlers.push(Arc::new(HandlerMethod {
            declaring_type: self.descriptor.clone(),
            name: name.to_string(),
            is_static,
            visibility: Visibility::Public,
            args,
            invoke,
        }));
        self.last = Some(LastMember::Handler);
        self
    }
}

fn target<'a, T: Any>(
    instance: Option<&'a Instance>,
    member: &str,
    expected: &str,
) -> Result<&'a T, MemberError> {
    let instance = instance.ok_or_else(|| MemberError::InstanceRequired {
        member: member.to_string(),
    })?;
    instance
        .downcast_ref::<T>()
        .ok_or_else(|| MemberError::InstanceMismatch {
            member: member.to_string(),
            expected: expected.to_string(),
        })
}
