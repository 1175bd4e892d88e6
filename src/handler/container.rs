//! Dependency container for controller resolution.
//!
//! # Responsibilities
//! - Hold pre-bound instances and factories, keyed by type
//! - Construct types (and their dependencies, recursively) on demand
//! - Map controller names to invokable actions
//!
//! # Design Decisions
//! - A pre-bound instance always wins over a constructor registered later
//! - Factories receive the [`Resolver`], so they can pull their own dependencies
//! - The resolver tracks the construction chain and reports cycles as
//!   `CircularDependency` instead of recursing without bound

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::{Reply, RequestContext};
use crate::error::{ResolveError, RouterError};

type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(&Resolver<'_>) -> Result<Instance, ResolveError> + Send + Sync>;
type ActionInvoker = fn(&(dyn Any + Send + Sync), &str, &mut RequestContext<'_>) -> Option<Reply>;

/// A type the container can build from its dependencies.
///
/// `construct` plays the role of a constructor: resolve class dependencies
/// with [`Resolver::resolve`], use defaults or `None` for optional values,
/// and report anything else with [`Resolver::unresolvable`].
pub trait Injectable: Sized + Send + Sync + 'static {
    fn construct(resolver: &Resolver<'_>) -> Result<Self, ResolveError>;
}

/// A type whose methods can be routed to.
pub trait Controller: Send + Sync + 'static {
    /// Name used in `Controller@action` descriptors.
    const NAME: &'static str;

    /// Run `action`, or return `None` if the controller has no such action.
    fn call_action(&self, action: &str, ctx: &mut RequestContext<'_>) -> Option<Reply>;
}

#[derive(Clone)]
enum Provider {
    Instance(Instance),
    Factory(Factory),
}

#[derive(Clone)]
struct Binding {
    type_name: &'static str,
    provider: Provider,
}

#[derive(Clone)]
struct ControllerEntry {
    type_id: TypeId,
    type_name: &'static str,
    invoke: ActionInvoker,
}

/// Type-keyed bindings plus the controller name table.
#[derive(Clone, Default)]
pub struct Container {
    bindings: HashMap<TypeId, Binding>,
    controllers: HashMap<String, ControllerEntry>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a ready-made instance of `T`.
    pub fn instance<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.bindings.insert(
            TypeId::of::<T>(),
            Binding {
                type_name: type_name::<T>(),
                provider: Provider::Instance(Arc::new(value)),
            },
        );
        self
    }

    /// Bind a factory for `T`, called on every resolution.
    pub fn factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<T, ResolveError> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |resolver| {
            factory(resolver).map(|value| Arc::new(value) as Instance)
        });
        self.bindings.insert(
            TypeId::of::<T>(),
            Binding {
                type_name: type_name::<T>(),
                provider: Provider::Factory(factory),
            },
        );
        self
    }

    /// Build `T` through [`Injectable::construct`] unless `T` is already bound.
    pub fn autowire<T: Injectable>(&mut self) -> &mut Self {
        if !self.bindings.contains_key(&TypeId::of::<T>()) {
            self.factory::<T, _>(T::construct);
        }
        self
    }

    /// Make `C` routable by name, constructed through [`Injectable`].
    pub fn controller<C: Controller + Injectable>(&mut self) -> &mut Self {
        self.autowire::<C>();
        self.expose::<C>()
    }

    /// Make a pre-built controller routable by name.
    pub fn controller_instance<C: Controller>(&mut self, controller: C) -> &mut Self {
        self.instance(controller);
        self.expose::<C>()
    }

    fn expose<C: Controller>(&mut self) -> &mut Self {
        tracing::debug!(controller = C::NAME, "Controller registered");
        self.controllers.insert(
            C::NAME.to_string(),
            ControllerEntry {
                type_id: TypeId::of::<C>(),
                type_name: type_name::<C>(),
                invoke: invoke_action::<C>,
            },
        );
        self
    }

    pub fn has_controller(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver {
            container: self,
            chain: RefCell::new(Vec::new()),
        }
    }

    /// Resolve `T` with a fresh resolver.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveError> {
        self.resolver().resolve::<T>()
    }

    /// Build controller `class` and run `method` on it.
    pub fn call_action(
        &self,
        class: &str,
        method: &str,
        ctx: &mut RequestContext<'_>,
    ) -> Result<Reply, RouterError> {
        let Some(entry) = self.controllers.get(class) else {
            if self.binds_type_named(class) {
                return Err(RouterError::InvalidHandler(format!(
                    "{class} is bound in the container but is not a controller"
                )));
            }
            return Err(ResolveError::ClassNotFound {
                class: class.to_string(),
            }
            .into());
        };

        let instance = self.resolver().resolve_any(entry.type_id, entry.type_name)?;
        (entry.invoke)(instance.as_ref(), method, ctx).ok_or_else(|| {
            ResolveError::MethodNotFound {
                class: class.to_string(),
                method: method.to_string(),
            }
            .into()
        })
    }

    fn binds_type_named(&self, class: &str) -> bool {
        let suffix = format!("::{class}");
        self.bindings
            .values()
            .any(|b| b.type_name == class || b.type_name.ends_with(&suffix))
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.bindings.values().map(|b| b.type_name).collect::<Vec<_>>())
            .field("controllers", &self.controllers.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn invoke_action<C: Controller>(
    instance: &(dyn Any + Send + Sync),
    action: &str,
    ctx: &mut RequestContext<'_>,
) -> Option<Reply> {
    instance.downcast_ref::<C>()?.call_action(action, ctx)
}

/// Resolution session handed to factories and constructors.
pub struct Resolver<'c> {
    container: &'c Container,
    chain: RefCell<Vec<&'static str>>,
}

impl<'c> Resolver<'c> {
    /// Resolve a dependency of type `T`.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveError> {
        let class = type_name::<T>();
        self.resolve_any(TypeId::of::<T>(), class)?
            .downcast::<T>()
            .map_err(|_| ResolveError::ClassNotFound {
                class: class.to_string(),
            })
    }

    /// Like [`resolve`](Self::resolve), but `None` when `T` has no binding.
    pub fn resolve_optional<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, ResolveError> {
        if !self.container.bindings.contains_key(&TypeId::of::<T>()) {
            return Ok(None);
        }
        self.resolve::<T>().map(Some)
    }

    /// Error for a constructor parameter that has no binding, default or `None`.
    pub fn unresolvable(&self, parameter: &str) -> ResolveError {
        let class = self.chain.borrow().last().copied().unwrap_or("<unknown>");
        ResolveError::UnresolvableParameter {
            parameter: parameter.to_string(),
            class: class.to_string(),
        }
    }

    fn resolve_any(&self, type_id: TypeId, class: &'static str) -> Result<Instance, ResolveError> {
        let binding = self
            .container
            .bindings
            .get(&type_id)
            .ok_or_else(|| ResolveError::ClassNotFound {
                class: class.to_string(),
            })?;

        let factory = match &binding.provider {
            Provider::Instance(instance) => return Ok(Arc::clone(instance)),
            Provider::Factory(factory) => Arc::clone(factory),
        };

        {
            let mut chain = self.chain.borrow_mut();
            if chain.contains(&class) {
                let mut cycle: Vec<String> = chain.iter().map(|c| c.to_string()).collect();
                cycle.push(class.to_string());
                return Err(ResolveError::CircularDependency { chain: cycle });
            }
            chain.push(class);
        }

        let result = factory(self);
        self.chain.borrow_mut().pop();
        result
    }
}
