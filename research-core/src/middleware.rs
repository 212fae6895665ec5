//! Middleware trait for wrapping [`BasketProvider`] implementations.

use std::any::{Any, TypeId};
use std::sync::Arc;

use research_types::ResearchError;

use crate::provider::BasketProvider;

/// Position requirement for middleware in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewarePosition {
    /// This middleware must be outermost (applied last, handles requests first).
    Outermost,
    /// This middleware must be outside (closer to the basket than) the specified middleware type.
    OuterThan(TypeId),
    /// This middleware must be inside (closer to the raw provider than) the specified middleware type.
    InnerThan(TypeId),
    /// No position requirement.
    Any,
}

/// Validation context passed to middleware during stack validation.
pub struct ValidationContext<'a> {
    /// All middleware in the stack, outermost first.
    stack: &'a [MiddlewareDescriptor],
    /// Index of the middleware being validated in the stack.
    current_index: usize,
}

impl<'a> ValidationContext<'a> {
    /// Create a new validation context.
    #[must_use]
    pub const fn new(stack: &'a [MiddlewareDescriptor], current_index: usize) -> Self {
        Self {
            stack,
            current_index,
        }
    }

    /// Check if a middleware type exists in the stack.
    #[must_use]
    pub fn has_middleware(&self, type_id: TypeId) -> bool {
        self.stack.iter().any(|m| m.type_id() == type_id)
    }

    /// Check if a middleware type exists outer than (closer to the caller than) the current one.
    #[must_use]
    pub fn has_middleware_outer(&self, type_id: TypeId) -> bool {
        self.stack[..self.current_index]
            .iter()
            .any(|m| m.type_id() == type_id)
    }

    /// Check if a middleware type exists inner than (closer to the raw provider than) the current one.
    #[must_use]
    pub fn has_middleware_inner(&self, type_id: TypeId) -> bool {
        self.stack[self.current_index + 1..]
            .iter()
            .any(|m| m.type_id() == type_id)
    }

    /// Get the middleware's position in the stack (0 = outermost).
    #[must_use]
    pub const fn current_position(&self) -> usize {
        self.current_index
    }

    /// Get the total number of middleware in the stack.
    #[must_use]
    pub const fn stack_size(&self) -> usize {
        self.stack.len()
    }
}

/// Internal descriptor for tracking middleware in the builder.
pub struct MiddlewareDescriptor {
    middleware: Box<dyn Middleware>,
    type_id: TypeId,
    name: &'static str,
}

impl MiddlewareDescriptor {
    /// Create a new middleware descriptor from a concrete middleware implementation.
    pub fn new<M: Middleware + 'static>(middleware: M) -> Self {
        let name = middleware.name();
        Self {
            middleware: Box::new(middleware),
            type_id: TypeId::of::<M>(),
            name,
        }
    }

    /// Get the type ID of the wrapped middleware.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Get the human-readable name of the middleware.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Get a reference to the wrapped middleware trait object.
    #[must_use]
    pub fn middleware(&self) -> &dyn Middleware {
        &*self.middleware
    }

    /// Consume this descriptor and extract the boxed middleware.
    #[must_use]
    pub fn into_middleware(self) -> Box<dyn Middleware> {
        self.middleware
    }
}

/// Trait implemented by basket-provider middleware layers.
///
/// A middleware consumes an inner [`BasketProvider`] and returns a wrapped
/// provider that augments or restricts behavior (e.g. rate limiting, circuit
/// breaking, caching).
pub trait Middleware: Send + Sync {
    /// Apply this middleware to wrap an inner provider and return the wrapped provider.
    fn apply(self: Box<Self>, inner: Arc<dyn BasketProvider>) -> Arc<dyn BasketProvider>;

    /// Human-readable middleware name for introspection/logging.
    fn name(&self) -> &'static str;

    /// Opaque configuration snapshot for serialization/inspection.
    fn config_json(&self) -> serde_json::Value;

    /// Validate this middleware's position and dependencies in the stack.
    ///
    /// # Errors
    /// Return an error if validation fails (missing dependencies, wrong order).
    fn validate(&self, _ctx: &ValidationContext) -> Result<(), ResearchError> {
        Ok(())
    }

    /// Get this middleware as `&dyn Any` for downcasting.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}
