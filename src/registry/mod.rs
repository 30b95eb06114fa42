//! Service registry subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     receiver + optional name
//!     → names.rs (service name inference and validation)
//!     → service.rs (collect candidate methods, drop unsuitable ones)
//!     → ServiceDescriptor stored under its name
//!
//! Dispatch (per request):
//!     "Service.Method"
//!     → resolve() → (ServiceDescriptor, MethodDescriptor)
//! ```
//!
//! # Design Decisions
//! - Registration needs `&mut self`; once shared the registry is read-only
//! - Unsuitable methods are skipped, not reported
//! - Re-registering a name replaces the previous service

pub mod method;
pub mod names;
pub mod service;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

pub use method::{ArgValue, MethodDescriptor, MethodError, ReplyValue, TypeDescriptor};
pub use service::{MethodSet, Service};

use crate::http::RequestContext;

/// Errors raised while registering or resolving services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The service name is empty or not exported.
    #[error("rpc: invalid service name {0:?}")]
    InvalidServiceName(String),

    /// No candidate method passed validation.
    #[error("rpc: {0:?} has no exported methods of suitable type")]
    NoSuitableMethods(String),

    /// The dotted name is not of the form `Service.Method`.
    #[error("rpc: service/method request ill-formed: {0:?}")]
    MalformedMethodName(String),

    #[error("rpc: can't find service {0:?}")]
    UnknownService(String),

    #[error("rpc: can't find method {0:?}")]
    UnknownMethod(String),
}

/// One registered receiver and its callable methods.
pub struct ServiceDescriptor {
    name: String,
    receiver: Arc<dyn Any + Send + Sync>,
    methods: HashMap<String, MethodDescriptor>,
}

impl ServiceDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// Method names, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke `method` on this service's receiver.
    pub fn call(
        &self,
        method: &MethodDescriptor,
        ctx: &RequestContext,
        args: &dyn ArgValue,
        reply: &mut dyn ReplyValue,
    ) -> Result<(), MethodError> {
        method.call(self.receiver.as_ref(), ctx, args, reply)
    }
}

impl std::fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Registry of services keyed by name.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceDescriptor>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `receiver` under `name`, or under its type name if `name`
    /// is empty.
    pub fn register<S: Service>(
        &mut self,
        receiver: Arc<S>,
        name: &str,
    ) -> Result<(), RegistryError> {
        let name = if name.is_empty() {
            names::inferred_name(std::any::type_name::<S>())
        } else {
            name
        };
        if !names::is_exported(name) {
            return Err(RegistryError::InvalidServiceName(name.to_string()));
        }

        let mut candidates = MethodSet::new();
        S::methods(&mut candidates);
        let methods = candidates.into_suitable(name);
        if methods.is_empty() {
            return Err(RegistryError::NoSuitableMethods(name.to_string()));
        }

        let descriptor = ServiceDescriptor {
            name: name.to_string(),
            receiver,
            methods,
        };
        tracing::info!(
            service = name,
            methods = ?descriptor.method_names(),
            "Service registered"
        );
        if self.services.insert(name.to_string(), descriptor).is_some() {
            tracing::warn!(service = name, "Service name re-registered, previous service replaced");
        }
        Ok(())
    }

    /// Resolve a dotted `Service.Method` name.
    pub fn resolve(
        &self,
        dotted: &str,
    ) -> Result<(&ServiceDescriptor, &MethodDescriptor), RegistryError> {
        let mut parts = dotted.split('.');
        let (service, method) = match (parts.next(), parts.next(), parts.next()) {
            (Some(service), Some(method), None) if !service.is_empty() && !method.is_empty() => {
                (service, method)
            }
            _ => return Err(RegistryError::MalformedMethodName(dotted.to_string())),
        };

        let descriptor = self
            .services
            .get(service)
            .ok_or_else(|| RegistryError::UnknownService(dotted.to_string()))?;
        let method = descriptor
            .method(method)
            .ok_or_else(|| RegistryError::UnknownMethod(dotted.to_string()))?;
        Ok((descriptor, method))
    }

    pub fn has_method(&self, dotted: &str) -> bool {
        self.resolve(dotted).is_ok()
    }

    pub fn service(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.get(name)
    }

    /// Service names, sorted.
    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct MultiplyArgs {
        a: i64,
        b: i64,
    }

    #[derive(Debug, Default, Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct MultiplyReply {
        result: i64,
    }

    #[derive(Default)]
    struct Service1 {
        calls: AtomicUsize,
    }

    impl Service1 {
        fn multiply(
            &self,
            _ctx: &RequestContext,
            args: &MultiplyArgs,
            reply: &mut MultiplyReply,
        ) -> Result<(), MethodError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            reply.result = args.a * args.b;
            Ok(())
        }
    }

    impl Service for Service1 {
        fn methods(methods: &mut MethodSet<Self>) {
            methods
                .method("Multiply", Service1::multiply)
                .method("helper", Service1::multiply)
                .method("Pair", |_: &Self, _: &RequestContext, _: &(i64, i64), _: &mut i64| {
                    Ok::<(), MethodError>(())
                });
        }
    }

    struct Service2;

    impl Service for Service2 {
        fn methods(_methods: &mut MethodSet<Self>) {}
    }

    fn context() -> RequestContext {
        let (parts, ()) = axum::http::Request::builder()
            .method("POST")
            .body(())
            .unwrap()
            .into_parts();
        RequestContext::new("127.0.0.1:4000", &parts)
    }

    #[test]
    fn test_register_inferred_name() {
        let mut registry = ServiceRegistry::new();
        registry.register(Arc::new(Service1::default()), "").unwrap();
        assert!(registry.has_method("Service1.Multiply"));
        assert_eq!(registry.service_names(), vec!["Service1"]);
    }

    #[test]
    fn test_register_explicit_names_are_independent() {
        let shared = Arc::new(Service1::default());
        let mut registry = ServiceRegistry::new();
        registry.register(shared.clone(), "Foo").unwrap();
        registry.register(shared.clone(), "Bar").unwrap();
        assert!(registry.has_method("Foo.Multiply"));
        assert!(registry.has_method("Bar.Multiply"));
        assert!(!registry.has_method("Service1.Multiply"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_without_methods_fails() {
        let mut registry = ServiceRegistry::new();
        let err = registry.register(Arc::new(Service2), "").unwrap_err();
        assert_eq!(err, RegistryError::NoSuitableMethods("Service2".into()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_unexported_name() {
        let mut registry = ServiceRegistry::new();
        let err = registry.register(Arc::new(Service1::default()), "arith").unwrap_err();
        assert_eq!(err, RegistryError::InvalidServiceName("arith".into()));
        assert!(registry.register(Arc::new(Service1::default()), "Ari.th").is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unsuitable_methods_are_skipped() {
        let mut registry = ServiceRegistry::new();
        registry.register(Arc::new(Service1::default()), "").unwrap();
        let service = registry.service("Service1").unwrap();
        assert_eq!(service.method_names(), vec!["Multiply"]);
        assert!(!registry.has_method("Service1.helper"));
        assert!(!registry.has_method("Service1.Pair"));
    }

    #[test]
    fn test_resolve_errors() {
        let mut registry = ServiceRegistry::new();
        registry.register(Arc::new(Service1::default()), "").unwrap();

        for malformed in ["Service1", "Service1.", ".Multiply", "Service1.Multiply.Extra", ""] {
            assert_eq!(
                registry.resolve(malformed).unwrap_err(),
                RegistryError::MalformedMethodName(malformed.into()),
                "{malformed}"
            );
        }
        assert!(matches!(
            registry.resolve("Nope.Multiply"),
            Err(RegistryError::UnknownService(_))
        ));
        assert!(matches!(
            registry.resolve("Service1.Divide"),
            Err(RegistryError::UnknownMethod(_))
        ));
        assert!(!registry.has_method("service1.Multiply"));
    }

    #[test]
    fn test_reregistration_replaces_service() {
        let first = Arc::new(Service1::default());
        let second = Arc::new(Service1::default());
        let mut registry = ServiceRegistry::new();
        registry.register(first.clone(), "Calc").unwrap();
        registry.register(second.clone(), "Calc").unwrap();

        let (service, method) = registry.resolve("Calc.Multiply").unwrap();
        let args = MultiplyArgs { a: 1, b: 1 };
        let mut reply = MultiplyReply::default();
        service.call(method, &context(), &args, &mut reply).unwrap();

        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invoke_through_descriptors() {
        let mut registry = ServiceRegistry::new();
        registry.register(Arc::new(Service1::default()), "").unwrap();
        let (service, method) = registry.resolve("Service1.Multiply").unwrap();

        let args = MultiplyArgs { a: 4, b: 2 };
        let mut reply = method.new_reply();
        service.call(method, &context(), &args, &mut *reply).unwrap();

        let reply = reply.as_any_mut().downcast_mut::<MultiplyReply>().unwrap();
        assert_eq!(reply.result, 8);
    }

    #[test]
    fn test_invoke_with_wrong_argument_type_fails() {
        let mut registry = ServiceRegistry::new();
        registry.register(Arc::new(Service1::default()), "").unwrap();
        let (service, method) = registry.resolve("Service1.Multiply").unwrap();

        let mut reply = method.new_reply();
        let err = service
            .call(method, &context(), &String::from("oops"), &mut *reply)
            .unwrap_err();
        assert!(err.to_string().contains("argument"));
    }
}
