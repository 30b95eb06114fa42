//! Service declaration.
//!
//! A receiver type lists its candidate methods once, at registration time.
//! The handler signature itself enforces the call shape
//! `(receiver, context, &args, &mut reply) -> Result<(), E>`; naming and
//! value-type visibility are checked by the registry.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::http::RequestContext;
use crate::registry::method::{ArgValue, MethodDescriptor, MethodError, ReplyValue};
use crate::registry::names::{is_exported, is_exported_or_builtin};

/// A receiver that exposes RPC methods.
///
/// ```ignore
/// impl Service for Arith {
///     fn methods(methods: &mut MethodSet<Self>) {
///         methods.method("Multiply", Arith::multiply);
///     }
/// }
/// ```
pub trait Service: Send + Sync + Sized + 'static {
    /// Declare the candidate methods of this receiver.
    fn methods(methods: &mut MethodSet<Self>);
}

/// Candidate methods collected from a [`Service`].
pub struct MethodSet<S> {
    candidates: Vec<MethodDescriptor>,
    _receiver: PhantomData<fn(&S)>,
}

impl<S> MethodSet<S>
where
    S: Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            candidates: Vec::new(),
            _receiver: PhantomData,
        }
    }

    /// Add a candidate method.
    pub fn method<A, R, E, F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        A: ArgValue + Default,
        R: ReplyValue + Default,
        E: Into<MethodError> + 'static,
        F: Fn(&S, &RequestContext, &A, &mut R) -> Result<(), E> + Send + Sync + 'static,
    {
        self.candidates.push(MethodDescriptor::new::<S, A, R, E, F>(name, handler));
        self
    }

    /// Keep only the candidates that are reachable over the wire.
    ///
    /// A later candidate with the same name replaces an earlier one.
    pub(crate) fn into_suitable(self, service: &str) -> HashMap<String, MethodDescriptor> {
        let mut methods = HashMap::with_capacity(self.candidates.len());
        for candidate in self.candidates {
            if !is_exported(candidate.name()) {
                tracing::debug!(service, method = candidate.name(), "Skipping unexported method");
                continue;
            }
            let args = candidate.args_type().name();
            let reply = candidate.reply_type().name();
            if !is_exported_or_builtin(args) || !is_exported_or_builtin(reply) {
                tracing::debug!(
                    service,
                    method = candidate.name(),
                    args,
                    reply,
                    "Skipping method with unexported value types"
                );
                continue;
            }
            methods.insert(candidate.name().to_string(), candidate);
        }
        methods
    }
}
