//! Method descriptors and the type-erased values they operate on.
//!
//! A method's argument and reply cross the codec boundary as trait objects:
//! the codec fills an [`ArgValue`] through an erased serde deserializer and
//! reads a [`ReplyValue`] through an erased serializer, so codecs never see
//! the concrete types.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::http::RequestContext;

/// Error returned by a service method.
///
/// Codecs may downcast it to a structured error type they understand
/// (for example `codec::json::ErrorObject`).
pub type MethodError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A method argument slot that a codec can decode into.
pub trait ArgValue: Any + Send {
    /// Replace the slot with a value read from `de`.
    fn decode(
        &mut self,
        de: &mut dyn erased_serde::Deserializer<'_>,
    ) -> Result<(), erased_serde::Error>;

    fn as_any(&self) -> &dyn Any;
}

impl<T> ArgValue for T
where
    T: DeserializeOwned + Any + Send,
{
    fn decode(
        &mut self,
        de: &mut dyn erased_serde::Deserializer<'_>,
    ) -> Result<(), erased_serde::Error> {
        *self = erased_serde::deserialize(de)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A method reply slot that a codec can encode.
pub trait ReplyValue: Any + Send {
    fn as_serialize(&self) -> &dyn erased_serde::Serialize;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> ReplyValue for T
where
    T: Serialize + Any + Send,
{
    fn as_serialize(&self) -> &dyn erased_serde::Serialize {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Describes a concrete value type and knows how to allocate a fresh,
/// zero-valued instance of it.
pub struct TypeDescriptor<V: ?Sized> {
    name: &'static str,
    make: fn() -> Box<V>,
}

impl<V: ?Sized> TypeDescriptor<V> {
    /// Rust type name of the described type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Allocate a new zero value.
    pub fn instantiate(&self) -> Box<V> {
        (self.make)()
    }
}

impl TypeDescriptor<dyn ArgValue> {
    pub fn argument<A>() -> Self
    where
        A: ArgValue + Default,
    {
        Self {
            name: std::any::type_name::<A>(),
            make: zero_arg::<A>,
        }
    }
}

impl TypeDescriptor<dyn ReplyValue> {
    pub fn reply<R>() -> Self
    where
        R: ReplyValue + Default,
    {
        Self {
            name: std::any::type_name::<R>(),
            make: zero_reply::<R>,
        }
    }
}

fn zero_arg<A: ArgValue + Default>() -> Box<dyn ArgValue> {
    Box::new(A::default())
}

fn zero_reply<R: ReplyValue + Default>() -> Box<dyn ReplyValue> {
    Box::new(R::default())
}

impl<V: ?Sized> Clone for TypeDescriptor<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: ?Sized> Copy for TypeDescriptor<V> {}

impl<V: ?Sized> fmt::Debug for TypeDescriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeDescriptor").field(&self.name).finish()
    }
}

/// Type-erased invocation of one method against its receiver.
pub(crate) trait Invoke: Send + Sync {
    fn invoke(
        &self,
        receiver: &(dyn Any + Send + Sync),
        ctx: &RequestContext,
        args: &dyn ArgValue,
        reply: &mut dyn ReplyValue,
    ) -> Result<(), MethodError>;
}

struct TypedMethod<S, A, R, E, F> {
    handler: F,
    _marker: PhantomData<fn(&S, &A, &mut R) -> E>,
}

impl<S, A, R, E, F> Invoke for TypedMethod<S, A, R, E, F>
where
    S: Send + Sync + 'static,
    A: 'static,
    R: 'static,
    E: Into<MethodError>,
    F: Fn(&S, &RequestContext, &A, &mut R) -> Result<(), E> + Send + Sync + 'static,
{
    fn invoke(
        &self,
        receiver: &(dyn Any + Send + Sync),
        ctx: &RequestContext,
        args: &dyn ArgValue,
        reply: &mut dyn ReplyValue,
    ) -> Result<(), MethodError> {
        let receiver = receiver
            .downcast_ref::<S>()
            .ok_or_else(|| mismatch("receiver", std::any::type_name::<S>()))?;
        let args = args
            .as_any()
            .downcast_ref::<A>()
            .ok_or_else(|| mismatch("argument", std::any::type_name::<A>()))?;
        let reply = reply
            .as_any_mut()
            .downcast_mut::<R>()
            .ok_or_else(|| mismatch("reply", std::any::type_name::<R>()))?;

        (self.handler)(receiver, ctx, args, reply).map_err(Into::into)
    }
}

fn mismatch(slot: &str, expected: &str) -> MethodError {
    format!("rpc: {slot} is not of type {expected}").into()
}

/// One validated, callable method.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    handler: Arc<dyn Invoke>,
    args: TypeDescriptor<dyn ArgValue>,
    reply: TypeDescriptor<dyn ReplyValue>,
}

impl MethodDescriptor {
    pub(crate) fn new<S, A, R, E, F>(name: &str, handler: F) -> Self
    where
        S: Send + Sync + 'static,
        A: ArgValue + Default,
        R: ReplyValue + Default,
        E: Into<MethodError> + 'static,
        F: Fn(&S, &RequestContext, &A, &mut R) -> Result<(), E> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            handler: Arc::new(TypedMethod {
                handler,
                _marker: PhantomData,
            }),
            args: TypeDescriptor::argument::<A>(),
            reply: TypeDescriptor::reply::<R>(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args_type(&self) -> TypeDescriptor<dyn ArgValue> {
        self.args
    }

    pub fn reply_type(&self) -> TypeDescriptor<dyn ReplyValue> {
        self.reply
    }

    /// Fresh zero-valued argument for one request.
    pub fn new_args(&self) -> Box<dyn ArgValue> {
        self.args.instantiate()
    }

    /// Fresh zero-valued reply for one request.
    pub fn new_reply(&self) -> Box<dyn ReplyValue> {
        self.reply.instantiate()
    }

    /// Invoke the method against `receiver`.
    pub(crate) fn call(
        &self,
        receiver: &(dyn Any + Send + Sync),
        ctx: &RequestContext,
        args: &dyn ArgValue,
        reply: &mut dyn ReplyValue,
    ) -> Result<(), MethodError> {
        self.handler.invoke(receiver, ctx, args, reply)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("reply", &self.reply)
            .finish()
    }
}
