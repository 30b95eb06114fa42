//! HTTP RPC server library.
//!
//! Services register typed methods, codecs translate wire formats, and an
//! allow-list gates which clients may call.

pub mod codec;
pub mod config;
pub mod demo;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod security;

pub use codec::{Codec, CodecRegistry, CodecRequest};
pub use config::RpcConfig;
pub use http::{HttpServer, RequestContext, ResponseWriter, RpcServer};
pub use lifecycle::Shutdown;
pub use registry::{MethodError, MethodSet, RegistryError, Service, ServiceRegistry};
pub use security::{AccessError, AccessFilter};
