//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, limits, peer address)
//!     → dispatch.rs (admission, method gate, codec selection)
//!     → request.rs (RequestContext handed to the method)
//!     → registry (resolve Service.Method, invoke)
//!     → response.rs (codec writes reply or error)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::RpcServer;
pub use request::{RequestContext, X_REQUEST_ID};
pub use response::ResponseWriter;
pub use server::HttpServer;
