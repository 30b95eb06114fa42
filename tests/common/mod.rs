//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use httprpc::codec::json::JsonCodec;
use httprpc::demo::Arith;
use httprpc::{HttpServer, RpcServer, Shutdown};
use tokio::net::TcpListener;

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

/// RPC server with the JSON codec and `Arith` registered.
pub fn arith_server() -> RpcServer {
    let mut rpc = RpcServer::new();
    rpc.register_codec(JsonCodec, "application/json");
    rpc.register_service(Arc::new(Arith), "").unwrap();
    rpc
}

/// Serve `rpc` on 127.0.0.1 with an OS-assigned port.
pub async fn start_server(rpc: RpcServer) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(Arc::new(rpc));
    let handle = tokio::spawn(server.run(listener, shutdown.signal()));
    TestServer {
        addr,
        shutdown,
        handle,
    }
}
