mod common;

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use httprpc::codec::json::{decode_client_response, encode_client_request, ClientError};
use httprpc::demo::{Args, Quotient};
use reqwest::{header::CONTENT_TYPE, StatusCode};

use common::{arith_server, start_server};

async fn call(url: &str, method: &str, args: &Args) -> reqwest::Response {
    reqwest::Client::new()
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(encode_client_request(method, args).unwrap())
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_multiply_over_tcp() {
    let server = start_server(arith_server()).await;

    let res = call(&server.url(), "Arith.Multiply", &Args { a: 4, b: 2 }).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(
        res.headers()[CONTENT_TYPE],
        "application/json; charset=utf-8"
    );

    let reply: i64 = decode_client_response(&res.bytes().await.unwrap()).unwrap();
    assert_eq!(reply, 8);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_application_error_over_tcp() {
    let server = start_server(arith_server()).await;

    let res = call(&server.url(), "Arith.Divide", &Args { a: 17, b: 5 }).await;
    let reply: Quotient = decode_client_response(&res.bytes().await.unwrap()).unwrap();
    assert_eq!(reply, Quotient { quo: 3, rem: 2 });

    let res = call(&server.url(), "Arith.Divide", &Args { a: 1, b: 0 }).await;
    assert_eq!(res.status(), StatusCode::OK);
    match decode_client_response::<Quotient>(&res.bytes().await.unwrap()) {
        Err(ClientError::Object(object)) => {
            assert_eq!(object.code(), Some(1));
            assert_eq!(object.message(), Some("divide by zero"));
        }
        other => panic!("expected error object, got {other:?}"),
    }

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_transport_errors_over_tcp() {
    let server = start_server(arith_server()).await;
    let client = reqwest::Client::new();

    let res = client.get(server.url()).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        res.text().await.unwrap(),
        "rpc: POST method required, received GET"
    );

    let res = client
        .post(server.url())
        .header(CONTENT_TYPE, "text/plain")
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let res = call(&server.url(), "Arith.Modulo", &Args::default()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.text().await.unwrap(),
        "rpc: can't find method \"Arith.Modulo\""
    );

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_allow_list_over_tcp() {
    let mut rpc = arith_server();
    rpc.bind([IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10))]);
    let server = start_server(rpc).await;

    let res = call(&server.url(), "Arith.Multiply", &Args { a: 1, b: 1 }).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        res.text().await.unwrap(),
        "rpc: remote client rejected, not allowed by the server"
    );

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_loopback_allowed_over_tcp() {
    let mut rpc = arith_server();
    rpc.bind([IpAddr::V4(Ipv4Addr::LOCALHOST)]);
    let server = start_server(rpc).await;

    let res = call(&server.url(), "Arith.Multiply", &Args { a: 3, b: 5 }).await;
    assert_eq!(res.status(), StatusCode::OK);
    let reply: i64 = decode_client_response(&res.bytes().await.unwrap()).unwrap();
    assert_eq!(reply, 15);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let server = start_server(arith_server()).await;
    server.shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
