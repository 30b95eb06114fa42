use clap::Parser;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use httprpc::codec::json::{decode_client_response, encode_client_request, ClientError};

#[derive(Parser)]
#[command(name = "httprpc-call")]
#[command(about = "Call a method on an httprpc server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8080/")]
    url: String,

    /// Dotted method name, e.g. Arith.Multiply
    method: String,

    /// Argument as JSON, e.g. '{"A": 4, "B": 2}'
    #[arg(default_value = "{}")]
    args: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let args: Value = serde_json::from_str(&cli.args)?;

    let res = reqwest::Client::new()
        .post(&cli.url)
        .header(CONTENT_TYPE, "application/json")
        .body(encode_client_request(&cli.method, &args)?)
        .send()
        .await?;

    let status = res.status();
    let body = res.bytes().await?;
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        eprintln!("{}", String::from_utf8_lossy(&body));
        std::process::exit(1);
    }

    match decode_client_response::<Value>(&body) {
        Ok(reply) => println!("{}", serde_json::to_string_pretty(&reply)?),
        Err(ClientError::Remote(message)) => {
            eprintln!("Error: {}", message);
            std::process::exit(2);
        }
        Err(ClientError::Object(object)) => {
            eprintln!("Error: {}", serde_json::to_string_pretty(object.object())?);
            std::process::exit(2);
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
