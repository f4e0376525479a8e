mod config;
mod rpc;

use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{error, info};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::ServerConfig;
use rpc::{handle_line, RpcResponse, ServerState};

async fn write_line(stdout: &mut Stdout, line: &str) -> std::io::Result<()> {
    stdout.write_all(format!("{}\r\n", line).as_bytes()).await?;
    stdout.flush().await
}

fn serialize_response(response: &RpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!("FATAL: Failed to serialize response for ID {:?}: {}", response.id, e);
        r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32000,"message":"Internal Server Error"}}"#
            .to_string()
    })
}

// --- Main Function ---
#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Fatal: invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    info!(
        default_modulus_bits = config.default_modulus_bits,
        request_timeout = ?config.request_timeout,
        "Starting rsaform server on stdio..."
    );
    let state = Arc::new(ServerState::new(config));

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut stdout = tokio::io::stdout();
    let mut line_buffer = String::new();

    let ready_msg = json!({"jsonrpc": "2.0", "method": "server/ready", "params": {"status": "ready"}});
    info!("Sending server/ready notification.");
    if let Err(e) = write_line(&mut stdout, &ready_msg.to_string()).await {
        error!("Fatal: Failed to write ready message: {}", e);
        return;
    }

    info!("Listening on stdio for JSON-RPC messages...");

    loop {
        line_buffer.clear();
        match reader.read_line(&mut line_buffer).await {
            Ok(0) => {
                info!("Stdin closed (EOF). Exiting server.");
                break;
            }
            Ok(_) => {
                if let Some(response) = handle_line(state.clone(), &line_buffer).await {
                    let resp_str = serialize_response(&response);
                    if let Err(e) = write_line(&mut stdout, &resp_str).await {
                        error!("Failed to write response for ID {:?}: {}", response.id, e);
                    }
                }
            }
            Err(e) => {
                error!("Error reading from stdin: {}. Exiting.", e);
                break;
            }
        }
    }
    info!("rsaform server shutting down.");
}
