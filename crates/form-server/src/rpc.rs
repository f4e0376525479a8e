//! JSON-RPC 2.0 request handling
//!
//! Each form action is one method. Crypto work runs on the blocking thread
//! pool and the response is awaited through its `JoinHandle`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rsaform::{max_plaintext_bytes, FormError, KeyProvider, RsaForm, RustCryptoProvider};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32000;

// --- Struct Definitions ---
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Serialize, Debug)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Serialize, Debug)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct KeypairGenerateParams {
    #[serde(default)]
    modulus_bits: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct EncryptParams {
    public_key_pem: String,
    plaintext: String,
}

#[derive(Deserialize, Debug)]
struct DecryptParams {
    private_key_pem: String,
    ciphertext: String, // Base64 encoded RSA block
}

#[derive(Deserialize, Debug)]
struct BudgetParams {
    #[serde(default)]
    public_key_pem: Option<String>,
    #[serde(default)]
    modulus_bits: Option<usize>,
    #[serde(default)]
    hash: Option<String>,
}
// --- Struct Definitions End ---

/// Shared, immutable server state
pub struct ServerState {
    pub form: RsaForm<RustCryptoProvider>,
    pub config: ServerConfig,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        ServerState {
            form: RsaForm::rust_crypto(),
            config,
        }
    }
}

// --- Helper Functions ---
pub fn create_error_response(id: Value, code: i32, message: String) -> RpcResponse {
    error!("Responding with error: code={}, message={}", code, message);
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(RpcError {
            code,
            message,
            data: None,
        }),
    }
}

pub fn create_success_response(id: Value, result: Value) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: Some(result),
        error: None,
    }
}

/// Application error code for each [`FormError`] kind
pub fn form_error_code(err: &FormError) -> i32 {
    match err {
        FormError::MalformedEncoding(_) => -32010,
        FormError::InvalidPem(_) => -32011,
        FormError::KeyImport(_) => -32012,
        FormError::KeyGeneration(_) => -32013,
        FormError::PlaintextTooLarge { .. } => -32014,
        FormError::EncryptionFailed => -32015,
        FormError::DecryptionFailed => -32016,
        FormError::InvalidUtf8 => -32017,
    }
}

fn form_error_response(id: Value, err: &FormError) -> RpcResponse {
    let mut data = json!({ "kind": err.kind() });
    if let Some(suggestion) = err.suggestion() {
        data["suggestion"] = json!(suggestion);
    }
    if let FormError::PlaintextTooLarge { max, actual } = err {
        data["max"] = json!(max);
        data["actual"] = json!(actual);
    }

    let mut response = create_error_response(id, form_error_code(err), err.to_string());
    if let Some(error) = response.error.as_mut() {
        error.data = Some(data);
    }
    response
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, String> {
    let params = if params.is_null() {
        Value::Object(Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| format!("Invalid params: {}", e))
}

/// Run form work on the blocking pool and turn its outcome into a response
async fn run_blocking<F>(id: Value, task: F) -> RpcResponse
where
    F: FnOnce() -> Result<Value, FormError> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(result)) => create_success_response(id, result),
        Ok(Err(e)) => form_error_response(id, &e),
        Err(e) => create_error_response(id, INTERNAL_ERROR, format!("Worker task failed: {}", e)),
    }
}
// --- Helper Functions End ---

pub type ResponseFuture = Pin<Box<dyn Future<Output = RpcResponse> + Send>>;

// --- Main Request Processor ---
pub fn process_request(state: Arc<ServerState>, req: RpcRequest) -> ResponseFuture {
    Box::pin(async move {
        debug!("Processing request: {:?}", req.method);

        if req.jsonrpc != "2.0" {
            return create_error_response(
                req.id,
                INVALID_REQUEST,
                "Invalid Request: jsonrpc must be \"2.0\"".to_string(),
            );
        }

        match req.method.as_str() {
            "help" => {
                info!("Received help request");
                let help_info = json!({
                    "message": "rsaform server: RSA-OAEP/SHA-256 key generation and single-block encryption.",
                    "commands": {
                        "help": { "description": "Displays this help message." },
                        "keypair_generate": { "description": "Generates an RSA key pair as PEM.", "params": { "modulus_bits": "optional, 1024|2048|3072|4096" } },
                        "encrypt": { "description": "Encrypts UTF-8 text under a PEM public key.", "params": { "public_key_pem": "SPKI PEM", "plaintext": "text" } },
                        "decrypt": { "description": "Decrypts base64 ciphertext under a PEM private key.", "params": { "private_key_pem": "PKCS#8 PEM", "ciphertext": "base64" } },
                        "budget": { "description": "Maximum plaintext bytes for a key or modulus length.", "params": { "public_key_pem": "SPKI PEM", "modulus_bits": "alternative to public_key_pem", "hash": "optional, default SHA-256" } }
                    }
                });
                create_success_response(req.id, help_info)
            }

            "keypair_generate" => {
                let params: KeypairGenerateParams = match parse_params(req.params) {
                    Ok(p) => p,
                    Err(msg) => return create_error_response(req.id, INVALID_PARAMS, msg),
                };
                let modulus_bits = params
                    .modulus_bits
                    .unwrap_or(state.config.default_modulus_bits);
                info!(modulus_bits, "Received keypair_generate request");

                run_blocking(req.id, move || {
                    let pair = state.form.generate_key_pair(modulus_bits)?;
                    let profile = state.form.provider().public_profile(pair.public_key());
                    Ok(json!({
                        "public_key_pem": pair.public_key_pem(),
                        "private_key_pem": pair.private_key_pem(),
                        "modulus_bits": profile.modulus_bits,
                        "max_plaintext_bytes": profile.max_plaintext_bytes(),
                    }))
                })
                .await
            }

            "encrypt" => {
                info!("Received encrypt request");
                let params: EncryptParams = match parse_params(req.params) {
                    Ok(p) => p,
                    Err(msg) => return create_error_response(req.id, INVALID_PARAMS, msg),
                };
                run_blocking(req.id, move || {
                    let ciphertext = state.form.encrypt(&params.public_key_pem, &params.plaintext)?;
                    Ok(json!({ "ciphertext": ciphertext }))
                })
                .await
            }

            "decrypt" => {
                info!("Received decrypt request");
                let params: DecryptParams = match parse_params(req.params) {
                    Ok(p) => p,
                    Err(msg) => return create_error_response(req.id, INVALID_PARAMS, msg),
                };
                run_blocking(req.id, move || {
                    let plaintext = state.form.decrypt(&params.private_key_pem, &params.ciphertext)?;
                    Ok(json!({ "plaintext": plaintext }))
                })
                .await
            }

            "budget" => {
                info!("Received budget request");
                let params: BudgetParams = match parse_params(req.params) {
                    Ok(p) => p,
                    Err(msg) => return create_error_response(req.id, INVALID_PARAMS, msg),
                };
                match (params.public_key_pem, params.modulus_bits) {
                    (Some(pem), _) => {
                        run_blocking(req.id, move || {
                            let profile = state.form.profile(&pem)?;
                            Ok(json!({
                                "max_plaintext_bytes": profile.max_plaintext_bytes(),
                                "profile": profile,
                            }))
                        })
                        .await
                    }
                    (None, Some(bits)) => {
                        let hash = params.hash.unwrap_or_else(|| "SHA-256".to_string());
                        let max = max_plaintext_bytes(bits, &hash);
                        create_success_response(req.id, json!({ "max_plaintext_bytes": max }))
                    }
                    (None, None) => create_error_response(
                        req.id,
                        INVALID_PARAMS,
                        "Invalid params: either public_key_pem or modulus_bits is required"
                            .to_string(),
                    ),
                }
            }

            _ => {
                warn!("Unknown method: {}", req.method);
                create_error_response(
                    req.id,
                    METHOD_NOT_FOUND,
                    format!("Method not found: {}", req.method),
                )
            }
        }
    })
}

/// Handle one input line
///
/// Returns `None` for blank or non-JSON lines and for notifications, which
/// never get a response.
pub async fn handle_line(state: Arc<ServerState>, line: &str) -> Option<RpcResponse> {
    let trimmed_line = line.trim();
    if trimmed_line.is_empty() || !trimmed_line.starts_with('{') {
        if !trimmed_line.is_empty() {
            warn!("Received non-JSON input line, ignoring.");
        }
        return None;
    }
    debug!("<<< Received raw line ({} bytes)", trimmed_line.len());

    let parsed_json: Value = match serde_json::from_str(trimmed_line) {
        Ok(v) => v,
        Err(e) => {
            return Some(create_error_response(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            ))
        }
    };

    // Notifications carry no id (or a null one)
    if parsed_json.get("id").map_or(true, Value::is_null) {
        match parsed_json.get("method").and_then(|m| m.as_str()) {
            Some(method) => info!("Received notification: {}", method),
            None => warn!("Received notification without method field"),
        }
        return None;
    }

    let id = parsed_json.get("id").cloned().unwrap_or(Value::Null);
    let req: RpcRequest = match serde_json::from_value(parsed_json) {
        Ok(r) => r,
        Err(e) => {
            return Some(create_error_response(
                id,
                INVALID_REQUEST,
                format!("Invalid Request: {}", e),
            ))
        }
    };

    let request_method = req.method.clone();
    let timeout = state.config.request_timeout;
    match tokio::time::timeout(timeout, process_request(state, req)).await {
        Ok(response) => Some(response),
        Err(_) => {
            error!(
                "Request processing timed out after {:?} for Method '{}', ID {:?}",
                timeout, request_method, id
            );
            Some(create_error_response(
                id,
                INTERNAL_ERROR,
                format!("Request timed out for method '{}'", request_method),
            ))
        }
    }
}
