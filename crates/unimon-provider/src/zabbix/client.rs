use crate::error::{ProviderError, Result};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Narrow capability set the adapter needs from a backend client:
/// resource-scoped verbs returning field-name-to-value records.
///
/// The adapter owns one implementation for its lifetime; tests inject a
/// recording mock through the same seam.
pub trait ResourceClient: Send {
    fn get(&self, resource: &str, params: Value) -> Result<Value>;
    fn create(&self, resource: &str, params: Value) -> Result<Value>;
    fn update(&self, resource: &str, params: Value) -> Result<Value>;
    fn delete(&self, resource: &str, params: Value) -> Result<Value>;
}

/// JSON-RPC 2.0 client for the Zabbix frontend API.
///
/// Authenticates once at construction via `user.login`; the session token
/// rides along on every subsequent call. Requests block until the backend
/// answers: the HTTP client is built without a timeout because this layer
/// defines none.
pub struct ZabbixClient {
    http: reqwest::blocking::Client,
    url: String,
    token: String,
    next_id: AtomicU64,
}

impl ZabbixClient {
    /// Connects to the frontend at `endpoint` and logs in.
    ///
    /// Authentication failure surfaces as the backend's own
    /// [`ProviderError::ApiError`], unwrapped.
    pub fn connect(endpoint: &str, username: &str, password: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .use_rustls_tls()
            .timeout(None)
            .build()?;

        let mut client = Self {
            http,
            url: format!("{}/api_jsonrpc.php", endpoint.trim_end_matches('/')),
            token: String::new(),
            next_id: AtomicU64::new(1),
        };

        let result = client.call(
            "user.login",
            json!({ "user": username, "password": password }),
        )?;
        client.token = result
            .as_str()
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "user.login did not return a session token".to_string(),
                )
            })?
            .to_string();

        Ok(client)
    }

    fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        if !self.token.is_empty() {
            request["auth"] = json!(self.token);
        }

        let response = self.http.post(&self.url).json(&request).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ProviderError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = serde_json::from_str(&body)?;
        if let Some(error) = payload.get("error") {
            return Err(ProviderError::ApiError {
                code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                data: error
                    .get("data")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        payload.get("result").cloned().ok_or_else(|| {
            ProviderError::MalformedResponse(format!("no result member in response to {method}"))
        })
    }
}

impl ResourceClient for ZabbixClient {
    fn get(&self, resource: &str, params: Value) -> Result<Value> {
        self.call(&format!("{resource}.get"), params)
    }

    fn create(&self, resource: &str, params: Value) -> Result<Value> {
        self.call(&format!("{resource}.create"), params)
    }

    fn update(&self, resource: &str, params: Value) -> Result<Value> {
        self.call(&format!("{resource}.update"), params)
    }

    fn delete(&self, resource: &str, params: Value) -> Result<Value> {
        self.call(&format!("{resource}.delete"), params)
    }
}
