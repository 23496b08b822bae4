use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::protocol::{RpcError, RpcRequest, RpcResponse};

pub type Handler = Box<dyn Fn(Option<Value>) -> Result<Value, RpcError> + Send + Sync>;

/// Named functions callable over the RPC listener.
#[derive(Default)]
pub struct RpcRegistry {
    handlers: HashMap<String, Handler>,
}

impl RpcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(Option<Value>) -> Result<Value, RpcError> + Send + Sync + 'static,
    {
        self.handlers.insert(name.to_string(), Box::new(handler));
    }

    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn dispatch(&self, request: RpcRequest) -> Option<RpcResponse> {
        debug!(method = %request.method, "RPC call");
        let result = match self.handlers.get(&request.method) {
            Some(handler) => handler(request.params),
            None => Err(RpcError::method_not_found(&request.method)),
        };

        let id = request.id?;
        Some(match result {
            Ok(value) => RpcResponse::success(id, value),
            Err(error) => RpcResponse::failure(id, error),
        })
    }

    /// Decode one text frame and dispatch it. Returns `None` for notifications.
    pub fn handle_text(&self, text: &str) -> Option<RpcResponse> {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => return Some(RpcResponse::failure(Value::Null, RpcError::parse_error(e))),
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<RpcRequest>(value) {
            Ok(request) => self.dispatch(request),
            Err(e) => Some(RpcResponse::failure(id, RpcError::invalid_request(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::protocol::{INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry_with_echo() -> RpcRegistry {
        let mut registry = RpcRegistry::new();
        registry.register("echo", |params| Ok(params.unwrap_or(Value::Null)));
        registry
    }

    #[test]
    fn test_dispatch_known_method() {
        let registry = registry_with_echo();
        let response = registry
            .handle_text(r#"{"jsonrpc":"2.0","method":"echo","params":[1,2],"id":3}"#)
            .unwrap();
        assert_eq!(response.result, Some(json!([1, 2])));
        assert_eq!(response.id, json!(3));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_unknown_method() {
        let registry = registry_with_echo();
        let response = registry
            .handle_text(r#"{"jsonrpc":"2.0","method":"pause_work","id":"a"}"#)
            .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
        assert_eq!(response.id, json!("a"));
    }

    #[test]
    fn test_malformed_json() {
        let registry = registry_with_echo();
        let response = registry.handle_text("{not json").unwrap();
        assert_eq!(response.error.unwrap().code, PARSE_ERROR);
        assert_eq!(response.id, Value::Null);
    }

    #[test]
    fn test_not_a_request_object() {
        let registry = registry_with_echo();
        let response = registry.handle_text(r#"{"id":9,"params":[]}"#).unwrap();
        assert_eq!(response.error.unwrap().code, INVALID_REQUEST);
        assert_eq!(response.id, json!(9));
    }

    #[test]
    fn test_notification_runs_without_reply() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = RpcRegistry::new();
        registry.register("bump", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Null)
        });

        assert!(registry.handle_text(r#"{"jsonrpc":"2.0","method":"bump"}"#).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_methods_sorted() {
        let mut registry = registry_with_echo();
        registry.register("alpha", |_| Ok(Value::Null));
        assert_eq!(registry.methods(), vec!["alpha", "echo"]);
    }
}
