//! Canned-response [`NodeRpc`] used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::rpc::{NodeRpc, RpcError};

#[derive(Clone, Debug)]
enum Canned {
    Ok(Value),
    Transport,
    Protocol(String),
}

/// Answers each method with a fixed response; unknown methods behave like an
/// unreachable node.
#[derive(Default)]
pub struct MockRpc {
    responses: Mutex<HashMap<String, Canned>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, method: &str, result: Value) -> Self {
        self.set_ok(method, result);
        self
    }

    pub fn transport(self, method: &str) -> Self {
        self.set(method, Canned::Transport);
        self
    }

    pub fn protocol(self, method: &str, body: &str) -> Self {
        self.set(method, Canned::Protocol(body.to_string()));
        self
    }

    /// Replaces the response for `method` between scrapes.
    pub fn set_ok(&self, method: &str, result: Value) {
        self.set(method, Canned::Ok(result));
    }

    pub fn set_transport(&self, method: &str) {
        self.set(method, Canned::Transport);
    }

    fn set(&self, method: &str, canned: Canned) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_string(), canned);
    }

    /// Methods called so far, in order.
    pub fn called(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn params_of(&self, method: &str) -> Option<Vec<Value>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl NodeRpc for MockRpc {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));
        let canned = self.responses.lock().unwrap().get(method).cloned();
        match canned {
            Some(Canned::Ok(value)) => Ok(value),
            Some(Canned::Protocol(body)) => Err(RpcError::Protocol {
                method: method.to_string(),
                body,
            }),
            Some(Canned::Transport) | None => Err(RpcError::Transport {
                method: method.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}
