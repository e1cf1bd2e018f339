/// Errors returned by a single node RPC call.
///
/// Only [`RpcError::Transport`] counts against `dot_rpc_healthy`; a node that
/// answers with garbage is still reachable.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Connection refused, timeout, or the body could not be read.
    #[error("{method}: transport failure: {reason}")]
    Transport { method: String, reason: String },
    /// The node answered but the body carried no usable `result`.
    #[error("{method}: malformed response: {body}")]
    Protocol { method: String, body: String },
}

impl RpcError {
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Transport { .. })
    }

    pub fn method(&self) -> &str {
        match self {
            RpcError::Transport { method, .. } | RpcError::Protocol { method, .. } => method,
        }
    }
}
