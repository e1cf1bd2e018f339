//! Error types shared by the scrape groups.

use crate::rpc::RpcError;

/// An RPC call succeeded but its `result` did not have the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("{method}: missing field `{field}`")]
    MissingField { method: String, field: &'static str },
    #[error("invalid hex block number in `{field}`: {value:?}")]
    InvalidHex { field: &'static str, value: String },
    #[error("{method}: unexpected result shape: {detail}")]
    WrongShape { method: String, detail: String },
}

/// Failure of one scrape group (or of a whole `/babeauthorship` request).
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error(transparent)]
    Data(#[from] DataError),
}
