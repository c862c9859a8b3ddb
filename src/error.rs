//! Server-internal error taxonomy (§7 Error Handling Design).
//!
//! Handlers propagate `ServerError` internally with `?` and convert to a
//! `jsonrpc::Error` once at the LSP boundary, rather than constructing
//! JSON-RPC errors ad hoc at every call site.

use thiserror::Error;
use tower_lsp::jsonrpc;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server has not received 'initialize' yet")]
    NotInitialized,

    #[error("request was cancelled")]
    Cancelled,

    #[error("failed to load solution: {0}")]
    SolutionLoad(String),

    #[error("compiler backend error: {0}")]
    Backend(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("internal invariant violation: {0}")]
    Internal(String),
}

/// JSON-RPC error code `-32002`, reserved by this server for `NotInitialized`.
pub const CODE_NOT_INITIALIZED: i64 = -32002;
/// JSON-RPC error code `-32800`, the standard LSP "request cancelled" code.
pub const CODE_CANCELLED: i64 = -32800;

impl From<ServerError> for jsonrpc::Error {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::NotInitialized => jsonrpc::Error {
                code: jsonrpc::ErrorCode::ServerError(CODE_NOT_INITIALIZED),
                message: err.to_string().into(),
                data: None,
            },
            ServerError::Cancelled => jsonrpc::Error {
                code: jsonrpc::ErrorCode::ServerError(CODE_CANCELLED),
                message: err.to_string().into(),
                data: None,
            },
            ServerError::InvalidParams(_) => jsonrpc::Error::invalid_params(err.to_string()),
            ServerError::SolutionLoad(_) | ServerError::Backend(_) | ServerError::Internal(_) => {
                let mut e = jsonrpc::Error::internal_error();
                e.message = err.to_string().into();
                e
            }
        }
    }
}
