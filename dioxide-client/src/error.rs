//! Client errors

use dioxide_deserializer::DeserializeError;
use dioxide_serializer::SerializeError;
use dioxide_spec::{ConfigError, SpecError};
use thiserror::Error;

/// Numeric code for a caller-side timeout
pub const CODE_TIMEOUT: i64 = -10000;

/// Numeric code for a function name not shaped `dapp.contract.function`
pub const CODE_INVALID_FUNCTION_NAME: i64 = -10003;

/// Numeric code for a function missing from contract metadata
pub const CODE_FUNCTION_NOT_FOUND: i64 = -10004;

/// Numeric code for an unusable delegatee
pub const CODE_INVALID_DELEGATEE: i64 = -10005;

/// Numeric code for a transaction record lacking required fields
pub const CODE_INVALID_TRANSACTION_OBJECT: i64 = -10006;

/// Numeric code for errors with no dedicated code
pub const CODE_GENERIC: i64 = -1;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Spec error: {0}")]
    Spec(#[from] SpecError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] SerializeError),

    #[error("Deserialize error: {0}")]
    Deserialize(#[from] DeserializeError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Invalid client configuration: {0}")]
    InvalidClientConfig(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Invalid function format: {0}, expected 'dapp.contract.function'")]
    InvalidFunctionName(String),

    #[error("Function {function} not found in contract {contract}")]
    FunctionNotFound { function: String, contract: String },

    #[error("Invalid delegatee: {0}")]
    InvalidDelegatee(String),

    #[error("Invalid transaction object: {0}")]
    InvalidTransactionObject(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Transaction {hash} ended in {state}")]
    TransactionFailed { hash: String, state: String },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Proof-of-work nonce space exhausted")]
    PowExhausted,
}

impl ClientError {
    /// SDK error code
    pub fn code(&self) -> i64 {
        match self {
            ClientError::Timeout(_) => CODE_TIMEOUT,
            ClientError::InvalidFunctionName(_) => CODE_INVALID_FUNCTION_NAME,
            ClientError::FunctionNotFound { .. } => CODE_FUNCTION_NOT_FOUND,
            ClientError::InvalidDelegatee(_) => CODE_INVALID_DELEGATEE,
            ClientError::InvalidTransactionObject(_) => CODE_INVALID_TRANSACTION_OBJECT,
            ClientError::Rpc { code, .. } => *code,
            _ => CODE_GENERIC,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
