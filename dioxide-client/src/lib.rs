//! # Dioxide Client
//!
//! Builds, signs and submits Dioxide transactions.
//!
//! ## Key Features
//! - Canonical transaction layout ([`UnsignedTransaction`]) and its inverse ([`TransactionView`])
//! - Three-nonce proof-of-work search with a caller deadline
//! - Ed25519 accounts with key-derived addresses
//! - JSON-RPC client over a pluggable [`Transport`]
//!
//! ## Example
//!
//! ```rust
//! use dioxide_client::{Ed25519Account, UnsignedTransaction};
//! use dioxide_spec::ContractInvokeId;
//!
//! let account = Ed25519Account::from_secret(&[7u8; 32]);
//! let unsigned = UnsignedTransaction::new(ContractInvokeId::from_raw(73152856577), 0)
//!     .isn(1)
//!     .serialize()
//!     .unwrap();
//! let signed = account.sign_transaction(&unsigned);
//! assert_eq!(signed.len(), unsigned.len() + 97);
//! ```

pub mod account;
pub mod client;
pub mod config;
pub mod error;
pub mod pow;
pub mod rpc;
pub mod transaction;
pub mod view;

pub use account::{verify_transaction, AccountJson, Ed25519Account};
pub use client::{Client, ComposeOptions, Delegatee, FunctionPath};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use pow::PowDifficulty;
pub use rpc::{ContractInfo, FunctionInfo, ParamInfo, TransactionInfo, Transport};
pub use transaction::{GenerationMode, TargetMode, TxFlags, UnsignedTransaction};
pub use view::{ContractTarget, SignedTail, TransactionView, TxHeader};
