//! # RPC Types
//!
//! Node responses arrive in an envelope: `{"ret": result}` on success and
//! `{"err": code, "ret": message}` on failure. A [`Transport`] moves the raw
//! envelope; [`parse_envelope`] unwraps it.

use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;
use tracing::warn;

use crate::error::{ClientError, Result, CODE_GENERIC};

pub const METHOD_ISN: &str = "dx.isn";
pub const METHOD_CONTRACT_INFO: &str = "dx.contract_info";
pub const METHOD_TRANSACTION: &str = "dx.transaction";
pub const METHOD_SEND: &str = "tx.send";

/// Confirm states that count as confirmed
pub const CONFIRMED_STATES: [&str; 3] = ["TXN_CONFIRMED", "TXN_FINALIZED", "TXN_ARCHIVED"];

/// Confirm states that will never become confirmed
pub const FAILED_STATES: [&str; 3] = ["TXN_RELAY_INVALIDED", "TXN_ABORTED", "TXN_EXPIRED"];

/// Invocation status of a successful call
pub const INVOCATION_SUCCESS: &str = "IVKRET_SUCCESS";

/// Carries one JSON-RPC call to a node
///
/// Implementations return the response envelope untouched. Failures to reach
/// the node map to [`ClientError::Transport`].
pub trait Transport {
    fn call(&self, method: &str, params: Json) -> Result<Json>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn call(&self, method: &str, params: Json) -> Result<Json> {
        (**self).call(method, params)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn call(&self, method: &str, params: Json) -> Result<Json> {
        (**self).call(method, params)
    }
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn call(&self, method: &str, params: Json) -> Result<Json> {
        (**self).call(method, params)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn call(&self, method: &str, params: Json) -> Result<Json> {
        (**self).call(method, params)
    }
}

/// Unwrap a response envelope into its result
pub fn parse_envelope(method: &str, envelope: Json) -> Result<Json> {
    let Json::Object(mut map) = envelope else {
        return Err(ClientError::Transport(format!("{}: response is not an object", method)));
    };

    match map.remove("err") {
        None | Some(Json::Null) => map
            .remove("ret")
            .ok_or_else(|| ClientError::Transport(format!("{}: response has no ret", method))),
        Some(err) => {
            let code = match &err {
                Json::Number(n) => n.as_i64().unwrap_or(CODE_GENERIC),
                Json::String(s) => s.trim().parse().unwrap_or(CODE_GENERIC),
                _ => CODE_GENERIC,
            };
            let message = match map.remove("ret") {
                Some(Json::String(s)) => s,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            warn!(method, code, %message, "request error");
            Err(ClientError::Rpc { code, message })
        }
    }
}

/// Accept a u64 given as a JSON number or a decimal string
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IsnInfo {
    #[serde(rename = "ISN", deserialize_with = "lenient_u64")]
    pub isn: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParamInfo {
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionInfo {
    pub name: String,
    #[serde(default)]
    pub opcode: u8,
    #[serde(default)]
    pub params: Vec<ParamInfo>,
}

impl FunctionInfo {
    /// Argument signature text, `"type:name,..."`
    pub fn signature_text(&self) -> String {
        self.params
            .iter()
            .map(|p| format!("{}:{}", p.ty, p.name))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Contract metadata returned by `dx.contract_info`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContractInfo {
    #[serde(rename = "ContractID", deserialize_with = "lenient_u64")]
    pub contract_id: u64,
    #[serde(rename = "ContractVersionID", deserialize_with = "lenient_u64")]
    pub contract_version_id: u64,
    #[serde(default)]
    pub functions: Vec<FunctionInfo>,
}

impl ContractInfo {
    pub fn function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationInfo {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub relays: Vec<String>,
}

/// Transaction record returned by `dx.transaction`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionInfo {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub confirm_state: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    /// Hex-encoded argument payload
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub invocation: Option<InvocationInfo>,
    #[serde(default)]
    pub height: Option<u64>,
    #[serde(default)]
    pub shard: Option<Json>,
}

impl TransactionInfo {
    pub fn is_confirmed(&self) -> bool {
        self.confirm_state
            .as_deref()
            .is_some_and(|s| CONFIRMED_STATES.contains(&s))
    }

    pub fn is_failed(&self) -> bool {
        self.confirm_state.as_deref().is_some_and(|s| FAILED_STATES.contains(&s))
    }

    pub fn is_success(&self) -> bool {
        self.invocation
            .as_ref()
            .and_then(|i| i.status.as_deref())
            .is_some_and(|s| s == INVOCATION_SUCCESS)
    }

    pub fn relays(&self) -> &[String] {
        self.invocation.as_ref().map(|i| i.relays.as_slice()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendResult {
    pub hash: String,
}
