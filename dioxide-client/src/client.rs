//! # Client
//!
//! High-level calls over a [`Transport`]: metadata lookups, local transaction
//! composition, submission and confirmation polling.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value as Json};
use tracing::{debug, info, warn};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dioxide_deserializer::{args_to_json, deserialize_args};
use dioxide_serializer::serialize_args_json;
use dioxide_spec::{Address, AddressType, ContractId, ContractInvokeId, ContractVersionId, Signature, Value};

use crate::account::Ed25519Account;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result, CODE_GENERIC};
use crate::rpc::{
    parse_envelope, ContractInfo, IsnInfo, SendResult, TransactionInfo, Transport, METHOD_CONTRACT_INFO,
    METHOD_ISN, METHOD_SEND, METHOD_TRANSACTION,
};
use crate::transaction::UnsignedTransaction;

/// Name of the built-in dapp whose functions carry no introspectable metadata
pub const CORE_DAPP_NAME: &str = "core";

/// Who a composed transaction is delegated to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delegatee {
    /// The sender's own address
    Sender,
    /// A delegated name, e.g. `"testa"` or `"testa:dapp"`
    Name(String),
}

/// Optional fields of a composed transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Fetched with `dx.isn` when absent
    pub isn: Option<u32>,
    pub delegatee: Option<Delegatee>,
    pub gas_price: Option<u64>,
    pub gas_limit: Option<u32>,
    pub ttl: Option<u16>,
}

/// `dapp.contract.function` split into its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionPath<'a> {
    pub dapp: &'a str,
    pub contract: &'a str,
    pub function: &'a str,
}

impl<'a> FunctionPath<'a> {
    pub fn parse(text: &'a str) -> Result<Self> {
        let mut parts = text.split('.');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(dapp), Some(contract), Some(function), None) => Ok(Self {
                dapp,
                contract,
                function,
            }),
            _ => Err(ClientError::InvalidFunctionName(text.to_string())),
        }
    }
}

/// Split `"hash:N"` into the hash and a shard index
fn split_shard_suffix(hash: &str) -> (&str, Option<u32>) {
    match hash.split_once(':') {
        Some((base, suffix)) if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) => {
            (base, suffix.parse().ok())
        }
        _ => (hash, None),
    }
}

fn resolve_delegatee(name: &str) -> Result<Address> {
    let parsed = if name.contains(':') {
        name.parse::<Address>()
    } else {
        Address::from_name(name, AddressType::Dapp)
    };
    parsed.map_err(|_| ClientError::InvalidDelegatee(name.to_string()))
}

fn is_empty_args(args: &Json) -> bool {
    match args {
        Json::Null => true,
        Json::Object(map) => map.is_empty(),
        Json::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Dioxide node client
#[derive(Debug)]
pub struct Client<T: Transport> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call `method` and unwrap the envelope
    pub fn request(&self, method: &str, params: Json) -> Result<Json> {
        debug!(method, "request");
        let envelope = self.transport.call(method, params)?;
        parse_envelope(method, envelope)
    }

    fn request_as<R: DeserializeOwned>(&self, method: &str, params: Json) -> Result<R> {
        Ok(serde_json::from_value(self.request(method, params)?)?)
    }

    /// Next ISN for an address in text form
    pub fn get_isn(&self, address: &str) -> Result<u32> {
        let info: IsnInfo = self.request_as(METHOD_ISN, json!({ "address": address }))?;
        u32::try_from(info.isn).map_err(|_| ClientError::Rpc {
            code: CODE_GENERIC,
            message: format!("ISN {} out of range", info.isn),
        })
    }

    pub fn get_contract_info(&self, dapp: &str, contract: &str) -> Result<ContractInfo> {
        self.request_as(METHOD_CONTRACT_INFO, json!({ "contract": format!("{}.{}", dapp, contract) }))
    }

    /// Fetch a transaction; a `"hash:N"` suffix selects shard `N`
    pub fn get_transaction(&self, hash: &str, shard_index: Option<u32>) -> Result<TransactionInfo> {
        let (hash, suffix_shard) = split_shard_suffix(hash);
        let mut params = Map::new();
        params.insert("hash".to_string(), Json::from(hash));
        if let Some(shard) = shard_index.or(suffix_shard) {
            params.insert("shard_index".to_string(), Json::from(shard));
        }
        self.request_as(METHOD_TRANSACTION, Json::Object(params))
    }

    /// Submit finalized bytes, returning the transaction hash
    pub fn send_raw_transaction(&self, signed: &[u8]) -> Result<String> {
        let result: SendResult = self.request_as(METHOD_SEND, json!({ "txdata": BASE64.encode(signed) }))?;
        info!(hash = %result.hash, size = signed.len(), "transaction sent");
        Ok(result.hash)
    }

    /// Submit and wait for confirmation within `timeout`
    pub fn send_raw_transaction_sync(&self, signed: &[u8], timeout: Duration) -> Result<String> {
        let hash = self.send_raw_transaction(signed)?;
        self.wait_for_confirmation(&hash, timeout)?;
        Ok(hash)
    }

    /// Build unsigned transaction bytes from contract metadata
    ///
    /// `args` is a JSON object keyed by parameter name, a positional array,
    /// or `null`/empty for a call without arguments.
    pub fn compose_transaction_local(
        &self,
        sender: &Address,
        function: &str,
        args: &Json,
        options: &ComposeOptions,
    ) -> Result<Vec<u8>> {
        let path = FunctionPath::parse(function)?;
        let info = self.get_contract_info(path.dapp, path.contract)?;
        self.compose_with_info(sender, &path, &info, args, options)
    }

    /// Compose against already fetched contract metadata
    pub fn compose_with_info(
        &self,
        sender: &Address,
        path: &FunctionPath<'_>,
        info: &ContractInfo,
        args: &Json,
        options: &ComposeOptions,
    ) -> Result<Vec<u8>> {
        let function = info.function(path.function).ok_or_else(|| ClientError::FunctionNotFound {
            function: path.function.to_string(),
            contract: format!("{}.{}", path.dapp, path.contract),
        })?;

        let contract_id = ContractId::from_raw(info.contract_id);
        let version_id = ContractVersionId::from_raw(info.contract_version_id);
        let invoke_id = ContractInvokeId::from_ids(contract_id, version_id);

        let delegatee = match &options.delegatee {
            None => None,
            Some(Delegatee::Sender) => Some(*sender),
            Some(Delegatee::Name(name)) => Some(resolve_delegatee(name)?),
        };

        let isn = match options.isn {
            Some(isn) => isn,
            None => {
                let isn_address = match (&options.delegatee, &delegatee) {
                    (Some(Delegatee::Name(_)), Some(address)) => address.to_text(),
                    _ => sender.to_account_text(),
                };
                self.get_isn(&isn_address)?
            }
        };

        let input = if is_empty_args(args) {
            Vec::new()
        } else {
            let signature = Signature::parse(&function.signature_text())?;
            serialize_args_json(&signature, args)?
        };

        let mut tx = UnsignedTransaction::with_config(invoke_id, function.opcode, &self.config.tx)
            .isn(isn)
            .input(input);
        if let Some(address) = delegatee {
            tx = tx.delegatee(address);
        }
        if let Some(gas_price) = options.gas_price {
            tx = tx.gas_price(gas_price);
        }
        if let Some(gas_limit) = options.gas_limit {
            tx = tx.gas_limit(gas_limit);
        }
        if let Some(ttl) = options.ttl {
            tx = tx.ttl(ttl);
        }
        tx.serialize()
    }

    /// Compose, sign, solve PoW and submit
    pub fn send_transaction(
        &self,
        account: &Ed25519Account,
        function: &str,
        args: &Json,
        options: &ComposeOptions,
    ) -> Result<String> {
        let unsigned = self.compose_transaction_local(account.address(), function, args, options)?;
        let signed = account.finalize(&unsigned, Instant::now() + self.config.pow_timeout())?;
        self.send_raw_transaction(&signed)
    }

    /// Decode a serialized argument payload against a function's metadata
    ///
    /// Returns `None` when the function cannot be introspected: core dapp
    /// functions, unknown contracts and functions without parameters.
    pub fn decode_input(&self, function: &str, input: &[u8]) -> Result<Option<(Signature, Vec<(String, Value)>)>> {
        if function.is_empty() || input.is_empty() {
            return Ok(None);
        }
        if function.split('.').next() == Some(CORE_DAPP_NAME) {
            return Ok(None);
        }
        let path = FunctionPath::parse(function)?;
        let info = match self.get_contract_info(path.dapp, path.contract) {
            Ok(info) => info,
            Err(err) => {
                warn!(function, error = %err, "contract info unavailable, input left undecoded");
                return Ok(None);
            }
        };
        let meta = info.function(path.function).ok_or_else(|| ClientError::FunctionNotFound {
            function: path.function.to_string(),
            contract: format!("{}.{}", path.dapp, path.contract),
        })?;
        if meta.params.is_empty() {
            return Ok(None);
        }
        let signature = Signature::parse(&meta.signature_text())?;
        let args = deserialize_args(&signature, input)?;
        Ok(Some((signature, args)))
    }

    /// Decode the arguments of a fetched transaction into a JSON object
    ///
    /// Undecodable inputs yield an empty object.
    pub fn decode_transaction_input(&self, tx: &TransactionInfo) -> Result<Json> {
        let (Some(function), Some(input)) = (tx.function.as_deref(), tx.input.as_deref()) else {
            return Err(ClientError::InvalidTransactionObject(
                "transaction lacks Function or Input".to_string(),
            ));
        };
        let input = hex::decode(input.trim())?;
        match self.decode_input(function, &input)? {
            Some((signature, args)) => Ok(args_to_json(&signature, &args)),
            None => Ok(Json::Object(Map::new())),
        }
    }

    /// True once the transaction and every relay it spawned are confirmed
    pub fn is_confirmed_with_relays(&self, hash: &str) -> Result<bool> {
        let mut queue = VecDeque::from([hash.to_string()]);
        while let Some(current) = queue.pop_front() {
            let tx = self.get_transaction(&current, None)?;
            if tx.is_failed() {
                return Err(ClientError::TransactionFailed {
                    hash: current,
                    state: tx.confirm_state.unwrap_or_default(),
                });
            }
            if !tx.is_confirmed() {
                return Ok(false);
            }
            queue.extend(tx.relays().iter().cloned());
        }
        Ok(true)
    }

    /// True once the transaction and every relay succeeded
    pub fn is_success_with_relays(&self, hash: &str) -> Result<bool> {
        let mut queue = VecDeque::from([hash.to_string()]);
        while let Some(current) = queue.pop_front() {
            let tx = self.get_transaction(&current, None)?;
            if !tx.is_success() {
                return Ok(false);
            }
            queue.extend(tx.relays().iter().cloned());
        }
        Ok(true)
    }

    /// Poll until the transaction and its relays are confirmed
    ///
    /// Node errors while polling count as "not yet visible". Fails with
    /// `Timeout` once `timeout` has elapsed and with `TransactionFailed` if a
    /// transaction reaches a terminal failure state.
    pub fn wait_for_confirmation(&self, hash: &str, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        loop {
            match self.is_confirmed_with_relays(hash) {
                Ok(true) => {
                    info!(hash, elapsed_ms = start.elapsed().as_millis() as u64, "transaction confirmed");
                    return Ok(());
                }
                Ok(false) => {}
                Err(ClientError::Rpc { code, message }) => {
                    debug!(hash, code, %message, "transaction not visible yet");
                }
                Err(err) => return Err(err),
            }
            if start.elapsed() >= timeout {
                return Err(ClientError::Timeout(format!("transaction {} not confirmed", hash)));
            }
            std::thread::sleep(self.config.poll_interval().min(timeout.saturating_sub(start.elapsed())));
        }
    }
}
