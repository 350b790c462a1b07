//! # Contract Identifiers
//!
//! Four views over the same packed 64-bit layout (see [`crate::encoding`]):
//!
//! ```text
//! ContractId:         [dapp:28][engine:4][sn:12][------ 20 bits raw ------]
//! ContractVersionId:  [dapp:28][engine:4][sn:12][-- 12 --][  build:8     ]
//! ContractScopeId:    [dapp:28][engine:4][sn:12][ scope:12][---- 8 ------]
//! ContractInvokeId:   [dapp:28][engine:4][sn:12][ scope:12][  build:8     ]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::encoding::{
    extract_build, extract_dapp, extract_engine, extract_scope, extract_sn, pack_contract_id,
    CORE_CONTRACT_RVM, CORE_CONTRACT_SCOPE_SHIFT, CORE_CONTRACT_SN_MASK, SCOPE_BUILD_MASK,
};

/// Reserved dapp id of the built-in core dapp
pub const DAPP_ID_CORE: u32 = 1;

/// Engine id of the built-in core engine
pub const ENGINE_ID_CORE: u8 = 1;

/// Core contract bytes (serial number with scope in the top two bits)
pub const CORE_CONTRACT_COIN_GLOBAL: u8 = 0x00;
pub const CORE_CONTRACT_DELEGATION_SHARD: u8 = 0x41;
pub const CORE_CONTRACT_REGULATION_GLOBAL: u8 = 0x02;
pub const CORE_CONTRACT_COIN: u8 = 0x80;
pub const CORE_CONTRACT_DELEGATION: u8 = 0x86;
pub const CORE_CONTRACT_REGULATION: u8 = 0x88;

/// State partitioning of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Scope {
    Global = 0,
    Shard = 1,
    Address = 2,
}

impl Scope {
    /// Decode from the numeric scope value
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Scope::Global),
            1 => Some(Scope::Shard),
            2 => Some(Scope::Address),
            _ => None,
        }
    }
}

macro_rules! contract_id_common {
    ($name:ident) => {
        impl $name {
            /// Wrap a raw 64-bit identifier
            #[inline]
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Raw 64-bit identifier
            #[inline]
            pub const fn to_raw(self) -> u64 {
                self.0
            }

            /// Serial number (bits 20-31)
            #[inline]
            pub const fn sn(self) -> u16 {
                extract_sn(self.0)
            }

            /// Engine id (bits 32-35)
            #[inline]
            pub const fn engine_id(self) -> u8 {
                extract_engine(self.0)
            }

            /// DApp id (bits 36-63)
            #[inline]
            pub const fn dapp_id(self) -> u32 {
                extract_dapp(self.0)
            }

            /// True for contracts of the built-in core dapp
            #[inline]
            pub const fn is_core_dapp(self) -> bool {
                self.dapp_id() == DAPP_ID_CORE && self.engine_id() == ENGINE_ID_CORE
            }

            /// The bare contract id (scope and build cleared)
            #[inline]
            pub const fn contract_id(self) -> ContractId {
                ContractId(self.0 & !SCOPE_BUILD_MASK)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

/// Bare contract id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(u64);

/// Contract id with a build number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractVersionId(u64);

/// Contract id with a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractScopeId(u64);

/// Contract id with both scope and build, as carried by RVM transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractInvokeId(u64);

contract_id_common!(ContractId);
contract_id_common!(ContractVersionId);
contract_id_common!(ContractScopeId);
contract_id_common!(ContractInvokeId);

impl ContractId {
    pub const fn new(dapp_id: u32, engine_id: u8, sn: u16) -> Self {
        Self(pack_contract_id(dapp_id, engine_id, sn, 0, 0))
    }

    /// Scope bits as carried in the low 20 bits of a contract id
    #[inline]
    pub const fn scope(self) -> u16 {
        extract_scope(self.0)
    }
}

impl ContractVersionId {
    pub const fn new(dapp_id: u32, engine_id: u8, sn: u16, build: u8) -> Self {
        Self(pack_contract_id(dapp_id, engine_id, sn, 0, build))
    }

    #[inline]
    pub const fn build(self) -> u8 {
        extract_build(self.0)
    }
}

impl ContractScopeId {
    pub const fn new(dapp_id: u32, engine_id: u8, sn: u16, scope: u16) -> Self {
        Self(pack_contract_id(dapp_id, engine_id, sn, scope, 0))
    }

    #[inline]
    pub const fn scope(self) -> u16 {
        extract_scope(self.0)
    }
}

impl ContractInvokeId {
    pub const fn new(dapp_id: u32, engine_id: u8, sn: u16, scope: u16, build: u8) -> Self {
        Self(pack_contract_id(dapp_id, engine_id, sn, scope, build))
    }

    /// Combine the scope of a contract id with the build of its version id
    pub const fn from_ids(contract: ContractId, version: ContractVersionId) -> Self {
        Self::new(
            contract.dapp_id(),
            contract.engine_id(),
            contract.sn(),
            contract.scope(),
            version.build(),
        )
    }

    #[inline]
    pub const fn scope(self) -> u16 {
        extract_scope(self.0)
    }

    #[inline]
    pub const fn build(self) -> u8 {
        extract_build(self.0)
    }

    /// Byte selecting the target contract in a transaction header
    ///
    /// Core dapp contracts map to their serial number (with the global/shard
    /// remaps below); every other contract uses the RVM sentinel in the low
    /// six bits and its scope in the top two.
    ///
    /// `None` when the contract has no single-byte form. Core serial numbers
    /// must fit a byte without hitting the RVM sentinel; other contracts need
    /// a scope of at most two bits.
    pub fn core_contract_byte(self) -> Option<u8> {
        if self.is_core_dapp() {
            let sn = u8::try_from(self.sn()).ok()?;
            if sn & CORE_CONTRACT_SN_MASK == CORE_CONTRACT_RVM {
                return None;
            }
            let scope = self.scope();
            Some(if sn == CORE_CONTRACT_COIN && scope == Scope::Global as u16 {
                CORE_CONTRACT_COIN_GLOBAL
            } else if sn == CORE_CONTRACT_DELEGATION && scope == Scope::Shard as u16 {
                CORE_CONTRACT_DELEGATION_SHARD
            } else if sn == CORE_CONTRACT_REGULATION && scope == Scope::Global as u16 {
                CORE_CONTRACT_REGULATION_GLOBAL
            } else {
                sn
            })
        } else {
            let scope = u8::try_from(self.scope()).ok().filter(|&scope| scope <= 3)?;
            Some(CORE_CONTRACT_RVM | (scope << CORE_CONTRACT_SCOPE_SHIFT))
        }
    }
}

impl fmt::Display for ContractInvokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ContractInvokeId({:#x}: dapp={}, engine={}, sn={}, scope={}, build={})",
            self.0,
            self.dapp_id(),
            self.engine_id(),
            self.sn(),
            self.scope(),
            self.build()
        )
    }
}
