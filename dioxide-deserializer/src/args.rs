//! Function argument deserialization

use dioxide_spec::{Signature, Value};
use tracing::debug;

use crate::decoder::decode;
use crate::error::{DeserializeError, Result};

/// Decode arguments in signature order; the payload must be consumed exactly
pub fn deserialize_args(signature: &Signature, bytes: &[u8]) -> Result<Vec<(String, Value)>> {
    let mut input = bytes;
    let mut args = Vec::with_capacity(signature.len());
    for param in signature {
        args.push((param.name.clone(), decode(&param.ty, &mut input)?));
    }
    if !input.is_empty() {
        return Err(DeserializeError::TrailingBytes(input.len()));
    }
    debug!(params = signature.len(), bytes = bytes.len(), "deserialized arguments");
    Ok(args)
}
