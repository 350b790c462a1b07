//! Function argument serialization
//!
//! Arguments are encoded back-to-back in signature order with no framing of
//! their own; the signature is the only schema.

use dioxide_spec::Signature;
use serde_json::Value as Json;
use tracing::debug;

use crate::encoder::encode_into;
use crate::error::{Result, SerializeError};
use crate::json::value_from_json;
use dioxide_spec::Value;

/// Serialize named arguments in signature order
pub fn serialize_args(signature: &Signature, args: &[(String, Value)]) -> Result<Vec<u8>> {
    if let Some((name, _)) = args
        .iter()
        .find(|(name, _)| !signature.iter().any(|p| &p.name == name))
    {
        return Err(SerializeError::UnknownArgument(name.clone()));
    }

    let mut out = Vec::new();
    for param in signature {
        let (_, value) = args
            .iter()
            .find(|(name, _)| *name == param.name)
            .ok_or_else(|| SerializeError::MissingArgument(param.name.clone()))?;
        encode_into(&param.ty, value, &mut out)?;
    }

    debug!(params = signature.len(), bytes = out.len(), "serialized arguments");
    Ok(out)
}

/// Serialize arguments given as a JSON object (by name) or array (by position)
pub fn serialize_args_json(signature: &Signature, args: &Json) -> Result<Vec<u8>> {
    let named = match args {
        Json::Null => Vec::new(),
        Json::Object(obj) => {
            let mut named = Vec::with_capacity(obj.len());
            for (name, json) in obj {
                let param = signature
                    .iter()
                    .find(|p| &p.name == name)
                    .ok_or_else(|| SerializeError::UnknownArgument(name.clone()))?;
                named.push((name.clone(), value_from_json(&param.ty, json)?));
            }
            named
        }
        Json::Array(items) => {
            if items.len() != signature.len() {
                return Err(SerializeError::validation(
                    signature,
                    format!("expected {} arguments, found {}", signature.len(), items.len()),
                ));
            }
            signature
                .iter()
                .zip(items)
                .map(|(param, json)| Ok((param.name.clone(), value_from_json(&param.ty, json)?)))
                .collect::<Result<_>>()?
        }
        other => {
            return Err(SerializeError::validation(
                signature,
                format!("arguments must be an object or array, found {}", other),
            ))
        }
    };
    serialize_args(signature, &named)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sig(text: &str) -> Signature {
        Signature::parse(text).unwrap()
    }

    #[test]
    fn test_serialize_args_order() {
        let sig = sig("uint32:a,string:b");
        let args = vec![
            ("b".to_string(), Value::from("hello")),
            ("a".to_string(), Value::from(1u32)),
        ];
        assert_eq!(hex::encode(serialize_args(&sig, &args).unwrap()), "01000000050068656c6c6f");
    }

    #[test]
    fn test_missing_and_unknown() {
        let sig = sig("uint32:a,string:b");
        let err = serialize_args(&sig, &[("a".to_string(), Value::from(1u32))]).unwrap_err();
        assert!(matches!(err, SerializeError::MissingArgument(name) if name == "b"));

        let err = serialize_args(
            &sig,
            &[
                ("a".to_string(), Value::from(1u32)),
                ("b".to_string(), Value::from("x")),
                ("c".to_string(), Value::from(2u32)),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SerializeError::UnknownArgument(name) if name == "c"));
    }

    #[test]
    fn test_empty_signature() {
        assert!(serialize_args(&Signature::default(), &[]).unwrap().is_empty());
        assert!(serialize_args_json(&Signature::default(), &json!({})).unwrap().is_empty());
        assert!(serialize_args_json(&Signature::default(), &Json::Null).unwrap().is_empty());
    }

    #[test]
    fn test_json_args() {
        let sig = sig("address:To,bigint:Amount");
        let bytes = serialize_args_json(&sig, &json!({"Amount": "4", "To": "testa:dapp"})).unwrap();
        assert_eq!(bytes.len(), 36 + 9);
        assert_eq!(&bytes[..5], b"testa");
        assert_eq!(&bytes[36..], &hex::decode("010400000000000000").unwrap()[..]);

        let positional = serialize_args_json(&sig, &json!(["testa:dapp", 4])).unwrap();
        assert_eq!(positional, bytes);

        assert!(serialize_args_json(&sig, &json!(["testa:dapp"])).is_err());
        assert!(serialize_args_json(&sig, &json!("x")).is_err());
    }
}
