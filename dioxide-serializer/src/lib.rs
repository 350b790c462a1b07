//! Dioxide Argument Serializer
//!
//! Encode typed values and contract call arguments into the Dioxide binary
//! argument format.
//!
//! ## Example
//!
//! ```rust
//! use dioxide_serializer::serialize_str;
//! use dioxide_spec::Value;
//!
//! let bytes = serialize_str("string", &Value::from("hello")).unwrap();
//! assert_eq!(bytes, b"\x05\x00hello");
//! ```

pub mod args;
pub mod encoder;
pub mod error;
pub mod json;

pub use args::{serialize_args, serialize_args_json};
pub use encoder::{encode_into, serialize, serialize_str};
pub use error::{Result, SerializeError};
pub use json::value_from_json;
