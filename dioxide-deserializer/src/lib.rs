//! Dioxide Argument Deserializer
//!
//! Decode the Dioxide binary argument format back into typed values and
//! format them as JSON or text.
//!
//! ## Example
//!
//! ```rust
//! use dioxide_deserializer::deserialize_str;
//! use dioxide_spec::Value;
//!
//! let (value, next) = deserialize_str("string", b"\x05\x00hello", 0).unwrap();
//! assert_eq!(value, Value::from("hello"));
//! assert_eq!(next, 7);
//! ```

pub mod args;
pub mod decoder;
pub mod error;
pub mod formatter;

pub use args::deserialize_args;
pub use decoder::{decode, deserialize, deserialize_exact, deserialize_str};
pub use error::{DeserializeError, Result};
pub use formatter::{args_to_json, format_args, format_value, value_to_json};
