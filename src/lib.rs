//! # CBOR item codec
//!
//! A streaming CBOR (Concise Binary Object Representation, RFC 8949) encoder and decoder built
//! around a peek/consume item model.
//!
//! ## Features
//! - Append-only [`Encoder`] with one `write_*` method per item kind, shortest-form headers
//! - Pull [`Decoder`] over a borrowed slice with a one-item lookahead ([`Decoder::peek_type`])
//!   and typed `pop_next_*` accessors that never copy byte or text payloads
//! - Skipping of complete data items ([`Decoder::consume_next_data_item`]) across tags, arrays,
//!   maps and indefinite-length items, without recursion on the call stack
//! - Owned [`Value`] trees for callers that want the whole item at once
//! - Resource limits for untrusted input via [`DecoderConfig`]
//!
//! Tag numbers are reported as plain `u64`s; no tag is interpreted.
//!
//! ## Float encoding
//! [`Encoder::write_double`] always writes 8-byte doubles. Enable the `compact_floats` feature
//! to write the shortest of f16/f32/f64 that keeps the exact bit pattern. Decoding accepts all
//! three widths either way.
//!
//! ## Example
//! ```rust
//! use cbor_item::{Decoder, ElementType, Encoder};
//!
//! let mut encoder = Encoder::new();
//! encoder.write_tag(32);
//! encoder.write_string("https://example.com");
//! encoder.write_map_start(1);
//! encoder.write_string("skip me");
//! encoder.write_array_start(2);
//! encoder.write_bool(true);
//! encoder.write_null();
//! encoder.write_uint(7);
//!
//! let mut decoder = Decoder::new(encoder.get_encoded_data());
//! assert_eq!(decoder.pop_next_tag().unwrap(), 32);
//! assert_eq!(decoder.pop_next_text().unwrap(), "https://example.com");
//! assert_eq!(decoder.peek_type().unwrap(), ElementType::MapStart);
//! decoder.consume_next_data_item().unwrap();
//! assert_eq!(decoder.pop_next_unsigned_int().unwrap(), 7);
//! ```

pub mod config;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod error;
mod skip;
pub mod value;

pub use config::{DEFAULT_MAX_NESTING, DecoderConfig};
pub use cursor::ByteCursor;
pub use decode::{Decoder, ElementType};
pub use encode::Encoder;
pub use error::{CborError, Result};
pub use value::Value;

// CBOR major types
const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE: u8 = 7;

// Additional info values
const FALSE: u8 = 20;
const TRUE: u8 = 21;
const NULL: u8 = 22;
const UNDEFINED: u8 = 23;
const FLOAT16: u8 = 25;
const FLOAT32: u8 = 26;
const FLOAT64: u8 = 27;
const INDEFINITE: u8 = 31;

// Terminates indefinite-length items
const BREAK: u8 = (MAJOR_SIMPLE << 5) | INDEFINITE;

// Convenience functions
pub fn to_vec(value: &Value) -> Vec<u8> {
    let mut encoder = Encoder::new();
    encoder.write_value(value);
    encoder.into_vec()
}

/// Decodes exactly one data item; trailing bytes are an error.
pub fn from_slice(slice: &[u8]) -> Result<Value> {
    let mut decoder = Decoder::new(slice);
    let value = decoder.pop_next_data_item()?;
    if decoder.get_remaining_length() != 0 {
        return Err(decoder.malformed("trailing data after item"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_types() {
        assert_eq!(from_slice(&to_vec(&Value::Unsigned(42))).unwrap(), Value::Unsigned(42));
        assert_eq!(from_slice(&to_vec(&Value::Negative(41))).unwrap(), Value::Negative(41));
        assert_eq!(from_slice(&to_vec(&Value::Bool(true))).unwrap(), Value::Bool(true));
        assert_eq!(
            from_slice(&to_vec(&Value::Text("hello".to_string()))).unwrap(),
            Value::Text("hello".to_string())
        );
    }

    #[test]
    fn test_trailing_data() {
        assert_eq!(
            from_slice(&[0x01, 0x02]),
            Err(CborError::MalformedInput("trailing data after item"))
        );
        // a complete item followed by a second one
        assert!(matches!(
            from_slice(&[0x82, 0x01, 0x02, 0xf6]),
            Err(CborError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_manual_tag_encoding() {
        let mut encoder = Encoder::new();

        // Manually encode a custom tag (e.g., tag 100) with a string value
        encoder.write_tag(100);
        encoder.write_string("custom tagged value");

        // Tag 100 is encoded as 0xD8 0x64
        let buf = encoder.get_encoded_data();
        assert_eq!(buf[0], 0xD8);
        assert_eq!(buf[1], 100);

        let mut decoder = Decoder::new(buf);
        assert_eq!(decoder.pop_next_tag().unwrap(), 100);
        assert_eq!(decoder.pop_next_text().unwrap(), "custom tagged value");
    }

    #[test]
    fn test_tagged_value_keeps_tag_number() {
        let mut encoder = Encoder::new();
        encoder.write_tag(1);
        encoder.write_uint(1705315800);

        // Tag 1 is encoded as 0xC1 (major type 6, value 1)
        assert_eq!(encoder.get_encoded_data()[0], 0xC1);

        let decoded = from_slice(encoder.get_encoded_data()).unwrap();
        assert_eq!(
            decoded,
            Value::Tag(1, Box::new(Value::Unsigned(1705315800)))
        );
    }

    #[test]
    fn test_large_byte_string_zero_copy() {
        let data = vec![0x5au8; 100_000];
        let mut encoder = Encoder::with_capacity(data.len() + 5);
        encoder.write_bytes(&data);

        // 4-byte length header for 100KB
        let buf = encoder.get_encoded_data();
        assert_eq!(buf.len(), data.len() + 5);
        assert_eq!(&buf[..5], &[0x5a, 0x00, 0x01, 0x86, 0xa0]);

        let mut decoder = Decoder::new(buf);
        let popped = decoder.pop_next_bytes().unwrap();
        assert_eq!(popped, &data[..]);
        assert!(std::ptr::eq(popped.as_ptr(), buf[5..].as_ptr()));
    }
}
