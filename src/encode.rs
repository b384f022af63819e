use crate::{
    BREAK, FALSE, FLOAT64, INDEFINITE, MAJOR_ARRAY, MAJOR_BYTES, MAJOR_MAP, MAJOR_NEGATIVE,
    MAJOR_SIMPLE, MAJOR_TAG, MAJOR_TEXT, MAJOR_UNSIGNED, NULL, TRUE, UNDEFINED,
};
#[cfg(feature = "compact_floats")]
use crate::{FLOAT16, FLOAT32};

/// Append-only CBOR writer.
///
/// Every `write_*` call appends exactly one header (plus payload for strings and floats).
/// Nothing checks that arrays, maps and tags are followed by the right number of items; that
/// is the caller's responsibility.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    data: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Encoder {
            data: Vec::with_capacity(capacity),
        }
    }

    // Shortest-form header: 0..=23 inline, then 1, 2, 4 or 8 trailing bytes.
    fn write_type_value(&mut self, major: u8, value: u64) {
        if value < 24 {
            self.data.push((major << 5) | value as u8);
        } else if value < 256 {
            self.data.extend_from_slice(&[(major << 5) | 24, value as u8]);
        } else if value < 65536 {
            self.data.push((major << 5) | 25);
            self.data.extend_from_slice(&(value as u16).to_be_bytes());
        } else if value < 4294967296 {
            self.data.push((major << 5) | 26);
            self.data.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.data.push((major << 5) | 27);
            self.data.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn write_simple(&mut self, info: u8) {
        self.data.push((MAJOR_SIMPLE << 5) | info);
    }

    pub fn write_uint(&mut self, value: u64) {
        self.write_type_value(MAJOR_UNSIGNED, value)
    }

    /// Writes the negative integer `-1 - magnitude`.
    pub fn write_negint(&mut self, magnitude: u64) {
        self.write_type_value(MAJOR_NEGATIVE, magnitude)
    }

    pub fn write_int(&mut self, value: i64) {
        if value >= 0 {
            self.write_uint(value as u64)
        } else {
            self.write_negint((-1 - value) as u64)
        }
    }

    #[cfg(not(feature = "compact_floats"))]
    pub fn write_double(&mut self, value: f64) {
        self.write_simple(FLOAT64);
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes `value` in the narrowest float width that reproduces its exact bit pattern.
    #[cfg(feature = "compact_floats")]
    pub fn write_double(&mut self, value: f64) {
        let bits = value.to_bits();
        let half = half::f16::from_f64(value);
        if half.to_f64().to_bits() == bits {
            self.write_simple(FLOAT16);
            self.data.extend_from_slice(&half.to_be_bytes());
        } else if ((value as f32) as f64).to_bits() == bits {
            self.write_simple(FLOAT32);
            self.data.extend_from_slice(&(value as f32).to_be_bytes());
        } else {
            self.write_simple(FLOAT64);
            self.data.extend_from_slice(&value.to_be_bytes());
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_type_value(MAJOR_BYTES, bytes.len() as u64);
        self.data.extend_from_slice(bytes);
    }

    pub fn write_string(&mut self, text: &str) {
        self.write_type_value(MAJOR_TEXT, text.len() as u64);
        self.data.extend_from_slice(text.as_bytes());
    }

    /// Starts an array; exactly `count` items must follow.
    pub fn write_array_start(&mut self, count: u64) {
        self.write_type_value(MAJOR_ARRAY, count)
    }

    /// Starts a map; exactly `count` key/value pairs must follow.
    pub fn write_map_start(&mut self, count: u64) {
        self.write_type_value(MAJOR_MAP, count)
    }

    /// Writes a tag number; exactly one data item must follow.
    pub fn write_tag(&mut self, tag: u64) {
        self.write_type_value(MAJOR_TAG, tag)
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_simple(if value { TRUE } else { FALSE })
    }

    pub fn write_null(&mut self) {
        self.write_simple(NULL)
    }

    pub fn write_undefined(&mut self) {
        self.write_simple(UNDEFINED)
    }

    /// Starts a chunked byte string; follow with definite byte strings and [`write_break`](Self::write_break).
    pub fn write_indef_bytes_start(&mut self) {
        self.data.push((MAJOR_BYTES << 5) | INDEFINITE)
    }

    /// Starts a chunked text string; follow with definite text strings and [`write_break`](Self::write_break).
    pub fn write_indef_string_start(&mut self) {
        self.data.push((MAJOR_TEXT << 5) | INDEFINITE)
    }

    pub fn write_indef_array_start(&mut self) {
        self.data.push((MAJOR_ARRAY << 5) | INDEFINITE)
    }

    pub fn write_indef_map_start(&mut self) {
        self.data.push((MAJOR_MAP << 5) | INDEFINITE)
    }

    pub fn write_break(&mut self) {
        self.data.push(BREAK)
    }

    /// The bytes written so far; empty when nothing has been written.
    ///
    /// The returned slice borrows the encoder, so it cannot outlive further writes. Use
    /// [`into_vec`](Self::into_vec) or `to_vec()` on the slice for an owned snapshot.
    pub fn get_encoded_data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Discards everything written, keeping the allocation.
    pub fn reset(&mut self) {
        self.data.clear()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
