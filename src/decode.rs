use std::fmt;

use tracing::trace;

use crate::{
    FALSE, FLOAT16, FLOAT32, FLOAT64, INDEFINITE, MAJOR_ARRAY, MAJOR_BYTES, MAJOR_MAP,
    MAJOR_NEGATIVE, MAJOR_TAG, MAJOR_TEXT, MAJOR_UNSIGNED, NULL, TRUE, UNDEFINED,
    config::DecoderConfig,
    cursor::ByteCursor,
    error::{CborError, Result},
};

/// The kind of item sitting at the head of the decoder's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    UnsignedInt,
    NegativeInt,
    /// Any float width; half and single precision are widened on decode
    Double,
    Bool,
    Null,
    Undefined,
    Bytes,
    Text,
    ArrayStart,
    MapStart,
    Tag,
    IndefBytesStart,
    IndefTextStart,
    IndefArrayStart,
    IndefMapStart,
    Break,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ElementType::UnsignedInt => "unsigned integer",
            ElementType::NegativeInt => "negative integer",
            ElementType::Double => "float",
            ElementType::Bool => "boolean",
            ElementType::Null => "null",
            ElementType::Undefined => "undefined",
            ElementType::Bytes => "byte string",
            ElementType::Text => "text string",
            ElementType::ArrayStart => "array",
            ElementType::MapStart => "map",
            ElementType::Tag => "tag",
            ElementType::IndefBytesStart => "indefinite-length byte string",
            ElementType::IndefTextStart => "indefinite-length text string",
            ElementType::IndefArrayStart => "indefinite-length array",
            ElementType::IndefMapStart => "indefinite-length map",
            ElementType::Break => "break",
        };
        f.write_str(name)
    }
}

/// A decoded item header together with its argument.
///
/// `Bytes` and `Text` carry the payload length only; the payload itself stays in the cursor
/// until the item is popped or consumed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Element {
    UnsignedInt(u64),
    NegativeInt(u64),
    Double(f64),
    Bool(bool),
    Null,
    Undefined,
    Bytes(u64),
    Text(u64),
    ArrayStart(u64),
    MapStart(u64),
    Tag(u64),
    IndefBytesStart,
    IndefTextStart,
    IndefArrayStart,
    IndefMapStart,
    Break,
}

impl Element {
    pub(crate) fn element_type(&self) -> ElementType {
        match self {
            Element::UnsignedInt(_) => ElementType::UnsignedInt,
            Element::NegativeInt(_) => ElementType::NegativeInt,
            Element::Double(_) => ElementType::Double,
            Element::Bool(_) => ElementType::Bool,
            Element::Null => ElementType::Null,
            Element::Undefined => ElementType::Undefined,
            Element::Bytes(_) => ElementType::Bytes,
            Element::Text(_) => ElementType::Text,
            Element::ArrayStart(_) => ElementType::ArrayStart,
            Element::MapStart(_) => ElementType::MapStart,
            Element::Tag(_) => ElementType::Tag,
            Element::IndefBytesStart => ElementType::IndefBytesStart,
            Element::IndefTextStart => ElementType::IndefTextStart,
            Element::IndefArrayStart => ElementType::IndefArrayStart,
            Element::IndefMapStart => ElementType::IndefMapStart,
            Element::Break => ElementType::Break,
        }
    }
}

/// Pull decoder over a borrowed CBOR document.
///
/// The decoder keeps a single-slot lookahead: [`peek_type`](Self::peek_type) decodes the next
/// header and caches it, and every consume or pop clears the cache. Byte and text strings are
/// returned as slices of the input, never copied.
///
/// ```
/// use cbor_item::{Decoder, ElementType};
///
/// // [1, "a"]
/// let mut decoder = Decoder::new(&[0x82, 0x01, 0x61, 0x61]);
/// assert_eq!(decoder.pop_next_array_start().unwrap(), 2);
/// assert_eq!(decoder.peek_type().unwrap(), ElementType::UnsignedInt);
/// assert_eq!(decoder.pop_next_unsigned_int().unwrap(), 1);
/// assert_eq!(decoder.pop_next_text().unwrap(), "a");
/// assert_eq!(decoder.get_remaining_length(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    cursor: ByteCursor<'a>,
    cached: Option<Element>,
    config: DecoderConfig,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, DecoderConfig::default())
    }

    pub fn with_config(data: &'a [u8], config: DecoderConfig) -> Self {
        Decoder {
            cursor: ByteCursor::new(data),
            cached: None,
            config,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub(crate) fn malformed(&self, reason: &'static str) -> CborError {
        trace!(
            "Rejecting CBOR input at offset {}: {reason}",
            self.cursor.position()
        );
        CborError::MalformedInput(reason)
    }

    fn read_argument(&mut self, info: u8) -> Result<u64> {
        let (value, shortest_min) = match info {
            0..=23 => return Ok(info as u64),
            24 => (self.cursor.read_u8()? as u64, 24),
            25 => (self.cursor.read_u16()? as u64, 1 << 8),
            26 => (self.cursor.read_u32()? as u64, 1 << 16),
            27 => (self.cursor.read_u64()?, 1 << 32),
            _ => return Err(self.malformed("reserved additional information value")),
        };
        if self.config.reject_non_canonical && value < shortest_min {
            return Err(self.malformed("argument not encoded in shortest form"));
        }
        Ok(value)
    }

    fn decode_header(&mut self) -> Result<Element> {
        let initial = self.cursor.read_u8()?;
        let major = initial >> 5;
        let info = initial & 0x1f;

        if info == INDEFINITE {
            return match major {
                MAJOR_BYTES => Ok(Element::IndefBytesStart),
                MAJOR_TEXT => Ok(Element::IndefTextStart),
                MAJOR_ARRAY => Ok(Element::IndefArrayStart),
                MAJOR_MAP => Ok(Element::IndefMapStart),
                MAJOR_UNSIGNED | MAJOR_NEGATIVE | MAJOR_TAG => {
                    Err(self.malformed("indefinite length on integer or tag"))
                }
                _ => Ok(Element::Break),
            };
        }

        match major {
            MAJOR_UNSIGNED => self.read_argument(info).map(Element::UnsignedInt),
            MAJOR_NEGATIVE => self.read_argument(info).map(Element::NegativeInt),
            MAJOR_BYTES => self.read_argument(info).map(Element::Bytes),
            MAJOR_TEXT => self.read_argument(info).map(Element::Text),
            MAJOR_ARRAY => self.read_argument(info).map(Element::ArrayStart),
            MAJOR_MAP => self.read_argument(info).map(Element::MapStart),
            MAJOR_TAG => self.read_argument(info).map(Element::Tag),
            // major type 7: simple values and floats
            _ => match info {
                FALSE => Ok(Element::Bool(false)),
                TRUE => Ok(Element::Bool(true)),
                NULL => Ok(Element::Null),
                UNDEFINED => Ok(Element::Undefined),
                FLOAT16 => {
                    let bits = self.cursor.read_u16()?;
                    Ok(Element::Double(half::f16::from_bits(bits).to_f64()))
                }
                FLOAT32 => {
                    let bits = self.cursor.read_u32()?;
                    Ok(Element::Double(f32::from_bits(bits) as f64))
                }
                FLOAT64 => {
                    let bits = self.cursor.read_u64()?;
                    Ok(Element::Double(f64::from_bits(bits)))
                }
                _ => Err(self.malformed("unsupported simple value")),
            },
        }
    }

    pub(crate) fn peek_element(&mut self) -> Result<Element> {
        if let Some(element) = self.cached {
            return Ok(element);
        }
        let element = self.decode_header()?;
        self.cached = Some(element);
        Ok(element)
    }

    pub(crate) fn clear_cache(&mut self) {
        self.cached = None;
    }

    /// Reports the type of the next item without consuming it.
    ///
    /// The first call decodes the item header and advances past it; repeated calls return
    /// the cached type and do not move the cursor.
    pub fn peek_type(&mut self) -> Result<ElementType> {
        self.peek_element().map(|element| element.element_type())
    }

    /// Bytes left in the input, excluding any header already decoded by a peek.
    pub fn get_remaining_length(&self) -> usize {
        self.cursor.remaining_length()
    }

    /// Moves past one item header, and the payload of a definite byte or text string.
    ///
    /// Children of arrays, maps and tags are left in place; see
    /// [`consume_next_data_item`](Self::consume_next_data_item) to skip them too.
    pub fn consume_next_element(&mut self) -> Result<ElementType> {
        let element = self.peek_element()?;
        if let Element::Bytes(len) | Element::Text(len) = element {
            self.cursor.skip(len)?;
        }
        self.cached = None;
        Ok(element.element_type())
    }

    fn expect<T>(
        &mut self,
        expected: ElementType,
        extract: impl FnOnce(Element) -> Option<T>,
    ) -> Result<T> {
        let element = self.peek_element()?;
        extract(element).ok_or(CborError::TypeMismatch {
            expected,
            found: element.element_type(),
        })
    }

    fn pop<T>(
        &mut self,
        expected: ElementType,
        extract: impl FnOnce(Element) -> Option<T>,
    ) -> Result<T> {
        let value = self.expect(expected, extract)?;
        self.cached = None;
        Ok(value)
    }

    pub fn pop_next_unsigned_int(&mut self) -> Result<u64> {
        self.pop(ElementType::UnsignedInt, |element| match element {
            Element::UnsignedInt(value) => Some(value),
            _ => None,
        })
    }

    /// Returns the magnitude `n` of the negative integer `-1 - n`.
    pub fn pop_next_negative_int(&mut self) -> Result<u64> {
        self.pop(ElementType::NegativeInt, |element| match element {
            Element::NegativeInt(magnitude) => Some(magnitude),
            _ => None,
        })
    }

    pub fn pop_next_double(&mut self) -> Result<f64> {
        self.pop(ElementType::Double, |element| match element {
            Element::Double(value) => Some(value),
            _ => None,
        })
    }

    pub fn pop_next_bool(&mut self) -> Result<bool> {
        self.pop(ElementType::Bool, |element| match element {
            Element::Bool(value) => Some(value),
            _ => None,
        })
    }

    pub fn pop_next_null(&mut self) -> Result<()> {
        self.pop(ElementType::Null, |element| match element {
            Element::Null => Some(()),
            _ => None,
        })
    }

    pub fn pop_next_undefined(&mut self) -> Result<()> {
        self.pop(ElementType::Undefined, |element| match element {
            Element::Undefined => Some(()),
            _ => None,
        })
    }

    /// Pops a definite-length byte string as a slice of the input.
    pub fn pop_next_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.expect(ElementType::Bytes, |element| match element {
            Element::Bytes(len) => Some(len),
            _ => None,
        })?;
        let bytes = self.cursor.read_len(len)?;
        self.cached = None;
        Ok(bytes)
    }

    /// Pops a definite-length text string as a slice of the input.
    pub fn pop_next_text(&mut self) -> Result<&'a str> {
        let len = self.expect(ElementType::Text, |element| match element {
            Element::Text(len) => Some(len),
            _ => None,
        })?;
        let raw = self.cursor.read_len(len)?;
        self.cached = None;
        Ok(std::str::from_utf8(raw)?)
    }

    /// Pops a definite array header, returning its element count.
    pub fn pop_next_array_start(&mut self) -> Result<u64> {
        self.pop(ElementType::ArrayStart, |element| match element {
            Element::ArrayStart(count) => Some(count),
            _ => None,
        })
    }

    /// Pops a definite map header, returning its number of key/value pairs.
    pub fn pop_next_map_start(&mut self) -> Result<u64> {
        self.pop(ElementType::MapStart, |element| match element {
            Element::MapStart(count) => Some(count),
            _ => None,
        })
    }

    pub fn pop_next_tag(&mut self) -> Result<u64> {
        self.pop(ElementType::Tag, |element| match element {
            Element::Tag(tag) => Some(tag),
            _ => None,
        })
    }
}
