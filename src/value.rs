use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
    ser::SerializeMap,
};
use std::fmt;

use crate::{
    decode::{Decoder, Element},
    encode::Encoder,
    error::{CborError, Result},
};

/// Owned representation of one complete CBOR data item
///
/// Map entries keep their wire order and duplicate keys are preserved. Tag numbers are kept
/// as-is; no tag is interpreted.
///
/// # Example
/// ```
/// use cbor_item::{Value, from_slice, to_vec};
///
/// let value = Value::Map(vec![
///     (Value::Text("name".to_string()), Value::Text("Alice".to_string())),
///     (Value::Text("age".to_string()), Value::Unsigned(30)),
/// ]);
///
/// let bytes = to_vec(&value);
/// let decoded = from_slice(&bytes).unwrap();
/// assert_eq!(value, decoded);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unsigned integer (major type 0)
    Unsigned(u64),
    /// Negative integer `-1 - n`, holding `n` (major type 1)
    Negative(u64),
    /// Floating point value of any width
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Null value
    Null,
    /// Undefined value
    Undefined,
    /// Byte string; chunked strings are joined
    Bytes(Vec<u8>),
    /// Text string; chunked strings are joined
    Text(String),
    /// Array of values
    Array(Vec<Value>),
    /// Map entries in encoded order
    Map(Vec<(Value, Value)>),
    /// Tagged value (tag number, boxed content)
    Tag(u64, Box<Value>),
}

impl Value {
    /// Returns true if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if the value is an unsigned or negative integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Unsigned(_) | Value::Negative(_))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Value::Tag(_, _))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the integer if it fits in an `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Unsigned(n) => i64::try_from(*n).ok(),
            Value::Negative(n) => i64::try_from(*n).ok().map(|n| -1 - n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the tag number and inner value, if this is a tagged value
    pub fn as_tag(&self) -> Option<(u64, &Value)> {
        match self {
            Value::Tag(tag, value) => Some((*tag, value)),
            _ => None,
        }
    }
}

// Tags are transparent outside CBOR; a serializer only sees the content.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Unsigned(n) => serializer.serialize_u64(*n),
            Value::Negative(n) => match i64::try_from(*n) {
                Ok(n) => serializer.serialize_i64(-1 - n),
                Err(_) => serializer.serialize_i128(-1 - *n as i128),
            },
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Null => serializer.serialize_none(),
            Value::Undefined => serializer.serialize_unit(),
            Value::Bytes(b) => serde_bytes::Bytes::new(b).serialize(serializer),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Array(a) => serializer.collect_seq(a),
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Tag(_tag, value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any value representable in CBOR")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                if value >= 0 {
                    Ok(Value::Unsigned(value as u64))
                } else {
                    Ok(Value::Negative((-1 - value) as u64))
                }
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(Value::Unsigned(value))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Text(value.to_owned()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::Text(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> std::result::Result<Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Bytes(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> std::result::Result<Value, E> {
                Ok(Value::Bytes(value))
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_seq<V>(self, mut visitor: V) -> std::result::Result<Value, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = visitor.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<V>(self, mut visitor: V) -> std::result::Result<Value, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = visitor.next_entry()? {
                    entries.push(entry);
                }
                Ok(Value::Map(entries))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// A container being assembled by [`Decoder::pop_next_data_item`].
struct Frame {
    /// Items still expected; `None` until a break for indefinite-length items
    remaining: Option<u64>,
    partial: Partial,
}

enum Partial {
    Array(Vec<Value>),
    Map {
        entries: Vec<(Value, Value)>,
        key: Option<Value>,
    },
    Tag(u64, Option<Value>),
    Bytes(Vec<u8>),
    Text(String),
}

impl Frame {
    fn new(remaining: Option<u64>, partial: Partial) -> Self {
        Frame { remaining, partial }
    }

    fn push(&mut self, value: Value) {
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        match &mut self.partial {
            Partial::Array(items) => items.push(value),
            Partial::Map { entries, key } => match key.take() {
                Some(key) => entries.push((key, value)),
                None => *key = Some(value),
            },
            Partial::Tag(_, content) => *content = Some(value),
            // chunks are appended directly, they never arrive as values
            Partial::Bytes(_) | Partial::Text(_) => {}
        }
    }

    fn into_value(self) -> std::result::Result<Value, &'static str> {
        match self.partial {
            Partial::Array(items) => Ok(Value::Array(items)),
            Partial::Map { key: Some(_), .. } => Err("indefinite-length map key without value"),
            Partial::Map { entries, .. } => Ok(Value::Map(entries)),
            Partial::Tag(tag, Some(content)) => Ok(Value::Tag(tag, Box::new(content))),
            Partial::Tag(_, None) => Err("tag without content"),
            Partial::Bytes(bytes) => Ok(Value::Bytes(bytes)),
            Partial::Text(text) => Ok(Value::Text(text)),
        }
    }
}

enum Step {
    Value(Value),
    Open(Frame),
    Close,
    Chunk,
}

impl<'a> Decoder<'a> {
    /// Decodes one complete data item into an owned [`Value`].
    ///
    /// Chunked strings are joined, every chunk must be a definite string of the same type
    /// and text chunks must each be valid UTF-8. Nesting is bounded by
    /// [`DecoderConfig::max_nesting`](crate::DecoderConfig::max_nesting).
    pub fn pop_next_data_item(&mut self) -> Result<Value> {
        let mut stack: Vec<Frame> = Vec::new();
        loop {
            let value = match self.next_step(stack.last_mut())? {
                Step::Chunk => continue,
                Step::Open(frame) => {
                    let max_nesting = self.config().max_nesting;
                    if stack.len() >= max_nesting {
                        tracing::trace!(
                            "Decoding CBOR data item nested deeper than {max_nesting} levels"
                        );
                        return Err(CborError::NestingTooDeep(max_nesting));
                    }
                    stack.push(frame);
                    continue;
                }
                Step::Value(value) => value,
                Step::Close => {
                    let Some(frame) = stack.pop() else {
                        return Err(self.malformed("break outside an indefinite-length item"));
                    };
                    frame.into_value().map_err(|reason| self.malformed(reason))?
                }
            };
            match stack.last_mut() {
                Some(parent) => parent.push(value),
                None => return Ok(value),
            }
        }
    }

    fn next_step(&mut self, parent: Option<&mut Frame>) -> Result<Step> {
        if let Some(parent) = parent {
            if parent.remaining == Some(0) {
                return Ok(Step::Close);
            }
            let indefinite = parent.remaining.is_none();
            let element = self.peek_element()?;
            match (&mut parent.partial, element) {
                (_, Element::Break) if indefinite => {
                    self.clear_cache();
                    return Ok(Step::Close);
                }
                (Partial::Bytes(bytes), Element::Bytes(_)) => {
                    bytes.extend_from_slice(self.pop_next_bytes()?);
                    return Ok(Step::Chunk);
                }
                (Partial::Text(text), Element::Text(_)) => {
                    text.push_str(self.pop_next_text()?);
                    return Ok(Step::Chunk);
                }
                (Partial::Bytes(_) | Partial::Text(_), _) => {
                    return Err(self.malformed("invalid chunk in indefinite-length string"));
                }
                _ => {}
            }
        }

        let frame = match self.peek_element()? {
            Element::UnsignedInt(n) => return Ok(self.scalar(Value::Unsigned(n))),
            Element::NegativeInt(n) => return Ok(self.scalar(Value::Negative(n))),
            Element::Double(f) => return Ok(self.scalar(Value::Float(f))),
            Element::Bool(b) => return Ok(self.scalar(Value::Bool(b))),
            Element::Null => return Ok(self.scalar(Value::Null)),
            Element::Undefined => return Ok(self.scalar(Value::Undefined)),
            Element::Bytes(_) => {
                return Ok(Step::Value(Value::Bytes(self.pop_next_bytes()?.to_vec())));
            }
            Element::Text(_) => {
                return Ok(Step::Value(Value::Text(self.pop_next_text()?.to_owned())));
            }
            Element::Break => {
                return Err(self.malformed("break outside an indefinite-length item"));
            }
            Element::ArrayStart(count) => Frame::new(Some(count), Partial::Array(Vec::new())),
            Element::MapStart(count) => match count.checked_mul(2) {
                Some(items) => Frame::new(
                    Some(items),
                    Partial::Map {
                        entries: Vec::new(),
                        key: None,
                    },
                ),
                None => {
                    return Err(CborError::InsufficientData {
                        needed: u64::MAX,
                        remaining: self.get_remaining_length(),
                    });
                }
            },
            Element::Tag(tag) => Frame::new(Some(1), Partial::Tag(tag, None)),
            Element::IndefBytesStart => Frame::new(None, Partial::Bytes(Vec::new())),
            Element::IndefTextStart => Frame::new(None, Partial::Text(String::new())),
            Element::IndefArrayStart => Frame::new(None, Partial::Array(Vec::new())),
            Element::IndefMapStart => Frame::new(
                None,
                Partial::Map {
                    entries: Vec::new(),
                    key: None,
                },
            ),
        };
        self.clear_cache();
        Ok(Step::Open(frame))
    }

    fn scalar(&mut self, value: Value) -> Step {
        self.clear_cache();
        Step::Value(value)
    }
}

impl Encoder {
    /// Writes a whole [`Value`] tree using definite lengths throughout.
    ///
    /// Children wait on an explicit work-list, so trees of any depth can be written.
    pub fn write_value(&mut self, value: &Value) {
        let mut pending = vec![value];
        while let Some(item) = pending.pop() {
            match item {
                Value::Unsigned(n) => self.write_uint(*n),
                Value::Negative(n) => self.write_negint(*n),
                Value::Float(f) => self.write_double(*f),
                Value::Bool(b) => self.write_bool(*b),
                Value::Null => self.write_null(),
                Value::Undefined => self.write_undefined(),
                Value::Bytes(b) => self.write_bytes(b),
                Value::Text(s) => self.write_string(s),
                Value::Array(items) => {
                    self.write_array_start(items.len() as u64);
                    pending.extend(items.iter().rev());
                }
                Value::Map(entries) => {
                    self.write_map_start(entries.len() as u64);
                    for (key, value) in entries.iter().rev() {
                        pending.push(value);
                        pending.push(key);
                    }
                }
                Value::Tag(tag, content) => {
                    self.write_tag(*tag);
                    pending.push(content.as_ref());
                }
            }
        }
    }
}
