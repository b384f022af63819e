//! Skipping of complete data items.
//!
//! Nested structure is tracked on an explicit work-list instead of the call stack, so the
//! nesting limit in [`DecoderConfig`](crate::DecoderConfig) is the only bound on depth and
//! hostile input cannot exhaust the stack.

use tracing::trace;

use crate::{
    decode::{Decoder, Element, ElementType},
    error::{CborError, Result},
};

/// What an open container still expects before it is complete.
#[derive(Debug)]
enum Pending {
    /// Items left in a definite array, map or tag
    Items(u64),
    /// Chunks of an indefinite string, each a definite string of this type
    Chunks(ElementType),
    /// Elements of an indefinite array
    Elements,
    /// Entries of an indefinite map; `odd` when a key is waiting for its value
    Entries { odd: bool },
}

impl<'a> Decoder<'a> {
    /// Moves past one complete data item, including all of its children.
    ///
    /// Tags skip their content, arrays and maps their elements and entries, and
    /// indefinite-length items everything up to and including their break marker. Nothing is
    /// materialized. On error the position of the decoder is unspecified.
    pub fn consume_next_data_item(&mut self) -> Result<()> {
        let mut pending = Vec::new();
        self.skip_element(&mut pending)?;

        while let Some(top) = pending.last_mut() {
            match top {
                Pending::Items(0) => {
                    pending.pop();
                }
                Pending::Items(remaining) => {
                    *remaining -= 1;
                    self.skip_element(&mut pending)?;
                }
                Pending::Chunks(chunk) => {
                    let chunk = *chunk;
                    match self.peek_type()? {
                        ElementType::Break => {
                            self.clear_cache();
                            pending.pop();
                        }
                        found if found == chunk => {
                            self.consume_next_element()?;
                        }
                        _ => return Err(self.malformed("invalid chunk in indefinite-length string")),
                    }
                }
                Pending::Elements => {
                    if self.peek_type()? == ElementType::Break {
                        self.clear_cache();
                        pending.pop();
                    } else {
                        self.skip_element(&mut pending)?;
                    }
                }
                Pending::Entries { odd } => {
                    if self.peek_type()? == ElementType::Break {
                        if *odd {
                            return Err(self.malformed("indefinite-length map key without value"));
                        }
                        self.clear_cache();
                        pending.pop();
                    } else {
                        *odd = !*odd;
                        self.skip_element(&mut pending)?;
                    }
                }
            }
        }
        Ok(())
    }

    // Consumes the header at the cursor. Scalars are skipped whole; containers push a frame
    // describing the children still to come.
    fn skip_element(&mut self, pending: &mut Vec<Pending>) -> Result<()> {
        let frame = match self.peek_element()? {
            Element::Tag(_) => Pending::Items(1),
            Element::ArrayStart(count) => Pending::Items(count),
            Element::MapStart(count) => match count.checked_mul(2) {
                Some(items) => Pending::Items(items),
                None => {
                    return Err(CborError::InsufficientData {
                        needed: u64::MAX,
                        remaining: self.get_remaining_length(),
                    });
                }
            },
            Element::IndefBytesStart => Pending::Chunks(ElementType::Bytes),
            Element::IndefTextStart => Pending::Chunks(ElementType::Text),
            Element::IndefArrayStart => Pending::Elements,
            Element::IndefMapStart => Pending::Entries { odd: false },
            Element::Break => {
                return Err(self.malformed("break outside an indefinite-length item"));
            }
            _ => {
                self.consume_next_element()?;
                return Ok(());
            }
        };
        self.clear_cache();

        let max_nesting = self.config().max_nesting;
        if pending.len() >= max_nesting {
            trace!("Skipping CBOR data item nested deeper than {max_nesting} levels");
            return Err(CborError::NestingTooDeep(max_nesting));
        }
        pending.push(frame);
        Ok(())
    }
}
