use crate::error::{CborError, Result};

/// A read position over a borrowed byte slice.
///
/// Reads never copy: they hand back sub-slices of the original input, so anything decoded
/// through the cursor lives as long as the input itself.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, position: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining_length(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining_length() == 0
    }

    /// Offset of the next unread byte from the start of the input.
    pub fn position(&self) -> usize {
        self.position
    }

    fn insufficient(&self, needed: u64) -> CborError {
        CborError::InsufficientData {
            needed,
            remaining: self.remaining_length(),
        }
    }

    /// Returns the next byte without advancing.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.position)
            .copied()
            .ok_or_else(|| self.insufficient(1))
    }

    /// Returns the next `len` bytes and advances past them.
    ///
    /// The cursor does not move when fewer than `len` bytes remain.
    pub fn read(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining_length() {
            return Err(self.insufficient(len as u64));
        }
        let start = self.position;
        self.position += len;
        Ok(&self.data[start..self.position])
    }

    /// Like [`read`](Self::read) but for lengths taken straight from a CBOR header.
    pub fn read_len(&mut self, len: u64) -> Result<&'a [u8]> {
        match usize::try_from(len) {
            Ok(len) => self.read(len),
            Err(_) => Err(self.insufficient(len)),
        }
    }

    pub fn skip(&mut self, len: u64) -> Result<()> {
        self.read_len(len).map(|_| ())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read(N)?);
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek_byte()?;
        self.position += 1;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_be_bytes)
    }
}
