use alloc::vec;
use alloc::vec::Vec;

use zerocopy::byteorder::{LE, U16};
use zerocopy::IntoBytes;

use crate::{Endianness, TextEncoding};

pub type Result<T> = core::result::Result<T, EncodeError>;

/// Writes fixed-layout binary data into an owned, automatically growing
/// buffer.
///
/// The Encoder keeps a byte offset (the cursor) that most writes advance, and
/// a byte-order flag that multi-byte writes honor. Writes that name an
/// absolute offset (`write_*_at`) leave the cursor alone, which is how offset
/// tables and back-patched length fields are filled in after the fact.
///
/// Writing never fails: any write that would land past the end of the buffer
/// first grows it by exactly the shortfall, and bytes appended by growth are
/// zero-filled. The buffer is never shrunk.
///
/// ```
/// use byte_cursor::Encoder;
///
/// let mut enc = Encoder::with_len(4);
/// enc.write_u16(0x0102);
/// enc.write_u16_at(2, 0x0304);
/// assert_eq!(enc.to_vec(), [0x02, 0x01, 0x04, 0x03]);
/// ```
pub struct Encoder {
    buffer: Vec<u8>,
    offset: usize,
    endianness: Endianness,
}

impl Encoder {
    /// Creates an empty Encoder with the cursor at 0 and little-endian byte
    /// order.
    pub fn new() -> Self {
        Self::with_len(0)
    }

    /// Creates an Encoder whose buffer starts out zero-filled to `len` bytes.
    pub fn with_len(len: usize) -> Self {
        Self {
            buffer: vec![0; len],
            offset: 0,
            endianness: Endianness::Little,
        }
    }

    /// Creates a zero-filled Encoder with an explicit initial byte order.
    pub fn with_endianness(len: usize, endianness: Endianness) -> Self {
        Self {
            endianness,
            ..Self::with_len(len)
        }
    }

    /// Current cursor position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current length of the buffer in bytes, including any zero-filled tail
    /// the cursor has not reached.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Byte order currently applied to multi-byte writes.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Changes the byte order used by subsequent multi-byte writes. Bytes
    /// already written are unaffected.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Borrows the buffer contents as written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns an independent copy of the buffer. Later writes to the Encoder
    /// do not alter a copy taken earlier.
    pub fn to_vec(&self) -> Vec<u8> {
        self.buffer.clone()
    }

    /// Consumes the Encoder and returns the buffer without copying.
    pub fn into_vec(self) -> Vec<u8> {
        self.buffer
    }

    /// Appends `extra` zero-filled bytes to the end of the buffer,
    /// unconditionally.
    pub fn grow(&mut self, extra: usize) {
        self.buffer.resize(self.buffer.len() + extra, 0);
    }

    /// Grows the buffer just enough for `incoming` bytes at the cursor: if
    /// `offset + incoming` exceeds the current length, the buffer is extended
    /// by exactly the deficit. Otherwise nothing happens.
    pub fn grow_if_needed(&mut self, incoming: usize) {
        let needed = self.offset + incoming;
        if needed > self.buffer.len() {
            self.grow(needed - self.buffer.len());
        }
    }

    /// Moves the cursor by `delta` bytes relative to its current position,
    /// growing the buffer as if `delta` bytes were about to be written at the
    /// cursor, and returns the position before the move.
    ///
    /// Seeking to a position before the start of the buffer fails with
    /// [`EncodeError::SeekOutOfRange`] and leaves the cursor and buffer
    /// unchanged.
    pub fn seek(&mut self, delta: isize) -> Result<usize> {
        let previous = self.offset;
        let Some(target) = self.offset.checked_add_signed(delta) else {
            return Err(EncodeError::SeekOutOfRange {
                offset: previous,
                delta,
            });
        };
        if target > self.buffer.len() {
            let deficit = target - self.buffer.len();
            self.grow(deficit);
        }
        self.offset = target;
        Ok(previous)
    }

    /// Moves the cursor to an absolute offset and returns the position before
    /// the move.
    ///
    /// Growth is measured from the cursor before the jump, not from the
    /// destination: jumping forward never grows the buffer, even past its
    /// end, while jumping backward grows it when the pre-jump cursor plus the
    /// distance travelled exceeds the current length.
    pub fn goto(&mut self, offset: usize) -> usize {
        let previous = self.offset;
        if let Some(reach) = self.offset.checked_sub(offset) {
            self.grow_if_needed(reach);
        }
        self.offset = offset;
        previous
    }

    /// Moves the cursor forward to the next multiple of `alignment`, growing
    /// the buffer to cover the padding. Does nothing when the cursor is
    /// already aligned. `alignment` must be non-zero.
    pub fn align_to(&mut self, alignment: usize) {
        let rem = self.offset % alignment;
        if rem == 0 {
            return;
        }
        self.grow_if_needed(alignment - rem);
        self.offset += alignment - rem;
    }

    /// Writes `bytes` at an absolute offset, growing the buffer when the end
    /// of the write lands past the end of the buffer.
    fn put_at(&mut self, offset: usize, bytes: &[u8]) {
        let end = offset + bytes.len();
        if end > self.buffer.len() {
            self.grow(end - self.buffer.len());
        }
        self.buffer[offset..end].copy_from_slice(bytes);
    }

    /// Writes a `u8` at the cursor and advances past it.
    pub fn write_u8(&mut self, value: u8) {
        self.grow_if_needed(1);
        self.write_u8_at(self.offset, value);
        self.offset += 1;
    }

    /// Writes a `u8` at an absolute offset. The cursor does not move.
    pub fn write_u8_at(&mut self, offset: usize, value: u8) {
        self.put_at(offset, &value.to_le_bytes());
    }

    /// Writes an `i8` at the cursor and advances past it.
    pub fn write_i8(&mut self, value: i8) {
        self.grow_if_needed(1);
        self.write_i8_at(self.offset, value);
        self.offset += 1;
    }

    /// Writes an `i8` at an absolute offset. The cursor does not move.
    pub fn write_i8_at(&mut self, offset: usize, value: i8) {
        self.put_at(offset, &value.to_le_bytes());
    }

    /// Writes a `u16` at the cursor in the configured byte order and advances
    /// past it.
    pub fn write_u16(&mut self, value: u16) {
        self.grow_if_needed(2);
        self.write_u16_at(self.offset, value);
        self.offset += 2;
    }

    /// Writes a `u16` at an absolute offset. The cursor does not move.
    pub fn write_u16_at(&mut self, offset: usize, value: u16) {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.put_at(offset, &bytes);
    }

    /// Writes an `i16` at the cursor in the configured byte order and
    /// advances past it.
    pub fn write_i16(&mut self, value: i16) {
        self.grow_if_needed(2);
        self.write_i16_at(self.offset, value);
        self.offset += 2;
    }

    /// Writes an `i16` at an absolute offset. The cursor does not move.
    pub fn write_i16_at(&mut self, offset: usize, value: i16) {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.put_at(offset, &bytes);
    }

    /// Writes a `u32` at the cursor in the configured byte order and advances
    /// past it.
    pub fn write_u32(&mut self, value: u32) {
        self.grow_if_needed(4);
        self.write_u32_at(self.offset, value);
        self.offset += 4;
    }

    /// Writes a `u32` at an absolute offset. The cursor does not move.
    pub fn write_u32_at(&mut self, offset: usize, value: u32) {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.put_at(offset, &bytes);
    }

    /// Writes an `i32` at the cursor in the configured byte order and
    /// advances past it.
    pub fn write_i32(&mut self, value: i32) {
        self.grow_if_needed(4);
        self.write_i32_at(self.offset, value);
        self.offset += 4;
    }

    /// Writes an `i32` at an absolute offset. The cursor does not move.
    pub fn write_i32_at(&mut self, offset: usize, value: i32) {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.put_at(offset, &bytes);
    }

    /// Writes a `u64` at the cursor in the configured byte order and advances
    /// past it.
    pub fn write_u64(&mut self, value: u64) {
        self.grow_if_needed(8);
        self.write_u64_at(self.offset, value);
        self.offset += 8;
    }

    /// Writes a `u64` at an absolute offset. The cursor does not move.
    pub fn write_u64_at(&mut self, offset: usize, value: u64) {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.put_at(offset, &bytes);
    }

    /// Writes an `i64` at the cursor in the configured byte order and
    /// advances past it.
    pub fn write_i64(&mut self, value: i64) {
        self.grow_if_needed(8);
        self.write_i64_at(self.offset, value);
        self.offset += 8;
    }

    /// Writes an `i64` at an absolute offset. The cursor does not move.
    pub fn write_i64_at(&mut self, offset: usize, value: i64) {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.put_at(offset, &bytes);
    }

    /// Writes an IEEE-754 single-precision float at the cursor in the
    /// configured byte order and advances past it.
    pub fn write_f32(&mut self, value: f32) {
        self.grow_if_needed(4);
        self.write_f32_at(self.offset, value);
        self.offset += 4;
    }

    /// Writes an `f32` at an absolute offset. The cursor does not move.
    pub fn write_f32_at(&mut self, offset: usize, value: f32) {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.put_at(offset, &bytes);
    }

    /// Writes an IEEE-754 double-precision float at the cursor in the
    /// configured byte order and advances past it.
    pub fn write_f64(&mut self, value: f64) {
        self.grow_if_needed(8);
        self.write_f64_at(self.offset, value);
        self.offset += 8;
    }

    /// Writes an `f64` at an absolute offset. The cursor does not move.
    pub fn write_f64_at(&mut self, offset: usize, value: f64) {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.put_at(offset, &bytes);
    }

    /// Copies `bytes` into the buffer at the cursor and advances past them.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.grow_if_needed(bytes.len());
        self.put_at(self.offset, bytes);
        self.offset += bytes.len();
    }

    /// Copies `bytes` into the buffer at an absolute offset. The cursor does
    /// not move.
    pub fn write_bytes_at(&mut self, offset: usize, bytes: &[u8]) {
        self.put_at(offset, bytes);
    }

    /// Writes `value` in the given encoding followed by a single zero
    /// terminator byte, at the cursor, advancing past the terminator.
    pub fn write_string(&mut self, value: &str, encoding: TextEncoding) {
        let mut bytes = encode_text(value, encoding);
        bytes.push(0);
        self.write_bytes(&bytes);
    }

    /// Writes `value` and its zero terminator at an absolute offset. The
    /// cursor does not move.
    pub fn write_string_at(&mut self, offset: usize, value: &str, encoding: TextEncoding) {
        let mut bytes = encode_text(value, encoding);
        bytes.push(0);
        self.write_bytes_at(offset, &bytes);
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_text(value: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf8 => value.as_bytes().to_vec(),
        TextEncoding::Utf16Le => {
            let wchars: Vec<U16<LE>> = value.encode_utf16().map(U16::new).collect();
            wchars.as_bytes().to_vec()
        }
        TextEncoding::Latin1 => value.chars().map(|c| (c as u32 & 0xff) as u8).collect(),
    }
}

/// Error type for `Encoder`. Writes themselves never fail; only cursor moves
/// can.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum EncodeError {
    /// A relative seek would have moved the cursor outside the addressable
    /// range, e.g. before the start of the buffer.
    SeekOutOfRange {
        /// Cursor position before the seek.
        offset: usize,
        /// Displacement that was requested.
        delta: isize,
    },
}

impl core::error::Error for EncodeError {}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SeekOutOfRange { offset, delta } => {
                write!(f, "seek by {delta} from offset {offset} leaves the addressable range")
            }
        }
    }
}
