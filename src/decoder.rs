use alloc::string::String;
use alloc::vec::Vec;

use bstr::ByteSlice;
use zerocopy::byteorder::{LE, U16};
use zerocopy::FromBytes;

use crate::{Endianness, TextEncoding};

pub type Result<T> = core::result::Result<T, DecodeError>;

/// Reads fixed-layout binary data out of a slice of bytes.
///
/// The Decoder borrows the caller's buffer for its lifetime and never copies or
/// mutates it. It keeps a byte offset (the cursor) that most reads advance, and
/// a byte-order flag that multi-byte reads honor. Reads that name an absolute
/// offset (`read_*_at`) leave the cursor alone, which is how pointer fields and
/// offset tables are chased without losing the current parse position.
///
/// Moving the cursor is never bounds-checked: [`seek`](Decoder::seek),
/// [`goto`](Decoder::goto) and [`align_to`](Decoder::align_to) may leave it
/// past the end of the buffer. Only a read that actually dereferences bytes
/// beyond the end fails, with [`DecodeError::OutOfBounds`] naming the offset
/// and width it required.
///
/// This type only reads from an in-memory slice. To parse from a file or
/// socket, materialize the data into a buffer first.
pub struct Decoder<'a> {
    data: &'a [u8],
    offset: usize,
    endianness: Endianness,
}

impl<'a> Decoder<'a> {
    /// Creates a Decoder over `data`, with the cursor at 0 and little-endian
    /// byte order.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_endianness(data, Endianness::Little)
    }

    /// Creates a Decoder with an explicit initial byte order.
    pub fn with_endianness(data: &'a [u8], endianness: Endianness) -> Self {
        Self {
            data,
            offset: 0,
            endianness,
        }
    }

    /// The underlying bytes, untouched by any cursor state.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Total length of the underlying buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes between the cursor and the end of the buffer, or 0 if the cursor
    /// has been moved past the end.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Current cursor position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte order currently applied to multi-byte reads.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Changes the byte order used by subsequent multi-byte reads. Values
    /// already read are unaffected.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Moves the cursor by `delta` bytes relative to its current position and
    /// returns the position before the move.
    ///
    /// Seeking past the end of the buffer is allowed; the overrun surfaces on
    /// the next dereferencing read. Seeking to a position before the start of
    /// the buffer fails with [`DecodeError::SeekOutOfRange`] and leaves the
    /// cursor unchanged.
    pub fn seek(&mut self, delta: isize) -> Result<usize> {
        let previous = self.offset;
        let Some(target) = self.offset.checked_add_signed(delta) else {
            return Err(DecodeError::SeekOutOfRange {
                offset: previous,
                delta,
            });
        };
        self.offset = target;
        Ok(previous)
    }

    /// Moves the cursor to an absolute offset and returns the position before
    /// the move. Not bounds-checked.
    pub fn goto(&mut self, offset: usize) -> usize {
        let previous = self.offset;
        self.offset = offset;
        previous
    }

    /// Moves the cursor forward to the next multiple of `alignment`.
    ///
    /// The cursor always advances by at least one byte: an offset already on a
    /// boundary moves to the *following* boundary. Callers that want aligned
    /// offsets left alone must check `offset() % alignment` first. `alignment`
    /// must be non-zero.
    pub fn align_to(&mut self, alignment: usize) {
        self.offset += alignment - self.offset % alignment;
    }

    /// Copies `N` bytes starting at `offset`, without touching the cursor.
    #[inline(always)]
    fn get_array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let out_of_bounds = DecodeError::OutOfBounds { offset, width: N };
        let Some(end) = offset.checked_add(N) else {
            return Err(out_of_bounds);
        };
        let Some(bytes) = self.data.get(offset..end) else {
            return Err(out_of_bounds);
        };
        // This unwrap() call will get optimized out.
        Ok(*<&[u8; N]>::try_from(bytes).unwrap())
    }

    /// Copies `N` bytes at the cursor and advances past them.
    #[inline(always)]
    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.get_array::<N>(self.offset)?;
        self.offset += N;
        Ok(bytes)
    }

    /// Reads a `u8` at the cursor and advances past it.
    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(u8::from_le_bytes(self.take_array()?))
    }

    /// Reads a `u8` at an absolute offset. The cursor does not move.
    #[inline(always)]
    pub fn read_u8_at(&self, offset: usize) -> Result<u8> {
        Ok(u8::from_le_bytes(self.get_array(offset)?))
    }

    /// Reads an `i8` at the cursor and advances past it.
    #[inline(always)]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.take_array()?))
    }

    /// Reads an `i8` at an absolute offset. The cursor does not move.
    #[inline(always)]
    pub fn read_i8_at(&self, offset: usize) -> Result<i8> {
        Ok(i8::from_le_bytes(self.get_array(offset)?))
    }

    /// Reads a `u16` at the cursor in the configured byte order and advances
    /// past it.
    #[inline(always)]
    pub fn read_u16(&mut self) -> Result<u16> {
        let value = self.read_u16_at(self.offset)?;
        self.offset += 2;
        Ok(value)
    }

    /// Reads a `u16` at an absolute offset. The cursor does not move.
    #[inline(always)]
    pub fn read_u16_at(&self, offset: usize) -> Result<u16> {
        let bytes = self.get_array(offset)?;
        Ok(match self.endianness {
            Endianness::Little => u16::from_le_bytes(bytes),
            Endianness::Big => u16::from_be_bytes(bytes),
        })
    }

    /// Reads an `i16` at the cursor in the configured byte order and advances
    /// past it.
    #[inline(always)]
    pub fn read_i16(&mut self) -> Result<i16> {
        let value = self.read_i16_at(self.offset)?;
        self.offset += 2;
        Ok(value)
    }

    /// Reads an `i16` at an absolute offset. The cursor does not move.
    #[inline(always)]
    pub fn read_i16_at(&self, offset: usize) -> Result<i16> {
        let bytes = self.get_array(offset)?;
        Ok(match self.endianness {
            Endianness::Little => i16::from_le_bytes(bytes),
            Endianness::Big => i16::from_be_bytes(bytes),
        })
    }

    /// Reads a `u32` at the cursor in the configured byte order and advances
    /// past it.
    #[inline(always)]
    pub fn read_u32(&mut self) -> Result<u32> {
        let value = self.read_u32_at(self.offset)?;
        self.offset += 4;
        Ok(value)
    }

    /// Reads a `u32` at an absolute offset. The cursor does not move.
    #[inline(always)]
    pub fn read_u32_at(&self, offset: usize) -> Result<u32> {
        let bytes = self.get_array(offset)?;
        Ok(match self.endianness {
            Endianness::Little => u32::from_le_bytes(bytes),
            Endianness::Big => u32::from_be_bytes(bytes),
        })
    }

    /// Reads an `i32` at the cursor in the configured byte order and advances
    /// past it.
    #[inline(always)]
    pub fn read_i32(&mut self) -> Result<i32> {
        let value = self.read_i32_at(self.offset)?;
        self.offset += 4;
        Ok(value)
    }

    /// Reads an `i32` at an absolute offset. The cursor does not move.
    #[inline(always)]
    pub fn read_i32_at(&self, offset: usize) -> Result<i32> {
        let bytes = self.get_array(offset)?;
        Ok(match self.endianness {
            Endianness::Little => i32::from_le_bytes(bytes),
            Endianness::Big => i32::from_be_bytes(bytes),
        })
    }

    /// Reads a `u64` at the cursor in the configured byte order and advances
    /// past it.
    #[inline(always)]
    pub fn read_u64(&mut self) -> Result<u64> {
        let value = self.read_u64_at(self.offset)?;
        self.offset += 8;
        Ok(value)
    }

    /// Reads a `u64` at an absolute offset. The cursor does not move.
    #[inline(always)]
    pub fn read_u64_at(&self, offset: usize) -> Result<u64> {
        let bytes = self.get_array(offset)?;
        Ok(match self.endianness {
            Endianness::Little => u64::from_le_bytes(bytes),
            Endianness::Big => u64::from_be_bytes(bytes),
        })
    }

    /// Reads an `i64` at the cursor in the configured byte order and advances
    /// past it.
    #[inline(always)]
    pub fn read_i64(&mut self) -> Result<i64> {
        let value = self.read_i64_at(self.offset)?;
        self.offset += 8;
        Ok(value)
    }

    /// Reads an `i64` at an absolute offset. The cursor does not move.
    #[inline(always)]
    pub fn read_i64_at(&self, offset: usize) -> Result<i64> {
        let bytes = self.get_array(offset)?;
        Ok(match self.endianness {
            Endianness::Little => i64::from_le_bytes(bytes),
            Endianness::Big => i64::from_be_bytes(bytes),
        })
    }

    /// Reads an IEEE-754 single-precision float at the cursor in the
    /// configured byte order and advances past it.
    #[inline(always)]
    pub fn read_f32(&mut self) -> Result<f32> {
        let value = self.read_f32_at(self.offset)?;
        self.offset += 4;
        Ok(value)
    }

    /// Reads an `f32` at an absolute offset. The cursor does not move.
    #[inline(always)]
    pub fn read_f32_at(&self, offset: usize) -> Result<f32> {
        let bytes = self.get_array(offset)?;
        Ok(match self.endianness {
            Endianness::Little => f32::from_le_bytes(bytes),
            Endianness::Big => f32::from_be_bytes(bytes),
        })
    }

    /// Reads an IEEE-754 double-precision float at the cursor in the
    /// configured byte order and advances past it.
    #[inline(always)]
    pub fn read_f64(&mut self) -> Result<f64> {
        let value = self.read_f64_at(self.offset)?;
        self.offset += 8;
        Ok(value)
    }

    /// Reads an `f64` at an absolute offset. The cursor does not move.
    #[inline(always)]
    pub fn read_f64_at(&self, offset: usize) -> Result<f64> {
        let bytes = self.get_array(offset)?;
        Ok(match self.endianness {
            Endianness::Little => f64::from_le_bytes(bytes),
            Endianness::Big => f64::from_be_bytes(bytes),
        })
    }

    /// Reads a slice of `len` bytes starting at the cursor and advances past
    /// it. Returns a reference into the underlying buffer; nothing is copied.
    #[inline(always)]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(len)?;
        self.offset += len;
        Ok(bytes)
    }

    /// Reads a slice of `len` bytes starting at the cursor without advancing.
    pub fn peek_bytes(&self, len: usize) -> Result<&'a [u8]> {
        let out_of_bounds = DecodeError::OutOfBounds {
            offset: self.offset,
            width: len,
        };
        let Some(end) = self.offset.checked_add(len) else {
            return Err(out_of_bounds);
        };
        self.data.get(self.offset..end).ok_or(out_of_bounds)
    }

    /// Reads text at the cursor.
    ///
    /// [`StringFormat::Fixed`] consumes exactly `length` bytes.
    /// [`StringFormat::Zeroed`] consumes bytes up to and including the first
    /// zero byte, which is excluded from the decoded text; reaching the end of
    /// the buffer without finding one is an out-of-bounds error.
    ///
    /// ```
    /// use byte_cursor::{Decoder, StringFormat};
    ///
    /// let mut dec = Decoder::new(b"Hello, World!");
    /// assert_eq!(dec.read_string(StringFormat::fixed(5)).as_deref(), Ok("Hello"));
    /// assert_eq!(dec.read_string(StringFormat::fixed(7)).as_deref(), Ok(", World"));
    /// ```
    pub fn read_string(&mut self, format: StringFormat) -> Result<String> {
        match format {
            StringFormat::Fixed { length, encoding } => {
                let bytes = self.read_bytes(length)?;
                decode_text(bytes, encoding)
            }
            StringFormat::Zeroed { encoding } => {
                let Some(tail) = self.data.get(self.offset..) else {
                    return Err(DecodeError::OutOfBounds {
                        offset: self.offset,
                        width: 1,
                    });
                };
                let Some(len) = tail.find_byte(0) else {
                    // The scan ran off the end of the buffer.
                    return Err(DecodeError::OutOfBounds {
                        offset: self.data.len(),
                        width: 1,
                    });
                };
                let text = decode_text(&tail[..len], encoding)?;
                self.offset += len + 1;
                Ok(text)
            }
        }
    }
}

/// Selects how [`Decoder::read_string`] finds the end of a string.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StringFormat {
    /// A span of exactly `length` bytes.
    Fixed {
        /// Number of bytes the text occupies.
        length: usize,
        /// How those bytes are decoded.
        encoding: TextEncoding,
    },
    /// A span running up to the first zero byte. The terminator is consumed
    /// but not part of the text.
    Zeroed {
        /// How the bytes before the terminator are decoded.
        encoding: TextEncoding,
    },
}

impl StringFormat {
    /// Fixed-length UTF-8 text.
    pub fn fixed(length: usize) -> Self {
        Self::Fixed {
            length,
            encoding: TextEncoding::Utf8,
        }
    }

    /// Zero-terminated UTF-8 text.
    pub fn zeroed() -> Self {
        Self::Zeroed {
            encoding: TextEncoding::Utf8,
        }
    }

    /// The same terminator rule with a different text encoding.
    pub fn with_encoding(self, encoding: TextEncoding) -> Self {
        match self {
            Self::Fixed { length, .. } => Self::Fixed { length, encoding },
            Self::Zeroed { .. } => Self::Zeroed { encoding },
        }
    }
}

fn decode_text(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
    match encoding {
        TextEncoding::Utf8 => Ok(String::from_utf8_lossy(bytes).into_owned()),
        TextEncoding::Utf16Le => {
            let Ok(wchars) = <[U16<LE>]>::ref_from_bytes(bytes) else {
                return Err(DecodeError::Invalid);
            };
            let wchars_u16: Vec<u16> = wchars.iter().map(|c| c.get()).collect();
            Ok(String::from_utf16_lossy(&wchars_u16))
        }
        TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Error type for `Decoder`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DecodeError {
    /// A read required bytes beyond the end of the buffer. `offset` is where
    /// the read started and `width` how many bytes it required.
    OutOfBounds {
        /// Offset the failed read started at.
        offset: usize,
        /// Number of bytes the failed read required.
        width: usize,
    },

    /// A relative seek would have moved the cursor outside the addressable
    /// range, e.g. before the start of the buffer.
    SeekOutOfRange {
        /// Cursor position before the seek.
        offset: usize,
        /// Displacement that was requested.
        delta: isize,
    },

    /// The bytes are malformed for the requested text encoding, such as a
    /// UTF-16 span with an odd byte length.
    Invalid,
}

impl core::error::Error for DecodeError {}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds { offset, width } => {
                write!(f, "read of {width} bytes at offset {offset} is out of bounds")
            }
            Self::SeekOutOfRange { offset, delta } => {
                write!(f, "seek by {delta} from offset {offset} leaves the addressable range")
            }
            Self::Invalid => f.write_str("the bytes are not valid for the requested encoding"),
        }
    }
}
