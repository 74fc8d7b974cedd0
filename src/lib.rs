//! Cursor-based access to binary buffers: a [`Decoder`] that reads fixed-layout
//! structures out of a borrowed byte slice, and an [`Encoder`] that produces them
//! in an owned, automatically growing buffer.
//!
//! Both types keep a moving byte offset (the cursor) and a runtime-selectable
//! byte order. Every fixed-width accessor exists in two forms: one that operates
//! at the cursor and advances it, and an `_at` form that takes an absolute
//! offset and leaves the cursor alone. The latter is how offset tables and
//! pointer fields in formats such as font files are followed without losing the
//! current parse position.
//!
//! The two types are independent: the Decoder never writes, the Encoder never
//! reads, and neither requires the other. A typical caller parses an existing
//! blob with a [`Decoder`] and builds new output with an [`Encoder`].
//!
//! ```
//! use byte_cursor::{Decoder, Encoder, StringFormat};
//!
//! let mut enc = Encoder::new();
//! enc.write_u16(500);
//! enc.write_string("abc", Default::default());
//! let bytes = enc.into_vec();
//!
//! let mut dec = Decoder::new(&bytes);
//! assert_eq!(dec.read_u16(), Ok(500));
//! assert_eq!(dec.read_string(StringFormat::zeroed()).as_deref(), Ok("abc"));
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![forbid(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(missing_docs)]

extern crate alloc;

mod decoder;
mod encoder;


pub use decoder::{DecodeError, Decoder, StringFormat};
pub use encoder::{EncodeError, Encoder};

/// Byte order applied to every multi-byte numeric read or write.
///
/// Single-byte accessors ignore it. Changing the order mid-stream only affects
/// subsequent operations.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Endianness {
    /// Least-significant byte first.
    #[default]
    Little,
    /// Most-significant byte first.
    Big,
}

/// Text representations understood by [`Decoder::read_string`] and
/// [`Encoder::write_string`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TextEncoding {
    /// UTF-8. Ill-formed sequences decode to U+FFFD rather than failing.
    #[default]
    Utf8,
    /// UTF-16 with little-endian code units, independent of the configured
    /// byte order. The byte length of a UTF-16 span must be even.
    Utf16Le,
    /// ISO-8859-1. Each byte decodes to the code point of the same value;
    /// encoding keeps the low 8 bits of each UTF-16 code unit.
    Latin1,
}
