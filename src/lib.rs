#![no_std]

//! A small LZ77 codec with a 64 KiB window.
//!
//! The compressed stream is a bare sequence of tokens with no header:
//!
//! ```text
//! 0xxxxxxx                   : literal run of x bytes, which follow the tag
//! 1xxxxxxx yyyyyyyy yyyyyyyy : copy x bytes starting y bytes back in the output
//! ```
//!
//! Both directions have a measure-only variant ([compressed_len],
//! [decompressed_len]) which returns the exact output size without writing it.

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
mod compress;
mod decompress;
mod token;
mod util;

#[cfg(feature = "alloc")]
pub use compress::{compress_to_buf, compress_to_vec, compressed_len, CompressError};
#[cfg(feature = "alloc")]
pub use decompress::decompress_to_vec;
pub use decompress::{decompress_to_buf, decompressed_len, DecompressError};
pub use token::{Token, Tokens};

/// Largest distance a back-reference may reach into the output
pub const MAX_OFFSET: usize = 0xffff;
/// Largest length of a single token, literal or back-reference
pub const MAX_TOKEN_LEN: usize = 0x7f;
/// Bytes of lookahead needed before the encoder looks for a match
pub const MIN_MATCH: usize = 3;

/// Worst-case compressed size for `len` input bytes
///
/// The only overhead the format can add is one tag byte per run of
/// [MAX_TOKEN_LEN] literals.
pub const fn max_compressed_len(len: usize) -> usize {
    len + len.div_ceil(MAX_TOKEN_LEN)
}
