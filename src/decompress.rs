use core::fmt::{self};

use crate::token::{Token, Tokens};
use crate::util::*;

#[cfg(feature = "std")]
extern crate std;

/// Decompression errors
///
/// The format carries no checksum, so these only cover streams which cannot
/// be decoded at all. A corrupted stream may well decode without error.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecompressError {
    /// The last token was cut short
    InputTruncated,
    /// A backreference had an offset of 0, or reached before the start of the output
    InvalidBackreference,
    /// The output buffer was too small to hold all the output.
    ///
    /// The output that has been written *is* valid, but has been truncated.
    OutputTooSmall,
}

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecompressError::InputTruncated => write!(f, "input was truncated"),
            DecompressError::InvalidBackreference => write!(f, "invalid backreference"),
            DecompressError::OutputTooSmall => write!(f, "output buffer was insufficient"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecompressError {}

impl<'a> OutputSink<DecompressError> for BufOutput<'a> {
    fn put_lits(&mut self, lits: &[u8]) -> Result<(), DecompressError> {
        let mut len = lits.len();
        let mut did_overflow = false;
        if self.pos + len > self.buf.len() {
            did_overflow = true;
            len = self.buf.len() - self.pos;
        }

        self.buf[self.pos..self.pos + len].copy_from_slice(&lits[..len]);
        self.pos += len;

        if did_overflow {
            Err(DecompressError::OutputTooSmall)
        } else {
            Ok(())
        }
    }

    fn put_backref(&mut self, offset: usize, mut len: usize) -> Result<(), DecompressError> {
        if offset == 0 || offset > self.pos {
            return Err(DecompressError::InvalidBackreference);
        }

        let mut did_overflow = false;
        if self.pos + len > self.buf.len() {
            did_overflow = true;
            len = self.buf.len() - self.pos;
        }

        // source and destination overlap whenever len > offset
        for i in 0..len {
            self.buf[self.pos + i] = self.buf[self.pos - offset + i];
        }
        self.pos += len;

        if did_overflow {
            Err(DecompressError::OutputTooSmall)
        } else {
            Ok(())
        }
    }
}

#[cfg(feature = "alloc")]
impl OutputSink<DecompressError> for VecOutput {
    fn put_lits(&mut self, lits: &[u8]) -> Result<(), DecompressError> {
        self.vec.extend_from_slice(lits);
        Ok(())
    }

    fn put_backref(&mut self, offset: usize, len: usize) -> Result<(), DecompressError> {
        let pos = self.vec.len();
        if offset == 0 || offset > pos {
            return Err(DecompressError::InvalidBackreference);
        }

        self.vec.resize(pos + len, 0);
        for i in pos..pos + len {
            self.vec[i] = self.vec[i - offset];
        }

        Ok(())
    }
}

impl OutputSink<DecompressError> for CountOutput {
    fn put_lits(&mut self, lits: &[u8]) -> Result<(), DecompressError> {
        self.pos += lits.len();
        Ok(())
    }

    fn put_backref(&mut self, _offset: usize, len: usize) -> Result<(), DecompressError> {
        self.pos += len;
        Ok(())
    }
}

fn decompress_impl(
    inp: &[u8],
    outp: &mut impl OutputSink<DecompressError>,
) -> Result<(), DecompressError> {
    for token in Tokens::new(inp) {
        match token? {
            Token::Literals(lits) => outp.put_lits(lits)?,
            Token::Backref { offset, len } => outp.put_backref(offset as usize, len as usize)?,
        }
    }
    Ok(())
}

/// Decompress the input into a preallocated buffer
///
/// Returns the decompressed size on success, or an error otherwise
pub fn decompress_to_buf(inp: &[u8], outp: &mut [u8]) -> Result<usize, DecompressError> {
    let mut outp: BufOutput = outp.into();
    decompress_impl(inp, &mut outp)?;
    Ok(outp.pos)
}

#[cfg(feature = "alloc")]
/// Decompress the input into a [Vec](alloc::vec::Vec)
///
/// Returns the result on success, or an error otherwise
pub fn decompress_to_vec(
    inp: &[u8],
    capacity_hint: Option<usize>,
) -> Result<alloc::vec::Vec<u8>, DecompressError> {
    let mut ret: VecOutput = if let Some(capacity_hint) = capacity_hint {
        alloc::vec::Vec::with_capacity(capacity_hint)
    } else {
        alloc::vec::Vec::new()
    }
    .into();
    decompress_impl(inp, &mut ret)?;
    Ok(ret.vec)
}

/// Compute the decompressed size of the input without producing any output
///
/// Only the token structure is checked. Backreference offsets are not.
pub fn decompressed_len(inp: &[u8]) -> Result<usize, DecompressError> {
    let mut outp = CountOutput::default();
    decompress_impl(inp, &mut outp)?;
    Ok(outp.pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buf_out_lits() {
        {
            let mut out = [0u8; 3];
            let mut outbuf: BufOutput = (&mut out[..]).into();
            outbuf.put_lits(&[1]).unwrap();
            assert_eq!(outbuf.buf, [1, 0, 0]);
            // test overflow
            outbuf.put_lits(&[2, 3, 4]).expect_err("");
            assert_eq!(outbuf.buf, [1, 2, 3]);
        }

        {
            let mut out = [0u8; 3];
            let mut outbuf: BufOutput = (&mut out[..]).into();
            // test exact fit
            outbuf.put_lits(&[1, 2, 3]).unwrap();
            assert_eq!(outbuf.buf, [1, 2, 3]);
            outbuf.put_lits(&[4]).expect_err("");
            assert_eq!(outbuf.buf, [1, 2, 3]);
        }
    }

    #[test]
    fn test_buf_out_backref() {
        {
            let mut out = [0u8; 8];
            let mut outbuf: BufOutput = (&mut out[..]).into();
            outbuf.put_lits(&[1, 2, 3]).unwrap();

            // invalid, before the start
            assert_eq!(
                outbuf.put_backref(4, 5),
                Err(DecompressError::InvalidBackreference)
            );
            // invalid, points at itself
            assert_eq!(
                outbuf.put_backref(0, 5),
                Err(DecompressError::InvalidBackreference)
            );

            // overflow, but should still write up to limit
            assert_eq!(
                outbuf.put_backref(2, 6),
                Err(DecompressError::OutputTooSmall)
            );

            assert_eq!(outbuf.buf, [1, 2, 3, 2, 3, 2, 3, 2])
        }

        {
            let mut out = [0u8; 8];
            let mut outbuf: BufOutput = (&mut out[..]).into();
            outbuf.put_lits(&[1, 2, 3]).unwrap();

            // exact fit
            outbuf.put_backref(3, 5).unwrap();
            assert_eq!(outbuf.buf, [1, 2, 3, 1, 2, 3, 1, 2]);
        }
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_vec_out_lits() {
        let out = alloc::vec::Vec::new();
        let mut outbuf: VecOutput = out.into();
        outbuf.put_lits(&[1]).unwrap();
        assert_eq!(outbuf.vec, [1]);
        outbuf.put_lits(&[2, 3, 4]).unwrap();
        assert_eq!(outbuf.vec, [1, 2, 3, 4]);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_vec_out_backref() {
        let out = alloc::vec::Vec::new();
        let mut outbuf: VecOutput = out.into();
        outbuf.put_lits(&[1, 2, 3]).unwrap();
        outbuf.put_backref(2, 6).unwrap();
        assert_eq!(outbuf.vec, [1, 2, 3, 2, 3, 2, 3, 2, 3]);
        assert_eq!(
            outbuf.put_backref(10, 1),
            Err(DecompressError::InvalidBackreference)
        );
    }

    #[test]
    fn test_count_out() {
        let mut outbuf = CountOutput::default();
        outbuf.put_lits(&[1, 2, 3]).unwrap();
        // offsets aren't checked when only counting
        outbuf.put_backref(100, 6).unwrap();
        assert_eq!(outbuf.pos, 9);
    }

    #[test]
    fn test_overlapping_backref() {
        let mut out = [0u8; 11];
        let len = decompress_to_buf(&[0x01, b'x', 0x8a, 0x00, 0x01], &mut out).unwrap();
        assert_eq!(len, 11);
        assert_eq!(&out, b"xxxxxxxxxxx");

        let mut out = [0u8; 7];
        let len = decompress_to_buf(&[0x02, 1, 2, 0x85, 0x00, 0x02], &mut out).unwrap();
        assert_eq!(len, 7);
        assert_eq!(out, [1, 2, 1, 2, 1, 2, 1]);
    }

    #[test]
    fn test_measure() {
        assert_eq!(decompressed_len(&[]), Ok(0));
        assert_eq!(decompressed_len(&[0x01, b'x', 0x8a, 0x00, 0x01]), Ok(11));
        assert_eq!(
            decompressed_len(&[0x01, 0x41, 0xff, 0x00, 0x01, 0xff, 0x00, 0x01, 0xad, 0x00, 0x01]),
            Ok(300)
        );
        assert_eq!(
            decompressed_len(&[0x05, 1, 2]),
            Err(DecompressError::InputTruncated)
        );
    }

    #[test]
    fn test_malformed() {
        let mut out = [0u8; 16];
        assert_eq!(
            decompress_to_buf(&[0x81, 0x00, 0x01], &mut out),
            Err(DecompressError::InvalidBackreference)
        );
        assert_eq!(
            decompress_to_buf(&[0x02, 1, 2, 0x81, 0x00, 0x03], &mut out),
            Err(DecompressError::InvalidBackreference)
        );
        assert_eq!(
            decompress_to_buf(&[0x02, 1, 2, 0x81, 0x00], &mut out),
            Err(DecompressError::InputTruncated)
        );
        assert_eq!(
            decompress_to_buf(&[0x01, 1, 0x90, 0x00, 0x01], &mut out[..4]),
            Err(DecompressError::OutputTooSmall)
        );
        assert_eq!(out[..4], [1, 1, 1, 1]);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_to_vec() {
        let out = decompress_to_vec(&[0x03, 7, 8, 9, 0x86, 0x00, 0x03, 0x01, 0], None).unwrap();
        assert_eq!(out, [7, 8, 9, 7, 8, 9, 7, 8, 9, 0]);

        let out = decompress_to_vec(&[], Some(16)).unwrap();
        assert!(out.is_empty());
    }
}
