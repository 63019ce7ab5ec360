use core::fmt;

use crate::token::BACKREF_FLAG;
use crate::util::*;
use crate::{MAX_OFFSET, MAX_TOKEN_LEN, MIN_MATCH};

#[cfg(feature = "std")]
extern crate std;

const INDEX_LOG2: usize = 16;
const INDEX_SZ: usize = 1 << INDEX_LOG2;

/// Compression errors
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompressError {
    /// The output buffer was too small to hold all the output.
    ///
    /// The output that has been written *is* valid, but has been truncated.
    OutputTooSmall,
    /// The position index could not be allocated. Nothing was written.
    OutOfMemory,
}
impl fmt::Display for CompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressError::OutputTooSmall => write!(f, "output buffer was insufficient"),
            CompressError::OutOfMemory => write!(f, "could not allocate position index"),
        }
    }
}
#[cfg(feature = "std")]
impl std::error::Error for CompressError {}

trait OutputHelper {
    fn putc(&mut self, c: u8) -> Result<(), CompressError>;
    fn put_buf(&mut self, buf: &[u8]) -> Result<(), CompressError>;
}
impl<'a> OutputHelper for BufOutput<'a> {
    fn putc(&mut self, c: u8) -> Result<(), CompressError> {
        if self.pos < self.buf.len() {
            self.buf[self.pos] = c;
            self.pos += 1;
            Ok(())
        } else {
            Err(CompressError::OutputTooSmall)
        }
    }
    fn put_buf(&mut self, buf: &[u8]) -> Result<(), CompressError> {
        let mut len = buf.len();
        let mut did_overflow = false;
        if self.pos + len > self.buf.len() {
            did_overflow = true;
            len = self.buf.len() - self.pos;
        }

        self.buf[self.pos..self.pos + len].copy_from_slice(&buf[..len]);
        self.pos += len;

        if did_overflow {
            Err(CompressError::OutputTooSmall)
        } else {
            Ok(())
        }
    }
}

impl OutputHelper for VecOutput {
    fn putc(&mut self, c: u8) -> Result<(), CompressError> {
        self.vec.push(c);
        Ok(())
    }
    fn put_buf(&mut self, buf: &[u8]) -> Result<(), CompressError> {
        self.vec.extend_from_slice(buf);
        Ok(())
    }
}

impl OutputHelper for CountOutput {
    fn putc(&mut self, _c: u8) -> Result<(), CompressError> {
        self.pos += 1;
        Ok(())
    }
    fn put_buf(&mut self, buf: &[u8]) -> Result<(), CompressError> {
        self.pos += buf.len();
        Ok(())
    }
}

/// Serializes tokens into the underlying output
struct TokenOutput<O>(O);

impl<O: OutputHelper> OutputSink<CompressError> for TokenOutput<O> {
    fn put_lits(&mut self, mut lits: &[u8]) -> Result<(), CompressError> {
        while lits.len() > MAX_TOKEN_LEN {
            self.0.putc(MAX_TOKEN_LEN as u8)?;
            self.0.put_buf(&lits[..MAX_TOKEN_LEN])?;
            lits = &lits[MAX_TOKEN_LEN..];
        }

        debug_assert!(lits.len() >= 1);
        debug_assert!(lits.len() <= MAX_TOKEN_LEN);

        // 1 byte tag, len bytes literals
        self.0.putc(lits.len() as u8)?;
        self.0.put_buf(lits)?;

        Ok(())
    }

    fn put_backref(&mut self, offset: usize, len: usize) -> Result<(), CompressError> {
        debug_assert!(offset >= 1 && offset <= MAX_OFFSET);
        debug_assert!(len >= MIN_MATCH && len <= MAX_TOKEN_LEN);

        // 1 byte tag, 2 bytes big-endian offset
        self.0.putc(BACKREF_FLAG | len as u8)?;
        self.0.put_buf(&(offset as u16).to_be_bytes())?;

        Ok(())
    }
}

/// Hash of the three bytes of context starting at a position
///
/// Lossy on purpose: collisions are caught by checking the candidate byte by byte.
fn context_hash(b0: u8, b1: u8, b2: u8) -> usize {
    ((b0 as usize) << 8) | (b1 ^ b2) as usize
}

/// Most recent position at which each context hash was seen
///
/// A slot of 0 means either "never seen" or "seen at position 0". Both are
/// treated as position 0; a bogus candidate fails verification anyway.
struct PositionIndex {
    slots: alloc::vec::Vec<usize>,
}
impl PositionIndex {
    fn new() -> Result<Self, CompressError> {
        let mut slots = alloc::vec::Vec::new();
        slots
            .try_reserve_exact(INDEX_SZ)
            .map_err(|_| CompressError::OutOfMemory)?;
        slots.resize(INDEX_SZ, 0);
        Ok(Self { slots })
    }

    /// Requires `pos + 2 < inp.len()`
    fn lookup(&self, inp: &[u8], pos: usize) -> usize {
        self.slots[context_hash(inp[pos], inp[pos + 1], inp[pos + 2])]
    }

    /// Requires `pos + 2 < inp.len()`
    fn record(&mut self, inp: &[u8], pos: usize) {
        self.slots[context_hash(inp[pos], inp[pos + 1], inp[pos + 2])] = pos;
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Match {
    offset: usize,
    len: usize,
}

/// Check the single candidate the index offers for `pos` and extend it
///
/// The length is uncapped. With no usable candidate this is a 1 byte "match".
fn find_match(inp: &[u8], pos: usize, index: &PositionIndex) -> Match {
    let mut ret = Match { offset: 0, len: 1 };
    if pos + MIN_MATCH - 1 >= inp.len() {
        return ret;
    }

    let offset = pos - index.lookup(inp, pos);
    if offset == 0 || offset > MAX_OFFSET || inp[pos - offset] != inp[pos] {
        return ret;
    }

    ret.offset = offset;
    ret.len += inp[pos + 1..]
        .iter()
        .zip(inp[pos - offset + 1..].iter())
        .take_while(|(a, b)| a == b)
        .count();
    ret
}

fn compress_impl<S: OutputSink<CompressError>>(
    inp: &[u8],
    outp: &mut S,
) -> Result<(), CompressError> {
    // allocate before anything is written, so failure leaves no partial output
    let mut index = PositionIndex::new()?;

    let mut pos = 0;
    // literals pending output, ending just before `pos`
    let mut lits = 0;

    // the extra pass at pos == len flushes the remaining literals
    while pos <= inp.len() {
        let m = find_match(inp, pos, &index);
        let mut len = m.len;

        if (len > MIN_MATCH || pos == inp.len()) && lits > 0 {
            outp.put_lits(&inp[pos - lits..pos])?;
            lits = 0;
        }

        // a 3 byte match behind pending literals gets folded into them
        if len >= MIN_MATCH && lits == 0 {
            len = usize::min(len, MAX_TOKEN_LEN);
            outp.put_backref(m.offset, len)?;
        } else {
            lits += len;
        }

        for _ in 0..len {
            if pos + MIN_MATCH - 1 < inp.len() {
                index.record(inp, pos);
            }
            pos += 1;
        }
    }

    Ok(())
}

/// Compress the input into a preallocated buffer
///
/// Returns the compressed size on success, or an error otherwise.
/// A buffer of [max_compressed_len](crate::max_compressed_len) bytes is always enough.
pub fn compress_to_buf(inp: &[u8], outp: &mut [u8]) -> Result<usize, CompressError> {
    let mut outp: TokenOutput<BufOutput> = TokenOutput(outp.into());
    compress_impl(inp, &mut outp)?;
    Ok(outp.0.pos)
}

/// Compress the input into a [Vec](alloc::vec::Vec)
///
/// Returns the result on success, or an error otherwise
pub fn compress_to_vec(inp: &[u8]) -> Result<alloc::vec::Vec<u8>, CompressError> {
    let mut ret: TokenOutput<VecOutput> = TokenOutput(alloc::vec::Vec::new().into());
    compress_impl(inp, &mut ret)?;
    Ok(ret.0.vec)
}

/// Compute the exact compressed size of the input without producing any output
pub fn compressed_len(inp: &[u8]) -> Result<usize, CompressError> {
    let mut outp: TokenOutput<CountOutput> = TokenOutput(CountOutput::default());
    compress_impl(inp, &mut outp)?;
    Ok(outp.0.pos)
}
