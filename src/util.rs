/// Internal abstraction for the token-level view of an output
///
/// The encoder drives one of these to serialize tokens, the decoder drives one
/// to materialize bytes. Either way, we guarantee writing all the way up to
/// the limit before reporting an overflow.
pub(crate) trait OutputSink<ErrTy> {
    /// Add the given literal run to the output
    fn put_lits(&mut self, lits: &[u8]) -> Result<(), ErrTy>;
    /// Add a backreference to the output
    ///
    /// `offset` counts back from the current position, so 1 is the byte
    /// just written. Copy `len` bytes, which as usual for LZ77 may exceed `offset`.
    fn put_backref(&mut self, offset: usize, len: usize) -> Result<(), ErrTy>;
}

pub(crate) struct BufOutput<'a> {
    pub pos: usize,
    pub buf: &'a mut [u8],
}
impl<'a> From<&'a mut [u8]> for BufOutput<'a> {
    fn from(buf: &'a mut [u8]) -> Self {
        Self { pos: 0, buf }
    }
}

#[cfg(feature = "alloc")]
pub(crate) struct VecOutput {
    pub vec: alloc::vec::Vec<u8>,
}
#[cfg(feature = "alloc")]
impl From<alloc::vec::Vec<u8>> for VecOutput {
    fn from(vec: alloc::vec::Vec<u8>) -> Self {
        Self { vec }
    }
}

/// Output which only counts, for measuring
#[derive(Default)]
pub(crate) struct CountOutput {
    pub pos: usize,
}
