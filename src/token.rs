use crate::decompress::DecompressError;

/// Set in the tag byte of a backreference
pub(crate) const BACKREF_FLAG: u8 = 0x80;
/// Low bits of the tag byte hold the token length
pub(crate) const LEN_MASK: u8 = 0x7f;

/// One unit of a compressed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw bytes copied straight to the output
    Literals(&'a [u8]),
    /// Copy `len` bytes starting `offset` bytes back in the output
    ///
    /// `len` may exceed `offset`, in which case the copy repeats itself.
    Backref { offset: u16, len: u8 },
}

/// Iterator over the tokens of a compressed stream
///
/// Stops after the first error.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    inp: &'a [u8],
}
impl<'a> Tokens<'a> {
    pub fn new(inp: &'a [u8]) -> Self {
        Self { inp }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, DecompressError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&tag, rest) = self.inp.split_first()?;
        let len = tag & LEN_MASK;

        if tag & BACKREF_FLAG == 0 {
            if rest.len() < len as usize {
                self.inp = &[];
                return Some(Err(DecompressError::InputTruncated));
            }
            let (lits, rest) = rest.split_at(len as usize);
            self.inp = rest;
            Some(Ok(Token::Literals(lits)))
        } else {
            let Some((offset, rest)) = rest.split_first_chunk::<2>() else {
                self.inp = &[];
                return Some(Err(DecompressError::InputTruncated));
            };
            self.inp = rest;
            Some(Ok(Token::Backref {
                offset: u16::from_be_bytes(*offset),
                len,
            }))
        }
    }
}
