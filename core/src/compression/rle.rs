//! compression/rle.rs
//! Stateless zero-run codec.
//!
//! Grammar (plain body):
//!
//! ```text
//! body  := item*
//! item  := b                 ; any byte 0x01..=0xFF, copied literally
//!        | 0x00 <count>      ; count in 1..=255 zero bytes
//! ```
//!
//! The marker *is* the byte it compresses, so no literal ever needs escaping.
//! Runs longer than 255 are split across several markers. Worst case is an
//! isolated zero (1 byte -> 2 bytes), so output never exceeds `2 * len`.
//!
//! Line form, for rows whose decoded size the reader does not know:
//!
//! ```text
//! line  := decoded_len: u16 LE, body
//! ```
//!
//! The body of a line ends exactly when `decoded_len` bytes are produced, so
//! lines can be concatenated and split again without an outer length.

use byteorder::{ByteOrder, LittleEndian};

use crate::compression::types::CodecError;
use crate::constants::{MAX_LINE_LEN, RLE_MARKER, RLE_MAX_RUN};

const LINE_HEADER_LEN: usize = 2;

/// Upper bound for `compress` output on `len` input bytes.
pub const fn max_compressed_len(len: usize) -> usize {
    len * 2
}

/// Upper bound for `compress_line` output on `len` input bytes.
pub const fn max_line_len(len: usize) -> usize {
    LINE_HEADER_LEN + max_compressed_len(len)
}

/// Decoded byte count of a complete line header.
pub fn line_decoded_len(input: &[u8]) -> Option<usize> {
    (input.len() >= LINE_HEADER_LEN).then(|| LittleEndian::read_u16(input) as usize)
}

// ---------------------------------------------------------------------------
// Output targets
// ---------------------------------------------------------------------------

trait Emit {
    fn push(&mut self, bytes: &[u8]) -> Result<(), CodecError>;
    fn zeros(&mut self, n: usize) -> Result<(), CodecError>;
}

impl Emit for Vec<u8> {
    fn push(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    fn zeros(&mut self, n: usize) -> Result<(), CodecError> {
        self.resize(self.len() + n, 0);
        Ok(())
    }
}

struct SliceEmit<'a> {
    dst: &'a mut [u8],
    pos: usize,
}

impl SliceEmit<'_> {
    fn reserve(&mut self, n: usize) -> Result<std::ops::Range<usize>, CodecError> {
        let end = self.pos + n;
        if end > self.dst.len() {
            return Err(CodecError::OutputTooSmall { need: end, have: self.dst.len() });
        }
        let range = self.pos..end;
        self.pos = end;
        Ok(range)
    }
}

impl Emit for SliceEmit<'_> {
    fn push(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let range = self.reserve(bytes.len())?;
        self.dst[range].copy_from_slice(bytes);
        Ok(())
    }

    fn zeros(&mut self, n: usize) -> Result<(), CodecError> {
        let range = self.reserve(n)?;
        self.dst[range].fill(0);
        Ok(())
    }
}

/// Validates without producing output.
struct Discard;

impl Emit for Discard {
    fn push(&mut self, _bytes: &[u8]) -> Result<(), CodecError> {
        Ok(())
    }

    fn zeros(&mut self, _n: usize) -> Result<(), CodecError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Core loops
// ---------------------------------------------------------------------------

/// One unit of encoded output.
enum Token<'a> {
    Literal(&'a [u8]),
    Run(u8),
}

impl Token<'_> {
    fn encoded_len(&self) -> usize {
        match self {
            Token::Literal(b) => b.len(),
            Token::Run(_) => 2,
        }
    }
}

/// Split `input` into literal spans and zero runs of at most 255.
fn tokens(input: &[u8]) -> impl Iterator<Item = Token<'_>> {
    let mut i = 0;
    std::iter::from_fn(move || {
        if i >= input.len() {
            return None;
        }
        let literal = input[i..].iter().take_while(|&&b| b != RLE_MARKER).count();
        if literal > 0 {
            let span = &input[i..i + literal];
            i += literal;
            return Some(Token::Literal(span));
        }
        let run = input[i..]
            .iter()
            .take(RLE_MAX_RUN)
            .take_while(|&&b| b == RLE_MARKER)
            .count();
        i += run;
        Some(Token::Run(run as u8))
    })
}

fn encode_body<E: Emit>(input: &[u8], out: &mut E) -> Result<usize, CodecError> {
    let mut written = 0;
    for token in tokens(input) {
        match token {
            Token::Literal(span) => out.push(span)?,
            Token::Run(n) => out.push(&[RLE_MARKER, n])?,
        }
        written += token.encoded_len();
    }
    Ok(written)
}

/// Decode until the input ends (`limit == None`) or `limit` bytes have been
/// produced. Returns the number of input bytes consumed.
fn decode_body<E: Emit>(input: &[u8], limit: Option<usize>, out: &mut E) -> Result<usize, CodecError> {
    let mut produced = 0;
    let mut i = 0;

    loop {
        if limit.is_some_and(|limit| produced >= limit) {
            break;
        }
        let Some(&b) = input.get(i) else {
            if limit.is_some() {
                return Err(CodecError::Truncated { offset: i });
            }
            break;
        };

        if b != RLE_MARKER {
            out.push(&[b])?;
            produced += 1;
            i += 1;
            continue;
        }

        let run = *input.get(i + 1).ok_or(CodecError::Truncated { offset: i + 1 })? as usize;
        if run == 0 {
            return Err(CodecError::ZeroRun { offset: i });
        }
        if let Some(limit) = limit {
            if produced + run > limit {
                return Err(CodecError::LengthMismatch { expected: limit, actual: produced + run });
            }
        }
        out.zeros(run)?;
        produced += run;
        i += 2;
    }

    Ok(i)
}

// ---------------------------------------------------------------------------
// Plain form
// ---------------------------------------------------------------------------

/// Append the encoding of `input` to `out`. Returns bytes written.
pub fn compress(input: &[u8], out: &mut Vec<u8>) -> usize {
    out.reserve(input.len());
    let start = out.len();
    for token in tokens(input) {
        match token {
            Token::Literal(span) => out.extend_from_slice(span),
            Token::Run(n) => out.extend_from_slice(&[RLE_MARKER, n]),
        }
    }
    out.len() - start
}

/// Encode into a caller buffer. A buffer of `max_compressed_len(input.len())`
/// always suffices.
pub fn compress_into(input: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
    let mut target = SliceEmit { dst, pos: 0 };
    encode_body(input, &mut target)?;
    Ok(target.pos)
}

/// Append the decoding of `input` to `out`. Returns bytes written.
pub fn decompress(input: &[u8], out: &mut Vec<u8>) -> Result<usize, CodecError> {
    let start = out.len();
    decode_body(input, None, out)?;
    Ok(out.len() - start)
}

pub fn decompress_into(input: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
    let mut target = SliceEmit { dst, pos: 0 };
    decode_body(input, None, &mut target)?;
    Ok(target.pos)
}

// ---------------------------------------------------------------------------
// Line form
// ---------------------------------------------------------------------------

/// Append one self-describing line. Returns bytes written (header included).
pub fn compress_line(input: &[u8], out: &mut Vec<u8>) -> Result<usize, CodecError> {
    if input.len() > MAX_LINE_LEN {
        return Err(CodecError::LineTooLong { len: input.len(), max: MAX_LINE_LEN });
    }
    let mut header = [0u8; LINE_HEADER_LEN];
    LittleEndian::write_u16(&mut header, input.len() as u16);
    out.extend_from_slice(&header);
    Ok(LINE_HEADER_LEN + compress(input, out))
}

/// Result of decoding one line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineDecoded {
    /// Input bytes consumed, header included.
    pub consumed: usize,
    /// Decoded bytes appended to the output.
    pub written: usize,
}

/// Decode the line at the front of `input`. Trailing bytes are left alone.
pub fn decompress_line(input: &[u8], out: &mut Vec<u8>) -> Result<LineDecoded, CodecError> {
    let expected = line_decoded_len(input).ok_or(CodecError::Truncated { offset: input.len() })?;
    let start = out.len();
    let body = decode_body(&input[LINE_HEADER_LEN..], Some(expected), out)
        .map_err(|e| shift_offset(e, LINE_HEADER_LEN))?;
    Ok(LineDecoded { consumed: LINE_HEADER_LEN + body, written: out.len() - start })
}

/// Encoded length of the line at the front of `input`, or `None` when more
/// bytes are needed to complete it.
pub fn line_extent(input: &[u8]) -> Result<Option<usize>, CodecError> {
    let Some(expected) = line_decoded_len(input) else {
        return Ok(None);
    };
    match decode_body(&input[LINE_HEADER_LEN..], Some(expected), &mut Discard) {
        Ok(body) => Ok(Some(LINE_HEADER_LEN + body)),
        Err(CodecError::Truncated { .. }) => Ok(None),
        Err(e) => Err(shift_offset(e, LINE_HEADER_LEN)),
    }
}

/// Incremental form of [`line_extent`] for a buffer that grows between
/// calls. Scanning resumes where the previous call stopped, so feeding a
/// line in small pieces costs time linear in its length.
#[derive(Debug, Default, Clone)]
pub struct LineScanner {
    expected: Option<usize>,
    cursor: usize,
    produced: usize,
}

impl LineScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// `input` must start at the current line and only ever grow between
    /// calls. Returns the encoded length once the line is complete and
    /// resets for the next line.
    pub fn scan(&mut self, input: &[u8]) -> Result<Option<usize>, CodecError> {
        let expected = match self.expected {
            Some(expected) => expected,
            None => {
                let Some(expected) = line_decoded_len(input) else {
                    return Ok(None);
                };
                self.expected = Some(expected);
                self.cursor = LINE_HEADER_LEN;
                self.produced = 0;
                expected
            }
        };

        while self.produced < expected {
            let Some(&b) = input.get(self.cursor) else {
                return Ok(None);
            };
            if b != RLE_MARKER {
                self.produced += 1;
                self.cursor += 1;
                continue;
            }
            let Some(&run) = input.get(self.cursor + 1) else {
                return Ok(None);
            };
            if run == 0 {
                return Err(CodecError::ZeroRun { offset: self.cursor });
            }
            let run = run as usize;
            if self.produced + run > expected {
                return Err(CodecError::LengthMismatch { expected, actual: self.produced + run });
            }
            self.produced += run;
            self.cursor += 2;
        }

        let end = self.cursor;
        self.reset();
        Ok(Some(end))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn shift_offset(e: CodecError, by: usize) -> CodecError {
    match e {
        CodecError::Truncated { offset } => CodecError::Truncated { offset: offset + by },
        CodecError::ZeroRun { offset } => CodecError::ZeroRun { offset: offset + by },
        other => other,
    }
}
