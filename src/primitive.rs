//! Fixed-width integer, byte-slice and bit-packed primitive codecs.
//!
//! Every box schema in [`crate::boxes`] is built out of these. `Reader`
//! operates over an in-memory, already-length-bounded slice (the top-level
//! codec in [`crate::tree`] carves that bound out of the outer length
//! prefix before handing control to a schema), so every primitive here can
//! fail only with [`Error::UnexpectedEnd`].

use crate::error::{Error, Result};

/// A forward-only cursor over a byte slice that has already been bounded
/// to the box body it belongs to.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEnd { field });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.take(1, field)?[0])
    }

    pub fn u16(&mut self, field: &'static str) -> Result<u16> {
        let b = self.take(2, field)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn i16(&mut self, field: &'static str) -> Result<i16> {
        Ok(self.u16(field)? as i16)
    }

    /// 24-bit big-endian unsigned integer, widened into a `u32`.
    pub fn u24(&mut self, field: &'static str) -> Result<u32> {
        let b = self.take(3, field)?;
        Ok(((b[0] as u32) << 16) | ((b[1] as u32) << 8) | b[2] as u32)
    }

    pub fn u32(&mut self, field: &'static str) -> Result<u32> {
        let b = self.take(4, field)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn i32(&mut self, field: &'static str) -> Result<i32> {
        Ok(self.u32(field)? as i32)
    }

    pub fn u64(&mut self, field: &'static str) -> Result<u64> {
        let b = self.take(8, field)?;
        Ok(u64::from_be_bytes(b.try_into().unwrap()))
    }

    pub fn bytes(&mut self, n: usize, field: &'static str) -> Result<Vec<u8>> {
        Ok(self.take(n, field)?.to_vec())
    }

    pub fn bytes_exact<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        Ok(self.take(N, field)?.try_into().unwrap())
    }

    /// Consumes everything remaining in the bounded region.
    pub fn greedy_bytes(&mut self) -> Vec<u8> {
        let rest = self.data[self.pos..].to_vec();
        self.pos = self.data.len();
        rest
    }

    /// Bytes up to and including a single `0x00` terminator, UTF-8 decoded
    /// without the terminator.
    pub fn cstring_utf8(&mut self, field: &'static str) -> Result<String> {
        let raw = self.null_terminated_bytes(field)?;
        String::from_utf8(raw).map_err(|_| Error::InvalidUtf8 { field })
    }

    /// Bytes up to and including a single `0x00` terminator, returned
    /// without UTF-8 validation and without the terminator.
    pub fn null_terminated_bytes(&mut self, field: &'static str) -> Result<Vec<u8>> {
        let start = self.pos;
        loop {
            if self.pos >= self.data.len() {
                return Err(Error::UnexpectedEnd { field });
            }
            let b = self.data[self.pos];
            self.pos += 1;
            if b == 0 {
                return Ok(self.data[start..self.pos - 1].to_vec());
            }
        }
    }

    /// Reads without advancing the cursor.
    pub fn peek4(&self) -> Option<[u8; 4]> {
        self.data
            .get(self.pos..self.pos + 4)
            .map(|s| s.try_into().unwrap())
    }

    /// Carves a new bounded `Reader` out of the next `n` bytes.
    pub fn sub_reader(&mut self, n: usize, field: &'static str) -> Result<Reader<'a>> {
        Ok(Reader::new(self.take(n, field)?))
    }

    /// Fails with [`Error::LengthUnderrun`] if the region was not fully
    /// consumed; used where a fixed-size body must account for every byte.
    pub fn expect_exhausted(&self) -> Result<()> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(Error::LengthUnderrun {
                remaining: self.remaining() as u64,
            })
        }
    }

    /// A version-selected integer per §3.5: 32-bit when `version == 0`,
    /// 64-bit when `version == 1`.
    pub fn version_sized(&mut self, version: u8, field: &'static str) -> Result<u64> {
        match version {
            0 => Ok(self.u32(field)? as u64),
            1 => self.u64(field),
            v => Err(Error::UnsupportedVersion { field, version: v }),
        }
    }

    /// The 1-byte version + 3-byte flags prelude shared by full boxes.
    pub fn full_box_header(&mut self) -> Result<(u8, u32)> {
        let version = self.u8("version")?;
        let flags = self.u24("flags")?;
        Ok((version, flags))
    }

    /// Reads a single byte that is specified to always carry one fixed
    /// value (e.g. `avcC`/`hvcC`'s `configurationVersion`); fails with
    /// [`Error::ConstMismatch`] if the wire value differs.
    pub fn const_u8(&mut self, field: &'static str, expected: u8) -> Result<u8> {
        let found = self.u8(field)?;
        if found != expected {
            return Err(Error::ConstMismatch {
                field,
                expected: vec![expected],
                found: vec![found],
            });
        }
        Ok(found)
    }
}

/// Accumulates bytes for the build direction; mirrors [`Reader`] field for
/// field so every schema's `encode` reads like its `parse` in reverse.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer { buf: Vec::new() }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn i16(&mut self, v: i16) {
        self.u16(v as u16);
    }

    pub fn u24(&mut self, v: u32) {
        let b = v.to_be_bytes();
        self.buf.extend_from_slice(&b[1..4]);
    }

    pub fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn i32(&mut self, v: i32) {
        self.u32(v as u32);
    }

    pub fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    /// Writes `n` zero bytes, reproducing reserved/padding fields dropped
    /// on parse.
    pub fn zeros(&mut self, n: usize) {
        self.buf.resize(self.buf.len() + n, 0);
    }

    pub fn cstring_utf8(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
    }

    pub fn null_terminated_bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
        self.buf.push(0);
    }

    pub fn version_sized(&mut self, version: u8, value: u64) {
        if version == 1 {
            self.u64(value);
        } else {
            self.u32(value as u32);
        }
    }

    pub fn full_box_header(&mut self, version: u8, flags: u32) {
        self.u8(version);
        self.u24(flags);
    }
}

/// Reads a run of MSB-first bits spanning whole bytes.
///
/// Thin wrapper over the `bitreader` crate so call sites can report
/// [`Error::UnexpectedEnd`] uniformly with the rest of the primitive
/// layer instead of propagating `bitreader::BitReaderError` directly.
pub struct BitReader<'a> {
    inner: bitreader::BitReader<'a>,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            inner: bitreader::BitReader::new(data),
        }
    }

    pub fn bits(&mut self, n: u8, field: &'static str) -> Result<u32> {
        self.inner
            .read_u32(n)
            .map_err(|_| Error::UnexpectedEnd { field })
    }

    pub fn bits_u64(&mut self, n: u8, field: &'static str) -> Result<u64> {
        self.inner
            .read_u64(n)
            .map_err(|_| Error::UnexpectedEnd { field })
    }

    pub fn bit(&mut self, field: &'static str) -> Result<bool> {
        self.inner
            .read_bool()
            .map_err(|_| Error::UnexpectedEnd { field })
    }

    pub fn skip(&mut self, n: u64, field: &'static str) -> Result<()> {
        self.inner
            .skip(n)
            .map_err(|_| Error::UnexpectedEnd { field })
    }
}

/// Writes a run of MSB-first bits spanning whole bytes; the symmetric
/// counterpart to [`BitReader`] (the `bitreader` crate only reads).
#[derive(Default)]
pub struct BitWriter {
    bits: Vec<bool>,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter { bits: Vec::new() }
    }

    pub fn write_bits(&mut self, value: u64, n: u8) {
        for i in (0..n).rev() {
            self.bits.push((value >> i) & 1 == 1);
        }
    }

    pub fn write_bool(&mut self, value: bool) {
        self.bits.push(value);
    }

    pub fn write_zeros(&mut self, n: u8) {
        self.write_bits(0, n);
    }

    /// Packs the accumulated bits into bytes, MSB-first. The spec
    /// guarantees every `bit_struct` schema sums to a whole number of
    /// bytes, so no trailing padding is added here; a short result is a
    /// bug in the caller's field widths, not recoverable input data.
    pub fn finish(self) -> Vec<u8> {
        assert_eq!(self.bits.len() % 8, 0, "bit_struct did not sum to whole bytes");
        self.bits
            .chunks(8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_integers() {
        let data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut r = Reader::new(&data);
        assert_eq!(r.u8("a").unwrap(), 0x00);
        assert_eq!(r.u24("b").unwrap(), 0x010203);
        assert_eq!(r.u32("c").unwrap(), 0x04050607);
    }

    #[test]
    fn unexpected_end_on_short_region() {
        let data = [0u8; 2];
        let mut r = Reader::new(&data);
        assert!(matches!(r.u32("x"), Err(Error::UnexpectedEnd { field: "x" })));
    }

    #[test]
    fn cstring_round_trips() {
        let mut w = Writer::new();
        w.cstring_utf8("hello");
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(r.cstring_utf8("name").unwrap(), "hello");
        assert!(r.is_empty());
    }

    #[test]
    fn bit_writer_packs_msb_first() {
        let mut w = BitWriter::new();
        w.write_zeros(4);
        w.write_bits(0b10, 2);
        w.write_bits(0b01, 2);
        let bytes = w.finish();
        assert_eq!(bytes, vec![0b0000_1001]);
    }

    #[test]
    fn bit_reader_matches_bit_writer() {
        let mut w = BitWriter::new();
        w.write_bits(21, 5);
        w.write_bits(14, 5);
        w.write_bits(4, 5);
        w.write_bool(true);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        assert_eq!(r.bits(5, "a").unwrap(), 21);
        assert_eq!(r.bits(5, "b").unwrap(), 14);
        assert_eq!(r.bits(5, "c").unwrap(), 4);
        assert!(r.bit("d").unwrap());
    }
}
