use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Big-endian reader over a borrowed buffer.
///
/// Every read checks the remaining length before touching the buffer, so a
/// short buffer always surfaces as [`ClassFileError::OutOfBounds`] with the
/// offending offset instead of a bare end-of-file.
pub struct Reader<'a> {
    r: Cursor<&'a [u8]>,
}
impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: Cursor::new(buf),
        }
    }

    pub fn position(&self) -> usize {
        self.r.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.r.get_ref().len().saturating_sub(self.position())
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes between two positions previously returned by [`Reader::position`].
    pub fn span(&self, start: usize, end: usize) -> &'a [u8] {
        &self.r.get_ref()[start..end]
    }

    pub fn read_u1(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.r.read_u8()?)
    }

    pub fn read_u2(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.r.read_u16::<Endian>()?)
    }

    pub fn read_u4(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.r.read_u32::<Endian>()?)
    }

    pub fn read_float(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.r.read_f32::<Endian>()?)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let start = self.position();
        self.r.set_position((start + n) as u64);
        Ok(self.span(start, start + n))
    }

    fn ensure(&self, requested: usize) -> Result<()> {
        let remaining = self.remaining();
        if requested > remaining {
            return Err(ClassFileError::OutOfBounds {
                offset: self.position(),
                requested,
                remaining,
            });
        }
        Ok(())
    }
}

/// Big-endian writer into an owned buffer.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}
impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u1(&mut self, value: u8) -> Result<()> {
        Ok(self.buf.write_u8(value)?)
    }

    pub fn write_u2(&mut self, value: u16) -> Result<()> {
        Ok(self.buf.write_u16::<Endian>(value)?)
    }

    pub fn write_u4(&mut self, value: u32) -> Result<()> {
        Ok(self.buf.write_u32::<Endian>(value)?)
    }

    pub fn write_float(&mut self, value: f32) -> Result<()> {
        Ok(self.buf.write_f32::<Endian>(value)?)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod reader_tests {
    use super::*;

    #[test]
    fn it_should_read_big_endian_values() {
        let mut r = Reader::new(&[0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde]);
        assert_eq!(r.read_u1().unwrap(), 0x12);
        assert_eq!(r.read_u2().unwrap(), 0x3456);
        assert_eq!(r.read_u4().unwrap(), 0x789abcde);
        assert!(r.is_empty());
    }

    #[test]
    fn it_should_read_a_float() {
        let mut r = Reader::new(&[0x3f, 0xc0, 0x00, 0x00]);
        assert_eq!(r.read_float().unwrap(), 1.5);
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        let mut r = Reader::new(&[0xca, 0xfe, 0xba]);
        assert_eq!(r.read_u2().unwrap(), 0xcafe);
        match r.read_u2() {
            Err(ClassFileError::OutOfBounds {
                offset,
                requested,
                remaining,
            }) => assert_eq!((offset, requested, remaining), (2, 2, 1)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn it_should_not_advance_after_a_failed_read() {
        let mut r = Reader::new(&[0x01, 0x02]);
        assert!(r.read_bytes(3).is_err());
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_bytes(2).unwrap(), &[0x01, 0x02]);
    }
}
