//! Binary wire primitives shared by the transaction encoders.
//!
//! Integers are little-endian. Variable-length data is prefixed with a
//! compact varint:
//!
//! ```text
//! n <  0xfd          -> [n]
//! n <= 0xffff        -> [0xfd][u16 LE]
//! n <= 0xffff_ffff   -> [0xfe][u32 LE]
//! otherwise          -> [0xff][u64 LE]
//! ```

use thiserror::Error;

/// Errors from reading malformed wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input: needed {needed} more bytes at offset {offset}")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Appends a compact varint.
pub fn write_varint(buf: &mut Vec<u8>, n: u64) {
    if n < 0xfd {
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(0xfd);
        buf.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(0xfe);
        buf.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        buf.push(0xff);
        buf.extend_from_slice(&n.to_le_bytes());
    }
}

/// Appends a varint length followed by the bytes.
pub fn write_var_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    write_varint(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

/// Cursor over a byte slice with the matching read operations.
pub struct WireReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::UnexpectedEof {
                offset: self.offset,
                needed: len - self.remaining(),
            });
        }
        let out = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        match self.read_u8()? {
            0xfd => Ok(u16::from_le_bytes(self.read_array()?) as u64),
            0xfe => Ok(u32::from_le_bytes(self.read_array()?) as u64),
            0xff => self.read_u64(),
            n => Ok(n as u64),
        }
    }

    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| DecodeError::InvalidField {
            field: "length",
            reason: format!("{len} does not fit in memory"),
        })?;
        self.read_bytes(len)
    }

    /// Fails if any input is left over.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_width_boundaries() {
        let cases: [(u64, usize); 6] = [
            (0, 1),
            (0xfc, 1),
            (0xfd, 3),
            (0xffff, 3),
            (0x1_0000, 5),
            (0x1_0000_0000, 9),
        ];
        for (n, width) in cases {
            let mut buf = Vec::new();
            write_varint(&mut buf, n);
            assert_eq!(buf.len(), width, "width of {n:#x}");
            let mut reader = WireReader::new(&buf);
            assert_eq!(reader.read_varint().unwrap(), n);
            reader.finish().unwrap();
        }
    }

    #[test]
    fn var_bytes_prefixes_length() {
        let mut buf = Vec::new();
        write_var_bytes(&mut buf, b"transfer");
        assert_eq!(buf[0], 8);
        assert_eq!(&buf[1..], b"transfer");
    }

    #[test]
    fn short_input_reports_eof() {
        let mut reader = WireReader::new(&[0x05, 0x01]);
        let err = reader.read_var_bytes().unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedEof { offset: 1, needed: 4 });
    }

    #[test]
    fn trailing_bytes_detected() {
        let mut reader = WireReader::new(&[0x01, 0x02]);
        reader.read_u8().unwrap();
        assert_eq!(reader.finish().unwrap_err(), DecodeError::TrailingBytes(1));
    }
}
