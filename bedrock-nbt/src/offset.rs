use std::io::{self, Read, Write};

use crate::{Error, Result};

// Bytes reserved up front by `next`; anything beyond grows as data actually arrives.
const PREALLOCATE_LIMIT: usize = 64 * 1024;

/// Wraps a byte source and counts every byte taken from it.
#[derive(Debug)]
pub struct OffsetReader<R> {
    reader: R,
    off: u64,
    limit: Option<u64>,
}

impl<R: Read> OffsetReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            off: 0,
            limit: None,
        }
    }

    /// Fails every read that would move the offset past `limit` with [`Error::MaximumBytesRead`].
    pub fn with_limit(reader: R, limit: u64) -> Self {
        Self {
            reader,
            off: 0,
            limit: Some(limit),
        }
    }

    pub fn offset(&self) -> u64 {
        self.off
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn check_limit(&self, n: usize) -> Result<()> {
        match self.limit {
            Some(limit) if self.off.saturating_add(n as u64) > limit => Err(Error::MaximumBytesRead),
            _ => Ok(()),
        }
    }

    /// Fills `dst` completely.
    pub fn read_exact_op(&mut self, dst: &mut [u8], op: &'static str) -> Result<()> {
        self.check_limit(dst.len())?;
        let mut filled = 0;
        while filled < dst.len() {
            match self.reader.read(&mut dst[filled..]) {
                Ok(0) => return Err(Error::BufferOverrun { op, off: self.off }),
                Ok(n) => {
                    filled += n;
                    self.off += n as u64;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => return Err(Error::BufferOverrun { op, off: self.off }),
            }
        }
        Ok(())
    }

    pub fn read_byte(&mut self, op: &'static str) -> Result<u8> {
        let mut buf = [0u8];
        self.read_exact_op(&mut buf, op)?;
        Ok(buf[0])
    }

    pub fn read_array<const N: usize>(&mut self, op: &'static str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact_op(&mut buf, op)?;
        Ok(buf)
    }

    /// Returns the next `n` bytes. Memory is only committed as bytes arrive, so a
    /// forged length cannot force a huge allocation.
    pub fn next(&mut self, n: usize, op: &'static str) -> Result<Vec<u8>> {
        self.check_limit(n)?;
        let mut buf = Vec::with_capacity(n.min(PREALLOCATE_LIMIT));
        let read = (&mut self.reader)
            .take(n as u64)
            .read_to_end(&mut buf)
            .map_err(|_| Error::BufferOverrun { op, off: self.off })?;
        self.off += read as u64;
        if read < n {
            return Err(Error::BufferOverrun { op, off: self.off });
        }
        Ok(buf)
    }

    pub fn skip(&mut self, n: u64, op: &'static str) -> Result<()> {
        self.check_limit(usize::try_from(n).unwrap_or(usize::MAX))?;
        let skipped = io::copy(&mut (&mut self.reader).take(n), &mut io::sink())
            .map_err(|_| Error::BufferOverrun { op, off: self.off })?;
        self.off += skipped;
        if skipped < n {
            return Err(Error::BufferOverrun { op, off: self.off });
        }
        Ok(())
    }
}

impl<R: Read> Read for OffsetReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.off += n as u64;
        Ok(n)
    }
}

/// Wraps a byte sink and counts every byte handed to it.
#[derive(Debug)]
pub struct OffsetWriter<W> {
    writer: W,
    off: u64,
}

impl<W: Write> OffsetWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, off: 0 }
    }

    pub fn offset(&self) -> u64 {
        self.off
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn write_all_op(&mut self, src: &[u8], op: &'static str) -> Result<()> {
        self.writer
            .write_all(src)
            .map_err(|source| Error::FailedWrite {
                op,
                off: self.off,
                source,
            })?;
        self.off += src.len() as u64;
        Ok(())
    }

    pub fn write_byte(&mut self, b: u8, op: &'static str) -> Result<()> {
        self.write_all_op(&[b], op)
    }
}

impl<W: Write> Write for OffsetWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.writer.write(buf)?;
        self.off += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
