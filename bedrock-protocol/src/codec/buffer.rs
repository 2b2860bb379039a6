use std::io::{self, Write};
use std::mem;
use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

/// Resets in a row under a quarter of the capacity before the buffer shrinks.
const SHRINK_AFTER: u32 = 100;
/// Buffers kept by the pool once released.
const MAX_POOLED: usize = 64;

/// Growable byte buffer that gives memory back when it stays mostly unused.
///
/// Each [`Buffer::reset`] that finds less than 25% of the capacity in use counts
/// towards a shrink. After more than a hundred of them in a row the buffer is
/// reallocated at half of the length it held on that reset, and grows back from there.
#[derive(Debug, Default)]
pub struct Buffer {
    data: Vec<u8>,
    small_resets: u32,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            small_resets: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Empties the buffer, shrinking it when it has been oversized for long enough.
    pub fn reset(&mut self) {
        let capacity = self.data.capacity();
        let len = self.data.len();
        if len < capacity / 4 {
            self.small_resets += 1;
            if self.small_resets > SHRINK_AFTER {
                log::trace!("shrinking buffer from {capacity} to {} bytes", len / 2);
                self.data = Vec::with_capacity(len / 2);
                self.small_resets = 0;
                return;
            }
        } else {
            self.small_resets = 0;
        }
        self.data.clear();
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Pool of reusable [`Buffer`]s shared by all writers.
pub static BUFFER_POOL: BufferPool = BufferPool::new();

#[derive(Debug)]
pub struct BufferPool {
    buffers: Mutex<Vec<Buffer>>,
}

impl BufferPool {
    pub const fn new() -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
        }
    }

    /// Takes a buffer out of the pool. It is reset and returned when the guard drops,
    /// error paths included.
    pub fn get(&self) -> PooledBuffer<'_> {
        let buffer = self.buffers.lock().pop().unwrap_or_default();
        PooledBuffer { pool: self, buffer }
    }

    pub fn pooled(&self) -> usize {
        self.buffers.lock().len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buffer: Buffer,
}

impl Deref for PooledBuffer<'_> {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        let mut buffer = mem::take(&mut self.buffer);
        buffer.reset();
        let mut buffers = self.pool.buffers.lock();
        if buffers.len() < MAX_POOLED {
            buffers.push(buffer);
        }
    }
}
