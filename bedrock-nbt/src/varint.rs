//! Base-128 integers. Unsigned forms are plain, signed forms are zig-zag encoded.

use std::io::{Read, Write};

use crate::{Error, OffsetReader, OffsetWriter, Result};

pub const MAX_VARINT32_LEN: usize = 5;
pub const MAX_VARINT64_LEN: usize = 10;

pub fn read_varuint32<R: Read>(r: &mut OffsetReader<R>) -> Result<u32> {
    let mut value = 0u32;
    for i in 0..MAX_VARINT32_LEN {
        let b = r.read_byte("read varuint32")?;
        value |= u32::from(b & 0x7F) << (7 * i);
        if b & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(Error::InvalidVarint {
        n: MAX_VARINT32_LEN,
        off: r.offset(),
    })
}

pub fn read_varuint64<R: Read>(r: &mut OffsetReader<R>) -> Result<u64> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT64_LEN {
        let b = r.read_byte("read varuint64")?;
        value |= u64::from(b & 0x7F) << (7 * i);
        if b & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(Error::InvalidVarint {
        n: MAX_VARINT64_LEN,
        off: r.offset(),
    })
}

pub fn read_varint32<R: Read>(r: &mut OffsetReader<R>) -> Result<i32> {
    let ux = read_varuint32(r)?;
    Ok((ux >> 1) as i32 ^ -((ux & 1) as i32))
}

pub fn read_varint64<R: Read>(r: &mut OffsetReader<R>) -> Result<i64> {
    let ux = read_varuint64(r)?;
    Ok((ux >> 1) as i64 ^ -((ux & 1) as i64))
}

pub fn write_varuint32<W: Write>(w: &mut OffsetWriter<W>, mut x: u32) -> Result<()> {
    let mut buf = [0u8; MAX_VARINT32_LEN];
    let mut n = 0;
    while x >= 0x80 {
        buf[n] = x as u8 | 0x80;
        x >>= 7;
        n += 1;
    }
    buf[n] = x as u8;
    w.write_all_op(&buf[..=n], "write varuint32")
}

pub fn write_varuint64<W: Write>(w: &mut OffsetWriter<W>, mut x: u64) -> Result<()> {
    let mut buf = [0u8; MAX_VARINT64_LEN];
    let mut n = 0;
    while x >= 0x80 {
        buf[n] = x as u8 | 0x80;
        x >>= 7;
        n += 1;
    }
    buf[n] = x as u8;
    w.write_all_op(&buf[..=n], "write varuint64")
}

pub fn write_varint32<W: Write>(w: &mut OffsetWriter<W>, x: i32) -> Result<()> {
    write_varuint32(w, ((x << 1) ^ (x >> 31)) as u32)
}

pub fn write_varint64<W: Write>(w: &mut OffsetWriter<W>, x: i64) -> Result<()> {
    write_varuint64(w, ((x << 1) ^ (x >> 63)) as u64)
}
