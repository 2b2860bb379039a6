//! The four byte layouts NBT appears in.
//!
//! Variants differ only in how integers and string lengths are written; the tag
//! structure itself is shared. The variant types are zero-sized markers and every
//! method is an associated function.

use std::fmt::Debug;
use std::io::{Read, Write};

use crate::varint::{
    read_varint32, read_varint64, read_varuint32, write_varint32, write_varint64, write_varuint32,
};
use crate::{Error, MAX_NETWORK_BYTES, OffsetReader, OffsetWriter, Result};

pub trait Encoding: Copy + Default + Debug + Send + Sync + 'static {
    /// Whether a root compound is followed by its name.
    const NAMED_ROOT: bool = true;
    /// Cumulative bytes a decoder may consume, if capped.
    const READ_LIMIT: Option<u64> = None;

    fn read_i16<R: Read>(r: &mut OffsetReader<R>) -> Result<i16>;
    fn read_i32<R: Read>(r: &mut OffsetReader<R>) -> Result<i32>;
    fn read_i64<R: Read>(r: &mut OffsetReader<R>) -> Result<i64>;
    fn read_f32<R: Read>(r: &mut OffsetReader<R>) -> Result<f32>;
    fn read_f64<R: Read>(r: &mut OffsetReader<R>) -> Result<f64>;
    fn read_string<R: Read>(r: &mut OffsetReader<R>) -> Result<String>;

    fn read_i32_slice<R: Read>(r: &mut OffsetReader<R>, n: usize) -> Result<Vec<i32>> {
        (0..n).map(|_| Self::read_i32(r)).collect()
    }

    fn read_i64_slice<R: Read>(r: &mut OffsetReader<R>, n: usize) -> Result<Vec<i64>> {
        (0..n).map(|_| Self::read_i64(r)).collect()
    }

    fn write_i16<W: Write>(w: &mut OffsetWriter<W>, x: i16) -> Result<()>;
    fn write_i32<W: Write>(w: &mut OffsetWriter<W>, x: i32) -> Result<()>;
    fn write_i64<W: Write>(w: &mut OffsetWriter<W>, x: i64) -> Result<()>;
    fn write_f32<W: Write>(w: &mut OffsetWriter<W>, x: f32) -> Result<()>;
    fn write_f64<W: Write>(w: &mut OffsetWriter<W>, x: f64) -> Result<()>;
    fn write_string<W: Write>(w: &mut OffsetWriter<W>, s: &str) -> Result<()>;
}

/// Fixed width little endian, used for world storage and item user data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LittleEndian;

/// Fixed width big endian.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BigEndian;

/// Varint integers and string lengths, used for NBT embedded in packets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetworkLittleEndian;

/// [`BigEndian`] with the root compound's name left out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetworkBigEndian;

fn read_string_body<R: Read>(r: &mut OffsetReader<R>, len: i64) -> Result<String> {
    if len < 0 {
        return Err(Error::InvalidString {
            off: r.offset(),
            len,
            reason: "negative length",
        });
    }
    if len > i64::from(i16::MAX) {
        return Err(Error::InvalidString {
            off: r.offset(),
            len,
            reason: "too long",
        });
    }
    let bytes = r.next(len as usize, "read string")?;
    String::from_utf8(bytes).map_err(|_| Error::InvalidString {
        off: r.offset(),
        len,
        reason: "not valid utf-8",
    })
}

fn checked_string_len<W: Write>(w: &OffsetWriter<W>, s: &str) -> Result<i16> {
    i16::try_from(s.len()).map_err(|_| Error::InvalidString {
        off: w.offset(),
        len: s.len() as i64,
        reason: "too long",
    })
}

macro_rules! fixed_width {
    ($variant:ident, $from:ident, $to:ident) => {
        impl Encoding for $variant {
            fn read_i16<R: Read>(r: &mut OffsetReader<R>) -> Result<i16> {
                Ok(i16::$from(r.read_array("read int16")?))
            }

            fn read_i32<R: Read>(r: &mut OffsetReader<R>) -> Result<i32> {
                Ok(i32::$from(r.read_array("read int32")?))
            }

            fn read_i64<R: Read>(r: &mut OffsetReader<R>) -> Result<i64> {
                Ok(i64::$from(r.read_array("read int64")?))
            }

            fn read_f32<R: Read>(r: &mut OffsetReader<R>) -> Result<f32> {
                Ok(f32::$from(r.read_array("read float32")?))
            }

            fn read_f64<R: Read>(r: &mut OffsetReader<R>) -> Result<f64> {
                Ok(f64::$from(r.read_array("read float64")?))
            }

            fn read_string<R: Read>(r: &mut OffsetReader<R>) -> Result<String> {
                let len = Self::read_i16(r)?;
                read_string_body(r, i64::from(len))
            }

            fn read_i32_slice<R: Read>(r: &mut OffsetReader<R>, n: usize) -> Result<Vec<i32>> {
                let bytes = r.next(n.saturating_mul(4), "read int32 slice")?;
                Ok(bytes
                    .chunks_exact(4)
                    .map(|c| i32::$from([c[0], c[1], c[2], c[3]]))
                    .collect())
            }

            fn read_i64_slice<R: Read>(r: &mut OffsetReader<R>, n: usize) -> Result<Vec<i64>> {
                let bytes = r.next(n.saturating_mul(8), "read int64 slice")?;
                Ok(bytes
                    .chunks_exact(8)
                    .map(|c| {
                        let mut b = [0u8; 8];
                        b.copy_from_slice(c);
                        i64::$from(b)
                    })
                    .collect())
            }

            fn write_i16<W: Write>(w: &mut OffsetWriter<W>, x: i16) -> Result<()> {
                w.write_all_op(&x.$to(), "write int16")
            }

            fn write_i32<W: Write>(w: &mut OffsetWriter<W>, x: i32) -> Result<()> {
                w.write_all_op(&x.$to(), "write int32")
            }

            fn write_i64<W: Write>(w: &mut OffsetWriter<W>, x: i64) -> Result<()> {
                w.write_all_op(&x.$to(), "write int64")
            }

            fn write_f32<W: Write>(w: &mut OffsetWriter<W>, x: f32) -> Result<()> {
                w.write_all_op(&x.$to(), "write float32")
            }

            fn write_f64<W: Write>(w: &mut OffsetWriter<W>, x: f64) -> Result<()> {
                w.write_all_op(&x.$to(), "write float64")
            }

            fn write_string<W: Write>(w: &mut OffsetWriter<W>, s: &str) -> Result<()> {
                let len = checked_string_len(w, s)?;
                Self::write_i16(w, len)?;
                w.write_all_op(s.as_bytes(), "write string")
            }
        }
    };
}

fixed_width!(LittleEndian, from_le_bytes, to_le_bytes);
fixed_width!(BigEndian, from_be_bytes, to_be_bytes);

impl Encoding for NetworkLittleEndian {
    const READ_LIMIT: Option<u64> = Some(MAX_NETWORK_BYTES);

    fn read_i16<R: Read>(r: &mut OffsetReader<R>) -> Result<i16> {
        LittleEndian::read_i16(r)
    }

    fn read_i32<R: Read>(r: &mut OffsetReader<R>) -> Result<i32> {
        read_varint32(r)
    }

    fn read_i64<R: Read>(r: &mut OffsetReader<R>) -> Result<i64> {
        read_varint64(r)
    }

    fn read_f32<R: Read>(r: &mut OffsetReader<R>) -> Result<f32> {
        LittleEndian::read_f32(r)
    }

    fn read_f64<R: Read>(r: &mut OffsetReader<R>) -> Result<f64> {
        LittleEndian::read_f64(r)
    }

    fn read_string<R: Read>(r: &mut OffsetReader<R>) -> Result<String> {
        let len = read_varuint32(r)?;
        read_string_body(r, i64::from(len))
    }

    fn write_i16<W: Write>(w: &mut OffsetWriter<W>, x: i16) -> Result<()> {
        LittleEndian::write_i16(w, x)
    }

    fn write_i32<W: Write>(w: &mut OffsetWriter<W>, x: i32) -> Result<()> {
        write_varint32(w, x)
    }

    fn write_i64<W: Write>(w: &mut OffsetWriter<W>, x: i64) -> Result<()> {
        write_varint64(w, x)
    }

    fn write_f32<W: Write>(w: &mut OffsetWriter<W>, x: f32) -> Result<()> {
        LittleEndian::write_f32(w, x)
    }

    fn write_f64<W: Write>(w: &mut OffsetWriter<W>, x: f64) -> Result<()> {
        LittleEndian::write_f64(w, x)
    }

    fn write_string<W: Write>(w: &mut OffsetWriter<W>, s: &str) -> Result<()> {
        let len = checked_string_len(w, s)?;
        write_varuint32(w, len as u32)?;
        w.write_all_op(s.as_bytes(), "write string")
    }
}

impl Encoding for NetworkBigEndian {
    const NAMED_ROOT: bool = false;

    fn read_i16<R: Read>(r: &mut OffsetReader<R>) -> Result<i16> {
        BigEndian::read_i16(r)
    }

    fn read_i32<R: Read>(r: &mut OffsetReader<R>) -> Result<i32> {
        BigEndian::read_i32(r)
    }

    fn read_i64<R: Read>(r: &mut OffsetReader<R>) -> Result<i64> {
        BigEndian::read_i64(r)
    }

    fn read_f32<R: Read>(r: &mut OffsetReader<R>) -> Result<f32> {
        BigEndian::read_f32(r)
    }

    fn read_f64<R: Read>(r: &mut OffsetReader<R>) -> Result<f64> {
        BigEndian::read_f64(r)
    }

    fn read_string<R: Read>(r: &mut OffsetReader<R>) -> Result<String> {
        BigEndian::read_string(r)
    }

    fn read_i32_slice<R: Read>(r: &mut OffsetReader<R>, n: usize) -> Result<Vec<i32>> {
        BigEndian::read_i32_slice(r, n)
    }

    fn read_i64_slice<R: Read>(r: &mut OffsetReader<R>, n: usize) -> Result<Vec<i64>> {
        BigEndian::read_i64_slice(r, n)
    }

    fn write_i16<W: Write>(w: &mut OffsetWriter<W>, x: i16) -> Result<()> {
        BigEndian::write_i16(w, x)
    }

    fn write_i32<W: Write>(w: &mut OffsetWriter<W>, x: i32) -> Result<()> {
        BigEndian::write_i32(w, x)
    }

    fn write_i64<W: Write>(w: &mut OffsetWriter<W>, x: i64) -> Result<()> {
        BigEndian::write_i64(w, x)
    }

    fn write_f32<W: Write>(w: &mut OffsetWriter<W>, x: f32) -> Result<()> {
        BigEndian::write_f32(w, x)
    }

    fn write_f64<W: Write>(w: &mut OffsetWriter<W>, x: f64) -> Result<()> {
        BigEndian::write_f64(w, x)
    }

    fn write_string<W: Write>(w: &mut OffsetWriter<W>, s: &str) -> Result<()> {
        BigEndian::write_string(w, s)
    }
}
