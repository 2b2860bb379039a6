use std::any::type_name;
use std::io::{Read, Write};

use bedrock_nbt::{varint, Encoding, OffsetReader, OffsetWriter};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::codec::bit_set::BitSet;
use crate::codec::color::Rgba;
use crate::codec::position::{BlockPos, ChunkPos, SubChunkPos};
use crate::codec::vector::{Vec2, Vec3};
use crate::types::entity::EntityMetadata;
use crate::types::item::{ItemInstance, ItemStack};

pub mod reader;
pub mod writer;

pub use reader::Reader;
pub use writer::Writer;

/// Default cap on length prefixes read from untrusted input.
pub const MAX_SLICE_LENGTH: u32 = 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Nbt(#[from] bedrock_nbt::Error),
    #[error("length of {ty} exceeds the limit of {limit}")]
    LimitHit { limit: u32, ty: &'static str },
    #[error("negative count for {ty}")]
    NegativeCount { ty: &'static str },
    #[error("invalid value {value} for {field}: {reason}")]
    InvalidValue {
        value: String,
        field: &'static str,
        reason: String,
    },
    #[error("unknown option {value} for enum {enum_name}")]
    UnknownEnumOption { value: i64, enum_name: &'static str },
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Little endian wire primitives on top of an offset tracking reader.
pub trait NetworkReadExt {
    fn get_u8(&mut self) -> Result<u8>;
    fn get_u16_le(&mut self) -> Result<u16>;
    fn get_u32_le(&mut self) -> Result<u32>;
    fn get_i32_be(&mut self) -> Result<i32>;
    fn get_u64_le(&mut self) -> Result<u64>;
    fn get_f32_le(&mut self) -> Result<f32>;
    fn get_var_uint(&mut self) -> Result<u32>;
    fn get_var_ulong(&mut self) -> Result<u64>;
    fn get_var_int(&mut self) -> Result<i32>;
    fn get_var_long(&mut self) -> Result<i64>;
    fn get_byte_slice(&mut self) -> Result<Vec<u8>>;
    fn get_string(&mut self) -> Result<String>;
    fn get_string_utf(&mut self) -> Result<String>;
    fn get_uuid(&mut self) -> Result<Uuid>;
    fn get_remaining(&mut self) -> Result<Vec<u8>>;
}

impl<R: Read> NetworkReadExt for OffsetReader<R> {
    fn get_u8(&mut self) -> Result<u8> {
        Ok(self.read_byte("read uint8")?)
    }

    fn get_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array("read uint16")?))
    }

    fn get_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array("read uint32")?))
    }

    fn get_i32_be(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array("read big endian int32")?))
    }

    fn get_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array("read uint64")?))
    }

    fn get_f32_le(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array("read float32")?))
    }

    fn get_var_uint(&mut self) -> Result<u32> {
        Ok(varint::read_varuint32(self)?)
    }

    fn get_var_ulong(&mut self) -> Result<u64> {
        Ok(varint::read_varuint64(self)?)
    }

    fn get_var_int(&mut self) -> Result<i32> {
        Ok(varint::read_varint32(self)?)
    }

    fn get_var_long(&mut self) -> Result<i64> {
        Ok(varint::read_varint64(self)?)
    }

    fn get_byte_slice(&mut self) -> Result<Vec<u8>> {
        let len = self.get_var_uint()?;
        if len > i32::MAX as u32 {
            return Err(ProtocolError::LimitHit {
                limit: i32::MAX as u32,
                ty: "byte slice",
            });
        }
        Ok(self.next(len as usize, "read byte slice")?)
    }

    fn get_string(&mut self) -> Result<String> {
        let len = self.get_var_uint()?;
        let off = self.offset();
        if len > i32::MAX as u32 {
            return Err(bedrock_nbt::Error::InvalidString {
                off,
                len: len.into(),
                reason: "too long",
            }
            .into());
        }
        let bytes = self.next(len as usize, "read string")?;
        String::from_utf8(bytes).map_err(|_| {
            bedrock_nbt::Error::InvalidString {
                off,
                len: len.into(),
                reason: "invalid utf-8",
            }
            .into()
        })
    }

    fn get_string_utf(&mut self) -> Result<String> {
        let len = i16::from_le_bytes(self.read_array("read string length")?);
        let off = self.offset();
        if len < 0 {
            return Err(bedrock_nbt::Error::InvalidString {
                off,
                len: len.into(),
                reason: "negative length",
            }
            .into());
        }
        let bytes = self.next(len as usize, "read string")?;
        String::from_utf8(bytes).map_err(|_| {
            bedrock_nbt::Error::InvalidString {
                off,
                len: len.into(),
                reason: "invalid utf-8",
            }
            .into()
        })
    }

    fn get_uuid(&mut self) -> Result<Uuid> {
        let mut b: [u8; 16] = self.read_array("read uuid")?;
        b.reverse();
        b.rotate_left(8);
        Ok(Uuid::from_bytes(b))
    }

    fn get_remaining(&mut self) -> Result<Vec<u8>> {
        let mut rest = Vec::new();
        self.read_to_end(&mut rest)
            .map_err(|_| bedrock_nbt::Error::BufferOverrun {
                op: "read remaining bytes",
                off: self.offset(),
            })?;
        Ok(rest)
    }
}

/// Little endian wire primitives on top of an offset tracking writer.
pub trait NetworkWriteExt {
    fn write_u8(&mut self, x: u8) -> Result<()>;
    fn write_u16_le(&mut self, x: u16) -> Result<()>;
    fn write_u32_le(&mut self, x: u32) -> Result<()>;
    fn write_i32_be(&mut self, x: i32) -> Result<()>;
    fn write_u64_le(&mut self, x: u64) -> Result<()>;
    fn write_f32_le(&mut self, x: f32) -> Result<()>;
    fn write_var_uint(&mut self, x: u32) -> Result<()>;
    fn write_var_ulong(&mut self, x: u64) -> Result<()>;
    fn write_var_int(&mut self, x: i32) -> Result<()>;
    fn write_var_long(&mut self, x: i64) -> Result<()>;
    fn write_byte_slice(&mut self, x: &[u8]) -> Result<()>;
    fn write_string(&mut self, x: &str) -> Result<()>;
    fn write_string_utf(&mut self, x: &str) -> Result<()>;
    fn write_uuid(&mut self, x: &Uuid) -> Result<()>;
    fn write_raw(&mut self, x: &[u8]) -> Result<()>;
}

impl<W: Write> NetworkWriteExt for OffsetWriter<W> {
    fn write_u8(&mut self, x: u8) -> Result<()> {
        Ok(self.write_byte(x, "write uint8")?)
    }

    fn write_u16_le(&mut self, x: u16) -> Result<()> {
        Ok(self.write_all_op(&x.to_le_bytes(), "write uint16")?)
    }

    fn write_u32_le(&mut self, x: u32) -> Result<()> {
        Ok(self.write_all_op(&x.to_le_bytes(), "write uint32")?)
    }

    fn write_i32_be(&mut self, x: i32) -> Result<()> {
        Ok(self.write_all_op(&x.to_be_bytes(), "write big endian int32")?)
    }

    fn write_u64_le(&mut self, x: u64) -> Result<()> {
        Ok(self.write_all_op(&x.to_le_bytes(), "write uint64")?)
    }

    fn write_f32_le(&mut self, x: f32) -> Result<()> {
        Ok(self.write_all_op(&x.to_le_bytes(), "write float32")?)
    }

    fn write_var_uint(&mut self, x: u32) -> Result<()> {
        Ok(varint::write_varuint32(self, x)?)
    }

    fn write_var_ulong(&mut self, x: u64) -> Result<()> {
        Ok(varint::write_varuint64(self, x)?)
    }

    fn write_var_int(&mut self, x: i32) -> Result<()> {
        Ok(varint::write_varint32(self, x)?)
    }

    fn write_var_long(&mut self, x: i64) -> Result<()> {
        Ok(varint::write_varint64(self, x)?)
    }

    fn write_byte_slice(&mut self, x: &[u8]) -> Result<()> {
        let len = u32::try_from(x.len())
            .ok()
            .filter(|len| *len <= i32::MAX as u32)
            .ok_or(ProtocolError::LimitHit {
                limit: i32::MAX as u32,
                ty: "byte slice",
            })?;
        self.write_var_uint(len)?;
        self.write_raw(x)
    }

    fn write_string(&mut self, x: &str) -> Result<()> {
        self.write_byte_slice(x.as_bytes())
    }

    fn write_string_utf(&mut self, x: &str) -> Result<()> {
        let len = i16::try_from(x.len()).map_err(|_| bedrock_nbt::Error::InvalidString {
            off: self.offset(),
            len: x.len() as i64,
            reason: "too long",
        })?;
        self.write_all_op(&len.to_le_bytes(), "write string length")?;
        self.write_raw(x.as_bytes())
    }

    fn write_uuid(&mut self, x: &Uuid) -> Result<()> {
        let mut b = *x.as_bytes();
        b.rotate_left(8);
        b.reverse();
        self.write_raw(&b)
    }

    fn write_raw(&mut self, x: &[u8]) -> Result<()> {
        Ok(self.write_all_op(x, "write bytes")?)
    }
}

/// The primitive menu shared by [`Reader`] and [`Writer`].
///
/// Every method takes the field by mutable reference: a reader fills it in, a writer
/// leaves it untouched and emits it. One [`Marshal`] implementation therefore serves
/// both directions.
pub trait Io {
    fn u8(&mut self, x: &mut u8) -> Result<()>;
    fn i8(&mut self, x: &mut i8) -> Result<()>;
    fn u16(&mut self, x: &mut u16) -> Result<()>;
    fn i16(&mut self, x: &mut i16) -> Result<()>;
    fn u32(&mut self, x: &mut u32) -> Result<()>;
    fn i32(&mut self, x: &mut i32) -> Result<()>;
    fn be_i32(&mut self, x: &mut i32) -> Result<()>;
    fn u64(&mut self, x: &mut u64) -> Result<()>;
    fn i64(&mut self, x: &mut i64) -> Result<()>;
    fn f32(&mut self, x: &mut f32) -> Result<()>;
    fn bool(&mut self, x: &mut bool) -> Result<()>;
    /// Rotation packed into one byte, `byte * 360 / 256` degrees.
    fn byte_float(&mut self, x: &mut f32) -> Result<()>;
    fn varint32(&mut self, x: &mut i32) -> Result<()>;
    fn varint64(&mut self, x: &mut i64) -> Result<()>;
    fn varuint32(&mut self, x: &mut u32) -> Result<()>;
    fn varuint64(&mut self, x: &mut u64) -> Result<()>;
    fn string(&mut self, x: &mut String) -> Result<()>;
    /// String with an int16 length prefix.
    fn string_utf(&mut self, x: &mut String) -> Result<()>;
    fn byte_slice(&mut self, x: &mut Vec<u8>) -> Result<()>;
    /// Raw bytes up to the end of the input.
    fn bytes(&mut self, x: &mut Vec<u8>) -> Result<()>;
    fn uuid(&mut self, x: &mut Uuid) -> Result<()>;
    fn var_rgba(&mut self, x: &mut Rgba) -> Result<()>;
    fn rgba(&mut self, x: &mut Rgba) -> Result<()>;
    /// Bitset whose width comes from its own length prefix.
    fn bitset(&mut self, x: &mut BitSet) -> Result<()>;

    /// Embeds `x` as NBT in the given encoding.
    fn nbt<T, E>(&mut self, x: &mut T, encoding: E) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        E: Encoding;
    /// Embeds a list as the root tag.
    fn nbt_list<T, E>(&mut self, x: &mut Vec<T>, encoding: E) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        E: Encoding;

    fn item(&mut self, x: &mut ItemStack) -> Result<()>;
    fn item_instance(&mut self, x: &mut ItemInstance) -> Result<()>;
    fn entity_metadata(&mut self, x: &mut EntityMetadata) -> Result<()>;

    /// Fails with [`ProtocolError::LimitHit`] when a reader with limits enabled sees
    /// a length prefix above its cap.
    fn limit_u32(&mut self, value: u32, ty: &'static str) -> Result<()>;
    /// Runtime id of the shield item for this session.
    fn shield_id(&self) -> i32;
    /// Whether fields are being filled in rather than emitted.
    fn is_reader(&self) -> bool;

    fn vec2(&mut self, x: &mut Vec2) -> Result<()> {
        self.f32(&mut x.x)?;
        self.f32(&mut x.y)
    }

    fn vec3(&mut self, x: &mut Vec3) -> Result<()> {
        self.f32(&mut x.x)?;
        self.f32(&mut x.y)?;
        self.f32(&mut x.z)
    }

    fn block_pos(&mut self, x: &mut BlockPos) -> Result<()> {
        self.varint32(&mut x.0[0])?;
        self.varint32(&mut x.0[1])?;
        self.varint32(&mut x.0[2])
    }

    /// Block position whose Y is written unsigned.
    fn ublock_pos(&mut self, x: &mut BlockPos) -> Result<()> {
        self.varint32(&mut x.0[0])?;
        let mut y = x.0[1] as u32;
        self.varuint32(&mut y)?;
        x.0[1] = y as i32;
        self.varint32(&mut x.0[2])
    }

    fn chunk_pos(&mut self, x: &mut ChunkPos) -> Result<()> {
        self.varint32(&mut x.0[0])?;
        self.varint32(&mut x.0[1])
    }

    fn sub_chunk_pos(&mut self, x: &mut SubChunkPos) -> Result<()> {
        self.varint32(&mut x.0[0])?;
        self.varint32(&mut x.0[1])?;
        self.varint32(&mut x.0[2])
    }
}

/// Fails a tagged sum whose discriminator is not known.
pub fn unknown_enum_option(value: impl Into<i64>, enum_name: &'static str) -> ProtocolError {
    ProtocolError::UnknownEnumOption {
        value: value.into(),
        enum_name,
    }
}

/// Fails a field whose value breaks a semantic rule.
pub fn invalid_value(
    value: impl std::fmt::Display,
    field: &'static str,
    reason: impl Into<String>,
) -> ProtocolError {
    ProtocolError::InvalidValue {
        value: value.to_string(),
        field,
        reason: reason.into(),
    }
}

/// A value with a fixed wire layout, read and written by the same method.
pub trait Marshal {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()>;
}

/// A sum type whose variant is selected by a leading discriminator.
pub trait Tagged: Sized {
    type Tag: Copy + PartialEq + Into<i64>;
    const ENUM_NAME: &'static str;

    fn tag(&self) -> Self::Tag;
    /// A default value of the variant `tag` selects.
    fn from_tag(tag: Self::Tag) -> Option<Self>;
}

/// Marshals the discriminator of `x` with `f`. When reading, `x` is replaced with a
/// default value of the variant read, which the caller then fills in.
pub fn marshal_tag<I, T, F>(io: &mut I, x: &mut T, f: F) -> Result<()>
where
    I: Io,
    T: Tagged,
    F: FnOnce(&mut I, &mut T::Tag) -> Result<()>,
{
    let mut tag = x.tag();
    f(io, &mut tag)?;
    if tag != x.tag() {
        *x = T::from_tag(tag).ok_or_else(|| unknown_enum_option(tag, T::ENUM_NAME))?;
    }
    Ok(())
}

// Runs `f` over the first `count` elements of `x`, growing it with defaults one element
// at a time so that a forged count cannot force a large allocation.
fn each<I, T, F>(io: &mut I, x: &mut Vec<T>, count: usize, mut f: F) -> Result<()>
where
    T: Default,
    F: FnMut(&mut I, &mut T) -> Result<()>,
{
    x.truncate(count);
    for i in 0..count {
        if i == x.len() {
            x.push(T::default());
        }
        f(io, &mut x[i])?;
    }
    Ok(())
}

fn len_u32<T>(x: &[T]) -> Result<u32> {
    u32::try_from(x.len()).map_err(|_| ProtocolError::LimitHit {
        limit: u32::MAX,
        ty: type_name::<T>(),
    })
}

/// Elements prefixed by a varuint32 count.
pub fn slice<I: Io, T: Marshal + Default>(io: &mut I, x: &mut Vec<T>) -> Result<()> {
    func_slice(io, x, |io, e| e.marshal(io))
}

/// Elements prefixed by a uint8 count.
pub fn slice_u8_length<I: Io, T: Marshal + Default>(io: &mut I, x: &mut Vec<T>) -> Result<()> {
    let mut count = u8::try_from(x.len()).map_err(|_| ProtocolError::LimitHit {
        limit: u8::MAX.into(),
        ty: type_name::<T>(),
    })?;
    io.u8(&mut count)?;
    each(io, x, count.into(), |io, e| e.marshal(io))
}

/// Elements prefixed by a uint16 count.
pub fn slice_u16_length<I: Io, T: Marshal + Default>(io: &mut I, x: &mut Vec<T>) -> Result<()> {
    let mut count = u16::try_from(x.len()).map_err(|_| ProtocolError::LimitHit {
        limit: u16::MAX.into(),
        ty: type_name::<T>(),
    })?;
    io.u16(&mut count)?;
    each(io, x, count.into(), |io, e| e.marshal(io))
}

/// Elements prefixed by a fixed uint32 count.
pub fn slice_u32_length<I: Io, T: Marshal + Default>(io: &mut I, x: &mut Vec<T>) -> Result<()> {
    let mut count = len_u32(x)?;
    io.u32(&mut count)?;
    io.limit_u32(count, type_name::<T>())?;
    each(io, x, count as usize, |io, e| e.marshal(io))
}

/// Elements prefixed by a varuint32 count, each marshalled with `f`.
pub fn func_slice<I, T, F>(io: &mut I, x: &mut Vec<T>, f: F) -> Result<()>
where
    I: Io,
    T: Default,
    F: FnMut(&mut I, &mut T) -> Result<()>,
{
    let mut count = len_u32(x)?;
    io.varuint32(&mut count)?;
    io.limit_u32(count, type_name::<T>())?;
    each(io, x, count as usize, f)
}

/// Elements prefixed by a fixed uint32 count, each marshalled with `f`.
pub fn func_slice_u32_length<I, T, F>(io: &mut I, x: &mut Vec<T>, f: F) -> Result<()>
where
    I: Io,
    T: Default,
    F: FnMut(&mut I, &mut T) -> Result<()>,
{
    let mut count = len_u32(x)?;
    io.u32(&mut count)?;
    io.limit_u32(count, type_name::<T>())?;
    each(io, x, count as usize, f)
}

/// Elements prefixed by a fixed int32 count, each marshalled with `f`. A negative
/// count fails with [`ProtocolError::NegativeCount`].
pub fn func_slice_i32_length<I, T, F>(io: &mut I, x: &mut Vec<T>, f: F) -> Result<()>
where
    I: Io,
    T: Default,
    F: FnMut(&mut I, &mut T) -> Result<()>,
{
    let mut count = i32::try_from(x.len()).map_err(|_| ProtocolError::LimitHit {
        limit: i32::MAX as u32,
        ty: type_name::<T>(),
    })?;
    io.i32(&mut count)?;
    if count < 0 {
        return Err(ProtocolError::NegativeCount {
            ty: type_name::<T>(),
        });
    }
    io.limit_u32(count as u32, type_name::<T>())?;
    each(io, x, count as usize, f)
}

/// Exactly `len` elements with no prefix, the count having been marshalled elsewhere.
pub fn func_slice_of_len<I, T, F>(io: &mut I, len: u32, x: &mut Vec<T>, f: F) -> Result<()>
where
    I: Io,
    T: Default,
    F: FnMut(&mut I, &mut T) -> Result<()>,
{
    io.limit_u32(len, type_name::<T>())?;
    each(io, x, len as usize, f)
}

/// A single value, the counterpart of [`slice`] for one element.
pub fn single<I: Io, T: Marshal>(io: &mut I, x: &mut T) -> Result<()> {
    x.marshal(io)
}

/// A bool followed by the value when it is present.
pub fn optional<I: Io, T: Marshal + Default>(io: &mut I, x: &mut Option<T>) -> Result<()> {
    optional_func(io, x, |io, v| v.marshal(io))
}

/// A bool followed by the value, marshalled with `f`, when it is present.
pub fn optional_func<I, T, F>(io: &mut I, x: &mut Option<T>, f: F) -> Result<()>
where
    I: Io,
    T: Default,
    F: FnOnce(&mut I, &mut T) -> Result<()>,
{
    let mut present = x.is_some();
    io.bool(&mut present)?;
    if present {
        f(io, x.get_or_insert_with(T::default))
    } else {
        *x = None;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use bedrock_nbt::{OffsetReader, OffsetWriter};
    use uuid::Uuid;

    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Pair {
        a: u8,
        b: u16,
    }

    impl Marshal for Pair {
        fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
            io.u8(&mut self.a)?;
            io.u16(&mut self.b)
        }
    }

    fn pairs(n: usize) -> Vec<Pair> {
        (0..n)
            .map(|i| Pair {
                a: i as u8,
                b: i as u16,
            })
            .collect()
    }

    #[test]
    fn test_slice_u8_length() {
        let mut full = pairs(255);
        let mut w = Writer::new(Vec::new(), 0);
        slice_u8_length(&mut w, &mut full).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes.len(), 1 + 255 * 3);
        assert_eq!(bytes[0], 0xFF);

        // Stale elements beyond the count read are dropped.
        let mut read = pairs(300);
        slice_u8_length(&mut Reader::new(&bytes[..], 0), &mut read).unwrap();
        assert_eq!(read, full);

        let mut over = pairs(256);
        let mut w = Writer::new(Vec::new(), 0);
        assert!(matches!(
            slice_u8_length(&mut w, &mut over),
            Err(ProtocolError::LimitHit { limit: 255, .. })
        ));
        assert!(w.into_inner().is_empty());
    }

    #[test]
    fn test_slice_u16_length() {
        let mut values = pairs(300);
        let mut w = Writer::new(Vec::new(), 0);
        slice_u16_length(&mut w, &mut values).unwrap();
        let bytes = w.into_inner();
        assert_eq!(&bytes[..2], [0x2C, 0x01]);
        assert_eq!(bytes.len(), 2 + 300 * 3);

        let mut read: Vec<Pair> = Vec::new();
        slice_u16_length(&mut Reader::new(&bytes[..], 0), &mut read).unwrap();
        assert_eq!(read, values);

        let mut over = vec![Pair::default(); 65536];
        assert!(matches!(
            slice_u16_length(&mut Writer::new(Vec::new(), 0), &mut over),
            Err(ProtocolError::LimitHit { limit: 65535, .. })
        ));

        // Count of two with only one element behind it.
        let short = [0x02, 0x00, 0x01, 0x02, 0x00];
        assert!(slice_u16_length(&mut Reader::new(&short[..], 0), &mut read).is_err());
    }

    #[test]
    fn test_optional() {
        let mut absent: Option<Pair> = None;
        let mut present = Some(Pair { a: 1, b: 0x0302 });
        let mut w = Writer::new(Vec::new(), 0);
        optional(&mut w, &mut absent).unwrap();
        optional(&mut w, &mut present).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes, [0x00, 0x01, 0x01, 0x02, 0x03]);

        let mut r = Reader::new(&bytes[..], 0);
        let mut read_absent = Some(Pair { a: 9, b: 9 });
        let mut read_present = None;
        optional(&mut r, &mut read_absent).unwrap();
        optional(&mut r, &mut read_present).unwrap();
        assert_eq!(read_absent, None);
        assert_eq!(read_present, present);

        // Flag set but the value is missing.
        let truncated = [0x01, 0x01];
        assert!(optional(&mut Reader::new(&truncated[..], 0), &mut read_present).is_err());
    }

    #[test]
    fn test_optional_func() {
        let mut present = Some(-1i32);
        let mut absent: Option<i32> = None;
        let mut w = Writer::new(Vec::new(), 0);
        optional_func(&mut w, &mut present, |io, v| io.varint32(v)).unwrap();
        optional_func(&mut w, &mut absent, |io, v| io.varint32(v)).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes, [0x01, 0x01, 0x00]);

        let mut r = Reader::new(&bytes[..], 0);
        let mut read_present = None;
        let mut read_absent = Some(5);
        optional_func(&mut r, &mut read_present, |io, v| io.varint32(v)).unwrap();
        optional_func(&mut r, &mut read_absent, |io, v| io.varint32(v)).unwrap();
        assert_eq!(read_present, Some(-1));
        assert_eq!(read_absent, None);
    }

    #[test]
    fn test_uuid_halves_reversed() {
        let id = Uuid::from_bytes([
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ]);
        let mut w = OffsetWriter::new(Vec::new());
        w.write_uuid(&id).unwrap();
        let bytes = w.into_inner();
        assert_eq!(
            bytes,
            [
                0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x00, 0x0f, 0x0e, 0x0d, 0x0c, 0x0b, 0x0a,
                0x09, 0x08
            ]
        );

        let mut r = OffsetReader::new(&bytes[..]);
        assert_eq!(r.get_uuid().unwrap(), id);
    }

    #[test]
    fn test_uuid_symmetry() {
        for _ in 0..32 {
            let id = Uuid::new_v4();
            let mut w = OffsetWriter::new(Vec::new());
            w.write_uuid(&id).unwrap();
            let bytes = w.into_inner();
            assert_eq!(OffsetReader::new(&bytes[..]).get_uuid().unwrap(), id);
        }
    }

    #[test]
    fn test_string_layouts() {
        let mut w = OffsetWriter::new(Vec::new());
        w.write_string("hi").unwrap();
        w.write_string_utf("hi").unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes, [0x02, b'h', b'i', 0x02, 0x00, b'h', b'i']);

        let mut r = OffsetReader::new(&bytes[..]);
        assert_eq!(r.get_string().unwrap(), "hi");
        assert_eq!(r.get_string_utf().unwrap(), "hi");
    }

    #[test]
    fn test_invalid_utf8_string() {
        let bytes = [0x02, 0xC3, 0x28];
        assert!(matches!(
            OffsetReader::new(&bytes[..]).get_string(),
            Err(ProtocolError::Nbt(bedrock_nbt::Error::InvalidString { off: 1, .. }))
        ));
    }
}
