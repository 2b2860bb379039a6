use std::io::Write;

use bedrock_nbt::{Encoder, Encoding, OffsetWriter};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::{Io, Marshal, NetworkWriteExt, ProtocolError, Result};
use crate::codec::bit_set::BitSet;
use crate::codec::buffer::BUFFER_POOL;
use crate::codec::color::Rgba;
use crate::types::entity::EntityMetadata;
use crate::types::item::{marshal_item_head, marshal_user_data, ItemInstance, ItemStack};

/// Encodes the values it is handed, leaving them unchanged.
pub struct Writer<W> {
    w: OffsetWriter<W>,
    shield_id: i32,
}

impl<W: Write> Writer<W> {
    pub fn new(w: W, shield_id: i32) -> Self {
        Self {
            w: OffsetWriter::new(w),
            shield_id,
        }
    }

    pub fn offset(&self) -> u64 {
        self.w.offset()
    }

    pub fn into_inner(self) -> W {
        self.w.into_inner()
    }

    pub fn write<T: Marshal>(&mut self, value: &mut T) -> Result<()> {
        value.marshal(self)
    }

    // The user data blob is length prefixed, so it is built aside first.
    fn user_data(&mut self, x: &mut ItemStack) -> Result<()> {
        let mut buffer = BUFFER_POOL.get();
        marshal_user_data(&mut Writer::new(&mut *buffer, self.shield_id), x)?;
        self.w.write_byte_slice(buffer.as_slice())
    }
}

impl<W: Write> Io for Writer<W> {
    fn u8(&mut self, x: &mut u8) -> Result<()> {
        self.w.write_u8(*x)
    }

    fn i8(&mut self, x: &mut i8) -> Result<()> {
        self.w.write_u8(*x as u8)
    }

    fn u16(&mut self, x: &mut u16) -> Result<()> {
        self.w.write_u16_le(*x)
    }

    fn i16(&mut self, x: &mut i16) -> Result<()> {
        self.w.write_u16_le(*x as u16)
    }

    fn u32(&mut self, x: &mut u32) -> Result<()> {
        self.w.write_u32_le(*x)
    }

    fn i32(&mut self, x: &mut i32) -> Result<()> {
        self.w.write_u32_le(*x as u32)
    }

    fn be_i32(&mut self, x: &mut i32) -> Result<()> {
        self.w.write_i32_be(*x)
    }

    fn u64(&mut self, x: &mut u64) -> Result<()> {
        self.w.write_u64_le(*x)
    }

    fn i64(&mut self, x: &mut i64) -> Result<()> {
        self.w.write_u64_le(*x as u64)
    }

    fn f32(&mut self, x: &mut f32) -> Result<()> {
        self.w.write_f32_le(*x)
    }

    fn bool(&mut self, x: &mut bool) -> Result<()> {
        self.w.write_u8(u8::from(*x))
    }

    fn byte_float(&mut self, x: &mut f32) -> Result<()> {
        // Angles outside 0..360 wrap around.
        self.w.write_u8((*x / (360.0 / 256.0)) as i32 as u8)
    }

    fn varint32(&mut self, x: &mut i32) -> Result<()> {
        self.w.write_var_int(*x)
    }

    fn varint64(&mut self, x: &mut i64) -> Result<()> {
        self.w.write_var_long(*x)
    }

    fn varuint32(&mut self, x: &mut u32) -> Result<()> {
        self.w.write_var_uint(*x)
    }

    fn varuint64(&mut self, x: &mut u64) -> Result<()> {
        self.w.write_var_ulong(*x)
    }

    fn string(&mut self, x: &mut String) -> Result<()> {
        self.w.write_string(x)
    }

    fn string_utf(&mut self, x: &mut String) -> Result<()> {
        self.w.write_string_utf(x)
    }

    fn byte_slice(&mut self, x: &mut Vec<u8>) -> Result<()> {
        self.w.write_byte_slice(x)
    }

    fn bytes(&mut self, x: &mut Vec<u8>) -> Result<()> {
        self.w.write_raw(x)
    }

    fn uuid(&mut self, x: &mut Uuid) -> Result<()> {
        self.w.write_uuid(x)
    }

    fn var_rgba(&mut self, x: &mut Rgba) -> Result<()> {
        self.w.write_var_uint(x.pack())
    }

    fn rgba(&mut self, x: &mut Rgba) -> Result<()> {
        self.w.write_u32_le(x.pack())
    }

    fn bitset(&mut self, x: &mut BitSet) -> Result<()> {
        let len = u32::try_from(x.len()).map_err(|_| ProtocolError::LimitHit {
            limit: u32::MAX,
            ty: "bitset",
        })?;
        self.w.write_var_uint(len)?;
        self.w.write_raw(x.as_bytes())
    }

    fn nbt<T, E>(&mut self, x: &mut T, encoding: E) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        E: Encoding,
    {
        Encoder::new(&mut self.w, encoding).encode(x)?;
        Ok(())
    }

    fn nbt_list<T, E>(&mut self, x: &mut Vec<T>, encoding: E) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        E: Encoding,
    {
        Encoder::new(&mut self.w, encoding).encode(x)?;
        Ok(())
    }

    fn item(&mut self, x: &mut ItemStack) -> Result<()> {
        if marshal_item_head(self, x, None)? {
            self.user_data(x)?;
        }
        Ok(())
    }

    fn item_instance(&mut self, x: &mut ItemInstance) -> Result<()> {
        if marshal_item_head(self, &mut x.stack, Some(&mut x.stack_network_id))? {
            self.user_data(&mut x.stack)?;
        }
        Ok(())
    }

    fn entity_metadata(&mut self, x: &mut EntityMetadata) -> Result<()> {
        let count = u32::try_from(x.len()).map_err(|_| ProtocolError::LimitHit {
            limit: u32::MAX,
            ty: "entity metadata",
        })?;
        self.w.write_var_uint(count)?;
        for (key, value) in x.iter_mut() {
            self.w.write_var_uint(*key)?;
            value.marshal(self)?;
        }
        Ok(())
    }

    fn limit_u32(&mut self, _value: u32, _ty: &'static str) -> Result<()> {
        Ok(())
    }

    fn shield_id(&self) -> i32 {
        self.shield_id
    }

    fn is_reader(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use crate::codec::bit_set::BitSet;
    use crate::codec::color::Rgba;
    use crate::ser::{optional, Io, Reader, Writer};

    #[test]
    fn test_primitive_layouts() {
        let mut w = Writer::new(Vec::new(), 0);
        w.i16(&mut -2).unwrap();
        w.be_i32(&mut 1).unwrap();
        w.varint32(&mut -1).unwrap();
        w.varuint64(&mut 300).unwrap();
        w.byte_float(&mut 90.0).unwrap();
        w.var_rgba(&mut Rgba::new(1, 0, 0, 0)).unwrap();
        assert_eq!(
            w.into_inner(),
            [0xFE, 0xFF, 0x00, 0x00, 0x00, 0x01, 0x01, 0xAC, 0x02, 0x40, 0x01]
        );
    }

    #[test]
    fn test_byte_float_wraps() {
        let mut w = Writer::new(Vec::new(), 0);
        w.byte_float(&mut -90.0).unwrap();
        assert_eq!(w.into_inner(), [0xC0]);
    }

    #[test]
    fn test_optional_symmetry() {
        let mut present = Some(Uuid::new_v4());
        let mut absent: Option<u64> = None;

        let mut w = Writer::new(Vec::new(), 0);
        optional_uuid(&mut w, &mut present);
        crate::ser::optional_func(&mut w, &mut absent, |io, v| io.u64(v)).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes.len(), 1 + 16 + 1);

        let mut r = Reader::new(&bytes[..], 0);
        let mut read_present = None;
        let mut read_absent = Some(7u64);
        optional_uuid(&mut r, &mut read_present);
        crate::ser::optional_func(&mut r, &mut read_absent, |io, v| io.u64(v)).unwrap();
        assert_eq!(read_present, present);
        assert_eq!(read_absent, None);
    }

    fn optional_uuid<I: Io>(io: &mut I, x: &mut Option<Uuid>) {
        crate::ser::optional_func(io, x, |io, v| io.uuid(v)).unwrap();
    }

    #[test]
    fn test_bitset_layout() {
        let mut bits = BitSet::new(10);
        assert!(bits.set(0));
        assert!(bits.set(9));
        let mut w = Writer::new(Vec::new(), 0);
        w.bitset(&mut bits).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes, [0x0A, 0x01, 0x02]);

        let mut read = BitSet::default();
        Reader::new(&bytes[..], 0).bitset(&mut read).unwrap();
        assert_eq!(read, bits);
    }

    #[test]
    fn test_nested_optional_slice() {
        #[derive(Default, Debug, PartialEq)]
        struct Entry {
            name: String,
            values: Vec<i32>,
        }

        impl crate::ser::Marshal for Entry {
            fn marshal<I: Io>(&mut self, io: &mut I) -> crate::ser::Result<()> {
                io.string(&mut self.name)?;
                crate::ser::func_slice(io, &mut self.values, |io, v| io.varint32(v))
            }
        }

        let mut entry = Some(Entry {
            name: "a".to_string(),
            values: vec![1, -1],
        });
        let mut w = Writer::new(Vec::new(), 0);
        optional(&mut w, &mut entry).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes, [0x01, 0x01, b'a', 0x02, 0x02, 0x01]);

        let mut decoded = None;
        optional(&mut Reader::new(&bytes[..], 0), &mut decoded).unwrap();
        assert_eq!(decoded, entry);
    }
}
