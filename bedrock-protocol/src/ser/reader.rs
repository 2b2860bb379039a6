use std::io::Read;

use bedrock_config::CodecConfiguration;
use bedrock_nbt::{Decoder, Encoding, OffsetReader};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::{Io, Marshal, NetworkReadExt, ProtocolError, Result, MAX_SLICE_LENGTH};
use crate::codec::bit_set::BitSet;
use crate::codec::color::Rgba;
use crate::types::entity::{EntityMetadata, MetadataValue};
use crate::types::item::{marshal_item_head, marshal_user_data, ItemInstance, ItemStack};

/// Decodes wire data into the values it is handed.
pub struct Reader<R> {
    r: OffsetReader<R>,
    shield_id: i32,
    limits: bool,
    max_slice_length: u32,
}

impl<R: Read> Reader<R> {
    pub fn new(r: R, shield_id: i32) -> Self {
        Self {
            r: OffsetReader::new(r),
            shield_id,
            limits: true,
            max_slice_length: MAX_SLICE_LENGTH,
        }
    }

    pub fn from_config(r: R, config: &CodecConfiguration) -> Self {
        Self {
            r: OffsetReader::new(r),
            shield_id: config.items.shield_id,
            limits: config.limits.enabled,
            max_slice_length: config.limits.max_slice_length,
        }
    }

    /// Toggles the cap on length prefixes. Only trusted input should be read without it.
    pub fn with_limits(mut self, limits: bool) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_max_slice_length(mut self, max_slice_length: u32) -> Self {
        self.max_slice_length = max_slice_length;
        self
    }

    pub fn offset(&self) -> u64 {
        self.r.offset()
    }

    pub fn into_inner(self) -> R {
        self.r.into_inner()
    }

    /// Reads one value of `T`.
    pub fn read<T: Marshal + Default>(&mut self) -> Result<T> {
        let mut value = T::default();
        value.marshal(self)?;
        Ok(value)
    }

    // Reader over a nested blob that keeps this reader's settings.
    fn nested<'a>(&self, bytes: &'a [u8]) -> Reader<&'a [u8]> {
        Reader {
            r: OffsetReader::new(bytes),
            shield_id: self.shield_id,
            limits: self.limits,
            max_slice_length: self.max_slice_length,
        }
    }
}

impl<R: Read> Io for Reader<R> {
    fn u8(&mut self, x: &mut u8) -> Result<()> {
        *x = self.r.get_u8()?;
        Ok(())
    }

    fn i8(&mut self, x: &mut i8) -> Result<()> {
        *x = self.r.get_u8()? as i8;
        Ok(())
    }

    fn u16(&mut self, x: &mut u16) -> Result<()> {
        *x = self.r.get_u16_le()?;
        Ok(())
    }

    fn i16(&mut self, x: &mut i16) -> Result<()> {
        *x = self.r.get_u16_le()? as i16;
        Ok(())
    }

    fn u32(&mut self, x: &mut u32) -> Result<()> {
        *x = self.r.get_u32_le()?;
        Ok(())
    }

    fn i32(&mut self, x: &mut i32) -> Result<()> {
        *x = self.r.get_u32_le()? as i32;
        Ok(())
    }

    fn be_i32(&mut self, x: &mut i32) -> Result<()> {
        *x = self.r.get_i32_be()?;
        Ok(())
    }

    fn u64(&mut self, x: &mut u64) -> Result<()> {
        *x = self.r.get_u64_le()?;
        Ok(())
    }

    fn i64(&mut self, x: &mut i64) -> Result<()> {
        *x = self.r.get_u64_le()? as i64;
        Ok(())
    }

    fn f32(&mut self, x: &mut f32) -> Result<()> {
        *x = self.r.get_f32_le()?;
        Ok(())
    }

    fn bool(&mut self, x: &mut bool) -> Result<()> {
        *x = self.r.get_u8()? != 0;
        Ok(())
    }

    fn byte_float(&mut self, x: &mut f32) -> Result<()> {
        *x = f32::from(self.r.get_u8()?) * (360.0 / 256.0);
        Ok(())
    }

    fn varint32(&mut self, x: &mut i32) -> Result<()> {
        *x = self.r.get_var_int()?;
        Ok(())
    }

    fn varint64(&mut self, x: &mut i64) -> Result<()> {
        *x = self.r.get_var_long()?;
        Ok(())
    }

    fn varuint32(&mut self, x: &mut u32) -> Result<()> {
        *x = self.r.get_var_uint()?;
        Ok(())
    }

    fn varuint64(&mut self, x: &mut u64) -> Result<()> {
        *x = self.r.get_var_ulong()?;
        Ok(())
    }

    fn string(&mut self, x: &mut String) -> Result<()> {
        *x = self.r.get_string()?;
        Ok(())
    }

    fn string_utf(&mut self, x: &mut String) -> Result<()> {
        *x = self.r.get_string_utf()?;
        Ok(())
    }

    fn byte_slice(&mut self, x: &mut Vec<u8>) -> Result<()> {
        *x = self.r.get_byte_slice()?;
        Ok(())
    }

    fn bytes(&mut self, x: &mut Vec<u8>) -> Result<()> {
        *x = self.r.get_remaining()?;
        Ok(())
    }

    fn uuid(&mut self, x: &mut Uuid) -> Result<()> {
        *x = self.r.get_uuid()?;
        Ok(())
    }

    fn var_rgba(&mut self, x: &mut Rgba) -> Result<()> {
        *x = Rgba::unpack(self.r.get_var_uint()?);
        Ok(())
    }

    fn rgba(&mut self, x: &mut Rgba) -> Result<()> {
        *x = Rgba::unpack(self.r.get_u32_le()?);
        Ok(())
    }

    fn bitset(&mut self, x: &mut BitSet) -> Result<()> {
        let len = self.r.get_var_uint()?;
        self.limit_u32(len, "bitset")?;
        let len = len as usize;
        let bytes = self.r.next(len.div_ceil(8), "read bitset")?;
        *x = BitSet::from_bytes(len, bytes);
        Ok(())
    }

    fn nbt<T, E>(&mut self, x: &mut T, encoding: E) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        E: Encoding,
    {
        *x = Decoder::new(&mut self.r, encoding).decode()?;
        Ok(())
    }

    fn nbt_list<T, E>(&mut self, x: &mut Vec<T>, encoding: E) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        E: Encoding,
    {
        *x = Decoder::new(&mut self.r, encoding).decode()?;
        Ok(())
    }

    fn item(&mut self, x: &mut ItemStack) -> Result<()> {
        *x = ItemStack::default();
        if !marshal_item_head(self, x, None)? {
            return Ok(());
        }
        let blob = self.r.get_byte_slice()?;
        marshal_user_data(&mut self.nested(&blob), x)
    }

    fn item_instance(&mut self, x: &mut ItemInstance) -> Result<()> {
        *x = ItemInstance::default();
        if !marshal_item_head(self, &mut x.stack, Some(&mut x.stack_network_id))? {
            return Ok(());
        }
        let blob = self.r.get_byte_slice()?;
        marshal_user_data(&mut self.nested(&blob), &mut x.stack)
    }

    fn entity_metadata(&mut self, x: &mut EntityMetadata) -> Result<()> {
        let count = self.r.get_var_uint()?;
        self.limit_u32(count, "entity metadata")?;
        x.clear();
        for _ in 0..count {
            let key = self.r.get_var_uint()?;
            let mut value = MetadataValue::default();
            value.marshal(self)?;
            x.insert(key, value);
        }
        Ok(())
    }

    fn limit_u32(&mut self, value: u32, ty: &'static str) -> Result<()> {
        if self.limits && value > self.max_slice_length {
            log::debug!(
                "rejecting {ty} of length {value} at offset {}, limit is {}",
                self.r.offset(),
                self.max_slice_length
            );
            return Err(ProtocolError::LimitHit {
                limit: self.max_slice_length,
                ty,
            });
        }
        Ok(())
    }

    fn shield_id(&self) -> i32 {
        self.shield_id
    }

    fn is_reader(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod test {
    use crate::codec::bit_set::BitSet;
    use crate::ser::{func_slice, Io, ProtocolError, Reader};

    #[test]
    fn test_primitives() {
        let bytes = [
            0x01, // bool
            0xFE, 0xFF, // int16
            0x00, 0x00, 0x00, 0x01, // big endian int32
            0xAC, 0x02, // varuint32
            0x40, // byte float
        ];
        let mut r = Reader::new(&bytes[..], 0);
        let (mut flag, mut short, mut be, mut var, mut angle) = (false, 0i16, 0i32, 0u32, 0f32);
        r.bool(&mut flag).unwrap();
        r.i16(&mut short).unwrap();
        r.be_i32(&mut be).unwrap();
        r.varuint32(&mut var).unwrap();
        r.byte_float(&mut angle).unwrap();

        assert!(flag);
        assert_eq!(short, -2);
        assert_eq!(be, 1);
        assert_eq!(var, 300);
        assert_eq!(angle, 90.0);
        assert_eq!(r.offset(), bytes.len() as u64);
    }

    #[test]
    fn test_truncated_input() {
        let bytes = [0x01, 0x02];
        let mut value = 0u32;
        assert!(matches!(
            Reader::new(&bytes[..], 0).u32(&mut value),
            Err(ProtocolError::Nbt(bedrock_nbt::Error::BufferOverrun { off: 2, .. }))
        ));
    }

    #[test]
    fn test_slice_limit() {
        let _ = env_logger::builder().is_test(true).try_init();
        // varuint32 1025
        let bytes = [0x81, 0x08];
        let mut values: Vec<u8> = Vec::new();
        let mut r = Reader::new(&bytes[..], 0);
        assert!(matches!(
            func_slice(&mut r, &mut values, |io, b| io.u8(b)),
            Err(ProtocolError::LimitHit { limit: 1024, .. })
        ));

        // Without limits the count is trusted and the data simply runs out.
        let mut r = Reader::new(&bytes[..], 0).with_limits(false);
        assert!(matches!(
            func_slice(&mut r, &mut values, |io, b| io.u8(b)),
            Err(ProtocolError::Nbt(bedrock_nbt::Error::BufferOverrun { .. }))
        ));
    }

    #[test]
    fn test_bitset_width_from_prefix() {
        let bytes = [0x0A, 0xFF, 0x03];
        let mut bits = BitSet::new(64);
        Reader::new(&bytes[..], 0).bitset(&mut bits).unwrap();
        assert_eq!(bits.len(), 10);
        assert_eq!(bits.ones().count(), 10);

        // Any width is accepted, high bits past it are dropped.
        let bytes = [0x03, 0xFF];
        Reader::new(&bytes[..], 0).bitset(&mut bits).unwrap();
        assert_eq!(bits.len(), 3);
        assert_eq!(bits.as_bytes(), [0x07]);

        let bytes = [0x00];
        Reader::new(&bytes[..], 0).bitset(&mut bits).unwrap();
        assert!(bits.is_empty());
    }

    #[test]
    fn test_bitset_limit() {
        // varuint32 1025 bits
        let bytes = [0x81, 0x08];
        let mut bits = BitSet::default();
        assert!(matches!(
            Reader::new(&bytes[..], 0).bitset(&mut bits),
            Err(ProtocolError::LimitHit { limit: 1024, ty: "bitset" })
        ));
        assert!(matches!(
            Reader::new(&bytes[..], 0).with_limits(false).bitset(&mut bits),
            Err(ProtocolError::Nbt(bedrock_nbt::Error::BufferOverrun { .. }))
        ));
    }

    #[test]
    fn test_bytes_take_the_rest() {
        let bytes = [0x05, 0x01, 0x02, 0x03];
        let mut r = Reader::new(&bytes[..], 0);
        let mut first = 0u8;
        let mut rest = Vec::new();
        r.u8(&mut first).unwrap();
        r.bytes(&mut rest).unwrap();
        assert_eq!(first, 5);
        assert_eq!(rest, [1, 2, 3]);
    }
}
