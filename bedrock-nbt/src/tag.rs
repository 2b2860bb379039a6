use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::compound::NbtCompound;
use crate::*;

/// Any tag payload, used wherever the decode target should accept whatever the
/// input holds.
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum NbtTag {
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    List(Vec<NbtTag>),
    Compound(NbtCompound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl NbtTag {
    /// Returns the numeric id associated with the data type.
    pub const fn get_type_id(&self) -> u8 {
        match self {
            NbtTag::Byte(_) => BYTE_ID,
            NbtTag::Short(_) => SHORT_ID,
            NbtTag::Int(_) => INT_ID,
            NbtTag::Long(_) => LONG_ID,
            NbtTag::Float(_) => FLOAT_ID,
            NbtTag::Double(_) => DOUBLE_ID,
            NbtTag::ByteArray(_) => BYTE_ARRAY_ID,
            NbtTag::String(_) => STRING_ID,
            NbtTag::List(_) => LIST_ID,
            NbtTag::Compound(_) => COMPOUND_ID,
            NbtTag::IntArray(_) => INT_ARRAY_ID,
            NbtTag::LongArray(_) => LONG_ARRAY_ID,
        }
    }

    pub fn extract_byte(&self) -> Option<u8> {
        match self {
            NbtTag::Byte(byte) => Some(*byte),
            _ => None,
        }
    }

    pub fn extract_bool(&self) -> Option<bool> {
        self.extract_byte().map(|byte| byte != 0)
    }

    pub fn extract_short(&self) -> Option<i16> {
        match self {
            NbtTag::Short(short) => Some(*short),
            _ => None,
        }
    }

    pub fn extract_int(&self) -> Option<i32> {
        match self {
            NbtTag::Int(int) => Some(*int),
            _ => None,
        }
    }

    pub fn extract_long(&self) -> Option<i64> {
        match self {
            NbtTag::Long(long) => Some(*long),
            _ => None,
        }
    }

    pub fn extract_float(&self) -> Option<f32> {
        match self {
            NbtTag::Float(float) => Some(*float),
            _ => None,
        }
    }

    pub fn extract_double(&self) -> Option<f64> {
        match self {
            NbtTag::Double(double) => Some(*double),
            _ => None,
        }
    }

    pub fn extract_byte_array(&self) -> Option<&[u8]> {
        match self {
            NbtTag::ByteArray(byte_array) => Some(byte_array),
            _ => None,
        }
    }

    pub fn extract_string(&self) -> Option<&str> {
        match self {
            NbtTag::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn extract_list(&self) -> Option<&[NbtTag]> {
        match self {
            NbtTag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn extract_compound(&self) -> Option<&NbtCompound> {
        match self {
            NbtTag::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    pub fn extract_int_array(&self) -> Option<&[i32]> {
        match self {
            NbtTag::IntArray(int_array) => Some(int_array),
            _ => None,
        }
    }

    pub fn extract_long_array(&self) -> Option<&[i64]> {
        match self {
            NbtTag::LongArray(long_array) => Some(long_array),
            _ => None,
        }
    }
}

impl From<&str> for NbtTag {
    fn from(value: &str) -> Self {
        NbtTag::String(value.to_string())
    }
}

impl From<String> for NbtTag {
    fn from(value: String) -> Self {
        NbtTag::String(value)
    }
}

impl From<&[u8]> for NbtTag {
    fn from(value: &[u8]) -> Self {
        NbtTag::ByteArray(value.to_vec())
    }
}

impl From<i16> for NbtTag {
    fn from(value: i16) -> Self {
        NbtTag::Short(value)
    }
}

impl From<i32> for NbtTag {
    fn from(value: i32) -> Self {
        NbtTag::Int(value)
    }
}

impl From<i64> for NbtTag {
    fn from(value: i64) -> Self {
        NbtTag::Long(value)
    }
}

impl From<f32> for NbtTag {
    fn from(value: f32) -> Self {
        NbtTag::Float(value)
    }
}

impl From<f64> for NbtTag {
    fn from(value: f64) -> Self {
        NbtTag::Double(value)
    }
}

impl From<bool> for NbtTag {
    fn from(value: bool) -> Self {
        NbtTag::Byte(value as u8)
    }
}

impl From<NbtCompound> for NbtTag {
    fn from(value: NbtCompound) -> Self {
        NbtTag::Compound(value)
    }
}

impl Serialize for NbtTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            NbtTag::Byte(v) => serializer.serialize_u8(*v),
            NbtTag::Short(v) => serializer.serialize_i16(*v),
            NbtTag::Int(v) => serializer.serialize_i32(*v),
            NbtTag::Long(v) => serializer.serialize_i64(*v),
            NbtTag::Float(v) => serializer.serialize_f32(*v),
            NbtTag::Double(v) => serializer.serialize_f64(*v),
            NbtTag::ByteArray(v) => serializer.serialize_bytes(v),
            NbtTag::String(v) => serializer.serialize_str(v),
            NbtTag::List(v) => v.serialize(serializer),
            NbtTag::Compound(v) => v.serialize(serializer),
            NbtTag::IntArray(v) => nbt_int_array(v, serializer),
            NbtTag::LongArray(v) => nbt_long_array(v, serializer),
        }
    }
}

struct TagVisitor;

impl<'de> Visitor<'de> for TagVisitor {
    type Value = NbtTag;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an NBT tag")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::Byte(v as u8))
    }

    fn visit_u8<E: de::Error>(self, v: u8) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::Byte(v))
    }

    fn visit_i8<E: de::Error>(self, v: i8) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::Byte(v as u8))
    }

    fn visit_i16<E: de::Error>(self, v: i16) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::Short(v))
    }

    fn visit_i32<E: de::Error>(self, v: i32) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::Int(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::Long(v))
    }

    fn visit_f32<E: de::Error>(self, v: f32) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::Float(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::String(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::ByteArray(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<NbtTag, E> {
        Ok(NbtTag::ByteArray(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<NbtTag, A::Error> {
        let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(tag) = seq.next_element()? {
            list.push(tag);
        }
        Ok(NbtTag::List(list))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<NbtTag, A::Error> {
        let Some(first) = map.next_key::<String>()? else {
            return Ok(NbtTag::Compound(NbtCompound::new()));
        };

        // The decoder hands arrays over as a single entry keyed by a marker name.
        match first.as_str() {
            NBT_BYTE_ARRAY_TAG => Ok(NbtTag::ByteArray(map.next_value::<ByteArray>()?.0)),
            NBT_INT_ARRAY_TAG => Ok(NbtTag::IntArray(map.next_value()?)),
            NBT_LONG_ARRAY_TAG => Ok(NbtTag::LongArray(map.next_value()?)),
            _ => {
                let first_value = map.next_value()?;
                compound::collect_compound(Some((first, first_value)), map).map(NbtTag::Compound)
            }
        }
    }
}

impl<'de> Deserialize<'de> for NbtTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(TagVisitor)
    }
}

/// Byte array payload that accepts both byte buffers and byte sequences.
struct ByteArray(Vec<u8>);

impl<'de> Deserialize<'de> for ByteArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct BytesVisitor;

        impl<'de> Visitor<'de> for BytesVisitor {
            type Value = ByteArray;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a byte array")
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<ByteArray, E> {
                Ok(ByteArray(v.to_vec()))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<ByteArray, E> {
                Ok(ByteArray(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<ByteArray, A::Error> {
                let mut bytes = Vec::new();
                while let Some(b) = seq.next_element()? {
                    bytes.push(b);
                }
                Ok(ByteArray(bytes))
            }
        }

        deserializer.deserialize_bytes(BytesVisitor)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        BYTE_ARRAY_ID, LittleEndian, NbtCompound, NbtTag, NetworkLittleEndian, from_bytes,
        from_bytes_encoding, to_bytes, to_bytes_encoding,
    };

    fn every_kind() -> NbtCompound {
        let mut inner = NbtCompound::new();
        inner.put_string("name", "test".to_string());

        let mut compound = NbtCompound::new();
        compound.put_byte("byte", 3);
        compound.put_short("short", -2);
        compound.put_int("int", 1 << 20);
        compound.put_long("long", -(1 << 40));
        compound.put_float("float", 0.5);
        compound.put_double("double", -0.25);
        compound.put("bytes", NbtTag::ByteArray(vec![1, 2, 255]));
        compound.put_string("string", "text".to_string());
        compound.put(
            "list",
            NbtTag::List(vec![NbtTag::Short(1), NbtTag::Short(2)]),
        );
        compound.put_component("display", inner);
        compound.put("ints", NbtTag::IntArray(vec![-1, 0, 1]));
        compound.put("longs", NbtTag::LongArray(vec![i64::MIN, i64::MAX]));
        compound
    }

    #[test]
    fn test_generic_round_trip() {
        let compound = every_kind();

        let bytes = to_bytes(&compound).unwrap();
        let decoded: NbtCompound = from_bytes(&bytes).unwrap();
        assert_eq!(decoded, compound);

        let bytes = to_bytes_encoding(&compound, LittleEndian).unwrap();
        let decoded: NbtCompound = from_bytes_encoding(&bytes, LittleEndian).unwrap();
        assert_eq!(decoded, compound);
    }

    #[test]
    fn test_empty_generic_list() {
        let mut compound = NbtCompound::new();
        compound.put("empty", NbtTag::List(Vec::new()));

        let bytes = to_bytes_encoding(&compound, NetworkLittleEndian).unwrap();
        let decoded: NbtCompound = from_bytes(&bytes).unwrap();
        assert_eq!(decoded.get("empty"), Some(&NbtTag::List(Vec::new())));
    }

    #[test]
    fn test_type_ids() {
        assert_eq!(NbtTag::ByteArray(vec![]).get_type_id(), BYTE_ARRAY_ID);
        assert_eq!(NbtTag::from(true), NbtTag::Byte(1));
        assert_eq!(NbtTag::from("x").extract_string(), Some("x"));
    }
}
