use std::{
    fmt::Display,
    io::{self, Read, Write},
};

use serde::{Serialize, de, de::DeserializeOwned, ser};
use thiserror::Error;

pub mod compound;
pub mod deserializer;
pub mod dump;
pub mod encoding;
pub mod offset;
pub mod serializer;
pub mod tag;
pub mod varint;

pub use compound::NbtCompound;
pub use deserializer::Decoder;
pub use dump::dump;
pub use encoding::{BigEndian, Encoding, LittleEndian, NetworkBigEndian, NetworkLittleEndian};
pub use offset::{OffsetReader, OffsetWriter};
pub use serializer::Encoder;
pub use tag::NbtTag;

pub const END_ID: u8 = 0x00;
pub const BYTE_ID: u8 = 0x01;
pub const SHORT_ID: u8 = 0x02;
pub const INT_ID: u8 = 0x03;
pub const LONG_ID: u8 = 0x04;
pub const FLOAT_ID: u8 = 0x05;
pub const DOUBLE_ID: u8 = 0x06;
pub const BYTE_ARRAY_ID: u8 = 0x07;
pub const STRING_ID: u8 = 0x08;
pub const LIST_ID: u8 = 0x09;
pub const COMPOUND_ID: u8 = 0x0A;
pub const INT_ARRAY_ID: u8 = 0x0B;
pub const LONG_ARRAY_ID: u8 = 0x0C;

/// Deepest nesting of compounds and lists either direction accepts.
pub const MAX_DEPTH: usize = 512;
/// Bytes a [`NetworkLittleEndian`] decoder may consume before giving up.
pub const MAX_NETWORK_BYTES: u64 = 4 * 1024 * 1024;

/// Display name of a tag id, as used by the dump and in error messages.
pub fn tag_name(id: u8) -> &'static str {
    match id {
        END_ID => "TAG_End",
        BYTE_ID => "TAG_Byte",
        SHORT_ID => "TAG_Short",
        INT_ID => "TAG_Int",
        LONG_ID => "TAG_Long",
        FLOAT_ID => "TAG_Float",
        DOUBLE_ID => "TAG_Double",
        BYTE_ARRAY_ID => "TAG_Byte_Array",
        STRING_ID => "TAG_String",
        LIST_ID => "TAG_List",
        COMPOUND_ID => "TAG_Compound",
        INT_ARRAY_ID => "TAG_Int_Array",
        LONG_ARRAY_ID => "TAG_Long_Array",
        _ => "TAG_Unknown",
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("unexpected end of buffer during {op} at offset {off}")]
    BufferOverrun { op: &'static str, off: u64 },
    #[error("{op} failed at offset {off}: {source}")]
    FailedWrite {
        op: &'static str,
        off: u64,
        source: io::Error,
    },
    #[error("varint did not terminate after {n} bytes at offset {off}")]
    InvalidVarint { n: usize, off: u64 },
    #[error("invalid string of length {len} at offset {off}: {reason}")]
    InvalidString {
        off: u64,
        len: i64,
        reason: &'static str,
    },
    #[error("cannot decode {} into field '{field}' of type {field_type} at offset {off}", tag_name(*.tag_type))]
    InvalidType {
        off: u64,
        field: String,
        field_type: &'static str,
        tag_type: u8,
    },
    #[error("unknown tag id {tag_type} during {op} at offset {off}")]
    UnknownTag {
        off: u64,
        op: &'static str,
        tag_type: u8,
    },
    #[error("unexpected {} at offset {off}", tag_name(*.tag_type))]
    UnexpectedTag { off: u64, tag_type: u8 },
    #[error("{} '{name}' at offset {off} has no field to decode into", tag_name(*.tag_type))]
    UnexpectedNamedTag {
        off: u64,
        name: String,
        tag_type: u8,
    },
    #[error("{op} at offset {off} holds {got} elements, expected {want}")]
    InvalidArraySize {
        off: u64,
        op: &'static str,
        want: usize,
        got: usize,
    },
    #[error("{ty} in '{name}' has no NBT representation")]
    IncompatibleType { name: String, ty: &'static str },
    #[error("negative length {len} at offset {off}")]
    NegativeLength { off: u64, len: i32 },
    #[error("nesting deeper than {MAX_DEPTH} levels")]
    MaximumDepthReached,
    #[error("read more than {MAX_NETWORK_BYTES} bytes of network NBT")]
    MaximumBytesRead,
    #[error("serde error: {0}")]
    Serde(String),
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Serde(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Serde(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Encodes `value` as network little endian NBT with an empty root name.
pub fn to_bytes<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_bytes_encoding(value, NetworkLittleEndian)
}

pub fn to_bytes_encoding<T, E>(value: &T, encoding: E) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
    E: Encoding,
{
    let mut bytes = Vec::new();
    to_writer(&mut bytes, value, encoding)?;
    Ok(bytes)
}

/// Encodes `value` under the root name `name`.
pub fn to_bytes_named<T, E>(value: &T, name: &str, encoding: E) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
    E: Encoding,
{
    let mut bytes = Vec::new();
    Encoder::new(&mut bytes, encoding)
        .with_root_name(name)
        .encode(value)?;
    Ok(bytes)
}

pub fn to_writer<W, T, E>(w: W, value: &T, encoding: E) -> Result<()>
where
    W: Write,
    T: ?Sized + Serialize,
    E: Encoding,
{
    Encoder::new(w, encoding).encode(value)
}

/// Decodes network little endian NBT.
pub fn from_bytes<T>(data: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_bytes_encoding(data, NetworkLittleEndian)
}

pub fn from_bytes_encoding<T, E>(data: &[u8], encoding: E) -> Result<T>
where
    T: DeserializeOwned,
    E: Encoding,
{
    from_reader(data, encoding)
}

/// Decodes one tag, returning the root name alongside the value.
pub fn from_bytes_named<T, E>(data: &[u8], encoding: E) -> Result<(String, T)>
where
    T: DeserializeOwned,
    E: Encoding,
{
    let mut decoder = Decoder::new(data, encoding);
    let value = decoder.decode()?;
    Ok((decoder.root_name().to_string(), value))
}

pub fn from_reader<R, T, E>(r: R, encoding: E) -> Result<T>
where
    R: Read,
    T: DeserializeOwned,
    E: Encoding,
{
    Decoder::new(r, encoding).decode()
}

/// `skip_serializing_if` predicate that drops zero values, the NBT equivalent of "omitempty".
pub fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

pub(crate) const NBT_ARRAY_TAG: &str = "__nbt_array";
pub(crate) const NBT_INT_ARRAY_TAG: &str = "__nbt_int_array";
pub(crate) const NBT_LONG_ARRAY_TAG: &str = "__nbt_long_array";
pub(crate) const NBT_BYTE_ARRAY_TAG: &str = "__nbt_byte_array";

macro_rules! impl_array {
    ($name:ident, $variant:expr) => {
        /// Forces a variable length sequence to be written as an array tag instead of a list.
        pub fn $name<T, S>(input: T, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            T: serde::Serialize,
            S: serde::Serializer,
        {
            serializer.serialize_newtype_variant(NBT_ARRAY_TAG, 0, $variant, &input)
        }
    };
}

impl_array!(nbt_int_array, NBT_INT_ARRAY_TAG);
impl_array!(nbt_long_array, NBT_LONG_ARRAY_TAG);
impl_array!(nbt_byte_array, NBT_BYTE_ARRAY_TAG);

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};

    use crate::{
        BigEndian, Error, INT_ID, LittleEndian, NbtCompound, NbtTag, NetworkBigEndian,
        NetworkLittleEndian, from_bytes, from_bytes_encoding, from_bytes_named, is_default,
        nbt_byte_array, nbt_int_array, nbt_long_array, to_bytes, to_bytes_encoding,
        to_bytes_named,
    };

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Test {
        byte: u8,
        flag: bool,
        short: i16,
        int: i32,
        long: i64,
        float: f32,
        double: f64,
        string: String,
    }

    fn sample() -> Test {
        Test {
            byte: 123,
            flag: true,
            short: 1342,
            int: -4313,
            long: 34,
            float: 1.0,
            double: -69.42,
            string: "Hello test".to_string(),
        }
    }

    #[test]
    fn test_simple_ser_de_every_encoding() {
        let test = sample();

        let bytes = to_bytes_encoding(&test, LittleEndian).unwrap();
        assert_eq!(from_bytes_encoding::<Test, _>(&bytes, LittleEndian).unwrap(), test);

        let bytes = to_bytes_encoding(&test, BigEndian).unwrap();
        assert_eq!(from_bytes_encoding::<Test, _>(&bytes, BigEndian).unwrap(), test);

        let bytes = to_bytes_encoding(&test, NetworkBigEndian).unwrap();
        assert_eq!(from_bytes_encoding::<Test, _>(&bytes, NetworkBigEndian).unwrap(), test);

        let bytes = to_bytes(&test).unwrap();
        assert_eq!(from_bytes::<Test>(&bytes).unwrap(), test);
    }

    #[test]
    fn test_byte_tag_round_trip() {
        let input = [0x01, 0x00, 0x03, b'a', b'b', b'c', 0x2A];
        let (name, value): (String, u8) = from_bytes_named(&input, BigEndian).unwrap();
        assert_eq!(name, "abc");
        assert_eq!(value, 42);

        let bytes = to_bytes_named(&value, &name, BigEndian).unwrap();
        assert_eq!(bytes, input);

        // Network strings carry a single varint length byte.
        let input = [0x01, 0x03, b'a', b'b', b'c', 0x2A];
        let (name, tag): (String, NbtTag) = from_bytes_named(&input, NetworkLittleEndian).unwrap();
        assert_eq!(name, "abc");
        assert_eq!(tag, NbtTag::Byte(42));
        let bytes = to_bytes_named(&tag, &name, NetworkLittleEndian).unwrap();
        assert_eq!(bytes, input);
    }

    #[test]
    fn test_network_big_endian_root_has_no_name() {
        #[derive(Serialize)]
        struct Root {
            a: u8,
        }

        let bytes = to_bytes_named(&Root { a: 1 }, "ignored", NetworkBigEndian).unwrap();
        let expected_bytes = [
            0x0A, // Compound, no root name follows
            0x01, // Byte
            0x00, 0x01, // Key length
            0x61, // Key (a)
            0x01, // Value
            0x00, // End
        ];
        assert_eq!(bytes, expected_bytes);
    }

    #[test]
    fn test_omit_empty_field() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Record {
            a: i32,
            #[serde(default, skip_serializing_if = "is_default")]
            b: i64,
        }

        let record = Record { a: 7, b: 0 };
        let bytes = to_bytes_encoding(&record, LittleEndian).unwrap();
        let expected_bytes = [
            0x0A, // Compound
            0x00, 0x00, // Empty root name
            0x03, // Int
            0x01, 0x00, // Key length
            0x61, // Key (a)
            0x07, 0x00, 0x00, 0x00, // Value
            0x00, // End
        ];
        assert_eq!(bytes, expected_bytes);

        let decoded: Record = from_bytes_encoding(&bytes, LittleEndian).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_unexpected_field_rejected() {
        #[derive(Serialize)]
        struct Both {
            x: i32,
            y: i32,
        }

        #[derive(Deserialize, Debug)]
        struct OnlyX {
            #[allow(dead_code)]
            x: i32,
        }

        let bytes = to_bytes(&Both { x: 1, y: 2 }).unwrap();
        match from_bytes::<OnlyX>(&bytes) {
            Err(Error::UnexpectedNamedTag { name, tag_type, .. }) => {
                assert_eq!(name, "y");
                assert_eq!(tag_type, INT_ID);
            }
            other => panic!("expected UnexpectedNamedTag, got {other:?}"),
        }
    }

    #[test]
    fn test_renamed_and_skipped_fields() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Renamed {
            #[serde(rename = "Name")]
            name: String,
            #[serde(skip)]
            cache: i32,
        }

        let value = Renamed {
            name: "diamond".to_string(),
            cache: 99,
        };
        let bytes = to_bytes(&value).unwrap();
        let compound: NbtCompound = from_bytes(&bytes).unwrap();
        assert_eq!(compound.get_string("Name"), Some("diamond"));
        assert!(compound.get("cache").is_none());

        let decoded: Renamed = from_bytes(&bytes).unwrap();
        assert_eq!(decoded.name, "diamond");
        assert_eq!(decoded.cache, 0);
    }

    #[test]
    fn test_flattened_fields_share_a_level() {
        #[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
        struct Position {
            x: i32,
            z: i32,
        }

        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Entity {
            id: String,
            #[serde(flatten)]
            pos: Position,
        }

        let entity = Entity {
            id: "minecraft:pig".to_string(),
            pos: Position { x: 4, z: -9 },
        };
        let bytes = to_bytes_encoding(&entity, LittleEndian).unwrap();
        let compound: NbtCompound = from_bytes_encoding(&bytes, LittleEndian).unwrap();
        assert_eq!(compound.get_int("x"), Some(4));
        assert_eq!(compound.get_int("z"), Some(-9));

        let decoded: Entity = from_bytes_encoding(&bytes, LittleEndian).unwrap();
        assert_eq!(decoded, entity);
    }

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct TestArray {
        #[serde(serialize_with = "nbt_byte_array")]
        byte_array: Vec<u8>,
        #[serde(serialize_with = "nbt_int_array")]
        int_array: Vec<i32>,
        #[serde(serialize_with = "nbt_long_array")]
        long_array: Vec<i64>,
    }

    #[test]
    fn test_simple_ser_de_array() {
        let test = TestArray {
            byte_array: vec![0, 3, 2],
            int_array: vec![13, 1321, 2],
            long_array: vec![1, 0, 200301, 1],
        };

        let bytes = to_bytes(&test).unwrap();
        let recreated_struct: TestArray = from_bytes(&bytes).unwrap();
        assert_eq!(test, recreated_struct);

        let generic: NbtCompound = from_bytes(&bytes).unwrap();
        assert_eq!(
            generic.get("int_array"),
            Some(&NbtTag::IntArray(vec![13, 1321, 2]))
        );
        assert_eq!(
            generic.get("byte_array"),
            Some(&NbtTag::ByteArray(vec![0, 3, 2]))
        );
    }

    #[test]
    fn test_fixed_arrays() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Fixed {
            l: [i64; 1],
            i: [i32; 1],
            b: [u8; 1],
        }

        let value = Fixed {
            l: [0],
            i: [0],
            b: [0],
        };
        let expected_bytes = [
            0x0A, // Compound
            0x00, 0x00, // Empty root name
            0x0C, // Long Array
            0x00, 0x01, // Key length
            0x6C, // Key (l)
            0x00, 0x00, 0x00, 0x01, // Array Length
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // Value(s)
            0x0B, // Int Array
            0x00, 0x01, // Key length
            0x69, // Key (i)
            0x00, 0x00, 0x00, 0x01, // Array Length
            0x00, 0x00, 0x00, 0x00, // Value(s)
            0x07, // Byte Array
            0x00, 0x01, // Key length
            0x62, // Key (b)
            0x00, 0x00, 0x00, 0x01, // Array Length
            0x00, // Value(s)
            0x00, // End
        ];

        let bytes = to_bytes_encoding(&value, BigEndian).unwrap();
        assert_eq!(bytes, expected_bytes);
        let decoded: Fixed = from_bytes_encoding(&bytes, BigEndian).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_fixed_array_length_mismatch() {
        #[derive(Serialize)]
        struct Three {
            v: [i32; 3],
        }

        #[derive(Deserialize, Debug)]
        struct Two {
            #[allow(dead_code)]
            v: [i32; 2],
        }

        let bytes = to_bytes(&Three { v: [1, 2, 3] }).unwrap();
        match from_bytes::<Two>(&bytes) {
            Err(Error::InvalidArraySize { want, got, .. }) => {
                assert_eq!(want, 2);
                assert_eq!(got, 3);
            }
            other => panic!("expected InvalidArraySize, got {other:?}"),
        }
    }

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Egg {
        food: String,
    }

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Breakfast {
        food: Egg,
    }

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct TestList {
        option: Option<Egg>,
        nested_compound: Breakfast,
        compounds: Vec<Test>,
        list_string: Vec<String>,
        empty: Vec<Test>,
        by_name: HashMap<String, i16>,
    }

    #[test]
    fn test_list() {
        let mut second = sample();
        second.string = "Hello compounds".to_string();
        second.flag = false;

        let list_compound = TestList {
            option: Some(Egg {
                food: "Skibid".to_string(),
            }),
            nested_compound: Breakfast {
                food: Egg {
                    food: "Over easy".to_string(),
                },
            },
            compounds: vec![sample(), second],
            list_string: vec!["".to_string(), "abcbcbcbbc".to_string()],
            empty: vec![],
            by_name: HashMap::from([("one".to_string(), 1), ("two".to_string(), 2)]),
        };

        let bytes = to_bytes(&list_compound).unwrap();
        let recreated_struct: TestList = from_bytes(&bytes).unwrap();
        assert_eq!(list_compound, recreated_struct);

        let bytes = to_bytes_encoding(&list_compound, LittleEndian).unwrap();
        let recreated_struct: TestList = from_bytes_encoding(&bytes, LittleEndian).unwrap();
        assert_eq!(list_compound, recreated_struct);
    }

    #[test]
    fn test_missing_option_is_none() {
        let list_compound = TestList {
            option: None,
            nested_compound: Breakfast {
                food: Egg {
                    food: "Over easy".to_string(),
                },
            },
            compounds: vec![],
            list_string: vec![],
            empty: vec![],
            by_name: HashMap::new(),
        };

        let bytes = to_bytes_named(&list_compound, "a", BigEndian).unwrap();
        let (name, recreated_struct): (String, TestList) =
            from_bytes_named(&bytes, BigEndian).unwrap();
        assert_eq!(name, "a");
        assert_eq!(list_compound, recreated_struct);
    }

    #[test]
    fn test_mixed_tuple_fails() {
        #[derive(Serialize)]
        struct BadData {
            x: (i32, i64),
        }

        match to_bytes(&BadData { x: (0, 0) }) {
            Err(Error::IncompatibleType { .. }) => (),
            other => panic!("expected to fail serialization, got {other:?}"),
        };
    }

    #[test]
    fn test_unsigned_wide_ints_are_incompatible() {
        #[derive(Serialize)]
        struct Wide {
            x: u32,
        }

        match to_bytes(&Wide { x: 1 }) {
            Err(Error::IncompatibleType { name, ty }) => {
                assert_eq!(name, "x");
                assert_eq!(ty, "u32");
            }
            other => panic!("expected IncompatibleType, got {other:?}"),
        }
    }

    #[test]
    fn test_type_mismatch() {
        #[derive(Serialize)]
        struct Source {
            value: String,
        }

        #[derive(Deserialize, Debug)]
        struct Target {
            #[allow(dead_code)]
            value: i32,
        }

        let bytes = to_bytes_encoding(&Source { value: "x".into() }, LittleEndian).unwrap();
        match from_bytes_encoding::<Target, _>(&bytes, LittleEndian) {
            Err(Error::InvalidType {
                field, field_type, ..
            }) => {
                assert_eq!(field, "value");
                assert_eq!(field_type, "i32");
            }
            other => panic!("expected InvalidType, got {other:?}"),
        }
    }

    #[test]
    fn test_unit_enum_as_string() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        enum Mode {
            Survival,
            Creative,
        }

        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Player {
            mode: Mode,
        }

        let player = Player {
            mode: Mode::Creative,
        };
        let bytes = to_bytes(&player).unwrap();
        let compound: NbtCompound = from_bytes(&bytes).unwrap();
        assert_eq!(compound.get_string("mode"), Some("Creative"));
        assert_eq!(from_bytes::<Player>(&bytes).unwrap(), player);
    }
}
