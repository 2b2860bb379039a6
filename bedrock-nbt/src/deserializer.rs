use std::io::Read;

use serde::de::value::{BytesDeserializer, SeqDeserializer, StrDeserializer};
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor};

use crate::*;

/// Reads one named tag and binds its payload to a serde target.
///
/// Structs are strict: a compound entry that names no field of the target fails
/// with [`Error::UnexpectedNamedTag`] instead of being dropped. Maps and
/// [`NbtTag`] accept any entry.
#[derive(Debug)]
pub struct Decoder<R, E> {
    input: OffsetReader<R>,
    encoding: E,
    depth: usize,
    // Tag of the payload the next deserialize call consumes, `None` before the root header.
    tag: Option<u8>,
    field: String,
    root_name: String,
}

impl<R: Read, E: Encoding> Decoder<R, E> {
    pub fn new(r: R, encoding: E) -> Self {
        let input = match E::READ_LIMIT {
            Some(limit) => OffsetReader::with_limit(r, limit),
            None => OffsetReader::new(r),
        };
        Decoder {
            input,
            encoding,
            depth: 0,
            tag: None,
            field: String::new(),
            root_name: String::new(),
        }
    }

    pub fn encoding(&self) -> E {
        self.encoding
    }

    /// Name of the last root tag decoded.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.input.offset()
    }

    pub fn decode<T: DeserializeOwned>(&mut self) -> Result<T> {
        self.tag = None;
        self.depth = 0;
        self.field.clear();
        T::deserialize(&mut *self)
    }

    fn read_root(&mut self) -> Result<u8> {
        let tag = self.input.read_byte("read root tag")?;
        match tag {
            END_ID => {
                return Err(Error::UnexpectedTag {
                    off: self.input.offset(),
                    tag_type: tag,
                });
            }
            COMPOUND_ID if !E::NAMED_ROOT => self.root_name.clear(),
            BYTE_ID..=LONG_ARRAY_ID => self.root_name = E::read_string(&mut self.input)?,
            _ => {
                return Err(Error::UnknownTag {
                    off: self.input.offset(),
                    op: "read root tag",
                    tag_type: tag,
                });
            }
        }
        Ok(tag)
    }

    fn next_tag(&mut self) -> Result<u8> {
        let tag = match self.tag.take() {
            Some(tag) => tag,
            None => self.read_root()?,
        };
        if E::READ_LIMIT.is_some_and(|limit| self.input.offset() >= limit) {
            return Err(Error::MaximumBytesRead);
        }
        Ok(tag)
    }

    fn invalid_type(&self, tag: u8, field_type: &'static str) -> Error {
        Error::InvalidType {
            off: self.input.offset(),
            field: self.field.clone(),
            field_type,
            tag_type: tag,
        }
    }

    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::MaximumDepthReached);
        }
        Ok(())
    }

    fn read_len(&mut self) -> Result<usize> {
        let len = E::read_i32(&mut self.input)?;
        if len < 0 {
            return Err(Error::NegativeLength {
                off: self.input.offset(),
                len,
            });
        }
        Ok(len as usize)
    }

    fn check_len(&self, op: &'static str, want: Option<usize>, got: usize) -> Result<()> {
        match want {
            Some(want) if want != got => Err(Error::InvalidArraySize {
                off: self.input.offset(),
                op,
                want,
                got,
            }),
            _ => Ok(()),
        }
    }

    fn read_list_header(&mut self, want: Option<usize>) -> Result<(u8, usize)> {
        let element = self.input.read_byte("read list element type")?;
        if element > LONG_ARRAY_ID {
            return Err(Error::UnknownTag {
                off: self.input.offset(),
                op: "read list element type",
                tag_type: element,
            });
        }
        let len = self.read_len()?;
        self.check_len("list", want, len)?;
        if element == END_ID && len > 0 {
            return Err(Error::UnexpectedTag {
                off: self.input.offset(),
                tag_type: element,
            });
        }
        Ok((element, len))
    }

    fn visit_list<'de, V: Visitor<'de>>(&mut self, visitor: V, want: Option<usize>) -> Result<V::Value> {
        let (element, remaining) = self.read_list_header(want)?;
        self.descend()?;
        let value = visitor.visit_seq(ListAccess {
            de: self,
            element,
            remaining,
        })?;
        self.depth -= 1;
        Ok(value)
    }

    fn visit_array<'de, V: Visitor<'de>>(
        &mut self,
        tag: u8,
        visitor: V,
        want: Option<usize>,
    ) -> Result<V::Value> {
        let remaining = self.read_len()?;
        let (op, element) = match tag {
            BYTE_ARRAY_ID => ("byte array", BYTE_ID),
            INT_ARRAY_ID => ("int array", INT_ID),
            _ => ("long array", LONG_ID),
        };
        self.check_len(op, want, remaining)?;
        visitor.visit_seq(ListAccess {
            de: self,
            element,
            remaining,
        })
    }

    fn visit_compound<'de, V: Visitor<'de>>(
        &mut self,
        visitor: V,
        fields: Option<&'static [&'static str]>,
    ) -> Result<V::Value> {
        self.descend()?;
        let value = visitor.visit_map(CompoundAccess {
            de: self,
            fields,
            tag: END_ID,
        })?;
        self.depth -= 1;
        Ok(value)
    }

    fn skip(&mut self, tag: u8) -> Result<()> {
        match tag {
            BYTE_ID => self.input.skip(1, "skip byte"),
            SHORT_ID => E::read_i16(&mut self.input).map(drop),
            INT_ID => E::read_i32(&mut self.input).map(drop),
            LONG_ID => E::read_i64(&mut self.input).map(drop),
            FLOAT_ID => E::read_f32(&mut self.input).map(drop),
            DOUBLE_ID => E::read_f64(&mut self.input).map(drop),
            STRING_ID => E::read_string(&mut self.input).map(drop),
            BYTE_ARRAY_ID => {
                let len = self.read_len()?;
                self.input.skip(len as u64, "skip byte array")
            }
            INT_ARRAY_ID => {
                let len = self.read_len()?;
                E::read_i32_slice(&mut self.input, len).map(drop)
            }
            LONG_ARRAY_ID => {
                let len = self.read_len()?;
                E::read_i64_slice(&mut self.input, len).map(drop)
            }
            LIST_ID => {
                let (element, len) = self.read_list_header(None)?;
                self.descend()?;
                for _ in 0..len {
                    self.skip(element)?;
                }
                self.depth -= 1;
                Ok(())
            }
            COMPOUND_ID => {
                self.descend()?;
                loop {
                    let tag = self.input.read_byte("skip compound")?;
                    if tag == END_ID {
                        break;
                    }
                    E::read_string(&mut self.input)?;
                    self.skip(tag)?;
                }
                self.depth -= 1;
                Ok(())
            }
            END_ID => Err(Error::UnexpectedTag {
                off: self.input.offset(),
                tag_type: tag,
            }),
            _ => Err(Error::UnknownTag {
                off: self.input.offset(),
                op: "skip",
                tag_type: tag,
            }),
        }
    }
}

macro_rules! deserialize_number {
    ($method:ident, $id:ident, $read:ident, $visit:ident, $name:literal) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            let tag = self.next_tag()?;
            if tag != $id {
                return Err(self.invalid_type(tag, $name));
            }
            visitor.$visit(E::$read(&mut self.input)?)
        }
    };
}

macro_rules! deserialize_unsupported {
    ($($method:ident => $name:literal),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
                let tag = self.next_tag()?;
                Err(self.invalid_type(tag, $name))
            }
        )*
    };
}

impl<'de, R: Read, E: Encoding> de::Deserializer<'de> for &mut Decoder<R, E> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let tag = self.next_tag()?;
        match tag {
            BYTE_ID => visitor.visit_u8(self.input.read_byte("read byte")?),
            SHORT_ID => visitor.visit_i16(E::read_i16(&mut self.input)?),
            INT_ID => visitor.visit_i32(E::read_i32(&mut self.input)?),
            LONG_ID => visitor.visit_i64(E::read_i64(&mut self.input)?),
            FLOAT_ID => visitor.visit_f32(E::read_f32(&mut self.input)?),
            DOUBLE_ID => visitor.visit_f64(E::read_f64(&mut self.input)?),
            STRING_ID => visitor.visit_string(E::read_string(&mut self.input)?),
            LIST_ID => self.visit_list(visitor, None),
            COMPOUND_ID => self.visit_compound(visitor, None),
            BYTE_ARRAY_ID | INT_ARRAY_ID | LONG_ARRAY_ID => visitor.visit_map(ArrayAccess {
                de: self,
                tag,
                done: false,
            }),
            END_ID => Err(Error::UnexpectedTag {
                off: self.input.offset(),
                tag_type: tag,
            }),
            _ => Err(Error::UnknownTag {
                off: self.input.offset(),
                op: "read tag",
                tag_type: tag,
            }),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let tag = self.next_tag()?;
        if tag != BYTE_ID {
            return Err(self.invalid_type(tag, "bool"));
        }
        visitor.visit_bool(self.input.read_byte("read bool")? != 0)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let tag = self.next_tag()?;
        if tag != BYTE_ID {
            return Err(self.invalid_type(tag, "u8"));
        }
        visitor.visit_u8(self.input.read_byte("read byte")?)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let tag = self.next_tag()?;
        if tag != BYTE_ID {
            return Err(self.invalid_type(tag, "i8"));
        }
        visitor.visit_i8(self.input.read_byte("read byte")? as i8)
    }

    deserialize_number!(deserialize_i16, SHORT_ID, read_i16, visit_i16, "i16");
    deserialize_number!(deserialize_i32, INT_ID, read_i32, visit_i32, "i32");
    deserialize_number!(deserialize_i64, LONG_ID, read_i64, visit_i64, "i64");
    deserialize_number!(deserialize_f32, FLOAT_ID, read_f32, visit_f32, "f32");
    deserialize_number!(deserialize_f64, DOUBLE_ID, read_f64, visit_f64, "f64");

    deserialize_unsupported! {
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_char => "char",
        deserialize_unit => "unit",
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let tag = self.next_tag()?;
        if tag != STRING_ID {
            return Err(self.invalid_type(tag, "string"));
        }
        visitor.visit_string(E::read_string(&mut self.input)?)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let tag = self.next_tag()?;
        match tag {
            BYTE_ARRAY_ID => {
                let len = self.read_len()?;
                visitor.visit_byte_buf(self.input.next(len, "read byte array")?)
            }
            LIST_ID => self.visit_list(visitor, None),
            _ => Err(self.invalid_type(tag, "bytes")),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        // Absent values are never written, so anything present is Some.
        visitor.visit_some(self)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let tag = self.next_tag()?;
        match tag {
            LIST_ID => self.visit_list(visitor, None),
            BYTE_ARRAY_ID | INT_ARRAY_ID | LONG_ARRAY_ID => self.visit_array(tag, visitor, None),
            _ => Err(self.invalid_type(tag, "sequence")),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        let tag = self.next_tag()?;
        match tag {
            LIST_ID => self.visit_list(visitor, Some(len)),
            BYTE_ARRAY_ID | INT_ARRAY_ID | LONG_ARRAY_ID => {
                self.visit_array(tag, visitor, Some(len))
            }
            _ => Err(self.invalid_type(tag, "array")),
        }
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let tag = self.next_tag()?;
        if tag != COMPOUND_ID {
            return Err(self.invalid_type(tag, "map"));
        }
        self.visit_compound(visitor, None)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let tag = self.next_tag()?;
        if tag != COMPOUND_ID {
            return Err(self.invalid_type(tag, "struct"));
        }
        self.visit_compound(visitor, Some(fields))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let tag = self.next_tag()?;
        if tag != STRING_ID {
            return Err(self.invalid_type(tag, "enum"));
        }
        let variant = E::read_string(&mut self.input)?;
        visitor.visit_enum(variant.into_deserializer())
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let tag = self.next_tag()?;
        self.skip(tag)?;
        visitor.visit_unit()
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

struct CompoundAccess<'a, R, E> {
    de: &'a mut Decoder<R, E>,
    fields: Option<&'static [&'static str]>,
    tag: u8,
}

impl<'de, R: Read, E: Encoding> MapAccess<'de> for CompoundAccess<'_, R, E> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        let tag = self.de.input.read_byte("read compound entry tag")?;
        if tag == END_ID {
            return Ok(None);
        }
        if tag > LONG_ARRAY_ID {
            return Err(Error::UnknownTag {
                off: self.de.input.offset(),
                op: "read compound entry tag",
                tag_type: tag,
            });
        }

        let name = E::read_string(&mut self.de.input)?;
        if let Some(fields) = self.fields {
            if !fields.contains(&name.as_str()) {
                return Err(Error::UnexpectedNamedTag {
                    off: self.de.input.offset(),
                    name,
                    tag_type: tag,
                });
            }
        }

        self.tag = tag;
        let key = seed.deserialize(StrDeserializer::<Error>::new(&name))?;
        self.de.field = name;
        Ok(Some(key))
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        self.de.tag = Some(self.tag);
        seed.deserialize(&mut *self.de)
    }
}

struct ListAccess<'a, R, E> {
    de: &'a mut Decoder<R, E>,
    element: u8,
    remaining: usize,
}

impl<'de, R: Read, E: Encoding> SeqAccess<'de> for ListAccess<'_, R, E> {
    type Error = Error;

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        self.de.tag = Some(self.element);
        seed.deserialize(&mut *self.de).map(Some)
    }
}

/// Presents an array tag to a generic target as a single entry map keyed by a
/// marker name, so that [`NbtTag`] can tell the three array kinds apart from lists.
struct ArrayAccess<'a, R, E> {
    de: &'a mut Decoder<R, E>,
    tag: u8,
    done: bool,
}

impl<'de, R: Read, E: Encoding> MapAccess<'de> for ArrayAccess<'_, R, E> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if self.done {
            return Ok(None);
        }
        let marker = match self.tag {
            BYTE_ARRAY_ID => NBT_BYTE_ARRAY_TAG,
            INT_ARRAY_ID => NBT_INT_ARRAY_TAG,
            _ => NBT_LONG_ARRAY_TAG,
        };
        seed.deserialize(StrDeserializer::<Error>::new(marker)).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        self.done = true;
        let len = self.de.read_len()?;
        match self.tag {
            BYTE_ARRAY_ID => {
                let bytes = self.de.input.next(len, "read byte array")?;
                seed.deserialize(BytesDeserializer::<Error>::new(&bytes))
            }
            INT_ARRAY_ID => {
                let ints = E::read_i32_slice(&mut self.de.input, len)?;
                seed.deserialize(SeqDeserializer::<_, Error>::new(ints.into_iter()))
            }
            _ => {
                let longs = E::read_i64_slice(&mut self.de.input, len)?;
                seed.deserialize(SeqDeserializer::<_, Error>::new(longs.into_iter()))
            }
        }
    }
}
