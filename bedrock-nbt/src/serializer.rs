use std::io::Write;
use std::mem;

use serde::ser::{self, Impossible};
use serde::Serialize;

use crate::*;

// NBT writes a value's tag and name before its payload, but serde only says what the
// value is once it reaches it. State carries what has to be written in front of it.
#[derive(Debug, PartialEq)]
enum State {
    Root,
    Named(String),
    // Only a string may follow.
    MapKey,
    Element,
}

#[derive(Debug)]
struct ListFrame {
    len: usize,
    written: usize,
    element: Option<u8>,
    // Header of a tuple, held back until its first element picks the container.
    pending: Option<State>,
    // The frame opened a list and counts towards depth.
    list: bool,
}

/// Writes serde values as a single named tag.
///
/// Sequences become lists. Tuples and fixed arrays of `u8`, `i32` or `i64` become
/// the matching array tag; `nbt_byte_array`, `nbt_int_array` and `nbt_long_array`
/// force the same for variable length sequences. `None` fields are left out.
#[derive(Debug)]
pub struct Encoder<W, E> {
    output: OffsetWriter<W>,
    encoding: E,
    root_name: String,
    state: State,
    frames: Vec<ListFrame>,
    depth: usize,
    forced_array: Option<u8>,
}

impl<W: Write, E: Encoding> Encoder<W, E> {
    pub fn new(w: W, encoding: E) -> Self {
        Encoder {
            output: OffsetWriter::new(w),
            encoding,
            root_name: String::new(),
            state: State::Root,
            frames: Vec::new(),
            depth: 0,
            forced_array: None,
        }
    }

    /// Name written in front of the root tag. Encodings without a named root ignore it
    /// for compounds.
    pub fn with_root_name(mut self, name: &str) -> Self {
        self.root_name = name.to_string();
        self
    }

    pub fn encoding(&self) -> E {
        self.encoding
    }

    pub fn offset(&self) -> u64 {
        self.output.offset()
    }

    pub fn into_inner(self) -> W {
        self.output.into_inner()
    }

    pub fn encode<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.state = State::Root;
        self.frames.clear();
        self.depth = 0;
        self.forced_array = None;
        value.serialize(&mut *self)
    }

    fn incompatible(&self, ty: &'static str) -> Error {
        let name = match &self.state {
            State::Named(name) => name.clone(),
            _ => String::new(),
        };
        Error::IncompatibleType { name, ty }
    }

    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::MaximumDepthReached);
        }
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| Error::InvalidArraySize {
            off: self.output.offset(),
            op: "write length",
            want: i32::MAX as usize,
            got: len,
        })?;
        E::write_i32(&mut self.output, len)
    }

    fn write_header(&mut self, tag: u8) -> Result<()> {
        match mem::replace(&mut self.state, State::Element) {
            State::Root => {
                self.output.write_byte(tag, "write root tag")?;
                if tag != COMPOUND_ID || E::NAMED_ROOT {
                    E::write_string(&mut self.output, &self.root_name)?;
                }
                Ok(())
            }
            State::Named(name) => {
                self.output.write_byte(tag, "write tag")?;
                E::write_string(&mut self.output, &name)
            }
            State::MapKey => Err(Error::IncompatibleType {
                name: String::new(),
                ty: "map key",
            }),
            State::Element => self.element_header(tag),
        }
    }

    fn element_header(&mut self, tag: u8) -> Result<()> {
        let Some(frame) = self.frames.last_mut() else {
            return Err(Error::IncompatibleType {
                name: String::new(),
                ty: tag_name(tag),
            });
        };
        if let Some(element) = frame.element {
            if element != tag {
                return Err(Error::IncompatibleType {
                    name: format!("list of {}", tag_name(element)),
                    ty: tag_name(tag),
                });
            }
            return Ok(());
        }
        if frame.pending.is_some() {
            return self.open_tuple(tag);
        }

        frame.element = Some(tag);
        let len = frame.len;
        self.output.write_byte(tag, "write list element type")?;
        self.write_len(len)
    }

    fn open_tuple(&mut self, element: u8) -> Result<()> {
        let Some(mut frame) = self.frames.pop() else {
            return Ok(());
        };
        let container = match element {
            BYTE_ID => BYTE_ARRAY_ID,
            INT_ID => INT_ARRAY_ID,
            LONG_ID => LONG_ARRAY_ID,
            _ => LIST_ID,
        };

        self.state = frame.pending.take().unwrap_or(State::Element);
        self.write_header(container)?;
        if container == LIST_ID {
            self.output.write_byte(element, "write list element type")?;
            self.descend()?;
            frame.list = true;
        }
        self.write_len(frame.len)?;
        frame.element = Some(element);
        self.frames.push(frame);
        self.state = State::Element;
        Ok(())
    }

    fn open_array(&mut self, array: u8, len: usize) -> Result<()> {
        let element = match array {
            BYTE_ARRAY_ID => BYTE_ID,
            INT_ARRAY_ID => INT_ID,
            _ => LONG_ID,
        };
        self.write_header(array)?;
        self.write_len(len)?;
        self.frames.push(ListFrame {
            len,
            written: 0,
            element: Some(element),
            pending: None,
            list: false,
        });
        Ok(())
    }

    fn close_list(&mut self) -> Result<()> {
        let Some(mut frame) = self.frames.pop() else {
            return Ok(());
        };
        if frame.written != frame.len {
            return Err(Error::InvalidArraySize {
                off: self.output.offset(),
                op: "write list",
                want: frame.len,
                got: frame.written,
            });
        }
        if let Some(outer) = frame.pending.take() {
            self.state = outer;
            self.write_header(LIST_ID)?;
        }
        if frame.element.is_none() {
            // Empty lists still name an element type.
            self.output.write_byte(BYTE_ID, "write list element type")?;
            self.write_len(0)?;
        }
        if frame.list {
            self.depth -= 1;
        }
        Ok(())
    }

    fn next_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        if let Some(frame) = self.frames.last_mut() {
            frame.written += 1;
        }
        self.state = State::Element;
        value.serialize(&mut *self)
    }

    fn open_compound(&mut self) -> Result<()> {
        self.write_header(COMPOUND_ID)?;
        self.descend()
    }

    fn close_compound(&mut self) -> Result<()> {
        self.output.write_byte(END_ID, "write end tag")?;
        self.depth -= 1;
        Ok(())
    }
}

macro_rules! serialize_number {
    ($method:ident, $ty:ty, $id:ident, $write:ident) => {
        fn $method(self, v: $ty) -> Result<()> {
            self.write_header($id)?;
            E::$write(&mut self.output, v)
        }
    };
}

macro_rules! serialize_unsupported {
    ($($method:ident($ty:ty) => $name:literal),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<()> {
                Err(self.incompatible($name))
            }
        )*
    };
}

impl<W: Write, E: Encoding> ser::Serializer for &mut Encoder<W, E> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.serialize_u8(v as u8)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_u8(v as u8)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.write_header(BYTE_ID)?;
        self.output.write_byte(v, "write byte")
    }

    serialize_number!(serialize_i16, i16, SHORT_ID, write_i16);
    serialize_number!(serialize_i32, i32, INT_ID, write_i32);
    serialize_number!(serialize_i64, i64, LONG_ID, write_i64);
    serialize_number!(serialize_f32, f32, FLOAT_ID, write_f32);
    serialize_number!(serialize_f64, f64, DOUBLE_ID, write_f64);

    serialize_unsupported! {
        serialize_u16(u16) => "u16",
        serialize_u32(u32) => "u32",
        serialize_u64(u64) => "u64",
        serialize_char(char) => "char",
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        if self.state == State::MapKey {
            self.state = State::Named(v.to_string());
            return Ok(());
        }
        self.write_header(STRING_ID)?;
        E::write_string(&mut self.output, v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.forced_array = None;
        self.write_header(BYTE_ARRAY_ID)?;
        self.write_len(v.len())?;
        self.output.write_all_op(v, "write byte array")
    }

    fn serialize_none(self) -> Result<()> {
        match self.state {
            // Absent fields are simply not written.
            State::Named(_) => Ok(()),
            _ => Err(self.incompatible("none")),
        }
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Err(self.incompatible("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Err(self.incompatible("unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()> {
        if name != NBT_ARRAY_TAG {
            return Err(self.incompatible("enum variant"));
        }
        self.forced_array = Some(match variant {
            NBT_BYTE_ARRAY_TAG => BYTE_ARRAY_ID,
            NBT_INT_ARRAY_TAG => INT_ARRAY_ID,
            _ => LONG_ARRAY_ID,
        });
        let result = value.serialize(&mut *self);
        self.forced_array = None;
        result
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self> {
        let Some(len) = len else {
            return Err(self.incompatible("sequence of unknown length"));
        };
        if let Some(array) = self.forced_array.take() {
            self.open_array(array, len)?;
            return Ok(self);
        }

        self.write_header(LIST_ID)?;
        self.descend()?;
        self.frames.push(ListFrame {
            len,
            written: 0,
            element: None,
            pending: None,
            list: true,
        });
        Ok(self)
    }

    fn serialize_tuple(self, len: usize) -> Result<Self> {
        if let Some(array) = self.forced_array.take() {
            self.open_array(array, len)?;
            return Ok(self);
        }

        let outer = mem::replace(&mut self.state, State::Element);
        self.frames.push(ListFrame {
            len,
            written: 0,
            element: None,
            pending: Some(outer),
            list: false,
        });
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Self> {
        self.serialize_tuple(len)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.incompatible("enum variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self> {
        self.open_compound()?;
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self> {
        self.open_compound()?;
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.incompatible("enum variant"))
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

impl<W: Write, E: Encoding> ser::SerializeSeq for &mut Encoder<W, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.next_element(value)
    }

    fn end(self) -> Result<()> {
        self.close_list()
    }
}

impl<W: Write, E: Encoding> ser::SerializeTuple for &mut Encoder<W, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.next_element(value)
    }

    fn end(self) -> Result<()> {
        self.close_list()
    }
}

impl<W: Write, E: Encoding> ser::SerializeTupleStruct for &mut Encoder<W, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.next_element(value)
    }

    fn end(self) -> Result<()> {
        self.close_list()
    }
}

impl<W: Write, E: Encoding> ser::SerializeMap for &mut Encoder<W, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.state = State::MapKey;
        key.serialize(&mut **self)?;
        if self.state == State::MapKey {
            return Err(self.incompatible("map key"));
        }
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        self.close_compound()
    }
}

impl<W: Write, E: Encoding> ser::SerializeStruct for &mut Encoder<W, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.state = State::Named(key.to_string());
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        self.close_compound()
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use serde::Serialize;

    use crate::*;

    #[test]
    fn test_empty_list_writes_byte_sentinel() {
        #[derive(Serialize)]
        struct Holder {
            items: Vec<String>,
        }

        let bytes = to_bytes_encoding(&Holder { items: vec![] }, BigEndian).unwrap();
        assert_eq!(
            bytes,
            [
                COMPOUND_ID, 0x00, 0x00, // root
                LIST_ID, 0x00, 0x05, b'i', b't', b'e', b'm', b's', // name
                BYTE_ID, 0x00, 0x00, 0x00, 0x00, // sentinel element type, length 0
                END_ID,
            ]
        );
    }

    #[test]
    fn test_tuple_of_strings_is_list() {
        #[derive(Serialize)]
        struct Pair {
            p: (String, String),
        }

        let value = Pair {
            p: ("a".to_string(), "b".to_string()),
        };
        let bytes = to_bytes_encoding(&value, BigEndian).unwrap();
        assert_eq!(
            bytes,
            [
                COMPOUND_ID, 0x00, 0x00, // root
                LIST_ID, 0x00, 0x01, b'p', // name
                STRING_ID, 0x00, 0x00, 0x00, 0x02, // element type, length
                0x00, 0x01, b'a', 0x00, 0x01, b'b', // values
                END_ID,
            ]
        );
    }

    #[test]
    fn test_nested_lists() {
        let value: NbtTag = NbtCompound::from(vec![(
            "grid".to_string(),
            NbtTag::List(vec![
                NbtTag::List(vec![NbtTag::Short(1), NbtTag::Short(2)]),
                NbtTag::List(vec![]),
            ]),
        )])
        .into();

        let bytes = to_bytes_encoding(&value, LittleEndian).unwrap();
        let decoded: NbtTag = from_bytes_encoding(&bytes, LittleEndian).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_map_key_must_be_string() {
        let map = std::collections::BTreeMap::from([(1i32, 2i32)]);
        assert!(matches!(
            to_bytes(&map),
            Err(Error::IncompatibleType { ty: "map key", .. })
        ));
    }

    #[test]
    fn test_none_outside_compound_fails() {
        let list: Vec<Option<i32>> = vec![Some(1), None];
        assert!(matches!(
            to_bytes(&list),
            Err(Error::IncompatibleType { ty: "none", .. })
        ));
    }

    #[test]
    fn test_depth_guard() {
        fn nest(levels: usize) -> NbtTag {
            let mut tag = NbtTag::Int(1);
            for _ in 0..levels {
                tag = NbtTag::List(vec![tag]);
            }
            NbtCompound::from(vec![("a".to_string(), tag)]).into()
        }

        let result = thread::Builder::new()
            .stack_size(256 * 1024 * 1024)
            .spawn(|| {
                let deep = to_bytes(&nest(600)).map(drop);
                let shallow = to_bytes(&nest(100)).map(drop);
                (deep, shallow)
            })
            .unwrap()
            .join()
            .unwrap();
        assert!(matches!(result.0, Err(Error::MaximumDepthReached)));
        assert!(result.1.is_ok());
    }
}
