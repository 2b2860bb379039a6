use std::collections::HashMap;
use std::fmt;
use std::vec::IntoIter;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::tag::NbtTag;

/// Compound whose entries keep the order they were read or inserted in, so that
/// re-encoding a decoded compound reproduces the original bytes.
#[derive(Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct NbtCompound {
    pub child_tags: Vec<(String, NbtTag)>,
}

impl NbtCompound {
    pub fn new() -> NbtCompound {
        NbtCompound {
            child_tags: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.child_tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.child_tags.len()
    }

    /// Inserts `value` under `name`, replacing an existing entry in place.
    pub fn put(&mut self, name: &str, value: impl Into<NbtTag>) {
        let value = value.into();
        match self.child_tags.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.child_tags.push((name.to_string(), value)),
        }
    }

    pub fn put_byte(&mut self, name: &str, value: u8) {
        self.put(name, NbtTag::Byte(value));
    }

    pub fn put_bool(&mut self, name: &str, value: bool) {
        self.put(name, NbtTag::Byte(value as u8));
    }

    pub fn put_short(&mut self, name: &str, value: i16) {
        self.put(name, NbtTag::Short(value));
    }

    pub fn put_int(&mut self, name: &str, value: i32) {
        self.put(name, NbtTag::Int(value));
    }

    pub fn put_long(&mut self, name: &str, value: i64) {
        self.put(name, NbtTag::Long(value));
    }

    pub fn put_float(&mut self, name: &str, value: f32) {
        self.put(name, NbtTag::Float(value));
    }

    pub fn put_double(&mut self, name: &str, value: f64) {
        self.put(name, NbtTag::Double(value));
    }

    pub fn put_string(&mut self, name: &str, value: String) {
        self.put(name, NbtTag::String(value));
    }

    pub fn put_component(&mut self, name: &str, value: NbtCompound) {
        self.put(name, NbtTag::Compound(value));
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&NbtTag> {
        self.child_tags
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, name: &str) -> Option<NbtTag> {
        let index = self.child_tags.iter().position(|(key, _)| key == name)?;
        Some(self.child_tags.remove(index).1)
    }

    pub fn get_byte(&self, name: &str) -> Option<u8> {
        self.get(name).and_then(|tag| tag.extract_byte())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|tag| tag.extract_bool())
    }

    pub fn get_short(&self, name: &str) -> Option<i16> {
        self.get(name).and_then(|tag| tag.extract_short())
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(|tag| tag.extract_int())
    }

    pub fn get_long(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|tag| tag.extract_long())
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(|tag| tag.extract_float())
    }

    pub fn get_double(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|tag| tag.extract_double())
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|tag| tag.extract_string())
    }

    pub fn get_list(&self, name: &str) -> Option<&[NbtTag]> {
        self.get(name).and_then(|tag| tag.extract_list())
    }

    pub fn get_compound(&self, name: &str) -> Option<&NbtCompound> {
        self.get(name).and_then(|tag| tag.extract_compound())
    }

    pub fn get_int_array(&self, name: &str) -> Option<&[i32]> {
        self.get(name).and_then(|tag| tag.extract_int_array())
    }

    pub fn get_long_array(&self, name: &str) -> Option<&[i64]> {
        self.get(name).and_then(|tag| tag.extract_long_array())
    }

    pub fn get_byte_array(&self, name: &str) -> Option<&[u8]> {
        self.get(name).and_then(|tag| tag.extract_byte_array())
    }
}

impl From<Vec<(String, NbtTag)>> for NbtCompound {
    fn from(child_tags: Vec<(String, NbtTag)>) -> Self {
        NbtCompound { child_tags }
    }
}

// Builds a compound from a stream of entries in linear time. A repeated key keeps
// its first position and takes the last value.
#[derive(Default)]
struct CompoundBuilder {
    index: HashMap<String, usize>,
    child_tags: Vec<(String, NbtTag)>,
}

impl CompoundBuilder {
    fn push(&mut self, key: String, value: NbtTag) {
        if let Some(&i) = self.index.get(&key) {
            self.child_tags[i].1 = value;
            return;
        }
        self.index.insert(key.clone(), self.child_tags.len());
        self.child_tags.push((key, value));
    }

    fn finish(self) -> NbtCompound {
        NbtCompound {
            child_tags: self.child_tags,
        }
    }
}

impl FromIterator<(String, NbtTag)> for NbtCompound {
    fn from_iter<T: IntoIterator<Item = (String, NbtTag)>>(iter: T) -> Self {
        let mut builder = CompoundBuilder::default();
        for (key, value) in iter {
            builder.push(key, value);
        }
        builder.finish()
    }
}

impl IntoIterator for NbtCompound {
    type Item = (String, NbtTag);
    type IntoIter = IntoIter<(String, NbtTag)>;

    fn into_iter(self) -> Self::IntoIter {
        self.child_tags.into_iter()
    }
}

impl<'a> IntoIterator for &'a NbtCompound {
    type Item = &'a (String, NbtTag);
    type IntoIter = std::slice::Iter<'a, (String, NbtTag)>;

    fn into_iter(self) -> Self::IntoIter {
        self.child_tags.iter()
    }
}

impl Serialize for NbtCompound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.child_tags.len()))?;
        for (key, value) in &self.child_tags {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

pub(crate) fn collect_compound<'de, A: MapAccess<'de>>(
    first: Option<(String, NbtTag)>,
    mut map: A,
) -> Result<NbtCompound, A::Error> {
    let mut builder = CompoundBuilder::default();
    if let Some((key, value)) = first {
        builder.push(key, value);
    }
    while let Some((key, value)) = map.next_entry::<String, NbtTag>()? {
        builder.push(key, value);
    }
    Ok(builder.finish())
}

impl<'de> Deserialize<'de> for NbtCompound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CompoundVisitor;

        impl<'de> Visitor<'de> for CompoundVisitor {
            type Value = NbtCompound;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an NBT compound")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<NbtCompound, A::Error> {
                collect_compound(None, map)
            }
        }

        deserializer.deserialize_map(CompoundVisitor)
    }
}
