use std::collections::BTreeMap;

use bedrock_nbt::{NbtCompound, NetworkLittleEndian};

use crate::codec::position::BlockPos;
use crate::codec::vector::Vec3;
use crate::ser::{marshal_tag, Io, Marshal, Result, Tagged};

/// Entity properties keyed by their metadata id.
pub type EntityMetadata = BTreeMap<u32, MetadataValue>;

pub const METADATA_BYTE: u32 = 0;
pub const METADATA_INT16: u32 = 1;
pub const METADATA_INT32: u32 = 2;
pub const METADATA_FLOAT32: u32 = 3;
pub const METADATA_STRING: u32 = 4;
pub const METADATA_COMPOUND: u32 = 5;
pub const METADATA_BLOCK_POS: u32 = 6;
pub const METADATA_INT64: u32 = 7;
pub const METADATA_VEC3: u32 = 8;

#[derive(Clone, Debug, PartialEq)]
pub enum MetadataValue {
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Float32(f32),
    String(String),
    Compound(NbtCompound),
    BlockPos(BlockPos),
    Int64(i64),
    Vec3(Vec3),
}

impl Default for MetadataValue {
    fn default() -> Self {
        MetadataValue::Byte(0)
    }
}

impl Tagged for MetadataValue {
    type Tag = u32;
    const ENUM_NAME: &'static str = "entity metadata type";

    fn tag(&self) -> u32 {
        match self {
            MetadataValue::Byte(_) => METADATA_BYTE,
            MetadataValue::Int16(_) => METADATA_INT16,
            MetadataValue::Int32(_) => METADATA_INT32,
            MetadataValue::Float32(_) => METADATA_FLOAT32,
            MetadataValue::String(_) => METADATA_STRING,
            MetadataValue::Compound(_) => METADATA_COMPOUND,
            MetadataValue::BlockPos(_) => METADATA_BLOCK_POS,
            MetadataValue::Int64(_) => METADATA_INT64,
            MetadataValue::Vec3(_) => METADATA_VEC3,
        }
    }

    fn from_tag(tag: u32) -> Option<Self> {
        Some(match tag {
            METADATA_BYTE => MetadataValue::Byte(0),
            METADATA_INT16 => MetadataValue::Int16(0),
            METADATA_INT32 => MetadataValue::Int32(0),
            METADATA_FLOAT32 => MetadataValue::Float32(0.0),
            METADATA_STRING => MetadataValue::String(String::new()),
            METADATA_COMPOUND => MetadataValue::Compound(NbtCompound::new()),
            METADATA_BLOCK_POS => MetadataValue::BlockPos(BlockPos::default()),
            METADATA_INT64 => MetadataValue::Int64(0),
            METADATA_VEC3 => MetadataValue::Vec3(Vec3::default()),
            _ => return None,
        })
    }
}

impl Marshal for MetadataValue {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        marshal_tag(io, self, |io, t| io.varuint32(t))?;
        match self {
            MetadataValue::Byte(x) => io.u8(x),
            MetadataValue::Int16(x) => io.i16(x),
            MetadataValue::Int32(x) => io.varint32(x),
            MetadataValue::Float32(x) => io.f32(x),
            MetadataValue::String(x) => io.string(x),
            MetadataValue::Compound(x) => io.nbt(x, NetworkLittleEndian),
            MetadataValue::BlockPos(x) => io.block_pos(x),
            MetadataValue::Int64(x) => io.varint64(x),
            MetadataValue::Vec3(x) => io.vec3(x),
        }
    }
}

/// Link between a ridden entity and its rider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityLink {
    pub ridden_entity_unique_id: i64,
    pub rider_entity_unique_id: i64,
    pub link_type: u8,
    pub immediate: bool,
}

pub const ENTITY_LINK_REMOVE: u8 = 0;
pub const ENTITY_LINK_RIDER: u8 = 1;
pub const ENTITY_LINK_PASSENGER: u8 = 2;

impl Marshal for EntityLink {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint64(&mut self.ridden_entity_unique_id)?;
        io.varint64(&mut self.rider_entity_unique_id)?;
        io.u8(&mut self.link_type)?;
        io.bool(&mut self.immediate)
    }
}

/// Numeric entity property such as health or movement speed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attribute {
    pub min: f32,
    pub max: f32,
    pub value: f32,
    pub default: f32,
    pub name: String,
}

impl Marshal for Attribute {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.f32(&mut self.min)?;
        io.f32(&mut self.max)?;
        io.f32(&mut self.value)?;
        io.f32(&mut self.default)?;
        io.string(&mut self.name)
    }
}

/// Attribute value as sent in entity spawn data, without a default.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeValue {
    pub name: String,
    pub min: f32,
    pub value: f32,
    pub max: f32,
}

impl Marshal for AttributeValue {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        io.f32(&mut self.min)?;
        io.f32(&mut self.value)?;
        io.f32(&mut self.max)
    }
}

/// Entity property changed in bulk by the server.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityProperties {
    pub int_properties: Vec<IntEntityProperty>,
    pub float_properties: Vec<FloatEntityProperty>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntEntityProperty {
    pub index: u32,
    pub value: i32,
}

impl Marshal for IntEntityProperty {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.index)?;
        io.varint32(&mut self.value)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FloatEntityProperty {
    pub index: u32,
    pub value: f32,
}

impl Marshal for FloatEntityProperty {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.index)?;
        io.f32(&mut self.value)
    }
}

impl Marshal for EntityProperties {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        crate::ser::slice(io, &mut self.int_properties)?;
        crate::ser::slice(io, &mut self.float_properties)
    }
}
