use bedrock_nbt::{NbtCompound, NetworkLittleEndian};
use uuid::Uuid;

use crate::codec::color::Rgba;
use crate::codec::position::BlockPos;
use crate::codec::vector::Vec3;
use crate::ser::{
    marshal_tag, slice_u32_length, slice_u8_length, unknown_enum_option, Io, Marshal, Result,
    Tagged,
};

#[derive(Clone, Debug, PartialEq)]
pub enum GameRuleValue {
    Bool(bool),
    Int(u32),
    Float(f32),
}

impl Default for GameRuleValue {
    fn default() -> Self {
        GameRuleValue::Bool(false)
    }
}

impl Tagged for GameRuleValue {
    type Tag = u32;
    const ENUM_NAME: &'static str = "game rule type";

    fn tag(&self) -> u32 {
        match self {
            GameRuleValue::Bool(_) => 1,
            GameRuleValue::Int(_) => 2,
            GameRuleValue::Float(_) => 3,
        }
    }

    fn from_tag(tag: u32) -> Option<Self> {
        Some(match tag {
            1 => GameRuleValue::Bool(false),
            2 => GameRuleValue::Int(0),
            3 => GameRuleValue::Float(0.0),
            _ => return None,
        })
    }
}

impl Marshal for GameRuleValue {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        marshal_tag(io, self, |io, tag| io.varuint32(tag))?;
        match self {
            GameRuleValue::Bool(v) => io.bool(v),
            GameRuleValue::Int(v) => io.varuint32(v),
            GameRuleValue::Float(v) => io.f32(v),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameRule {
    pub name: String,
    pub can_be_modified_by_player: bool,
    pub value: GameRuleValue,
}

impl Marshal for GameRule {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        io.bool(&mut self.can_be_modified_by_player)?;
        self.value.marshal(io)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExperimentData {
    pub name: String,
    pub enabled: bool,
}

impl Marshal for ExperimentData {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        io.bool(&mut self.enabled)
    }
}

/// Experimental toggles of a world.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Experiments {
    pub experiments: Vec<ExperimentData>,
    pub previously_toggled: bool,
}

impl Marshal for Experiments {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        slice_u32_length(io, &mut self.experiments)?;
        io.bool(&mut self.previously_toggled)
    }
}

pub const ABILITY_LAYER_TYPE_BASE: u16 = 1;
pub const ABILITY_LAYER_TYPE_SPECTATOR: u16 = 2;

/// Ability flags of a single layer. `abilities` marks which bits of `values` are set
/// by this layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbilityLayer {
    pub layer_type: u16,
    pub abilities: u32,
    pub values: u32,
    pub fly_speed: f32,
    pub vertical_fly_speed: f32,
    pub walk_speed: f32,
}

impl Marshal for AbilityLayer {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u16(&mut self.layer_type)?;
        io.u32(&mut self.abilities)?;
        io.u32(&mut self.values)?;
        io.f32(&mut self.fly_speed)?;
        io.f32(&mut self.vertical_fly_speed)?;
        io.f32(&mut self.walk_speed)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbilityData {
    pub entity_unique_id: i64,
    pub player_permissions: u8,
    pub command_permissions: u8,
    pub layers: Vec<AbilityLayer>,
}

impl Marshal for AbilityData {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.i64(&mut self.entity_unique_id)?;
        io.u8(&mut self.player_permissions)?;
        io.u8(&mut self.command_permissions)?;
        slice_u8_length(io, &mut self.layers)
    }
}

/// Settings of a structure block save or load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructureSettings {
    pub palette_name: String,
    pub ignore_entities: bool,
    pub ignore_blocks: bool,
    pub allow_non_ticking_chunks: bool,
    pub size: BlockPos,
    pub offset: BlockPos,
    pub last_editing_player_unique_id: i64,
    pub rotation: u8,
    pub mirror: u8,
    pub animation_mode: u8,
    pub animation_duration: f32,
    pub integrity: f32,
    pub seed: u32,
    pub pivot: Vec3,
}

impl Marshal for StructureSettings {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.palette_name)?;
        io.bool(&mut self.ignore_entities)?;
        io.bool(&mut self.ignore_blocks)?;
        io.bool(&mut self.allow_non_ticking_chunks)?;
        io.ublock_pos(&mut self.size)?;
        io.ublock_pos(&mut self.offset)?;
        io.varint64(&mut self.last_editing_player_unique_id)?;
        io.u8(&mut self.rotation)?;
        io.u8(&mut self.mirror)?;
        io.u8(&mut self.animation_mode)?;
        io.f32(&mut self.animation_duration)?;
        io.f32(&mut self.integrity)?;
        io.u32(&mut self.seed)?;
        io.vec3(&mut self.pivot)
    }
}

/// Custom block sent to the client, with its properties as NBT.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockEntry {
    pub name: String,
    pub properties: NbtCompound,
}

impl Marshal for BlockEntry {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        io.nbt(&mut self.properties, NetworkLittleEndian)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EducationSharedResourceURI {
    pub button_name: String,
    pub link_uri: String,
}

impl Marshal for EducationSharedResourceURI {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.button_name)?;
        io.string(&mut self.link_uri)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EducationExternalLinkSettings {
    pub url: String,
    pub display_name: String,
}

impl Marshal for EducationExternalLinkSettings {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.url)?;
        io.string(&mut self.display_name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerMovementSettings {
    pub rewind_history_size: i32,
    pub server_authoritative_block_breaking: bool,
}

impl Marshal for PlayerMovementSettings {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.rewind_history_size)?;
        io.bool(&mut self.server_authoritative_block_breaking)
    }
}

/// One block of an update sent as a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockChangeEntry {
    pub block_pos: BlockPos,
    pub block_runtime_id: u32,
    pub flags: u32,
    pub synced_update_entity_unique_id: u64,
    pub synced_update_type: u32,
}

impl Marshal for BlockChangeEntry {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.ublock_pos(&mut self.block_pos)?;
        io.varuint32(&mut self.block_runtime_id)?;
        io.varuint32(&mut self.flags)?;
        io.varuint64(&mut self.synced_update_entity_unique_id)?;
        io.varuint32(&mut self.synced_update_type)
    }
}

pub const MAP_OBJECT_TYPE_ENTITY: i32 = 0;
pub const MAP_OBJECT_TYPE_BLOCK: i32 = 1;

/// Entity or block followed on a map. Only the field matching `object_type` is sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapTrackedObject {
    pub object_type: i32,
    pub entity_unique_id: i64,
    pub block_position: BlockPos,
}

impl Marshal for MapTrackedObject {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.i32(&mut self.object_type)?;
        match self.object_type {
            MAP_OBJECT_TYPE_ENTITY => io.varint64(&mut self.entity_unique_id),
            MAP_OBJECT_TYPE_BLOCK => io.ublock_pos(&mut self.block_position),
            other => Err(unknown_enum_option(other, "map tracked object type")),
        }
    }
}

/// Marker drawn on a map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapDecoration {
    pub decoration_type: u8,
    pub rotation: u8,
    pub x: u8,
    pub y: u8,
    pub label: String,
    pub colour: Rgba,
}

impl Marshal for MapDecoration {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.decoration_type)?;
        io.u8(&mut self.rotation)?;
        io.u8(&mut self.x)?;
        io.u8(&mut self.y)?;
        io.string(&mut self.label)?;
        io.var_rgba(&mut self.colour)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrimPattern {
    pub item_name: String,
    pub pattern_id: String,
}

impl Marshal for TrimPattern {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.item_name)?;
        io.string(&mut self.pattern_id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrimMaterial {
    pub material_id: String,
    /// Formatting code of the material's colour, such as `§p`.
    pub colour: String,
    pub item_name: String,
}

impl Marshal for TrimMaterial {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.material_id)?;
        io.string(&mut self.colour)?;
        io.string(&mut self.item_name)
    }
}

pub const PLAYER_ACTION_START_BREAK: i32 = 0;
pub const PLAYER_ACTION_ABORT_BREAK: i32 = 1;
pub const PLAYER_ACTION_STOP_BREAK: i32 = 2;
pub const PLAYER_ACTION_CRACK_BREAK: i32 = 18;
pub const PLAYER_ACTION_PREDICT_DESTROY_BLOCK: i32 = 26;
pub const PLAYER_ACTION_CONTINUE_DESTROY_BLOCK: i32 = 27;

/// Block breaking step of a player. Actions not aimed at a block carry no position
/// or face.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerBlockAction {
    pub action: i32,
    pub block_pos: BlockPos,
    pub face: i32,
}

impl Marshal for PlayerBlockAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.action)?;
        match self.action {
            PLAYER_ACTION_START_BREAK
            | PLAYER_ACTION_ABORT_BREAK
            | PLAYER_ACTION_CRACK_BREAK
            | PLAYER_ACTION_PREDICT_DESTROY_BLOCK
            | PLAYER_ACTION_CONTINUE_DESTROY_BLOCK => {
                io.block_pos(&mut self.block_pos)?;
                io.varint32(&mut self.face)
            }
            _ => Ok(()),
        }
    }
}

/// Height range and generator of a data driven dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DimensionDefinition {
    pub name: String,
    pub range: [i32; 2],
    pub generator: i32,
}

impl Marshal for DimensionDefinition {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        io.varint32(&mut self.range[0])?;
        io.varint32(&mut self.range[1])?;
        io.varint32(&mut self.generator)
    }
}

/// Resource pack offered to a joining client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TexturePackInfo {
    pub uuid: Uuid,
    pub version: String,
    pub size: u64,
    pub content_key: String,
    pub sub_pack_name: String,
    pub content_identity: String,
    pub has_scripts: bool,
    pub addon_pack: bool,
    pub rtx_enabled: bool,
    pub download_url: String,
}

impl Marshal for TexturePackInfo {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.uuid(&mut self.uuid)?;
        io.string(&mut self.version)?;
        io.u64(&mut self.size)?;
        io.string(&mut self.content_key)?;
        io.string(&mut self.sub_pack_name)?;
        io.string(&mut self.content_identity)?;
        io.bool(&mut self.has_scripts)?;
        io.bool(&mut self.addon_pack)?;
        io.bool(&mut self.rtx_enabled)?;
        io.string(&mut self.download_url)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackResourcePack {
    pub uuid: String,
    pub version: String,
    pub sub_pack_name: String,
}

impl Marshal for StackResourcePack {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.uuid)?;
        io.string(&mut self.version)?;
        io.string(&mut self.sub_pack_name)
    }
}

/// Chunk data the client may already hold, keyed by its xxHash64.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheBlob {
    pub hash: u64,
    pub payload: Vec<u8>,
}

impl Marshal for CacheBlob {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u64(&mut self.hash)?;
        io.byte_slice(&mut self.payload)
    }
}
