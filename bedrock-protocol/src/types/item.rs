use bedrock_nbt::{LittleEndian, NbtCompound, NetworkLittleEndian};

use crate::ser::{func_slice_i32_length, invalid_value, slice, Io, Marshal, Result};

/// Version byte that follows an int16 of -1 at the start of item user data.
pub const ITEM_USER_DATA_VERSION: u8 = 1;

/// Network id and metadata of an item. A network id of zero is air.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemType {
    pub network_id: i32,
    pub metadata_value: u32,
}

impl Marshal for ItemType {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.network_id)?;
        if self.network_id != 0 {
            io.varuint32(&mut self.metadata_value)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemStack {
    pub item_type: ItemType,
    pub block_runtime_id: i32,
    pub count: u16,
    pub nbt_data: NbtCompound,
    pub can_be_placed_on: Vec<String>,
    pub can_break: Vec<String>,
}

impl ItemStack {
    pub fn is_air(&self) -> bool {
        self.item_type.network_id == 0
    }
}

impl Marshal for ItemStack {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.item(self)
    }
}

/// An item stack together with the id the server tracks it by.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemInstance {
    pub stack_network_id: i32,
    pub stack: ItemStack,
}

impl Marshal for ItemInstance {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.item_instance(self)
    }
}

/// Fields in front of the user data blob. Returns false for air, which has nothing
/// after its network id.
pub(crate) fn marshal_item_head<I: Io>(
    io: &mut I,
    x: &mut ItemStack,
    stack_network_id: Option<&mut i32>,
) -> Result<bool> {
    io.varint32(&mut x.item_type.network_id)?;
    if x.is_air() {
        return Ok(false);
    }
    io.u16(&mut x.count)?;
    io.varuint32(&mut x.item_type.metadata_value)?;
    if let Some(id) = stack_network_id {
        let mut has_network_id = *id != 0;
        io.bool(&mut has_network_id)?;
        if has_network_id {
            io.varint32(id)?;
        } else {
            *id = 0;
        }
    }
    io.varint32(&mut x.block_runtime_id)?;
    Ok(true)
}

/// Contents of the length prefixed user data blob of a non-air stack.
pub(crate) fn marshal_user_data<I: Io>(io: &mut I, x: &mut ItemStack) -> Result<()> {
    let mut length: i16 = if x.nbt_data.is_empty() { 0 } else { -1 };
    io.i16(&mut length)?;
    match length {
        -1 => {
            let mut version = ITEM_USER_DATA_VERSION;
            io.u8(&mut version)?;
            if version != ITEM_USER_DATA_VERSION {
                return Err(invalid_value(
                    version,
                    "item user data version",
                    "unknown version",
                ));
            }
            io.nbt(&mut x.nbt_data, LittleEndian)?;
        }
        0 => x.nbt_data = NbtCompound::new(),
        // Older clients send the compound without a version.
        1.. => io.nbt(&mut x.nbt_data, LittleEndian)?,
        _ => {
            return Err(invalid_value(
                length,
                "item user data length",
                "must be -1 or positive",
            ))
        }
    }

    func_slice_i32_length(io, &mut x.can_be_placed_on, |io, block| io.string_utf(block))?;
    func_slice_i32_length(io, &mut x.can_break, |io, block| io.string_utf(block))?;

    if x.item_type.network_id == io.shield_id() {
        let mut blocking_tick = 0i64;
        io.i64(&mut blocking_tick)?;
    }
    Ok(())
}

/// Item known to the client, sent at login.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemEntry {
    pub name: String,
    pub runtime_id: i16,
    pub component_based: bool,
}

impl Marshal for ItemEntry {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        io.i16(&mut self.runtime_id)?;
        io.bool(&mut self.component_based)
    }
}

/// Component data of a custom item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemComponentEntry {
    pub name: String,
    pub data: NbtCompound,
}

impl Marshal for ItemComponentEntry {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        io.nbt(&mut self.data, NetworkLittleEndian)
    }
}

/// Item shown in the creative inventory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreativeItem {
    pub creative_item_network_id: u32,
    pub item: ItemStack,
    pub group_index: u32,
}

impl Marshal for CreativeItem {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.creative_item_network_id)?;
        io.item(&mut self.item)?;
        io.varuint32(&mut self.group_index)
    }
}

/// A group the creative inventory sorts items into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreativeGroup {
    pub category: i32,
    pub name: String,
    pub icon: ItemStack,
}

impl Marshal for CreativeGroup {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.i32(&mut self.category)?;
        io.string(&mut self.name)?;
        io.item(&mut self.icon)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnchantmentInstance {
    pub kind: u8,
    pub level: u8,
}

impl Marshal for EnchantmentInstance {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.kind)?;
        io.u8(&mut self.level)
    }
}

/// Enchantments grouped by the equipment slot they apply to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemEnchantments {
    pub slot: i32,
    pub enchantments: [Vec<EnchantmentInstance>; 3],
}

impl Marshal for ItemEnchantments {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.i32(&mut self.slot)?;
        for activation in &mut self.enchantments {
            slot_enchantments(io, activation)?;
        }
        Ok(())
    }
}

fn slot_enchantments<I: Io>(io: &mut I, x: &mut Vec<EnchantmentInstance>) -> Result<()> {
    slice(io, x)
}

/// One option offered by an enchanting table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnchantmentOption {
    pub cost: u32,
    pub enchantments: ItemEnchantments,
    pub name: String,
    pub recipe_network_id: u32,
}

impl Marshal for EnchantmentOption {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.cost)?;
        self.enchantments.marshal(io)?;
        io.string(&mut self.name)?;
        io.varuint32(&mut self.recipe_network_id)
    }
}

#[cfg(test)]
mod test {
    use bedrock_nbt::{LittleEndian, NbtCompound, OffsetWriter};

    use crate::ser::{NetworkWriteExt, Reader, Writer};
    use crate::{marshal, unmarshal};

    use super::*;

    const SHIELD_ID: i32 = 357;

    fn display_named(name: &str) -> NbtCompound {
        let mut display = NbtCompound::new();
        display.put_string("name", name.to_string());
        let mut root = NbtCompound::new();
        root.put_component("display", display);
        root
    }

    #[test]
    fn test_item_stack_with_nbt() {
        let mut stack = ItemStack {
            item_type: ItemType {
                network_id: 5,
                metadata_value: 0,
            },
            count: 3,
            nbt_data: display_named("test"),
            ..Default::default()
        };

        let bytes = marshal(&mut stack, SHIELD_ID).unwrap();

        let mut expected = OffsetWriter::new(Vec::new());
        expected.write_var_int(5).unwrap();
        expected.write_u16_le(3).unwrap();
        expected.write_var_uint(0).unwrap();
        expected.write_var_int(0).unwrap();
        let mut blob = vec![0xFF, 0xFF, ITEM_USER_DATA_VERSION];
        blob.extend(bedrock_nbt::to_bytes_encoding(&stack.nbt_data, LittleEndian).unwrap());
        blob.extend([0, 0, 0, 0, 0, 0, 0, 0]);
        expected.write_byte_slice(&blob).unwrap();
        assert_eq!(bytes, expected.into_inner());

        let decoded: ItemStack = unmarshal(&bytes, SHIELD_ID).unwrap();
        assert_eq!(decoded, stack);
        assert_eq!(
            decoded
                .nbt_data
                .get_compound("display")
                .and_then(|d| d.get_string("name")),
            Some("test")
        );
    }

    #[test]
    fn test_air_is_one_byte() {
        let mut air = ItemStack::default();
        let bytes = marshal(&mut air, SHIELD_ID).unwrap();
        assert_eq!(bytes, [0x00]);

        let decoded: ItemStack = unmarshal(&bytes, SHIELD_ID).unwrap();
        assert!(decoded.is_air());
        assert_eq!(decoded, ItemStack::default());
    }

    #[test]
    fn test_shield_blocking_tick() {
        let mut shield = ItemStack {
            item_type: ItemType {
                network_id: SHIELD_ID,
                metadata_value: 0,
            },
            count: 1,
            can_break: vec!["minecraft:stone".to_string()],
            ..Default::default()
        };
        let with_tick = marshal(&mut shield, SHIELD_ID).unwrap();
        let without_tick = marshal(&mut shield, 0).unwrap();
        assert_eq!(with_tick.len(), without_tick.len() + 8);

        let decoded: ItemStack = unmarshal(&with_tick, SHIELD_ID).unwrap();
        assert_eq!(decoded, shield);
    }

    #[test]
    fn test_item_instance_network_id() {
        let mut instance = ItemInstance {
            stack_network_id: 12,
            stack: ItemStack {
                item_type: ItemType {
                    network_id: 7,
                    metadata_value: 2,
                },
                block_runtime_id: 90,
                count: 64,
                ..Default::default()
            },
        };

        let mut bytes = Vec::new();
        Writer::new(&mut bytes, SHIELD_ID)
            .item_instance(&mut instance)
            .unwrap();
        let mut decoded = ItemInstance::default();
        Reader::new(&bytes[..], SHIELD_ID)
            .item_instance(&mut decoded)
            .unwrap();
        assert_eq!(decoded, instance);

        instance.stack_network_id = 0;
        let without_id = marshal(&mut instance, SHIELD_ID).unwrap();
        assert_eq!(without_id.len() + 1, bytes.len());
    }

    #[test]
    fn test_legacy_user_data() {
        let nbt = bedrock_nbt::to_bytes_encoding(&display_named("old"), LittleEndian).unwrap();
        let mut blob = Vec::new();
        blob.extend((nbt.len() as i16).to_le_bytes());
        blob.extend(&nbt);
        blob.extend([0, 0, 0, 0, 0, 0, 0, 0]);

        let mut w = OffsetWriter::new(Vec::new());
        w.write_var_int(9).unwrap();
        w.write_u16_le(1).unwrap();
        w.write_var_uint(0).unwrap();
        w.write_var_int(0).unwrap();
        w.write_byte_slice(&blob).unwrap();

        let decoded: ItemStack = unmarshal(&w.into_inner(), SHIELD_ID).unwrap();
        assert_eq!(decoded.nbt_data, display_named("old"));
    }

    #[test]
    fn test_unknown_user_data_version() {
        let blob = [0xFF, 0xFF, 0x02];
        let mut w = OffsetWriter::new(Vec::new());
        w.write_var_int(9).unwrap();
        w.write_u16_le(1).unwrap();
        w.write_var_uint(0).unwrap();
        w.write_var_int(0).unwrap();
        w.write_byte_slice(&blob).unwrap();

        assert!(matches!(
            unmarshal::<ItemStack>(&w.into_inner(), SHIELD_ID),
            Err(crate::ProtocolError::InvalidValue {
                field: "item user data version",
                ..
            })
        ));
    }
}
