use crate::codec::position::BlockPos;
use crate::codec::vector::Vec3;
use crate::ser::{marshal_tag, slice, Io, Marshal, Result, Tagged};
use crate::types::item::ItemInstance;

pub const SOURCE_CONTAINER: u32 = 0;
pub const SOURCE_WORLD: u32 = 2;
pub const SOURCE_CREATIVE: u32 = 3;
pub const SOURCE_CRAFT_SLOT: u32 = 100;
pub const SOURCE_TODO: u32 = 99999;

/// A single slot change inside an inventory transaction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InventoryAction {
    pub source_type: u32,
    /// Set for container sources.
    pub window_id: i32,
    /// Set for world sources.
    pub source_flags: u32,
    pub inventory_slot: u32,
    pub old_item: ItemInstance,
    pub new_item: ItemInstance,
}

impl Marshal for InventoryAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.source_type)?;
        match self.source_type {
            SOURCE_CONTAINER | SOURCE_TODO => io.varint32(&mut self.window_id)?,
            SOURCE_WORLD => io.varuint32(&mut self.source_flags)?,
            _ => {}
        }
        io.varuint32(&mut self.inventory_slot)?;
        io.item_instance(&mut self.old_item)?;
        io.item_instance(&mut self.new_item)
    }
}

/// Slots the client changed under a legacy request id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacySetItemSlot {
    pub container_id: u8,
    pub slots: Vec<u8>,
}

impl Marshal for LegacySetItemSlot {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.container_id)?;
        io.byte_slice(&mut self.slots)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UseItemTransactionData {
    pub action_type: u32,
    pub trigger_type: u32,
    pub block_position: BlockPos,
    pub block_face: i32,
    pub hot_bar_slot: i32,
    pub held_item: ItemInstance,
    pub position: Vec3,
    pub clicked_position: Vec3,
    pub block_runtime_id: u32,
    pub client_prediction: u32,
}

impl Marshal for UseItemTransactionData {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.action_type)?;
        io.varuint32(&mut self.trigger_type)?;
        io.ublock_pos(&mut self.block_position)?;
        io.varint32(&mut self.block_face)?;
        io.varint32(&mut self.hot_bar_slot)?;
        io.item_instance(&mut self.held_item)?;
        io.vec3(&mut self.position)?;
        io.vec3(&mut self.clicked_position)?;
        io.varuint32(&mut self.block_runtime_id)?;
        io.varuint32(&mut self.client_prediction)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UseItemOnEntityTransactionData {
    pub target_entity_runtime_id: u64,
    pub action_type: u32,
    pub hot_bar_slot: i32,
    pub held_item: ItemInstance,
    pub position: Vec3,
    pub clicked_position: Vec3,
}

impl Marshal for UseItemOnEntityTransactionData {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint64(&mut self.target_entity_runtime_id)?;
        io.varuint32(&mut self.action_type)?;
        io.varint32(&mut self.hot_bar_slot)?;
        io.item_instance(&mut self.held_item)?;
        io.vec3(&mut self.position)?;
        io.vec3(&mut self.clicked_position)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReleaseItemTransactionData {
    pub action_type: u32,
    pub hot_bar_slot: i32,
    pub held_item: ItemInstance,
    pub head_position: Vec3,
}

impl Marshal for ReleaseItemTransactionData {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.action_type)?;
        io.varint32(&mut self.hot_bar_slot)?;
        io.item_instance(&mut self.held_item)?;
        io.vec3(&mut self.head_position)
    }
}

/// Payload of an inventory transaction, selected by its transaction type.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InventoryTransactionData {
    #[default]
    Normal,
    Mismatch,
    UseItem(UseItemTransactionData),
    UseItemOnEntity(UseItemOnEntityTransactionData),
    ReleaseItem(ReleaseItemTransactionData),
}

impl Tagged for InventoryTransactionData {
    type Tag = u32;
    const ENUM_NAME: &'static str = "inventory transaction type";

    fn tag(&self) -> u32 {
        match self {
            InventoryTransactionData::Normal => 0,
            InventoryTransactionData::Mismatch => 1,
            InventoryTransactionData::UseItem(_) => 2,
            InventoryTransactionData::UseItemOnEntity(_) => 3,
            InventoryTransactionData::ReleaseItem(_) => 4,
        }
    }

    fn from_tag(tag: u32) -> Option<Self> {
        Some(match tag {
            0 => InventoryTransactionData::Normal,
            1 => InventoryTransactionData::Mismatch,
            2 => InventoryTransactionData::UseItem(Default::default()),
            3 => InventoryTransactionData::UseItemOnEntity(Default::default()),
            4 => InventoryTransactionData::ReleaseItem(Default::default()),
            _ => return None,
        })
    }
}

impl InventoryTransactionData {
    fn marshal_payload<I: Io>(&mut self, io: &mut I) -> Result<()> {
        match self {
            InventoryTransactionData::Normal | InventoryTransactionData::Mismatch => Ok(()),
            InventoryTransactionData::UseItem(data) => data.marshal(io),
            InventoryTransactionData::UseItemOnEntity(data) => data.marshal(io),
            InventoryTransactionData::ReleaseItem(data) => data.marshal(io),
        }
    }
}

/// A client side inventory change. The transaction type is written ahead of the
/// actions, the data it selects after them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InventoryTransaction {
    pub legacy_request_id: i32,
    pub legacy_set_item_slots: Vec<LegacySetItemSlot>,
    pub actions: Vec<InventoryAction>,
    pub transaction_data: InventoryTransactionData,
}

impl Marshal for InventoryTransaction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.legacy_request_id)?;
        if self.legacy_request_id != 0 {
            slice(io, &mut self.legacy_set_item_slots)?;
        } else {
            self.legacy_set_item_slots.clear();
        }
        marshal_tag(io, &mut self.transaction_data, |io, t| io.varuint32(t))?;
        slice(io, &mut self.actions)?;
        self.transaction_data.marshal_payload(io)
    }
}

#[cfg(test)]
mod test {
    use crate::codec::position::BlockPos;
    use crate::codec::vector::Vec3;
    use crate::types::item::{ItemInstance, ItemStack, ItemType};
    use crate::{marshal, unmarshal, ProtocolError};

    use super::*;

    fn dirt() -> ItemInstance {
        ItemInstance {
            stack_network_id: 3,
            stack: ItemStack {
                item_type: ItemType {
                    network_id: 2,
                    metadata_value: 0,
                },
                count: 16,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_use_item_transaction() {
        let mut transaction = InventoryTransaction {
            legacy_request_id: -2,
            legacy_set_item_slots: vec![LegacySetItemSlot {
                container_id: 28,
                slots: vec![0, 1],
            }],
            actions: vec![
                InventoryAction {
                    source_type: SOURCE_CONTAINER,
                    window_id: 0,
                    inventory_slot: 4,
                    old_item: dirt(),
                    ..Default::default()
                },
                InventoryAction {
                    source_type: SOURCE_WORLD,
                    source_flags: 1,
                    new_item: dirt(),
                    ..Default::default()
                },
            ],
            transaction_data: InventoryTransactionData::UseItem(UseItemTransactionData {
                action_type: 1,
                block_position: BlockPos::new(10, 64, -3),
                block_face: 1,
                held_item: dirt(),
                position: Vec3::new(10.5, 65.0, -2.5),
                block_runtime_id: 1234,
                ..Default::default()
            }),
        };

        let bytes = marshal(&mut transaction, 0).unwrap();
        assert_eq!(unmarshal::<InventoryTransaction>(&bytes, 0).unwrap(), transaction);
    }

    #[test]
    fn test_normal_transaction_layout() {
        let mut transaction = InventoryTransaction::default();
        // request id, type, no actions
        assert_eq!(marshal(&mut transaction, 0).unwrap(), [0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_unknown_transaction_type() {
        let bytes = [0x00, 0x05, 0x00];
        assert!(matches!(
            unmarshal::<InventoryTransaction>(&bytes, 0),
            Err(ProtocolError::UnknownEnumOption {
                value: 5,
                enum_name: "inventory transaction type"
            })
        ));
    }
}
