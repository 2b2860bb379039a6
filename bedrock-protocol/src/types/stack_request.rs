use crate::ser::{
    func_slice, invalid_value, marshal_tag, optional_func, slice, slice_u8_length, Io, Marshal,
    Result, Tagged,
};
use crate::types::item::ItemStack;
use crate::types::recipe::ItemDescriptorCount;

/// A container, plus the id of the dynamic container (such as a bundle) it refers to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FullContainerName {
    pub container_id: u8,
    pub dynamic_container_id: Option<u32>,
}

impl Marshal for FullContainerName {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.container_id)?;
        optional_func(io, &mut self.dynamic_container_id, |io, id| io.u32(id))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackRequestSlotInfo {
    pub container: FullContainerName,
    pub slot: u8,
    pub stack_network_id: i32,
}

impl Marshal for StackRequestSlotInfo {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        self.container.marshal(io)?;
        io.u8(&mut self.slot)?;
        io.varint32(&mut self.stack_network_id)
    }
}

/// Moves `count` items from one slot to another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferStackRequestAction {
    pub count: u8,
    pub source: StackRequestSlotInfo,
    pub destination: StackRequestSlotInfo,
}

impl Marshal for TransferStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.count)?;
        self.source.marshal(io)?;
        self.destination.marshal(io)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapStackRequestAction {
    pub source: StackRequestSlotInfo,
    pub destination: StackRequestSlotInfo,
}

impl Marshal for SwapStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        self.source.marshal(io)?;
        self.destination.marshal(io)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DropStackRequestAction {
    pub count: u8,
    pub source: StackRequestSlotInfo,
    pub randomly: bool,
}

impl Marshal for DropStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.count)?;
        self.source.marshal(io)?;
        io.bool(&mut self.randomly)
    }
}

/// Removes `count` items from a slot, used by both destroy and consume.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoveStackRequestAction {
    pub count: u8,
    pub source: StackRequestSlotInfo,
}

impl Marshal for RemoveStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.count)?;
        self.source.marshal(io)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BeaconPaymentStackRequestAction {
    pub primary_effect: i32,
    pub secondary_effect: i32,
}

impl Marshal for BeaconPaymentStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.primary_effect)?;
        io.varint32(&mut self.secondary_effect)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MineBlockStackRequestAction {
    pub hotbar_slot: i32,
    pub predicted_durability: i32,
    pub stack_network_id: i32,
}

impl Marshal for MineBlockStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.hotbar_slot)?;
        io.varint32(&mut self.predicted_durability)?;
        io.varint32(&mut self.stack_network_id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CraftRecipeStackRequestAction {
    pub recipe_network_id: u32,
    pub number_of_crafts: u8,
}

impl Marshal for CraftRecipeStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.recipe_network_id)?;
        io.u8(&mut self.number_of_crafts)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AutoCraftRecipeStackRequestAction {
    pub recipe_network_id: u32,
    pub number_of_crafts: u8,
    pub times_crafted: u8,
    pub ingredients: Vec<ItemDescriptorCount>,
}

impl Marshal for AutoCraftRecipeStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.recipe_network_id)?;
        io.u8(&mut self.number_of_crafts)?;
        io.u8(&mut self.times_crafted)?;
        slice_u8_length(io, &mut self.ingredients)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CraftCreativeStackRequestAction {
    pub creative_item_network_id: u32,
    pub number_of_crafts: u8,
}

impl Marshal for CraftCreativeStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.creative_item_network_id)?;
        io.u8(&mut self.number_of_crafts)
    }
}

/// Crafts a recipe that needs a text input, such as renaming in an anvil.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CraftRecipeOptionalStackRequestAction {
    pub recipe_network_id: u32,
    /// Index into the filter strings of the request.
    pub filter_string_index: i32,
}

impl Marshal for CraftRecipeOptionalStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.recipe_network_id)?;
        io.i32(&mut self.filter_string_index)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CraftGrindstoneRecipeStackRequestAction {
    pub recipe_network_id: u32,
    pub number_of_crafts: u8,
    pub cost: i32,
}

impl Marshal for CraftGrindstoneRecipeStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.recipe_network_id)?;
        io.u8(&mut self.number_of_crafts)?;
        io.varint32(&mut self.cost)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CraftLoomRecipeStackRequestAction {
    pub pattern: String,
    pub times_crafted: u8,
}

impl Marshal for CraftLoomRecipeStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.pattern)?;
        io.u8(&mut self.times_crafted)
    }
}

/// Results the client expects from a craft. Still sent, though servers ignore it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CraftResultsDeprecatedStackRequestAction {
    pub result_items: Vec<ItemStack>,
    pub times_crafted: u8,
}

impl Marshal for CraftResultsDeprecatedStackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        func_slice(io, &mut self.result_items, |io, item| io.item(item))?;
        io.u8(&mut self.times_crafted)
    }
}

/// One step of an item stack request, prefixed by a uint8 action id.
#[derive(Clone, Debug, PartialEq)]
pub enum StackRequestAction {
    Take(TransferStackRequestAction),
    Place(TransferStackRequestAction),
    Swap(SwapStackRequestAction),
    Drop(DropStackRequestAction),
    Destroy(RemoveStackRequestAction),
    Consume(RemoveStackRequestAction),
    Create { results_slot: u8 },
    PlaceInContainer(TransferStackRequestAction),
    TakeOutContainer(TransferStackRequestAction),
    LabTableCombine,
    BeaconPayment(BeaconPaymentStackRequestAction),
    MineBlock(MineBlockStackRequestAction),
    CraftRecipe(CraftRecipeStackRequestAction),
    AutoCraftRecipe(AutoCraftRecipeStackRequestAction),
    CraftCreative(CraftCreativeStackRequestAction),
    CraftRecipeOptional(CraftRecipeOptionalStackRequestAction),
    CraftGrindstone(CraftGrindstoneRecipeStackRequestAction),
    CraftLoom(CraftLoomRecipeStackRequestAction),
    CraftNonImplemented,
    CraftResultsDeprecated(CraftResultsDeprecatedStackRequestAction),
}

impl Default for StackRequestAction {
    fn default() -> Self {
        StackRequestAction::Take(TransferStackRequestAction::default())
    }
}

impl Tagged for StackRequestAction {
    type Tag = u8;
    const ENUM_NAME: &'static str = "stack request action type";

    fn tag(&self) -> u8 {
        match self {
            StackRequestAction::Take(_) => 0,
            StackRequestAction::Place(_) => 1,
            StackRequestAction::Swap(_) => 2,
            StackRequestAction::Drop(_) => 3,
            StackRequestAction::Destroy(_) => 4,
            StackRequestAction::Consume(_) => 5,
            StackRequestAction::Create { .. } => 6,
            StackRequestAction::PlaceInContainer(_) => 7,
            StackRequestAction::TakeOutContainer(_) => 8,
            StackRequestAction::LabTableCombine => 9,
            StackRequestAction::BeaconPayment(_) => 10,
            StackRequestAction::MineBlock(_) => 11,
            StackRequestAction::CraftRecipe(_) => 12,
            StackRequestAction::AutoCraftRecipe(_) => 13,
            StackRequestAction::CraftCreative(_) => 14,
            StackRequestAction::CraftRecipeOptional(_) => 15,
            StackRequestAction::CraftGrindstone(_) => 16,
            StackRequestAction::CraftLoom(_) => 17,
            StackRequestAction::CraftNonImplemented => 18,
            StackRequestAction::CraftResultsDeprecated(_) => 19,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => StackRequestAction::Take(Default::default()),
            1 => StackRequestAction::Place(Default::default()),
            2 => StackRequestAction::Swap(Default::default()),
            3 => StackRequestAction::Drop(Default::default()),
            4 => StackRequestAction::Destroy(Default::default()),
            5 => StackRequestAction::Consume(Default::default()),
            6 => StackRequestAction::Create { results_slot: 0 },
            7 => StackRequestAction::PlaceInContainer(Default::default()),
            8 => StackRequestAction::TakeOutContainer(Default::default()),
            9 => StackRequestAction::LabTableCombine,
            10 => StackRequestAction::BeaconPayment(Default::default()),
            11 => StackRequestAction::MineBlock(Default::default()),
            12 => StackRequestAction::CraftRecipe(Default::default()),
            13 => StackRequestAction::AutoCraftRecipe(Default::default()),
            14 => StackRequestAction::CraftCreative(Default::default()),
            15 => StackRequestAction::CraftRecipeOptional(Default::default()),
            16 => StackRequestAction::CraftGrindstone(Default::default()),
            17 => StackRequestAction::CraftLoom(Default::default()),
            18 => StackRequestAction::CraftNonImplemented,
            19 => StackRequestAction::CraftResultsDeprecated(Default::default()),
            _ => return None,
        })
    }
}

impl Marshal for StackRequestAction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        marshal_tag(io, self, |io, t| io.u8(t))?;
        match self {
            StackRequestAction::Take(action)
            | StackRequestAction::Place(action)
            | StackRequestAction::PlaceInContainer(action)
            | StackRequestAction::TakeOutContainer(action) => action.marshal(io),
            StackRequestAction::Swap(action) => action.marshal(io),
            StackRequestAction::Drop(action) => action.marshal(io),
            StackRequestAction::Destroy(action) | StackRequestAction::Consume(action) => {
                action.marshal(io)
            }
            StackRequestAction::Create { results_slot } => io.u8(results_slot),
            StackRequestAction::LabTableCombine | StackRequestAction::CraftNonImplemented => Ok(()),
            StackRequestAction::BeaconPayment(action) => action.marshal(io),
            StackRequestAction::MineBlock(action) => action.marshal(io),
            StackRequestAction::CraftRecipe(action) => action.marshal(io),
            StackRequestAction::AutoCraftRecipe(action) => action.marshal(io),
            StackRequestAction::CraftCreative(action) => action.marshal(io),
            StackRequestAction::CraftRecipeOptional(action) => action.marshal(io),
            StackRequestAction::CraftGrindstone(action) => action.marshal(io),
            StackRequestAction::CraftLoom(action) => action.marshal(io),
            StackRequestAction::CraftResultsDeprecated(action) => action.marshal(io),
        }
    }
}

/// A batch of inventory actions the client asks the server to apply.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemStackRequest {
    pub request_id: i32,
    pub actions: Vec<StackRequestAction>,
    pub filter_strings: Vec<String>,
    pub filter_cause: i32,
}

impl Marshal for ItemStackRequest {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.request_id)?;
        slice(io, &mut self.actions)?;
        func_slice(io, &mut self.filter_strings, |io, s| io.string(s))?;
        io.i32(&mut self.filter_cause)
    }
}

pub const ITEM_STACK_RESPONSE_OK: u8 = 0;
pub const ITEM_STACK_RESPONSE_ERROR: u8 = 1;

/// Final state of a slot after the server applied a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackResponseSlotInfo {
    pub slot: u8,
    pub hotbar_slot: u8,
    pub count: u8,
    pub stack_network_id: i32,
    pub custom_name: String,
    pub filtered_custom_name: String,
    pub durability_correction: i32,
}

impl Marshal for StackResponseSlotInfo {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.slot)?;
        io.u8(&mut self.hotbar_slot)?;
        if self.slot != self.hotbar_slot {
            return Err(invalid_value(
                self.hotbar_slot,
                "hotbar slot",
                format!("must equal slot {}", self.slot),
            ));
        }
        io.u8(&mut self.count)?;
        io.varint32(&mut self.stack_network_id)?;
        io.string(&mut self.custom_name)?;
        io.string(&mut self.filtered_custom_name)?;
        io.varint32(&mut self.durability_correction)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackResponseContainerInfo {
    pub container: FullContainerName,
    pub slot_info: Vec<StackResponseSlotInfo>,
}

impl Marshal for StackResponseContainerInfo {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        self.container.marshal(io)?;
        slice(io, &mut self.slot_info)
    }
}

/// The server's answer to one [`ItemStackRequest`]. Container info only follows an
/// OK status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemStackResponse {
    pub status: u8,
    pub request_id: i32,
    pub container_info: Vec<StackResponseContainerInfo>,
}

impl Marshal for ItemStackResponse {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.status)?;
        io.varint32(&mut self.request_id)?;
        if self.status == ITEM_STACK_RESPONSE_OK {
            slice(io, &mut self.container_info)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{marshal, unmarshal, ProtocolError};

    use super::*;

    fn slot(slot: u8) -> StackRequestSlotInfo {
        StackRequestSlotInfo {
            container: FullContainerName {
                container_id: 12,
                dynamic_container_id: None,
            },
            slot,
            stack_network_id: 40,
        }
    }

    #[test]
    fn test_every_action() {
        let transfer = TransferStackRequestAction {
            count: 2,
            source: slot(0),
            destination: slot(1),
        };
        let mut request = ItemStackRequest {
            request_id: -3,
            actions: vec![
                StackRequestAction::Take(transfer.clone()),
                StackRequestAction::Place(transfer.clone()),
                StackRequestAction::Swap(SwapStackRequestAction {
                    source: slot(2),
                    destination: slot(3),
                }),
                StackRequestAction::Drop(DropStackRequestAction {
                    count: 1,
                    source: slot(4),
                    randomly: true,
                }),
                StackRequestAction::Destroy(RemoveStackRequestAction {
                    count: 1,
                    source: slot(5),
                }),
                StackRequestAction::Consume(RemoveStackRequestAction {
                    count: 3,
                    source: slot(6),
                }),
                StackRequestAction::Create { results_slot: 50 },
                StackRequestAction::PlaceInContainer(transfer.clone()),
                StackRequestAction::TakeOutContainer(transfer),
                StackRequestAction::LabTableCombine,
                StackRequestAction::BeaconPayment(BeaconPaymentStackRequestAction {
                    primary_effect: 1,
                    secondary_effect: 10,
                }),
                StackRequestAction::MineBlock(MineBlockStackRequestAction {
                    hotbar_slot: 2,
                    predicted_durability: 100,
                    stack_network_id: 9,
                }),
                StackRequestAction::CraftRecipe(CraftRecipeStackRequestAction {
                    recipe_network_id: 300,
                    number_of_crafts: 1,
                }),
                StackRequestAction::AutoCraftRecipe(AutoCraftRecipeStackRequestAction {
                    recipe_network_id: 301,
                    number_of_crafts: 4,
                    times_crafted: 4,
                    ingredients: vec![ItemDescriptorCount::default()],
                }),
                StackRequestAction::CraftCreative(CraftCreativeStackRequestAction {
                    creative_item_network_id: 17,
                    number_of_crafts: 64,
                }),
                StackRequestAction::CraftRecipeOptional(CraftRecipeOptionalStackRequestAction {
                    recipe_network_id: 302,
                    filter_string_index: 0,
                }),
                StackRequestAction::CraftGrindstone(CraftGrindstoneRecipeStackRequestAction {
                    recipe_network_id: 303,
                    number_of_crafts: 1,
                    cost: 5,
                }),
                StackRequestAction::CraftLoom(CraftLoomRecipeStackRequestAction {
                    pattern: "bri".to_string(),
                    times_crafted: 1,
                }),
                StackRequestAction::CraftNonImplemented,
                StackRequestAction::CraftResultsDeprecated(
                    CraftResultsDeprecatedStackRequestAction {
                        result_items: vec![ItemStack::default()],
                        times_crafted: 1,
                    },
                ),
            ],
            filter_strings: vec!["renamed".to_string()],
            filter_cause: 1,
        };

        let bytes = marshal(&mut request, 0).unwrap();
        assert_eq!(unmarshal::<ItemStackRequest>(&bytes, 0).unwrap(), request);
    }

    #[test]
    fn test_dynamic_container_id() {
        let mut name = FullContainerName {
            container_id: 63,
            dynamic_container_id: Some(2),
        };
        let bytes = marshal(&mut name, 0).unwrap();
        assert_eq!(bytes, [63, 0x01, 0x02, 0x00, 0x00, 0x00]);
        assert_eq!(unmarshal::<FullContainerName>(&bytes, 0).unwrap(), name);
    }

    #[test]
    fn test_unknown_action() {
        // request id, one action of type 20
        let bytes = [0x00, 0x01, 20];
        assert!(matches!(
            unmarshal::<ItemStackRequest>(&bytes, 0),
            Err(ProtocolError::UnknownEnumOption {
                value: 20,
                enum_name: "stack request action type"
            })
        ));
    }

    #[test]
    fn test_response_slot_must_match_hotbar_slot() {
        let info = StackResponseSlotInfo {
            slot: 3,
            hotbar_slot: 3,
            count: 1,
            ..Default::default()
        };
        let mut response = ItemStackResponse {
            status: ITEM_STACK_RESPONSE_OK,
            request_id: 1,
            container_info: vec![StackResponseContainerInfo {
                container: FullContainerName::default(),
                slot_info: vec![info],
            }],
        };
        let bytes = marshal(&mut response, 0).unwrap();
        assert_eq!(unmarshal::<ItemStackResponse>(&bytes, 0).unwrap(), response);

        // Forge a mismatching hotbar slot in the encoded bytes.
        let mut forged = bytes.clone();
        let at = forged.len() - 6;
        assert_eq!(forged[at - 1], 3);
        forged[at] = 4;
        assert!(matches!(
            unmarshal::<ItemStackResponse>(&forged, 0),
            Err(ProtocolError::InvalidValue {
                field: "hotbar slot",
                ..
            })
        ));

        response.container_info[0].slot_info[0].hotbar_slot = 4;
        assert!(marshal(&mut response, 0).is_err());
    }

    #[test]
    fn test_error_response_has_no_containers() {
        let mut response = ItemStackResponse {
            status: ITEM_STACK_RESPONSE_ERROR,
            request_id: 2,
            container_info: Vec::new(),
        };
        assert_eq!(marshal(&mut response, 0).unwrap(), [0x01, 0x04]);
    }
}
