use uuid::Uuid;

use crate::ser::{
    func_slice, func_slice_of_len, invalid_value, marshal_tag, slice, Io, Marshal, Result, Tagged,
};
use crate::types::item::{ItemStack, ItemType};

/// Describes which items satisfy a recipe ingredient.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ItemDescriptor {
    #[default]
    Invalid,
    Default {
        network_id: i16,
        metadata_value: i16,
    },
    MoLang {
        expression: String,
        version: u8,
    },
    ItemTag {
        tag: String,
    },
    Deferred {
        name: String,
        metadata_value: i16,
    },
    ComplexAlias {
        name: String,
    },
}

impl Tagged for ItemDescriptor {
    type Tag = u8;
    const ENUM_NAME: &'static str = "item descriptor type";

    fn tag(&self) -> u8 {
        match self {
            ItemDescriptor::Invalid => 0,
            ItemDescriptor::Default { .. } => 1,
            ItemDescriptor::MoLang { .. } => 2,
            ItemDescriptor::ItemTag { .. } => 3,
            ItemDescriptor::Deferred { .. } => 4,
            ItemDescriptor::ComplexAlias { .. } => 5,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => ItemDescriptor::Invalid,
            1 => ItemDescriptor::Default {
                network_id: 0,
                metadata_value: 0,
            },
            2 => ItemDescriptor::MoLang {
                expression: String::new(),
                version: 0,
            },
            3 => ItemDescriptor::ItemTag { tag: String::new() },
            4 => ItemDescriptor::Deferred {
                name: String::new(),
                metadata_value: 0,
            },
            5 => ItemDescriptor::ComplexAlias {
                name: String::new(),
            },
            _ => return None,
        })
    }
}

impl Marshal for ItemDescriptor {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        marshal_tag(io, self, |io, t| io.u8(t))?;
        match self {
            ItemDescriptor::Invalid => Ok(()),
            ItemDescriptor::Default {
                network_id,
                metadata_value,
            } => {
                io.i16(network_id)?;
                if *network_id != 0 {
                    io.i16(metadata_value)?;
                }
                Ok(())
            }
            ItemDescriptor::MoLang {
                expression,
                version,
            } => {
                io.string(expression)?;
                io.u8(version)
            }
            ItemDescriptor::ItemTag { tag } => io.string(tag),
            ItemDescriptor::Deferred {
                name,
                metadata_value,
            } => {
                io.string(name)?;
                io.i16(metadata_value)
            }
            ItemDescriptor::ComplexAlias { name } => io.string(name),
        }
    }
}

/// An ingredient and how many of it a recipe takes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemDescriptorCount {
    pub descriptor: ItemDescriptor,
    pub count: i32,
}

impl Marshal for ItemDescriptorCount {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        self.descriptor.marshal(io)?;
        io.varint32(&mut self.count)
    }
}

pub const UNLOCK_CONTEXT_NONE: u8 = 0;
pub const UNLOCK_CONTEXT_ALWAYS_UNLOCKED: u8 = 1;
pub const UNLOCK_CONTEXT_PLAYER_IN_WATER: u8 = 2;
pub const UNLOCK_CONTEXT_PLAYER_HAS_MANY_ITEMS: u8 = 3;

/// When a recipe becomes available in the recipe book.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipeUnlockRequirement {
    pub context: u8,
    /// Only present when the context is [`UNLOCK_CONTEXT_NONE`].
    pub ingredients: Vec<ItemDescriptorCount>,
}

impl Marshal for RecipeUnlockRequirement {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.context)?;
        if self.context == UNLOCK_CONTEXT_NONE {
            slice(io, &mut self.ingredients)?;
        }
        Ok(())
    }
}

fn items<I: Io>(io: &mut I, x: &mut Vec<ItemStack>) -> Result<()> {
    func_slice(io, x, |io, item| io.item(item))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapelessRecipe {
    pub recipe_id: String,
    pub input: Vec<ItemDescriptorCount>,
    pub output: Vec<ItemStack>,
    pub uuid: Uuid,
    pub block: String,
    pub priority: i32,
    pub unlock_requirement: RecipeUnlockRequirement,
    pub recipe_network_id: u32,
}

impl Marshal for ShapelessRecipe {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.recipe_id)?;
        slice(io, &mut self.input)?;
        items(io, &mut self.output)?;
        io.uuid(&mut self.uuid)?;
        io.string(&mut self.block)?;
        io.varint32(&mut self.priority)?;
        self.unlock_requirement.marshal(io)?;
        io.varuint32(&mut self.recipe_network_id)
    }
}

/// A recipe whose ingredients must be laid out in a `width` by `height` grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedRecipe {
    pub recipe_id: String,
    pub width: i32,
    pub height: i32,
    /// Row major, `width * height` entries.
    pub input: Vec<ItemDescriptorCount>,
    pub output: Vec<ItemStack>,
    pub uuid: Uuid,
    pub block: String,
    pub priority: i32,
    pub assume_symmetry: bool,
    pub unlock_requirement: RecipeUnlockRequirement,
    pub recipe_network_id: u32,
}

impl Marshal for ShapedRecipe {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.recipe_id)?;
        io.varint32(&mut self.width)?;
        io.varint32(&mut self.height)?;
        let cells = u32::try_from(self.width)
            .ok()
            .zip(u32::try_from(self.height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .ok_or_else(|| {
                invalid_value(
                    format!("{}x{}", self.width, self.height),
                    "shaped recipe size",
                    "width and height must be positive",
                )
            })?;
        func_slice_of_len(io, cells, &mut self.input, |io, cell| cell.marshal(io))?;
        items(io, &mut self.output)?;
        io.uuid(&mut self.uuid)?;
        io.string(&mut self.block)?;
        io.varint32(&mut self.priority)?;
        io.bool(&mut self.assume_symmetry)?;
        self.unlock_requirement.marshal(io)?;
        io.varuint32(&mut self.recipe_network_id)
    }
}

/// Smelting recipe keyed on the input network id only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FurnaceRecipe {
    pub input_type: ItemType,
    pub output: ItemStack,
    pub block: String,
}

impl Marshal for FurnaceRecipe {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.input_type.network_id)?;
        io.item(&mut self.output)?;
        io.string(&mut self.block)
    }
}

/// Smelting recipe keyed on network id and metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FurnaceDataRecipe {
    pub input_type: ItemType,
    pub output: ItemStack,
    pub block: String,
}

impl Marshal for FurnaceDataRecipe {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.input_type.network_id)?;
        let mut metadata = self.input_type.metadata_value as i32;
        io.varint32(&mut metadata)?;
        self.input_type.metadata_value = metadata as u32;
        io.item(&mut self.output)?;
        io.string(&mut self.block)
    }
}

/// Recipe the client resolves on its own, such as map cloning.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiRecipe {
    pub uuid: Uuid,
    pub recipe_network_id: u32,
}

impl Marshal for MultiRecipe {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.uuid(&mut self.uuid)?;
        io.varuint32(&mut self.recipe_network_id)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SmithingTransformRecipe {
    pub recipe_id: String,
    pub template: ItemDescriptorCount,
    pub base: ItemDescriptorCount,
    pub addition: ItemDescriptorCount,
    pub result: ItemStack,
    pub block: String,
    pub recipe_network_id: u32,
}

impl Marshal for SmithingTransformRecipe {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.recipe_id)?;
        self.template.marshal(io)?;
        self.base.marshal(io)?;
        self.addition.marshal(io)?;
        io.item(&mut self.result)?;
        io.string(&mut self.block)?;
        io.varuint32(&mut self.recipe_network_id)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SmithingTrimRecipe {
    pub recipe_id: String,
    pub template: ItemDescriptorCount,
    pub base: ItemDescriptorCount,
    pub addition: ItemDescriptorCount,
    pub block: String,
    pub recipe_network_id: u32,
}

impl Marshal for SmithingTrimRecipe {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.recipe_id)?;
        self.template.marshal(io)?;
        self.base.marshal(io)?;
        self.addition.marshal(io)?;
        io.string(&mut self.block)?;
        io.varuint32(&mut self.recipe_network_id)
    }
}

pub const RECIPE_SHAPELESS: i32 = 0;
pub const RECIPE_SHAPED: i32 = 1;
pub const RECIPE_FURNACE: i32 = 2;
pub const RECIPE_FURNACE_DATA: i32 = 3;
pub const RECIPE_MULTI: i32 = 4;
pub const RECIPE_SHULKER_BOX: i32 = 5;
pub const RECIPE_SHAPELESS_CHEMISTRY: i32 = 6;
pub const RECIPE_SHAPED_CHEMISTRY: i32 = 7;
pub const RECIPE_SMITHING_TRANSFORM: i32 = 8;
pub const RECIPE_SMITHING_TRIM: i32 = 9;

/// Any recipe, prefixed by a varint32 recipe type.
#[derive(Clone, Debug, PartialEq)]
pub enum Recipe {
    Shapeless(ShapelessRecipe),
    Shaped(ShapedRecipe),
    Furnace(FurnaceRecipe),
    FurnaceData(FurnaceDataRecipe),
    Multi(MultiRecipe),
    ShulkerBox(ShapelessRecipe),
    ShapelessChemistry(ShapelessRecipe),
    ShapedChemistry(ShapedRecipe),
    SmithingTransform(SmithingTransformRecipe),
    SmithingTrim(SmithingTrimRecipe),
}

impl Default for Recipe {
    fn default() -> Self {
        Recipe::Shapeless(ShapelessRecipe::default())
    }
}

impl Tagged for Recipe {
    type Tag = i32;
    const ENUM_NAME: &'static str = "recipe type";

    fn tag(&self) -> i32 {
        match self {
            Recipe::Shapeless(_) => RECIPE_SHAPELESS,
            Recipe::Shaped(_) => RECIPE_SHAPED,
            Recipe::Furnace(_) => RECIPE_FURNACE,
            Recipe::FurnaceData(_) => RECIPE_FURNACE_DATA,
            Recipe::Multi(_) => RECIPE_MULTI,
            Recipe::ShulkerBox(_) => RECIPE_SHULKER_BOX,
            Recipe::ShapelessChemistry(_) => RECIPE_SHAPELESS_CHEMISTRY,
            Recipe::ShapedChemistry(_) => RECIPE_SHAPED_CHEMISTRY,
            Recipe::SmithingTransform(_) => RECIPE_SMITHING_TRANSFORM,
            Recipe::SmithingTrim(_) => RECIPE_SMITHING_TRIM,
        }
    }

    fn from_tag(tag: i32) -> Option<Self> {
        Some(match tag {
            RECIPE_SHAPELESS => Recipe::Shapeless(Default::default()),
            RECIPE_SHAPED => Recipe::Shaped(Default::default()),
            RECIPE_FURNACE => Recipe::Furnace(Default::default()),
            RECIPE_FURNACE_DATA => Recipe::FurnaceData(Default::default()),
            RECIPE_MULTI => Recipe::Multi(Default::default()),
            RECIPE_SHULKER_BOX => Recipe::ShulkerBox(Default::default()),
            RECIPE_SHAPELESS_CHEMISTRY => Recipe::ShapelessChemistry(Default::default()),
            RECIPE_SHAPED_CHEMISTRY => Recipe::ShapedChemistry(Default::default()),
            RECIPE_SMITHING_TRANSFORM => Recipe::SmithingTransform(Default::default()),
            RECIPE_SMITHING_TRIM => Recipe::SmithingTrim(Default::default()),
            _ => return None,
        })
    }
}

impl Marshal for Recipe {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        marshal_tag(io, self, |io, t| io.varint32(t))?;
        match self {
            Recipe::Shapeless(recipe)
            | Recipe::ShulkerBox(recipe)
            | Recipe::ShapelessChemistry(recipe) => recipe.marshal(io),
            Recipe::Shaped(recipe) | Recipe::ShapedChemistry(recipe) => recipe.marshal(io),
            Recipe::Furnace(recipe) => recipe.marshal(io),
            Recipe::FurnaceData(recipe) => recipe.marshal(io),
            Recipe::Multi(recipe) => recipe.marshal(io),
            Recipe::SmithingTransform(recipe) => recipe.marshal(io),
            Recipe::SmithingTrim(recipe) => recipe.marshal(io),
        }
    }
}

/// Brewing recipe turning one potion into another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PotionRecipe {
    pub input_potion_id: i32,
    pub input_potion_metadata: i32,
    pub reagent_item_id: i32,
    pub reagent_item_metadata: i32,
    pub output_potion_id: i32,
    pub output_potion_metadata: i32,
}

impl Marshal for PotionRecipe {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.input_potion_id)?;
        io.varint32(&mut self.input_potion_metadata)?;
        io.varint32(&mut self.reagent_item_id)?;
        io.varint32(&mut self.reagent_item_metadata)?;
        io.varint32(&mut self.output_potion_id)?;
        io.varint32(&mut self.output_potion_metadata)
    }
}

/// Brewing recipe changing the container of a potion, such as splash or lingering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PotionContainerChangeRecipe {
    pub input_item_id: i32,
    pub reagent_item_id: i32,
    pub output_item_id: i32,
}

impl Marshal for PotionContainerChangeRecipe {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.input_item_id)?;
        io.varint32(&mut self.reagent_item_id)?;
        io.varint32(&mut self.output_item_id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialReducerOutput {
    pub network_id: i32,
    pub count: i32,
}

impl Marshal for MaterialReducerOutput {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.network_id)?;
        io.varint32(&mut self.count)
    }
}

/// Output of the education edition material reducer for one input item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialReducer {
    pub input_item: ItemType,
    pub outputs: Vec<MaterialReducerOutput>,
}

impl Marshal for MaterialReducer {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        // Network id in the upper sixteen bits, metadata in the lower.
        let mut mix = (self.input_item.network_id << 16) | self.input_item.metadata_value as i32;
        io.varint32(&mut mix)?;
        self.input_item = ItemType {
            network_id: mix >> 16,
            metadata_value: (mix & 0x7FFF) as u32,
        };
        slice(io, &mut self.outputs)
    }
}

/// Every recipe the server knows about, sent in one go.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CraftingData {
    pub recipes: Vec<Recipe>,
    pub potion_recipes: Vec<PotionRecipe>,
    pub potion_container_change_recipes: Vec<PotionContainerChangeRecipe>,
    pub material_reducers: Vec<MaterialReducer>,
    pub clear_recipes: bool,
}

impl Marshal for CraftingData {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        slice(io, &mut self.recipes)?;
        slice(io, &mut self.potion_recipes)?;
        slice(io, &mut self.potion_container_change_recipes)?;
        slice(io, &mut self.material_reducers)?;
        io.bool(&mut self.clear_recipes)
    }
}
