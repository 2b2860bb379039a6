use crate::ser::{func_slice, optional, optional_func, slice, Io, Marshal, Result};

/// Climate values used during world generation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BiomeClimate {
    pub temperature: f32,
    pub downfall: f32,
    pub red_spore_density: f32,
    pub blue_spore_density: f32,
    pub ash_density: f32,
    pub white_ash_density: f32,
    pub snow_accumulation_min: f32,
    pub snow_accumulation_max: f32,
}

impl Marshal for BiomeClimate {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.f32(&mut self.temperature)?;
        io.f32(&mut self.downfall)?;
        io.f32(&mut self.red_spore_density)?;
        io.f32(&mut self.blue_spore_density)?;
        io.f32(&mut self.ash_density)?;
        io.f32(&mut self.white_ash_density)?;
        io.f32(&mut self.snow_accumulation_min)?;
        io.f32(&mut self.snow_accumulation_max)
    }
}

/// One axis of a feature placement, as an expression id and a distribution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeCoordinate {
    pub min_value_type: i32,
    pub min_value: i16,
    pub max_value_type: i32,
    pub max_value: i16,
    pub grid_offset: u32,
    pub grid_step_size: u32,
    pub distribution: i32,
}

impl Marshal for BiomeCoordinate {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.min_value_type)?;
        io.i16(&mut self.min_value)?;
        io.varint32(&mut self.max_value_type)?;
        io.i16(&mut self.max_value)?;
        io.u32(&mut self.grid_offset)?;
        io.u32(&mut self.grid_step_size)?;
        io.varint32(&mut self.distribution)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeScatterParameter {
    pub coordinates: Vec<BiomeCoordinate>,
    pub evaluation_order: i32,
    pub chance_percent_type: i32,
    pub chance_percent: i16,
    pub chance_numerator: i32,
    pub chance_denominator: i32,
    pub iterations_type: i32,
    pub iterations: i16,
}

impl Marshal for BiomeScatterParameter {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        slice(io, &mut self.coordinates)?;
        io.varint32(&mut self.evaluation_order)?;
        io.varint32(&mut self.chance_percent_type)?;
        io.i16(&mut self.chance_percent)?;
        io.i32(&mut self.chance_numerator)?;
        io.i32(&mut self.chance_denominator)?;
        io.varint32(&mut self.iterations_type)?;
        io.i16(&mut self.iterations)
    }
}

/// Feature placed during generation. Names are indices into the string list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeConsolidatedFeature {
    pub scatter: BiomeScatterParameter,
    pub feature: i16,
    pub identifier: i16,
    pub pass: i16,
    pub can_use_internal: bool,
}

impl Marshal for BiomeConsolidatedFeature {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        self.scatter.marshal(io)?;
        io.i16(&mut self.feature)?;
        io.i16(&mut self.identifier)?;
        io.i16(&mut self.pass)?;
        io.bool(&mut self.can_use_internal)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeMountainParameters {
    pub steep_block: i32,
    pub north_slopes: bool,
    pub south_slopes: bool,
    pub west_slopes: bool,
    pub east_slopes: bool,
    pub top_slide_enabled: bool,
}

impl Marshal for BiomeMountainParameters {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.i32(&mut self.steep_block)?;
        io.bool(&mut self.north_slopes)?;
        io.bool(&mut self.south_slopes)?;
        io.bool(&mut self.west_slopes)?;
        io.bool(&mut self.east_slopes)?;
        io.bool(&mut self.top_slide_enabled)
    }
}

/// Block runtime ids making up the layers of a biome surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeSurfaceMaterial {
    pub top_block: i32,
    pub mid_block: i32,
    pub sea_floor_block: i32,
    pub foundation_block: i32,
    pub sea_block: i32,
    pub sea_floor_depth: i32,
}

impl Marshal for BiomeSurfaceMaterial {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.i32(&mut self.top_block)?;
        io.i32(&mut self.mid_block)?;
        io.i32(&mut self.sea_floor_block)?;
        io.i32(&mut self.foundation_block)?;
        io.i32(&mut self.sea_block)?;
        io.i32(&mut self.sea_floor_depth)
    }
}

/// Surface materials swapped in where noise and height fall within bounds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BiomeElementData {
    pub noise_frequency_scale: f32,
    pub noise_lower_bound: f32,
    pub noise_upper_bound: f32,
    pub height_min_type: i32,
    pub height_min: i16,
    pub height_max_type: i32,
    pub height_max: i16,
    pub adjusted_materials: BiomeSurfaceMaterial,
}

impl Marshal for BiomeElementData {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.f32(&mut self.noise_frequency_scale)?;
        io.f32(&mut self.noise_lower_bound)?;
        io.f32(&mut self.noise_upper_bound)?;
        io.varint32(&mut self.height_min_type)?;
        io.i16(&mut self.height_min)?;
        io.varint32(&mut self.height_max_type)?;
        io.i16(&mut self.height_max)?;
        self.adjusted_materials.marshal(io)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeMesaSurface {
    pub clay_material: u32,
    pub hard_clay_material: u32,
    pub bryce_pillars: bool,
    pub has_forest: bool,
}

impl Marshal for BiomeMesaSurface {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u32(&mut self.clay_material)?;
        io.u32(&mut self.hard_clay_material)?;
        io.bool(&mut self.bryce_pillars)?;
        io.bool(&mut self.has_forest)
    }
}

/// Surface of biomes with both a floor and a ceiling, such as the nether.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeCappedSurface {
    pub floor_blocks: Vec<i32>,
    pub ceiling_blocks: Vec<i32>,
    pub sea_block: Option<u32>,
    pub foundation_block: Option<u32>,
    pub beach_block: Option<u32>,
}

impl Marshal for BiomeCappedSurface {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        func_slice(io, &mut self.floor_blocks, |io, block| io.i32(block))?;
        func_slice(io, &mut self.ceiling_blocks, |io, block| io.i32(block))?;
        optional_func(io, &mut self.sea_block, |io, block| io.u32(block))?;
        optional_func(io, &mut self.foundation_block, |io, block| io.u32(block))?;
        optional_func(io, &mut self.beach_block, |io, block| io.u32(block))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeWeight {
    pub biome: i16,
    pub weight: u32,
}

impl Marshal for BiomeWeight {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.i16(&mut self.biome)?;
        io.u32(&mut self.weight)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeWeightedTemperature {
    pub temperature: i32,
    pub weight: u32,
}

impl Marshal for BiomeWeightedTemperature {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varint32(&mut self.temperature)?;
        io.u32(&mut self.weight)
    }
}

/// Replaces a biome with one of `weighted_biomes` when enough neighbours pass the
/// condition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeConditionalTransformation {
    pub weighted_biomes: Vec<BiomeWeight>,
    pub condition_json: i16,
    pub min_passing_neighbours: u32,
}

impl Marshal for BiomeConditionalTransformation {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        slice(io, &mut self.weighted_biomes)?;
        io.i16(&mut self.condition_json)?;
        io.u32(&mut self.min_passing_neighbours)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeOverworldGenRules {
    pub hills_transformations: Vec<BiomeWeight>,
    pub mutate_transformations: Vec<BiomeWeight>,
    pub river_transformations: Vec<BiomeWeight>,
    pub shore_transformations: Vec<BiomeWeight>,
    pub pre_hills_edge: Vec<BiomeConditionalTransformation>,
    pub post_shore_edge: Vec<BiomeConditionalTransformation>,
    pub climate: Vec<BiomeWeightedTemperature>,
}

impl Marshal for BiomeOverworldGenRules {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        slice(io, &mut self.hills_transformations)?;
        slice(io, &mut self.mutate_transformations)?;
        slice(io, &mut self.river_transformations)?;
        slice(io, &mut self.shore_transformations)?;
        slice(io, &mut self.pre_hills_edge)?;
        slice(io, &mut self.post_shore_edge)?;
        slice(io, &mut self.climate)
    }
}

/// Target point of a biome in the multi-noise parameter space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BiomeMultiNoiseGenRules {
    pub temperature: f32,
    pub humidity: f32,
    pub altitude: f32,
    pub weirdness: f32,
    pub weight: f32,
}

impl Marshal for BiomeMultiNoiseGenRules {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.f32(&mut self.temperature)?;
        io.f32(&mut self.humidity)?;
        io.f32(&mut self.altitude)?;
        io.f32(&mut self.weirdness)?;
        io.f32(&mut self.weight)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomeLegacyWorldGenRules {
    pub legacy_pre_hills: Vec<BiomeConditionalTransformation>,
}

impl Marshal for BiomeLegacyWorldGenRules {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        slice(io, &mut self.legacy_pre_hills)
    }
}

/// Swaps `target_biomes` for `biome` in part of a dimension.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BiomeReplacementData {
    pub biome: i16,
    pub dimension: i32,
    pub target_biomes: Vec<i16>,
    pub amount: f32,
    pub noise_frequency_scale: f32,
    pub replacement_index: u32,
}

impl Marshal for BiomeReplacementData {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.i16(&mut self.biome)?;
        io.varint32(&mut self.dimension)?;
        func_slice(io, &mut self.target_biomes, |io, biome| io.i16(biome))?;
        io.f32(&mut self.amount)?;
        io.f32(&mut self.noise_frequency_scale)?;
        io.u32(&mut self.replacement_index)
    }
}

/// How the client generates a biome, for client side generation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BiomeChunkGeneration {
    pub climate: Option<BiomeClimate>,
    pub consolidated_features: Option<Vec<BiomeConsolidatedFeature>>,
    pub mountain_parameters: Option<BiomeMountainParameters>,
    pub surface_material_adjustments: Option<Vec<BiomeElementData>>,
    pub surface_materials: Option<BiomeSurfaceMaterial>,
    pub has_swamp_surface: bool,
    pub has_frozen_ocean_surface: bool,
    pub has_the_end_surface: bool,
    pub mesa_surface: Option<BiomeMesaSurface>,
    pub capped_surface: Option<BiomeCappedSurface>,
    pub overworld_gen_rules: Option<BiomeOverworldGenRules>,
    pub multi_noise_gen_rules: Option<BiomeMultiNoiseGenRules>,
    pub legacy_world_gen_rules: Option<BiomeLegacyWorldGenRules>,
    pub replacements: Option<Vec<BiomeReplacementData>>,
}

impl Marshal for BiomeChunkGeneration {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        optional(io, &mut self.climate)?;
        optional_func(io, &mut self.consolidated_features, slice)?;
        optional(io, &mut self.mountain_parameters)?;
        optional_func(io, &mut self.surface_material_adjustments, slice)?;
        optional(io, &mut self.surface_materials)?;
        io.bool(&mut self.has_swamp_surface)?;
        io.bool(&mut self.has_frozen_ocean_surface)?;
        io.bool(&mut self.has_the_end_surface)?;
        optional(io, &mut self.mesa_surface)?;
        optional(io, &mut self.capped_surface)?;
        optional(io, &mut self.overworld_gen_rules)?;
        optional(io, &mut self.multi_noise_gen_rules)?;
        optional(io, &mut self.legacy_world_gen_rules)?;
        optional_func(io, &mut self.replacements, slice)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BiomeDefinition {
    /// Index of the biome name in the string list.
    pub name_index: i16,
    pub biome_id: Option<u16>,
    pub temperature: f32,
    pub downfall: f32,
    pub red_spore_density: f32,
    pub blue_spore_density: f32,
    pub ash_density: f32,
    pub white_ash_density: f32,
    pub depth: f32,
    pub scale: f32,
    pub map_water_colour: i32,
    pub rain: bool,
    /// Indices of tag names in the string list.
    pub tags: Option<Vec<u16>>,
    pub chunk_generation: Option<BiomeChunkGeneration>,
}

impl Marshal for BiomeDefinition {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.i16(&mut self.name_index)?;
        optional_func(io, &mut self.biome_id, |io, id| io.u16(id))?;
        io.f32(&mut self.temperature)?;
        io.f32(&mut self.downfall)?;
        io.f32(&mut self.red_spore_density)?;
        io.f32(&mut self.blue_spore_density)?;
        io.f32(&mut self.ash_density)?;
        io.f32(&mut self.white_ash_density)?;
        io.f32(&mut self.depth)?;
        io.f32(&mut self.scale)?;
        io.i32(&mut self.map_water_colour)?;
        io.bool(&mut self.rain)?;
        optional_func(io, &mut self.tags, |io, tags| {
            func_slice(io, tags, |io, tag| io.u16(tag))
        })?;
        optional(io, &mut self.chunk_generation)
    }
}

/// All biome definitions along with the strings they index into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BiomeDefinitionList {
    pub biome_definitions: Vec<BiomeDefinition>,
    pub string_list: Vec<String>,
}

impl Marshal for BiomeDefinitionList {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        slice(io, &mut self.biome_definitions)?;
        func_slice(io, &mut self.string_list, |io, s| io.string(s))
    }
}

#[cfg(test)]
mod test {
    use crate::{marshal, unmarshal};

    use super::*;

    fn plains() -> BiomeDefinition {
        BiomeDefinition {
            name_index: 0,
            biome_id: Some(1),
            temperature: 0.8,
            downfall: 0.4,
            depth: 0.125,
            scale: 0.05,
            map_water_colour: 0x44AFF5,
            rain: true,
            tags: Some(vec![1, 2]),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_definition_layout() {
        let mut definition = BiomeDefinition::default();
        let bytes = marshal(&mut definition, 0).unwrap();
        // name index, absent id, eight floats, colour, rain, absent tags and generation
        assert_eq!(bytes.len(), 2 + 1 + 8 * 4 + 4 + 1 + 1 + 1);
        assert_eq!(bytes[2], 0x00);
    }

    #[test]
    fn test_full_chunk_generation() {
        let surface = BiomeSurfaceMaterial {
            top_block: 1,
            mid_block: 2,
            sea_floor_block: 3,
            foundation_block: 4,
            sea_block: 5,
            sea_floor_depth: 7,
        };
        let transformation = BiomeConditionalTransformation {
            weighted_biomes: vec![BiomeWeight {
                biome: 3,
                weight: 10,
            }],
            condition_json: 4,
            min_passing_neighbours: 2,
        };

        let mut definitions = BiomeDefinitionList {
            biome_definitions: vec![
                plains(),
                BiomeDefinition {
                    name_index: 5,
                    chunk_generation: Some(BiomeChunkGeneration {
                        climate: Some(BiomeClimate {
                            temperature: 2.0,
                            snow_accumulation_max: 0.5,
                            ..Default::default()
                        }),
                        consolidated_features: Some(vec![BiomeConsolidatedFeature {
                            scatter: BiomeScatterParameter {
                                coordinates: vec![BiomeCoordinate {
                                    min_value: -4,
                                    max_value: 8,
                                    grid_step_size: 2,
                                    ..Default::default()
                                }],
                                chance_numerator: 1,
                                chance_denominator: 4,
                                iterations: 3,
                                ..Default::default()
                            },
                            feature: 6,
                            identifier: 7,
                            pass: 1,
                            can_use_internal: true,
                        }]),
                        mountain_parameters: Some(BiomeMountainParameters {
                            steep_block: 9,
                            north_slopes: true,
                            ..Default::default()
                        }),
                        surface_material_adjustments: Some(vec![BiomeElementData {
                            noise_upper_bound: 1.0,
                            height_max: 64,
                            adjusted_materials: surface.clone(),
                            ..Default::default()
                        }]),
                        surface_materials: Some(surface),
                        has_frozen_ocean_surface: true,
                        mesa_surface: Some(BiomeMesaSurface {
                            clay_material: 11,
                            hard_clay_material: 12,
                            bryce_pillars: true,
                            has_forest: false,
                        }),
                        capped_surface: Some(BiomeCappedSurface {
                            floor_blocks: vec![1, 2],
                            ceiling_blocks: vec![3],
                            sea_block: Some(4),
                            foundation_block: None,
                            beach_block: Some(6),
                        }),
                        overworld_gen_rules: Some(BiomeOverworldGenRules {
                            hills_transformations: vec![BiomeWeight {
                                biome: 1,
                                weight: 1,
                            }],
                            pre_hills_edge: vec![transformation.clone()],
                            climate: vec![BiomeWeightedTemperature {
                                temperature: -1,
                                weight: 3,
                            }],
                            ..Default::default()
                        }),
                        multi_noise_gen_rules: Some(BiomeMultiNoiseGenRules {
                            temperature: 0.1,
                            humidity: 0.2,
                            altitude: 0.3,
                            weirdness: 0.4,
                            weight: 0.5,
                        }),
                        legacy_world_gen_rules: Some(BiomeLegacyWorldGenRules {
                            legacy_pre_hills: vec![transformation],
                        }),
                        replacements: Some(vec![BiomeReplacementData {
                            biome: 2,
                            dimension: 0,
                            target_biomes: vec![1, 3],
                            amount: 0.25,
                            noise_frequency_scale: 2.0,
                            replacement_index: 1,
                        }]),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            ],
            string_list: vec!["plains".to_string(), "animal".to_string()],
        };

        let bytes = marshal(&mut definitions, 0).unwrap();
        assert_eq!(
            unmarshal::<BiomeDefinitionList>(&bytes, 0).unwrap(),
            definitions
        );
    }
}
