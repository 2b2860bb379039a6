use crate::codec::vector::{Vec2, Vec3};
use crate::ser::{func_slice, optional, optional_func, slice, Io, Marshal, Result};

pub const AUDIO_LISTENER_CAMERA: u8 = 0;
pub const AUDIO_LISTENER_PLAYER: u8 = 1;

pub const EASING_TYPE_LINEAR: u8 = 0;

pub const AIM_ASSIST_TARGET_MODE_ANGLE: i32 = 0;
pub const AIM_ASSIST_TARGET_MODE_DISTANCE: i32 = 1;

fn optional_f32<I: Io>(io: &mut I, x: &mut Option<f32>) -> Result<()> {
    optional_func(io, x, |io, v| io.f32(v))
}

fn optional_bool<I: Io>(io: &mut I, x: &mut Option<bool>) -> Result<()> {
    optional_func(io, x, |io, v| io.bool(v))
}

fn optional_vec2<I: Io>(io: &mut I, x: &mut Option<Vec2>) -> Result<()> {
    optional_func(io, x, |io, v| io.vec2(v))
}

fn optional_vec3<I: Io>(io: &mut I, x: &mut Option<Vec3>) -> Result<()> {
    optional_func(io, x, |io, v| io.vec3(v))
}

/// Aim assist settings attached to a camera preset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraPresetAimAssist {
    pub preset: Option<String>,
    pub target_mode: Option<i32>,
    pub angle: Option<Vec2>,
    pub distance: Option<f32>,
}

impl Marshal for CameraPresetAimAssist {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        optional_func(io, &mut self.preset, |io, v| io.string(v))?;
        optional_func(io, &mut self.target_mode, |io, v| io.i32(v))?;
        optional_vec2(io, &mut self.angle)?;
        optional_f32(io, &mut self.distance)
    }
}

/// A named camera setup that instructions refer to by index. Absent fields inherit
/// from the parent preset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraPreset {
    pub name: String,
    pub parent: String,
    pub pos_x: Option<f32>,
    pub pos_y: Option<f32>,
    pub pos_z: Option<f32>,
    pub rot_x: Option<f32>,
    pub rot_y: Option<f32>,
    pub rotation_speed: Option<f32>,
    pub snap_to_target: Option<bool>,
    pub horizontal_rotation_limit: Option<Vec2>,
    pub vertical_rotation_limit: Option<Vec2>,
    pub continue_targeting: Option<bool>,
    pub block_listening_radius: Option<f32>,
    pub view_offset: Option<Vec2>,
    pub entity_offset: Option<Vec3>,
    pub radius: Option<f32>,
    pub yaw_limit_min: Option<f32>,
    pub yaw_limit_max: Option<f32>,
    pub audio_listener: Option<u8>,
    pub player_effects: Option<bool>,
    pub aim_assist: Option<CameraPresetAimAssist>,
    pub control_scheme: Option<u8>,
}

impl Marshal for CameraPreset {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        io.string(&mut self.parent)?;
        optional_f32(io, &mut self.pos_x)?;
        optional_f32(io, &mut self.pos_y)?;
        optional_f32(io, &mut self.pos_z)?;
        optional_f32(io, &mut self.rot_x)?;
        optional_f32(io, &mut self.rot_y)?;
        optional_f32(io, &mut self.rotation_speed)?;
        optional_bool(io, &mut self.snap_to_target)?;
        optional_vec2(io, &mut self.horizontal_rotation_limit)?;
        optional_vec2(io, &mut self.vertical_rotation_limit)?;
        optional_bool(io, &mut self.continue_targeting)?;
        optional_f32(io, &mut self.block_listening_radius)?;
        optional_vec2(io, &mut self.view_offset)?;
        optional_vec3(io, &mut self.entity_offset)?;
        optional_f32(io, &mut self.radius)?;
        optional_f32(io, &mut self.yaw_limit_min)?;
        optional_f32(io, &mut self.yaw_limit_max)?;
        optional_func(io, &mut self.audio_listener, |io, v| io.u8(v))?;
        optional_bool(io, &mut self.player_effects)?;
        optional(io, &mut self.aim_assist)?;
        optional_func(io, &mut self.control_scheme, |io, v| io.u8(v))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraEase {
    pub easing_type: u8,
    pub duration: f32,
}

impl Marshal for CameraEase {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.easing_type)?;
        io.f32(&mut self.duration)
    }
}

/// Moves the camera to a preset, optionally easing towards it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraInstructionSet {
    /// Index of the preset in the camera presets sent earlier.
    pub preset: u32,
    pub ease: Option<CameraEase>,
    pub position: Option<Vec3>,
    pub rotation: Option<Vec2>,
    pub facing: Option<Vec3>,
    pub view_offset: Option<Vec2>,
    pub entity_offset: Option<Vec3>,
    pub default: Option<bool>,
    pub ignore_starting_values: bool,
}

impl Marshal for CameraInstructionSet {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u32(&mut self.preset)?;
        optional(io, &mut self.ease)?;
        optional_vec3(io, &mut self.position)?;
        optional_vec2(io, &mut self.rotation)?;
        optional_vec3(io, &mut self.facing)?;
        optional_vec2(io, &mut self.view_offset)?;
        optional_vec3(io, &mut self.entity_offset)?;
        optional_bool(io, &mut self.default)?;
        io.bool(&mut self.ignore_starting_values)
    }
}

/// Durations in seconds of the three phases of a fade.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FadeTimeData {
    pub fade_in_duration: f32,
    pub wait_duration: f32,
    pub fade_out_duration: f32,
}

impl Marshal for FadeTimeData {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.f32(&mut self.fade_in_duration)?;
        io.f32(&mut self.wait_duration)?;
        io.f32(&mut self.fade_out_duration)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraInstructionFade {
    pub time_data: Option<FadeTimeData>,
    /// RGB in the range 0 to 1.
    pub colour: Option<Vec3>,
}

impl Marshal for CameraInstructionFade {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        optional(io, &mut self.time_data)?;
        optional_vec3(io, &mut self.colour)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraInstructionTarget {
    pub center_offset: Option<Vec3>,
    pub entity_unique_id: i64,
}

impl Marshal for CameraInstructionTarget {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        optional_vec3(io, &mut self.center_offset)?;
        io.i64(&mut self.entity_unique_id)
    }
}

/// Any combination of camera changes. Each part is applied only when present.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraInstruction {
    pub set: Option<CameraInstructionSet>,
    pub clear: Option<bool>,
    pub fade: Option<CameraInstructionFade>,
    pub target: Option<CameraInstructionTarget>,
    pub remove_target: Option<bool>,
}

impl Marshal for CameraInstruction {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        optional(io, &mut self.set)?;
        optional_bool(io, &mut self.clear)?;
        optional(io, &mut self.fade)?;
        optional(io, &mut self.target)?;
        optional_bool(io, &mut self.remove_target)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraAimAssistPriority {
    pub identifier: String,
    pub priority: i32,
}

impl Marshal for CameraAimAssistPriority {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.identifier)?;
        io.i32(&mut self.priority)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraAimAssistCategoryPriorities {
    pub entities: Vec<CameraAimAssistPriority>,
    pub blocks: Vec<CameraAimAssistPriority>,
    pub entity_default: Option<i32>,
    pub block_default: Option<i32>,
}

impl Marshal for CameraAimAssistCategoryPriorities {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        slice(io, &mut self.entities)?;
        slice(io, &mut self.blocks)?;
        optional_func(io, &mut self.entity_default, |io, v| io.i32(v))?;
        optional_func(io, &mut self.block_default, |io, v| io.i32(v))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraAimAssistCategory {
    pub name: String,
    pub priorities: CameraAimAssistCategoryPriorities,
}

impl Marshal for CameraAimAssistCategory {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        self.priorities.marshal(io)
    }
}

/// Aim assist category to use while holding an item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraAimAssistItemSettings {
    pub item: String,
    pub category: String,
}

impl Marshal for CameraAimAssistItemSettings {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.item)?;
        io.string(&mut self.category)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraAimAssistPreset {
    pub identifier: String,
    pub block_exclusions: Vec<String>,
    pub liquid_targets: Vec<String>,
    pub item_settings: Vec<CameraAimAssistItemSettings>,
    pub default_item_settings: Option<String>,
    pub hand_settings: Option<String>,
}

impl Marshal for CameraAimAssistPreset {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.identifier)?;
        func_slice(io, &mut self.block_exclusions, |io, v| io.string(v))?;
        func_slice(io, &mut self.liquid_targets, |io, v| io.string(v))?;
        slice(io, &mut self.item_settings)?;
        optional_func(io, &mut self.default_item_settings, |io, v| io.string(v))?;
        optional_func(io, &mut self.hand_settings, |io, v| io.string(v))
    }
}

#[cfg(test)]
mod test {
    use crate::{marshal, unmarshal};

    use super::*;

    #[test]
    fn test_empty_preset_layout() {
        let mut preset = CameraPreset {
            name: "a".to_string(),
            ..Default::default()
        };
        let bytes = marshal(&mut preset, 0).unwrap();
        // name, empty parent, then one absent marker per optional field
        let mut expected = vec![0x01, b'a', 0x00];
        expected.extend_from_slice(&[0x00; 20]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_preset_symmetry() {
        let mut preset = CameraPreset {
            name: "minecraft:free".to_string(),
            parent: "minecraft:first_person".to_string(),
            pos_y: Some(70.0),
            rotation_speed: Some(0.5),
            snap_to_target: Some(true),
            horizontal_rotation_limit: Some(Vec2::new(-90.0, 90.0)),
            entity_offset: Some(Vec3::new(0.0, 1.5, 0.0)),
            audio_listener: Some(AUDIO_LISTENER_PLAYER),
            aim_assist: Some(CameraPresetAimAssist {
                preset: Some("minecraft:aim_assist_default".to_string()),
                target_mode: Some(AIM_ASSIST_TARGET_MODE_DISTANCE),
                angle: None,
                distance: Some(8.0),
            }),
            control_scheme: Some(2),
            ..Default::default()
        };
        let bytes = marshal(&mut preset, 0).unwrap();
        assert_eq!(unmarshal::<CameraPreset>(&bytes, 0).unwrap(), preset);
    }

    #[test]
    fn test_instruction_symmetry() {
        let mut instruction = CameraInstruction {
            set: Some(CameraInstructionSet {
                preset: 2,
                ease: Some(CameraEase {
                    easing_type: EASING_TYPE_LINEAR,
                    duration: 1.5,
                }),
                position: Some(Vec3::new(1.0, 2.0, 3.0)),
                rotation: Some(Vec2::new(10.0, 20.0)),
                default: Some(false),
                ignore_starting_values: true,
                ..Default::default()
            }),
            clear: None,
            fade: Some(CameraInstructionFade {
                time_data: Some(FadeTimeData {
                    fade_in_duration: 0.5,
                    wait_duration: 1.0,
                    fade_out_duration: 0.5,
                }),
                colour: Some(Vec3::new(1.0, 0.0, 0.0)),
            }),
            target: Some(CameraInstructionTarget {
                center_offset: None,
                entity_unique_id: -5,
            }),
            remove_target: Some(true),
        };
        let bytes = marshal(&mut instruction, 0).unwrap();
        assert_eq!(
            unmarshal::<CameraInstruction>(&bytes, 0).unwrap(),
            instruction
        );
    }

    #[test]
    fn test_target_unique_id_is_fixed_width() {
        let mut target = CameraInstructionTarget {
            center_offset: None,
            entity_unique_id: 1,
        };
        assert_eq!(
            marshal(&mut target, 0).unwrap(),
            [0x00, 0x01, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_aim_assist_symmetry() {
        let mut category = CameraAimAssistCategory {
            name: "minecraft:bow".to_string(),
            priorities: CameraAimAssistCategoryPriorities {
                entities: vec![CameraAimAssistPriority {
                    identifier: "minecraft:zombie".to_string(),
                    priority: 20,
                }],
                blocks: vec![],
                entity_default: Some(5),
                block_default: None,
            },
        };
        let bytes = marshal(&mut category, 0).unwrap();
        assert_eq!(
            unmarshal::<CameraAimAssistCategory>(&bytes, 0).unwrap(),
            category
        );

        let mut preset = CameraAimAssistPreset {
            identifier: "minecraft:aim_assist_default".to_string(),
            block_exclusions: vec!["minecraft:bedrock".to_string()],
            liquid_targets: vec![],
            item_settings: vec![CameraAimAssistItemSettings {
                item: "minecraft:bow".to_string(),
                category: "minecraft:bow".to_string(),
            }],
            default_item_settings: Some("minecraft:default".to_string()),
            hand_settings: None,
        };
        let bytes = marshal(&mut preset, 0).unwrap();
        assert_eq!(
            unmarshal::<CameraAimAssistPreset>(&bytes, 0).unwrap(),
            preset
        );
    }
}
