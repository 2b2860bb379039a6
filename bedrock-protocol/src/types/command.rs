use uuid::Uuid;

use crate::ser::{func_slice, slice, Io, Marshal, ProtocolError, Result};

/// Set on every valid parameter type.
pub const COMMAND_ARG_VALID: u32 = 0x100000;
/// The lower bits index the command enums.
pub const COMMAND_ARG_ENUM: u32 = 0x200000;
/// The lower bits index the suffixes.
pub const COMMAND_ARG_SUFFIXED: u32 = 0x1000000;
/// The lower bits index the dynamic enums.
pub const COMMAND_ARG_SOFT_ENUM: u32 = 0x4000000;

pub const COMMAND_ARG_TYPE_INT: u32 = 1;
pub const COMMAND_ARG_TYPE_FLOAT: u32 = 3;
pub const COMMAND_ARG_TYPE_VALUE: u32 = 4;
pub const COMMAND_ARG_TYPE_TARGET: u32 = 8;
pub const COMMAND_ARG_TYPE_STRING: u32 = 56;
pub const COMMAND_ARG_TYPE_POSITION: u32 = 64;
pub const COMMAND_ARG_TYPE_MESSAGE: u32 = 67;
pub const COMMAND_ARG_TYPE_RAW_TEXT: u32 = 70;
pub const COMMAND_ARG_TYPE_JSON: u32 = 74;
pub const COMMAND_ARG_TYPE_COMMAND: u32 = 87;

/// Marks a command without aliases.
pub const NO_ALIASES: u32 = u32::MAX;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandParameter {
    pub name: String,
    /// A basic type, or one of the flagged references into the enum tables.
    pub parameter_type: u32,
    pub optional: bool,
    pub options: u8,
}

impl Marshal for CommandParameter {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        io.u32(&mut self.parameter_type)?;
        io.bool(&mut self.optional)?;
        io.u8(&mut self.options)
    }
}

/// One accepted parameter list of a command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOverload {
    pub chaining: bool,
    pub parameters: Vec<CommandParameter>,
}

impl Marshal for CommandOverload {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.bool(&mut self.chaining)?;
        slice(io, &mut self.parameters)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub description: String,
    pub flags: u16,
    pub permission_level: u8,
    /// Index of the alias enum, or [`NO_ALIASES`].
    pub aliases_offset: u32,
    pub chained_subcommand_offsets: Vec<u16>,
    pub overloads: Vec<CommandOverload>,
}

impl Marshal for Command {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        io.string(&mut self.description)?;
        io.u16(&mut self.flags)?;
        io.u8(&mut self.permission_level)?;
        io.u32(&mut self.aliases_offset)?;
        func_slice(io, &mut self.chained_subcommand_offsets, |io, offset| io.u16(offset))?;
        slice(io, &mut self.overloads)
    }
}

/// A named set of values, stored as indices into the shared enum value table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandEnum {
    pub name: String,
    pub value_indices: Vec<u32>,
}

impl CommandEnum {
    /// The indices are as wide as the value table needs: one byte below 256 values,
    /// two below 65536, four beyond.
    pub fn marshal_indices<I: Io>(&mut self, io: &mut I, value_count: usize) -> Result<()> {
        io.string(&mut self.name)?;
        func_slice(io, &mut self.value_indices, |io, index| {
            if value_count <= u8::MAX as usize {
                let mut narrow = u8::try_from(*index).map_err(|_| index_overflow(*index))?;
                io.u8(&mut narrow)?;
                *index = narrow.into();
            } else if value_count <= u16::MAX as usize {
                let mut narrow = u16::try_from(*index).map_err(|_| index_overflow(*index))?;
                io.u16(&mut narrow)?;
                *index = narrow.into();
            } else {
                io.u32(index)?;
            }
            Ok(())
        })
    }
}

fn index_overflow(index: u32) -> ProtocolError {
    crate::ser::invalid_value(index, "command enum value index", "too wide for the value table")
}

/// Enum whose values the server may change at runtime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SoftEnum {
    pub name: String,
    pub values: Vec<String>,
}

impl Marshal for SoftEnum {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        func_slice(io, &mut self.values, |io, value| io.string(value))
    }
}

pub const COMMAND_ENUM_CONSTRAINT_CHEATS_ENABLED: u8 = 0;
pub const COMMAND_ENUM_CONSTRAINT_OPERATOR_PERMISSIONS: u8 = 1;
pub const COMMAND_ENUM_CONSTRAINT_HOST_PERMISSIONS: u8 = 2;

/// Restricts when a single enum value may be used.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandEnumConstraint {
    pub enum_value_index: u32,
    pub enum_index: u32,
    pub constraints: Vec<u8>,
}

impl Marshal for CommandEnumConstraint {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u32(&mut self.enum_value_index)?;
        io.u32(&mut self.enum_index)?;
        func_slice(io, &mut self.constraints, |io, constraint| io.u8(constraint))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainedSubcommandValue {
    pub index: u16,
    pub value: u16,
}

impl Marshal for ChainedSubcommandValue {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u16(&mut self.index)?;
        io.u16(&mut self.value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainedSubcommand {
    pub name: String,
    pub values: Vec<ChainedSubcommandValue>,
}

impl Marshal for ChainedSubcommand {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.name)?;
        slice(io, &mut self.values)
    }
}

/// Everything the client needs to suggest and validate commands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AvailableCommands {
    pub enum_values: Vec<String>,
    pub chained_subcommand_values: Vec<String>,
    pub suffixes: Vec<String>,
    pub enums: Vec<CommandEnum>,
    pub chained_subcommands: Vec<ChainedSubcommand>,
    pub commands: Vec<Command>,
    pub dynamic_enums: Vec<SoftEnum>,
    pub constraints: Vec<CommandEnumConstraint>,
}

impl Marshal for AvailableCommands {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        func_slice(io, &mut self.enum_values, |io, value| io.string(value))?;
        func_slice(io, &mut self.chained_subcommand_values, |io, value| {
            io.string(value)
        })?;
        func_slice(io, &mut self.suffixes, |io, suffix| io.string(suffix))?;
        let value_count = self.enum_values.len();
        func_slice(io, &mut self.enums, |io, e| e.marshal_indices(io, value_count))?;
        slice(io, &mut self.chained_subcommands)?;
        slice(io, &mut self.commands)?;
        slice(io, &mut self.dynamic_enums)?;
        slice(io, &mut self.constraints)
    }
}

pub const COMMAND_ORIGIN_PLAYER: u32 = 0;
pub const COMMAND_ORIGIN_BLOCK: u32 = 1;
pub const COMMAND_ORIGIN_MINECART_BLOCK: u32 = 2;
pub const COMMAND_ORIGIN_DEV_CONSOLE: u32 = 3;
pub const COMMAND_ORIGIN_TEST: u32 = 4;
pub const COMMAND_ORIGIN_AUTOMATION_PLAYER: u32 = 5;

/// Where a command was run from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOrigin {
    pub origin: u32,
    pub uuid: Uuid,
    pub request_id: String,
    /// Only sent for dev console and test origins.
    pub player_unique_id: i64,
}

impl Marshal for CommandOrigin {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.varuint32(&mut self.origin)?;
        io.uuid(&mut self.uuid)?;
        io.string(&mut self.request_id)?;
        if matches!(self.origin, COMMAND_ORIGIN_DEV_CONSOLE | COMMAND_ORIGIN_TEST) {
            io.varint64(&mut self.player_unique_id)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutputMessage {
    pub success: bool,
    pub message: String,
    pub parameters: Vec<String>,
}

impl Marshal for CommandOutputMessage {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.bool(&mut self.success)?;
        io.string(&mut self.message)?;
        func_slice(io, &mut self.parameters, |io, parameter| io.string(parameter))
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use crate::{marshal, unmarshal};

    use super::*;

    fn table(value_count: usize) -> AvailableCommands {
        AvailableCommands {
            enum_values: (0..value_count).map(|i| format!("v{i}")).collect(),
            enums: vec![CommandEnum {
                name: "Values".to_string(),
                value_indices: vec![0, value_count as u32 - 1],
            }],
            commands: vec![Command {
                name: "give".to_string(),
                description: "Gives an item".to_string(),
                permission_level: 1,
                aliases_offset: NO_ALIASES,
                overloads: vec![CommandOverload {
                    chaining: false,
                    parameters: vec![CommandParameter {
                        name: "item".to_string(),
                        parameter_type: COMMAND_ARG_VALID | COMMAND_ARG_ENUM,
                        optional: false,
                        options: 0,
                    }],
                }],
                ..Default::default()
            }],
            dynamic_enums: vec![SoftEnum {
                name: "Players".to_string(),
                values: vec!["Steve".to_string()],
            }],
            constraints: vec![CommandEnumConstraint {
                enum_value_index: 0,
                enum_index: 0,
                constraints: vec![COMMAND_ENUM_CONSTRAINT_CHEATS_ENABLED],
            }],
            chained_subcommand_values: vec!["set".to_string()],
            chained_subcommands: vec![ChainedSubcommand {
                name: "mode".to_string(),
                values: vec![ChainedSubcommandValue { index: 0, value: 0 }],
            }],
            ..Default::default()
        }
    }

    // Bytes taken by the index list of the single enum.
    fn index_bytes(value_count: usize) -> usize {
        let mut with_enum = table(value_count);
        let mut without_enum = table(value_count);
        without_enum.enums[0].value_indices.clear();
        marshal(&mut with_enum, 0).unwrap().len() - marshal(&mut without_enum, 0).unwrap().len()
    }

    #[test]
    fn test_enum_index_width() {
        assert_eq!(index_bytes(3), 2);
        assert_eq!(index_bytes(255), 2);
        assert_eq!(index_bytes(256), 4);
        assert_eq!(index_bytes(70000), 8);
    }

    #[test]
    fn test_available_commands() {
        for value_count in [3, 300, 70000] {
            let mut commands = table(value_count);
            let bytes = marshal(&mut commands, 0).unwrap();
            let decoded = crate::Reader::new(&bytes[..], 0)
                .with_limits(false)
                .read::<AvailableCommands>()
                .unwrap();
            assert_eq!(decoded, commands);
        }
    }

    #[test]
    fn test_origin_player_id() {
        let mut player = CommandOrigin {
            origin: COMMAND_ORIGIN_PLAYER,
            uuid: Uuid::new_v4(),
            request_id: "r".to_string(),
            player_unique_id: 0,
        };
        let mut console = CommandOrigin {
            origin: COMMAND_ORIGIN_DEV_CONSOLE,
            player_unique_id: -5,
            ..player.clone()
        };
        let player_bytes = marshal(&mut player, 0).unwrap();
        let console_bytes = marshal(&mut console, 0).unwrap();
        assert_eq!(console_bytes.len(), player_bytes.len() + 1);
        assert_eq!(unmarshal::<CommandOrigin>(&console_bytes, 0).unwrap(), console);
    }

    #[test]
    fn test_output_message() {
        let mut message = CommandOutputMessage {
            success: true,
            message: "commands.give.success".to_string(),
            parameters: vec!["Diamond".to_string(), "1".to_string()],
        };
        let bytes = marshal(&mut message, 0).unwrap();
        assert_eq!(unmarshal::<CommandOutputMessage>(&bytes, 0).unwrap(), message);
    }
}
