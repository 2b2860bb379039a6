use crate::ser::{func_slice, marshal_tag, slice, Io, Marshal, Result, Tagged};

pub const SCOREBOARD_ACTION_MODIFY: u8 = 0;
pub const SCOREBOARD_ACTION_REMOVE: u8 = 1;

pub const SCOREBOARD_IDENTITY_ACTION_REGISTER: u8 = 0;
pub const SCOREBOARD_IDENTITY_ACTION_CLEAR: u8 = 1;

/// Who a score belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScoreboardIdentity {
    Player(i64),
    Entity(i64),
    FakePlayer(String),
}

impl Default for ScoreboardIdentity {
    fn default() -> Self {
        ScoreboardIdentity::Player(0)
    }
}

impl Tagged for ScoreboardIdentity {
    type Tag = u8;
    const ENUM_NAME: &'static str = "scoreboard identity type";

    fn tag(&self) -> u8 {
        match self {
            ScoreboardIdentity::Player(_) => 1,
            ScoreboardIdentity::Entity(_) => 2,
            ScoreboardIdentity::FakePlayer(_) => 3,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            1 => ScoreboardIdentity::Player(0),
            2 => ScoreboardIdentity::Entity(0),
            3 => ScoreboardIdentity::FakePlayer(String::new()),
            _ => return None,
        })
    }
}

impl Marshal for ScoreboardIdentity {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        marshal_tag(io, self, |io, tag| io.u8(tag))?;
        match self {
            ScoreboardIdentity::Player(id) | ScoreboardIdentity::Entity(id) => io.varint64(id),
            ScoreboardIdentity::FakePlayer(name) => io.string(name),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreboardEntry {
    pub entry_id: i64,
    pub objective_name: String,
    pub score: i32,
    /// Only sent when the entries are being modified.
    pub identity: ScoreboardIdentity,
}

impl ScoreboardEntry {
    /// Entries depend on the action of the packet carrying them, so they are marshalled
    /// through this rather than [`Marshal`].
    pub fn marshal_with_action<I: Io>(&mut self, io: &mut I, action_type: u8) -> Result<()> {
        io.varint64(&mut self.entry_id)?;
        io.string(&mut self.objective_name)?;
        io.i32(&mut self.score)?;
        if action_type == SCOREBOARD_ACTION_MODIFY {
            self.identity.marshal(io)?;
        }
        Ok(())
    }
}

/// Score changes for a batch of entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SetScore {
    pub action_type: u8,
    pub entries: Vec<ScoreboardEntry>,
}

impl Marshal for SetScore {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.action_type)?;
        let action_type = self.action_type;
        func_slice(io, &mut self.entries, |io, entry| {
            entry.marshal_with_action(io, action_type)
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreboardIdentityEntry {
    pub entry_id: i64,
    /// Only sent when registering.
    pub entity_unique_id: i64,
}

/// Registers or clears the identities of scoreboard entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SetScoreboardIdentity {
    pub action_type: u8,
    pub entries: Vec<ScoreboardIdentityEntry>,
}

impl Marshal for SetScoreboardIdentity {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u8(&mut self.action_type)?;
        let register = self.action_type == SCOREBOARD_IDENTITY_ACTION_REGISTER;
        func_slice(io, &mut self.entries, |io, entry| {
            io.varint64(&mut entry.entry_id)?;
            if register {
                io.varint64(&mut entry.entity_unique_id)?;
            }
            Ok(())
        })
    }
}

/// Objective shown in a display slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayObjective {
    pub display_slot: String,
    pub objective_name: String,
    pub display_name: String,
    pub criteria_name: String,
    pub sort_order: i32,
}

impl Marshal for DisplayObjective {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.display_slot)?;
        io.string(&mut self.objective_name)?;
        io.string(&mut self.display_name)?;
        io.string(&mut self.criteria_name)?;
        io.varint32(&mut self.sort_order)
    }
}

/// Objectives displayed together, as sent on join.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayObjectives {
    pub objectives: Vec<DisplayObjective>,
}

impl Marshal for DisplayObjectives {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        slice(io, &mut self.objectives)
    }
}
