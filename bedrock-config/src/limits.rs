use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
/// Caps applied while reading untrusted input
pub struct LimitsConfig {
    /// Whether length prefixes are checked against `max_slice_length`
    pub enabled: bool,
    pub max_slice_length: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_slice_length: 1024,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ItemConfig {
    /// Runtime id of the shield item. Stacks of this item carry a blocking tick.
    pub shield_id: i32,
}
