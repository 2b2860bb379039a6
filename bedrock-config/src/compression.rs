use serde::{Deserialize, Serialize};

/// Id of the flate codec on the wire.
pub const FLATE_ID: u16 = 0;
/// Id of the snappy codec on the wire.
pub const SNAPPY_ID: u16 = 1;
/// Id marking data that was sent uncompressed.
pub const NOP_ID: u16 = 0xFFFF;

/// Every id [`CompressionConfig::algorithm`] may take.
pub const KNOWN_IDS: [u16; 3] = [FLATE_ID, SNAPPY_ID, NOP_ID];

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
/// Batch compression
pub struct CompressionConfig {
    /// Id of the codec used for outgoing data, 0 = flate, 1 = snappy, 65535 = none
    pub algorithm: u16,
    /// A value between 0..9
    /// 1 = Optimize for the best speed of encoding.
    /// 9 = Optimize for the size of data being encoded.
    pub level: u32,
    /// Payloads smaller than this are sent uncompressed
    pub threshold: u32,
    /// Largest payload decompression may produce
    pub max_decompressed_size: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            algorithm: FLATE_ID,
            level: 6,
            threshold: 256,
            max_decompressed_size: 16 * 1024 * 1024,
        }
    }
}
