use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::LazyLock;

use bedrock_config::compression::{CompressionConfig, FLATE_ID, SNAPPY_ID};
pub use bedrock_config::compression::NOP_ID;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use thiserror::Error;

/// Default cap on the size of decompressed data.
pub const MAX_DECOMPRESSED_SIZE: usize = 16 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("unknown compression id {0}")]
    UnknownCompression(u16),
    #[error("flate error: {0}")]
    Flate(std::io::Error),
    #[error("snappy error: {0}")]
    Snappy(#[from] snap::Error),
    #[error("decompressed data exceeds {max} bytes")]
    TooLarge { max: usize },
}

/// A packet compression algorithm, identified on the wire by [`Compression::id`].
pub trait Compression: Send + Sync {
    fn id(&self) -> u16;
    fn compress(&self, plain: &[u8]) -> Result<Vec<u8>, CompressionError>;
    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>, CompressionError>;
}

/// Raw deflate streams, without zlib framing.
#[derive(Clone, Copy, Debug)]
pub struct Flate {
    level: u32,
    max_decompressed_size: usize,
}

impl Flate {
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
            max_decompressed_size: MAX_DECOMPRESSED_SIZE,
        }
    }

    pub fn with_max_decompressed_size(mut self, max: usize) -> Self {
        self.max_decompressed_size = max;
        self
    }
}

impl Default for Flate {
    fn default() -> Self {
        Self::new(6)
    }
}

impl Compression for Flate {
    fn id(&self) -> u16 {
        FLATE_ID
    }

    fn compress(&self, plain: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let mut encoder = DeflateEncoder::new(
            Vec::with_capacity(plain.len() / 2),
            flate2::Compression::new(self.level),
        );
        encoder.write_all(plain).map_err(CompressionError::Flate)?;
        encoder.finish().map_err(CompressionError::Flate)
    }

    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let max = self.max_decompressed_size;
        let mut plain = Vec::new();
        DeflateDecoder::new(compressed)
            .take(max as u64 + 1)
            .read_to_end(&mut plain)
            .map_err(CompressionError::Flate)?;
        if plain.len() > max {
            return Err(CompressionError::TooLarge { max });
        }
        Ok(plain)
    }
}

/// Snappy block format.
#[derive(Clone, Copy, Debug)]
pub struct Snappy {
    max_decompressed_size: usize,
}

impl Snappy {
    pub fn new() -> Self {
        Self {
            max_decompressed_size: MAX_DECOMPRESSED_SIZE,
        }
    }

    pub fn with_max_decompressed_size(mut self, max: usize) -> Self {
        self.max_decompressed_size = max;
        self
    }
}

impl Default for Snappy {
    fn default() -> Self {
        Self::new()
    }
}

impl Compression for Snappy {
    fn id(&self) -> u16 {
        SNAPPY_ID
    }

    fn compress(&self, plain: &[u8]) -> Result<Vec<u8>, CompressionError> {
        Ok(snap::raw::Encoder::new().compress_vec(plain)?)
    }

    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let max = self.max_decompressed_size;
        if snap::raw::decompress_len(compressed)? > max {
            return Err(CompressionError::TooLarge { max });
        }
        Ok(snap::raw::Decoder::new().decompress_vec(compressed)?)
    }
}

/// Leaves data as it is.
#[derive(Clone, Copy, Debug, Default)]
pub struct Nop;

impl Compression for Nop {
    fn id(&self) -> u16 {
        NOP_ID
    }

    fn compress(&self, plain: &[u8]) -> Result<Vec<u8>, CompressionError> {
        Ok(plain.to_vec())
    }

    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>, CompressionError> {
        Ok(compressed.to_vec())
    }
}

static REGISTRY: LazyLock<HashMap<u16, Box<dyn Compression>>> = LazyLock::new(|| {
    let codecs: [Box<dyn Compression>; 3] =
        [Box::new(Flate::default()), Box::new(Snappy::new()), Box::new(Nop)];
    let registry: HashMap<_, _> = codecs.into_iter().map(|c| (c.id(), c)).collect();
    log::debug!("registered {} compression algorithms", registry.len());
    registry
});

/// Looks up a default configured codec by its wire id.
pub fn compression_by_id(id: u16) -> Option<&'static dyn Compression> {
    REGISTRY.get(&id).map(Box::as_ref)
}

/// Builds the codec selected by `config`, with its level and size cap applied.
pub fn from_config(config: &CompressionConfig) -> Result<Box<dyn Compression>, CompressionError> {
    let max = config.max_decompressed_size;
    Ok(match config.algorithm {
        FLATE_ID => Box::new(Flate::new(config.level).with_max_decompressed_size(max)),
        SNAPPY_ID => Box::new(Snappy::new().with_max_decompressed_size(max)),
        NOP_ID => Box::new(Nop),
        id => {
            log::warn!("configured compression id {id} is unknown");
            return Err(CompressionError::UnknownCompression(id));
        }
    })
}

/// Compresses outgoing batches with the configured codec once they reach the
/// configured threshold.
pub struct BatchCompressor {
    codec: Box<dyn Compression>,
    threshold: usize,
}

impl BatchCompressor {
    pub fn new(codec: Box<dyn Compression>, threshold: usize) -> Self {
        Self { codec, threshold }
    }

    pub fn from_config(config: &CompressionConfig) -> Result<Self, CompressionError> {
        Ok(Self::new(from_config(config)?, config.threshold as usize))
    }

    /// Returns the id of the algorithm applied along with the payload. Batches
    /// under the threshold are left as they are and report [`NOP_ID`].
    pub fn compress(&self, plain: &[u8]) -> Result<(u16, Vec<u8>), CompressionError> {
        if plain.len() < self.threshold {
            return Ok((NOP_ID, plain.to_vec()));
        }
        let compressed = self.codec.compress(plain).inspect_err(|err| {
            log::debug!("compression with algorithm {} failed: {err}", self.codec.id());
        })?;
        Ok((self.codec.id(), compressed))
    }
}

/// Decompresses `data` with the codec registered under `id`.
pub fn decompress_by_id(id: u16, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let codec = compression_by_id(id).ok_or(CompressionError::UnknownCompression(id))?;
    codec.decompress(data).inspect_err(|err| {
        log::debug!("decompression with algorithm {id} failed: {err}");
    })
}
