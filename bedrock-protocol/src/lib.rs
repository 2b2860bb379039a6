//! Wire codec for the Bedrock protocol.
//!
//! Every structure implements [`Marshal`] once against the [`Io`] menu of primitives.
//! Handing it a [`Reader`] decodes it, handing it a [`Writer`] encodes it.

pub mod codec;
pub mod compression;
pub mod ser;
pub mod types;

pub use codec::bit_set::BitSet;
pub use codec::buffer::{Buffer, BUFFER_POOL};
pub use codec::color::Rgba;
pub use codec::position::{BlockPos, ChunkPos, SubChunkPos};
pub use codec::vector::{Vec2, Vec3};
pub use compression::{compression_by_id, Compression, CompressionError};
pub use ser::{Io, Marshal, ProtocolError, Reader, Result, Writer};

/// Protocol version the codec speaks.
pub const CURRENT_PROTOCOL: i32 = 800;
/// Game version matching [`CURRENT_PROTOCOL`].
pub const CURRENT_VERSION: &str = "1.21.80";

/// Encodes `value` into a fresh byte vector.
pub fn marshal<T: Marshal>(value: &mut T, shield_id: i32) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    value.marshal(&mut Writer::new(&mut buffer, shield_id))?;
    Ok(buffer)
}

/// Decodes a `T` from the start of `bytes`. Trailing bytes are left unread.
pub fn unmarshal<T: Marshal + Default>(bytes: &[u8], shield_id: i32) -> Result<T> {
    Reader::new(bytes, shield_id).read()
}
