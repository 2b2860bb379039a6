pub mod bit_set;
pub mod buffer;
pub mod color;
pub mod position;
pub mod vector;
