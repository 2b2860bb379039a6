/// Block coordinates, each written as a varint32.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockPos(pub [i32; 3]);

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self([x, y, z])
    }

    pub const fn x(&self) -> i32 {
        self.0[0]
    }

    pub const fn y(&self) -> i32 {
        self.0[1]
    }

    pub const fn z(&self) -> i32 {
        self.0[2]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkPos(pub [i32; 2]);

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self([x, z])
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SubChunkPos(pub [i32; 3]);

impl SubChunkPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self([x, y, z])
    }
}
