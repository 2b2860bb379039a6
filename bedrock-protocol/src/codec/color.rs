#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `R | G << 8 | B << 16 | A << 24`
    pub const fn pack(&self) -> u32 {
        self.r as u32 | (self.g as u32) << 8 | (self.b as u32) << 16 | (self.a as u32) << 24
    }

    pub const fn unpack(x: u32) -> Self {
        Self {
            r: x as u8,
            g: (x >> 8) as u8,
            b: (x >> 16) as u8,
            a: (x >> 24) as u8,
        }
    }
}
