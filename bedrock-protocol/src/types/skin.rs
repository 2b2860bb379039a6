use crate::ser::{func_slice_u32_length, invalid_value, slice_u32_length, Io, Marshal, Result};

const SKIN_FIELD: &str = "serialised skin";

/// An animated overlay of a skin, such as blinking eyes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkinAnimation {
    pub image_width: u32,
    pub image_height: u32,
    /// RGBA pixels, four bytes per pixel.
    pub image_data: Vec<u8>,
    pub animation_type: u32,
    pub frame_count: f32,
    pub expression_type: u32,
}

impl Marshal for SkinAnimation {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.u32(&mut self.image_width)?;
        io.u32(&mut self.image_height)?;
        io.byte_slice(&mut self.image_data)?;
        io.u32(&mut self.animation_type)?;
        io.f32(&mut self.frame_count)?;
        io.u32(&mut self.expression_type)
    }
}

/// Piece of a persona skin, such as a hairstyle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonaPiece {
    pub piece_id: String,
    pub piece_type: String,
    pub pack_id: String,
    pub default: bool,
    pub product_id: String,
}

impl Marshal for PersonaPiece {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.piece_id)?;
        io.string(&mut self.piece_type)?;
        io.string(&mut self.pack_id)?;
        io.bool(&mut self.default)?;
        io.string(&mut self.product_id)
    }
}

/// Colours applied to every persona piece of a type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonaPieceTintColour {
    pub piece_type: String,
    /// Hex colours such as `#ff0000ff`.
    pub colours: Vec<String>,
}

impl Marshal for PersonaPieceTintColour {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        io.string(&mut self.piece_type)?;
        func_slice_u32_length(io, &mut self.colours, |io, colour| io.string(colour))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Skin {
    pub skin_id: String,
    pub play_fab_id: String,
    pub skin_resource_patch: Vec<u8>,
    pub skin_image_width: u32,
    pub skin_image_height: u32,
    pub skin_data: Vec<u8>,
    pub animations: Vec<SkinAnimation>,
    pub cape_image_width: u32,
    pub cape_image_height: u32,
    pub cape_data: Vec<u8>,
    pub skin_geometry: Vec<u8>,
    pub geometry_data_engine_version: Vec<u8>,
    pub animation_data: Vec<u8>,
    pub cape_id: String,
    /// Informational only, never sent.
    pub full_id: String,
    pub skin_colour: String,
    pub arm_size: String,
    pub persona_pieces: Vec<PersonaPiece>,
    pub piece_tint_colours: Vec<PersonaPieceTintColour>,
    pub premium: bool,
    pub persona: bool,
    pub persona_cape_on_classic_skin: bool,
    pub primary_user: bool,
    pub override_appearance: bool,
}

fn check_image(width: u32, height: u32, data: &[u8], what: &str) -> Result<()> {
    let expected = u64::from(width) * u64::from(height) * 4;
    if data.len() as u64 != expected {
        return Err(invalid_value(
            format!("{width}x{height}"),
            SKIN_FIELD,
            format!(
                "{what} holds {} bytes, {width}x{height} needs {expected}",
                data.len()
            ),
        ));
    }
    Ok(())
}

impl Skin {
    /// Checks that every image holds exactly four bytes per pixel of its dimensions.
    pub fn validate(&self) -> Result<()> {
        check_image(
            self.skin_image_width,
            self.skin_image_height,
            &self.skin_data,
            "skin data",
        )?;
        check_image(
            self.cape_image_width,
            self.cape_image_height,
            &self.cape_data,
            "cape data",
        )?;
        for (i, animation) in self.animations.iter().enumerate() {
            check_image(
                animation.image_width,
                animation.image_height,
                &animation.image_data,
                &format!("animation {i}"),
            )?;
        }
        Ok(())
    }
}

impl Marshal for Skin {
    fn marshal<I: Io>(&mut self, io: &mut I) -> Result<()> {
        // A reader overwrites the images, so only its result is checked.
        if !io.is_reader() {
            self.validate()?;
        }
        io.string(&mut self.skin_id)?;
        io.string(&mut self.play_fab_id)?;
        io.byte_slice(&mut self.skin_resource_patch)?;
        io.u32(&mut self.skin_image_width)?;
        io.u32(&mut self.skin_image_height)?;
        io.byte_slice(&mut self.skin_data)?;
        slice_u32_length(io, &mut self.animations)?;
        io.u32(&mut self.cape_image_width)?;
        io.u32(&mut self.cape_image_height)?;
        io.byte_slice(&mut self.cape_data)?;
        io.byte_slice(&mut self.skin_geometry)?;
        io.byte_slice(&mut self.geometry_data_engine_version)?;
        io.byte_slice(&mut self.animation_data)?;
        io.string(&mut self.cape_id)?;
        io.string(&mut self.skin_colour)?;
        io.string(&mut self.arm_size)?;
        slice_u32_length(io, &mut self.persona_pieces)?;
        slice_u32_length(io, &mut self.piece_tint_colours)?;
        io.bool(&mut self.premium)?;
        io.bool(&mut self.persona)?;
        io.bool(&mut self.persona_cape_on_classic_skin)?;
        io.bool(&mut self.primary_user)?;
        io.bool(&mut self.override_appearance)?;
        self.validate()
    }
}
