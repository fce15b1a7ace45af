use std::collections::BTreeMap;

use ttf_parser::{Face, GlyphId};

use crate::{
    error::{Error, GlyphLoadError, Result},
    shape::{Shape, ShapeBuilder},
};

/// Source of glyph outlines.
pub trait FontSource {
    /// The glyph index for `codepoint`, or `None` when the font has no
    /// glyph for it.
    fn glyph_index(&self, codepoint: u32) -> Option<u16>;

    /// The raw outline and horizontal advance of a glyph, in font units.
    ///
    /// Glyphs without an outline, such as spaces, yield an empty shape.
    fn load_shape(&self, codepoint: u32) -> std::result::Result<(Shape, f64), GlyphLoadError>;
}

/// A TrueType or OpenType face read with `ttf-parser`.
pub struct TtfFont<'a> {
    face: Face<'a>,
}

impl<'a> TtfFont<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let face = Face::parse(data, 0).map_err(|err| Error::FontLoad(err.to_string()))?;
        Ok(Self { face })
    }

    pub fn face(&self) -> &Face<'a> {
        &self.face
    }

    fn glyph_id(&self, codepoint: u32) -> Option<GlyphId> {
        let ch = char::from_u32(codepoint)?;
        self.face.glyph_index(ch).filter(|id| id.0 != 0)
    }
}

impl FontSource for TtfFont<'_> {
    fn glyph_index(&self, codepoint: u32) -> Option<u16> {
        self.glyph_id(codepoint).map(|id| id.0)
    }

    fn load_shape(&self, codepoint: u32) -> std::result::Result<(Shape, f64), GlyphLoadError> {
        if char::from_u32(codepoint).is_none() {
            return Err(GlyphLoadError::InvalidCodepoint(codepoint));
        }
        let glyph_id = self
            .glyph_id(codepoint)
            .ok_or(GlyphLoadError::MissingGlyph(codepoint))?;
        let advance = self
            .face
            .glyph_hor_advance(glyph_id)
            .ok_or(GlyphLoadError::MissingAdvance(codepoint))?;
        let mut builder = ShapeBuilder::new();
        // `None` only means the glyph has no outline
        let _ = self.face.outline_glyph(glyph_id, &mut builder);
        Ok((builder.finish(), f64::from(advance)))
    }
}

/// Outlines held in memory, keyed by codepoint.
#[derive(Clone, Debug, Default)]
pub struct MemoryFont {
    glyphs: BTreeMap<u32, (Shape, f64)>,
}

impl MemoryFont {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_glyph(mut self, codepoint: u32, shape: Shape, advance: f64) -> Self {
        self.insert(codepoint, shape, advance);
        self
    }

    pub fn insert(&mut self, codepoint: u32, shape: Shape, advance: f64) {
        self.glyphs.insert(codepoint, (shape, advance));
    }
}

impl FontSource for MemoryFont {
    fn glyph_index(&self, codepoint: u32) -> Option<u16> {
        let index = self.glyphs.range(..codepoint).count() + 1;
        self.glyphs
            .contains_key(&codepoint)
            .then(|| u16::try_from(index).unwrap_or(u16::MAX))
    }

    fn load_shape(&self, codepoint: u32) -> std::result::Result<(Shape, f64), GlyphLoadError> {
        self.glyphs
            .get(&codepoint)
            .cloned()
            .ok_or(GlyphLoadError::MissingGlyph(codepoint))
    }
}
