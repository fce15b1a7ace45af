use crate::{
    collect::Glyph,
    error::{Error, Result},
    field::Bitmap,
    math::Vector2,
    shape::Bounds,
};

/// A glyph cell in the atlas, in texels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Per-glyph layout at one scale factor.
#[derive(Clone, Debug)]
pub struct GlyphRecord {
    pub codepoint: u32,
    /// Bounds in texels
    pub bounds: Bounds,
    pub advance: f64,
    /// Position is only meaningful after a successful pack
    pub placement: Placement,
    /// Translation from scaled shape space into the cell, in texels
    pub render_offset: Vector2,
    pub bitmap: Option<Bitmap>,
}

#[derive(Clone, Debug)]
pub struct Scaled {
    pub factor: f64,
    /// One record per glyph, in the same order
    pub records: Vec<GlyphRecord>,
}

/// Cell side in texels, or `None` if it does not fit a `u32`.
fn cell_extent(extent: f64, border: u32) -> Option<u32> {
    let inner = extent.ceil().max(0.0);
    if inner > f64::from(u32::MAX) {
        return None;
    }
    border.checked_mul(2)?.checked_add(inner as u32)
}

/// Scale every glyph so the tallest one is `char_height` texels high.
///
/// Fails with [`Error::CellTooLarge`] when a cell side, border included,
/// would exceed `u32::MAX` texels.
pub fn scale(glyphs: &[Glyph], char_height: u32, border: u32) -> Result<Scaled> {
    if glyphs.is_empty() {
        return Err(Error::NoGlyphs);
    }
    let max_height = glyphs
        .iter()
        .map(|glyph| glyph.bounds.height())
        .fold(0.0, f64::max);
    if max_height <= 0.0 {
        return Err(Error::DegenerateGlyphs(glyphs.len()));
    }
    let factor = f64::from(char_height) / max_height;
    let border_f = f64::from(border);
    let records = glyphs
        .iter()
        .map(|glyph| -> Result<GlyphRecord> {
            let bounds = glyph.bounds.scaled(factor);
            let too_large = || Error::CellTooLarge {
                codepoint: glyph.codepoint,
                char_height,
            };
            Ok(GlyphRecord {
                codepoint: glyph.codepoint,
                bounds,
                advance: glyph.advance * factor,
                placement: Placement {
                    x: 0,
                    y: 0,
                    width: cell_extent(bounds.width(), border).ok_or_else(too_large)?,
                    height: cell_extent(bounds.height(), border).ok_or_else(too_large)?,
                },
                render_offset: Vector2::new(-bounds.left + border_f, -bounds.bottom + border_f),
                bitmap: None,
            })
        })
        .collect::<Result<_>>()?;
    Ok(Scaled { factor, records })
}
