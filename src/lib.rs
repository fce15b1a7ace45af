//! Distance field font atlases.
//!
//! Glyph outlines are collected from a font, scaled so the tallest glyph
//! is [`AtlasConfig::char_height`] texels high, rendered as signed distance
//! fields and packed into a single texture. [`output`] turns the result
//! into C source tables and a PNG.

pub extern crate ttf_parser;

pub mod bisect;
pub mod collect;
pub mod config;
pub mod edge;
pub mod error;
pub mod field;
pub mod font;
pub mod math;
pub mod output;
pub mod pack;
pub mod render;
pub mod scale;
pub mod shape;

pub use crate::{
    collect::{collect, Collection, Glyph},
    config::{AtlasConfig, CodepointRange, FieldMode, TextureSize},
    error::{ConfigError, Error, FieldRenderError, GlyphLoadError, Result},
    field::Bitmap,
    font::{FontSource, MemoryFont, TtfFont},
    output::Artifacts,
    scale::{GlyphRecord, Placement},
    shape::{Shape, ShapeBuilder},
};

/// Glyphs rendered and packed into one texture.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct PackedAtlas {
    pub width: u32,
    pub height: u32,
    pub mode: FieldMode,
    pub border: u32,
    pub spacing: u32,
    /// The char height the atlas was rendered at
    pub char_height: u32,
    pub factor: f64,
    /// Every record has a position and a bitmap
    pub records: Vec<GlyphRecord>,
}

/// Run the whole pipeline for `font`.
pub fn build<F>(font: &F, config: &AtlasConfig) -> Result<PackedAtlas>
where
    F: FontSource + ?Sized,
{
    config.validate()?;
    let collection = collect(font, config.ranges());
    log::info!(
        "collected {} glyphs ({} missing, {} blank)",
        collection.glyphs.len(),
        collection.missing,
        collection.blank
    );
    if collection.failed > 0 {
        log::warn!("skipped {} glyphs that failed to load", collection.failed);
    }
    let glyphs = collection.glyphs;
    if glyphs.is_empty() {
        return Err(Error::NoGlyphs);
    }

    let config = if config.auto_height() {
        let char_height = bisect::bisect_char_height(&glyphs, config)?;
        config.clone().with_char_height(char_height)
    } else {
        config.clone()
    };

    let mut scaled = scale::scale(&glyphs, config.char_height(), config.smooth_pixels())?;
    log::debug!(
        "scale factor {} for char height {}",
        scaled.factor,
        config.char_height()
    );
    log::info!("building {} glyphs", scaled.records.len());
    render::render(
        &mut scaled.records,
        &glyphs,
        config.mode(),
        config.range(),
        scaled.factor,
    )?;

    let texture = config.texture();
    log::info!("packing atlas");
    if !pack::pack(
        &mut scaled.records,
        texture.width,
        texture.height,
        config.spacing(),
    ) {
        return Err(Error::AtlasTooSmall {
            width: texture.width,
            height: texture.height,
            char_height: config.char_height(),
            glyphs: scaled.records.len(),
        });
    }
    log::info!(
        "packed {} glyphs into {}",
        scaled.records.len(),
        texture
    );

    Ok(PackedAtlas {
        width: texture.width,
        height: texture.height,
        mode: config.mode(),
        border: config.smooth_pixels(),
        spacing: config.spacing(),
        char_height: config.char_height(),
        factor: scaled.factor,
        records: scaled.records,
    })
}
