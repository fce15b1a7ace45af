use std::collections::HashSet;

use crate::{
    config::CodepointRange,
    font::FontSource,
    shape::{Bounds, Shape},
};

/// A glyph outline as read from the font, in font units.
#[derive(Clone, Debug)]
pub struct Glyph {
    pub codepoint: u32,
    /// Normalized outline
    pub shape: Shape,
    /// Bounds of the outline before normalization
    pub bounds: Bounds,
    pub advance: f64,
}

/// Result of walking the requested codepoint ranges.
#[derive(Clone, Debug, Default)]
pub struct Collection {
    /// Glyphs with a visible outline, in range iteration order
    pub glyphs: Vec<Glyph>,
    /// Codepoints the font has no glyph for
    pub missing: usize,
    /// Glyphs without extent, like whitespace
    pub blank: usize,
    /// Glyphs the font failed to load
    pub failed: usize,
}

pub fn collect<F>(font: &F, ranges: &[CodepointRange]) -> Collection
where
    F: FontSource + ?Sized,
{
    let mut collection = Collection::default();
    let mut seen = HashSet::new();
    for codepoint in ranges.iter().flat_map(CodepointRange::iter) {
        if !seen.insert(codepoint) {
            continue;
        }
        if char::from_u32(codepoint).is_none() || font.glyph_index(codepoint).is_none() {
            collection.missing += 1;
            continue;
        }
        let (mut shape, advance) = match font.load_shape(codepoint) {
            Ok(loaded) => loaded,
            Err(err) => {
                log::debug!("skipping glyph: {err}");
                collection.failed += 1;
                continue;
            }
        };
        let bounds = shape.bounds();
        shape.normalize();
        if bounds.width() <= 0.0 {
            collection.blank += 1;
            continue;
        }
        collection.glyphs.push(Glyph {
            codepoint,
            shape,
            bounds,
            advance,
        });
    }
    collection
}
