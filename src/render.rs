use rayon::prelude::*;

use crate::{
    collect::Glyph,
    config::FieldMode,
    error::{Error, Result},
    field::{self, Bitmap},
    scale::GlyphRecord,
};

/// Render the distance field of every glyph into its record.
///
/// `records` must come from [`scale`](crate::scale::scale) on the same
/// `glyphs`, with `factor` its scale factor. `range` is in shape units,
/// so a glyph scaled by `factor` ramps over `range * factor` texels.
pub fn render(
    records: &mut [GlyphRecord],
    glyphs: &[Glyph],
    mode: FieldMode,
    range: f64,
    factor: f64,
) -> Result<()> {
    records
        .par_iter_mut()
        .zip(glyphs.par_iter())
        .try_for_each(|(record, glyph)| {
            let mut bitmap = Bitmap::new(mode, record.placement.width, record.placement.height);
            let colored;
            let shape = if mode == FieldMode::Msdf {
                let mut shape = glyph.shape.clone();
                field::color_edges_simple(&mut shape, field::DEFAULT_ANGLE_THRESHOLD);
                colored = shape;
                &colored
            } else {
                &glyph.shape
            };
            field::generate(
                mode,
                &mut bitmap,
                shape,
                range,
                factor,
                record.render_offset / factor,
            )
            .map_err(|source| Error::FieldRender {
                codepoint: glyph.codepoint,
                source,
            })?;
            record.bitmap = Some(bitmap);
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{collect::Glyph, error::FieldRenderError, scale::scale, shape::ShapeBuilder};
    use ttf_parser::OutlineBuilder;

    fn square_glyph(codepoint: u32, size: f32) -> Glyph {
        let mut builder = ShapeBuilder::new();
        builder.move_to(0.0, 0.0);
        builder.line_to(0.0, size);
        builder.line_to(size, size);
        builder.line_to(size, 0.0);
        builder.close();
        let mut shape = builder.finish();
        let bounds = shape.bounds();
        shape.normalize();
        Glyph {
            codepoint,
            shape,
            bounds,
            advance: f64::from(size),
        }
    }

    #[test]
    fn bitmaps_match_cells() {
        let glyphs = [square_glyph(65, 256.0), square_glyph(66, 128.0)];
        for mode in [FieldMode::Msdf, FieldMode::Sdf, FieldMode::PseudoSdf] {
            let mut scaled = scale(&glyphs, 16, 2).unwrap();
            render(&mut scaled.records, &glyphs, mode, 1.0, scaled.factor).unwrap();
            for record in &scaled.records {
                let bitmap = record.bitmap.as_ref().unwrap();
                assert_eq!(bitmap.width(), record.placement.width);
                assert_eq!(bitmap.height(), record.placement.height);
                assert_eq!(bitmap.channels(), mode.channels());
            }
        }
    }

    #[test]
    fn glyph_fills_the_inside_of_its_cell() {
        let glyphs = [square_glyph(65, 512.0)];
        let mut scaled = scale(&glyphs, 8, 2).unwrap();
        // 64 font units per texel
        render(&mut scaled.records, &glyphs, FieldMode::Sdf, 64.0, scaled.factor).unwrap();
        let bitmap = scaled.records[0].bitmap.as_ref().unwrap();
        assert_eq!(bitmap.width(), 12);
        // border texels are outside, the center is inside
        assert_eq!(bitmap.texel(0, 0)[0], 0.0);
        assert_eq!(bitmap.texel(6, 6)[0], 1.0);
        // half a texel inside the left edge with a range of one texel
        assert!((bitmap.texel(2, 6)[0] - 1.0).abs() < 1e-6);
        assert!((bitmap.texel(1, 6)[0] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn range_is_in_font_units() {
        let glyphs = [square_glyph(65, 512.0)];
        let mut scaled = scale(&glyphs, 8, 2).unwrap();
        // 256 font units are four texels at 64 units per texel
        render(&mut scaled.records, &glyphs, FieldMode::Sdf, 256.0, scaled.factor).unwrap();
        let bitmap = scaled.records[0].bitmap.as_ref().unwrap();
        // half a texel inside: 32 units of 256
        let value = bitmap.texel(2, 6)[0];
        assert!((value - (0.5 + 32.0 / 256.0)).abs() < 1e-6, "{value}");
        let outside = bitmap.texel(0, 6)[0];
        assert!((outside - (0.5 - 96.0 / 256.0)).abs() < 1e-6, "{outside}");
    }

    #[test]
    fn empty_outline_names_the_glyph() {
        let mut glyph = square_glyph(67, 64.0);
        glyph.shape = crate::shape::Shape::new();
        let glyphs = [glyph];
        let mut scaled = scale(&glyphs, 8, 1).unwrap();
        match render(&mut scaled.records, &glyphs, FieldMode::Sdf, 1.0, scaled.factor) {
            Err(Error::FieldRender {
                codepoint: 67,
                source: FieldRenderError::EmptyShape,
            }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
