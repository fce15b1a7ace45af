/* SPDX-License-Identifier: (Apache-2.0 OR MIT OR Zlib) */
/* Copyright © 2023 Violet Leonard */

use crate::{
    collect::Glyph,
    config::AtlasConfig,
    error::{Error, Result},
    pack::pack,
    scale::scale,
};

/// Scale and pack without rendering. Cells too large to size never fit.
fn probe(glyphs: &[Glyph], config: &AtlasConfig, char_height: u32) -> Result<bool> {
    let mut scaled = match scale(glyphs, char_height, config.smooth_pixels()) {
        Ok(scaled) => scaled,
        Err(Error::CellTooLarge { .. }) => return Ok(false),
        Err(err) => return Err(err),
    };
    let texture = config.texture();
    Ok(pack(
        &mut scaled.records,
        texture.width,
        texture.height,
        config.spacing(),
    ))
}

/// Search for the largest char height, at most `config.char_height()`,
/// whose cells still pack into the texture.
///
/// The search doubles from the last fitting height while it can, and halves
/// the gap towards it after a failed probe. A height that failed once caps
/// every later guess.
pub fn bisect_char_height(glyphs: &[Glyph], config: &AtlasConfig) -> Result<u32> {
    let requested_max = config.char_height();
    let texture = config.texture();
    let mut low = 0;
    let mut high = requested_max;
    let mut infeasible = texture.height.saturating_add(1);
    while low != high {
        log::info!("trying char height {high}");
        if probe(glyphs, config, high)? {
            log::debug!("char height {high} fits");
            low = high;
            high = low
                .saturating_mul(2)
                .min(infeasible - 1)
                .min(requested_max);
        } else {
            log::debug!("char height {high} does not fit");
            infeasible = infeasible.min(high);
            high = low + (high - low) / 2;
        }
    }
    if low == 0 {
        return Err(Error::AtlasTooSmall {
            width: texture.width,
            height: texture.height,
            char_height: 1,
            glyphs: glyphs.len(),
        });
    }
    log::info!("using char height {low}");
    Ok(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Bounds, Shape};

    fn glyph(codepoint: u32, width: f64, height: f64) -> Glyph {
        Glyph {
            codepoint,
            shape: Shape::new(),
            bounds: Bounds {
                left: 0.0,
                bottom: 0.0,
                right: width,
                top: height,
            },
            advance: width,
        }
    }

    fn config(width: u32, height: u32, max: u32) -> AtlasConfig {
        AtlasConfig::default()
            .with_texture_size(width, height)
            .with_char_height(max)
            .with_smooth_pixels(2)
            .with_spacing(2)
    }

    #[test]
    fn single_square_fills_the_texture() {
        let glyphs = [glyph(65, 512.0, 512.0)];
        let config = config(64, 64, 1000);
        let height = bisect_char_height(&glyphs, &config).unwrap();
        // cell of height + 4, spaced by 2 on both sides
        assert_eq!(height, 56);
        assert!(probe(&glyphs, &config, height).unwrap());
        assert!(!probe(&glyphs, &config, height + 1).unwrap());
    }

    #[test]
    fn result_is_maximal() {
        let glyphs = [
            glyph(65, 256.0, 512.0),
            glyph(66, 384.0, 256.0),
            glyph(67, 128.0, 128.0),
            glyph(68, 512.0, 384.0),
        ];
        let config = config(128, 96, 500);
        let height = bisect_char_height(&glyphs, &config).unwrap();
        assert!(height > 0);
        assert!(probe(&glyphs, &config, height).unwrap());
        assert!(!probe(&glyphs, &config, height + 1).unwrap());
    }

    #[test]
    fn huge_requested_height_still_converges() {
        let glyphs = [glyph(65, 512.0, 512.0), glyph(87, 1024.0, 512.0)];
        let config = config(256, 64, 3_000_000_000);
        assert!(!probe(&glyphs, &config, 3_000_000_000).unwrap());
        let height = bisect_char_height(&glyphs, &config).unwrap();
        assert!(height > 0);
        assert!(probe(&glyphs, &config, height).unwrap());
        assert!(!probe(&glyphs, &config, height + 1).unwrap());

        let square = [glyph(65, 512.0, 512.0)];
        let height = bisect_char_height(&square, &self::config(64, 64, 3_000_000_000)).unwrap();
        assert_eq!(height, 56);
    }

    #[test]
    fn never_exceeds_the_requested_height() {
        let glyphs = [glyph(65, 512.0, 512.0)];
        let height = bisect_char_height(&glyphs, &config(256, 256, 32)).unwrap();
        assert_eq!(height, 32);
    }

    #[test]
    fn nothing_fits() {
        let glyphs = [glyph(65, 512.0, 512.0)];
        match bisect_char_height(&glyphs, &config(4, 4, 32)) {
            Err(Error::AtlasTooSmall {
                width: 4,
                height: 4,
                glyphs: 1,
                ..
            }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
