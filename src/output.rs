//! C source and PNG artifacts for a packed atlas.

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use crate::{config::FieldMode, error::Result, scale::GlyphRecord, PackedAtlas};

const HEADER: &str = "// Generated by sdf-atlasgen, do not modify.\n";

/// One row of `font_codepoint_infos`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entry {
    pub atlas_x: u32,
    pub atlas_y: u32,
    pub atlas_w: u32,
    pub atlas_h: u32,
    pub minx: f64,
    pub maxx: f64,
    pub miny: f64,
    pub maxy: f64,
    pub advance: f64,
}

impl From<&GlyphRecord> for Entry {
    fn from(record: &GlyphRecord) -> Self {
        let placement = record.placement;
        Self {
            atlas_x: placement.x,
            atlas_y: placement.y,
            atlas_w: placement.width,
            atlas_h: placement.height,
            minx: record.bounds.left,
            maxx: record.bounds.right,
            miny: record.bounds.bottom,
            maxy: record.bounds.top,
            advance: record.advance,
        }
    }
}

/// A run of consecutive codepoints, `start..end`, whose entries begin at
/// index `cumulative`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub cumulative: u32,
}

/// The metric tables of the description file.
#[derive(Clone, Debug, PartialEq)]
pub struct Metrics {
    pub min_y: f64,
    pub max_y: f64,
    /// Present in span encoding only
    pub spans: Option<Vec<Span>>,
    /// `None` slots are gaps written as zero entries
    pub entries: Vec<Option<Entry>>,
}

impl Metrics {
    pub fn new(records: &[GlyphRecord], use_spans: bool) -> Self {
        let mut sorted: Vec<&GlyphRecord> = records.iter().collect();
        sorted.sort_by_key(|record| record.codepoint);

        let min_y = sorted
            .iter()
            .map(|r| r.bounds.bottom)
            .fold(f64::INFINITY, f64::min);
        let max_y = sorted
            .iter()
            .map(|r| r.bounds.top)
            .fold(f64::NEG_INFINITY, f64::max);

        let (spans, entries) = if use_spans {
            let entries = sorted.iter().map(|&r| Some(Entry::from(r))).collect();
            (Some(spans(&sorted)), entries)
        } else {
            (None, dense_slots(&sorted))
        };
        Self {
            min_y,
            max_y,
            spans,
            entries,
        }
    }
}

fn spans(sorted: &[&GlyphRecord]) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for (index, record) in sorted.iter().enumerate() {
        match spans.last_mut() {
            Some(span) if span.end == record.codepoint => span.end += 1,
            _ => spans.push(Span {
                start: record.codepoint,
                end: record.codepoint + 1,
                cumulative: index as u32,
            }),
        }
    }
    spans
}

/// One slot per codepoint from 0 up to the largest one present.
fn dense_slots(sorted: &[&GlyphRecord]) -> Vec<Option<Entry>> {
    let Some(last) = sorted.last() else {
        return Vec::new();
    };
    let mut slots = vec![None; last.codepoint as usize + 1];
    for &record in sorted {
        slots[record.codepoint as usize] = Some(Entry::from(record));
    }
    slots
}

/// Contents of `<base>_desc.c`.
pub fn describe(atlas: &PackedAtlas, use_spans: bool) -> String {
    let metrics = Metrics::new(&atlas.records, use_spans);
    let mut out = String::from(HEADER);

    // writing into a String cannot fail
    let _ = write!(
        out,
        "static const struct {{\n\
         \x20   unsigned int smooth_pixels;\n\
         \x20   float min_y;\n\
         \x20   float max_y;\n\
         }} font_information = {{\n\
         \x20   {},\n\
         \x20   {:.4}f,\n\
         \x20   {:.4}f\n\
         }};\n\n",
        atlas.border, metrics.min_y, metrics.max_y
    );

    if let Some(spans) = &metrics.spans {
        out.push_str(
            "static const struct bitmap_span {\n\
             \x20   unsigned int start;\n\
             \x20   unsigned int end;\n\
             \x20   unsigned int cumulative;\n\
             } font_codepoint_spans[] = {\n",
        );
        for (index, span) in spans.iter().enumerate() {
            let separator = if index + 1 == spans.len() { "" } else { "," };
            let _ = writeln!(
                out,
                "    {{ {}, {}, {} }}{separator}",
                span.start, span.end, span.cumulative
            );
        }
        out.push_str("};\n\n");
    }

    out.push_str(
        "static const struct bitmap_glyph {\n\
         \x20   unsigned int atlas_x, atlas_y;\n\
         \x20   unsigned int atlas_w, atlas_h;\n\
         \x20   float minx, maxx;\n\
         \x20   float miny, maxy;\n\
         \x20   float advance;\n\
         } font_codepoint_infos[] = {\n",
    );
    for slot in &metrics.entries {
        match slot {
            Some(e) => {
                let _ = writeln!(
                    out,
                    "{{ {}, {}, {}, {}, {:.4}f, {:.4}f, {:.4}f, {:.4}f, {:.4}f }},",
                    e.atlas_x,
                    e.atlas_y,
                    e.atlas_w,
                    e.atlas_h,
                    e.minx,
                    e.maxx,
                    e.miny,
                    e.maxy,
                    e.advance
                );
            }
            None => out.push_str("{ 0, 0, 0, 0, 0, 0, 0, 0, 0 },\n"),
        }
    }
    out.push_str("};\n");
    let _ = writeln!(
        out,
        "static const int bitmap_chars_count = {};",
        metrics.entries.len()
    );
    out
}

/// Map a field value to a byte, 1.0 saturating at 255.
pub fn quantize(value: f32) -> u8 {
    (value * 256.0).round().clamp(0.0, 255.0) as u8
}

/// Every glyph bitmap copied into one texture, row 0 at the bottom.
pub fn compose(atlas: &PackedAtlas) -> Vec<u8> {
    let channels = atlas.mode.channels();
    let width = atlas.width as usize;
    let height = atlas.height as usize;
    let mut pixels = vec![0; width * height * channels];
    for record in &atlas.records {
        let Some(bitmap) = &record.bitmap else {
            continue;
        };
        let placement = record.placement;
        for by in 0..bitmap.height() {
            let y = (placement.y + by) as usize;
            if y >= height {
                break;
            }
            for bx in 0..bitmap.width() {
                let x = (placement.x + bx) as usize;
                if x >= width {
                    break;
                }
                let start = (y * width + x) * channels;
                for (dest, &value) in pixels[start..start + channels]
                    .iter_mut()
                    .zip(bitmap.texel(bx, by))
                {
                    *dest = quantize(value);
                }
            }
        }
    }
    pixels
}

/// Contents of `<base>_img.c` for the composed `pixels`.
pub fn image_source(atlas: &PackedAtlas, pixels: &[u8]) -> String {
    let channels = atlas.mode.channels();
    let mut out = String::from(HEADER);
    let multiplier = if channels == 3 { "*3" } else { "" };
    let _ = write!(
        out,
        "\n\
         static const struct {{\n\
         \x20   unsigned int width, height;\n\
         \x20   unsigned int char_border;\n\
         \x20   unsigned int spacing;\n\
         \x20   unsigned char pixels[{w}*{h}{multiplier}];\n\
         }} font_image = {{\n\
         \x20   {w}, {h}, {border}, {spacing}, {{\n",
        w = atlas.width,
        h = atlas.height,
        border = atlas.border,
        spacing = atlas.spacing,
    );
    let row_len = atlas.width as usize * channels;
    if row_len > 0 {
        for row in pixels.chunks(row_len) {
            for byte in row {
                let _ = write!(out, "{byte},");
            }
            out.push('\n');
        }
    }
    out.push_str("}};\n");
    out
}

/// Encode the composed texture as a PNG, flipped so glyphs stand upright.
pub fn encode_png(atlas: &PackedAtlas, pixels: &[u8]) -> Result<Vec<u8>> {
    let color = match atlas.mode {
        FieldMode::Msdf => png::ColorType::Rgb,
        FieldMode::Sdf | FieldMode::PseudoSdf => png::ColorType::Grayscale,
    };
    let row_len = atlas.width as usize * atlas.mode.channels();
    let flipped: Vec<u8> = if row_len == 0 {
        Vec::new()
    } else {
        pixels.chunks(row_len).rev().flatten().copied().collect()
    };
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, atlas.width, atlas.height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&flipped)?;
    }
    Ok(png_data)
}

/// The three output files, rendered in memory.
#[derive(Clone, Debug)]
pub struct Artifacts {
    pub description: String,
    pub image_source: String,
    pub png: Vec<u8>,
}

impl Artifacts {
    pub fn new(atlas: &PackedAtlas, use_spans: bool) -> Result<Self> {
        let pixels = compose(atlas);
        Ok(Self {
            description: describe(atlas, use_spans),
            image_source: image_source(atlas, &pixels),
            png: encode_png(atlas, &pixels)?,
        })
    }

    /// Write `<base>_desc.c`, `<base>_img.c` and `<base>_img.png`.
    ///
    /// Files are first written next to their destination and only renamed
    /// into place once all of them were written. If a rename fails, the
    /// files already moved into place by this call are removed again, so a
    /// failed run leaves no partial output behind.
    pub fn write(&self, base: &Path) -> Result<[PathBuf; 3]> {
        let paths = artifact_paths(base);
        let contents: [&[u8]; 3] = [
            self.description.as_bytes(),
            self.image_source.as_bytes(),
            &self.png,
        ];
        let temps = paths.clone().map(|path| with_suffix(&path, ".tmp"));

        let remove_temps = || {
            for temp in &temps {
                let _ = fs::remove_file(temp);
            }
        };
        for (temp, data) in temps.iter().zip(contents) {
            if let Err(err) = fs::write(temp, data) {
                remove_temps();
                return Err(err.into());
            }
        }
        for (renamed, (temp, path)) in temps.iter().zip(&paths).enumerate() {
            if let Err(err) = fs::rename(temp, path) {
                remove_temps();
                for done in &paths[..renamed] {
                    let _ = fs::remove_file(done);
                }
                return Err(err.into());
            }
        }
        for path in &paths {
            log::debug!("wrote {}", path.display());
        }
        Ok(paths)
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Destination paths of the description, image source and PNG for `base`.
pub fn artifact_paths(base: &Path) -> [PathBuf; 3] {
    ["_desc.c", "_img.c", "_img.png"].map(|suffix| with_suffix(base, suffix))
}
