use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sdf_atlasgen::{
    build, output::artifact_paths, pack::pack, scale::scale, ttf_parser::OutlineBuilder,
    Artifacts, AtlasConfig, CodepointRange, Error, FieldMode, MemoryFont, ShapeBuilder,
};

struct TestDir {
    path: PathBuf,
}

impl TestDir {
    fn new(tag: &str) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let path = std::env::temp_dir().join(format!(
            "sdf_atlasgen_{tag}_{}_{}",
            std::process::id(),
            ts
        ));
        fs::create_dir_all(&path).expect("create temp test dir");
        Self { path }
    }

    fn entries(&self) -> usize {
        fs::read_dir(&self.path).map_or(0, |dir| dir.count())
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// A clockwise rectangle glyph from the origin.
fn rect_shape(width: f32, height: f32) -> sdf_atlasgen::Shape {
    let mut builder = ShapeBuilder::new();
    builder.move_to(0.0, 0.0);
    builder.line_to(0.0, height);
    builder.line_to(width, height);
    builder.line_to(width, 0.0);
    builder.close();
    builder.finish()
}

/// 'A' to 'C' as boxes of different proportions, plus a blank space.
fn abc_font() -> MemoryFont {
    MemoryFont::new()
        .with_glyph(32, sdf_atlasgen::Shape::new(), 256.0)
        .with_glyph(65, rect_shape(512.0, 512.0), 576.0)
        .with_glyph(66, rect_shape(256.0, 512.0), 320.0)
        .with_glyph(67, rect_shape(512.0, 256.0), 576.0)
}

fn abc_config() -> AtlasConfig {
    AtlasConfig::default()
        .with_ranges(vec![CodepointRange::new(65, 68)])
        .with_texture_size(256, 256)
        .with_char_height(32)
        .with_spacing(2)
        .with_smooth_pixels(2)
}

#[test]
fn three_glyph_dense_atlas() {
    let atlas = build(&abc_font(), &abc_config()).expect("build atlas");
    assert_eq!(atlas.records.len(), 3);
    assert_eq!(atlas.char_height, 32);
    for record in &atlas.records {
        let placement = record.placement;
        assert!(placement.width > 4 && placement.height > 4);
        assert!(placement.x + placement.width <= 256);
        assert!(placement.y + placement.height <= 256);
        let bitmap = record.bitmap.as_ref().expect("rendered bitmap");
        assert_eq!(bitmap.width(), placement.width);
        assert_eq!(bitmap.channels(), 3);
    }

    let dir = TestDir::new("abc");
    let base = dir.path.join("font");
    let paths = Artifacts::new(&atlas, false)
        .expect("render artifacts")
        .write(&base)
        .expect("write artifacts");
    assert_eq!(paths, artifact_paths(&base));
    assert_eq!(dir.entries(), 3);

    let desc = fs::read_to_string(&paths[0]).expect("read description");
    let infos = desc
        .split("font_codepoint_infos[] = {\n")
        .nth(1)
        .and_then(|rest| rest.split("};").next())
        .expect("glyph table");
    let rows: Vec<_> = infos.lines().collect();
    assert_eq!(rows.len(), 68);
    for (codepoint, row) in rows.iter().enumerate() {
        let placeholder = *row == "{ 0, 0, 0, 0, 0, 0, 0, 0, 0 },";
        assert_eq!(placeholder, codepoint < 65, "row {codepoint}: {row}");
    }
    assert!(desc.ends_with("static const int bitmap_chars_count = 68;\n"));

    let image = fs::read_to_string(&paths[1]).expect("read image source");
    assert!(image.contains("unsigned char pixels[256*256*3];"));
    assert!(image.contains("    256, 256, 2, 2, {\n"));
}

#[test]
fn tallest_glyph_matches_char_height() {
    let atlas = build(&abc_font(), &abc_config()).expect("build atlas");
    let tallest = atlas
        .records
        .iter()
        .map(|r| r.bounds.top - r.bounds.bottom)
        .fold(0.0, f64::max);
    assert!((tallest - 32.0).abs() < 1e-9);
    let b = atlas.records.iter().find(|r| r.codepoint == 66).unwrap();
    assert_eq!((b.placement.width, b.placement.height), (16 + 4, 32 + 4));
}

#[test]
fn overlapping_ranges_collect_once() {
    let config = abc_config().with_ranges(vec![
        CodepointRange::new(65, 67),
        CodepointRange::new(66, 68),
        CodepointRange::new(32, 33),
    ]);
    let atlas = build(&abc_font(), &config).expect("build atlas");
    let mut codepoints: Vec<_> = atlas.records.iter().map(|r| r.codepoint).collect();
    codepoints.sort_unstable();
    assert_eq!(codepoints, [65, 66, 67]);
}

/// Build and write the way the binary does.
fn build_and_write(
    font: &MemoryFont,
    config: &AtlasConfig,
    base: &std::path::Path,
) -> sdf_atlasgen::Result<[PathBuf; 3]> {
    let atlas = build(font, config)?;
    Artifacts::new(&atlas, config.use_spans())?.write(base)
}

#[test]
fn tiny_texture_fails_without_output() {
    let dir = TestDir::new("tiny");
    let config = abc_config().with_texture_size(4, 4);
    match build_and_write(&abc_font(), &config, &dir.path.join("font")) {
        Err(Error::AtlasTooSmall {
            width: 4,
            height: 4,
            char_height: 32,
            glyphs: 3,
        }) => {}
        other => panic!("expected AtlasTooSmall, got {other:?}"),
    }
    assert_eq!(dir.entries(), 0);
}

#[test]
fn nothing_in_range_is_an_error() {
    let config = abc_config().with_ranges(vec![CodepointRange::new(0x400, 0x500)]);
    assert!(matches!(build(&abc_font(), &config), Err(Error::NoGlyphs)));
}

#[test]
fn auto_height_finds_the_largest_fit() {
    let font = MemoryFont::new().with_glyph(65, rect_shape(512.0, 512.0), 600.0);
    let config = AtlasConfig::default()
        .with_ranges(vec![CodepointRange::new(65, 66)])
        .with_texture_size(64, 64)
        .with_char_height(1000)
        .with_auto_height(true)
        .with_mode(FieldMode::Sdf);
    let atlas = build(&font, &config).expect("build atlas");
    let height = atlas.char_height;
    assert!(height > 0 && height < 1000);

    let glyphs = sdf_atlasgen::collect(&font, config.ranges()).glyphs;
    let fits = |char_height| {
        let mut scaled = scale(&glyphs, char_height, 2).expect("scale");
        pack(&mut scaled.records, 64, 64, 2)
    };
    assert!(fits(height));
    assert!(!fits(height + 1));
}

#[test]
fn auto_height_without_any_fit() {
    let config = abc_config().with_texture_size(5, 5).with_auto_height(true);
    assert!(matches!(
        build(&abc_font(), &config),
        Err(Error::AtlasTooSmall { .. })
    ));
}

#[test]
fn spans_cover_present_codepoints() {
    let font = abc_font().with_glyph(70, rect_shape(128.0, 512.0), 200.0);
    let config = abc_config()
        .with_ranges(vec![CodepointRange::ascii()])
        .with_mode(FieldMode::PseudoSdf);
    let atlas = build(&font, &config).expect("build atlas");
    let artifacts = Artifacts::new(&atlas, true).expect("render artifacts");
    let desc = &artifacts.description;
    assert!(desc.contains("    { 65, 68, 0 },\n    { 70, 71, 3 }\n};\n"));
    assert!(desc.ends_with("static const int bitmap_chars_count = 4;\n"));
    assert!(!desc.contains("{ 0, 0, 0, 0, 0, 0, 0, 0, 0 }"));
}

#[test]
fn identical_runs_give_identical_artifacts() {
    let config = abc_config().with_mode(FieldMode::Msdf);
    let first = Artifacts::new(&build(&abc_font(), &config).unwrap(), false).unwrap();
    let second = Artifacts::new(&build(&abc_font(), &config).unwrap(), false).unwrap();
    assert_eq!(first.description, second.description);
    assert_eq!(first.image_source, second.image_source);
    assert_eq!(first.png, second.png);
}

#[test]
fn png_matches_the_texture() {
    let config = abc_config().with_texture_size(128, 64).with_mode(FieldMode::Sdf);
    let atlas = build(&abc_font(), &config).expect("build atlas");
    let artifacts = Artifacts::new(&atlas, false).expect("render artifacts");
    let decoder = png::Decoder::new(std::io::Cursor::new(&artifacts.png));
    let mut reader = decoder.read_info().expect("png header");
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).expect("png frame");
    assert_eq!((info.width, info.height), (128, 64));
    assert_eq!(info.color_type, png::ColorType::Grayscale);
    assert!(buf.iter().any(|&b| b == 255));
}

#[test]
fn failed_write_leaves_nothing_behind() {
    let atlas = build(&abc_font(), &abc_config().with_mode(FieldMode::Sdf)).unwrap();
    let dir = TestDir::new("missing");
    let base = dir.path.join("no_such_dir").join("font");
    let result = Artifacts::new(&atlas, false).unwrap().write(&base);
    assert!(matches!(result, Err(Error::Io(_))));
    assert_eq!(dir.entries(), 0);
}

#[test]
fn failed_rename_removes_files_already_in_place() {
    let atlas = build(&abc_font(), &abc_config().with_mode(FieldMode::Sdf)).unwrap();
    let dir = TestDir::new("blocked");
    let base = dir.path.join("font");
    let [desc, image, png_path] = artifact_paths(&base);
    // a directory where the image source should go makes its rename fail
    fs::create_dir(&image).expect("create blocking dir");

    let result = Artifacts::new(&atlas, false).unwrap().write(&base);
    assert!(matches!(result, Err(Error::Io(_))));
    assert!(!desc.exists());
    assert!(!png_path.exists());
    assert!(image.is_dir());
    // nothing but the blocking directory is left
    assert_eq!(dir.entries(), 1);
}
