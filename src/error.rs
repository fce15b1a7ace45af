//! Error types for atlas generation

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("could not open font: {0}")]
    FontLoad(String),

    #[error("no glyphs with a visible outline in the requested codepoint ranges")]
    NoGlyphs,

    #[error("all {0} collected glyphs have zero height")]
    DegenerateGlyphs(usize),

    #[error("cell of glyph U+{codepoint:04X} overflows at char height {char_height}")]
    CellTooLarge { codepoint: u32, char_height: u32 },

    #[error("rendering glyph U+{codepoint:04X} failed: {source}")]
    FieldRender {
        codepoint: u32,
        source: FieldRenderError,
    },

    #[error(
        "packing atlas failed: {glyphs} glyphs at char height {char_height} \
         do not fit a {width}x{height} texture"
    )]
    AtlasTooSmall {
        width: u32,
        height: u32,
        char_height: u32,
        glyphs: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// Malformed or inconsistent configuration.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid codepoint range \"{0}\", expected <begin>-<end>")]
    InvalidRange(String),

    #[error("codepoint range {begin}-{end} is empty")]
    EmptyRange { begin: u32, end: u32 },

    #[error("no codepoint ranges given")]
    NoRanges,

    #[error("invalid texture size \"{0}\", expected <width>x<height>")]
    InvalidTextureSize(String),

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroTexture { width: u32, height: u32 },

    #[error("unknown field mode \"{0}\", expected msdf, sdf or psdf")]
    UnknownMode(String),

    #[error("char height must be at least 1")]
    ZeroCharHeight,

    #[error("field range must be a positive number, got {0}")]
    InvalidFieldRange(f64),
}

/// Failure to load one glyph; the glyph is skipped.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GlyphLoadError {
    #[error("U+{0:04X} is not a unicode scalar value")]
    InvalidCodepoint(u32),

    #[error("font has no glyph for U+{0:04X}")]
    MissingGlyph(u32),

    #[error("glyph for U+{0:04X} has no horizontal advance")]
    MissingAdvance(u32),
}

/// Failure of the distance field generator for one glyph.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FieldRenderError {
    #[error("shape has no edges")]
    EmptyShape,

    #[error("shape has non-finite coordinates")]
    NonFinite,

    #[error("invalid transform: scale {scale}, range {range}")]
    InvalidTransform { scale: f64, range: f64 },

    #[error("bitmap channels do not match the field mode")]
    ChannelMismatch,
}
