use std::{fmt, ops::Range, str::FromStr};

use crate::error::ConfigError;

/// Half-open range of codepoints, `begin..end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodepointRange {
    pub begin: u32,
    pub end: u32,
}

impl CodepointRange {
    pub const fn new(begin: u32, end: u32) -> Self {
        Self { begin, end }
    }

    /// The printable ascii characters, `'!'..='~'`.
    pub const fn ascii() -> Self {
        Self::new(0x21, 0x7f)
    }

    /// Printable ascii plus the latin-1 supplement.
    pub const fn latin1() -> Self {
        Self::new(0x21, 0x100)
    }

    /// The basic multilingual plane.
    pub const fn bmp() -> Self {
        Self::new(0, 0x1_0000)
    }

    pub fn iter(&self) -> Range<u32> {
        self.begin..self.end
    }

    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }
}

fn parse_u32(s: &str) -> Option<u32> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

impl FromStr for CodepointRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascii" => return Ok(Self::ascii()),
            "latin1" => return Ok(Self::latin1()),
            _ => {}
        }
        let invalid = || ConfigError::InvalidRange(s.to_string());
        let (begin, end) = s.split_once('-').ok_or_else(invalid)?;
        let begin = parse_u32(begin).ok_or_else(invalid)?;
        let end = parse_u32(end).ok_or_else(invalid)?;
        Ok(Self { begin, end })
    }
}

impl fmt::Display for CodepointRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.begin, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureSize {
    pub width: u32,
    pub height: u32,
}

impl TextureSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl FromStr for TextureSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidTextureSize(s.to_string());
        let (width, height) = s
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(invalid)?;
        let width = width.trim().parse().map_err(|_| invalid())?;
        let height = height.trim().parse().map_err(|_| invalid())?;
        Ok(Self { width, height })
    }
}

impl fmt::Display for TextureSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Which kind of distance field to render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldMode {
    /// Three channels, sharp corners survive magnification
    #[default]
    Msdf,
    /// One channel of true euclidean distance
    Sdf,
    /// One channel of distance to the nearest edge's extended tangent
    PseudoSdf,
}

impl FieldMode {
    pub fn channels(self) -> usize {
        match self {
            FieldMode::Msdf => 3,
            FieldMode::Sdf | FieldMode::PseudoSdf => 1,
        }
    }
}

impl FromStr for FieldMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "msdf" => Ok(FieldMode::Msdf),
            "sdf" => Ok(FieldMode::Sdf),
            "psdf" => Ok(FieldMode::PseudoSdf),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldMode::Msdf => "msdf",
            FieldMode::Sdf => "sdf",
            FieldMode::PseudoSdf => "psdf",
        })
    }
}

/// Settings for one atlas run.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasConfig {
    ranges: Vec<CodepointRange>,
    texture: TextureSize,
    mode: FieldMode,
    char_height: u32,
    auto_height: bool,
    smooth_pixels: u32,
    range: f64,
    spacing: u32,
    use_spans: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            ranges: vec![CodepointRange::bmp()],
            texture: TextureSize::new(2048, 2048),
            mode: FieldMode::Msdf,
            char_height: 32,
            auto_height: false,
            smooth_pixels: 2,
            range: 1.0,
            spacing: 2,
            use_spans: false,
        }
    }
}

impl AtlasConfig {
    pub fn with_ranges(self, ranges: Vec<CodepointRange>) -> Self {
        Self { ranges, ..self }
    }

    pub fn with_texture_size(self, width: u32, height: u32) -> Self {
        Self {
            texture: TextureSize::new(width, height),
            ..self
        }
    }

    pub fn with_mode(self, mode: FieldMode) -> Self {
        Self { mode, ..self }
    }

    /// Nominal height of the tallest glyph in texels; the upper bound of
    /// the search when automatic sizing is on.
    pub fn with_char_height(self, char_height: u32) -> Self {
        Self {
            char_height,
            ..self
        }
    }

    pub fn with_auto_height(self, auto_height: bool) -> Self {
        Self {
            auto_height,
            ..self
        }
    }

    pub fn with_smooth_pixels(self, smooth_pixels: u32) -> Self {
        Self {
            smooth_pixels,
            ..self
        }
    }

    /// Distance from the outline at which the field saturates, in font
    /// units.
    pub fn with_range(self, range: f64) -> Self {
        Self { range, ..self }
    }

    pub fn with_spacing(self, spacing: u32) -> Self {
        Self { spacing, ..self }
    }

    pub fn with_spans(self, use_spans: bool) -> Self {
        Self { use_spans, ..self }
    }

    pub fn ranges(&self) -> &[CodepointRange] {
        &self.ranges
    }

    pub fn texture(&self) -> TextureSize {
        self.texture
    }

    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    pub fn char_height(&self) -> u32 {
        self.char_height
    }

    pub fn auto_height(&self) -> bool {
        self.auto_height
    }

    pub fn smooth_pixels(&self) -> u32 {
        self.smooth_pixels
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    pub fn use_spans(&self) -> bool {
        self.use_spans
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ranges.is_empty() {
            return Err(ConfigError::NoRanges);
        }
        if let Some(range) = self.ranges.iter().find(|r| r.is_empty()) {
            return Err(ConfigError::EmptyRange {
                begin: range.begin,
                end: range.end,
            });
        }
        let TextureSize { width, height } = self.texture;
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroTexture { width, height });
        }
        if self.char_height == 0 {
            return Err(ConfigError::ZeroCharHeight);
        }
        if !(self.range.is_finite() && self.range > 0.0) {
            return Err(ConfigError::InvalidFieldRange(self.range));
        }
        Ok(())
    }
}
