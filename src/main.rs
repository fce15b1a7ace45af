use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use sdf_atlasgen::{
    Artifacts, AtlasConfig, CodepointRange, Error, FieldMode, Result, TextureSize, TtfFont,
};

/// Build a distance field font atlas as C source and PNG
#[derive(Parser, Debug)]
#[command(name = "sdf-atlasgen", version, about, long_about = None)]
struct Cli {
    /// Half-open codepoint range <begin>-<end>, or one of ascii, latin1;
    /// may be repeated
    #[arg(
        short = 'C',
        long = "code-range",
        value_name = "B-E",
        default_value = "0-65536"
    )]
    code_ranges: Vec<CodepointRange>,

    /// Texture dimensions
    #[arg(short = 'T', long, value_name = "WxH", default_value = "2048x2048")]
    texture_size: TextureSize,

    /// Field mode: msdf, sdf or psdf
    #[arg(short = 'M', long, default_value = "msdf")]
    mode: FieldMode,

    /// Height of the tallest glyph in texels; the maximum with --auto-height
    #[arg(short = 'L', long, default_value_t = 32)]
    char_height: u32,

    /// Border texels around every glyph
    #[arg(short = 'S', long, default_value_t = 2)]
    smooth_pixels: u32,

    /// Distance from the outline to the end of the ramp, in font units
    #[arg(short = 'R', long, default_value_t = 1.0)]
    range: f64,

    /// Texels between glyphs
    #[arg(short = 'P', long, default_value_t = 2)]
    spacing: u32,

    /// Font file (.ttf, .otf)
    #[arg(short = 'F', long)]
    font: PathBuf,

    /// Base name of the output files
    #[arg(short = 'O', long, default_value = "bitmap_font")]
    output_name: PathBuf,

    /// Search for the largest char height that still fits the texture
    #[arg(long)]
    auto_height: bool,

    /// Emit codepoint spans instead of one entry per codepoint
    #[arg(long)]
    use_spans: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> AtlasConfig {
        AtlasConfig::default()
            .with_ranges(self.code_ranges.clone())
            .with_texture_size(self.texture_size.width, self.texture_size.height)
            .with_mode(self.mode)
            .with_char_height(self.char_height)
            .with_auto_height(self.auto_height)
            .with_smooth_pixels(self.smooth_pixels)
            .with_range(self.range)
            .with_spacing(self.spacing)
            .with_spans(self.use_spans)
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config();
    config.validate()?;
    let font_error = |detail: String| {
        Error::FontLoad(format!("\"{}\": {detail}", cli.font.display()))
    };
    let data = fs::read(&cli.font).map_err(|err| font_error(err.to_string()))?;
    let font = TtfFont::parse(&data).map_err(|err| match err {
        Error::FontLoad(detail) => font_error(detail),
        other => other,
    })?;
    let atlas = sdf_atlasgen::build(&font, &config)?;
    let paths = Artifacts::new(&atlas, config.use_spans())?.write(&cli.output_name)?;
    for path in &paths {
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["sdf-atlasgen", "-F", "font.ttf"]).unwrap();
        assert_eq!(cli.config(), AtlasConfig::default());
        assert_eq!(cli.output_name, PathBuf::from("bitmap_font"));
        assert!(!cli.verbose);
    }

    #[test]
    fn every_flag() {
        let cli = Cli::try_parse_from([
            "sdf-atlasgen",
            "-F",
            "font.ttf",
            "-C",
            "ascii",
            "-C",
            "0x400-0x500",
            "-T",
            "512x256",
            "-M",
            "psdf",
            "-L",
            "48",
            "-S",
            "3",
            "-R",
            "2.5",
            "-P",
            "1",
            "-O",
            "out/font",
            "--auto-height",
            "--use-spans",
            "-v",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(
            config.ranges(),
            &[CodepointRange::ascii(), CodepointRange::new(0x400, 0x500)]
        );
        assert_eq!(config.texture(), TextureSize::new(512, 256));
        assert_eq!(config.mode(), FieldMode::PseudoSdf);
        assert_eq!(config.char_height(), 48);
        assert_eq!(config.smooth_pixels(), 3);
        assert_eq!(config.range(), 2.5);
        assert_eq!(config.spacing(), 1);
        assert!(config.auto_height());
        assert!(config.use_spans());
        assert!(cli.verbose);
        assert_eq!(cli.output_name, PathBuf::from("out/font"));
    }

    #[test]
    fn malformed_values_are_rejected() {
        for args in [
            ["-T", "512"],
            ["-M", "bitmap"],
            ["-C", "65"],
            ["-L", "tall"],
        ] {
            let mut argv = vec!["sdf-atlasgen", "-F", "font.ttf"];
            argv.extend(args);
            assert!(Cli::try_parse_from(argv).is_err(), "{args:?}");
        }
    }

    #[test]
    fn font_is_required() {
        assert!(Cli::try_parse_from(["sdf-atlasgen"]).is_err());
    }
}
