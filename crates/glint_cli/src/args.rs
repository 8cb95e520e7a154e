//! Command line parsing.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use glint_renderer::{Preset, RenderConfig};

pub const USAGE: &str = "\
Usage: glint [preset] [options]

Presets: random-spheres (default), three-spheres, earth[:texture], perlin-spheres,
         simple-light, simple-box, cornell-box, cornell-smoke, showcase

Options:
  --width N         Image width in pixels (default 400)
  --height N        Image height in pixels (default 225)
  --spp N           Samples per pixel
  --depth N         Maximum bounces per path
  --threads N       Number of scanline workers
  --seed N          Base random seed
  --no-interlace    Render every worker's rows top-down
  --config FILE     JSON file with render settings; flags override it
  --output FILE     PNG to write (default glint.png)
  --help            Show this message";

const DEFAULT_WIDTH: u32 = 400;
const DEFAULT_HEIGHT: u32 = 225;
const DEFAULT_OUTPUT: &str = "glint.png";

/// Everything a batch render needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub preset: Preset,
    pub width: u32,
    pub height: u32,
    pub config: RenderConfig,
    pub output: PathBuf,
}

/// Flags as typed, before the config file is merged in.
#[derive(Debug, Default)]
struct RawArgs {
    preset: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    spp: Option<u32>,
    depth: Option<u32>,
    threads: Option<usize>,
    seed: Option<u64>,
    no_interlace: bool,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    help: bool,
}

/// Parse arguments (without the program name). Returns `None` when help was requested.
pub fn parse<I>(args: I) -> Result<Option<Options>>
where
    I: IntoIterator<Item = String>,
{
    let raw = parse_raw(args)?;
    if raw.help {
        return Ok(None);
    }

    let mut config = match &raw.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => RenderConfig::default(),
    };

    if let Some(spp) = raw.spp {
        config.samples_per_pixel = spp;
    }
    if let Some(depth) = raw.depth {
        config.max_depth = depth;
    }
    if let Some(threads) = raw.threads {
        config.workers = threads;
    }
    if let Some(seed) = raw.seed {
        config.seed = seed;
    }
    if raw.no_interlace {
        config.interlace = false;
    }

    let preset = match raw.preset.as_deref() {
        Some(name) => name.parse()?,
        None => Preset::default(),
    };

    let width = raw.width.unwrap_or(DEFAULT_WIDTH);
    let height = raw.height.unwrap_or(DEFAULT_HEIGHT);
    if width == 0 || height == 0 {
        bail!("Image size must be non-zero, got {}x{}", width, height);
    }

    Ok(Some(Options {
        preset,
        width,
        height,
        config,
        output: raw.output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
    }))
}

fn parse_raw<I>(args: I) -> Result<RawArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut raw = RawArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .with_context(|| format!("Missing value for {}", flag))
        };

        match arg.as_str() {
            "--width" => raw.width = Some(number(&arg, value(&arg)?)?),
            "--height" => raw.height = Some(number(&arg, value(&arg)?)?),
            "--spp" => raw.spp = Some(number(&arg, value(&arg)?)?),
            "--depth" => raw.depth = Some(number(&arg, value(&arg)?)?),
            "--threads" => raw.threads = Some(number(&arg, value(&arg)?)?),
            "--seed" => raw.seed = Some(number(&arg, value(&arg)?)?),
            "--config" => raw.config = Some(PathBuf::from(value(&arg)?)),
            "--output" | "-o" => raw.output = Some(PathBuf::from(value(&arg)?)),
            "--no-interlace" => raw.no_interlace = true,
            "--help" | "-h" => raw.help = true,
            flag if flag.starts_with('-') => bail!("Unknown option {}", flag),
            name => {
                if let Some(previous) = &raw.preset {
                    bail!("Only one preset may be given (got {} and {})", previous, name);
                }
                raw.preset = Some(name.to_string());
            }
        }
    }

    Ok(raw)
}

fn number<T>(flag: &str, value: String) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("Invalid value for {}: {}", flag, value))
}
