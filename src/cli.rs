use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use meshpulse::Point;
use meshpulse::color::Rgb;

/// Animated proximity mesh with pulse waves, run headlessly.
#[derive(Parser, Debug)]
#[command(name = "meshpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate the mesh for a number of frames and print statistics as JSON
    Run(RunArgs),
    /// Print the default settings
    Config {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Surface width in CSS pixels
    #[arg(long, default_value_t = 1920.0)]
    pub width: f64,

    /// Surface height in CSS pixels
    #[arg(long, default_value_t = 1080.0)]
    pub height: f64,

    /// Device pixel ratio
    #[arg(long, default_value_t = 1.0)]
    pub pixel_ratio: f64,

    /// Number of frames to run
    #[arg(short = 'n', long, default_value_t = 600)]
    pub frames: u64,

    /// Frames per second of the animation clock
    #[arg(long, default_value_t = 60.0)]
    pub fps: f64,

    /// Seed for node placement and automatic pulses (random if omitted)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Settings file (.yaml, .yml or .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Click at X,Y before the first frame (repeatable)
    #[arg(long = "click", value_name = "X,Y", value_parser = parse_point)]
    pub clicks: Vec<Point>,

    /// Pace frames with the wall clock instead of a virtual clock
    #[arg(long)]
    pub realtime: bool,

    /// Write the last frame as SVG
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Background color of the SVG output (transparent if omitted)
    #[arg(long, value_name = "#RRGGBB")]
    pub background: Option<Rgb>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got {s:?}"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate {v:?}: {e}"))
    };
    Ok(Point::new(coord(x)?, coord(y)?))
}
