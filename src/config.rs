use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::path::SourceMode;

/// Default canvas size in pixels.
const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;
/// Target ticks per second.
const DEFAULT_FPS: u32 = 30;
/// Stamp footprint radius in pixels.
const DEFAULT_RADIUS: u32 = 20;
/// Intensity added per stamped cell per tick.
const DEFAULT_INCREMENT: f32 = 0.1;
/// Palette size.
const DEFAULT_RAMP_COLORS: usize = 256;
const DEFAULT_REPLAY_FILE: &str = "movement_path.csv";

/// Normalization reference for colorizing the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ceiling {
    /// Fixed maximum; values at or above it get the hottest color.
    Fixed(f32),
    /// Largest peak seen so far this session.
    RunningMax,
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(c) => write!(f, "{c}"),
            Self::RunningMax => f.write_str("auto"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Live density heatmap of a moving point.
#[derive(Parser, Debug)]
#[command(name = "pathheat", version, about)]
pub struct Cli {
    /// CSV file with `frame,x,y` rows to replay
    #[arg(long, value_name = "FILE", default_value = DEFAULT_REPLAY_FILE)]
    replay: PathBuf,

    /// Position source at startup
    #[arg(long, value_enum, default_value_t = SourceMode::Pointer)]
    mode: SourceMode,

    /// Canvas size in pixels
    #[arg(long, value_name = "WxH", value_parser = parse_size,
          default_value_t = CanvasSize { width: DEFAULT_WIDTH, height: DEFAULT_HEIGHT })]
    size: CanvasSize,

    /// Target ticks per second
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..), default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Stamp radius in pixels (at most the larger canvas side)
    #[arg(long, default_value_t = DEFAULT_RADIUS)]
    radius: u32,

    /// Intensity added per stamped cell per tick
    #[arg(long, value_parser = parse_increment, default_value_t = DEFAULT_INCREMENT)]
    increment: f32,

    /// Color scale maximum, or `auto` for the running peak
    #[arg(long, value_name = "F|auto", value_parser = parse_ceiling,
          default_value_t = Ceiling::Fixed(1.0))]
    ceiling: Ceiling,
}

impl Cli {
    /// Cross-flag checks, then the runtime config.
    pub fn into_config(self) -> Result<Config, clap::Error> {
        let limit = self.size.width.max(self.size.height);
        if self.radius > limit {
            return Err(Cli::command().error(
                ErrorKind::ValueValidation,
                format!("--radius {} exceeds the larger canvas side ({limit})", self.radius),
            ));
        }

        Ok(Config {
            width: self.size.width,
            height: self.size.height,
            target_fps: self.fps,
            radius: self.radius,
            increment: self.increment,
            ramp_colors: DEFAULT_RAMP_COLORS,
            ceiling: self.ceiling,
            replay_path: self.replay,
            initial_mode: self.mode,
        })
    }
}

/// Session configuration, fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
    pub radius: u32,
    pub increment: f32,
    pub ramp_colors: usize,
    pub ceiling: Ceiling,
    pub replay_path: PathBuf,
    pub initial_mode: SourceMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            target_fps: DEFAULT_FPS,
            radius: DEFAULT_RADIUS,
            increment: DEFAULT_INCREMENT,
            ramp_colors: DEFAULT_RAMP_COLORS,
            ceiling: Ceiling::Fixed(1.0),
            replay_path: PathBuf::from(DEFAULT_REPLAY_FILE),
            initial_mode: SourceMode::Pointer,
        }
    }
}

impl Config {
    /// Parse a full argument list (program name first).
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Cli::try_parse_from(args)?.into_config()
    }
}

fn parse_size(s: &str) -> Result<CanvasSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected <W>x<H>, got {s:?}"))?;
    let width: u32 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let height: u32 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    if width == 0 || height == 0 {
        return Err("width and height must be positive".into());
    }
    Ok(CanvasSize { width, height })
}

fn parse_increment(s: &str) -> Result<f32, String> {
    let v: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if v > 0.0 && v.is_finite() {
        Ok(v)
    } else {
        Err(format!("must be a positive number, got {s}"))
    }
}

fn parse_ceiling(s: &str) -> Result<Ceiling, String> {
    if s.eq_ignore_ascii_case("auto") {
        return Ok(Ceiling::RunningMax);
    }
    match s.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(Ceiling::Fixed(v)),
        _ => Err(format!("expected a number or `auto`, got {s:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::from_args(std::iter::once("pathheat").chain(args.iter().copied()))
    }

    #[test]
    fn no_args_gives_defaults() {
        let cfg = parse(&[]).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!((cfg.width, cfg.height), (800, 600));
        assert_eq!(cfg.target_fps, 30);
        assert_eq!(cfg.ceiling, Ceiling::Fixed(1.0));
        assert_eq!(cfg.initial_mode, SourceMode::Pointer);
    }

    #[test]
    fn all_flags() {
        let cfg = parse(&[
            "--replay", "path.csv", "--mode", "replay", "--size", "640x480", "--fps", "60",
            "--radius", "12", "--increment", "0.5", "--ceiling", "auto",
        ])
        .unwrap();
        assert_eq!(cfg.replay_path, PathBuf::from("path.csv"));
        assert_eq!(cfg.initial_mode, SourceMode::Replay);
        assert_eq!((cfg.width, cfg.height), (640, 480));
        assert_eq!(cfg.target_fps, 60);
        assert_eq!(cfg.radius, 12);
        assert_eq!(cfg.increment, 0.5);
        assert_eq!(cfg.ceiling, Ceiling::RunningMax);
    }

    #[test]
    fn mode_aliases() {
        assert_eq!(parse(&["--mode", "mouse"]).unwrap().initial_mode, SourceMode::Pointer);
        assert_eq!(parse(&["--mode", "csv"]).unwrap().initial_mode, SourceMode::Replay);
    }

    #[test]
    fn fixed_ceiling() {
        let cfg = parse(&["--ceiling", "2.5"]).unwrap();
        assert_eq!(cfg.ceiling, Ceiling::Fixed(2.5));
    }

    #[test]
    fn rejects_bad_values() {
        let kind = |args: &[&str]| parse(args).unwrap_err().kind();
        assert_eq!(kind(&["--fps", "0"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["--size", "800"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["--size", "0x10"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["--increment", "0"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["--ceiling", "hot"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["--mode", "both"]), ErrorKind::InvalidValue);
        assert_eq!(kind(&["--wat"]), ErrorKind::UnknownArgument);
        assert!(parse(&["--increment=-1"]).is_err());
        assert!(parse(&["--radius"]).is_err());
    }

    #[test]
    fn radius_is_bounded_by_canvas() {
        assert_eq!(parse(&["--size", "100x50", "--radius", "100"]).unwrap().radius, 100);
        let err = parse(&["--size", "100x50", "--radius", "101"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(parse(&["--radius", "50000"]).is_err());
    }

    #[test]
    fn defaults_round_trip_through_display() {
        assert_eq!(parse_ceiling(&Ceiling::Fixed(1.0).to_string()), Ok(Ceiling::Fixed(1.0)));
        assert_eq!(parse_ceiling(&Ceiling::RunningMax.to_string()), Ok(Ceiling::RunningMax));
        let size = CanvasSize { width: 800, height: 600 };
        assert_eq!(parse_size(&size.to_string()), Ok(size));
    }
}
