use clap::{Parser, ValueEnum};
use log::LevelFilter;
use pathlight_renderer::BoundsKind;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BoundsArg {
    None,
    Sphere,
    Box,
}

impl From<BoundsArg> for BoundsKind {
    fn from(arg: BoundsArg) -> Self {
        match arg {
            BoundsArg::None => BoundsKind::None,
            BoundsArg::Sphere => BoundsKind::Sphere,
            BoundsArg::Box => BoundsKind::Box,
        }
    }
}

#[derive(Parser)]
#[command(name = "pathlight")]
#[command(about = "CPU path tracer for OBJ scenes")]
pub struct Args {
    /// JSON scene description
    pub scene: String,

    /// Output image path (format follows the extension)
    #[arg(short, long, default_value = "render.png")]
    pub output: String,

    /// Override the scene's image width
    #[arg(long)]
    pub width: Option<u32>,

    /// Override the scene's image height
    #[arg(long)]
    pub height: Option<u32>,

    /// Override the scene's samples per pixel
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Override the scene's maximum path depth
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Override the scene's RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Per-mesh bounding volume
    #[arg(long, value_enum, default_value = "box")]
    pub bounds: BoundsArg,

    /// Intersect material ranges with a linear scan instead of an octree
    #[arg(long)]
    pub no_octree: bool,

    /// Octree subdivision depth
    #[arg(long, default_value = "4")]
    pub octree_depth: u32,

    /// Worker threads (defaults to all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Logging verbosity
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}
