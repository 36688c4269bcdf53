use std::str::FromStr;

use clap::Parser;
use log::warn;

use crate::error::Result;
use crate::generator::StartCell;
use crate::geometry::{Arena, GeometryParams};
use crate::grid::{CellCoord, Dimensions};

pub const DEFAULT_CELLS_X: usize = 16;
pub const DEFAULT_CELLS_Y: usize = 10;
pub const DEFAULT_TICK_MS: u64 = 16;
pub const DEFAULT_RENDER_FPS: u64 = 60;

/// `ROW,COL` pair on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartArg(pub CellCoord);

impl FromStr for StartArg {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let (row, col) = value
            .split_once(',')
            .ok_or_else(|| "expected format ROW,COL".to_string())?;
        let row = row
            .trim()
            .parse::<usize>()
            .map_err(|error| format!("invalid row: {error}"))?;
        let col = col
            .trim()
            .parse::<usize>()
            .map_err(|error| format!("invalid column: {error}"))?;
        Ok(Self(CellCoord::new(row, col)))
    }
}

/// Steer a ball through a generated maze; reaching the goal collapses it.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Settings {
    /// Maze width in cells.
    #[arg(long, env = "MAZE_CELLS_X", default_value_t = DEFAULT_CELLS_X)]
    pub cells_x: usize,

    /// Maze height in cells.
    #[arg(long, env = "MAZE_CELLS_Y", default_value_t = DEFAULT_CELLS_Y)]
    pub cells_y: usize,

    /// Play-area width in pixel units.
    #[arg(long, env = "MAZE_WIDTH", default_value_t = 800.0)]
    pub width: f64,

    /// Play-area height in pixel units.
    #[arg(long, env = "MAZE_HEIGHT", default_value_t = 500.0)]
    pub height: f64,

    /// Seed for maze generation; random (and logged) when omitted.
    #[arg(long, env = "MAZE_SEED")]
    pub seed: Option<u64>,

    /// Cell the carve starts from.
    #[arg(long, env = "MAZE_START", value_name = "ROW,COL", default_value = "1,1")]
    pub start: StartArg,

    /// Start the carve from a random cell instead of --start.
    #[arg(long, conflicts_with = "start")]
    pub random_start: bool,

    #[arg(long, default_value_t = 3.0)]
    pub wall_thickness: f64,

    #[arg(long, default_value_t = 2.0)]
    pub boundary_thickness: f64,

    /// Goal size as a fraction of one cell.
    #[arg(long, default_value_t = 0.7)]
    pub goal_ratio: f64,

    /// Ball radius as a fraction of the smaller cell side.
    #[arg(long, default_value_t = 0.3)]
    pub ball_ratio: f64,

    /// Velocity added per key press.
    #[arg(long, default_value_t = 5.0)]
    pub velocity_step: f64,

    /// Vertical gravity switched on when the maze collapses.
    #[arg(long, default_value_t = 1.0)]
    pub collapse_gravity: f64,

    /// Simulation tick in milliseconds.
    #[arg(long, env = "MAZE_TICK_MS", default_value_t = DEFAULT_TICK_MS)]
    pub tick_ms: u64,

    /// Render frames per second.
    #[arg(long, env = "MAZE_FPS", default_value_t = DEFAULT_RENDER_FPS)]
    pub fps: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cells_x: DEFAULT_CELLS_X,
            cells_y: DEFAULT_CELLS_Y,
            width: 800.0,
            height: 500.0,
            seed: None,
            start: StartArg(CellCoord::new(1, 1)),
            random_start: false,
            wall_thickness: 3.0,
            boundary_thickness: 2.0,
            goal_ratio: 0.7,
            ball_ratio: 0.3,
            velocity_step: 5.0,
            collapse_gravity: 1.0,
            tick_ms: DEFAULT_TICK_MS,
            fps: DEFAULT_RENDER_FPS,
        }
    }
}

/// Validated construction-time parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MazeParams {
    pub dims: Dimensions,
    pub arena: Arena,
    pub geometry: GeometryParams,
    pub start: StartCell,
}

impl Settings {
    pub fn maze_params(&self) -> Result<MazeParams> {
        let dims = Dimensions::new(self.cells_x, self.cells_y)?;
        let arena = Arena::new(self.width, self.height)?;
        let geometry = GeometryParams {
            wall_thickness: self.wall_thickness,
            boundary_thickness: self.boundary_thickness,
            goal_ratio: self.goal_ratio,
            ball_ratio: self.ball_ratio,
        };
        geometry.validate()?;
        let start = if self.random_start {
            StartCell::Random
        } else {
            dims.check_cell(self.start.0.row, self.start.0.col)?;
            StartCell::At(self.start.0)
        };
        Ok(MazeParams {
            dims,
            arena,
            geometry,
            start,
        })
    }

    /// `(tick_ms, fps)`, each at least 1.
    pub fn timing(&self) -> (u64, u64) {
        let clamp = |name: &str, v: u64| {
            if v == 0 {
                warn!("{name} must be positive, using 1");
                1
            } else {
                v
            }
        };
        (clamp("tick-ms", self.tick_ms), clamp("fps", self.fps))
    }
}
