pub mod config;
pub mod error;
pub mod game;
pub mod generator;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod physics;
pub mod render;
pub mod world;

pub use config::{MazeParams, Settings};
pub use error::{IndexKind, MazeError, Result};
pub use game::{Effect, GameState, WinTracker};
pub use generator::{carve, generate, NeighborShuffle, StartCell};
pub use geometry::{build_layout, wall_segments, Arena, BodyTag, Circle, GeometryParams, Layout, Rect};
pub use grid::{CellCoord, Dimensions, Dir, GridModel, Maze, Passage};
pub use physics::{BodyState, RapierWorld};
pub use world::{BodyHandle, PhysicsWorld, Session, WinBanner};
