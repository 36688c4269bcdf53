use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::grid::{CellCoord, Dimensions, Dir, GridModel, Maze, Passage};

/// Source of the per-cell neighbour ordering.
pub trait NeighborShuffle {
    fn shuffle_dirs(&mut self, dirs: &mut [Dir; 4]);
}

impl<R: Rng + ?Sized> NeighborShuffle for R {
    fn shuffle_dirs(&mut self, dirs: &mut [Dir; 4]) {
        dirs.as_mut_slice().shuffle(self);
    }
}

/// Where the carve begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartCell {
    At(CellCoord),
    Random,
}

impl Default for StartCell {
    fn default() -> Self {
        StartCell::At(CellCoord::new(1, 1))
    }
}

impl StartCell {
    pub fn resolve(self, dims: Dimensions, rng: &mut impl Rng) -> CellCoord {
        match self {
            StartCell::At(cell) => cell,
            StartCell::Random => CellCoord::new(
                rng.gen_range(0..dims.cells_vertical()),
                rng.gen_range(0..dims.cells_horizontal()),
            ),
        }
    }
}

struct Frame {
    cell: CellCoord,
    dirs: [Dir; 4],
    next: usize,
}

fn enter(
    grid: &mut GridModel,
    cell: CellCoord,
    shuffle: &mut (impl NeighborShuffle + ?Sized),
    order: &mut Vec<CellCoord>,
) -> Result<Frame> {
    grid.mark_visited(cell.row, cell.col)?;
    order.push(cell);
    let mut dirs = Dir::ALL;
    shuffle.shuffle_dirs(&mut dirs);
    Ok(Frame {
        cell,
        dirs,
        next: 0,
    })
}

/// Randomised depth-first carve (recursive backtracker) over `grid`, driven by
/// an explicit stack. Each newly entered cell shuffles its four directions
/// once and then tries them in that order; a direction leading off the grid or
/// into a visited cell is skipped, otherwise the passage is opened and the
/// walk descends. Returns cells in the order they were first visited.
///
/// A start cell that is already visited carves nothing.
pub fn carve(
    grid: &mut GridModel,
    start: CellCoord,
    shuffle: &mut (impl NeighborShuffle + ?Sized),
) -> Result<Vec<CellCoord>> {
    let dims = grid.dims();
    let mut order = Vec::with_capacity(dims.cell_count());
    if grid.is_visited(start.row, start.col)? {
        return Ok(order);
    }

    let mut stack = vec![enter(grid, start, shuffle, &mut order)?];
    while let Some(top) = stack.last_mut() {
        if top.next == top.dirs.len() {
            stack.pop();
            continue;
        }
        let dir = top.dirs[top.next];
        top.next += 1;
        let cell = top.cell;

        let (dr, dc) = dir.delta();
        let (nr, nc) = (cell.row as isize + dr, cell.col as isize + dc);
        if !dims.contains(nr, nc) {
            continue;
        }
        let next = CellCoord::new(nr as usize, nc as usize);
        if grid.is_visited(next.row, next.col)? {
            continue;
        }
        if let Some(passage) = Passage::between(cell, dir) {
            grid.open(passage)?;
        }
        let frame = enter(grid, next, shuffle, &mut order)?;
        stack.push(frame);
    }

    Ok(order)
}

/// Carves a fresh grid of `dims` from `start` and freezes it.
pub fn generate(
    dims: Dimensions,
    start: CellCoord,
    shuffle: &mut (impl NeighborShuffle + ?Sized),
) -> Result<Maze> {
    dims.check_cell(start.row, start.col)?;
    let mut grid = GridModel::new(dims);
    let order = carve(&mut grid, start, shuffle)?;
    debug!(
        "carved {}x{} grid from ({}, {}), {} cells visited",
        dims.cells_horizontal(),
        dims.cells_vertical(),
        start.row,
        start.col,
        order.len()
    );
    Ok(grid.into_maze())
}
